//! Rank-generic STREAM bandwidth benchmark engine
//!
//! Measures sustained memory bandwidth of the classic elementwise kernel
//! set (set, copy, scale, add, triad) over 1-, 2-, and 4-dimensional
//! arrays. One engine covers every rank: the iteration domain is an
//! `IndexRange<R>`, kernels are generic over rank and element width, and
//! the host/device split is a strategy behind the `ExecutionSpace` trait
//! from `freshet_backends`.
//!
//! A run follows the fixed protocol: initialize the three arrays, execute
//! twenty trials of set / copy / scale / add / triad on the device space
//! keeping the fastest duration per kernel, copy back, validate against a
//! forward-simulated scalar reference, and report bandwidth per kernel.
//!
//! ```no_run
//! use freshet_core::{run_stream, RunConfig};
//!
//! let cfg = RunConfig::new(1024);
//! let failures = run_stream::<f64, 2>(&cfg)?;
//! assert_eq!(failures, 0, "validation failed on {failures} arrays");
//! # Ok::<(), freshet_core::Error>(())
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod kernels;
pub mod report;
pub mod run;
pub mod timing;
pub mod validate;

pub use config::{InitFlow, RunConfig, NTIMES, SCALAR};
pub use element::Element;
pub use error::{Error, Result};
pub use run::run_stream;
pub use timing::{Kernel, KernelTimings};
pub use validate::{validate, ReferenceState, ValidationReport};
