//! Execution spaces, tiled dispatch, and mirrored arrays
//!
//! This crate is the substrate the benchmark kernels run on. It models two
//! execution spaces over one worker pool: the host space working directly
//! on host vectors, and a device space whose arrays live in slab-managed
//! mirror memory and are reached through explicit copies.
//!
//! ```text
//! +------------------+     views      +---------------------+
//! |  HostArray<T,R>  | -------------> |  parallel_for(...)  |
//! +--------+---------+                |  tile grid dispatch |
//!          | copy_from_host /         +---------------------+
//!          | copy_to_host                        ^
//!          v                                     | views
//! +------------------+                +----------+----------+
//! | DeviceArray<T,R> | -------------> |     DeviceMemory    |
//! +------------------+    handles     |    (slab manager)   |
//!                                     +---------------------+
//! ```
//!
//! Launch geometry is rank-generic: an [`IndexRange`] describes the
//! iteration domain, a [`TileShape`] the per-task block, and each
//! [`ExecutionSpace`] owns the strategy that picks tile shapes for a range.

pub mod array;
pub mod error;
pub mod launch;
pub mod space;
pub mod spaces;

pub use array::{ArrayView, ArrayViewMut, DeviceArray, HostArray};
pub use error::{BackendError, Result};
pub use launch::{row_major_strides, BufferHandle, IndexRange, TileGrid, TileShape};
pub use space::ExecutionSpace;
pub use spaces::{DeviceMemory, DeviceSpace, HostSpace, DEFAULT_HOST_INNER_TILE, MAX_TILE_RANK};
