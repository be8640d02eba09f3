//! Rank-four STREAM driver with tile-spread scanning over `f64` arrays.

use std::process::ExitCode;

use clap::Parser;
use freshet_core::{report, run_stream, RunConfig};
use freshet_tracing::{init_global_tracing, TracingConfig};

/// Memory bandwidth benchmark over four-dimensional f64 arrays.
///
/// Arrays span an n^4 index range. The spread factor reshapes the launch
/// tiles, trading tile length between the fastest- and slowest-varying
/// dimensions, and the recommended and used tile shapes are printed so a
/// scan over factors can be correlated with the bandwidth numbers. The
/// exit code is the number of arrays that failed validation.
#[derive(Parser, Debug)]
#[command(name = "stream4d", version)]
struct Cli {
    /// Edge length; arrays hold n^4 elements
    #[arg(short = 'n', long = "nelements", default_value_t = 32)]
    nelements: usize,

    /// Spread factor scaling the fastest and slowest tile dimensions
    #[arg(short = 'f', long = "factor", default_value_t = 1)]
    factor: usize,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(err) = init_global_tracing(&TracingConfig::from_env()) {
        eprintln!("warning: tracing disabled: {err}");
    }

    let mut cfg = RunConfig::new(args.nelements);
    cfg.spread = args.factor;
    cfg.report_tiling = true;

    report::print_title("Freshet 4D Tiling-Scan STREAM Benchmark");
    match run_stream::<f64, 4>(&cfg) {
        Ok(failures) => ExitCode::from(failures as u8),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
