//! Rank-two STREAM driver over square `f64` ranges.

use std::process::ExitCode;

use clap::Parser;
use freshet_core::{report, run_stream, RunConfig};
use freshet_tracing::{init_global_tracing, TracingConfig};

/// Memory bandwidth benchmark over two-dimensional f64 arrays.
///
/// Arrays span an n-by-n index range and host and device copies are
/// initialized by independent launches. The exit code is the number of
/// arrays that failed validation.
#[derive(Parser, Debug)]
#[command(name = "stream2d", version)]
struct Cli {
    /// Edge length; arrays hold n^2 elements
    #[arg(short = 'n', long = "nelements", default_value_t = 1024)]
    nelements: usize,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(err) = init_global_tracing(&TracingConfig::from_env()) {
        eprintln!("warning: tracing disabled: {err}");
    }

    let cfg = RunConfig::new(args.nelements);

    report::print_title("Freshet 2D Tiled-Range STREAM Benchmark");
    match run_stream::<f64, 2>(&cfg) {
        Ok(failures) => ExitCode::from(failures as u8),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
