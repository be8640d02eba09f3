//! Rank-one STREAM driver over `f32` arrays.

use std::process::ExitCode;

use clap::Parser;
use freshet_core::{report, run_stream, InitFlow, RunConfig};
use freshet_tracing::{init_global_tracing, TracingConfig};

/// Memory bandwidth benchmark over one-dimensional f32 arrays.
///
/// Runs the set/copy/scale/add/triad kernel suite for twenty trials,
/// checks the final data against the kernel recurrence, and reports the
/// fastest sustained bandwidth per kernel. The exit code is the number
/// of arrays that failed validation.
#[derive(Parser, Debug)]
#[command(name = "stream1d", version)]
struct Cli {
    /// Elements per array
    #[arg(short = 'n', long = "nelements", default_value_t = 1 << 26)]
    nelements: usize,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    // A benchmark run still makes sense without a subscriber
    if let Err(err) = init_global_tracing(&TracingConfig::from_env()) {
        eprintln!("warning: tracing disabled: {err}");
    }

    let mut cfg = RunConfig::new(args.nelements);
    cfg.init_flow = InitFlow::HostThenCopy;

    report::print_title("Freshet STREAM Benchmark");
    match run_stream::<f32, 1>(&cfg) {
        Ok(failures) => ExitCode::from(failures as u8),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
