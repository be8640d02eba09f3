//! Console report
//!
//! The stdout lines here are a stable contract for downstream scripts:
//! banner, memory sizes, validation diagnostics, and the bandwidth table.
//! Validation failures go to stderr. Structured logs stay on the tracing
//! layer and never mix into this output.

use std::mem::size_of;

use freshet_backends::TileShape;

use crate::config::{RunConfig, NTIMES};
use crate::element::Element;
use crate::timing::{Kernel, KernelTimings};
use crate::validate::ValidationReport;

/// Horizontal rule of the classic report layout (61 dashes)
pub const HLINE: &str = "-------------------------------------------------------------";

/// Title banner between horizontal rules
pub fn print_title(title: &str) {
    println!("{HLINE}");
    println!("{title}");
    println!("{HLINE}");
}

/// Protocol and memory-size banner printed before any array work
pub fn print_preamble<E: Element, const R: usize>(cfg: &RunConfig) {
    println!("Reports fastest timing per kernel");
    println!("Creating views...");

    let nelem = (cfg.edge as f64).powi(R as i32);
    println!("Memory Sizes:");
    if R == 1 {
        println!("- Array Size:    {}", cfg.edge);
    } else {
        println!("- Array Size:    {}^{}", cfg.edge, R);
    }
    println!(
        "- Per Array:     {:12.2} MB",
        1.0e-6 * nelem * size_of::<E>() as f64
    );
    println!(
        "- Total:         {:12.2} MB",
        3.0e-6 * nelem * size_of::<E>() as f64
    );
    if cfg.report_tiling {
        println!("- Tiling Factor: {}", cfg.spread);
    }
    println!("Benchmark kernels will be performed for {NTIMES} iterations.");
    println!("{HLINE}");
}

/// Device tile shapes: the substrate's recommendation and the one in use
pub fn print_tiling<const R: usize>(recommended: TileShape<R>, used: TileShape<R>) {
    println!("Recommended tiling: {recommended}");
    println!("Used tiling: {used}");
}

/// Validation diagnostics, per-array failures, and the success line
pub fn print_validation<E: Element>(report: &ValidationReport<E>) {
    println!("ai: {}", report.reference.a);
    println!("a[0]: {}", report.a.first);
    println!("bi: {}", report.reference.b);
    println!("b[0]: {}", report.b.first);
    println!("ci: {}", report.reference.c);
    println!("c[0]: {}", report.c.first);

    println!("aError = {}", report.a.error_sum);
    println!("bError = {}", report.b.error_sum);
    println!("cError = {}", report.c.error_sum);

    println!("aAvgError = {}", report.a.avg_error);
    println!("bAvgError = {}", report.b.avg_error);
    println!("cAvgError = {}", report.c.avg_error);

    for (check, name) in [(&report.a, "a"), (&report.b, "b"), (&report.c, "c")] {
        if check.failed {
            eprintln!("Error: validation check on array {name} failed.");
        }
    }
    if report.failure_count() == 0 {
        println!("All solutions checked and verified.");
    }
}

/// Bandwidth table between horizontal rules
pub fn print_bandwidth_table(timings: &KernelTimings, bytes_per_array: usize) {
    println!("{HLINE}");
    for kernel in Kernel::ALL {
        println!(
            "{}",
            bandwidth_line(kernel, timings.bandwidth_gbs(kernel, bytes_per_array))
        );
    }
    println!("{HLINE}");
}

fn bandwidth_line(kernel: Kernel, gbs: f64) -> String {
    format!("{:<16}{:>11.4} GB/s", kernel.name(), gbs)
}
