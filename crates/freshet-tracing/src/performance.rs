//! Performance instrumentation for launches and copies
//!
//! Tile dispatch, mirror copies, and the validation sweep report their
//! timings through this module so slow paths show up in the structured
//! logs without touching the stdout report. Spans carry an optional
//! duration threshold so hot launch loops stay quiet unless something is
//! slow; events use a fixed field vocabulary (`event`, `bytes`,
//! `duration_us`) to keep log queries simple. Bandwidth figures are
//! decimal GB/s, the unit the benchmark tables use.
//!
//! ```rust
//! use freshet_tracing::performance::{PerformanceSpan, record_transfer};
//!
//! {
//!     let _span = PerformanceSpan::new("triad_launch", Some(100));
//!     // ... launch ...
//! } // logged on drop, only if it took 100us or more
//!
//! record_transfer(4096, "H2D", 250);
//! ```

use std::time::Instant;

use tracing::Level;

/// RAII guard timing one operation
///
/// Created at the top of the operation, logs its duration on drop. With a
/// threshold set, drops faster than the threshold stay silent.
pub struct PerformanceSpan {
    name: String,
    threshold_us: Option<u64>,
    started: Instant,
    span: tracing::Span,
}

impl PerformanceSpan {
    /// Time `name` at debug level, logging on drop if the duration reaches
    /// `threshold_us` (`None` always logs)
    pub fn new(name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let name = name.into();
        let span = tracing::debug_span!("perf", name = %name);
        Self::assemble(name, threshold_us, span)
    }

    /// Wrap an already-built span
    ///
    /// The completion event fires inside `span`, so extra fields recorded
    /// on it (tile counts, index volumes) stay attached to the timing.
    pub fn from_span(name: impl Into<String>, span: tracing::Span) -> Self {
        Self::assemble(name.into(), None, span)
    }

    /// Time `name` at an explicit level instead of debug
    pub fn with_level(level: Level, name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let name = name.into();
        let span = match level {
            Level::TRACE => tracing::trace_span!("perf", name = %name),
            Level::DEBUG => tracing::debug_span!("perf", name = %name),
            Level::INFO => tracing::info_span!("perf", name = %name),
            Level::WARN => tracing::warn_span!("perf", name = %name),
            Level::ERROR => tracing::error_span!("perf", name = %name),
        };
        Self::assemble(name, threshold_us, span)
    }

    fn assemble(name: String, threshold_us: Option<u64>, span: tracing::Span) -> Self {
        Self {
            name,
            threshold_us,
            started: Instant::now(),
            span,
        }
    }

    /// Microseconds since the guard was created
    pub fn elapsed_us(&self) -> u64 {
        self.started.elapsed().as_micros() as u64
    }

    /// Enter the underlying span so nested events attach to it
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed_us = self.elapsed_us();
        if self.threshold_us.is_none_or(|t| elapsed_us >= t) {
            let _entered = self.span.enter();
            tracing::debug!(
                name = %self.name,
                duration_us = elapsed_us,
                "perf_span_complete"
            );
        }
    }
}

/// Decimal GB/s for a byte volume, zero when the timer was too coarse
fn gb_per_s(bytes: usize, duration_us: u64) -> f64 {
    if duration_us == 0 {
        return 0.0;
    }
    bytes as f64 / (duration_us as f64 * 1e3)
}

/// Millions of elements per second, zero when the timer was too coarse
fn melems_per_s(elements: usize, duration_us: u64) -> f64 {
    if duration_us == 0 {
        return 0.0;
    }
    // One element per microsecond is exactly one Melem/s.
    elements as f64 / duration_us as f64
}

/// Record a device slab allocation
pub fn record_allocation(bytes: usize, space: &str, duration_us: u64) {
    tracing::debug!(
        event = "allocation",
        bytes = bytes,
        space = space,
        duration_us = duration_us,
        "slab_allocated"
    );
}

/// Record a bulk copy between host and device storage
///
/// # Arguments
///
/// * `bytes` - Volume moved
/// * `direction` - `"H2D"` or `"D2H"`
/// * `duration_us` - Copy duration in microseconds
pub fn record_transfer(bytes: usize, direction: &str, duration_us: u64) {
    tracing::debug!(
        event = "transfer",
        bytes = bytes,
        direction = direction,
        duration_us = duration_us,
        gb_per_s = gb_per_s(bytes, duration_us),
        "mirror_copy"
    );
}

/// Record elementwise throughput for one kernel launch
pub fn record_throughput(operation: &str, elements: usize, duration_us: u64) {
    tracing::debug!(
        event = "throughput",
        operation = operation,
        elements = elements,
        duration_us = duration_us,
        melems_per_s = melems_per_s(elements, duration_us),
        "launch_throughput"
    );
}
