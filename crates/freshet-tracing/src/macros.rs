//! Convenience macros for performance tracing
//!
//! Thin wrappers around [`crate::performance`] that capture launch fields
//! and timing without cluttering the dispatch path.

/// Create a performance span with automatic field capture.
///
/// Returns a [`crate::performance::PerformanceSpan`] guard that logs its
/// duration when dropped. Extra fields (tile counts, index volumes) ride
/// on the underlying span, so they stay attached to the completion event.
///
/// # Example
///
/// ```rust
/// use freshet_tracing::perf_span;
///
/// {
///     let _span = perf_span!("triad", indices = 1024, tiles = 64);
///     // ... launch code ...
/// } // duration logged on drop
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        $crate::performance::PerformanceSpan::from_span(
            $name,
            tracing::debug_span!(
                "perf",
                name = $name,
                $($field = $value),+
            ),
        )
    }};
}

/// Emit a standardized performance event at debug level.
///
/// # Example
///
/// ```rust
/// use freshet_tracing::perf_event;
///
/// perf_event!("trial_complete", trial = 7, duration_us = 150);
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        tracing::debug!(
            event = $name,
            $($field = $value),+
        );
    };
}

/// Run a block under a timer, yielding `(result, duration_us)`.
///
/// The duration is also logged as a debug event named after the block.
///
/// # Example
///
/// ```rust
/// use freshet_tracing::timed_block;
///
/// let (sum, duration_us) = timed_block!("sum", {
///     (1..=100).sum::<i32>()
/// });
/// assert_eq!(sum, 5050);
/// let _ = duration_us;
/// ```
#[macro_export]
macro_rules! timed_block {
    ($name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration_us = start.elapsed().as_micros() as u64;
        tracing::debug!(
            operation = $name,
            duration_us = duration_us,
            duration_ms = duration_us as f64 / 1000.0,
            "timed_block_complete"
        );
        (result, duration_us)
    }};
}
