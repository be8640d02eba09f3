//! Minimum-of-N timing protocol
//!
//! Transient system noise can only slow a trial down, never speed it up,
//! so the fastest of the twenty trials is the best estimate of achievable
//! bandwidth. State is a plain per-run record, nothing global.

/// One timed kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    Set,
    Copy,
    Scale,
    Add,
    Triad,
}

impl Kernel {
    /// Trial and report order
    pub const ALL: [Kernel; 5] = [
        Kernel::Set,
        Kernel::Copy,
        Kernel::Scale,
        Kernel::Add,
        Kernel::Triad,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Kernel::Set => "Set",
            Kernel::Copy => "Copy",
            Kernel::Scale => "Scale",
            Kernel::Add => "Add",
            Kernel::Triad => "Triad",
        }
    }

    /// Whole arrays moved per element sweep
    pub const fn arrays_moved(self) -> usize {
        match self {
            Kernel::Set => 1,
            Kernel::Copy | Kernel::Scale => 2,
            Kernel::Add | Kernel::Triad => 3,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Fastest observed duration per kernel across a run's trials
#[derive(Debug, Clone)]
pub struct KernelTimings {
    min_seconds: [f64; 5],
}

impl KernelTimings {
    pub fn new() -> Self {
        Self {
            min_seconds: [f64::INFINITY; 5],
        }
    }

    /// Keep `seconds` if it beats the current minimum for `kernel`
    pub fn record(&mut self, kernel: Kernel, seconds: f64) {
        let slot = &mut self.min_seconds[kernel.index()];
        if seconds < *slot {
            *slot = seconds;
        }
    }

    /// Fastest duration seen so far; infinite before the first record
    pub fn min_seconds(&self, kernel: Kernel) -> f64 {
        self.min_seconds[kernel.index()]
    }

    /// Sustained bandwidth in GB/s for `kernel`
    ///
    /// `bytes_per_array` is the byte size of one array, so the moved volume
    /// is that times the kernel's array count.
    pub fn bandwidth_gbs(&self, kernel: Kernel, bytes_per_array: usize) -> f64 {
        1.0e-9 * kernel.arrays_moved() as f64 * bytes_per_array as f64
            / self.min_seconds(kernel)
    }
}

impl Default for KernelTimings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retains_the_minimum_duration() {
        let mut timings = KernelTimings::new();
        for seconds in [5.0, 3.0, 8.0, 3.0, 9.0, 4.0] {
            timings.record(Kernel::Triad, seconds);
        }
        assert_eq!(timings.min_seconds(Kernel::Triad), 3.0);
    }

    #[test]
    fn test_unrecorded_kernel_is_infinite() {
        let timings = KernelTimings::new();
        assert!(timings.min_seconds(Kernel::Copy).is_infinite());
        assert_eq!(timings.bandwidth_gbs(Kernel::Copy, 1024), 0.0);
    }

    #[test]
    fn test_kernels_are_independent() {
        let mut timings = KernelTimings::new();
        timings.record(Kernel::Set, 2.0);
        timings.record(Kernel::Add, 1.0);
        assert_eq!(timings.min_seconds(Kernel::Set), 2.0);
        assert_eq!(timings.min_seconds(Kernel::Add), 1.0);
        assert!(timings.min_seconds(Kernel::Scale).is_infinite());
    }

    #[test]
    fn test_bandwidth_applies_array_multipliers() {
        let mut timings = KernelTimings::new();
        for kernel in Kernel::ALL {
            timings.record(kernel, 0.5);
        }
        // One array of 1e9 bytes in half a second: 2 GB/s per array moved.
        let bytes = 1_000_000_000;
        assert_eq!(timings.bandwidth_gbs(Kernel::Set, bytes), 2.0);
        assert_eq!(timings.bandwidth_gbs(Kernel::Copy, bytes), 4.0);
        assert_eq!(timings.bandwidth_gbs(Kernel::Scale, bytes), 4.0);
        assert_eq!(timings.bandwidth_gbs(Kernel::Add, bytes), 6.0);
        assert_eq!(timings.bandwidth_gbs(Kernel::Triad, bytes), 6.0);
    }

    #[test]
    fn test_report_order_is_stable() {
        let names: Vec<&str> = Kernel::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["Set", "Copy", "Scale", "Add", "Triad"]);
    }
}
