//! Analytic-reference validation
//!
//! Every element of every array should hold the same value after the
//! trials, so correctness reduces to forward-simulating one scalar triple
//! through the trial recurrence and measuring how far the arrays drifted
//! from it. The recurrence runs in the element width, matching the
//! kernels' rounding; error accumulation runs in f64.

use rayon::prelude::*;

use freshet_backends::HostArray;

use crate::config::{AINIT, BINIT, CINIT, NTIMES};
use crate::element::Element;

/// The scalar triple (a, b, c) an ideal run converges to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceState<E: Element> {
    pub a: E,
    pub b: E,
    pub c: E,
}

impl<E: Element> ReferenceState<E> {
    /// Starting state matching the init kernel
    pub fn initial() -> Self {
        Self {
            a: E::from_f64(AINIT),
            b: E::from_f64(BINIT),
            c: E::from_f64(CINIT),
        }
    }

    /// Apply one trial's kernel sequence to the scalars
    ///
    /// The set kernel leaves no trace: the copy that follows overwrites
    /// c before anything reads the set value.
    pub fn advance(&mut self, scalar: E) {
        self.c = self.a;
        self.b = scalar * self.c;
        self.c = self.a + self.b;
        self.a = self.b + scalar * self.c;
    }

    /// State after `trials` full kernel passes
    pub fn after_trials(trials: usize, scalar: E) -> Self {
        let mut state = Self::initial();
        for _ in 0..trials {
            state.advance(scalar);
        }
        state
    }
}

/// Error budget scaled to the trial count and the four ops per trial
pub fn tolerance<E: Element>() -> f64 {
    2.0 * 4.0 * NTIMES as f64 * E::EPSILON
}

/// Validation outcome for one array
#[derive(Debug, Clone, Copy)]
pub struct ArrayCheck<E: Element> {
    /// Element 0, shown next to the reference in the diagnostics
    pub first: E,
    /// Sum of per-element errors that exceeded the tolerance
    pub error_sum: f64,
    /// `error_sum` averaged over every element
    pub avg_error: f64,
    /// Relative average error exceeded the tolerance
    pub failed: bool,
}

/// Validation outcome for the three arrays of a run
#[derive(Debug, Clone, Copy)]
pub struct ValidationReport<E: Element> {
    pub reference: ReferenceState<E>,
    pub epsilon: f64,
    pub a: ArrayCheck<E>,
    pub b: ArrayCheck<E>,
    pub c: ArrayCheck<E>,
}

impl<E: Element> ValidationReport<E> {
    /// Arrays out of tolerance, 0 to 3; doubles as the process exit code
    pub fn failure_count(&self) -> u32 {
        [self.a.failed, self.b.failed, self.c.failed]
            .iter()
            .filter(|&&failed| failed)
            .count() as u32
    }
}

/// Check all three arrays against the forward-simulated reference
pub fn validate<E: Element, const R: usize>(
    a: &HostArray<E, R>,
    b: &HostArray<E, R>,
    c: &HostArray<E, R>,
    scalar: E,
) -> ValidationReport<E> {
    let reference = ReferenceState::after_trials(NTIMES, scalar);
    let epsilon = tolerance::<E>();
    ValidationReport {
        reference,
        epsilon,
        a: check_array(a, reference.a, epsilon),
        b: check_array(b, reference.b, epsilon),
        c: check_array(c, reference.c, epsilon),
    }
}

fn check_array<E: Element, const R: usize>(
    array: &HostArray<E, R>,
    reference: E,
    epsilon: f64,
) -> ArrayCheck<E> {
    let expected = reference.to_f64();
    let error_sum: f64 = array
        .as_slice()
        .par_iter()
        .map(|&x| {
            let err = (x.to_f64() - expected).abs();
            if err > epsilon {
                err
            } else {
                0.0
            }
        })
        .sum();
    let avg_error = error_sum / array.len() as f64;
    ArrayCheck {
        first: array.first(),
        error_sum,
        avg_error,
        failed: (avg_error / expected).abs() > epsilon,
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Arrays filled with the exact reference values for `trials` passes
    fn converged_arrays(
        edge: usize,
        trials: usize,
    ) -> (HostArray<f64, 2>, HostArray<f64, 2>, HostArray<f64, 2>) {
        let state = ReferenceState::<f64>::after_trials(trials, 1.1);
        let mut a = HostArray::cubic(edge);
        let mut b = HostArray::cubic(edge);
        let mut c = HostArray::cubic(edge);
        a.as_mut_slice().fill(state.a);
        b.as_mut_slice().fill(state.b);
        c.as_mut_slice().fill(state.c);
        (a, b, c)
    }

    #[test]
    fn test_recurrence_single_step() {
        let mut state = ReferenceState::<f64>::initial();
        assert_eq!((state.a, state.b, state.c), (1.0, 1.1, 0.0));

        state.advance(1.1);
        let c1 = 1.0;
        let b1 = 1.1 * c1;
        let c2 = 1.0 + b1;
        let a1 = b1 + 1.1 * c2;
        assert_eq!(state.c, c2);
        assert_eq!(state.b, b1);
        assert_eq!(state.a, a1);
    }

    #[test]
    fn test_after_trials_matches_repeated_advance() {
        let mut rolled = ReferenceState::<f32>::initial();
        for _ in 0..NTIMES {
            rolled.advance(1.1_f32);
        }
        let direct = ReferenceState::<f32>::after_trials(NTIMES, 1.1_f32);
        assert_eq!(rolled, direct);
    }

    #[test]
    fn test_tolerance_scales_with_width() {
        assert_eq!(tolerance::<f64>(), 160.0 * f64::EPSILON);
        assert_eq!(tolerance::<f32>(), 160.0 * f32::EPSILON as f64);
    }

    #[test]
    fn test_converged_arrays_verify_clean() {
        let (a, b, c) = converged_arrays(16, NTIMES);
        let report = validate(&a, &b, &c, 1.1);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(report.a.error_sum, 0.0);
        assert_eq!(report.b.error_sum, 0.0);
        assert_eq!(report.c.error_sum, 0.0);
        assert!(!report.a.failed && !report.b.failed && !report.c.failed);
    }

    #[test]
    fn test_corrupted_element_fails_only_its_array() {
        let (a, mut b, c) = converged_arrays(16, NTIMES);
        // Push one element far enough that the diluted average still
        // exceeds the relative tolerance.
        let expected = ReferenceState::<f64>::after_trials(NTIMES, 1.1).b;
        let delta = expected.abs() * tolerance::<f64>() * b.len() as f64 * 4.0;
        b.set([3, 5], expected + delta);

        let report = validate(&a, &b, &c, 1.1);
        assert!(!report.a.failed);
        assert!(report.b.failed);
        assert!(!report.c.failed);
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let (a, mut b, c) = converged_arrays(8, NTIMES);
        let expected = ReferenceState::<f64>::after_trials(NTIMES, 1.1).b;
        b.set([0, 0], expected * 2.0);

        let once = validate(&a, &b, &c, 1.1);
        let twice = validate(&a, &b, &c, 1.1);
        assert_eq!(once.failure_count(), twice.failure_count());
        assert_eq!(once.b.error_sum, twice.b.error_sum);
        assert_eq!(once.b.avg_error, twice.b.avg_error);
    }

    #[test]
    fn test_wrong_trial_count_is_detected() {
        // Arrays converged for 19 passes fail a 20-pass validation.
        let (a, b, c) = converged_arrays(8, NTIMES - 1);
        let report = validate(&a, &b, &c, 1.1);
        assert_eq!(report.failure_count(), 3);
    }

    #[test]
    fn test_report_carries_first_elements() {
        let (a, b, c) = converged_arrays(4, NTIMES);
        let report = validate(&a, &b, &c, 1.1);
        assert_eq!(report.a.first, a.first());
        assert_eq!(report.b.first, b.first());
        assert_eq!(report.c.first, c.first());
        assert_eq!(report.a.first, report.reference.a);
    }
}
