//! Element-type abstraction
//!
//! One run uses a single floating-point width throughout. The validator
//! computes its scalar recurrence in the same width so its rounding path
//! matches what the kernels did to the arrays.

use std::fmt::Display;
use std::ops::{Add, Mul};

use bytemuck::Pod;

/// Floating-point element type the kernels and validator run over
pub trait Element:
    Pod + Display + Add<Output = Self> + Mul<Output = Self> + Send + Sync + 'static
{
    /// Machine epsilon of this width, widened for tolerance arithmetic
    const EPSILON: f64;

    /// Short width name for banners and logs
    const NAME: &'static str;

    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl Element for f32 {
    const EPSILON: f64 = f32::EPSILON as f64;
    const NAME: &'static str = "f32";

    #[inline]
    fn from_f64(x: f64) -> Self {
        x as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f64 {
    const EPSILON: f64 = f64::EPSILON;
    const NAME: &'static str = "f64";

    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
