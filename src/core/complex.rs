/// A single-precision complex amplitude.
///
/// The state vector keeps real and imaginary parts in separate buffers; this
/// type is the value handed out when callers read one amplitude, and the
/// element type used when building gate descriptors from matrices.
use std::fmt;

#[derive(Debug, Clone, Copy, Default)]
pub struct Complex {
    pub re: f32,
    pub im: f32,
}

impl Complex {
    #[inline(always)]
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    #[inline(always)]
    pub const fn one() -> Self {
        Self { re: 1.0, im: 0.0 }
    }

    /// Imaginary unit i
    #[inline(always)]
    pub const fn i() -> Self {
        Self { re: 0.0, im: 1.0 }
    }

    /// Exact component-wise equality (no tolerance).
    #[inline(always)]
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.re == other.re && self.im == other.im
    }
}

/// Approximate equality, tolerance 1e-6 per component.
impl PartialEq for Complex {
    fn eq(&self, other: &Self) -> bool {
        (self.re - other.re).abs() < 1e-6 && (self.im - other.im).abs() < 1e-6
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im >= 0.0 {
            write!(f, "{:.6} + {:.6}i", self.re, self.im)
        } else {
            write!(f, "{:.6} - {:.6}i", self.re, self.im.abs())
        }
    }
}
