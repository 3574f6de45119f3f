//! Shared numerical primitives anchored on `num-complex`.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Sub};

use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for reactive impedances.
pub type CScalar = Complex<Scalar>;

/// Numeric domain an impedance lives in.
///
/// The evaluator and the synthesizer are generic over this trait, so a real
/// expression produces a real result and a complex expression a complex one.
/// Implemented for [`Scalar`] (pure resistances) and [`CScalar`].
pub trait ImpedanceDomain:
    Copy
    + Debug
    + Display
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + 'static
{
    /// Additive identity (a short circuit).
    fn zero() -> Self;

    /// Lifts a real magnitude into this domain.
    fn from_real(value: Scalar) -> Self;

    /// Absolute value `|z|`.
    fn magnitude(self) -> Scalar;

    /// Widens the value into the complex domain.
    fn to_complex(self) -> CScalar;

    /// Returns the value as a real number if it is a strictly positive,
    /// finite resistance. Used to enable bound-based pruning.
    fn as_positive_real(self) -> Option<Scalar>;

    /// True when every component is finite.
    fn is_finite(self) -> bool;

    /// Divides every component by the real `factor` without forming `|factor|²`.
    fn unscale(self, factor: Scalar) -> Self;
}

impl ImpedanceDomain for Scalar {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn from_real(value: Scalar) -> Self {
        value
    }

    #[inline]
    fn magnitude(self) -> Scalar {
        self.abs()
    }

    #[inline]
    fn to_complex(self) -> CScalar {
        Complex::new(self, 0.0)
    }

    #[inline]
    fn as_positive_real(self) -> Option<Scalar> {
        (self > 0.0 && self.is_finite()).then_some(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        Scalar::is_finite(self)
    }

    #[inline]
    fn unscale(self, factor: Scalar) -> Self {
        self / factor
    }
}

impl ImpedanceDomain for CScalar {
    #[inline]
    fn zero() -> Self {
        Complex::new(0.0, 0.0)
    }

    #[inline]
    fn from_real(value: Scalar) -> Self {
        Complex::new(value, 0.0)
    }

    #[inline]
    fn magnitude(self) -> Scalar {
        self.norm()
    }

    #[inline]
    fn to_complex(self) -> CScalar {
        self
    }

    #[inline]
    fn as_positive_real(self) -> Option<Scalar> {
        if self.im == 0.0 {
            self.re.as_positive_real()
        } else {
            None
        }
    }

    #[inline]
    fn is_finite(self) -> bool {
        Complex::is_finite(self)
    }

    #[inline]
    fn unscale(self, factor: Scalar) -> Self {
        Complex::unscale(&self, factor)
    }
}

/// Relative deviation `|value - target| / |target|`.
#[must_use]
pub fn relative_deviation<Z: ImpedanceDomain>(value: Z, target: Z) -> Scalar {
    (value - target).magnitude() / target.magnitude()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn complex_magnitude_matches_norm() {
        let z = CScalar::new(3.0, 4.0);
        assert_relative_eq!(z.magnitude(), 5.0, epsilon = 1.0e-12);
    }

    #[test]
    fn unscale_avoids_squaring_large_factors() {
        let z = CScalar::new(3.0e200, -4.0e200).unscale(1.0e200);
        assert_relative_eq!(z.re, 3.0, max_relative = 1.0e-12);
        assert_relative_eq!(z.im, -4.0, max_relative = 1.0e-12);
        assert_relative_eq!(6.0e-200_f64.unscale(2.0e-200), 3.0, max_relative = 1.0e-12);
    }

    #[test]
    fn positive_real_detection() {
        assert_eq!(47.0_f64.as_positive_real(), Some(47.0));
        assert_eq!((-1.0_f64).as_positive_real(), None);
        assert_eq!(Scalar::INFINITY.as_positive_real(), None);
        assert_eq!(CScalar::new(10.0, 0.0).as_positive_real(), Some(10.0));
        assert_eq!(CScalar::new(10.0, 1.0).as_positive_real(), None);
    }

    #[test]
    fn relative_deviation_is_scale_free() {
        assert_relative_eq!(relative_deviation(101.0, 100.0), 0.01, epsilon = 1.0e-12);
        assert_relative_eq!(
            relative_deviation(CScalar::new(0.0, 99.0), CScalar::new(0.0, 100.0)),
            0.01,
            epsilon = 1.0e-12
        );
    }
}
