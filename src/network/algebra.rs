use crate::errors::{DegenerateNetwork, EvalError};
use crate::math::{ImpedanceDomain, Scalar};

/// Binary composition rule joining two sub-networks.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// Series connection (impedances add linearly).
    Series,
    /// Parallel connection (product over sum).
    Parallel,
}

impl Operator {
    /// Both operators in search order.
    pub const ALL: [Self; 2] = [Self::Series, Self::Parallel];

    /// Textual symbol used when rendering networks.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Series => "+",
            Self::Parallel => "||",
        }
    }

    /// Combines `a` and `b` with this rule.
    #[inline]
    pub fn apply<Z: ImpedanceDomain>(self, a: Z, b: Z) -> Result<Z, DegenerateNetwork> {
        match self {
            Self::Series => Ok(series(a, b)),
            Self::Parallel => parallel(a, b),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Equivalent impedance of `a` and `b` in series.
#[inline]
#[must_use]
pub fn series<Z: ImpedanceDomain>(a: Z, b: Z) -> Z {
    a + b
}

/// Equivalent impedance of `a` and `b` in parallel, `a·b / (a + b)`.
///
/// Evaluated as `small / (1 + small/big)` with every division taken between
/// unit-scaled operands, so finite inputs anywhere in the `f64` range neither overflow the
/// product nor underflow to zero. Fails when `|a + b| <= ε·max(|a|, |b|)`,
/// which for passive parts only happens with zero-valued operands or a
/// resonant L/C pair.
#[inline]
pub fn parallel<Z: ImpedanceDomain>(a: Z, b: Z) -> Result<Z, DegenerateNetwork> {
    let (big, small) = if b.magnitude() > a.magnitude() { (b, a) } else { (a, b) };
    let scale = big.magnitude();
    if scale == 0.0 {
        return Err(DegenerateNetwork);
    }
    let ratio = small.unscale(scale) / big.unscale(scale);
    let denominator = Z::from_real(1.0) + ratio;
    let norm = denominator.magnitude();
    if norm <= Scalar::EPSILON {
        return Err(DegenerateNetwork);
    }
    Ok(small.unscale(norm) / denominator.unscale(norm))
}

/// Applies `op` at postfix index `position`, mapping failures to [`EvalError`].
///
/// A finite pair whose combination is not representable is reported as
/// [`EvalError::Overflow`] rather than passed on as an infinity.
#[inline]
pub(crate) fn combine_at<Z: ImpedanceDomain>(
    op: Operator,
    a: Z,
    b: Z,
    position: usize,
) -> Result<Z, EvalError> {
    let value = op
        .apply(a, b)
        .map_err(|_| EvalError::DegenerateNetwork { position })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Overflow { position })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::CScalar;

    const REALS: [Scalar; 6] = [1.0, 2.2, 47.0, 1.0e3, 6.8e6, -15.0];

    fn complexes() -> Vec<CScalar> {
        vec![
            CScalar::new(1.0, 0.0),
            CScalar::new(0.0, 1.0),
            CScalar::new(50.0, -20.0),
            CScalar::new(-3.0, 7.5),
        ]
    }

    #[test]
    fn series_and_parallel_commute_for_reals() {
        for &a in &REALS {
            for &b in &REALS {
                assert_relative_eq!(series(a, b), series(b, a));
                if let (Ok(x), Ok(y)) = (parallel(a, b), parallel(b, a)) {
                    assert_relative_eq!(x, y, max_relative = 1.0e-12);
                }
            }
        }
    }

    #[test]
    fn series_and_parallel_commute_for_complex() {
        let values = complexes();
        for &a in &values {
            for &b in &values {
                let (s1, s2) = (series(a, b), series(b, a));
                assert_relative_eq!(s1.re, s2.re);
                assert_relative_eq!(s1.im, s2.im);
                let (p1, p2) = (parallel(a, b).unwrap(), parallel(b, a).unwrap());
                assert_relative_eq!(p1.re, p2.re, epsilon = 1.0e-12);
                assert_relative_eq!(p1.im, p2.im, epsilon = 1.0e-12);
            }
        }
    }

    #[test]
    fn parallel_of_equal_values_halves() {
        for &a in &REALS {
            assert_relative_eq!(parallel(a, a).unwrap(), a / 2.0, max_relative = 1.0e-12);
        }
        for a in complexes() {
            let p = parallel(a, a).unwrap();
            assert_relative_eq!(p.re, a.re / 2.0, epsilon = 1.0e-12);
            assert_relative_eq!(p.im, a.im / 2.0, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn series_with_short_is_identity() {
        for &a in &REALS {
            assert_eq!(series(a, 0.0), a);
        }
        for a in complexes() {
            assert_eq!(series(a, CScalar::zero()), a);
        }
    }

    #[test]
    fn cancelling_operands_are_degenerate() {
        for &a in &REALS {
            assert_eq!(parallel(a, -a), Err(DegenerateNetwork));
        }
        for a in complexes() {
            assert_eq!(parallel(a, -a), Err(DegenerateNetwork));
        }
        assert_eq!(parallel(0.0, 0.0), Err(DegenerateNetwork));
    }

    #[test]
    fn resonant_lc_pair_is_degenerate() {
        let inductor = CScalar::new(0.0, 100.0);
        let capacitor = CScalar::new(0.0, -100.0);
        assert_eq!(Operator::Parallel.apply(inductor, capacitor), Err(DegenerateNetwork));
        let series_lc = Operator::Series.apply(inductor, capacitor).unwrap();
        assert_relative_eq!(series_lc.norm(), 0.0);
    }

    #[test]
    fn parallel_keeps_extreme_magnitudes_in_range() {
        assert_relative_eq!(parallel(1.0e200, 1.0e200).unwrap(), 5.0e199, max_relative = 1.0e-12);
        assert_relative_eq!(parallel(1.0e-200, 1.0e-200).unwrap(), 5.0e-201, max_relative = 1.0e-12);
        assert_relative_eq!(parallel(1.0e200, 1.0e-200).unwrap(), 1.0e-200, max_relative = 1.0e-12);
        assert_relative_eq!(parallel(1.0e300, 3.0e300).unwrap(), 7.5e299, max_relative = 1.0e-12);

        let z = parallel(CScalar::new(1.0e200, 0.0), CScalar::new(0.0, 1.0e200)).unwrap();
        assert_relative_eq!(z.re, 5.0e199, max_relative = 1.0e-12);
        assert_relative_eq!(z.im, 5.0e199, max_relative = 1.0e-12);
        let big = CScalar::new(Scalar::MAX, 0.0);
        assert_relative_eq!(parallel(big, big).unwrap().re, Scalar::MAX / 2.0, max_relative = 1.0e-12);
        let z = parallel(CScalar::new(0.0, 2.0e-200), CScalar::new(0.0, 2.0e-200)).unwrap();
        assert_relative_eq!(z.im, 1.0e-200, max_relative = 1.0e-12);
    }

    #[test]
    fn parallel_with_a_short_is_a_short() {
        assert_eq!(parallel(0.0, 47.0), Ok(0.0));
        assert_eq!(parallel(CScalar::new(0.0, 5.0), CScalar::zero()), Ok(CScalar::zero()));
    }

    #[test]
    fn unrepresentable_series_is_an_overflow() {
        assert_eq!(
            combine_at(Operator::Series, Scalar::MAX, Scalar::MAX, 2),
            Err(EvalError::Overflow { position: 2 })
        );
        assert_eq!(
            combine_at(Operator::Parallel, 5.0, -5.0, 4),
            Err(EvalError::DegenerateNetwork { position: 4 })
        );
        assert_relative_eq!(combine_at(Operator::Parallel, 3.0e200, 3.0e200, 2).unwrap(), 1.5e200, max_relative = 1.0e-12);
    }

    #[test]
    fn parallel_with_complex_operands() {
        let z = parallel(CScalar::new(1.0, 0.0), CScalar::new(0.0, 1.0)).unwrap();
        assert_relative_eq!(z.re, 0.5, epsilon = 1.0e-12);
        assert_relative_eq!(z.im, 0.5, epsilon = 1.0e-12);
        assert_relative_eq!(parallel(1.0, 2.0).unwrap(), 2.0 / 3.0, epsilon = 1.0e-12);
    }
}
