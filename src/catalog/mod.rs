//! Catalogs of standard component values.
//!
//! A catalog is one decade of preferred significands replicated over every
//! decade intersecting a `[min, max]` range, ordered by ascending magnitude.
//! It is built once and shared read-only by every search.

/// Lumped component kinds and their impedance.
pub mod component;
/// E-series preferred-number tables.
pub mod series;

pub use component::{angular_frequency, ComponentKind};
pub use series::ESeries;

use crate::errors::NetworkError;
use crate::math::{CScalar, Scalar};

/// Default lower bound of a catalog (10 Ω).
pub const DEFAULT_MIN: Scalar = 10.0;
/// Default upper bound of a catalog (10 MΩ).
pub const DEFAULT_MAX: Scalar = 10.0e6;

/// One standard value: `significand × 10^exponent`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    /// Integer significand from the series table (e.g. `47`).
    pub significand: u16,
    /// Decade exponent applied to the significand.
    pub exponent: i32,
    /// Resulting magnitude.
    pub magnitude: Scalar,
}

impl CatalogEntry {
    /// Builds an entry, computing the magnitude without rounding drift:
    /// positive exponents scale an integer exactly and negative ones are a
    /// single correctly rounded division.
    #[must_use]
    pub fn new(significand: u16, exponent: i32) -> Self {
        let s = Scalar::from(significand);
        let magnitude = if exponent >= 0 {
            s * 10f64.powi(exponent)
        } else {
            s / 10f64.powi(-exponent)
        };
        Self {
            significand,
            exponent,
            magnitude,
        }
    }

    /// Decade multiplier `10^exponent`.
    #[must_use]
    pub fn multiplier(&self) -> Scalar {
        10f64.powi(self.exponent)
    }
}

/// Ordered set of standard magnitudes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    magnitudes: Vec<Scalar>,
}

impl Catalog {
    /// Replicates `series` over the decades covering `[min, max]`.
    pub fn new(series: ESeries, min: Scalar, max: Scalar) -> Result<Self, NetworkError> {
        Self::from_significands(&series.significands(), min, max)
    }

    /// Replicates a custom table of integer significands over `[min, max]`.
    pub fn from_significands(
        significands: &[u16],
        min: Scalar,
        max: Scalar,
    ) -> Result<Self, NetworkError> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(NetworkError::Catalog(format!(
                "invalid catalog range [{min}, {max}]"
            )));
        }
        if significands.is_empty() || significands.contains(&0) {
            return Err(NetworkError::Catalog(
                "significand table must be non-empty and free of zeros".into(),
            ));
        }
        let catalog = Self::replicate(significands, min, max);
        if catalog.is_empty() {
            return Err(NetworkError::Catalog(format!(
                "no standard value lies within [{min}, {max}]"
            )));
        }
        Ok(catalog)
    }

    fn replicate(significands: &[u16], min: Scalar, max: Scalar) -> Self {
        let widest = significands.iter().copied().max().unwrap_or(1);
        let digits = i32::try_from(widest.ilog10()).unwrap_or(0);
        // Lowest exponent whose largest value can still reach `min`.
        let first = min.log10().floor() as i32 - digits - 1;
        let last = max.log10().ceil() as i32 + 1;

        let mut entries: Vec<CatalogEntry> = (first..=last)
            .flat_map(|exponent| {
                significands
                    .iter()
                    .map(move |&significand| CatalogEntry::new(significand, exponent))
            })
            .filter(|entry| entry.magnitude >= min && entry.magnitude <= max)
            .collect();
        entries.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude));
        entries.dedup_by(|a, b| a.magnitude == b.magnitude);

        let magnitudes = entries.iter().map(|e| e.magnitude).collect();
        Self {
            entries,
            magnitudes,
        }
    }

    /// Entries in ascending magnitude.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Magnitudes in ascending order.
    #[must_use]
    pub fn magnitudes(&self) -> &[Scalar] {
        &self.magnitudes
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in ascending magnitude.
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    /// Smallest value.
    #[must_use]
    pub fn min(&self) -> Option<Scalar> {
        self.magnitudes.first().copied()
    }

    /// Largest value.
    #[must_use]
    pub fn max(&self) -> Option<Scalar> {
        self.magnitudes.last().copied()
    }

    /// Entry closest to `value`; ties go to the smaller one.
    #[must_use]
    pub fn nearest(&self, value: Scalar) -> Option<&CatalogEntry> {
        let idx = self.magnitudes.partition_point(|&m| m < value);
        let below = idx.checked_sub(1).and_then(|i| self.entries.get(i));
        let above = self.entries.get(idx);
        match (below, above) {
            (Some(lo), Some(hi)) => {
                if (value - lo.magnitude).abs() <= (hi.magnitude - value).abs() {
                    Some(lo)
                } else {
                    Some(hi)
                }
            }
            (lo, hi) => lo.or(hi),
        }
    }

    /// Impedances of the catalog values interpreted as parts of `kind` at
    /// angular frequency `omega`, in catalog order.
    pub fn impedances(
        &self,
        kind: ComponentKind,
        omega: Scalar,
    ) -> Result<Vec<CScalar>, NetworkError> {
        self.magnitudes
            .iter()
            .map(|&value| kind.impedance(value, omega))
            .collect()
    }
}

impl Default for Catalog {
    /// E6 resistors from 10 Ω to 10 MΩ.
    fn default() -> Self {
        Self::replicate(&ESeries::E6.significands(), DEFAULT_MIN, DEFAULT_MAX)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn default_catalog_spans_ten_ohm_to_ten_megohm() {
        let catalog = Catalog::default();
        assert_eq!(catalog.min(), Some(10.0));
        assert_eq!(catalog.max(), Some(10.0e6));
        // Six decades of six values plus the closing 10 MΩ.
        assert_eq!(catalog.len(), 37);
        assert!(catalog.magnitudes().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn magnitudes_are_exact() {
        let catalog = Catalog::new(ESeries::E6, 10.0, 10.0e6).unwrap();
        assert!(catalog.magnitudes().contains(&47_000.0));
        assert!(catalog.magnitudes().contains(&100_000.0));
        assert!(catalog.magnitudes().contains(&220_000.0));
        let entry = catalog.nearest(47_000.0).unwrap();
        assert_eq!((entry.significand, entry.exponent), (47, 3));
        assert_eq!(entry.multiplier(), 1000.0);
    }

    #[test]
    fn sub_unit_values_use_negative_exponents() {
        let catalog = Catalog::new(ESeries::E3, 0.1, 1.0).unwrap();
        assert_eq!(catalog.magnitudes(), &[0.1, 0.22, 0.47, 1.0]);
    }

    #[test]
    fn three_digit_series_replicates() {
        let catalog = Catalog::new(ESeries::E192, 100.0, 999.0).unwrap();
        assert_eq!(catalog.len(), 192);
        assert_eq!(catalog.max(), Some(988.0));
    }

    #[test]
    fn nearest_picks_closest_neighbour() {
        let catalog = Catalog::default();
        assert_eq!(catalog.nearest(88_120.0).unwrap().magnitude, 100_000.0);
        assert_eq!(catalog.nearest(1.0).unwrap().magnitude, 10.0);
        assert_eq!(catalog.nearest(1.0e9).unwrap().magnitude, 10.0e6);
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(Catalog::new(ESeries::E6, 0.0, 10.0).is_err());
        assert!(Catalog::new(ESeries::E6, 100.0, 10.0).is_err());
        assert!(Catalog::new(ESeries::E6, 11.0, 14.0).is_err());
        assert!(Catalog::from_significands(&[], 1.0, 10.0).is_err());
    }

    #[test]
    fn reactive_impedances_follow_catalog_order() {
        let catalog = Catalog::new(ESeries::E3, 1.0e-3, 4.7e-3).unwrap();
        let z = catalog.impedances(ComponentKind::Inductor, 1.0e3).unwrap();
        assert_eq!(z.len(), 3);
        assert_relative_eq!(z[0].im, 1.0, max_relative = 1.0e-12);
        assert_relative_eq!(z[2].im, 4.7, max_relative = 1.0e-12);
    }
}
