use std::f64::consts::PI;

use crate::errors::NetworkError;
use crate::math::{CScalar, Scalar};

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    2.0 * PI * hz
}

/// Kind of lumped part a catalog value describes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Value is a resistance in ohms.
    Resistor,
    /// Value is a capacitance in farads.
    Capacitor,
    /// Value is an inductance in henries.
    Inductor,
}

impl ComponentKind {
    /// Impedance of an ideal part of this kind with the given `value` at
    /// angular frequency `omega` (rad/s).
    ///
    /// A capacitor at DC is an open circuit and has no finite impedance, so it
    /// is rejected.
    pub fn impedance(self, value: Scalar, omega: Scalar) -> Result<CScalar, NetworkError> {
        match self {
            Self::Resistor => Ok(CScalar::new(value, 0.0)),
            Self::Inductor => Ok(CScalar::new(0.0, omega * value)),
            Self::Capacitor => {
                let susceptance = omega * value;
                if susceptance == 0.0 || !susceptance.is_finite() {
                    Err(NetworkError::Catalog(format!(
                        "capacitor of {value} F has no finite impedance at {omega} rad/s"
                    )))
                } else {
                    Ok(CScalar::new(0.0, -1.0 / susceptance))
                }
            }
        }
    }

    /// Whether the impedance depends on frequency.
    #[must_use]
    pub const fn is_reactive(self) -> bool {
        !matches!(self, Self::Resistor)
    }
}
