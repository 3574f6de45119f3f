//! IEC 60063 preferred-number tables.

use std::str::FromStr;

use crate::errors::NetworkError;

/// Longest two-digit series.
const E24: [u16; 24] = [
    10, 11, 12, 13, 15, 16, 18, 20, 22, 24, 27, 30, //
    33, 36, 39, 43, 47, 51, 56, 62, 68, 75, 82, 91,
];

/// Longest three-digit series.
const E192: [u16; 192] = [
    100, 101, 102, 104, 105, 106, 107, 109, 110, 111, 113, 114, //
    115, 117, 118, 120, 121, 123, 124, 126, 127, 129, 130, 132, //
    133, 135, 137, 138, 140, 142, 143, 145, 147, 149, 150, 152, //
    154, 156, 158, 160, 162, 164, 165, 167, 169, 172, 174, 176, //
    178, 180, 182, 184, 187, 189, 191, 193, 196, 198, 200, 203, //
    205, 208, 210, 213, 215, 218, 221, 223, 226, 229, 232, 234, //
    237, 240, 243, 246, 249, 252, 255, 258, 261, 264, 267, 271, //
    274, 277, 280, 284, 287, 291, 294, 297, 301, 305, 309, 312, //
    316, 320, 324, 328, 332, 336, 340, 344, 348, 352, 357, 361, //
    365, 370, 374, 379, 383, 388, 392, 397, 402, 407, 412, 417, //
    422, 427, 432, 437, 442, 448, 453, 459, 464, 470, 475, 481, //
    487, 493, 499, 505, 511, 517, 523, 530, 536, 542, 549, 556, //
    562, 569, 576, 583, 590, 597, 604, 612, 619, 626, 634, 642, //
    649, 657, 665, 673, 681, 690, 698, 706, 715, 723, 732, 741, //
    750, 759, 768, 777, 787, 796, 806, 816, 825, 835, 845, 856, //
    866, 876, 887, 898, 909, 920, 931, 942, 953, 965, 976, 988,
];

/// Standard E-series of preferred values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ESeries {
    /// 3 values per decade (±40 %).
    E3,
    /// 6 values per decade (±20 %).
    E6,
    /// 12 values per decade (±10 %).
    E12,
    /// 24 values per decade (±5 %).
    E24,
    /// 48 values per decade (±2 %).
    E48,
    /// 96 values per decade (±1 %).
    E96,
    /// 192 values per decade (±0.5 %).
    E192,
}

impl ESeries {
    /// Every series, coarsest first.
    pub const ALL: [Self; 7] = [
        Self::E3,
        Self::E6,
        Self::E12,
        Self::E24,
        Self::E48,
        Self::E96,
        Self::E192,
    ];

    /// Values per decade.
    #[must_use]
    pub const fn per_decade(self) -> usize {
        match self {
            Self::E3 => 3,
            Self::E6 => 6,
            Self::E12 => 12,
            Self::E24 => 24,
            Self::E48 => 48,
            Self::E96 => 96,
            Self::E192 => 192,
        }
    }

    /// Integer significands of one decade, ascending (`[10, 15, 22, ...]` for E6).
    ///
    /// Shorter series are every n-th entry of E24 or E192.
    #[must_use]
    pub fn significands(self) -> Vec<u16> {
        let base: &[u16] = match self {
            Self::E3 | Self::E6 | Self::E12 | Self::E24 => &E24,
            Self::E48 | Self::E96 | Self::E192 => &E192,
        };
        let stride = base.len() / self.per_decade();
        base.iter().step_by(stride).copied().collect()
    }
}

impl std::fmt::Display for ESeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.per_decade())
    }
}

impl FromStr for ESeries {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|series| series.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NetworkError::Catalog(format!("unknown E-series '{s}'")))
    }
}
