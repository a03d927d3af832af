//! Abelian point groups and their irreducible representations as blocked by quantum-chemistry
//! packages.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "symmetry_tests.rs"]
mod symmetry_tests;

/// An enumerated type for the Abelian point groups in which orbitals can be blocked.
///
/// Irreducible representations are always listed in Cotton order, which is the order in which
/// Psi4 blocks its matrices and vectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointGroup {
    #[default]
    C1,
    Ci,
    C2,
    Cs,
    D2,
    C2v,
    C2h,
    D2h,
}

impl PointGroup {
    /// Returns all supported point groups.
    pub fn all() -> [PointGroup; 8] {
        [
            PointGroup::C1,
            PointGroup::Ci,
            PointGroup::C2,
            PointGroup::Cs,
            PointGroup::D2,
            PointGroup::C2v,
            PointGroup::C2h,
            PointGroup::D2h,
        ]
    }

    /// Returns the irreducible representation labels in Cotton order.
    pub fn irrep_labels(&self) -> &'static [&'static str] {
        match self {
            PointGroup::C1 => &["A"],
            PointGroup::Ci => &["Ag", "Au"],
            PointGroup::C2 => &["A", "B"],
            PointGroup::Cs => &["A'", "A\""],
            PointGroup::D2 => &["A", "B1", "B2", "B3"],
            PointGroup::C2v => &["A1", "A2", "B1", "B2"],
            PointGroup::C2h => &["Ag", "Bg", "Au", "Bu"],
            PointGroup::D2h => &["Ag", "B1g", "B2g", "B3g", "Au", "B1u", "B2u", "B3u"],
        }
    }

    /// Returns the number of irreducible representations.
    pub fn n_irreps(&self) -> usize {
        self.irrep_labels().len()
    }

    /// Returns the label of the `h`-th irreducible representation, or `?` if `h` is out of
    /// range.
    pub fn irrep_label(&self, h: usize) -> &'static str {
        self.irrep_labels().get(h).copied().unwrap_or("?")
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PointGroup::C1 => "C1",
            PointGroup::Ci => "Ci",
            PointGroup::C2 => "C2",
            PointGroup::Cs => "Cs",
            PointGroup::D2 => "D2",
            PointGroup::C2v => "C2v",
            PointGroup::C2h => "C2h",
            PointGroup::D2h => "D2h",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PointGroup {
    type Err = PointGroupParsingError;

    /// Parses a point-group name case-insensitively, *e.g.* `"d2h"` or `"C2V"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PointGroup::all()
            .into_iter()
            .find(|group| group.to_string().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PointGroupParsingError(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct PointGroupParsingError(pub String);

impl fmt::Display for PointGroupParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unsupported point group `{}`", self.0)
    }
}

impl Error for PointGroupParsingError {}
