//! Relaxation parameters and configuration

use serde::{Deserialize, Serialize};

/// Sweep discipline of the relaxation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelaxationMode {
    /// Single buffer, x-major scan. Later cells see neighbours already
    /// updated in the same sweep. Sequential and bit-reproducible.
    #[default]
    InPlace,
    /// Double-buffered: every cell reads the previous sweep. Rows run in
    /// parallel. Values differ slightly from `InPlace`.
    Jacobi,
}

impl std::fmt::Display for RelaxationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InPlace => write!(f, "in-place"),
            Self::Jacobi => write!(f, "jacobi"),
        }
    }
}

/// Relaxation pass parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxParams {
    /// Mix coefficient toward the neighbour mean (0.0-1.0)
    /// 0 leaves the field untouched, 1 replaces each cell with the mean
    pub strength: f32,

    /// Number of sweeps over the interior
    pub iterations: u32,

    pub mode: RelaxationMode,
}

impl RelaxParams {
    /// True when running the pass cannot change any value.
    pub fn is_identity(&self) -> bool {
        self.iterations == 0 || self.strength == 0.0
    }
}
