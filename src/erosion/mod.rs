//! Relaxation ("erosion") pass
//!
//! Repeated bounded Laplacian averaging over the grid interior: each cell is
//! pulled toward the mean of its four neighbours by `strength`. The boundary
//! ring is never written, so tile edges keep their raw biome values.
//!
//! Every update is a convex mix of the cell and its neighbour mean, so the
//! field's min..max can only shrink from one sweep to the next.

pub mod params;
mod smoothing;

pub use params::{RelaxParams, RelaxationMode};

use crate::tilemap::Tilemap;

/// Statistics from the relaxation pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelaxationStats {
    /// Number of sweeps actually run
    pub iterations: usize,
    /// `max - min` of the field after each sweep
    pub ranges: Vec<f32>,
    /// Largest change applied to any single cell in any sweep
    pub max_change: f32,
}

/// Run the relaxation pass on `heights` in place.
pub fn relax(heights: &mut Tilemap<f32>, params: &RelaxParams) -> RelaxationStats {
    debug_assert!((0.0..=1.0).contains(&params.strength));

    let mut stats = RelaxationStats::default();
    if heights.width < 3 || heights.height < 3 || params.is_identity() {
        return stats;
    }

    for i in 0..params.iterations {
        let change = match params.mode {
            RelaxationMode::InPlace => smoothing::sweep_in_place(heights, params.strength),
            RelaxationMode::Jacobi => smoothing::sweep_jacobi(heights, params.strength),
        };
        let (min_h, max_h) = heights.value_range();

        log::debug!(
            "Relaxation sweep {}: range {:.6}, max change {:.6}",
            i + 1,
            max_h - min_h,
            change
        );

        stats.iterations += 1;
        stats.ranges.push(max_h - min_h);
        stats.max_change = stats.max_change.max(change);
    }

    stats
}
