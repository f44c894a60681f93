//! Single relaxation sweeps
//!
//! Both sweeps visit interior cells only (`1..width-1` × `1..height-1`) and
//! return the largest absolute change they applied. Grids narrower than 3
//! cells on either axis have no interior and are left untouched.

use rayon::prelude::*;

use crate::tilemap::Tilemap;

/// Pull `center` toward `average` by `strength`.
///
/// The result is kept between the two inputs so rounding can never push a
/// value outside the field's current range.
fn mix(center: f32, average: f32, strength: f32) -> f32 {
    let lo = center.min(average);
    let hi = center.max(average);
    (center * (1.0 - strength) + average * strength).clamp(lo, hi)
}

/// In-place sweep: x outer, z inner, reading and writing the same buffer.
/// A cell sees the already-updated values of cells visited before it.
pub(crate) fn sweep_in_place(heights: &mut Tilemap<f32>, strength: f32) -> f32 {
    let width = heights.width;
    let height = heights.height;
    let mut max_change = 0.0f32;
    if width < 3 || height < 3 {
        return max_change;
    }

    for x in 1..width - 1 {
        for z in 1..height - 1 {
            let center = *heights.get(x, z);
            let average = heights.neighbor_average(x, z);
            let updated = mix(center, average, strength);
            max_change = max_change.max((updated - center).abs());
            heights.set(x, z, updated);
        }
    }

    max_change
}

/// Double-buffered sweep: every cell reads the previous sweep's values, so
/// rows are independent and run in parallel.
pub(crate) fn sweep_jacobi(heights: &mut Tilemap<f32>, strength: f32) -> f32 {
    if heights.width < 3 || heights.height < 3 {
        return 0.0;
    }
    let snapshot = heights.clone();
    let width = heights.width;
    let last_row = heights.height - 1;

    heights
        .par_rows_mut()
        .filter(|(z, _)| *z > 0 && *z < last_row)
        .map(|(z, row)| {
            let mut max_change = 0.0f32;
            for x in 1..width - 1 {
                let center = *snapshot.get(x, z);
                let updated = mix(center, snapshot.neighbor_average(x, z), strength);
                max_change = max_change.max((updated - center).abs());
                row[x] = updated;
            }
            max_change
        })
        .reduce(|| 0.0, f32::max)
}
