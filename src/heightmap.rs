//! Heightfield generation
//!
//! Pipeline, leaves first:
//! 1. Seed the gradient-noise primitive and draw the octave-offset table
//! 2. Per cell: shaping fBm -> biome -> biome-specific elevation recipe
//! 3. Relaxation sweeps over the interior
//! 4. Packaging into `[0, 1]` and hand-off with the world-size triple
//!
//! The per-cell pass has no dependencies between cells and runs across
//! rows in parallel; every worker reads the same immutable offset table, so
//! the output does not depend on scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::biomes::{classify, Biome, BiomeCounts, BiomeThresholds};
use crate::config::{OutputRange, TerrainConfig};
use crate::erosion::{self, RelaxationStats};
use crate::error::Result;
use crate::fractal::{blend, TerrainNoise};
use crate::tilemap::Tilemap;

/// World-space extent handed to the renderer: `(W, elevation, H)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: f32,
    pub elevation: f32,
    pub height: f32,
}

impl WorldSize {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            width: config.grid_width as f32,
            elevation: config.grid_elevation,
            height: config.grid_height as f32,
        }
    }
}

/// Summary of one generation run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationReport {
    pub biomes: BiomeCounts,
    /// Cells whose raw biome value fell outside `[0, 1]` and were clamped
    pub clamped_cells: usize,
    pub relaxation: RelaxationStats,
    /// Value range of the packaged field
    pub min_height: f32,
    pub max_height: f32,
}

/// A finished `W × H` elevation grid with values in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct Heightfield {
    pub heights: Tilemap<f32>,
    pub world_size: WorldSize,
    pub report: GenerationReport,
}

impl Heightfield {
    pub fn width(&self) -> usize {
        self.heights.width
    }

    pub fn height(&self) -> usize {
        self.heights.height
    }

    pub fn get(&self, x: usize, z: usize) -> f32 {
        *self.heights.get(x, z)
    }
}

/// Consumer of a finished heightfield (a renderer, an exporter, ...).
pub trait TerrainSink {
    fn set_heights(&mut self, world_size: WorldSize, heights: &Tilemap<f32>) -> Result<()>;
}

/// Shaping coordinate of grid cell `(x, z)`.
pub fn shaping_coord(config: &TerrainConfig, x: usize, z: usize) -> (f64, f64) {
    (x as f64 / config.scale_factor, z as f64 / config.scale_factor)
}

/// Biome and raw (unclamped) elevation of one cell.
pub fn cell_elevation(
    noise: &TerrainNoise,
    config: &TerrainConfig,
    x: usize,
    z: usize,
) -> (Biome, f64) {
    let (cx, cz) = shaping_coord(config, x, z);
    let shaping = noise.fbm(cx, cz, config.lacunarity, config.persistence);
    let biome = classify(shaping, &thresholds(config));

    let value = match biome {
        Biome::Plains => noise.fbm(cx, cz, config.plains_lacunarity, config.plains_persistence),
        Biome::Lake => 0.0,
        Biome::Mountain => {
            let ridges = noise.fbm(cx, cz, config.mountain_lacunarity, config.mountain_persistence);
            let cells = noise.voronoi(
                cx,
                cz,
                config.mountain_voronoi_frequency,
                config.mountain_voronoi_amplitude,
            );
            blend(ridges, cells)
        }
    };

    (biome, value)
}

fn thresholds(config: &TerrainConfig) -> BiomeThresholds {
    BiomeThresholds {
        plains: config.plains_threshold,
        lake: config.lake_threshold,
    }
}

/// Raw biome field: every cell's elevation clamped into `[0, 1]`, before
/// relaxation.
pub fn generate_raw(config: &TerrainConfig) -> Result<(Tilemap<f32>, BiomeCounts, usize)> {
    config.validate()?;
    let mut heights = Tilemap::try_new_with(config.grid_width, config.grid_height, 0.0f32)?;
    let noise = TerrainNoise::new(config);

    let fill_row = |(z, row): (usize, &mut [f32])| {
        let mut counts = BiomeCounts::default();
        let mut clamped = 0usize;
        for (x, cell) in row.iter_mut().enumerate() {
            let (biome, value) = cell_elevation(&noise, config, x, z);
            counts.record(biome);
            if !(0.0..=1.0).contains(&value) {
                clamped += 1;
            }
            *cell = value.clamp(0.0, 1.0) as f32;
        }
        (counts, clamped)
    };
    let merge = |a: (BiomeCounts, usize), b: (BiomeCounts, usize)| (a.0.merge(b.0), a.1 + b.1);

    let (counts, clamped) = if config.parallel {
        heights
            .par_rows_mut()
            .map(fill_row)
            .reduce(|| (BiomeCounts::default(), 0), merge)
    } else {
        heights.rows_mut().map(fill_row).fold((BiomeCounts::default(), 0), merge)
    };

    Ok((heights, counts, clamped))
}

/// Biome label of every cell. Labels are not kept by [`generate`]; this
/// recomputes them for inspection.
pub fn classify_biomes(config: &TerrainConfig) -> Result<Tilemap<Biome>> {
    config.validate()?;
    let mut biomes =
        Tilemap::try_new_with(config.grid_width, config.grid_height, Biome::default())?;
    let noise = TerrainNoise::new(config);
    let bounds = thresholds(config);

    let label_row = |(z, row): (usize, &mut [Biome])| {
        for (x, cell) in row.iter_mut().enumerate() {
            let (cx, cz) = shaping_coord(config, x, z);
            *cell = classify(noise.fbm(cx, cz, config.lacunarity, config.persistence), &bounds);
        }
    };
    if config.parallel {
        biomes.par_rows_mut().for_each(label_row);
    } else {
        biomes.rows_mut().for_each(label_row);
    }

    Ok(biomes)
}

/// Map the relaxed field into `[0, 1]`.
fn package(heights: &mut Tilemap<f32>, range: OutputRange) {
    match range {
        OutputRange::Clamp => {
            for (_, _, h) in heights.iter_mut() {
                *h = h.clamp(0.0, 1.0);
            }
        }
        OutputRange::Normalize => {
            let (min_h, max_h) = heights.value_range();
            let span = max_h - min_h;
            if span <= f32::EPSILON {
                log::warn!("Flat heightfield ({:.4}), skipping normalization", min_h);
                return;
            }
            for (_, _, h) in heights.iter_mut() {
                *h = ((*h - min_h) / span).clamp(0.0, 1.0);
            }
        }
    }
}

/// Generate a heightfield from `config`.
pub fn generate(config: &TerrainConfig) -> Result<Heightfield> {
    log::info!(
        "Generating {}x{} heightfield (seed {}, {} octaves, {} noise)",
        config.grid_width,
        config.grid_height,
        config.seed,
        config.octaves,
        config.noise,
    );

    let (mut heights, biomes, clamped_cells) = generate_raw(config)?;
    log::info!("Biomes: {}", biomes);
    if clamped_cells > 0 {
        log::warn!("{} cells clamped into [0, 1]", clamped_cells);
    }

    let relax_params = config.relax_params();
    log::info!(
        "Relaxing: {} sweeps, strength {}, {}",
        relax_params.iterations,
        relax_params.strength,
        relax_params.mode,
    );
    let relaxation = erosion::relax(&mut heights, &relax_params);

    package(&mut heights, config.output_range);
    let (min_height, max_height) = heights.value_range();
    log::info!("Heightfield range: {:.4} to {:.4}", min_height, max_height);

    Ok(Heightfield {
        heights,
        world_size: WorldSize::from_config(config),
        report: GenerationReport {
            biomes,
            clamped_cells,
            relaxation,
            min_height,
            max_height,
        },
    })
}

/// Generate once and hand the result to `sink` once.
pub fn generate_into(config: &TerrainConfig, sink: &mut impl TerrainSink) -> Result<Heightfield> {
    let field = generate(config)?;
    sink.set_heights(field.world_size, &field.heights)?;
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoisePrimitive;
    use crate::erosion::RelaxationMode;
    use crate::error::TerrainError;

    fn small(seed: u64, size: usize) -> TerrainConfig {
        TerrainConfig::new(seed).with_size(size, size)
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = small(1234, 48);
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a.heights, b.heights);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut config = small(77, 40);
        config.parallel = true;
        let parallel = generate(&config).unwrap();
        config.parallel = false;
        let sequential = generate(&config).unwrap();
        assert_eq!(parallel.heights, sequential.heights);
        assert_eq!(parallel.report.biomes, sequential.report.biomes);
    }

    #[test]
    fn test_biome_labels_match_across_threading() {
        let mut config = small(19, 36);
        config.plains_threshold = 0.02;
        config.parallel = true;
        let parallel = classify_biomes(&config).unwrap();
        config.parallel = false;
        let sequential = classify_biomes(&config).unwrap();
        assert_eq!(parallel, sequential);

        let field = generate(&config).unwrap();
        let mut counts = BiomeCounts::default();
        for (_, _, &biome) in sequential.iter() {
            counts.record(biome);
        }
        assert_eq!(counts, field.report.biomes);
    }

    #[test]
    fn test_seed_changes_most_interior_cells() {
        let a = generate(&small(1, 32)).unwrap();
        let b = generate(&small(2, 32)).unwrap();

        let mut interior = 0;
        let mut differing = 0;
        for (x, z, &h) in a.heights.iter() {
            if !a.heights.is_boundary(x, z) {
                interior += 1;
                if h != b.get(x, z) {
                    differing += 1;
                }
            }
        }
        assert!(differing * 2 >= interior, "only {differing}/{interior} cells differ");
    }

    #[test]
    fn test_output_in_unit_interval() {
        for &kind in &[NoisePrimitive::Perlin, NoisePrimitive::OpenSimplex, NoisePrimitive::Value] {
            let mut config = small(5, 40);
            config.noise = kind;
            config.plains_threshold = 0.02;
            let field = generate(&config).unwrap();
            assert!(field.heights.iter().all(|(_, _, &h)| (0.0..=1.0).contains(&h)));
            assert!(field.report.min_height >= 0.0 && field.report.max_height <= 1.0);
        }
    }

    #[test]
    fn test_boundary_keeps_raw_values() {
        let mut config = small(9, 24);
        config.erosion_strength = 0.8;
        config.smooth_iterations = 6;
        let (raw, _, _) = generate_raw(&config).unwrap();
        let field = generate(&config).unwrap();
        for (x, z, &h) in raw.iter() {
            if raw.is_boundary(x, z) {
                assert_eq!(field.get(x, z), h);
            }
        }
    }

    #[test]
    fn test_zero_iterations_yields_raw_field() {
        let mut config = small(11, 24);
        config.smooth_iterations = 0;
        let (raw, _, _) = generate_raw(&config).unwrap();
        assert_eq!(generate(&config).unwrap().heights, raw);
    }

    #[test]
    fn test_zero_strength_yields_raw_field() {
        let mut config = small(11, 24);
        config.erosion_strength = 0.0;
        config.smooth_iterations = 40;
        let (raw, _, _) = generate_raw(&config).unwrap();
        assert_eq!(generate(&config).unwrap().heights, raw);
    }

    #[test]
    fn test_forced_plains_equal_plains_fbm() {
        let mut config = small(0, 8);
        config.octaves = 1;
        config.persistence = 0.5;
        config.lacunarity = 2.0;
        config.smooth_iterations = 0;
        config.erosion_strength = 0.0;
        config.plains_threshold = 1.1;

        let field = generate(&config).unwrap();
        let noise = TerrainNoise::new(&config);
        assert_eq!(field.report.biomes.plains, 64);
        for (x, z, &h) in field.heights.iter() {
            let (cx, cz) = shaping_coord(&config, x, z);
            let expected = noise.fbm(cx, cz, config.plains_lacunarity, config.plains_persistence);
            assert_eq!(h, expected as f32);
            assert!((0.0..=1.0).contains(&h));
        }
    }

    #[test]
    fn test_stock_thresholds_produce_no_lakes() {
        let config = small(21, 64);
        let field = generate(&config).unwrap();
        assert_eq!(field.report.biomes.lake, 0);
        let labels = classify_biomes(&config).unwrap();
        assert!(labels.iter().all(|(_, _, &b)| b != Biome::Lake));
    }

    #[test]
    fn test_swapped_thresholds_carve_lakes() {
        let mut config = small(21, 32);
        config.plains_threshold = 0.0;
        config.lake_threshold = 0.5;
        config.smooth_iterations = 0;

        let field = generate(&config).unwrap();
        assert!(field.report.biomes.lake > 0);
        assert_eq!(field.report.biomes.plains, 0);

        let labels = classify_biomes(&config).unwrap();
        for (x, z, &biome) in labels.iter() {
            if biome == Biome::Lake {
                assert_eq!(field.get(x, z), 0.0);
            }
        }
    }

    #[test]
    fn test_voronoi_amplitude_only_touches_mountains() {
        for &plains_threshold in &[0.5, 0.02] {
            let mut config = small(33, 48);
            config.plains_threshold = plains_threshold;
            config.lake_threshold = plains_threshold.min(0.1);
            config.smooth_iterations = 0;

            config.mountain_voronoi_amplitude = 0.0;
            let flat = generate(&config).unwrap();
            config.mountain_voronoi_amplitude = 10.0;
            let rough = generate(&config).unwrap();

            let labels = classify_biomes(&config).unwrap();
            let mut changed = 0;
            for (x, z, &biome) in labels.iter() {
                if flat.get(x, z) != rough.get(x, z) {
                    assert_eq!(biome, Biome::Mountain, "non-mountain cell ({x}, {z}) changed");
                    changed += 1;
                }
            }
            if plains_threshold < 0.1 {
                assert!(changed > 0);
            }
        }
    }

    #[test]
    fn test_jacobi_mode_keeps_invariants() {
        let mut config = small(3, 32);
        config.relaxation = RelaxationMode::Jacobi;
        config.erosion_strength = 0.5;
        config.smooth_iterations = 4;
        let (raw, _, _) = generate_raw(&config).unwrap();
        let field = generate(&config).unwrap();
        for (x, z, &h) in raw.iter() {
            assert!((0.0..=1.0).contains(&field.get(x, z)));
            if raw.is_boundary(x, z) {
                assert_eq!(field.get(x, z), h);
            }
        }
        assert_eq!(field.report.relaxation.iterations, 4);
    }

    #[test]
    fn test_normalize_stretches_to_unit_interval() {
        let mut config = small(8, 32);
        config.output_range = OutputRange::Normalize;
        let field = generate(&config).unwrap();
        assert_eq!(field.report.min_height, 0.0);
        assert_eq!(field.report.max_height, 1.0);
    }

    #[test]
    fn test_world_size_triple() {
        let mut config = small(1, 16).with_size(16, 20);
        config.grid_elevation = 64.0;
        let field = generate(&config).unwrap();
        assert_eq!(field.world_size, WorldSize { width: 16.0, elevation: 64.0, height: 20.0 });
        assert_eq!(field.width(), 16);
        assert_eq!(field.height(), 20);
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let config = small(1, 2);
        assert!(matches!(generate(&config), Err(TerrainError::InvalidDimension { .. })));
    }

    struct CountingSink {
        calls: usize,
        last: Option<(WorldSize, Vec<f32>)>,
    }

    impl TerrainSink for CountingSink {
        fn set_heights(&mut self, world_size: WorldSize, heights: &Tilemap<f32>) -> Result<()> {
            self.calls += 1;
            self.last = Some((world_size, heights.as_slice().to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_sink_receives_field_once() {
        let config = small(4, 16);
        let mut sink = CountingSink { calls: 0, last: None };
        let field = generate_into(&config, &mut sink).unwrap();
        assert_eq!(sink.calls, 1);
        let (world_size, heights) = sink.last.unwrap();
        assert_eq!(world_size, field.world_size);
        assert_eq!(heights, field.heights.as_slice());
    }
}
