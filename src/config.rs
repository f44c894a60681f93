//! Terrain shaping parameters
//!
//! Every knob the generator exposes lives on [`TerrainConfig`]. A config is
//! built once (from defaults, a preset, a JSON file or CLI overrides),
//! validated, and never mutated during generation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::erosion::{RelaxParams, RelaxationMode};
use crate::error::{Result, TerrainError};

/// Gradient-noise primitive sampled by every noise kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoisePrimitive {
    #[default]
    Perlin,
    OpenSimplex,
    Value,
}

impl std::fmt::Display for NoisePrimitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Perlin => write!(f, "perlin"),
            Self::OpenSimplex => write!(f, "open-simplex"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// How the finished field is mapped into `[0, 1]` before hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputRange {
    /// Clamp each cell into `[0, 1]`
    #[default]
    Clamp,
    /// Stretch the field's min..max onto `[0, 1]`
    Normalize,
}

/// Planar offset added inside every fBm octave lookup.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// Full set of shaping parameters for one generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerrainConfig {
    /// Heightfield width in cells (x axis)
    pub grid_width: usize,
    /// Heightfield height in cells (z axis)
    pub grid_height: usize,
    /// World-space vertical scale handed to the renderer
    pub grid_elevation: f32,
    /// Spatial divisor applied inside noise lookups
    #[serde(alias = "SCALE_FACTOR")]
    pub scale_factor: f64,
    /// fBm octave count, shared by every biome recipe
    pub octaves: u32,
    /// Amplitude falloff of the shaping fBm
    pub persistence: f64,
    /// Frequency growth of the shaping fBm
    pub lacunarity: f64,
    pub seed: u64,
    pub offset: Offset,

    /// Shaping values below this are plains (tested first)
    pub plains_threshold: f64,
    /// Shaping values below this are lakes (tested after plains)
    pub lake_threshold: f64,
    pub plains_lacunarity: f64,
    pub plains_persistence: f64,
    pub mountain_lacunarity: f64,
    pub mountain_persistence: f64,
    pub mountain_voronoi_frequency: f64,
    pub mountain_voronoi_amplitude: f64,

    /// Relaxation mix coefficient, in `[0, 1]`
    pub erosion_strength: f32,
    /// Number of relaxation sweeps
    pub smooth_iterations: u32,

    pub noise: NoisePrimitive,
    pub relaxation: RelaxationMode,
    pub output_range: OutputRange,
    /// Evaluate the per-cell pass across rows in parallel
    pub parallel: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid_width: 256,
            grid_height: 256,
            grid_elevation: 128.0,
            scale_factor: 10.0,
            octaves: 10,
            persistence: 0.45,
            lacunarity: 3.0,
            seed: 0,
            offset: Offset::default(),

            plains_threshold: 0.5,
            lake_threshold: 0.1,
            plains_lacunarity: 2.0,
            plains_persistence: 0.3,
            mountain_lacunarity: 4.0,
            mountain_persistence: 0.6,
            mountain_voronoi_frequency: 0.05,
            mountain_voronoi_amplitude: 10.0,

            erosion_strength: 0.05,
            smooth_iterations: 3,

            noise: NoisePrimitive::default(),
            relaxation: RelaxationMode::default(),
            output_range: OutputRange::default(),
            parallel: true,
        }
    }
}

impl TerrainConfig {
    /// Default parameters with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_preset(mut self, preset: TerrainPreset) -> Self {
        preset.apply(&mut self);
        self
    }

    pub fn relax_params(&self) -> RelaxParams {
        RelaxParams {
            strength: self.erosion_strength,
            iterations: self.smooth_iterations,
            mode: self.relaxation,
        }
    }

    /// Reject configurations the pipeline cannot honor. Runs before any
    /// allocation.
    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 3 || self.grid_height < 3 {
            return Err(TerrainError::InvalidDimension {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.octaves < 1 {
            return Err(TerrainError::invalid("octaves", "must be at least 1"));
        }

        let positive = [
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
            ("plainsPersistence", self.plains_persistence),
            ("plainsLacunarity", self.plains_lacunarity),
            ("mountainPersistence", self.mountain_persistence),
            ("mountainLacunarity", self.mountain_lacunarity),
            ("scaleFactor", self.scale_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TerrainError::invalid(
                    name,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        let finite = [
            ("plainsThreshold", self.plains_threshold),
            ("lakeThreshold", self.lake_threshold),
            ("mountainVoronoiFrequency", self.mountain_voronoi_frequency),
            ("mountainVoronoiAmplitude", self.mountain_voronoi_amplitude),
            ("offset.x", self.offset.x),
            ("offset.y", self.offset.y),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(TerrainError::invalid(name, format!("must be finite, got {value}")));
            }
        }

        if !(0.0..=1.0).contains(&self.erosion_strength) {
            return Err(TerrainError::invalid(
                "erosionStrength",
                format!("must lie in [0, 1], got {}", self.erosion_strength),
            ));
        }
        if !(self.grid_elevation.is_finite() && self.grid_elevation >= 0.0) {
            return Err(TerrainError::invalid("gridElevation", "must be a non-negative number"));
        }

        Ok(())
    }

    /// Load a config from JSON. Keys missing from the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Copy the keys present in `keys` over this config. Absent keys keep
    /// their current value; `SCALE_FACTOR` is accepted for `scaleFactor`.
    pub fn overlay_json(&self, keys: &Map<String, Value>) -> Result<Self> {
        let mut merged = serde_json::to_value(self)?;
        if let Value::Object(target) = &mut merged {
            for (key, value) in keys {
                let key = match key.as_str() {
                    "SCALE_FACTOR" => "scaleFactor",
                    other => other,
                };
                target.insert(key.to_string(), value.clone());
            }
        }
        Ok(serde_json::from_value(merged)?)
    }
}

/// Read a JSON config file as a raw key map, for use with
/// [`TerrainConfig::overlay_json`].
pub fn read_json_object(path: impl AsRef<Path>) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    match serde_json::from_str::<Value>(&fs::read_to_string(path)?)? {
        Value::Object(map) => Ok(map),
        _ => Err(TerrainError::invalid(
            "config",
            format!("{} is not a JSON object", path.display()),
        )),
    }
}

/// Individual parameter overrides, the highest-precedence config layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub grid_width: Option<usize>,
    pub grid_height: Option<usize>,
    pub seed: Option<u64>,
    pub octaves: Option<u32>,
    pub smooth_iterations: Option<u32>,
    pub erosion_strength: Option<f32>,
    pub plains_threshold: Option<f64>,
    pub lake_threshold: Option<f64>,
    pub noise: Option<NoisePrimitive>,
    pub relaxation: Option<RelaxationMode>,
    pub output_range: Option<OutputRange>,
    pub parallel: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut TerrainConfig) {
        if let Some(width) = self.grid_width {
            config.grid_width = width;
        }
        if let Some(height) = self.grid_height {
            config.grid_height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(octaves) = self.octaves {
            config.octaves = octaves;
        }
        if let Some(n) = self.smooth_iterations {
            config.smooth_iterations = n;
        }
        if let Some(s) = self.erosion_strength {
            config.erosion_strength = s;
        }
        if let Some(t) = self.plains_threshold {
            config.plains_threshold = t;
        }
        if let Some(t) = self.lake_threshold {
            config.lake_threshold = t;
        }
        if let Some(noise) = self.noise {
            config.noise = noise;
        }
        if let Some(mode) = self.relaxation {
            config.relaxation = mode;
        }
        if let Some(range) = self.output_range {
            config.output_range = range;
        }
        if let Some(parallel) = self.parallel {
            config.parallel = parallel;
        }
    }
}

/// Build a config from its layers: defaults, then `preset`, then the keys of
/// a config file, then `overrides`.
///
/// When neither the file nor the overrides name a seed, `fallback_seed`
/// supplies one.
pub fn resolve_config(
    preset: Option<TerrainPreset>,
    file: Option<&Map<String, Value>>,
    overrides: &ConfigOverrides,
    fallback_seed: impl FnOnce() -> u64,
) -> Result<TerrainConfig> {
    let mut config = TerrainConfig::default();
    if let Some(preset) = preset {
        log::info!("Applying preset {} ({})", preset, preset.description());
        preset.apply(&mut config);
    }

    let file_has_seed = file.is_some_and(|keys| keys.contains_key("seed"));
    if let Some(keys) = file {
        config = config.overlay_json(keys)?;
    }
    if overrides.seed.is_none() && !file_has_seed {
        config.seed = fallback_seed();
    }
    overrides.apply(&mut config);

    Ok(config)
}

/// Named parameter sets layered over a config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerrainPreset {
    /// Stock look: plains with rare mountains, lakes disabled
    #[default]
    Classic,
    /// Thresholds reordered so the lake branch is reachable
    Lakes,
    /// Low plains threshold, mountains dominate
    Highlands,
    /// Heavy relaxation for soft hills
    Rolling,
}

impl TerrainPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Classic, Self::Lakes, Self::Highlands, Self::Rolling]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Classic => "Plains with sparse mountains",
            Self::Lakes => "Plains, lakes and mountains",
            Self::Highlands => "Mountain-dominated terrain",
            Self::Rolling => "Heavily smoothed hills",
        }
    }

    /// Overwrite the parameters this preset controls.
    pub fn apply(&self, config: &mut TerrainConfig) {
        let defaults = TerrainConfig::default();
        match self {
            Self::Classic => {
                config.plains_threshold = defaults.plains_threshold;
                config.lake_threshold = defaults.lake_threshold;
                config.erosion_strength = defaults.erosion_strength;
                config.smooth_iterations = defaults.smooth_iterations;
            }
            Self::Lakes => {
                config.plains_threshold = 0.01;
                config.lake_threshold = 0.03;
            }
            Self::Highlands => {
                config.plains_threshold = 0.02;
                config.lake_threshold = 0.01;
                config.mountain_voronoi_amplitude = 4.0;
            }
            Self::Rolling => {
                config.erosion_strength = 0.5;
                config.smooth_iterations = 20;
            }
        }
    }
}

impl std::fmt::Display for TerrainPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Lakes => write!(f, "lakes"),
            Self::Highlands => write!(f, "highlands"),
            Self::Rolling => write!(f, "rolling"),
        }
    }
}
