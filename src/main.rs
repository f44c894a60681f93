use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use terrain_generator::biomes::{Biome, BiomeThresholds};
use terrain_generator::config::{read_json_object, resolve_config, ConfigOverrides};
use terrain_generator::erosion::RelaxationMode;
use terrain_generator::export::{self, PngSink, PngStyle};
use terrain_generator::heightmap::{classify_biomes, generate_into};
use terrain_generator::seeds::TerrainSeeds;
use terrain_generator::{NoisePrimitive, OutputRange, TerrainPreset};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NoiseArg {
    Perlin,
    OpenSimplex,
    Value,
}

impl From<NoiseArg> for NoisePrimitive {
    fn from(arg: NoiseArg) -> Self {
        match arg {
            NoiseArg::Perlin => Self::Perlin,
            NoiseArg::OpenSimplex => Self::OpenSimplex,
            NoiseArg::Value => Self::Value,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RelaxationArg {
    InPlace,
    Jacobi,
}

impl From<RelaxationArg> for RelaxationMode {
    fn from(arg: RelaxationArg) -> Self {
        match arg {
            RelaxationArg::InPlace => Self::InPlace,
            RelaxationArg::Jacobi => Self::Jacobi,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    Classic,
    Lakes,
    Highlands,
    Rolling,
}

impl From<PresetArg> for TerrainPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Classic => Self::Classic,
            PresetArg::Lakes => Self::Lakes,
            PresetArg::Highlands => Self::Highlands,
            PresetArg::Rolling => Self::Rolling,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "terrain_generator")]
#[command(about = "Generate procedural heightfield terrain")]
struct Args {
    /// JSON config file (missing keys keep their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named parameter set applied before the config file
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Width of the heightfield in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the heightfield in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// fBm octave count
    #[arg(long)]
    octaves: Option<u32>,

    /// Number of relaxation sweeps
    #[arg(long)]
    smooth_iterations: Option<u32>,

    /// Relaxation mix coefficient (0.0-1.0)
    #[arg(long)]
    erosion_strength: Option<f32>,

    /// Shaping values below this are plains
    #[arg(long)]
    plains_threshold: Option<f64>,

    /// Shaping values below this (and above the plains threshold) are lakes
    #[arg(long)]
    lake_threshold: Option<f64>,

    /// Gradient-noise primitive
    #[arg(long, value_enum)]
    noise: Option<NoiseArg>,

    /// Relaxation sweep discipline
    #[arg(long, value_enum)]
    relaxation: Option<RelaxationArg>,

    /// Stretch the output to the full [0, 1] range instead of clamping
    #[arg(long)]
    normalize: bool,

    /// Evaluate cells on a single thread
    #[arg(long)]
    sequential: bool,

    /// Spectral-colored PNG output
    #[arg(short, long, default_value = "heightfield.png")]
    output: PathBuf,

    /// Also write a 16-bit greyscale PNG
    #[arg(long)]
    grayscale: Option<PathBuf>,

    /// Also write a biome map PNG
    #[arg(long)]
    biome_map: Option<PathBuf>,

    /// Also write the heightfield as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the resolved config as JSON
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            grid_width: self.width,
            grid_height: self.height,
            seed: self.seed,
            octaves: self.octaves,
            smooth_iterations: self.smooth_iterations,
            erosion_strength: self.erosion_strength,
            plains_threshold: self.plains_threshold,
            lake_threshold: self.lake_threshold,
            noise: self.noise.map(Into::into),
            relaxation: self.relaxation.map(Into::into),
            output_range: self.normalize.then_some(OutputRange::Normalize),
            parallel: self.sequential.then_some(false),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => {
            let keys = read_json_object(path)?;
            log::info!("Loaded config from {}", path.display());
            Some(keys)
        }
        None => None,
    };
    let config = resolve_config(
        args.preset.map(Into::into),
        file.as_ref(),
        &args.overrides(),
        rand::random,
    )?;
    config.validate()?;

    log::info!("{}", TerrainSeeds::from_master(config.seed));
    let thresholds = BiomeThresholds {
        plains: config.plains_threshold,
        lake: config.lake_threshold,
    };
    if !thresholds.lakes_reachable() {
        log::info!(
            "Lake branch inactive (plains threshold {} >= lake threshold {})",
            config.plains_threshold,
            config.lake_threshold,
        );
    }

    if let Some(path) = &args.dump_config {
        config.to_json_file(path)?;
        log::info!("Saved config to {}", path.display());
    }

    let mut sink = PngSink::new(args.output.clone(), PngStyle::Spectral);
    let field = generate_into(&config, &mut sink)?;

    if let Some(path) = &args.grayscale {
        export::export_grayscale(&field.heights, path)?;
        log::info!("Saved {}", path.display());
    }
    if let Some(path) = &args.json {
        export::export_json(&field, path)?;
        log::info!("Saved {}", path.display());
    }
    if let Some(path) = &args.biome_map {
        let biomes = classify_biomes(&config)?;
        export::export_biome_map(&biomes, path)?;
        log::info!("Saved {}", path.display());
    }

    let report = &field.report;
    let total = report.biomes.total().max(1) as f64;
    for biome in Biome::all() {
        let count = report.biomes.get(*biome);
        log::info!(
            "  {:<8} {:>8} cells ({:.1}%)",
            biome.to_string(),
            count,
            100.0 * count as f64 / total,
        );
    }
    log::info!(
        "Relaxation: {} sweeps, largest single change {:.5}",
        report.relaxation.iterations,
        report.relaxation.max_change,
    );

    Ok(())
}
