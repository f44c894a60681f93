//! Noise kernels
//!
//! Both kernels sit on a gradient-noise primitive remapped to `[0, 1]`:
//! - **fBm**: octave sum of smoothstepped, fifth-power-sharpened samples,
//!   normalized by the total amplitude. Output stays in `[0, 1]`.
//! - **Cellular ("voronoi")**: an inverted, frequency-shifted channel of the
//!   same primitive, `a * (1 - N(x*f, z*f))`. There is no cell-distance
//!   search; the name describes the look, not the algorithm.

use noise::{NoiseFn, OpenSimplex, Perlin, Value};

use crate::config::{NoisePrimitive, Offset, TerrainConfig};
use crate::seeds::{OctaveOffsets, TerrainSeeds};

/// Exponent applied to every octave sample before accumulation.
const OCTAVE_SHARPNESS: i32 = 5;

/// Weight of the main channel in [`blend`].
const BLEND_MAIN_WEIGHT: f64 = 0.9;

/// A deterministic 2D noise source with output in `[0, 1]`.
pub trait GradientSource: Send + Sync {
    fn sample(&self, x: f64, z: f64) -> f64;
}

/// Adapts a signed `noise` crate function onto `[0, 1]`.
pub struct UnitNoise<N> {
    noise: N,
}

impl<N> UnitNoise<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }
}

impl<N: NoiseFn<f64, 2> + Send + Sync> GradientSource for UnitNoise<N> {
    fn sample(&self, x: f64, z: f64) -> f64 {
        (self.noise.get([x, z]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Build the configured primitive with the given permutation seed.
pub fn primitive(kind: NoisePrimitive, seed: u32) -> Box<dyn GradientSource> {
    match kind {
        NoisePrimitive::Perlin => Box::new(UnitNoise::new(Perlin::new(seed))),
        NoisePrimitive::OpenSimplex => Box::new(UnitNoise::new(OpenSimplex::new(seed))),
        NoisePrimitive::Value => Box::new(UnitNoise::new(Value::new(seed))),
    }
}

/// Cubic smoothstep `t²(3 − 2t)` on `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fixed convex mix of a main channel with a detail channel.
pub fn blend(main: f64, detail: f64) -> f64 {
    main * BLEND_MAIN_WEIGHT + detail * (1.0 - BLEND_MAIN_WEIGHT)
}

/// Noise state shared by every cell of one generation.
pub struct TerrainNoise {
    source: Box<dyn GradientSource>,
    offsets: OctaveOffsets,
    scale_factor: f64,
    offset: Offset,
}

impl TerrainNoise {
    /// Seed the primitive and draw the octave table for `config`.
    pub fn new(config: &TerrainConfig) -> Self {
        let seeds = TerrainSeeds::from_master(config.seed);
        Self::from_parts(
            primitive(config.noise, seeds.primitive),
            OctaveOffsets::generate(&seeds, config.octaves),
            config.scale_factor,
            config.offset,
        )
    }

    pub fn from_parts(
        source: Box<dyn GradientSource>,
        offsets: OctaveOffsets,
        scale_factor: f64,
        offset: Offset,
    ) -> Self {
        Self { source, offsets, scale_factor, offset }
    }

    /// Fractional Brownian motion at `(x, z)`.
    ///
    /// Every octave sample is smoothstepped and raised to the fifth power
    /// before accumulation, which sharpens peaks. Result lies in `[0, 1]`.
    pub fn fbm(&self, x: f64, z: f64, lacunarity: f64, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for (dx, dy) in self.offsets.iter() {
            let u = x * frequency + f64::from(dx) + self.offset.x;
            let v = z * frequency + f64::from(dy) + self.offset.y;

            let raw = self.source.sample(u / self.scale_factor, v / self.scale_factor);
            let sharpened = smoothstep(raw).powi(OCTAVE_SHARPNESS);

            total += sharpened * amplitude;
            max_amplitude += amplitude;

            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Cellular-looking detail channel: `amplitude * (1 - N(x*f, z*f))`.
    pub fn voronoi(&self, x: f64, z: f64, frequency: f64, amplitude: f64) -> f64 {
        amplitude * (1.0 - self.sample(x * frequency, z * frequency))
    }

    /// Raw primitive sample, already in `[0, 1]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        self.source.sample(x, z)
    }
}
