//! Procedural heightfield terrain generator library
//!
//! Re-exports modules for use by binaries and tools.

pub mod biomes;
pub mod config;
pub mod erosion;
pub mod error;
pub mod export;
pub mod fractal;
pub mod heightmap;
pub mod seeds;
pub mod tilemap;

pub use config::{NoisePrimitive, OutputRange, TerrainConfig, TerrainPreset};
pub use error::{Result, TerrainError};
pub use heightmap::{generate, generate_into, Heightfield, TerrainSink, WorldSize};
