//! Image and JSON exporters, and a [`TerrainSink`] that writes PNGs

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma, Rgb, RgbImage};
use serde::Serialize;

use crate::biomes::Biome;
use crate::error::Result;
use crate::heightmap::{Heightfield, TerrainSink, WorldSize};
use crate::tilemap::Tilemap;

/// Export a heightmap using spectral colormap.
/// Values are expected to be normalized (0.0-1.0).
pub fn export_heightmap(heightmap: &Tilemap<f32>, path: impl AsRef<Path>) -> Result<()> {
    let mut img: RgbImage = ImageBuffer::new(heightmap.width as u32, heightmap.height as u32);

    for (x, z, &val) in heightmap.iter() {
        img.put_pixel(x as u32, z as u32, Rgb(spectral_colormap(val.clamp(0.0, 1.0))));
    }

    img.save(path)?;
    Ok(())
}

/// Export a heightmap as a 16-bit greyscale PNG, `0.0 -> 0`, `1.0 -> 65535`.
pub fn export_grayscale(heightmap: &Tilemap<f32>, path: impl AsRef<Path>) -> Result<()> {
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(heightmap.width as u32, heightmap.height as u32, |x, z| {
            let h = heightmap.get(x as usize, z as usize).clamp(0.0, 1.0);
            Luma([(h * u16::MAX as f32).round() as u16])
        });

    img.save(path)?;
    Ok(())
}

/// Export biome labels as a flat-colored PNG.
pub fn export_biome_map(biomes: &Tilemap<Biome>, path: impl AsRef<Path>) -> Result<()> {
    let mut img: RgbImage = ImageBuffer::new(biomes.width as u32, biomes.height as u32);

    for (x, z, biome) in biomes.iter() {
        img.put_pixel(x as u32, z as u32, Rgb(biome.color()));
    }

    img.save(path)?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeightfieldDocument<'a> {
    width: usize,
    height: usize,
    world_size: WorldSize,
    /// Row-major, `z * width + x`
    heights: &'a [f32],
}

/// Export a heightfield and its world size as JSON.
pub fn export_json(field: &Heightfield, path: impl AsRef<Path>) -> Result<()> {
    let doc = HeightfieldDocument {
        width: field.width(),
        height: field.height(),
        world_size: field.world_size,
        heights: field.heights.as_slice(),
    };
    fs::write(path, serde_json::to_string(&doc)?)?;
    Ok(())
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],  // Dark blue/purple (low)
        [0.20, 0.53, 0.74],  // Blue
        [0.40, 0.76, 0.65],  // Teal
        [0.67, 0.87, 0.64],  // Light green
        [0.90, 0.96, 0.60],  // Yellow-green
        [1.00, 1.00, 0.75],  // Light yellow / white
        [1.00, 0.88, 0.55],  // Yellow
        [0.99, 0.68, 0.38],  // Light orange
        [0.96, 0.43, 0.26],  // Orange
        [0.84, 0.24, 0.31],  // Red
        [0.62, 0.00, 0.26],  // Dark red (high)
    ];

    let t_scaled = t * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

/// Image style written by [`PngSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PngStyle {
    #[default]
    Spectral,
    Grayscale16,
}

/// Writes the handed-off heightfield to a PNG file.
pub struct PngSink {
    pub path: PathBuf,
    pub style: PngStyle,
}

impl PngSink {
    pub fn new(path: impl Into<PathBuf>, style: PngStyle) -> Self {
        Self { path: path.into(), style }
    }
}

impl TerrainSink for PngSink {
    fn set_heights(&mut self, world_size: WorldSize, heights: &Tilemap<f32>) -> Result<()> {
        log::info!(
            "Writing {} ({}x{} cells, elevation scale {})",
            self.path.display(),
            heights.width,
            heights.height,
            world_size.elevation,
        );
        match self.style {
            PngStyle::Spectral => export_heightmap(heights, &self.path),
            PngStyle::Grayscale16 => export_grayscale(heights, &self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;
    use crate::heightmap::generate_into;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("terrain_generator_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_spectral_endpoints() {
        assert_eq!(spectral_colormap(0.0), [94, 79, 163]);
        assert_eq!(spectral_colormap(1.0), [158, 0, 66]);
    }

    #[test]
    fn test_grayscale_roundtrip_extremes() {
        let mut map = Tilemap::new_with(3, 3, 0.0f32);
        map.set(2, 1, 1.0);
        let path = temp_path("gray.png");
        export_grayscale(&map, &path).unwrap();

        let img = image::open(&path).unwrap().into_luma16();
        assert_eq!(img.dimensions(), (3, 3));
        assert_eq!(img.get_pixel(2, 1).0[0], u16::MAX);
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_png_sink_writes_file() {
        let path = temp_path("sink.png");
        let config = TerrainConfig::new(3).with_size(16, 12);
        let mut sink = PngSink::new(&path, PngStyle::Spectral);
        generate_into(&config, &mut sink).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (16, 12));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_document_layout() {
        let path = temp_path("field.json");
        let config = TerrainConfig::new(5).with_size(8, 6);
        let field = crate::heightmap::generate(&config).unwrap();
        export_json(&field, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["width"], 8);
        assert_eq!(doc["height"], 6);
        assert_eq!(doc["worldSize"]["elevation"], 128.0);
        assert_eq!(doc["heights"].as_array().unwrap().len(), 48);
        let _ = fs::remove_file(&path);
    }
}
