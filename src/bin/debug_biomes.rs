//! Debug script to output biome maps as ASCII for several threshold orderings

use std::fs::File;
use std::io::Write;

use terrain_generator::biomes::{Biome, BiomeCounts};
use terrain_generator::heightmap::classify_biomes;
use terrain_generator::{TerrainConfig, TerrainPreset};

fn main() {
    let width = 96;
    let height = 48;
    let seed = 12345u64;

    let mut variants: Vec<(String, TerrainConfig)> = TerrainPreset::all()
        .iter()
        .map(|&preset| {
            let name = format!("{} preset: {}", preset, preset.description());
            (name, TerrainConfig::new(seed).with_preset(preset))
        })
        .collect();
    let mut swapped = TerrainConfig::new(seed);
    swapped.plains_threshold = 0.0;
    swapped.lake_threshold = 0.5;
    variants.push(("Swapped (plains 0.0, lake 0.5)".to_string(), swapped));

    let mut file = File::create("biome_debug.txt").unwrap();

    writeln!(file, "=== BIOME DEBUG MAPS ({}x{}) seed={} ===", width, height, seed).unwrap();
    writeln!(file, "LEGEND:  . = Plains   ~ = Lake   ^ = Mountain").unwrap();
    writeln!(file).unwrap();

    for (name, config) in variants {
        let config = config.with_size(width, height);
        let biomes = classify_biomes(&config).unwrap();

        let mut counts = BiomeCounts::default();
        writeln!(file, "--- {} ---", name).unwrap();
        for z in 0..height {
            let line: String = (0..width)
                .map(|x| {
                    let biome = *biomes.get(x, z);
                    counts.record(biome);
                    biome.glyph()
                })
                .collect();
            writeln!(file, "{}", line).unwrap();
        }

        writeln!(file).unwrap();
        for biome in Biome::all() {
            let count = counts.get(*biome);
            writeln!(
                file,
                "  {:<8} {:>6} ({:.1}%)",
                biome.to_string(),
                count,
                100.0 * count as f64 / counts.total() as f64
            )
            .unwrap();
        }
        writeln!(file).unwrap();

        println!("{}: {}", name, counts);
    }

    println!("Saved biome_debug.txt");
}
