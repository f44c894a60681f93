//! Biome classification
//!
//! A cell's biome is picked from the shaping fBm value and two thresholds.
//! The plains test runs before the lake test, so with the stock thresholds
//! (`plains = 0.5 > lake = 0.1`) the lake branch can never fire. Swapping the
//! thresholds (`plains < lake`) makes lakes appear in the
//! `plains..lake` band.

use serde::{Deserialize, Serialize};

/// Terrain category selecting the per-cell noise recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Plains,
    Lake,
    Mountain,
}

impl Biome {
    pub fn all() -> &'static [Self] {
        &[Self::Plains, Self::Lake, Self::Mountain]
    }

    /// Single-character glyph for ASCII dumps
    pub fn glyph(&self) -> char {
        match self {
            Self::Plains => '.',
            Self::Lake => '~',
            Self::Mountain => '^',
        }
    }

    /// Display color (RGB)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Plains => [120, 170, 80],
            Self::Lake => [40, 90, 170],
            Self::Mountain => [140, 120, 100],
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plains => write!(f, "plains"),
            Self::Lake => write!(f, "lake"),
            Self::Mountain => write!(f, "mountain"),
        }
    }
}

/// Shaping-noise bounds used by [`classify`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeThresholds {
    pub plains: f64,
    pub lake: f64,
}

impl BiomeThresholds {
    /// True when the threshold order lets the lake branch fire.
    pub fn lakes_reachable(&self) -> bool {
        self.plains < self.lake
    }
}

/// Pick a biome for a shaping value. Plains is tested first.
pub fn classify(shaping: f64, thresholds: &BiomeThresholds) -> Biome {
    if shaping < thresholds.plains {
        Biome::Plains
    } else if shaping < thresholds.lake {
        Biome::Lake
    } else {
        Biome::Mountain
    }
}

/// Number of cells assigned to each biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeCounts {
    pub plains: usize,
    pub lake: usize,
    pub mountain: usize,
}

impl BiomeCounts {
    pub fn record(&mut self, biome: Biome) {
        match biome {
            Biome::Plains => self.plains += 1,
            Biome::Lake => self.lake += 1,
            Biome::Mountain => self.mountain += 1,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            plains: self.plains + other.plains,
            lake: self.lake + other.lake,
            mountain: self.mountain + other.mountain,
        }
    }

    pub fn get(&self, biome: Biome) -> usize {
        match biome {
            Biome::Plains => self.plains,
            Biome::Lake => self.lake,
            Biome::Mountain => self.mountain,
        }
    }

    pub fn total(&self) -> usize {
        self.plains + self.lake + self.mountain
    }
}

impl std::fmt::Display for BiomeCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} plains, {} lake, {} mountain", self.plains, self.lake, self.mountain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCK: BiomeThresholds = BiomeThresholds { plains: 0.5, lake: 0.1 };
    const SWAPPED: BiomeThresholds = BiomeThresholds { plains: 0.0, lake: 0.5 };

    #[test]
    fn test_stock_thresholds_never_yield_lake() {
        assert!(!STOCK.lakes_reachable());
        for i in 0..=100 {
            let e = i as f64 / 100.0;
            assert_ne!(classify(e, &STOCK), Biome::Lake);
        }
        assert_eq!(classify(0.05, &STOCK), Biome::Plains);
        assert_eq!(classify(0.49, &STOCK), Biome::Plains);
        assert_eq!(classify(0.5, &STOCK), Biome::Mountain);
    }

    #[test]
    fn test_swapped_thresholds_activate_lakes() {
        assert!(SWAPPED.lakes_reachable());
        assert_eq!(classify(0.0, &SWAPPED), Biome::Lake);
        assert_eq!(classify(0.3, &SWAPPED), Biome::Lake);
        assert_eq!(classify(0.5, &SWAPPED), Biome::Mountain);
    }

    #[test]
    fn test_counts_merge() {
        let mut a = BiomeCounts::default();
        a.record(Biome::Plains);
        a.record(Biome::Mountain);
        let mut b = BiomeCounts::default();
        b.record(Biome::Lake);
        b.record(Biome::Plains);

        let total = a.merge(b);
        assert_eq!(total.get(Biome::Plains), 2);
        assert_eq!(total.get(Biome::Lake), 1);
        assert_eq!(total.get(Biome::Mountain), 1);
        assert_eq!(total.total(), 4);
    }
}
