// src/terrain/biome_manager.rs
use std::sync::Arc;

use super::biome::Biome;
use super::chunk_position::ChunkPosition;
use super::noise::{NoiseField, smoothstep};
use super::terrain_config::BiomeConfig;
use crate::error::{Result, WorldError};

/// Classifies chunks into catalog biomes and blends neighbours near chunk
/// edges.
///
/// Each chunk owns exactly one catalog entry. Inside a chunk, within
/// `blend_distance` of an edge, the chunk across that edge contributes
/// with a weight that reaches 0.5 on the edge itself. The x and z edges
/// blend independently, so near a corner four chunks contribute. Both
/// chunks sharing an edge compute the same weights there, which keeps
/// every numeric attribute continuous across the seam.
#[derive(Debug, Clone)]
pub struct BiomeField {
    noise: NoiseField,
    frequency: f64,
    chunk_size: f64,
    blend_distance: f64,
    catalog: Arc<[Biome]>,
}

impl BiomeField {
    pub fn new(config: &BiomeConfig, chunk_size: f64) -> Result<Self> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(WorldError::InvalidConfig(format!(
                "chunk_size must be positive, got {chunk_size}"
            )));
        }
        if config.catalog.is_empty() {
            return Err(WorldError::InvalidConfig("biome catalog is empty".into()));
        }
        if !config.frequency.is_finite() || config.frequency <= 0.0 {
            return Err(WorldError::InvalidConfig(format!(
                "biome frequency must be positive, got {}",
                config.frequency
            )));
        }
        let blend = config.edge_blend_distance;
        if !blend.is_finite() || blend < 0.0 || blend > chunk_size * 0.5 {
            return Err(WorldError::InvalidConfig(format!(
                "edge_blend_distance must be within [0, {}], got {blend}",
                chunk_size * 0.5
            )));
        }

        Ok(Self {
            noise: NoiseField::new(config.seed),
            frequency: config.frequency,
            chunk_size,
            blend_distance: blend,
            catalog: config.catalog.clone().into(),
        })
    }

    pub fn catalog(&self) -> &[Biome] {
        &self.catalog
    }

    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    pub fn blend_distance(&self) -> f64 {
        self.blend_distance
    }

    /// Catalog index owned by chunk `(cx, cz)`.
    pub fn biome_index(&self, cx: i32, cz: i32) -> usize {
        // sample at cell centres so chunk (0, 0) is not pinned to the lattice zero
        let n = self.noise.perlin(
            (cx as f64 + 0.5) * self.frequency,
            (cz as f64 + 0.5) * self.frequency,
        );
        let len = self.catalog.len();
        let scaled = ((n + 1.0) * 0.5 * len as f64).floor();
        // perlin output is clamped, so only n == 1.0 can reach len
        (scaled.max(0.0) as usize) % len
    }

    pub fn biome_at_chunk(&self, cx: i32, cz: i32) -> &Biome {
        &self.catalog[self.biome_index(cx, cz)]
    }

    pub fn blended_biome(&self, x: f64, z: f64) -> BlendedBiome<'_> {
        let cs = self.chunk_size;
        let chunk = ChunkPosition::from_world(x, z, cs);
        let (ox, oz) = chunk.origin(cs);
        let (dx, wx) = self.edge_weight(x - ox);
        let (dz, wz) = self.edge_weight(z - oz);

        let cells = [
            (chunk, (1.0 - wx) * (1.0 - wz)),
            (chunk.offset(dx, 0), wx * (1.0 - wz)),
            (chunk.offset(0, dz), (1.0 - wx) * wz),
            (chunk.offset(dx, dz), wx * wz),
        ];
        let contributors = cells.map(|(c, w)| (self.biome_index(c.x, c.z), w));
        BlendedBiome::from_contributors(&self.catalog, contributors)
    }

    /// Direction of the nearer edge along one axis and the weight the chunk
    /// across it receives.
    fn edge_weight(&self, local: f64) -> (i32, f64) {
        let cs = self.chunk_size;
        let local = if local.is_finite() { local.clamp(0.0, cs) } else { cs * 0.5 };
        let (direction, distance) = if local < cs * 0.5 { (-1, local) } else { (1, cs - local) };
        let weight = 0.5 * (1.0 - smoothstep(0.0, self.blend_distance, distance));
        (direction, weight)
    }
}

/// Weighted mix of up to four catalog entries around one world position.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendedBiome<'a> {
    catalog: &'a [Biome],
    contributors: [(usize, f64); 4],
    dominant: usize,
    pub altitude_bias: f64,
    pub humidity: f64,
}

impl<'a> BlendedBiome<'a> {
    fn from_contributors(catalog: &'a [Biome], contributors: [(usize, f64); 4]) -> Self {
        let own = contributors[0].0;
        let mut altitude_bias = 0.0;
        let mut humidity = 0.0;
        for &(index, weight) in &contributors {
            altitude_bias += catalog[index].altitude_bias * weight;
            humidity += catalog[index].humidity * weight;
        }

        let weight_of = |index: usize| -> f64 {
            contributors
                .iter()
                .filter(|(i, _)| *i == index)
                .map(|(_, w)| w)
                .sum()
        };
        let dominant = contributors
            .iter()
            .map(|&(i, _)| i)
            .find(|&i| i != own && weight_of(i) > 0.5)
            .unwrap_or(own);

        Self {
            catalog,
            contributors,
            dominant,
            altitude_bias,
            humidity,
        }
    }

    /// Biome of the chunk that owns the sampled position.
    pub fn own(&self) -> &'a Biome {
        &self.catalog[self.contributors[0].0]
    }

    pub fn own_index(&self) -> usize {
        self.contributors[0].0
    }

    /// Entry supplying categorical attributes (label, flora, sound, colour).
    pub fn dominant(&self) -> &'a Biome {
        &self.catalog[self.dominant]
    }

    pub fn dominant_index(&self) -> usize {
        self.dominant
    }

    /// `(catalog index, weight)` for the owning chunk, the x neighbour, the
    /// z neighbour and the diagonal, in that order. Weights sum to 1.
    pub fn contributors(&self) -> &[(usize, f64); 4] {
        &self.contributors
    }

    /// Aggregated weight of one catalog entry.
    pub fn weight_of(&self, index: usize) -> f64 {
        self.contributors
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, w)| w)
            .sum()
    }

    /// True when more than one catalog entry contributes.
    pub fn is_blending(&self) -> bool {
        let own = self.own_index();
        self.contributors.iter().any(|&(i, w)| i != own && w > 0.0)
    }

    /// Owned biome value: categorical fields from the dominant entry,
    /// numeric fields interpolated.
    pub fn to_biome(&self) -> Biome {
        Biome {
            altitude_bias: self.altitude_bias,
            humidity: self.humidity,
            ..self.dominant().clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> BiomeField {
        BiomeField::new(&BiomeConfig::default(), 200.0).unwrap()
    }

    #[test]
    fn test_index_is_in_catalog_range() {
        let biomes = field();
        for cx in -30..30 {
            for cz in -30..30 {
                assert!(biomes.biome_index(cx, cz) < 5);
            }
        }
    }

    #[test]
    fn test_catalog_entries_all_appear() {
        let biomes = field();
        let mut seen = [false; 5];
        for cx in -40..40 {
            for cz in -40..40 {
                seen[biomes.biome_index(cx, cz)] = true;
            }
        }
        assert!(seen.iter().all(|s| *s), "some biomes never appear: {seen:?}");
    }

    #[test]
    fn test_interior_is_own_biome() {
        let biomes = field();
        let blended = biomes.blended_biome(100.0, 100.0);
        let own = biomes.biome_at_chunk(0, 0);
        assert!(!blended.is_blending());
        assert_eq!(blended.altitude_bias, own.altitude_bias);
        assert_eq!(blended.humidity, own.humidity);
        assert_eq!(blended.to_biome(), *own);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let biomes = field();
        for (x, z) in [(0.5, 0.5), (199.0, 3.0), (-1.0, 17.9), (1000.0, 1000.0), (42.0, 190.0)] {
            let blended = biomes.blended_biome(x, z);
            let sum: f64 = blended.contributors().iter().map(|(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_altitude_bias_is_continuous_across_seams() {
        let biomes = field();
        let eps = 1e-7;
        for k in -5..5 {
            let seam = k as f64 * 200.0;
            for j in 0..40 {
                let along = j as f64 * 23.7 - 400.0;
                let left = biomes.blended_biome(seam - eps, along).altitude_bias;
                let right = biomes.blended_biome(seam + eps, along).altitude_bias;
                assert!((left - right).abs() < 1e-6, "x seam {seam}: {left} vs {right}");
                let below = biomes.blended_biome(along, seam - eps).humidity;
                let above = biomes.blended_biome(along, seam + eps).humidity;
                assert!((below - above).abs() < 1e-6, "z seam {seam}: {below} vs {above}");
            }
        }
    }

    #[test]
    fn test_dominant_switches_only_past_half_weight() {
        let biomes = field();
        let blended = biomes.blended_biome(0.0, 100.0);
        // exactly on the seam the neighbour has 0.5, which does not beat the owner
        assert_eq!(blended.dominant_index(), blended.own_index());
    }

    #[test]
    fn test_rejects_wide_blend_and_empty_catalog() {
        let wide = BiomeConfig {
            edge_blend_distance: 150.0,
            ..BiomeConfig::default()
        };
        assert!(matches!(BiomeField::new(&wide, 200.0), Err(WorldError::InvalidConfig(_))));
        let empty = BiomeConfig {
            catalog: Vec::new(),
            ..BiomeConfig::default()
        };
        assert!(BiomeField::new(&empty, 200.0).is_err());
    }
}
