// src/terrain/generation_utils.rs
use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::chunk_position::ChunkPosition;
use super::terrain_sampler::TerrainSampler;

/// Square grid of heights and normals spanning one chunk edge to edge,
/// row-major in z. Adjacent chunks share their edge vertices exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heightfield {
    pub position: ChunkPosition,
    pub resolution: u32,
    pub spacing: f64,
    pub heights: Vec<f64>,
    pub normals: Vec<DVec3>,
}

impl Heightfield {
    /// World-space vertex at grid cell `(ix, iz)`.
    pub fn vertex(&self, ix: u32, iz: u32, chunk_size: f64) -> DVec3 {
        let (ox, oz) = self.position.origin(chunk_size);
        let h = get_clamped_height(ix as i32, iz as i32, &self.heights, self.resolution);
        DVec3::new(ox + ix as f64 * self.spacing, h, oz + iz as f64 * self.spacing)
    }

    pub fn min_max(&self) -> (f64, f64) {
        self.heights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

pub fn get_clamped_height(x: i32, z: i32, heights: &[f64], resolution: u32) -> f64 {
    if resolution == 0 {
        return 0.0;
    }
    let last = resolution as i32 - 1;
    let idx = (z.clamp(0, last) * resolution as i32 + x.clamp(0, last)) as usize;
    heights.get(idx).copied().unwrap_or(0.0)
}

/// Samples `resolution x resolution` vertices across the chunk in parallel.
/// Returns `None` for resolutions below 2.
pub fn sample_heightfield(
    sampler: &TerrainSampler,
    position: ChunkPosition,
    resolution: u32,
    chunk_size: f64,
) -> Option<Heightfield> {
    if resolution < 2 {
        return None;
    }
    let (ox, oz) = position.origin(chunk_size);
    let cells = resolution as usize;
    let last = (resolution - 1) as f64;
    let spacing = chunk_size / last;

    // fraction-of-chunk positions so the last vertex lands exactly on the next origin
    let samples: Vec<_> = (0..cells * cells)
        .into_par_iter()
        .map(|i| {
            let x = ox + chunk_size * ((i % cells) as f64 / last);
            let z = oz + chunk_size * ((i / cells) as f64 / last);
            sampler.sample(x, z)
        })
        .collect();

    let (heights, normals) = samples.into_iter().map(|s| (s.height, s.normal)).unzip();
    Some(Heightfield {
        position,
        resolution,
        spacing,
        heights,
        normals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_manager::WorldConfiguration;

    fn sampler() -> TerrainSampler {
        TerrainSampler::new(&WorldConfiguration::default()).unwrap()
    }

    #[test]
    fn test_heightfield_matches_sampler() {
        let s = sampler();
        let field = sample_heightfield(&s, ChunkPosition::new(1, -1), 5, 200.0).unwrap();
        assert_eq!(field.heights.len(), 25);
        assert_eq!(field.heights[0], s.height(200.0, -200.0));
        assert_eq!(field.heights[24], s.height(400.0, 0.0));
    }

    #[test]
    fn test_adjacent_edges_coincide() {
        let s = sampler();
        let left = sample_heightfield(&s, ChunkPosition::new(0, 0), 9, 200.0).unwrap();
        let right = sample_heightfield(&s, ChunkPosition::new(1, 0), 9, 200.0).unwrap();
        for iz in 0..9 {
            assert_eq!(
                get_clamped_height(8, iz, &left.heights, 9).to_bits(),
                get_clamped_height(0, iz, &right.heights, 9).to_bits()
            );
        }
    }

    #[test]
    fn test_low_resolution_disables_heightfield() {
        assert!(sample_heightfield(&sampler(), ChunkPosition::new(0, 0), 1, 200.0).is_none());
    }

    #[test]
    fn test_clamped_height_stays_in_bounds() {
        let heights = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(get_clamped_height(-5, -5, &heights, 2), 1.0);
        assert_eq!(get_clamped_height(9, 9, &heights, 2), 4.0);
        assert_eq!(get_clamped_height(0, 0, &heights, 0), 0.0);
    }
}
