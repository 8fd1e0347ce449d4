// src/terrain/chunk_layout.rs
use std::sync::Arc;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::chunk_position::ChunkPosition;
use super::generation_utils::{Heightfield, sample_heightfield};
use super::noise::noise_field::mix;
use super::terrain_config::StreamingConfig;
use super::terrain_sampler::TerrainSampler;
use crate::physics::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    City,
    Wilderness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropKind {
    Tree,
    Rock,
    Streetlamp,
}

/// A decorative object for scene builders. Only trees carry a collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropPlacement {
    pub kind: PropKind,
    /// Base of the prop, on the terrain surface.
    pub position: DVec3,
    pub scale: f64,
    /// Flora label of the local biome, for wilderness props.
    pub flora: Option<String>,
}

/// Static content of one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkLayout {
    pub position: ChunkPosition,
    pub zone: ZoneKind,
    pub colliders: Arc<[Aabb]>,
    pub props: Vec<PropPlacement>,
    pub heightfield: Option<Heightfield>,
}

/// Per-chunk generator seed. Independent of generation order.
pub fn layout_seed(world_seed: u64, position: ChunkPosition) -> u64 {
    let key = ((position.x as u32 as u64) << 32) | position.z as u32 as u64;
    mix(world_seed ^ mix(key))
}

/// Zone of a chunk, decided by the urban mask at its centre.
pub fn zone_at(
    sampler: &TerrainSampler,
    config: &StreamingConfig,
    position: ChunkPosition,
    chunk_size: f64,
) -> ZoneKind {
    let (cx, cz) = position.center(chunk_size);
    if sampler.zone_field().is_urban(cx, cz, config.city_mask_threshold) {
        ZoneKind::City
    } else {
        ZoneKind::Wilderness
    }
}

pub fn generate_layout(
    sampler: &TerrainSampler,
    config: &StreamingConfig,
    position: ChunkPosition,
    chunk_size: f64,
) -> ChunkLayout {
    let mut rng = ChaCha8Rng::seed_from_u64(layout_seed(sampler.seed(), position));
    let zone = zone_at(sampler, config, position, chunk_size);

    let mut colliders = Vec::new();
    let mut props = Vec::new();
    match zone {
        ZoneKind::City => lay_out_city(
            sampler,
            config,
            position,
            chunk_size,
            &mut rng,
            &mut colliders,
            &mut props,
        ),
        ZoneKind::Wilderness => lay_out_wilderness(
            sampler,
            config,
            position,
            chunk_size,
            &mut rng,
            &mut colliders,
            &mut props,
        ),
    }

    ChunkLayout {
        position,
        zone,
        colliders: colliders.into(),
        props,
        heightfield: sample_heightfield(
            sampler,
            position,
            config.heightfield_resolution,
            chunk_size,
        ),
    }
}

fn lay_out_city(
    sampler: &TerrainSampler,
    config: &StreamingConfig,
    position: ChunkPosition,
    chunk_size: f64,
    rng: &mut ChaCha8Rng,
    colliders: &mut Vec<Aabb>,
    props: &mut Vec<PropPlacement>,
) {
    let (ox, oz) = position.origin(chunk_size);
    let w = config.block_size - config.road_width;
    let curb = 1.0;

    let mut x = config.block_margin;
    while x < chunk_size - config.block_margin {
        let mut z = config.block_margin;
        while z < chunk_size - config.block_margin {
            let (bx, bz) = (ox + x, oz + z);
            let ground = sampler.height(bx + w * 0.5, bz + w * 0.5);

            colliders.push(Aabb::from_footprint(
                bx - curb,
                bz - curb,
                bx + w + curb,
                bz + w + curb,
                ground,
                config.sidewalk_height,
            ));

            if rng.random::<f64>() < config.building_chance {
                let height = config.building_min_height
                    + rng.random::<f64>() * config.building_height_range;
                colliders.push(Aabb::from_footprint(
                    bx,
                    bz,
                    bx + w,
                    bz + w,
                    ground + config.sidewalk_height,
                    height,
                ));

                let (lx, lz) = (bx + w + 2.0, bz + w + 2.0);
                props.push(PropPlacement {
                    kind: PropKind::Streetlamp,
                    position: DVec3::new(lx, sampler.height(lx, lz), lz),
                    scale: 1.0,
                    flora: None,
                });
            }
            z += config.block_size;
        }
        x += config.block_size;
    }
}

fn lay_out_wilderness(
    sampler: &TerrainSampler,
    config: &StreamingConfig,
    position: ChunkPosition,
    chunk_size: f64,
    rng: &mut ChaCha8Rng,
    colliders: &mut Vec<Aabb>,
    props: &mut Vec<PropPlacement>,
) {
    let (ox, oz) = position.origin(chunk_size);

    let tree_count = config.min_trees + random_below(rng, config.extra_trees);
    for _ in 0..tree_count {
        let tx = ox + rng.random::<f64>() * chunk_size;
        let tz = oz + rng.random::<f64>() * chunk_size;
        let ty = sampler.height(tx, tz);
        let flora = pick_flora(sampler, tx, tz, rng);

        let half = config.trunk_half_width;
        colliders.push(Aabb::from_footprint(
            tx - half,
            tz - half,
            tx + half,
            tz + half,
            ty,
            config.trunk_height,
        ));
        props.push(PropPlacement {
            kind: PropKind::Tree,
            position: DVec3::new(tx, ty, tz),
            scale: 1.0,
            flora,
        });
    }

    let rock_count = config.min_rocks + random_below(rng, config.extra_rocks);
    for _ in 0..rock_count {
        let rx = ox + rng.random::<f64>() * chunk_size;
        let rz = oz + rng.random::<f64>() * chunk_size;
        let ry = sampler.height(rx, rz);
        let flora = pick_flora(sampler, rx, rz, rng);
        props.push(PropPlacement {
            kind: PropKind::Rock,
            position: DVec3::new(rx, ry, rz),
            scale: 0.8 + rng.random::<f64>() * 0.5,
            flora,
        });
    }
}

fn random_below(rng: &mut ChaCha8Rng, bound: u32) -> u32 {
    if bound == 0 { 0 } else { rng.random_range(0..bound) }
}

fn pick_flora(sampler: &TerrainSampler, x: f64, z: f64, rng: &mut ChaCha8Rng) -> Option<String> {
    let biome = sampler.blended_biome(x, z);
    let flora = &biome.dominant().flora;
    if flora.is_empty() {
        None
    } else {
        Some(flora[rng.random_range(0..flora.len())].clone())
    }
}
