// src/terrain/terrain_sampler.rs
use std::sync::Arc;

use glam::DVec3;
use noise::NoiseFn;
use serde::{Deserialize, Serialize};

use super::biome::Biome;
use super::biome_manager::{BiomeField, BlendedBiome};
use super::noise::{FractalNoise, NoiseField, create_noise_function_from_params, lerp, smoothstep};
use super::terrain_config::TerrainConfig;
use super::zone_field::ZoneField;
use crate::config::config_manager::WorldConfiguration;
use crate::error::Result;

/// Height and unit surface normal at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightSample {
    pub height: f64,
    pub normal: DVec3,
}

impl HeightSample {
    pub fn flat(height: f64) -> Self {
        Self {
            height,
            normal: DVec3::Y,
        }
    }
}

/// Ground oracle consumed by the physics step.
pub trait GroundSampler {
    fn sample(&self, x: f64, z: f64) -> HeightSample;
}

impl<F> GroundSampler for F
where
    F: Fn(f64, f64) -> HeightSample,
{
    fn sample(&self, x: f64, z: f64) -> HeightSample {
        self(x, z)
    }
}

struct SamplerInner {
    seed: u64,
    config: TerrainConfig,
    base: FractalNoise,
    detail: FractalNoise,
    ridges: FractalNoise,
    rivers: FractalNoise,
    extra_layers: Vec<Box<dyn NoiseFn<f64, 2> + Send + Sync>>,
    zones: ZoneField,
    biomes: BiomeField,
}

/// The height/normal oracle for the whole world. Pure, immutable and
/// cheap to clone; clones share the same fields.
#[derive(Clone)]
pub struct TerrainSampler {
    inner: Arc<SamplerInner>,
}

impl std::fmt::Debug for TerrainSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainSampler")
            .field("seed", &self.inner.seed)
            .field("chunk_size", &self.inner.biomes.chunk_size())
            .finish()
    }
}

impl TerrainSampler {
    pub fn new(config: &WorldConfiguration) -> Result<Self> {
        let biomes = BiomeField::new(&config.biome, config.chunk_size)?;
        let zones = ZoneField::new(config.world_seed, config.zone.clone());
        Ok(Self::from_parts(config.world_seed, config.terrain.clone(), zones, biomes))
    }

    pub fn from_parts(
        seed: u64,
        config: TerrainConfig,
        zones: ZoneField,
        biomes: BiomeField,
    ) -> Self {
        let field = NoiseField::new(seed);
        let extra_layers = config
            .extra_layers
            .iter()
            .enumerate()
            .map(|(i, params)| {
                create_noise_function_from_params(params, seed.wrapping_add(i as u64 + 1))
            })
            .collect();

        Self {
            inner: Arc::new(SamplerInner {
                seed,
                base: FractalNoise::new(field, config.base),
                detail: FractalNoise::new(field, config.detail),
                ridges: FractalNoise::new(field, config.ridges),
                rivers: FractalNoise::new(field, config.rivers),
                extra_layers,
                config,
                zones,
                biomes,
            }),
        }
    }

    pub fn seed(&self) -> u64 {
        self.inner.seed
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.inner.config
    }

    pub fn zone_field(&self) -> &ZoneField {
        &self.inner.zones
    }

    pub fn biome_field(&self) -> &BiomeField {
        &self.inner.biomes
    }

    /// Terrain before urban flattening and the height floor.
    pub fn natural_height(&self, x: f64, z: f64) -> f64 {
        let s = &*self.inner;
        let layered: f64 = s.extra_layers.iter().map(|layer| layer.get([x, z])).sum();
        s.base.sample(x, z)
            + s.detail.sample(x, z)
            + s.ridges.sample(x, z)
            + self.blended_biome(x, z).altitude_bias * s.config.biome_altitude_scale
            + s.rivers.sample(x, z)
            + layered
    }

    pub fn height(&self, x: f64, z: f64) -> f64 {
        let c = &self.inner.config;
        let natural = self.natural_height(x, z);
        let mask = self.urban_mask(x, z);
        let urban = lerp(natural, c.plateau_height, mask);
        let h = lerp(natural, urban, smoothstep(c.urban_blend_start, c.urban_blend_end, mask));
        if h.is_finite() { h.max(c.height_floor) } else { c.height_floor }
    }

    /// Central-difference normal, always unit length.
    pub fn normal(&self, x: f64, z: f64) -> DVec3 {
        let e = self.inner.config.normal_epsilon;
        let n = DVec3::new(
            self.height(x - e, z) - self.height(x + e, z),
            2.0 * e,
            self.height(x, z - e) - self.height(x, z + e),
        );
        let len = n.length();
        if len.is_finite() && len > f64::EPSILON { n / len } else { DVec3::Y }
    }

    pub fn sample(&self, x: f64, z: f64) -> HeightSample {
        HeightSample {
            height: self.height(x, z),
            normal: self.normal(x, z),
        }
    }

    pub fn urban_mask(&self, x: f64, z: f64) -> f64 {
        self.inner.zones.urban_mask(x, z)
    }

    pub fn blended_biome(&self, x: f64, z: f64) -> BlendedBiome<'_> {
        self.inner.biomes.blended_biome(x, z)
    }

    pub fn biome_at(&self, x: f64, z: f64) -> Biome {
        self.blended_biome(x, z).to_biome()
    }
}

impl GroundSampler for TerrainSampler {
    fn sample(&self, x: f64, z: f64) -> HeightSample {
        TerrainSampler::sample(self, x, z)
    }
}
