// src/terrain/terrain_config.rs
use serde::{Deserialize, Serialize};

use super::biome::{Biome, default_catalog};
use super::noise::FractalParameters;

/// Height stack of the terrain sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Broad rolling hills.
    pub base: FractalParameters,
    /// Small bumps layered on top.
    pub detail: FractalParameters,
    /// Mountain ridges.
    pub ridges: FractalParameters,
    /// River channels. Negative amplitude carves.
    pub rivers: FractalParameters,
    /// Multiplier applied to the blended biome altitude bias.
    pub biome_altitude_scale: f64,
    /// Height of flattened city ground.
    pub plateau_height: f64,
    /// Urban mask band over which flattened ground fades in.
    /// Recommended range: 0.0 - 1.0, start < end
    pub urban_blend_start: f64,
    pub urban_blend_end: f64,
    /// Lowest height the sampler will ever report.
    pub height_floor: f64,
    /// Finite difference step for normals, in world units.
    pub normal_epsilon: f64,
    /// Additional layers summed into natural terrain, each seeded
    /// from the world seed plus its index.
    pub extra_layers: Vec<FractalParameters>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            base: FractalParameters::fbm(0.01, 5, 2.0, 0.45, 12.0),
            detail: FractalParameters::fbm(0.04, 3, 2.7, 0.5, 2.5),
            ridges: FractalParameters::ridged(0.02, 6.0, 1),
            rivers: FractalParameters::ridged(0.004, -5.0, 2),
            biome_altitude_scale: 10.0,
            plateau_height: 0.75,
            urban_blend_start: 0.28,
            urban_blend_end: 0.7,
            height_floor: -25.0,
            normal_epsilon: 0.5,
            extra_layers: Vec::new(),
        }
    }
}

impl TerrainConfig {
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        warnings.extend(self.base.validate_and_fix("terrain.base"));
        warnings.extend(self.detail.validate_and_fix("terrain.detail"));
        warnings.extend(self.ridges.validate_and_fix("terrain.ridges"));
        warnings.extend(self.rivers.validate_and_fix("terrain.rivers"));
        for (i, layer) in self.extra_layers.iter_mut().enumerate() {
            warnings.extend(layer.validate_and_fix(&format!("terrain.extra_layers[{i}]")));
        }

        self.urban_blend_start = finite_or(self.urban_blend_start, 0.28).clamp(0.0, 1.0);
        self.urban_blend_end = finite_or(self.urban_blend_end, 0.7).clamp(0.0, 1.0);
        if self.urban_blend_start >= self.urban_blend_end {
            warnings.push("terrain: urban blend band was empty, reset to 0.28..0.7".into());
            self.urban_blend_start = 0.28;
            self.urban_blend_end = 0.7;
        }
        if !self.normal_epsilon.is_finite() || self.normal_epsilon <= 0.0 {
            warnings.push("terrain: normal_epsilon must be positive, reset to 0.5".into());
            self.normal_epsilon = 0.5;
        }
        self.biome_altitude_scale = finite_or(self.biome_altitude_scale, 10.0);
        self.plateau_height = finite_or(self.plateau_height, 0.75);
        self.height_floor = finite_or(self.height_floor, -25.0);

        warnings
    }
}

/// Urban mask parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Urbanness at which the mask crosses 0.5.
    /// Recommended range: 0.2 - 0.8
    pub threshold: f64,
    /// Half-width of the soft threshold.
    pub band: f64,
    pub coarse_frequency: f64,
    pub coarse_weight: f64,
    pub warp_frequency: f64,
    pub warp_weight: f64,
    /// Spatial offset of the warp sample.
    pub warp_offset: f64,
    pub detail_frequency: f64,
    pub detail_amplitude: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            threshold: 0.45,
            band: 0.15,
            coarse_frequency: 0.0025,
            coarse_weight: 0.65,
            warp_frequency: 0.005,
            warp_weight: 0.35,
            warp_offset: 1375.0,
            detail_frequency: 0.03,
            detail_amplitude: 0.04,
        }
    }
}

impl ZoneConfig {
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.band.is_finite() || self.band <= 0.0 {
            warnings.push("zone: band must be positive, reset to 0.15".into());
            self.band = 0.15;
        }
        for (name, value, fallback) in [
            ("coarse_frequency", &mut self.coarse_frequency, 0.0025),
            ("warp_frequency", &mut self.warp_frequency, 0.005),
            ("detail_frequency", &mut self.detail_frequency, 0.03),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                warnings.push(format!("zone: {name} must be positive, reset to {fallback}"));
                *value = fallback;
            }
        }
        self.threshold = finite_or(self.threshold, 0.45);
        self.coarse_weight = finite_or(self.coarse_weight, 0.65);
        self.warp_weight = finite_or(self.warp_weight, 0.35);
        self.warp_offset = finite_or(self.warp_offset, 1375.0);
        self.detail_amplitude = finite_or(self.detail_amplitude, 0.04);
        warnings
    }
}

/// Biome classification and edge blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    pub seed: u64,
    /// Noise frequency in chunk units.
    pub frequency: f64,
    /// Distance from a chunk edge over which neighbouring biomes blend in.
    /// Must not exceed half the chunk size.
    pub edge_blend_distance: f64,
    pub catalog: Vec<Biome>,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            seed: 7777,
            frequency: 0.37,
            edge_blend_distance: 18.0,
            catalog: default_catalog(),
        }
    }
}

impl BiomeConfig {
    pub fn validate_and_fix(&mut self, chunk_size: f64) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            warnings.push("biome: frequency must be positive, reset to 0.37".into());
            self.frequency = 0.37;
        }
        let max_blend = chunk_size * 0.5;
        if !self.edge_blend_distance.is_finite() || self.edge_blend_distance <= 0.0 {
            warnings.push("biome: edge_blend_distance must be positive, reset to 18".into());
            self.edge_blend_distance = 18.0_f64.min(max_blend);
        } else if self.edge_blend_distance > max_blend {
            warnings.push(format!(
                "biome: edge_blend_distance capped at half the chunk size ({max_blend})"
            ));
            self.edge_blend_distance = max_blend;
        }
        if self.catalog.is_empty() {
            warnings.push("biome: catalog was empty, restored the default catalog".into());
            self.catalog = default_catalog();
        }
        warnings
    }
}

/// Chunk streaming and layout generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunks kept resident on each side of the focus chunk.
    pub render_distance: i32,
    /// Retired layouts kept for quick reloading.
    pub layout_cache_size: usize,
    /// Worker threads for layout generation. 0 = one per CPU.
    pub max_threads: usize,
    pub use_parallel_processing: bool,
    /// Vertices per chunk edge of the sampled heightfield. Below 2 disables it.
    pub heightfield_resolution: u32,
    /// Urban mask at the chunk centre from which a chunk is laid out as city.
    pub city_mask_threshold: f64,
    pub block_size: f64,
    pub road_width: f64,
    pub block_margin: f64,
    pub sidewalk_height: f64,
    pub building_chance: f64,
    pub building_min_height: f64,
    pub building_height_range: f64,
    pub min_trees: u32,
    pub extra_trees: u32,
    pub min_rocks: u32,
    pub extra_rocks: u32,
    pub trunk_half_width: f64,
    pub trunk_height: f64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 2,
            layout_cache_size: 64,
            max_threads: 0,
            use_parallel_processing: true,
            heightfield_resolution: 21,
            city_mask_threshold: 0.5,
            block_size: 60.0,
            road_width: 25.0,
            block_margin: 10.0,
            sidewalk_height: 1.0,
            building_chance: 0.9,
            building_min_height: 80.0,
            building_height_range: 150.0,
            min_trees: 4,
            extra_trees: 6,
            min_rocks: 2,
            extra_rocks: 3,
            trunk_half_width: 0.5,
            trunk_height: 4.0,
        }
    }
}

impl StreamingConfig {
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.render_distance < 0 {
            warnings.push("streaming: render_distance raised to 0".into());
            self.render_distance = 0;
        } else if self.render_distance > 16 {
            warnings.push("streaming: render_distance capped at 16".into());
            self.render_distance = 16;
        }
        if !self.block_size.is_finite() || self.block_size <= 0.0 {
            warnings.push("streaming: block_size reset to 60".into());
            self.block_size = 60.0;
        }
        if !self.road_width.is_finite()
            || self.road_width < 0.0
            || self.road_width >= self.block_size
        {
            warnings.push("streaming: road_width must be in [0, block_size), reset".into());
            self.road_width = (self.block_size * 0.4).min(25.0);
        }
        self.block_margin = finite_or(self.block_margin, 10.0).max(0.0);
        self.sidewalk_height = finite_or(self.sidewalk_height, 1.0).max(0.0);
        self.building_chance = finite_or(self.building_chance, 0.9).clamp(0.0, 1.0);
        self.building_min_height = finite_or(self.building_min_height, 80.0).max(0.0);
        self.building_height_range = finite_or(self.building_height_range, 150.0).max(0.0);
        self.city_mask_threshold = finite_or(self.city_mask_threshold, 0.5).clamp(0.0, 1.0);
        self.trunk_half_width = finite_or(self.trunk_half_width, 0.5).max(0.0);
        self.trunk_height = finite_or(self.trunk_height, 4.0).max(0.0);
        if self.heightfield_resolution > 257 {
            warnings.push("streaming: heightfield_resolution capped at 257".into());
            self.heightfield_resolution = 257;
        }
        warnings
    }
}

pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
