// Export all components from the terrain module
pub mod biome;
pub mod biome_manager;
pub mod chunk_layout;
pub mod chunk_manager;
pub mod chunk_position;
pub mod generation_utils;
pub mod noise;
pub mod terrain_config;
pub mod terrain_sampler;
pub mod zone_field;

// Re-export main types for easier access
pub use biome::{Biome, default_catalog};
pub use biome_manager::{BiomeField, BlendedBiome};
pub use chunk_layout::{ChunkLayout, PropKind, PropPlacement, ZoneKind, generate_layout, zone_at};
pub use chunk_manager::{ChunkManager, LocationName, StreamingDelta};
pub use chunk_position::ChunkPosition;
pub use generation_utils::{Heightfield, sample_heightfield};
pub use noise::NoiseField;
pub use terrain_config::{BiomeConfig, StreamingConfig, TerrainConfig, ZoneConfig};
pub use terrain_sampler::{GroundSampler, HeightSample, TerrainSampler};
pub use zone_field::ZoneField;
