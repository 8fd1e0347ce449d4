//! Deterministic chunked terrain with biome and urban-zone blending, plus a
//! simple body integrator that collides against per-chunk static boxes and
//! snaps to the terrain.

pub mod config;
pub mod error;
pub mod physics;
pub mod terrain;
pub mod threading;

pub use config::{ConfigurationManager, WorldConfiguration};
pub use error::{Result, WorldError};
pub use physics::{Aabb, BodyConfig, BodyHandle, PhysicsWorld, StepReport};
pub use terrain::{ChunkManager, ChunkPosition, GroundSampler, HeightSample, TerrainSampler};
