pub mod aabb;
pub mod body;
pub mod collider_index;
pub mod physics_config;
pub mod physics_world;

pub use aabb::Aabb;
pub use body::{BodyConfig, BodyHandle, ContactState, PhysicsBody};
pub use collider_index::ColliderIndex;
pub use physics_config::PhysicsConfig;
pub use physics_world::{PhysicsWorld, StepReport, VolumeEffect};
