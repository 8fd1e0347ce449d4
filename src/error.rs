// src/error.rs
use thiserror::Error;

use crate::physics::BodyHandle;

/// Every failure the crate can surface. Numeric degeneracies inside a step are
/// clamped locally and never show up here.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("collider {index} has min > max (or a non-finite bound) on the {axis} axis")]
    MalformedCollider { index: usize, axis: char },

    #[error("invalid body configuration: {0}")]
    InvalidBody(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no body registered for handle {0:?}")]
    UnknownBody(BodyHandle),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("failed to read/write JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = WorldError> = std::result::Result<T, E>;
