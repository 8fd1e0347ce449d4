// src/terrain/chunk_position.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer key of a square chunk of world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk owning the world position `(x, z)`.
    pub fn from_world(x: f64, z: f64, chunk_size: f64) -> Self {
        // float -> int casts saturate, so far-out positions clamp to the edge chunks
        Self {
            x: (x / chunk_size).floor() as i32,
            z: (z / chunk_size).floor() as i32,
        }
    }

    /// World-space corner with the smallest coordinates.
    pub fn origin(&self, chunk_size: f64) -> (f64, f64) {
        (self.x as f64 * chunk_size, self.z as f64 * chunk_size)
    }

    pub fn center(&self, chunk_size: f64) -> (f64, f64) {
        let (ox, oz) = self.origin(chunk_size);
        (ox + chunk_size * 0.5, oz + chunk_size * 0.5)
    }

    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// All chunks within `radius` on both axes, this one included. Keys
    /// beyond the `i32` range are skipped, so every key appears once.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkPosition> {
        (-radius..=radius).flat_map(move |dx| {
            (-radius..=radius).filter_map(move |dz| {
                Some(Self {
                    x: self.x.checked_add(dx)?,
                    z: self.z.checked_add(dz)?,
                })
            })
        })
    }

    /// The 3x3 block centred on this chunk.
    pub fn neighborhood(self) -> impl Iterator<Item = ChunkPosition> {
        self.square(1)
    }

    /// Chebyshev distance in chunks.
    pub fn ring_distance(&self, other: ChunkPosition) -> i32 {
        let d = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(d).unwrap_or(i32::MAX)
    }
}

impl From<(i32, i32)> for ChunkPosition {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}
