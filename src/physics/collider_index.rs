// src/physics/collider_index.rs
use std::collections::HashMap;
use std::sync::Arc;

use super::aabb::Aabb;
use crate::error::Result;
use crate::terrain::chunk_position::ChunkPosition;

/// Static colliders grouped by the chunk that registered them.
#[derive(Debug, Clone)]
pub struct ColliderIndex {
    chunk_size: f64,
    chunks: HashMap<ChunkPosition, Arc<[Aabb]>>,
}

impl ColliderIndex {
    pub fn new(chunk_size: f64) -> Self {
        Self {
            chunk_size,
            chunks: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    /// Validates every box, then replaces whatever the chunk held before.
    pub fn insert(
        &mut self,
        key: ChunkPosition,
        colliders: Arc<[Aabb]>,
    ) -> Result<Option<Arc<[Aabb]>>> {
        for (index, collider) in colliders.iter().enumerate() {
            collider.validate(index)?;
        }
        Ok(self.chunks.insert(key, colliders))
    }

    pub fn remove(&mut self, key: ChunkPosition) -> Option<Arc<[Aabb]>> {
        self.chunks.remove(&key)
    }

    pub fn get(&self, key: ChunkPosition) -> Option<&Arc<[Aabb]>> {
        self.chunks.get(&key)
    }

    pub fn contains(&self, key: ChunkPosition) -> bool {
        self.chunks.contains_key(&key)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn collider_count(&self) -> usize {
        self.chunks.values().map(|c| c.len()).sum()
    }

    /// Colliders registered in the 3x3 chunk block around `(x, z)`.
    pub fn query(&self, x: f64, z: f64) -> impl Iterator<Item = &Aabb> + '_ {
        ChunkPosition::from_world(x, z, self.chunk_size)
            .neighborhood()
            .filter_map(|key| self.chunks.get(&key))
            .flat_map(|colliders| colliders.iter())
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}
