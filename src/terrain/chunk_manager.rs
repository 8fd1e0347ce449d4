// src/terrain/chunk_manager.rs
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use glam::DVec3;
use log::{debug, info, warn};
use lru::LruCache;

use super::chunk_layout::{ChunkLayout, ZoneKind, generate_layout, zone_at};
use super::chunk_position::ChunkPosition;
use super::terrain_config::StreamingConfig;
use super::terrain_sampler::TerrainSampler;
use crate::config::config_manager::WorldConfiguration;
use crate::error::Result;
use crate::physics::PhysicsWorld;
use crate::threading::ThreadPool;

const CITY_NAMES: [&str; 5] = [
    "Neo-Tokyo",
    "Cyber City",
    "Metro Prime",
    "Neon District",
    "Grid Zero",
];
const WILD_NAMES: [&str; 4] = ["Wasteland", "Dead Zone", "Outskirts", "Frontier"];

/// Chunks that changed residency during one `ChunkManager::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamingDelta {
    pub center: ChunkPosition,
    /// Newly resident, nearest first.
    pub loaded: Vec<ChunkPosition>,
    pub retired: Vec<ChunkPosition>,
}

impl StreamingDelta {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.retired.is_empty()
    }
}

/// HUD-style area name of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationName {
    pub area: &'static str,
    pub block_letter: char,
    pub block_number: u32,
}

impl LocationName {
    pub fn new(chunk: ChunkPosition, zone: ZoneKind) -> Self {
        let (cx, cz) = (i64::from(chunk.x), i64::from(chunk.z));
        let names: &[&'static str] = match zone {
            ZoneKind::City => &CITY_NAMES,
            ZoneKind::Wilderness => &WILD_NAMES,
        };
        let index = ((cx + cz * 7).unsigned_abs() % names.len() as u64) as usize;
        let letter = (cx % 26).unsigned_abs() as u8;
        Self {
            area: names[index],
            block_letter: char::from(b'A' + letter),
            block_number: (cz % 100).unsigned_abs() as u32,
        }
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Block {}-{}", self.area, self.block_letter, self.block_number)
    }
}

/// Keeps the chunks around a focus position resident and their colliders
/// registered with a `PhysicsWorld`.
pub struct ChunkManager {
    sampler: TerrainSampler,
    config: StreamingConfig,
    chunk_size: f64,
    active: HashMap<ChunkPosition, Arc<ChunkLayout>>,
    // retired layouts, reused when the focus comes back
    cache: LruCache<ChunkPosition, Arc<ChunkLayout>>,
    thread_pool: Arc<ThreadPool>,
    center: Option<ChunkPosition>,
}

impl ChunkManager {
    pub fn new(config: &WorldConfiguration, sampler: TerrainSampler) -> Result<Self> {
        let pool = Arc::new(ThreadPool::new(config.streaming.max_threads)?);
        Ok(Self::with_thread_pool(config, sampler, pool))
    }

    pub fn with_thread_pool(
        config: &WorldConfiguration,
        sampler: TerrainSampler,
        thread_pool: Arc<ThreadPool>,
    ) -> Self {
        let capacity =
            NonZeroUsize::new(config.streaming.layout_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            sampler,
            config: config.streaming.clone(),
            chunk_size: config.chunk_size,
            active: HashMap::new(),
            cache: LruCache::new(capacity),
            thread_pool,
            center: None,
        }
    }

    pub fn sampler(&self) -> &TerrainSampler {
        &self.sampler
    }

    pub fn center(&self) -> Option<ChunkPosition> {
        self.center
    }

    pub fn render_distance(&self) -> i32 {
        self.config.render_distance
    }

    pub fn set_render_distance(&mut self, distance: i32) {
        self.config.render_distance = distance.max(0);
    }

    pub fn layout(&self, key: ChunkPosition) -> Option<&ChunkLayout> {
        self.active.get(&key).map(|layout| layout.as_ref())
    }

    pub fn is_chunk_loaded(&self, key: ChunkPosition) -> bool {
        self.active.contains_key(&key)
    }

    pub fn active_chunks(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.active.keys().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Streams chunks around `focus`: loads every chunk within the render
    /// distance and retires resident chunks more than one chunk beyond it.
    pub fn update(&mut self, focus: DVec3, world: &mut PhysicsWorld) -> Result<StreamingDelta> {
        if !focus.is_finite() {
            warn!("Ignoring non-finite streaming focus {:?}", focus);
            return Ok(StreamingDelta {
                center: self.center.unwrap_or_default(),
                ..StreamingDelta::default()
            });
        }
        let center = ChunkPosition::from_world(focus.x, focus.z, self.chunk_size);
        let distance = self.config.render_distance;

        let mut retired: Vec<_> = self
            .active
            .keys()
            .copied()
            .filter(|key| key.ring_distance(center) > distance + 1)
            .collect();
        retired.sort();
        for key in &retired {
            world.remove_chunk_colliders(*key);
            if let Some(layout) = self.active.remove(key) {
                self.cache.put(*key, layout);
            }
        }

        let mut wanted: Vec<_> = center
            .square(distance)
            .filter(|key| !self.active.contains_key(key))
            .collect();
        wanted.sort_by_key(|key| (key.ring_distance(center), *key));

        let mut ready = Vec::with_capacity(wanted.len());
        let mut to_generate = Vec::new();
        for key in &wanted {
            match self.cache.pop(key) {
                Some(layout) => ready.push(layout),
                None => to_generate.push(*key),
            }
        }
        let cached = ready.len();
        ready.extend(self.generate(&to_generate));

        // register in nearest-first order
        ready.sort_by_key(|layout| (layout.position.ring_distance(center), layout.position));
        for layout in ready {
            world.add_chunk_colliders(layout.position, Arc::clone(&layout.colliders))?;
            debug!("Chunk {} loaded as {:?}", layout.position, layout.zone);
            self.active.insert(layout.position, layout);
        }

        self.center = Some(center);
        let delta = StreamingDelta {
            center,
            loaded: wanted,
            retired,
        };
        if !delta.is_empty() {
            info!(
                "Streaming around {}: {} loaded ({} from cache), {} retired, {} resident",
                center,
                delta.loaded.len(),
                cached,
                delta.retired.len(),
                self.active.len()
            );
        }
        Ok(delta)
    }

    /// Retires every resident chunk.
    pub fn unload_all(&mut self, world: &mut PhysicsWorld) {
        for (key, layout) in self.active.drain() {
            world.remove_chunk_colliders(key);
            self.cache.put(key, layout);
        }
        self.center = None;
    }

    /// Area name for the chunk under `focus`.
    pub fn location_name(&self, focus: DVec3) -> LocationName {
        let chunk = ChunkPosition::from_world(focus.x, focus.z, self.chunk_size);
        let zone = match self.active.get(&chunk) {
            Some(layout) => layout.zone,
            None => zone_at(&self.sampler, &self.config, chunk, self.chunk_size),
        };
        LocationName::new(chunk, zone)
    }

    fn generate(&self, keys: &[ChunkPosition]) -> Vec<Arc<ChunkLayout>> {
        let (sampler, config, chunk_size) = (&self.sampler, &self.config, self.chunk_size);
        let build =
            |key: &ChunkPosition| Arc::new(generate_layout(sampler, config, *key, chunk_size));
        if self.config.use_parallel_processing && keys.len() > 1 {
            self.thread_pool.par_execute(keys, build)
        } else {
            keys.iter().map(build).collect()
        }
    }
}

impl fmt::Debug for ChunkManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkManager")
            .field("center", &self.center)
            .field("active", &self.active.len())
            .field("cached", &self.cache.len())
            .field("render_distance", &self.config.render_distance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(render_distance: i32) -> (ChunkManager, PhysicsWorld) {
        let mut config = WorldConfiguration::default();
        config.streaming.render_distance = render_distance;
        config.streaming.heightfield_resolution = 0;
        let sampler = TerrainSampler::new(&config).unwrap();
        let pool = Arc::new(ThreadPool::new(2).unwrap());
        let manager = ChunkManager::with_thread_pool(&config, sampler, pool);
        let world = PhysicsWorld::from_configuration(&config).unwrap();
        (manager, world)
    }

    #[test]
    fn test_initial_update_loads_square() {
        let (mut manager, mut world) = setup(1);
        let delta = manager.update(DVec3::new(100.0, 0.0, 100.0), &mut world).unwrap();
        assert_eq!(delta.center, ChunkPosition::new(0, 0));
        assert_eq!(delta.loaded.len(), 9);
        assert_eq!(delta.loaded[0], ChunkPosition::new(0, 0));
        assert!(delta.retired.is_empty());
        assert_eq!(manager.active_count(), 9);
        assert_eq!(world.colliders().chunk_count(), 9);
    }

    #[test]
    fn test_hysteresis_keeps_adjacent_ring() {
        let (mut manager, mut world) = setup(1);
        manager.update(DVec3::new(100.0, 0.0, 100.0), &mut world).unwrap();
        // one chunk east: the west column is two rings away, still kept
        let delta = manager.update(DVec3::new(300.0, 0.0, 100.0), &mut world).unwrap();
        assert_eq!(delta.loaded.len(), 3);
        assert!(delta.retired.is_empty());
        assert_eq!(manager.active_count(), 12);

        // another chunk east retires the original west column
        let delta = manager.update(DVec3::new(500.0, 0.0, 100.0), &mut world).unwrap();
        assert_eq!(
            delta.retired,
            vec![
                ChunkPosition::new(-1, -1),
                ChunkPosition::new(-1, 0),
                ChunkPosition::new(-1, 1)
            ]
        );
        assert!(!world.colliders().contains(ChunkPosition::new(-1, 0)));
        assert_eq!(manager.cached_count(), 3);
    }

    #[test]
    fn test_returning_reuses_cached_layouts() {
        let (mut manager, mut world) = setup(0);
        manager.update(DVec3::new(100.0, 0.0, 100.0), &mut world).unwrap();
        let original = manager.layout(ChunkPosition::new(0, 0)).cloned().unwrap();
        manager.update(DVec3::new(900.0, 0.0, 100.0), &mut world).unwrap();
        assert!(!manager.is_chunk_loaded(ChunkPosition::new(0, 0)));
        manager.update(DVec3::new(100.0, 0.0, 100.0), &mut world).unwrap();
        assert_eq!(manager.layout(ChunkPosition::new(0, 0)), Some(&original));
    }

    #[test]
    fn test_repeated_update_is_quiet() {
        let (mut manager, mut world) = setup(2);
        manager.update(DVec3::new(10.0, 0.0, 10.0), &mut world).unwrap();
        let delta = manager.update(DVec3::new(20.0, 0.0, 30.0), &mut world).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_unload_all_clears_colliders() {
        let (mut manager, mut world) = setup(1);
        manager.update(DVec3::ZERO, &mut world).unwrap();
        manager.unload_all(&mut world);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(world.colliders().chunk_count(), 0);
    }

    #[test]
    fn test_location_names() {
        let origin = LocationName::new(ChunkPosition::new(0, 0), ZoneKind::City);
        assert_eq!(origin.to_string(), "Neo-Tokyo, Block A-0");
        let wild = LocationName::new(ChunkPosition::new(-3, 2), ZoneKind::Wilderness);
        // |-3 + 14| = 11 -> 11 % 4 = 3
        assert_eq!(wild.to_string(), "Frontier, Block D-2");
        let far = LocationName::new(ChunkPosition::new(i32::MIN, i32::MAX), ZoneKind::City);
        assert!(far.block_letter.is_ascii_uppercase());
    }
}
