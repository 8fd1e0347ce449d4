use std::collections::HashSet;
use std::sync::Arc;

use glam::DVec3;

use worldgen::physics::{BodyConfig, PhysicsWorld};
use worldgen::terrain::{ChunkManager, ChunkPosition, LocationName, TerrainSampler, generate_layout};
use worldgen::threading::ThreadPool;
use worldgen::WorldConfiguration;

fn config(render_distance: i32) -> WorldConfiguration {
    let mut config = WorldConfiguration::default();
    config.streaming.render_distance = render_distance;
    config.streaming.heightfield_resolution = 5;
    config
}

#[test]
fn streamed_colliders_match_generated_layouts() {
    let config = config(1);
    let sampler = TerrainSampler::new(&config).unwrap();
    let mut manager = ChunkManager::new(&config, sampler.clone()).unwrap();
    let mut world = PhysicsWorld::from_configuration(&config).unwrap();

    manager.update(DVec3::new(-50.0, 0.0, 350.0), &mut world).unwrap();
    assert_eq!(manager.center(), Some(ChunkPosition::new(-1, 1)));

    for key in manager.active_chunks().collect::<Vec<_>>() {
        let fresh = generate_layout(&sampler, &config.streaming, key, config.chunk_size);
        let streamed = manager.layout(key).unwrap();
        assert_eq!(streamed, &fresh);
        assert_eq!(world.colliders().get(key).map(|c| c.len()), Some(fresh.colliders.len()));
    }
}

#[test]
fn parallel_and_serial_generation_agree() {
    let mut serial_config = config(2);
    serial_config.streaming.use_parallel_processing = false;
    let parallel_config = config(2);
    let sampler = TerrainSampler::new(&parallel_config).unwrap();

    let mut serial = ChunkManager::new(&serial_config, sampler.clone()).unwrap();
    let pool = Arc::new(ThreadPool::new(3).unwrap());
    let mut parallel = ChunkManager::with_thread_pool(&parallel_config, sampler, pool);
    let mut world_a = PhysicsWorld::from_configuration(&serial_config).unwrap();
    let mut world_b = PhysicsWorld::from_configuration(&parallel_config).unwrap();

    let focus = DVec3::new(1234.0, 0.0, -987.0);
    let a = serial.update(focus, &mut world_a).unwrap();
    let b = parallel.update(focus, &mut world_b).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.loaded.len(), 25);
    for key in &a.loaded {
        assert_eq!(serial.layout(*key), parallel.layout(*key));
    }
}

#[test]
fn walking_focus_keeps_loaded_set_bounded() {
    let config = config(1);
    let sampler = TerrainSampler::new(&config).unwrap();
    let mut manager = ChunkManager::new(&config, sampler).unwrap();
    let mut world = PhysicsWorld::from_configuration(&config).unwrap();

    let mut ever_loaded = HashSet::new();
    for step in 0..20 {
        let focus = DVec3::new(step as f64 * 150.0, 0.0, step as f64 * 40.0);
        let delta = manager.update(focus, &mut world).unwrap();
        ever_loaded.extend(delta.loaded.iter().copied());

        let center = delta.center;
        for key in center.square(1) {
            assert!(manager.is_chunk_loaded(key), "{key} missing around {center}");
        }
        for key in manager.active_chunks() {
            assert!(key.ring_distance(center) <= 2);
            assert!(world.colliders().contains(key));
        }
        assert_eq!(world.colliders().chunk_count(), manager.active_count());
        assert!(manager.active_count() <= 25);
    }
    assert!(ever_loaded.len() > 9);
}

#[test]
fn body_lands_in_streamed_world() {
    let config = config(1);
    let sampler = TerrainSampler::new(&config).unwrap();
    let mut manager = ChunkManager::new(&config, sampler.clone()).unwrap();
    let mut world = PhysicsWorld::from_configuration(&config).unwrap();

    let (x, z) = (5.0, 5.0);
    let start = DVec3::new(x, sampler.height(x, z) + 40.0, z);
    manager.update(start, &mut world).unwrap();
    let h = world.register_body(BodyConfig::at(start)).unwrap();

    for _ in 0..600 {
        let focus = world.body(h).unwrap().position();
        manager.update(focus, &mut world).unwrap();
        world.step(1.0 / 60.0, &sampler);
    }

    let body = world.body(h).unwrap();
    let p = body.position();
    assert!(body.is_grounded());
    assert!(p.y >= sampler.height(p.x, p.z) - world.config().ground_snap_margin);

    let chunk = ChunkPosition::from_world(p.x, p.z, config.chunk_size);
    let zone = manager.layout(chunk).unwrap().zone;
    assert_eq!(manager.location_name(p), LocationName::new(chunk, zone));
}
