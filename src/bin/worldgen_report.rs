//! Prints reproducible reference values for a world configuration and drops
//! a test body onto the terrain.
//!
//! Usage: `worldgen-report [CONFIG.toml|CONFIG.json] [--json]`
//! Without a path the global configuration (`$WORLDGEN_CONFIG` or
//! `worldgen.toml`, else defaults) is used.

use glam::DVec3;
use log::{error, info};
use serde::Serialize;

use worldgen::config::{ConfigurationManager, get_world_configuration};
use worldgen::physics::{BodyConfig, PhysicsWorld};
use worldgen::terrain::{ChunkManager, TerrainSampler};
use worldgen::Result;

const SAMPLE_POINTS: [(f64, f64); 2] = [(0.0, 0.0), (1000.0, 1000.0)];
const SAMPLE_CHUNKS: [(i32, i32); 2] = [(0, 0), (1, 0)];
const DROP_HEIGHT: f64 = 40.0;
const DROP_FRAMES: u32 = 600;

#[derive(Debug, Serialize)]
struct HeightEntry {
    x: f64,
    z: f64,
    height: f64,
    bits: String,
    urban_mask: f64,
    biome: String,
}

#[derive(Debug, Serialize)]
struct ChunkEntry {
    cx: i32,
    cz: i32,
    biome: String,
}

#[derive(Debug, Serialize)]
struct DropOutcome {
    start: DVec3,
    end: DVec3,
    ground_height: f64,
    grounded: bool,
    landed_at_frame: Option<u32>,
    location: String,
}

#[derive(Debug, Serialize)]
struct WorldReport {
    world_seed: u64,
    biome_seed: u64,
    chunk_size: f64,
    chunks: Vec<ChunkEntry>,
    heights: Vec<HeightEntry>,
    drop: DropOutcome,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => ConfigurationManager::load_from_file(path)?.get_config().clone(),
        None => get_world_configuration(),
    };
    config.validate()?;

    let sampler = TerrainSampler::new(&config)?;
    let biomes = sampler.biome_field();

    let chunks = SAMPLE_CHUNKS
        .iter()
        .map(|&(cx, cz)| ChunkEntry {
            cx,
            cz,
            biome: biomes.biome_at_chunk(cx, cz).key.clone(),
        })
        .collect();
    let heights = SAMPLE_POINTS
        .iter()
        .map(|&(x, z)| {
            let height = sampler.height(x, z);
            HeightEntry {
                x,
                z,
                height,
                bits: format!("{:#018x}", height.to_bits()),
                urban_mask: sampler.urban_mask(x, z),
                biome: sampler.biome_at(x, z).key,
            }
        })
        .collect();

    let drop = drop_body(&config, &sampler)?;
    let report = WorldReport {
        world_seed: config.world_seed,
        biome_seed: config.biome.seed,
        chunk_size: config.chunk_size,
        chunks,
        heights,
        drop,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn drop_body(
    config: &worldgen::WorldConfiguration,
    sampler: &TerrainSampler,
) -> Result<DropOutcome> {
    let mut world = PhysicsWorld::from_configuration(config)?;
    let mut chunks = ChunkManager::new(config, sampler.clone())?;

    // middle of a road in the origin chunk, clear of city blocks
    let (x, z) = (config.streaming.block_margin * 0.5, config.streaming.block_margin * 0.5);
    let start = DVec3::new(x, sampler.height(x, z) + DROP_HEIGHT, z);
    chunks.update(start, &mut world)?;
    let handle = world.register_body(BodyConfig::at(start))?;

    let mut landed_at_frame = None;
    for frame in 0..DROP_FRAMES {
        let report = world.step(1.0 / 60.0, sampler);
        if landed_at_frame.is_none() && report.landed.contains(&handle) {
            landed_at_frame = Some(frame);
            info!("Test body landed after {} frames", frame + 1);
        }
    }

    let body = world.remove_body(handle)?;
    let end = body.position();
    Ok(DropOutcome {
        start,
        end,
        ground_height: sampler.height(end.x, end.z),
        grounded: body.is_grounded(),
        landed_at_frame,
        location: chunks.location_name(end).to_string(),
    })
}

fn print_report(report: &WorldReport) {
    println!(
        "world seed {}  biome seed {}  chunk size {}",
        report.world_seed, report.biome_seed, report.chunk_size
    );
    for chunk in &report.chunks {
        println!("chunk ({}, {}): {}", chunk.cx, chunk.cz, chunk.biome);
    }
    for entry in &report.heights {
        println!(
            "height({}, {}) = {:.6} [{}]  urban {:.3}  biome {}",
            entry.x, entry.z, entry.height, entry.bits, entry.urban_mask, entry.biome
        );
    }
    let drop = &report.drop;
    println!(
        "drop: {:.2} -> {:.2} over ground {:.2}, grounded {}, landed at frame {:?}, {}",
        drop.start.y,
        drop.end.y,
        drop.ground_height,
        drop.grounded,
        drop.landed_at_frame,
        drop.location
    );
}
