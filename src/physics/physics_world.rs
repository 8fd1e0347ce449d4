// src/physics/physics_world.rs
use std::sync::Arc;

use glam::{DVec2, DVec3};
use log::{debug, warn};
use rayon::prelude::*;

use super::aabb::Aabb;
use super::body::{BodyConfig, BodyHandle, ContactState, PhysicsBody};
use super::collider_index::ColliderIndex;
use super::physics_config::PhysicsConfig;
use crate::config::config_manager::WorldConfiguration;
use crate::error::{Result, WorldError};
use crate::terrain::chunk_position::ChunkPosition;
use crate::terrain::terrain_sampler::{GroundSampler, HeightSample};
use crate::threading::ThreadPool;

/// Effect a dynamic volume applies to each body inside it, once per sub-step.
pub type VolumeEffect = dyn Fn(&mut PhysicsBody, f64) + Send + Sync;

struct DynamicVolume {
    bounds: Aabb,
    effect: Box<VolumeEffect>,
}

/// What one call to `PhysicsWorld::step` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub sub_steps: u32,
    pub simulated_delta: f64,
    /// The frame delta exceeded `max_frame_delta` and was cut down.
    pub clamped: bool,
    /// Bodies that went from airborne to grounded.
    pub landed: Vec<BodyHandle>,
    /// Bodies that went from grounded to airborne.
    pub lifted: Vec<BodyHandle>,
}

/// Owns every dynamic body and the static collider index, and advances
/// bodies against a ground oracle.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    // sorted by handle; handles are issued in increasing order
    bodies: Vec<PhysicsBody>,
    colliders: ColliderIndex,
    volumes: Vec<DynamicVolume>,
    next_id: u64,
    pool: Option<Arc<ThreadPool>>,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig, chunk_size: f64) -> Result<Self> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(WorldError::InvalidConfig(format!(
                "chunk_size must be positive, got {chunk_size}"
            )));
        }
        let problems = config.clone().validate_and_fix();
        if !problems.is_empty() {
            return Err(WorldError::InvalidConfig(problems.join("; ")));
        }

        Ok(Self {
            config,
            bodies: Vec::new(),
            colliders: ColliderIndex::new(chunk_size),
            volumes: Vec::new(),
            next_id: 1,
            pool: None,
        })
    }

    pub fn from_configuration(config: &WorldConfiguration) -> Result<Self> {
        Self::new(config.physics.clone(), config.chunk_size)
    }

    /// Runs parallel integration on `pool` instead of rayon's global pool.
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn colliders(&self) -> &ColliderIndex {
        &self.colliders
    }

    pub fn register_body(&mut self, config: BodyConfig) -> Result<BodyHandle> {
        let handle = BodyHandle(self.next_id);
        let body = PhysicsBody::from_config(handle, &config, &self.config)?;
        self.next_id += 1;
        self.bodies.push(body);
        debug!("Registered {} at {:?}", handle, config.position);
        Ok(handle)
    }

    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<PhysicsBody> {
        let index = self.index_of(handle).ok_or(WorldError::UnknownBody(handle))?;
        debug!("Removed {}", handle);
        Ok(self.bodies.remove(index))
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&PhysicsBody> {
        self.index_of(handle).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsBody> {
        self.index_of(handle).map(move |i| &mut self.bodies[i])
    }

    pub fn bodies(&self) -> impl Iterator<Item = &PhysicsBody> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Registers (or replaces) the static colliders of one chunk. Nothing is
    /// registered when any box is malformed.
    pub fn add_chunk_colliders(
        &mut self,
        key: ChunkPosition,
        colliders: impl Into<Arc<[Aabb]>>,
    ) -> Result<()> {
        let colliders = colliders.into();
        let count = colliders.len();
        self.colliders.insert(key, colliders)?;
        debug!("Chunk {} registered {} colliders", key, count);
        Ok(())
    }

    pub fn remove_chunk_colliders(&mut self, key: ChunkPosition) -> Option<Arc<[Aabb]>> {
        let removed = self.colliders.remove(key);
        if removed.is_some() {
            debug!("Chunk {} colliders removed", key);
        }
        removed
    }

    /// Volumes live for the lifetime of the world and are applied in
    /// registration order.
    pub fn register_dynamic_volume<F>(&mut self, bounds: Aabb, effect: F) -> Result<()>
    where
        F: Fn(&mut PhysicsBody, f64) + Send + Sync + 'static,
    {
        bounds.validate(self.volumes.len())?;
        self.volumes.push(DynamicVolume {
            bounds,
            effect: Box::new(effect),
        });
        Ok(())
    }

    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Advances every body by `delta` seconds.
    ///
    /// Non-finite or non-positive deltas do nothing. Deltas above
    /// `max_frame_delta` are clamped. The remaining time is split into
    /// equal sub-steps no longer than `max_sub_delta`.
    pub fn step<S>(&mut self, delta: f64, ground: &S) -> StepReport
    where
        S: GroundSampler + Sync + ?Sized,
    {
        if !delta.is_finite() || delta <= 0.0 {
            return StepReport::default();
        }
        let clamped = delta > self.config.max_frame_delta;
        let dt = if clamped {
            warn!("Frame delta {:.3}s clamped to {:.3}s", delta, self.config.max_frame_delta);
            self.config.max_frame_delta
        } else {
            delta
        };
        // tolerance keeps 0.1 / (1/60) at 6 sub-steps instead of 7
        let sub_steps = ((dt / self.config.max_sub_delta - 1e-9).ceil() as u32).max(1);
        let h = dt / sub_steps as f64;

        let before: Vec<ContactState> = self.bodies.iter().map(|b| b.contact).collect();
        let integrator = Integrator {
            config: &self.config,
            colliders: &self.colliders,
            volumes: &self.volumes,
            ground,
        };

        let parallel = self.config.use_parallel_processing
            && self.bodies.len() >= self.config.parallel_body_threshold;
        if parallel {
            let run = |bodies: &mut [PhysicsBody]| {
                bodies
                    .par_iter_mut()
                    .for_each(|body| integrator.advance(body, sub_steps, h));
            };
            match &self.pool {
                Some(pool) => pool.install(|| run(&mut self.bodies)),
                None => run(&mut self.bodies),
            }
        } else {
            for body in &mut self.bodies {
                integrator.advance(body, sub_steps, h);
            }
        }

        let mut report = StepReport {
            sub_steps,
            simulated_delta: dt,
            clamped,
            ..StepReport::default()
        };
        for (body, previous) in self.bodies.iter_mut().zip(before) {
            match (previous, body.contact) {
                (ContactState::Airborne, ContactState::Grounded) => report.landed.push(body.handle),
                (ContactState::Grounded, ContactState::Airborne) => report.lifted.push(body.handle),
                _ => {}
            }
            // jump requests do not carry over into the next frame
            body.jump_requested = false;
        }
        report
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies.binary_search_by_key(&handle, |b| b.handle).ok()
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.bodies.len())
            .field("collider_chunks", &self.colliders.chunk_count())
            .field("volumes", &self.volumes.len())
            .finish()
    }
}

/// Read-only view of the world shared by every body during one step.
struct Integrator<'a, S: ?Sized> {
    config: &'a PhysicsConfig,
    colliders: &'a ColliderIndex,
    volumes: &'a [DynamicVolume],
    ground: &'a S,
}

impl<S> Integrator<'_, S>
where
    S: GroundSampler + ?Sized,
{
    fn advance(&self, body: &mut PhysicsBody, sub_steps: u32, h: f64) {
        for _ in 0..sub_steps {
            self.sub_step(body, h);
        }
    }

    fn sub_step(&self, body: &mut PhysicsBody, h: f64) {
        let c = self.config;
        let start = body.position;
        let was_grounded = body.is_grounded();

        if let Some(wish) = body.move_intent {
            let accel = if was_grounded { c.ground_acceleration } else { c.air_acceleration };
            let t = (accel * h).min(1.0);
            body.velocity.x += (wish.x - body.velocity.x) * t;
            body.velocity.z += (wish.z - body.velocity.z) * t;
        }
        if body.jump_requested && was_grounded {
            body.velocity.y = c.jump_speed;
            body.jump_requested = false;
        }

        body.velocity.y -= c.gravity * h;
        let drag = (1.0 - body.damping * h).max(0.0);
        body.velocity.x *= drag;
        body.velocity.z *= drag;
        body.clamp_speed();

        body.position += body.velocity * h;

        let supported = self.resolve_colliders(body, start.y);
        let ground = self.ground.sample(body.position.x, body.position.z);
        self.settle(body, ground, supported, h);

        for volume in self.volumes {
            if volume.bounds.contains_point(body.position) {
                (volume.effect)(body, h);
            }
        }

        sanitize(body, start);
        body.clamp_speed();
    }

    /// Pushes the body out of nearby boxes. Returns true when a box top
    /// now supports it.
    fn resolve_colliders(&self, body: &mut PhysicsBody, previous_feet: f64) -> bool {
        let c = self.config;
        let mut supported = false;

        for collider in self.colliders.query(body.position.x, body.position.z) {
            let feet = body.position.y;
            if !collider.overlaps_span(feet - c.ground_snap_margin, feet + body.height) {
                continue;
            }
            let top = collider.top();
            if body.velocity.y <= 0.0
                && previous_feet >= top - c.step_height
                && footprint_distance(collider, body.position) < body.radius
            {
                body.position.y = top + c.contact_offset;
                body.velocity.y = 0.0;
                supported = true;
                continue;
            }
            if feet >= top {
                continue;
            }
            self.push_out(body, collider);
        }

        supported
    }

    fn push_out(&self, body: &mut PhysicsBody, collider: &Aabb) {
        let c = self.config;
        let center = DVec2::new(body.position.x, body.position.z);
        let offset = center - collider.closest_point_xz(center.x, center.y);
        let distance = offset.length();
        if distance >= body.radius {
            return;
        }

        let (normal, push) = if distance > 1e-9 {
            (offset / distance, body.radius - distance + c.collision_skin)
        } else {
            let (normal, depth) = collider.exit_face(center.x, center.y, body.radius);
            (normal, depth + c.collision_skin)
        };
        body.position.x += normal.x * push;
        body.position.z += normal.y * push;

        let mut planar = DVec2::new(body.velocity.x, body.velocity.z);
        let inward = planar.dot(normal);
        if inward < 0.0 {
            planar -= normal * inward;
            planar *= c.collision_restitution;
        }
        body.velocity.x = planar.x;
        body.velocity.z = planar.y;
    }

    fn settle(&self, body: &mut PhysicsBody, ground: HeightSample, supported: bool, h: f64) {
        let c = self.config;
        if body.position.y <= ground.height + c.ground_snap_margin && body.velocity.y <= 0.0 {
            let normal = unit_or_up(ground.normal);
            let impact = -body.velocity.dot(normal);

            body.contact = ContactState::Grounded;
            body.ground_normal = normal;
            body.position.y = ground.height + c.contact_offset;
            body.velocity -= normal * body.velocity.dot(normal);
            if body.move_intent.is_none() {
                body.velocity *= (1.0 - body.friction * h).max(0.0);
            }
            if normal.y < body.slope_limit {
                body.velocity *= c.steep_slope_retention;
            }
            body.velocity.y = 0.0;
            if impact > c.bounce_threshold && body.bounciness > 0.0 {
                body.velocity += normal * impact * body.bounciness;
            }
        } else {
            body.contact = if supported { ContactState::Grounded } else { ContactState::Airborne };
            body.ground_normal = DVec3::Y;
        }
    }
}

/// Planar distance from `position` to the box footprint; zero inside it.
fn footprint_distance(collider: &Aabb, position: DVec3) -> f64 {
    let center = DVec2::new(position.x, position.z);
    center.distance(collider.closest_point_xz(center.x, center.y))
}

fn unit_or_up(normal: DVec3) -> DVec3 {
    let len = normal.length();
    if len.is_finite() && len > f64::EPSILON { normal / len } else { DVec3::Y }
}

/// Zeroes non-finite velocity components; a non-finite position falls back
/// to where the sub-step started.
fn sanitize(body: &mut PhysicsBody, fallback: DVec3) {
    for component in [&mut body.velocity.x, &mut body.velocity.y, &mut body.velocity.z] {
        if !component.is_finite() {
            *component = 0.0;
        }
    }
    if !body.position.is_finite() {
        body.position = fallback;
    }
}
