// src/physics/physics_config.rs
use serde::{Deserialize, Serialize};

use crate::terrain::terrain_config::finite_or;

/// Tunables of the body integrator. Units are world units and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f64,
    /// Default speed cap for bodies.
    pub terminal_velocity: f64,
    /// Default ground friction for bodies. Per-second decay rate.
    pub ground_friction: f64,
    /// Default horizontal damping for bodies.
    pub air_drag: f64,
    /// Cosine of the steepest slope that still holds speed.
    /// Recommended range: 0.5 - 1.0
    pub slope_limit: f64,
    /// How far below a collider top the feet may have been and still step onto it.
    pub step_height: f64,
    pub ground_acceleration: f64,
    pub air_acceleration: f64,
    pub jump_speed: f64,
    pub default_bounciness: f64,
    /// Impact speed below which landings never bounce.
    pub bounce_threshold: f64,
    /// Gap under which a body counts as touching the ground.
    pub ground_snap_margin: f64,
    /// Height above the surface a grounded body rests at. Kept below the snap margin.
    pub contact_offset: f64,
    /// Extra separation added when pushing out of a collider.
    pub collision_skin: f64,
    /// Horizontal speed kept after sliding along a collider.
    pub collision_restitution: f64,
    /// Speed kept per sub-step on slopes steeper than the limit.
    pub steep_slope_retention: f64,
    pub max_sub_delta: f64,
    /// Longer frames are clamped to this.
    pub max_frame_delta: f64,
    pub use_parallel_processing: bool,
    /// Body count from which the parallel path is taken.
    pub parallel_body_threshold: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 38.5,
            terminal_velocity: 150.0,
            ground_friction: 10.0,
            air_drag: 0.35,
            slope_limit: 0.92,
            step_height: 0.75,
            ground_acceleration: 10.0,
            air_acceleration: 4.25,
            jump_speed: 15.5,
            default_bounciness: 0.05,
            bounce_threshold: 4.0,
            ground_snap_margin: 0.1,
            contact_offset: 0.05,
            collision_skin: 0.001,
            collision_restitution: 0.85,
            steep_slope_retention: 0.3,
            max_sub_delta: 1.0 / 60.0,
            max_frame_delta: 0.25,
            use_parallel_processing: false,
            parallel_body_threshold: 64,
        }
    }
}

impl PhysicsConfig {
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let defaults = Self::default();

        for (name, value, fallback) in [
            ("terminal_velocity", &mut self.terminal_velocity, defaults.terminal_velocity),
            ("max_sub_delta", &mut self.max_sub_delta, defaults.max_sub_delta),
            ("max_frame_delta", &mut self.max_frame_delta, defaults.max_frame_delta),
            ("ground_snap_margin", &mut self.ground_snap_margin, defaults.ground_snap_margin),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                warnings.push(format!("physics: {name} must be positive, reset to {fallback}"));
                *value = fallback;
            }
        }
        for (name, value, fallback) in [
            ("gravity", &mut self.gravity, defaults.gravity),
            ("ground_friction", &mut self.ground_friction, defaults.ground_friction),
            ("air_drag", &mut self.air_drag, defaults.air_drag),
            ("step_height", &mut self.step_height, defaults.step_height),
            ("ground_acceleration", &mut self.ground_acceleration, defaults.ground_acceleration),
            ("air_acceleration", &mut self.air_acceleration, defaults.air_acceleration),
            ("jump_speed", &mut self.jump_speed, defaults.jump_speed),
            ("bounce_threshold", &mut self.bounce_threshold, defaults.bounce_threshold),
            ("collision_skin", &mut self.collision_skin, defaults.collision_skin),
        ] {
            if !value.is_finite() || *value < 0.0 {
                warnings.push(format!("physics: {name} must be non-negative, reset to {fallback}"));
                *value = fallback;
            }
        }
        for (name, value, fallback) in [
            ("slope_limit", &mut self.slope_limit, defaults.slope_limit),
            (
                "default_bounciness",
                &mut self.default_bounciness,
                defaults.default_bounciness,
            ),
            (
                "collision_restitution",
                &mut self.collision_restitution,
                defaults.collision_restitution,
            ),
            (
                "steep_slope_retention",
                &mut self.steep_slope_retention,
                defaults.steep_slope_retention,
            ),
        ] {
            if !(0.0..=1.0).contains(&*value) {
                warnings.push(format!(
                    "physics: {name} must be within [0, 1], reset to {fallback}"
                ));
                *value = fallback;
            }
        }

        self.contact_offset = finite_or(self.contact_offset, defaults.contact_offset).max(0.0);
        if self.contact_offset >= self.ground_snap_margin {
            warnings.push(
                "physics: contact_offset must stay below ground_snap_margin, set to half the margin"
                    .into(),
            );
            self.contact_offset = self.ground_snap_margin * 0.5;
        }
        if self.max_sub_delta > self.max_frame_delta {
            warnings.push("physics: max_sub_delta exceeded max_frame_delta, lowered".into());
            self.max_sub_delta = self.max_frame_delta;
        }

        warnings
    }
}
