// src/physics/body.rs
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::physics_config::PhysicsConfig;
use crate::error::{Result, WorldError};

/// Opaque handle to a body owned by a `PhysicsWorld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) u64);

impl BodyHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactState {
    #[default]
    Airborne,
    Grounded,
}

/// Registration parameters. Unset per-body tunables fall back to the
/// world's `PhysicsConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
    pub radius: f64,
    pub height: f64,
    pub bounciness: f64,
    pub friction: Option<f64>,
    pub damping: Option<f64>,
    pub slope_limit: Option<f64>,
    pub terminal_speed: Option<f64>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            mass: 1.0,
            radius: 0.5,
            height: 1.6,
            bounciness: 0.05,
            friction: None,
            damping: None,
            slope_limit: None,
            terminal_speed: None,
        }
    }
}

impl BodyConfig {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    pub(crate) handle: BodyHandle,
    pub(crate) position: DVec3,
    pub(crate) velocity: DVec3,
    pub(crate) mass: f64,
    pub(crate) radius: f64,
    pub(crate) height: f64,
    pub(crate) friction: f64,
    pub(crate) damping: f64,
    pub(crate) slope_limit: f64,
    pub(crate) bounciness: f64,
    pub(crate) terminal_speed: f64,
    pub(crate) contact: ContactState,
    pub(crate) ground_normal: DVec3,
    pub(crate) move_intent: Option<DVec3>,
    pub(crate) jump_requested: bool,
}

impl PhysicsBody {
    pub(crate) fn from_config(
        handle: BodyHandle,
        config: &BodyConfig,
        physics: &PhysicsConfig,
    ) -> Result<Self> {
        let friction = config.friction.unwrap_or(physics.ground_friction);
        let damping = config.damping.unwrap_or(physics.air_drag);
        let slope_limit = config.slope_limit.unwrap_or(physics.slope_limit);
        let terminal_speed = config.terminal_speed.unwrap_or(physics.terminal_velocity);

        if !config.position.is_finite() || !config.velocity.is_finite() {
            return Err(WorldError::InvalidBody("position and velocity must be finite"));
        }
        if !(config.radius > 0.0 && config.radius.is_finite()) {
            return Err(WorldError::InvalidBody("radius must be positive"));
        }
        if !(config.height > 0.0 && config.height.is_finite()) {
            return Err(WorldError::InvalidBody("height must be positive"));
        }
        if !(config.mass > 0.0 && config.mass.is_finite()) {
            return Err(WorldError::InvalidBody("mass must be positive"));
        }
        if !(friction >= 0.0 && friction.is_finite()) {
            return Err(WorldError::InvalidBody("friction must be non-negative"));
        }
        if !(damping >= 0.0 && damping.is_finite()) {
            return Err(WorldError::InvalidBody("damping must be non-negative"));
        }
        if !(0.0..=1.0).contains(&config.bounciness) {
            return Err(WorldError::InvalidBody("bounciness must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&slope_limit) {
            return Err(WorldError::InvalidBody("slope limit must be within [0, 1]"));
        }
        if !(terminal_speed > 0.0 && terminal_speed.is_finite()) {
            return Err(WorldError::InvalidBody("terminal speed must be positive"));
        }

        let mut body = Self {
            handle,
            position: config.position,
            velocity: config.velocity,
            mass: config.mass,
            radius: config.radius,
            height: config.height,
            friction,
            damping,
            slope_limit,
            bounciness: config.bounciness,
            terminal_speed,
            contact: ContactState::Airborne,
            ground_normal: DVec3::Y,
            move_intent: None,
            jump_requested: false,
        };
        body.clamp_speed();
        Ok(body)
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn slope_limit(&self) -> f64 {
        self.slope_limit
    }

    pub fn bounciness(&self) -> f64 {
        self.bounciness
    }

    pub fn terminal_speed(&self) -> f64 {
        self.terminal_speed
    }

    pub fn contact_state(&self) -> ContactState {
        self.contact
    }

    pub fn is_grounded(&self) -> bool {
        self.contact == ContactState::Grounded
    }

    /// Normal of the last supporting surface. Up while airborne.
    pub fn ground_normal(&self) -> DVec3 {
        self.ground_normal
    }

    pub fn move_intent(&self) -> Option<DVec3> {
        self.move_intent
    }

    /// Teleport. Non-finite positions are refused.
    pub fn set_position(&mut self, position: DVec3) -> Result<()> {
        if !position.is_finite() {
            return Err(WorldError::InvalidBody("position must be finite"));
        }
        self.position = position;
        Ok(())
    }

    /// Instant change of momentum, divided by mass.
    pub fn apply_impulse(&mut self, impulse: DVec3) {
        if impulse.is_finite() {
            self.velocity += impulse / self.mass;
            self.clamp_speed();
        }
    }

    /// Direct velocity change, independent of mass. Used by volume effects.
    pub fn add_velocity(&mut self, delta: DVec3) {
        if delta.is_finite() {
            self.velocity += delta;
            self.clamp_speed();
        }
    }

    /// Horizontal velocity the body accelerates toward. `y` is ignored;
    /// `None` lets the body coast.
    pub fn set_move_intent(&mut self, intent: Option<DVec3>) {
        self.move_intent = intent.filter(|v| v.is_finite()).map(|v| DVec3::new(v.x, 0.0, v.z));
    }

    /// Jumps on the next sub-step the body is grounded within the current frame.
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    pub(crate) fn clamp_speed(&mut self) {
        let speed = self.velocity.length();
        if speed > self.terminal_speed {
            self.velocity *= self.terminal_speed / speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(config: BodyConfig) -> Result<PhysicsBody> {
        PhysicsBody::from_config(BodyHandle(1), &config, &PhysicsConfig::default())
    }

    #[test]
    fn test_defaults_resolve_from_physics_config() {
        let b = body(BodyConfig::default()).unwrap();
        assert_eq!(b.friction(), 10.0);
        assert_eq!(b.damping(), 0.35);
        assert_eq!(b.slope_limit(), 0.92);
        assert_eq!(b.terminal_speed(), 150.0);
        assert_eq!(b.contact_state(), ContactState::Airborne);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        for config in [
            BodyConfig { radius: 0.0, ..BodyConfig::default() },
            BodyConfig { height: -1.0, ..BodyConfig::default() },
            BodyConfig { mass: 0.0, ..BodyConfig::default() },
            BodyConfig { bounciness: 1.5, ..BodyConfig::default() },
            BodyConfig { friction: Some(-0.1), ..BodyConfig::default() },
            BodyConfig { damping: Some(f64::NAN), ..BodyConfig::default() },
            BodyConfig { slope_limit: Some(2.0), ..BodyConfig::default() },
            BodyConfig { terminal_speed: Some(0.0), ..BodyConfig::default() },
            BodyConfig::at(DVec3::new(f64::INFINITY, 0.0, 0.0)),
        ] {
            assert!(matches!(body(config), Err(WorldError::InvalidBody(_))));
        }
    }

    #[test]
    fn test_impulse_respects_mass_and_cap() {
        let mut b = body(BodyConfig { mass: 2.0, ..BodyConfig::default() }).unwrap();
        b.apply_impulse(DVec3::new(4.0, 0.0, 0.0));
        assert_eq!(b.velocity(), DVec3::new(2.0, 0.0, 0.0));
        b.apply_impulse(DVec3::new(1e6, 0.0, 0.0));
        assert!((b.velocity().length() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_intent_is_horizontal() {
        let mut b = body(BodyConfig::default()).unwrap();
        b.set_move_intent(Some(DVec3::new(3.0, 9.0, -4.0)));
        assert_eq!(b.move_intent(), Some(DVec3::new(3.0, 0.0, -4.0)));
        b.set_move_intent(Some(DVec3::splat(f64::NAN)));
        assert_eq!(b.move_intent(), None);
    }

    #[test]
    fn test_teleport_refuses_non_finite() {
        let mut b = body(BodyConfig::default()).unwrap();
        assert!(b.set_position(DVec3::new(1.0, 2.0, 3.0)).is_ok());
        assert!(b.set_position(DVec3::splat(f64::NAN)).is_err());
        assert_eq!(b.position(), DVec3::new(1.0, 2.0, 3.0));
    }
}
