// src/physics/aabb.rs
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Axis-aligned static box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box standing on `base_y` with the given horizontal footprint.
    pub fn from_footprint(
        min_x: f64,
        min_z: f64,
        max_x: f64,
        max_z: f64,
        base_y: f64,
        height: f64,
    ) -> Self {
        Self {
            min: DVec3::new(min_x, base_y, min_z),
            max: DVec3::new(max_x, base_y + height, max_z),
        }
    }

    /// Rejects boxes with non-finite corners or `min > max` on any axis.
    /// `index` is reported back in the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        for (axis, lo, hi) in [
            ('x', self.min.x, self.max.x),
            ('y', self.min.y, self.max.y),
            ('z', self.min.z, self.max.z),
        ] {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(WorldError::MalformedCollider { index, axis });
            }
        }
        Ok(())
    }

    pub fn top(&self) -> f64 {
        self.max.y
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains_point(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn contains_xz(&self, x: f64, z: f64) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    /// True when `[bottom, top]` intersects the box's vertical extent.
    pub fn overlaps_span(&self, bottom: f64, top: f64) -> bool {
        top >= self.min.y && bottom <= self.max.y
    }

    pub fn closest_point_xz(&self, x: f64, z: f64) -> DVec2 {
        DVec2::new(x.clamp(self.min.x, self.max.x), z.clamp(self.min.z, self.max.z))
    }

    /// Exit for a circle of `radius` whose centre lies in the footprint:
    /// the outward face normal, as `(x, z)`, needing the shortest push, and that push.
    /// Faces are tried in the order -X, +X, -Z, +Z; ties keep the earlier.
    pub fn exit_face(&self, x: f64, z: f64, radius: f64) -> (DVec2, f64) {
        let candidates = [
            (DVec2::NEG_X, x - self.min.x + radius),
            (DVec2::X, self.max.x - x + radius),
            (DVec2::NEG_Y, z - self.min.z + radius),
            (DVec2::Y, self.max.z - z + radius),
        ];
        candidates
            .into_iter()
            .fold(candidates[0], |best, c| if c.1 < best.1 { c } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(DVec3::ZERO, DVec3::ONE)
    }

    #[test]
    fn test_validate_reports_axis() {
        assert!(unit_box().validate(0).is_ok());
        let inverted = Aabb::new(DVec3::new(0.0, 2.0, 0.0), DVec3::ONE);
        assert!(matches!(
            inverted.validate(3),
            Err(WorldError::MalformedCollider { index: 3, axis: 'y' })
        ));
        let nan = Aabb::new(DVec3::new(f64::NAN, 0.0, 0.0), DVec3::ONE);
        assert!(matches!(nan.validate(0), Err(WorldError::MalformedCollider { axis: 'x', .. })));
    }

    #[test]
    fn test_flat_box_is_valid() {
        let slab = Aabb::from_footprint(0.0, 0.0, 10.0, 10.0, 1.0, 0.0);
        assert!(slab.validate(0).is_ok());
        assert_eq!(slab.top(), 1.0);
    }

    #[test]
    fn test_closest_point_clamps_to_footprint() {
        let b = unit_box();
        assert_eq!(b.closest_point_xz(2.0, 0.5), DVec2::new(1.0, 0.5));
        assert_eq!(b.closest_point_xz(0.25, 0.75), DVec2::new(0.25, 0.75));
    }

    #[test]
    fn test_exit_face_prefers_shallowest() {
        let b = Aabb::new(DVec3::ZERO, DVec3::new(10.0, 1.0, 10.0));
        assert_eq!(b.exit_face(9.0, 5.0, 0.5), (DVec2::X, 1.5));
        assert_eq!(b.exit_face(5.0, 0.5, 0.5), (DVec2::NEG_Y, 1.0));
    }

    #[test]
    fn test_exit_face_tie_uses_fixed_order() {
        let b = Aabb::new(DVec3::ZERO, DVec3::new(10.0, 1.0, 10.0));
        // centre of the footprint: all four faces tie
        assert_eq!(b.exit_face(5.0, 5.0, 0.5).0, DVec2::NEG_X);
    }
}
