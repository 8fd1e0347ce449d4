// src/terrain/zone_field.rs
use super::noise::{NoiseField, smoothstep};
use super::terrain_config::ZoneConfig;

// Zone noise is decorrelated from terrain noise sharing the same world seed.
const ZONE_SEED_SALT: u64 = 0x5A0E_C17F_00D5_EED5;

/// Continuous urbanness over the plane, soft-thresholded into a 0..1 mask.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneField {
    noise: NoiseField,
    config: ZoneConfig,
}

impl ZoneField {
    pub fn new(world_seed: u64, config: ZoneConfig) -> Self {
        Self {
            noise: NoiseField::new(world_seed ^ ZONE_SEED_SALT),
            config,
        }
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Raw urbanness. Roughly 0..1 before the detail perturbation.
    pub fn urbanness(&self, x: f64, z: f64) -> f64 {
        let c = &self.config;
        let coarse = normalized(self.noise.perlin(x * c.coarse_frequency, z * c.coarse_frequency));
        let warp = normalized(self.noise.perlin(
            (x + c.warp_offset) * c.warp_frequency,
            (z - c.warp_offset) * c.warp_frequency,
        ));
        let detail =
            self.noise.perlin(x * c.detail_frequency, z * c.detail_frequency) * c.detail_amplitude;
        c.coarse_weight * coarse + c.warp_weight * warp + detail
    }

    /// 0 in the wilds, 1 deep in the city.
    pub fn urban_mask(&self, x: f64, z: f64) -> f64 {
        let c = &self.config;
        smoothstep(c.threshold - c.band, c.threshold + c.band, self.urbanness(x, z))
    }

    /// City classification used for chunk layouts and area names.
    pub fn is_urban(&self, x: f64, z: f64, mask_threshold: f64) -> bool {
        self.urban_mask(x, z) >= mask_threshold
    }
}

#[inline]
fn normalized(n: f64) -> f64 {
    (n + 1.0) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> ZoneField {
        ZoneField::new(1337, ZoneConfig::default())
    }

    #[test]
    fn test_mask_is_bounded() {
        let zones = field();
        for i in -100..100 {
            let m = zones.urban_mask(i as f64 * 97.3, i as f64 * -41.9);
            assert!((0.0..=1.0).contains(&m), "mask {m} out of range");
        }
    }

    #[test]
    fn test_mask_is_continuous() {
        let zones = field();
        for i in 0..500 {
            let x = i as f64 * 13.1 - 2000.0;
            let z = i as f64 * 7.7 + 500.0;
            let d = (zones.urban_mask(x + 0.01, z) - zones.urban_mask(x, z)).abs();
            assert!(d < 0.01, "mask jumped by {d} at ({x}, {z})");
        }
    }

    #[test]
    fn test_is_urban_compares_mask_with_threshold() {
        let zones = field();
        for i in 0..200 {
            let (x, z) = (i as f64 * 57.1, i as f64 * -23.3);
            let m = zones.urban_mask(x, z);
            assert_eq!(zones.is_urban(x, z, 0.5), m >= 0.5);
            assert!(zones.is_urban(x, z, 0.0));
            assert_eq!(zones.is_urban(x, z, 1.0), m == 1.0);
        }
    }

    #[test]
    fn test_mask_is_deterministic() {
        let a = field();
        let b = field();
        assert_eq!(a.urban_mask(812.5, -77.0).to_bits(), b.urban_mask(812.5, -77.0).to_bits());
    }

    #[test]
    fn test_mask_follows_threshold() {
        let zones = field();
        let (x, z) = (444.0, 1212.0);
        let u = zones.urbanness(x, z);
        let always_city = ZoneField::new(
            1337,
            ZoneConfig {
                threshold: u - 1.0,
                ..ZoneConfig::default()
            },
        );
        let never_city = ZoneField::new(
            1337,
            ZoneConfig {
                threshold: u + 1.0,
                ..ZoneConfig::default()
            },
        );
        assert_eq!(always_city.urban_mask(x, z), 1.0);
        assert_eq!(never_city.urban_mask(x, z), 0.0);
    }
}
