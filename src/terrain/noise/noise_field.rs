// src/terrain/noise/noise_field.rs
use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use noise::NoiseFn;

// Lattice gradients. A fixed table keeps the gradient path free of sin/cos.
const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

// Unit-gradient 2D perlin peaks at sqrt(1/2); this maps it onto ~[-1, 1].
const PERLIN_SCALE: f64 = SQRT_2;

/// Seeded lattice noise. Everything here is integer hashing plus IEEE
/// add/mul/floor, so a given seed produces bit-identical output on every
/// platform and every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoiseField {
    seed: u64,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Hash of an integer lattice coordinate, uniform in `[0, 1)`.
    pub fn hash(&self, ix: i64, iz: i64) -> f64 {
        // top 53 bits -> exact f64 mantissa
        (self.hash_bits(ix, iz) >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Unit gradient assigned to a lattice corner.
    pub fn gradient(&self, ix: i64, iz: i64) -> (f64, f64) {
        GRADIENTS[(self.hash_bits(ix, iz) & 7) as usize]
    }

    /// Gradient noise with quintic fade, clamped to `[-1, 1]`.
    pub fn perlin(&self, x: f64, z: f64) -> f64 {
        let x0 = x.floor();
        let z0 = z.floor();
        let fx = x - x0;
        let fz = z - z0;
        // `as` saturates, so absurdly large inputs still land on a valid corner
        let ix = x0 as i64;
        let iz = z0 as i64;
        let ix1 = ix.wrapping_add(1);
        let iz1 = iz.wrapping_add(1);

        let d00 = self.corner(ix, iz, fx, fz);
        let d10 = self.corner(ix1, iz, fx - 1.0, fz);
        let d01 = self.corner(ix, iz1, fx, fz - 1.0);
        let d11 = self.corner(ix1, iz1, fx - 1.0, fz - 1.0);

        let u = fade(fx);
        let v = fade(fz);
        let value = lerp(lerp(d00, d10, u), lerp(d01, d11, u), v);
        (value * PERLIN_SCALE).clamp(-1.0, 1.0)
    }

    /// Un-normalized fractal sum of `octaves` perlin layers.
    pub fn fbm(&self, x: f64, z: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64 {
        let mut sum = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..octaves {
            let (sx, sz) = (x * frequency, z * frequency);
            if !sx.is_finite() || !sz.is_finite() {
                break;
            }
            sum += self.perlin(sx, sz) * amplitude;
            frequency *= lacunarity;
            amplitude *= gain;
        }
        sum
    }

    fn corner(&self, ix: i64, iz: i64, dx: f64, dz: f64) -> f64 {
        let (gx, gz) = self.gradient(ix, iz);
        gx * dx + gz * dz
    }

    fn hash_bits(&self, ix: i64, iz: i64) -> u64 {
        let mut h = mix(self.seed ^ 0x9E37_79B9_7F4A_7C15);
        h = mix(h ^ (ix as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
        mix(h ^ (iz as u64).wrapping_mul(0x1656_67B1_9E37_79F9))
    }
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.perlin(point[0], point[1])
    }
}

// splitmix64 finalizer
pub(crate) fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Quintic smootherstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic hermite easing between two edges. A zero-width band acts as a step.
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let width = edge1 - edge0;
    if width.abs() < f64::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / width).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Folds a `[0, 1]` value into a tent: 0 at both ends, 1 at 0.5.
#[inline]
pub fn ridge(v: f64) -> f64 {
    2.0 * (0.5 - (0.5 - v).abs())
}
