// src/terrain/noise/noise_utils.rs
use noise::NoiseFn;

use super::noise_field::{NoiseField, ridge};
use super::noise_parameters::{FractalParameters, FractalType};

/// A `NoiseField` evaluated through one set of `FractalParameters`.
/// Output is already scaled by the layer amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalNoise {
    field: NoiseField,
    params: FractalParameters,
}

impl FractalNoise {
    pub fn new(field: NoiseField, params: FractalParameters) -> Self {
        Self { field, params }
    }

    pub fn params(&self) -> &FractalParameters {
        &self.params
    }

    #[inline]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let p = &self.params;
        let (sx, sz) = (x * p.frequency, z * p.frequency);
        let raw = match p.fractal_type {
            FractalType::None => self.field.perlin(sx, sz),
            FractalType::Fbm => self.field.fbm(sx, sz, p.octaves, p.lacunarity, p.gain),
            FractalType::Ridged => {
                let r = ridge(self.field.perlin(sx, sz).abs());
                // repeated multiply instead of powi keeps results bit-stable
                (1..p.exponent).fold(r, |acc, _| acc * r)
            }
        };
        raw * p.amplitude
    }
}

impl NoiseFn<f64, 2> for FractalNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

// Boxed constructor for heterogeneous layer stacks built from configuration.
pub fn create_noise_function_from_params(
    params: &FractalParameters,
    seed: u64,
) -> Box<dyn NoiseFn<f64, 2> + Send + Sync> {
    Box::new(FractalNoise::new(NoiseField::new(seed), *params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fbm_layer_matches_field() {
        let field = NoiseField::new(8);
        let layer = FractalNoise::new(field, FractalParameters::fbm(0.01, 5, 2.0, 0.45, 12.0));
        let expected = field.fbm(300.0 * 0.01, 400.0 * 0.01, 5, 2.0, 0.45) * 12.0;
        assert_eq!(layer.sample(300.0, 400.0), expected);
    }

    #[test]
    fn test_ridged_layer_is_non_negative_for_positive_amplitude() {
        let layer = FractalNoise::new(NoiseField::new(2), FractalParameters::ridged(0.02, 6.0, 1));
        for i in 0..200 {
            let v = layer.sample(i as f64 * 3.7, i as f64 * -1.3);
            assert!((0.0..=6.0).contains(&v));
        }
    }

    #[test]
    fn test_ridged_exponent_squares() {
        let field = NoiseField::new(4);
        let once = FractalNoise::new(field, FractalParameters::ridged(0.004, 1.0, 1));
        let squared = FractalNoise::new(field, FractalParameters::ridged(0.004, 1.0, 2));
        let r = once.sample(123.0, 456.0);
        assert_eq!(squared.sample(123.0, 456.0), r * r);
    }

    #[test]
    fn test_boxed_layer_matches_concrete() {
        let params = FractalParameters::fbm(0.04, 3, 2.7, 0.5, 2.5);
        let boxed = create_noise_function_from_params(&params, 99);
        let concrete = FractalNoise::new(NoiseField::new(99), params);
        assert_eq!(boxed.get([12.5, -8.25]), concrete.sample(12.5, -8.25));
    }
}
