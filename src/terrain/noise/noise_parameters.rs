// src/terrain/noise/noise_parameters.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalType {
    /// Single perlin sample.
    None,
    /// Fractal sum of `octaves` perlin layers.
    Fbm,
    /// `ridge(|perlin|)`, raised to `exponent`.
    Ridged,
}

/// One layer of the height stack: which fractal, where on the lattice it is
/// sampled, and how much height it contributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalParameters {
    pub fractal_type: FractalType,
    /// World units -> lattice units.
    pub frequency: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    /// Amplitude falloff per octave (persistence).
    pub gain: f64,
    /// Output multiplier. Negative values carve instead of raise.
    pub amplitude: f64,
    /// Integer power applied to ridged output. 1 leaves it untouched.
    #[serde(default = "default_exponent")]
    pub exponent: u32,
}

fn default_exponent() -> u32 {
    1
}

impl FractalParameters {
    pub fn fbm(frequency: f64, octaves: u32, lacunarity: f64, gain: f64, amplitude: f64) -> Self {
        Self {
            fractal_type: FractalType::Fbm,
            frequency,
            octaves,
            lacunarity,
            gain,
            amplitude,
            exponent: 1,
        }
    }

    pub fn ridged(frequency: f64, amplitude: f64, exponent: u32) -> Self {
        Self {
            fractal_type: FractalType::Ridged,
            frequency,
            octaves: 1,
            lacunarity: 2.0,
            gain: 0.5,
            amplitude,
            exponent,
        }
    }

    /// Clamp parameters into ranges the sampler can evaluate; returns a
    /// description of everything that had to change.
    pub fn validate_and_fix(&mut self, label: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            warnings.push(format!("{label}: frequency must be positive, reset to 0.01"));
            self.frequency = 0.01;
        }
        if self.octaves == 0 {
            warnings.push(format!("{label}: octaves raised to 1"));
            self.octaves = 1;
        } else if self.octaves > 10 {
            warnings.push(format!("{label}: octaves capped at 10"));
            self.octaves = 10;
        }
        if !self.lacunarity.is_finite() || self.lacunarity < 1.0 {
            warnings.push(format!("{label}: lacunarity must be >= 1, reset to 2.0"));
            self.lacunarity = 2.0;
        }
        if !self.gain.is_finite() {
            warnings.push(format!("{label}: gain reset to 0.5"));
            self.gain = 0.5;
        }
        self.gain = self.gain.clamp(0.0, 1.0);
        if !self.amplitude.is_finite() {
            warnings.push(format!("{label}: amplitude reset to 0"));
            self.amplitude = 0.0;
        }
        if self.exponent == 0 {
            self.exponent = 1;
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_and_fix_repairs_bad_values() {
        let mut params = FractalParameters::fbm(-1.0, 0, 0.5, f64::NAN, f64::INFINITY);
        let warnings = params.validate_and_fix("base");
        assert_eq!(warnings.len(), 5);
        assert_eq!(params.frequency, 0.01);
        assert_eq!(params.octaves, 1);
        assert_eq!(params.lacunarity, 2.0);
        assert_eq!(params.gain, 0.5);
        assert_eq!(params.amplitude, 0.0);
    }

    #[test]
    fn test_valid_parameters_are_left_alone() {
        let mut params = FractalParameters::fbm(0.01, 5, 2.0, 0.45, 12.0);
        assert!(params.validate_and_fix("base").is_empty());
        assert_eq!(params, FractalParameters::fbm(0.01, 5, 2.0, 0.45, 12.0));
    }

    #[test]
    fn test_exponent_defaults_when_missing_from_toml() {
        let params: FractalParameters = toml::from_str(
            "fractal_type = \"Ridged\"\nfrequency = 0.02\noctaves = 1\n\
             lacunarity = 2.0\ngain = 0.5\namplitude = 6.0\n",
        )
        .unwrap();
        assert_eq!(params.exponent, 1);
        assert_eq!(params.fractal_type, FractalType::Ridged);
    }
}
