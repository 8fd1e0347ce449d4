pub mod noise_field;
pub mod noise_parameters;
pub mod noise_utils;

pub use noise_field::{NoiseField, fade, lerp, ridge, smoothstep};
pub use noise_parameters::{FractalParameters, FractalType};
pub use noise_utils::{FractalNoise, create_noise_function_from_params};
