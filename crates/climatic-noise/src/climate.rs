use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClimateParams {
    #[serde(default = "default_temperature_frequency")]
    pub temperature_frequency: f32,
    #[serde(default = "default_temperature_scale")]
    pub temperature_scale: f32,
    #[serde(default = "default_noise_frequency")]
    pub noise_frequency: f32,
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
}
fn default_temperature_frequency() -> f32 {
    0.004
}
fn default_temperature_scale() -> f32 {
    25.0
}
fn default_noise_frequency() -> f32 {
    0.03
}
fn default_noise_scale() -> f32 {
    10.0
}
impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            temperature_frequency: default_temperature_frequency(),
            temperature_scale: default_temperature_scale(),
            noise_frequency: default_noise_frequency(),
            noise_scale: default_noise_scale(),
        }
    }
}

/// Climate scalars resolved for one tile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Climate {
    pub temperature: f64,
    pub noise: f64,
}

impl Climate {
    #[inline]
    pub const fn new(temperature: f64, noise: f64) -> Self {
        Self { temperature, noise }
    }
}

/// Tile-resolution temperature and noise fields for one world seed.
pub struct ClimateSampler {
    temperature: FastNoiseLite,
    noise: FastNoiseLite,
    temperature_scale: f32,
    noise_scale: f32,
}

impl ClimateSampler {
    pub fn new(world_seed: u64, params: &ClimateParams) -> Self {
        let folded = (world_seed ^ (world_seed >> 32)) as u32;
        let mut temperature = FastNoiseLite::with_seed((folded ^ 0x1203_5F31) as i32);
        temperature.set_noise_type(Some(NoiseType::OpenSimplex2));
        temperature.set_frequency(Some(params.temperature_frequency));
        let mut noise = FastNoiseLite::with_seed((folded ^ 0x92E3_A1B2) as i32);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(params.noise_frequency));
        Self {
            temperature,
            noise,
            temperature_scale: params.temperature_scale,
            noise_scale: params.noise_scale,
        }
    }

    pub fn sample(&self, tile_x: i32, tile_z: i32) -> Climate {
        let (x, z) = (tile_x as f32, tile_z as f32);
        let t = ((self.temperature.get_noise_2d(x, z) + 1.0) * 0.5).clamp(0.0, 1.0);
        let n = ((self.noise.get_noise_2d(x, z) + 1.0) * 0.5).clamp(0.0, 1.0);
        Climate {
            temperature: f64::from(t * self.temperature_scale),
            noise: f64::from(n * self.noise_scale),
        }
    }
}
