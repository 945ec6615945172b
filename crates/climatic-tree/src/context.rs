use climatic_noise::{Climate, ClimateSampler, DECISION_SALT_BASE, SpatialNoise};

/// Evaluation state for classifying a single tile.
///
/// The climate is resolved once at construction. Decision seeds come from a
/// cursor into the tile's seed stream: each call to
/// [`next_decision_seed`](Self::next_decision_seed) hashes the next unused
/// index, so no two decisions in one evaluation share randomness and the
/// whole walk is reproducible from (tile, world seed, decision index).
#[derive(Clone, Debug)]
pub struct TileContext {
    tile_x: i32,
    tile_z: i32,
    noise: SpatialNoise,
    climate: Climate,
    decisions: u32,
}

impl TileContext {
    #[inline]
    pub fn new(tile_x: i32, tile_z: i32, noise: SpatialNoise, climate: Climate) -> Self {
        Self {
            tile_x,
            tile_z,
            noise,
            climate,
            decisions: 0,
        }
    }

    #[inline]
    pub fn sample(tile_x: i32, tile_z: i32, noise: SpatialNoise, sampler: &ClimateSampler) -> Self {
        Self::new(tile_x, tile_z, noise, sampler.sample(tile_x, tile_z))
    }

    #[inline]
    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_z)
    }

    #[inline]
    pub fn climate(&self) -> Climate {
        self.climate
    }

    /// Temperature scalar of this tile.
    #[inline]
    pub fn climate_value(&self) -> f64 {
        self.climate.temperature
    }

    #[inline]
    pub fn noise_value(&self) -> f64 {
        self.climate.noise
    }

    pub fn next_decision_seed(&mut self) -> u64 {
        let salt = DECISION_SALT_BASE.wrapping_add(self.decisions);
        self.decisions = self.decisions.wrapping_add(1);
        self.noise.value_for(self.tile_x, self.tile_z, salt)
    }

    #[inline]
    pub fn decisions_drawn(&self) -> u32 {
        self.decisions
    }
}
