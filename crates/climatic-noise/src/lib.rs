//! Coordinate-seeded hashing and climate fields.
#![forbid(unsafe_code)]

mod climate;
mod spatial;

pub use climate::{Climate, ClimateParams, ClimateSampler};
pub use spatial::{
    BLEND_OFFSET_X_SALT, BLEND_OFFSET_Z_SALT, BLEND_WEIGHT_SALT, DECISION_SALT_BASE, SpatialNoise,
};
