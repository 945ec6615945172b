/// Salt for the x offset of a tile's blend anchor.
pub const BLEND_OFFSET_X_SALT: u32 = 10;
/// Salt for the z offset of a tile's blend anchor.
pub const BLEND_OFFSET_Z_SALT: u32 = 11;
/// Salt for the strength multiplier of a tile's blend anchor.
pub const BLEND_WEIGHT_SALT: u32 = 12;
/// First salt used for tree decisions; decision `n` uses `DECISION_SALT_BASE + n`.
pub const DECISION_SALT_BASE: u32 = 0x0100_0000;

const MIX_X: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_Z: u64 = 0xC2B2_AE3D_27D4_EB4F;
const MIX_SALT: u64 = 0x1656_67B1_9E37_79F9;

const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Stateless hash of `(x, z, salt)` under a world seed.
///
/// Every value is a pure function of its inputs, so nothing derived from it
/// ever has to be stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpatialNoise {
    seed: u64,
    mixed: u64,
}

impl SpatialNoise {
    #[inline]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            mixed: finalize(seed ^ MIX_SALT),
        }
    }

    #[inline]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn value_for(&self, x: i32, z: i32, salt: u32) -> u64 {
        let mut h = finalize(self.mixed ^ u64::from(x as u32).wrapping_mul(MIX_X));
        h = finalize(h ^ u64::from(z as u32).wrapping_mul(MIX_Z));
        finalize(h ^ u64::from(salt).wrapping_mul(MIX_SALT))
    }

    /// The upper half of [`value_for`](Self::value_for).
    #[inline]
    pub fn int_for(&self, x: i32, z: i32, salt: u32) -> u32 {
        (self.value_for(x, z, salt) >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn double_for(&self, x: i32, z: i32, salt: u32) -> f64 {
        (self.value_for(x, z, salt) >> 11) as f64 * UNIT_SCALE
    }
}

// splitmix64 finalizer
#[inline]
const fn finalize(mut v: u64) -> u64 {
    v ^= v >> 30;
    v = v.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v ^= v >> 27;
    v = v.wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^ (v >> 31)
}
