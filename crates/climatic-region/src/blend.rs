use climatic_noise::{BLEND_OFFSET_X_SALT, BLEND_OFFSET_Z_SALT, BLEND_WEIGHT_SALT, SpatialNoise};
use climatic_tree::ClassificationId;

use crate::layout::{TILE_AREA, TILE_SIZE};

/// A tile's dominant classification pinned to a jittered block position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub x: i64,
    pub z: i64,
    /// In `[1, 2)`.
    pub weight: f64,
    pub id: ClassificationId,
}

impl Anchor {
    /// Influence at a block, `weight / (1 + d²)`.
    #[inline]
    pub fn effect_at(&self, x: i64, z: i64) -> f64 {
        let dx = (x - self.x) as f64;
        let dz = (z - self.z) as f64;
        self.weight / (1.0 + dx * dx + dz * dz)
    }
}

/// The nine anchors around a tile, indexed `(dx + 1) * 3 + (dz + 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighborhood {
    tile_x: i32,
    tile_z: i32,
    anchors: [Anchor; 9],
}

impl Neighborhood {
    #[inline]
    pub fn new(tile_x: i32, tile_z: i32, anchors: [Anchor; 9]) -> Self {
        Self {
            tile_x,
            tile_z,
            anchors,
        }
    }

    #[inline]
    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_z)
    }

    #[inline]
    pub fn anchors(&self) -> &[Anchor; 9] {
        &self.anchors
    }

    #[inline]
    pub fn center(&self) -> &Anchor {
        &self.anchors[4]
    }

    /// Classification of the block at absolute `(x, z)`.
    ///
    /// The anchor with the strictly largest effect wins; ties keep the
    /// earliest anchor in scan order.
    pub fn blend_block(&self, x: i64, z: i64) -> ClassificationId {
        let mut best = &self.anchors[0];
        let mut best_effect = best.effect_at(x, z);
        for anchor in &self.anchors[1..] {
            let effect = anchor.effect_at(x, z);
            if effect > best_effect {
                best = anchor;
                best_effect = effect;
            }
        }
        best.id
    }

    /// All blocks of the centre tile, indexed `local_z * 16 + local_x`.
    pub fn blend_tile(&self) -> [ClassificationId; TILE_AREA] {
        let bx = i64::from(self.tile_x) * i64::from(TILE_SIZE);
        let bz = i64::from(self.tile_z) * i64::from(TILE_SIZE);
        let mut out = [ClassificationId::default(); TILE_AREA];
        for (i, slot) in out.iter_mut().enumerate() {
            let lx = (i % TILE_SIZE as usize) as i64;
            let lz = (i / TILE_SIZE as usize) as i64;
            *slot = self.blend_block(bx + lx, bz + lz);
        }
        out
    }
}

/// Places anchors for one world seed.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryBlender {
    noise: SpatialNoise,
}

impl BoundaryBlender {
    pub fn new(world_seed: u64) -> Self {
        Self {
            noise: SpatialNoise::new(world_seed),
        }
    }

    /// Anchor for `tile`, offset within the tile by the seed hash.
    pub fn anchor_for(&self, tile_x: i32, tile_z: i32, id: ClassificationId) -> Anchor {
        let size = TILE_SIZE as u32;
        let ox = self.noise.int_for(tile_x, tile_z, BLEND_OFFSET_X_SALT) % size;
        let oz = self.noise.int_for(tile_x, tile_z, BLEND_OFFSET_Z_SALT) % size;
        Anchor {
            x: i64::from(tile_x) * i64::from(TILE_SIZE) + i64::from(ox),
            z: i64::from(tile_z) * i64::from(TILE_SIZE) + i64::from(oz),
            weight: 1.0 + self.noise.double_for(tile_x, tile_z, BLEND_WEIGHT_SALT),
            id,
        }
    }

    /// Neighbourhood of `tile`, reading dominant ids through `dominant`.
    pub fn neighborhood<F>(&self, tile_x: i32, tile_z: i32, mut dominant: F) -> Neighborhood
    where
        F: FnMut(i32, i32) -> ClassificationId,
    {
        let anchors = std::array::from_fn(|i| {
            let tx = tile_x.wrapping_add(i as i32 / 3 - 1);
            let tz = tile_z.wrapping_add(i as i32 % 3 - 1);
            self.anchor_for(tx, tz, dominant(tx, tz))
        });
        Neighborhood::new(tile_x, tile_z, anchors)
    }
}
