use crate::error::LayoutError;

/// Blocks along one side of a tile.
pub const TILE_SIZE: i32 = 16;
pub const TILE_AREA: usize = (TILE_SIZE * TILE_SIZE) as usize;
/// Tiles along one side of a region (4096 blocks).
pub const DEFAULT_REGION_TILES: i32 = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub rx: i32,
    pub rz: i32,
}

impl RegionCoord {
    #[inline]
    pub const fn new(rx: i32, rz: i32) -> Self {
        Self { rx, rz }
    }
}

impl From<(i32, i32)> for RegionCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Maps tiles and blocks onto regions.
///
/// The region grid is shifted by half a region, so block (0, 0) sits in the
/// middle of region (0, 0). Division floors, so negative coordinates land in
/// negative regions with non-negative local offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionLayout {
    region_tiles: i32,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            region_tiles: DEFAULT_REGION_TILES,
        }
    }
}

impl RegionLayout {
    pub fn new(region_tiles: i32) -> Result<Self, LayoutError> {
        if region_tiles <= 0 || region_tiles % 2 != 0 || region_tiles > i32::MAX / TILE_SIZE {
            return Err(LayoutError::InvalidRegionTiles(region_tiles));
        }
        Ok(Self { region_tiles })
    }

    #[inline]
    pub const fn region_tiles(self) -> i32 {
        self.region_tiles
    }

    #[inline]
    pub const fn region_blocks(self) -> i32 {
        self.region_tiles * TILE_SIZE
    }

    #[inline]
    pub fn tile_of_block(x: i32) -> i32 {
        x.div_euclid(TILE_SIZE)
    }

    #[inline]
    fn shifted(self, tile: i32) -> i64 {
        i64::from(tile) + i64::from(self.region_tiles / 2)
    }

    #[inline]
    pub fn region_of_tile(self, tile_x: i32, tile_z: i32) -> RegionCoord {
        let n = i64::from(self.region_tiles);
        RegionCoord::new(
            self.shifted(tile_x).div_euclid(n) as i32,
            self.shifted(tile_z).div_euclid(n) as i32,
        )
    }

    #[inline]
    pub fn region_of_block(self, x: i32, z: i32) -> RegionCoord {
        self.region_of_tile(Self::tile_of_block(x), Self::tile_of_block(z))
    }

    /// Offset of a tile inside its region.
    #[inline]
    pub fn local_of_tile(self, tile_x: i32, tile_z: i32) -> (usize, usize) {
        let n = i64::from(self.region_tiles);
        (
            self.shifted(tile_x).rem_euclid(n) as usize,
            self.shifted(tile_z).rem_euclid(n) as usize,
        )
    }

    /// First tile of a region.
    #[inline]
    pub fn origin_tile(self, coord: RegionCoord) -> (i32, i32) {
        let n = i64::from(self.region_tiles);
        let half = n / 2;
        (
            (i64::from(coord.rx) * n - half) as i32,
            (i64::from(coord.rz) * n - half) as i32,
        )
    }
}
