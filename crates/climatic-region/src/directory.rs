use std::sync::Arc;

use climatic_tree::{ClassificationId, TreeRegistry};

use crate::blend::{Anchor, BoundaryBlender, Neighborhood};
use crate::cache::{RegionCache, RegionCacheStats, RegionKey};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grid::RegionGrid;
use crate::layout::{RegionCoord, RegionLayout, TILE_AREA, TILE_SIZE};
use crate::source::{GridSource, TreeGridSource};

/// Blended classifications for a rectangle of blocks, row-major by z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationGrid {
    pub origin_x: i64,
    pub origin_z: i64,
    pub size_x: usize,
    pub size_z: usize,
    ids: Vec<ClassificationId>,
}

impl ClassificationGrid {
    fn empty(origin_x: i64, origin_z: i64, size_x: usize, size_z: usize) -> Self {
        Self {
            origin_x,
            origin_z,
            size_x,
            size_z,
            ids: vec![ClassificationId::default(); size_x * size_z],
        }
    }

    #[inline]
    pub fn ids(&self) -> &[ClassificationId] {
        &self.ids
    }

    #[inline]
    pub fn into_ids(self) -> Vec<ClassificationId> {
        self.ids
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> Option<ClassificationId> {
        if x >= self.size_x || z >= self.size_z {
            return None;
        }
        self.ids.get(z * self.size_x + x).copied()
    }

    /// Lookup by absolute block coordinate.
    #[inline]
    pub fn get_world(&self, wx: i64, wz: i64) -> Option<ClassificationId> {
        let dx = wx - self.origin_x;
        let dz = wz - self.origin_z;
        if dx < 0 || dz < 0 {
            return None;
        }
        self.get(dx as usize, dz as usize)
    }

    /// Copy out a sub-rectangle. The offsets and sizes are clamped to this grid.
    pub fn slice(&self, off_x: usize, off_z: usize, size_x: usize, size_z: usize) -> Self {
        let off_x = off_x.min(self.size_x);
        let off_z = off_z.min(self.size_z);
        let size_x = size_x.min(self.size_x - off_x);
        let size_z = size_z.min(self.size_z - off_z);
        let mut ids = Vec::with_capacity(size_x * size_z);
        for z in off_z..off_z + size_z {
            let row = z * self.size_x;
            ids.extend_from_slice(&self.ids[row + off_x..row + off_x + size_x]);
        }
        Self {
            origin_x: self.origin_x + off_x as i64,
            origin_z: self.origin_z + off_z as i64,
            size_x,
            size_z,
            ids,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[ClassificationId]> {
        self.ids.chunks(self.size_x.max(1)).take(self.size_z)
    }
}

/// Query facade for one world seed.
///
/// Dominant ids come from region grids held in a [`RegionCache`], which may be
/// shared with directories of other seeds; block ids are blended from the 3x3
/// tile neighbourhood around the queried tile. Safe to share between threads.
pub struct RegionDirectory<S = TreeGridSource> {
    source: S,
    layout: RegionLayout,
    cache: Arc<RegionCache>,
    blender: BoundaryBlender,
    world_seed: u64,
}

impl RegionDirectory<TreeGridSource> {
    pub fn from_config(
        registry: Arc<TreeRegistry>,
        config: &EngineConfig,
        world_seed: u64,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let root = registry
            .id_by_name(&config.root)
            .ok_or_else(|| EngineError::UnknownRoot(config.root.clone()))?;
        let source = TreeGridSource::new(registry, root, world_seed, &config.climate, config.layout()?);
        Ok(Self::new(source, config.cache.capacity, world_seed))
    }
}

impl<S: GridSource> RegionDirectory<S> {
    /// A directory with a cache of its own.
    pub fn new(source: S, cache_capacity: usize, world_seed: u64) -> Self {
        Self::with_cache(source, Arc::new(RegionCache::new(cache_capacity)), world_seed)
    }

    /// A directory whose grids live in `cache`, keyed by `world_seed`.
    pub fn with_cache(source: S, cache: Arc<RegionCache>, world_seed: u64) -> Self {
        Self {
            layout: source.layout(),
            source,
            cache,
            blender: BoundaryBlender::new(world_seed),
            world_seed,
        }
    }

    #[inline]
    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    #[inline]
    pub fn layout(&self) -> RegionLayout {
        self.layout
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn cache(&self) -> &RegionCache {
        &self.cache
    }

    #[inline]
    pub fn cache_stats(&self) -> RegionCacheStats {
        self.cache.stats()
    }

    #[inline]
    pub fn region_of_block(&self, x: i32, z: i32) -> RegionCoord {
        self.layout.region_of_block(x, z)
    }

    #[inline]
    pub fn region_of_tile(&self, tile_x: i32, tile_z: i32) -> RegionCoord {
        self.layout.region_of_tile(tile_x, tile_z)
    }

    #[inline]
    pub fn local_of_tile(&self, tile_x: i32, tile_z: i32) -> (usize, usize) {
        self.layout.local_of_tile(tile_x, tile_z)
    }

    pub fn region(&self, coord: RegionCoord) -> Arc<RegionGrid> {
        self.cache
            .get_or_build(RegionKey::new(self.world_seed, coord), || self.source.build_region(coord))
    }

    /// Unblended classification of a tile.
    pub fn dominant_tile(&self, tile_x: i32, tile_z: i32) -> ClassificationId {
        let (lx, lz) = self.layout.local_of_tile(tile_x, tile_z);
        self.region(self.layout.region_of_tile(tile_x, tile_z)).get(lx, lz)
    }

    /// Unblended classification of the tile containing a block.
    pub fn dominant_block(&self, x: i32, z: i32) -> ClassificationId {
        self.dominant_tile(RegionLayout::tile_of_block(x), RegionLayout::tile_of_block(z))
    }

    pub fn neighborhood(&self, tile_x: i32, tile_z: i32) -> Neighborhood {
        let mut window = RegionWindow::new(self);
        self.blender
            .neighborhood(tile_x, tile_z, |tx, tz| window.dominant(tx, tz))
    }

    /// Blended classification of one block.
    pub fn classify_block(&self, x: i32, z: i32) -> ClassificationId {
        let n = self.neighborhood(RegionLayout::tile_of_block(x), RegionLayout::tile_of_block(z));
        n.blend_block(i64::from(x), i64::from(z))
    }

    /// All 256 blended blocks of one tile, indexed `local_z * 16 + local_x`.
    pub fn tile_grid(&self, tile_x: i32, tile_z: i32) -> [ClassificationId; TILE_AREA] {
        self.neighborhood(tile_x, tile_z).blend_tile()
    }

    /// Blended classifications of `size_x * size_z` blocks starting at block
    /// `(tile_x * 16, tile_z * 16)`.
    pub fn classify_area(
        &self,
        tile_x: i32,
        tile_z: i32,
        size_x: usize,
        size_z: usize,
    ) -> ClassificationGrid {
        let tile = i64::from(TILE_SIZE);
        let origin_x = i64::from(tile_x) * tile;
        let origin_z = i64::from(tile_z) * tile;
        let mut out = ClassificationGrid::empty(origin_x, origin_z, size_x, size_z);
        if size_x == 0 || size_z == 0 {
            return out;
        }

        let ts = TILE_SIZE as usize;
        let tiles_x = size_x.div_ceil(ts);
        let tiles_z = size_z.div_ceil(ts);

        // anchors for the covered tiles plus a one-tile border
        let (wx, wz) = (tiles_x + 2, tiles_z + 2);
        let mut window = RegionWindow::new(self);
        let mut anchors: Vec<Anchor> = Vec::with_capacity(wx * wz);
        for j in 0..wz {
            let tz = tile_z.wrapping_add(j as i32 - 1);
            for i in 0..wx {
                let tx = tile_x.wrapping_add(i as i32 - 1);
                anchors.push(self.blender.anchor_for(tx, tz, window.dominant(tx, tz)));
            }
        }

        for tj in 0..tiles_z {
            for ti in 0..tiles_x {
                let n = Neighborhood::new(
                    tile_x.wrapping_add(ti as i32),
                    tile_z.wrapping_add(tj as i32),
                    std::array::from_fn(|k| anchors[(tj + k % 3) * wx + ti + k / 3]),
                );
                let (bx0, bz0) = (ti * ts, tj * ts);
                for lz in 0..ts.min(size_z - bz0) {
                    let bz = bz0 + lz;
                    let row = bz * size_x;
                    for lx in 0..ts.min(size_x - bx0) {
                        let bx = bx0 + lx;
                        out.ids[row + bx] =
                            n.blend_block(origin_x + bx as i64, origin_z + bz as i64);
                    }
                }
            }
        }
        out
    }

    /// Like [`classify_area`](Self::classify_area) but starting at any block.
    ///
    /// Computes the enclosing tile-aligned area and slices it, so every block
    /// matches the aligned result for the same absolute position.
    pub fn classify_unaligned_area(
        &self,
        x: i32,
        z: i32,
        size_x: usize,
        size_z: usize,
    ) -> ClassificationGrid {
        let off_x = x.rem_euclid(TILE_SIZE) as usize;
        let off_z = z.rem_euclid(TILE_SIZE) as usize;
        let aligned = self.classify_area(
            RegionLayout::tile_of_block(x),
            RegionLayout::tile_of_block(z),
            size_x + off_x,
            size_z + off_z,
        );
        aligned.slice(off_x, off_z, size_x, size_z)
    }
}

/// Remembers the last region fetched so neighbouring lookups skip the cache.
struct RegionWindow<'a, S> {
    dir: &'a RegionDirectory<S>,
    current: Option<Arc<RegionGrid>>,
}

impl<'a, S: GridSource> RegionWindow<'a, S> {
    fn new(dir: &'a RegionDirectory<S>) -> Self {
        Self { dir, current: None }
    }

    fn dominant(&mut self, tile_x: i32, tile_z: i32) -> ClassificationId {
        let layout = self.dir.layout;
        let coord = layout.region_of_tile(tile_x, tile_z);
        let grid = match self.current.take() {
            Some(grid) if grid.coord() == coord => grid,
            _ => self.dir.region(coord),
        };
        let (lx, lz) = layout.local_of_tile(tile_x, tile_z);
        let id = grid.get(lx, lz);
        self.current = Some(grid);
        id
    }
}
