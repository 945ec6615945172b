use std::sync::Arc;

use climatic_noise::{ClimateParams, ClimateSampler, SpatialNoise};
use climatic_tree::{ClassificationId, TileContext, TreeId, TreeRegistry};

use crate::grid::RegionGrid;
use crate::layout::{RegionCoord, RegionLayout};

/// Produces the dominant-classification grid of a region.
pub trait GridSource: Send + Sync {
    fn layout(&self) -> RegionLayout;

    fn build_region(&self, coord: RegionCoord) -> RegionGrid;
}

/// Builds regions by evaluating a root tree for every tile.
pub struct TreeGridSource {
    registry: Arc<TreeRegistry>,
    root: TreeId,
    noise: SpatialNoise,
    climate: ClimateSampler,
    layout: RegionLayout,
}

impl TreeGridSource {
    pub fn new(
        registry: Arc<TreeRegistry>,
        root: TreeId,
        world_seed: u64,
        climate: &ClimateParams,
        layout: RegionLayout,
    ) -> Self {
        Self {
            registry,
            root,
            noise: SpatialNoise::new(world_seed),
            climate: ClimateSampler::new(world_seed, climate),
            layout,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TreeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn root(&self) -> TreeId {
        self.root
    }

    /// Evaluate the root tree for one tile, bypassing any cache.
    pub fn classify_tile(&self, tile_x: i32, tile_z: i32) -> ClassificationId {
        let mut ctx = TileContext::sample(tile_x, tile_z, self.noise, &self.climate);
        self.registry.classify(self.root, &mut ctx)
    }
}

impl GridSource for TreeGridSource {
    #[inline]
    fn layout(&self) -> RegionLayout {
        self.layout
    }

    fn build_region(&self, coord: RegionCoord) -> RegionGrid {
        let grid = RegionGrid::build(coord, self.layout, |tx, tz| self.classify_tile(tx, tz));
        log::debug!(
            target: "perf",
            "ms={:.2} region_build rx={} rz={} tiles={}",
            grid.build_time_us as f64 / 1000.0,
            coord.rx,
            coord.rz,
            grid.ids().len()
        );
        grid
    }
}

impl<S: GridSource + ?Sized> GridSource for Arc<S> {
    #[inline]
    fn layout(&self) -> RegionLayout {
        (**self).layout()
    }

    #[inline]
    fn build_region(&self, coord: RegionCoord) -> RegionGrid {
        (**self).build_region(coord)
    }
}
