use std::sync::{Arc, PoisonError, RwLock};

use climatic_tree::{ClassificationId, TreeId, TreeRegistry};
use hashbrown::HashMap;

use crate::cache::{RegionCache, RegionCacheStats};
use crate::config::EngineConfig;
use crate::directory::{ClassificationGrid, RegionDirectory};
use crate::error::EngineError;
use crate::layout::{RegionLayout, TILE_AREA};
use crate::source::TreeGridSource;

/// Classification queries keyed by world seed.
///
/// One [`RegionDirectory`] is created per seed on first use. All directories
/// share one [`RegionCache`], so `cache.capacity` bounds the resident grids of
/// every seed together.
pub struct ClassificationService {
    registry: Arc<TreeRegistry>,
    root: TreeId,
    config: EngineConfig,
    layout: RegionLayout,
    cache: Arc<RegionCache>,
    directories: RwLock<HashMap<u64, Arc<RegionDirectory>>>,
}

impl ClassificationService {
    pub fn new(registry: Arc<TreeRegistry>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let layout = config.layout()?;
        let root = registry
            .id_by_name(&config.root)
            .ok_or_else(|| EngineError::UnknownRoot(config.root.clone()))?;
        let cache = Arc::new(RegionCache::new(config.cache.capacity));
        Ok(Self {
            registry,
            root,
            config,
            layout,
            cache,
            directories: RwLock::new(HashMap::new()),
        })
    }

    /// Build the registry described by `config` and serve queries from it.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let registry = Arc::new(config.registry()?);
        Self::new(registry, config)
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TreeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Counters of the cache shared by all seeds.
    #[inline]
    pub fn cache_stats(&self) -> RegionCacheStats {
        self.cache.stats()
    }

    pub fn directory(&self, world_seed: u64) -> Arc<RegionDirectory> {
        if let Some(dir) = self
            .directories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&world_seed)
        {
            return Arc::clone(dir);
        }
        let mut dirs = self.directories.write().unwrap_or_else(PoisonError::into_inner);
        let dir = dirs.entry(world_seed).or_insert_with(|| {
            log::info!("region directory created for seed {world_seed}");
            let source = TreeGridSource::new(
                Arc::clone(&self.registry),
                self.root,
                world_seed,
                &self.config.climate,
                self.layout,
            );
            Arc::new(RegionDirectory::with_cache(source, Arc::clone(&self.cache), world_seed))
        });
        Arc::clone(dir)
    }

    /// Dominant classification of the tile containing block `(x, z)`.
    pub fn classify(&self, world_seed: u64, x: i32, z: i32) -> ClassificationId {
        self.directory(world_seed).dominant_block(x, z)
    }

    /// Blended classification of block `(x, z)`.
    pub fn classify_block(&self, world_seed: u64, x: i32, z: i32) -> ClassificationId {
        self.directory(world_seed).classify_block(x, z)
    }

    /// Dominant classification of a tile, before blending.
    pub fn classify_tile(&self, world_seed: u64, tile_x: i32, tile_z: i32) -> ClassificationId {
        self.directory(world_seed).dominant_tile(tile_x, tile_z)
    }

    pub fn tile_grid(&self, world_seed: u64, tile_x: i32, tile_z: i32) -> [ClassificationId; TILE_AREA] {
        self.directory(world_seed).tile_grid(tile_x, tile_z)
    }

    pub fn classify_area(
        &self,
        world_seed: u64,
        tile_x: i32,
        tile_z: i32,
        size_x: usize,
        size_z: usize,
    ) -> ClassificationGrid {
        self.directory(world_seed)
            .classify_area(tile_x, tile_z, size_x, size_z)
    }

    pub fn classify_unaligned_area(
        &self,
        world_seed: u64,
        x: i32,
        z: i32,
        size_x: usize,
        size_z: usize,
    ) -> ClassificationGrid {
        self.directory(world_seed)
            .classify_unaligned_area(x, z, size_x, size_z)
    }
}
