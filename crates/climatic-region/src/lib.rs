//! Region grids, their cache, boundary blending, and the query facade.
#![forbid(unsafe_code)]

mod blend;
mod cache;
pub mod config;
mod directory;
mod error;
mod grid;
mod layout;
mod service;
mod source;

pub use blend::{Anchor, BoundaryBlender, Neighborhood};
pub use cache::{RegionCache, RegionCacheStats, RegionKey};
pub use config::{EngineConfig, load_config_from_path};
pub use directory::{ClassificationGrid, RegionDirectory};
pub use error::{EngineError, LayoutError};
pub use grid::RegionGrid;
pub use layout::{DEFAULT_REGION_TILES, RegionCoord, RegionLayout, TILE_AREA, TILE_SIZE};
pub use service::ClassificationService;
pub use source::{GridSource, TreeGridSource};
