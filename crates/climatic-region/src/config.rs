use std::error::Error;
use std::fs;
use std::path::Path;

use climatic_noise::ClimateParams;
use climatic_tree::{TreeDef, TreeError, TreeRegistry, builtin_defs};
use serde::Deserialize;

use crate::error::{EngineError, LayoutError};
use crate::layout::{DEFAULT_REGION_TILES, RegionLayout};

#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub climate: ClimateParams,
    #[serde(default)]
    pub trees: Trees,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Region {
    #[serde(default = "default_region_tiles")]
    pub tiles: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cache {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_builtin")]
    pub builtin: bool,
    /// Replace builtin trees of the same name, otherwise add to them.
    #[serde(default)]
    pub defs: Vec<TreeDef>,
}

fn default_seed() -> u64 {
    42
}
fn default_root() -> String {
    "overworld".to_string()
}
fn default_region_tiles() -> i32 {
    DEFAULT_REGION_TILES
}
fn default_cache_capacity() -> usize {
    64
}
fn default_builtin() -> bool {
    true
}

impl Default for Region {
    fn default() -> Self {
        Self {
            tiles: default_region_tiles(),
        }
    }
}
impl Default for Cache {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            builtin: default_builtin(),
            defs: Vec::new(),
        }
    }
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            root: default_root(),
            region: Region::default(),
            cache: Cache::default(),
            climate: ClimateParams::default(),
            trees: Trees::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }

    #[inline]
    pub fn layout(&self) -> Result<RegionLayout, LayoutError> {
        RegionLayout::new(self.region.tiles)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.layout()?;
        if self.cache.capacity == 0 {
            return Err(LayoutError::ZeroCapacity.into());
        }
        Ok(())
    }

    /// Tree definitions after merging custom trees over the builtin set.
    pub fn tree_defs(&self) -> Vec<TreeDef> {
        let mut defs = if self.trees.builtin {
            builtin_defs()
        } else {
            Vec::new()
        };
        let stock = defs.len();
        for def in &self.trees.defs {
            match defs[..stock].iter().position(|d| d.name == def.name) {
                Some(i) => defs[i] = def.clone(),
                None => defs.push(def.clone()),
            }
        }
        defs
    }

    pub fn registry(&self) -> Result<TreeRegistry, TreeError> {
        TreeRegistry::from_defs(self.tree_defs())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg = EngineConfig::from_toml_str(&s)?;
    cfg.validate()?;
    Ok(cfg)
}
