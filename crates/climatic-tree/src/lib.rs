//! Classification ids, decision trees, and the registry that owns them.
#![forbid(unsafe_code)]

pub mod builtin;
mod context;
mod def;
mod error;
mod id;
mod node;
mod registry;

pub use builtin::builtin_defs;
pub use context::TileContext;
pub use def::{DeferralDef, NodeDef, TreeDef, TreeFile, WeightedDef};
pub use error::TreeError;
pub use id::{ClassificationId, IdError};
pub use node::{ClassificationNode, Composite, SplitSource, ThresholdSplit, TreeId, WeightedChoice};
pub use registry::TreeRegistry;
