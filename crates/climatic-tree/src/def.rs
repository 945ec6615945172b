use serde::Deserialize;

use crate::id::ClassificationId;
use crate::node::SplitSource;

/// A tree definition as written in configuration, before validation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TreeDef {
    pub name: String,
    pub node: NodeDef,
}

impl TreeDef {
    pub fn new(name: impl Into<String>, node: NodeDef) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// Top-level shape of a tree definition file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TreeFile {
    #[serde(default)]
    pub trees: Vec<TreeDef>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDef {
    Leaf {
        id: ClassificationId,
    },
    /// "Nothing here"; pruned away when the registry is built.
    Empty,
    Weighted {
        #[serde(default)]
        children: Vec<WeightedDef>,
    },
    Threshold {
        boundary: f64,
        #[serde(default)]
        source: SplitSource,
        low: Box<NodeDef>,
        high: Box<NodeDef>,
    },
    Composite {
        #[serde(default)]
        deferrals: Vec<DeferralDef>,
        body: Box<NodeDef>,
    },
    Ref {
        tree: String,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WeightedDef {
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub node: NodeDef,
}
fn default_weight() -> u32 {
    1
}

/// Hand the tile to `tree` when the composite's decision seed is divisible by `modulus`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DeferralDef {
    pub modulus: u64,
    pub tree: String,
}

impl NodeDef {
    pub fn leaf(base: u8) -> Self {
        NodeDef::Leaf {
            id: ClassificationId::new(base),
        }
    }

    pub fn leaf_id(id: ClassificationId) -> Self {
        NodeDef::Leaf { id }
    }

    pub fn weighted<I>(children: I) -> Self
    where
        I: IntoIterator<Item = (NodeDef, u32)>,
    {
        NodeDef::Weighted {
            children: children
                .into_iter()
                .map(|(node, weight)| WeightedDef { weight, node })
                .collect(),
        }
    }

    /// Weighted choice of plain leaves.
    pub fn leaves<I>(children: I) -> Self
    where
        I: IntoIterator<Item = (ClassificationId, u32)>,
    {
        Self::weighted(children.into_iter().map(|(id, w)| (Self::leaf_id(id), w)))
    }

    pub fn threshold(boundary: f64, low: NodeDef, high: NodeDef) -> Self {
        NodeDef::Threshold {
            boundary,
            source: SplitSource::Temperature,
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    pub fn noise_threshold(boundary: f64, low: NodeDef, high: NodeDef) -> Self {
        NodeDef::Threshold {
            boundary,
            source: SplitSource::Noise,
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    pub fn composite<I, S>(deferrals: I, body: NodeDef) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        NodeDef::Composite {
            deferrals: deferrals
                .into_iter()
                .map(|(modulus, tree)| DeferralDef {
                    modulus,
                    tree: tree.into(),
                })
                .collect(),
            body: Box::new(body),
        }
    }

    pub fn reference(tree: impl Into<String>) -> Self {
        NodeDef::Ref { tree: tree.into() }
    }

    /// True when this definition can never produce a classification.
    pub fn is_empty(&self) -> bool {
        match self {
            NodeDef::Leaf { .. } | NodeDef::Ref { .. } => false,
            NodeDef::Empty => true,
            NodeDef::Weighted { children } => children.iter().all(|c| c.node.is_empty()),
            NodeDef::Threshold { low, high, .. } => low.is_empty() && high.is_empty(),
            NodeDef::Composite { body, .. } => body.is_empty(),
        }
    }
}
