use serde::Deserialize;

use crate::context::TileContext;
use crate::id::ClassificationId;
use crate::registry::TreeRegistry;

/// Index of a named tree inside a [`TreeRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub(crate) u32);

impl TreeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which tile scalar a threshold split compares against its boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSource {
    #[default]
    Temperature,
    Noise,
}

/// A validated decision tree node.
///
/// Nodes only come out of [`TreeRegistry`] construction, so every weighted
/// choice has a positive total and every reference points at a tree of the
/// same registry without forming a cycle.
#[derive(Clone, Debug)]
pub enum ClassificationNode {
    Leaf(ClassificationId),
    WeightedChoice(WeightedChoice),
    ThresholdSplit(ThresholdSplit),
    Composite(Composite),
    Reference(TreeId),
}

#[derive(Clone, Debug)]
pub struct WeightedChoice {
    pub(crate) children: Vec<(ClassificationNode, u32)>,
    pub(crate) total: u64,
}

#[derive(Clone, Debug)]
pub struct ThresholdSplit {
    pub(crate) boundary: f64,
    pub(crate) source: SplitSource,
    pub(crate) low: Box<ClassificationNode>,
    pub(crate) high: Box<ClassificationNode>,
}

#[derive(Clone, Debug)]
pub struct Composite {
    pub(crate) deferrals: Vec<(u64, TreeId)>,
    pub(crate) body: Box<ClassificationNode>,
}

impl ClassificationNode {
    pub fn classify(&self, ctx: &mut TileContext, registry: &TreeRegistry) -> ClassificationId {
        match self {
            ClassificationNode::Leaf(id) => *id,
            ClassificationNode::WeightedChoice(choice) => {
                let seed = ctx.next_decision_seed();
                choice.pick(seed).classify(ctx, registry)
            }
            ClassificationNode::ThresholdSplit(split) => split.branch(ctx).classify(ctx, registry),
            ClassificationNode::Composite(composite) => {
                let seed = ctx.next_decision_seed();
                for &(modulus, target) in &composite.deferrals {
                    if seed % modulus == 0 {
                        return registry.classify(target, ctx);
                    }
                }
                composite.body.classify(ctx, registry)
            }
            ClassificationNode::Reference(target) => registry.classify(*target, ctx),
        }
    }

    /// Trees this node can hand evaluation to.
    pub(crate) fn references(&self, out: &mut Vec<TreeId>) {
        match self {
            ClassificationNode::Leaf(_) => {}
            ClassificationNode::WeightedChoice(choice) => {
                for (child, _) in &choice.children {
                    child.references(out);
                }
            }
            ClassificationNode::ThresholdSplit(split) => {
                split.low.references(out);
                split.high.references(out);
            }
            ClassificationNode::Composite(composite) => {
                out.extend(composite.deferrals.iter().map(|&(_, t)| t));
                composite.body.references(out);
            }
            ClassificationNode::Reference(target) => out.push(*target),
        }
    }
}

impl WeightedChoice {
    /// First child whose cumulative weight span contains `seed % total`.
    pub fn pick(&self, seed: u64) -> &ClassificationNode {
        let mut r = seed % self.total;
        for (child, weight) in &self.children {
            let weight = u64::from(*weight);
            if r < weight {
                return child;
            }
            r -= weight;
        }
        // unreachable while total == sum of weights
        &self.children[self.children.len() - 1].0
    }

    #[inline]
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl ThresholdSplit {
    #[inline]
    fn branch(&self, ctx: &TileContext) -> &ClassificationNode {
        let value = match self.source {
            SplitSource::Temperature => ctx.climate_value(),
            SplitSource::Noise => ctx.noise_value(),
        };
        if value < self.boundary { &self.low } else { &self.high }
    }
}
