use std::fs;
use std::path::Path;

use hashbrown::HashMap;

use crate::builtin::builtin_defs;
use crate::context::TileContext;
use crate::def::{NodeDef, TreeDef, TreeFile};
use crate::error::TreeError;
use crate::id::ClassificationId;
use crate::node::{ClassificationNode, Composite, ThresholdSplit, TreeId, WeightedChoice};

#[derive(Clone, Debug)]
struct NamedTree {
    name: String,
    root: ClassificationNode,
}

/// Every named decision tree of a configuration, built and validated up front.
///
/// Trees refer to each other through [`TreeId`]s resolved against this
/// registry, so a registry is immutable after construction and can be shared
/// between threads behind an `Arc`.
#[derive(Clone, Debug)]
pub struct TreeRegistry {
    trees: Vec<NamedTree>,
    by_name: HashMap<String, TreeId>,
}

impl TreeRegistry {
    pub fn from_defs(defs: Vec<TreeDef>) -> Result<Self, TreeError> {
        let mut by_name: HashMap<String, TreeId> = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if by_name.insert(def.name.clone(), TreeId(i as u32)).is_some() {
                return Err(TreeError::DuplicateTree(def.name.clone()));
            }
        }

        let mut trees = Vec::with_capacity(defs.len());
        for def in defs {
            let compiler = Compiler {
                tree: &def.name,
                by_name: &by_name,
            };
            let root = compiler
                .compile(&def.node)?
                .ok_or_else(|| TreeError::EmptyTree(def.name.clone()))?;
            trees.push(NamedTree {
                name: def.name,
                root,
            });
        }

        let reg = Self { trees, by_name };
        reg.check_acyclic()?;
        log::info!("tree registry built: {} trees", reg.trees.len());
        Ok(reg)
    }

    /// The trees shipped with the engine, rooted at `overworld`.
    pub fn builtin() -> Result<Self, TreeError> {
        Self::from_defs(builtin_defs())
    }

    pub fn from_toml_str(src: &str) -> Result<Self, TreeError> {
        let file: TreeFile = toml::from_str(src)?;
        Self::from_defs(file.trees)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let src = fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    #[inline]
    pub fn id_by_name(&self, name: &str) -> Option<TreeId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn name_of(&self, tree: TreeId) -> Option<&str> {
        self.trees.get(tree.index()).map(|t| t.name.as_str())
    }

    #[inline]
    pub fn get(&self, tree: TreeId) -> Option<&ClassificationNode> {
        self.trees.get(tree.index()).map(|t| &t.root)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.iter().map(|t| t.name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Evaluate `tree` for the tile described by `ctx`.
    ///
    /// # Panics
    ///
    /// Panics if `tree` was not issued by this registry.
    pub fn classify(&self, tree: TreeId, ctx: &mut TileContext) -> ClassificationId {
        self.trees[tree.index()].root.classify(ctx, self)
    }

    fn check_acyclic(&self) -> Result<(), TreeError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Active,
            Done,
        }

        let edges: Vec<Vec<TreeId>> = self
            .trees
            .iter()
            .map(|t| {
                let mut out = Vec::new();
                t.root.references(&mut out);
                out.sort_unstable();
                out.dedup();
                out
            })
            .collect();

        let mut marks = vec![Mark::Unvisited; self.trees.len()];
        for start in 0..self.trees.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            // iterative DFS: (node, next edge index)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            marks[start] = Mark::Active;
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if let Some(&target) = edges[node].get(top.1) {
                    top.1 += 1;
                    let t = target.index();
                    match marks[t] {
                        Mark::Unvisited => {
                            marks[t] = Mark::Active;
                            stack.push((t, 0));
                        }
                        Mark::Active => {
                            let from = stack.iter().position(|&(n, _)| n == t).unwrap_or(0);
                            let mut cycle: Vec<String> = stack[from..]
                                .iter()
                                .map(|&(n, _)| self.trees[n].name.clone())
                                .collect();
                            cycle.push(self.trees[t].name.clone());
                            return Err(TreeError::CyclicReference(cycle));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

struct Compiler<'a> {
    tree: &'a str,
    by_name: &'a HashMap<String, TreeId>,
}

impl Compiler<'_> {
    /// `Ok(None)` means the definition pruned down to nothing.
    fn compile(&self, def: &NodeDef) -> Result<Option<ClassificationNode>, TreeError> {
        Ok(match def {
            NodeDef::Leaf { id } => Some(ClassificationNode::Leaf(*id)),
            NodeDef::Empty => None,
            NodeDef::Weighted { children } => {
                let mut compiled = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(node) = self.compile(&child.node)? {
                        compiled.push((node, child.weight));
                    }
                }
                if compiled.is_empty() {
                    None
                } else {
                    let total: u64 = compiled.iter().map(|(_, w)| u64::from(*w)).sum();
                    if total == 0 {
                        return Err(TreeError::ZeroWeight {
                            tree: self.tree.to_string(),
                        });
                    }
                    Some(ClassificationNode::WeightedChoice(WeightedChoice {
                        children: compiled,
                        total,
                    }))
                }
            }
            NodeDef::Threshold {
                boundary,
                source,
                low,
                high,
            } => {
                if !boundary.is_finite() {
                    return Err(TreeError::InvalidBoundary {
                        tree: self.tree.to_string(),
                    });
                }
                match (self.compile(low)?, self.compile(high)?) {
                    (Some(low), Some(high)) => {
                        Some(ClassificationNode::ThresholdSplit(ThresholdSplit {
                            boundary: *boundary,
                            source: *source,
                            low: Box::new(low),
                            high: Box::new(high),
                        }))
                    }
                    // an empty side falls through to the other
                    (Some(only), None) | (None, Some(only)) => Some(only),
                    (None, None) => None,
                }
            }
            NodeDef::Composite { deferrals, body } => {
                let mut resolved = Vec::with_capacity(deferrals.len());
                for d in deferrals {
                    if d.modulus == 0 {
                        return Err(TreeError::ZeroModulus {
                            tree: self.tree.to_string(),
                        });
                    }
                    resolved.push((d.modulus, self.resolve(&d.tree)?));
                }
                self.compile(body)?.map(|body| {
                    ClassificationNode::Composite(Composite {
                        deferrals: resolved,
                        body: Box::new(body),
                    })
                })
            }
            NodeDef::Ref { tree } => Some(ClassificationNode::Reference(self.resolve(tree)?)),
        })
    }

    fn resolve(&self, target: &str) -> Result<TreeId, TreeError> {
        self.by_name
            .get(target)
            .copied()
            .ok_or_else(|| TreeError::UnknownTree {
                tree: self.tree.to_string(),
                target: target.to_string(),
            })
    }
}
