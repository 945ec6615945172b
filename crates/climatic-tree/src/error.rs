/// Reasons a set of tree definitions cannot be turned into a registry.
///
/// All of these surface while the registry is built; a query against a built
/// registry has no failure path.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("tree `{0}` is defined more than once")]
    DuplicateTree(String),
    #[error("tree `{tree}` has a weighted choice whose weights sum to zero")]
    ZeroWeight { tree: String },
    #[error("tree `{tree}` has a deferral with modulus zero")]
    ZeroModulus { tree: String },
    #[error("tree `{tree}` has a non-finite threshold boundary")]
    InvalidBoundary { tree: String },
    #[error("tree `{tree}` refers to unknown tree `{target}`")]
    UnknownTree { tree: String, target: String },
    #[error("trees reference each other in a cycle: {}", .0.join(" -> "))]
    CyclicReference(Vec<String>),
    #[error("tree `{0}` has nothing left after pruning empty branches")]
    EmptyTree(String),
    #[error("failed to read tree definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tree definitions: {0}")]
    Parse(#[from] toml::de::Error),
}
