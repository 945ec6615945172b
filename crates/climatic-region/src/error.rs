use climatic_tree::TreeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("region size must be a positive even number of tiles, got {0}")]
    InvalidRegionTiles(i32),
    #[error("region cache capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("root tree `{0}` is not defined")]
    UnknownRoot(String),
}
