#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("padding must be a finite, non-negative number (got {0})")]
    InvalidPadding(f32),
    #[error("stickyness must be a finite number (got {0})")]
    InvalidStickyness(f32),
    #[error("conformity must lie in [0, 1] (got {0})")]
    InvalidConformity(f32),
    #[error("unknown shape: {0:?} (expected \"rectangle\" or \"ellipse\")")]
    UnknownShape(String),
    #[error("unknown traversal: {0:?} (expected \"simple\" or \"qtree\")")]
    UnknownTraversal(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
