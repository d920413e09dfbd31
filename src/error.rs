use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FacetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("indexing error for {path}: {reason}")]
    Index { path: PathBuf, reason: String },

    #[error("extraction error for {path}: {reason}")]
    Extract { path: PathBuf, reason: String },

    #[error("filesystem is read-only")]
    ReadOnly,
}

pub type Result<T> = std::result::Result<T, FacetError>;
