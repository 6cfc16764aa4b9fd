use thiserror::Error;

use super::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug '{0}' contains a path separator, whitespace or '..'")]
    Invalid(String),
}

/// Export/import failures.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("not a valid export document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("export document has no \"plugins\" list")]
    MissingPlugins,
    #[error("bad entry in \"plugins\": {0}")]
    InvalidSlug(#[from] SlugError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
