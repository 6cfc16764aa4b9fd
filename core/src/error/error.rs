use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
    #[error("queue failed: {0}")]
    Queue(#[from] super::QueueError),
    #[error("transfer failed: {0}")]
    Transfer(#[from] super::TransferError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
    #[error("corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("preset not found: {0}")]
    PresetNotFound(String),
    #[error("preset name cannot be empty")]
    EmptyName,
    #[error("cannot delete the last remaining preset")]
    LastPreset,
    #[error("a preset named '{0}' already exists")]
    DuplicateName(String),
}
