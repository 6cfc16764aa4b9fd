use std::fmt;

use thiserror::Error;

/// Repository lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("plugin '{0}' not found")]
    NotFound(String),
    #[error("repository request failed: {0}")]
    Transport(String),
    #[error("unexpected repository response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostErrorCode {
    /// Destination folder already exists.
    FolderExists,
    DownloadFailed,
    IncompatibleArchive,
    PluginNotFound,
    InvalidPlugin,
    Io,
}

impl HostErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FolderExists => "folder_exists",
            Self::DownloadFailed => "download_failed",
            Self::IncompatibleArchive => "incompatible_archive",
            Self::PluginNotFound => "plugin_not_found",
            Self::InvalidPlugin => "invalid_plugin",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for HostErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by the plugin host: a stable code plus a message for humans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    pub code: HostErrorCode,
    pub message: String,
}

impl HostError {
    pub fn new(code: HostErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// "Already present" is the one install error that does not fail a task.
    pub fn is_already_present(&self) -> bool {
        self.code == HostErrorCode::FolderExists
    }
}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        Self::new(HostErrorCode::Io, err.to_string())
    }
}
