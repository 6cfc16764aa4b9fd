use thiserror::Error;

use crate::executor::messages;

/// Per-task failure channels of the install executor.
///
/// None of these are fatal to a queue: each one is turned into a
/// `TaskOutcome::Failed` carrying `Display` as its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("{}", messages::NO_PERMISSION)]
    PermissionDenied,

    #[error("Invalid plugin slug: {0}")]
    InvalidIdentifier(String),

    #[error("{}", messages::NOT_FOUND)]
    NotFoundInRepository,

    #[error("{0}")]
    Install(String),

    #[error("{}{0}", messages::ACTIVATION_FAILED_PREFIX)]
    Activation(String),
}

impl ExecuteError {
    /// Short machine-readable code, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::NotFoundInRepository => "not_found",
            Self::Install(_) => "install_failed",
            Self::Activation(_) => "activation_failed",
        }
    }
}
