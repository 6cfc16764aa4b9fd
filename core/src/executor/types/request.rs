use serde::{Deserialize, Serialize};

/// What the queue driver hands to an executor for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub identifier: String,
    pub auto_activate: bool,
}

impl ExecuteRequest {
    pub fn new(identifier: impl Into<String>, auto_activate: bool) -> Self {
        Self {
            identifier: identifier.into(),
            auto_activate,
        }
    }
}
