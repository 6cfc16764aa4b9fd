use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settled result of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded { message: String },
    Failed { message: String },
}

impl TaskOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::Succeeded {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded { message } | Self::Failed { message } => message,
        }
    }

    /// Decode a `{success, data}` body. A non-string `data` is stringified,
    /// a missing one becomes an empty message.
    pub fn from_response_body(body: &str) -> Result<Self, OutcomeDecodeError> {
        let value: Value = serde_json::from_str(body.trim())
            .map_err(|e| OutcomeDecodeError(format!("{e} | body={}", preview(body))))?;
        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .ok_or_else(|| OutcomeDecodeError(format!("missing 'success' | body={}", preview(body))))?;
        let message = match value.get("data") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Ok(if success {
            Self::succeeded(message)
        } else {
            Self::failed(message)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode executor response: {0}")]
pub struct OutcomeDecodeError(String);

fn preview(body: &str) -> String {
    const LIMIT: usize = 128;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    let mut out: String = trimmed.chars().take(LIMIT).collect();
    if trimmed.chars().count() > LIMIT {
        out.push_str("...");
    }
    out
}

/// Wire shape of the task endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub data: String,
}

impl From<TaskOutcome> for ExecuteResponse {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Succeeded { message } => Self {
                success: true,
                data: message,
            },
            TaskOutcome::Failed { message } => Self {
                success: false,
                data: message,
            },
        }
    }
}

impl From<ExecuteResponse> for TaskOutcome {
    fn from(resp: ExecuteResponse) -> Self {
        if resp.success {
            Self::succeeded(resp.data)
        } else {
            Self::failed(resp.data)
        }
    }
}
