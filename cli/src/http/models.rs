//! HTTP API数据模型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use packager_core::api::{ActivePreset, UpdateStatus};
use serde::{Deserialize, Deserializer, Serialize};

// ============= Task endpoint =============

/// `POST /admin-ajax` body, form-encoded or JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstallRequest {
    pub action: String,
    pub slug: String,
    #[serde(default, deserialize_with = "flag")]
    pub activate: bool,
    #[serde(default)]
    pub nonce: String,
}

/// Accepts `1`/`0`, `true`/`false` and their string forms.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(n) => n != 0,
        Raw::Text(s) => matches!(s.trim(), "1" | "true" | "on" | "yes"),
    })
}

// ============= Bootstrap =============

/// Page snapshot handed to a queue driver before it starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResponse {
    pub action: String,
    pub nonce: String,
    pub export_nonce: String,
    pub import_nonce: String,
    pub preset: ActivePreset,
    pub auto_activate: bool,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateStatus>,
}

// ============= Export / Import =============

#[derive(Debug, Deserialize)]
pub struct NonceQuery {
    #[serde(default)]
    pub nonce: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub data: String,
    pub plugins: Vec<String>,
}

// ============= Health Check =============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub requests_total: u64,
    pub errors_total: u64,
}

// ============= Error Handling =============

/// HTTP服务器错误类型
#[derive(Debug)]
pub enum HttpServerError {
    InvalidRequest(String),
    Forbidden(String),
    Store(String),
    Timeout,
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request timeout".to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "success": false,
            "data": message,
        });

        (status, Json(body)).into_response()
    }
}
