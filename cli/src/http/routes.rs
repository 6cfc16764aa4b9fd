//! HTTP路由handlers

use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use packager_core::api::{
    export_active, import_into, ExecuteResponse, TransferError, EXPORT_FILE_NAME, EXPORT_NONCE,
    IMPORT_NONCE, INSTALL_ACTION, INSTALL_NONCE,
};

use crate::http::{
    models::*,
    state::AppState,
    validation::{bearer_token, validate_install, validate_nonce},
};

/// 创建所有路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/admin-ajax", post(install_handler))
        .route("/api/v1/bootstrap", get(bootstrap_handler))
        .route("/api/v1/export", get(export_handler))
        .route("/api/v1/import", post(import_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/shutdown", post(shutdown_handler))
        .with_state(state)
}

fn presented_key(headers: &HeaderMap) -> Option<String> {
    bearer_token(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )
    .map(str::to_string)
}

fn require_capability(state: &AppState, headers: &HeaderMap) -> Result<(), HttpServerError> {
    if state.guard.has_capability(presented_key(headers).as_deref()) {
        Ok(())
    } else {
        Err(HttpServerError::Forbidden(
            "Sorry, you are not allowed to manage plugins.".to_string(),
        ))
    }
}

/// Decode the task request from a JSON or form-encoded body.
async fn read_install_request(req: Request) -> Result<InstallRequest, HttpServerError> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        Json::<InstallRequest>::from_request(req, &())
            .await
            .map(|Json(body)| body)
            .map_err(|e| HttpServerError::InvalidRequest(e.body_text()))
    } else {
        Form::<InstallRequest>::from_request(req, &())
            .await
            .map(|Form(body)| body)
            .map_err(|e| HttpServerError::InvalidRequest(e.body_text()))
    }
}

/// POST /admin-ajax - 安装（并可选激活）单个插件
async fn install_handler(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ExecuteResponse>, HttpServerError> {
    state.record_request("/admin-ajax");

    let api_key = presented_key(req.headers());
    let body = read_install_request(req).await.inspect_err(|_| state.record_error())?;
    validate_install(&body).inspect_err(|_| state.record_error())?;

    let caller = state.guard.caller(api_key.as_deref(), body.nonce);
    let outcome = state
        .executor
        .execute(&caller, &body.slug, body.activate)
        .await;

    if let Ok(mut stats) = state.stats.write() {
        stats.record_outcome(outcome.is_success());
    }

    Ok(Json(ExecuteResponse::from(outcome)))
}

/// GET /api/v1/bootstrap - 页面快照：nonce 与当前 preset
async fn bootstrap_handler(
    State(state): State<AppState>,
) -> Result<Json<BootstrapResponse>, HttpServerError> {
    state.record_request("/api/v1/bootstrap");

    let preset = state.presets.active_snapshot().await.map_err(|e| {
        state.record_error();
        HttpServerError::Store(e.to_string())
    })?;

    let update = state
        .updater
        .last_status()
        .map(|(_, status)| status)
        .filter(|status| status.is_available());

    Ok(Json(BootstrapResponse {
        action: INSTALL_ACTION.to_string(),
        nonce: state.guard.issue(INSTALL_NONCE),
        export_nonce: state.guard.issue(EXPORT_NONCE),
        import_nonce: state.guard.issue(IMPORT_NONCE),
        preset,
        auto_activate: state.config.queue.auto_activate,
        version: state.updater.current_version().to_string(),
        update,
    }))
}

/// GET /api/v1/export - 以附件形式导出当前 preset
async fn export_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NonceQuery>,
) -> Result<Response, HttpServerError> {
    state.record_request("/api/v1/export");

    require_capability(&state, &headers).inspect_err(|_| state.record_error())?;
    validate_nonce(&state.guard, EXPORT_NONCE, &query.nonce).inspect_err(|_| state.record_error())?;

    let json = export_active(&state.presets)
        .await
        .and_then(|doc| doc.to_json_pretty())
        .map_err(|e| {
            state.record_error();
            HttpServerError::Store(e.to_string())
        })?;

    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| HttpServerError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        json,
    )
        .into_response())
}

/// POST /api/v1/import - 用上传的 JSON 替换当前 preset 的列表
async fn import_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NonceQuery>,
    body: Bytes,
) -> Result<Json<ImportResponse>, HttpServerError> {
    state.record_request("/api/v1/import");

    require_capability(&state, &headers).inspect_err(|_| state.record_error())?;
    validate_nonce(&state.guard, IMPORT_NONCE, &query.nonce).inspect_err(|_| state.record_error())?;

    match import_into(&state.presets, &body).await {
        Ok(preset) => Ok(Json(ImportResponse {
            success: true,
            data: "Configuration imported successfully!".to_string(),
            plugins: preset.plugins,
        })),
        Err(TransferError::Store(e)) => {
            state.record_error();
            Err(HttpServerError::Store(e.to_string()))
        }
        Err(e) => {
            state.record_error();
            Err(HttpServerError::InvalidRequest(format!(
                "Error: Invalid JSON format. {e}"
            )))
        }
    }
}

/// GET /health - 健康检查
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (uptime_seconds, requests_total, errors_total) = match state.stats.read() {
        Ok(stats) => (stats.uptime_seconds(), stats.requests_total, stats.errors_total),
        Err(_) => (0.0, 0, 0),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        session_id: state.session_id.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        requests_total,
        errors_total,
    })
}

/// POST /api/v1/shutdown - 关闭服务器
async fn shutdown_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, HttpServerError> {
    state.record_request("/api/v1/shutdown");
    require_capability(&state, &headers)?;

    tracing::info!("Shutdown requested via API");
    let _ = state.shutdown_tx.send(());

    Ok(Json(serde_json::json!({
        "success": true,
        "data": "Server shutting down",
    })))
}
