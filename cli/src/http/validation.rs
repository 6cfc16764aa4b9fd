//! 基础请求验证逻辑

use packager_core::api::{AccessGuard, INSTALL_ACTION};

use super::models::{HttpServerError, InstallRequest};

/// 验证 task endpoint 的 dispatch key 与 slug 字段
///
/// Slug sanitisation and the nonce are left to the executor so that those
/// failures come back as a normal `{success:false}` outcome.
pub fn validate_install(req: &InstallRequest) -> Result<(), HttpServerError> {
    if req.action != INSTALL_ACTION {
        return Err(HttpServerError::InvalidRequest(format!(
            "Unknown action '{}'",
            req.action
        )));
    }
    if req.slug.trim().is_empty() {
        return Err(HttpServerError::InvalidRequest(
            "Slug cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// 验证 action 绑定的 nonce
pub fn validate_nonce(guard: &AccessGuard, action: &str, nonce: &str) -> Result<(), HttpServerError> {
    if guard.check_nonce(action, nonce) {
        Ok(())
    } else {
        Err(HttpServerError::Forbidden(
            "Security check failed: invalid or expired nonce.".to_string(),
        ))
    }
}

/// Bearer token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
