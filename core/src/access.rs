//! Access control for the task endpoint: install capability plus
//! action-bound anti-forgery tokens (nonces).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::AccessConfig;

/// Dispatch key of the task endpoint.
pub const INSTALL_ACTION: &str = "packager_install_plugin";
/// Nonce actions.
pub const INSTALL_NONCE: &str = "packager_nonce";
pub const EXPORT_NONCE: &str = "packager_export";
pub const IMPORT_NONCE: &str = "packager_import";

/// Who is calling the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub can_install: bool,
    pub nonce: String,
}

#[derive(Debug, Clone)]
struct IssuedNonce {
    action: String,
    expires_at: DateTime<Utc>,
}

/// Issues and verifies nonces. A nonce stays valid for its action until it
/// expires, so one page snapshot can drive a whole queue.
pub struct NonceRegistry {
    ttl: Duration,
    issued: Mutex<HashMap<String, IssuedNonce>>,
}

impl NonceRegistry {
    pub fn new(ttl_secs: u64) -> Self {
        const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3600;
        let ttl_secs = ttl_secs.clamp(1, MAX_TTL_SECS) as i64;
        Self {
            ttl: Duration::seconds(ttl_secs),
            issued: Mutex::new(HashMap::new()),
        }
    }

    pub fn issue(&self, action: &str) -> String {
        self.issue_at(action, Utc::now())
    }

    fn issue_at(&self, action: &str, now: DateTime<Utc>) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        if let Ok(mut issued) = self.issued.lock() {
            issued.retain(|_, n| n.expires_at > now);
            issued.insert(
                nonce.clone(),
                IssuedNonce {
                    action: action.to_string(),
                    expires_at: now + self.ttl,
                },
            );
        }
        nonce
    }

    pub fn verify(&self, action: &str, nonce: &str) -> bool {
        self.verify_at(action, nonce, Utc::now())
    }

    fn verify_at(&self, action: &str, nonce: &str, now: DateTime<Utc>) -> bool {
        if nonce.is_empty() {
            return false;
        }
        let Ok(issued) = self.issued.lock() else {
            return false;
        };
        issued
            .get(nonce)
            .map(|n| n.action == action && n.expires_at > now)
            .unwrap_or(false)
    }
}

/// Capability + nonce policy in front of the executor.
pub struct AccessGuard {
    nonces: NonceRegistry,
    allow_install: bool,
    api_key: Option<String>,
}

impl AccessGuard {
    pub fn new(cfg: &AccessConfig) -> Self {
        let api_key = Some(cfg.api_key.trim().to_string()).filter(|k| !k.is_empty());
        Self {
            nonces: NonceRegistry::new(cfg.nonce_ttl_secs),
            allow_install: cfg.allow_install,
            api_key,
        }
    }

    pub fn issue(&self, action: &str) -> String {
        self.nonces.issue(action)
    }

    pub fn check_nonce(&self, action: &str, nonce: &str) -> bool {
        self.nonces.verify(action, nonce)
    }

    /// Whether a presented API key grants the install capability.
    pub fn has_capability(&self, presented_key: Option<&str>) -> bool {
        if !self.allow_install {
            return false;
        }
        match &self.api_key {
            None => true,
            Some(expected) => presented_key
                .map(str::trim)
                .is_some_and(|key| constant_time_eq(key.as_bytes(), expected.as_bytes())),
        }
    }

    pub fn caller(&self, presented_key: Option<&str>, nonce: impl Into<String>) -> Caller {
        Caller {
            can_install: self.has_capability(presented_key),
            nonce: nonce.into(),
        }
    }

    /// Caller for the local operator: capability as configured, fresh nonce.
    pub fn local_operator(&self) -> Caller {
        Caller {
            can_install: self.allow_install,
            nonce: self.issue(INSTALL_NONCE),
        }
    }

    pub fn authorize(&self, caller: &Caller) -> bool {
        caller.can_install && self.check_nonce(INSTALL_NONCE, &caller.nonce)
    }
}

/// Compare secrets without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(allow_install: bool, api_key: &str) -> AccessGuard {
        AccessGuard::new(&AccessConfig {
            allow_install,
            api_key: api_key.to_string(),
            nonce_ttl_secs: 60,
        })
    }

    #[test]
    fn test_nonce_is_bound_to_action() {
        let registry = NonceRegistry::new(60);
        let nonce = registry.issue(EXPORT_NONCE);
        assert!(registry.verify(EXPORT_NONCE, &nonce));
        assert!(!registry.verify(IMPORT_NONCE, &nonce));
        assert!(!registry.verify(EXPORT_NONCE, "forged"));
        assert!(!registry.verify(EXPORT_NONCE, ""));
    }

    #[test]
    fn test_nonce_reusable_until_expiry() {
        let registry = NonceRegistry::new(60);
        let now = Utc::now();
        let nonce = registry.issue_at(INSTALL_NONCE, now);
        assert!(registry.verify_at(INSTALL_NONCE, &nonce, now));
        assert!(registry.verify_at(INSTALL_NONCE, &nonce, now + Duration::seconds(30)));
        assert!(!registry.verify_at(INSTALL_NONCE, &nonce, now + Duration::seconds(61)));
    }

    #[test]
    fn test_capability_without_api_key() {
        let g = guard(true, "");
        assert!(g.has_capability(None));
        assert!(g.has_capability(Some("anything")));
    }

    #[test]
    fn test_capability_with_api_key() {
        let g = guard(true, "secret");
        assert!(!g.has_capability(None));
        assert!(!g.has_capability(Some("wrong")));
        assert!(g.has_capability(Some("secret")));
        assert!(g.has_capability(Some(" secret ")));
        assert!(!g.has_capability(Some("secre")));
        assert!(!g.has_capability(Some("secret2")));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_capability_disabled() {
        let g = guard(false, "");
        assert!(!g.has_capability(None));
        assert!(!g.authorize(&g.local_operator()));
    }

    #[test]
    fn test_authorize_requires_install_nonce() {
        let g = guard(true, "");
        let good = g.caller(None, g.issue(INSTALL_NONCE));
        assert!(g.authorize(&good));

        let wrong_action = g.caller(None, g.issue(EXPORT_NONCE));
        assert!(!g.authorize(&wrong_action));
    }
}
