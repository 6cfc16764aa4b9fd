//! Shared HTTP plumbing: error taxonomy, body previews and the
//! strict-then-relaxed TLS fallback used for metadata fetches.

use serde_json::Value;
use std::time::Duration;
use std::{error::Error as StdError, fmt};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl HttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }

    /// Failed before any response arrived.
    pub fn is_transport(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connect | Self::Request | Self::Unknown
        )
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct HttpError {
    kind: HttpErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl HttpError {
    pub fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            HttpErrorKind::Timeout
        } else if err.is_connect() {
            HttpErrorKind::Connect
        } else if err.is_request() {
            HttpErrorKind::Request
        } else if err.is_body() {
            HttpErrorKind::Body
        } else if err.is_decode() {
            HttpErrorKind::Decode
        } else {
            HttpErrorKind::Unknown
        };
        let status = err.status().map(|s| s.as_u16());
        let message = err.to_string();
        HttpError {
            kind,
            status,
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: String, preview: String) -> Self {
        HttpError {
            kind: HttpErrorKind::Status,
            status: Some(status),
            url: Some(url),
            message: preview,
            source: None,
        }
    }

    pub(crate) fn decode_error(status: u16, url: String, err: serde_json::Error, preview: String) -> Self {
        let message = format!("failed to decode response body: {} | body={}", err, preview);
        HttpError {
            kind: HttpErrorKind::Decode,
            status: Some(status),
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// Body as JSON. A non-2xx status is an error carrying a body preview.
pub(crate) async fn parse_json_response(resp: reqwest::Response) -> Result<Value, HttpError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| HttpError::from_reqwest(err, url.clone()))?;

    if !status.is_success() {
        let preview = preview_body(&body);
        return Err(HttpError::status_error(status.as_u16(), url, preview));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&body).map_err(|err| {
        let preview = preview_body(&body);
        HttpError::decode_error(status.as_u16(), url, err, preview)
    })
}

pub(crate) fn build_client(timeout_ms: u64, accept_invalid_certs: bool) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .user_agent(concat!("packager/", env!("CARGO_PKG_VERSION")))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?;
    Ok(client)
}

/// GET client with an optional second attempt that skips TLS verification.
///
/// The retry only happens when the strict attempt failed at transport level
/// (no response). Status and decode errors are returned as-is.
#[derive(Clone)]
pub struct FallbackClient {
    strict: reqwest::Client,
    relaxed: Option<reqwest::Client>,
}

impl FallbackClient {
    pub fn new(timeout_ms: u64, insecure_fallback: bool) -> anyhow::Result<Self> {
        let strict = build_client(timeout_ms, false)?;
        let relaxed = if insecure_fallback {
            Some(build_client(timeout_ms, true)?)
        } else {
            None
        };
        Ok(Self { strict, relaxed })
    }

    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, HttpError> {
        match Self::send(&self.strict, url, query).await {
            Err(err) if err.kind().is_transport() => {
                let Some(relaxed) = &self.relaxed else {
                    return Err(err);
                };
                tracing::warn!(
                    target: "packager.http",
                    url = %url,
                    error = %err,
                    "strict request failed, retrying without TLS verification"
                );
                Self::send(relaxed, url, query).await
            }
            other => other,
        }
    }

    async fn send(client: &reqwest::Client, url: &str, query: &[(&str, String)]) -> Result<Value, HttpError> {
        let resp = client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, url.to_string()))?;
        parse_json_response(resp).await
    }
}
