use async_trait::async_trait;
use packager_core::api::{ManifestSource, RemoteManifest};

use crate::http::FallbackClient;

/// Fetches `update.json` over HTTP with a cache-busting `t=<unix ts>`.
pub struct HttpManifestSource {
    http: FallbackClient,
    url: String,
}

impl HttpManifestSource {
    pub fn new(url: impl Into<String>, timeout_ms: u64, insecure_fallback: bool) -> anyhow::Result<Self> {
        Ok(Self {
            http: FallbackClient::new(timeout_ms, insecure_fallback)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> anyhow::Result<RemoteManifest> {
        let ts = chrono::Utc::now().timestamp().to_string();
        let body = self.http.get_json(&self.url, &[("t", ts)]).await?;
        let manifest: RemoteManifest = serde_json::from_value(body)
            .map_err(|e| anyhow::anyhow!("invalid update manifest from {}: {e}", self.url))?;
        tracing::debug!(target: "packager.updater", url = %self.url, version = %manifest.version, "manifest fetched");
        Ok(manifest)
    }
}
