use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote `update.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteManifest {
    pub version: String,
    #[serde(default)]
    pub tested: Option<String>,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub sections: ManifestSections,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSections {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub changelog: String,
}

/// Where the manifest comes from (HTTP in production).
#[async_trait]
pub trait ManifestSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> anyhow::Result<RemoteManifest>;
}
