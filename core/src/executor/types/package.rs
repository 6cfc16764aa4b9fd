use serde::{Deserialize, Serialize};

/// Downloadable package resolved from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub download_link: String,
}

/// Metadata of an installed plugin, keyed by its entry path
/// (`<dir>/<file>.php`, or `<file>.php` for root-level plugins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPlugin {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Directory part of an entry path, `None` for root-level single files.
pub fn entry_slug(entry: &str) -> Option<&str> {
    entry.split_once('/').map(|(dir, _)| dir)
}
