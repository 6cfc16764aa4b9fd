use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::executor::types::{HostError, InstalledPlugin, PackageDescriptor, RepositoryError};

/// Resolves a slug to a downloadable package.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    fn name(&self) -> &str;
    async fn lookup(&self, slug: &str) -> Result<PackageDescriptor, RepositoryError>;
}

/// The host platform's installer and plugin registry.
#[async_trait]
pub trait PluginHost: Send + Sync {
    fn name(&self) -> &str;
    async fn install(&self, download_url: &str) -> Result<(), HostError>;
    /// Silent activation: no redirect, no output.
    async fn activate(&self, entry: &str) -> Result<(), HostError>;
    /// Fresh listing, never a cached one.
    async fn list_installed(&self) -> Result<BTreeMap<String, InstalledPlugin>, HostError>;
}
