use std::sync::Arc;

use anyhow::Result;

use packager_core::api::{
    AppConfig, KeyValueStore, ManifestSource, PackageRepository, PluginHost,
};

use crate::host::LocalPluginHost;
use crate::repository::DirectoryRepository;
use crate::store::JsonFileStore;
use crate::updater::HttpManifestSource;

pub fn build_store(cfg: &AppConfig) -> Arc<dyn KeyValueStore> {
    Arc::new(JsonFileStore::new(cfg.store.path.clone()))
}

pub fn build_repository(cfg: &AppConfig) -> Result<Arc<dyn PackageRepository>> {
    Ok(Arc::new(DirectoryRepository::new(
        &cfg.repository.base_url,
        cfg.repository.timeout_ms,
        cfg.repository.insecure_fallback,
    )?))
}

pub fn build_host(cfg: &AppConfig, store: Arc<dyn KeyValueStore>) -> Result<Arc<dyn PluginHost>> {
    Ok(Arc::new(LocalPluginHost::new(
        cfg.host.plugins_dir.clone(),
        cfg.host.download_timeout_ms,
        store,
    )?))
}

pub fn build_manifest_source(cfg: &AppConfig) -> Result<Arc<dyn ManifestSource>> {
    Ok(Arc::new(HttpManifestSource::new(
        cfg.updater.manifest_url.clone(),
        cfg.updater.timeout_ms,
        cfg.updater.insecure_fallback,
    )?))
}
