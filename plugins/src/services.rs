//! ServicesFactory 实现：从配置构建 store/repository/host/manifest 等 services，供 CLI 复用。
use async_trait::async_trait;
use packager_core::api::{AppConfig, Services, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services> {
        let store = factory::build_store(cfg);
        let repository = factory::build_repository(cfg)?;
        let host = factory::build_host(cfg, store.clone())?;
        let manifest = factory::build_manifest_source(cfg)?;
        tracing::debug!(
            target: "packager.services",
            store = store.name(),
            repository = repository.name(),
            host = host.name(),
            manifest = manifest.name(),
            "services built"
        );
        Ok(Services {
            store,
            repository,
            host,
            manifest,
        })
    }
}
