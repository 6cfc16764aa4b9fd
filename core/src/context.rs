use crate::access::AccessGuard;
use crate::config::AppConfig;
use crate::error::CliError;
use crate::executor::{InstallExecutor, PackageRepository, PluginHost};
use crate::preset::PresetStore;
use crate::store::KeyValueStore;
use crate::updater::{ManifestSource, UpdateChecker};
use std::sync::Arc;

/// Concrete collaborators, built once per process by a [`ServicesFactory`].
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn KeyValueStore>,
    pub repository: Arc<dyn PackageRepository>,
    pub host: Arc<dyn PluginHost>,
    pub manifest: Arc<dyn ManifestSource>,
}

impl Services {
    pub fn presets(&self) -> PresetStore {
        PresetStore::new(self.store.clone())
    }

    pub fn executor(&self, guard: Arc<AccessGuard>) -> Arc<InstallExecutor> {
        Arc::new(InstallExecutor::new(
            self.repository.clone(),
            self.host.clone(),
            guard,
        ))
    }

    pub fn update_checker(&self, cfg: &AppConfig) -> UpdateChecker {
        UpdateChecker::new(
            self.manifest.clone(),
            cfg.updater.slug.clone(),
            cfg.updater.current_version.clone(),
        )
    }
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, services_factory: Option<Arc<dyn ServicesFactory>>) -> Self {
        Self {
            cfg,
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            services_factory: self.services_factory.clone(),
        }
    }

    pub async fn build_services(&self) -> Result<Services, CliError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(CliError::Config(
                "services_factory missing (cannot build plugins/services)".into(),
            ));
        };
        factory
            .build_services(&self.cfg)
            .await
            .map_err(CliError::Anyhow)
    }
}
