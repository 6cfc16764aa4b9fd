#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use packager_core::api::{
    AccessConfig, AccessGuard, HostError, HostErrorCode, InstallExecutor, InstalledPlugin,
    PackageDescriptor, PackageRepository, PluginHost, RepositoryError,
};

/// Repository that knows a fixed set of slugs.
pub struct StaticRepository {
    known: HashMap<String, PackageDescriptor>,
}

impl StaticRepository {
    pub fn with(slugs: &[&str]) -> Self {
        let known = slugs
            .iter()
            .map(|slug| {
                (
                    slug.to_string(),
                    PackageDescriptor {
                        slug: slug.to_string(),
                        name: slug.to_string(),
                        version: Some("1.0.0".into()),
                        download_link: format!("https://downloads.test/{slug}.zip"),
                    },
                )
            })
            .collect();
        Self { known }
    }
}

#[async_trait]
impl PackageRepository for StaticRepository {
    fn name(&self) -> &str {
        "static"
    }

    async fn lookup(&self, slug: &str) -> Result<PackageDescriptor, RepositoryError> {
        self.known
            .get(slug)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(slug.to_string()))
    }
}

/// Host that "installs" into a map and records every call.
#[derive(Default)]
pub struct RecordingHost {
    pub installed: Mutex<BTreeMap<String, InstalledPlugin>>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_active(&self, entry: &str) -> bool {
        self.installed
            .lock()
            .unwrap()
            .get(entry)
            .map(|p| p.active)
            .unwrap_or(false)
    }
}

#[async_trait]
impl PluginHost for RecordingHost {
    fn name(&self) -> &str {
        "recording"
    }

    async fn install(&self, download_url: &str) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(format!("install {download_url}"));
        let slug = download_url
            .rsplit('/')
            .next()
            .and_then(|f| f.strip_suffix(".zip"))
            .unwrap_or_default()
            .to_string();
        let entry = format!("{slug}/{slug}.php");
        let mut installed = self.installed.lock().unwrap();
        if installed.contains_key(&entry) {
            return Err(HostError::new(
                HostErrorCode::FolderExists,
                "Destination folder already exists.",
            ));
        }
        installed.insert(
            entry,
            InstalledPlugin {
                name: slug,
                version: Some("1.0.0".into()),
                active: false,
            },
        );
        Ok(())
    }

    async fn activate(&self, entry: &str) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(format!("activate {entry}"));
        match self.installed.lock().unwrap().get_mut(entry) {
            Some(plugin) => {
                plugin.active = true;
                Ok(())
            }
            None => Err(HostError::new(
                HostErrorCode::PluginNotFound,
                "Plugin file does not exist.",
            )),
        }
    }

    async fn list_installed(&self) -> Result<BTreeMap<String, InstalledPlugin>, HostError> {
        Ok(self.installed.lock().unwrap().clone())
    }
}

pub fn executor(repo_slugs: &[&str]) -> (Arc<InstallExecutor>, Arc<RecordingHost>) {
    let host = Arc::new(RecordingHost::default());
    let guard = Arc::new(AccessGuard::new(&AccessConfig::default()));
    let exec = Arc::new(InstallExecutor::new(
        Arc::new(StaticRepository::with(repo_slugs)),
        host.clone(),
        guard,
    ));
    (exec, host)
}
