use std::sync::Arc;

use async_trait::async_trait;

use crate::access::{AccessGuard, Caller};
use crate::error::ExecuteError;
use crate::preset::normalize_slug;

use super::messages;
use super::traits::{PackageRepository, PluginHost, TaskExecutor};
use super::types::{ExecuteRequest, TaskOutcome};

/// Server-side executor: install, then optionally activate, one plugin.
pub struct InstallExecutor {
    repository: Arc<dyn PackageRepository>,
    host: Arc<dyn PluginHost>,
    guard: Arc<AccessGuard>,
}

impl InstallExecutor {
    pub fn new(
        repository: Arc<dyn PackageRepository>,
        host: Arc<dyn PluginHost>,
        guard: Arc<AccessGuard>,
    ) -> Self {
        Self {
            repository,
            host,
            guard,
        }
    }

    pub fn guard(&self) -> &Arc<AccessGuard> {
        &self.guard
    }

    /// Bind a caller so the executor can be driven by a local queue.
    pub fn bind(self: &Arc<Self>, caller: Caller) -> CallerBoundExecutor {
        CallerBoundExecutor {
            inner: Arc::clone(self),
            caller,
        }
    }

    pub async fn execute(&self, caller: &Caller, identifier: &str, auto_activate: bool) -> TaskOutcome {
        match self.try_execute(caller, identifier, auto_activate).await {
            Ok(message) => {
                tracing::info!(
                    target: "packager.executor",
                    slug = %identifier,
                    auto_activate,
                    "{}",
                    message
                );
                TaskOutcome::succeeded(message)
            }
            Err(err) => {
                tracing::warn!(
                    target: "packager.executor",
                    slug = %identifier,
                    code = err.code(),
                    "{}",
                    err
                );
                TaskOutcome::failed(err.to_string())
            }
        }
    }

    async fn try_execute(
        &self,
        caller: &Caller,
        identifier: &str,
        auto_activate: bool,
    ) -> Result<&'static str, ExecuteError> {
        // Checked before any external call
        if !self.guard.authorize(caller) {
            return Err(ExecuteError::PermissionDenied);
        }

        let slug = normalize_slug(identifier)
            .map_err(|_| ExecuteError::InvalidIdentifier(identifier.to_string()))?;

        let package = self.repository.lookup(slug).await.map_err(|err| {
            tracing::debug!(
                target: "packager.executor",
                slug = %slug,
                repository = self.repository.name(),
                error = %err,
                "lookup failed"
            );
            ExecuteError::NotFoundInRepository
        })?;

        match self.host.install(&package.download_link).await {
            Ok(()) => {}
            Err(err) if err.is_already_present() => {
                tracing::info!(
                    target: "packager.executor",
                    slug = %slug,
                    "already installed, continuing"
                );
            }
            Err(err) => return Err(ExecuteError::Install(err.message)),
        }

        if !auto_activate {
            return Ok(messages::INSTALLED_MANUAL_ACTIVATION);
        }

        match self.locate_entry(slug).await {
            Some(entry) => {
                self.host
                    .activate(&entry)
                    .await
                    .map_err(|err| ExecuteError::Activation(err.message))?;
                Ok(messages::INSTALLED_AND_ACTIVATED)
            }
            None => {
                let fallback = fallback_entry(slug);
                if let Err(err) = self.host.activate(&fallback).await {
                    tracing::warn!(
                        target: "packager.executor",
                        slug = %slug,
                        entry = %fallback,
                        error = %err,
                        "fallback activation failed"
                    );
                }
                Ok(messages::INSTALLED_FALLBACK_ACTIVATION)
            }
        }
    }

    /// First installed entry under `<slug>/`.
    async fn locate_entry(&self, slug: &str) -> Option<String> {
        let prefix = format!("{slug}/");
        match self.host.list_installed().await {
            Ok(installed) => installed.into_keys().find(|path| path.starts_with(&prefix)),
            Err(err) => {
                tracing::warn!(
                    target: "packager.executor",
                    slug = %slug,
                    error = %err,
                    "listing installed plugins failed"
                );
                None
            }
        }
    }
}

/// Conventional entry point used when the registry has not caught up yet.
pub fn fallback_entry(slug: &str) -> String {
    format!("{slug}/{slug}.php")
}

/// [`InstallExecutor`] with a fixed caller, usable as a queue executor.
pub struct CallerBoundExecutor {
    inner: Arc<InstallExecutor>,
    caller: Caller,
}

#[async_trait]
impl TaskExecutor for CallerBoundExecutor {
    fn name(&self) -> &str {
        "local"
    }

    async fn execute(&self, request: &ExecuteRequest) -> anyhow::Result<TaskOutcome> {
        Ok(self
            .inner
            .execute(&self.caller, &request.identifier, request.auto_activate)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::INSTALL_NONCE;
    use crate::config::AccessConfig;
    use crate::executor::types::{
        HostError, HostErrorCode, InstalledPlugin, PackageDescriptor, RepositoryError,
    };
    use std::collections::{BTreeMap, HashSet, VecDeque};
    use std::sync::Mutex;

    struct FakeRepository {
        known: HashSet<String>,
        lookups: Mutex<Vec<String>>,
    }

    impl FakeRepository {
        fn with(slugs: &[&str]) -> Self {
            Self {
                known: slugs.iter().map(|s| s.to_string()).collect(),
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PackageRepository for FakeRepository {
        fn name(&self) -> &str {
            "fake"
        }

        async fn lookup(&self, slug: &str) -> Result<PackageDescriptor, RepositoryError> {
            self.lookups.lock().unwrap().push(slug.to_string());
            if self.known.contains(slug) {
                Ok(PackageDescriptor {
                    slug: slug.to_string(),
                    name: slug.to_uppercase(),
                    version: Some("1.0.0".into()),
                    download_link: format!("https://downloads.example.com/{slug}.zip"),
                })
            } else {
                Err(RepositoryError::NotFound(slug.to_string()))
            }
        }
    }

    #[derive(Default)]
    struct FakeHost {
        install_results: Mutex<VecDeque<Result<(), HostError>>>,
        installed: Mutex<BTreeMap<String, InstalledPlugin>>,
        activation_error: Option<HostError>,
        installs: Mutex<Vec<String>>,
        activations: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn script_install(&self, result: Result<(), HostError>) {
            self.install_results.lock().unwrap().push_back(result);
        }

        fn register(&self, entry: &str) {
            self.installed.lock().unwrap().insert(
                entry.to_string(),
                InstalledPlugin {
                    name: entry.to_string(),
                    version: None,
                    active: false,
                },
            );
        }
    }

    #[async_trait]
    impl PluginHost for FakeHost {
        fn name(&self) -> &str {
            "fake"
        }

        async fn install(&self, download_url: &str) -> Result<(), HostError> {
            self.installs.lock().unwrap().push(download_url.to_string());
            self.install_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn activate(&self, entry: &str) -> Result<(), HostError> {
            self.activations.lock().unwrap().push(entry.to_string());
            match &self.activation_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        async fn list_installed(&self) -> Result<BTreeMap<String, InstalledPlugin>, HostError> {
            Ok(self.installed.lock().unwrap().clone())
        }
    }

    fn guard() -> Arc<AccessGuard> {
        Arc::new(AccessGuard::new(&AccessConfig::default()))
    }

    fn setup(repo: FakeRepository, host: FakeHost) -> (InstallExecutor, Arc<FakeRepository>, Arc<FakeHost>, Caller) {
        let repo = Arc::new(repo);
        let host = Arc::new(host);
        let guard = guard();
        let caller = guard.caller(None, guard.issue(INSTALL_NONCE));
        let exec = InstallExecutor::new(repo.clone(), host.clone(), guard);
        (exec, repo, host, caller)
    }

    #[tokio::test]
    async fn test_permission_denied_before_external_calls() {
        let (exec, repo, host, mut caller) = setup(FakeRepository::with(&["x"]), FakeHost::default());
        caller.nonce = "forged".into();

        let outcome = exec.execute(&caller, "x", true).await;
        assert_eq!(outcome, TaskOutcome::failed(messages::NO_PERMISSION));
        assert!(repo.lookups.lock().unwrap().is_empty());
        assert!(host.installs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_capability_is_denied() {
        let (exec, repo, _host, mut caller) = setup(FakeRepository::with(&["x"]), FakeHost::default());
        caller.can_install = false;

        let outcome = exec.execute(&caller, "x", false).await;
        assert!(!outcome.is_success());
        assert!(repo.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_in_repository() {
        let (exec, _repo, host, caller) = setup(FakeRepository::with(&[]), FakeHost::default());
        let outcome = exec.execute(&caller, "ghost", true).await;
        assert_eq!(outcome, TaskOutcome::failed(messages::NOT_FOUND));
        assert!(host.installs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let (exec, repo, _host, caller) = setup(FakeRepository::with(&[]), FakeHost::default());
        let outcome = exec.execute(&caller, "../etc", true).await;
        assert!(!outcome.is_success());
        assert!(outcome.message().contains("Invalid plugin slug"));
        assert!(repo.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_error_is_reported() {
        let host = FakeHost::default();
        host.script_install(Err(HostError::new(
            HostErrorCode::DownloadFailed,
            "Download failed. Not Found",
        )));
        let (exec, _repo, host, caller) = setup(FakeRepository::with(&["x"]), host);

        let outcome = exec.execute(&caller, "x", true).await;
        assert_eq!(outcome, TaskOutcome::failed("Download failed. Not Found"));
        assert!(host.activations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_idempotent_install() {
        let host = FakeHost::default();
        host.script_install(Ok(()));
        host.script_install(Err(HostError::new(
            HostErrorCode::FolderExists,
            "Destination folder already exists.",
        )));
        let (exec, _repo, host, caller) = setup(FakeRepository::with(&["x"]), host);

        let first = exec.execute(&caller, "x", false).await;
        let second = exec.execute(&caller, "x", false).await;
        assert_eq!(first, TaskOutcome::succeeded(messages::INSTALLED_MANUAL_ACTIVATION));
        assert_eq!(second, TaskOutcome::succeeded(messages::INSTALLED_MANUAL_ACTIVATION));
        assert_eq!(host.installs.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_activation_uses_listed_entry() {
        let host = FakeHost::default();
        host.register("x/main-file.php");
        host.register("xy/xy.php");
        let (exec, _repo, host, caller) = setup(FakeRepository::with(&["x"]), host);

        let outcome = exec.execute(&caller, "x", true).await;
        assert_eq!(outcome, TaskOutcome::succeeded(messages::INSTALLED_AND_ACTIVATED));
        assert_eq!(*host.activations.lock().unwrap(), vec!["x/main-file.php".to_string()]);
    }

    #[tokio::test]
    async fn test_activation_fallback_path() {
        let (exec, _repo, host, caller) = setup(FakeRepository::with(&["x"]), FakeHost::default());

        let outcome = exec.execute(&caller, "x", true).await;
        assert_eq!(
            outcome,
            TaskOutcome::succeeded(messages::INSTALLED_FALLBACK_ACTIVATION)
        );
        assert_eq!(*host.activations.lock().unwrap(), vec!["x/x.php".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_ignores_activation_error() {
        let host = FakeHost {
            activation_error: Some(HostError::new(
                HostErrorCode::PluginNotFound,
                "Plugin file does not exist.",
            )),
            ..FakeHost::default()
        };
        let (exec, _repo, _host, caller) = setup(FakeRepository::with(&["x"]), host);

        let outcome = exec.execute(&caller, "x", true).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_activation_error_reports_partial_success() {
        let host = FakeHost {
            activation_error: Some(HostError::new(
                HostErrorCode::InvalidPlugin,
                "Plugin has no header.",
            )),
            ..FakeHost::default()
        };
        host.register("x/x.php");
        let (exec, _repo, _host, caller) = setup(FakeRepository::with(&["x"]), host);

        let outcome = exec.execute(&caller, "x", true).await;
        assert_eq!(
            outcome,
            TaskOutcome::failed("Installed but failed to activate: Plugin has no header.")
        );
    }

    #[tokio::test]
    async fn test_bound_executor_as_task_executor() {
        let repo = Arc::new(FakeRepository::with(&["x"]));
        let host = Arc::new(FakeHost::default());
        let guard = guard();
        let caller = guard.local_operator();
        let exec = Arc::new(InstallExecutor::new(repo, host, guard));

        let bound = exec.bind(caller);
        let outcome = bound
            .execute(&ExecuteRequest::new("x", false))
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(bound.name(), "local");
    }
}
