//! HTTP服务器状态管理

use chrono::{DateTime, Local};
use packager_core::api::{
    AccessGuard, AppConfig, InstallExecutor, PresetStore, Services, UpdateChecker,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// 应用状态（在所有handlers间共享）
#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub services: Arc<Services>,
    pub config: Arc<AppConfig>,
    pub guard: Arc<AccessGuard>,
    pub executor: Arc<InstallExecutor>,
    pub presets: PresetStore,
    pub updater: Arc<UpdateChecker>,
    pub stats: Arc<RwLock<ServerStats>>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        session_id: String,
        services: Services,
        config: AppConfig,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let guard = Arc::new(AccessGuard::new(&config.access));
        let executor = services.executor(guard.clone());
        let presets = services.presets();
        let updater = Arc::new(services.update_checker(&config));
        Self {
            session_id,
            services: Arc::new(services),
            config: Arc::new(config),
            guard,
            executor,
            presets,
            updater,
            stats: Arc::new(RwLock::new(ServerStats::new())),
            shutdown_tx,
        }
    }

    pub fn record_request(&self, endpoint: &str) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_request(endpoint);
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_error();
        }
    }
}

/// 服务器统计信息
pub struct ServerStats {
    pub requests_total: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub errors_total: u64,
    pub installs_succeeded: u64,
    pub installs_failed: u64,
    pub start_time: DateTime<Local>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            requests_total: 0,
            requests_by_endpoint: HashMap::new(),
            errors_total: 0,
            installs_succeeded: 0,
            installs_failed: 0,
            start_time: Local::now(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn record_outcome(&mut self, success: bool) {
        if success {
            self.installs_succeeded += 1;
        } else {
            self.installs_failed += 1;
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        let now = Local::now();
        (now - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
