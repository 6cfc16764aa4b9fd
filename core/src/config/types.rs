use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub access: AccessConfig,

    #[serde(default)]
    pub updater: UpdaterConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    /// Resolved data directory (~/.packager). Not read from the file.
    #[serde(skip)]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "packager_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Per-request timeout applied by the middleware stack.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

// 安装一个插件可能需要下载 + 解压，给足时间
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Remote plugin directory used for slug lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_repository_url")]
    pub base_url: String,

    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry once with TLS verification relaxed when the strict request fails.
    #[serde(default = "default_insecure_fallback")]
    pub insecure_fallback: bool,
}

fn default_repository_url() -> String {
    "https://api.wordpress.org".to_string()
}

fn default_http_timeout_ms() -> u64 {
    15_000
}

fn default_insecure_fallback() -> bool {
    true
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_repository_url(),
            timeout_ms: default_http_timeout_ms(),
            insecure_fallback: default_insecure_fallback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directory packages are extracted into. Empty → `<data_dir>/plugins`.
    #[serde(default)]
    pub plugins_dir: String,

    /// Our own slug, excluded from "add installed".
    #[serde(default = "default_self_slug")]
    pub self_slug: String,

    #[serde(default = "default_http_timeout_ms")]
    pub download_timeout_ms: u64,
}

fn default_self_slug() -> String {
    "packager".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugins_dir: String::new(),
            self_slug: default_self_slug(),
            download_timeout_ms: default_http_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file backing the option store. Empty → `<data_dir>/options.json`.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Whether callers of the HTTP API may hold the install capability.
    #[serde(default = "default_allow_install")]
    pub allow_install: bool,

    /// Bearer key for the HTTP API. Empty disables the key check.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_nonce_ttl_secs")]
    pub nonce_ttl_secs: u64,
}

fn default_allow_install() -> bool {
    true
}

fn default_nonce_ttl_secs() -> u64 {
    86_400
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allow_install: default_allow_install(),
            api_key: String::new(),
            nonce_ttl_secs: default_nonce_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    #[serde(default = "default_updater_enabled")]
    pub enabled: bool,

    #[serde(default = "default_self_slug")]
    pub slug: String,

    #[serde(default = "default_current_version")]
    pub current_version: String,

    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    /// Interval of the server's periodic poll.
    #[serde(default = "default_update_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_insecure_fallback")]
    pub insecure_fallback: bool,
}

fn default_updater_enabled() -> bool {
    true
}

fn default_current_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_manifest_url() -> String {
    "https://raw.githubusercontent.com/spockyto/WP-packager/main/update.json".to_string()
}

fn default_update_interval_secs() -> u64 {
    43_200
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            enabled: default_updater_enabled(),
            slug: default_self_slug(),
            current_version: default_current_version(),
            manifest_url: default_manifest_url(),
            interval_secs: default_update_interval_secs(),
            timeout_ms: default_http_timeout_ms(),
            insecure_fallback: default_insecure_fallback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Initial state of the "activate after install" toggle.
    #[serde(default = "default_auto_activate")]
    pub auto_activate: bool,

    #[serde(default = "default_progress_bar")]
    pub progress_bar: bool,
}

fn default_auto_activate() -> bool {
    true
}

fn default_progress_bar() -> bool {
    true
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            auto_activate: default_auto_activate(),
            progress_bar: default_progress_bar(),
        }
    }
}
