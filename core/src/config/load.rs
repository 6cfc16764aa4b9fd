use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// File name of the export document; also the default-file autoload target.
pub const EXPORT_FILE_NAME: &str = "packager-export.json";

/// Get the default packager data directory: ~/.packager
pub fn get_packager_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".packager"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.packager/config.toml (highest)
    let data_dir = get_packager_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let cfg = if user_config.exists() {
        load_from(&user_config)?
    } else if local_config.exists() {
        load_from(local_config)?
    } else {
        AppConfig::default()
    };

    finish(cfg, &data_dir)
}

pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

/// Resolve data-dir relative paths and apply environment overrides.
pub fn finish(mut cfg: AppConfig, data_dir: &Path) -> anyhow::Result<AppConfig> {
    std::fs::create_dir_all(data_dir)?;
    cfg.data_dir = Some(data_dir.to_string_lossy().to_string());

    // Update logging directory to use the data directory if not set
    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        let logs_dir = data_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    if cfg.host.plugins_dir.trim().is_empty() {
        cfg.host.plugins_dir = data_dir.join("plugins").to_string_lossy().to_string();
    }
    if cfg.store.path.trim().is_empty() {
        cfg.store.path = data_dir.join("options.json").to_string_lossy().to_string();
    }

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest)
pub fn apply_env_overrides(cfg: &mut AppConfig) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("PACKAGER_REPOSITORY_URL") {
        cfg.repository.base_url = v;
    }
    if let Some(v) = non_empty("PACKAGER_PLUGINS_DIR") {
        cfg.host.plugins_dir = v;
    }
    if let Some(v) = non_empty("PACKAGER_API_KEY") {
        cfg.access.api_key = v;
    }
    if let Some(v) = non_empty("PACKAGER_STORE_PATH") {
        cfg.store.path = v;
    }
}

impl AppConfig {
    /// `<data_dir>/packager-export.json`, if a data dir was resolved.
    pub fn default_import_file(&self) -> Option<PathBuf> {
        self.data_dir
            .as_deref()
            .map(|dir| Path::new(dir).join(EXPORT_FILE_NAME))
    }
}
