use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use packager_core::api::{HostError, HostErrorCode, InstalledPlugin, KeyValueStore, PluginHost};
use regex::Regex;
use serde_json::Value;

use crate::http::{preview_body, HttpError};

/// Option key holding the list of active entry paths.
pub const ACTIVE_PLUGINS_KEY: &str = "active_plugins";

/// Only the head of a file is scanned for the header block.
const HEADER_SCAN_BYTES: usize = 8 * 1024;

/// Plugin host backed by a local plugins directory.
///
/// `install` downloads a zip package and extracts it into
/// `<plugins_dir>/<folder>`; activation state lives in the option store.
pub struct LocalPluginHost {
    plugins_dir: PathBuf,
    http: reqwest::Client,
    store: Arc<dyn KeyValueStore>,
}

impl LocalPluginHost {
    pub fn new(
        plugins_dir: impl Into<PathBuf>,
        download_timeout_ms: u64,
        store: Arc<dyn KeyValueStore>,
    ) -> anyhow::Result<Self> {
        // 下载包不做 TLS 降级重试
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(download_timeout_ms))
            .user_agent(concat!("packager/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            plugins_dir: plugins_dir.into(),
            http,
            store,
        })
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, HostError> {
        let download_failed = |err: HttpError| HostError::new(HostErrorCode::DownloadFailed, err.to_string());

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| download_failed(HttpError::from_reqwest(err, url.to_string())))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(download_failed(HttpError::status_error(
                status.as_u16(),
                url.to_string(),
                preview_body(&body),
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| download_failed(HttpError::from_reqwest(err, url.to_string())))?;
        Ok(bytes.to_vec())
    }

    async fn active_entries(&self) -> Result<Vec<String>, HostError> {
        let value = self
            .store
            .get(ACTIVE_PLUGINS_KEY)
            .await
            .map_err(|e| HostError::new(HostErrorCode::Io, e.to_string()))?;
        decode_active(value).map_err(|e| HostError::new(HostErrorCode::Io, e.to_string()))
    }
}

fn decode_active(value: Option<Value>) -> anyhow::Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v)
            .map_err(|e| anyhow::anyhow!("corrupt '{ACTIVE_PLUGINS_KEY}' option: {e}")),
    }
}

#[async_trait]
impl PluginHost for LocalPluginHost {
    fn name(&self) -> &str {
        "local"
    }

    async fn install(&self, download_url: &str) -> Result<(), HostError> {
        tracing::info!(target: "packager.host", url = %download_url, "downloading package");
        let bytes = self.download(download_url).await?;
        let plugins_dir = self.plugins_dir.clone();
        let folder = tokio::task::spawn_blocking(move || extract_package(&bytes, &plugins_dir))
            .await
            .map_err(|e| HostError::new(HostErrorCode::Io, e.to_string()))??;
        tracing::info!(target: "packager.host", folder = %folder, "package extracted");
        Ok(())
    }

    async fn activate(&self, entry: &str) -> Result<(), HostError> {
        let path = entry_path(&self.plugins_dir, entry)?;
        if !path.is_file() {
            return Err(HostError::new(
                HostErrorCode::PluginNotFound,
                "Plugin file does not exist.",
            ));
        }
        if read_header(&path)?.is_none() {
            return Err(HostError::new(
                HostErrorCode::InvalidPlugin,
                "The plugin does not have a valid header.",
            ));
        }

        // 读-改-写在同一次 update 内完成
        let mut added = false;
        self.store
            .update(Box::new(|options| {
                let mut active = decode_active(options.remove(ACTIVE_PLUGINS_KEY))?;
                if !active.iter().any(|e| e == entry) {
                    active.push(entry.to_string());
                    added = true;
                }
                options.insert(ACTIVE_PLUGINS_KEY.to_string(), serde_json::json!(active));
                Ok(())
            }))
            .await
            .map_err(|e| HostError::new(HostErrorCode::Io, e.to_string()))?;
        if added {
            tracing::info!(target: "packager.host", entry = %entry, "plugin activated");
        }
        Ok(())
    }

    async fn list_installed(&self) -> Result<BTreeMap<String, InstalledPlugin>, HostError> {
        let active = self.active_entries().await?;
        let dir = self.plugins_dir.clone();
        let mut installed = tokio::task::spawn_blocking(move || scan_plugins_dir(&dir))
            .await
            .map_err(|e| HostError::new(HostErrorCode::Io, e.to_string()))??;
        for (entry, plugin) in installed.iter_mut() {
            plugin.active = active.contains(entry);
        }
        Ok(installed)
    }
}

/// Extract a zip package under `plugins_dir`. Returns the folder name.
fn extract_package(bytes: &[u8], plugins_dir: &Path) -> Result<String, HostError> {
    let incompatible = |msg: String| HostError::new(HostErrorCode::IncompatibleArchive, msg);

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| incompatible(format!("Incompatible Archive. {e}")))?;

    // every entry must live under one top-level folder
    let mut folder: Option<String> = None;
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| incompatible(format!("Incompatible Archive. {e}")))?;
        let Some(name) = file.enclosed_name() else {
            return Err(incompatible(format!("Unsafe path in archive: {}", file.name())));
        };
        let mut parts = name.components();
        let top = match (parts.next(), parts.next()) {
            (Some(Component::Normal(top)), Some(_)) => top.to_string_lossy().to_string(),
            (Some(Component::Normal(top)), None) if file.is_dir() => top.to_string_lossy().to_string(),
            _ => {
                return Err(incompatible(
                    "The package could not be installed. No valid plugins were found.".into(),
                ))
            }
        };
        match &folder {
            Some(f) if *f != top => {
                return Err(incompatible(
                    "The package contains more than one top-level folder.".into(),
                ))
            }
            Some(_) => {}
            None => folder = Some(top),
        }
    }
    let folder = folder.ok_or_else(|| incompatible("The package is empty.".into()))?;

    let target = plugins_dir.join(&folder);
    if target.exists() {
        return Err(HostError::new(
            HostErrorCode::FolderExists,
            "Destination folder already exists.",
        ));
    }
    std::fs::create_dir_all(plugins_dir)?;

    let unpack = |archive: &mut zip::ZipArchive<Cursor<&[u8]>>| -> Result<(), HostError> {
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| incompatible(format!("Incompatible Archive. {e}")))?;
            let Some(name) = file.enclosed_name() else {
                continue;
            };
            let out = plugins_dir.join(name);
            if file.is_dir() {
                std::fs::create_dir_all(&out)?;
                continue;
            }
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut dest = std::fs::File::create(&out)?;
            std::io::copy(&mut file, &mut dest)?;
        }
        Ok(())
    };

    let result = unpack(&mut archive).and_then(|()| {
        let has_plugin = scan_folder(&target, &folder)?.next().is_some();
        if has_plugin {
            Ok(())
        } else {
            Err(incompatible(
                "The package could not be installed. No valid plugins were found.".into(),
            ))
        }
    });
    if let Err(err) = result {
        // 不留半成品目录
        let _ = std::fs::remove_dir_all(&target);
        return Err(err);
    }
    Ok(folder)
}

/// Entry path → file path, refusing anything outside `plugins_dir`.
fn entry_path(plugins_dir: &Path, entry: &str) -> Result<PathBuf, HostError> {
    let rel = Path::new(entry);
    let safe = !entry.is_empty()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(HostError::new(
            HostErrorCode::PluginNotFound,
            format!("Invalid plugin path: {entry}"),
        ));
    }
    Ok(plugins_dir.join(rel))
}

fn scan_plugins_dir(dir: &Path) -> Result<BTreeMap<String, InstalledPlugin>, HostError> {
    let mut out = BTreeMap::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if path.is_dir() {
            out.extend(scan_folder(&path, &name)?);
        } else if is_php(&path) {
            if let Some(plugin) = read_header(&path)? {
                out.insert(name, plugin);
            }
        }
    }
    Ok(out)
}

/// `*.php` files directly inside `dir` that carry a plugin header.
fn scan_folder(
    dir: &Path,
    folder: &str,
) -> Result<impl Iterator<Item = (String, InstalledPlugin)>, HostError> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_php(&path) {
            continue;
        }
        if let Some(plugin) = read_header(&path)? {
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_default();
            found.push((format!("{folder}/{file}"), plugin));
        }
    }
    Ok(found.into_iter())
}

fn is_php(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("php"))
}

fn header_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)^[ \t/*#@]*(Plugin Name|Version):[ \t]*(.*?)[ \t]*(?:\*/)?\r?$").ok()
    })
    .as_ref()
}

fn read_header(path: &Path) -> Result<Option<InstalledPlugin>, HostError> {
    let mut head = Vec::with_capacity(HEADER_SCAN_BYTES);
    std::fs::File::open(path)?
        .take(HEADER_SCAN_BYTES as u64)
        .read_to_end(&mut head)?;
    Ok(parse_header(&String::from_utf8_lossy(&head)))
}

/// Parse the `Plugin Name:` / `Version:` header block.
fn parse_header(content: &str) -> Option<InstalledPlugin> {
    let re = header_regex()?;
    let mut name = None;
    let mut version = None;
    for caps in re.captures_iter(content) {
        let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        if value.is_empty() {
            continue;
        }
        let field = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if field.eq_ignore_ascii_case("plugin name") {
            name.get_or_insert_with(|| value.to_string());
        } else {
            version.get_or_insert_with(|| value.to_string());
        }
    }
    name.map(|name| InstalledPlugin {
        name,
        version,
        active: false,
    })
}
