use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use packager_core::api::{KeyValueStore, OptionsUpdate};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// Option store persisted as one JSON object on disk.
///
/// Every write rewrites the whole file through a temp file + rename, so a
/// crash never leaves a half-written document behind.
pub struct JsonFileStore {
    path: PathBuf,
    // 串行化读-改-写
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> anyhow::Result<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&bytes)
            .with_context(|| format!("parse {}", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("{} does not hold a JSON object", self.path.display()),
        }
    }

    async fn write_all(&self, map: &Map<String, Value>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(map)?;
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_all().await?;
        map.insert(key.to_string(), value);
        self.write_all(&map).await?;
        tracing::debug!(target: "packager.store", key = %key, path = %self.path.display(), "option saved");
        Ok(())
    }

    async fn update<'a>(&self, f: OptionsUpdate<'a>) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_all().await?;
        f(&mut map)?;
        self.write_all(&map).await?;
        tracing::debug!(target: "packager.store", path = %self.path.display(), "options updated");
        Ok(())
    }
}
