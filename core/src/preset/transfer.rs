use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TransferError;

use super::model::Preset;
use super::slug::normalize_slug;
use super::store::PresetStore;

/// `{"name": "...", "plugins": ["slug", ...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub name: String,
    pub plugins: Vec<String>,
}

#[derive(Deserialize)]
struct ImportDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    plugins: Option<Vec<String>>,
}

impl ExportDocument {
    pub fn to_json_pretty(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an uploaded document. `name` is optional (older exports only
    /// carry `plugins`); every slug is trimmed and validated.
    pub fn parse(bytes: &[u8]) -> Result<Self, TransferError> {
        let doc: ImportDocument = serde_json::from_slice(bytes)?;
        let plugins = doc.plugins.ok_or(TransferError::MissingPlugins)?;
        let plugins = plugins
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| normalize_slug(s).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: doc.name.unwrap_or_default(),
            plugins,
        })
    }
}

impl From<&Preset> for ExportDocument {
    fn from(p: &Preset) -> Self {
        Self {
            name: p.name.clone(),
            plugins: p.plugins.clone(),
        }
    }
}

pub async fn export_active(store: &PresetStore) -> Result<ExportDocument, TransferError> {
    Ok(ExportDocument::from(&store.active().await?))
}

/// Replace the active preset's list with the document's (no merge).
/// The active preset keeps its own name.
pub async fn import_into(store: &PresetStore, bytes: &[u8]) -> Result<Preset, TransferError> {
    let doc = ExportDocument::parse(bytes)?;
    let count = doc.plugins.len();
    let preset = store.set_active_plugins(doc.plugins).await?;
    tracing::info!(
        target: "packager.preset",
        preset = %preset.id,
        plugins = count,
        source_name = %doc.name,
        "preset list imported"
    );
    Ok(preset)
}

/// Load `path` into the active preset when its list is empty.
///
/// Returns `Ok(None)` when nothing was loaded (list not empty, or no file).
pub async fn autoload_default(
    store: &PresetStore,
    path: &Path,
) -> Result<Option<Preset>, TransferError> {
    if !store.active().await?.plugins.is_empty() || !path.is_file() {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await?;
    let preset = import_into(store, &bytes).await?;
    tracing::info!(
        target: "packager.preset",
        file = %path.display(),
        "configuration loaded automatically from default file"
    );
    Ok(Some(preset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn new_store() -> PresetStore {
        PresetStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_parse_accepts_name_less_documents() {
        let doc = ExportDocument::parse(br#"{"plugins": [" akismet ", "", "jetpack"]}"#).unwrap();
        assert_eq!(doc.name, "");
        assert_eq!(doc.plugins, vec!["akismet", "jetpack"]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            ExportDocument::parse(b"not json"),
            Err(TransferError::Parse(_))
        ));
        assert!(matches!(
            ExportDocument::parse(br#"{"name": "x"}"#),
            Err(TransferError::MissingPlugins)
        ));
        assert!(matches!(
            ExportDocument::parse(br#"{"plugins": "a,b"}"#),
            Err(TransferError::Parse(_))
        ));
        assert!(matches!(
            ExportDocument::parse(br#"{"plugins": ["../../wp-config"]}"#),
            Err(TransferError::InvalidSlug(_))
        ));
    }

    #[tokio::test]
    async fn test_export_then_import_replaces_list() {
        let source = new_store();
        source
            .set_active_plugins(vec!["a".into(), "b".into()])
            .await
            .unwrap();
        let json = export_active(&source).await.unwrap().to_json_pretty().unwrap();

        let target = new_store();
        target.rename("default", "Mine").await.unwrap();
        target.set_active_plugins(vec!["old".into()]).await.unwrap();

        let preset = import_into(&target, json.as_bytes()).await.unwrap();
        assert_eq!(preset.name, "Mine");
        assert_eq!(preset.plugins, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_list_alone() {
        let store = new_store();
        store.set_active_plugins(vec!["keep".into()]).await.unwrap();
        assert!(import_into(&store, b"{}").await.is_err());
        assert_eq!(store.active().await.unwrap().plugins, vec!["keep"]);
    }

    #[tokio::test]
    async fn test_autoload_only_when_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("packager-export.json");
        let store = new_store();

        // no file yet
        assert!(autoload_default(&store, &file).await.unwrap().is_none());

        std::fs::write(&file, r#"{"name":"Std","plugins":["a"]}"#).unwrap();
        let loaded = autoload_default(&store, &file).await.unwrap().unwrap();
        assert_eq!(loaded.plugins, vec!["a"]);

        std::fs::write(&file, r#"{"plugins":["b"]}"#).unwrap();
        assert!(autoload_default(&store, &file).await.unwrap().is_none());
        assert_eq!(store.active().await.unwrap().plugins, vec!["a"]);
    }
}
