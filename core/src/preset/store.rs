use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::store::KeyValueStore;

use super::model::{ActivePreset, Preset};

pub const PRESETS_KEY: &str = "presets";
pub const ACTIVE_PRESET_KEY: &str = "active_preset";

/// Preset CRUD over an injected [`KeyValueStore`].
///
/// There is always at least one preset and exactly one of them is active.
/// A store that has never been written yields a single empty "Default".
#[derive(Clone)]
pub struct PresetStore {
    store: Arc<dyn KeyValueStore>,
}

impl PresetStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Preset>, StoreError> {
        Ok(self.load().await?.0)
    }

    pub async fn active(&self) -> Result<Preset, StoreError> {
        let (mut presets, active) = self.load().await?;
        Ok(presets.swap_remove(active))
    }

    /// Snapshot taken once per page/bootstrap; never polled during a run.
    pub async fn active_snapshot(&self) -> Result<ActivePreset, StoreError> {
        Ok(ActivePreset::from(&self.active().await?))
    }

    pub async fn find(&self, key: &str) -> Result<Preset, StoreError> {
        self.load()
            .await?
            .0
            .into_iter()
            .find(|p| p.matches(key))
            .ok_or_else(|| StoreError::PresetNotFound(key.to_string()))
    }

    pub async fn create(&self, name: &str) -> Result<Preset, StoreError> {
        let name = clean_name(name)?.to_string();
        let preset = self
            .modify(move |presets, _| {
                if presets.iter().any(|p| p.name.eq_ignore_ascii_case(&name)) {
                    return Err(StoreError::DuplicateName(name));
                }
                let preset = Preset::new(make_id(&name, presets), &name);
                presets.push(preset.clone());
                Ok(preset)
            })
            .await?;

        tracing::info!(target: "packager.preset", id = %preset.id, name = %preset.name, "preset created");
        Ok(preset)
    }

    pub async fn rename(&self, key: &str, name: &str) -> Result<Preset, StoreError> {
        let name = clean_name(name)?;
        self.modify(|presets, _| {
            let idx = position(presets, key)?;
            if presets
                .iter()
                .enumerate()
                .any(|(i, p)| i != idx && p.name.eq_ignore_ascii_case(name))
            {
                return Err(StoreError::DuplicateName(name.to_string()));
            }
            presets[idx].name = name.to_string();
            Ok(presets[idx].clone())
        })
        .await
    }

    /// Deleting the active preset makes the first remaining one active.
    pub async fn delete(&self, key: &str) -> Result<Preset, StoreError> {
        let removed = self
            .modify(|presets, active_id| {
                let idx = position(presets, key)?;
                if presets.len() == 1 {
                    return Err(StoreError::LastPreset);
                }
                let removed = presets.remove(idx);
                if removed.id == *active_id {
                    *active_id = presets[0].id.clone();
                }
                Ok(removed)
            })
            .await?;

        tracing::info!(target: "packager.preset", id = %removed.id, "preset deleted");
        Ok(removed)
    }

    pub async fn switch(&self, key: &str) -> Result<Preset, StoreError> {
        self.modify(|presets, active_id| {
            let idx = position(presets, key)?;
            *active_id = presets[idx].id.clone();
            Ok(presets[idx].clone())
        })
        .await
    }

    /// Replace the active list wholesale. Duplicates keep their first position.
    pub async fn set_active_plugins(&self, plugins: Vec<String>) -> Result<Preset, StoreError> {
        self.update_active(|preset| {
            preset.plugins.clear();
            preset.append_unique(plugins);
        })
        .await
    }

    /// Append unseen slugs to the active list. Returns the number added.
    pub async fn append_active_plugins(&self, plugins: Vec<String>) -> Result<usize, StoreError> {
        let mut added = 0;
        self.update_active(|preset| added = preset.append_unique(plugins))
            .await?;
        Ok(added)
    }

    async fn update_active(
        &self,
        f: impl FnOnce(&mut Preset) + Send,
    ) -> Result<Preset, StoreError> {
        self.modify(|presets, active_id| {
            let idx = presets
                .iter()
                .position(|p| p.id == *active_id)
                .unwrap_or(0);
            f(&mut presets[idx]);
            Ok(presets[idx].clone())
        })
        .await
    }

    /// Load, mutate and save the presets and the active id in one store
    /// update, so concurrent writers never overwrite each other.
    async fn modify<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send,
        F: FnOnce(&mut Vec<Preset>, &mut String) -> Result<T, StoreError> + Send,
    {
        let mut out = None;
        let result = self
            .store
            .update(Box::new(|options| {
                let (mut presets, active) = decode(options)?;
                let mut active_id = presets[active].id.clone();
                out = Some(f(&mut presets, &mut active_id)?);
                encode(options, &presets, &active_id)?;
                Ok(())
            }))
            .await;

        match result {
            Ok(()) => out.ok_or_else(|| StoreError::Backend(anyhow::anyhow!("update was not applied"))),
            Err(err) => Err(err.downcast::<StoreError>().unwrap_or_else(StoreError::Backend)),
        }
    }

    /// Presets plus the index of the active one. Never empty.
    async fn load(&self) -> Result<(Vec<Preset>, usize), StoreError> {
        let presets = self.store.get(PRESETS_KEY).await?;
        let active_id = self.store.get(ACTIVE_PRESET_KEY).await?;
        resolve(read_value(PRESETS_KEY, presets)?, read_value(ACTIVE_PRESET_KEY, active_id)?)
    }
}

fn decode(options: &Map<String, Value>) -> Result<(Vec<Preset>, usize), StoreError> {
    let presets = read_value(PRESETS_KEY, options.get(PRESETS_KEY).cloned())?;
    let active_id = read_value(ACTIVE_PRESET_KEY, options.get(ACTIVE_PRESET_KEY).cloned())?;
    resolve(presets, active_id)
}

fn resolve(
    presets: Option<Vec<Preset>>,
    active_id: Option<String>,
) -> Result<(Vec<Preset>, usize), StoreError> {
    let mut presets = presets.unwrap_or_default();
    if presets.is_empty() {
        presets.push(Preset::default_preset());
    }
    let active = active_id
        .and_then(|id| presets.iter().position(|p| p.id == id))
        .unwrap_or(0);
    Ok((presets, active))
}

fn encode(
    options: &mut Map<String, Value>,
    presets: &[Preset],
    active_id: &str,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(presets).map_err(|e| StoreError::Corrupt {
        key: PRESETS_KEY.to_string(),
        source: e,
    })?;
    options.insert(PRESETS_KEY.to_string(), value);
    options.insert(
        ACTIVE_PRESET_KEY.to_string(),
        Value::String(active_id.to_string()),
    );
    Ok(())
}

fn read_value<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Result<Option<T>, StoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

fn clean_name(name: &str) -> Result<&str, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(name)
}

fn position(presets: &[Preset], key: &str) -> Result<usize, StoreError> {
    presets
        .iter()
        .position(|p| p.matches(key))
        .ok_or_else(|| StoreError::PresetNotFound(key.to_string()))
}

/// "Agency Stack" -> "agency-stack", suffixed until unique.
fn make_id(name: &str, presets: &[Preset]) -> String {
    let mut base = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c.to_ascii_lowercase());
        } else if !base.ends_with('-') {
            base.push('-');
        }
    }
    let base = base.trim_matches('-');
    let base = if base.is_empty() { "preset" } else { base };

    let taken = |id: &str| presets.iter().any(|p| p.id == id);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|id| !taken(id))
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn new_store() -> (Arc<MemoryStore>, PresetStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), PresetStore::new(kv))
    }

    #[tokio::test]
    async fn test_fresh_store_has_empty_default() {
        let (_, store) = new_store();
        let active = store.active().await.unwrap();
        assert_eq!(active, Preset::default_preset());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_switch_and_set() {
        let (_, store) = new_store();
        let created = store.create("  Agency Stack ").await.unwrap();
        assert_eq!(created.id, "agency-stack");
        assert_eq!(created.name, "Agency Stack");

        // create does not change the active preset
        assert_eq!(store.active().await.unwrap().id, "default");

        store.switch("agency stack").await.unwrap();
        store
            .set_active_plugins(vec!["a".into(), "b".into(), "a".into()])
            .await
            .unwrap();
        let active = store.active_snapshot().await.unwrap();
        assert_eq!(active.name, "Agency Stack");
        assert_eq!(active.plugins, vec!["a", "b"]);

        // default untouched
        assert!(store.find("default").await.unwrap().plugins.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_and_duplicate_names() {
        let (_, store) = new_store();
        assert!(matches!(store.create("  ").await, Err(StoreError::EmptyName)));
        assert!(matches!(
            store.create("default").await,
            Err(StoreError::DuplicateName(_))
        ));
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (_, store) = new_store();
        store.create("Blog").await.unwrap();
        store.rename("blog", "Blog old").await.unwrap();
        let second = store.create("Blog").await.unwrap();
        assert_eq!(second.id, "blog-2");
    }

    #[tokio::test]
    async fn test_rename_keeps_plugins() {
        let (_, store) = new_store();
        store.set_active_plugins(vec!["x".into()]).await.unwrap();
        let renamed = store.rename("default", "Base").await.unwrap();
        assert_eq!(renamed.name, "Base");
        assert_eq!(renamed.plugins, vec!["x"]);
        assert!(matches!(
            store.rename("nope", "X").await,
            Err(StoreError::PresetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let (_, store) = new_store();
        assert!(matches!(
            store.delete("default").await,
            Err(StoreError::LastPreset)
        ));

        store.create("Shop").await.unwrap();
        store.switch("shop").await.unwrap();
        let removed = store.delete("shop").await.unwrap();
        assert_eq!(removed.id, "shop");
        assert_eq!(store.active().await.unwrap().id, "default");
    }

    #[tokio::test]
    async fn test_append_active_plugins() {
        let (_, store) = new_store();
        store.set_active_plugins(vec!["a".into()]).await.unwrap();
        let added = store
            .append_active_plugins(vec!["a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.active().await.unwrap().plugins, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_dangling_active_id_falls_back_to_first() {
        let (kv, store) = new_store();
        kv.set(ACTIVE_PRESET_KEY, json!("gone")).await.unwrap();
        assert_eq!(store.active().await.unwrap().id, "default");
    }

    #[tokio::test]
    async fn test_corrupt_value_is_reported() {
        let (kv, store) = new_store();
        kv.set(PRESETS_KEY, json!({"not": "a list"})).await.unwrap();
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == PRESETS_KEY));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let (_, store) = new_store();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append_active_plugins(vec![format!("p{i}")]).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }
        assert_eq!(store.active().await.unwrap().plugins.len(), 16);
    }

    #[tokio::test]
    async fn test_rejected_change_writes_nothing() {
        let (kv, store) = new_store();
        store.create("Shop").await.unwrap();
        let before = kv.get(PRESETS_KEY).await.unwrap();

        assert!(matches!(
            store.rename("shop", "default").await,
            Err(StoreError::DuplicateName(_))
        ));
        assert_eq!(kv.get(PRESETS_KEY).await.unwrap(), before);
    }
}
