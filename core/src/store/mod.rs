//! Option storage seam
//!
//! Everything persisted by packager (presets, the active preset id, the
//! activation registry, the cached update manifest) goes through a
//! [`KeyValueStore`]. The in-memory implementation lives here for tests and
//! one-shot runs; the JSON file implementation lives in `packager-plugins`.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Mutation applied to the whole option map under the store's lock.
///
/// Returning `Err` discards every change made by the closure.
pub type OptionsUpdate<'a> =
    Box<dyn FnOnce(&mut Map<String, Value>) -> anyhow::Result<()> + Send + 'a>;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;

    /// Atomic read-modify-write over all keys; no other `set`/`update`
    /// interleaves between the read and the write.
    async fn update<'a>(&self, f: OptionsUpdate<'a>) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn update<'a>(&self, f: OptionsUpdate<'a>) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        let mut next = entries.clone();
        f(&mut next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("k", json!({"a": [1, 2]})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": [1, 2]})));

        store.set("k", json!(null)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(Value::Null));
    }

    #[tokio::test]
    async fn test_failed_update_discards_changes() {
        let store = MemoryStore::new();
        store.set("k", json!(1)).await.unwrap();

        let err = store
            .update(Box::new(|map| {
                map.insert("k".into(), json!(2));
                anyhow::bail!("rejected")
            }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));

        store
            .update(Box::new(|map| {
                map.insert("k".into(), json!(3));
                map.insert("other".into(), json!("x"));
                Ok(())
            }))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(3)));
        assert_eq!(store.get("other").await.unwrap(), Some(json!("x")));
    }
}
