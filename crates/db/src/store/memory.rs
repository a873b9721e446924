use async_trait::async_trait;
use dashmap::DashMap;

use super::{OptionStore, StoreResult};

/// Process-local option store. Used when `database.backend = "memory"` and in tests.
#[derive(Default)]
pub struct MemoryOptionStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}
