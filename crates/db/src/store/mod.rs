pub mod memory;
pub mod mongo;

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use memory::MemoryOptionStore;
pub use mongo::MongoOptionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("Malformed record: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable key/value storage. Each key holds one JSON record which is
/// written and removed as a unit.
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>>;
    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()>;
    /// Returns whether a record was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;
}

/// A typed view over one key of an [`OptionStore`].
pub struct TypedOption<T> {
    store: Arc<dyn OptionStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedOption<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn OptionStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub async fn load(&self) -> StoreResult<Option<T>> {
        match self.store.get(self.key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.put(self.key, value).await
    }

    pub async fn clear(&self) -> StoreResult<bool> {
        self.store.delete(self.key).await
    }
}
