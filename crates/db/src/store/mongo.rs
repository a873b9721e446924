use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};
use tracing::debug;

use super::{OptionStore, StoreResult};
use crate::models::StoredOption;

pub struct MongoOptionStore {
    collection: Collection<StoredOption>,
}

impl MongoOptionStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(StoredOption::COLLECTION),
        }
    }
}

#[async_trait]
impl OptionStore for MongoOptionStore {
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        let record = self.collection.find_one(doc! { "key": key }).await?;
        Ok(record.map(|r| r.value.into_relaxed_extjson()))
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        let record = StoredOption::new(key, bson::to_bson(&value)?);
        // Single-document upsert: the record is replaced as a whole.
        self.collection
            .replace_one(doc! { "key": key }, record)
            .upsert(true)
            .await?;
        debug!(key, "Option stored");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let result = self.collection.delete_one(doc! { "key": key }).await?;
        debug!(key, deleted = result.deleted_count, "Option deleted");
        Ok(result.deleted_count > 0)
    }
}
