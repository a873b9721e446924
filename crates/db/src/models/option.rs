use bson::{Bson, DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A single named record in the option store. The whole `value` is replaced
/// on every write, so readers never see a half-updated record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOption {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub key: String,
    pub value: Bson,
    pub updated_at: DateTime,
}

impl StoredOption {
    pub const COLLECTION: &'static str = "options";

    pub fn new(key: &str, value: Bson) -> Self {
        Self {
            id: None,
            key: key.to_string(),
            value,
            updated_at: DateTime::now(),
        }
    }
}
