use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::StoredOption;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Options: one document per key
    create_indexes(
        db,
        StoredOption::COLLECTION,
        vec![index_unique(bson::doc! { "key": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
