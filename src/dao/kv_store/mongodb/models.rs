use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};

/// One key of the store. The value keeps its JSON text so arbitrary shapes round-trip without
/// a BSON mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoKvDocument {
    #[serde(rename = "_id")]
    pub key: String,
    pub value: String,
}

/// Filter matching the document of `key`.
pub fn key_filter(key: &str) -> Document {
    doc! {"_id": key}
}
