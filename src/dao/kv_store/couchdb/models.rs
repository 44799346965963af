use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One key of the store, persisted as its own CouchDB document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchKvDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub value: Value,
}

/// Minimal projection used when only the revision of a document matters.
#[derive(Debug, Deserialize)]
pub struct CouchRevision {
    #[serde(rename = "_rev")]
    pub rev: String,
}
