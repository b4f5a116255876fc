//! Keyed site content (about/profile text and similar editable blobs).

use serde::{Deserialize, Serialize};

/// A single editable content blob, addressed by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: String,
}

/// Request body for writing a content blob. The whole value is replaced.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetContentRequest {
    pub value: serde_json::Value,
}
