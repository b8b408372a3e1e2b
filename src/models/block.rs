use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub id: i64,
    pub day_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

/// A block that has passed validation but is not stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub day_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

/// Raw block input as received from the transport layer.
/// Times are RFC 3339 strings and are validated before use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockDraft {
    pub start_time: String,
    pub end_time: String,
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

/// Partial update of a block: only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockPatch {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl BlockPatch {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.project_id.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
    }
}
