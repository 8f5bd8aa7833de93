use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked unit of work
///
/// Wire field names are stable: `id, title, description, status, created_at,
/// updated_at`. `description` is omitted from the JSON representation entirely
/// when empty, matching the external contract.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: String, // e.g. "pending", "in-progress", "completed"
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decoded request body for create/update
///
/// All fields default to the empty string so that absent fields decode cleanly;
/// validation (non-empty title) happens in the handlers, not in serde.
/// Caller-supplied `id` and timestamps are ignored by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

impl TaskPayload {
    /// Default an empty status to "pending"
    ///
    /// Applied on create only. Update forwards whatever status was decoded,
    /// including the empty string.
    pub fn with_default_status(mut self) -> Self {
        if self.status.is_empty() {
            self.status = "pending".to_string();
        }
        self
    }
}
