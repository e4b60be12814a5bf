//! Memory domain type — durable facts remembered about one user.
//!
//! Entries are ranked by importance first and recency second. The field
//! names of the serialized form are part of the on-disk layout and must not
//! change: `content`, `timestamp`, `importance`, `playerName`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Importance assigned when the caller has no opinion.
pub const DEFAULT_IMPORTANCE: f32 = 0.5;

/// How many memories are recalled for a prompt by default.
pub const DEFAULT_RECALL_LIMIT: usize = 10;

/// A single remembered fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// The remembered text
    pub content: String,

    /// When the memory was recorded
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Local>,

    /// Ranking weight in `[0, 1]`
    pub importance: f32,

    /// The user this memory belongs to
    #[serde(rename = "playerName")]
    pub owner: String,
}

impl MemoryEntry {
    pub fn new(
        owner: impl Into<String>,
        content: impl Into<String>,
        importance: f32,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            content: content.into(),
            created_at,
            importance: clamp_importance(importance),
            owner: owner.into(),
        }
    }

    /// Render as a `[HH:mm] content` line.
    pub fn render_line(&self) -> String {
        format!("[{}] {}", self.created_at.format("%H:%M"), self.content)
    }

    /// Retention order: `Less` means `self` is evicted before `other`.
    ///
    /// Lower importance goes first, then the older timestamp.
    pub fn retention_cmp(&self, other: &Self) -> Ordering {
        self.importance
            .total_cmp(&other.importance)
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

/// Clamp an importance into `[0, 1]`. NaN falls back to the default.
pub fn clamp_importance(importance: f32) -> f32 {
    if importance.is_nan() {
        DEFAULT_IMPORTANCE
    } else {
        importance.clamp(0.0, 1.0)
    }
}
