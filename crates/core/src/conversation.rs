//! Conversation turn — one exchange between a user and the assistant.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Speaker label used for assistant lines in rendered history.
pub const ASSISTANT_LABEL: &str = "AI";

/// A user message and/or assistant reply sharing one timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// The user this turn belongs to
    pub owner: String,

    /// What the user said (may be empty)
    pub user_message: String,

    /// What the assistant replied (empty while the reply is pending)
    pub assistant_message: String,

    /// When the turn was recorded
    pub created_at: DateTime<Local>,
}

impl ConversationTurn {
    pub fn new(
        owner: impl Into<String>,
        user_message: impl Into<String>,
        assistant_message: impl Into<String>,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            owner: owner.into(),
            user_message: user_message.into(),
            assistant_message: assistant_message.into(),
            created_at,
        }
    }

    /// A turn whose reply has not arrived yet.
    pub fn is_pending(&self) -> bool {
        self.assistant_message.is_empty()
    }

    /// Render the non-empty sides as `[HH:mm] <speaker>: <text>` lines.
    pub fn render_lines(&self) -> Vec<String> {
        let time = self.created_at.format("%H:%M");
        let mut lines = Vec::with_capacity(2);
        if !self.user_message.is_empty() {
            lines.push(format!("[{time}] {}: {}", self.owner, self.user_message));
        }
        if !self.assistant_message.is_empty() {
            lines.push(format!("[{time}] {ASSISTANT_LABEL}: {}", self.assistant_message));
        }
        lines
    }
}
