//! Per-user conversation log — bounded, process-lifetime only.
//!
//! Each owner's turns are appended in arrival order. When the log grows past
//! the cap the oldest turns are dropped as one contiguous block, so the
//! surviving order is never disturbed.
//!
//! This store is not synchronized; wrap it in a lock if several threads
//! write to it.

use companion_core::clock::Clock;
use companion_core::conversation::ConversationTurn;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maximum turns kept per owner unless configured otherwise.
pub const DEFAULT_HISTORY_CAP: usize = 1000;

/// Turns rendered into a prompt by default.
pub const DEFAULT_HISTORY_WINDOW: usize = 100;

pub struct ConversationStore {
    clock: Arc<dyn Clock>,
    cap: usize,
    logs: HashMap<String, Vec<ConversationTurn>>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("cap", &self.cap)
            .field("owners", &self.logs.len())
            .finish()
    }
}

impl ConversationStore {
    pub fn new(clock: Arc<dyn Clock>, cap: usize) -> Self {
        Self {
            clock,
            cap: cap.max(1),
            logs: HashMap::new(),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Append a complete exchange.
    pub fn add_turn(
        &mut self,
        owner: &str,
        user_message: impl Into<String>,
        assistant_message: impl Into<String>,
    ) {
        let turn = ConversationTurn::new(owner, user_message, assistant_message, self.clock.now());
        self.push(owner, turn);
    }

    /// Append a user message whose reply has not arrived yet.
    pub fn begin_turn(&mut self, owner: &str, user_message: impl Into<String>) {
        self.add_turn(owner, user_message, String::new());
    }

    /// Fill in the reply of the owner's latest turn if it is still pending.
    ///
    /// Returns `false` (and changes nothing) when there is no pending turn.
    pub fn complete_turn(&mut self, owner: &str, assistant_message: impl Into<String>) -> bool {
        let Some(last) = self.logs.get_mut(owner).and_then(|log| log.last_mut()) else {
            return false;
        };
        if !last.is_pending() {
            return false;
        }
        last.assistant_message = assistant_message.into();
        true
    }

    /// The `message_count` most recent turns, oldest first, as prompt text.
    pub fn history_text(&self, owner: &str, message_count: usize) -> String {
        self.entries(owner, message_count)
            .iter()
            .flat_map(ConversationTurn::render_lines)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `limit` most recent turns in chronological order.
    pub fn entries(&self, owner: &str, limit: usize) -> Vec<ConversationTurn> {
        let mut all = self.all_entries(owner);
        let skip = all.len().saturating_sub(limit);
        all.drain(..skip);
        all
    }

    /// The owner's full log in chronological order.
    pub fn all_entries(&self, owner: &str) -> Vec<ConversationTurn> {
        let Some(log) = self.logs.get(owner) else {
            return Vec::new();
        };
        let mut turns = log.clone();
        // Stable: turns sharing a timestamp keep arrival order
        turns.sort_by_key(|t| t.created_at);
        turns
    }

    /// Forget one owner's log.
    pub fn clear(&mut self, owner: &str) {
        if let Some(log) = self.logs.get_mut(owner) {
            log.clear();
        }
    }

    pub fn count(&self, owner: &str) -> usize {
        self.logs.get(owner).map_or(0, Vec::len)
    }

    fn push(&mut self, owner: &str, turn: ConversationTurn) {
        let log = self.logs.entry(owner.to_string()).or_default();
        log.push(turn);

        if log.len() > self.cap {
            let excess = log.len() - self.cap;
            log.drain(..excess);
            debug!(owner = %owner, dropped = excess, "Dropped oldest conversation turns");
        }
    }
}
