//! In-memory file store — useful for testing and ephemeral sessions.
//!
//! Collections are kept as serialized JSON strings so that every write and
//! read still goes through the same serde path as the on-disk layout.

use crate::file_backend::MemoryFileStore;
use companion_core::error::MemoryError;
use companion_core::memory::MemoryEntry;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Stores per-owner documents in a map instead of on disk.
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    documents: Mutex<BTreeMap<String, String>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, bypassing serialization (e.g. to simulate corruption).
    pub fn insert_raw(&self, owner: impl Into<String>, document: impl Into<String>) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner.into(), document.into());
    }

    /// The raw document for an owner, if any.
    pub fn raw(&self, owner: &str) -> Option<String> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner)
            .cloned()
    }
}

impl MemoryFileStore for InMemoryFileStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn list_owners(&self) -> Result<Vec<String>, MemoryError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.keys().cloned().collect())
    }

    fn read(&self, owner: &str) -> Result<Option<Vec<MemoryEntry>>, MemoryError> {
        let Some(document) = self.raw(owner) else {
            return Ok(None);
        };
        serde_json::from_str(&document)
            .map(Some)
            .map_err(|e| MemoryError::Corrupt {
                owner: owner.to_string(),
                reason: e.to_string(),
            })
    }

    fn write(&self, owner: &str, entries: &[MemoryEntry]) -> Result<(), MemoryError> {
        let document = serde_json::to_string_pretty(entries).map_err(|e| {
            MemoryError::Storage(format!("Failed to serialize memories for {owner}: {e}"))
        })?;
        self.insert_raw(owner, document);
        Ok(())
    }
}
