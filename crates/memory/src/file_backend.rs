//! File-based memory persistence — one pretty-printed JSON document per user.
//!
//! Layout: `<dir>/<owner>.json`, each file holding the owner's full ordered
//! collection as a JSON array of `MemoryEntry` objects. The file name is the
//! exact owner identifier; no case folding or escaping is applied.
//!
//! Writes go to a hidden temp file first, are synced to disk, and are renamed
//! into place, so a reader sees either the old collection or the new one.

use companion_core::error::MemoryError;
use companion_core::memory::MemoryEntry;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION: &str = "json";

/// Durable key-value storage of per-user memory collections.
pub trait MemoryFileStore: Send + Sync {
    /// The store name (e.g., "json_dir", "in_memory").
    fn name(&self) -> &str;

    /// Every owner that currently has a persisted collection.
    fn list_owners(&self) -> Result<Vec<String>, MemoryError>;

    /// Read one owner's collection. `Ok(None)` if nothing is persisted.
    fn read(&self, owner: &str) -> Result<Option<Vec<MemoryEntry>>, MemoryError>;

    /// Replace one owner's persisted collection.
    fn write(&self, owner: &str, entries: &[MemoryEntry]) -> Result<(), MemoryError>;
}

/// A directory of `<owner>.json` files.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open (and create if needed) the memory directory.
    ///
    /// Failing to create the directory is fatal for the caller.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            MemoryError::Storage(format!(
                "Failed to create memory directory {}: {e}",
                dir.display()
            ))
        })?;
        debug!(dir = %dir.display(), "Memory directory ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of an owner's file. Rejects identifiers that are not a single
    /// path component.
    pub fn path_for(&self, owner: &str) -> Result<PathBuf, MemoryError> {
        validate_owner(owner)?;
        Ok(self.dir.join(format!("{owner}.{EXTENSION}")))
    }

    fn temp_path_for(&self, owner: &str) -> PathBuf {
        self.dir.join(format!(".{owner}.{EXTENSION}.tmp"))
    }
}

fn validate_owner(owner: &str) -> Result<(), MemoryError> {
    let bad = owner.is_empty()
        || owner == "."
        || owner == ".."
        || owner.contains(['/', '\\', '\0']);
    if bad {
        return Err(MemoryError::InvalidOwner(owner.to_string()));
    }
    Ok(())
}

impl MemoryFileStore for JsonDirStore {
    fn name(&self) -> &str {
        "json_dir"
    }

    fn list_owners(&self) -> Result<Vec<String>, MemoryError> {
        let read_dir = std::fs::read_dir(&self.dir).map_err(|e| {
            MemoryError::Storage(format!(
                "Failed to list memory directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let mut owners: Vec<String> = read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();

        // Sort for deterministic load order
        owners.sort();
        Ok(owners)
    }

    fn read(&self, owner: &str) -> Result<Option<Vec<MemoryEntry>>, MemoryError> {
        let path = self.path_for(owner)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let entries: Vec<MemoryEntry> =
            serde_json::from_str(&content).map_err(|e| MemoryError::Corrupt {
                owner: owner.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(entries))
    }

    fn write(&self, owner: &str, entries: &[MemoryEntry]) -> Result<(), MemoryError> {
        let path = self.path_for(owner)?;
        let tmp = self.temp_path_for(owner);

        let json = serde_json::to_string_pretty(entries).map_err(|e| {
            MemoryError::Storage(format!("Failed to serialize memories for {owner}: {e}"))
        })?;

        write_synced(&tmp, json.as_bytes()).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            MemoryError::Storage(format!("Failed to write {}: {e}", tmp.display()))
        })?;

        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            MemoryError::Storage(format!("Failed to replace {}: {e}", path.display()))
        })?;

        Ok(())
    }
}

/// Write and flush to disk, so a later rename never exposes an empty file.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
