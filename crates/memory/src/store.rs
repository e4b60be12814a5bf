//! Per-user memory store — bounded, importance-ranked, write-through.
//!
//! Every owner's collection lives behind its own mutex, which is held across
//! the in-memory mutation *and* the durable write. Writes for one owner are
//! therefore serialized, while different owners never contend beyond the
//! brief map lookup.
//!
//! Collections are kept in insertion order. Ranking happens on read and
//! never reorders what is stored; the only removal is cap eviction.

use crate::file_backend::MemoryFileStore;
use companion_core::clock::Clock;
use companion_core::error::MemoryError;
use companion_core::memory::{clamp_importance, MemoryEntry};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Maximum memories kept per owner unless configured otherwise.
pub const DEFAULT_MEMORY_CAP: usize = 100;

type Collection = Arc<Mutex<Vec<MemoryEntry>>>;

pub struct MemoryStore {
    files: Arc<dyn MemoryFileStore>,
    clock: Arc<dyn Clock>,
    cap: usize,
    owners: RwLock<HashMap<String, Collection>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("files", &self.files.name())
            .field("cap", &self.cap)
            .field("owners", &self.owners().len())
            .finish()
    }
}

impl MemoryStore {
    /// Load every persisted owner and return a ready store.
    ///
    /// Unreadable or corrupt owner files are skipped with a warning. Failing
    /// to enumerate the backing store at all is returned as an error.
    pub fn open(
        files: Arc<dyn MemoryFileStore>,
        clock: Arc<dyn Clock>,
        cap: usize,
    ) -> Result<Self, MemoryError> {
        let cap = cap.max(1);
        let mut owners = HashMap::new();

        for owner in files.list_owners()? {
            match files.read(&owner) {
                Ok(Some(entries)) if !entries.is_empty() => {
                    let mut entries = normalize_loaded(&owner, entries);
                    if entries.is_empty() {
                        continue;
                    }
                    let evicted = evict_surplus(&mut entries, cap);
                    if evicted > 0 {
                        debug!(owner = %owner, evicted, cap, "Trimmed over-cap memory file on load");
                    }
                    owners.insert(owner, Arc::new(Mutex::new(entries)));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(owner = %owner, error = %e, "Skipping unreadable memory file");
                }
            }
        }

        info!(store = files.name(), owners = owners.len(), cap, "Memory store loaded");

        Ok(Self {
            files,
            clock,
            cap,
            owners: RwLock::new(owners),
            closed: AtomicBool::new(false),
        })
    }

    /// Per-owner capacity.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Remember something about `owner`, evicting the least valuable entries
    /// past the cap, then persist the owner's collection.
    pub fn add_memory(&self, owner: &str, content: impl Into<String>, importance: f32) {
        let slot = self.collection_or_insert(owner);
        let mut entries = lock(&slot);

        entries.push(MemoryEntry::new(owner, content, importance, self.clock.now()));

        let evicted = evict_surplus(&mut entries, self.cap);
        if evicted > 0 {
            debug!(owner = %owner, evicted, "Evicted least important memories");
        }

        self.persist(owner, &entries);
    }

    /// Up to `limit` memories, most important first, newest first on ties.
    pub fn relevant_memories(&self, owner: &str, limit: usize) -> Vec<MemoryEntry> {
        let Some(slot) = self.collection(owner) else {
            return Vec::new();
        };
        let entries = lock(&slot);

        let mut ranked: Vec<(usize, &MemoryEntry)> = entries.iter().enumerate().collect();
        ranked.sort_by(|(ia, a), (ib, b)| rank_desc(*ia, a, *ib, b));
        ranked
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// `relevant_memories` rendered as `[HH:mm] content` lines.
    pub fn memories_as_string(&self, owner: &str, limit: usize) -> String {
        self.relevant_memories(owner, limit)
            .iter()
            .map(MemoryEntry::render_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The owner's collection in stored (insertion) order.
    pub fn all_memories(&self, owner: &str) -> Vec<MemoryEntry> {
        self.collection(owner)
            .map(|slot| lock(&slot).clone())
            .unwrap_or_default()
    }

    pub fn count(&self, owner: &str) -> usize {
        self.collection(owner).map(|slot| lock(&slot).len()).unwrap_or(0)
    }

    /// Owners with a collection, sorted.
    pub fn owners(&self) -> Vec<String> {
        let map = self.owners.read().unwrap_or_else(PoisonError::into_inner);
        let mut owners: Vec<String> = map.keys().cloned().collect();
        owners.sort();
        owners
    }

    /// Persist every owner once. Later calls (and `Drop`) do nothing.
    ///
    /// Returns the number of owners written successfully.
    pub fn close(&self) -> usize {
        if self.closed.swap(true, AtomicOrdering::SeqCst) {
            return 0;
        }

        let slots: Vec<(String, Collection)> = {
            let map = self.owners.read().unwrap_or_else(PoisonError::into_inner);
            map.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };

        let written = slots
            .iter()
            .filter(|(owner, slot)| self.persist(owner, &lock(slot)))
            .count();
        debug!(owners = slots.len(), written, "Memory store flushed");
        written
    }

    fn collection(&self, owner: &str) -> Option<Collection> {
        self.owners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner)
            .cloned()
    }

    fn collection_or_insert(&self, owner: &str) -> Collection {
        if let Some(slot) = self.collection(owner) {
            return slot;
        }
        let mut map = self.owners.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(owner.to_string()).or_default())
    }

    fn persist(&self, owner: &str, entries: &[MemoryEntry]) -> bool {
        match self.files.write(owner, entries) {
            Ok(()) => true,
            Err(e) => {
                warn!(owner = %owner, error = %e, "Failed to persist memories");
                false
            }
        }
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock(slot: &Mutex<Vec<MemoryEntry>>) -> MutexGuard<'_, Vec<MemoryEntry>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Retrieval order: importance desc, timestamp desc, later insertion first.
fn rank_desc(ia: usize, a: &MemoryEntry, ib: usize, b: &MemoryEntry) -> Ordering {
    b.retention_cmp(a).then_with(|| ib.cmp(&ia))
}

/// Remove entries until `entries.len() <= cap`, least valuable first.
///
/// Survivors keep their stored order.
fn evict_surplus(entries: &mut Vec<MemoryEntry>, cap: usize) -> usize {
    let surplus = entries.len().saturating_sub(cap);
    if surplus == 0 {
        return 0;
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[a].retention_cmp(&entries[b]).then_with(|| a.cmp(&b)));

    let mut doomed = vec![false; entries.len()];
    for &i in &order[..surplus] {
        doomed[i] = true;
    }

    let mut index = 0;
    entries.retain(|_| {
        let keep = !doomed[index];
        index += 1;
        keep
    });
    surplus
}

/// Drop entries filed under another owner and clamp importances from disk.
fn normalize_loaded(owner: &str, entries: Vec<MemoryEntry>) -> Vec<MemoryEntry> {
    let total = entries.len();
    let kept: Vec<MemoryEntry> = entries
        .into_iter()
        .filter(|entry| entry.owner == owner)
        .map(|mut entry| {
            entry.importance = clamp_importance(entry.importance);
            entry
        })
        .collect();

    if kept.len() < total {
        warn!(
            owner = %owner,
            foreign = total - kept.len(),
            "Skipping memories that belong to another owner"
        );
    }
    kept
}
