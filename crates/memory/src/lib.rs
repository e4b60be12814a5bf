//! Memory and conversation stores for Companion.

pub mod file_backend;
pub mod in_memory;
pub mod store;
pub mod conversation;

pub use file_backend::{JsonDirStore, MemoryFileStore};
pub use in_memory::InMemoryFileStore;
pub use store::{MemoryStore, DEFAULT_MEMORY_CAP};
pub use conversation::{ConversationStore, DEFAULT_HISTORY_CAP, DEFAULT_HISTORY_WINDOW};
