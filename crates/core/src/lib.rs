//! # Companion Core
//!
//! Domain types, traits, and error definitions for the Companion context
//! engine. This crate has **no storage or runtime dependencies** — it defines
//! the model that the memory, persona, and agent crates build on.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (the clock, the generation backend) is a trait
//! here, so that:
//! - time-dependent rendering is reproducible in tests
//! - the backend can be swapped or mocked without touching the stores
//! - all crates depend inward on core

pub mod error;
pub mod clock;
pub mod memory;
pub mod conversation;
pub mod emotion;
pub mod backend;

// Re-export key types at crate root for ergonomics
pub use error::{BackendError, Error, MemoryError, Result};
pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::{MemoryEntry, DEFAULT_IMPORTANCE, DEFAULT_RECALL_LIMIT};
pub use conversation::{ConversationTurn, ASSISTANT_LABEL};
pub use emotion::{Emotion, EmotionalState, UnknownEmotion};
pub use backend::{GenerationBackend, GenerationRequest};
