//! Error types for the Companion domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Companion operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Generation backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Owner '{0}' cannot be used as a memory file name")]
    InvalidOwner(String),

    #[error("Corrupt memory file for '{owner}': {reason}")]
    Corrupt { owner: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Generation request failed: {message} (status: {status_code})")]
    RequestFailed { status_code: u16, message: String },

    #[error("Generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Backend returned an empty response")]
    EmptyResponse,
}
