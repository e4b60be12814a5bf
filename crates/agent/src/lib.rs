//! The exchange flow for Companion.
//!
//! A [`Companion`] runs one chat exchange per call:
//!
//! 1. **Recall** the user's recent conversation and most relevant memories
//! 2. **Render** the persona template with that context
//! 3. **Log** the user message as a pending turn
//! 4. **Generate** a reply through the configured backend
//! 5. **Record** the reply in the conversation log and in memory

pub mod companion;

#[cfg(test)]
mod test_helpers;

pub use companion::{Companion, CompanionSettings};
