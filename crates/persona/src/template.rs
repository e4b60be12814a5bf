//! Persona template — the text skeleton every prompt is rendered from.
//!
//! Loading follows a simple rule:
//!
//! 1. If the template file exists, its content is used as-is.
//! 2. If it does not exist, the built-in default is used **and written to
//!    that path**, so later runs read the same text from disk.
//! 3. Any I/O failure falls back to the built-in default with a warning.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The built-in persona, used when no template file is present.
pub const DEFAULT_PERSONA: &str = "\
You are a helpful AI companion called AI Nunu in the world of Eorzea.
Your personality: Friendly, knowledgeable, and slightly mischievous
Speaking to: {PLAYER_NAME}
Current time: {CURRENT_TIME}
Date: {DATE}
Emotional state: {EMOTIONAL_STATE}

Recent memories:
{RECENT_MEMORIES}

Conversation history:
{CONVERSATION_HISTORY}

User message: {USER_MESSAGE}

Respond naturally and stay in character. Reference FFXIV lore when appropriate. Be helpful to adventurers.";

/// Where the template text came from (for diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Read from an existing file
    File(PathBuf),
    /// Built-in default, freshly written to this path
    CreatedDefault(PathBuf),
    /// Built-in default, not persisted
    BuiltIn,
}

/// A loaded persona template.
#[derive(Debug, Clone)]
pub struct PersonaTemplate {
    text: String,
    source: TemplateSource,
}

impl PersonaTemplate {
    /// Wrap literal template text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TemplateSource::BuiltIn,
        }
    }

    /// The built-in default template.
    pub fn builtin() -> Self {
        Self::from_text(DEFAULT_PERSONA)
    }

    /// Load from `path`, creating it with the default if absent.
    pub fn load_or_create_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "Loaded persona template");
                return Self {
                    text,
                    source: TemplateSource::File(path.to_path_buf()),
                };
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read persona template, using default");
                return Self::builtin();
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %path.display(), error = %e, "Failed to create persona directory, using default");
                return Self::builtin();
            }
        }

        match std::fs::write(path, DEFAULT_PERSONA) {
            Ok(()) => {
                debug!(path = %path.display(), "Wrote default persona template");
                Self {
                    text: DEFAULT_PERSONA.to_string(),
                    source: TemplateSource::CreatedDefault(path.to_path_buf()),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write default persona template");
                Self::builtin()
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }
}

impl Default for PersonaTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}
