//! Configuration loading, validation, and management for Companion.
//!
//! Loads configuration from `~/.companion/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.companion/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model identifier handed to the generation backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Override for the data directory (defaults to `~/.companion`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Conversation history configuration
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Persona configuration
    #[serde(default)]
    pub persona: PersonaConfig,
}

fn default_model() -> String {
    "nunu-super-AI:12b".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Record and recall memories at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum memories kept per user
    #[serde(default = "default_memory_cap")]
    pub cap: usize,

    /// Memories rendered into each prompt
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,

    /// Override for the memory directory (defaults to `<data_dir>/memories`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_memory_cap() -> usize {
    100
}
fn default_recall_limit() -> usize {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cap: default_memory_cap(),
            recall_limit: default_recall_limit(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum turns kept per user
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Turns rendered into each prompt
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
}

fn default_history_cap() -> usize {
    1000
}
fn default_max_history_messages() -> usize {
    550
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            max_history_messages: default_max_history_messages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Template file; relative paths resolve against the data directory
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Render the emotional state into prompts
    #[serde(default = "default_true")]
    pub enable_emotions: bool,
}

fn default_template_path() -> PathBuf {
    PathBuf::from("persona.txt")
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            enable_emotions: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.companion/config.toml).
    ///
    /// Environment overrides:
    /// - `COMPANION_DATA_DIR` — data directory (also where config.toml is read)
    /// - `COMPANION_MODEL` — model identifier
    pub fn load() -> Result<Self, ConfigError> {
        let env_data_dir = std::env::var("COMPANION_DATA_DIR").ok().map(PathBuf::from);
        let config_dir = env_data_dir.clone().unwrap_or_else(Self::config_dir);
        let mut config = Self::load_from(&config_dir.join("config.toml"))?;

        if let Some(dir) = env_data_dir {
            config.data_dir = Some(dir);
        }

        if let Ok(model) = std::env::var("COMPANION_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".companion")
    }

    /// The data directory in effect (override or default).
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Self::config_dir)
    }

    /// Where per-user memory files live.
    pub fn memory_dir(&self) -> PathBuf {
        self.memory
            .directory
            .clone()
            .unwrap_or_else(|| self.data_dir().join("memories"))
    }

    /// The persona template file.
    pub fn persona_path(&self) -> PathBuf {
        let path = &self.persona.template_path;
        if path.is_absolute() {
            path.clone()
        } else {
            self.data_dir().join(path)
        }
    }

    /// The config.toml inside the data directory.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.cap == 0 {
            return Err(ConfigError::ValidationError(
                "memory.cap must be at least 1".into(),
            ));
        }

        if self.conversation.history_cap == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.history_cap must be at least 1".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            data_dir: None,
            memory: MemoryConfig::default(),
            conversation: ConversationConfig::default(),
            persona: PersonaConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
