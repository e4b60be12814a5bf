pub mod doctor;
pub mod memory;
pub mod onboard;
pub mod persona;
pub mod status;

use companion_config::AppConfig;
use companion_core::clock::SystemClock;
use companion_memory::{JsonDirStore, MemoryStore};
use std::sync::Arc;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Open the on-disk memory store described by `config`.
pub(crate) fn open_memory(config: &AppConfig) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    let files = Arc::new(JsonDirStore::open(config.memory_dir())?);
    Ok(MemoryStore::open(
        files,
        Arc::new(SystemClock),
        config.memory.cap,
    )?)
}
