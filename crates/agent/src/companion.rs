//! One chat exchange: recall context, render the persona, generate, remember.

use companion_config::AppConfig;
use companion_core::backend::{GenerationBackend, GenerationRequest};
use companion_core::clock::Clock;
use companion_core::conversation::ConversationTurn;
use companion_core::error::{BackendError, Error};
use companion_core::memory::DEFAULT_IMPORTANCE;
use companion_memory::{ConversationStore, JsonDirStore, MemoryStore};
use companion_persona::{Persona, PersonaTemplate, PromptAssembler};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

/// Knobs for the exchange flow.
#[derive(Debug, Clone)]
pub struct CompanionSettings {
    /// Model identifier handed to the backend
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Record exchanges as memories and render them into prompts
    pub memory_enabled: bool,

    /// Memories rendered per prompt
    pub recall_limit: usize,

    /// Conversation turns rendered per prompt
    pub max_history_messages: usize,
}

impl CompanionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            memory_enabled: config.memory.enabled,
            recall_limit: config.memory.recall_limit,
            max_history_messages: config.conversation.max_history_messages,
        }
    }
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// The memory store, conversation log, and persona, wired to a backend.
///
/// Every collaborator is passed in; there is no global instance. The
/// conversation log and persona are not thread-safe on their own, so they
/// sit behind locks here. No lock is held across the backend call.
pub struct Companion {
    memory: Arc<MemoryStore>,
    conversations: Mutex<ConversationStore>,
    persona: RwLock<Persona>,
    backend: Arc<dyn GenerationBackend>,
    settings: CompanionSettings,
}

impl Companion {
    pub fn new(
        memory: Arc<MemoryStore>,
        conversations: ConversationStore,
        persona: Persona,
        backend: Arc<dyn GenerationBackend>,
        settings: CompanionSettings,
    ) -> Self {
        Self {
            memory,
            conversations: Mutex::new(conversations),
            persona: RwLock::new(persona),
            backend,
            settings,
        }
    }

    /// Build everything from configuration.
    ///
    /// Fails only if the memory directory cannot be created or listed.
    pub fn from_config(
        config: &AppConfig,
        backend: Arc<dyn GenerationBackend>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let files = Arc::new(JsonDirStore::open(config.memory_dir())?);
        let memory = Arc::new(MemoryStore::open(files, clock.clone(), config.memory.cap)?);
        let conversations = ConversationStore::new(clock.clone(), config.conversation.history_cap);

        let template = PersonaTemplate::load_or_create_default(&config.persona_path());
        let persona = Persona::new(template, PromptAssembler::new(clock))
            .with_emotions(config.persona.enable_emotions);

        info!(
            backend = backend.name(),
            model = %config.model,
            memory_dir = %config.memory_dir().display(),
            "Companion ready"
        );

        Ok(Self::new(
            memory,
            conversations,
            persona,
            backend,
            CompanionSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &CompanionSettings {
        &self.settings
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Render the prompt `respond` would send, without sending it.
    pub fn prompt_for(&self, owner: &str, message: &str) -> String {
        let history = self
            .conversations()
            .history_text(owner, self.settings.max_history_messages);
        let memories = if self.settings.memory_enabled {
            self.memory.memories_as_string(owner, self.settings.recall_limit)
        } else {
            String::new()
        };

        self.persona().build_prompt(owner, message, &history, &memories)
    }

    /// Run one exchange for `owner` and return the reply.
    ///
    /// The user message is logged as a pending turn before the backend is
    /// called. On success the reply completes that turn and both sides are
    /// remembered; on failure nothing is remembered.
    ///
    /// A failed turn is never completed. Its user line keeps appearing in
    /// the history of later prompts, without a reply, until it ages out of
    /// the log or [`Companion::clear_conversation`] is called.
    pub async fn respond(&self, owner: &str, message: &str) -> Result<String, Error> {
        let prompt = self.prompt_for(owner, message);
        self.conversations().begin_turn(owner, message);

        let request = GenerationRequest::new(self.settings.model.clone(), prompt)
            .with_temperature(self.settings.temperature);
        debug!(owner = %owner, prompt_len = request.prompt.len(), "Sending prompt to backend");

        let reply = match self.backend.generate(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(owner = %owner, backend = self.backend.name(), error = %e, "Generation failed");
                return Err(e.into());
            }
        };

        if reply.trim().is_empty() {
            warn!(owner = %owner, backend = self.backend.name(), "Backend returned an empty reply");
            return Err(BackendError::EmptyResponse.into());
        }

        self.conversations().complete_turn(owner, reply.as_str());

        if self.settings.memory_enabled {
            self.memory
                .add_memory(owner, format!("User: {message}"), DEFAULT_IMPORTANCE);
            self.memory
                .add_memory(owner, format!("AI: {reply}"), DEFAULT_IMPORTANCE);
        }

        debug!(owner = %owner, reply_len = reply.len(), "Exchange recorded");
        Ok(reply)
    }

    pub fn update_emotion(&self, dimension: &str, value: f32) {
        self.persona
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update_emotion(dimension, value);
    }

    /// Most recent `limit` turns, oldest first (e.g. for a chat view).
    pub fn conversation_entries(&self, owner: &str, limit: usize) -> Vec<ConversationTurn> {
        self.conversations().entries(owner, limit)
    }

    pub fn conversation_count(&self, owner: &str) -> usize {
        self.conversations().count(owner)
    }

    pub fn clear_conversation(&self, owner: &str) {
        self.conversations().clear(owner);
    }

    /// Flush memories. Safe to call more than once.
    pub fn shutdown(&self) {
        let written = self.memory.close();
        debug!(written, "Companion shut down");
    }

    fn conversations(&self) -> MutexGuard<'_, ConversationStore> {
        self.conversations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persona(&self) -> RwLockReadGuard<'_, Persona> {
        self.persona.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedBackend;
    use chrono::{Duration, Local, TimeZone};
    use companion_core::clock::ManualClock;
    use companion_memory::{InMemoryFileStore, DEFAULT_HISTORY_CAP, DEFAULT_MEMORY_CAP};

    const TEMPLATE: &str = "to:{PLAYER_NAME}\nmood:{EMOTIONAL_STATE}\nmem:\n{RECENT_MEMORIES}\nhist:\n{CONVERSATION_HISTORY}\nmsg:{USER_MESSAGE}";

    fn build(backend: Arc<ScriptedBackend>, settings: CompanionSettings) -> (Companion, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 8, 2, 19, 0, 0).unwrap(),
        ));
        let files = Arc::new(InMemoryFileStore::new());
        let memory = Arc::new(MemoryStore::open(files, clock.clone(), DEFAULT_MEMORY_CAP).unwrap());
        let conversations = ConversationStore::new(clock.clone(), DEFAULT_HISTORY_CAP);
        let persona = Persona::new(
            PersonaTemplate::from_text(TEMPLATE),
            PromptAssembler::new(clock.clone()),
        );
        (
            Companion::new(memory, conversations, persona, backend, settings),
            clock,
        )
    }

    #[tokio::test]
    async fn successful_exchange_is_recorded_everywhere() {
        let backend = Arc::new(ScriptedBackend::replies(&["Well met, Alice!"]));
        let (companion, _) = build(backend.clone(), CompanionSettings::default());

        let reply = companion.respond("Alice", "hello").await.unwrap();
        assert_eq!(reply, "Well met, Alice!");

        let turns = companion.conversation_entries("Alice", 10);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].user_message, "hello");
        assert_eq!(turns[0].assistant_message, "Well met, Alice!");

        let memories: Vec<String> = companion
            .memory()
            .all_memories("Alice")
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(memories, vec!["User: hello", "AI: Well met, Alice!"]);

        let sent = backend.requests();
        assert_eq!(sent[0].model, "nunu-super-AI:12b");
        assert!(sent[0].prompt.contains("to:Alice"));
        assert!(sent[0].prompt.ends_with("msg:hello"));
        assert!(sent[0].prompt.contains("mem:\n\nhist:\n\nmsg:"));
    }

    #[tokio::test]
    async fn second_prompt_carries_history_and_memories() {
        let backend = Arc::new(ScriptedBackend::replies(&["first reply", "second reply"]));
        let (companion, clock) = build(backend.clone(), CompanionSettings::default());

        companion.respond("Alice", "one").await.unwrap();
        clock.advance(Duration::minutes(2));
        companion.respond("Alice", "two").await.unwrap();

        let prompt = &backend.requests()[1].prompt;
        assert!(prompt.contains("hist:\n[19:00] Alice: one\n[19:00] AI: first reply\nmsg:two"));
        assert!(prompt.contains("[19:00] AI: first reply"));
        assert!(prompt.contains("[19:00] User: one"));
        // The current message is not duplicated into history
        assert!(!prompt.contains("Alice: two"));
    }

    #[tokio::test]
    async fn backend_failure_leaves_turn_pending_and_memory_untouched() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(BackendError::Timeout {
            timeout_secs: 300,
        })]));
        let (companion, _) = build(backend, CompanionSettings::default());

        let err = companion.respond("Alice", "hello?").await.unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::Timeout { .. })));

        let turns = companion.conversation_entries("Alice", 10);
        assert_eq!(turns.len(), 1);
        assert!(turns[0].is_pending());
        assert_eq!(companion.memory().count("Alice"), 0);
    }

    #[tokio::test]
    async fn failed_turn_stays_in_later_history_until_cleared() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::Unavailable("connection refused".into())),
            Ok("here now".into()),
            Ok("fresh start".into()),
        ]));
        let (companion, _) = build(backend.clone(), CompanionSettings::default());

        companion.respond("Alice", "anyone?").await.unwrap_err();
        companion.respond("Alice", "hello").await.unwrap();

        let second = &backend.requests()[1].prompt;
        assert!(second.contains("hist:\n[19:00] Alice: anyone?\nmsg:hello"));

        companion.clear_conversation("Alice");
        companion.respond("Alice", "again").await.unwrap();
        let third = &backend.requests()[2].prompt;
        assert!(!third.contains("anyone?"));
    }

    #[tokio::test]
    async fn blank_reply_is_an_error() {
        let backend = Arc::new(ScriptedBackend::replies(&["   "]));
        let (companion, _) = build(backend, CompanionSettings::default());

        let err = companion.respond("Alice", "hello").await.unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::EmptyResponse)));
        assert_eq!(companion.memory().count("Alice"), 0);
    }

    #[tokio::test]
    async fn disabled_memory_is_neither_read_nor_written() {
        let backend = Arc::new(ScriptedBackend::replies(&["ok"]));
        let settings = CompanionSettings {
            memory_enabled: false,
            ..CompanionSettings::default()
        };
        let (companion, _) = build(backend, settings);
        companion.memory().add_memory("Alice", "secret", 1.0);

        assert!(!companion.prompt_for("Alice", "hi").contains("secret"));
        companion.respond("Alice", "hi").await.unwrap();
        assert_eq!(companion.memory().count("Alice"), 1);
        assert_eq!(companion.conversation_count("Alice"), 1);
    }

    #[tokio::test]
    async fn emotion_updates_show_in_prompt() {
        let backend = Arc::new(ScriptedBackend::replies(&[]));
        let (companion, _) = build(backend.clone(), CompanionSettings::default());

        companion.update_emotion("anger", 0.9);
        companion.update_emotion("nonexistent", 0.9);
        let prompt = companion.prompt_for("Alice", "hi");
        assert!(prompt.contains("mood:happiness: 0.50, anger: 0.90, excitement: 0.30, curiosity: 0.40"));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let backend = Arc::new(ScriptedBackend::replies(&["to alice", "to bob"]));
        let (companion, _) = build(backend.clone(), CompanionSettings::default());

        companion.respond("Alice", "alice here").await.unwrap();
        companion.respond("Bob", "bob here").await.unwrap();

        let bob_prompt = &backend.requests()[1].prompt;
        assert!(!bob_prompt.contains("alice here"));
        assert_eq!(companion.conversation_count("Alice"), 1);
        companion.clear_conversation("Alice");
        assert_eq!(companion.conversation_count("Alice"), 0);
        assert_eq!(companion.conversation_count("Bob"), 1);
    }

    #[tokio::test]
    async fn from_config_creates_files_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: Some(tmp.path().to_path_buf()),
            ..AppConfig::default()
        };
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 8, 2, 19, 0, 0).unwrap(),
        ));
        let backend = Arc::new(ScriptedBackend::replies(&["hi!"]));

        let companion = Companion::from_config(&config, backend, clock).unwrap();
        assert!(tmp.path().join("persona.txt").exists());
        assert!(tmp.path().join("memories").is_dir());

        companion.respond("Alice", "hello").await.unwrap();
        companion.shutdown();

        let raw = std::fs::read_to_string(tmp.path().join("memories").join("Alice.json")).unwrap();
        assert!(raw.contains("User: hello"));
        assert!(raw.contains("AI: hi!"));
    }
}
