//! Persona — a template plus the emotional state it speaks with.

use crate::assembler::{PromptAssembler, PromptContext};
use crate::template::PersonaTemplate;
use companion_core::emotion::EmotionalState;

/// One persona builder: owns its template and its emotional state.
#[derive(Debug, Clone)]
pub struct Persona {
    template: PersonaTemplate,
    emotions: EmotionalState,
    emotions_enabled: bool,
    assembler: PromptAssembler,
}

impl Persona {
    pub fn new(template: PersonaTemplate, assembler: PromptAssembler) -> Self {
        Self {
            template,
            emotions: EmotionalState::default(),
            emotions_enabled: true,
            assembler,
        }
    }

    /// Whether `{EMOTIONAL_STATE}` renders the summary or stays empty.
    pub fn with_emotions(mut self, enabled: bool) -> Self {
        self.emotions_enabled = enabled;
        self
    }

    pub fn template(&self) -> &PersonaTemplate {
        &self.template
    }

    pub fn emotional_state(&self) -> &EmotionalState {
        &self.emotions
    }

    pub fn update_emotion(&mut self, dimension: &str, value: f32) {
        PromptAssembler::update_emotion(&mut self.emotions, dimension, value);
    }

    /// Render this persona's template for one message.
    pub fn build_prompt(
        &self,
        owner: &str,
        user_message: &str,
        history_text: &str,
        memories_text: &str,
    ) -> String {
        let ctx = PromptContext {
            owner,
            user_message,
            history_text,
            memories_text,
            emotional_state: self.emotions_enabled.then_some(&self.emotions),
        };
        self.assembler.render(self.template.text(), &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use companion_core::clock::ManualClock;
    use companion_core::emotion::Emotion;
    use std::sync::Arc;

    fn persona(text: &str) -> Persona {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2026, 1, 31, 6, 30, 0).unwrap());
        Persona::new(
            PersonaTemplate::from_text(text),
            PromptAssembler::new(Arc::new(clock)),
        )
    }

    #[test]
    fn build_prompt_uses_own_state() {
        let mut p = persona("{PLAYER_NAME} feels {EMOTIONAL_STATE}");
        p.update_emotion("curiosity", 0.0);
        p.update_emotion("excitement", 0.0);
        assert_eq!(p.build_prompt("Alice", "", "", ""), "Alice feels happiness: 0.50");
        assert_eq!(p.emotional_state().get(Emotion::Curiosity), 0.0);
    }

    #[test]
    fn disabled_emotions_render_empty() {
        let p = persona("[{EMOTIONAL_STATE}]").with_emotions(false);
        assert_eq!(p.build_prompt("Alice", "", "", ""), "[]");
    }

    #[test]
    fn builtin_template_renders_fully() {
        let p = Persona::new(
            PersonaTemplate::builtin(),
            persona("").assembler.clone(),
        );
        let out = p.build_prompt("Alice", "hi there", "", "[06:00] likes tea");
        assert!(out.contains("Speaking to: Alice"));
        assert!(out.contains("Current time: 06:30"));
        assert!(out.contains("Date: 2026-01-31"));
        assert!(out.contains("Recent memories:\n[06:00] likes tea"));
        assert!(out.contains("User message: hi there"));
        assert!(!out.contains("{"));
    }
}
