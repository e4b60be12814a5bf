//! Prompt assembly — fills a persona template with dynamic context.
//!
//! Recognized placeholders:
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{PLAYER_NAME}` | owner identifier |
//! | `{USER_MESSAGE}` | the new user message |
//! | `{CONVERSATION_HISTORY}` | rendered conversation window |
//! | `{RECENT_MEMORIES}` | rendered memories |
//! | `{EMOTIONAL_STATE}` | emotional summary |
//! | `{CURRENT_TIME}` | clock time, `HH:mm` |
//! | `{DATE}` | clock date, `yyyy-MM-dd` |
//!
//! # Determinism
//!
//! Substitution is a single left-to-right pass over the template. Text
//! inserted for one placeholder is never scanned again, so a user message
//! containing `{DATE}` stays literal. Anything in braces that is not listed
//! above is copied through untouched. The only time source is the injected
//! clock.

use companion_core::clock::Clock;
use companion_core::emotion::EmotionalState;
use std::sync::Arc;

pub const PLAYER_NAME: &str = "PLAYER_NAME";
pub const USER_MESSAGE: &str = "USER_MESSAGE";
pub const CONVERSATION_HISTORY: &str = "CONVERSATION_HISTORY";
pub const RECENT_MEMORIES: &str = "RECENT_MEMORIES";
pub const EMOTIONAL_STATE: &str = "EMOTIONAL_STATE";
pub const CURRENT_TIME: &str = "CURRENT_TIME";
pub const DATE: &str = "DATE";

/// Everything a single prompt is rendered from, besides the template.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub owner: &'a str,
    pub user_message: &'a str,
    pub history_text: &'a str,
    pub memories_text: &'a str,
    /// `None` renders an empty emotional summary
    pub emotional_state: Option<&'a EmotionalState>,
}

/// Stateless apart from its clock — create one and reuse it.
#[derive(Clone)]
pub struct PromptAssembler {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PromptAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptAssembler").finish_non_exhaustive()
    }
}

impl PromptAssembler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Render `template` with the given context.
    pub fn render(&self, template: &str, ctx: &PromptContext<'_>) -> String {
        let now = self.clock.now();
        let time = now.format("%H:%M").to_string();
        let date = now.format("%Y-%m-%d").to_string();
        let emotions = ctx
            .emotional_state
            .map(EmotionalState::summary)
            .unwrap_or_default();

        substitute(template, |name| match name {
            PLAYER_NAME => Some(ctx.owner),
            USER_MESSAGE => Some(ctx.user_message),
            CONVERSATION_HISTORY => Some(ctx.history_text),
            RECENT_MEMORIES => Some(ctx.memories_text),
            EMOTIONAL_STATE => Some(emotions.as_str()),
            CURRENT_TIME => Some(time.as_str()),
            DATE => Some(date.as_str()),
            _ => None,
        })
    }

    /// Set a named emotion on `state`. Unknown names are ignored.
    pub fn update_emotion(state: &mut EmotionalState, dimension: &str, value: f32) {
        state.update(dimension, value);
    }
}

/// Replace every `{NAME}` for which `lookup` returns a value.
fn substitute<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find(['{', '}']) else {
            out.push_str(&rest[open..]);
            return out;
        };

        // `{` before the closing brace: this one cannot start a placeholder
        if after.as_bytes()[close] == b'{' {
            out.push('{');
            rest = after;
            continue;
        }

        let name = &after[..close];
        match lookup(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use companion_core::clock::ManualClock;
    use companion_core::emotion::Emotion;

    fn assembler() -> PromptAssembler {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2026, 7, 9, 21, 4, 0).unwrap());
        PromptAssembler::new(Arc::new(clock))
    }

    const ALL_SEVEN: &str = "to={PLAYER_NAME}|msg={USER_MESSAGE}|hist={CONVERSATION_HISTORY}|mem={RECENT_MEMORIES}|emo={EMOTIONAL_STATE}|t={CURRENT_TIME}|d={DATE}";

    #[test]
    fn renders_all_placeholders() {
        let state = EmotionalState::default();
        let out = assembler().render(
            ALL_SEVEN,
            &PromptContext {
                owner: "Alice",
                user_message: "hello",
                history_text: "[21:00] Alice: hi",
                memories_text: "[20:00] likes tea",
                emotional_state: Some(&state),
            },
        );
        assert_eq!(
            out,
            "to=Alice|msg=hello|hist=[21:00] Alice: hi|mem=[20:00] likes tea|emo=happiness: 0.50, excitement: 0.30, curiosity: 0.40|t=21:04|d=2026-07-09"
        );
    }

    #[test]
    fn empty_context_leaves_sections_empty() {
        let state = EmotionalState::default();
        let out = assembler().render(
            ALL_SEVEN,
            &PromptContext {
                owner: "Alice",
                user_message: "hello",
                history_text: "",
                memories_text: "",
                emotional_state: Some(&state),
            },
        );
        assert!(out.contains("|hist=|mem=|"));
        assert!(out.starts_with("to=Alice|msg=hello|"));
        assert!(out.ends_with("|t=21:04|d=2026-07-09"));
        assert!(!out.contains('{'));
    }

    #[test]
    fn unknown_placeholders_are_left_verbatim() {
        let out = assembler().render(
            "{UNKNOWN} and {PLAYER_NAME} and {lowercase} and {}",
            &PromptContext {
                owner: "Bob",
                user_message: "",
                history_text: "",
                memories_text: "",
                emotional_state: None,
            },
        );
        assert_eq!(out, "{UNKNOWN} and Bob and {lowercase} and {}");
    }

    #[test]
    fn substituted_text_is_not_expanded_again() {
        let out = assembler().render(
            "{USER_MESSAGE} / {DATE}",
            &PromptContext {
                owner: "Bob",
                user_message: "what is {DATE}? also {PLAYER_NAME}",
                history_text: "",
                memories_text: "",
                emotional_state: None,
            },
        );
        assert_eq!(out, "what is {DATE}? also {PLAYER_NAME} / 2026-07-09");
    }

    #[test]
    fn stray_braces_survive() {
        let ctx = PromptContext {
            owner: "Bob",
            user_message: "",
            history_text: "",
            memories_text: "",
            emotional_state: None,
        };
        let a = assembler();
        assert_eq!(a.render("{ {PLAYER_NAME}", &ctx), "{ Bob");
        assert_eq!(a.render("json: {\"k\": 1} }", &ctx), "json: {\"k\": 1} }");
        assert_eq!(a.render("trailing {PLAYER_NAME", &ctx), "trailing {PLAYER_NAME");
        assert_eq!(a.render("{{PLAYER_NAME}}", &ctx), "{Bob}");
    }

    #[test]
    fn repeated_placeholders_all_substituted() {
        let out = assembler().render(
            "{PLAYER_NAME}, {PLAYER_NAME}!",
            &PromptContext {
                owner: "Zed",
                user_message: "",
                history_text: "",
                memories_text: "",
                emotional_state: None,
            },
        );
        assert_eq!(out, "Zed, Zed!");
    }

    #[test]
    fn emotions_render_only_above_threshold() {
        let mut state = EmotionalState::default();
        PromptAssembler::update_emotion(&mut state, "happiness", 0.05);
        PromptAssembler::update_emotion(&mut state, "anger", 0.8);
        PromptAssembler::update_emotion(&mut state, "nonexistent", 0.9);
        assert_eq!(state.get(Emotion::Happiness), 0.05);

        let out = assembler().render(
            "{EMOTIONAL_STATE}",
            &PromptContext {
                owner: "Zed",
                user_message: "",
                history_text: "",
                memories_text: "",
                emotional_state: Some(&state),
            },
        );
        assert_eq!(out, "anger: 0.80, excitement: 0.30, curiosity: 0.40");
    }

    #[test]
    fn update_emotion_clamps() {
        let mut state = EmotionalState::default();
        PromptAssembler::update_emotion(&mut state, "happiness", 1.5);
        assert_eq!(state.get(Emotion::Happiness), 1.0);
        PromptAssembler::update_emotion(&mut state, "happiness", -1.0);
        assert_eq!(state.get(Emotion::Happiness), 0.0);

        let before = state.clone();
        PromptAssembler::update_emotion(&mut state, "nonexistent", 0.9);
        assert_eq!(state, before);
    }
}
