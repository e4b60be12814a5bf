//! `companion persona` — Persona template commands.

use companion_core::clock::SystemClock;
use companion_persona::{Persona, PersonaTemplate, PromptAssembler, TemplateSource};
use std::sync::Arc;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let template = PersonaTemplate::load_or_create_default(&config.persona_path());

    match template.source() {
        TemplateSource::File(path) | TemplateSource::CreatedDefault(path) => {
            println!("# {}\n", path.display())
        }
        TemplateSource::BuiltIn => println!("# (built-in)\n"),
    }
    println!("{}", template.text());

    Ok(())
}

/// Render with the user's stored memories. Conversation history lives only
/// in a running process, so it renders empty here.
pub async fn render(owner: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = super::open_memory(&config)?;

    let memories = if config.memory.enabled {
        store.memories_as_string(owner, config.memory.recall_limit)
    } else {
        String::new()
    };

    let template = PersonaTemplate::load_or_create_default(&config.persona_path());
    let persona = Persona::new(template, PromptAssembler::new(Arc::new(SystemClock)))
        .with_emotions(config.persona.enable_emotions);

    println!("{}", persona.build_prompt(owner, message, "", &memories));

    Ok(())
}
