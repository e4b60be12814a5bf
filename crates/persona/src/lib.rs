//! Persona templates and prompt assembly for Companion.
//!
//! A [`Persona`] owns a [`PersonaTemplate`] and an emotional state, and
//! renders prompts through a [`PromptAssembler`]:
//!
//! ```text
//! template ──┐
//! history  ──┤
//! memories ──┼──▶ PromptAssembler::render ──▶ prompt string
//! emotions ──┤
//! clock    ──┘
//! ```

pub mod assembler;
pub mod persona;
pub mod template;

pub use assembler::{PromptAssembler, PromptContext};
pub use persona::Persona;
pub use template::{PersonaTemplate, TemplateSource, DEFAULT_PERSONA};
