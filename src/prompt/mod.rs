//! Prompt template engine.
//!
//! This module provides:
//! - `instructions`: the five static system instructions, selected by generation mode
//! - `payload`: content parts sent alongside an instruction (text and inline images)
//! - `render`: request-to-payload rendering, field fallbacks and aspect-ratio repair

pub mod instructions;
pub mod payload;
pub mod render;

pub use instructions::system_instruction;
pub use payload::{Contents, Part, RenderedPrompt};
pub use render::{
    ensure_aspect_ratio, render_character_analysis, render_request, PromptField,
    IMAGE_IDEA_FALLBACK, NO_CHARACTERS, NO_DESCRIPTION, NO_DIALOGUE, SETTING_FALLBACK,
    STYLE_FALLBACK,
};
