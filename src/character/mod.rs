//! Character library module.
//!
//! This module provides:
//! - `model`: Character, SceneCharacter and the description suggestion catalogue
//! - `registry`: CharacterRegistry with insertion-ordered CRUD

pub mod model;
pub mod registry;

pub use model::*;
pub use registry::CharacterRegistry;
