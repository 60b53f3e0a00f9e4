//! Scene composition module.
//!
//! This module provides:
//! - `model`: GenerationRequest variants, AspectRatio, SourceImage, StyleSet and style catalogues
//! - `composer`: SceneComposer holding the form state shared by every input mode

pub mod composer;
pub mod model;

pub use composer::SceneComposer;
pub use model::*;
