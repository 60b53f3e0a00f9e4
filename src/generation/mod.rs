//! Generation orchestration.
//!
//! This module provides:
//! - `model`: orchestrator state, results and classified failures
//! - `backend`: the `GenerationBackend` port and the credential-keyed `BackendFactory`
//! - `classify`: remote error classification and user-facing messages
//! - `orchestrator`: the single-flight `Orchestrator` state machine
//! - `gemini`: the Gemini REST adapter (feature `gemini`)

pub mod backend;
pub mod classify;
pub mod model;
pub mod orchestrator;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendFactory, GenerationBackend, ImageOptions};
pub use classify::classify_failure;
pub use model::*;
pub use orchestrator::Orchestrator;

#[cfg(feature = "gemini")]
pub use gemini::{gemini_factory, GeminiClient};
