//! Scenecraft - prompt composition and generation orchestration for a video/image prompt studio.
//!
//! The crate turns form input (an idea, a setting, style tags, characters with dialogue, an
//! uploaded image) into prompts for a remote generative model and runs the calls:
//!
//! - **Scene composition**: form state shared by four input modes, built into a validated
//!   `GenerationRequest`
//! - **Prompt rendering**: a static system instruction per mode plus a labeled payload with
//!   fallback phrases for empty fields
//! - **Orchestration**: one call in flight at a time, classified failures, and a two-stage
//!   text-then-image flow for image requests
//! - **Persistence**: the credential and the character library in a string key-value store
//!
//! # Example
//!
//! ```rust
//! use scenecraft::{render_request, GenerationRequest, StructuredVideoRequest, SETTING_FALLBACK};
//!
//! let request = GenerationRequest::StructuredVideo(StructuredVideoRequest {
//!     main_idea: "hai giáo viên nói chuyện".into(),
//!     styles: vec!["Hoạt hình".into()],
//!     ..Default::default()
//! });
//!
//! let rendered = render_request(&request);
//! assert!(rendered.contents.text_content().contains(SETTING_FALLBACK));
//! ```

pub mod character;
pub mod config;
pub mod error;
pub mod generation;
pub mod prompt;
pub mod scene;
pub mod storage;
pub mod studio;

// Re-exports for convenience
pub use character::{append_suggestion, Character, CharacterRegistry, SceneCharacter};
pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use generation::{
    AnalysisOutcome, BackendFactory, FailureKind, GeneratedImage, GenerationBackend,
    GenerationFailure, GenerationOutcome, GenerationResult, GenerationState, ImageOptions,
    Orchestrator,
};
pub use prompt::{ensure_aspect_ratio, render_request, RenderedPrompt, SETTING_FALLBACK};
pub use scene::{
    AspectRatio, FreestyleVideoRequest, GenerationMode, GenerationRequest, ImageToVideoRequest,
    InputMode, SceneComposer, SourceImage, StructuredVideoRequest, StyleSet, TextToImageRequest,
};
pub use storage::{KeyValueStore, MemoryStore, SessionStore};
pub use studio::{Studio, StudioSnapshot};

#[cfg(feature = "gemini")]
pub use generation::{gemini_factory, GeminiClient};

#[cfg(feature = "wasm")]
pub use studio::{JsStudio, LocalStorage};
