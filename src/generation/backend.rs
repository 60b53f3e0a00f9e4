//! Port to the remote generation capability.

use async_trait::async_trait;

use crate::config::StudioConfig;
use crate::error::StudioResult;
use crate::prompt::Contents;
use crate::scene::AspectRatio;

use super::model::GeneratedImage;

/// Parameters for image synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub count: u32,
    pub aspect_ratio: AspectRatio,
    pub output_mime_type: String,
}

impl ImageOptions {
    pub fn from_config(config: &StudioConfig, aspect_ratio: AspectRatio) -> Self {
        Self {
            count: config.image_count,
            aspect_ratio,
            output_mime_type: config.image_mime_type.clone(),
        }
    }
}

/// The two remote calls the orchestrator needs.
///
/// Futures are not required to be `Send`; the browser runtime is single-threaded.
#[async_trait(?Send)]
pub trait GenerationBackend {
    /// Text generation with a system instruction.
    async fn generate_text(
        &self,
        system_instruction: &str,
        contents: &Contents,
    ) -> StudioResult<String>;

    /// Image synthesis from a finished prompt.
    async fn generate_images(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> StudioResult<Vec<GeneratedImage>>;
}

/// Builds a backend for a credential. Called again only when the credential changes.
pub trait BackendFactory {
    type Backend: GenerationBackend;

    fn build(&self, credential: &str, config: &StudioConfig) -> StudioResult<Self::Backend>;
}

impl<F, B> BackendFactory for F
where
    F: Fn(&str, &StudioConfig) -> StudioResult<B>,
    B: GenerationBackend,
{
    type Backend = B;

    fn build(&self, credential: &str, config: &StudioConfig) -> StudioResult<B> {
        self(credential, config)
    }
}
