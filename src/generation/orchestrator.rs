//! Single-flight generation state machine.
//!
//! Methods take `&self` so a pending call does not lock out state queries from the host. The
//! in-flight flag is the only guard against overlapping calls: a second call made while one is
//! pending returns `Ignored` without touching any state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::prompt::{ensure_aspect_ratio, render_character_analysis, render_request};
use crate::scene::{GenerationMode, GenerationRequest, SourceImage};

use super::backend::{BackendFactory, GenerationBackend, ImageOptions};
use super::classify::classify_failure;
use super::model::{
    AnalysisOutcome, GenerationFailure, GenerationOutcome, GenerationResult, GenerationState,
};

/// Resets the state to `Idle` when dropped, including when the pending future is dropped.
struct InFlightGuard<'a> {
    state: &'a Cell<GenerationState>,
}

impl<'a> InFlightGuard<'a> {
    fn enter(state: &'a Cell<GenerationState>, mode: GenerationMode) -> Self {
        state.set(GenerationState::InFlight(mode));
        Self { state }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.set(GenerationState::Idle);
    }
}

/// Client handle together with the credential it was built for.
struct CachedClient<B> {
    credential: String,
    backend: Rc<B>,
}

/// Runs generation calls one at a time and keeps the single result slot.
pub struct Orchestrator<F: BackendFactory> {
    factory: F,
    config: StudioConfig,
    credential: RefCell<Option<String>>,
    client: RefCell<Option<CachedClient<F::Backend>>>,
    state: Cell<GenerationState>,
    result: RefCell<Option<GenerationResult>>,
    failure: RefCell<Option<GenerationFailure>>,
}

impl<F: BackendFactory> std::fmt::Debug for Orchestrator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state.get())
            .field("has_credential", &self.has_credential())
            .field("has_result", &self.result.borrow().is_some())
            .finish()
    }
}

impl<F: BackendFactory> Orchestrator<F> {
    pub fn new(factory: F, config: StudioConfig) -> Self {
        Self {
            factory,
            config,
            credential: RefCell::new(None),
            client: RefCell::new(None),
            state: Cell::new(GenerationState::Idle),
            result: RefCell::new(None),
            failure: RefCell::new(None),
        }
    }

    // =========================================================================
    // CREDENTIAL
    // =========================================================================

    /// Replaces the credential. Blank values clear it. The client is rebuilt lazily.
    pub fn set_credential(&self, credential: Option<String>) {
        let credential = credential
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        *self.credential.borrow_mut() = credential;
    }

    pub fn has_credential(&self) -> bool {
        self.credential.borrow().is_some()
    }

    /// Returns the client for the current credential, building it if the credential changed.
    fn client(&self) -> StudioResult<Rc<F::Backend>> {
        let credential = self
            .credential
            .borrow()
            .clone()
            .ok_or(StudioError::MissingCredential)?;

        let mut cached = self.client.borrow_mut();
        if let Some(client) = cached.as_ref() {
            if client.credential == credential {
                return Ok(Rc::clone(&client.backend));
            }
        }

        tracing::info!(had_client = cached.is_some(), "Building remote client");
        let backend = Rc::new(self.factory.build(&credential, &self.config)?);
        *cached = Some(CachedClient {
            credential,
            backend: Rc::clone(&backend),
        });
        Ok(backend)
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn state(&self) -> GenerationState {
        self.state.get()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.get().is_in_flight()
    }

    pub fn result(&self) -> Option<GenerationResult> {
        self.result.borrow().clone()
    }

    pub fn failure(&self) -> Option<GenerationFailure> {
        self.failure.borrow().clone()
    }

    /// Clears the result and failure slots.
    pub fn clear_output(&self) {
        *self.result.borrow_mut() = None;
        *self.failure.borrow_mut() = None;
    }

    pub fn clear_failure(&self) {
        *self.failure.borrow_mut() = None;
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Runs one generation request.
    ///
    /// Ignored while another call is in flight and rejected when the request is invalid; in both
    /// cases nothing changes. Otherwise the previous result and failure are cleared, the call
    /// runs, and its result or classified failure is stored.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mode = request.mode();
        if self.is_in_flight() {
            tracing::debug!(%mode, "Generation already in flight, ignoring submit");
            return GenerationOutcome::Ignored;
        }
        if let Err(e) = request.validate() {
            tracing::debug!(%mode, error = %e, "Request failed validation");
            return GenerationOutcome::Rejected(e.to_string());
        }

        self.clear_output();
        let _guard = InFlightGuard::enter(&self.state, mode);
        tracing::info!(%mode, "Generation started");

        match self.run(request).await {
            Ok(result) => {
                tracing::info!(
                    %mode,
                    images = result.images().len(),
                    "Generation completed"
                );
                *self.result.borrow_mut() = Some(result.clone());
                GenerationOutcome::Completed(result)
            }
            Err(e) => {
                let failure = self.classify(mode, &e);
                *self.failure.borrow_mut() = Some(failure.clone());
                GenerationOutcome::Failed(failure)
            }
        }
    }

    async fn run(&self, request: &GenerationRequest) -> StudioResult<GenerationResult> {
        let client = self.client()?;
        let rendered = render_request(request);
        let text = client
            .generate_text(rendered.system_instruction, &rendered.contents)
            .await?;

        let GenerationRequest::TextToImage(image_request) = request else {
            return Ok(GenerationResult::text(text.trim()));
        };

        // The enriched text is sent to image synthesis verbatim and returned with the images.
        let prompt = ensure_aspect_ratio(&text, image_request.aspect_ratio);
        let options = ImageOptions::from_config(&self.config, image_request.aspect_ratio);
        let images = client.generate_images(&prompt, &options).await?;
        if images.is_empty() {
            return Err(StudioError::malformed("image synthesis returned no images"));
        }
        Ok(GenerationResult::with_images(prompt, images))
    }

    /// Describes the character in `image`. Shares the in-flight guard but never touches the
    /// result or failure slots.
    pub async fn describe_character(&self, image: &SourceImage) -> AnalysisOutcome {
        let mode = GenerationMode::CharacterAnalysis;
        if self.is_in_flight() {
            tracing::debug!(%mode, "Generation already in flight, ignoring analysis");
            return AnalysisOutcome::Ignored;
        }

        let _guard = InFlightGuard::enter(&self.state, mode);
        tracing::info!(%mode, "Character analysis started");

        let described: StudioResult<String> = async {
            let client = self.client()?;
            let rendered = render_character_analysis(image);
            client
                .generate_text(rendered.system_instruction, &rendered.contents)
                .await
        }
        .await;

        match described {
            Ok(text) => AnalysisOutcome::Described(text.trim().to_string()),
            Err(e) => {
                // Analysis failures stay inline in the character dialog.
                let mut failure = self.classify(mode, &e);
                failure.reopen_credential_prompt = false;
                AnalysisOutcome::Failed(failure)
            }
        }
    }

    fn classify(&self, mode: GenerationMode, err: &StudioError) -> GenerationFailure {
        let kind = classify_failure(err);
        tracing::error!(%mode, %kind, error = %err, "Generation failed");
        GenerationFailure::new(kind, err.to_string())
    }
}
