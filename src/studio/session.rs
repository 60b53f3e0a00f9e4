//! Studio: one user session.
//!
//! Owns the form state, the character library and the persisted slots. The orchestrator is
//! shared through an `Rc` so a host can await a call without holding a borrow of the studio;
//! `prepare_generation` and `finish_generation` bracket such a call.

use std::rc::Rc;

use serde::Serialize;

use crate::character::{Character, CharacterRegistry};
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::generation::{
    AnalysisOutcome, BackendFactory, GenerationFailure, GenerationOutcome, GenerationResult,
    GenerationState, Orchestrator,
};
use crate::scene::{GenerationRequest, InputMode, SceneComposer, SourceImage};
use crate::storage::{KeyValueStore, SessionStore};

/// Everything a form needs to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub composer: SceneComposer,
    pub characters: Vec<Character>,
    pub available_characters: Vec<Character>,
    pub state: GenerationState,
    pub result: Option<GenerationResult>,
    pub failure: Option<GenerationFailure>,
    pub can_generate: bool,
    pub has_credential: bool,
    pub credential_prompt_open: bool,
}

/// One user session.
pub struct Studio<S: KeyValueStore, F: BackendFactory> {
    composer: SceneComposer,
    registry: CharacterRegistry,
    orchestrator: Rc<Orchestrator<F>>,
    store: SessionStore<S>,
    credential_prompt_open: bool,
}

impl<S: KeyValueStore, F: BackendFactory> std::fmt::Debug for Studio<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("mode", &self.composer.active_mode())
            .field("characters", &self.registry.len())
            .field("orchestrator", &self.orchestrator)
            .field("credential_prompt_open", &self.credential_prompt_open)
            .finish()
    }
}

impl<S: KeyValueStore, F: BackendFactory> Studio<S, F> {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Starts a session from the persisted slots. A missing credential opens the prompt.
    pub fn new(store: S, factory: F, config: StudioConfig) -> Self {
        let store = SessionStore::new(store, &config);
        let credential = store.load_credential();
        let registry = CharacterRegistry::from_characters(store.load_characters());

        let orchestrator = Orchestrator::new(factory, config);
        let credential_prompt_open = credential.is_none();
        orchestrator.set_credential(credential);

        tracing::info!(
            characters = registry.len(),
            has_credential = !credential_prompt_open,
            "Studio session started"
        );

        Self {
            composer: SceneComposer::new(),
            registry,
            orchestrator: Rc::new(orchestrator),
            store,
            credential_prompt_open,
        }
    }

    // =========================================================================
    // CREDENTIAL
    // =========================================================================

    /// Saves a trimmed credential, clears the previous error and closes the prompt.
    pub fn save_credential(&mut self, credential: &str) -> StudioResult<()> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(StudioError::validation("API key must not be blank"));
        }

        self.store.save_credential(credential)?;
        self.orchestrator.set_credential(Some(credential.to_string()));
        self.orchestrator.clear_failure();
        self.credential_prompt_open = false;
        tracing::info!("Credential saved");
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        self.orchestrator.has_credential()
    }

    pub fn is_credential_prompt_open(&self) -> bool {
        self.credential_prompt_open
    }

    pub fn open_credential_prompt(&mut self) {
        self.credential_prompt_open = true;
    }

    /// Closes the prompt. Refused while no credential is configured.
    pub fn close_credential_prompt(&mut self) -> bool {
        if self.has_credential() {
            self.credential_prompt_open = false;
        }
        !self.credential_prompt_open
    }

    // =========================================================================
    // CHARACTER LIBRARY
    // =========================================================================

    pub fn characters(&self) -> &[Character] {
        self.registry.list()
    }

    pub fn add_character(&mut self, name: &str, description: &str) -> StudioResult<Character> {
        self.commit_characters(|studio| studio.registry.add(name, description))
    }

    /// Edits a library character; the scene copy follows, keeping its dialogue.
    pub fn update_character(
        &mut self,
        id: i64,
        name: &str,
        description: &str,
    ) -> StudioResult<Option<Character>> {
        self.commit_characters(|studio| {
            let updated = studio.registry.update(id, name, description)?;
            if let Some(character) = &updated {
                studio.composer.refresh_character(character);
            }
            Ok(updated)
        })
    }

    /// Deletes a library character and evicts it from the scene.
    pub fn remove_character(&mut self, id: i64) -> StudioResult<Option<Character>> {
        self.commit_characters(|studio| {
            let removed = studio.registry.remove(id);
            if removed.is_some() {
                studio.composer.remove_character(id);
            }
            Ok(removed)
        })
    }

    /// Applies a library change and persists it. If the save fails, the library and the scene
    /// are restored so memory never runs ahead of storage.
    fn commit_characters<T>(
        &mut self,
        change: impl FnOnce(&mut Self) -> StudioResult<T>,
    ) -> StudioResult<T> {
        let registry = self.registry.clone();
        let composer = self.composer.clone();

        let value = change(self)?;
        if let Err(e) = self.store.save_characters(self.registry.list()) {
            tracing::warn!(error = %e, "Saving characters failed, change rolled back");
            self.registry = registry;
            self.composer = composer;
            return Err(e);
        }
        Ok(value)
    }

    // =========================================================================
    // SCENE
    // =========================================================================

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    /// Mutable form state for plain field edits.
    pub fn composer_mut(&mut self) -> &mut SceneComposer {
        &mut self.composer
    }

    /// Switches tabs and clears the current result and error.
    pub fn switch_mode(&mut self, mode: InputMode) {
        self.composer.switch_mode(mode);
        self.orchestrator.clear_output();
    }

    /// Places a library character in the scene. Returns false when it is already there.
    pub fn add_scene_character(&mut self, id: i64) -> StudioResult<bool> {
        let character = self
            .registry
            .get(id)
            .ok_or(StudioError::UnknownCharacter(id))?;
        Ok(self.composer.add_character(character))
    }

    pub fn remove_scene_character(&mut self, id: i64) -> bool {
        self.composer.remove_character(id)
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    pub fn orchestrator(&self) -> Rc<Orchestrator<F>> {
        Rc::clone(&self.orchestrator)
    }

    /// Applies the pre-call guards and builds the request for the active tab.
    ///
    /// `Err` carries the outcome to report without calling the orchestrator.
    pub fn prepare_generation(&self) -> Result<GenerationRequest, GenerationOutcome> {
        if self.orchestrator.is_in_flight() {
            return Err(GenerationOutcome::Ignored);
        }
        self.composer
            .build_request()
            .map_err(|e| GenerationOutcome::Rejected(e.to_string()))
    }

    /// Applies a finished outcome to the session.
    pub fn finish_generation(&mut self, outcome: &GenerationOutcome) {
        if let GenerationOutcome::Failed(failure) = outcome {
            if failure.reopen_credential_prompt {
                self.credential_prompt_open = true;
            }
        }
    }

    /// Generates for the active tab.
    pub async fn generate(&mut self) -> GenerationOutcome {
        let request = match self.prepare_generation() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let orchestrator = self.orchestrator();
        let outcome = orchestrator.generate(&request).await;
        self.finish_generation(&outcome);
        outcome
    }

    /// Describes the character in `image` for the character editor.
    pub async fn describe_character(&self, image: &SourceImage) -> AnalysisOutcome {
        let orchestrator = self.orchestrator();
        orchestrator.describe_character(image).await
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot {
            composer: self.composer.clone(),
            characters: self.registry.list().to_vec(),
            available_characters: self
                .composer
                .available_characters(self.registry.list())
                .into_iter()
                .cloned()
                .collect(),
            state: self.orchestrator.state(),
            result: self.orchestrator.result(),
            failure: self.orchestrator.failure(),
            can_generate: self.composer.can_generate(),
            has_credential: self.has_credential(),
            credential_prompt_open: self.credential_prompt_open,
        }
    }

    /// Borrows the backing store.
    pub fn store(&self) -> &S {
        self.store.inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CHARACTERS_KEY;
    use crate::config::DEFAULT_CREDENTIAL_KEY;
    use crate::generation::testing::ScriptedBackend;
    use crate::generation::{FailureKind, GeneratedImage};
    use crate::scene::AspectRatio;
    use crate::storage::MemoryStore;

    fn studio(
        store: MemoryStore,
        backend: &ScriptedBackend,
    ) -> Studio<MemoryStore, impl BackendFactory<Backend = ScriptedBackend>> {
        let (factory, _) = backend.factory();
        Studio::new(store, factory, StudioConfig::new())
    }

    fn keyed_store() -> MemoryStore {
        MemoryStore::new().with_entry(DEFAULT_CREDENTIAL_KEY, "key")
    }

    #[test]
    fn test_missing_credential_opens_prompt() {
        let studio = studio(MemoryStore::new(), &ScriptedBackend::new());
        assert!(studio.is_credential_prompt_open());
        assert!(!studio.has_credential());

        let studio = studio_with_key();
        assert!(!studio.is_credential_prompt_open());
    }

    fn studio_with_key() -> Studio<MemoryStore, impl BackendFactory<Backend = ScriptedBackend>> {
        studio(keyed_store(), &ScriptedBackend::new())
    }

    #[test]
    fn test_save_credential() {
        let mut studio = studio(MemoryStore::new(), &ScriptedBackend::new());

        assert!(!studio.close_credential_prompt());
        assert!(studio.save_credential("   ").is_err());
        assert!(studio.is_credential_prompt_open());

        studio.save_credential("  my-key  ").unwrap();
        assert!(!studio.is_credential_prompt_open());
        assert_eq!(studio.store().get(DEFAULT_CREDENTIAL_KEY), Some("my-key"));

        studio.open_credential_prompt();
        assert!(studio.close_credential_prompt());
    }

    #[test]
    fn test_characters_persist_on_every_mutation() {
        let mut studio = studio_with_key();

        let lan = studio.add_character("Lan", "cô giáo lớn tuổi").unwrap();
        let saved: Vec<Character> =
            serde_json::from_str(studio.store().get(DEFAULT_CHARACTERS_KEY).unwrap()).unwrap();
        assert_eq!(saved, vec![lan.clone()]);

        studio.update_character(lan.id, "Cô Lan", "").unwrap();
        let saved: Vec<Character> =
            serde_json::from_str(studio.store().get(DEFAULT_CHARACTERS_KEY).unwrap()).unwrap();
        assert_eq!(saved[0].name, "Cô Lan");

        studio.remove_character(lan.id).unwrap();
        assert_eq!(studio.store().get(DEFAULT_CHARACTERS_KEY), Some("[]"));
    }

    /// Store whose writes start failing once `failing` is set.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Rc<std::cell::Cell<bool>>,
    }

    impl KeyValueStore for FlakyStore {
        fn load(&self, key: &str) -> StudioResult<Option<String>> {
            self.inner.load(key)
        }

        fn save(&mut self, key: &str, value: &str) -> StudioResult<()> {
            if self.failing.get() {
                return Err(StudioError::storage("storage is full"));
            }
            self.inner.save(key, value)
        }

        fn remove(&mut self, key: &str) -> StudioResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_save_rolls_back_library_and_scene() {
        let store = FlakyStore {
            inner: keyed_store(),
            ..Default::default()
        };
        let failing = Rc::clone(&store.failing);
        let (factory, _) = ScriptedBackend::new().factory();
        let mut studio = Studio::new(store, factory, StudioConfig::new());

        let lan = studio.add_character("Lan", "cô giáo lớn tuổi").unwrap();
        studio.add_scene_character(lan.id).unwrap();
        studio.composer_mut().set_dialogue(lan.id, "Chào em");
        let library = studio.characters().to_vec();
        let scene = studio.composer().scene_characters().to_vec();

        failing.set(true);
        assert!(studio.add_character("Mai", "").is_err());
        assert_eq!(studio.characters(), library.as_slice());

        assert!(studio.update_character(lan.id, "Cô Lan", "").is_err());
        assert_eq!(studio.characters(), library.as_slice());
        assert_eq!(studio.composer().scene_characters(), scene.as_slice());

        assert!(studio.remove_character(lan.id).is_err());
        assert_eq!(studio.characters(), library.as_slice());
        assert_eq!(studio.composer().scene_characters(), scene.as_slice());

        failing.set(false);
        let mai = studio.add_character("Mai", "").unwrap();
        assert_eq!(studio.characters().len(), 2);
        assert_ne!(mai.id, lan.id);
    }

    #[test]
    fn test_blank_name_leaves_library_untouched() {
        let mut studio = studio_with_key();
        studio.add_character("Lan", "").unwrap();
        let before = studio.characters().to_vec();

        assert!(studio.add_character("  ", "ghost").is_err());
        assert_eq!(studio.characters(), before.as_slice());
    }

    #[test]
    fn test_characters_loaded_at_start() {
        let store = keyed_store().with_entry(
            DEFAULT_CHARACTERS_KEY,
            r#"[{"id":5,"name":"Mai","description":"cô giáo trẻ"}]"#,
        );
        let studio = studio(store, &ScriptedBackend::new());
        assert_eq!(studio.characters().len(), 1);
        assert_eq!(studio.characters()[0].name, "Mai");

        let corrupt = keyed_store().with_entry(DEFAULT_CHARACTERS_KEY, "{not json");
        assert!(studio_from(corrupt).characters().is_empty());
    }

    fn studio_from(store: MemoryStore) -> Studio<MemoryStore, impl BackendFactory<Backend = ScriptedBackend>> {
        studio(store, &ScriptedBackend::new())
    }

    #[test]
    fn test_removing_library_character_evicts_from_scene() {
        let mut studio = studio_with_key();
        let lan = studio.add_character("Lan", "").unwrap();
        let mai = studio.add_character("Mai", "").unwrap();
        assert!(studio.add_scene_character(lan.id).unwrap());
        assert!(studio.add_scene_character(mai.id).unwrap());
        assert!(!studio.add_scene_character(lan.id).unwrap());
        studio.composer_mut().set_dialogue(lan.id, "Chào em");

        studio.remove_character(lan.id).unwrap();
        let ids: Vec<i64> = studio.composer().scene_characters().iter().map(|sc| sc.id()).collect();
        assert_eq!(ids, vec![mai.id]);

        assert!(matches!(
            studio.add_scene_character(lan.id),
            Err(StudioError::UnknownCharacter(_))
        ));
    }

    #[test]
    fn test_editing_library_character_updates_scene_keeping_dialogue() {
        let mut studio = studio_with_key();
        let lan = studio.add_character("Lan", "").unwrap();
        studio.add_scene_character(lan.id).unwrap();
        studio.composer_mut().set_dialogue(lan.id, "Chào em");

        studio.update_character(lan.id, "Lan", "tóc bạc").unwrap();

        let sc = &studio.composer().scene_characters()[0];
        assert_eq!(sc.character.description, "tóc bạc");
        assert_eq!(sc.dialogue, "Chào em");
    }

    #[tokio::test]
    async fn test_generate_structured_video() {
        let backend = ScriptedBackend::new().with_text(Ok("A quiet staff room."));
        let mut studio = studio(keyed_store(), &backend);
        studio.composer_mut().set_main_idea("hai giáo viên nói chuyện");

        let outcome = studio.generate().await;

        assert_eq!(
            outcome,
            GenerationOutcome::Completed(GenerationResult::text("A quiet staff room."))
        );
        let snapshot = studio.snapshot();
        assert_eq!(snapshot.result, Some(GenerationResult::text("A quiet staff room.")));
        assert_eq!(snapshot.state, GenerationState::Idle);
    }

    #[tokio::test]
    async fn test_blank_idea_never_calls_backend() {
        let backend = ScriptedBackend::new().with_text(Ok("unused"));
        let mut studio = studio(keyed_store(), &backend);
        studio.composer_mut().set_main_idea("   ");

        let outcome = studio.generate().await;

        assert!(matches!(outcome, GenerationOutcome::Rejected(_)));
        assert!(backend.text_calls().is_empty());
        assert!(!studio.snapshot().can_generate);
    }

    #[tokio::test]
    async fn test_invalid_key_reopens_prompt_but_quota_does_not() {
        let backend = ScriptedBackend::new()
            .with_text(Err(StudioError::remote(
                Some(429),
                "[429 RESOURCE_EXHAUSTED] Quota exceeded",
            )))
            .with_text(Err(StudioError::remote(
                Some(400),
                "[400 INVALID_ARGUMENT] API key not valid",
            )));
        let mut studio = studio(keyed_store(), &backend);
        studio.composer_mut().set_main_idea("idea");

        studio.generate().await;
        assert!(!studio.is_credential_prompt_open());
        assert_eq!(
            studio.snapshot().failure.map(|f| f.kind),
            Some(FailureKind::QuotaExceeded)
        );

        studio.generate().await;
        assert!(studio.is_credential_prompt_open());

        studio.save_credential("new-key").unwrap();
        assert!(studio.snapshot().failure.is_none());
    }

    #[tokio::test]
    async fn test_generate_without_credential_reopens_prompt() {
        let backend = ScriptedBackend::new();
        let mut studio = studio(MemoryStore::new(), &backend);
        studio.close_credential_prompt();
        studio.composer_mut().set_main_idea("idea");

        let outcome = studio.generate().await;

        assert!(matches!(
            outcome,
            GenerationOutcome::Failed(ref f) if f.kind == FailureKind::InvalidCredential
        ));
        assert!(studio.is_credential_prompt_open());
    }

    #[tokio::test]
    async fn test_switch_mode_clears_result_and_image() {
        let backend = ScriptedBackend::new()
            .with_text(Ok("A rainy street --ar 1:1"))
            .with_images(Ok(vec![GeneratedImage::new("image/jpeg", vec![1, 2, 3])]));
        let mut studio = studio(keyed_store(), &backend);
        studio.switch_mode(InputMode::TextToImage);
        studio.composer_mut().set_main_idea("phố mưa");
        studio.composer_mut().set_aspect_ratio(AspectRatio::Square);

        let outcome = studio.generate().await;
        let GenerationOutcome::Completed(result) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(result.prompt_text, "A rainy street --ar 1:1");
        assert_eq!(result.images().len(), 1);

        studio.switch_mode(InputMode::ImageToVideo);
        studio
            .composer_mut()
            .set_uploaded_image(Some(SourceImage::new("image/png", "iVBORw0KGgo=").unwrap()));
        assert!(studio.snapshot().result.is_none());

        studio.switch_mode(InputMode::StructuredVideo);
        assert!(studio.composer().uploaded_image().is_none());
        assert_eq!(studio.composer().main_idea(), "phố mưa");
    }

    #[tokio::test]
    async fn test_describe_character_does_not_touch_result() {
        let backend = ScriptedBackend::new().with_text(Ok("A cheerful old teacher."));
        let studio = studio(keyed_store(), &backend);
        let image = SourceImage::new("image/png", "iVBORw0KGgo=").unwrap();

        let outcome = studio.describe_character(&image).await;

        assert_eq!(outcome, AnalysisOutcome::Described("A cheerful old teacher.".into()));
        assert!(studio.snapshot().result.is_none());
    }
}
