//! WASM bindings for the studio.
//!
//! `JsStudio` wraps a `Studio` backed by the browser's `localStorage` and the Gemini adapter.
//! Generation methods return Promises; the studio is only borrowed around the call, never across
//! the await, so the form stays editable while a call is pending.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::character::{append_suggestion, DESCRIPTION_SUGGESTIONS};
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::generation::{gemini_factory, GeminiClient};
use crate::scene::{AspectRatio, InputMode, SourceImage, IMAGE_STYLES, VIDEO_STYLES};
use crate::storage::KeyValueStore;

use super::session::Studio;

/// Serialize a value to JsValue with maps as plain JS objects.
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<StudioError> for JsValue {
    fn from(err: StudioError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: StudioError| JsValue::from(e))
    };
}

fn js_error(err: JsValue) -> StudioError {
    StudioError::storage(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

// =============================================================================
// LOCAL STORAGE
// =============================================================================

/// `KeyValueStore` over `globalThis.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: JsValue,
}

impl LocalStorage {
    /// Looks up `localStorage` on the global object.
    pub fn from_global() -> StudioResult<Self> {
        let storage = Reflect::get(&js_sys::global(), &JsValue::from_str("localStorage"))
            .map_err(js_error)?;
        if storage.is_undefined() || storage.is_null() {
            return Err(StudioError::storage("localStorage is not available"));
        }
        Ok(Self { storage })
    }

    fn method(&self, name: &str) -> StudioResult<Function> {
        Reflect::get(&self.storage, &JsValue::from_str(name))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| StudioError::storage(format!("localStorage.{name} is not a function")))
    }
}

impl KeyValueStore for LocalStorage {
    fn load(&self, key: &str) -> StudioResult<Option<String>> {
        let value = self
            .method("getItem")?
            .call1(&self.storage, &JsValue::from_str(key))
            .map_err(js_error)?;
        Ok(value.as_string())
    }

    fn save(&mut self, key: &str, value: &str) -> StudioResult<()> {
        self.method("setItem")?
            .call2(&self.storage, &JsValue::from_str(key), &JsValue::from_str(value))
            .map_err(js_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StudioResult<()> {
        self.method("removeItem")?
            .call1(&self.storage, &JsValue::from_str(key))
            .map_err(js_error)?;
        Ok(())
    }
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

type BrowserFactory = fn(&str, &StudioConfig) -> StudioResult<GeminiClient>;
type BrowserStudio = Studio<LocalStorage, BrowserFactory>;

/// JavaScript-friendly wrapper around `Studio`.
#[wasm_bindgen]
pub struct JsStudio {
    inner: Rc<RefCell<BrowserStudio>>,
}

#[wasm_bindgen]
impl JsStudio {
    /// Starts a session from `localStorage`.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const studio = new JsStudio();                       // default models
    /// const custom = new JsStudio({ image_count: 2 });     // partial config
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsStudio, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            StudioConfig::new()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let storage = js_result!(LocalStorage::from_global())?;
        let studio = Studio::new(storage, gemini_factory as BrowserFactory, config);
        Ok(JsStudio {
            inner: Rc::new(RefCell::new(studio)),
        })
    }

    /// Full form state, result and prompt flags as a plain object.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const state = studio.getState();
    /// console.log(state.composer.activeMode);   // "structuredVideo"
    /// console.log(state.state.state);           // "idle" | "inFlight"
    /// ```
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.borrow().snapshot())?)
    }

    // =========================================================================
    // CREDENTIAL
    // =========================================================================

    #[wasm_bindgen(js_name = saveApiKey)]
    pub fn save_api_key(&self, key: &str) -> Result<(), JsValue> {
        js_result!(self.inner.borrow_mut().save_credential(key))
    }

    #[wasm_bindgen(js_name = openApiKeyPrompt)]
    pub fn open_api_key_prompt(&self) {
        self.inner.borrow_mut().open_credential_prompt();
    }

    /// Returns false while no key is configured.
    #[wasm_bindgen(js_name = closeApiKeyPrompt)]
    pub fn close_api_key_prompt(&self) -> bool {
        self.inner.borrow_mut().close_credential_prompt()
    }

    // =========================================================================
    // CHARACTER LIBRARY
    // =========================================================================

    /// Adds a character and returns it. Throws on a blank name.
    #[wasm_bindgen(js_name = addCharacter)]
    pub fn add_character(&self, name: &str, description: &str) -> Result<JsValue, JsValue> {
        let character = js_result!(self.inner.borrow_mut().add_character(name, description))?;
        Ok(to_js_value(&character)?)
    }

    /// Returns the updated character, or `undefined` for an unknown id.
    #[wasm_bindgen(js_name = updateCharacter)]
    pub fn update_character(
        &self,
        id: f64,
        name: &str,
        description: &str,
    ) -> Result<JsValue, JsValue> {
        let updated = js_result!(self
            .inner
            .borrow_mut()
            .update_character(id as i64, name, description))?;
        Ok(to_js_value(&updated)?)
    }

    #[wasm_bindgen(js_name = removeCharacter)]
    pub fn remove_character(&self, id: f64) -> Result<bool, JsValue> {
        let removed = js_result!(self.inner.borrow_mut().remove_character(id as i64))?;
        Ok(removed.is_some())
    }

    // =========================================================================
    // FORM FIELDS
    // =========================================================================

    /// Switches tabs: `structuredVideo`, `freestyleVideo`, `imageToVideo` or `textToImage`.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = js_result!(mode.parse::<InputMode>())?;
        self.inner.borrow_mut().switch_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = setMainIdea)]
    pub fn set_main_idea(&self, idea: &str) {
        self.inner.borrow_mut().composer_mut().set_main_idea(idea);
    }

    #[wasm_bindgen(js_name = setSetting)]
    pub fn set_setting(&self, setting: &str) {
        self.inner.borrow_mut().composer_mut().set_setting(setting);
    }

    #[wasm_bindgen(js_name = setFreestyleText)]
    pub fn set_freestyle_text(&self, text: &str) {
        self.inner.borrow_mut().composer_mut().set_freestyle_text(text);
    }

    #[wasm_bindgen(js_name = toggleVideoStyle)]
    pub fn toggle_video_style(&self, style: &str) -> bool {
        self.inner.borrow_mut().composer_mut().toggle_video_style(style)
    }

    #[wasm_bindgen(js_name = toggleImageStyle)]
    pub fn toggle_image_style(&self, style: &str) -> bool {
        self.inner.borrow_mut().composer_mut().toggle_image_style(style)
    }

    /// Accepts `1:1`, `3:4`, `4:3`, `9:16` or `16:9`.
    #[wasm_bindgen(js_name = setAspectRatio)]
    pub fn set_aspect_ratio(&self, ratio: &str) -> Result<(), JsValue> {
        let ratio = js_result!(ratio.parse::<AspectRatio>())?;
        self.inner.borrow_mut().composer_mut().set_aspect_ratio(ratio);
        Ok(())
    }

    /// Sets the uploaded image from a `FileReader` data URL, or clears it with `null`.
    #[wasm_bindgen(js_name = setUploadedImage)]
    pub fn set_uploaded_image(&self, data_url: Option<String>) -> Result<(), JsValue> {
        let image = match data_url {
            Some(url) => Some(js_result!(SourceImage::from_data_url(&url))?),
            None => None,
        };
        self.inner.borrow_mut().composer_mut().set_uploaded_image(image);
        Ok(())
    }

    #[wasm_bindgen(js_name = addImageDialogue)]
    pub fn add_image_dialogue(&self) -> usize {
        self.inner.borrow_mut().composer_mut().add_image_dialogue()
    }

    #[wasm_bindgen(js_name = setImageDialogue)]
    pub fn set_image_dialogue(&self, index: usize, line: &str) -> bool {
        self.inner
            .borrow_mut()
            .composer_mut()
            .set_image_dialogue(index, line)
    }

    #[wasm_bindgen(js_name = removeImageDialogue)]
    pub fn remove_image_dialogue(&self, index: usize) -> bool {
        self.inner.borrow_mut().composer_mut().remove_image_dialogue(index)
    }

    #[wasm_bindgen(js_name = addSceneCharacter)]
    pub fn add_scene_character(&self, id: f64) -> Result<bool, JsValue> {
        js_result!(self.inner.borrow_mut().add_scene_character(id as i64))
    }

    #[wasm_bindgen(js_name = removeSceneCharacter)]
    pub fn remove_scene_character(&self, id: f64) -> bool {
        self.inner.borrow_mut().remove_scene_character(id as i64)
    }

    #[wasm_bindgen(js_name = setDialogue)]
    pub fn set_dialogue(&self, id: f64, dialogue: &str) -> bool {
        self.inner
            .borrow_mut()
            .composer_mut()
            .set_dialogue(id as i64, dialogue)
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Generates for the active tab. Resolves to `{status, value}`.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const outcome = await studio.generate();
    /// if (outcome.status === "completed") show(outcome.value.promptText);
    /// ```
    pub fn generate(&self) -> Promise {
        let studio = Rc::clone(&self.inner);
        future_to_promise(async move {
            let prepared = studio.borrow().prepare_generation();
            let request = match prepared {
                Ok(request) => request,
                Err(outcome) => return Ok(to_js_value(&outcome)?),
            };

            let orchestrator = studio.borrow().orchestrator();
            let outcome = orchestrator.generate(&request).await;
            studio.borrow_mut().finish_generation(&outcome);
            Ok(to_js_value(&outcome)?)
        })
    }

    /// Describes the character in an image data URL. Resolves to `{status, value}`.
    #[wasm_bindgen(js_name = describeCharacter)]
    pub fn describe_character(&self, data_url: &str) -> Result<Promise, JsValue> {
        let image = js_result!(SourceImage::from_data_url(data_url))?;
        let orchestrator = self.inner.borrow().orchestrator();
        Ok(future_to_promise(async move {
            let outcome = orchestrator.describe_character(&image).await;
            Ok(to_js_value(&outcome)?)
        }))
    }

    // =========================================================================
    // CATALOGUES
    // =========================================================================

    #[wasm_bindgen(js_name = videoStyles)]
    pub fn video_styles() -> Result<JsValue, JsValue> {
        Ok(to_js_value(&VIDEO_STYLES)?)
    }

    #[wasm_bindgen(js_name = imageStyles)]
    pub fn image_styles() -> Result<JsValue, JsValue> {
        Ok(to_js_value(&IMAGE_STYLES)?)
    }

    #[wasm_bindgen(js_name = descriptionSuggestions)]
    pub fn description_suggestions() -> Result<JsValue, JsValue> {
        Ok(to_js_value(&DESCRIPTION_SUGGESTIONS)?)
    }

    #[wasm_bindgen(js_name = appendSuggestion)]
    pub fn append_suggestion(description: &str, suggestion: &str) -> String {
        append_suggestion(description, suggestion)
    }
}
