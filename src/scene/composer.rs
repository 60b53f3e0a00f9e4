//! SceneComposer: form state shared by every input mode.
//!
//! Field values persist across tab switches. `build_request()` turns the fields of the active
//! mode into a validated `GenerationRequest`.

use serde::Serialize;

use crate::character::{Character, SceneCharacter};
use crate::error::{StudioError, StudioResult};

use super::model::*;

/// Unified input state for the four generation modes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneComposer {
    active_mode: InputMode,
    main_idea: String,
    setting: String,
    freestyle_text: String,
    video_styles: StyleSet,
    image_styles: StyleSet,
    aspect_ratio: AspectRatio,
    uploaded_image: Option<SourceImage>,
    image_dialogues: Vec<String>,
    scene_characters: Vec<SceneCharacter>,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneComposer {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a composer with the default style selections.
    pub fn new() -> Self {
        Self {
            active_mode: InputMode::default(),
            main_idea: String::new(),
            setting: String::new(),
            freestyle_text: String::new(),
            video_styles: StyleSet::with_styles([DEFAULT_VIDEO_STYLE]),
            image_styles: StyleSet::with_styles([DEFAULT_IMAGE_STYLE]),
            aspect_ratio: AspectRatio::default(),
            uploaded_image: None,
            image_dialogues: Vec::new(),
            scene_characters: Vec::new(),
        }
    }

    // =========================================================================
    // MODE
    // =========================================================================

    pub fn active_mode(&self) -> InputMode {
        self.active_mode
    }

    /// Switches tabs. The uploaded image is discarded unless the new tab uses it.
    pub fn switch_mode(&mut self, mode: InputMode) {
        self.active_mode = mode;
        if mode != InputMode::ImageToVideo {
            self.uploaded_image = None;
        }
    }

    // =========================================================================
    // TEXT FIELDS
    // =========================================================================

    pub fn main_idea(&self) -> &str {
        &self.main_idea
    }

    pub fn set_main_idea(&mut self, idea: impl Into<String>) {
        self.main_idea = idea.into();
    }

    pub fn setting(&self) -> &str {
        &self.setting
    }

    pub fn set_setting(&mut self, setting: impl Into<String>) {
        self.setting = setting.into();
    }

    pub fn freestyle_text(&self) -> &str {
        &self.freestyle_text
    }

    pub fn set_freestyle_text(&mut self, text: impl Into<String>) {
        self.freestyle_text = text.into();
    }

    // =========================================================================
    // STYLES & ASPECT RATIO
    // =========================================================================

    pub fn video_styles(&self) -> &StyleSet {
        &self.video_styles
    }

    pub fn toggle_video_style(&mut self, style: &str) -> bool {
        self.video_styles.toggle(style)
    }

    pub fn image_styles(&self) -> &StyleSet {
        &self.image_styles
    }

    pub fn toggle_image_style(&mut self, style: &str) -> bool {
        self.image_styles.toggle(style)
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    // =========================================================================
    // IMAGE INPUT
    // =========================================================================

    pub fn uploaded_image(&self) -> Option<&SourceImage> {
        self.uploaded_image.as_ref()
    }

    pub fn set_uploaded_image(&mut self, image: Option<SourceImage>) {
        self.uploaded_image = image;
    }

    pub fn image_dialogues(&self) -> &[String] {
        &self.image_dialogues
    }

    /// Appends an empty dialogue line and returns its index.
    pub fn add_image_dialogue(&mut self) -> usize {
        self.image_dialogues.push(String::new());
        self.image_dialogues.len() - 1
    }

    /// Replaces the text of a dialogue line. Returns false when the index is out of range.
    pub fn set_image_dialogue(&mut self, index: usize, line: impl Into<String>) -> bool {
        match self.image_dialogues.get_mut(index) {
            Some(slot) => {
                *slot = line.into();
                true
            }
            None => false,
        }
    }

    /// Removes a dialogue line. Returns false when the index is out of range.
    pub fn remove_image_dialogue(&mut self, index: usize) -> bool {
        if index < self.image_dialogues.len() {
            self.image_dialogues.remove(index);
            true
        } else {
            false
        }
    }

    // =========================================================================
    // SCENE CHARACTERS
    // =========================================================================

    pub fn scene_characters(&self) -> &[SceneCharacter] {
        &self.scene_characters
    }

    /// Library characters not yet placed in the scene.
    pub fn available_characters<'a>(&self, library: &'a [Character]) -> Vec<&'a Character> {
        library
            .iter()
            .filter(|c| !self.has_character(c.id))
            .collect()
    }

    pub fn has_character(&self, id: i64) -> bool {
        self.scene_characters.iter().any(|sc| sc.id() == id)
    }

    /// Places a character in the scene with empty dialogue. No-op if already present.
    pub fn add_character(&mut self, character: &Character) -> bool {
        if self.has_character(character.id) {
            return false;
        }
        self.scene_characters
            .push(SceneCharacter::new(character.clone()));
        true
    }

    /// Takes a character out of the scene, dropping its dialogue. No-op if absent.
    pub fn remove_character(&mut self, id: i64) -> bool {
        let before = self.scene_characters.len();
        self.scene_characters.retain(|sc| sc.id() != id);
        self.scene_characters.len() != before
    }

    /// Sets the dialogue of a scene character. Returns false when it is not in the scene.
    pub fn set_dialogue(&mut self, id: i64, dialogue: impl Into<String>) -> bool {
        match self.scene_characters.iter_mut().find(|sc| sc.id() == id) {
            Some(sc) => {
                sc.dialogue = dialogue.into();
                true
            }
            None => false,
        }
    }

    /// Mirrors an edited library character into the scene, keeping its dialogue.
    pub fn refresh_character(&mut self, character: &Character) {
        if let Some(sc) = self
            .scene_characters
            .iter_mut()
            .find(|sc| sc.id() == character.id)
        {
            sc.character = character.clone();
        }
    }

    // =========================================================================
    // REQUEST BUILDING
    // =========================================================================

    /// Whether the active mode has its required input.
    pub fn can_generate(&self) -> bool {
        self.build_request().is_ok()
    }

    /// Builds the request for the active mode.
    pub fn build_request(&self) -> StudioResult<GenerationRequest> {
        self.build_request_for(self.active_mode)
    }

    /// Builds and validates the request for `mode` from the current fields.
    pub fn build_request_for(&self, mode: InputMode) -> StudioResult<GenerationRequest> {
        let request = match mode {
            InputMode::StructuredVideo => {
                GenerationRequest::StructuredVideo(StructuredVideoRequest {
                    main_idea: self.main_idea.trim().to_string(),
                    setting: self.setting.trim().to_string(),
                    styles: self.video_styles.as_slice().to_vec(),
                    characters: self.scene_characters.clone(),
                })
            }
            InputMode::FreestyleVideo => GenerationRequest::FreestyleVideo(FreestyleVideoRequest {
                raw_text: self.freestyle_text.trim().to_string(),
            }),
            InputMode::ImageToVideo => {
                let source_image = self
                    .uploaded_image
                    .clone()
                    .ok_or_else(|| StudioError::validation("an image must be attached"))?;
                GenerationRequest::ImageToVideo(ImageToVideoRequest {
                    source_image,
                    supplemental_idea: self.main_idea.trim().to_string(),
                    dialogues: self
                        .image_dialogues
                        .iter()
                        .map(|line| line.trim())
                        .filter(|line| !line.is_empty())
                        .map(str::to_string)
                        .collect(),
                })
            }
            InputMode::TextToImage => GenerationRequest::TextToImage(TextToImageRequest {
                idea: self.main_idea.trim().to_string(),
                setting: self.setting.trim().to_string(),
                styles: self.image_styles.as_slice().to_vec(),
                aspect_ratio: self.aspect_ratio,
                characters: self.scene_characters.clone(),
            }),
        };

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lan() -> Character {
        Character::new(1, "Lan").with_description("cô giáo lớn tuổi")
    }

    fn mai() -> Character {
        Character::new(2, "Mai").with_description("cô giáo trẻ")
    }

    #[test]
    fn test_defaults_seed_styles() {
        let composer = SceneComposer::new();
        assert_eq!(composer.video_styles().as_slice(), &["Hoạt hình".to_string()]);
        assert_eq!(composer.image_styles().as_slice(), &["3D Hoạt hình".to_string()]);
        assert_eq!(composer.aspect_ratio(), AspectRatio::Wide);
        assert_eq!(composer.active_mode(), InputMode::StructuredVideo);
    }

    #[test]
    fn test_add_character_is_deduplicated_by_id() {
        let mut composer = SceneComposer::new();
        assert!(composer.add_character(&lan()));
        assert!(!composer.add_character(&lan()));
        assert!(composer.add_character(&mai()));
        assert_eq!(composer.scene_characters().len(), 2);
    }

    #[test]
    fn test_remove_character_is_idempotent() {
        let mut composer = SceneComposer::new();
        composer.add_character(&lan());
        composer.add_character(&mai());

        assert!(composer.remove_character(1));
        let once = composer.scene_characters().to_vec();
        assert!(!composer.remove_character(1));
        assert_eq!(composer.scene_characters(), &once[..]);
        assert!(!composer.remove_character(99));
    }

    #[test]
    fn test_dialogue_cleared_when_character_removed() {
        let mut composer = SceneComposer::new();
        composer.add_character(&lan());
        assert!(composer.set_dialogue(1, "Chào các em!"));

        composer.remove_character(1);
        composer.add_character(&lan());
        assert_eq!(composer.scene_characters()[0].dialogue, "");
        assert!(!composer.set_dialogue(42, "ghost"));
    }

    #[test]
    fn test_refresh_character_keeps_dialogue() {
        let mut composer = SceneComposer::new();
        composer.add_character(&lan());
        composer.set_dialogue(1, "Xin chào");

        composer.refresh_character(&Character::new(1, "Lan Anh"));
        let sc = &composer.scene_characters()[0];
        assert_eq!(sc.character.name, "Lan Anh");
        assert_eq!(sc.dialogue, "Xin chào");
    }

    #[test]
    fn test_available_characters_excludes_scene() {
        let library = vec![lan(), mai()];
        let mut composer = SceneComposer::new();
        composer.add_character(&library[0]);

        let available = composer.available_characters(&library);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, 2);
    }

    #[test]
    fn test_structured_video_requires_idea() {
        let mut composer = SceneComposer::new();
        assert!(!composer.can_generate());

        composer.set_main_idea("   ");
        assert!(composer.build_request().is_err());

        composer.set_main_idea(" hai giáo viên nói chuyện ");
        let GenerationRequest::StructuredVideo(request) = composer.build_request().unwrap() else {
            panic!("expected structured video request");
        };
        assert_eq!(request.main_idea, "hai giáo viên nói chuyện");
        assert_eq!(request.styles, vec!["Hoạt hình".to_string()]);
    }

    #[test]
    fn test_freestyle_requires_text() {
        let mut composer = SceneComposer::new();
        composer.switch_mode(InputMode::FreestyleVideo);
        composer.set_main_idea("ignored here");
        assert!(!composer.can_generate());

        composer.set_freestyle_text("A dragon over Hạ Long bay");
        assert_eq!(
            composer.build_request().unwrap().mode(),
            GenerationMode::FreestyleVideo
        );
    }

    #[test]
    fn test_image_to_video_requires_image_only() {
        let mut composer = SceneComposer::new();
        composer.switch_mode(InputMode::ImageToVideo);
        assert!(matches!(composer.build_request(), Err(StudioError::Validation(_))));

        composer.set_uploaded_image(Some(SourceImage::new("image/png", "iVBORw0KGgo=").unwrap()));
        let index = composer.add_image_dialogue();
        composer.set_image_dialogue(index, "  Đẹp quá!  ");
        composer.add_image_dialogue();

        let GenerationRequest::ImageToVideo(request) = composer.build_request().unwrap() else {
            panic!("expected image-to-video request");
        };
        assert_eq!(request.supplemental_idea, "");
        assert_eq!(request.dialogues, vec!["Đẹp quá!".to_string()]);
    }

    #[test]
    fn test_switching_away_from_image_tab_drops_image() {
        let mut composer = SceneComposer::new();
        composer.switch_mode(InputMode::ImageToVideo);
        composer.set_uploaded_image(Some(SourceImage::new("image/png", "iVBORw0KGgo=").unwrap()));
        composer.set_main_idea("kept");

        composer.switch_mode(InputMode::ImageToVideo);
        assert!(composer.uploaded_image().is_some());

        composer.switch_mode(InputMode::TextToImage);
        assert!(composer.uploaded_image().is_none());
        assert_eq!(composer.main_idea(), "kept");
    }

    #[test]
    fn test_text_to_image_request() {
        let mut composer = SceneComposer::new();
        composer.switch_mode(InputMode::TextToImage);
        composer.set_main_idea("cô gái ngồi bên cửa sổ");
        composer.set_aspect_ratio(AspectRatio::Landscape);
        composer.toggle_image_style("3D Hoạt hình");
        composer.toggle_image_style("Hiện thực");
        composer.add_character(&lan());

        let GenerationRequest::TextToImage(request) = composer.build_request().unwrap() else {
            panic!("expected text-to-image request");
        };
        assert_eq!(request.aspect_ratio, AspectRatio::Landscape);
        assert_eq!(request.styles, vec!["Hiện thực".to_string()]);
        assert_eq!(request.characters.len(), 1);
    }

    #[test]
    fn test_image_dialogue_bounds() {
        let mut composer = SceneComposer::new();
        assert!(!composer.set_image_dialogue(0, "x"));
        assert!(!composer.remove_image_dialogue(0));
        composer.add_image_dialogue();
        assert!(composer.remove_image_dialogue(0));
        assert!(composer.image_dialogues().is_empty());
    }
}
