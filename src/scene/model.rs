//! Data models for scene composition.
//!
//! A `GenerationRequest` is the normalized, mode-specific bundle of inputs for one generation
//! attempt. Each variant validates itself; the prompt engine renders it by tag.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::character::SceneCharacter;
use crate::error::{StudioError, StudioResult};

// =============================================================================
// MODES
// =============================================================================

/// Input tab of the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    /// Video prompt from idea, setting, styles and characters.
    #[default]
    StructuredVideo,
    /// Video prompt from one free-form text.
    FreestyleVideo,
    /// Video prompt from an uploaded image.
    ImageToVideo,
    /// Image from idea, styles, aspect ratio and characters.
    TextToImage,
}

impl InputMode {
    pub const ALL: [InputMode; 4] = [
        InputMode::StructuredVideo,
        InputMode::FreestyleVideo,
        InputMode::ImageToVideo,
        InputMode::TextToImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredVideo => "structuredVideo",
            Self::FreestyleVideo => "freestyleVideo",
            Self::ImageToVideo => "imageToVideo",
            Self::TextToImage => "textToImage",
        }
    }
}

impl FromStr for InputMode {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| StudioError::validation(format!("unknown input mode '{s}'")))
    }
}

/// Kind of remote call the orchestrator is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationMode {
    StructuredVideo,
    FreestyleVideo,
    ImageToVideo,
    TextToImage,
    CharacterAnalysis,
}

impl GenerationMode {
    /// Whether the call ends with image synthesis.
    pub fn produces_images(&self) -> bool {
        matches!(self, Self::TextToImage)
    }
}

impl From<InputMode> for GenerationMode {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::StructuredVideo => Self::StructuredVideo,
            InputMode::FreestyleVideo => Self::FreestyleVideo,
            InputMode::ImageToVideo => Self::ImageToVideo,
            InputMode::TextToImage => Self::TextToImage,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StructuredVideo => "structured_video",
            Self::FreestyleVideo => "freestyle_video",
            Self::ImageToVideo => "image_to_video",
            Self::TextToImage => "text_to_image",
            Self::CharacterAnalysis => "character_analysis",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ASPECT RATIO
// =============================================================================

/// Aspect ratios accepted by the image model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Tall,
    #[default]
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Landscape => "4:3",
            Self::Tall => "9:16",
            Self::Wide => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| StudioError::validation(format!("unsupported aspect ratio '{s}'")))
    }
}

// =============================================================================
// SOURCE IMAGE
// =============================================================================

/// Uploaded image forwarded untouched to the remote model.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceImage {
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix.
    pub data: String,
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl SourceImage {
    /// Validates and wraps an image payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> StudioResult<Self> {
        let mime_type = mime_type.into();
        let data = data.into();

        if !mime_type.starts_with("image/") {
            return Err(StudioError::invalid_image(format!(
                "unsupported MIME type '{mime_type}'"
            )));
        }
        if data.is_empty() {
            return Err(StudioError::invalid_image("image data is empty"));
        }
        base64::engine::general_purpose::STANDARD
            .decode(&data)
            .map_err(|e| StudioError::invalid_image(format!("image data is not base64: {e}")))?;

        Ok(Self { mime_type, data })
    }

    /// Parses a `data:<mime>;base64,<payload>` URL as produced by a browser file reader.
    pub fn from_data_url(url: &str) -> StudioResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| StudioError::invalid_image("not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::invalid_image("data URL has no payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| StudioError::invalid_image("data URL is not base64 encoded"))?;
        Self::new(mime_type, payload)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

// =============================================================================
// STYLES
// =============================================================================

/// A selectable style tag with its help text.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StyleOption {
    pub name: &'static str,
    pub description: &'static str,
}

/// Video style catalogue.
pub const VIDEO_STYLES: &[StyleOption] = &[
    StyleOption {
        name: "Hiện thực",
        description: "Tái tạo thế giới thực một cách chân thực, như máy ảnh.",
    },
    StyleOption {
        name: "Điện ảnh",
        description: "Tạo cảm giác như một bộ phim với ánh sáng, góc quay và màu sắc chuyên nghiệp.",
    },
    StyleOption {
        name: "Hoạt hình",
        description: "Hoạt hình 3D hiện đại, mặc định theo phong cách Pixar. Rõ ràng và thân thiện.",
    },
];

/// Image style catalogue.
pub const IMAGE_STYLES: &[StyleOption] = &[
    StyleOption {
        name: "3D Hoạt hình",
        description: "3D animation, Pixar style, charming, detailed, high resolution",
    },
    StyleOption {
        name: "Hiện thực",
        description: "photorealistic, cinematic, 8K, high detail, professional photography",
    },
];

/// Style selected by default for video requests.
pub const DEFAULT_VIDEO_STYLE: &str = "Hoạt hình";
/// Style selected by default for image requests.
pub const DEFAULT_IMAGE_STYLE: &str = "3D Hoạt hình";

/// Ordered toggle set of style tags.
///
/// Toggling a selected style removes it; toggling a new one appends it. Selection order is
/// kept so rendering stays deterministic. Re-selecting the style that was just removed puts it
/// back in its old slot, so two toggles of the same style always restore the set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StyleSet {
    styles: Vec<String>,
    /// Most recently removed style and its index.
    last_removed: Option<(String, usize)>,
}

impl PartialEq for StyleSet {
    fn eq(&self, other: &Self) -> bool {
        self.styles == other.styles
    }
}

impl Eq for StyleSet {}

impl From<Vec<String>> for StyleSet {
    fn from(styles: Vec<String>) -> Self {
        Self::with_styles(styles)
    }
}

impl From<StyleSet> for Vec<String> {
    fn from(set: StyleSet) -> Self {
        set.styles
    }
}

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the set with `styles`, skipping blanks and repeats.
    pub fn with_styles<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for style in styles {
            let style = style.as_ref().trim();
            if !style.is_empty() && !set.contains(style) {
                set.styles.push(style.to_string());
            }
        }
        set
    }

    /// Toggles a style. Returns true when the style is selected afterwards.
    pub fn toggle(&mut self, style: &str) -> bool {
        let style = style.trim();
        if style.is_empty() {
            return false;
        }

        let last_removed = self.last_removed.take();
        if let Some(index) = self.styles.iter().position(|s| s == style) {
            self.styles.remove(index);
            self.last_removed = Some((style.to_string(), index));
            return false;
        }

        match last_removed {
            Some((removed, index)) if removed == style => {
                let index = index.min(self.styles.len());
                self.styles.insert(index, style.to_string());
            }
            _ => self.styles.push(style.to_string()),
        }
        true
    }

    pub fn contains(&self, style: &str) -> bool {
        self.styles.iter().any(|s| s == style)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.styles
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }
}

// =============================================================================
// GENERATION REQUESTS
// =============================================================================

/// Video prompt from structured fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuredVideoRequest {
    pub main_idea: String,
    pub setting: String,
    pub styles: Vec<String>,
    pub characters: Vec<SceneCharacter>,
}

/// Video prompt from free-form text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FreestyleVideoRequest {
    pub raw_text: String,
}

/// Video prompt from an image plus optional idea and dialogue lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageToVideoRequest {
    pub source_image: SourceImage,
    #[serde(default)]
    pub supplemental_idea: String,
    #[serde(default)]
    pub dialogues: Vec<String>,
}

/// Image from structured fields. Character dialogue is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextToImageRequest {
    pub idea: String,
    pub setting: String,
    pub styles: Vec<String>,
    pub aspect_ratio: AspectRatio,
    pub characters: Vec<SceneCharacter>,
}

/// One generation attempt, tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GenerationRequest {
    StructuredVideo(StructuredVideoRequest),
    FreestyleVideo(FreestyleVideoRequest),
    ImageToVideo(ImageToVideoRequest),
    TextToImage(TextToImageRequest),
}

impl GenerationRequest {
    pub fn mode(&self) -> GenerationMode {
        match self {
            Self::StructuredVideo(_) => GenerationMode::StructuredVideo,
            Self::FreestyleVideo(_) => GenerationMode::FreestyleVideo,
            Self::ImageToVideo(_) => GenerationMode::ImageToVideo,
            Self::TextToImage(_) => GenerationMode::TextToImage,
        }
    }

    /// Checks the required field of the variant.
    pub fn validate(&self) -> StudioResult<()> {
        match self {
            Self::StructuredVideo(r) if r.main_idea.trim().is_empty() => {
                Err(StudioError::validation("main idea must not be blank"))
            }
            Self::FreestyleVideo(r) if r.raw_text.trim().is_empty() => {
                Err(StudioError::validation("freestyle text must not be blank"))
            }
            Self::TextToImage(r) if r.idea.trim().is_empty() => {
                Err(StudioError::validation("image idea must not be blank"))
            }
            _ => Ok(()),
        }
    }
}
