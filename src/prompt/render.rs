//! Request rendering.
//!
//! Every request is serialized as a short header followed by labeled fields
//! (`- Label: "value"`). Empty fields are replaced by fallback phrases so the model never sees a
//! blank value.

use crate::character::SceneCharacter;
use crate::scene::{
    AspectRatio, FreestyleVideoRequest, GenerationMode, GenerationRequest, ImageToVideoRequest,
    SourceImage, StructuredVideoRequest, TextToImageRequest, IMAGE_STYLES,
};

use super::instructions::system_instruction;
use super::payload::{Contents, RenderedPrompt};

/// Used when the setting field is blank.
pub const SETTING_FALLBACK: &str = "An interesting and fitting location";
/// Used when no style is selected.
pub const STYLE_FALLBACK: &str = "cinematic, photorealistic, 8K";
/// Used when the scene has no characters.
pub const NO_CHARACTERS: &str = "Not specified";
/// Used when a character has no description.
pub const NO_DESCRIPTION: &str = "No description";
/// Used when an image-to-video request carries no dialogue.
pub const NO_DIALOGUE: &str = "None";
/// Used when an image-to-video request has no supplemental idea.
pub const IMAGE_IDEA_FALLBACK: &str =
    "Create an interesting story or action based on this image.";

const AR_MARKER: &str = "--ar";

/// A labeled payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptField {
    pub label: &'static str,
    pub value: String,
}

impl PromptField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

fn or_fallback(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// `Name (Description)`, plus ` says: "<dialogue>"` when requested and non-blank.
pub fn character_line(sc: &SceneCharacter, with_dialogue: bool) -> String {
    let mut line = format!(
        "{} ({})",
        sc.character.name,
        sc.character.description_or_placeholder()
    );
    if with_dialogue {
        if let Some(dialogue) = sc.spoken_line() {
            line.push_str(&format!(" says: \"{dialogue}\""));
        }
    }
    line
}

/// One character per line, with dialogue. Used by video prompts.
pub fn characters_with_dialogue(characters: &[SceneCharacter]) -> String {
    if characters.is_empty() {
        return NO_CHARACTERS.to_string();
    }
    characters
        .iter()
        .map(|sc| character_line(sc, true))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-separated characters without dialogue. Used by image prompts.
pub fn characters_inline(characters: &[SceneCharacter]) -> String {
    if characters.is_empty() {
        return NO_CHARACTERS.to_string();
    }
    characters
        .iter()
        .map(|sc| character_line(sc, false))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Video styles are forwarded as selected.
pub fn video_style_description(styles: &[String]) -> String {
    or_fallback(&styles.join(", "), STYLE_FALLBACK)
}

/// Image styles expand to their catalogue phrases; unknown tags pass through.
pub fn image_style_description(styles: &[String]) -> String {
    let expanded: Vec<&str> = styles
        .iter()
        .map(|style| {
            IMAGE_STYLES
                .iter()
                .find(|option| option.name == style.as_str())
                .map_or(style.as_str(), |option| option.description)
        })
        .collect();
    or_fallback(&expanded.join(", "), STYLE_FALLBACK)
}

fn format_fields(header: &str, fields: &[PromptField]) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for field in fields {
        out.push_str(&format!("- {}: \"{}\"\n", field.label, field.value));
    }
    out
}

// =============================================================================
// PER-VARIANT FIELDS
// =============================================================================

pub fn structured_video_fields(request: &StructuredVideoRequest) -> Vec<PromptField> {
    vec![
        PromptField::new("Main Idea", request.main_idea.trim()),
        PromptField::new("Setting", or_fallback(&request.setting, SETTING_FALLBACK)),
        PromptField::new("Visual Style", video_style_description(&request.styles)),
        PromptField::new(
            "Characters and Dialogue",
            characters_with_dialogue(&request.characters),
        ),
    ]
}

pub fn text_to_image_fields(request: &TextToImageRequest) -> Vec<PromptField> {
    vec![
        PromptField::new("Main Idea", request.idea.trim()),
        PromptField::new("Setting", or_fallback(&request.setting, SETTING_FALLBACK)),
        PromptField::new("Characters", characters_inline(&request.characters)),
        PromptField::new("Desired Visual Style", image_style_description(&request.styles)),
        PromptField::new("Aspect Ratio", format!("{AR_MARKER} {}", request.aspect_ratio)),
    ]
}

pub fn image_to_video_fields(request: &ImageToVideoRequest) -> Vec<PromptField> {
    let dialogue = request
        .dialogues
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        PromptField::new(
            "Additional Idea",
            or_fallback(&request.supplemental_idea, IMAGE_IDEA_FALLBACK),
        ),
        PromptField::new("Dialogue", or_fallback(&dialogue, NO_DIALOGUE)),
    ]
}

fn render_freestyle(request: &FreestyleVideoRequest) -> String {
    format!(
        "Please turn the following free-form scene description into a Veo prompt:\n---\n{}\n---\n",
        request.raw_text.trim()
    )
}

// =============================================================================
// RENDERING
// =============================================================================

/// Renders a request into its instruction and content. Deterministic for equal requests.
pub fn render_request(request: &GenerationRequest) -> RenderedPrompt {
    let contents = match request {
        GenerationRequest::StructuredVideo(r) => Contents::text(format_fields(
            "Please generate a Veo prompt based on the following details:",
            &structured_video_fields(r),
        )),
        GenerationRequest::FreestyleVideo(r) => Contents::text(render_freestyle(r)),
        GenerationRequest::ImageToVideo(r) => Contents::image_with_text(
            r.source_image.clone(),
            format_fields(
                "Please generate a Veo prompt for the attached image based on the following details:",
                &image_to_video_fields(r),
            ),
        ),
        GenerationRequest::TextToImage(r) => Contents::text(format_fields(
            "Please generate a rich, detailed, and single-paragraph English image prompt based on the following details:",
            &text_to_image_fields(r),
        )),
    };

    RenderedPrompt {
        mode: request.mode(),
        system_instruction: system_instruction(request.mode()),
        contents,
    }
}

/// Renders the character-description-from-image call.
pub fn render_character_analysis(image: &SourceImage) -> RenderedPrompt {
    RenderedPrompt {
        mode: GenerationMode::CharacterAnalysis,
        system_instruction: system_instruction(GenerationMode::CharacterAnalysis),
        contents: Contents::image_with_text(
            image.clone(),
            "Describe the main character in this image so it can be reused in later prompts.",
        ),
    }
}

// =============================================================================
// ASPECT RATIO REPAIR
// =============================================================================

/// Guarantees the text ends with a `--ar <ratio>` marker for `ratio`.
///
/// Markers carrying a `W:H` value (`--ar 16:9`, `--AR=4:3`) are removed wherever they appear.
/// A `--ar` followed by anything else is ordinary text and stays. The rest of the text,
/// including line breaks and runs of spaces, is kept as written. Trailing whitespace and commas
/// are trimmed, then the requested marker is appended.
pub fn ensure_aspect_ratio(text: &str, ratio: AspectRatio) -> String {
    let mut body = String::with_capacity(text.len());
    let mut kept_from = 0;
    for (start, end) in ratio_markers(text) {
        body.push_str(&text[kept_from..start]);
        kept_from = end;
    }
    body.push_str(&text[kept_from..]);

    let body = body.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    if body.is_empty() {
        format!("{AR_MARKER} {ratio}")
    } else {
        format!("{body} {AR_MARKER} {ratio}")
    }
}

/// Byte spans of every `--ar <W:H>` marker, each widened over the spaces before it.
fn ratio_markers(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let marker = AR_MARKER.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i + marker.len() <= bytes.len() {
        let at_token_start = i == 0 || bytes[i - 1].is_ascii_whitespace() || bytes[i - 1] == b',';
        if at_token_start && bytes[i..i + marker.len()].eq_ignore_ascii_case(marker) {
            if let Some(end) = ratio_value_end(bytes, i + marker.len()) {
                let mut start = i;
                while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
                    start -= 1;
                }
                spans.push((start, end));
                i = end;
                continue;
            }
        }
        i += 1;
    }
    spans
}

/// End of a `=W:H` or ` W:H` value starting at `from`, if one is there.
fn ratio_value_end(bytes: &[u8], from: usize) -> Option<usize> {
    let digits_end = |from: usize| {
        let end = from + bytes[from.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        (end > from).then_some(end)
    };

    let mut i = from;
    if bytes.get(i) == Some(&b'=') {
        i += 1;
    } else {
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        if i == from {
            return None;
        }
    }

    let i = digits_end(i)?;
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    let i = digits_end(i + 1)?;
    if bytes.get(i).is_some_and(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(i)
}
