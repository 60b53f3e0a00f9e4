//! Content sent to the remote model alongside a system instruction.

use serde::Serialize;

use crate::scene::{GenerationMode, SourceImage};

/// One piece of user content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    /// Image forwarded byte-for-byte as inline base64 data.
    InlineImage(SourceImage),
}

/// Ordered user content for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contents {
    pub parts: Vec<Part>,
}

impl Contents {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Image first, then the text instruction.
    pub fn image_with_text(image: SourceImage, text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::InlineImage(image), Part::Text(text.into())],
        }
    }

    /// Concatenation of all text parts.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::InlineImage(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::InlineImage(_)))
    }
}

/// A fully rendered call: instruction plus content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPrompt {
    pub mode: GenerationMode,
    pub system_instruction: &'static str,
    pub contents: Contents,
}
