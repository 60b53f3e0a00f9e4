//! Data models for the character library.
//!
//! The JSON shape matches what the browser form has always stored under the characters slot:
//! `[{"id": 1718000000000, "name": "...", "description": "..."}]`.

use serde::{Deserialize, Serialize};

// =============================================================================
// CHARACTER
// =============================================================================

/// Reusable character profile.
///
/// Identity is `id` (creation timestamp in milliseconds). Names are the user-facing key
/// but are not required to be unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl Character {
    /// Creates a new Character with the given ID and name.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Builder: Set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Description for prompt rendering, `"No description"` when blank.
    pub fn description_or_placeholder(&self) -> &str {
        let description = self.description.trim();
        if description.is_empty() {
            "No description"
        } else {
            description
        }
    }
}

// =============================================================================
// SCENE CHARACTER
// =============================================================================

/// A character placed in the scene being composed, with a per-scene dialogue line.
///
/// The dialogue lives only as long as the character stays in the scene; the library
/// character is never modified through it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SceneCharacter {
    pub character: Character,
    pub dialogue: String,
}

impl SceneCharacter {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            dialogue: String::new(),
        }
    }

    /// Builder: Set dialogue.
    pub fn with_dialogue(mut self, dialogue: impl Into<String>) -> Self {
        self.dialogue = dialogue.into();
        self
    }

    pub fn id(&self) -> i64 {
        self.character.id
    }

    /// Trimmed dialogue, `None` when blank.
    pub fn spoken_line(&self) -> Option<&str> {
        let line = self.dialogue.trim();
        (!line.is_empty()).then_some(line)
    }
}

// =============================================================================
// DESCRIPTION SUGGESTIONS
// =============================================================================

/// A group of ready-made description phrases offered by the character editor.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SuggestionGroup {
    pub category: &'static str,
    pub items: &'static [&'static str],
}

/// Suggestion catalogue: appearance, clothing, personality, action.
pub const DESCRIPTION_SUGGESTIONS: &[SuggestionGroup] = &[
    SuggestionGroup {
        category: "Ngoại hình",
        items: &[
            "tóc đen dài",
            "mắt bồ câu",
            "nước da trắng hồng",
            "dáng người thon thả",
            "khuôn mặt trái xoan",
            "nụ cười tỏa nắng",
            "vẻ mặt phúc hậu",
        ],
    },
    SuggestionGroup {
        category: "Trang phục",
        items: &[
            "mặc áo dài truyền thống",
            "khoác áo bà ba",
            "đội nón lá",
            "mặc đồng phục học sinh",
            "trang phục công sở thanh lịch",
            "mặc áo sơ mi trắng",
        ],
    },
    SuggestionGroup {
        category: "Tính cách",
        items: &[
            "trầm tư, ít nói",
            "vui vẻ, hòa đồng",
            "dịu dàng, nhân hậu",
            "nghiêm nghị, quyết đoán",
            "thông minh, nhanh nhẹn",
            "chân thành, giản dị",
        ],
    },
    SuggestionGroup {
        category: "Hành động",
        items: &[
            "đang ngồi uống trà",
            "nhìn ra cửa sổ",
            "đi dạo trong vườn",
            "cười nói vui vẻ",
            "làm việc trên máy tính",
            "đọc một cuốn sách",
        ],
    },
];

/// Appends a suggestion phrase, separated by one space unless the text already ends with one.
pub fn append_suggestion(description: &str, suggestion: &str) -> String {
    let separator = if !description.is_empty() && !description.ends_with(' ') {
        " "
    } else {
        ""
    };
    format!("{description}{separator}{suggestion}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_description() {
        assert_eq!(Character::new(1, "Lan").description_or_placeholder(), "No description");
        assert_eq!(
            Character::new(1, "Lan")
                .with_description("  tóc đen dài ")
                .description_or_placeholder(),
            "tóc đen dài"
        );
    }

    #[test]
    fn test_spoken_line() {
        let sc = SceneCharacter::new(Character::new(1, "Lan"));
        assert_eq!(sc.spoken_line(), None);
        assert_eq!(sc.clone().with_dialogue("   ").spoken_line(), None);
        assert_eq!(sc.with_dialogue(" Chào em! ").spoken_line(), Some("Chào em!"));
    }

    #[test]
    fn test_append_suggestion() {
        assert_eq!(append_suggestion("", "đội nón lá"), "đội nón lá");
        assert_eq!(append_suggestion("tóc đen dài", "đội nón lá"), "tóc đen dài đội nón lá");
        assert_eq!(append_suggestion("tóc đen dài ", "đội nón lá"), "tóc đen dài đội nón lá");
    }

    #[test]
    fn test_character_json_shape() {
        let json = r#"[{"id": 1718000000000, "name": "Lan", "description": "cô giáo"}]"#;
        let parsed: Vec<Character> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0], Character::new(1718000000000, "Lan").with_description("cô giáo"));

        let missing_description: Character = serde_json::from_str(r#"{"id": 2, "name": "Minh"}"#).unwrap();
        assert!(missing_description.description.is_empty());
    }

    #[test]
    fn test_suggestion_catalogue() {
        assert_eq!(DESCRIPTION_SUGGESTIONS.len(), 4);
        assert!(DESCRIPTION_SUGGESTIONS.iter().all(|g| !g.items.is_empty()));
    }
}
