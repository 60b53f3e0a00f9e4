//! CharacterRegistry implementation.
//!
//! Holds the character library in insertion order. Persistence is the caller's concern:
//! the studio saves `list()` after every successful mutation.

use crate::error::{StudioError, StudioResult};

use super::model::Character;

/// Insertion-ordered library of reusable characters, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
    /// Highest id handed out or loaded, so ids stay unique within one millisecond.
    last_id: i64,
}

impl CharacterRegistry {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from previously persisted characters.
    ///
    /// Later duplicates of an id are dropped; the first occurrence wins.
    pub fn from_characters(characters: Vec<Character>) -> Self {
        let mut registry = Self::new();
        for character in characters {
            if registry.get(character.id).is_none() {
                registry.last_id = registry.last_id.max(character.id);
                registry.characters.push(character);
            }
        }
        registry
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Adds a character. Fails without touching the registry when the name is blank.
    pub fn add(&mut self, name: &str, description: &str) -> StudioResult<Character> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::validation("character name must not be blank"));
        }

        let id = self.next_id();
        let character = Character::new(id, name).with_description(description);
        self.characters.push(character.clone());
        tracing::debug!(id, "Character added");
        Ok(character)
    }

    /// Replaces name and description of an existing character.
    ///
    /// Returns `Ok(None)` when the id is unknown; fails when the new name is blank.
    pub fn update(
        &mut self,
        id: i64,
        name: &str,
        description: &str,
    ) -> StudioResult<Option<Character>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::validation("character name must not be blank"));
        }

        let Some(character) = self.characters.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        character.name = name.to_string();
        character.description = description.to_string();
        tracing::debug!(id, "Character updated");
        Ok(Some(character.clone()))
    }

    /// Removes a character by id. Returns the removed character, if any.
    pub fn remove(&mut self, id: i64) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == id)?;
        tracing::debug!(id, "Character removed");
        Some(self.characters.remove(index))
    }

    /// Gets a character by ID.
    pub fn get(&self, id: i64) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// All characters in insertion order.
    pub fn list(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    fn next_id(&mut self) -> i64 {
        let id = now_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

/// Milliseconds since the Unix epoch.
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
