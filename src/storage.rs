//! Local persistence for the two session slots: the credential and the character library.
//!
//! The backing store is a plain string key-value store (browser `localStorage` in WASM builds,
//! `MemoryStore` natively). Loads happen once at session start; saves happen on every mutation.

use std::collections::HashMap;

use crate::character::Character;
use crate::config::StudioConfig;
use crate::error::StudioResult;

/// Port for a string key-value store.
pub trait KeyValueStore {
    /// Reads a value; `None` when absent.
    fn load(&self, key: &str) -> StudioResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn save(&mut self, key: &str, value: &str) -> StudioResult<()>;

    /// Deletes a value. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> StudioResult<()>;
}

/// In-memory store for native hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Seed an entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> StudioResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> StudioResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StudioResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Typed access to the credential and character slots of a `KeyValueStore`.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
    credential_key: String,
    characters_key: String,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S, config: &StudioConfig) -> Self {
        Self {
            store,
            credential_key: config.credential_key.clone(),
            characters_key: config.characters_key.clone(),
        }
    }

    /// Loads the stored credential. Blank or unreadable values count as absent.
    pub fn load_credential(&self) -> Option<String> {
        match self.store.load(&self.credential_key) {
            Ok(Some(value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load credential, treating as absent");
                None
            }
        }
    }

    pub fn save_credential(&mut self, credential: &str) -> StudioResult<()> {
        self.store.save(&self.credential_key, credential)
    }

    pub fn clear_credential(&mut self) -> StudioResult<()> {
        self.store.remove(&self.credential_key)
    }

    /// Loads the character library. Corrupt or unreadable data falls back to an empty library.
    pub fn load_characters(&self) -> Vec<Character> {
        let raw = match self.store.load(&self.characters_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load characters, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Character>>(&raw) {
            Ok(characters) => characters,
            Err(e) => {
                tracing::warn!(error = %e, "Stored characters are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Serializes the library as a JSON array and stores it.
    pub fn save_characters(&mut self, characters: &[Character]) -> StudioResult<()> {
        let json = serde_json::to_string(characters)?;
        self.store.save(&self.characters_key, &json)
    }

    /// Borrows the underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }
}
