//! Lookup of persistent characters that participants can be linked to.

use std::collections::HashMap;

use crate::id::CharacterId;

/// Supplies character names when a participant is created from a character.
///
/// Only read at creation time; the engine never goes back to it.
pub trait CharacterProvider: Send + Sync {
    /// The character's name, if it exists.
    fn character_name(&self, id: CharacterId) -> Option<String>;
}

/// A fixed set of characters.
#[derive(Debug, Clone, Default)]
pub struct StaticCharacters {
    names: HashMap<CharacterId, String>,
}

impl StaticCharacters {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a character and return its id.
    pub fn add(&mut self, name: impl Into<String>) -> CharacterId {
        let id = CharacterId::new();
        self.names.insert(id, name.into());
        id
    }
}

impl CharacterProvider for StaticCharacters {
    fn character_name(&self, id: CharacterId) -> Option<String> {
        self.names.get(&id).cloned()
    }
}
