//! World manifest loading.
//!
//! A manifest is the TOML description of a fresh session: the character
//! roster and the initial values of named global fields. Example:
//!
//! ```toml
//! [[character]]
//! name = "Julia"
//! mask = 1
//! room = 3
//!
//! [globals]
//! current_room = 3
//! party_mask = 1
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::globals::GlobalField;
use crate::party::{Character, PartyMask};
use crate::world::{RoomId, WorldState};

/// Errors raised while loading a world manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse world manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("manifest references unknown global field `{0}`")]
    UnknownField(String),
}

/// One roster entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterEntry {
    pub name: String,
    /// Party identity bits, in the 4-bit selector encoding.
    pub mask: u8,
    /// Starting room.
    pub room: u16,
}

/// The parsed world manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldManifest {
    #[serde(default, rename = "character")]
    pub characters: Vec<CharacterEntry>,

    /// Initial global field values, keyed by registered field name.
    #[serde(default)]
    pub globals: HashMap<String, u16>,
}

impl WorldManifest {
    /// Parse a manifest from TOML text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(text)?)
    }

    /// Build the initial world state this manifest describes.
    pub fn build_world(&self) -> Result<WorldState, ManifestError> {
        let mut world = WorldState::new();

        for entry in &self.characters {
            world.roster.add(Character::new(
                entry.name.clone(),
                PartyMask(entry.mask),
                RoomId(entry.room),
            ));
        }

        for (name, value) in &self.globals {
            let field = GlobalField::from_name(name)
                .ok_or_else(|| ManifestError::UnknownField(name.clone()))?;
            world.globals.set(field, *value);
        }

        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globals::GlobalField;

    const MANIFEST: &str = r#"
        [[character]]
        name = "Julia"
        mask = 1
        room = 3

        [[character]]
        name = "Tom"
        mask = 2
        room = 5

        [globals]
        current_room = 3
        party_mask = 1
        story_phase = 2
    "#;

    #[test]
    fn test_parse_manifest() {
        let manifest = WorldManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.characters.len(), 2);
        assert_eq!(manifest.characters[0].name, "Julia");
        assert_eq!(manifest.globals.get("story_phase"), Some(&2));
    }

    #[test]
    fn test_initial_globals_applied() {
        let world = WorldManifest::parse(MANIFEST).unwrap().build_world().unwrap();

        assert_eq!(world.current_room(), RoomId(3));
        assert_eq!(world.globals.get(GlobalField::StoryPhase), 2);
        assert_eq!(world.roster.len(), 2);

        let (_, julia) = world.roster.iter().next().unwrap();
        assert_eq!(julia.room, RoomId(3));
        assert_eq!(julia.identity, PartyMask(1));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let manifest = WorldManifest::parse(
            r#"
            [globals]
            reputation = 5
            "#,
        )
        .unwrap();

        let err = manifest.build_world().unwrap_err();
        assert!(matches!(err, ManifestError::UnknownField(name) if name == "reputation"));
    }
}
