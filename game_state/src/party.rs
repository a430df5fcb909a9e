//! The character roster and party membership masks.

use serde::{Deserialize, Serialize};

use crate::world::RoomId;

/// Index of a character in the [`Roster`] arena.
///
/// Characters are never removed, so an id stays valid for the whole
/// session and can be written to save files as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u16);

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bitmask identifying party members.
///
/// Each playable companion owns one bit; dialogue records carry a 4-bit
/// selector in the same encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PartyMask(pub u8);

impl PartyMask {
    /// The empty mask.
    pub const NONE: PartyMask = PartyMask(0);

    /// Check whether this mask shares any bit with `other`.
    pub fn intersects(&self, other: PartyMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Union of two masks.
    pub fn union(&self, other: PartyMask) -> PartyMask {
        PartyMask(self.0 | other.0)
    }

    /// Remove `other`'s bits from this mask.
    pub fn without(&self, other: PartyMask) -> PartyMask {
        PartyMask(self.0 & !other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// A character known to the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    /// Which party bit(s) this character answers to.
    pub identity: PartyMask,
    /// Where the character currently stands.
    pub room: RoomId,
    /// Whether the player has been introduced to this character.
    pub met: bool,
    /// How many scenes this character has appeared in.
    pub times_seen: u16,
}

impl Character {
    /// Create a character at the given room.
    pub fn new(name: impl Into<String>, identity: PartyMask, room: RoomId) -> Self {
        Self {
            name: name.into(),
            identity,
            room,
            met: false,
            times_seen: 0,
        }
    }
}

/// Arena of all characters in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character, returning its stable id.
    pub fn add(&mut self, character: Character) -> CharacterId {
        let id = CharacterId(self.characters.len() as u16);
        self.characters.push(character);
        id
    }

    /// Get a character by id.
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id.0 as usize)
    }

    /// Get a mutable character by id.
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id.0 as usize)
    }

    /// Iterate over `(id, character)` pairs in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.characters
            .iter()
            .enumerate()
            .map(|(index, character)| (CharacterId(index as u16), character))
    }

    /// Number of characters in the roster.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// First-meeting bookkeeping: mark the character as met and bump the
    /// seen counter. Safe to call on every encounter.
    pub fn record_meeting(&mut self, id: CharacterId) {
        if let Some(character) = self.get_mut(id) {
            character.met = true;
            character.times_seen = character.times_seen.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_intersection() {
        let julia = PartyMask(0b0001);
        let tom = PartyMask(0b0010);
        let both = julia.union(tom);

        assert!(both.intersects(julia));
        assert!(both.intersects(tom));
        assert!(!julia.intersects(tom));
        assert!(PartyMask::NONE.is_empty());
        assert_eq!(both.without(julia), tom);
    }

    #[test]
    fn test_roster_arena_ids() {
        let mut roster = Roster::new();

        let first = roster.add(Character::new("Julia", PartyMask(0b0001), RoomId(3)));
        let second = roster.add(Character::new("Tom", PartyMask(0b0010), RoomId(3)));

        assert_eq!(first, CharacterId(0));
        assert_eq!(second, CharacterId(1));
        assert_eq!(roster.get(first).unwrap().name, "Julia");
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_record_meeting() {
        let mut roster = Roster::new();
        let id = roster.add(Character::new("Hector", PartyMask(0b0100), RoomId(1)));

        assert!(!roster.get(id).unwrap().met);

        roster.record_meeting(id);
        roster.record_meeting(id);

        let hector = roster.get(id).unwrap();
        assert!(hector.met);
        assert_eq!(hector.times_seen, 2);
    }
}
