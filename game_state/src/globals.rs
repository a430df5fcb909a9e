//! The global state block and its typed field registry.
//!
//! Every session-wide value (story phase, current room, party masks, ...)
//! lives in one flat block of bytes. The block has two views that address
//! the same storage:
//!
//! - a **typed view** ([`GlobalField`]) used by the rest of the game, and
//! - a **raw view** (`read_u8` / `read_u16` by offset) used by data-driven
//!   condition scripts.
//!
//! The typed accessors are defined in terms of the raw ones, so the two
//! views cannot drift apart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the global state block in bytes.
pub const GLOBAL_BLOCK_LEN: usize = 256;

/// Errors raised by the state block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("state offset {offset:#x} out of bounds (block is {len} bytes)")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("state block is {found} bytes, expected {expected}")]
    BlockSizeMismatch { expected: usize, found: usize },
}

/// Width of a field in the state block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldWidth {
    Byte,
    Word,
}

/// Describes where a field lives in the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub offset: usize,
    pub width: FieldWidth,
    /// Stable name used by world manifests and diagnostics.
    pub name: &'static str,
}

/// The typed field registry over the global state block.
///
/// Word fields are stored little-endian. Offsets are part of the save
/// format: reorder variants freely, but never reuse or move an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalField {
    StoryPhase,
    CitadelCounter,
    CurrentRoom,
    GameClock,
    ActiveSpeaker,
    CurrentObject,
    AnswerFlag,
    AutoDialogue,
    PartyMask,
    OutsidePartyMask,
    DialogueAborted,
}

impl GlobalField {
    /// Every registered field, for iteration and name lookup.
    pub const ALL: [GlobalField; 11] = [
        GlobalField::StoryPhase,
        GlobalField::CitadelCounter,
        GlobalField::CurrentRoom,
        GlobalField::GameClock,
        GlobalField::ActiveSpeaker,
        GlobalField::CurrentObject,
        GlobalField::AnswerFlag,
        GlobalField::AutoDialogue,
        GlobalField::PartyMask,
        GlobalField::OutsidePartyMask,
        GlobalField::DialogueAborted,
    ];

    /// Get the block layout of this field.
    pub fn descriptor(&self) -> FieldDescriptor {
        use FieldWidth::{Byte, Word};
        let (offset, width, name) = match self {
            GlobalField::StoryPhase => (0x00, Word, "story_phase"),
            GlobalField::CitadelCounter => (0x02, Word, "citadel_counter"),
            GlobalField::CurrentRoom => (0x04, Word, "current_room"),
            GlobalField::GameClock => (0x06, Word, "game_clock"),
            GlobalField::ActiveSpeaker => (0x08, Word, "active_speaker"),
            GlobalField::CurrentObject => (0x0A, Word, "current_object"),
            GlobalField::AnswerFlag => (0x0C, Byte, "answer_flag"),
            GlobalField::AutoDialogue => (0x0D, Byte, "auto_dialogue"),
            GlobalField::PartyMask => (0x0E, Byte, "party_mask"),
            GlobalField::OutsidePartyMask => (0x0F, Byte, "outside_party_mask"),
            GlobalField::DialogueAborted => (0x10, Byte, "dialogue_aborted"),
        };
        FieldDescriptor {
            offset,
            width,
            name,
        }
    }

    /// Look a field up by its manifest name.
    pub fn from_name(name: &str) -> Option<GlobalField> {
        GlobalField::ALL
            .into_iter()
            .find(|field| field.descriptor().name == name)
    }
}

/// The flat global state block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    block: Vec<u8>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            block: vec![0; GLOBAL_BLOCK_LEN],
        }
    }
}

impl GlobalState {
    /// Create a zeroed state block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing block, validating its length.
    pub fn from_block(block: Vec<u8>) -> Result<Self, StateError> {
        if block.len() != GLOBAL_BLOCK_LEN {
            return Err(StateError::BlockSizeMismatch {
                expected: GLOBAL_BLOCK_LEN,
                found: block.len(),
            });
        }
        Ok(Self { block })
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Read one byte at a raw offset.
    pub fn read_u8(&self, offset: usize) -> Result<u8, StateError> {
        self.block
            .get(offset)
            .copied()
            .ok_or(StateError::OffsetOutOfBounds {
                offset,
                len: self.block.len(),
            })
    }

    /// Read a little-endian word at a raw offset.
    pub fn read_u16(&self, offset: usize) -> Result<u16, StateError> {
        let lo = self.read_u8(offset)?;
        let hi = self.read_u8(offset + 1)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Write one byte at a raw offset.
    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), StateError> {
        let len = self.block.len();
        let slot = self
            .block
            .get_mut(offset)
            .ok_or(StateError::OffsetOutOfBounds { offset, len })?;
        *slot = value;
        Ok(())
    }

    /// Write a little-endian word at a raw offset.
    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<(), StateError> {
        let [lo, hi] = value.to_le_bytes();
        self.write_u8(offset, lo)?;
        self.write_u8(offset + 1, hi)
    }

    /// Read a registered field. Byte fields widen to `u16`.
    pub fn get(&self, field: GlobalField) -> u16 {
        let desc = field.descriptor();
        // Registry offsets are all inside the fixed block.
        match desc.width {
            FieldWidth::Byte => self
                .read_u8(desc.offset)
                .map(u16::from)
                .unwrap_or_default(),
            FieldWidth::Word => self.read_u16(desc.offset).unwrap_or_default(),
        }
    }

    /// Write a registered field. Byte fields truncate to the low byte.
    pub fn set(&mut self, field: GlobalField, value: u16) {
        let desc = field.descriptor();
        let _ = match desc.width {
            FieldWidth::Byte => self.write_u8(desc.offset, value as u8),
            FieldWidth::Word => self.write_u16(desc.offset, value),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_and_raw_views_agree() {
        let mut state = GlobalState::new();

        state.set(GlobalField::StoryPhase, 0x1234);
        let desc = GlobalField::StoryPhase.descriptor();

        assert_eq!(state.read_u8(desc.offset).unwrap(), 0x34);
        assert_eq!(state.read_u8(desc.offset + 1).unwrap(), 0x12);
        assert_eq!(state.read_u16(desc.offset).unwrap(), 0x1234);
        assert_eq!(state.get(GlobalField::StoryPhase), 0x1234);
    }

    #[test]
    fn test_byte_field_truncates() {
        let mut state = GlobalState::new();

        state.set(GlobalField::AnswerFlag, 0x01FF);
        assert_eq!(state.get(GlobalField::AnswerFlag), 0xFF);

        // The neighbouring byte field is untouched.
        assert_eq!(state.get(GlobalField::AutoDialogue), 0);
    }

    #[test]
    fn test_out_of_bounds_read() {
        let state = GlobalState::new();

        let err = state.read_u8(GLOBAL_BLOCK_LEN).unwrap_err();
        assert!(matches!(err, StateError::OffsetOutOfBounds { .. }));

        // A word read straddling the end is also rejected.
        let err = state.read_u16(GLOBAL_BLOCK_LEN - 1).unwrap_err();
        assert!(matches!(err, StateError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn test_field_lookup_by_name() {
        assert_eq!(
            GlobalField::from_name("citadel_counter"),
            Some(GlobalField::CitadelCounter)
        );
        assert_eq!(GlobalField::from_name("no_such_field"), None);
    }

    #[test]
    fn test_field_offsets_do_not_overlap() {
        let mut occupied = vec![false; GLOBAL_BLOCK_LEN];
        for field in GlobalField::ALL {
            let desc = field.descriptor();
            let bytes = match desc.width {
                FieldWidth::Byte => 1,
                FieldWidth::Word => 2,
            };
            for offset in desc.offset..desc.offset + bytes {
                assert!(!occupied[offset], "field {} overlaps", desc.name);
                occupied[offset] = true;
            }
        }
    }

    #[test]
    fn test_block_size_validated() {
        let err = GlobalState::from_block(vec![0; 8]).unwrap_err();
        assert!(matches!(err, StateError::BlockSizeMismatch { .. }));

        let ok = GlobalState::from_block(vec![0; GLOBAL_BLOCK_LEN]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = GlobalState::new();
        state.set(GlobalField::CurrentRoom, 7);
        state.set(GlobalField::PartyMask, 0b0101);

        let json = serde_json::to_string(&state).unwrap();
        let restored: GlobalState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
        assert_eq!(restored.get(GlobalField::CurrentRoom), 7);
    }
}
