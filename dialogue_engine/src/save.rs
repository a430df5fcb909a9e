//! Save games.
//!
//! A save bundles the world state verbatim with a snapshot of the
//! per-record one-shot trackers. Everything cross-referenced is already an
//! integer index, so nothing needs relocation on the way in or out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::records::RecordTable;
use game_state::{StateError, WorldState, GLOBAL_BLOCK_LEN};

/// One complete save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    /// Identity of this save, for slot management and diagnostics.
    pub id: Uuid,
    pub world: WorldState,
    /// Snapshot from [`RecordTable::export_seen_bits`].
    pub seen_bits: Vec<u8>,
}

impl SaveGame {
    /// Snapshot the current session.
    pub fn capture(world: &WorldState, records: &RecordTable) -> Self {
        Self {
            id: Uuid::new_v4(),
            world: world.clone(),
            seen_bits: records.export_seen_bits(),
        }
    }

    /// Restore the session this save describes. The record table must be
    /// loaded from the same game data the save was taken over.
    pub fn apply(
        &self,
        world: &mut WorldState,
        records: &mut RecordTable,
    ) -> Result<(), EngineError> {
        if self.world.globals.len() != GLOBAL_BLOCK_LEN {
            return Err(StateError::BlockSizeMismatch {
                expected: GLOBAL_BLOCK_LEN,
                found: self.world.globals.len(),
            }
            .into());
        }
        records.restore_seen_bits(&self.seen_bits)?;
        *world = self.world.clone();
        Ok(())
    }

    /// Serialize to the on-disk JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the on-disk JSON form.
    pub fn from_json(text: &str) -> serde_json::Result<SaveGame> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::wire_fixtures::{section, RecordSpec};
    use crate::records::{InteractionKind, RecordId, SpeakerId};
    use game_state::{Character, GlobalField, PartyMask, RoomId};

    fn fixture() -> (WorldState, RecordTable) {
        let mut world = WorldState::new();
        world.set_current_room(RoomId(3));
        world
            .roster
            .add(Character::new("Julia", PartyMask(0b0001), RoomId(3)));
        world.globals.set(GlobalField::StoryPhase, 5);

        let bytes = section(
            SpeakerId(1),
            InteractionKind::Talk,
            &[
                RecordSpec {
                    condition: 1,
                    text: 10,
                    ..Default::default()
                },
                RecordSpec {
                    condition: 2,
                    text: 11,
                    ..Default::default()
                },
            ],
        );
        (world, RecordTable::from_wire(&bytes).unwrap())
    }

    #[test]
    fn test_save_round_trip_restores_trackers() {
        let (world, mut records) = fixture();
        records.mark_seen(RecordId(0), false);

        let json = SaveGame::capture(&world, &records).to_json().unwrap();
        let save = SaveGame::from_json(&json).unwrap();

        // A fresh session loaded from the same data.
        let (_, mut fresh_records) = fixture();
        let mut fresh_world = WorldState::new();
        save.apply(&mut fresh_world, &mut fresh_records).unwrap();

        assert_eq!(fresh_world, world);
        assert_eq!(fresh_world.globals.get(GlobalField::StoryPhase), 5);
        assert!(fresh_records.record(RecordId(0)).spoken);
        assert!(!fresh_records.record(RecordId(1)).spoken);
    }

    #[test]
    fn test_mismatched_record_data_rejected() {
        let (world, records) = fixture();
        let save = SaveGame::capture(&world, &records);

        // Table from different game data: one record instead of two.
        let bytes = section(
            SpeakerId(1),
            InteractionKind::Talk,
            &[RecordSpec {
                condition: 1,
                text: 10,
                ..Default::default()
            }],
        );
        let mut other_records = RecordTable::from_wire(&bytes).unwrap();
        let mut other_world = WorldState::new();

        let err = save.apply(&mut other_world, &mut other_records).unwrap_err();
        assert!(matches!(err, EngineError::SeenBitsMismatch { .. }));

        // Failed restore leaves the world untouched.
        assert_eq!(other_world, WorldState::new());
    }

    #[test]
    fn test_each_save_gets_its_own_id() {
        let (world, records) = fixture();
        let first = SaveGame::capture(&world, &records);
        let second = SaveGame::capture(&world, &records);
        assert_ne!(first.id, second.id);
    }
}
