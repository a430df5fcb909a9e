//! World state - the bundle of everything a running session owns.

use serde::{Deserialize, Serialize};

use crate::globals::{GlobalField, GlobalState};
use crate::inventory::Inventory;
use crate::party::{PartyMask, Roster};

/// Identifier of a room/scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RoomId(pub u16);

impl RoomId {
    /// Room id used for characters who have left the playable area.
    pub const OFFSTAGE: RoomId = RoomId(0);
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete session state: global block, roster, and inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    pub globals: GlobalState,
    pub roster: Roster,
    pub inventory: Inventory,
}

impl WorldState {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Room the player currently occupies.
    pub fn current_room(&self) -> RoomId {
        RoomId(self.globals.get(GlobalField::CurrentRoom))
    }

    /// Move the player to a room.
    pub fn set_current_room(&mut self, room: RoomId) {
        self.globals.set(GlobalField::CurrentRoom, room.0);
    }

    /// Union of the travelling party and the members waiting outside it.
    ///
    /// A character whose identity intersects this set is considered part
    /// of the active cast.
    pub fn active_cast(&self) -> PartyMask {
        let party = PartyMask(self.globals.get(GlobalField::PartyMask) as u8);
        let outside = PartyMask(self.globals.get(GlobalField::OutsidePartyMask) as u8);
        party.union(outside)
    }
}
