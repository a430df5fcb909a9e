//! The dialogue rule matcher.
//!
//! One invocation scans the record list for a (speaker, interaction kind)
//! pair in table order, evaluates each candidate's condition, and runs the
//! first record that passes both the one-shot gate and its condition.
//! Matching is strictly first-match-wins; later records are irrelevant once
//! one is chosen. Finding no record is the normal negative result, not an
//! error.

use crate::actions::{dispatch, Action};
use crate::condition::ConditionTable;
use crate::error::EngineError;
use crate::records::{InteractionKind, RecordId, RecordTable, SpeakerId};
use crate::stage::{SpeakerContext, Stage};
use game_state::{CharacterId, GlobalField, PartyMask, WorldState};

/// Result of looking up the party member a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerLookup {
    /// The record names nobody; the addressed speaker owns the line.
    Unrestricted,
    /// A present cast member matched the selector.
    Found(CharacterId),
    /// The selector matched nobody in the current room.
    Missing,
}

/// Find the cast member a non-zero party selector points at: identity must
/// intersect the selector and the active cast, and the character must stand
/// in the current room.
fn resolve_owner(world: &WorldState, selector: u8) -> OwnerLookup {
    if selector == 0 {
        return OwnerLookup::Unrestricted;
    }
    let wanted = PartyMask(selector);
    let cast = world.active_cast();
    let room = world.current_room();
    for (id, character) in world.roster.iter() {
        if character.identity.intersects(wanted)
            && character.identity.intersects(cast)
            && character.room == room
        {
            return OwnerLookup::Found(id);
        }
    }
    OwnerLookup::Missing
}

/// The rule matcher: condition programs, dialogue records, and the
/// follow-up cursor left behind by chaining actions.
#[derive(Debug)]
pub struct DialogueMatcher {
    conditions: ConditionTable,
    records: RecordTable,
    chained: Option<RecordId>,
}

impl DialogueMatcher {
    /// Bundle loaded condition and record tables into a matcher.
    pub fn new(conditions: ConditionTable, records: RecordTable) -> Self {
        Self {
            conditions,
            records,
            chained: None,
        }
    }

    /// The loaded record table.
    pub fn records(&self) -> &RecordTable {
        &self.records
    }

    /// Mutable access for tracker restoration on load.
    pub fn records_mut(&mut self) -> &mut RecordTable {
        &mut self.records
    }

    /// The loaded condition table.
    pub fn conditions(&self) -> &ConditionTable {
        &self.conditions
    }

    /// Take the follow-up record requested by the last chaining action, if
    /// any. The cursor resets once taken.
    pub fn take_chained(&mut self) -> Option<RecordId> {
        self.chained.take()
    }

    /// Scan the list for `(speaker, kind)` and run the first eligible
    /// record.
    ///
    /// `probe` selects the ambient one-shot tracker instead of the
    /// interactive one, so environment checks never exhaust lines meant
    /// for real conversation and vice versa. Returns `Ok(false)` when the
    /// scan reaches the end of the list without a match.
    pub fn match_and_run(
        &mut self,
        world: &mut WorldState,
        stage: &mut dyn Stage,
        speaker: SpeakerId,
        kind: InteractionKind,
        probe: bool,
    ) -> Result<bool, EngineError> {
        let span = self.records.span(speaker, kind)?;

        let mut selected = None;
        for id in span.iter() {
            let record = self.records.record(id);
            if record.already_seen(probe) && !record.repeatable {
                continue;
            }
            if self.conditions.evaluate(&world.globals, record.condition)? {
                selected = Some(id);
                break;
            }
        }
        let Some(id) = selected else {
            return Ok(false);
        };

        let record = self.records.record(id);
        let text = record.text;
        let action_selector = record.action_selector;
        let party_selector = record.party_selector;
        let repeatable = record.repeatable;

        let owner = match resolve_owner(world, party_selector) {
            OwnerLookup::Unrestricted => None,
            OwnerLookup::Found(found) => {
                world.globals.set(GlobalField::ActiveSpeaker, found.0);
                world.roster.record_meeting(found);
                Some(found)
            }
            OwnerLookup::Missing => {
                return Err(EngineError::SpeakerNotPresent {
                    selector: party_selector,
                })
            }
        };

        let context = SpeakerContext { speaker, owner };
        stage.render_response_line(context, text);
        if !probe {
            stage.play_voice_clip(text);
        }

        // Dispatch before marking, so a handler can still observe whether
        // the line had ever been delivered.
        if action_selector != 0 {
            let action = Action::from_selector(action_selector)?;
            let outcome = dispatch(action, world, stage, context);
            if outcome.chain {
                self.chained = span.next_after(id);
            }
        }

        if !repeatable {
            self.records.mark_seen(id, probe);
        }
        Ok(true)
    }
}
