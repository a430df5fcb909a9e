//! Narrative side-effect handlers invoked by matched records.
//!
//! The 4-bit selector on a dialogue record names one handler. Selector 0
//! means "no action" and is handled at the call site; it never reaches
//! [`Action::from_selector`]. Handlers mutate the world and may request
//! `Stage` services, but they never re-enter the matcher - follow-up
//! dialogue is signalled through [`ActionOutcome::chain`] and picked up on
//! the next game-loop tick.

use crate::error::EngineError;
use crate::stage::{SpeakerContext, Stage};
use game_state::{GlobalField, ItemId, PartyMask, RoomId, WorldState};

/// Story phases advance in blocks of this size when a chapter boundary
/// action fires.
pub const PHASE_BLOCK: u16 = 8;

/// The fixed set of record actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetAnswerYes,
    SetAnswerNo,
    NpcDeparts,
    AutoDialogueOn,
    AutoDialogueOff,
    PartyMemberStays,
    PartyMemberFollows,
    AdvanceCitadelCounter,
    AutoDialogueAndFollow,
    AbortDialogue,
    AdvanceStoryPhase,
    AdvanceStoryPhaseBlock,
    TransferPendingGifts,
    BranchToChoiceZone,
    DropCurrentObject,
}

impl Action {
    /// Map a record's selector nibble to its handler.
    ///
    /// Selector 0 is the explicit no-op and is rejected here: callers must
    /// not dispatch it. Anything past the table is corrupted data.
    pub fn from_selector(selector: u8) -> Result<Action, EngineError> {
        let action = match selector {
            1 => Action::SetAnswerYes,
            2 => Action::SetAnswerNo,
            3 => Action::NpcDeparts,
            4 => Action::AutoDialogueOn,
            5 => Action::AutoDialogueOff,
            6 => Action::PartyMemberStays,
            7 => Action::PartyMemberFollows,
            8 => Action::AdvanceCitadelCounter,
            9 => Action::AutoDialogueAndFollow,
            10 => Action::AbortDialogue,
            11 => Action::AdvanceStoryPhase,
            12 => Action::AdvanceStoryPhaseBlock,
            13 => Action::TransferPendingGifts,
            14 => Action::BranchToChoiceZone,
            15 => Action::DropCurrentObject,
            _ => return Err(EngineError::UnknownAction { selector }),
        };
        Ok(action)
    }
}

/// What a handler asked of the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Continue with the next record in the same list on the next tick.
    pub chain: bool,
    /// Close the speaker context instead of continuing the conversation.
    pub abort: bool,
}

/// Run one handler against the world.
pub fn dispatch(
    action: Action,
    world: &mut WorldState,
    stage: &mut dyn Stage,
    context: SpeakerContext,
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    match action {
        Action::SetAnswerYes => world.globals.set(GlobalField::AnswerFlag, 1),
        Action::SetAnswerNo => world.globals.set(GlobalField::AnswerFlag, 0),
        Action::NpcDeparts => {
            if let Some(owner) = context.owner {
                let identity = world
                    .roster
                    .get(owner)
                    .map(|character| character.identity)
                    .unwrap_or(PartyMask::NONE);
                if let Some(character) = world.roster.get_mut(owner) {
                    character.room = RoomId::OFFSTAGE;
                }
                remove_from_field(world, GlobalField::PartyMask, identity);
                remove_from_field(world, GlobalField::OutsidePartyMask, identity);
                // Redraw the scene without the departed speaker.
                stage.request_room_transition(world.current_room());
            }
        }
        Action::AutoDialogueOn => world.globals.set(GlobalField::AutoDialogue, 1),
        Action::AutoDialogueOff => world.globals.set(GlobalField::AutoDialogue, 0),
        Action::PartyMemberStays => member_stays(world, context),
        Action::PartyMemberFollows => member_follows(world, context),
        Action::AdvanceCitadelCounter => {
            let counter = world.globals.get(GlobalField::CitadelCounter);
            world
                .globals
                .set(GlobalField::CitadelCounter, counter.wrapping_add(1));
            stage.advance_game_clock(1);
        }
        Action::AutoDialogueAndFollow => {
            world.globals.set(GlobalField::AutoDialogue, 1);
            member_follows(world, context);
        }
        Action::AbortDialogue => {
            world.globals.set(GlobalField::DialogueAborted, 1);
            world.globals.set(GlobalField::AutoDialogue, 0);
            outcome.abort = true;
        }
        Action::AdvanceStoryPhase => {
            let phase = world.globals.get(GlobalField::StoryPhase);
            world
                .globals
                .set(GlobalField::StoryPhase, phase.wrapping_add(1));
        }
        Action::AdvanceStoryPhaseBlock => {
            let phase = world.globals.get(GlobalField::StoryPhase);
            let next_block = (phase / PHASE_BLOCK + 1) * PHASE_BLOCK;
            world.globals.set(GlobalField::StoryPhase, next_block);
        }
        Action::TransferPendingGifts => {
            world.inventory.transfer_pending_gifts();
        }
        Action::BranchToChoiceZone => outcome.chain = true,
        Action::DropCurrentObject => {
            let current = world.globals.get(GlobalField::CurrentObject);
            if current != 0 {
                world.inventory.drop_item(ItemId(current));
                world.globals.set(GlobalField::CurrentObject, 0);
            }
        }
    }
    outcome
}

/// The owning member leaves the travelling party but stays in the room.
fn member_stays(world: &mut WorldState, context: SpeakerContext) {
    if let Some(identity) = owner_identity(world, context) {
        remove_from_field(world, GlobalField::PartyMask, identity);
        add_to_field(world, GlobalField::OutsidePartyMask, identity);
    }
}

/// The owning member rejoins the travelling party.
fn member_follows(world: &mut WorldState, context: SpeakerContext) {
    if let Some(identity) = owner_identity(world, context) {
        add_to_field(world, GlobalField::PartyMask, identity);
        remove_from_field(world, GlobalField::OutsidePartyMask, identity);
    }
}

fn owner_identity(world: &WorldState, context: SpeakerContext) -> Option<PartyMask> {
    context
        .owner
        .and_then(|owner| world.roster.get(owner))
        .map(|character| character.identity)
}

fn add_to_field(world: &mut WorldState, field: GlobalField, mask: PartyMask) {
    let current = PartyMask(world.globals.get(field) as u8);
    world.globals.set(field, u16::from(current.union(mask).0));
}

fn remove_from_field(world: &mut WorldState, field: GlobalField, mask: PartyMask) {
    let current = PartyMask(world.globals.get(field) as u8);
    world.globals.set(field, u16::from(current.without(mask).0));
}
