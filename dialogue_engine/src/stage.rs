//! The collaborator seam between the engine and the presentation layer.

use crate::records::{SpeakerId, TextId};
use game_state::{CharacterId, RoomId};

/// Who is delivering a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeakerContext {
    /// The speaker the scan was addressed to.
    pub speaker: SpeakerId,
    /// Party member who took ownership of the line, if any.
    pub owner: Option<CharacterId>,
}

/// Services the engine requests from the rest of the game.
///
/// All calls are synchronous and complete within one game-loop tick;
/// implementations must never call back into the engine.
pub trait Stage {
    /// Lay out and display one response line.
    fn render_response_line(&mut self, speaker: SpeakerContext, text: TextId);

    /// Start the voice clip recorded for a text resource.
    fn play_voice_clip(&mut self, text: TextId);

    /// Schedule a move to another room after the current tick.
    fn request_room_transition(&mut self, room: RoomId);

    /// Advance the in-game clock.
    fn advance_game_clock(&mut self, ticks: u16);
}

/// Records every collaborator call for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingStage {
    pub lines: Vec<(SpeakerContext, TextId)>,
    pub clips: Vec<TextId>,
    pub transitions: Vec<RoomId>,
    pub clock_ticks: u16,
}

#[cfg(test)]
impl Stage for RecordingStage {
    fn render_response_line(&mut self, speaker: SpeakerContext, text: TextId) {
        self.lines.push((speaker, text));
    }

    fn play_voice_clip(&mut self, text: TextId) {
        self.clips.push(text);
    }

    fn request_room_transition(&mut self, room: RoomId) {
        self.transitions.push(room);
    }

    fn advance_game_clock(&mut self, ticks: u16) {
        self.clock_ticks += ticks;
    }
}
