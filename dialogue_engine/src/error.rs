//! Engine error taxonomy.
//!
//! Everything here indicates corrupted or mismatched game data and is
//! fatal for the current scene; callers should surface the diagnostic and
//! stop rather than keep mutating state. A dialogue scan that simply finds
//! no matching record is not an error - it returns `Ok(false)`.

use thiserror::Error;

use crate::records::InteractionKind;
use game_state::StateError;

/// Errors raised by the condition interpreter, record tables, matcher,
/// and action dispatcher.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Condition id outside the loaded program table.
    #[error("condition id {id} outside the program table (1..={count})")]
    ConditionOutOfBounds { id: u16, count: usize },

    /// A table offset points past the shared code stream.
    #[error("program {id} starts at offset {offset:#x} beyond the code stream ({len} bytes)")]
    ProgramOffsetOutOfBounds { id: u16, offset: usize, len: usize },

    /// The offset header is not a whole number of entries.
    #[error("condition table header is truncated")]
    TruncatedConditionTable,

    /// A program ran off the end of the code stream without a terminator.
    #[error("program {id} ended without a terminator")]
    UnexpectedEndOfProgram { id: u16 },

    /// A value fetch found a type byte outside the known encodings.
    #[error("program {id} contains unknown value kind {kind:#04x}")]
    UnknownValueKind { id: u16, kind: u8 },

    /// More deferred operators than the evaluator allows.
    #[error("program {id} overflowed the deferred-operator stack")]
    EvaluationStackOverflow { id: u16 },

    /// The record stream ended inside a record or before its sentinel.
    #[error("dialogue record stream is truncated")]
    TruncatedRecordList,

    /// A record section declares an interaction kind with no meaning.
    #[error("unknown interaction kind {kind:#04x} in record stream")]
    UnknownInteractionKind { kind: u8 },

    /// Two sections claim the same (speaker, kind) pair.
    #[error("duplicate record list for speaker {speaker} ({kind:?})")]
    DuplicateRecordList { speaker: u8, kind: InteractionKind },

    /// No record list was loaded for the requested pair.
    #[error("no record list for speaker {speaker} ({kind:?})")]
    RecordListUnknown { speaker: u8, kind: InteractionKind },

    /// A record demanded a party member who is not in the room.
    #[error("no present party member matches selector {selector:#04x}")]
    SpeakerNotPresent { selector: u8 },

    /// An action selector outside the fixed handler table.
    #[error("action selector {selector} has no handler")]
    UnknownAction { selector: u8 },

    /// A seen-bit snapshot does not cover the loaded record table.
    #[error("seen-bit snapshot covers {found} records, table has {expected}")]
    SeenBitsMismatch { expected: usize, found: usize },

    /// A raw read or write on the global state block failed.
    #[error(transparent)]
    State(#[from] StateError),
}
