//! Dialogue record tables.
//!
//! Response lines ship as fixed six-byte records, grouped into contiguous
//! lists per (speaker, interaction kind) pair and closed by a sentinel
//! record. The packed wire fields are decoded once at load into plain
//! integers; nothing downstream re-derives the packed form.
//!
//! Wire layout of one record:
//!
//! | byte | bits    | meaning                    |
//! |------|---------|----------------------------|
//! | 0    | 7       | spoken                     |
//! | 0    | 6       | repeatable                 |
//! | 1    | 0-3     | action selector            |
//! | 1    | 4-6     | condition id bits 8-10     |
//! | 2    | 0-7     | condition id bits 0-7      |
//! | 3    | 0-7     | text id bits 0-7           |
//! | 4    | 0-1     | text id bits 8-9           |
//! | 4    | 4-7     | party selector             |
//! | 5    | -       | reserved, ignored          |
//!
//! A list ends with a record whose bytes 0 and 2 are both `0xFF`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::condition::ConditionId;
use crate::error::EngineError;

/// Byte length of one wire record.
pub const RECORD_LEN: usize = 6;

/// Sentinel byte closing a record list (flags and condition-low).
pub const SENTINEL: u8 = 0xFF;

/// Identifier of a speaking entity in the dialogue data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeakerId(pub u8);

/// Identifier of a response text resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextId(pub u16);

/// Index of a record in the loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u32);

/// How the player is engaging the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    Talk,
    ShowItem,
    Examine,
    Ambient,
}

impl InteractionKind {
    /// Decode the wire byte.
    pub fn from_u8(byte: u8) -> Option<InteractionKind> {
        match byte {
            0 => Some(InteractionKind::Talk),
            1 => Some(InteractionKind::ShowItem),
            2 => Some(InteractionKind::Examine),
            3 => Some(InteractionKind::Ambient),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            InteractionKind::Talk => 0,
            InteractionKind::ShowItem => 1,
            InteractionKind::Examine => 2,
            InteractionKind::Ambient => 3,
        }
    }
}

/// One candidate response line, fully decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueRecord {
    /// Gating condition program.
    pub condition: ConditionId,
    /// Response text resource.
    pub text: TextId,
    /// Side-effect handler index; 0 means none.
    pub action_selector: u8,
    /// Party member who must be present to own the line; 0 means anyone.
    pub party_selector: u8,
    /// Repeatable lines are never exhausted.
    pub repeatable: bool,
    /// One-shot tracker for interactive speech.
    pub spoken: bool,
    /// One-shot tracker for ambient probe scans.
    pub probed: bool,
}

impl DialogueRecord {
    /// Which one-shot tracker governs the given scan mode.
    pub fn already_seen(&self, probe: bool) -> bool {
        if probe {
            self.probed
        } else {
            self.spoken
        }
    }
}

/// Contiguous slice of the record arena holding one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSpan {
    start: u32,
    len: u32,
}

impl ListSpan {
    /// Record ids in table order.
    pub fn iter(&self) -> impl Iterator<Item = RecordId> {
        (self.start..self.start + self.len).map(RecordId)
    }

    /// The record following `id` inside this list, if any.
    pub fn next_after(&self, id: RecordId) -> Option<RecordId> {
        let next = id.0 + 1;
        (next >= self.start && next < self.start + self.len).then_some(RecordId(next))
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// All loaded dialogue records plus the per-pair list index.
///
/// Immutable after load except for the spoken/probed trackers.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<DialogueRecord>,
    lists: HashMap<(SpeakerId, InteractionKind), ListSpan>,
}

impl RecordTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a record stream: repeated sections of `[speaker][kind]`
    /// followed by records up to and including a sentinel.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, EngineError> {
        let mut table = RecordTable::new();
        let mut cursor = 0;

        while cursor < bytes.len() {
            if cursor + 2 > bytes.len() {
                return Err(EngineError::TruncatedRecordList);
            }
            let speaker = SpeakerId(bytes[cursor]);
            let kind_byte = bytes[cursor + 1];
            let kind = InteractionKind::from_u8(kind_byte)
                .ok_or(EngineError::UnknownInteractionKind { kind: kind_byte })?;
            cursor += 2;

            let start = table.records.len() as u32;
            loop {
                let Some(raw) = bytes.get(cursor..cursor + RECORD_LEN) else {
                    return Err(EngineError::TruncatedRecordList);
                };
                cursor += RECORD_LEN;
                if raw[0] == SENTINEL && raw[2] == SENTINEL {
                    break;
                }
                table.records.push(decode_record(raw));
            }

            let span = ListSpan {
                start,
                len: table.records.len() as u32 - start,
            };
            if table.lists.insert((speaker, kind), span).is_some() {
                return Err(EngineError::DuplicateRecordList {
                    speaker: speaker.0,
                    kind,
                });
            }
        }

        Ok(table)
    }

    /// Look up the list for a (speaker, kind) pair.
    pub fn span(&self, speaker: SpeakerId, kind: InteractionKind) -> Result<ListSpan, EngineError> {
        self.lists
            .get(&(speaker, kind))
            .copied()
            .ok_or(EngineError::RecordListUnknown {
                speaker: speaker.0,
                kind,
            })
    }

    /// Get a record by id.
    pub fn record(&self, id: RecordId) -> &DialogueRecord {
        &self.records[id.0 as usize]
    }

    /// Total number of records across all lists.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set the one-shot tracker for the given scan mode. Idempotent.
    pub fn mark_seen(&mut self, id: RecordId, probe: bool) {
        let record = &mut self.records[id.0 as usize];
        if probe {
            record.probed = true;
        } else {
            record.spoken = true;
        }
    }

    /// Snapshot the per-record trackers for persistence.
    ///
    /// One byte per record: bit 0 spoken, bit 1 probed.
    pub fn export_seen_bits(&self) -> Vec<u8> {
        self.records
            .iter()
            .map(|record| u8::from(record.spoken) | (u8::from(record.probed) << 1))
            .collect()
    }

    /// Restore trackers from a snapshot taken over the same record data.
    pub fn restore_seen_bits(&mut self, bits: &[u8]) -> Result<(), EngineError> {
        if bits.len() != self.records.len() {
            return Err(EngineError::SeenBitsMismatch {
                expected: self.records.len(),
                found: bits.len(),
            });
        }
        for (record, byte) in self.records.iter_mut().zip(bits) {
            record.spoken = byte & 0b01 != 0;
            record.probed = byte & 0b10 != 0;
        }
        Ok(())
    }
}

fn decode_record(raw: &[u8]) -> DialogueRecord {
    debug_assert_eq!(raw.len(), RECORD_LEN);
    let condition = (u16::from(raw[1] >> 4) & 0x07) << 8 | u16::from(raw[2]);
    let text = (u16::from(raw[4]) & 0x03) << 8 | u16::from(raw[3]);
    DialogueRecord {
        condition: ConditionId(condition),
        text: TextId(text),
        action_selector: raw[1] & 0x0F,
        party_selector: raw[4] >> 4,
        repeatable: raw[0] & 0x40 != 0,
        spoken: raw[0] & 0x80 != 0,
        probed: false,
    }
}
