//! Condition programs and their interpreter.
//!
//! Conditions are small byte-encoded expressions authored alongside the
//! dialogue data. Evaluation uses two levels of precedence and nothing
//! else: an operator without the defer bit applies immediately to the
//! running chain, an operator with the defer bit is pushed with its
//! left-hand value and folded in a second pass once the terminator is
//! reached. Comparison results are all-ones words so they compose with
//! the bitwise operators in nested expressions.

pub mod opcodes;

use crate::error::EngineError;
use game_state::GlobalState;

/// All-ones truth word produced by the comparison operators.
pub const TRUE_WORD: u16 = 0xFFFF;

/// Upper bound on deferred operators in one program.
const DEFERRED_LIMIT: usize = 32;

/// Identifier of a condition program. Ids are 1-based; id 0 never names
/// a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionId(pub u16);

impl std::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The immutable table of condition programs.
///
/// On the wire the table is a header of little-endian `u16` offsets (one
/// per id, 1-based) into a shared code stream. Offsets are validated at
/// load so evaluation can never start outside the stream.
#[derive(Debug, Clone)]
pub struct ConditionTable {
    offsets: Vec<u16>,
    code: Vec<u8>,
}

impl ConditionTable {
    /// Build a table from the wire header and the shared code stream.
    pub fn from_wire(header: &[u8], code: Vec<u8>) -> Result<Self, EngineError> {
        if header.len() % 2 != 0 {
            return Err(EngineError::TruncatedConditionTable);
        }
        let offsets: Vec<u16> = header
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        for (index, offset) in offsets.iter().enumerate() {
            if *offset as usize >= code.len() {
                return Err(EngineError::ProgramOffsetOutOfBounds {
                    id: index as u16 + 1,
                    offset: *offset as usize,
                    len: code.len(),
                });
            }
        }
        Ok(Self { offsets, code })
    }

    /// Build a table from separate program slices. Intended for authoring
    /// tools and tests; produces the same layout as [`from_wire`].
    ///
    /// [`from_wire`]: ConditionTable::from_wire
    pub fn from_programs<P: AsRef<[u8]>>(programs: &[P]) -> Self {
        let mut offsets = Vec::with_capacity(programs.len());
        let mut code = Vec::new();
        for program in programs {
            offsets.push(code.len() as u16);
            code.extend_from_slice(program.as_ref());
        }
        Self { offsets, code }
    }

    /// Number of programs in the table.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Evaluate a condition against the global state block.
    ///
    /// Pure except for reads of `globals`; the same id against the same
    /// state always yields the same answer.
    pub fn evaluate(&self, globals: &GlobalState, id: ConditionId) -> Result<bool, EngineError> {
        let mut pc = self.program_start(id)?;
        let mut deferred: Vec<(u16, u8)> = Vec::new();

        let last_chain = 'program: loop {
            // A chain is one value followed by its immediate operators.
            let mut left = self.fetch_value(globals, id, &mut pc)?;
            loop {
                let opcode = self.next_byte(id, &mut pc)?;
                if opcode == opcodes::END {
                    break 'program left;
                }
                if opcode & opcodes::DEFER_BIT == 0 {
                    let right = self.fetch_value(globals, id, &mut pc)?;
                    left = apply(opcode, left, right);
                } else {
                    if deferred.len() >= DEFERRED_LIMIT {
                        return Err(EngineError::EvaluationStackOverflow { id: id.0 });
                    }
                    deferred.push((left, opcode));
                    break;
                }
            }
        };

        // Second pass: fold the deferred chains in the order they were
        // pushed, ending with the final chain's value.
        let mut pending = deferred.into_iter();
        let result = match pending.next() {
            None => last_chain,
            Some((first, mut operator)) => {
                let mut running = first;
                for (value, next_operator) in pending {
                    running = apply(operator, running, value);
                    operator = next_operator;
                }
                apply(operator, running, last_chain)
            }
        };

        Ok(result != 0)
    }

    fn program_start(&self, id: ConditionId) -> Result<usize, EngineError> {
        if id.0 == 0 || id.0 as usize > self.offsets.len() {
            return Err(EngineError::ConditionOutOfBounds {
                id: id.0,
                count: self.offsets.len(),
            });
        }
        Ok(self.offsets[id.0 as usize - 1] as usize)
    }

    fn next_byte(&self, id: ConditionId, pc: &mut usize) -> Result<u8, EngineError> {
        let byte = self
            .code
            .get(*pc)
            .copied()
            .ok_or(EngineError::UnexpectedEndOfProgram { id: id.0 })?;
        *pc += 1;
        Ok(byte)
    }

    fn fetch_value(
        &self,
        globals: &GlobalState,
        id: ConditionId,
        pc: &mut usize,
    ) -> Result<u16, EngineError> {
        let kind = self.next_byte(id, pc)?;
        match kind {
            opcodes::value::IMM_BYTE => Ok(u16::from(self.next_byte(id, pc)?)),
            opcodes::value::IMM_WORD => {
                let lo = self.next_byte(id, pc)?;
                let hi = self.next_byte(id, pc)?;
                Ok(u16::from_le_bytes([lo, hi]))
            }
            opcodes::value::STATE_BYTE | opcodes::value::STATE_WORD => {
                let offset = usize::from(self.next_byte(id, pc)?);
                if kind & opcodes::value::WIDTH_BIT != 0 {
                    Ok(globals.read_u16(offset)?)
                } else {
                    Ok(u16::from(globals.read_u8(offset)?))
                }
            }
            other => Err(EngineError::UnknownValueKind {
                id: id.0,
                kind: other,
            }),
        }
    }
}

/// Apply one operator. Reserved table slots evaluate to zero.
fn apply(opcode: u8, a: u16, b: u16) -> u16 {
    let truth = |holds: bool| if holds { TRUE_WORD } else { 0 };
    match opcode & opcodes::OP_MASK {
        opcodes::op::EQ => truth(a == b),
        opcodes::op::LT => truth(a < b),
        opcodes::op::GT => truth(a > b),
        opcodes::op::NE => truth(a != b),
        opcodes::op::LE => truth(a <= b),
        opcodes::op::GE => truth(a >= b),
        opcodes::op::ADD => a.wrapping_add(b),
        opcodes::op::SUB => a.wrapping_sub(b),
        opcodes::op::AND => a & b,
        opcodes::op::OR => a | b,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::opcodes::{op, value, DEFER_BIT, END};
    use super::*;

    fn single(program: &[u8]) -> ConditionTable {
        ConditionTable::from_programs(&[program])
    }

    const ID: ConditionId = ConditionId(1);

    #[test]
    fn test_state_byte_equality() {
        let table = single(&[value::STATE_BYTE, 7, op::EQ, value::IMM_BYTE, 5, END]);
        let mut globals = GlobalState::new();

        globals.write_u8(7, 5).unwrap();
        assert!(table.evaluate(&globals, ID).unwrap());

        globals.write_u8(7, 3).unwrap();
        assert!(!table.evaluate(&globals, ID).unwrap());
    }

    #[test]
    fn test_state_word_read() {
        let table = single(&[
            value::STATE_WORD,
            0x20,
            op::EQ,
            value::IMM_WORD,
            0x34,
            0x12,
            END,
        ]);
        let mut globals = GlobalState::new();
        globals.write_u16(0x20, 0x1234).unwrap();

        assert!(table.evaluate(&globals, ID).unwrap());
    }

    #[test]
    fn test_tight_chain_folds_left_to_right() {
        // 10 - 3 - 2 == 5 only under left-to-right folding.
        let table = single(&[
            value::IMM_BYTE,
            10,
            op::SUB,
            value::IMM_BYTE,
            3,
            op::SUB,
            value::IMM_BYTE,
            2,
            op::EQ,
            value::IMM_BYTE,
            5,
            END,
        ]);
        assert!(table.evaluate(&GlobalState::new(), ID).unwrap());
    }

    #[test]
    fn test_deferred_pass_compares_chain_results() {
        // (1 + 2) deferred-eq (1 + 2): both chains fold tightly first.
        let table = single(&[
            value::IMM_BYTE,
            1,
            op::ADD,
            value::IMM_BYTE,
            2,
            op::EQ | DEFER_BIT,
            value::IMM_BYTE,
            1,
            op::ADD,
            value::IMM_BYTE,
            2,
            END,
        ]);
        assert!(table.evaluate(&GlobalState::new(), ID).unwrap());
    }

    #[test]
    fn test_deferred_operators_fold_in_push_order() {
        // 8 deferred-sub 3 deferred-sub 1 = (8 - 3) - 1 = 4.
        let table = single(&[
            value::IMM_BYTE,
            8,
            op::SUB | DEFER_BIT,
            value::IMM_BYTE,
            3,
            op::SUB | DEFER_BIT,
            value::IMM_BYTE,
            1,
            op::EQ | DEFER_BIT,
            value::IMM_BYTE,
            4,
            END,
        ]);
        assert!(table.evaluate(&GlobalState::new(), ID).unwrap());
    }

    #[test]
    fn test_truth_words_compose_with_bitwise_and() {
        // (5 == 5) & (3 == 3): both sides all-ones, conjunction holds.
        let both = single(&[
            value::IMM_BYTE,
            5,
            op::EQ,
            value::IMM_BYTE,
            5,
            op::AND | DEFER_BIT,
            value::IMM_BYTE,
            3,
            op::EQ,
            value::IMM_BYTE,
            3,
            END,
        ]);
        assert!(both.evaluate(&GlobalState::new(), ID).unwrap());

        // (5 == 5) & (3 == 4) fails.
        let one = single(&[
            value::IMM_BYTE,
            5,
            op::EQ,
            value::IMM_BYTE,
            5,
            op::AND | DEFER_BIT,
            value::IMM_BYTE,
            3,
            op::EQ,
            value::IMM_BYTE,
            4,
            END,
        ]);
        assert!(!one.evaluate(&GlobalState::new(), ID).unwrap());
    }

    #[test]
    fn test_single_value_truthiness() {
        let zero = single(&[value::IMM_BYTE, 0, END]);
        assert!(!zero.evaluate(&GlobalState::new(), ID).unwrap());

        let nonzero = single(&[value::IMM_BYTE, 42, END]);
        assert!(nonzero.evaluate(&GlobalState::new(), ID).unwrap());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let table = single(&[value::STATE_BYTE, 4, op::GT, value::IMM_BYTE, 1, END]);
        let mut globals = GlobalState::new();
        globals.write_u8(4, 9).unwrap();

        let first = table.evaluate(&globals, ID).unwrap();
        let second = table.evaluate(&globals, ID).unwrap();
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn test_reserved_operators_evaluate_false() {
        for reserved in 0x0A..=0x0F {
            let table = single(&[value::IMM_BYTE, 9, reserved, value::IMM_BYTE, 9, END]);
            assert!(
                !table.evaluate(&GlobalState::new(), ID).unwrap(),
                "reserved operator {reserved:#04x} must stay false"
            );
        }
    }

    #[test]
    fn test_condition_id_bounds() {
        let table = single(&[value::IMM_BYTE, 1, END]);
        let globals = GlobalState::new();

        let err = table.evaluate(&globals, ConditionId(0)).unwrap_err();
        assert!(matches!(err, EngineError::ConditionOutOfBounds { id: 0, .. }));

        let err = table.evaluate(&globals, ConditionId(2)).unwrap_err();
        assert!(matches!(err, EngineError::ConditionOutOfBounds { id: 2, .. }));
    }

    #[test]
    fn test_missing_terminator_fails() {
        let table = single(&[value::IMM_BYTE, 1, op::ADD, value::IMM_BYTE, 2]);
        let err = table.evaluate(&GlobalState::new(), ID).unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedEndOfProgram { .. }));
    }

    #[test]
    fn test_unknown_value_kind_fails() {
        let table = single(&[0x09, 1, END]);
        let err = table.evaluate(&GlobalState::new(), ID).unwrap_err();
        assert!(matches!(err, EngineError::UnknownValueKind { kind: 0x09, .. }));
    }

    #[test]
    fn test_deferred_stack_limit() {
        let mut program = Vec::new();
        for _ in 0..33 {
            program.extend_from_slice(&[value::IMM_BYTE, 1, op::OR | DEFER_BIT]);
        }
        program.extend_from_slice(&[value::IMM_BYTE, 1, END]);

        let err = single(&program).evaluate(&GlobalState::new(), ID).unwrap_err();
        assert!(matches!(err, EngineError::EvaluationStackOverflow { .. }));
    }

    #[test]
    fn test_state_read_out_of_block_fails() {
        let table = single(&[value::STATE_WORD, 0xFF, op::EQ, value::IMM_BYTE, 0, END]);
        let err = table.evaluate(&GlobalState::new(), ID).unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn test_wire_header_offsets_validated() {
        // Offset 4 points past a 3-byte stream.
        let err = ConditionTable::from_wire(&[4, 0], vec![value::IMM_BYTE, 1, END]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ProgramOffsetOutOfBounds { id: 1, offset: 4, .. }
        ));

        let err = ConditionTable::from_wire(&[0], Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::TruncatedConditionTable));
    }

    #[test]
    fn test_wire_round_trip_matches_from_programs() {
        let programs: [&[u8]; 2] = [
            &[value::IMM_BYTE, 1, END],
            &[value::IMM_BYTE, 0, END],
        ];
        let built = ConditionTable::from_programs(&programs);

        let header = [0u8, 0, 3, 0];
        let code = vec![value::IMM_BYTE, 1, END, value::IMM_BYTE, 0, END];
        let loaded = ConditionTable::from_wire(&header, code).unwrap();

        let globals = GlobalState::new();
        for id in [ConditionId(1), ConditionId(2)] {
            assert_eq!(
                built.evaluate(&globals, id).unwrap(),
                loaded.evaluate(&globals, id).unwrap()
            );
        }
    }
}
