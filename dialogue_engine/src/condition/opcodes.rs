//! Condition bytecode constants.
//!
//! A program is a sequence of value fetches and operator bytes ending in
//! [`END`]. Operators live in the low nibble; [`DEFER_BIT`] in the high
//! bit marks an operator whose application is deferred to the second
//! reduction pass instead of being applied immediately.

/// Program terminator.
pub const END: u8 = 0xFF;

/// Set on operators that close the current chain and defer.
pub const DEFER_BIT: u8 = 0x80;

/// Mask extracting the operator index from an operator byte.
pub const OP_MASK: u8 = 0x0F;

/// Value-fetch type bytes.
pub mod value {
    /// Immediate unsigned byte follows.
    pub const IMM_BYTE: u8 = 0x01;

    /// Immediate little-endian word follows.
    pub const IMM_WORD: u8 = 0x02;

    /// Global-state byte read; the next byte is the block offset.
    pub const STATE_BYTE: u8 = 0x04;

    /// Global-state word read; the next byte is the block offset.
    pub const STATE_WORD: u8 = 0x05;

    /// Low bit of the state-read type bytes selects word width.
    pub const WIDTH_BIT: u8 = 0x01;
}

/// Operator indices (combine with [`DEFER_BIT`](super::DEFER_BIT) for the
/// deferred form).
pub mod op {
    /// Equal.
    pub const EQ: u8 = 0x00;

    /// Less-than.
    pub const LT: u8 = 0x01;

    /// Greater-than.
    pub const GT: u8 = 0x02;

    /// Not-equal.
    pub const NE: u8 = 0x03;

    /// Less-or-equal.
    pub const LE: u8 = 0x04;

    /// Greater-or-equal.
    pub const GE: u8 = 0x05;

    /// Wrapping addition.
    pub const ADD: u8 = 0x06;

    /// Wrapping subtraction.
    pub const SUB: u8 = 0x07;

    /// Bitwise and.
    pub const AND: u8 = 0x08;

    /// Bitwise or.
    pub const OR: u8 = 0x09;

    // Indices 0x0A..=0x0F are reserved table padding; they evaluate to
    // zero with no side effects.
}
