//! # Game State
//!
//! The "World Bible" crate - the global state block, party roster, and
//! inventory for Prompter. This crate is the single source of truth for
//! session state and contains no dialogue or scripting logic.
//!
//! The global state lives in a flat, offset-addressable byte block so it can
//! be persisted verbatim and read by data-driven scripts; a typed field
//! registry on top keeps the rest of the game away from raw offsets.

pub mod globals;
pub mod inventory;
pub mod manifest;
pub mod party;
pub mod world;

pub use globals::*;
pub use inventory::*;
pub use manifest::*;
pub use party::*;
pub use world::*;
