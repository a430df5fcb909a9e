//! # Dialogue Engine (Prompter)
//!
//! The narrative brain of a scripted adventure game. This crate interfaces
//! with `game_state`, evaluates byte-encoded condition programs against the
//! global state block, and selects and runs dialogue records.
//!
//! ## Core Components
//!
//! - **condition**: the bytecode expression interpreter and program table
//! - **records**: wire decoding of dialogue records and their one-shot
//!   trackers
//! - **matcher**: first-match-wins rule scanning and owner resolution
//! - **actions**: the fixed table of narrative side-effect handlers
//! - **stage**: the collaborator seam to rendering, audio, and rooms
//! - **save**: uuid-stamped snapshots of world state plus trackers
//!
//! ## Design Philosophy
//!
//! - **Data-Driven**: every branch in the story is authored as records and
//!   condition programs, not code
//! - **Synchronous**: one invocation runs to completion inside a single
//!   game-loop tick; collaborators never call back in
//! - **Fail-Fast**: malformed programs and corrupted tables surface as
//!   errors instead of reading stale or out-of-bounds state

pub mod actions;
pub mod condition;
pub mod error;
pub mod matcher;
pub mod records;
pub mod save;
pub mod stage;

pub use actions::*;
pub use condition::*;
pub use error::*;
pub use matcher::*;
pub use records::*;
pub use save::*;
pub use stage::*;
