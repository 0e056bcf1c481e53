//! Saved participant lists, selection counters and the winner draw.
//!
//! The scene only needs a list of names and, once drawn, a winner. This crate
//! owns everything around that: storing named lists, tracking how often each
//! participant has been picked, and running the draw itself.

pub mod draw;
pub mod model;
pub mod store;

pub use draw::{draw_winner, roll, Draw, DrawRoll, Flash};
pub use model::{eligible, Participant, ParticipantList, SELECTION_LIMIT};
pub use store::{ListStore, MemoryStore, RonStore, StoreError, StoreResult};
