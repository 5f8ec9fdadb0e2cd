//! Player actors.
//!
//! One thread per player, plus one input generator thread per computer
//! player. See `actor` for the claim/verdict loop and `input` for the
//! bounded key queue.

pub mod actor;
pub mod input;

pub use actor::{FreezeTiming, Player, PlayerHandle};
pub use input::{KeyInput, KEY_QUEUE_CAPACITY};
