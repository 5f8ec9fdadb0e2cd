//! # rust-set
//!
//! The coordination core of a real-time, multi-player "Set" card game.
//!
//! A dealer thread owns the deck and lays cards on a shared table of slots.
//! Human and computer players run on their own threads, toggle tokens on
//! slots in response to key presses and, once they hold three tokens, file
//! a claim and block until the dealer returns a verdict. A correct claim
//! scores a point and removes the three cards; a wrong one freezes the
//! player for a penalty. The dealer reshuffles the table when the round
//! countdown expires and ends the game once no legal set is left.
//!
//! ## Design Principles
//!
//! 1. **One lock for the board**: slot/card mapping and tokens live behind
//!    a single mutex, so a claim either sees all three tokens or none.
//!
//! 2. **FIFO claims**: the dealer validates at most one claim per poll, in
//!    the order they were filed, and drops claims whose tokens were removed
//!    in the meantime.
//!
//! 3. **Rules are pluggable**: the dealer only talks to `SetRules`.
//!
//! ## Modules
//!
//! - `core`: player and slot ids, configuration, RNG, errors
//! - `cards`: card ids and set rules
//! - `table`: the shared board and claim protocol
//! - `ui`: presentation sink
//! - `player`: player actors and key input
//! - `dealer`: the dealer actor and round controller
//! - `game`: wiring a configuration into a running game

pub mod core;
pub mod cards;
pub mod table;
pub mod ui;
pub mod player;
pub mod dealer;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, GameConfig, GameError, GameRng, InputError, PlayerId, PlayerMap, Slot,
    TableError,
};

pub use crate::cards::{CardId, SetRules, StandardSet, SET_SIZE};

pub use crate::table::{Claim, Hint, PostCheckStatus, Table, TokenToggle};

pub use crate::ui::{LogUi, NullUi, RecordingUi, UiEvent, UserInterface};

pub use crate::player::{KeyInput, Player, PlayerHandle};

pub use crate::dealer::{Countdown, Dealer, Terminator};

pub use crate::game::{Game, RunningGame};
