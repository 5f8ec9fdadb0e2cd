//! Core types: player and slot ids, configuration, RNG, errors.
//!
//! Everything here is shared by the table, the players and the dealer and
//! carries no threading of its own.

pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod slot;

pub use config::GameConfig;
pub use error::{ConfigError, GameError, InputError, TableError};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS};
pub use rng::GameRng;
pub use slot::Slot;
