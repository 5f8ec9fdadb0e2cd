//! Error types.
//!
//! Wake interruptions and stale claims are not errors and have no variant
//! here; an invalid set is a normal game outcome (a penalty).

use thiserror::Error;

use super::player::PlayerId;
use super::slot::Slot;
use crate::cards::CardId;

/// Rejected configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the game cannot run with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The TOML document could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A board operation whose precondition does not hold.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("{slot} is outside a table of {table_size} slots")]
    SlotOutOfRange { slot: Slot, table_size: usize },

    #[error("{card} is outside a deck of {deck_size} cards")]
    CardOutOfRange { card: CardId, deck_size: usize },

    #[error("{0} already holds {1}")]
    SlotOccupied(Slot, CardId),

    #[error("{0} is already on the table at {1}")]
    CardAlreadyPlaced(CardId, Slot),

    #[error("{0} holds no card")]
    SlotEmpty(Slot),
}

/// A key press rejected before it reaches the table.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("slot {slot} is outside a table of {table_size} slots")]
    InvalidSlot { slot: usize, table_size: usize },

    /// The bounded request queue is full; the press was dropped.
    #[error("{0} has too many pending key presses")]
    QueueFull(PlayerId),

    /// The player thread has terminated.
    #[error("{0} no longer accepts input")]
    Disconnected(PlayerId),
}

/// Failure to set up or run a game.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to spawn thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("thread {0} panicked")]
    ActorPanicked(String),
}
