//! Game configuration.
//!
//! A `GameConfig` fixes the board geometry, the card universe, the seating
//! and every timing value that drives the protocol. Games build one with the
//! `with_*` methods or load it from TOML:
//!
//! ```
//! use rust_set::core::GameConfig;
//!
//! let config = GameConfig::from_toml_str(
//!     r#"
//!     human_players = 0
//!     computer_players = 3
//!     turn_timeout_millis = 30000
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.player_count(), 3);
//! assert_eq!(config.table_size, 12);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::player::{PlayerId, MAX_PLAYERS};

/// Complete game configuration.
///
/// Player ids `0..human_players` are human, the remaining
/// `computer_players` seats are driven by a random key generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of slots on the table.
    pub table_size: usize,

    /// Number of cards in the game; cards are ids `0..deck_size`.
    pub deck_size: usize,

    /// Features per card.
    pub feature_count: usize,

    /// Distinct values per feature.
    pub feature_size: u32,

    /// Seats filled by keyboard input.
    pub human_players: usize,

    /// Seats filled by generated input.
    pub computer_players: usize,

    /// Round length; the table is collected and redealt when it runs out.
    pub turn_timeout_millis: u64,

    /// Remaining time below which the countdown is shown as a warning.
    pub turn_timeout_warning_millis: u64,

    /// Delay applied to every card placement and removal.
    pub table_delay_millis: u64,

    /// Freeze after a point.
    pub point_freeze_millis: u64,

    /// Freeze after a penalty.
    pub penalty_freeze_millis: u64,

    /// Step of the visible freeze countdown.
    pub freeze_tick_millis: u64,

    /// Dealer polling interval.
    pub poll_interval_millis: u64,

    /// Log every legal set on the table after each deal.
    pub hints: bool,

    /// Seed for shuffles and generated input. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table_size: 12,
            deck_size: 81,
            feature_count: 4,
            feature_size: 3,
            human_players: 2,
            computer_players: 2,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            table_delay_millis: 100,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            freeze_tick_millis: 1_000,
            poll_interval_millis: 10,
            hints: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse a TOML document and validate the result.
    ///
    /// Missing keys take their default value.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let players = self.player_count();
        if players == 0 {
            return Err(ConfigError::invalid("players", "at least one player is required"));
        }
        if players > MAX_PLAYERS {
            return Err(ConfigError::invalid(
                "players",
                format!("{players} players exceed the limit of {MAX_PLAYERS}"),
            ));
        }
        if self.table_size < 3 || self.table_size > usize::from(u16::MAX) {
            return Err(ConfigError::invalid(
                "table_size",
                format!("{} slots cannot hold a set", self.table_size),
            ));
        }
        if self.feature_size < 2 {
            return Err(ConfigError::invalid("feature_size", "must be at least 2"));
        }
        if self.feature_count == 0 {
            return Err(ConfigError::invalid("feature_count", "must be at least 1"));
        }
        match self.card_universe() {
            Some(universe) if self.deck_size >= 1 && self.deck_size <= universe => {}
            Some(universe) => {
                return Err(ConfigError::invalid(
                    "deck_size",
                    format!("{} is outside 1..={universe}", self.deck_size),
                ))
            }
            None => {
                return Err(ConfigError::invalid(
                    "feature_count",
                    "card universe does not fit in 32 bits",
                ))
            }
        }
        if self.poll_interval_millis == 0 {
            return Err(ConfigError::invalid("poll_interval_millis", "must be positive"));
        }
        if self.freeze_tick_millis == 0 {
            return Err(ConfigError::invalid("freeze_tick_millis", "must be positive"));
        }
        if self.turn_timeout_warning_millis > self.turn_timeout_millis {
            return Err(ConfigError::invalid(
                "turn_timeout_warning_millis",
                "warning threshold exceeds the turn timeout",
            ));
        }
        Ok(())
    }

    /// Number of distinct cards `feature_size ^ feature_count`, if it fits.
    #[must_use]
    pub fn card_universe(&self) -> Option<usize> {
        let exp = u32::try_from(self.feature_count).ok()?;
        let universe = self.feature_size.checked_pow(exp)?;
        usize::try_from(universe).ok()
    }

    /// Total number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.human_players + self.computer_players
    }

    /// Whether `player` reads keyboard input.
    #[must_use]
    pub fn is_human(&self, player: PlayerId) -> bool {
        player.index() < self.human_players
    }

    #[must_use]
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    #[must_use]
    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    #[must_use]
    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_millis)
    }

    #[must_use]
    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    #[must_use]
    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    #[must_use]
    pub fn freeze_tick(&self) -> Duration {
        Duration::from_millis(self.freeze_tick_millis)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    /// Set the seating.
    #[must_use]
    pub fn with_players(mut self, human: usize, computer: usize) -> Self {
        self.human_players = human;
        self.computer_players = computer;
        self
    }

    /// Set the board and deck geometry.
    #[must_use]
    pub fn with_geometry(mut self, table_size: usize, deck_size: usize) -> Self {
        self.table_size = table_size;
        self.deck_size = deck_size;
        self
    }

    /// Set the card features.
    #[must_use]
    pub fn with_features(mut self, feature_count: usize, feature_size: u32) -> Self {
        self.feature_count = feature_count;
        self.feature_size = feature_size;
        self
    }

    /// Set the round countdown and its warning threshold.
    #[must_use]
    pub fn with_turn_timeout(mut self, timeout: Duration, warning: Duration) -> Self {
        self.turn_timeout_millis = as_millis(timeout);
        self.turn_timeout_warning_millis = as_millis(warning);
        self
    }

    /// Set the per-operation board delay.
    #[must_use]
    pub fn with_table_delay(mut self, delay: Duration) -> Self {
        self.table_delay_millis = as_millis(delay);
        self
    }

    /// Set the point and penalty freezes and the countdown step.
    #[must_use]
    pub fn with_freezes(mut self, point: Duration, penalty: Duration, tick: Duration) -> Self {
        self.point_freeze_millis = as_millis(point);
        self.penalty_freeze_millis = as_millis(penalty);
        self.freeze_tick_millis = as_millis(tick);
        self
    }

    /// Set the dealer polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_millis = as_millis(interval);
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: bool) -> Self {
        self.hints = hints;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
