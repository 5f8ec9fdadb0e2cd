//! Presentation sink.
//!
//! The table, the players and the dealer report every visible change through
//! `UserInterface`. Notifications are fire-and-forget: implementations must
//! return promptly and must not call back into the table, since the table
//! notifies while holding its grid lock so that the display sees changes in
//! the order they were made.

mod recorder;

pub use recorder::{RecordingUi, UiEvent};

use std::time::Duration;

use log::{debug, info};

use crate::cards::CardId;
use crate::core::{PlayerId, Slot};

/// Receiver of table, player and dealer notifications.
///
/// Every method defaults to a no-op.
pub trait UserInterface: Send + Sync {
    fn place_card(&self, _card: CardId, _slot: Slot) {}

    fn remove_card(&self, _slot: Slot) {}

    fn place_token(&self, _player: PlayerId, _slot: Slot) {}

    fn remove_token(&self, _player: PlayerId, _slot: Slot) {}

    fn set_score(&self, _player: PlayerId, _score: u32) {}

    /// Remaining freeze of a player; zero when the freeze is over.
    fn set_freeze(&self, _player: PlayerId, _remaining: Duration) {}

    /// Remaining round time; `warn` once it drops under the warning threshold.
    fn set_countdown(&self, _remaining: Duration, _warn: bool) {}

    fn announce_winners(&self, _winners: &[PlayerId]) {}
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullUi;

impl UserInterface for NullUi {}

/// Renders notifications through the `log` facade.
///
/// Board changes are logged at debug level, scores and winners at info.
/// Countdown updates arrive once per poll and are only logged when the
/// displayed second changes.
#[derive(Debug, Default)]
pub struct LogUi {
    last_second: parking_lot::Mutex<Option<u64>>,
}

impl LogUi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserInterface for LogUi {
    fn place_card(&self, card: CardId, slot: Slot) {
        debug!("{card} placed at {slot}");
    }

    fn remove_card(&self, slot: Slot) {
        debug!("card removed from {slot}");
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        debug!("{player} token on {slot}");
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        debug!("{player} token off {slot}");
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        info!("{player} score {score}");
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        if remaining.is_zero() {
            debug!("{player} unfrozen");
        } else {
            debug!("{player} frozen for {}ms", remaining.as_millis());
        }
    }

    fn set_countdown(&self, remaining: Duration, warn: bool) {
        let second = remaining.as_secs();
        let mut last = self.last_second.lock();
        if *last != Some(second) {
            *last = Some(second);
            if warn {
                info!("countdown {}ms", remaining.as_millis());
            } else {
                debug!("countdown {second}s");
            }
        }
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        let names: Vec<String> = winners.iter().map(ToString::to_string).collect();
        info!("winners: {}", names.join(", "));
    }
}
