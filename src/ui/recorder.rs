//! A sink that keeps every notification, for tests and replays.

use std::time::Duration;

use parking_lot::Mutex;

use super::UserInterface;
use crate::cards::CardId;
use crate::core::{PlayerId, Slot};

/// One recorded notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    CardPlaced(CardId, Slot),
    CardRemoved(Slot),
    TokenPlaced(PlayerId, Slot),
    TokenRemoved(PlayerId, Slot),
    Score(PlayerId, u32),
    Freeze(PlayerId, Duration),
    Countdown(Duration, bool),
    Winners(Vec<PlayerId>),
}

/// Records notifications in arrival order.
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Recorded freeze updates of one player, in order.
    #[must_use]
    pub fn freezes(&self, player: PlayerId) -> Vec<Duration> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                UiEvent::Freeze(p, remaining) if *p == player => Some(*remaining),
                _ => None,
            })
            .collect()
    }

    /// The last winners announcement, if any.
    #[must_use]
    pub fn winners(&self) -> Option<Vec<PlayerId>> {
        self.events.lock().iter().rev().find_map(|event| match event {
            UiEvent::Winners(winners) => Some(winners.clone()),
            _ => None,
        })
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&UiEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

impl UserInterface for RecordingUi {
    fn place_card(&self, card: CardId, slot: Slot) {
        self.push(UiEvent::CardPlaced(card, slot));
    }

    fn remove_card(&self, slot: Slot) {
        self.push(UiEvent::CardRemoved(slot));
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        self.push(UiEvent::TokenPlaced(player, slot));
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        self.push(UiEvent::TokenRemoved(player, slot));
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.push(UiEvent::Score(player, score));
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        self.push(UiEvent::Freeze(player, remaining));
    }

    fn set_countdown(&self, remaining: Duration, warn: bool) {
        self.push(UiEvent::Countdown(remaining, warn));
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        self.push(UiEvent::Winners(winners.to_vec()));
    }
}
