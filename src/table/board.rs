//! The shared board.
//!
//! `Table` owns the slot/card mapping, every player's tokens, the post-check
//! status cells, the claim queue and the scores. All of it is reached only
//! through the operations below; each one is atomic with respect to the
//! invariants:
//!
//! - `slot_to_card` and `card_to_slot` are exact inverses
//! - a token `(player, slot)` exists only while `slot` holds a card
//! - a player holds at most `SET_SIZE` tokens
//!
//! Grid state lives behind one `parking_lot::Mutex`, held for the duration
//! of a single operation. The claim queue is a lock-free `SegQueue` (many
//! players push, only the dealer pops) and scores are atomics.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::queue::SegQueue;
use log::{trace, warn};
use parking_lot::Mutex;
use smallvec::SmallVec;

use super::status::PostCheckStatus;
use crate::cards::{CardId, Features, SetRules, SET_SIZE};
use crate::core::{GameConfig, PlayerId, PlayerMap, Slot, TableError};
use crate::ui::UserInterface;

/// Slots a player currently holds tokens on, in placement order.
pub type Tokens = SmallVec<[Slot; SET_SIZE]>;

/// Result of `Table::toggle_token`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenToggle {
    /// A token was placed; `tokens` is the player's new token count.
    Placed { tokens: usize },
    /// The player's token on the slot was removed.
    Removed { tokens: usize },
    /// Nothing changed: the slot is empty or out of range, or the player
    /// already holds a full claim.
    Ignored,
}

/// Snapshot of a live claim: the player's three tokens and the cards under them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claim {
    pub player: PlayerId,
    pub slots: [Slot; SET_SIZE],
    pub cards: [CardId; SET_SIZE],
}

/// A legal set currently on the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    /// Slots of the set, ascending.
    pub slots: [Slot; SET_SIZE],
    pub cards: [CardId; SET_SIZE],
    pub features: [Features; SET_SIZE],
}

#[derive(Debug)]
struct Grid {
    slot_to_card: Vec<Option<CardId>>,
    card_to_slot: Vec<Option<Slot>>,
    tokens: PlayerMap<Tokens>,
    status: PlayerMap<PostCheckStatus>,
}

/// The board shared by the dealer and every player.
pub struct Table {
    table_size: usize,
    deck_size: usize,
    delay: Duration,
    ui: Arc<dyn UserInterface>,
    grid: Mutex<Grid>,
    claims: SegQueue<PlayerId>,
    claim_tx: Sender<()>,
    claim_rx: Receiver<()>,
    verdict_signals: PlayerMap<(Sender<()>, Receiver<()>)>,
    scores: PlayerMap<AtomicU32>,
}

impl Table {
    /// Create an empty table for `config`.
    pub fn new(config: &GameConfig, ui: Arc<dyn UserInterface>) -> Self {
        Self::with_geometry(
            config.table_size,
            config.deck_size,
            config.player_count(),
            config.table_delay(),
            ui,
        )
    }

    /// Create an empty table with explicit geometry.
    pub fn with_geometry(
        table_size: usize,
        deck_size: usize,
        player_count: usize,
        delay: Duration,
        ui: Arc<dyn UserInterface>,
    ) -> Self {
        let (claim_tx, claim_rx) = channel::bounded(1);
        Self {
            table_size,
            deck_size,
            delay,
            ui,
            grid: Mutex::new(Grid {
                slot_to_card: vec![None; table_size],
                card_to_slot: vec![None; deck_size],
                tokens: PlayerMap::with_default(player_count),
                status: PlayerMap::with_default(player_count),
            }),
            claims: SegQueue::new(),
            claim_tx,
            claim_rx,
            verdict_signals: PlayerMap::new(player_count, |_| channel::bounded(1)),
            scores: PlayerMap::new(player_count, |_| AtomicU32::new(0)),
        }
    }

    #[must_use]
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.scores.player_count()
    }

    // === Cards ===

    /// Place `card` on the empty `slot`.
    ///
    /// Sleeps for the configured table delay before touching the grid.
    pub fn place_card(&self, card: CardId, slot: Slot) -> Result<(), TableError> {
        self.check_slot(slot)?;
        if card.index() >= self.deck_size {
            return Err(TableError::CardOutOfRange {
                card,
                deck_size: self.deck_size,
            });
        }
        self.simulate_delay();

        let mut grid = self.grid.lock();
        if let Some(existing) = grid.slot_to_card[slot.index()] {
            return Err(TableError::SlotOccupied(slot, existing));
        }
        if let Some(at) = grid.card_to_slot[card.index()] {
            return Err(TableError::CardAlreadyPlaced(card, at));
        }
        grid.slot_to_card[slot.index()] = Some(card);
        grid.card_to_slot[card.index()] = Some(slot);
        self.ui.place_card(card, slot);
        Ok(())
    }

    /// Remove the card on `slot`, together with every token pointing at it.
    pub fn remove_card(&self, slot: Slot) -> Result<CardId, TableError> {
        self.check_slot(slot)?;
        self.simulate_delay();

        let mut grid = self.grid.lock();
        let card = grid.slot_to_card[slot.index()]
            .take()
            .ok_or(TableError::SlotEmpty(slot))?;
        grid.card_to_slot[card.index()] = None;
        self.ui.remove_card(slot);

        for player in PlayerId::all(grid.tokens.player_count()) {
            let tokens = &mut grid.tokens[player];
            if let Some(pos) = tokens.iter().position(|&s| s == slot) {
                tokens.remove(pos);
                self.ui.remove_token(player, slot);
            }
        }
        Ok(card)
    }

    /// Card on `slot`, if any.
    #[must_use]
    pub fn card_at(&self, slot: Slot) -> Option<CardId> {
        self.grid.lock().slot_to_card.get(slot.index()).copied().flatten()
    }

    /// Slot holding `card`, if it is on the table.
    #[must_use]
    pub fn slot_of(&self, card: CardId) -> Option<Slot> {
        self.grid.lock().card_to_slot.get(card.index()).copied().flatten()
    }

    /// Number of cards on the table.
    #[must_use]
    pub fn count_cards(&self) -> usize {
        self.grid.lock().slot_to_card.iter().flatten().count()
    }

    /// Cards on the table in slot order.
    #[must_use]
    pub fn cards(&self) -> Vec<CardId> {
        self.grid.lock().slot_to_card.iter().flatten().copied().collect()
    }

    /// Snapshot of the unoccupied slots, ascending.
    #[must_use]
    pub fn empty_slots(&self) -> Vec<Slot> {
        let grid = self.grid.lock();
        Slot::all(self.table_size)
            .filter(|slot| grid.slot_to_card[slot.index()].is_none())
            .collect()
    }

    /// Every legal set among the cards on the table.
    pub fn hints(&self, rules: &dyn SetRules) -> Vec<Hint> {
        let (cards, positions): (Vec<CardId>, Vec<(CardId, Slot)>) = {
            let grid = self.grid.lock();
            let placed: Vec<(CardId, Slot)> = Slot::all(self.table_size)
                .filter_map(|slot| grid.slot_to_card[slot.index()].map(|card| (card, slot)))
                .collect();
            (placed.iter().map(|&(card, _)| card).collect(), placed)
        };
        let slot_of = |card: CardId| {
            positions
                .iter()
                .find_map(|&(c, slot)| (c == card).then_some(slot))
        };

        rules
            .find_sets(&cards, usize::MAX)
            .into_iter()
            .filter_map(|set| {
                let mut slots = [slot_of(set[0])?, slot_of(set[1])?, slot_of(set[2])?];
                slots.sort_unstable();
                Some(Hint {
                    slots,
                    cards: set,
                    features: set.map(|card| rules.card_features(card)),
                })
            })
            .collect()
    }

    // === Tokens ===

    /// Place or remove `player`'s token on `slot` in one step.
    ///
    /// Removes the token if the player holds one there; otherwise places one
    /// if the slot holds a card and the player holds fewer than `SET_SIZE`.
    pub fn toggle_token(&self, player: PlayerId, slot: Slot) -> TokenToggle {
        if slot.index() >= self.table_size {
            warn!("{player} toggled {slot} outside a table of {} slots", self.table_size);
            return TokenToggle::Ignored;
        }

        let mut grid = self.grid.lock();
        let occupied = grid.slot_to_card[slot.index()].is_some();
        let tokens = &mut grid.tokens[player];

        if let Some(pos) = tokens.iter().position(|&s| s == slot) {
            tokens.remove(pos);
            let remaining = tokens.len();
            self.ui.remove_token(player, slot);
            TokenToggle::Removed { tokens: remaining }
        } else if occupied && tokens.len() < SET_SIZE {
            tokens.push(slot);
            let count = tokens.len();
            self.ui.place_token(player, slot);
            TokenToggle::Placed { tokens: count }
        } else {
            TokenToggle::Ignored
        }
    }

    /// Number of tokens `player` holds.
    #[must_use]
    pub fn token_count(&self, player: PlayerId) -> usize {
        self.grid.lock().tokens[player].len()
    }

    /// Slots `player` holds tokens on.
    #[must_use]
    pub fn tokens(&self, player: PlayerId) -> Tokens {
        self.grid.lock().tokens[player].clone()
    }

    /// Remove every token `player` holds; returns how many were removed.
    pub fn clear_player_tokens(&self, player: PlayerId) -> usize {
        let mut grid = self.grid.lock();
        let cleared = std::mem::take(&mut grid.tokens[player]);
        for &slot in &cleared {
            self.ui.remove_token(player, slot);
        }
        cleared.len()
    }

    // === Claims ===

    /// Queue `player` for a check and signal the dealer.
    ///
    /// Duplicates are not filtered: the dealer drops any claim whose player
    /// no longer holds a full set of tokens when it is dequeued.
    pub fn enqueue_claim(&self, player: PlayerId) {
        self.claims.push(player);
        // a pending signal already covers this claim
        let _ = self.claim_tx.try_send(());
    }

    /// Oldest queued claim, if any.
    pub fn dequeue_claim(&self) -> Option<PlayerId> {
        self.claims.pop()
    }

    #[must_use]
    pub fn pending_claims(&self) -> usize {
        self.claims.len()
    }

    /// Block until a claim is signalled or `timeout` elapses.
    ///
    /// Returns `true` if woken by a claim.
    pub fn wait_for_claim(&self, timeout: Duration) -> bool {
        self.claim_rx.recv_timeout(timeout).is_ok()
    }

    /// The player's current claim, if it holds exactly `SET_SIZE` tokens.
    #[must_use]
    pub fn claim(&self, player: PlayerId) -> Option<Claim> {
        let grid = self.grid.lock();
        let tokens = &grid.tokens[player];
        if tokens.len() != SET_SIZE {
            trace!("{player} holds {} tokens, no live claim", tokens.len());
            return None;
        }
        let slots = [tokens[0], tokens[1], tokens[2]];
        let card = |slot: Slot| grid.slot_to_card[slot.index()];
        Some(Claim {
            player,
            slots,
            cards: [card(slots[0])?, card(slots[1])?, card(slots[2])?],
        })
    }

    // === Verdicts ===

    /// Write the dealer's verdict for `player`.
    pub fn set_status(&self, player: PlayerId, status: PostCheckStatus) {
        self.grid.lock().status[player] = status;
    }

    /// Read `player`'s status and reset it to `None`.
    pub fn take_status(&self, player: PlayerId) -> PostCheckStatus {
        std::mem::take(&mut self.grid.lock().status[player])
    }

    /// Read `player`'s status without consuming it.
    #[must_use]
    pub fn status(&self, player: PlayerId) -> PostCheckStatus {
        self.grid.lock().status[player]
    }

    /// Signal every player to re-check its status.
    ///
    /// Each player has a single-slot signal; a player that has not consumed
    /// the previous signal is not signalled twice.
    pub fn wake_all(&self) {
        for (tx, _) in self.verdict_signals.values() {
            let _ = tx.try_send(());
        }
    }

    /// Receiving end of `player`'s verdict signal.
    #[must_use]
    pub fn verdict_signal(&self, player: PlayerId) -> Receiver<()> {
        self.verdict_signals[player].1.clone()
    }

    // === Scores ===

    /// Add a point to `player`; returns the new score.
    pub fn award_point(&self, player: PlayerId) -> u32 {
        self.scores[player].fetch_add(1, Ordering::AcqRel) + 1
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores[player].load(Ordering::Acquire)
    }

    /// Every player's score.
    #[must_use]
    pub fn scores(&self) -> PlayerMap<u32> {
        PlayerMap::new(self.player_count(), |player| self.score(player))
    }

    fn check_slot(&self, slot: Slot) -> Result<(), TableError> {
        if slot.index() < self.table_size {
            Ok(())
        } else {
            Err(TableError::SlotOutOfRange {
                slot,
                table_size: self.table_size,
            })
        }
    }

    fn simulate_delay(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("table_size", &self.table_size)
            .field("deck_size", &self.deck_size)
            .field("grid", &*self.grid.lock())
            .field("pending_claims", &self.claims.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::StandardSet;
    use crate::ui::{NullUi, RecordingUi, UiEvent};

    fn table(players: usize) -> Table {
        Table::with_geometry(12, 81, players, Duration::ZERO, Arc::new(NullUi))
    }

    fn deal(table: &Table, cards: &[u32]) {
        for (i, &card) in cards.iter().enumerate() {
            table.place_card(CardId(card), Slot(i as u16)).unwrap();
        }
    }

    #[test]
    fn test_place_and_remove_are_inverse() {
        let table = table(1);
        table.place_card(CardId(7), Slot(3)).unwrap();

        assert_eq!(table.card_at(Slot(3)), Some(CardId(7)));
        assert_eq!(table.slot_of(CardId(7)), Some(Slot(3)));
        assert_eq!(table.count_cards(), 1);

        assert_eq!(table.remove_card(Slot(3)), Ok(CardId(7)));
        assert_eq!(table.card_at(Slot(3)), None);
        assert_eq!(table.slot_of(CardId(7)), None);
        assert_eq!(table.empty_slots().len(), 12);
    }

    #[test]
    fn test_place_preconditions() {
        let table = table(1);
        table.place_card(CardId(1), Slot(0)).unwrap();

        assert_eq!(
            table.place_card(CardId(2), Slot(0)),
            Err(TableError::SlotOccupied(Slot(0), CardId(1)))
        );
        assert_eq!(
            table.place_card(CardId(1), Slot(1)),
            Err(TableError::CardAlreadyPlaced(CardId(1), Slot(0)))
        );
        assert!(matches!(
            table.place_card(CardId(1), Slot(12)),
            Err(TableError::SlotOutOfRange { .. })
        ));
        assert!(matches!(
            table.place_card(CardId(81), Slot(2)),
            Err(TableError::CardOutOfRange { .. })
        ));
        assert_eq!(table.remove_card(Slot(5)), Err(TableError::SlotEmpty(Slot(5))));
    }

    #[test]
    fn test_toggle_places_then_removes() {
        let table = table(2);
        deal(&table, &[0, 1, 2]);
        let p = PlayerId(0);

        assert_eq!(table.toggle_token(p, Slot(1)), TokenToggle::Placed { tokens: 1 });
        assert_eq!(table.toggle_token(p, Slot(1)), TokenToggle::Removed { tokens: 0 });
        assert_eq!(table.token_count(p), 0);
    }

    #[test]
    fn test_toggle_ignores_empty_and_out_of_range_slots() {
        let table = table(1);
        deal(&table, &[0]);
        let p = PlayerId(0);

        assert_eq!(table.toggle_token(p, Slot(4)), TokenToggle::Ignored);
        assert_eq!(table.toggle_token(p, Slot(40)), TokenToggle::Ignored);
        assert_eq!(table.token_count(p), 0);
    }

    #[test]
    fn test_toggle_caps_at_three_tokens() {
        let table = table(1);
        deal(&table, &[0, 1, 2, 3]);
        let p = PlayerId(0);
        for slot in 0..3 {
            table.toggle_token(p, Slot(slot));
        }

        assert_eq!(table.toggle_token(p, Slot(3)), TokenToggle::Ignored);
        assert_eq!(table.token_count(p), 3);
        // withdrawing still works at the cap
        assert_eq!(table.toggle_token(p, Slot(0)), TokenToggle::Removed { tokens: 2 });
    }

    #[test]
    fn test_remove_card_drops_every_players_token() {
        let ui = Arc::new(RecordingUi::new());
        let table = Table::with_geometry(12, 81, 3, Duration::ZERO, ui.clone());
        deal(&table, &[5, 6]);
        table.toggle_token(PlayerId(0), Slot(0));
        table.toggle_token(PlayerId(2), Slot(0));
        table.toggle_token(PlayerId(2), Slot(1));

        table.remove_card(Slot(0)).unwrap();

        assert_eq!(table.token_count(PlayerId(0)), 0);
        assert_eq!(table.tokens(PlayerId(2)).as_slice(), &[Slot(1)]);
        assert_eq!(ui.count(|e| *e == UiEvent::TokenRemoved(PlayerId(0), Slot(0))), 1);
        assert_eq!(ui.count(|e| *e == UiEvent::TokenRemoved(PlayerId(2), Slot(0))), 1);
        assert_eq!(ui.count(|e| matches!(e, UiEvent::TokenRemoved(PlayerId(1), _))), 0);
    }

    #[test]
    fn test_clear_player_tokens() {
        let table = table(2);
        deal(&table, &[0, 1, 2]);
        for slot in 0..3 {
            table.toggle_token(PlayerId(1), Slot(slot));
        }
        table.toggle_token(PlayerId(0), Slot(2));

        assert_eq!(table.clear_player_tokens(PlayerId(1)), 3);
        assert_eq!(table.token_count(PlayerId(1)), 0);
        assert_eq!(table.token_count(PlayerId(0)), 1);
    }

    #[test]
    fn test_claims_are_fifo() {
        let table = table(3);
        table.enqueue_claim(PlayerId(2));
        table.enqueue_claim(PlayerId(0));
        table.enqueue_claim(PlayerId(2));

        assert_eq!(table.pending_claims(), 3);
        assert_eq!(table.dequeue_claim(), Some(PlayerId(2)));
        assert_eq!(table.dequeue_claim(), Some(PlayerId(0)));
        assert_eq!(table.dequeue_claim(), Some(PlayerId(2)));
        assert_eq!(table.dequeue_claim(), None);
    }

    #[test]
    fn test_claim_signal_wakes_waiter() {
        let table = table(1);
        assert!(!table.wait_for_claim(Duration::from_millis(1)));
        table.enqueue_claim(PlayerId(0));
        table.enqueue_claim(PlayerId(0));
        assert!(table.wait_for_claim(Duration::from_millis(1)));
        // one signal covers both claims
        assert!(!table.wait_for_claim(Duration::from_millis(1)));
    }

    #[test]
    fn test_claim_snapshot_requires_three_tokens() {
        let table = table(1);
        deal(&table, &[10, 11, 12]);
        let p = PlayerId(0);
        table.toggle_token(p, Slot(2));
        table.toggle_token(p, Slot(0));
        assert_eq!(table.claim(p), None);

        table.toggle_token(p, Slot(1));
        let claim = table.claim(p).unwrap();
        assert_eq!(claim.slots, [Slot(2), Slot(0), Slot(1)]);
        assert_eq!(claim.cards, [CardId(12), CardId(10), CardId(11)]);
    }

    #[test]
    fn test_take_status_resets() {
        let table = table(2);
        table.set_status(PlayerId(1), PostCheckStatus::Penalty);

        assert_eq!(table.status(PlayerId(1)), PostCheckStatus::Penalty);
        assert_eq!(table.take_status(PlayerId(1)), PostCheckStatus::Penalty);
        assert_eq!(table.take_status(PlayerId(1)), PostCheckStatus::None);
        assert!(table.status(PlayerId(0)).is_none());
    }

    #[test]
    fn test_wake_all_is_single_slot() {
        let table = table(2);
        let signal = table.verdict_signal(PlayerId(1));
        table.wake_all();
        table.wake_all();

        assert!(signal.try_recv().is_ok());
        assert!(signal.try_recv().is_err());
    }

    #[test]
    fn test_scores() {
        let table = table(3);
        assert_eq!(table.award_point(PlayerId(1)), 1);
        assert_eq!(table.award_point(PlayerId(1)), 2);
        let scores = table.scores();
        assert_eq!(scores[PlayerId(0)], 0);
        assert_eq!(scores[PlayerId(1)], 2);
    }

    #[test]
    fn test_hints_report_sorted_slots() {
        let table = table(1);
        // cards 0, 1, 2 form a set; 4 breaks every other triple
        table.place_card(CardId(2), Slot(0)).unwrap();
        table.place_card(CardId(4), Slot(1)).unwrap();
        table.place_card(CardId(0), Slot(5)).unwrap();
        table.place_card(CardId(1), Slot(3)).unwrap();

        let hints = table.hints(&StandardSet::default());
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].slots, [Slot(0), Slot(3), Slot(5)]);
        assert_eq!(hints[0].features[0].len(), 4);
    }
}
