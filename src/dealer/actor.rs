//! The dealer thread and its round controller.
//!
//! ## Round
//!
//! 1. Deal: fill every empty slot, in random order, from the shuffled deck.
//! 2. Poll until the countdown expires. Each cycle validates at most one
//!    live claim, wakes every player, clears a matched set and deals again.
//! 3. Collect: return every card on the table to the deck.
//!
//! Rounds repeat until the deck holds no legal set or termination is
//! requested; then every player is stopped and joined in seat order and the
//! winners are announced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use super::countdown::Countdown;
use crate::cards::{CardId, SetRules};
use crate::core::{GameConfig, GameError, GameRng, PlayerId, PlayerMap, Slot};
use crate::player::{Player, PlayerHandle};
use crate::table::{Claim, PostCheckStatus, Table};
use crate::ui::UserInterface;

/// Shared flag requesting the game to end.
#[derive(Clone, Debug, Default)]
pub struct Terminator(Arc<AtomicBool>);

impl Terminator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination; the dealer notices on its next poll.
    pub fn terminate(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Every player whose score equals the maximum.
///
/// ```
/// use rust_set::core::{PlayerId, PlayerMap};
/// use rust_set::dealer::winners;
///
/// let scores = PlayerMap::new(4, |p| [3, 5, 5, 2][p.index()]);
/// assert_eq!(winners(&scores), vec![PlayerId::new(1), PlayerId::new(2)]);
/// ```
#[must_use]
pub fn winners(scores: &PlayerMap<u32>) -> Vec<PlayerId> {
    let best = scores.values().copied().max().unwrap_or(0);
    scores
        .iter()
        .filter(|&(_, &score)| score == best)
        .map(|(player, _)| player)
        .collect()
}

/// The dealer: owns the deck and drives rounds on the shared table.
pub struct Dealer {
    table: Arc<Table>,
    ui: Arc<dyn UserInterface>,
    rules: Arc<dyn SetRules>,
    players: Vec<Player>,
    handles: Vec<PlayerHandle>,
    deck: Vec<CardId>,
    rng: GameRng,
    countdown: Countdown,
    poll_interval: Duration,
    hints: bool,
    terminator: Terminator,
    /// A validated set whose cards leave the game on the next maintenance step.
    pending_removal: Option<Claim>,
}

impl Dealer {
    /// Create a dealer holding the full deck of `config`.
    ///
    /// `players` are started when the dealer runs.
    pub fn new(
        config: &GameConfig,
        table: Arc<Table>,
        ui: Arc<dyn UserInterface>,
        rules: Arc<dyn SetRules>,
        players: Vec<Player>,
        rng: GameRng,
    ) -> Self {
        Self {
            table,
            ui,
            rules,
            players,
            handles: Vec::new(),
            deck: CardId::deck(config.deck_size).collect(),
            rng,
            countdown: Countdown::new(config.turn_timeout(), config.turn_timeout_warning()),
            poll_interval: config.poll_interval(),
            hints: config.hints,
            terminator: Terminator::new(),
            pending_removal: None,
        }
    }

    /// Replace the deck.
    #[must_use]
    pub fn with_deck(mut self, deck: Vec<CardId>) -> Self {
        self.deck = deck;
        self
    }

    /// Handle for requesting termination from another thread.
    #[must_use]
    pub fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }

    /// Cards not on the table and not yet won.
    #[must_use]
    pub fn deck(&self) -> &[CardId] {
        &self.deck
    }

    /// Run the dealer on its own thread named `dealer`.
    pub fn spawn(self) -> Result<JoinHandle<Result<Vec<PlayerId>, GameError>>, GameError> {
        let name = "dealer".to_string();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || self.run())
            .map_err(|source| GameError::Spawn { name, source })
    }

    /// Run the game to completion on the calling thread; returns the winners.
    pub fn run(mut self) -> Result<Vec<PlayerId>, GameError> {
        info!("thread dealer starting.");

        let played = self.start_players().and_then(|()| {
            self.update_timer_display(true);
            self.play()
        });
        let stopped = self.stop_players();
        played?;
        stopped?;

        let winners = self.announce_winners();
        info!("thread dealer terminated.");
        Ok(winners)
    }

    fn start_players(&mut self) -> Result<(), GameError> {
        for player in std::mem::take(&mut self.players) {
            self.handles.push(player.spawn()?);
        }
        Ok(())
    }

    /// Signal and join every player, in seat order.
    fn stop_players(&mut self) -> Result<(), GameError> {
        let mut result = Ok(());
        for handle in &mut self.handles {
            handle.terminate();
            if let Err(err) = handle.join() {
                result = result.and(Err(err));
            }
        }
        self.handles.clear();
        result
    }

    fn play(&mut self) -> Result<(), GameError> {
        while !self.should_finish() {
            info!("dealing, {} cards left in the deck", self.deck.len());
            self.place_cards_on_table()?;
            self.timer_loop()?;
            self.update_timer_display(true);
            self.remove_all_cards_from_table()?;
        }
        Ok(())
    }

    /// Whether the game is over: terminated, or no set left in the deck.
    fn should_finish(&self) -> bool {
        self.terminator.is_terminated() || self.rules.find_sets(&self.deck, 1).is_empty()
    }

    fn timer_loop(&mut self) -> Result<(), GameError> {
        while !self.terminator.is_terminated() && !self.countdown.expired(Instant::now()) {
            self.poll_cycle()?;
        }
        Ok(())
    }

    /// One dealer tick.
    fn poll_cycle(&mut self) -> Result<(), GameError> {
        self.table.wait_for_claim(self.poll_interval);
        self.update_timer_display(false);
        self.check_next_claim();
        self.table.wake_all();
        self.remove_claimed_cards()?;
        self.place_cards_on_table()
    }

    /// Validate the oldest live claim, dropping stale ones before it.
    fn check_next_claim(&mut self) -> Option<PostCheckStatus> {
        while let Some(player) = self.table.dequeue_claim() {
            match self.table.claim(player) {
                Some(claim) => return Some(self.check_set(claim)),
                None => trace!("dropping stale claim of {player}"),
            }
        }
        None
    }

    fn check_set(&mut self, claim: Claim) -> PostCheckStatus {
        if self.rules.is_legal_set(claim.cards) {
            debug!("{} found a set at {:?}", claim.player, claim.slots);
            self.table.set_status(claim.player, PostCheckStatus::Point);
            self.pending_removal = Some(claim);
            PostCheckStatus::Point
        } else {
            debug!("{} claimed a non-set at {:?}", claim.player, claim.slots);
            self.table.set_status(claim.player, PostCheckStatus::Penalty);
            self.table.clear_player_tokens(claim.player);
            PostCheckStatus::Penalty
        }
    }

    /// Retire the cards of the last validated set and restart the countdown.
    fn remove_claimed_cards(&mut self) -> Result<(), GameError> {
        if let Some(claim) = self.pending_removal.take() {
            for slot in claim.slots {
                self.table.remove_card(slot)?;
            }
            self.update_timer_display(true);
        }
        Ok(())
    }

    fn place_cards_on_table(&mut self) -> Result<(), GameError> {
        let mut empty = self.table.empty_slots();
        if empty.is_empty() || self.deck.is_empty() {
            return Ok(());
        }
        self.rng.shuffle(&mut empty);
        self.rng.shuffle(&mut self.deck);

        let mut placed = 0;
        for slot in empty {
            let Some(card) = self.deck.pop() else {
                break;
            };
            if let Err(err) = self.table.place_card(card, slot) {
                self.deck.push(card);
                return Err(err.into());
            }
            placed += 1;
        }

        if self.hints && placed > 0 {
            self.log_hints();
        }
        Ok(())
    }

    fn remove_all_cards_from_table(&mut self) -> Result<(), GameError> {
        let mut slots: Vec<Slot> = Slot::all(self.table.table_size()).collect();
        self.rng.shuffle(&mut slots);
        for slot in slots {
            if self.table.card_at(slot).is_some() {
                let card = self.table.remove_card(slot)?;
                self.deck.push(card);
            }
        }
        debug!("table collected, {} cards in the deck", self.deck.len());
        Ok(())
    }

    fn update_timer_display(&mut self, reset: bool) {
        let now = Instant::now();
        if reset {
            self.countdown.reset(now);
            self.ui.set_countdown(self.countdown.duration(), false);
        } else {
            self.ui
                .set_countdown(self.countdown.remaining(now), self.countdown.is_warning(now));
        }
    }

    fn log_hints(&self) {
        for hint in self.table.hints(self.rules.as_ref()) {
            info!("hint: set at slots {:?} features {:?}", hint.slots, hint.features);
        }
    }

    fn announce_winners(&self) -> Vec<PlayerId> {
        let scores = self.table.scores();
        let winners = winners(&scores);
        info!("game over, scores {:?}", scores.values().collect::<Vec<_>>());
        self.ui.announce_winners(&winners);
        winners
    }
}
