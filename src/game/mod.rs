//! Game assembly.
//!
//! `Game` wires a validated `GameConfig` into a table, one player actor per
//! seat and a dealer, and hands out the `KeyInput` of every seat so human
//! presses can be delivered from outside.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rust_set::{Game, GameConfig, LogUi};
//!
//! let config = GameConfig::default().with_players(0, 4);
//! let game = Game::new(config, Arc::new(LogUi::new())).unwrap();
//! let winners = game.run().unwrap();
//! println!("{winners:?}");
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;

use log::info;

use crate::cards::{SetRules, StandardSet};
use crate::core::{GameConfig, GameError, GameRng, PlayerId, PlayerMap};
use crate::dealer::{Dealer, Terminator};
use crate::player::{FreezeTiming, KeyInput, Player};
use crate::table::Table;
use crate::ui::UserInterface;

/// A game that has been set up but not started.
pub struct Game {
    config: GameConfig,
    table: Arc<Table>,
    dealer: Dealer,
    inputs: PlayerMap<KeyInput>,
    terminator: Terminator,
}

impl Game {
    /// Set up a game with the standard rules for the configured features.
    pub fn new(config: GameConfig, ui: Arc<dyn UserInterface>) -> Result<Self, GameError> {
        config.validate()?;
        let rules = Arc::new(StandardSet::from_config(&config));
        Self::with_rules(config, ui, rules)
    }

    /// Set up a game with custom set rules.
    pub fn with_rules(
        config: GameConfig,
        ui: Arc<dyn UserInterface>,
        rules: Arc<dyn SetRules>,
    ) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        info!(
            "setting up {} human and {} computer players, seed {}",
            config.human_players,
            config.computer_players,
            rng.seed()
        );

        let table = Arc::new(Table::new(&config, Arc::clone(&ui)));
        let timing = FreezeTiming::from_config(&config);

        let mut players = Vec::with_capacity(config.player_count());
        let mut inputs = Vec::with_capacity(config.player_count());
        for id in PlayerId::all(config.player_count()) {
            let (player, input) = Player::new(
                id,
                config.is_human(id),
                timing,
                Arc::clone(&table),
                Arc::clone(&ui),
                rng.fork(),
            );
            players.push(player);
            inputs.push(input);
        }
        let inputs = PlayerMap::new(inputs.len(), |id| inputs[id.index()].clone());

        let dealer = Dealer::new(&config, Arc::clone(&table), ui, rules, players, rng.fork());
        let terminator = dealer.terminator();

        Ok(Self {
            config,
            table,
            dealer,
            inputs,
            terminator,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    #[must_use]
    pub fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }

    /// Key input of `player`.
    #[must_use]
    pub fn input(&self, player: PlayerId) -> Option<&KeyInput> {
        self.inputs.get(player)
    }

    #[must_use]
    pub fn inputs(&self) -> &PlayerMap<KeyInput> {
        &self.inputs
    }

    /// Run the game on the calling thread; returns the winners.
    pub fn run(self) -> Result<Vec<PlayerId>, GameError> {
        self.dealer.run()
    }

    /// Run the game on a dealer thread.
    pub fn spawn(self) -> Result<RunningGame, GameError> {
        let dealer = self.dealer.spawn()?;
        Ok(RunningGame {
            table: self.table,
            inputs: self.inputs,
            terminator: self.terminator,
            dealer,
        })
    }
}

/// A game whose dealer thread is running.
pub struct RunningGame {
    table: Arc<Table>,
    inputs: PlayerMap<KeyInput>,
    terminator: Terminator,
    dealer: JoinHandle<Result<Vec<PlayerId>, GameError>>,
}

impl RunningGame {
    #[must_use]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    #[must_use]
    pub fn input(&self, player: PlayerId) -> Option<&KeyInput> {
        self.inputs.get(player)
    }

    #[must_use]
    pub fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }

    /// Request termination; `join` returns once every actor has stopped.
    pub fn terminate(&self) {
        self.terminator.terminate();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.dealer.is_finished()
    }

    /// Wait for the game to end; returns the winners.
    pub fn join(self) -> Result<Vec<PlayerId>, GameError> {
        self.dealer
            .join()
            .map_err(|_| GameError::ActorPanicked("dealer".to_string()))?
    }
}
