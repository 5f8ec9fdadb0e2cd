//! The player thread.
//!
//! A player repeatedly takes the next pressed slot, toggles its token there
//! and, when that leaves it holding a full claim, queues the claim and waits
//! for the dealer's verdict. A point or a penalty is followed by a freeze
//! whose countdown is reported to the display.
//!
//! Waiting happens on the player's single-slot verdict signal. Every wake
//! is treated as "check again": the player reads its own status cell and
//! only stops waiting once a verdict arrived or its tokens were taken away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, trace};

use super::input::{key_queue, Generator, KeyInput};
use crate::cards::SET_SIZE;
use crate::core::{GameConfig, GameError, GameRng, PlayerId, Slot};
use crate::table::{PostCheckStatus, Table, TokenToggle};
use crate::ui::UserInterface;

/// Freeze durations of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreezeTiming {
    pub point: Duration,
    pub penalty: Duration,
    /// Step of the visible countdown.
    pub tick: Duration,
}

impl FreezeTiming {
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            point: config.point_freeze(),
            penalty: config.penalty_freeze(),
            tick: config.freeze_tick(),
        }
    }
}

/// A player that has not been started yet.
pub struct Player {
    id: PlayerId,
    human: bool,
    table: Arc<Table>,
    ui: Arc<dyn UserInterface>,
    timing: FreezeTiming,
    input: KeyInput,
    keys: Receiver<Slot>,
    verdicts: Receiver<()>,
    shutdown_tx: Option<Sender<()>>,
    shutdown_rx: Receiver<()>,
    terminate: Arc<AtomicBool>,
    rng: GameRng,
}

impl Player {
    /// Create a player seated at `table`.
    ///
    /// Returns the player and the handle its key presses go through.
    pub fn new(
        id: PlayerId,
        human: bool,
        timing: FreezeTiming,
        table: Arc<Table>,
        ui: Arc<dyn UserInterface>,
        rng: GameRng,
    ) -> (Self, KeyInput) {
        let (keys_tx, keys) = key_queue();
        let (shutdown_tx, shutdown_rx) = channel::bounded(0);
        let input = KeyInput::new(id, table.table_size(), keys_tx);
        let verdicts = table.verdict_signal(id);

        let player = Self {
            id,
            human,
            table,
            ui,
            timing,
            input: input.clone(),
            keys,
            verdicts,
            shutdown_tx: Some(shutdown_tx),
            shutdown_rx,
            terminate: Arc::new(AtomicBool::new(false)),
            rng,
        };
        (player, input)
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn is_human(&self) -> bool {
        self.human
    }

    /// Start the player thread, and the input generator of a computer player.
    pub fn spawn(mut self) -> Result<PlayerHandle, GameError> {
        let name = self.id.to_string();
        let id = self.id;
        let shutdown = self.shutdown_tx.take();
        let terminate = Arc::clone(&self.terminate);

        let generator = if self.human {
            None
        } else {
            let name = format!("computer-{}", id.0);
            let handle = self
                .spawn_generator(&name)
                .map_err(|source| GameError::Spawn { name, source })?;
            Some(handle)
        };

        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || self.run());
        let mut handle = PlayerHandle {
            id,
            terminate,
            shutdown,
            thread: None,
            generator,
        };
        // on failure, dropping the handle stops the generator
        handle.thread = Some(thread.map_err(|source| GameError::Spawn { name, source })?);
        Ok(handle)
    }

    fn run(mut self) {
        info!("thread {} starting.", self.id);
        while !self.terminated() {
            let slot = select! {
                recv(self.keys) -> key => match key {
                    Ok(slot) => slot,
                    Err(_) => break,
                },
                recv(self.shutdown_rx) -> _ => break,
            };
            self.handle_key(slot);
        }
        info!("thread {} terminated.", self.id);
    }

    fn spawn_generator(&mut self, name: &str) -> std::io::Result<JoinHandle<()>> {
        let generator = Generator {
            input: self.input.clone(),
            rng: self.rng.fork(),
            shutdown: self.shutdown_rx.clone(),
            terminate: Arc::clone(&self.terminate),
        };
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || generator.run())
    }

    fn terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    fn handle_key(&mut self, slot: Slot) {
        if let TokenToggle::Placed { tokens: SET_SIZE } = self.table.toggle_token(self.id, slot) {
            self.table.enqueue_claim(self.id);
            self.await_verdict();
        }
    }

    fn await_verdict(&mut self) {
        loop {
            select! {
                recv(self.verdicts) -> signal => if signal.is_err() {
                    return;
                },
                recv(self.shutdown_rx) -> _ => return,
            }

            match self.table.take_status(self.id) {
                PostCheckStatus::Point => return self.point(),
                PostCheckStatus::Penalty => return self.penalty(),
                PostCheckStatus::None => {
                    if self.table.token_count(self.id) < SET_SIZE {
                        trace!("{} lost its claim before it was checked", self.id);
                        return;
                    }
                }
            }
        }
    }

    fn point(&mut self) {
        let score = self.table.award_point(self.id);
        debug!("{} scored, now at {score}", self.id);
        self.ui.set_score(self.id, score);
        self.freeze(self.timing.point);
    }

    fn penalty(&mut self) {
        debug!("{} penalized", self.id);
        self.freeze(self.timing.penalty);
        // presses queued during the freeze are stale
        let dropped = self.keys.try_iter().count();
        if dropped > 0 {
            trace!("{} discarded {dropped} presses after its penalty", self.id);
        }
    }

    /// Count `duration` down in steps of the freeze tick.
    fn freeze(&self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.ui.set_freeze(self.id, remaining);
            let step = remaining.min(self.timing.tick);
            if !self.pause(step) {
                break;
            }
            remaining -= step;
        }
        self.ui.set_freeze(self.id, Duration::ZERO);
    }

    /// Sleep for `step`; returns `false` if the player was terminated.
    fn pause(&self, step: Duration) -> bool {
        !matches!(
            self.shutdown_rx.recv_timeout(step),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}

/// A running player thread.
///
/// Dropping the handle terminates and joins the thread.
#[derive(Debug)]
pub struct PlayerHandle {
    id: PlayerId,
    terminate: Arc<AtomicBool>,
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    generator: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Ask the player to stop.
    ///
    /// Sets the termination flag and disconnects the shutdown channel, which
    /// unblocks the player (and its generator) wherever it is waiting.
    pub fn terminate(&mut self) {
        self.terminate.store(true, Ordering::Release);
        self.shutdown.take();
    }

    /// Wait for the player thread, then its generator, to exit.
    pub fn join(&mut self) -> Result<(), GameError> {
        let player = match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| GameError::ActorPanicked(self.id.to_string())),
            None => Ok(()),
        };
        let generator = match self.generator.take() {
            Some(generator) => generator
                .join()
                .map_err(|_| GameError::ActorPanicked(format!("computer-{}", self.id.0))),
            None => Ok(()),
        };
        player.and(generator)
    }

    /// Whether the computer input generator is running or unjoined.
    #[must_use]
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
            && self.generator.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        self.terminate();
        if let Err(err) = self.join() {
            error!("{err}");
        }
    }
}
