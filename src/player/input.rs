//! Key-press input for a player.
//!
//! Every player reads slots from a bounded queue of `KEY_QUEUE_CAPACITY`
//! pending presses. Human presses arrive through `KeyInput::key_pressed`
//! and are dropped when the queue is full; computer players run a
//! `Generator` thread that blocks on the full queue instead, so it cannot
//! run ahead of the player it drives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, select, Receiver, Sender, TrySendError};
use log::{info, trace};

use crate::core::{GameRng, InputError, PlayerId, Slot};

/// Pending key presses a player buffers.
pub const KEY_QUEUE_CAPACITY: usize = 3;

pub(crate) fn key_queue() -> (Sender<Slot>, Receiver<Slot>) {
    channel::bounded(KEY_QUEUE_CAPACITY)
}

/// Entry point for one player's key presses.
///
/// Cheap to clone; validates slot indices before anything reaches the table.
#[derive(Clone, Debug)]
pub struct KeyInput {
    player: PlayerId,
    table_size: usize,
    keys: Sender<Slot>,
}

impl KeyInput {
    pub(crate) fn new(player: PlayerId, table_size: usize, keys: Sender<Slot>) -> Self {
        Self {
            player,
            table_size,
            keys,
        }
    }

    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.player
    }

    fn validate(&self, slot: usize) -> Result<Slot, InputError> {
        Slot::checked(slot, self.table_size).ok_or(InputError::InvalidSlot {
            slot,
            table_size: self.table_size,
        })
    }

    /// Submit a press without blocking.
    ///
    /// Fails with `QueueFull` when the player already has
    /// `KEY_QUEUE_CAPACITY` presses pending; the press is dropped.
    pub fn key_pressed(&self, slot: usize) -> Result<(), InputError> {
        let slot = self.validate(slot)?;
        self.keys.try_send(slot).map_err(|err| match err {
            TrySendError::Full(_) => {
                trace!("{} dropped a press on {slot}", self.player);
                InputError::QueueFull(self.player)
            }
            TrySendError::Disconnected(_) => InputError::Disconnected(self.player),
        })
    }

    /// Submit a press, waiting for queue space until `shutdown` disconnects.
    pub(crate) fn press_blocking(
        &self,
        slot: usize,
        shutdown: &Receiver<()>,
    ) -> Result<(), InputError> {
        let slot = self.validate(slot)?;
        select! {
            send(self.keys, slot) -> sent => {
                sent.map_err(|_| InputError::Disconnected(self.player))
            }
            recv(shutdown) -> _ => Err(InputError::Disconnected(self.player)),
        }
    }
}

/// Random key presses for a computer player.
pub(crate) struct Generator {
    pub(crate) input: KeyInput,
    pub(crate) rng: GameRng,
    pub(crate) shutdown: Receiver<()>,
    pub(crate) terminate: Arc<AtomicBool>,
}

impl Generator {
    /// Press uniformly random slots as fast as the queue allows.
    pub(crate) fn run(mut self) {
        let name = format!("computer-{}", self.input.player.0);
        info!("thread {name} starting.");
        while !self.terminate.load(Ordering::Acquire) {
            let slot = self.rng.gen_range_usize(0..self.input.table_size);
            if self.input.press_blocking(slot, &self.shutdown).is_err() {
                break;
            }
        }
        info!("thread {name} terminated.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_rejects_out_of_range_slot() {
        let (tx, rx) = key_queue();
        let input = KeyInput::new(PlayerId(0), 12, tx);

        assert_eq!(
            input.key_pressed(12),
            Err(InputError::InvalidSlot {
                slot: 12,
                table_size: 12
            })
        );
        assert!(rx.is_empty());
    }

    #[test]
    fn test_drops_presses_beyond_capacity() {
        let (tx, rx) = key_queue();
        let input = KeyInput::new(PlayerId(1), 12, tx);
        for slot in 0..KEY_QUEUE_CAPACITY {
            input.key_pressed(slot).unwrap();
        }

        assert_eq!(input.key_pressed(5), Err(InputError::QueueFull(PlayerId(1))));
        let queued: Vec<_> = rx.try_iter().collect();
        assert_eq!(queued, vec![Slot(0), Slot(1), Slot(2)]);
    }

    #[test]
    fn test_disconnected_player() {
        let (tx, rx) = key_queue();
        drop(rx);
        let input = KeyInput::new(PlayerId(2), 12, tx);
        assert_eq!(input.key_pressed(0), Err(InputError::Disconnected(PlayerId(2))));
    }

    #[test]
    fn test_generator_fills_queue_and_stops_on_shutdown() {
        let (tx, rx) = key_queue();
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(0);
        let generator = Generator {
            input: KeyInput::new(PlayerId(0), 12, tx),
            rng: GameRng::new(1),
            shutdown: shutdown_rx,
            terminate: Arc::new(AtomicBool::new(false)),
        };
        let handle = thread::spawn(move || generator.run());

        // the generator blocks once the queue is full
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !rx.is_full() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(rx.len(), KEY_QUEUE_CAPACITY);
        assert!(rx.try_iter().all(|slot| slot.index() < 12));

        drop(shutdown_tx);
        handle.join().unwrap();
    }
}
