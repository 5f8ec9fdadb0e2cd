//! The dealer actor.
//!
//! The dealer is the only authority validating claims and the only actor
//! placing or removing cards. `Dealer::run` embeds the round controller:
//! deal, poll until the countdown expires, collect, and finally stop the
//! players and announce the winners.

pub mod actor;
pub mod countdown;

pub use actor::{winners, Dealer, Terminator};
pub use countdown::Countdown;
