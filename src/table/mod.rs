//! The shared board and its claim protocol.
//!
//! - `Table`: slot/card mapping, tokens, claim queue, verdicts, scores
//! - `PostCheckStatus`: the per-player verdict cell
//! - `TokenToggle`, `Claim`, `Hint`: results of table operations

pub mod board;
pub mod status;

pub use board::{Claim, Hint, Table, TokenToggle, Tokens};
pub use status::PostCheckStatus;
