//! Cards and set rules.
//!
//! ## Key Types
//!
//! - `CardId`: opaque card identifier in `0..deck_size`
//! - `SetRules`: legality test and set enumeration, consumed by the dealer
//! - `StandardSet`: the classic rules over base-`feature_size` feature digits

pub mod card;
pub mod rules;

pub use card::CardId;
pub use rules::{Features, SetRules, StandardSet, SET_SIZE};
