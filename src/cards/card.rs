//! Card identifiers.
//!
//! A card is an opaque id in `0..deck_size`. Its features are derived from
//! the id by the set rules (`StandardSet::card_features`); the table and the
//! actors never look at them.

use serde::{Deserialize, Serialize};

/// Identifier of one card of the deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index of the card in a deck-sized table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The full card universe of a deck of `deck_size` cards, in id order.
    pub fn deck(deck_size: usize) -> impl Iterator<Item = CardId> {
        (0..deck_size.min(u32::MAX as usize) as u32).map(CardId)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}
