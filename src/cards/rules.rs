//! Set legality and enumeration.
//!
//! The table and the actors depend only on the `SetRules` trait. The
//! standard game (`StandardSet`) encodes each card id as `feature_count`
//! digits in base `feature_size`; three cards form a set when, for every
//! feature, their values are either all equal or pairwise different.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::card::CardId;
use crate::core::GameConfig;

/// Number of cards in a set.
pub const SET_SIZE: usize = 3;

/// Feature digits of one card, most significant feature first.
pub type Features = SmallVec<[u32; 4]>;

/// Legality test and enumeration of sets.
///
/// Implementations are pure and stateless; the dealer calls them from its
/// own thread without holding any table lock.
pub trait SetRules: Send + Sync {
    /// Whether the three cards form a legal set.
    fn is_legal_set(&self, cards: [CardId; SET_SIZE]) -> bool;

    /// Every legal set among `cards`, stopping after `limit` sets.
    fn find_sets(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; SET_SIZE]>;

    /// Feature digits of a card, for display.
    fn card_features(&self, card: CardId) -> Features;
}

/// The classic game: 4 features of 3 values each by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardSet {
    feature_count: usize,
    feature_size: u32,
}

impl Default for StandardSet {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl StandardSet {
    #[must_use]
    pub fn new(feature_count: usize, feature_size: u32) -> Self {
        assert!(feature_size >= 2, "features need at least 2 values");
        Self {
            feature_count,
            feature_size,
        }
    }

    /// Rules matching a configuration's card features.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.feature_count, config.feature_size)
    }

    /// Third card completing a set with `a` and `b`.
    ///
    /// Only unique when every feature has exactly three values.
    fn complete(&self, a: &Features, b: &Features) -> Option<CardId> {
        if self.feature_size != 3 {
            return None;
        }
        let mut id = 0u32;
        for (&x, &y) in a.iter().zip(b.iter()) {
            let z = if x == y { x } else { 3 - x - y };
            id = id.checked_mul(3)?.checked_add(z)?;
        }
        Some(CardId(id))
    }

    fn feature_matches(x: u32, y: u32, z: u32) -> bool {
        (x == y && y == z) || (x != y && y != z && x != z)
    }

    /// Pairwise enumeration through completion lookup, `O(n^2)`.
    fn find_sets_by_completion(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; SET_SIZE]> {
        let position: FxHashMap<CardId, usize> =
            cards.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let features: Vec<Features> = cards.iter().map(|&c| self.card_features(c)).collect();

        let mut sets = Vec::new();
        for i in 0..cards.len() {
            for j in (i + 1)..cards.len() {
                let Some(third) = self.complete(&features[i], &features[j]) else {
                    continue;
                };
                if matches!(position.get(&third), Some(&k) if k > j) {
                    sets.push([cards[i], cards[j], third]);
                    if sets.len() >= limit {
                        return sets;
                    }
                }
            }
        }
        sets
    }

    /// Triple enumeration for feature sizes without a unique completion.
    fn find_sets_exhaustive(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; SET_SIZE]> {
        let mut sets = Vec::new();
        for i in 0..cards.len() {
            for j in (i + 1)..cards.len() {
                for k in (j + 1)..cards.len() {
                    let triple = [cards[i], cards[j], cards[k]];
                    if self.is_legal_set(triple) {
                        sets.push(triple);
                        if sets.len() >= limit {
                            return sets;
                        }
                    }
                }
            }
        }
        sets
    }
}

impl SetRules for StandardSet {
    fn is_legal_set(&self, cards: [CardId; SET_SIZE]) -> bool {
        if cards[0] == cards[1] || cards[1] == cards[2] || cards[0] == cards[2] {
            return false;
        }
        let [a, b, c] = cards.map(|card| self.card_features(card));
        a.iter()
            .zip(b.iter())
            .zip(c.iter())
            .all(|((&x, &y), &z)| Self::feature_matches(x, y, z))
    }

    fn find_sets(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; SET_SIZE]> {
        if limit == 0 || cards.len() < SET_SIZE {
            return Vec::new();
        }
        if self.feature_size == 3 {
            self.find_sets_by_completion(cards, limit)
        } else {
            self.find_sets_exhaustive(cards, limit)
        }
    }

    fn card_features(&self, card: CardId) -> Features {
        let mut features: Features = SmallVec::from_elem(0, self.feature_count);
        let mut rest = card.raw();
        for digit in features.iter_mut().rev() {
            *digit = rest % self.feature_size;
            rest /= self.feature_size;
        }
        features
    }
}
