//! Verdict cell written by the dealer and consumed by the owning player.

use serde::{Deserialize, Serialize};

/// Outcome of the dealer's check of a player's claim.
///
/// The cell is `None` except between the dealer writing a verdict and the
/// owning player taking it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostCheckStatus {
    #[default]
    None,
    /// The claimed cards formed a set.
    Point,
    /// The claimed cards did not form a set.
    Penalty,
}

impl PostCheckStatus {
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}
