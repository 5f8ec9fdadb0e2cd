//! Grid positions on the table.

use serde::{Deserialize, Serialize};

/// A fixed position in the table grid that holds at most one card.
///
/// Slots are 0-based; a table of `table_size` slots has valid slots
/// `0..table_size`. Range checks happen where input enters the system
/// (see `KeyInput::key_pressed`) and in `Table::place_card`/`remove_card`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(pub u16);

impl Slot {
    /// Create a new slot.
    #[must_use]
    pub const fn new(slot: u16) -> Self {
        Self(slot)
    }

    /// Get the raw slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every slot of a table with `table_size` slots.
    pub fn all(table_size: usize) -> impl Iterator<Item = Slot> {
        (0..table_size.min(u16::MAX as usize) as u16).map(Slot)
    }

    /// Convert a raw index, rejecting anything outside `0..table_size`.
    #[must_use]
    pub fn checked(index: usize, table_size: usize) -> Option<Self> {
        (index < table_size)
            .then(|| u16::try_from(index).ok().map(Slot))
            .flatten()
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}
