/// Property-based tests for the shared board and the set rules
///
/// Random sequences of dealer and player operations are applied to a table
/// and the board invariants are checked after every step.
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use rust_set::cards::{CardId, SetRules, StandardSet};
use rust_set::core::{PlayerId, Slot};
use rust_set::table::{Table, TokenToggle};
use rust_set::ui::NullUi;

const TABLE_SIZE: usize = 12;
const DECK_SIZE: usize = 81;
const PLAYERS: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Place(u32, u16),
    Remove(u16),
    Toggle(u8, u16),
    Clear(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let slot = 0u16..TABLE_SIZE as u16;
    let player = 0u8..PLAYERS as u8;
    prop_oneof![
        (0u32..DECK_SIZE as u32, slot.clone()).prop_map(|(card, slot)| Op::Place(card, slot)),
        slot.clone().prop_map(Op::Remove),
        (player.clone(), slot).prop_map(|(player, slot)| Op::Toggle(player, slot)),
        player.prop_map(Op::Clear),
    ]
}

fn apply(table: &Table, op: &Op) {
    // rejected operations must leave the board untouched, which the
    // invariant check covers
    match *op {
        Op::Place(card, slot) => {
            let _ = table.place_card(CardId(card), Slot(slot));
        }
        Op::Remove(slot) => {
            let _ = table.remove_card(Slot(slot));
        }
        Op::Toggle(player, slot) => {
            table.toggle_token(PlayerId(player), Slot(slot));
        }
        Op::Clear(player) => {
            table.clear_player_tokens(PlayerId(player));
        }
    }
}

fn check_invariants(table: &Table) -> Result<(), TestCaseError> {
    let mut placed = 0;
    for slot in Slot::all(TABLE_SIZE) {
        if let Some(card) = table.card_at(slot) {
            placed += 1;
            prop_assert_eq!(table.slot_of(card), Some(slot));
        }
    }
    for card in CardId::deck(DECK_SIZE) {
        if let Some(slot) = table.slot_of(card) {
            prop_assert_eq!(table.card_at(slot), Some(card));
        }
    }
    prop_assert_eq!(table.count_cards(), placed);
    prop_assert_eq!(table.empty_slots().len(), TABLE_SIZE - placed);

    for player in PlayerId::all(PLAYERS) {
        let tokens = table.tokens(player);
        prop_assert!(tokens.len() <= 3);
        for slot in tokens {
            prop_assert!(table.card_at(slot).is_some(), "token on empty {}", slot);
        }
    }
    Ok(())
}

fn card_triple() -> impl Strategy<Value = [CardId; 3]> {
    prop::sample::subsequence((0u32..81).collect::<Vec<_>>(), 3)
        .prop_map(|cards| [CardId(cards[0]), CardId(cards[1]), CardId(cards[2])])
}

proptest! {
    #[test]
    fn test_board_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let table = Table::with_geometry(TABLE_SIZE, DECK_SIZE, PLAYERS, Duration::ZERO, Arc::new(NullUi));
        for op in &ops {
            apply(&table, op);
            check_invariants(&table)?;
        }
    }

    #[test]
    fn test_toggle_twice_restores_tokens(
        ops in prop::collection::vec(op_strategy(), 0..60),
        player in 0u8..PLAYERS as u8,
        slot in 0u16..TABLE_SIZE as u16,
    ) {
        let table = Table::with_geometry(TABLE_SIZE, DECK_SIZE, PLAYERS, Duration::ZERO, Arc::new(NullUi));
        for op in &ops {
            apply(&table, op);
        }
        let player = PlayerId(player);
        let before = table.tokens(player);

        let first = table.toggle_token(player, Slot(slot));
        let second = table.toggle_token(player, Slot(slot));

        if first == TokenToggle::Ignored {
            prop_assert_eq!(second, TokenToggle::Ignored);
        }
        let mut after = table.tokens(player).to_vec();
        let mut before = before.to_vec();
        after.sort();
        before.sort();
        prop_assert_eq!(after, before);
    }

    #[test]
    fn test_set_legality_ignores_order(cards in card_triple()) {
        let rules = StandardSet::default();
        let [a, b, c] = cards;
        let legal = rules.is_legal_set(cards);
        prop_assert_eq!(rules.is_legal_set([b, c, a]), legal);
        prop_assert_eq!(rules.is_legal_set([c, a, b]), legal);
        prop_assert_eq!(rules.is_legal_set([b, a, c]), legal);
    }

    #[test]
    fn test_found_sets_are_legal_and_distinct(
        cards in prop::sample::subsequence((0u32..81).collect::<Vec<_>>(), 3..=15)
    ) {
        let rules = StandardSet::default();
        let cards: Vec<CardId> = cards.into_iter().map(CardId).collect();
        let sets = rules.find_sets(&cards, usize::MAX);

        let mut seen = std::collections::HashSet::new();
        for set in &sets {
            prop_assert!(rules.is_legal_set(*set));
            for card in set {
                prop_assert!(cards.contains(card));
            }
            let mut key = *set;
            key.sort();
            prop_assert!(seen.insert(key), "duplicate set {:?}", key);
        }
    }
}
