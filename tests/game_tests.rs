//! End-to-end games.
//!
//! These tests assemble complete games through `Game` and let real player
//! and dealer threads play them out on small decks with short timings.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rust_set::cards::{CardId, Features, SetRules, StandardSet, SET_SIZE};
use rust_set::core::{ConfigError, GameConfig, GameError, PlayerId};
use rust_set::game::Game;
use rust_set::ui::{NullUi, RecordingUi, UiEvent};

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

fn fast_config() -> GameConfig {
    GameConfig::default()
        .with_features(2, 3)
        .with_geometry(9, 9)
        .with_table_delay(Duration::ZERO)
        .with_poll_interval(Duration::from_millis(1))
        .with_freezes(
            Duration::from_millis(2),
            Duration::from_millis(2),
            Duration::from_millis(1),
        )
        .with_turn_timeout(Duration::from_millis(200), Duration::from_millis(50))
        .with_seed(7)
}

/// Rules under which no three cards ever form a set.
struct NeverLegal;

impl SetRules for NeverLegal {
    fn is_legal_set(&self, _cards: [CardId; SET_SIZE]) -> bool {
        false
    }

    fn find_sets(&self, _cards: &[CardId], _limit: usize) -> Vec<[CardId; SET_SIZE]> {
        Vec::new()
    }

    fn card_features(&self, card: CardId) -> Features {
        Features::from_elem(card.raw(), 1)
    }
}

#[test]
fn test_computer_players_finish_game() {
    let config = fast_config().with_players(0, 3);
    let ui = Arc::new(RecordingUi::new());
    let game = Game::new(config, ui.clone()).unwrap();
    let running = game.spawn().unwrap();
    let table = Arc::clone(running.table());

    assert!(wait_until(|| running.is_finished()), "game did not finish");
    let winners = running.join().unwrap();

    let scores = table.scores();
    let best = scores.values().copied().max().unwrap();
    // nine cards always hold a set, so someone scored before the deck ran dry
    assert!(best > 0);
    for player in &winners {
        assert_eq!(scores[*player], best);
    }
    assert_eq!(ui.winners(), Some(winners));
    assert_eq!(table.count_cards(), 0);

    // every point is reported to the display
    let total: u32 = scores.values().sum();
    assert_eq!(ui.count(|e| matches!(e, UiEvent::Score(..))), total as usize);
}

#[test]
fn test_human_player_scores_through_key_input() {
    let config = fast_config()
        .with_players(1, 0)
        .with_turn_timeout(Duration::from_secs(60), Duration::from_secs(5));
    let rules = StandardSet::from_config(&config);
    let running = Game::new(config, Arc::new(NullUi)).unwrap().spawn().unwrap();
    let table = Arc::clone(running.table());
    assert!(wait_until(|| table.count_cards() == 9));

    let hint = table.hints(&rules).into_iter().next().unwrap();
    let input = running.input(PlayerId(0)).unwrap();
    for slot in hint.slots {
        input.key_pressed(slot.index()).unwrap();
    }

    assert!(wait_until(|| table.score(PlayerId(0)) == 1));
    assert!(wait_until(|| table.count_cards() == 6));

    running.terminate();
    assert_eq!(running.join().unwrap(), vec![PlayerId(0)]);
}

#[test]
fn test_terminate_stops_running_game() {
    let config = fast_config()
        .with_players(1, 2)
        .with_turn_timeout(Duration::from_secs(60), Duration::from_secs(5));
    let running = Game::new(config, Arc::new(NullUi)).unwrap().spawn().unwrap();
    let table = Arc::clone(running.table());
    assert!(wait_until(|| table.count_cards() == 9));

    running.terminate();
    assert!(wait_until(|| running.is_finished()));
    let winners = running.join().unwrap();
    assert!(!winners.is_empty());
}

#[test]
fn test_game_without_sets_never_deals() {
    let config = fast_config().with_players(0, 3);
    let ui = Arc::new(RecordingUi::new());
    let game = Game::with_rules(config, ui.clone(), Arc::new(NeverLegal)).unwrap();

    let winners = game.run().unwrap();

    assert_eq!(winners, vec![PlayerId(0), PlayerId(1), PlayerId(2)]);
    assert_eq!(ui.count(|e| matches!(e, UiEvent::CardPlaced(..))), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = fast_config().with_players(0, 0);
    let err = Game::new(config, Arc::new(NullUi)).err().unwrap();
    assert!(matches!(err, GameError::Config(ConfigError::Invalid { field: "players", .. })));
}

#[test]
fn test_invalid_features_are_rejected_before_building_rules() {
    let config = fast_config().with_players(0, 2).with_features(4, 1);
    let err = Game::new(config, Arc::new(NullUi)).err().unwrap();
    assert!(matches!(
        err,
        GameError::Config(ConfigError::Invalid {
            field: "feature_size",
            ..
        })
    ));
}
