//! Terminal front end for a Set table.
//!
//! Board changes are reported through the log. Human players press keys by
//! writing `<player> <slot>` lines to stdin, e.g. `0 7`.

use std::fs;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Error};
use ctrlc::set_handler;
use log::{info, warn};
use pico_args::Arguments;
use rust_set::{Game, GameConfig, KeyInput, LogUi, PlayerId, PlayerMap};

const HELP: &str = "\
Run a Set table with human and computer players

USAGE:
  set-table [OPTIONS]

OPTIONS:
  --config     FILE        TOML game configuration        [default: built-in]
  --humans     N           Number of human players         [default: 2]
  --computers  N           Number of computer players      [default: 2]
  --seed       N           Seed for shuffles and bots      [default: random]

FLAGS:
  --hints                  Log every legal set after each deal
  -h, --help               Print help information

INPUT:
  One press per stdin line: `<player> <slot>`, e.g. `0 7`.
";

struct Args {
    config: Option<String>,
    humans: Option<usize>,
    computers: Option<usize>,
    seed: Option<u64>,
    hints: bool,
}

fn load_config(args: &Args) -> Result<GameConfig, Error> {
    let mut config = match &args.config {
        Some(path) => {
            let source =
                fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
            GameConfig::from_toml_str(&source).with_context(|| format!("parsing config {path}"))?
        }
        None => GameConfig::default(),
    };

    if args.humans.is_some() || args.computers.is_some() {
        let humans = args.humans.unwrap_or(config.human_players);
        let computers = args.computers.unwrap_or(config.computer_players);
        config = config.with_players(humans, computers);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.hints {
        config = config.with_hints(true);
    }
    Ok(config)
}

/// Parse a `<player> <slot>` line.
fn parse_press(line: &str) -> Result<(PlayerId, usize), Error> {
    let mut fields = line.split_whitespace();
    let (Some(player), Some(slot), None) = (fields.next(), fields.next(), fields.next()) else {
        bail!("expected `<player> <slot>`");
    };
    let player: u8 = player.parse().context("invalid player")?;
    let slot: usize = slot.parse().context("invalid slot")?;
    Ok((PlayerId::new(player), slot))
}

/// Forward stdin presses until stdin closes.
fn read_presses(inputs: PlayerMap<KeyInput>, humans: usize) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match parse_press(&line) {
            Ok((player, _)) if player.index() >= humans => {
                warn!("{player} is not a human player");
            }
            Ok((player, slot)) => match inputs.get(player) {
                Some(input) => {
                    if let Err(err) = input.key_pressed(slot) {
                        warn!("{err}");
                    }
                }
                None => warn!("{player} is not seated"),
            },
            Err(err) => warn!("{line:?}: {err:#}"),
        }
    }
}

fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        config: pargs.opt_value_from_str("--config")?,
        humans: pargs.opt_value_from_str("--humans")?,
        computers: pargs.opt_value_from_str("--computers")?,
        seed: pargs.opt_value_from_str("--seed")?,
        hints: pargs.contains("--hints"),
    };

    env_logger::builder().format_target(false).init();

    let config = load_config(&args)?;
    let humans = config.human_players;
    info!(
        "starting a table of {} slots with {} players",
        config.table_size,
        config.player_count()
    );

    let game = Game::new(config, Arc::new(LogUi::new()))?;

    // Catching signals for a graceful shutdown.
    let terminator = game.terminator();
    set_handler(move || terminator.terminate())?;

    if humans > 0 {
        let inputs = game.inputs().clone();
        thread::Builder::new()
            .name("stdin".to_string())
            .spawn(move || read_presses(inputs, humans))
            .context("spawning stdin reader")?;
    }

    let winners = game.run()?;
    let names: Vec<String> = winners.iter().map(ToString::to_string).collect();
    println!("winners: {}", names.join(", "));
    Ok(())
}
