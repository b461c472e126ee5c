//! Wolf Dungeon headless driver
//!
//! Runs the simulation under the autopilot for a fixed number of frames and
//! prints the final snapshot as JSON.
//!
//! Usage: `wolf-dungeon [variant] [seed] [frames]`
//! `WOLF_DUNGEON_CONFIG` may point at a JSON level/enemy table that replaces
//! the variant's built-in one.

use std::process::ExitCode;

use wolf_dungeon::Variant;
use wolf_dungeon::sim::autopilot::steer;
use wolf_dungeon::sim::{GameConfig, GameEvent, GamePhase, GameState};

const DEFAULT_FRAMES: u64 = 60 * 60 * 5;
const FRAME_DT: f32 = 1.0 / 60.0;
const CONFIG_VAR: &str = "WOLF_DUNGEON_CONFIG";

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let variant = match args.next() {
        Some(name) => match Variant::from_str(&name) {
            Some(variant) => variant,
            None => {
                log::error!("Unknown variant '{}' (expected classic, frontier or scavenger)", name);
                return ExitCode::FAILURE;
            }
        },
        None => Variant::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xC0FFEE);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_FRAMES);

    let config = match std::env::var(CONFIG_VAR) {
        Ok(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        Err(_) => variant.game_config(),
    };
    let settings = variant.settings().with_env_overrides();

    let mut state = match GameState::new(config, variant.tuning(), settings, seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Wolf Dungeon starting: {} variant, seed {}, {} frames",
        variant.as_str(),
        seed,
        frames
    );

    for _ in 0..frames {
        let input = steer(&state);
        state.advance(&input, FRAME_DT);

        for event in &state.events {
            if let GameEvent::LevelCleared { level } = event {
                log::info!("t={:.1}s level {} cleared, score {}", state.clock, level, state.player.score);
            }
        }
        if state.phase == GamePhase::YouWin {
            break;
        }
    }

    log::info!(
        "Finished at level {} ({:?}) after {:.1}s with score {}",
        state.level(),
        state.phase,
        state.clock,
        state.player.score
    );
    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &str) -> Result<GameConfig, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(GameConfig::from_json(&json)?)
}
