//! Per-frame simulation tick
//!
//! Dispatches on the game phase: gameplay runs the update pipeline, transition
//! phases only count down their timer.

use super::config::Color;
use super::state::{GameEvent, GamePhase, GameState, Player, Transition, RESTART_COLOR};
use super::{actors, ballistics, director, perks};
use crate::consts::*;

/// Debounced intents for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    /// Turn (rotate scheme) or strafe (strafe scheme)
    pub left: bool,
    pub right: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub orbit_left: bool,
    pub orbit_right: bool,
    pub fire: bool,
    /// Switch first/third person
    pub toggle_camera: bool,
    pub activate_health: bool,
    pub activate_score: bool,
    pub activate_rapid_fire: bool,
    /// Start over from level 1
    pub restart: bool,
}

/// Clamp a raw frame delta to a safe simulation step
///
/// Hitches are capped; zero, negative or NaN deltas fall back to 60 Hz.
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt > 0.0 { dt.min(MAX_FRAME_DT) } else { FALLBACK_FRAME_DT }
}

/// Advance the game state by one frame of `dt` seconds
///
/// `dt` must already be clamped; outside callers go through `GameState::advance`.
pub(crate) fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    state.time_ticks += 1;

    if input.toggle_camera {
        state.settings.camera_mode = state.settings.camera_mode.toggled();
    }
    if input.restart {
        request_restart(state);
    }

    match state.phase {
        phase if phase.is_transition() => advance_transition(state, dt),
        GamePhase::Playing => {
            // Only gameplay moves the simulation clock
            state.clock += dt as f64;
            actors::update_player(state, input, dt);
            actors::update_enemies(state, dt);
            director::maybe_spawn(state);
            ballistics::update_bullets(state, dt);
            // A lethal hit ends gameplay for this tick
            if state.phase == GamePhase::Playing {
                perks::update_pickups(state, dt);
                director::check_level_completion(state);
            }
        }
        _ => {}
    }
}

/// Enter a timed transition phase that resumes into `Playing`
pub fn start_transition(state: &mut GameState, phase: GamePhase, color: Color) {
    let duration = state.tuning.transition_duration;
    state.phase = phase;
    state.transition = Some(Transition {
        remaining: duration,
        duration,
        color,
        resume_into: GamePhase::Playing,
    });
}

/// Start over from level 1. Ignored while another transition is running.
pub fn request_restart(state: &mut GameState) {
    if matches!(state.phase, GamePhase::Playing | GamePhase::YouWin) {
        log::info!("Restart requested");
        start_transition(state, GamePhase::RestartTransition, RESTART_COLOR);
    }
}

/// Count down the current transition and run its side effect when it ends
pub fn advance_transition(state: &mut GameState, dt: f32) {
    let finished = state.phase;
    let resume_into = match state.transition.as_mut() {
        Some(transition) => {
            transition.remaining -= dt;
            if transition.remaining > 0.0 {
                return;
            }
            transition.resume_into
        }
        None => GamePhase::Playing,
    };
    state.transition = None;
    state.phase = resume_into;

    match finished {
        GamePhase::LevelTransition => {
            let next = state.level() + 1;
            director::begin_level(state, next);
        }
        GamePhase::GameOverTransition => {
            let player = &mut state.player;
            player.health = player.max_health;
            player.ammo = state.tuning.max_ammo;
            let level = state.level();
            log::info!("Retrying level {}", level);
            director::begin_level(state, level);
        }
        GamePhase::RestartTransition => {
            state.player = Player::new(&state.tuning, state.player.pos);
            state.emit(GameEvent::Restarted);
            director::begin_level(state, 1);
        }
        GamePhase::Playing | GamePhase::YouWin => {}
    }
}

impl GameState {
    /// Frame driver entry point: clamps `dt` and runs one tick
    pub fn advance(&mut self, input: &TickInput, dt: f32) {
        tick(self, input, clamp_frame_dt(dt));
    }
}
