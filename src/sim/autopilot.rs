//! Demo autopilot
//!
//! Produces intents from the current state: turn toward the nearest enemy,
//! keep a working distance, shoot when lined up and spend perks as they come.

use glam::Vec3;

use super::state::{GameState, PerkKind};
use super::tick::TickInput;
use crate::settings::ControlScheme;
use crate::{flatten, normalize_degrees, yaw_toward};

/// Fire once the aim is within this many degrees
const AIM_TOLERANCE_DEG: f32 = 4.0;
/// Preferred distance band to the target
const CLOSE_DISTANCE: f32 = 8.0;
const FAR_DISTANCE: f32 = 16.0;

pub fn steer(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    let player = &state.player;
    let perks = &player.perks;

    input.activate_health = perks.track(PerkKind::Health).available && player.health * 2 < player.max_health;
    input.activate_score = perks.track(PerkKind::ScoreMultiplier).available;
    input.activate_rapid_fire = perks.track(PerkKind::RapidFire).available;

    let (target, hunting) = match nearest(player.pos, state.enemies.iter().map(|e| e.pos)) {
        Some(enemy) => (enemy, true),
        None => match nearest(player.pos, state.pickups.iter().map(|p| p.pos)) {
            Some(pickup) => (pickup, false),
            None => return input,
        },
    };

    let to_target = flatten(target - player.pos);
    let distance = to_target.length();
    let error = normalize_degrees(yaw_toward(to_target) - player.yaw);
    let step = state.tuning.rotate_step_deg;

    let (turn_left, turn_right) = (error > step / 2.0, error < -step / 2.0);
    match state.settings.control_scheme {
        ControlScheme::Rotate => {
            input.left = turn_left;
            input.right = turn_right;
        }
        ControlScheme::Strafe => {
            input.orbit_left = turn_left;
            input.orbit_right = turn_right;
        }
    }

    let aligned = error.abs() < AIM_TOLERANCE_DEG;
    let (ahead, behind) = if hunting {
        (aligned && distance > FAR_DISTANCE, distance < CLOSE_DISTANCE)
    } else {
        (aligned, false)
    };
    if state.settings.invert_forward {
        input.forward = behind;
        input.back = ahead;
    } else {
        input.forward = ahead;
        input.back = behind;
    }
    input.fire = hunting && aligned;
    input
}

fn nearest(from: Vec3, points: impl Iterator<Item = Vec3>) -> Option<Vec3> {
    points.min_by(|a, b| {
        a.distance_squared(from)
            .partial_cmp(&b.distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
