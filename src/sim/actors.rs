//! Per-tick player and enemy updates
//!
//! Movement, facing, arena clamping and firing. Bullets are handed to
//! `ballistics::spawn_bullet`; enemy shots are collected first and spawned
//! after the enemy pass so the store is not borrowed twice.

use glam::{Quat, Vec3};

use super::ballistics::spawn_bullet;
use super::config::ArenaConfig;
use super::perks;
use super::state::{Faction, GameState, PerkKind};
use super::tick::TickInput;
use crate::consts::*;
use crate::settings::{CameraMode, ControlScheme};
use crate::{flatten, forward_from_yaw, left_from_yaw, yaw_toward};

/// Keep a body of `radius` inside the arena walls
#[inline]
pub fn clamp_to_arena(arena: &ArenaConfig, pos: &mut Vec3, radius: f32) {
    pos.x = pos.x.max(radius).min(arena.size_x - radius);
    pos.z = pos.z.max(radius).min(arena.size_z - radius);
}

/// Player muzzle: gun tip at shoulder height in front of the body
pub fn player_muzzle(pos: Vec3, yaw: f32) -> Vec3 {
    let shoulder_height = PLAYER_LEG_LENGTH + PLAYER_TORSO_HEIGHT * 0.8;
    let reach = PLAYER_GUN_BASE_OFFSET + PLAYER_GUN_LENGTH;
    let tip = pos + forward_from_yaw(yaw) * reach;
    Vec3::new(tip.x, pos.y - PLAYER_BODY_Y_OFFSET + shoulder_height, tip.z)
}

/// Advance the player: perks, turning, look, movement and firing
pub fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    perks::expire_windows(state);
    for (pressed, kind) in [
        (input.activate_health, PerkKind::Health),
        (input.activate_score, PerkKind::ScoreMultiplier),
        (input.activate_rapid_fire, PerkKind::RapidFire),
    ] {
        if pressed {
            perks::activate(state, kind);
        }
    }

    let settings = state.settings;
    let step = state.tuning.rotate_step_deg;
    let pitch_step = step * PITCH_STEP_FACTOR;
    let arena = state.config.arena;
    let first_person = settings.camera_mode == CameraMode::FirstPerson;

    let player = &mut state.player;
    let camera = &mut state.camera;

    // Turning is a fixed step per tick, not scaled by dt
    let (turn_left, turn_right, strafe) = match settings.control_scheme {
        ControlScheme::Rotate => (input.left, input.right, 0.0),
        ControlScheme::Strafe => (
            input.orbit_left,
            input.orbit_right,
            axis(input.left, input.right),
        ),
    };
    if turn_left {
        player.yaw += step;
    }
    if turn_right {
        player.yaw -= step;
    }

    if first_person {
        if input.look_up {
            player.pitch = (player.pitch + pitch_step).min(MAX_PITCH_DEG);
        }
        if input.look_down {
            player.pitch = (player.pitch - pitch_step).max(-MAX_PITCH_DEG);
        }
        if settings.control_scheme == ControlScheme::Rotate {
            if input.orbit_left {
                player.yaw += step;
            }
            if input.orbit_right {
                player.yaw -= step;
            }
        }
    } else {
        if input.look_up {
            camera.pitch = (camera.pitch - pitch_step).max(-MAX_PITCH_DEG);
        }
        if input.look_down {
            camera.pitch = (camera.pitch + pitch_step).min(0.0);
        }
        if settings.control_scheme == ControlScheme::Rotate {
            if input.orbit_left {
                camera.yaw_offset -= step;
            }
            if input.orbit_right {
                camera.yaw_offset += step;
            }
        }
    }
    player.yaw = crate::normalize_degrees(player.yaw);

    let advance = axis(input.forward, input.back) * settings.forward_sign();
    let travel = player.speed * dt;
    let delta = forward_from_yaw(player.yaw) * advance + left_from_yaw(player.yaw) * strafe;
    player.pos += delta * travel;
    clamp_to_arena(&arena, &mut player.pos, PLAYER_RADIUS);

    player.shoot_cooldown = (player.shoot_cooldown - dt).max(0.0);
    if !input.fire || player.shoot_cooldown > 0.0 || player.ammo == Some(0) {
        return;
    }
    player.shoot_cooldown = player.cooldown_duration;
    if let Some(ammo) = player.ammo.as_mut() {
        *ammo -= 1;
    }
    let muzzle = player_muzzle(player.pos, player.yaw);
    let dir = forward_from_yaw(player.yaw);
    let damage = perks::player_bullet_damage(state);
    spawn_bullet(state, muzzle, dir, Faction::Player, damage);
}

/// +1 / -1 / 0 for a pair of opposing intents
fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

struct Shot {
    pos: Vec3,
    dir: Vec3,
    damage: u32,
}

/// Advance every enemy: face the player, close in, reload and fire
pub fn update_enemies(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let torso = state.player.torso_center();
    let arena = state.config.arena;
    let min_approach = state.tuning.enemy_min_approach;
    let fire_range = state.tuning.enemy_fire_range;

    let mut shots = Vec::new();
    for enemy in &mut state.enemies {
        let to_player = flatten(player_pos - enemy.pos);
        if to_player.length_squared() > f32::EPSILON {
            enemy.yaw = yaw_toward(to_player);
        }

        let distance = enemy.pos.distance(player_pos);
        if distance > min_approach {
            enemy.pos += to_player.normalize_or_zero() * enemy.speed * dt;
        }
        clamp_to_arena(&arena, &mut enemy.pos, enemy.collision_radius);

        if enemy.shoot_cooldown > 0.0 {
            enemy.shoot_cooldown = (enemy.shoot_cooldown - dt).max(0.0);
            continue;
        }
        if distance >= fire_range {
            continue;
        }
        enemy.shoot_cooldown = enemy.reload_time;

        let muzzle = enemy.pos + forward_from_yaw(enemy.yaw) * ENEMY_GUN_OFFSET_FACTOR * enemy.model_height;
        let aim = (torso - muzzle).normalize_or_zero();
        match enemy.volley {
            Some(volley) if volley.count > 1 => {
                let middle = (volley.count - 1) as f32 / 2.0;
                for i in 0..volley.count {
                    let offset = (i as f32 - middle) * volley.spread_deg;
                    shots.push(Shot {
                        pos: muzzle,
                        dir: Quat::from_rotation_y(offset.to_radians()) * aim,
                        damage: enemy.damage,
                    });
                }
            }
            _ => shots.push(Shot {
                pos: muzzle,
                dir: aim,
                damage: enemy.damage,
            }),
        }
    }

    for shot in shots {
        spawn_bullet(state, shot.pos, shot.dir, Faction::Enemy, shot.damage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::director::{begin_level, maybe_spawn};
    use crate::sim::state::Effect;
    use crate::tuning::Variant;
    use crate::Settings;

    fn state() -> GameState {
        GameState::for_variant(Variant::Classic, 31).unwrap()
    }

    /// Move the first enemy to a spot `dx` east of the player
    fn place_near_player(state: &mut GameState, dx: f32) {
        let target = state.player.pos + Vec3::new(dx, 0.0, 0.0);
        let enemy = &mut state.enemies[0];
        enemy.pos = Vec3::new(target.x, enemy.pos.y, target.z);
    }

    fn forward() -> TickInput {
        TickInput {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_forward_moves_along_facing() {
        let mut state = state();
        let start = state.player.pos;
        update_player(&mut state, &forward(), 0.1);
        let moved = state.player.pos - start;
        assert!((moved.z + 0.5).abs() < 1e-5);
        assert!(moved.x.abs() < 1e-5);
    }

    #[test]
    fn test_inverted_forward() {
        let mut state = state();
        state.settings.invert_forward = true;
        let start = state.player.pos;
        update_player(&mut state, &forward(), 0.1);
        assert!(state.player.pos.z > start.z);
    }

    #[test]
    fn test_rotation_is_per_tick() {
        let mut state = state();
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        update_player(&mut state, &input, 0.5);
        update_player(&mut state, &input, 0.001);
        assert!((state.player.yaw - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_strafe_scheme_moves_sideways() {
        let mut state = state();
        state.settings = Settings {
            control_scheme: ControlScheme::Strafe,
            ..Settings::default()
        };
        let start = state.player.pos;
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        update_player(&mut state, &input, 0.1);
        assert_eq!(state.player.yaw, 0.0);
        assert!((state.player.pos.x - (start.x - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_player_clamped_to_arena() {
        let mut state = state();
        state.player.pos.z = 0.6;
        update_player(&mut state, &forward(), 1.0);
        assert_eq!(state.player.pos.z, PLAYER_RADIUS);
    }

    #[test]
    fn test_pitch_clamp_first_person() {
        let mut state = state();
        state.settings.camera_mode = CameraMode::FirstPerson;
        state.player.pitch = 88.9;
        let input = TickInput {
            look_up: true,
            ..Default::default()
        };
        update_player(&mut state, &input, 0.01);
        assert_eq!(state.player.pitch, MAX_PITCH_DEG);
    }

    #[test]
    fn test_third_person_orbit() {
        let mut state = state();
        let input = TickInput {
            look_down: true,
            orbit_left: true,
            ..Default::default()
        };
        state.camera.pitch = -0.1;
        update_player(&mut state, &input, 0.01);
        assert_eq!(state.camera.pitch, 0.0);
        assert_eq!(state.camera.yaw_offset, -0.5);
        assert_eq!(state.player.yaw, 0.0);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = state();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        update_player(&mut state, &fire, 0.01);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.player.shoot_cooldown, 0.3);
        let bullet = &state.bullets[0];
        assert_eq!(bullet.owner, Faction::Player);
        assert!(bullet.pos.z < state.player.pos.z);
        assert!((bullet.dir - Vec3::NEG_Z).length() < 1e-6);

        update_player(&mut state, &fire, 0.1);
        assert_eq!(state.bullets.len(), 1);
        update_player(&mut state, &fire, 0.25);
        assert_eq!(state.bullets.len(), 2);
    }

    #[test]
    fn test_double_damage_bullets() {
        let mut state = state();
        state.player.effects.open(Effect::DoubleDamage, 5.0);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        update_player(&mut state, &fire, 0.01);
        assert_eq!(state.bullets[0].damage, 2);
    }

    #[test]
    fn test_empty_magazine_cannot_fire() {
        let mut state = GameState::for_variant(Variant::Scavenger, 32).unwrap();
        state.player.ammo = Some(1);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        update_player(&mut state, &fire, 0.01);
        assert_eq!(state.player.ammo, Some(0));
        state.player.shoot_cooldown = 0.0;
        update_player(&mut state, &fire, 0.01);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_enemy_faces_and_approaches() {
        let mut state = state();
        maybe_spawn(&mut state);
        let before = state.enemies[0].pos.distance(state.player.pos);
        update_enemies(&mut state, 0.1);
        let enemy = &state.enemies[0];
        let after = enemy.pos.distance(state.player.pos);
        assert!(after < before);

        let facing = forward_from_yaw(enemy.yaw);
        let wanted = flatten(state.player.pos - enemy.pos).normalize();
        assert!(facing.dot(wanted) > 0.999);
    }

    #[test]
    fn test_enemy_holds_at_min_distance() {
        let mut state = state();
        maybe_spawn(&mut state);
        place_near_player(&mut state, 2.0);
        let before = state.enemies[0].pos;
        update_enemies(&mut state, 0.1);
        assert_eq!(state.enemies[0].pos, before);
    }

    #[test]
    fn test_enemy_fires_when_reloaded_and_in_range() {
        let mut state = state();
        maybe_spawn(&mut state);
        place_near_player(&mut state, 10.0);
        state.enemies[0].shoot_cooldown = 0.0;
        update_enemies(&mut state, 0.01);
        assert_eq!(state.bullets.len(), 1);
        let bullet = &state.bullets[0];
        assert_eq!(bullet.owner, Faction::Enemy);
        assert_eq!(bullet.damage, state.enemies[0].damage);
        assert_eq!(state.enemies[0].shoot_cooldown, state.enemies[0].reload_time);

        // Aimed at the torso
        let to_torso = (state.player.torso_center() - bullet.pos).normalize();
        assert!(bullet.dir.dot(to_torso) > 0.999);
    }

    #[test]
    fn test_enemy_out_of_range_holds_fire() {
        let mut state = state();
        maybe_spawn(&mut state);
        state.tuning.enemy_fire_range = 1.0;
        state.enemies[0].shoot_cooldown = 0.0;
        update_enemies(&mut state, 0.01);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_boss_volley_fan() {
        let mut state = GameState::for_variant(Variant::Frontier, 33).unwrap();
        begin_level(&mut state, 10);
        maybe_spawn(&mut state);
        assert!(state.enemies[0].is_boss);
        place_near_player(&mut state, 10.0);
        state.enemies[0].shoot_cooldown = 0.0;
        update_enemies(&mut state, 0.01);

        assert_eq!(state.bullets.len(), 5);
        let center = state.bullets[2].dir;
        let edge = state.bullets[0].dir;
        let angle = flatten(center).angle_between(flatten(edge)).to_degrees();
        assert!((angle - 20.0).abs() < 0.5);
    }

    #[test]
    fn test_enemy_clamped_to_arena() {
        let mut state = state();
        maybe_spawn(&mut state);
        state.enemies[0].pos.x = -5.0;
        update_enemies(&mut state, 0.01);
        let enemy = &state.enemies[0];
        assert!(enemy.pos.x >= enemy.collision_radius);
    }
}
