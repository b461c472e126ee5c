//! Bullet integration and hit resolution
//!
//! Bullets are single-hit spheres tested against the opposing faction once
//! per tick. There is no swept test, so a fast bullet can skip a thin target.

use glam::Vec3;

use super::config::{ArenaConfig, Color};
use super::perks;
use super::state::{Bullet, Enemy, Effect, Faction, GameEvent, GamePhase, GameState, GAME_OVER_COLOR};
use super::tick::start_transition;
use crate::consts::*;

const PLAYER_BULLET_COLOR: Color = [1.0, 1.0, 0.0];
const ENEMY_BULLET_COLOR: Color = [1.0, 0.5, 0.0];

/// Create a bullet travelling along `dir`
pub fn spawn_bullet(state: &mut GameState, pos: Vec3, dir: Vec3, owner: Faction, damage: u32) -> u32 {
    let id = state.next_entity_id();
    let color = match owner {
        Faction::Player => PLAYER_BULLET_COLOR,
        Faction::Enemy => ENEMY_BULLET_COLOR,
    };
    state.bullets.push(Bullet {
        id,
        pos,
        dir: dir.try_normalize().unwrap_or(Vec3::NEG_Z),
        owner,
        damage,
        lifespan: state.tuning.bullet_lifespan,
        color,
    });
    id
}

/// Sphere overlap, with the summed radii scaled by `tolerance`
#[inline]
pub fn sphere_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32, tolerance: f32) -> bool {
    a.distance(b) < (radius_a + radius_b) * tolerance
}

/// Inside the arena box, widened by `margin` on every side
pub fn in_arena_volume(arena: &ArenaConfig, pos: Vec3, margin: f32) -> bool {
    -margin < pos.x
        && pos.x < arena.size_x + margin
        && -margin < pos.y
        && pos.y < arena.wall_height + margin
        && -margin < pos.z
        && pos.z < arena.size_z + margin
}

/// Move every bullet, drop spent ones and resolve hits
pub fn update_bullets(state: &mut GameState, dt: f32) {
    let speed = state.tuning.bullet_speed;
    let radius = state.tuning.bullet_radius;
    let tolerance = state.tuning.hit_tolerance;
    let arena = state.config.arena;

    let mut spent = vec![false; state.bullets.len()];
    for i in 0..state.bullets.len() {
        let bullet = &mut state.bullets[i];
        bullet.pos += bullet.dir * speed * dt;
        bullet.lifespan -= dt;
        if bullet.lifespan <= 0.0 || !in_arena_volume(&arena, bullet.pos, radius) {
            spent[i] = true;
            continue;
        }

        let (pos, owner, damage) = (bullet.pos, bullet.owner, bullet.damage);
        match owner {
            Faction::Player => {
                let target = state
                    .enemies
                    .iter()
                    .position(|e| sphere_overlap(pos, radius, e.hit_point(pos), e.collision_radius, tolerance));
                if let Some(index) = target {
                    spent[i] = true;
                    damage_enemy(state, index, damage);
                }
            }
            Faction::Enemy => {
                if sphere_overlap(pos, radius, state.player.torso_center(), PLAYER_RADIUS, tolerance) {
                    spent[i] = true;
                    damage_player(state, damage);
                    if state.phase != GamePhase::Playing {
                        break;
                    }
                }
            }
        }
    }

    let mut flags = spent.into_iter();
    state.bullets.retain(|_| !flags.next().unwrap_or(false));
}

/// Apply damage to the enemy at `index`, removing it on death
fn damage_enemy(state: &mut GameState, index: usize, damage: u32) {
    let enemy = &mut state.enemies[index];
    enemy.health = enemy.health.saturating_sub(damage);
    if enemy.is_alive() {
        return;
    }
    let enemy = state.enemies.remove(index);
    handle_enemy_death(state, enemy);
}

/// Bookkeeping for an enemy that has just left the store
fn handle_enemy_death(state: &mut GameState, enemy: Enemy) {
    if state.director.boss == Some(enemy.id) {
        state.director.boss = None;
        log::info!("Boss {} defeated", enemy.kind);
    }
    state.director.killed += 1;

    let points = enemy.points * perks::score_multiplier(state);
    state.player.score = state.player.score.saturating_add(points);
    log::debug!("Enemy #{} killed for {} points", enemy.id, points);
    state.emit(GameEvent::EnemyKilled { id: enemy.id, points });

    perks::record_kill(state);
    perks::roll_drop(state, enemy.pos);
}

fn damage_player(state: &mut GameState, damage: u32) {
    let absorbed = state.player.effects.is_active(Effect::Invulnerable, state.clock);
    if !absorbed {
        state.player.health = state.player.health.saturating_sub(damage);
    }
    state.emit(GameEvent::PlayerHit { damage, absorbed });

    if state.player.is_dead() && state.phase == GamePhase::Playing {
        log::info!("Player died on level {} with score {}", state.level(), state.player.score);
        state.emit(GameEvent::PlayerDied);
        start_transition(state, GamePhase::GameOverTransition, GAME_OVER_COLOR);
    }
}
