//! Level director: spawn pacing and level completion
//!
//! Paces enemy introduction under the level's concurrency cap, gives the
//! boss spawn priority on boss levels and never counts an enemy as spawned
//! unless it was actually placed.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::EnemyTypeId;
use super::state::{Enemy, GameEvent, GamePhase, GameState, LEVEL_CLEAR_COLOR, player_spawn};
use super::tick::start_transition;

/// Per-level spawn bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDirector {
    /// Current level (1-based)
    pub level: u32,
    /// Enemies placed this level
    pub spawned: u32,
    pub killed: u32,
    /// Tokens still to spawn this level
    pub pool: Vec<EnemyTypeId>,
    /// Entity id of the live boss, if any
    pub boss: Option<u32>,
}

/// Outcome of a spawn attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnOutcome {
    Spawned { id: u32 },
    /// Cap reached, quota met or pool empty
    Idle,
    /// Placement failed; the token was returned to the pool
    Deferred,
    /// Level or enemy type missing from the configuration
    Invalid,
}

/// Reset the level: counters, entities, boss link, spawn pool and player pose
///
/// Health and score carry over; perk progress does not.
pub fn begin_level(state: &mut GameState, level: u32) {
    let pool = match state.config.level(level) {
        Some(level_config) => state.config.spawn_pool(level_config),
        None => {
            log::warn!("Level {} is not configured; nothing will spawn", level);
            Vec::new()
        }
    };

    state.director = LevelDirector {
        level,
        spawned: 0,
        killed: 0,
        pool,
        boss: None,
    };
    state.enemies.clear();
    state.bullets.clear();
    state.pickups.clear();

    let player = &mut state.player;
    player.pos = player_spawn(&state.config);
    player.yaw = 0.0;
    player.pitch = 0.0;
    player.shoot_cooldown = 0.0;
    player.cooldown_duration = state.tuning.base_shoot_cooldown;
    player.perks = Default::default();
    player.effects = Default::default();

    log::info!("Level {} started ({} enemies)", level, state.director.pool.len());
    state.emit(GameEvent::LevelStarted { level });
}

/// True while the designated boss is alive
pub fn boss_alive(state: &GameState) -> bool {
    state.boss().is_some_and(|boss| boss.is_alive())
}

/// Concurrency cap in force right now
pub fn active_cap(state: &GameState) -> u32 {
    match state.config.level(state.director.level) {
        Some(level) if level.is_boss_level && boss_alive(state) => level.boss_phase_cap(),
        Some(level) => level.max_concurrent,
        None => 0,
    }
}

/// Spawn one enemy if the cap and the level quota allow it
pub fn maybe_spawn(state: &mut GameState) -> SpawnOutcome {
    let Some(level) = state.config.level(state.director.level) else {
        return SpawnOutcome::Invalid;
    };
    let total = level.total_enemies;
    let is_boss_level = level.is_boss_level;

    if state.enemies.len() as u32 >= active_cap(state) || state.director.spawned >= total {
        return SpawnOutcome::Idle;
    }

    let Some(token) = draw_token(state, is_boss_level) else {
        return SpawnOutcome::Idle;
    };
    let Some(def) = state.config.enemy_type(&token).cloned() else {
        log::debug!("Unknown enemy type '{}', spawn abandoned", token);
        return_token(state, token, is_boss_level);
        return SpawnOutcome::Invalid;
    };

    let Some(pos) = find_spawn_point(state, def.body_center_y()) else {
        log::debug!("No room for '{}' this tick, returning it to the pool", token);
        state.emit(GameEvent::SpawnDeferred { kind: token.clone() });
        return_token(state, token, is_boss_level);
        return SpawnOutcome::Deferred;
    };

    let tuning = &state.tuning;
    let spawn = &tuning.spawn;
    let shoot_cooldown = state
        .rng
        .random_range(spawn.initial_cooldown_min..spawn.initial_cooldown_max);
    let speed = def.move_speed(tuning.player_speed);
    let reload_time = def.reload_time(tuning.enemy_reload_base);

    let id = state.next_entity_id();
    let is_boss = def.is_boss && is_boss_level;
    state.enemies.push(Enemy {
        id,
        kind: token.clone(),
        pos,
        yaw: 0.0,
        health: def.health,
        max_health: def.health,
        damage: def.damage,
        speed,
        reload_time,
        shoot_cooldown,
        points: def.points,
        collision_radius: def.collision_radius(),
        model_height: def.model_height,
        color: def.color,
        is_boss,
        volley: def.volley,
    });
    state.director.spawned += 1;
    if is_boss {
        state.director.boss = Some(id);
    }

    log::debug!(
        "Spawned {} #{} at ({:.1}, {:.1}) [{}/{}]",
        def.name,
        id,
        pos.x,
        pos.z,
        state.director.spawned,
        total
    );
    state.emit(GameEvent::EnemySpawned {
        id,
        kind: token,
        boss: is_boss,
    });
    SpawnOutcome::Spawned { id }
}

/// Take the next token out of the pool
///
/// Boss levels put the boss first while none is alive, then draw non-boss
/// tokens at random. Other levels consume the pool in order.
fn draw_token(state: &mut GameState, is_boss_level: bool) -> Option<EnemyTypeId> {
    if state.director.pool.is_empty() {
        return None;
    }
    if !is_boss_level {
        return Some(state.director.pool.remove(0));
    }

    if state.director.boss.is_none() {
        let boss_index = state
            .director
            .pool
            .iter()
            .position(|id| state.config.is_boss_type(id));
        if let Some(index) = boss_index {
            return Some(state.director.pool.remove(index));
        }
    }

    let candidates: Vec<usize> = state
        .director
        .pool
        .iter()
        .enumerate()
        .filter(|(_, id)| !state.config.is_boss_type(id))
        .map(|(index, _)| index)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let pick = candidates[state.rng.random_range(0..candidates.len())];
    Some(state.director.pool.remove(pick))
}

/// Put an unplaced token back so it is neither lost nor double-spent
fn return_token(state: &mut GameState, token: EnemyTypeId, is_boss_level: bool) {
    if state.config.is_boss_type(&token) || !is_boss_level {
        state.director.pool.insert(0, token);
    } else {
        state.director.pool.push(token);
    }
}

/// Random floor point away from the player and other enemies
fn find_spawn_point(state: &mut GameState, height: f32) -> Option<Vec3> {
    let arena = state.config.arena;
    let spawn = state.tuning.spawn;

    for _ in 0..spawn.max_attempts {
        let x = state.rng.random_range(spawn.margin..arena.size_x - spawn.margin);
        let z = state.rng.random_range(spawn.margin..arena.size_z - spawn.margin);
        let candidate = Vec3::new(x, height, z);

        if candidate.distance(state.player.pos) < spawn.min_player_distance {
            continue;
        }
        if state
            .enemies
            .iter()
            .any(|e| candidate.distance(e.pos) < spawn.min_enemy_distance)
        {
            continue;
        }
        return Some(candidate);
    }
    None
}

/// Signal level clear (or victory on the final level) once the quota is
/// spawned and nothing is left alive. No-op outside `Playing`.
pub fn check_level_completion(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let Some(level) = state.config.level(state.director.level) else {
        return;
    };
    if state.director.spawned < level.total_enemies || !state.enemies.is_empty() {
        return;
    }

    let cleared = state.director.level;
    state.emit(GameEvent::LevelCleared { level: cleared });
    if state.is_final_level() {
        let score = state.player.score;
        log::info!("Final level cleared - victory with score {}", score);
        state.phase = GamePhase::YouWin;
        state.emit(GameEvent::Victory { score });
    } else {
        log::info!("Level {} cleared", cleared);
        start_transition(state, GamePhase::LevelTransition, LEVEL_CLEAR_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::{GameConfig, LevelConfig};
    use crate::tuning::{Tuning, Variant};
    use crate::Settings;

    fn classic(seed: u64) -> GameState {
        GameState::for_variant(Variant::Classic, seed).unwrap()
    }

    /// Remove an enemy the way a kill does
    fn kill(state: &mut GameState, id: u32) {
        state.enemies.retain(|e| e.id != id);
        if state.director.boss == Some(id) {
            state.director.boss = None;
        }
        state.director.killed += 1;
    }

    #[test]
    fn test_respects_concurrency_cap() {
        let mut state = classic(1);
        assert!(matches!(maybe_spawn(&mut state), SpawnOutcome::Spawned { .. }));
        assert_eq!(maybe_spawn(&mut state), SpawnOutcome::Idle);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.director.spawned, 1);
        assert_eq!(state.director.pool.len(), 4);
    }

    #[test]
    fn test_spawn_placement_rules() {
        let mut state = classic(2);
        begin_level(&mut state, 3);
        for _ in 0..3 {
            assert!(matches!(maybe_spawn(&mut state), SpawnOutcome::Spawned { .. }));
        }
        let spawn = state.tuning.spawn;
        let arena = state.config.arena;
        for (i, e) in state.enemies.iter().enumerate() {
            assert!(e.pos.x >= spawn.margin && e.pos.x <= arena.size_x - spawn.margin);
            assert!(e.pos.z >= spawn.margin && e.pos.z <= arena.size_z - spawn.margin);
            assert!(e.pos.distance(state.player.pos) >= spawn.min_player_distance);
            for other in &state.enemies[i + 1..] {
                assert!(e.pos.distance(other.pos) >= spawn.min_enemy_distance);
            }
            assert!(e.shoot_cooldown >= 1.0 && e.shoot_cooldown < 3.0);
        }
    }

    #[test]
    fn test_spawn_count_conservation() {
        let mut state = classic(3);
        let total = state.config.level(1).unwrap().total_enemies;
        let mut created = 0;
        for _ in 0..50 {
            if let SpawnOutcome::Spawned { id } = maybe_spawn(&mut state) {
                created += 1;
                kill(&mut state, id);
            }
        }
        assert_eq!(created, total);
        assert_eq!(state.director.spawned, total);
        assert!(state.director.pool.is_empty());
    }

    #[test]
    fn test_boss_spawns_first_and_once() {
        let mut state = classic(4);
        begin_level(&mut state, 10);

        let SpawnOutcome::Spawned { id } = maybe_spawn(&mut state) else {
            panic!("boss should spawn");
        };
        assert_eq!(state.director.boss, Some(id));
        assert!(state.boss().unwrap().is_boss);
        assert_eq!(active_cap(&state), 4);
        assert!(!state.director.pool.iter().any(|t| state.config.is_boss_type(t)));

        // Boss phase cap lets three more in alongside the boss
        for _ in 0..10 {
            maybe_spawn(&mut state);
        }
        assert_eq!(state.enemies.len(), 4);
        assert_eq!(state.enemies.iter().filter(|e| e.is_boss).count(), 1);

        // Boss down: cap falls back to the normal cap
        kill(&mut state, id);
        assert_eq!(active_cap(&state), 1);
        assert_eq!(maybe_spawn(&mut state), SpawnOutcome::Idle);
    }

    #[test]
    fn test_failed_placement_returns_token() {
        let mut tuning = Tuning::default();
        // Nowhere in the arena is this far from the player
        tuning.spawn.min_player_distance = 500.0;
        let mut state = GameState::new(GameConfig::classic(), tuning, Settings::default(), 5).unwrap();
        begin_level(&mut state, 10);
        let pool_before = state.director.pool.clone();

        assert_eq!(maybe_spawn(&mut state), SpawnOutcome::Deferred);
        assert_eq!(state.director.spawned, 0);
        assert!(state.enemies.is_empty());
        assert_eq!(state.director.pool, pool_before);
        assert_eq!(state.director.pool[0].as_str(), "boss");
        assert!(matches!(state.events.last(), Some(GameEvent::SpawnDeferred { .. })));
    }

    #[test]
    fn test_unknown_type_is_not_counted() {
        let mut state = classic(6);
        state.director.pool[0] = "ghost".into();
        assert_eq!(maybe_spawn(&mut state), SpawnOutcome::Invalid);
        assert_eq!(state.director.spawned, 0);
        assert_eq!(state.director.pool.len(), 5);
    }

    #[test]
    fn test_missing_level_is_a_no_op() {
        let mut state = classic(7);
        begin_level(&mut state, 42);
        assert_eq!(maybe_spawn(&mut state), SpawnOutcome::Invalid);
        check_level_completion(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_level_completion_after_five_cycles() {
        let mut state = classic(8);
        for cycle in 0..5 {
            let SpawnOutcome::Spawned { id } = maybe_spawn(&mut state) else {
                panic!("cycle {cycle} should spawn");
            };
            check_level_completion(&mut state);
            assert_eq!(state.phase, GamePhase::Playing);
            kill(&mut state, id);
        }
        check_level_completion(&mut state);
        assert_eq!(state.phase, GamePhase::LevelTransition);
        assert!(state.transition.is_some());
        assert!(state.events.contains(&GameEvent::LevelCleared { level: 1 }));
    }

    #[test]
    fn test_final_level_signals_victory() {
        let mut config = GameConfig::classic();
        config.levels = vec![LevelConfig::new(1, 1, &["wolf1"])];
        let mut state = GameState::new(config, Tuning::default(), Settings::default(), 9).unwrap();

        let SpawnOutcome::Spawned { id } = maybe_spawn(&mut state) else {
            panic!("should spawn");
        };
        kill(&mut state, id);
        check_level_completion(&mut state);
        assert_eq!(state.phase, GamePhase::YouWin);
        assert!(state.transition.is_none());

        // Not playing any more: completion check does nothing
        state.events.clear();
        check_level_completion(&mut state);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_begin_level_resets_perks_but_keeps_vitals() {
        let mut state = classic(10);
        state.player.health = 40;
        state.player.score = 250;
        state.player.perks.health.available = true;
        state.player.perks.score.kills = 3;
        state.player.effects.rapid_fire_until = Some(99.0);
        state.player.pos.x = 3.0;
        maybe_spawn(&mut state);

        begin_level(&mut state, 2);
        assert_eq!(state.player.health, 40);
        assert_eq!(state.player.score, 250);
        assert!(!state.player.perks.health.available);
        assert_eq!(state.player.perks.score.kills, 0);
        assert_eq!(state.player.effects.rapid_fire_until, None);
        assert_eq!(state.player.pos, player_spawn(&state.config));
        assert!(state.enemies.is_empty());
        assert_eq!(state.director.spawned, 0);
        assert_eq!(state.director.pool.len(), 6);
    }
}
