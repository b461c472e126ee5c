//! Perk engine: kill counters, timed windows and world pickups

use glam::Vec3;
use rand::Rng;

use super::state::{Effect, GameEvent, GameState, PerkKind, Pickup, PickupKind};
use crate::consts::*;

/// Kills needed to unlock a perk
fn threshold(state: &GameState, kind: PerkKind) -> u32 {
    let perks = &state.tuning.perks;
    match kind {
        PerkKind::Health => perks.health_kills,
        PerkKind::ScoreMultiplier => perks.score_kills,
        PerkKind::RapidFire => perks.rapid_fire_kills,
    }
}

/// Count a kill toward every perk that is not already waiting to be used
pub fn record_kill(state: &mut GameState) {
    if !state.tuning.perks.kill_counter_perks {
        return;
    }
    for kind in PerkKind::ALL {
        let needed = threshold(state, kind);
        let track = state.player.perks.track_mut(kind);
        if track.available {
            continue;
        }
        track.kills += 1;
        if track.kills >= needed {
            track.available = true;
            log::debug!("{:?} perk unlocked", kind);
            state.emit(GameEvent::PerkUnlocked(kind));
        }
    }
}

/// Consume an available perk. Returns false if it was not available.
pub fn activate(state: &mut GameState, kind: PerkKind) -> bool {
    if !state.tuning.perks.kill_counter_perks {
        return false;
    }
    let track = state.player.perks.track_mut(kind);
    if !track.available {
        return false;
    }
    track.available = false;
    track.kills = 0;

    let now = state.clock;
    let perks = state.tuning.perks;
    match kind {
        PerkKind::Health => state.player.health = state.player.max_health,
        PerkKind::ScoreMultiplier => {
            state.player.effects.open(Effect::ScoreMultiplier, now + perks.score_window)
        }
        PerkKind::RapidFire => {
            state.player.effects.open(Effect::RapidFire, now + perks.rapid_fire_window);
            refresh_cooldown_duration(state);
        }
    }

    log::debug!("{:?} perk activated", kind);
    state.emit(GameEvent::PerkActivated(kind));
    true
}

/// Close finished windows and settle the fire-rate they control
pub fn expire_windows(state: &mut GameState) {
    for effect in state.player.effects.expire(state.clock) {
        log::debug!("{:?} expired", effect);
        state.emit(GameEvent::EffectExpired(effect));
    }
    refresh_cooldown_duration(state);
}

fn refresh_cooldown_duration(state: &mut GameState) {
    state.player.cooldown_duration = if state.player.effects.is_active(Effect::RapidFire, state.clock) {
        state.tuning.rapid_fire_cooldown
    } else {
        state.tuning.base_shoot_cooldown
    };
}

/// Points multiplier currently applied to kills
pub fn score_multiplier(state: &GameState) -> u64 {
    if state.player.effects.is_active(Effect::ScoreMultiplier, state.clock) {
        state.tuning.perks.score_multiplier
    } else {
        1
    }
}

/// Damage of one player bullet right now
pub fn player_bullet_damage(state: &GameState) -> u32 {
    let base = state.tuning.player_bullet_damage;
    if state.player.effects.is_active(Effect::DoubleDamage, state.clock) {
        base.saturating_mul(state.tuning.perks.damage_multiplier)
    } else {
        base
    }
}

/// Maybe leave a pickup where an enemy died
pub fn roll_drop(state: &mut GameState, at: Vec3) {
    let chance = state.tuning.perks.drop_chance;
    if chance <= 0.0 || !state.rng.random_bool(chance) {
        return;
    }

    let kind = PickupKind::ALL[state.rng.random_range(0..PickupKind::ALL.len())];
    let id = state.next_entity_id();
    state.pickups.push(Pickup {
        id,
        kind,
        pos: Vec3::new(at.x, PICKUP_HOVER_Y, at.z),
        spin: 0.0,
    });
    state.emit(GameEvent::PickupDropped { kind });
}

/// Spin pickups and collect the ones the player walks over
pub fn update_pickups(state: &mut GameState, dt: f32) {
    if state.pickups.is_empty() {
        return;
    }

    let player = Vec3::new(state.player.pos.x, 0.0, state.player.pos.z);
    let mut collected = Vec::new();
    state.pickups.retain_mut(|pickup| {
        pickup.spin = (pickup.spin + PICKUP_SPIN_DEG_PER_SEC * dt) % 360.0;
        let flat = Vec3::new(pickup.pos.x, 0.0, pickup.pos.z);
        if flat.distance(player) < PLAYER_RADIUS + PICKUP_RADIUS {
            collected.push(pickup.kind);
            false
        } else {
            true
        }
    });

    for kind in collected {
        apply_pickup(state, kind);
    }
}

fn apply_pickup(state: &mut GameState, kind: PickupKind) {
    let until = state.clock + state.tuning.perks.pickup_window;
    let player = &mut state.player;
    match kind {
        PickupKind::Ammo => {
            player.ammo = state.tuning.max_ammo;
            player.effects.open(Effect::RapidFire, until);
            refresh_cooldown_duration(state);
        }
        PickupKind::Health => {
            player.health = player.max_health;
            player.effects.open(Effect::Invulnerable, until);
        }
        PickupKind::Damage => player.effects.open(Effect::DoubleDamage, until),
    }
    log::debug!("Collected {:?} pickup", kind);
    state.emit(GameEvent::PickupCollected { kind });
}
