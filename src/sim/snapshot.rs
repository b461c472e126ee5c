//! Read-only render snapshot
//!
//! An owned copy of everything a renderer or HUD draws. Taking one never
//! touches the simulation.

use serde::Serialize;

use super::config::Color;
use super::state::{Bullet, CameraOrbit, Effect, Enemy, GamePhase, GameState, Pickup, Player};
use crate::settings::CameraMode;

/// Overlay shown during a transition phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionView {
    pub color: Color,
    /// 0 at the start, 1 when the timer runs out
    pub progress: f32,
}

/// HUD countdown for an open perk window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectTimer {
    pub effect: Effect,
    /// Seconds left
    pub remaining: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub level: u32,
    pub level_count: u32,
    pub phase: GamePhase,
    pub transition: Option<TransitionView>,
    pub clock: f64,
    pub player: Player,
    pub effects: Vec<EffectTimer>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub pickups: Vec<Pickup>,
    pub camera_mode: CameraMode,
    pub camera: CameraOrbit,
    /// Spawned/total for the HUD
    pub spawned: u32,
    pub killed: u32,
    pub total_enemies: u32,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let total_enemies = self
            .config
            .level(self.director.level)
            .map_or(0, |level| level.total_enemies);
        Snapshot {
            level: self.director.level,
            level_count: self.config.level_count(),
            phase: self.phase,
            transition: self.transition.map(|t| TransitionView {
                color: t.color,
                progress: t.progress(),
            }),
            clock: self.clock,
            player: self.player.clone(),
            effects: Effect::ALL
                .into_iter()
                .filter(|&effect| self.player.effects.is_active(effect, self.clock))
                .map(|effect| EffectTimer {
                    effect,
                    remaining: self.player.effects.remaining(effect, self.clock),
                })
                .collect(),
            enemies: self.enemies.clone(),
            bullets: self.bullets.clone(),
            pickups: self.pickups.clone(),
            camera_mode: self.settings.camera_mode,
            camera: self.camera,
            spawned: self.director.spawned,
            killed: self.director.killed,
            total_enemies,
        }
    }
}
