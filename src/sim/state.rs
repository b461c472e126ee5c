//! Game state and core simulation types
//!
//! `GameState` owns every mutable collection plus the configuration it was
//! built from. Components are free functions taking `&mut GameState`.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::config::{Color, ConfigError, EnemyTypeId, GameConfig, Volley};
use super::director::{self, LevelDirector};
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::{Tuning, Variant};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Level cleared, next level loads when the timer runs out
    LevelTransition,
    /// Player died, current level restarts when the timer runs out
    GameOverTransition,
    /// Full restart from level 1
    RestartTransition,
    /// Final level cleared (terminal until a restart)
    YouWin,
}

impl GamePhase {
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            GamePhase::LevelTransition | GamePhase::GameOverTransition | GamePhase::RestartTransition
        )
    }
}

/// Countdown attached to a transition phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub remaining: f32,
    pub duration: f32,
    /// Overlay color for the renderer
    pub color: Color,
    pub resume_into: GamePhase,
}

impl Transition {
    /// Fraction elapsed in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// Kill-counter perks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerkKind {
    /// Instant full heal
    Health,
    ScoreMultiplier,
    RapidFire,
}

impl PerkKind {
    pub const ALL: [PerkKind; 3] = [PerkKind::Health, PerkKind::ScoreMultiplier, PerkKind::RapidFire];
}

/// Timed gameplay modifiers on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    ScoreMultiplier,
    RapidFire,
    Invulnerable,
    DoubleDamage,
}

impl Effect {
    pub const ALL: [Effect; 4] = [
        Effect::ScoreMultiplier,
        Effect::RapidFire,
        Effect::Invulnerable,
        Effect::DoubleDamage,
    ];
}

/// Kill counter and availability flag for one perk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkTrack {
    pub kills: u32,
    pub available: bool,
}

/// The three kill-counter perks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkLedger {
    pub health: PerkTrack,
    pub score: PerkTrack,
    pub rapid_fire: PerkTrack,
}

impl PerkLedger {
    pub fn track(&self, kind: PerkKind) -> &PerkTrack {
        match kind {
            PerkKind::Health => &self.health,
            PerkKind::ScoreMultiplier => &self.score,
            PerkKind::RapidFire => &self.rapid_fire,
        }
    }

    pub fn track_mut(&mut self, kind: PerkKind) -> &mut PerkTrack {
        match kind {
            PerkKind::Health => &mut self.health,
            PerkKind::ScoreMultiplier => &mut self.score,
            PerkKind::RapidFire => &mut self.rapid_fire,
        }
    }
}

/// Active timed windows (simulation-clock timestamps)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub score_multiplier_until: Option<f64>,
    pub rapid_fire_until: Option<f64>,
    pub invulnerable_until: Option<f64>,
    pub double_damage_until: Option<f64>,
}

impl ActiveEffects {
    fn slot(&self, effect: Effect) -> &Option<f64> {
        match effect {
            Effect::ScoreMultiplier => &self.score_multiplier_until,
            Effect::RapidFire => &self.rapid_fire_until,
            Effect::Invulnerable => &self.invulnerable_until,
            Effect::DoubleDamage => &self.double_damage_until,
        }
    }

    fn slot_mut(&mut self, effect: Effect) -> &mut Option<f64> {
        match effect {
            Effect::ScoreMultiplier => &mut self.score_multiplier_until,
            Effect::RapidFire => &mut self.rapid_fire_until,
            Effect::Invulnerable => &mut self.invulnerable_until,
            Effect::DoubleDamage => &mut self.double_damage_until,
        }
    }

    pub fn is_active(&self, effect: Effect, now: f64) -> bool {
        self.slot(effect).is_some_and(|until| now < until)
    }

    /// Open (or extend) a window ending at `until`
    pub fn open(&mut self, effect: Effect, until: f64) {
        let slot = self.slot_mut(effect);
        *slot = Some(slot.map_or(until, |current| current.max(until)));
    }

    /// Seconds left on a window (0 when inactive)
    pub fn remaining(&self, effect: Effect, now: f64) -> f64 {
        self.slot(effect).map_or(0.0, |until| (until - now).max(0.0))
    }

    /// Close every window whose end has passed, returning the ones closed
    pub fn expire(&mut self, now: f64) -> Vec<Effect> {
        let mut expired = Vec::new();
        for effect in Effect::ALL {
            let slot = self.slot_mut(effect);
            if slot.is_some_and(|until| now >= until) {
                *slot = None;
                expired.push(effect);
            }
        }
        expired
    }
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Body center
    pub pos: Vec3,
    /// Degrees, 0 faces -Z
    pub yaw: f32,
    /// Degrees, clamped to ±89 (first person only)
    pub pitch: f32,
    pub health: u32,
    pub max_health: u32,
    pub score: u64,
    pub speed: f32,
    /// Seconds until the next shot is allowed
    pub shoot_cooldown: f32,
    /// Cooldown applied after each shot (shortened by rapid fire)
    pub cooldown_duration: f32,
    /// Rounds left (`None` = unlimited)
    pub ammo: Option<u32>,
    pub perks: PerkLedger,
    pub effects: ActiveEffects,
}

impl Player {
    pub fn new(tuning: &Tuning, spawn: Vec3) -> Self {
        Self {
            pos: spawn,
            yaw: 0.0,
            pitch: 0.0,
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            score: 0,
            speed: tuning.player_speed,
            shoot_cooldown: 0.0,
            cooldown_duration: tuning.base_shoot_cooldown,
            ammo: tuning.max_ammo,
            perks: PerkLedger::default(),
            effects: ActiveEffects::default(),
        }
    }

    /// Point enemies aim at and bullets are tested against
    pub fn torso_center(&self) -> Vec3 {
        Vec3::new(
            self.pos.x,
            self.pos.y - PLAYER_BODY_Y_OFFSET + PLAYER_TOTAL_HEIGHT / 2.0,
            self.pos.z,
        )
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyTypeId,
    /// Body center
    pub pos: Vec3,
    pub yaw: f32,
    pub health: u32,
    pub max_health: u32,
    /// Damage of each bullet it fires
    pub damage: u32,
    pub speed: f32,
    pub reload_time: f32,
    pub shoot_cooldown: f32,
    pub points: u64,
    pub collision_radius: f32,
    pub model_height: f32,
    pub color: Color,
    pub is_boss: bool,
    pub volley: Option<Volley>,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Closest point on the body axis to `toward`
    ///
    /// The collision sphere slides along the model's height, so tall and short
    /// types are hittable at any height they physically cover.
    pub fn hit_point(&self, toward: Vec3) -> Vec3 {
        let half = (self.model_height / 2.0 - self.collision_radius).max(0.0);
        let y = toward.y.clamp(self.pos.y - half, self.pos.y + half);
        Vec3::new(self.pos.x, y, self.pos.z)
    }
}

/// A bullet entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec3,
    /// Unit direction
    pub dir: Vec3,
    pub owner: Faction,
    pub damage: u32,
    /// Seconds left before it fizzles
    pub lifespan: f32,
    pub color: Color,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Refill ammo and open a rapid-fire window
    Ammo,
    /// Refill health and open an invulnerability window
    Health,
    /// Open a double-damage window
    Damage,
}

impl PickupKind {
    pub const ALL: [PickupKind; 3] = [PickupKind::Ammo, PickupKind::Health, PickupKind::Damage];
}

/// A pickup lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec3,
    /// Cosmetic rotation (degrees)
    pub spin: f32,
}

/// Third-person chase camera orbit (updated from intents, drawn elsewhere)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOrbit {
    pub distance: f32,
    pub pitch: f32,
    pub yaw_offset: f32,
}

impl Default for CameraOrbit {
    fn default() -> Self {
        Self {
            distance: 8.0,
            pitch: -30.0,
            yaw_offset: 0.0,
        }
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    EnemySpawned { id: u32, kind: EnemyTypeId, boss: bool },
    /// No free spot was found; the token went back into the pool
    SpawnDeferred { kind: EnemyTypeId },
    EnemyKilled { id: u32, points: u64 },
    PlayerHit { damage: u32, absorbed: bool },
    PerkUnlocked(PerkKind),
    PerkActivated(PerkKind),
    EffectExpired(Effect),
    PickupDropped { kind: PickupKind },
    PickupCollected { kind: PickupKind },
    LevelCleared { level: u32 },
    PlayerDied,
    Victory { score: u64 },
    Restarted,
}

/// Overlay colors for transitions
pub const LEVEL_CLEAR_COLOR: Color = [0.0, 1.0, 0.0];
pub const GAME_OVER_COLOR: Color = [1.0, 0.0, 0.0];
pub const RESTART_COLOR: Color = [0.0, 0.0, 0.0];

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub tuning: Tuning,
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock in seconds (perk windows are measured on it)
    pub clock: f64,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub transition: Option<Transition>,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub pickups: Vec<Pickup>,
    pub director: LevelDirector,
    pub camera: CameraOrbit,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Validate the configuration and start level 1
    pub fn new(config: GameConfig, tuning: Tuning, settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        config.validate(&tuning)?;

        let player = Player::new(&tuning, player_spawn(&config));
        let mut state = Self {
            config,
            tuning,
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock: 0.0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            transition: None,
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            pickups: Vec::new(),
            director: LevelDirector::default(),
            camera: CameraOrbit::default(),
            events: Vec::new(),
            next_id: 1,
        };
        director::begin_level(&mut state, 1);
        Ok(state)
    }

    /// Built-in tables, tuning and controls for a rule variant
    pub fn for_variant(variant: Variant, seed: u64) -> Result<Self, ConfigError> {
        Self::new(variant.game_config(), variant.tuning(), variant.settings(), seed)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn level(&self) -> u32 {
        self.director.level
    }

    pub fn is_final_level(&self) -> bool {
        self.director.level >= self.config.level_count()
    }

    pub fn boss(&self) -> Option<&Enemy> {
        let id = self.director.boss?;
        self.enemies.iter().find(|e| e.id == id)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

/// Player start: arena center, standing on the floor
pub fn player_spawn(config: &GameConfig) -> Vec3 {
    config.arena.center() + Vec3::new(0.0, PLAYER_BODY_Y_OFFSET, 0.0)
}
