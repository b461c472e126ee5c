//! Data-driven game balance
//!
//! Every number that differs between rule variants lives here so a variant
//! is just a different `Tuning` + `Settings` + `GameConfig` triple.

use serde::{Deserialize, Serialize};

use crate::settings::{CameraMode, ControlScheme, Settings};
use crate::sim::config::{ConfigError, GameConfig};

/// Known rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// 70x70 arena, rotate controls, exact sphere hits, kill-counter perks
    #[default]
    Classic,
    /// 100x100 arena with a mid-game miniboss, inverted forward, 1.5x hit tolerance
    Frontier,
    /// Strafe controls, limited ammo, perks drop as pickups
    Scavenger,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Frontier => "Frontier",
            Variant::Scavenger => "Scavenger",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "frontier" => Some(Variant::Frontier),
            "scavenger" => Some(Variant::Scavenger),
            _ => None,
        }
    }

    pub fn tuning(&self) -> Tuning {
        match self {
            Variant::Classic => Tuning::default(),
            Variant::Frontier => Tuning {
                hit_tolerance: 1.5,
                ..Tuning::default()
            },
            Variant::Scavenger => Tuning {
                max_ammo: Some(60),
                perks: PerkTuning {
                    kill_counter_perks: false,
                    drop_chance: 0.35,
                    ..PerkTuning::default()
                },
                ..Tuning::default()
            },
        }
    }

    pub fn settings(&self) -> Settings {
        match self {
            Variant::Classic => Settings::default(),
            Variant::Frontier => Settings {
                invert_forward: true,
                ..Settings::default()
            },
            Variant::Scavenger => Settings {
                control_scheme: ControlScheme::Strafe,
                camera_mode: CameraMode::FirstPerson,
                ..Settings::default()
            },
        }
    }

    pub fn game_config(&self) -> GameConfig {
        match self {
            Variant::Classic | Variant::Scavenger => GameConfig::classic(),
            Variant::Frontier => GameConfig::frontier(),
        }
    }
}

/// Enemy placement policy for the level director
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTuning {
    /// Inset from each wall for spawn candidates
    pub margin: f32,
    pub min_player_distance: f32,
    pub min_enemy_distance: f32,
    pub max_attempts: u32,
    /// Fresh enemies wait a random time in this range before their first shot
    pub initial_cooldown_min: f32,
    pub initial_cooldown_max: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            margin: 7.0,
            min_player_distance: 15.0,
            min_enemy_distance: 5.0,
            max_attempts: 20,
            initial_cooldown_min: 1.0,
            initial_cooldown_max: 3.0,
        }
    }
}

/// Kill-counter perks and pickup windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerkTuning {
    /// Kills unlock perks; off when perks only come from pickups
    pub kill_counter_perks: bool,
    pub health_kills: u32,
    pub score_kills: u32,
    pub rapid_fire_kills: u32,
    pub score_multiplier: u64,
    /// Window lengths in seconds
    pub score_window: f64,
    pub rapid_fire_window: f64,
    pub pickup_window: f64,
    /// Probability that a kill drops a pickup (0 disables pickups)
    pub drop_chance: f64,
    pub damage_multiplier: u32,
}

impl Default for PerkTuning {
    fn default() -> Self {
        Self {
            kill_counter_perks: true,
            health_kills: 3,
            score_kills: 4,
            rapid_fire_kills: 5,
            score_multiplier: 2,
            score_window: 5.0,
            rapid_fire_window: 5.0,
            pickup_window: 5.0,
            drop_chance: 0.0,
            damage_multiplier: 2,
        }
    }
}

/// Game balance numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Player move speed (units/sec); enemy speed is a multiple of it
    pub player_speed: f32,
    /// Yaw change per tick while turning (degrees, not time-scaled)
    pub rotate_step_deg: f32,
    pub player_max_health: u32,
    pub base_shoot_cooldown: f32,
    /// Cooldown while rapid fire is active
    pub rapid_fire_cooldown: f32,
    pub player_bullet_damage: u32,
    /// Magazine size (`None` = unlimited)
    pub max_ammo: Option<u32>,

    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_lifespan: f32,
    /// Multiplier on the summed radii for bullet hits
    pub hit_tolerance: f32,

    /// Enemies stop closing in at this distance
    pub enemy_min_approach: f32,
    pub enemy_fire_range: f32,
    /// Reload time is this divided by (speed_mult + 0.5)
    pub enemy_reload_base: f32,

    pub spawn: SpawnTuning,
    pub perks: PerkTuning,

    /// Length of level/game-over/restart transitions (seconds)
    pub transition_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            rotate_step_deg: 0.5,
            player_max_health: 100,
            base_shoot_cooldown: 0.3,
            rapid_fire_cooldown: 0.001,
            player_bullet_damage: 1,
            max_ammo: None,
            bullet_speed: 30.0,
            bullet_radius: 0.1,
            bullet_lifespan: 2.5,
            hit_tolerance: 1.0,
            enemy_min_approach: 3.5,
            enemy_fire_range: 30.0,
            enemy_reload_base: 1.5,
            spawn: SpawnTuning::default(),
            perks: PerkTuning::default(),
            transition_duration: 1.5,
        }
    }
}

impl Tuning {
    /// Check values the simulation relies on (RNG ranges, probabilities)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.perks.drop_chance) {
            return Err(ConfigError::Probability(self.perks.drop_chance));
        }
        if self.spawn.initial_cooldown_min >= self.spawn.initial_cooldown_max {
            return Err(ConfigError::InvalidTuning(
                "initial_cooldown_min must be below initial_cooldown_max",
            ));
        }
        if self.spawn.max_attempts == 0 {
            return Err(ConfigError::InvalidTuning("spawn.max_attempts must be at least 1"));
        }
        if self.hit_tolerance <= 0.0 {
            return Err(ConfigError::InvalidTuning("hit_tolerance must be positive"));
        }
        if self.transition_duration < 0.0 {
            return Err(ConfigError::InvalidTuning("transition_duration cannot be negative"));
        }
        Ok(())
    }
}
