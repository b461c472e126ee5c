//! Level and enemy-type tables
//!
//! Configuration is loaded once (built-in or JSON) and never mutated by the
//! simulation. The only mutable copy is the per-level spawn pool owned by the
//! level director.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ENEMY_BASE_COLLISION_RADIUS, PLAYER_TOTAL_HEIGHT};
use crate::tuning::Tuning;

/// RGB color carried with type definitions for the renderer
pub type Color = [f32; 3];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Level table is empty")]
    NoLevels,
    #[error("Arena dimensions must be positive")]
    InvalidArena,
    #[error("Level {level}: total_enemies must be at least 1")]
    ZeroTotal { level: u32 },
    #[error("Level {level}: concurrency caps must be at least 1")]
    ZeroCap { level: u32 },
    #[error("Level {level}: enemy_types is empty")]
    EmptyPool { level: u32 },
    #[error("Level {level}: unknown enemy type '{id}'")]
    UnknownEnemyType { level: u32, id: EnemyTypeId },
    #[error("Level {level}: boss type '{id}' on a level without is_boss_level")]
    BossOutsideBossLevel { level: u32, id: EnemyTypeId },
    #[error("Level {level}: more than one boss token")]
    MultipleBosses { level: u32 },
    #[error("Level {level}: pool of {available} cannot reach total_enemies {total}")]
    PoolTooSmall { level: u32, available: usize, total: u32 },
    #[error("Spawn margin {margin} does not fit an arena of {size}")]
    SpawnMarginTooLarge { margin: f32, size: f32 },
    #[error("Probability out of range: {0}")]
    Probability(f64),
    #[error("Invalid tuning: {0}")]
    InvalidTuning(&'static str),
}

/// Identifier of an enemy type definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyTypeId(pub String);

impl EnemyTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EnemyTypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EnemyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fan of bullets fired at once (boss attack)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volley {
    pub count: u32,
    /// Angle between neighbouring bullets (degrees)
    pub spread_deg: f32,
}

/// Enemy type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyType {
    pub name: String,
    pub health: u32,
    /// Damage dealt by each of its bullets
    pub damage: u32,
    /// Move speed as a multiple of player speed
    pub speed_mult: f32,
    /// Model height; also scales the collision radius
    pub model_height: f32,
    pub color: Color,
    pub points: u64,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default)]
    pub volley: Option<Volley>,
}

impl EnemyType {
    pub fn move_speed(&self, player_speed: f32) -> f32 {
        player_speed * self.speed_mult
    }

    /// Faster types reload faster
    pub fn reload_time(&self, reload_base: f32) -> f32 {
        reload_base / (self.speed_mult + 0.5)
    }

    pub fn collision_radius(&self) -> f32 {
        ENEMY_BASE_COLLISION_RADIUS * (self.model_height / PLAYER_TOTAL_HEIGHT)
    }

    /// Enemy position is the body center
    pub fn body_center_y(&self) -> f32 {
        self.model_height / 2.0
    }
}

fn default_max_concurrent() -> u32 {
    1
}

/// One row of the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub total_enemies: u32,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
    /// Cap while the boss is alive (falls back to `max_concurrent`)
    #[serde(default)]
    pub max_concurrent_boss_phase: Option<u32>,
    /// Ordered enemy-type tokens
    pub enemy_types: Vec<EnemyTypeId>,
    #[serde(default)]
    pub is_boss_level: bool,
}

impl LevelConfig {
    pub fn new(total_enemies: u32, max_concurrent: u32, enemy_types: &[&str]) -> Self {
        Self {
            total_enemies,
            max_concurrent,
            max_concurrent_boss_phase: None,
            enemy_types: enemy_types.iter().map(|&id| EnemyTypeId::from(id)).collect(),
            is_boss_level: false,
        }
    }

    pub fn boss(total_enemies: u32, boss_phase_cap: u32, enemy_types: &[&str]) -> Self {
        Self {
            max_concurrent_boss_phase: Some(boss_phase_cap),
            is_boss_level: true,
            ..Self::new(total_enemies, default_max_concurrent(), enemy_types)
        }
    }

    pub fn boss_phase_cap(&self) -> u32 {
        self.max_concurrent_boss_phase.unwrap_or(self.max_concurrent)
    }
}

/// Arena box: x in [0, size_x], y in [0, wall_height], z in [0, size_z]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub size_x: f32,
    pub size_z: f32,
    pub wall_height: f32,
}

impl ArenaConfig {
    pub fn center(&self) -> glam::Vec3 {
        glam::Vec3::new(self.size_x / 2.0, 0.0, self.size_z / 2.0)
    }
}

/// Complete static configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    /// Level 1 is `levels[0]`
    pub levels: Vec<LevelConfig>,
    pub enemy_types: BTreeMap<EnemyTypeId, EnemyType>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Level by 1-based number
    pub fn level(&self, number: u32) -> Option<&LevelConfig> {
        let index = number.checked_sub(1)?;
        self.levels.get(index as usize)
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn enemy_type(&self, id: &EnemyTypeId) -> Option<&EnemyType> {
        self.enemy_types.get(id)
    }

    pub fn is_boss_type(&self, id: &EnemyTypeId) -> bool {
        self.enemy_type(id).is_some_and(|t| t.is_boss)
    }

    /// Fresh spawn pool for a level, exactly `total_enemies` tokens long
    ///
    /// Listed tokens come first in order; a short list is padded by cycling
    /// its non-boss tokens, so a one-entry list means "this type, N times".
    pub fn spawn_pool(&self, level: &LevelConfig) -> Vec<EnemyTypeId> {
        let total = level.total_enemies as usize;
        let mut pool: Vec<EnemyTypeId> = level.enemy_types.iter().take(total).cloned().collect();

        let fillers: Vec<&EnemyTypeId> = level
            .enemy_types
            .iter()
            .filter(|id| !self.is_boss_type(id))
            .collect();
        if !fillers.is_empty() {
            let mut i = 0;
            while pool.len() < total {
                pool.push(fillers[i % fillers.len()].clone());
                i += 1;
            }
        }
        pool
    }

    /// Check the tables against each other and against the placement tuning
    pub fn validate(&self, tuning: &Tuning) -> Result<(), ConfigError> {
        let arena = &self.arena;
        if arena.size_x <= 0.0 || arena.size_z <= 0.0 || arena.wall_height <= 0.0 {
            return Err(ConfigError::InvalidArena);
        }
        let smallest = arena.size_x.min(arena.size_z);
        if tuning.spawn.margin * 2.0 >= smallest {
            return Err(ConfigError::SpawnMarginTooLarge {
                margin: tuning.spawn.margin,
                size: smallest,
            });
        }
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        for (index, level) in self.levels.iter().enumerate() {
            let number = index as u32 + 1;
            if level.total_enemies == 0 {
                return Err(ConfigError::ZeroTotal { level: number });
            }
            if level.max_concurrent == 0 || level.boss_phase_cap() == 0 {
                return Err(ConfigError::ZeroCap { level: number });
            }
            if level.enemy_types.is_empty() {
                return Err(ConfigError::EmptyPool { level: number });
            }

            let mut bosses = 0;
            for id in &level.enemy_types {
                let Some(def) = self.enemy_type(id) else {
                    return Err(ConfigError::UnknownEnemyType {
                        level: number,
                        id: id.clone(),
                    });
                };
                if def.is_boss {
                    if !level.is_boss_level {
                        return Err(ConfigError::BossOutsideBossLevel {
                            level: number,
                            id: id.clone(),
                        });
                    }
                    bosses += 1;
                }
            }
            if bosses > 1 {
                return Err(ConfigError::MultipleBosses { level: number });
            }

            let available = self.spawn_pool(level).len();
            if available < level.total_enemies as usize {
                return Err(ConfigError::PoolTooSmall {
                    level: number,
                    available,
                    total: level.total_enemies,
                });
            }
        }
        Ok(())
    }

    /// Ten-level campaign in a 70x70 arena, final boss on level 10
    pub fn classic() -> Self {
        let mut enemy_types: BTreeMap<EnemyTypeId, EnemyType> = BTreeMap::new();
        enemy_types.insert("wolf1".into(), wolf("Type1Wolf", 3, 3, 0.4, 1.5, [0.6, 0.5, 0.4], 10));
        enemy_types.insert("wolf2".into(), wolf("Type2Wolf", 4, 4, 0.7, 1.6, [0.5, 0.6, 0.4], 15));
        enemy_types.insert("wolf3".into(), wolf("Type3Wolf", 5, 5, 1.0, 1.7, [0.4, 0.5, 0.6], 20));
        enemy_types.insert(
            "boss".into(),
            EnemyType {
                is_boss: true,
                ..wolf("BossWolf", 15, 7, 0.8, 2.5, [0.3, 0.3, 0.3], 100)
            },
        );

        let mut final_wave = vec!["boss"];
        final_wave.extend(["wolf1"; 5]);
        final_wave.extend(["wolf2"; 5]);
        final_wave.extend(["wolf3"; 5]);

        Self {
            arena: ArenaConfig {
                size_x: 70.0,
                size_z: 70.0,
                wall_height: 8.0,
            },
            levels: vec![
                LevelConfig::new(5, 1, &["wolf1"]),
                LevelConfig::new(6, 2, &["wolf1"]),
                LevelConfig::new(9, 3, &["wolf1"]),
                LevelConfig::new(5, 1, &["wolf2"]),
                LevelConfig::new(6, 2, &["wolf2"]),
                LevelConfig::new(9, 3, &["wolf2"]),
                LevelConfig::new(5, 1, &["wolf3"]),
                LevelConfig::new(6, 2, &["wolf3"]),
                LevelConfig::new(9, 3, &["wolf3"]),
                LevelConfig::boss(16, 4, &final_wave),
            ],
            enemy_types,
        }
    }

    /// Larger 100x100 campaign with a miniboss on level 5 and a volley-firing boss
    pub fn frontier() -> Self {
        let mut enemy_types: BTreeMap<EnemyTypeId, EnemyType> = BTreeMap::new();
        enemy_types.insert("wolf1".into(), wolf("Type1Wolf", 3, 3, 0.2, 2.0, [0.3, 0.7, 0.3], 10));
        enemy_types.insert("wolf2".into(), wolf("Type2Wolf", 4, 4, 0.4, 3.0, [0.2, 0.5, 0.2], 15));
        enemy_types.insert("wolf3".into(), wolf("Type3Wolf", 5, 5, 0.6, 4.0, [0.1, 0.4, 0.1], 20));
        enemy_types.insert(
            "miniboss".into(),
            EnemyType {
                is_boss: true,
                ..wolf("MiniBossWolf", 8, 4, 0.8, 6.0, [0.8, 0.2, 0.2], 50)
            },
        );
        enemy_types.insert(
            "boss".into(),
            EnemyType {
                is_boss: true,
                volley: Some(Volley {
                    count: 5,
                    spread_deg: 10.0,
                }),
                ..wolf("BossWolf", 15, 7, 1.0, 8.0, [0.9, 0.1, 0.1], 100)
            },
        );

        let mut mid_wave = vec!["miniboss"];
        mid_wave.extend(["wolf2"; 3]);
        mid_wave.extend(["wolf1"; 3]);

        let mut final_wave = vec!["boss"];
        final_wave.extend(["wolf1"; 5]);
        final_wave.extend(["wolf2"; 5]);
        final_wave.extend(["wolf3"; 5]);

        Self {
            arena: ArenaConfig {
                size_x: 100.0,
                size_z: 100.0,
                wall_height: 8.0,
            },
            levels: vec![
                LevelConfig::new(5, 1, &["wolf1"]),
                LevelConfig::new(6, 2, &["wolf1"]),
                LevelConfig::new(9, 3, &["wolf1"]),
                LevelConfig::new(5, 1, &["wolf2"]),
                LevelConfig::boss(7, 3, &mid_wave),
                LevelConfig::new(9, 3, &["wolf2"]),
                LevelConfig::new(5, 1, &["wolf3"]),
                LevelConfig::new(6, 2, &["wolf3"]),
                LevelConfig::new(9, 3, &["wolf3"]),
                LevelConfig::boss(16, 4, &final_wave),
            ],
            enemy_types,
        }
    }
}

fn wolf(name: &str, health: u32, damage: u32, speed_mult: f32, model_height: f32, color: Color, points: u64) -> EnemyType {
    EnemyType {
        name: name.to_string(),
        health,
        damage,
        speed_mult,
        model_height,
        color,
        points,
        is_boss: false,
        volley: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_table_shape() {
        let config = GameConfig::classic();
        assert_eq!(config.level_count(), 10);
        let first = config.level(1).unwrap();
        assert_eq!(first.total_enemies, 5);
        assert_eq!(first.max_concurrent, 1);
        assert!(config.level(0).is_none());
        assert!(config.level(11).is_none());

        let last = config.level(10).unwrap();
        assert!(last.is_boss_level);
        assert_eq!(last.boss_phase_cap(), 4);
        assert_eq!(last.max_concurrent, 1);
    }

    #[test]
    fn test_spawn_pool_pads_single_type() {
        let config = GameConfig::classic();
        let pool = config.spawn_pool(config.level(3).unwrap());
        assert_eq!(pool.len(), 9);
        assert!(pool.iter().all(|id| id.as_str() == "wolf1"));
    }

    #[test]
    fn test_spawn_pool_keeps_boss_list() {
        let config = GameConfig::classic();
        let pool = config.spawn_pool(config.level(10).unwrap());
        assert_eq!(pool.len(), 16);
        assert_eq!(pool[0].as_str(), "boss");
        assert_eq!(pool.iter().filter(|id| config.is_boss_type(id)).count(), 1);
    }

    #[test]
    fn test_derived_stats() {
        let config = GameConfig::classic();
        let boss = config.enemy_type(&"boss".into()).unwrap();
        assert!((boss.move_speed(5.0) - 4.0).abs() < 1e-5);
        assert!((boss.reload_time(1.5) - 1.5 / 1.3).abs() < 1e-5);
        assert!((boss.collision_radius() - 0.6 * 2.5 / 1.8).abs() < 1e-5);
        assert!((boss.body_center_y() - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_validate_unknown_type() {
        let mut config = GameConfig::classic();
        config.levels[0].enemy_types = vec!["ghost".into()];
        let err = config.validate(&Tuning::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnemyType { level: 1, .. }));
    }

    #[test]
    fn test_validate_boss_rules() {
        let mut config = GameConfig::classic();
        config.levels[0].enemy_types = vec!["boss".into()];
        assert!(matches!(
            config.validate(&Tuning::default()),
            Err(ConfigError::BossOutsideBossLevel { level: 1, .. })
        ));

        let mut config = GameConfig::classic();
        config.levels[9].enemy_types.insert(1, "boss".into());
        assert!(matches!(
            config.validate(&Tuning::default()),
            Err(ConfigError::MultipleBosses { level: 10 })
        ));

        let mut config = GameConfig::classic();
        config.levels[9] = LevelConfig::boss(3, 2, &["boss"]);
        assert!(matches!(
            config.validate(&Tuning::default()),
            Err(ConfigError::PoolTooSmall { level: 10, available: 1, total: 3 })
        ));
    }

    #[test]
    fn test_validate_margin() {
        let mut config = GameConfig::classic();
        config.arena.size_x = 10.0;
        assert!(matches!(
            config.validate(&Tuning::default()),
            Err(ConfigError::SpawnMarginTooLarge { .. })
        ));
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "arena": { "size_x": 40.0, "size_z": 40.0, "wall_height": 6.0 },
            "levels": [
                { "total_enemies": 2, "enemy_types": ["grunt"] }
            ],
            "enemy_types": {
                "grunt": {
                    "name": "Grunt", "health": 2, "damage": 1, "speed_mult": 0.5,
                    "model_height": 1.8, "color": [1.0, 0.0, 0.0], "points": 5
                }
            }
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        let level = config.level(1).unwrap();
        assert_eq!(level.max_concurrent, 1);
        assert!(!level.is_boss_level);
        assert!(config.validate(&Tuning::default()).is_ok());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(GameConfig::from_json("{ not json"), Err(ConfigError::Json(_))));
    }
}
