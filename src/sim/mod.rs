//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame deltas only (clamped by `clamp_frame_dt`)
//! - Seeded RNG only
//! - Simulation clock for every timed window
//! - No rendering, input polling or platform dependencies

pub mod actors;
pub mod autopilot;
pub mod ballistics;
pub mod config;
pub mod director;
pub mod perks;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use config::{ArenaConfig, ConfigError, EnemyType, EnemyTypeId, GameConfig, LevelConfig, Volley};
pub use director::{LevelDirector, SpawnOutcome};
pub use snapshot::{EffectTimer, Snapshot, TransitionView};
pub use state::{
    ActiveEffects, Bullet, CameraOrbit, Effect, Enemy, Faction, GameEvent, GamePhase, GameState, PerkKind,
    PerkLedger, PerkTrack, Pickup, PickupKind, Player, Transition,
};
pub use tick::{TickInput, clamp_frame_dt};
