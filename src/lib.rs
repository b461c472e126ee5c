//! Wolf Dungeon - simulation core for a wave-based 3D dungeon shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, actors, ballistics, perks, game state)
//! - `settings`: Control scheme preferences
//! - `tuning`: Data-driven game balance and rule variants
//!
//! Rendering, windowing and raw input polling live outside this crate. The
//! core consumes per-tick intents and exposes read-only snapshots.

pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{CameraMode, ControlScheme, Settings};
pub use tuning::{Tuning, Variant};

use glam::{Quat, Vec3};

/// Geometry constants shared by the simulation
///
/// These describe the player model and arena furniture. Balance numbers
/// (speeds, cooldowns, thresholds) live in [`Tuning`].
pub mod consts {
    /// Player model height (feet to crown)
    pub const PLAYER_TOTAL_HEIGHT: f32 = 1.8;
    /// Player position is the body center, this far above the floor
    pub const PLAYER_BODY_Y_OFFSET: f32 = PLAYER_TOTAL_HEIGHT / 2.0;
    /// Collision radius of the player capsule
    pub const PLAYER_RADIUS: f32 = 0.5;

    /// Player model proportions (used to place the muzzle)
    pub const PLAYER_LEG_LENGTH: f32 = PLAYER_TOTAL_HEIGHT * 0.45;
    pub const PLAYER_TORSO_HEIGHT: f32 = PLAYER_TOTAL_HEIGHT * 0.4;
    pub const PLAYER_GUN_LENGTH: f32 = PLAYER_TOTAL_HEIGHT * 0.3;
    /// Forward offset of the gun base from the body center
    pub const PLAYER_GUN_BASE_OFFSET: f32 = 0.35 * PLAYER_TOTAL_HEIGHT;

    /// Pitch limit for first-person look (degrees)
    pub const MAX_PITCH_DEG: f32 = 89.0;
    /// Look up/down turns slower than yaw
    pub const PITCH_STEP_FACTOR: f32 = 0.7;

    /// Enemy collision radius for a model as tall as the player
    pub const ENEMY_BASE_COLLISION_RADIUS: f32 = 0.6;
    /// Enemy gun protrudes this fraction of model height from the face
    pub const ENEMY_GUN_OFFSET_FACTOR: f32 = 0.2;

    /// Pickups hover just above the floor
    pub const PICKUP_HOVER_Y: f32 = 0.5;
    pub const PICKUP_RADIUS: f32 = 0.5;
    /// Cosmetic spin (degrees per second)
    pub const PICKUP_SPIN_DEG_PER_SEC: f32 = 90.0;

    /// Frame driver clamps: longest step and the fallback for non-positive deltas
    pub const MAX_FRAME_DT: f32 = 0.1;
    pub const FALLBACK_FRAME_DT: f32 = 1.0 / 60.0;
}

/// Unit forward vector on the floor plane for a yaw in degrees
///
/// Yaw 0 faces -Z; positive yaw turns left (counter-clockwise seen from above).
#[inline]
pub fn forward_from_yaw(yaw_deg: f32) -> Vec3 {
    Quat::from_rotation_y(yaw_deg.to_radians()) * Vec3::NEG_Z
}

/// Unit vector pointing to the left of a yaw, on the floor plane
#[inline]
pub fn left_from_yaw(yaw_deg: f32) -> Vec3 {
    forward_from_yaw(yaw_deg + 90.0)
}

/// Yaw (degrees) that faces along `dir`, ignoring its vertical component
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z).to_degrees()
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Normalized angle to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_from_yaw_cardinal() {
        let f = forward_from_yaw(0.0);
        assert!((f - Vec3::NEG_Z).length() < 1e-5);

        // Turning left by 90 faces -X
        let f = forward_from_yaw(90.0);
        assert!((f - Vec3::NEG_X).length() < 1e-5);
        assert!((left_from_yaw(0.0) - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_yaw_toward_inverts_forward() {
        for yaw in [-170.0, -45.0, 0.0, 30.0, 120.0] {
            let back = yaw_toward(forward_from_yaw(yaw));
            assert!(normalize_degrees(back - yaw).abs() < 1e-3, "yaw {yaw} -> {back}");
        }
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(180.0), -180.0);
    }
}
