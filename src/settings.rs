//! Control preferences
//!
//! The rule variants disagree on what the lateral keys do and which way
//! "forward" points, so both are settings rather than hard-coded mappings.

use serde::{Deserialize, Serialize};

/// What the left/right movement intents do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Left/right turn the player by a fixed step per tick
    #[default]
    Rotate,
    /// Left/right move sideways; look left/right turns
    Strafe,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Rotate => "Rotate",
            ControlScheme::Strafe => "Strafe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rotate" | "tank" => Some(ControlScheme::Rotate),
            "strafe" => Some(ControlScheme::Strafe),
            _ => None,
        }
    }
}

/// Which view the look/orbit intents drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraMode {
    /// Look up/down pitches the player
    FirstPerson,
    /// Look/orbit intents move the chase camera
    #[default]
    ThirdPerson,
}

impl CameraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::FirstPerson => "FirstPerson",
            CameraMode::ThirdPerson => "ThirdPerson",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" | "firstperson" | "fp" => Some(CameraMode::FirstPerson),
            "third" | "thirdperson" | "tp" => Some(CameraMode::ThirdPerson),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
        }
    }
}

/// Player-facing control settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub control_scheme: ControlScheme,
    /// Swap the meaning of forward/back
    pub invert_forward: bool,
    pub camera_mode: CameraMode,
}

impl Settings {
    const CONTROLS_VAR: &'static str = "WOLF_DUNGEON_CONTROLS";
    const CAMERA_VAR: &'static str = "WOLF_DUNGEON_CAMERA";
    const INVERT_VAR: &'static str = "WOLF_DUNGEON_INVERT_FORWARD";

    /// Apply environment overrides on top of `self`
    ///
    /// Unknown values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(Self::CONTROLS_VAR) {
            match ControlScheme::from_str(&value) {
                Some(scheme) => self.control_scheme = scheme,
                None => log::warn!("Invalid {} '{}', keeping {}", Self::CONTROLS_VAR, value, self.control_scheme.as_str()),
            }
        }

        if let Ok(value) = std::env::var(Self::CAMERA_VAR) {
            match CameraMode::from_str(&value) {
                Some(mode) => self.camera_mode = mode,
                None => log::warn!("Invalid {} '{}', keeping {}", Self::CAMERA_VAR, value, self.camera_mode.as_str()),
            }
        }

        if let Ok(value) = std::env::var(Self::INVERT_VAR) {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.invert_forward = true,
                "0" | "false" | "no" => self.invert_forward = false,
                _ => log::warn!("Invalid {} '{}', ignoring", Self::INVERT_VAR, value),
            }
        }

        self
    }

    /// Sign applied to forward/back movement
    pub fn forward_sign(&self) -> f32 {
        if self.invert_forward { -1.0 } else { 1.0 }
    }
}
