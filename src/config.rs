//! Physics tuning and sheet geometry
//!
//! Every tunable lives in one fully-populated `PhysicsConfig`; the step
//! pipeline reads fields directly. Partial JSON fills the gaps with defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, Result};

/// Physics tunables for friction, curl, collisions and path tracing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    // === Friction curve ===
    /// Constant deceleration (m/s²)
    pub friction_baseline: f32,
    /// Extra deceleration that grows as speed drops
    pub friction_speed_factor: f32,
    /// Keeps the low-speed term finite at rest
    pub friction_low_speed_eps: f32,

    // === Curl ===
    /// Floor on speed used by the curl model
    pub curl_min_speed: f32,
    /// Spin (rad/s) at which curl reaches full strength
    pub curl_rotation_reference: f32,
    pub curl_asymmetry: f32,
    pub curl_velocity_bias: f32,
    /// Spin (rad/s) below which the stone runs straight
    pub curl_min_omega: f32,
    pub gravity: f32,

    // === Collision response ===
    pub restitution: f32,
    pub spin_transfer: f32,
    pub spin_damping: f32,
    pub tangential_loss: f32,

    // === Path trace ===
    /// Simulated seconds between trace points
    pub path_sample_interval: f32,
    pub max_path_samples: usize,

    // === Settling ===
    /// Speed (m/s) below which a stone counts as stopped
    pub speed_epsilon: f32,
    /// Spin (rad/s) below which a stone counts as not spinning
    pub spin_epsilon: f32,
    /// Longest frame delta fed to a single step (seconds)
    pub max_frame_seconds: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction_baseline: 0.32,
            friction_speed_factor: 0.02,
            friction_low_speed_eps: 0.2,

            curl_min_speed: 0.3,
            curl_rotation_reference: 1.5,
            curl_asymmetry: 0.03,
            curl_velocity_bias: 0.5,
            curl_min_omega: 0.05,
            gravity: 9.81,

            restitution: 0.85,
            spin_transfer: 0.25,
            spin_damping: 0.2,
            tangential_loss: 0.1,

            path_sample_interval: 0.05,
            max_path_samples: 400,

            speed_epsilon: 0.01,
            spin_epsilon: 0.01,
            max_frame_seconds: 0.1,
        }
    }
}

impl PhysicsConfig {
    /// Parse (possibly partial) JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the step pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("friction_baseline", self.friction_baseline),
            ("friction_speed_factor", self.friction_speed_factor),
            ("curl_min_speed", self.curl_min_speed),
            ("curl_asymmetry", self.curl_asymmetry),
            ("curl_velocity_bias", self.curl_velocity_bias),
            ("curl_min_omega", self.curl_min_omega),
            ("gravity", self.gravity),
            ("speed_epsilon", self.speed_epsilon),
            ("spin_epsilon", self.spin_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        let positive = [
            ("friction_low_speed_eps", self.friction_low_speed_eps),
            ("curl_rotation_reference", self.curl_rotation_reference),
            ("path_sample_interval", self.path_sample_interval),
            ("max_frame_seconds", self.max_frame_seconds),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }

        let fractions = [
            ("restitution", self.restitution),
            ("spin_transfer", self.spin_transfer),
            ("spin_damping", self.spin_damping),
            ("tangential_loss", self.tangential_loss),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.max_path_samples == 0 {
            return Err(EngineError::InvalidConfig(
                "max_path_samples must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Playable sheet rectangle (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetExtents {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl SheetExtents {
    pub fn center_x(&self) -> f32 {
        (self.x_min + self.x_max) * 0.5
    }
}

/// Layout supplied by the sheet collaborator
///
/// Optional lines switch off the checks that depend on them. No
/// cross-validation happens; the caller keeps hog lines between the launch
/// line and the far edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetGeometry {
    pub launch_line_y: f32,
    pub stone_radius: f32,
    #[serde(default)]
    pub hog_line_near: Option<f32>,
    #[serde(default)]
    pub hog_line_far: Option<f32>,
    #[serde(default)]
    pub back_line_y: Option<f32>,
    #[serde(default)]
    pub extents: Option<SheetExtents>,
}

impl SheetGeometry {
    /// Regulation sheet measured from the hack
    pub fn standard() -> Self {
        Self {
            launch_line_y: 0.0,
            stone_radius: STONE_RADIUS,
            hog_line_near: Some(NEAR_HOG_Y),
            hog_line_far: Some(FAR_HOG_Y),
            back_line_y: Some(FAR_BACK_Y),
            extents: Some(SheetExtents {
                x_min: -SHEET_WIDTH / 2.0,
                x_max: SHEET_WIDTH / 2.0,
                y_min: SHEET_MIN_Y,
                y_max: SHEET_MAX_Y,
            }),
        }
    }

    /// Line whose crossing turns pending spin into real spin
    pub fn release_line_y(&self) -> Option<f32> {
        self.hog_line_near
            .map(|hog| hog - RELEASE_DIAMETERS_BEFORE_HOG * 2.0 * self.stone_radius)
    }

    /// X coordinate stones are launched from before any offset
    pub fn launch_x(&self) -> f32 {
        self.extents.map(|e| e.center_x()).unwrap_or(0.0)
    }
}

impl Default for SheetGeometry {
    fn default() -> Self {
        Self::standard()
    }
}
