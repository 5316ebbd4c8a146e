//! Curling Engine - real-time 2D curling stone simulation
//!
//! Core modules:
//! - `sim`: Per-tick physics (friction, curl, boundaries, path traces, collisions)
//! - `config`: Tunable physics constants and sheet geometry
//! - `clock`: Wall-clock time sources for release and hog-line timing
//! - `error`: Engine error type
//!
//! Rendering, input handling and scoring live outside this crate and only
//! read `Engine::stones()` or listen through `EngineEvents`.

pub mod clock;
pub mod config;
pub mod error;
pub mod sim;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PhysicsConfig, SheetExtents, SheetGeometry};
pub use error::{EngineError, Result};
pub use sim::{Engine, EngineState, ThrowParams};

use std::f32::consts::TAU;

/// Engine configuration constants
pub mod consts {
    /// Standard stone radius in meters
    pub const STONE_RADIUS: f32 = 0.145;

    /// Regulation sheet, measured from the hack (launch line at y = 0)
    pub const SHEET_WIDTH: f32 = 4.75;
    pub const NEAR_HOG_Y: f32 = 10.06;
    pub const FAR_HOG_Y: f32 = 32.01;
    pub const FAR_TEE_Y: f32 = 38.41;
    pub const FAR_BACK_Y: f32 = 40.24;
    pub const SHEET_MIN_Y: f32 = -1.0;
    pub const SHEET_MAX_Y: f32 = 41.5;

    /// Release point sits this many stone diameters short of the near hog line
    pub const RELEASE_DIAMETERS_BEFORE_HOG: f32 = 2.0;

    /// Per-step bound on curl heading change (radians)
    pub const MAX_CURL_HEADING_DELTA: f32 = 0.35;
    /// Spin decay multiplier while the stone is nearly stationary
    pub const STATIONARY_SPIN_FRICTION: f32 = 1.4;
    /// Spin decay multiplier while the stone is sliding
    pub const SLIDING_SPIN_FRICTION: f32 = 0.7;
    /// Below this speed (m/s) a stone counts as nearly stationary for spin decay
    pub const NEAR_ZERO_SPEED: f32 = 0.05;

    /// Centers closer than this are treated as coincident
    pub const COINCIDENT_EPSILON: f32 = 1e-6;
    /// Normal approach speed needed before a contact rewind is attempted
    pub const APPROACH_EPSILON: f32 = 1e-4;
    /// Tangential slip needed before spin is exchanged
    pub const SPIN_SLIP_EPSILON: f32 = 1e-4;
    /// Overlap below which touching stones are treated as resting in contact
    pub const CONTACT_SLOP: f32 = 5e-5;
    /// Displacement below which a step counts as no movement for path sampling
    pub const DISPLACEMENT_EPSILON: f32 = 1e-5;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Whether moving from `prev` to `curr` crossed (or touched) `line`
///
/// Works in either direction; landing exactly on the line counts.
#[inline]
pub fn crossed_line(prev: f32, curr: f32, line: f32) -> bool {
    let before = prev - line;
    let after = curr - line;
    before == 0.0 || after == 0.0 || (before < 0.0) != (after < 0.0)
}
