//! Stone record and registry keys
//!
//! Stones are created once per game and repositioned between ends; the
//! engine owns every field and is the only writer.

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Team colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamColor {
    Red,
    Yellow,
}

impl TeamColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Yellow => "yellow",
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry key: one stone per (color, number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoneKey {
    pub color: TeamColor,
    pub number: u8,
}

impl StoneKey {
    pub fn new(color: TeamColor, number: u8) -> Self {
        Self { color, number }
    }
}

impl fmt::Display for StoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.color, self.number)
    }
}

/// Wall-clock hog-line crossing times for the current throw
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HogTiming {
    pub near_crossed_at: Option<f64>,
    pub far_crossed_at: Option<f64>,
}

/// Initial registration of a stone at its home-tray slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoneConfig {
    pub color: TeamColor,
    pub number: u8,
    pub position: Vec2,
}

/// A curling stone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stone {
    pub color: TeamColor,
    pub number: u8,
    /// Center position (meters)
    pub position: Vec2,
    /// Velocity (m/s)
    pub velocity: Vec2,
    /// Signed spin (rad/s); zero until spin activates
    pub rotation_rate: f32,
    /// Spin requested at throw time, waiting for the release line
    pub pending_rotation_rate: f32,
    /// Set once the pending spin has been applied for this throw
    pub spin_activated: bool,
    /// Visual heading in [0, 2π)
    pub angle: f32,
    pub is_launched: bool,
    pub is_out: bool,
    /// Latch so "stopped" is reported once per rest
    pub has_stopped_notified: bool,
    /// Set once the stone reaches the far hog line during this throw
    pub passed_far_hog: bool,
    pub hog_timing: HogTiming,
    /// Trailing trace, oldest first
    pub path_samples: VecDeque<Vec2>,
    /// Simulated seconds since the last trace point
    pub path_sample_timer: f32,
    /// Home-tray slot used when returning the stone between ends
    pub home: Vec2,
}

impl Stone {
    pub fn new(config: &StoneConfig) -> Self {
        Self {
            color: config.color,
            number: config.number,
            position: config.position,
            velocity: Vec2::ZERO,
            rotation_rate: 0.0,
            pending_rotation_rate: 0.0,
            spin_activated: false,
            angle: 0.0,
            is_launched: false,
            is_out: false,
            has_stopped_notified: false,
            passed_far_hog: false,
            hog_timing: HogTiming::default(),
            path_samples: VecDeque::new(),
            path_sample_timer: 0.0,
            home: config.position,
        }
    }

    pub fn key(&self) -> StoneKey {
        StoneKey::new(self.color, self.number)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Launched, not out, and therefore subject to physics
    #[inline]
    pub fn in_play(&self) -> bool {
        self.is_launched && !self.is_out
    }

    /// Still displacing or spinning above the given thresholds
    pub fn is_moving(&self, speed_epsilon: f32, spin_epsilon: f32) -> bool {
        self.speed() > speed_epsilon || self.rotation_rate.abs() > spin_epsilon
    }

    /// Kill all motion, including spin that has not activated yet
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.rotation_rate = 0.0;
        self.pending_rotation_rate = 0.0;
    }

    /// Put the stone back in its home-tray slot, ready to be thrown
    pub fn return_home(&mut self) {
        self.halt();
        self.position = self.home;
        self.angle = 0.0;
        self.is_launched = false;
        self.is_out = false;
        self.has_stopped_notified = false;
        self.spin_activated = false;
        self.passed_far_hog = false;
        self.hog_timing = HogTiming::default();
        self.path_samples.clear();
        self.path_sample_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StoneConfig {
        StoneConfig {
            color: TeamColor::Yellow,
            number: 3,
            position: Vec2::new(3.0, -0.5),
        }
    }

    #[test]
    fn new_stone_rests_at_home() {
        let stone = Stone::new(&config());
        assert_eq!(stone.key(), StoneKey::new(TeamColor::Yellow, 3));
        assert_eq!(stone.position, stone.home);
        assert!(!stone.in_play());
        assert!(!stone.is_moving(0.01, 0.01));
    }

    #[test]
    fn return_home_clears_throw_state() {
        let mut stone = Stone::new(&config());
        stone.position = Vec2::new(0.2, 30.0);
        stone.velocity = Vec2::new(0.0, 1.0);
        stone.rotation_rate = 1.0;
        stone.is_launched = true;
        stone.is_out = true;
        stone.hog_timing.near_crossed_at = Some(10.0);
        stone.path_samples.push_back(Vec2::ZERO);

        stone.return_home();

        assert_eq!(stone.position, Vec2::new(3.0, -0.5));
        assert_eq!(stone.velocity, Vec2::ZERO);
        assert_eq!(stone.rotation_rate, 0.0);
        assert!(!stone.is_launched && !stone.is_out);
        assert_eq!(stone.hog_timing, HogTiming::default());
        assert!(stone.path_samples.is_empty());
    }

    #[test]
    fn key_display() {
        assert_eq!(StoneKey::new(TeamColor::Red, 2).to_string(), "red #2");
    }
}
