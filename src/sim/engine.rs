//! Engine orchestrator
//!
//! Owns every stone, turns external clock ticks into simulation steps and
//! runs the per-step pipeline: integrate, release/boundary/hog checks, path
//! sampling, then one collision pass across all stones.
//!
//! The engine is Idle until a throw. Idle ticks only remember the timestamp.
//! The first tick after a throw sets the baseline, and every later tick
//! steps by the elapsed time until nothing moves or spins.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary::{
    OutTray, activate_release_spin, check_hog_lines, is_out_of_bounds, rule_out, stopped_short,
};
use super::collision::resolve_collisions;
use super::events::{EngineEvents, NoopEvents};
use super::motion::integrate;
use super::path::{record_step, reset_path};
use super::stone::{HogTiming, Stone, StoneConfig, StoneKey, TeamColor};
use crate::clock::{Clock, SystemClock};
use crate::config::{PhysicsConfig, SheetGeometry};
use crate::error::{EngineError, Result};
use crate::wrap_angle;

/// Engine run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing moving or spinning; ticks are bookkeeping only
    Idle,
    /// At least one stone displacing or spinning
    Active,
}

/// Parameters of a delivery
///
/// `color`, `number` and `velocity` are required; leaving one out is an
/// `InvalidArgument` error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThrowParams {
    pub color: Option<TeamColor>,
    pub number: Option<u8>,
    /// Initial velocity (m/s)
    pub velocity: Option<Vec2>,
    /// Spin applied once the stone passes the release line
    pub rotation_radians_per_second: f32,
    pub angle_radians: f32,
    /// Sideways offset from the launch point (meters)
    pub offset_x: f32,
}

impl ThrowParams {
    pub fn new(color: TeamColor, number: u8, velocity: Vec2) -> Self {
        Self {
            color: Some(color),
            number: Some(number),
            velocity: Some(velocity),
            ..Default::default()
        }
    }

    pub fn with_spin(mut self, radians_per_second: f32) -> Self {
        self.rotation_radians_per_second = radians_per_second;
        self
    }

    pub fn with_offset(mut self, offset_x: f32) -> Self {
        self.offset_x = offset_x;
        self
    }

    pub fn with_angle(mut self, angle_radians: f32) -> Self {
        self.angle_radians = angle_radians;
        self
    }
}

/// Curling stone simulation
pub struct Engine {
    geometry: SheetGeometry,
    config: PhysicsConfig,
    release_line: Option<f32>,
    /// Registration order; also the collision pair order
    stones: Vec<Stone>,
    index: HashMap<StoneKey, usize>,
    out_tray: OutTray,
    state: EngineState,
    last_timestamp: Option<f64>,
    events: Box<dyn EngineEvents>,
    clock: Box<dyn Clock>,
}

impl Engine {
    pub fn new(geometry: SheetGeometry, config: PhysicsConfig) -> Self {
        let release_line = geometry.release_line_y();
        Self {
            geometry,
            config,
            release_line,
            stones: Vec::new(),
            index: HashMap::new(),
            out_tray: OutTray::new(),
            state: EngineState::Idle,
            last_timestamp: None,
            events: Box::new(NoopEvents),
            clock: Box::new(SystemClock::new()),
        }
    }

    /// Register the notification listener
    pub fn with_events(mut self, events: impl EngineEvents + 'static) -> Self {
        self.events = Box::new(events);
        self
    }

    /// Replace the wall-clock source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the stone registry
    ///
    /// A repeated (color, number) replaces the earlier entry in place.
    pub fn initialize_stones(&mut self, configs: &[StoneConfig]) {
        self.stones.clear();
        self.index.clear();
        for config in configs {
            let key = StoneKey::new(config.color, config.number);
            if let Some(&existing) = self.index.get(&key) {
                log::warn!("Duplicate registration for {key}; keeping the last one");
                self.stones[existing] = Stone::new(config);
                continue;
            }
            self.index.insert(key, self.stones.len());
            self.stones.push(Stone::new(config));
        }
        self.state = EngineState::Idle;
        self.last_timestamp = None;
        log::info!("Registered {} stones", self.stones.len());
    }

    /// Set the out-tray slots for each color
    pub fn set_out_tray_layouts(&mut self, layouts: HashMap<TeamColor, Vec<Vec2>>) {
        self.out_tray.set_layouts(layouts);
    }

    /// Start every out tray from its first slot again
    pub fn reset_out_tray_indices(&mut self) {
        self.out_tray.reset();
    }

    pub fn stones(&self) -> &[Stone] {
        &self.stones
    }

    pub fn stone(&self, key: StoneKey) -> Option<&Stone> {
        self.index.get(&key).map(|&i| &self.stones[i])
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Active
    }

    /// Stones as JSON for external renderers
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.stones)?)
    }

    /// Launch a registered, resting stone from the launch line
    pub fn throw_stone(&mut self, params: ThrowParams) -> Result<&Stone> {
        let velocity = params
            .velocity
            .ok_or_else(|| EngineError::InvalidArgument("velocity is required".to_string()))?;
        if !velocity.is_finite() {
            return Err(EngineError::InvalidArgument(format!(
                "velocity must be finite, got {velocity}"
            )));
        }
        let (Some(color), Some(number)) = (params.color, params.number) else {
            return Err(EngineError::InvalidArgument(
                "color and number are required".to_string(),
            ));
        };
        let key = StoneKey::new(color, number);
        let &slot = self
            .index
            .get(&key)
            .ok_or_else(|| EngineError::InvalidArgument(format!("{key} is not registered")))?;

        let launch = Vec2::new(
            self.geometry.launch_x() + params.offset_x,
            self.geometry.launch_line_y,
        );
        let stone = &mut self.stones[slot];
        if stone.is_launched {
            return Err(EngineError::InvalidArgument(format!(
                "{key} is already launched"
            )));
        }

        stone.position = launch;
        stone.velocity = velocity;
        stone.angle = wrap_angle(params.angle_radians);
        stone.rotation_rate = 0.0;
        stone.pending_rotation_rate = params.rotation_radians_per_second;
        stone.spin_activated = false;
        stone.is_launched = true;
        stone.is_out = false;
        stone.has_stopped_notified = false;
        stone.passed_far_hog = false;
        stone.hog_timing = HogTiming::default();
        reset_path(stone);

        let now = self.clock.now_ms();
        self.events.stone_released(now);

        self.state = EngineState::Active;
        self.last_timestamp = None;
        log::info!(
            "Threw {key}: velocity={velocity}, spin={:.2} rad/s, offset={:.2}",
            params.rotation_radians_per_second,
            params.offset_x
        );
        Ok(&self.stones[slot])
    }

    /// External per-frame tick (milliseconds)
    pub fn update(&mut self, timestamp_ms: f64) {
        match self.state {
            EngineState::Idle => {
                self.last_timestamp = Some(timestamp_ms);
            }
            EngineState::Active => {
                let Some(last) = self.last_timestamp.replace(timestamp_ms) else {
                    return;
                };
                let dt = ((timestamp_ms - last) / 1000.0) as f32;
                if !dt.is_finite() || dt <= 0.0 {
                    return;
                }
                self.step(dt.min(self.config.max_frame_seconds));
            }
        }
    }

    /// Run the pipeline once for `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let config = &self.config;
        let geometry = &self.geometry;
        let mut moving = false;

        for stone in self.stones.iter_mut() {
            if !stone.in_play() {
                continue;
            }

            let motion = integrate(stone, dt, config);
            let previous_y = motion.previous.y;

            if activate_release_spin(stone, previous_y, self.release_line)
                && stone.rotation_rate != 0.0
            {
                log::debug!("{} released with spin {:.2}", stone.key(), stone.rotation_rate);
            }

            let hog = check_hog_lines(stone, previous_y, geometry, self.clock.as_ref());
            if hog.near_crossed {
                self.events.hog_near_cross();
            }
            if let Some(split_ms) = hog.split_ms {
                log::debug!("{} hog-to-hog {:.0} ms", stone.key(), split_ms);
                self.events.hog_split(split_ms);
            }

            if is_out_of_bounds(stone.position, geometry) || stopped_short(stone, geometry, config) {
                log::debug!("{} ruled out at {}", stone.key(), stone.position);
                if rule_out(stone, &mut self.out_tray) {
                    self.events.stone_stopped(stone);
                }
                continue;
            }

            record_step(stone, &motion, dt, config);

            if stone.is_moving(config.speed_epsilon, config.spin_epsilon) {
                moving = true;
            } else {
                stone.halt();
                if !stone.has_stopped_notified {
                    stone.has_stopped_notified = true;
                    log::debug!("{} stopped at {}", stone.key(), stone.position);
                    self.events.stone_stopped(stone);
                }
            }
        }

        // A contact this step keeps the engine awake even if both stones
        // looked settled before it
        if resolve_collisions(&mut self.stones, dt, geometry.stone_radius, config) {
            moving = true;
        }

        if !moving {
            self.state = EngineState::Idle;
            self.last_timestamp = None;
            log::info!("All stones settled");
        }
    }

    /// Put a stone back in its home-tray slot
    pub fn return_stone_to_home(&mut self, key: StoneKey) -> bool {
        let Some(&slot) = self.index.get(&key) else {
            return false;
        };
        self.stones[slot].return_home();
        true
    }

    /// Park a stone in its color's out tray without a stopped notification
    pub fn send_stone_to_out_tray(&mut self, key: StoneKey) -> bool {
        let Some(&slot) = self.index.get(&key) else {
            return false;
        };
        let stone = &mut self.stones[slot];
        stone.has_stopped_notified = true;
        rule_out(stone, &mut self.out_tray);
        true
    }
}
