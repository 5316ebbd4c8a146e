//! Release activation, sheet-exit rulings and hog-line timing
//!
//! Any geometry line that is absent simply disables the check built on it.

use std::collections::HashMap;

use glam::Vec2;

use super::stone::{Stone, TeamColor};
use crate::clock::Clock;
use crate::config::{PhysicsConfig, SheetGeometry};
use crate::crossed_line;

/// Hog-line notifications produced by one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HogReport {
    pub near_crossed: bool,
    /// Milliseconds between the near and far crossings
    pub split_ms: Option<f64>,
}

/// Move pending spin into effect once the stone crosses the release line
///
/// Without a release line the spin takes effect on the first step.
/// Returns true when activation happened this step.
pub fn activate_release_spin(stone: &mut Stone, previous_y: f32, release_line: Option<f32>) -> bool {
    if stone.spin_activated {
        return false;
    }
    let crossed = release_line.is_none_or(|line| crossed_line(previous_y, stone.position.y, line));
    if !crossed {
        return false;
    }
    stone.rotation_rate = stone.pending_rotation_rate;
    stone.pending_rotation_rate = 0.0;
    stone.spin_activated = true;
    true
}

/// Record hog-line crossings for this step
///
/// The near crossing is timed once per throw; the far crossing only counts
/// after a near crossing and is also reported once.
pub fn check_hog_lines(
    stone: &mut Stone,
    previous_y: f32,
    geometry: &SheetGeometry,
    clock: &dyn Clock,
) -> HogReport {
    let mut report = HogReport::default();
    let y = stone.position.y;

    if let Some(far) = geometry.hog_line_far
        && y >= far
    {
        stone.passed_far_hog = true;
    }

    if let Some(near) = geometry.hog_line_near
        && stone.hog_timing.near_crossed_at.is_none()
        && crossed_line(previous_y, y, near)
    {
        stone.hog_timing.near_crossed_at = Some(clock.now_ms());
        report.near_crossed = true;
    }

    if let Some(far) = geometry.hog_line_far
        && let Some(near_at) = stone.hog_timing.near_crossed_at
        && stone.hog_timing.far_crossed_at.is_none()
        && crossed_line(previous_y, y, far)
    {
        let now = clock.now_ms();
        stone.hog_timing.far_crossed_at = Some(now);
        report.split_ms = Some(now - near_at);
    }

    report
}

/// Whether the stone has left the playable area
pub fn is_out_of_bounds(position: Vec2, geometry: &SheetGeometry) -> bool {
    let r = geometry.stone_radius;
    if let Some(extents) = geometry.extents
        && (position.x - r < extents.x_min
            || position.x + r > extents.x_max
            || position.y - r > extents.y_max
            || position.y + r < extents.y_min)
    {
        return true;
    }
    if let Some(back) = geometry.back_line_y
        && position.y - r >= back
    {
        return true;
    }
    false
}

/// Stone came to rest without ever reaching the far hog line
pub fn stopped_short(stone: &Stone, geometry: &SheetGeometry, config: &PhysicsConfig) -> bool {
    geometry.hog_line_far.is_some()
        && !stone.passed_far_hog
        && !stone.is_moving(config.speed_epsilon, config.spin_epsilon)
}

/// Off-sheet storage slots for stones ruled out of play
#[derive(Debug, Clone, Default)]
pub struct OutTray {
    layouts: HashMap<TeamColor, Vec<Vec2>>,
    next_index: HashMap<TeamColor, usize>,
}

impl OutTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_layouts(&mut self, layouts: HashMap<TeamColor, Vec<Vec2>>) {
        self.layouts = layouts;
    }

    /// Start filling every color's tray from its first slot again
    pub fn reset(&mut self) {
        self.next_index.clear();
    }

    /// Claim the next slot for `color`; sticks on the last slot once full
    pub fn next_slot(&mut self, color: TeamColor) -> Option<Vec2> {
        let layout = self.layouts.get(&color).filter(|l| !l.is_empty())?;
        let index = self.next_index.entry(color).or_insert(0);
        let slot = layout[(*index).min(layout.len() - 1)];
        *index += 1;
        Some(slot)
    }
}

/// Take a stone out of play and park it in its color's tray
///
/// Returns true when the "stopped" notification still has to be sent.
pub fn rule_out(stone: &mut Stone, tray: &mut OutTray) -> bool {
    stone.halt();
    stone.is_out = true;
    stone.is_launched = false;
    match tray.next_slot(stone.color) {
        Some(slot) => stone.position = slot,
        None => log::warn!("No out-tray layout for {}; {} stays in place", stone.color, stone.key()),
    }
    if stone.has_stopped_notified {
        false
    } else {
        stone.has_stopped_notified = true;
        true
    }
}
