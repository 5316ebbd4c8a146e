//! Trailing trajectory trace per stone
//!
//! Samples are taken on simulated time, so the trace density does not depend
//! on frame rate.

use glam::Vec2;

use super::motion::MotionStep;
use super::stone::Stone;
use crate::config::PhysicsConfig;
use crate::consts::DISPLACEMENT_EPSILON;

/// Start a fresh trace at the stone's current position
pub fn reset_path(stone: &mut Stone) {
    stone.path_samples.clear();
    stone.path_samples.push_back(stone.position);
    stone.path_sample_timer = 0.0;
}

/// Append a point, dropping the oldest ones past the cap
pub fn push_sample(stone: &mut Stone, point: Vec2, max_samples: usize) {
    stone.path_samples.push_back(point);
    while stone.path_samples.len() > max_samples {
        stone.path_samples.pop_front();
    }
}

/// Record trace points for one integration step
///
/// While the stone moves, every full `path_sample_interval` of simulated
/// time yields a point interpolated along the step. Once it stops, a final
/// point is added if the stone has moved since the last one.
pub fn record_step(stone: &mut Stone, step: &MotionStep, dt: f32, config: &PhysicsConfig) {
    if step.displacement > DISPLACEMENT_EPSILON && dt > 0.0 {
        let interval = config.path_sample_interval;
        // Time into this step at which the next sample falls due
        let mut due = interval - stone.path_sample_timer;
        stone.path_sample_timer += dt;
        while stone.path_sample_timer >= interval {
            let t = (due / dt).clamp(0.0, 1.0);
            let point = step.previous.lerp(stone.position, t);
            push_sample(stone, point, config.max_path_samples);
            stone.path_sample_timer -= interval;
            due += interval;
        }
    } else {
        let moved = stone
            .path_samples
            .back()
            .is_none_or(|last| last.distance(stone.position) > DISPLACEMENT_EPSILON);
        if moved {
            let position = stone.position;
            push_sample(stone, position, config.max_path_samples);
        }
        stone.path_sample_timer = 0.0;
    }
}
