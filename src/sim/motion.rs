//! Friction decay and curl-biased translation for one time step
//!
//! Friction grows as the stone slows, so a delivery bleeds speed gently at
//! first and grips hard near rest. Spin bends the heading a little each step.

use glam::Vec2;

use super::stone::Stone;
use crate::config::PhysicsConfig;
use crate::consts::*;
use crate::wrap_angle;

/// Outcome of integrating one stone for one step
#[derive(Debug, Clone, Copy)]
pub struct MotionStep {
    /// Position before the step
    pub previous: Vec2,
    /// Distance travelled this step (meters)
    pub displacement: f32,
}

/// Deceleration magnitude (m/s²) at the given speed
#[inline]
pub fn friction_magnitude(speed: f32, config: &PhysicsConfig) -> f32 {
    config.friction_baseline
        + config.friction_speed_factor / (speed + config.friction_low_speed_eps)
}

/// Speed after one step of friction; never negative
#[inline]
pub fn apply_friction(speed: f32, friction: f32, dt: f32) -> f32 {
    (speed - friction * dt).max(0.0)
}

/// Spin after one step of decay
///
/// Only the magnitude shrinks; the sign never flips and the result lands on
/// exactly zero once the magnitude is spent.
pub fn decay_spin(rotation_rate: f32, friction: f32, speed: f32, dt: f32) -> f32 {
    if rotation_rate == 0.0 {
        return 0.0;
    }
    let multiplier = if speed < NEAR_ZERO_SPEED {
        STATIONARY_SPIN_FRICTION
    } else {
        SLIDING_SPIN_FRICTION
    };
    let reduced = (rotation_rate.abs() - multiplier * friction * dt).max(0.0);
    if reduced <= 0.0 {
        0.0
    } else {
        reduced.copysign(rotation_rate)
    }
}

/// Heading change (radians) caused by spin over one step
///
/// Drift runs opposite the spin sign. The result is bounded to
/// ±`MAX_CURL_HEADING_DELTA` per step.
pub fn curl_heading_delta(speed: f32, rotation_rate: f32, dt: f32, config: &PhysicsConfig) -> f32 {
    let omega = rotation_rate.abs();
    if omega <= config.curl_min_omega {
        return 0.0;
    }
    let direction = -rotation_rate.signum();
    let rotation_factor = (omega / config.curl_rotation_reference).min(1.0);
    let effective_speed = speed.max(config.curl_min_speed);
    if effective_speed <= 0.0 {
        return 0.0;
    }
    let lateral = config.gravity * config.curl_asymmetry * direction * rotation_factor
        / (effective_speed + config.curl_velocity_bias);
    let delta = lateral / effective_speed * dt;
    if delta.is_finite() {
        delta.clamp(-MAX_CURL_HEADING_DELTA, MAX_CURL_HEADING_DELTA)
    } else {
        0.0
    }
}

/// Advance one stone's spin, velocity and position by `dt` seconds
pub fn integrate(stone: &mut Stone, dt: f32, config: &PhysicsConfig) -> MotionStep {
    let previous = stone.position;
    let speed = stone.speed();
    let friction = friction_magnitude(speed, config);
    let mut displacement = 0.0;

    if speed > 0.0 {
        let new_speed = apply_friction(speed, friction, dt);
        // Trapezoidal average over the step
        displacement = (speed + new_speed) * 0.5 * dt;

        let delta = curl_heading_delta(speed, stone.rotation_rate, dt, config);
        let heading = Vec2::from_angle(delta).rotate(stone.velocity / speed);

        stone.position += heading * displacement;
        stone.velocity = heading * new_speed;
    }

    stone.rotation_rate = decay_spin(stone.rotation_rate, friction, speed, dt);
    stone.angle = wrap_angle(stone.angle + stone.rotation_rate * dt);

    MotionStep {
        previous,
        displacement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stone::{StoneConfig, TeamColor};
    use proptest::prelude::*;

    fn moving_stone(velocity: Vec2, rotation_rate: f32) -> Stone {
        let mut stone = Stone::new(&StoneConfig {
            color: TeamColor::Red,
            number: 1,
            position: Vec2::ZERO,
        });
        stone.is_launched = true;
        stone.velocity = velocity;
        stone.rotation_rate = rotation_rate;
        stone
    }

    #[test]
    fn friction_is_stronger_at_low_speed() {
        let config = PhysicsConfig::default();
        assert!(friction_magnitude(0.1, &config) > friction_magnitude(3.0, &config));
    }

    #[test]
    fn no_spin_runs_straight() {
        let config = PhysicsConfig::default();
        let mut stone = moving_stone(Vec2::new(0.0, 3.0), 0.0);
        for _ in 0..120 {
            integrate(&mut stone, 1.0 / 60.0, &config);
        }
        assert_eq!(stone.position.x, 0.0);
        assert!(stone.position.y > 0.0);
        assert!(stone.velocity.y < 3.0);
    }

    #[test]
    fn trapezoidal_displacement() {
        let config = PhysicsConfig::default();
        let mut stone = moving_stone(Vec2::new(0.0, 2.0), 0.0);
        let dt = 0.1;
        let friction = friction_magnitude(2.0, &config);
        let step = integrate(&mut stone, dt, &config);
        let expected = (2.0 + (2.0 - friction * dt)) * 0.5 * dt;
        assert!((step.displacement - expected).abs() < 1e-6);
        assert!((stone.position.y - expected).abs() < 1e-6);
    }

    #[test]
    fn spin_curls_opposite_its_sign() {
        let config = PhysicsConfig::default();
        let mut clockwise = moving_stone(Vec2::new(0.0, 2.0), -1.5);
        let mut counter = moving_stone(Vec2::new(0.0, 2.0), 1.5);
        for _ in 0..300 {
            integrate(&mut clockwise, 1.0 / 60.0, &config);
            integrate(&mut counter, 1.0 / 60.0, &config);
        }
        // Negative spin drifts toward positive heading rotation (left of +y is -x)
        assert!(clockwise.position.x < 0.0);
        assert!(counter.position.x > 0.0);
    }

    #[test]
    fn slow_spin_has_no_curl() {
        let config = PhysicsConfig::default();
        assert_eq!(curl_heading_delta(2.0, config.curl_min_omega * 0.5, 0.1, &config), 0.0);
    }

    #[test]
    fn spin_bleeds_faster_when_stationary() {
        let friction = 0.5;
        let sliding = decay_spin(1.0, friction, 1.0, 0.1);
        let resting = decay_spin(1.0, friction, 0.0, 0.1);
        assert!(resting < sliding);
        assert!((sliding - (1.0 - 0.7 * 0.05)).abs() < 1e-6);
        assert!((resting - (1.0 - 1.4 * 0.05)).abs() < 1e-6);
    }

    #[test]
    fn spin_clamps_to_zero() {
        assert_eq!(decay_spin(-0.01, 1.0, 0.0, 1.0), 0.0);
        assert_eq!(decay_spin(0.01, 1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn angle_wraps() {
        let config = PhysicsConfig::default();
        let mut stone = moving_stone(Vec2::ZERO, -2.0);
        stone.spin_activated = true;
        integrate(&mut stone, 0.1, &config);
        assert!((0.0..std::f32::consts::TAU).contains(&stone.angle));
    }

    proptest! {
        #[test]
        fn friction_never_makes_speed_negative(
            speed in 0.0f32..10.0,
            dt in 0.0f32..0.5,
        ) {
            let config = PhysicsConfig::default();
            let friction = friction_magnitude(speed, &config);
            prop_assert!(apply_friction(speed, friction, dt) >= 0.0);
        }

        #[test]
        fn curl_delta_is_bounded(
            speed in 0.0f32..10.0,
            rotation in -50.0f32..50.0,
            dt in 0.0f32..2.0,
            asymmetry in 0.0f32..5.0,
        ) {
            let config = PhysicsConfig {
                curl_asymmetry: asymmetry,
                ..PhysicsConfig::default()
            };
            let delta = curl_heading_delta(speed, rotation, dt, &config);
            prop_assert!((-MAX_CURL_HEADING_DELTA..=MAX_CURL_HEADING_DELTA).contains(&delta));
        }

        #[test]
        fn spin_magnitude_never_grows_and_keeps_sign(
            rotation in -10.0f32..10.0,
            vx in -3.0f32..3.0,
            vy in -3.0f32..3.0,
            steps in 1usize..200,
        ) {
            let config = PhysicsConfig::default();
            let mut stone = moving_stone(Vec2::new(vx, vy), rotation);
            let mut last = stone.rotation_rate;
            for _ in 0..steps {
                integrate(&mut stone, 1.0 / 60.0, &config);
                prop_assert!(stone.rotation_rate.abs() <= last.abs());
                prop_assert!(stone.rotation_rate == 0.0 || stone.rotation_rate.signum() == rotation.signum());
                prop_assert!(stone.speed() >= 0.0);
                last = stone.rotation_rate;
            }
        }
    }
}
