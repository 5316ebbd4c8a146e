//! Pairwise stone collisions
//!
//! Stones are equal-mass discs. Each overlapping pair is backed out to the
//! moment of first contact (bounded by the step), given an impulse with
//! restitution, tangential damping and spin exchange, then moved forward
//! again on its new velocities. Pairs are handled left to right in
//! registration order; there is no simultaneous solve.

use glam::Vec2;

use super::stone::Stone;
use crate::config::PhysicsConfig;
use crate::consts::*;

/// Move a stone back along its velocity
#[inline]
pub fn rewind_stone(stone: &mut Stone, seconds: f32) {
    stone.position -= stone.velocity * seconds;
}

/// Move a stone forward along its velocity
#[inline]
pub fn advance_stone(stone: &mut Stone, seconds: f32) {
    stone.position += stone.velocity * seconds;
}

/// Unit normal from `a` to `b`, or +X when the centers coincide
#[inline]
pub fn contact_normal(separation: Vec2, distance: f32) -> Vec2 {
    if distance > COINCIDENT_EPSILON {
        separation / distance
    } else {
        Vec2::X
    }
}

/// Time to back both stones up until they just touch
///
/// Solves |separation - relative_velocity·t| = contact_distance for the
/// positive root and bounds it to `[0, max_time]`.
pub fn contact_rewind_time(
    separation: Vec2,
    relative_velocity: Vec2,
    contact_distance: f32,
    max_time: f32,
) -> f32 {
    let a = relative_velocity.length_squared();
    if a <= COINCIDENT_EPSILON {
        return 0.0;
    }
    let b = separation.dot(relative_velocity);
    let c = separation.length_squared() - contact_distance * contact_distance;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return 0.0;
    }
    let t = (b + discriminant.sqrt()) / a;
    if t.is_finite() {
        t.clamp(0.0, max_time.max(0.0))
    } else {
        0.0
    }
}

/// Push two overlapping stones apart equally along their normal
///
/// Velocities are untouched.
pub fn separate(a: &mut Stone, b: &mut Stone, contact_distance: f32) {
    let separation = b.position - a.position;
    let distance = separation.length();
    let overlap = contact_distance - distance;
    if overlap <= 0.0 {
        return;
    }
    let normal = contact_normal(separation, distance);
    a.position -= normal * (overlap * 0.5);
    b.position += normal * (overlap * 0.5);
}

/// Spin a collision hands to each stone, after damping
fn exchange_spin(a: &mut Stone, b: &mut Stone, slip: f32, radius: f32, config: &PhysicsConfig) {
    // The contact is the release point for any spin still pending
    for stone in [&mut *a, &mut *b] {
        if !stone.spin_activated {
            stone.rotation_rate += stone.pending_rotation_rate;
            stone.pending_rotation_rate = 0.0;
            stone.spin_activated = true;
        }
    }

    let surface = (a.rotation_rate - b.rotation_rate) * radius;
    let combined = slip + surface;
    if combined.abs() > SPIN_SLIP_EPSILON && radius > 0.0 {
        let exchange = config.spin_transfer * combined / radius;
        a.rotation_rate -= exchange * 0.5;
        b.rotation_rate += exchange * 0.5;
    }

    let keep = 1.0 - config.spin_damping;
    a.rotation_rate *= keep;
    b.rotation_rate *= keep;

    for stone in [a, b] {
        if stone.rotation_rate != 0.0 {
            stone.has_stopped_notified = false;
        }
    }
}

/// Resolve one pair; returns true if they were in contact
///
/// Pairs within `CONTACT_SLOP` of touching count as resting contact and are
/// left alone.
pub fn resolve_pair(
    a: &mut Stone,
    b: &mut Stone,
    dt: f32,
    radius: f32,
    config: &PhysicsConfig,
) -> bool {
    let contact_distance = 2.0 * radius;
    let separation = b.position - a.position;
    let distance = separation.length();
    if distance >= contact_distance - CONTACT_SLOP {
        return false;
    }

    let mut normal = contact_normal(separation, distance);
    let mut approach = (b.velocity - a.velocity).dot(normal);

    let mut rewound = 0.0;
    if approach < -APPROACH_EPSILON {
        rewound = contact_rewind_time(separation, b.velocity - a.velocity, contact_distance, dt);
        if rewound > 0.0 {
            rewind_stone(a, rewound);
            rewind_stone(b, rewound);
            let separation = b.position - a.position;
            normal = contact_normal(separation, separation.length());
            approach = (b.velocity - a.velocity).dot(normal);
        }
    }
    if rewound == 0.0 {
        separate(a, b, contact_distance);
    }

    // Normal impulse, split evenly between equal masses
    if approach < 0.0 {
        let impulse = -(1.0 + config.restitution) * approach * 0.5;
        a.velocity -= normal * impulse;
        b.velocity += normal * impulse;
    }

    // Tangential damping
    let tangent = normal.perp();
    let slip = (b.velocity - a.velocity).dot(tangent);
    let tangential_impulse = slip * config.tangential_loss * 0.5;
    a.velocity += tangent * tangential_impulse;
    b.velocity -= tangent * tangential_impulse;

    let slip = (b.velocity - a.velocity).dot(tangent);
    exchange_spin(a, b, slip, radius, config);

    if rewound > 0.0 {
        advance_stone(a, rewound);
        advance_stone(b, rewound);
        // A clamped rewind can leave a sliver of overlap
        separate(a, b, contact_distance);
    }

    log::debug!(
        "Collision {} <-> {} (rewound {:.4}s)",
        a.key(),
        b.key(),
        rewound
    );
    true
}

/// Resolve every pair of in-play stones once; true if any touched
pub fn resolve_collisions(
    stones: &mut [Stone],
    dt: f32,
    radius: f32,
    config: &PhysicsConfig,
) -> bool {
    let mut collided = false;
    for i in 0..stones.len() {
        let (head, tail) = stones.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.in_play() {
            continue;
        }
        for b in tail.iter_mut() {
            if b.in_play() && resolve_pair(a, b, dt, radius, config) {
                collided = true;
            }
        }
    }
    collided
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stone::{StoneConfig, TeamColor};
    use proptest::prelude::*;

    const R: f32 = STONE_RADIUS;

    fn stone(number: u8, position: Vec2, velocity: Vec2) -> Stone {
        let mut stone = Stone::new(&StoneConfig {
            color: TeamColor::Red,
            number,
            position,
        });
        stone.is_launched = true;
        stone.velocity = velocity;
        stone
    }

    fn elastic() -> PhysicsConfig {
        PhysicsConfig {
            restitution: 1.0,
            tangential_loss: 0.0,
            spin_transfer: 0.0,
            ..PhysicsConfig::default()
        }
    }

    #[test]
    fn apart_stones_do_not_collide() {
        let config = PhysicsConfig::default();
        let mut a = stone(1, Vec2::ZERO, Vec2::X);
        let mut b = stone(2, Vec2::new(2.0 * R + 0.001, 0.0), -Vec2::X);
        assert!(!resolve_pair(&mut a, &mut b, 0.01, R, &config));
        assert_eq!(a.velocity, Vec2::X);
    }

    #[test]
    fn head_on_elastic_swaps_velocities() {
        let config = elastic();
        let mut a = stone(1, Vec2::ZERO, Vec2::new(1.0, 0.0));
        let mut b = stone(2, Vec2::new(2.0 * R - 0.01, 0.0), Vec2::new(-1.0, 0.0));
        assert!(resolve_pair(&mut a, &mut b, 0.01, R, &config));
        assert!((a.velocity.x + 1.0).abs() < 1e-5);
        assert!((b.velocity.x - 1.0).abs() < 1e-5);
        assert!(a.velocity.y.abs() < 1e-6 && b.velocity.y.abs() < 1e-6);
        // Momentum conserved
        assert!((a.velocity + b.velocity).length() < 1e-5);
    }

    #[test]
    fn moving_into_resting_stone_transfers_motion() {
        let config = elastic();
        let mut a = stone(1, Vec2::ZERO, Vec2::new(0.0, 2.0));
        let mut b = stone(2, Vec2::new(0.0, 2.0 * R - 0.005), Vec2::ZERO);
        resolve_pair(&mut a, &mut b, 0.01, R, &config);
        assert!(a.velocity.length() < 1e-4);
        assert!((b.velocity.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn default_constants_reverse_head_on_and_separate() {
        let config = PhysicsConfig::default();
        let mut a = stone(1, Vec2::ZERO, Vec2::new(1.0, 0.0));
        let mut b = stone(2, Vec2::new(2.0 * R - 0.01, 0.0), Vec2::new(-1.0, 0.0));
        resolve_pair(&mut a, &mut b, 0.01, R, &config);
        assert!(a.velocity.x < 0.0);
        assert!(b.velocity.x > 0.0);
        assert!(a.position.distance(b.position) >= 2.0 * R - 1e-4);
    }

    #[test]
    fn resting_overlap_is_pushed_apart_evenly() {
        let config = PhysicsConfig::default();
        let mut a = stone(1, Vec2::ZERO, Vec2::ZERO);
        let mut b = stone(2, Vec2::new(2.0 * R - 0.02, 0.0), Vec2::ZERO);
        resolve_pair(&mut a, &mut b, 0.01, R, &config);
        assert!((a.position.x + 0.01).abs() < 1e-5);
        assert!((b.position.x - (2.0 * R - 0.01)).abs() < 1e-5);
        assert_eq!(a.velocity, Vec2::ZERO);
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn coincident_centers_use_fixed_axis() {
        let config = PhysicsConfig::default();
        let mut a = stone(1, Vec2::new(0.0, 5.0), Vec2::ZERO);
        let mut b = stone(2, Vec2::new(0.0, 5.0), Vec2::ZERO);
        resolve_pair(&mut a, &mut b, 0.01, R, &config);
        assert!((b.position.x - a.position.x - 2.0 * R).abs() < 1e-5);
        assert_eq!(a.position.y, b.position.y);
    }

    #[test]
    fn glancing_hit_spins_both_stones() {
        let config = PhysicsConfig::default();
        let mut a = stone(1, Vec2::ZERO, Vec2::new(0.0, 2.0));
        let mut b = stone(2, Vec2::new(0.15, 2.0 * R - 0.05), Vec2::ZERO);
        b.has_stopped_notified = true;
        resolve_pair(&mut a, &mut b, 0.01, R, &config);
        assert!(a.rotation_rate != 0.0);
        assert!(b.rotation_rate != 0.0);
        assert!(a.spin_activated && b.spin_activated);
        assert!(!b.has_stopped_notified);
    }

    #[test]
    fn contact_releases_pending_spin() {
        let config = PhysicsConfig {
            spin_transfer: 0.0,
            spin_damping: 0.0,
            ..PhysicsConfig::default()
        };
        let mut a = stone(1, Vec2::ZERO, Vec2::new(0.0, 1.0));
        a.pending_rotation_rate = 1.0;
        let mut b = stone(2, Vec2::new(0.0, 2.0 * R - 0.01), Vec2::ZERO);
        resolve_pair(&mut a, &mut b, 0.01, R, &config);
        assert_eq!(a.rotation_rate, 1.0);
        assert_eq!(a.pending_rotation_rate, 0.0);
    }

    #[test]
    fn out_stones_are_ignored() {
        let config = PhysicsConfig::default();
        let mut stones = vec![
            stone(1, Vec2::ZERO, Vec2::ZERO),
            stone(2, Vec2::new(0.1, 0.0), Vec2::ZERO),
        ];
        stones[1].is_out = true;
        assert!(!resolve_collisions(&mut stones, 0.01, R, &config));
        assert_eq!(stones[1].position, Vec2::new(0.1, 0.0));
    }

    #[test]
    fn resting_contact_within_slop_is_left_alone() {
        let config = PhysicsConfig::default();
        let mut a = stone(1, Vec2::new(0.1, 37.0), Vec2::ZERO);
        let mut b = stone(2, Vec2::new(0.1, 37.0 + 2.0 * R - CONTACT_SLOP * 0.5), Vec2::ZERO);
        let (before_a, before_b) = (a.position, b.position);
        assert!(!resolve_pair(&mut a, &mut b, 1.0 / 60.0, R, &config));
        assert_eq!(a.position, before_a);
        assert_eq!(b.position, before_b);
    }

    #[test]
    fn rewind_time_reaches_contact() {
        let separation = Vec2::new(0.28, 0.0);
        let relative = Vec2::new(-2.0, 0.0);
        let t = contact_rewind_time(separation, relative, 0.29, 1.0);
        assert!((t - 0.005).abs() < 1e-5);
        assert_eq!(contact_rewind_time(separation, relative, 0.29, 0.001), 0.001);
    }

    proptest! {
        #[test]
        fn pair_never_left_overlapping(
            dx in -0.28f32..0.28,
            dy in -0.28f32..0.28,
            avx in -3.0f32..3.0,
            avy in -3.0f32..3.0,
            bvx in -3.0f32..3.0,
            bvy in -3.0f32..3.0,
            spin in -3.0f32..3.0,
        ) {
            let config = PhysicsConfig::default();
            let mut stones = vec![
                stone(1, Vec2::new(0.0, 10.0), Vec2::new(avx, avy)),
                stone(2, Vec2::new(dx, 10.0 + dy), Vec2::new(bvx, bvy)),
            ];
            stones[0].rotation_rate = spin;
            stones[0].spin_activated = true;
            resolve_collisions(&mut stones, 1.0 / 60.0, R, &config);
            let distance = stones[0].position.distance(stones[1].position);
            prop_assert!(distance >= 2.0 * R - 1e-4, "distance {}", distance);
        }

        #[test]
        fn elastic_collision_conserves_momentum(
            dx in -0.28f32..0.28,
            dy in -0.28f32..0.28,
            avx in -3.0f32..3.0,
            avy in -3.0f32..3.0,
            bvx in -3.0f32..3.0,
            bvy in -3.0f32..3.0,
        ) {
            let config = elastic();
            let mut a = stone(1, Vec2::ZERO, Vec2::new(avx, avy));
            let mut b = stone(2, Vec2::new(dx, dy), Vec2::new(bvx, bvy));
            let before = a.velocity + b.velocity;
            resolve_pair(&mut a, &mut b, 1.0 / 60.0, R, &config);
            let after = a.velocity + b.velocity;
            prop_assert!((before - after).length() < 1e-3);
        }
    }
}
