//! Force primitives shared by every strategy: soft walls, pointer avoidance,
//! pointer collision and the hard-boundary fallback.
use std::f64::consts::{PI, TAU};

use crate::types::Vec2;

/// Soft repulsion for a single wall.
///
/// Zero outside the padding band; inside it grows toward the band's inner edge
/// and peaks at `k` as `distance → pad⁻`.
#[must_use]
pub fn wall_force(distance: f64, pad: f64, k: f64) -> f64 {
    if distance >= pad {
        return 0.0;
    }
    let gap = pad - distance;
    k / gap.mul_add(gap, 1.0)
}

/// Sum of the four wall forces, each pointing into the viewport.
#[must_use]
pub fn soft_wall_push(position: Vec2, width: f64, height: f64, pad: f64, k: f64) -> Vec2 {
    if pad <= 0.0 || k == 0.0 {
        return Vec2::ZERO;
    }
    let left = wall_force(position.x, pad, k);
    let right = wall_force(width - position.x, pad, k);
    let top = wall_force(position.y, pad, k);
    let bottom = wall_force(height - position.y, pad, k);
    Vec2::new(left - right, top - bottom)
}

/// Push directly away from the pointer, fading linearly to zero at `radius`.
#[must_use]
pub fn pointer_avoidance(position: Vec2, pointer: Vec2, radius: f64, strength: f64) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    let offset = position - pointer;
    let distance = offset.length();
    if distance >= radius {
        return Vec2::ZERO;
    }
    let Some(away) = offset.normalized() else {
        return Vec2::ZERO;
    };
    away * (strength * (1.0 - distance / radius))
}

/// Outcome of a hard pointer collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub position: Vec2,
    pub velocity: Vec2,
    pub normal: Vec2,
}

/// Resolve a hard collision with the pointer disc.
///
/// Inside `radius` the agent is snapped onto the disc edge along the
/// separating normal and its velocity is reflected specularly, then scaled by
/// `damping`. Returns `None` when there is no contact or the normal is
/// undefined (agent exactly on the pointer).
#[must_use]
pub fn pointer_collision(
    position: Vec2,
    velocity: Vec2,
    pointer: Vec2,
    radius: f64,
    damping: f64,
) -> Option<Collision> {
    if radius <= 0.0 {
        return None;
    }
    let offset = position - pointer;
    if offset.length() >= radius {
        return None;
    }
    let normal = offset.normalized()?;
    let reflected = velocity - normal * (2.0 * velocity.dot(normal));
    Some(Collision {
        position: pointer + normal * radius,
        velocity: reflected * damping,
        normal,
    })
}

/// Hard-boundary fallback.
///
/// Clamps `position` into `[pad, extent − pad]` on each axis and inverts the
/// offending velocity component scaled by `restitution`. A band wider than
/// half the viewport collapses onto the centre line. Returns `true` when a
/// correction was applied.
pub fn contain(
    position: &mut Vec2,
    velocity: &mut Vec2,
    width: f64,
    height: f64,
    pad: f64,
    restitution: f64,
) -> bool {
    let x_hit = contain_axis(&mut position.x, &mut velocity.x, width, pad, restitution);
    let y_hit = contain_axis(&mut position.y, &mut velocity.y, height, pad, restitution);
    x_hit || y_hit
}

fn contain_axis(
    coord: &mut f64,
    speed: &mut f64,
    extent: f64,
    pad: f64,
    restitution: f64,
) -> bool {
    let extent = extent.max(0.0);
    let half = extent * 0.5;
    let pad = pad.max(0.0);
    let low = pad.min(half);
    let high = (extent - pad).max(half);

    if !coord.is_finite() {
        *coord = half;
        *speed = 0.0;
        return true;
    }
    if *coord < low {
        *coord = low;
        *speed = speed.abs() * restitution;
        true
    } else if *coord > high {
        *coord = high;
        *speed = -speed.abs() * restitution;
        true
    } else {
        false
    }
}

/// Wrap an angle into `[-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped < -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_force_is_zero_outside_band() {
        assert!(wall_force(50.0, 50.0, 10.0).abs() < f64::EPSILON);
        assert!(wall_force(120.0, 50.0, 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wall_force_matches_reference_point() {
        let force = wall_force(45.0, 50.0, 10.0);
        assert!((force - 10.0 / 26.0).abs() < 1e-12);
        assert!((force - 0.3846).abs() < 1e-4);
    }

    #[test]
    fn wall_force_increases_toward_band_edge() {
        let mut previous = wall_force(0.0, 50.0, 10.0);
        for step in 1..500 {
            let distance = f64::from(step) * 0.1;
            let force = wall_force(distance, 50.0, 10.0);
            assert!(force > previous, "not increasing at {distance}");
            previous = force;
        }
        assert!(previous <= 10.0);
    }

    #[test]
    fn soft_walls_push_inward() {
        let push = soft_wall_push(Vec2::new(45.0, 300.0), 800.0, 600.0, 50.0, 10.0);
        assert!((push.x - 10.0 / 26.0).abs() < 1e-12);
        assert!(push.y.abs() < f64::EPSILON);

        let push = soft_wall_push(Vec2::new(400.0, 590.0), 800.0, 600.0, 50.0, 10.0);
        assert!(push.y < 0.0);
        assert!(push.x.abs() < f64::EPSILON);

        let none = soft_wall_push(Vec2::new(5.0, 5.0), 800.0, 600.0, 0.0, 10.0);
        assert_eq!(none, Vec2::ZERO);
    }

    #[test]
    fn avoidance_fades_with_distance() {
        let pointer = Vec2::new(100.0, 100.0);
        let near = pointer_avoidance(Vec2::new(110.0, 100.0), pointer, 100.0, 50.0);
        let far = pointer_avoidance(Vec2::new(190.0, 100.0), pointer, 100.0, 50.0);
        assert!((near.x - 45.0).abs() < 1e-9);
        assert!(far.x > 0.0 && far.x < near.x);
        assert_eq!(
            pointer_avoidance(Vec2::new(250.0, 100.0), pointer, 100.0, 50.0),
            Vec2::ZERO
        );
        assert_eq!(pointer_avoidance(pointer, pointer, 100.0, 50.0), Vec2::ZERO);
    }

    #[test]
    fn collision_snaps_and_reflects() {
        let pointer = Vec2::new(200.0, 100.0);
        let hit = pointer_collision(
            Vec2::new(190.0, 100.0),
            Vec2::new(50.0, 0.0),
            pointer,
            20.0,
            0.6,
        )
        .unwrap();
        assert!((hit.position.x - 180.0).abs() < 1e-9);
        assert!((hit.position.y - 100.0).abs() < 1e-9);
        assert!(((hit.position - pointer).length() - 20.0).abs() < 1e-9);
        assert!((hit.velocity.x + 30.0).abs() < 1e-9);
        assert!(hit.velocity.y.abs() < 1e-9);
    }

    #[test]
    fn collision_skips_degenerate_cases() {
        let pointer = Vec2::new(10.0, 10.0);
        assert!(pointer_collision(pointer, Vec2::new(1.0, 0.0), pointer, 20.0, 0.6).is_none());
        assert!(
            pointer_collision(Vec2::new(50.0, 10.0), Vec2::ZERO, pointer, 20.0, 0.6).is_none()
        );
    }

    #[test]
    fn contain_clamps_and_bounces() {
        let mut position = Vec2::new(-5.0, 650.0);
        let mut velocity = Vec2::new(-10.0, 20.0);
        assert!(contain(&mut position, &mut velocity, 800.0, 600.0, 10.0, 0.8));
        assert_eq!(position, Vec2::new(10.0, 590.0));
        assert!((velocity.x - 8.0).abs() < 1e-12);
        assert!((velocity.y + 16.0).abs() < 1e-12);

        let mut inside = Vec2::new(400.0, 300.0);
        let mut v = Vec2::new(1.0, 1.0);
        assert!(!contain(&mut inside, &mut v, 800.0, 600.0, 10.0, 0.8));
    }

    #[test]
    fn contain_handles_oversized_padding() {
        let mut position = Vec2::new(1.0, 99.0);
        let mut velocity = Vec2::new(-1.0, 1.0);
        contain(&mut position, &mut velocity, 100.0, 100.0, 80.0, 0.7);
        assert_eq!(position, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for raw in [-20.0, -PI, -1.0, 0.0, 1.0, PI, 4.0, 20.0] {
            let wrapped = wrap_angle(raw);
            assert!((-PI..=PI).contains(&wrapped), "{raw} -> {wrapped}");
            assert!(((raw - wrapped) / TAU - ((raw - wrapped) / TAU).round()).abs() < 1e-9);
        }
    }
}
