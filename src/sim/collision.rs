//! Collision detection and response
//!
//! Two shapes matter: ramps (egg circle vs. line segment) and gadgets (egg
//! bounding box vs. axis-aligned box). Ramps resolve along the true contact
//! normal; gadgets resolve along the axis of least penetration.

use glam::Vec2;

use super::state::{Egg, Ramp};
use crate::closest_point_on_segment;
use crate::consts::MIN_CONTACT_DIST;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Surface normal at contact (pointing toward the egg center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check an egg against a ramp, treating the ramp as `margin` pixels thick
///
/// Degenerate (zero-length) ramps never hit.
pub fn egg_ramp_collision(egg_pos: Vec2, egg_radius: f32, ramp: &Ramp, margin: f32) -> CollisionResult {
    let Some((closest, _t)) = closest_point_on_segment(egg_pos, ramp.start(), ramp.end()) else {
        return CollisionResult::miss();
    };

    let reach = egg_radius + margin;
    let offset = egg_pos - closest;
    let dist_sq = offset.length_squared();
    if !(dist_sq <= reach * reach) {
        return CollisionResult::miss();
    }

    // An egg centered exactly on the segment gets a tiny divisor, not a NaN
    let dist = dist_sq.sqrt().max(MIN_CONTACT_DIST);
    CollisionResult {
        hit: true,
        point: closest,
        normal: offset / dist,
        penetration: reach - dist,
    }
}

/// Remove `(1 + restitution)` of the velocity along `normal`
///
/// `restitution = 1` is a mirror reflection: v' = v - 2(v·n)n
#[inline]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        other.max.x > self.min.x
            && other.min.x < self.max.x
            && other.max.y > self.min.y
            && other.min.y < self.max.y
    }

    /// How far the egg's box reaches past each face of this box
    pub fn penetrations(&self, egg: &Egg) -> Penetrations {
        Penetrations {
            left: (egg.pos.x + egg.radius) - self.min.x,
            right: self.max.x - (egg.pos.x - egg.radius),
            top: (egg.pos.y + egg.radius) - self.min.y,
            bottom: self.max.y - (egg.pos.y - egg.radius),
        }
    }
}

/// Face of a gadget box the egg is pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Directed overlap depths against each face of a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetrations {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Penetrations {
    /// Face with the smallest overlap. Ties go to the earlier face in
    /// left, right, top, bottom order.
    pub fn min_side(&self) -> Side {
        let mut best = (Side::Left, self.left);
        for candidate in [
            (Side::Right, self.right),
            (Side::Top, self.top),
            (Side::Bottom, self.bottom),
        ] {
            if candidate.1 < best.1 {
                best = candidate;
            }
        }
        best.0
    }
}

/// Move the egg just outside `side` of `aabb`
pub fn push_out(egg: &mut Egg, aabb: &Aabb, side: Side) {
    match side {
        Side::Left => egg.pos.x = aabb.min.x - egg.radius,
        Side::Right => egg.pos.x = aabb.max.x + egg.radius,
        Side::Top => egg.pos.y = aabb.min.y - egg.radius,
        Side::Bottom => egg.pos.y = aabb.max.y + egg.radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn egg_at(x: f32, y: f32) -> Egg {
        Egg::new(Vec2::new(x, y), 16.0)
    }

    #[test]
    fn test_ramp_collision_from_above() {
        let ramp = Ramp::new(0.0, 300.0, 400.0, 300.0);
        let result = egg_ramp_collision(Vec2::new(100.0, 290.0), 16.0, &ramp, 3.0);
        assert!(result.hit);
        assert!((result.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!((result.penetration - 9.0).abs() < 1e-4);
        assert!((result.point - Vec2::new(100.0, 300.0)).length() < 1e-4);
    }

    #[test]
    fn test_ramp_collision_margin_edge() {
        let ramp = Ramp::new(0.0, 300.0, 400.0, 300.0);
        // Exactly radius + margin away still counts
        assert!(egg_ramp_collision(Vec2::new(100.0, 281.0), 16.0, &ramp, 3.0).hit);
        assert!(!egg_ramp_collision(Vec2::new(100.0, 280.0), 16.0, &ramp, 3.0).hit);
    }

    #[test]
    fn test_ramp_collision_endpoint_cap() {
        let ramp = Ramp::new(0.0, 300.0, 100.0, 300.0);
        // Past the right end, diagonal to the endpoint
        let result = egg_ramp_collision(Vec2::new(110.0, 290.0), 16.0, &ramp, 3.0);
        assert!(result.hit);
        assert!(result.normal.x > 0.0 && result.normal.y < 0.0);
    }

    #[test]
    fn test_ramp_collision_degenerate_ramp() {
        let ramp = Ramp::new(50.0, 50.0, 50.0, 50.0);
        assert!(!egg_ramp_collision(Vec2::new(50.0, 50.0), 16.0, &ramp, 3.0).hit);
    }

    #[test]
    fn test_ramp_collision_center_on_segment() {
        let ramp = Ramp::new(0.0, 0.0, 100.0, 0.0);
        let result = egg_ramp_collision(Vec2::new(50.0, 0.0), 16.0, &ramp, 3.0);
        assert!(result.hit);
        assert!(result.normal.is_finite());
    }

    #[test]
    fn test_bounce_velocity() {
        let v = bounce_velocity(Vec2::new(0.0, 100.0), Vec2::new(0.0, -1.0), 0.25);
        assert!((v - Vec2::new(0.0, -25.0)).length() < 1e-4);

        // Full restitution mirrors
        let v = bounce_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0), 1.0);
        assert!((v - Vec2::new(-100.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_aabb_overlap_is_strict() {
        let aabb = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(64.0, 32.0));
        assert!(aabb.overlaps(&egg_at(70.0, 16.0).aabb()));
        // Egg box touching the right face
        assert!(!aabb.overlaps(&egg_at(80.0, 16.0).aabb()));
    }

    #[test]
    fn test_min_side() {
        let aabb = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(164.0, 300.0));
        assert_eq!(aabb.penetrations(&egg_at(88.0, 200.0)).min_side(), Side::Left);
        assert_eq!(aabb.penetrations(&egg_at(176.0, 200.0)).min_side(), Side::Right);
        assert_eq!(aabb.penetrations(&egg_at(132.0, 90.0)).min_side(), Side::Top);
        assert_eq!(aabb.penetrations(&egg_at(132.0, 310.0)).min_side(), Side::Bottom);
    }

    #[test]
    fn test_min_side_tie_order() {
        let all_equal = Penetrations {
            left: 4.0,
            right: 4.0,
            top: 4.0,
            bottom: 4.0,
        };
        assert_eq!(all_equal.min_side(), Side::Left);

        let top_bottom = Penetrations {
            left: 9.0,
            right: 9.0,
            top: 2.0,
            bottom: 2.0,
        };
        assert_eq!(top_bottom.min_side(), Side::Top);

        let right_top = Penetrations {
            left: 9.0,
            right: 2.0,
            top: 2.0,
            bottom: 9.0,
        };
        assert_eq!(right_top.min_side(), Side::Right);
    }

    #[test]
    fn test_push_out() {
        let aabb = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(164.0, 132.0));
        let mut egg = egg_at(110.0, 105.0);
        push_out(&mut egg, &aabb, Side::Top);
        assert_eq!(egg.pos, Vec2::new(110.0, 84.0));
        push_out(&mut egg, &aabb, Side::Right);
        assert_eq!(egg.pos, Vec2::new(180.0, 84.0));
    }
}
