//! Physics collaborator.
//!
//! The combat core never integrates motion or tests geometry itself beyond
//! plain distance math. It hands velocities to a [`PhysicsWorld`] and asks it
//! whether two [`Region`]s overlap. [`ArenaPhysics`] is the stock
//! implementation: Euler integration, arena-bounds clamping for bounded bodies,
//! and circle/segment overlap.

use serde::{Deserialize, Serialize};
use skirmish_common::Vec2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum X coordinate
    pub min_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl Aabb {
    /// Creates a new box.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Box anchored at the origin with the given size.
    #[must_use]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Whether `point` lies inside (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Clamps a circle's center so the circle stays inside the box.
    ///
    /// A circle larger than the box is pinned to the center on that axis.
    #[must_use]
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let clamp_axis = |v: f32, lo: f32, hi: f32| {
            if lo > hi {
                (lo + hi) / 2.0
            } else {
                v.clamp(lo, hi)
            }
        };
        Vec2::new(
            clamp_axis(center.x, self.min_x + radius, self.max_x - radius),
            clamp_axis(center.y, self.min_y + radius, self.max_y - radius),
        )
    }
}

/// A shape used for contact queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Region {
    /// Disc around a point.
    Circle {
        /// Center
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Line segment thickened to a band of `width`.
    Segment {
        /// Start point
        a: Vec2,
        /// End point
        b: Vec2,
        /// Total band width
        width: f32,
    },
}

impl Region {
    /// Circle region.
    #[must_use]
    pub const fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    /// Segment band region.
    #[must_use]
    pub const fn segment(a: Vec2, b: Vec2, width: f32) -> Self {
        Self::Segment { a, b, width }
    }
}

/// Distance from `p` to the segment `a..b`.
#[must_use]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let denom = d1.perp_dot(d2);
    if denom.abs() <= f32::EPSILON {
        return false;
    }
    let t = (b1 - a1).perp_dot(d2) / denom;
    let u = (b1 - a1).perp_dot(d1) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Motion and contact services the combat core relies on.
pub trait PhysicsWorld {
    /// Integrates `velocity` (units/s) over `dt_ms` and returns the new position.
    ///
    /// Bodies with `bounded_radius` set are kept inside the arena.
    fn apply_velocity(
        &self,
        position: Vec2,
        velocity: Vec2,
        dt_ms: f32,
        bounded_radius: Option<f32>,
    ) -> Vec2;

    /// Whether two regions overlap.
    fn overlaps(&self, a: &Region, b: &Region) -> bool;

    /// Arena bounds.
    fn bounds(&self) -> Aabb;
}

/// Flat rectangular arena.
#[derive(Debug, Clone)]
pub struct ArenaPhysics {
    bounds: Aabb,
}

impl ArenaPhysics {
    /// Arena spanning `(0, 0)` to `(width, height)`.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Aabb::from_size(width, height),
        }
    }
}

impl PhysicsWorld for ArenaPhysics {
    fn apply_velocity(
        &self,
        position: Vec2,
        velocity: Vec2,
        dt_ms: f32,
        bounded_radius: Option<f32>,
    ) -> Vec2 {
        let next = position + velocity * (dt_ms / 1000.0);
        match bounded_radius {
            Some(radius) => self.bounds.clamp_circle(next, radius),
            None => next,
        }
    }

    fn overlaps(&self, a: &Region, b: &Region) -> bool {
        match (*a, *b) {
            (
                Region::Circle {
                    center: c1,
                    radius: r1,
                },
                Region::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => c1.distance(c2) < r1 + r2,
            (Region::Circle { center, radius }, Region::Segment { a, b, width })
            | (Region::Segment { a, b, width }, Region::Circle { center, radius }) => {
                point_segment_distance(center, a, b) < radius + width / 2.0
            }
            (
                Region::Segment {
                    a: a1,
                    b: a2,
                    width: w1,
                },
                Region::Segment {
                    a: b1,
                    b: b2,
                    width: w2,
                },
            ) => {
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
                let gap = point_segment_distance(a1, b1, b2)
                    .min(point_segment_distance(a2, b1, b2))
                    .min(point_segment_distance(b1, a1, a2))
                    .min(point_segment_distance(b2, a1, a2));
                gap < (w1 + w2) / 2.0
            }
        }
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains() {
        let aabb = Aabb::from_size(100.0, 50.0);
        assert!(aabb.contains(Vec2::new(10.0, 10.0)));
        assert!(!aabb.contains(Vec2::new(110.0, 10.0)));
        assert_eq!(aabb.center(), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_clamp_circle_keeps_radius_inside() {
        let aabb = Aabb::from_size(100.0, 100.0);
        let clamped = aabb.clamp_circle(Vec2::new(-20.0, 95.0), 10.0);
        assert_eq!(clamped, Vec2::new(10.0, 90.0));
    }

    #[test]
    fn test_apply_velocity_integrates_in_seconds() {
        let physics = ArenaPhysics::new(1920.0, 1080.0);
        let next = physics.apply_velocity(Vec2::new(100.0, 100.0), Vec2::new(200.0, 0.0), 500.0, None);
        assert_eq!(next, Vec2::new(200.0, 100.0));
    }

    #[test]
    fn test_unbounded_bodies_may_leave_arena() {
        let physics = ArenaPhysics::new(1920.0, 1080.0);
        let next = physics.apply_velocity(Vec2::new(10.0, 10.0), Vec2::new(-100.0, 0.0), 1000.0, None);
        assert_eq!(next.x, -90.0);
        let bounded =
            physics.apply_velocity(Vec2::new(10.0, 10.0), Vec2::new(-100.0, 0.0), 1000.0, Some(5.0));
        assert_eq!(bounded.x, 5.0);
    }

    #[test]
    fn test_circle_overlap() {
        let physics = ArenaPhysics::new(100.0, 100.0);
        let a = Region::circle(Vec2::ZERO, 5.0);
        let b = Region::circle(Vec2::new(9.0, 0.0), 5.0);
        let c = Region::circle(Vec2::new(11.0, 0.0), 5.0);
        assert!(physics.overlaps(&a, &b));
        assert!(!physics.overlaps(&a, &c));
    }

    #[test]
    fn test_circle_segment_overlap() {
        let physics = ArenaPhysics::new(100.0, 100.0);
        let seg = Region::segment(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 20.0);
        assert!(physics.overlaps(&Region::circle(Vec2::new(50.0, 12.0), 5.0), &seg));
        assert!(!physics.overlaps(&seg, &Region::circle(Vec2::new(50.0, 16.0), 5.0)));
        // Past the end cap.
        assert!(!physics.overlaps(&Region::circle(Vec2::new(120.0, 0.0), 5.0), &seg));
    }

    #[test]
    fn test_segment_segment_overlap() {
        let physics = ArenaPhysics::new(100.0, 100.0);
        let a = Region::segment(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0), 1.0);
        let b = Region::segment(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0), 1.0);
        let c = Region::segment(Vec2::new(20.0, 0.0), Vec2::new(30.0, 0.0), 1.0);
        assert!(physics.overlaps(&a, &b));
        assert!(!physics.overlaps(&a, &c));
    }

    #[test]
    fn test_point_segment_degenerate() {
        let d = point_segment_distance(Vec2::new(3.0, 4.0), Vec2::ZERO, Vec2::ZERO);
        assert!((d - 5.0).abs() < 1e-5);
    }
}
