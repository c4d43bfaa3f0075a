//! Planar vector helpers.
//!
//! All positions and velocities are `glam::Vec2` in world units; speeds are
//! units per second.

pub use glam::Vec2;

/// Tolerance used by [`approx_eq`].
pub const EPSILON: f32 = 1e-4;

/// Unit vector pointing from `from` toward `to`.
///
/// Coincident points yield `+X`, mirroring `atan2(0, 0) == 0`.
#[must_use]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(Vec2::X)
}

/// Angle in radians of the bearing from `from` to `to`.
#[must_use]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Velocity of magnitude `speed` along `angle` radians.
#[must_use]
pub fn from_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::from_angle(angle) * speed
}

/// Compares two floats within [`EPSILON`].
#[must_use]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON.max(EPSILON * a.abs().max(b.abs()))
}
