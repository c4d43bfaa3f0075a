//! Stateless steering vectors.
//!
//! Every function returns a velocity in units per second. None of them hold
//! state; callers decide which behavior applies each tick.

use std::f32::consts::{FRAC_PI_2, PI};

use skirmish_common::{bearing, from_angle, Vec2};

/// Inner edge of the orbit band, as a fraction of the desired distance.
pub const ORBIT_INNER: f32 = 0.8;
/// Outer edge of the orbit band, as a fraction of the desired distance.
pub const ORBIT_OUTER: f32 = 1.2;
/// Speed factor used while correcting distance during an orbit.
pub const ORBIT_CORRECTION_SPEED: f32 = 0.7;

/// Moves toward `to` at `speed`.
#[must_use]
pub fn seek(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    from_angle(bearing(from, to), speed)
}

/// Moves directly away from `threat` at `speed`.
#[must_use]
pub fn flee(from: Vec2, threat: Vec2, speed: f32) -> Vec2 {
    from_angle(bearing(threat, from), speed)
}

/// Circles `target` while regulating distance toward `desired_distance`.
///
/// The result is always perpendicular to the bearing toward the target. Inside
/// the band the strafe runs at full speed; outside it the strafe slows to
/// [`ORBIT_CORRECTION_SPEED`] and turns the other way when too close.
#[must_use]
pub fn orbit(from: Vec2, target: Vec2, desired_distance: f32, speed: f32) -> Vec2 {
    let dist = from.distance(target);
    let angle = bearing(from, target);

    if dist < desired_distance * ORBIT_INNER {
        // Rotate from the flee bearing.
        from_angle(angle + PI + FRAC_PI_2, speed * ORBIT_CORRECTION_SPEED)
    } else if dist > desired_distance * ORBIT_OUTER {
        from_angle(angle + FRAC_PI_2, speed * ORBIT_CORRECTION_SPEED)
    } else {
        from_angle(angle + FRAC_PI_2, speed)
    }
}

/// Zero velocity.
#[must_use]
pub const fn stop() -> Vec2 {
    Vec2::ZERO
}
