use crate::field::PhysicalConstants;
use glam::Vec3;

/// Advance one free body by a single frame.
///
/// Gravity is scaled by the body's radius, friction is applied once per call
/// and the resulting velocity is capped before it is added to the position.
pub fn integrate_body(
    position: &mut Vec3,
    velocity: &mut Vec3,
    radius: f32,
    dt: f32,
    constants: &PhysicalConstants,
) {
    velocity.y -= dt * constants.gravity * radius;
    *velocity *= constants.friction;
    *velocity = cap_speed(*velocity, constants.max_velocity);
    *position += *velocity;
}

/// Rescale `velocity` so its length does not exceed `max`. Direction is kept.
pub fn cap_speed(velocity: Vec3, max: f32) -> Vec3 {
    velocity.clamp_length_max(max)
}
