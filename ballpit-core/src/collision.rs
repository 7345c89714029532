//! Soft overlap resolution between spheres.
//!
//! Everything here works on `Vec3` values on the stack; the pairwise pass in
//! `ParticleField::update` calls these once per candidate pair.

use glam::Vec3;

/// Velocity-correction floor for contacts between two free bodies
pub const PAIR_DAMPING_FLOOR: f32 = 1.0;

/// Velocity-correction floor when a free body touches the controller
pub const CONTROLLER_DAMPING_FLOOR: f32 = 2.0;

/// A detected overlap between two spheres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector pointing from the first sphere to the second
    pub axis: Vec3,
    /// Sum of radii minus center distance, always positive
    pub overlap: f32,
}

/// Test two spheres for overlap. Coincident centers separate along +Y.
pub fn separation(a: Vec3, b: Vec3, radius_a: f32, radius_b: f32) -> Option<Contact> {
    let delta = b - a;
    let dist = delta.length();
    let sum = radius_a + radius_b;
    if dist >= sum {
        return None;
    }
    Some(Contact {
        axis: delta.try_normalize().unwrap_or(Vec3::Y),
        overlap: sum - dist,
    })
}

/// Push two free bodies apart by half the overlap each.
///
/// Each body's velocity is corrected along the push, scaled by the other
/// body's speed (never less than [`PAIR_DAMPING_FLOOR`]).
pub fn resolve_pair(
    contact: Contact,
    pos_a: &mut Vec3,
    vel_a: &mut Vec3,
    pos_b: &mut Vec3,
    vel_b: &mut Vec3,
) {
    let push = contact.axis * (0.5 * contact.overlap);
    let speed_a = vel_a.length().max(PAIR_DAMPING_FLOOR);
    let speed_b = vel_b.length().max(PAIR_DAMPING_FLOOR);

    *pos_a -= push;
    *vel_a -= push * speed_b;
    *pos_b += push;
    *vel_b += push * speed_a;
}

/// Push a free body out of the controller sphere.
///
/// The controller is kinematic, so the free body takes the whole overlap.
/// `contact.axis` points from the free body toward the controller.
pub fn resolve_controller(
    contact: Contact,
    controller_vel: Vec3,
    pos: &mut Vec3,
    vel: &mut Vec3,
) {
    let push = contact.axis * contact.overlap;
    *pos -= push;
    *vel -= push * controller_vel.length().max(CONTROLLER_DAMPING_FLOOR);
}
