//! The ball pit particle field.
//!
//! A fixed population of spheres stored as dense parallel arrays. Body 0 can
//! be switched into a kinematic attractor that follows an external target
//! (usually the pointer), pushing the other bodies out of its way.

use crate::bounds::Bounds;
use crate::collision::{resolve_controller, resolve_pair, separation};
use crate::config::FieldConfig;
use crate::integrator::{cap_speed, integrate_body};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

/// Blend factor applied to the controller body each update
pub const CONTROLLER_BLEND: f32 = 0.1;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl FieldError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Physical constants shared by every body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub gravity: f32,
    pub friction: f32,
    pub wall_bounce: f32,
    pub max_velocity: f32,
}

impl PhysicalConstants {
    pub fn validate(&self) -> Result<(), FieldError> {
        if !self.gravity.is_finite() {
            return Err(FieldError::invalid("gravity must be finite"));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(FieldError::invalid(format!(
                "friction must be within [0, 1], got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.wall_bounce) {
            return Err(FieldError::invalid(format!(
                "wall_bounce must be within [0, 1], got {}",
                self.wall_bounce
            )));
        }
        if !(self.max_velocity.is_finite() && self.max_velocity >= 0.0) {
            return Err(FieldError::invalid(format!(
                "max_velocity must be non-negative, got {}",
                self.max_velocity
            )));
        }
        Ok(())
    }
}

/// What body 0 is doing this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Controller {
    Free,
    Attract(Vec3),
}

/// Explicit initial state for one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInit {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
}

impl BodyInit {
    pub fn at_rest(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    radii: Vec<f32>,
    bounds: Bounds,
    constants: PhysicalConstants,
    controller: Controller,
}

impl ParticleField {
    /// Build a field with randomized starting positions and sizes.
    ///
    /// Body 0 starts at the origin with radius `size0`. Starting overlap is
    /// possible; the first few updates push bodies apart.
    pub fn new(config: &FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let bounds = config.bounds();
        let mut positions = Vec::with_capacity(config.count);
        let mut radii = Vec::with_capacity(config.count);
        positions.push(Vec3::ZERO);
        radii.push(config.size0);
        for _ in 1..config.count {
            positions.push(Vec3::new(
                rng.gen_range(-bounds.max_x..=bounds.max_x),
                rng.gen_range(-bounds.max_y..=bounds.max_y),
                rng.gen_range(-bounds.max_z..=bounds.max_z),
            ));
        }
        for _ in 1..config.count {
            radii.push(rng.gen_range(config.min_size..=config.max_size));
        }

        debug!(
            count = config.count,
            seed = ?config.seed,
            "particle field created"
        );

        Ok(Self {
            velocities: vec![Vec3::ZERO; config.count],
            positions,
            radii,
            bounds,
            constants: config.constants(),
            controller: Controller::Free,
        })
    }

    /// Build a field from explicit initial arrays
    pub fn from_bodies(
        bodies: &[BodyInit],
        bounds: Bounds,
        constants: PhysicalConstants,
    ) -> Result<Self, FieldError> {
        if bodies.is_empty() {
            return Err(FieldError::invalid("body count must be positive"));
        }
        if let Some(i) = bodies.iter().position(|b| !(b.radius > 0.0)) {
            return Err(FieldError::invalid(format!(
                "body {} has non-positive radius {}",
                i, bodies[i].radius
            )));
        }
        if let Some(i) = bodies
            .iter()
            .position(|b| !(b.position.is_finite() && b.velocity.is_finite()))
        {
            return Err(FieldError::invalid(format!(
                "body {} has a non-finite position or velocity",
                i
            )));
        }
        if !bounds.is_valid() {
            return Err(FieldError::invalid(format!(
                "domain extents must be positive, got {:?}",
                bounds
            )));
        }
        let largest = bodies.iter().map(|b| b.radius).fold(0.0, f32::max);
        if largest > bounds.min_extent() {
            return Err(FieldError::invalid(format!(
                "a body of radius {} does not fit in {:?}",
                largest, bounds
            )));
        }
        constants.validate()?;

        Ok(Self {
            positions: bodies.iter().map(|b| b.position).collect(),
            velocities: bodies
                .iter()
                .map(|b| cap_speed(b.velocity, constants.max_velocity))
                .collect(),
            radii: bodies.iter().map(|b| b.radius).collect(),
            bounds,
            constants,
            controller: Controller::Free,
        })
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn controller_enabled(&self) -> bool {
        matches!(self.controller, Controller::Attract(_))
    }

    /// Where the host should place its point light (body 0)
    pub fn light_position(&self) -> Vec3 {
        self.positions[0]
    }

    /// Engage the controller; body 0 starts following `point` on the next update
    pub fn set_controller_target(&mut self, point: Vec3) {
        if !self.controller_enabled() {
            debug!("controller engaged");
        }
        self.controller = Controller::Attract(point);
    }

    pub fn clear_controller(&mut self) {
        if self.controller_enabled() {
            debug!("controller released");
        }
        self.controller = Controller::Free;
    }

    /// Replace the domain extents. Bodies already outside are pulled back in
    /// by the next update, not here.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        debug!(
            max_x = bounds.max_x,
            max_y = bounds.max_y,
            max_z = bounds.max_z,
            "bounds changed"
        );
        self.bounds = bounds;
    }

    /// Advance every body by one frame.
    ///
    /// Runs controller relaxation, free-body integration, then a single
    /// index-ordered pass of pairwise overlap resolution and containment.
    pub fn update(&mut self, dt: f32) {
        let count = self.len();
        let constants = self.constants;
        let open_top = constants.gravity != 0.0;

        let first_free = match self.controller {
            Controller::Attract(target) => {
                let mut pos = self.positions[0].lerp(target, CONTROLLER_BLEND);
                let mut vel = Vec3::ZERO;
                self.bounds
                    .contain(&mut pos, &mut vel, self.radii[0], constants.wall_bounce, open_top);
                self.positions[0] = pos;
                self.velocities[0] = vel;
                1
            }
            Controller::Free => 0,
        };

        for i in first_free..count {
            integrate_body(
                &mut self.positions[i],
                &mut self.velocities[i],
                self.radii[i],
                dt,
                &constants,
            );
        }

        let controller = (first_free == 1).then(|| (self.positions[0], self.velocities[0]));

        for i in first_free..count {
            let mut pos = self.positions[i];
            let mut vel = self.velocities[i];
            let radius = self.radii[i];

            for j in (i + 1)..count {
                let mut other_pos = self.positions[j];
                let mut other_vel = self.velocities[j];
                if let Some(contact) = separation(pos, other_pos, radius, self.radii[j]) {
                    resolve_pair(contact, &mut pos, &mut vel, &mut other_pos, &mut other_vel);
                    self.positions[j] = other_pos;
                    self.velocities[j] = other_vel;
                }
            }

            if let Some((controller_pos, controller_vel)) = controller {
                if let Some(contact) = separation(pos, controller_pos, radius, self.radii[0]) {
                    resolve_controller(contact, controller_vel, &mut pos, &mut vel);
                }
            }

            self.bounds
                .contain(&mut pos, &mut vel, radius, constants.wall_bounce, open_top);

            // Last write to body i this frame
            self.positions[i] = pos;
            self.velocities[i] = cap_speed(vel, constants.max_velocity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_helpers::approx_eq_f32;

    fn constants(gravity: f32) -> PhysicalConstants {
        PhysicalConstants {
            gravity,
            friction: 0.9975,
            wall_bounce: 0.95,
            max_velocity: 0.15,
        }
    }

    #[test]
    fn test_single_body_follows_damped_gravity_recurrence() {
        let c = constants(0.7);
        let radius = 0.8;
        let dt = 1.0 / 60.0;
        let bodies = [BodyInit::at_rest(Vec3::new(0.0, 900.0, 0.0), radius)];
        let mut field = ParticleField::from_bodies(&bodies, Bounds::new(5.0, 1000.0, 2.0), c)
            .unwrap();

        let mut expected = 0.0_f32;
        for _ in 0..400 {
            field.update(dt);
            expected = ((expected - dt * c.gravity * radius) * c.friction).max(-c.max_velocity);
            assert!(approx_eq_f32(field.velocities[0].y, expected, 1e-5));
            assert_eq!(field.velocities[0].x, 0.0);
        }
        // Terminal speed is reached within the run
        assert!(approx_eq_f32(field.velocities[0].y, -c.max_velocity, 1e-5));
    }

    #[test]
    fn test_speed_cap_holds_every_step() {
        let config = FieldConfig {
            seed: Some(7),
            ..FieldConfig::default()
        };
        let mut field = ParticleField::new(&config).unwrap();
        for step in 0..600 {
            if step % 100 < 50 {
                field.set_controller_target(Vec3::new((step as f32 * 0.05).sin() * 4.0, -2.0, 0.0));
            } else {
                field.clear_controller();
            }
            field.update(1.0 / 60.0);
            for v in &field.velocities {
                assert!(v.length() <= config.max_velocity + 1e-5, "speed {} at step {}", v.length(), step);
            }
        }
    }

    #[test]
    fn test_controller_body_is_kinematic() {
        let bodies = [
            BodyInit {
                position: Vec3::ZERO,
                velocity: Vec3::new(0.1, 0.0, 0.0),
                radius: 1.0,
            },
            BodyInit::at_rest(Vec3::new(3.0, 0.0, 0.0), 0.5),
        ];
        let mut field =
            ParticleField::from_bodies(&bodies, Bounds::new(5.0, 5.0, 2.0), constants(0.7)).unwrap();
        field.set_controller_target(Vec3::new(2.0, 0.0, 0.0));
        field.update(1.0 / 60.0);

        assert_eq!(field.velocities[0], Vec3::ZERO);
        assert!(approx_eq_f32(field.positions[0].x, 0.2, 1e-6));
        assert_eq!(field.positions[0].y, 0.0);
    }

    #[test]
    fn test_controller_pushes_free_body_out() {
        let bodies = [
            BodyInit::at_rest(Vec3::new(-1.0, 0.0, 0.0), 1.0),
            BodyInit::at_rest(Vec3::ZERO, 0.5),
        ];
        let mut field =
            ParticleField::from_bodies(&bodies, Bounds::new(5.0, 5.0, 2.0), constants(0.0)).unwrap();
        field.set_controller_target(Vec3::new(-1.0, 0.0, 0.0));
        field.update(1.0 / 60.0);

        let gap = field.positions[1].distance(field.positions[0]);
        assert!(gap >= 1.5 - 1e-5, "free body still inside controller: {}", gap);
        assert!(field.velocities[1].x > 0.0);
        assert_eq!(field.positions[0], Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rejects_empty_and_bad_radius() {
        let bounds = Bounds::new(5.0, 5.0, 2.0);
        assert!(matches!(
            ParticleField::from_bodies(&[], bounds, constants(0.7)),
            Err(FieldError::InvalidConfiguration(_))
        ));
        let bodies = [BodyInit::at_rest(Vec3::ZERO, 0.0)];
        assert!(ParticleField::from_bodies(&bodies, bounds, constants(0.7)).is_err());
        let bodies = [BodyInit::at_rest(Vec3::ZERO, f32::NAN)];
        assert!(ParticleField::from_bodies(&bodies, bounds, constants(0.7)).is_err());
        let bodies = [BodyInit::at_rest(Vec3::ZERO, 3.0)];
        assert!(ParticleField::from_bodies(&bodies, bounds, constants(0.7)).is_err());
    }

    #[test]
    fn test_rejects_constants_that_new_rejects() {
        let bodies = [BodyInit::at_rest(Vec3::ZERO, 0.5)];
        let bounds = Bounds::new(5.0, 5.0, 2.0);
        let bad = [
            PhysicalConstants { friction: 1.5, ..constants(0.7) },
            PhysicalConstants { wall_bounce: 3.0, ..constants(0.7) },
            PhysicalConstants { max_velocity: -0.1, ..constants(0.7) },
            PhysicalConstants { gravity: f32::NAN, ..constants(0.7) },
        ];
        for c in bad {
            assert!(matches!(
                ParticleField::from_bodies(&bodies, bounds, c),
                Err(FieldError::InvalidConfiguration(_))
            ));
            let config = FieldConfig {
                gravity: c.gravity,
                friction: c.friction,
                wall_bounce: c.wall_bounce,
                max_velocity: c.max_velocity,
                ..FieldConfig::default()
            };
            assert!(ParticleField::new(&config).is_err());
        }
    }

    #[test]
    fn test_rejects_non_finite_state() {
        let bounds = Bounds::new(5.0, 5.0, 2.0);
        let bodies = [BodyInit::at_rest(Vec3::new(f32::NAN, 0.0, 0.0), 0.5)];
        assert!(ParticleField::from_bodies(&bodies, bounds, constants(0.7)).is_err());
        let bodies = [BodyInit {
            position: Vec3::ZERO,
            velocity: Vec3::new(0.0, f32::INFINITY, 0.0),
            radius: 0.5,
        }];
        assert!(ParticleField::from_bodies(&bodies, bounds, constants(0.7)).is_err());
    }

    #[test]
    fn test_new_draws_within_ranges() {
        let config = FieldConfig {
            seed: Some(3),
            ..FieldConfig::default()
        };
        let field = ParticleField::new(&config).unwrap();
        assert_eq!(field.len(), config.count);
        assert_eq!(field.positions[0], Vec3::ZERO);
        assert_eq!(field.radii[0], config.size0);
        for i in 1..field.len() {
            let r = field.radii[i];
            assert!(r >= config.min_size && r <= config.max_size);
            let p = field.positions[i];
            assert!(p.x.abs() <= config.max_x && p.y.abs() <= config.max_y && p.z.abs() <= config.max_z);
        }
        assert!(field.velocities.iter().all(|v| *v == Vec3::ZERO));
    }
}
