//! Overlap resolution: touching bodies separate and stay separated

use ballpit_core::tests::test_helpers::pair_overlap;
use ballpit_core::{BodyInit, Bounds, ParticleField, PhysicalConstants};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

fn weightless() -> PhysicalConstants {
    PhysicalConstants {
        gravity: 0.0,
        friction: 0.9975,
        wall_bounce: 0.95,
        max_velocity: 0.15,
    }
}

fn roomy() -> Bounds {
    Bounds::new(50.0, 50.0, 50.0)
}

#[test]
fn test_overlapping_pair_converges_to_separation() {
    let bodies = [
        BodyInit::at_rest(Vec3::new(-0.4, 0.0, 0.0), 1.0),
        BodyInit::at_rest(Vec3::new(0.4, 0.0, 0.0), 1.0),
    ];
    let mut field = ParticleField::from_bodies(&bodies, roomy(), weightless()).unwrap();

    let mut previous = pair_overlap(&field, 0, 1);
    assert!((previous - 1.2).abs() < 1e-5);

    let mut separated = false;
    for _ in 0..100 {
        field.update(DT);
        let overlap = pair_overlap(&field, 0, 1);
        assert!(
            overlap <= previous + 1e-6,
            "overlap grew from {} to {}",
            previous,
            overlap
        );
        previous = overlap;
        if overlap <= 1e-5 {
            separated = true;
            break;
        }
    }
    assert!(separated, "pair still overlapping by {}", previous);
}

#[test]
fn test_unequal_pair_separates_along_center_line() {
    let bodies = [
        BodyInit::at_rest(Vec3::new(0.0, 0.0, 0.0), 1.0),
        BodyInit::at_rest(Vec3::new(0.3, 0.4, 0.0), 0.5),
    ];
    let mut field = ParticleField::from_bodies(&bodies, roomy(), weightless()).unwrap();
    field.update(DT);

    assert!(pair_overlap(&field, 0, 1) <= 1e-5);
    // Both moved symmetrically along the initial axis
    let p = field.positions();
    let axis = (p[1] - p[0]).normalize();
    assert!((axis - Vec3::new(0.6, 0.8, 0.0)).length() < 1e-4);
}

#[test]
fn test_coincident_bodies_separate() {
    let bodies = [
        BodyInit::at_rest(Vec3::ZERO, 0.5),
        BodyInit::at_rest(Vec3::ZERO, 0.5),
    ];
    let mut field = ParticleField::from_bodies(&bodies, roomy(), weightless()).unwrap();
    field.update(DT);

    let p = field.positions();
    assert!(p.iter().all(|v| v.is_finite()));
    assert!(pair_overlap(&field, 0, 1) <= 1e-5);
}

#[test]
fn test_distant_bodies_do_not_interact() {
    let bodies = [
        BodyInit::at_rest(Vec3::new(-3.0, 0.0, 0.0), 1.0),
        BodyInit::at_rest(Vec3::new(3.0, 0.0, 0.0), 1.0),
    ];
    let mut field = ParticleField::from_bodies(&bodies, roomy(), weightless()).unwrap();
    for _ in 0..10 {
        field.update(DT);
    }
    assert_eq!(field.positions()[0], Vec3::new(-3.0, 0.0, 0.0));
    assert_eq!(field.positions()[1], Vec3::new(3.0, 0.0, 0.0));
}
