use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned containment box, stored as half-extents around the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
}

impl Bounds {
    pub fn new(max_x: f32, max_y: f32, max_z: f32) -> Self {
        Self { max_x, max_y, max_z }
    }

    /// Derive extents from a viewport: the visible height at the simulation
    /// plane and the viewport aspect (width / height). Depth is passed through.
    pub fn from_view(view_height: f32, aspect: f32, max_z: f32) -> Self {
        let max_y = view_height / 2.0;
        Self {
            max_x: max_y * aspect,
            max_y,
            max_z,
        }
    }

    /// Smallest half-extent; no body wider than this fits the box
    pub fn min_extent(&self) -> f32 {
        self.max_x.min(self.max_y).min(self.max_z)
    }

    pub fn is_valid(&self) -> bool {
        [self.max_x, self.max_y, self.max_z]
            .iter()
            .all(|e| e.is_finite() && *e > 0.0)
    }

    /// Clamp a sphere back inside the box, reflecting the offending velocity
    /// component scaled by `wall_bounce`.
    ///
    /// With `open_top` set only the floor (`-max_y`) reflects on the Y axis,
    /// so bodies may rise past the ceiling.
    ///
    /// A sphere at least as wide as an extent cannot fit on that axis; it is
    /// pinned to the center line instead of being mirrored to the far wall.
    pub fn contain(
        &self,
        position: &mut Vec3,
        velocity: &mut Vec3,
        radius: f32,
        wall_bounce: f32,
        open_top: bool,
    ) {
        reflect_symmetric(&mut position.x, &mut velocity.x, radius, self.max_x, wall_bounce);

        if open_top {
            if position.y - radius < -self.max_y {
                position.y = -self.max_y + radius;
                velocity.y = -velocity.y * wall_bounce;
            }
        } else {
            reflect_symmetric(&mut position.y, &mut velocity.y, radius, self.max_y, wall_bounce);
        }

        reflect_symmetric(&mut position.z, &mut velocity.z, radius, self.max_z, wall_bounce);
    }
}

fn reflect_symmetric(pos: &mut f32, vel: &mut f32, radius: f32, extent: f32, wall_bounce: f32) {
    if pos.abs() + radius > extent {
        *pos = if radius >= extent {
            0.0
        } else {
            pos.signum() * (extent - radius)
        };
        *vel = -*vel * wall_bounce;
    }
}
