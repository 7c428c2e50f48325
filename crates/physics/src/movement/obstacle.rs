use glam::{Vec2, Vec3};

use crate::math::{segment_distance, EPSILON};

/// A vertical wall reduced to its footprint on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub a: Vec2,
    pub b: Vec2,
    /// Horizontal wall normal. Only its line matters: the side facing the
    /// entity is picked per query.
    pub normal: Vec3,
}

/// A wall the entity is about to touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    /// Unit normal on the entity's side of the wall (`y == 0`).
    pub normal: Vec3,
    /// Distance from the entity center to the wall's infinite line.
    pub distance: f32,
}

impl WallSegment {
    pub fn new(a: Vec2, b: Vec2, normal: Vec3) -> Self {
        Self { a, b, normal }
    }

    pub fn is_degenerate(&self) -> bool {
        self.a.distance_squared(self.b) <= EPSILON * EPSILON
    }

    /// Sweep a circle of `radius` from `origin` by `motion`.
    ///
    /// Reports a contact when the swept path passes closer than `radius` to
    /// the segment while moving toward it.
    pub fn sweep(&self, origin: Vec2, motion: Vec2, radius: f32) -> Option<WallContact> {
        if self.is_degenerate() {
            return None;
        }

        let mut normal = Vec2::new(self.normal.x, self.normal.z).normalize_or_zero();
        if normal == Vec2::ZERO {
            normal = (self.b - self.a).perp().normalize();
        }

        let side = (origin - self.a).dot(normal);
        if side < 0.0 {
            normal = -normal;
        }
        if motion.dot(normal) >= 0.0 {
            return None;
        }

        if segment_distance(origin, origin + motion, self.a, self.b) >= radius {
            return None;
        }

        Some(WallContact {
            normal: Vec3::new(normal.x, 0.0, normal.y),
            distance: side.abs(),
        })
    }
}
