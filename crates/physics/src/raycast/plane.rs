use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::handle::{EntityId, SectorId};
use crate::math::{point_in_polygon, xz, EPSILON};
use crate::movement::WallSegment;

/// Tolerance for the quad bound test, relative to edge length squared.
const BOUND_EPSILON: f32 = 1e-4;

/// What a ray plane belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneOwner {
    LevelWall { sector: SectorId, edge: usize },
    LevelFloor { sector: SectorId },
    LevelCeiling { sector: SectorId },
    EnemyHurtbox { entity: EntityId },
}

impl PlaneOwner {
    pub fn is_level(&self) -> bool {
        !self.is_enemy()
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self, PlaneOwner::EnemyHurtbox { .. })
    }

    pub fn sector(&self) -> Option<SectorId> {
        match *self {
            PlaneOwner::LevelWall { sector, .. }
            | PlaneOwner::LevelFloor { sector }
            | PlaneOwner::LevelCeiling { sector } => Some(sector),
            PlaneOwner::EnemyHurtbox { .. } => None,
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            PlaneOwner::EnemyHurtbox { entity } => Some(entity),
            _ => None,
        }
    }
}

/// A bounded quadrilateral that rays can hit.
///
/// Horizontal planes may also carry an XZ `outline`; a hit must then land
/// inside that polygon as well as inside the quad.
#[derive(Debug, Clone, PartialEq)]
pub struct RaycastPlane {
    pub owner: PlaneOwner,
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
    pub normal: Vec3,
    pub outline: Vec<Vec2>,
    /// Disabled planes are skipped by every query.
    pub enabled: bool,
    /// Registration order, used to break distance ties.
    pub(super) seq: u64,
}

impl RaycastPlane {
    /// Build a plane from corners `[a, b, c, d]` in loop order.
    pub fn new(owner: PlaneOwner, quad: [Vec3; 4], normal: Vec3) -> Self {
        let [a, b, c, d] = quad;
        Self {
            owner,
            a,
            b,
            c,
            d,
            normal: normal.normalize_or_zero(),
            outline: Vec::new(),
            enabled: true,
            seq: 0,
        }
    }

    /// Restrict hits to the XZ polygon `outline`.
    pub fn with_outline(mut self, outline: Vec<Vec2>) -> Self {
        self.outline = outline;
        self
    }

    pub fn set_quad(&mut self, quad: [Vec3; 4], normal: Vec3) {
        let [a, b, c, d] = quad;
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.normal = normal.normalize_or_zero();
    }

    /// A plane with a zero normal or collapsed edge axes can never be hit.
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
            || (self.b - self.a).length_squared() <= EPSILON * EPSILON
            || (self.d - self.a).length_squared() <= EPSILON * EPSILON
    }

    /// Distance along a unit `direction` at which the ray meets the
    /// unbounded plane, or `None` for parallel or backward hits.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let denom = self.normal.dot(direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = (self.a - origin).dot(self.normal) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Does a point on the plane fall inside the quad's `a→b` / `a→d`
    /// parallelogram, and inside the outline if there is one?
    pub fn contains(&self, point: Vec3) -> bool {
        within_axis(self.a, self.b, point)
            && within_axis(self.a, self.d, point)
            && (self.outline.len() < 3 || point_in_polygon(xz(point), &self.outline))
    }

    /// The horizontal footprint `a→b` as a wall, when `y` is within the
    /// plane's vertical span `a.y..=d.y`.
    pub fn footprint_at(&self, y: f32) -> Option<WallSegment> {
        let (low, high) = if self.a.y <= self.d.y {
            (self.a.y, self.d.y)
        } else {
            (self.d.y, self.a.y)
        };
        if !self.enabled || y < low || y > high {
            return None;
        }
        let segment = WallSegment::new(
            Vec2::new(self.a.x, self.a.z),
            Vec2::new(self.b.x, self.b.z),
            self.normal,
        );
        (!segment.is_degenerate()).then_some(segment)
    }
}

/// `start·axis <= point·axis <= end·axis` with a small relative tolerance.
fn within_axis(start: Vec3, end: Vec3, point: Vec3) -> bool {
    let axis = end - start;
    let slack = BOUND_EPSILON * axis.length_squared();
    let p = point.dot(axis);
    p >= start.dot(axis) - slack && p <= end.dot(axis) + slack
}
