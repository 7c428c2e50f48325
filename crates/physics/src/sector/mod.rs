//! Sectors: vertically extruded polygons that make up a level.
//!
//! A sector is authored as a footprint (a simple polygon on the XZ plane),
//! one wall record per edge, and a floor/ceiling height. Calling
//! [`Sector::finalize`] derives everything else:
//!
//! - wall normals facing the interior
//! - the triangle mesh (walls, ceiling, floor)
//! - the 2D bounding box and its eight 3D corners
//! - one registered ray plane per existing wall plus floor and ceiling,
//!   clipped to the footprint
//!
//! Edits go through the pub fields or the builder methods, followed by
//! another `finalize`.

mod mesh;
mod triangulate;

pub use mesh::{SectorMesh, VertexData};
pub use triangulate::triangulate;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::handle::{PlaneId, SectorId};
use crate::math::{segment_intersection, signed_area, xz, EPSILON};
use crate::movement::WallSegment;
use crate::raycast::{PlaneOwner, RaycastPlane, RaycastRegistry};

use mesh::MeshBuilder;

/// Smallest allowed gap between floor and ceiling.
pub const MIN_SECTOR_HEIGHT: f32 = 0.01;

/// Offsets (from the bounding box minimum) tried as the outside start point
/// of the containment ray. Later entries are used when an earlier ray grazes
/// a polygon vertex.
const OUTSIDE_OFFSETS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(-1.0, -0.37),
    Vec2::new(-0.29, -1.0),
    Vec2::new(-1.0, -2.3),
];

/// Geometry validation failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("sector needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("sector has {vertices} vertices but {walls} walls")]
    WallCountMismatch { vertices: usize, walls: usize },

    #[error("sector geometry contains NaN or infinite values")]
    NonFinite,

    #[error("sector footprint has zero area")]
    ZeroArea,

    #[error("no ear found with {remaining} vertices left (self-intersecting polygon?)")]
    NoEar { remaining: usize },
}

/// Wall on the edge from vertex `i` to vertex `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    /// Whether the edge is solid. Missing walls are portals into a
    /// neighboring sector.
    pub exists: bool,
    pub texture_index: u32,
    /// Horizontal normal facing the sector interior. Derived on finalize.
    #[serde(skip)]
    pub normal: Vec3,
}

impl Wall {
    pub fn solid(texture_index: u32) -> Self {
        Self {
            exists: true,
            texture_index,
            normal: Vec3::ZERO,
        }
    }

    pub fn open() -> Self {
        Self {
            exists: false,
            texture_index: 0,
            normal: Vec3::ZERO,
        }
    }
}

/// A vertically extruded polygon.
#[derive(Debug, Clone)]
pub struct Sector {
    pub vertices: Vec<Vec2>,
    pub walls: Vec<Wall>,
    pub floor_y: f32,
    pub ceiling_y: f32,
    pub floor_texture: u32,
    pub ceiling_texture: u32,

    aabb_top_left: Vec2,
    aabb_bot_right: Vec2,
    corners: [Vec3; 8],
    mesh: SectorMesh,
    planes: Vec<PlaneId>,
    finalized: bool,
}

impl Sector {
    /// Create an empty sector spanning `floor_y..ceiling_y`.
    pub fn new(floor_y: f32, ceiling_y: f32) -> Self {
        let mut sector = Self {
            vertices: Vec::new(),
            walls: Vec::new(),
            floor_y,
            ceiling_y,
            floor_texture: 0,
            ceiling_texture: 0,
            aabb_top_left: Vec2::ZERO,
            aabb_bot_right: Vec2::ZERO,
            corners: [Vec3::ZERO; 8],
            mesh: SectorMesh::default(),
            planes: Vec::new(),
            finalized: false,
        };
        sector.set_heights(floor_y, ceiling_y);
        sector
    }

    /// Create a sector with every edge walled by texture 0.
    pub fn with_vertices(vertices: Vec<Vec2>, floor_y: f32, ceiling_y: f32) -> Self {
        let mut sector = Self::new(floor_y, ceiling_y);
        sector.walls = vec![Wall::solid(0); vertices.len()];
        sector.vertices = vertices;
        sector
    }

    /// Append a vertex and the wall leading from it to the next vertex.
    pub fn add_vertex(&mut self, vertex: Vec2, wall: Wall) -> &mut Self {
        self.vertices.push(vertex);
        self.walls.push(wall);
        self.finalized = false;
        self
    }

    /// Set floor and ceiling heights, clamping so the ceiling stays above
    /// the floor.
    pub fn set_heights(&mut self, floor_y: f32, ceiling_y: f32) -> &mut Self {
        self.floor_y = floor_y;
        self.ceiling_y = ceiling_y.max(floor_y + MIN_SECTOR_HEIGHT);
        self.finalized = false;
        self
    }

    pub fn set_textures(&mut self, floor_texture: u32, ceiling_texture: u32) -> &mut Self {
        self.floor_texture = floor_texture;
        self.ceiling_texture = ceiling_texture;
        self
    }

    /// Check the authored data without touching derived state.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices {
                count: self.vertices.len(),
            });
        }
        if self.walls.len() != self.vertices.len() {
            return Err(GeometryError::WallCountMismatch {
                vertices: self.vertices.len(),
                walls: self.walls.len(),
            });
        }
        if !self.floor_y.is_finite()
            || !self.ceiling_y.is_finite()
            || self.vertices.iter().any(|v| !v.is_finite())
        {
            return Err(GeometryError::NonFinite);
        }
        Ok(())
    }

    /// Validate and triangulate the footprint. `finalize` fails exactly
    /// when this does.
    pub fn check(&self) -> Result<Vec<[usize; 3]>, GeometryError> {
        self.validate()?;
        triangulate(&self.vertices)
    }

    /// Derive normals, mesh, bounds and ray planes from the authored data.
    ///
    /// On error the previous derived state (and its registered planes) is
    /// left untouched. On success the old planes are replaced.
    pub fn finalize(
        &mut self,
        id: SectorId,
        registry: &mut RaycastRegistry,
    ) -> Result<(), GeometryError> {
        let triangles = self.check()?;

        if self.ceiling_y < self.floor_y + MIN_SECTOR_HEIGHT {
            warn!(
                floor = self.floor_y,
                ceiling = self.ceiling_y,
                "clamping inverted sector heights"
            );
            self.ceiling_y = self.floor_y + MIN_SECTOR_HEIGHT;
        }

        // Clockwise loops get their walls flipped so normals face inward
        let clockwise = signed_area(&self.vertices) < 0.0;

        let (min, max) = self.vertices.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), v| (min.min(*v), max.max(*v)),
        );
        self.aabb_top_left = min;
        self.aabb_bot_right = max;
        self.corners = [
            Vec3::new(min.x, self.ceiling_y, min.y),
            Vec3::new(max.x, self.ceiling_y, min.y),
            Vec3::new(min.x, self.ceiling_y, max.y),
            Vec3::new(max.x, self.ceiling_y, max.y),
            Vec3::new(min.x, self.floor_y, min.y),
            Vec3::new(max.x, self.floor_y, min.y),
            Vec3::new(min.x, self.floor_y, max.y),
            Vec3::new(max.x, self.floor_y, max.y),
        ];

        let mut builder = MeshBuilder::default();
        let n = self.vertices.len();
        for i in 0..n {
            let (start, end) = (self.vertices[i], self.vertices[(i + 1) % n]);
            let wall = &mut self.walls[i];
            if start.distance_squared(end) <= EPSILON * EPSILON {
                warn!(edge = i, "skipping zero-length wall");
                wall.normal = Vec3::ZERO;
                continue;
            }
            if wall.exists {
                wall.normal = builder.push_wall(
                    start,
                    end,
                    self.floor_y,
                    self.ceiling_y,
                    wall.texture_index,
                    clockwise,
                );
            } else {
                let d = end - start;
                let normal = Vec3::new(-d.y, 0.0, d.x).normalize_or_zero();
                wall.normal = if clockwise { -normal } else { normal };
            }
        }

        for t in &triangles {
            let corners = [self.vertices[t[0]], self.vertices[t[1]], self.vertices[t[2]]];
            builder.push_flat(corners, self.ceiling_y, false, min, max, self.ceiling_texture);
        }
        for t in &triangles {
            let corners = [self.vertices[t[0]], self.vertices[t[1]], self.vertices[t[2]]];
            builder.push_flat(corners, self.floor_y, true, min, max, self.floor_texture);
        }
        self.mesh = builder.finish();

        self.release_planes(registry);
        self.register_planes(id, registry);
        self.finalized = true;

        debug!(
            ?id,
            vertices = n,
            triangles = self.mesh.triangle_count(),
            planes = self.planes.len(),
            "sector finalized"
        );
        Ok(())
    }

    /// Remove this sector's planes from the registry.
    pub fn release_planes(&mut self, registry: &mut RaycastRegistry) {
        for plane in self.planes.drain(..) {
            registry.remove(plane);
        }
    }

    fn register_planes(&mut self, id: SectorId, registry: &mut RaycastRegistry) {
        let (floor, ceiling) = (self.floor_y, self.ceiling_y);
        let n = self.vertices.len();

        for (edge, wall) in self.walls.iter().enumerate() {
            if !wall.exists || wall.normal == Vec3::ZERO {
                continue;
            }
            let (start, end) = (self.vertices[edge], self.vertices[(edge + 1) % n]);
            let quad = [
                Vec3::new(start.x, floor, start.y),
                Vec3::new(end.x, floor, end.y),
                Vec3::new(end.x, ceiling, end.y),
                Vec3::new(start.x, ceiling, start.y),
            ];
            self.planes.push(registry.add(RaycastPlane::new(
                PlaneOwner::LevelWall { sector: id, edge },
                quad,
                wall.normal,
            )));
        }

        // Floor and ceiling planes span the bounding rectangle, clipped to
        // the footprint so concave notches stay open
        let (min, max) = (self.aabb_top_left, self.aabb_bot_right);
        let rect = |y: f32| {
            [
                Vec3::new(min.x, y, min.y),
                Vec3::new(max.x, y, min.y),
                Vec3::new(max.x, y, max.y),
                Vec3::new(min.x, y, max.y),
            ]
        };
        self.planes.push(registry.add(
            RaycastPlane::new(PlaneOwner::LevelFloor { sector: id }, rect(floor), Vec3::Y)
                .with_outline(self.vertices.clone()),
        ));
        self.planes.push(registry.add(
            RaycastPlane::new(PlaneOwner::LevelCeiling { sector: id }, rect(ceiling), Vec3::NEG_Y)
                .with_outline(self.vertices.clone()),
        ));
    }

    /// Parity test: is `point` (on the XZ plane) inside the footprint?
    pub fn contains_point(&self, point: Vec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        for offset in OUTSIDE_OFFSETS {
            let start = self.aabb_top_left + offset;
            let ray = point - start;
            let mut crossings = 0;
            let mut grazed = false;

            for i in 0..n {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                if let Some((_, edge_time)) = segment_intersection(start, ray, a, b - a) {
                    crossings += 1;
                    if edge_time < 1e-4 || edge_time > 1.0 - 1e-4 {
                        grazed = true;
                    }
                }
            }

            inside = crossings % 2 == 1;
            if !grazed {
                break;
            }
        }
        inside
    }

    /// Is `position` within the bounding box grown by `padding` horizontally
    /// and inside the floor/ceiling span vertically?
    pub fn is_near(&self, position: Vec3, padding: f32) -> bool {
        let p = xz(position);
        p.x >= self.aabb_top_left.x - padding
            && p.x <= self.aabb_bot_right.x + padding
            && p.y >= self.aabb_top_left.y - padding
            && p.y <= self.aabb_bot_right.y + padding
            && position.y >= self.floor_y
            && position.y <= self.ceiling_y
    }

    /// Existing, non-degenerate walls as collision segments.
    pub fn wall_segments(&self) -> impl Iterator<Item = WallSegment> + '_ {
        let n = self.vertices.len();
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| wall.exists && wall.normal != Vec3::ZERO)
            .map(move |(i, wall)| {
                WallSegment::new(self.vertices[i], self.vertices[(i + 1) % n], wall.normal)
            })
    }

    /// The 3D corners of the bounding volume: ceiling first, then floor.
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    pub fn aabb_top_left(&self) -> Vec2 {
        self.aabb_top_left
    }

    pub fn aabb_bot_right(&self) -> Vec2 {
        self.aabb_bot_right
    }

    pub fn mesh(&self) -> &SectorMesh {
        &self.mesh
    }

    pub fn planes(&self) -> &[PlaneId] {
        &self.planes
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ]
    }

    fn finalized(vertices: Vec<Vec2>, registry: &mut RaycastRegistry) -> Sector {
        let mut sector = Sector::with_vertices(vertices, 0.0, 3.0);
        sector.finalize(SectorId::default(), registry).unwrap();
        sector
    }

    #[test]
    fn test_finalize_square() {
        let mut registry = RaycastRegistry::new();
        let sector = finalized(square(4.0), &mut registry);

        assert!(sector.is_finalized());
        assert_eq!(sector.aabb_top_left(), Vec2::ZERO);
        assert_eq!(sector.aabb_bot_right(), Vec2::splat(4.0));
        // 4 walls + floor + ceiling
        assert_eq!(registry.len(), 6);
        assert_eq!(sector.planes().len(), 6);
        // 4 walls * 2 + 2 ceiling + 2 floor
        assert_eq!(sector.mesh().triangle_count(), 12);

        // Corners: ceiling first, then floor
        assert!(sector.corners()[..4].iter().all(|c| c.y == 3.0));
        assert!(sector.corners()[4..].iter().all(|c| c.y == 0.0));
    }

    #[test]
    fn test_wall_normals_face_interior_for_both_windings() {
        let mut registry = RaycastRegistry::new();
        let mut vertices = square(4.0);
        for _ in 0..2 {
            let sector = finalized(vertices.clone(), &mut registry);
            let center = Vec2::splat(2.0);
            let n = sector.vertices.len();
            for (i, wall) in sector.walls.iter().enumerate() {
                let mid = (sector.vertices[i] + sector.vertices[(i + 1) % n]) * 0.5;
                let to_center = center - mid;
                assert!(to_center.dot(Vec2::new(wall.normal.x, wall.normal.z)) > 0.0);
            }
            vertices.reverse();
        }
    }

    #[test]
    fn test_refinalize_replaces_planes() {
        let mut registry = RaycastRegistry::new();
        let mut sector = finalized(square(4.0), &mut registry);
        let old = sector.planes().to_vec();

        sector.walls[0].exists = false;
        sector.finalize(SectorId::default(), &mut registry).unwrap();

        assert_eq!(registry.len(), 5);
        assert!(old.iter().all(|id| registry.get(*id).is_none()));
    }

    #[test]
    fn test_failed_finalize_keeps_previous_state() {
        let mut registry = RaycastRegistry::new();
        let mut sector = finalized(square(4.0), &mut registry);
        let planes = sector.planes().to_vec();

        sector.walls.pop();
        let err = sector.finalize(SectorId::default(), &mut registry).unwrap_err();
        assert_eq!(err, GeometryError::WallCountMismatch { vertices: 4, walls: 3 });

        assert_eq!(sector.planes(), planes.as_slice());
        assert_eq!(registry.len(), 6);
        assert_eq!(sector.mesh().triangle_count(), 12);
    }

    #[test]
    fn test_builder_with_open_edge() {
        let mut registry = RaycastRegistry::new();
        let mut sector = Sector::new(0.0, 2.5);
        sector
            .add_vertex(Vec2::new(0.0, 0.0), Wall::solid(1))
            .add_vertex(Vec2::new(4.0, 0.0), Wall::open())
            .add_vertex(Vec2::new(2.0, 3.0), Wall::solid(2))
            .set_textures(3, 4);
        assert!(!sector.is_finalized());

        sector.finalize(SectorId::default(), &mut registry).unwrap();
        // 2 walls + floor + ceiling
        assert_eq!(registry.len(), 4);
        assert_eq!(sector.wall_segments().count(), 2);
        assert!(sector.contains_point(Vec2::new(2.0, 1.0)));

        sector.add_vertex(Vec2::new(1.0, 2.0), Wall::solid(0));
        assert!(!sector.is_finalized());
    }

    #[test]
    fn test_set_heights_clamps() {
        let mut sector = Sector::new(0.0, 3.0);
        sector.set_heights(2.0, 1.0);
        assert!(sector.ceiling_y > sector.floor_y);
    }

    #[test]
    fn test_contains_point() {
        let mut registry = RaycastRegistry::new();
        let sector = finalized(square(4.0), &mut registry);

        assert!(sector.contains_point(Vec2::new(2.0, 1.5)));
        // Diagonal through a vertex from the default start point
        assert!(sector.contains_point(Vec2::new(2.0, 2.0)));
        assert!(!sector.contains_point(Vec2::new(5.0, 2.0)));
        assert!(!sector.contains_point(Vec2::new(-0.5, -0.5)));

        let l_shape = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(6.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 6.0),
            Vec2::new(0.0, 6.0),
        ];
        let sector = finalized(l_shape, &mut registry);
        assert!(sector.contains_point(Vec2::new(1.0, 5.0)));
        assert!(!sector.contains_point(Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn test_is_near() {
        let mut registry = RaycastRegistry::new();
        let sector = finalized(square(4.0), &mut registry);
        assert!(sector.is_near(Vec3::new(4.5, 1.0, 2.0), 1.0));
        assert!(!sector.is_near(Vec3::new(5.5, 1.0, 2.0), 1.0));
        assert!(!sector.is_near(Vec3::new(2.0, 3.5, 2.0), 1.0));
    }

    #[test]
    fn test_open_walls_have_no_segments() {
        let mut registry = RaycastRegistry::new();
        let mut sector = Sector::with_vertices(square(4.0), 0.0, 3.0);
        sector.walls[1] = Wall::open();
        sector.finalize(SectorId::default(), &mut registry).unwrap();
        assert_eq!(sector.wall_segments().count(), 3);
        assert_eq!(sector.mesh().walls().len(), 18);
    }
}
