//! View frustum extraction and sector culling.

use glam::{Mat4, Vec3, Vec4};

use crate::sector::Sector;

/// Six clip planes `(nx, ny, nz, d)` with normals pointing into the volume.
///
/// Order: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes from a combined `projection * view` matrix built
    /// with an OpenGL-style clip volume (`-w <= z <= w`).
    pub fn from_view_projection(view_projection: Mat4) -> Self {
        let rows = [
            view_projection.row(0),
            view_projection.row(1),
            view_projection.row(2),
            view_projection.row(3),
        ];
        Self {
            planes: [
                rows[3] + rows[0],
                rows[3] - rows[0],
                rows[3] + rows[1],
                rows[3] - rows[1],
                rows[3] + rows[2],
                rows[3] - rows[2],
            ],
        }
    }

    /// Same as [`from_view_projection`](Self::from_view_projection) for
    /// callers holding the transposed matrix (rows stored as columns).
    pub fn from_transposed(view_projection_transpose: Mat4) -> Self {
        Self::from_view_projection(view_projection_transpose.transpose())
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Conservative box test: `false` only when every corner lies behind
    /// the same plane.
    pub fn contains_corners(&self, corners: &[Vec3]) -> bool {
        !self.planes.iter().any(|plane| {
            corners
                .iter()
                .all(|corner| plane.dot(corner.extend(1.0)) < 0.0)
        })
    }

    /// Can any part of `sector` be visible?
    pub fn is_inside(&self, sector: &Sector) -> bool {
        self.contains_corners(sector.corners())
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        let p = point.extend(1.0);
        self.planes.iter().all(|plane| plane.dot(p) >= 0.0)
    }
}
