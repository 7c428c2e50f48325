//! Render vertex layout and sector mesh construction.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// A textured vertex of a sector surface.
///
/// Laid out for direct upload to a GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexData {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub texture_index: u32,
}

impl VertexData {
    /// Byte stride of one vertex.
    pub const STRIDE: usize = std::mem::size_of::<VertexData>();

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2, texture_index: u32) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
            texture_index,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Triangle list for one sector: walls, then ceiling, then floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorMesh {
    vertices: Vec<VertexData>,
    wall_vertex_count: usize,
    ceiling_vertex_count: usize,
}

impl SectorMesh {
    pub fn vertices(&self) -> &[VertexData] {
        &self.vertices
    }

    /// Raw bytes for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn walls(&self) -> &[VertexData] {
        &self.vertices[..self.wall_vertex_count]
    }

    pub fn ceiling(&self) -> &[VertexData] {
        let start = self.wall_vertex_count;
        &self.vertices[start..start + self.ceiling_vertex_count]
    }

    pub fn floor(&self) -> &[VertexData] {
        &self.vertices[self.wall_vertex_count + self.ceiling_vertex_count..]
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Incremental builder used by sector finalization.
#[derive(Debug, Default)]
pub(super) struct MeshBuilder {
    mesh: SectorMesh,
}

impl MeshBuilder {
    /// Emit the two triangles of a wall quad.
    ///
    /// `start`/`end` are the footprint endpoints. `flip` reverses the winding
    /// so the face normal points at the sector interior of a clockwise loop.
    /// Returns the face normal.
    pub fn push_wall(
        &mut self,
        start: Vec2,
        end: Vec2,
        floor_y: f32,
        ceiling_y: f32,
        texture_index: u32,
        flip: bool,
    ) -> Vec3 {
        let top_left = Vec3::new(start.x, ceiling_y, start.y);
        let top_right = Vec3::new(end.x, ceiling_y, end.y);
        let bot_left = Vec3::new(start.x, floor_y, start.y);
        let bot_right = Vec3::new(end.x, floor_y, end.y);

        // UVs span the wall in world units so textures tile at a fixed scale
        let width = start.distance(end);
        let height = (ceiling_y - floor_y).abs();
        let uv_tl = Vec2::new(0.0, 0.0);
        let uv_tr = Vec2::new(width, 0.0);
        let uv_bl = Vec2::new(0.0, height);
        let uv_br = Vec2::new(width, height);

        let mut faces = [
            [(top_left, uv_tl), (top_right, uv_tr), (bot_left, uv_bl)],
            [(top_right, uv_tr), (bot_right, uv_br), (bot_left, uv_bl)],
        ];
        if flip {
            for face in &mut faces {
                face.swap(1, 2);
            }
        }

        let normal = face_normal(faces[0][0].0, faces[0][1].0, faces[0][2].0);
        for face in faces {
            for (position, uv) in face {
                self.mesh
                    .vertices
                    .push(VertexData::new(position, normal, uv, texture_index));
            }
        }
        self.mesh.wall_vertex_count += 6;
        normal
    }

    /// Emit one horizontal triangle at height `y`, wound to face up (floor)
    /// or down (ceiling). Ceiling triangles must all be pushed before floors.
    pub fn push_flat(
        &mut self,
        corners: [Vec2; 3],
        y: f32,
        facing_up: bool,
        aabb_min: Vec2,
        aabb_max: Vec2,
        texture_index: u32,
    ) {
        let mut positions = corners.map(|c| Vec3::new(c.x, y, c.y));
        let wound_up = face_normal(positions[0], positions[1], positions[2]).y > 0.0;
        if wound_up != facing_up {
            positions.swap(1, 2);
        }
        let normal = if facing_up { Vec3::Y } else { Vec3::NEG_Y };

        for p in positions {
            let uv = Vec2::new(p.x - aabb_min.x, (p.z - aabb_max.y).abs());
            self.mesh
                .vertices
                .push(VertexData::new(p, normal, uv, texture_index));
        }
        if !facing_up {
            self.mesh.ceiling_vertex_count += 3;
        }
    }

    pub fn finish(self) -> SectorMesh {
        self.mesh
    }
}

/// `normalize(cross(v2 - v0, v1 - v0))`: the front face of a quad wound
/// top-left, top-right, bottom-left.
fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v2 - v0).cross(v1 - v0).normalize_or_zero()
}
