//! First-person camera matrices.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// First-person camera state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstPersonCamera {
    /// Eye position in world space.
    pub position: Vec3,

    /// Yaw in radians, measured from +X toward +Z.
    pub yaw: f32,

    /// Pitch in radians; positive looks down.
    pub pitch: f32,

    /// Vertical field of view in degrees.
    pub fov: f32,

    pub near: f32,
    pub far: f32,

    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl FirstPersonCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        forward_from_angles(self.yaw, self.pitch)
    }

    /// Horizontal right vector.
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// OpenGL clip convention (`-w <= z <= w`).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// View direction for yaw/pitch angles.
pub fn forward_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec3::new(cos_pitch * cos_yaw, -sin_pitch, cos_pitch * sin_yaw)
}
