//! Rendering hand-off.
//!
//! The scene does not draw anything itself. [`Scene::render`](crate::Scene::render)
//! culls sectors against the view frustum and passes the survivors, enemy
//! sprites and decals to a [`RenderSink`] supplied by the host.

use glam::{Mat4, Vec3};
use zerog_physics::math::{normalize_angle_diff, yaw_of};
use zerog_physics::{EntityId, Sector, SectorId};

use crate::decal::Decal;

/// Per-frame view and HUD state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub position: Vec3,
    pub forward: Vec3,
    pub view_projection: Mat4,
    pub flashlight_on: bool,
    pub flashlight_direction: Vec3,
    pub weapon_frame: u32,
    pub health: i32,
    pub clip_ammo: u32,
    pub reserve_ammo: u32,
}

/// An enemy billboard ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySprite {
    pub id: EntityId,
    pub position: Vec3,
    /// Animation frame.
    pub frame: u32,
    /// Which of the five directional sprite columns to use (0 = front,
    /// 4 = back).
    pub angle_column: u32,
    /// Mirror the sprite horizontally (enemy seen from its left side).
    pub flip: bool,
}

/// Receives the visible scene each frame.
pub trait RenderSink {
    fn begin_frame(&mut self, _view: &ViewState) {}

    fn draw_sector(&mut self, id: SectorId, sector: &Sector);

    fn draw_enemy(&mut self, sprite: &EnemySprite);

    fn draw_decal(&mut self, decal: &Decal);

    fn end_frame(&mut self) {}
}

/// Pick a directional sprite column for an enemy facing `enemy_forward`,
/// seen from `viewer`.
pub fn sprite_angle(enemy_position: Vec3, enemy_forward: Vec3, viewer: Vec3) -> (u32, bool) {
    let to_viewer = viewer - enemy_position;
    let relative = normalize_angle_diff(yaw_of(to_viewer) - yaw_of(enemy_forward));
    let column = ((relative.abs() / std::f32::consts::PI) * 4.0).round() as u32;
    let column = column.min(4);
    (column, relative < 0.0 && column > 0 && column < 4)
}
