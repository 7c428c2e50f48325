//! Vision checks for enemies.
//!
//! Sight is a horizontal cone around the enemy's facing, limited by range,
//! plus a line-of-sight ray against level geometry. Enemy hurtboxes never
//! block sight.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use zerog_physics::math::{normalize_angle_diff, EPSILON};
use zerog_physics::raycast::level_only;
use zerog_physics::RaycastRegistry;

/// Vision cone configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionCone {
    /// How far the enemy can see.
    pub distance: f32,
    /// Half-angle of the cone in radians.
    pub half_angle: f32,
}

impl Default for VisionCone {
    fn default() -> Self {
        Self {
            distance: 20.0,
            half_angle: 1.05, // ~60 degrees
        }
    }
}

/// Result of a vision check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisionResult {
    NotVisible,
    Seen { distance: f32 },
}

impl VisionResult {
    pub fn is_visible(&self) -> bool {
        matches!(self, VisionResult::Seen { .. })
    }
}

/// Is `target` inside the cone of an observer at `origin` facing `yaw`?
///
/// Only range and angle are checked here; see [`check_vision`] for the
/// occlusion test.
pub fn in_cone(origin: Vec3, yaw: f32, target: Vec3, vision: &VisionCone) -> bool {
    let to_target = target - origin;
    let distance = to_target.length();
    if distance > vision.distance {
        return false;
    }

    let flat = Vec2::new(to_target.x, to_target.z);
    if flat.length_squared() < EPSILON {
        // Directly above or below
        return true;
    }

    let angle_diff = normalize_angle_diff(flat.y.atan2(flat.x) - yaw).abs();
    angle_diff <= vision.half_angle
}

/// Is the straight path from `from` to `to` free of level geometry?
pub fn has_line_of_sight(registry: &RaycastRegistry, from: Vec3, to: Vec3) -> bool {
    let path = to - from;
    let distance = path.length();
    if distance < EPSILON {
        return true;
    }
    match registry.cast(from, path, distance, level_only) {
        Some(hit) => hit.distance >= distance,
        None => true,
    }
}

/// Cone test followed by a line-of-sight ray.
pub fn check_vision(
    registry: &RaycastRegistry,
    origin: Vec3,
    yaw: f32,
    target: Vec3,
    vision: &VisionCone,
) -> VisionResult {
    if !in_cone(origin, yaw, target, vision) || !has_line_of_sight(registry, origin, target) {
        return VisionResult::NotVisible;
    }
    VisionResult::Seen {
        distance: origin.distance(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerog_physics::{PlaneOwner, RaycastPlane, SectorId};

    #[test]
    fn test_cone() {
        let vision = VisionCone::default();
        let origin = Vec3::ZERO;

        // Straight ahead along +X
        assert!(in_cone(origin, 0.0, Vec3::new(10.0, 0.0, 0.0), &vision));
        // Behind
        assert!(!in_cone(origin, 0.0, Vec3::new(-10.0, 0.0, 0.0), &vision));
        // Too far
        assert!(!in_cone(origin, 0.0, Vec3::new(30.0, 0.0, 0.0), &vision));
    }

    #[test]
    fn test_wall_blocks_sight() {
        let mut registry = RaycastRegistry::new();
        let vision = VisionCone::default();
        let target = Vec3::new(10.0, 0.0, 0.0);

        assert!(check_vision(&registry, Vec3::ZERO, 0.0, target, &vision).is_visible());

        registry.add(RaycastPlane::new(
            PlaneOwner::LevelWall {
                sector: SectorId::default(),
                edge: 0,
            },
            [
                Vec3::new(5.0, -2.0, -2.0),
                Vec3::new(5.0, -2.0, 2.0),
                Vec3::new(5.0, 2.0, 2.0),
                Vec3::new(5.0, 2.0, -2.0),
            ],
            Vec3::NEG_X,
        ));
        assert_eq!(
            check_vision(&registry, Vec3::ZERO, 0.0, target, &vision),
            VisionResult::NotVisible
        );
        // A wall beyond the target does not block
        assert!(has_line_of_sight(&registry, Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)));
    }
}
