use glam::Vec3;
use slotmap::SlotMap;
use tracing::trace;

use crate::handle::PlaneId;
use crate::math::EPSILON;

use super::plane::{PlaneOwner, RaycastPlane};

/// Nearest plane hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub plane: PlaneId,
    pub owner: PlaneOwner,
    /// World-space impact point.
    pub point: Vec3,
    /// Normal of the plane that was hit.
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// Registry of every ray-hittable plane.
///
/// Planes are addressed by generational [`PlaneId`]s, so removing a plane
/// while other code still holds its id is safe: the stale id simply stops
/// resolving.
#[derive(Debug, Default)]
pub struct RaycastRegistry {
    planes: SlotMap<PlaneId, RaycastPlane>,
    next_seq: u64,
}

impl RaycastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plane and return its handle.
    pub fn add(&mut self, mut plane: RaycastPlane) -> PlaneId {
        plane.seq = self.next_seq;
        self.next_seq += 1;
        self.planes.insert(plane)
    }

    /// Move an existing plane. Returns `false` if the id is stale.
    pub fn update(&mut self, id: PlaneId, quad: [Vec3; 4], normal: Vec3) -> bool {
        match self.planes.get_mut(id) {
            Some(plane) => {
                plane.set_quad(quad, normal);
                true
            }
            None => false,
        }
    }

    pub fn set_enabled(&mut self, id: PlaneId, enabled: bool) -> bool {
        match self.planes.get_mut(id) {
            Some(plane) => {
                plane.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: PlaneId) -> Option<RaycastPlane> {
        self.planes.remove(id)
    }

    pub fn get(&self, id: PlaneId) -> Option<&RaycastPlane> {
        self.planes.get(id)
    }

    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// Keep only the planes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&RaycastPlane) -> bool) {
        self.planes.retain(|_, plane| keep(plane));
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaneId, &RaycastPlane)> {
        self.planes.iter()
    }

    /// Cast a ray and return the nearest accepted plane within `range`.
    ///
    /// Candidates are ordered by distance; ties go to the plane registered
    /// first. The first candidate whose impact point lies within its quad
    /// bounds wins. A zero `direction` never hits.
    pub fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        range: f32,
        filter: impl Fn(&RaycastPlane) -> bool,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction.length_squared() < EPSILON {
            return None;
        }

        let mut candidates: Vec<(f32, u64, PlaneId)> = self
            .planes
            .iter()
            .filter(|&(_, plane)| plane.enabled && !plane.is_degenerate() && filter(plane))
            .filter_map(|(id, plane)| {
                let t = plane.intersect(origin, direction)?;
                (t <= range).then_some((t, plane.seq, id))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        candidates.into_iter().find_map(|(distance, _, id)| {
            let plane = &self.planes[id];
            let point = origin + direction * distance;
            if !plane.contains(point) {
                return None;
            }
            trace!(?id, owner = ?plane.owner, distance, "ray hit");
            Some(RaycastHit {
                plane: id,
                owner: plane.owner,
                point,
                normal: plane.normal,
                distance,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{EntityId, SectorId};
    use crate::raycast::{everything, level_only};

    fn quad_at_z(z: f32, half: f32) -> [Vec3; 4] {
        [
            Vec3::new(-half, -half, z),
            Vec3::new(half, -half, z),
            Vec3::new(half, half, z),
            Vec3::new(-half, half, z),
        ]
    }

    fn wall(z: f32) -> RaycastPlane {
        RaycastPlane::new(
            PlaneOwner::LevelWall {
                sector: SectorId::default(),
                edge: 0,
            },
            quad_at_z(z, 1.0),
            Vec3::Z,
        )
    }

    fn hurtbox(z: f32) -> RaycastPlane {
        RaycastPlane::new(
            PlaneOwner::EnemyHurtbox {
                entity: EntityId::default(),
            },
            quad_at_z(z, 0.5),
            Vec3::Z,
        )
    }

    #[test]
    fn test_nearest_of_stacked_planes() {
        let mut registry = RaycastRegistry::new();
        let far = registry.add(wall(-5.0));
        let near = registry.add(wall(-2.0));

        let hit = registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, everything).unwrap();
        assert_eq!(hit.plane, near);
        assert!((hit.point.z + 2.0).abs() < 1e-5);
        assert!((hit.distance - 2.0).abs() < 1e-5);

        registry.remove(near);
        let hit = registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, everything).unwrap();
        assert_eq!(hit.plane, far);
    }

    #[test]
    fn test_out_of_bounds_falls_through() {
        let mut registry = RaycastRegistry::new();
        registry.add(wall(-5.0));
        let small = registry.add(hurtbox(-2.0));

        // Passes beside the small quad and hits the wall behind it
        let origin = Vec3::new(0.8, 0.0, 0.0);
        let hit = registry.cast(origin, Vec3::NEG_Z, 100.0, everything).unwrap();
        assert_ne!(hit.plane, small);
        assert!((hit.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_range_filter_and_zero_direction() {
        let mut registry = RaycastRegistry::new();
        registry.add(hurtbox(-2.0));
        registry.add(wall(-5.0));

        assert!(registry.cast(Vec3::ZERO, Vec3::NEG_Z, 1.0, everything).is_none());
        assert!(registry.cast(Vec3::ZERO, Vec3::ZERO, 100.0, everything).is_none());

        let hit = registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, level_only).unwrap();
        assert!(hit.owner.is_level());
    }

    #[test]
    fn test_tie_goes_to_first_registered() {
        let mut registry = RaycastRegistry::new();
        let first = registry.add(wall(-3.0));
        registry.add(hurtbox(-3.0));
        let hit = registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, everything).unwrap();
        assert_eq!(hit.plane, first);
    }

    #[test]
    fn test_update_and_disable() {
        let mut registry = RaycastRegistry::new();
        let id = registry.add(hurtbox(-2.0));

        assert!(registry.update(id, quad_at_z(-4.0, 0.5), Vec3::Z));
        let hit = registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, everything).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);

        registry.set_enabled(id, false);
        assert!(registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, everything).is_none());

        registry.remove(id);
        assert!(!registry.update(id, quad_at_z(-1.0, 0.5), Vec3::Z));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_invalidates_ids() {
        let mut registry = RaycastRegistry::new();
        let ids = [registry.add(wall(-2.0)), registry.add(hurtbox(-1.0))];

        registry.clear();
        assert!(registry.is_empty());
        assert!(ids.iter().all(|id| registry.get(*id).is_none()));
        assert!(registry.cast(Vec3::ZERO, Vec3::NEG_Z, 100.0, everything).is_none());

        // New planes never resolve through old handles
        let fresh = registry.add(wall(-2.0));
        assert!(!ids.contains(&fresh));
    }
}
