//! Levels: authored data and the runtime sector set built from it.

mod data;
mod test_level;

pub use data::{LevelData, SectorData, SpawnPoint, SpawnType, WallData};
pub use test_level::{generate_minimal_test, generate_test_level};

use slotmap::SlotMap;
use thiserror::Error;
use tracing::{debug, info};
use zerog_physics::{GeometryError, RaycastRegistry, Sector, SectorId};

/// Errors from building, editing or (de)serializing a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("sector {index}: {source}")]
    Sector {
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error("unknown sector {0:?}")]
    UnknownSector(SectorId),

    #[error("level has no player spawn")]
    NoPlayerSpawn,

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime level: finalized sectors addressed by [`SectorId`].
#[derive(Debug, Default)]
pub struct Level {
    pub name: String,
    sectors: SlotMap<SectorId, Sector>,
    pub spawns: Vec<SpawnPoint>,
}

impl Level {
    /// Build and finalize every sector, registering their ray planes.
    ///
    /// Fails on the first invalid sector; planes registered by the sectors
    /// before it are removed again.
    pub fn from_data(data: &LevelData, registry: &mut RaycastRegistry) -> Result<Self, LevelError> {
        let mut level = Level {
            name: data.name.clone(),
            sectors: SlotMap::with_capacity_and_key(data.sectors.len()),
            spawns: data.spawns.clone(),
        };

        for (index, sector_data) in data.sectors.iter().enumerate() {
            let id = level.sectors.insert(sector_data.to_sector());
            if let Err(source) = level.sectors[id].finalize(id, registry) {
                level.release(registry);
                return Err(LevelError::Sector { index, source });
            }
        }

        info!(name = %level.name, sectors = level.sectors.len(), "level loaded");
        Ok(level)
    }

    /// Snapshot the current geometry back into serializable form.
    pub fn to_data(&self) -> LevelData {
        LevelData {
            name: self.name.clone(),
            sectors: self.sectors.values().map(SectorData::from_sector).collect(),
            spawns: self.spawns.clone(),
        }
    }

    pub fn sectors(&self) -> impl Iterator<Item = (SectorId, &Sector)> {
        self.sectors.iter()
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id)
    }

    pub fn sector_refs(&self) -> Vec<&Sector> {
        self.sectors.values().collect()
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Edit one sector and re-finalize it.
    ///
    /// The edit is applied to a copy; if the result fails validation the
    /// sector and its planes are left exactly as they were.
    pub fn edit_sector(
        &mut self,
        id: SectorId,
        registry: &mut RaycastRegistry,
        edit: impl FnOnce(&mut Sector),
    ) -> Result<(), LevelError> {
        let index = self
            .sectors
            .keys()
            .position(|key| key == id)
            .ok_or(LevelError::UnknownSector(id))?;

        let mut edited = self.sectors[id].clone();
        edit(&mut edited);
        edited
            .finalize(id, registry)
            .map_err(|source| LevelError::Sector { index, source })?;

        debug!(?id, "sector edited");
        self.sectors[id] = edited;
        Ok(())
    }

    /// Drop every level plane from the registry and re-finalize all sectors.
    ///
    /// Every sector is checked before the registry is touched, so an invalid
    /// sector leaves the whole level and its planes as they were.
    pub fn rebuild(&mut self, registry: &mut RaycastRegistry) -> Result<(), LevelError> {
        for (index, sector) in self.sectors.values().enumerate() {
            sector
                .check()
                .map_err(|source| LevelError::Sector { index, source })?;
        }

        registry.retain(|plane| !plane.owner.is_level());
        for (index, (id, sector)) in self.sectors.iter_mut().enumerate() {
            sector
                .finalize(id, registry)
                .map_err(|source| LevelError::Sector { index, source })?;
        }
        debug!(sectors = self.sectors.len(), "level rebuilt");
        Ok(())
    }

    /// Remove all of this level's planes from the registry.
    pub fn release(&mut self, registry: &mut RaycastRegistry) {
        for sector in self.sectors.values_mut() {
            sector.release_planes(registry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_load_test_level() {
        let mut registry = RaycastRegistry::new();
        let level = Level::from_data(&generate_test_level(), &mut registry).unwrap();
        assert_eq!(level.len(), 2);
        // Hall: 4 walls + floor + ceiling, alcove: 3 walls + floor + ceiling
        assert_eq!(registry.len(), 11);
        assert!(level.sectors().all(|(_, s)| s.is_finalized()));
    }

    #[test]
    fn test_invalid_sector_rolls_back() {
        let mut data = generate_test_level();
        data.sectors[1].walls.pop();

        let mut registry = RaycastRegistry::new();
        let err = Level::from_data(&data, &mut registry).unwrap_err();
        assert!(matches!(err, LevelError::Sector { index: 1, .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bincode_roundtrip() {
        let data = generate_test_level();
        let bytes = data.encode().unwrap();
        assert_eq!(LevelData::decode(&bytes).unwrap(), data);
        assert!(LevelData::decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_to_data_matches_source() {
        let data = generate_minimal_test();
        let mut registry = RaycastRegistry::new();
        let level = Level::from_data(&data, &mut registry).unwrap();
        assert_eq!(level.to_data(), data);
    }

    #[test]
    fn test_edit_sector() {
        let mut registry = RaycastRegistry::new();
        let mut level = Level::from_data(&generate_minimal_test(), &mut registry).unwrap();
        let (id, _) = level.sectors().next().unwrap();

        level
            .edit_sector(id, &mut registry, |s| s.set_heights(0.0, 5.0).walls[0].exists = false)
            .unwrap();
        assert_eq!(level.sector(id).unwrap().ceiling_y, 5.0);
        assert_eq!(registry.len(), 5);

        // A broken edit leaves the sector untouched
        let err = level
            .edit_sector(id, &mut registry, |s| {
                s.vertices.push(Vec2::new(1.0, 1.0));
            })
            .unwrap_err();
        assert!(matches!(err, LevelError::Sector { index: 0, .. }));
        assert_eq!(level.sector(id).unwrap().vertices.len(), 4);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_rebuild_keeps_foreign_planes() {
        use glam::Vec3;
        use zerog_physics::{EntityId, PlaneOwner, RaycastPlane};

        let mut registry = RaycastRegistry::new();
        let mut level = Level::from_data(&generate_minimal_test(), &mut registry).unwrap();
        let hurtbox = registry.add(RaycastPlane::new(
            PlaneOwner::EnemyHurtbox {
                entity: EntityId::default(),
            },
            [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            Vec3::Z,
        ));

        level.rebuild(&mut registry).unwrap();
        assert_eq!(registry.len(), 7);
        assert!(registry.get(hurtbox).is_some());
    }

    #[test]
    fn test_failed_rebuild_keeps_planes() {
        let mut registry = RaycastRegistry::new();
        let mut level = Level::from_data(&generate_test_level(), &mut registry).unwrap();
        let planes: Vec<_> = level
            .sectors()
            .flat_map(|(_, sector)| sector.planes().to_vec())
            .collect();

        let (_, last) = level.sectors.iter_mut().last().unwrap();
        last.vertices.push(Vec2::new(1.0, 1.0));

        let err = level.rebuild(&mut registry).unwrap_err();
        assert!(matches!(err, LevelError::Sector { index: 1, .. }));
        assert_eq!(registry.len(), 11);
        assert!(planes.iter().all(|id| registry.get(*id).is_some()));
        assert!(level.sectors().all(|(_, sector)| sector.is_finalized()));
    }
}
