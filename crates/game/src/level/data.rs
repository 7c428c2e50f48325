//! Serializable level description.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use zerog_physics::{Sector, Wall};

use super::LevelError;

/// One wall record, for the edge leaving the vertex with the same index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallData {
    pub exists: bool,
    pub texture: u32,
}

impl WallData {
    pub fn solid(texture: u32) -> Self {
        Self { exists: true, texture }
    }

    pub fn open() -> Self {
        Self {
            exists: false,
            texture: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorData {
    pub vertices: Vec<Vec2>,
    pub walls: Vec<WallData>,
    pub floor_y: f32,
    pub ceiling_y: f32,
    pub floor_texture: u32,
    pub ceiling_texture: u32,
}

impl SectorData {
    /// Build the (not yet finalized) runtime sector.
    pub fn to_sector(&self) -> Sector {
        let mut sector = Sector::new(self.floor_y, self.ceiling_y);
        sector.set_textures(self.floor_texture, self.ceiling_texture);
        sector.vertices = self.vertices.clone();
        sector.walls = self
            .walls
            .iter()
            .map(|w| Wall {
                exists: w.exists,
                texture_index: w.texture,
                ..Wall::open()
            })
            .collect();
        sector
    }

    pub fn from_sector(sector: &Sector) -> Self {
        Self {
            vertices: sector.vertices.clone(),
            walls: sector
                .walls
                .iter()
                .map(|w| WallData {
                    exists: w.exists,
                    texture: w.texture_index,
                })
                .collect(),
            floor_y: sector.floor_y,
            ceiling_y: sector.ceiling_y,
            floor_texture: sector.floor_texture,
            ceiling_texture: sector.ceiling_texture,
        }
    }
}

/// Types of spawn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnType {
    Player,
    Enemy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vec3,

    /// Initial facing (yaw in radians).
    pub facing: f32,

    pub spawn_type: SpawnType,
}

/// A complete level: sector geometry plus spawn points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub sectors: Vec<SectorData>,
    pub spawns: Vec<SpawnPoint>,
}

impl LevelData {
    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, LevelError> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Decode from bytes.
    pub fn decode(data: &[u8]) -> Result<Self, LevelError> {
        let (level, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    pub fn player_spawn(&self) -> Option<&SpawnPoint> {
        self.spawns.iter().find(|s| s.spawn_type == SpawnType::Player)
    }

    pub fn enemy_spawns(&self) -> impl Iterator<Item = &SpawnPoint> {
        self.spawns.iter().filter(|s| s.spawn_type == SpawnType::Enemy)
    }
}
