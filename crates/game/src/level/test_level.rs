//! Built-in levels for the demo driver and tests.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec3};

use super::data::{LevelData, SectorData, SpawnPoint, SpawnType, WallData};

/// Two connected rooms: a five-sided hall and a diamond-shaped alcove
/// joined through an open edge.
pub fn generate_test_level() -> LevelData {
    let hall = SectorData {
        vertices: vec![
            Vec2::new(-3.0, -1.0),
            Vec2::new(0.0, -5.0),
            Vec2::new(3.0, -1.0),
            Vec2::new(3.0, 5.0),
            Vec2::new(-3.0, 5.0),
        ],
        walls: vec![
            WallData::solid(0),
            WallData::open(),
            WallData::solid(0),
            WallData::solid(0),
            WallData::solid(0),
        ],
        floor_y: 0.0,
        ceiling_y: 3.0,
        floor_texture: 1,
        ceiling_texture: 2,
    };

    let alcove = SectorData {
        vertices: vec![
            Vec2::new(3.0, -9.0),
            Vec2::new(6.0, -5.0),
            Vec2::new(3.0, -1.0),
            Vec2::new(0.0, -5.0),
        ],
        walls: vec![
            WallData::solid(0),
            WallData::solid(0),
            WallData::open(),
            WallData::solid(0),
        ],
        floor_y: 0.0,
        ceiling_y: 3.0,
        floor_texture: 1,
        ceiling_texture: 2,
    };

    LevelData {
        name: "test".to_string(),
        sectors: vec![hall, alcove],
        spawns: vec![
            SpawnPoint {
                position: Vec3::new(0.0, 1.5, 3.0),
                facing: -FRAC_PI_2,
                spawn_type: SpawnType::Player,
            },
            SpawnPoint {
                position: Vec3::new(3.0, 1.5, -5.0),
                facing: PI * 0.75,
                spawn_type: SpawnType::Enemy,
            },
        ],
    }
}

/// A single square room with the player at one end and one enemy at the
/// other, facing each other along the X axis.
pub fn generate_minimal_test() -> LevelData {
    LevelData {
        name: "minimal".to_string(),
        sectors: vec![SectorData {
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(12.0, 0.0),
                Vec2::new(12.0, 4.0),
                Vec2::new(0.0, 4.0),
            ],
            walls: vec![WallData::solid(0); 4],
            floor_y: 0.0,
            ceiling_y: 3.0,
            floor_texture: 0,
            ceiling_texture: 0,
        }],
        spawns: vec![
            SpawnPoint {
                position: Vec3::new(1.0, 1.5, 2.0),
                facing: 0.0,
                spawn_type: SpawnType::Player,
            },
            SpawnPoint {
                position: Vec3::new(10.0, 1.5, 2.0),
                facing: PI,
                spawn_type: SpawnType::Enemy,
            },
        ],
    }
}
