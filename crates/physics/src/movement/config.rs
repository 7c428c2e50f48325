//! Collision tuning.

use serde::{Deserialize, Serialize};

/// Configuration for the move-and-slide resolver.
///
/// Distances in world units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Horizontal collision radius.
    pub radius: f32,

    /// Gap kept between the entity center and floor/ceiling.
    pub vertical_clearance: f32,

    /// Wall passes before the resolver gives up and cancels the move.
    pub max_attempts: u32,

    /// How far outside its bounding box a sector still counts as nearby.
    pub sector_padding: f32,

    /// Extra separation left after closing the gap to a surface.
    pub skin: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            vertical_clearance: 0.5,
            max_attempts: 10,
            sector_padding: 1.0,
            skin: 0.001,
        }
    }
}

impl CollisionConfig {
    /// Smaller body for fast, narrow entities.
    pub fn small() -> Self {
        Self {
            radius: 0.3,
            vertical_clearance: 0.3,
            ..Default::default()
        }
    }
}
