//! Scene configuration.

use serde::{Deserialize, Serialize};
use zerog_physics::CollisionConfig;

use crate::camera::FirstPersonCamera;
use crate::enemy::EnemyConfig;
use crate::player::PlayerConfig;

/// Everything tunable about a scene, loadable from a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Frames per second the host is expected to drive.
    pub tick_rate: u32,

    /// Hit-scan weapon range.
    pub fire_range: f32,

    /// Reach of the interact ray.
    pub interact_range: f32,

    /// Damage per pistol hit.
    pub shot_damage: i32,

    /// Offset of level bullet holes from the surface.
    pub decal_offset: f32,

    /// Oldest level decals are dropped past this count.
    pub max_decals: usize,

    /// Projection settings; position and angles come from the player.
    pub camera: FirstPersonCamera,

    /// Player body.
    pub collision: CollisionConfig,

    /// Enemy body.
    pub enemy_collision: CollisionConfig,

    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            fire_range: 100.0,
            interact_range: 1.5,
            shot_damage: 1,
            decal_offset: 0.05,
            max_decals: 64,
            camera: FirstPersonCamera::default(),
            collision: CollisionConfig::default(),
            enemy_collision: CollisionConfig::small(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Time step per frame in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r#"{ "tick_rate": 30, "player": { "max_speed": 9.0 } }"#).unwrap();
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.player.max_speed, 9.0);
        assert_eq!(config.player.clip_size, PlayerConfig::default().clip_size);
        assert_eq!(config.fire_range, 100.0);
        assert!((config.delta_time() - 1.0 / 30.0).abs() < 1e-6);
    }
}
