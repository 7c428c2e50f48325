use glam::Vec3;
use zerog_physics::{EntityId, PlaneOwner};

/// Something that happened during a frame, for the host to react to
/// (sound, HUD, logging).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    Fired { origin: Vec3, direction: Vec3 },
    /// A shot struck level geometry.
    SurfaceHit { owner: PlaneOwner, point: Vec3 },
    EnemyHit { entity: EntityId, health: i32 },
    EnemyKilled { entity: EntityId },
    /// A dead enemy was removed from the scene.
    EnemyRemoved { entity: EntityId },
    EnemySpotted { entity: EntityId },
    PlayerDamaged { amount: i32, health: i32 },
    PlayerDied,
    Reloaded { clip: u32, reserve: u32 },
    FlashlightToggled { on: bool },
    /// The interact ray was cast; `target` is what it reached, if anything.
    Interacted { target: Option<PlaneOwner> },
}
