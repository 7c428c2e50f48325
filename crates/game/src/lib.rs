//! Zerog Game Logic
//!
//! Gameplay on top of the sector physics core:
//!
//! - Frame-based sprite animation shared by the weapon, enemies and decals
//! - The zero-gravity player with a hit-scan pistol and a flashlight
//! - Enemies that spot, chase and strike the player
//! - Level data (serializable) and the runtime level built from it
//! - The scene that owns everything and advances it one frame at a time
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            Scene                              │
//! │  ┌─────────┐   ┌──────────────┐   ┌────────────────────────┐  │
//! │  │ Input   │──►│ Player       │──►│ move_and_slide         │  │
//! │  │ intents │   │ (look, fire) │   │ (sectors + hurtboxes)  │  │
//! │  └─────────┘   └──────────────┘   └───────────┬────────────┘  │
//! │                                               ▼               │
//! │  ┌──────────────┐   ┌─────────────┐   ┌──────────────────┐    │
//! │  │ Decals       │◄──│ Hit-scan    │◄──│ RaycastRegistry  │    │
//! │  └──────────────┘   └─────────────┘   └──────────────────┘    │
//! │  ┌──────────────┐                                             │
//! │  │ Enemies      │──► damage to player, removal when dead      │
//! │  └──────────────┘                                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering is out of scope: [`Scene::render`] walks visible geometry and
//! hands it to a caller-supplied [`RenderSink`].

pub mod animation;
pub mod camera;
pub mod decal;
pub mod enemy;
pub mod input;
pub mod level;
pub mod player;
pub mod render;
pub mod scene;

pub use animation::{Animation, Clip, ClipSet};
pub use camera::FirstPersonCamera;
pub use decal::Decal;
pub use enemy::{Enemy, EnemyConfig, EnemyState};
pub use input::PlayerInput;
pub use level::{Level, LevelData, LevelError};
pub use player::{Player, PlayerConfig};
pub use render::RenderSink;
pub use scene::{Scene, SceneConfig, SceneEvent};

// Re-export physics types for convenience
pub use zerog_physics::{
    CollisionConfig, EntityId, Frustum, PlaneId, RaycastHit, RaycastRegistry, Sector, SectorId,
};
