//! Move-and-slide collision response.
//!
//! Entities are treated as a circle of `radius` on the XZ plane plus a
//! vertical clearance above and below their center. Each frame the desired
//! displacement is clipped against nearby sector floors, ceilings and walls
//! (and any extra wall segments such as enemy hurtboxes), sliding along
//! whatever it touches.

mod config;
mod obstacle;
mod slide_move;

pub use config::CollisionConfig;
pub use obstacle::{WallContact, WallSegment};
pub use slide_move::{clip_velocity, move_and_slide, SlideOutcome};
