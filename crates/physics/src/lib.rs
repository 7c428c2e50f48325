//! Zerog Physics
//!
//! Geometry and collision core for a sector-based first-person engine.
//! Levels are made of vertically extruded polygons ("sectors"): a 2D
//! footprint plus a floor and ceiling height.
//!
//! # Architecture
//!
//! - **Math**: 2D segment intersection, polygon/triangle areas, distances
//! - **Sector**: footprint polygon, ear-clipping triangulation, render mesh,
//!   bounding volume and registered ray planes
//! - **Raycast**: a registry of bounded quadrilateral planes with a
//!   nearest-hit query used by hit-scan weapons and line-of-sight checks
//! - **Frustum**: six clip planes extracted from a view-projection matrix
//! - **Movement**: the move-and-slide resolver shared by the player and enemies
//!
//! Dependency order: math → sector → raycast → frustum → movement.
//!
//! Nothing here owns global state. The registry is an explicit value that
//! callers thread through sector finalization and queries.

pub mod frustum;
pub mod handle;
pub mod math;
pub mod movement;
pub mod raycast;
pub mod sector;

pub use frustum::Frustum;
pub use handle::{EntityId, PlaneId, SectorId};
pub use movement::{move_and_slide, CollisionConfig, SlideOutcome, WallSegment};
pub use raycast::{PlaneOwner, RaycastHit, RaycastPlane, RaycastRegistry};
pub use sector::{GeometryError, Sector, SectorMesh, VertexData, Wall};
