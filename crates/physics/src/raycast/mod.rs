//! Ray planes and the nearest-hit query.
//!
//! The registry holds every shootable surface in the world: sector walls,
//! floors and ceilings, plus enemy hurtboxes. A plane is a bounded
//! quadrilateral `a, b, c, d` (with `a→b` and `a→d` as its two edge axes)
//! and a normal.
//!
//! Queries walk all planes; levels in this engine are small enough that a
//! flat list beats maintaining a spatial index.

mod plane;
mod registry;

pub use plane::{PlaneOwner, RaycastPlane};
pub use registry::{RaycastHit, RaycastRegistry};

/// Filter that ignores enemy hurtboxes (line-of-sight checks).
pub fn level_only(plane: &RaycastPlane) -> bool {
    plane.owner.is_level()
}

/// Filter that accepts every plane (hit-scan weapons).
pub fn everything(_plane: &RaycastPlane) -> bool {
    true
}
