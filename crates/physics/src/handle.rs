//! Generation-checked handles.
//!
//! Every cross-reference between sectors, entities and ray planes goes through
//! one of these keys. A key whose slot has been freed (and possibly reused)
//! no longer resolves, so a stale reference reads as "gone" instead of
//! aliasing whatever took its place.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a plane in a [`RaycastRegistry`](crate::RaycastRegistry).
    pub struct PlaneId;

    /// Handle to a sector owned by a level.
    pub struct SectorId;

    /// Handle to a simulated entity (enemies).
    pub struct EntityId;
}
