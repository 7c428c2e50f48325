//! Bullet-hole decals.

use glam::Vec3;
use zerog_physics::PlaneOwner;

use crate::animation::{Animation, Clip, ClipSet};

/// Decal animation: three fade frames, then the decal expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecalClip {
    Fade,
}

impl ClipSet for DecalClip {
    fn clip(self) -> Clip {
        match self {
            DecalClip::Fade => Clip::new(0, 2, 1.0),
        }
    }
}

/// A short-lived mark on a surface.
///
/// Level decals live in the scene; decals on an enemy live on that enemy
/// and disappear with it.
#[derive(Debug, Clone)]
pub struct Decal {
    pub owner: PlaneOwner,
    pub position: Vec3,
    pub normal: Vec3,
    animation: Animation<DecalClip>,
    expired: bool,
}

impl Decal {
    /// Place a decal at `point`, nudged `offset` along `normal` so it does
    /// not z-fight with the surface.
    pub fn new(owner: PlaneOwner, point: Vec3, normal: Vec3, offset: f32) -> Self {
        Self {
            owner,
            position: point + normal * offset,
            normal,
            animation: Animation::new(DecalClip::Fade),
            expired: false,
        }
    }

    /// Advance the fade. Expires once the clip has played through.
    pub fn update(&mut self, delta: f32) {
        if self.expired {
            return;
        }
        self.animation.advance(delta);
        if self.animation.is_finished() {
            self.expired = true;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }
}
