//! Player input intents.
//!
//! The host converts raw device state into a [`PlayerInput`] and submits it
//! to the scene. Several submissions between two frames are merged: the
//! latest movement axes win, look deltas add up, and action presses are
//! kept until the next frame consumes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Movement intent along the player's local axes, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementAxes {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

/// Edge-triggered actions: each is true only on the frame it was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub fire: bool,
    pub reload: bool,
    pub toggle_flashlight: bool,
    pub interact: bool,
}

/// Input intents for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub movement: MovementAxes,

    /// Look delta (x = yaw, y = pitch) in device units, scaled by the
    /// player's look sensitivity.
    pub look_delta: Vec2,

    pub actions: ActionInput,
}

impl MovementAxes {
    /// Build axes from digital key states.
    pub fn from_keys(
        forward: bool,
        backward: bool,
        left: bool,
        right: bool,
        up: bool,
        down: bool,
    ) -> Self {
        let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
        Self {
            forward: axis(forward, backward),
            right: axis(right, left),
            up: axis(up, down),
        }
        .clamped()
    }

    /// Scale down so diagonal movement is no faster than straight movement.
    pub fn clamped(self) -> Self {
        let magnitude = (self.forward.powi(2) + self.right.powi(2) + self.up.powi(2)).sqrt();
        if magnitude > 1.0 {
            Self {
                forward: self.forward / magnitude,
                right: self.right / magnitude,
                up: self.up / magnitude,
            }
        } else {
            self
        }
    }

    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }
}

impl PlayerInput {
    /// Fold a later submission into this one.
    pub fn merge(&mut self, later: PlayerInput) {
        self.movement = later.movement;
        self.look_delta += later.look_delta;
        self.actions.fire |= later.actions.fire;
        self.actions.reload |= later.actions.reload;
        self.actions.toggle_flashlight |= later.actions.toggle_flashlight;
        self.actions.interact |= later.actions.interact;
    }

    /// Take the accumulated input, leaving an empty one behind.
    pub fn consume(&mut self) -> PlayerInput {
        std::mem::take(self)
    }

    pub fn has_movement(&self) -> bool {
        !self.movement.is_idle()
    }
}
