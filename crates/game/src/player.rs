//! The player: a floating body with a pistol and a flashlight.
//!
//! There is no gravity. Movement input accelerates the body along the view
//! axes up to a speed cap; with no input, drag bleeds the velocity off.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{Animation, Clip, ClipSet};
use crate::camera::{forward_from_angles, FirstPersonCamera};
use crate::input::PlayerInput;

/// Below this speed the body is considered at rest.
const REST_SPEED: f32 = 1e-3;

/// Pistol animation clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PistolClip {
    Idle,
    Fire,
    Reload,
}

impl ClipSet for PistolClip {
    fn clip(self) -> Clip {
        match self {
            PistolClip::Idle => Clip::still(1),
            PistolClip::Fire => Clip::new(2, 4, 0.08),
            PistolClip::Reload => Clip::new(5, 9, 0.12),
        }
    }
}

/// Player tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Thrust (units/second²).
    pub acceleration: f32,

    /// Speed cap (units/second).
    pub max_speed: f32,

    /// Exponential drag rate applied with no movement input (1/second).
    pub drag: f32,

    /// Radians per unit of look delta.
    pub look_sensitivity: f32,

    /// Pitch limit in radians.
    pub max_pitch: f32,

    pub max_health: i32,

    /// Rounds per magazine.
    pub clip_size: u32,

    /// Rounds carried outside the magazine at spawn.
    pub reserve_ammo: u32,

    /// Fire clip frame from which another shot may interrupt it.
    pub refire_frame: u32,

    /// How fast the flashlight beam catches up with the view (1/second).
    pub flashlight_follow: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            acceleration: 12.0,
            max_speed: 4.0,
            drag: 3.0,
            look_sensitivity: 0.0025,
            max_pitch: FRAC_PI_2 - 0.01,
            max_health: 100,
            clip_size: 8,
            reserve_ammo: 32,
            refire_frame: 4,
            flashlight_follow: 8.0,
        }
    }
}

/// What the player did this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerActions {
    pub fired: bool,
    pub reloaded: bool,
    pub flashlight_toggled: bool,
    pub interacted: bool,
}

/// The player.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Radians from +X toward +Z.
    pub yaw: f32,
    /// Radians; positive looks down.
    pub pitch: f32,

    pub health: i32,
    pub max_health: i32,
    pub is_dead: bool,

    pub clip_ammo: u32,
    pub reserve_ammo: u32,

    pub flashlight_on: bool,
    /// Beam direction; trails the view direction.
    pub flashlight_direction: Vec3,

    pub weapon: Animation<PistolClip>,
}

impl Player {
    pub fn spawn(position: Vec3, yaw: f32, config: &PlayerConfig) -> Self {
        let forward = forward_from_angles(yaw, 0.0);
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw,
            pitch: 0.0,
            health: config.max_health,
            max_health: config.max_health,
            is_dead: false,
            clip_ammo: config.clip_size,
            reserve_ammo: config.reserve_ammo,
            flashlight_on: true,
            flashlight_direction: forward,
            weapon: Animation::new(PistolClip::Idle),
        }
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_angles(self.yaw, self.pitch)
    }

    /// Horizontal right vector.
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }

    /// View-relative up vector.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn camera(&self, template: &FirstPersonCamera) -> FirstPersonCamera {
        FirstPersonCamera {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
            ..template.clone()
        }
    }

    pub fn view_projection(&self, template: &FirstPersonCamera) -> Mat4 {
        self.camera(template).view_projection_matrix()
    }

    /// Apply one frame of input: look, thrust, weapon and flashlight.
    ///
    /// Does not move the body; the scene resolves `velocity` against the
    /// level afterwards.
    pub fn update(
        &mut self,
        input: &PlayerInput,
        config: &PlayerConfig,
        delta: f32,
    ) -> PlayerActions {
        let mut actions = PlayerActions::default();

        if self.is_dead {
            self.velocity = Vec3::ZERO;
            return actions;
        }

        // Look
        self.yaw += input.look_delta.x * config.look_sensitivity;
        self.pitch = (self.pitch + input.look_delta.y * config.look_sensitivity)
            .clamp(-config.max_pitch, config.max_pitch);

        // Flashlight
        if input.actions.toggle_flashlight {
            self.flashlight_on = !self.flashlight_on;
            actions.flashlight_toggled = true;
        }
        let follow = (config.flashlight_follow * delta).min(1.0);
        self.flashlight_direction = self
            .flashlight_direction
            .lerp(self.forward(), follow)
            .normalize_or_zero();

        self.apply_thrust(input, config, delta);

        // Weapon
        if input.actions.reload && self.can_reload() {
            self.weapon.set_clip(PistolClip::Reload);
        }
        if input.actions.fire && self.can_fire(config) {
            self.clip_ammo -= 1;
            self.weapon.set_clip(PistolClip::Fire);
            actions.fired = true;
        }

        self.weapon.advance(delta);
        if self.weapon.is_finished() {
            if self.weapon.clip() == PistolClip::Reload {
                self.finish_reload(config);
                actions.reloaded = true;
            }
            self.weapon.set_clip(PistolClip::Idle);
        }

        actions.interacted = input.actions.interact;
        actions
    }

    fn apply_thrust(&mut self, input: &PlayerInput, config: &PlayerConfig, delta: f32) {
        let axes = input.movement.clamped();
        if axes.is_idle() {
            self.velocity *= (-config.drag * delta).exp();
        } else {
            let thrust =
                self.forward() * axes.forward + self.right() * axes.right + self.up() * axes.up;
            self.velocity += thrust * config.acceleration * delta;
            self.velocity = self.velocity.clamp_length_max(config.max_speed);
        }

        if self.velocity.length() < REST_SPEED {
            self.velocity = Vec3::ZERO;
        }
    }

    /// Fire is allowed from idle, or late enough into the previous shot.
    pub fn can_fire(&self, config: &PlayerConfig) -> bool {
        if self.is_dead || self.clip_ammo == 0 {
            return false;
        }
        match self.weapon.clip() {
            PistolClip::Idle => true,
            PistolClip::Fire => self.weapon.frame() >= config.refire_frame,
            PistolClip::Reload => false,
        }
    }

    pub fn can_reload(&self) -> bool {
        !self.is_dead && self.reserve_ammo > 0 && self.weapon.clip() == PistolClip::Idle
    }

    fn finish_reload(&mut self, config: &PlayerConfig) {
        let wanted = config.clip_size.saturating_sub(self.clip_ammo);
        let moved = wanted.min(self.reserve_ammo);
        self.clip_ammo += moved;
        self.reserve_ammo -= moved;
        debug!(clip = self.clip_ammo, reserve = self.reserve_ammo, "reloaded");
    }

    /// Subtract health. Returns `true` if this hit killed the player.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.is_dead = true;
            self.velocity = Vec3::ZERO;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn player() -> (Player, PlayerConfig) {
        let config = PlayerConfig::default();
        (Player::spawn(Vec3::new(0.0, 1.5, 0.0), 0.0, &config), config)
    }

    fn fire() -> PlayerInput {
        let mut input = PlayerInput::default();
        input.actions.fire = true;
        input
    }

    #[test]
    fn test_thrust_and_speed_cap() {
        let (mut player, config) = player();
        let mut input = PlayerInput::default();
        input.movement.forward = 1.0;

        for _ in 0..600 {
            player.update(&input, &config, DT);
        }
        assert!(player.velocity.x > 0.0);
        assert!(player.velocity.length() <= config.max_speed + 1e-4);
    }

    #[test]
    fn test_drag_brings_body_to_rest() {
        let (mut player, config) = player();
        player.velocity = Vec3::new(2.0, 0.0, 0.0);
        for _ in 0..600 {
            player.update(&PlayerInput::default(), &config, DT);
        }
        assert_eq!(player.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let (mut player, config) = player();
        let mut input = PlayerInput::default();
        input.look_delta.y = 1e6;
        player.update(&input, &config, DT);
        assert!(player.pitch <= config.max_pitch);
    }

    #[test]
    fn test_fire_uses_ammo_and_blocks_refire() {
        let (mut player, config) = player();

        assert!(player.update(&fire(), &config, DT).fired);
        assert_eq!(player.clip_ammo, config.clip_size - 1);

        // Still early in the fire clip
        assert!(!player.update(&fire(), &config, DT).fired);

        // Let the clip play out
        for _ in 0..60 {
            player.update(&PlayerInput::default(), &config, DT);
        }
        assert_eq!(player.weapon.clip(), PistolClip::Idle);
        assert!(player.update(&fire(), &config, DT).fired);
    }

    #[test]
    fn test_empty_clip_and_reload() {
        let (mut player, config) = player();
        player.clip_ammo = 0;
        assert!(!player.update(&fire(), &config, DT).fired);

        let mut reload = PlayerInput::default();
        reload.actions.reload = true;
        player.update(&reload, &config, DT);
        assert_eq!(player.weapon.clip(), PistolClip::Reload);

        let mut reloaded = false;
        for _ in 0..120 {
            reloaded |= player.update(&PlayerInput::default(), &config, DT).reloaded;
        }
        assert!(reloaded);
        assert_eq!(player.clip_ammo, config.clip_size);
        assert_eq!(player.reserve_ammo, config.reserve_ammo - config.clip_size);
    }

    #[test]
    fn test_flashlight_toggle_and_lag() {
        let (mut player, config) = player();
        let mut input = PlayerInput::default();
        input.actions.toggle_flashlight = true;
        input.look_delta.x = 400.0;

        let actions = player.update(&input, &config, DT);
        assert!(actions.flashlight_toggled);
        assert!(!player.flashlight_on);

        // The beam trails the view after a sharp turn
        assert!(player.flashlight_direction.dot(player.forward()) < 0.999);
        for _ in 0..120 {
            player.update(&PlayerInput::default(), &config, DT);
        }
        assert!(player.flashlight_direction.dot(player.forward()) > 0.999);
    }

    #[test]
    fn test_damage_and_death() {
        let (mut player, _) = player();
        assert!(!player.take_damage(30));
        assert_eq!(player.health, 70);
        assert!(player.take_damage(100));
        assert!(player.is_dead);
        assert_eq!(player.health, 0);
        assert!(!player.take_damage(10));
    }
}
