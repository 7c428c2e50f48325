//! Enemies: floating melee attackers.
//!
//! State progression:
//!
//! ```text
//! Idle ──(sees player)──► Pursue ──(in range, facing)──► Attack
//!  ▲                                                       │
//!  └──────────────────(clip finished)──────────────────────┘
//!
//! any ──(health <= 0)──► Dying ──(clip finished)──► Dead
//! ```
//!
//! Once hit, an enemy remembers the player and skips the sight check.
//! Each enemy owns a hurtbox plane in the ray registry: a billboard quad
//! kept facing the player, which also acts as a wall for the player's
//! movement.

mod vision;

pub use vision::{check_vision, has_line_of_sight, in_cone, VisionCone, VisionResult};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zerog_physics::math::{normalize_angle_diff, yaw_direction, yaw_of, EPSILON};
use zerog_physics::{
    move_and_slide, CollisionConfig, EntityId, PlaneId, PlaneOwner, RaycastPlane, RaycastRegistry,
    Sector, WallSegment,
};

use crate::animation::{Animation, Clip, ClipSet};
use crate::decal::Decal;

/// Enemy animation clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyClip {
    Idle,
    Move,
    Attack,
    Die,
}

impl ClipSet for EnemyClip {
    fn clip(self) -> Clip {
        match self {
            EnemyClip::Idle => Clip::new(0, 1, 0.5),
            EnemyClip::Move => Clip::new(2, 5, 0.15),
            EnemyClip::Attack => Clip::new(6, 9, 0.12),
            EnemyClip::Die => Clip::new(10, 14, 0.1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Pursue,
    Attack,
    Dying,
    Dead,
}

impl EnemyState {
    /// Can this enemy still be hit?
    pub fn is_alive(&self) -> bool {
        !matches!(self, EnemyState::Dying | EnemyState::Dead)
    }
}

/// Enemy tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: i32,

    /// Pursuit speed (units/second).
    pub speed: f32,

    pub vision: VisionCone,

    /// Distance at which the enemy stops to strike.
    pub strike_range: f32,

    /// Largest bearing error (radians) at which a strike may start.
    pub attack_half_angle: f32,

    /// The strike still lands if the player is within this distance when
    /// the hit frame plays.
    pub strike_reach: f32,

    /// Damage per strike.
    pub attack_damage: i32,

    /// Attack clip frame on which the strike lands.
    pub attack_hit_frame: u32,

    /// Turn smoothing rate (1/second).
    pub turn_rate: f32,

    /// Hurtbox half width and half height.
    pub hurtbox_half_extents: Vec2,

    /// Offset of bullet-hole decals from the hurtbox.
    pub decal_offset: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 3,
            speed: 1.5,
            vision: VisionCone::default(),
            strike_range: 1.25,
            attack_half_angle: 0.35,
            strike_reach: 1.75,
            attack_damage: 7,
            attack_hit_frame: 8,
            turn_rate: 6.0,
            hurtbox_half_extents: Vec2::new(0.5, 0.6),
            decal_offset: 0.05,
        }
    }
}

/// Per-frame inputs shared by every enemy.
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub player_position: Vec3,
    pub sectors: &'a [&'a Sector],
    pub collision: &'a CollisionConfig,
    pub config: &'a EnemyConfig,
}

/// Result of taking damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dying or dead.
    Ignored,
    Wounded,
    Killed,
}

/// What an enemy did this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnemyUpdate {
    /// Damage dealt to the player.
    pub damage: Option<i32>,
    pub spotted_player: bool,
    pub died: bool,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Radians from +X toward +Z.
    pub yaw: f32,
    pub health: i32,
    pub state: EnemyState,
    pub has_seen_player: bool,
    pub animation: Animation<EnemyClip>,
    pub hurtbox: PlaneId,
    pub bullet_holes: Vec<Decal>,
    strike_done: bool,
}

impl Enemy {
    /// Create an enemy and register its hurtbox.
    pub fn spawn(
        id: EntityId,
        position: Vec3,
        yaw: f32,
        registry: &mut RaycastRegistry,
        config: &EnemyConfig,
    ) -> Self {
        let facing = yaw_direction(yaw);
        let hurtbox = registry.add(RaycastPlane::new(
            PlaneOwner::EnemyHurtbox { entity: id },
            billboard(position, facing, config.hurtbox_half_extents),
            facing,
        ));

        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            yaw,
            health: config.max_health,
            state: EnemyState::Idle,
            has_seen_player: false,
            animation: Animation::new(EnemyClip::Idle),
            hurtbox,
            bullet_holes: Vec::new(),
            strike_done: false,
        }
    }

    pub fn forward(&self) -> Vec3 {
        yaw_direction(self.yaw)
    }

    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    /// The hurtbox's footprint as a movement obstacle at height `y`, if the
    /// hurtbox is live and spans that height.
    pub fn hurtbox_segment(&self, registry: &RaycastRegistry, y: f32) -> Option<WallSegment> {
        registry.get(self.hurtbox)?.footprint_at(y)
    }

    pub fn update(
        &mut self,
        ctx: &EnemyContext<'_>,
        registry: &mut RaycastRegistry,
        delta: f32,
    ) -> EnemyUpdate {
        let mut result = EnemyUpdate::default();
        let config = ctx.config;

        self.bullet_holes.retain_mut(|decal| {
            decal.update(delta);
            !decal.is_expired()
        });

        match self.state {
            EnemyState::Dead => return result,
            EnemyState::Dying => {
                self.animation.advance(delta);
                if self.animation.is_finished() {
                    self.state = EnemyState::Dead;
                    result.died = true;
                    debug!(id = ?self.id, "enemy dead");
                }
                return result;
            }
            EnemyState::Idle => {
                if !self.has_seen_player {
                    let seen = check_vision(
                        registry,
                        self.position,
                        self.yaw,
                        ctx.player_position,
                        &config.vision,
                    );
                    if seen.is_visible() {
                        self.has_seen_player = true;
                        result.spotted_player = true;
                    }
                }
                if self.has_seen_player {
                    self.enter(EnemyState::Pursue);
                }
            }
            EnemyState::Pursue => {
                self.turn_toward(ctx.player_position, config.turn_rate, delta);

                let to_player = ctx.player_position - self.position;
                if to_player.length() <= config.strike_range {
                    // Hold position and keep turning until the target is ahead
                    self.velocity = Vec3::ZERO;
                    if self.bearing_error(ctx.player_position) <= config.attack_half_angle {
                        self.enter(EnemyState::Attack);
                    }
                } else {
                    self.velocity = to_player.normalize_or_zero() * config.speed;
                    move_and_slide(
                        ctx.sectors.iter().copied(),
                        &[],
                        &mut self.position,
                        &mut self.velocity,
                        delta,
                        ctx.collision,
                    );
                }
            }
            EnemyState::Attack => {
                self.turn_toward(ctx.player_position, config.turn_rate, delta);
                if !self.strike_done && self.animation.frame() >= config.attack_hit_frame {
                    self.strike_done = true;
                    if self.position.distance(ctx.player_position) <= config.strike_reach {
                        result.damage = Some(config.attack_damage);
                    }
                }
            }
        }

        self.animation.advance(delta);
        if self.state == EnemyState::Attack && self.animation.is_finished() {
            self.enter(EnemyState::Idle);
        }

        self.face_hurtbox(ctx.player_position, registry, config);
        result
    }

    /// Apply a hit at `point` on the hurtbox.
    ///
    /// Leaves a bullet hole on a surviving enemy; a killing hit starts the
    /// death animation and disables the hurtbox.
    pub fn take_damage(
        &mut self,
        amount: i32,
        point: Vec3,
        normal: Vec3,
        registry: &mut RaycastRegistry,
        config: &EnemyConfig,
    ) -> DamageOutcome {
        if !self.state.is_alive() {
            return DamageOutcome::Ignored;
        }

        self.health -= amount;
        self.has_seen_player = true;

        if self.health <= 0 {
            self.velocity = Vec3::ZERO;
            self.enter(EnemyState::Dying);
            registry.set_enabled(self.hurtbox, false);
            debug!(id = ?self.id, "enemy killed");
            return DamageOutcome::Killed;
        }

        self.bullet_holes.push(Decal::new(
            PlaneOwner::EnemyHurtbox { entity: self.id },
            point,
            normal,
            config.decal_offset,
        ));
        DamageOutcome::Wounded
    }

    fn enter(&mut self, state: EnemyState) {
        if self.state == state {
            return;
        }
        self.state = state;
        let clip = match state {
            EnemyState::Idle => EnemyClip::Idle,
            EnemyState::Pursue => EnemyClip::Move,
            EnemyState::Attack => {
                self.strike_done = false;
                EnemyClip::Attack
            }
            EnemyState::Dying | EnemyState::Dead => EnemyClip::Die,
        };
        self.animation.set_clip(clip);
    }

    /// Absolute horizontal angle between the facing and `target`.
    fn bearing_error(&self, target: Vec3) -> f32 {
        let to_target = target - self.position;
        if Vec2::new(to_target.x, to_target.z).length_squared() < EPSILON {
            return 0.0;
        }
        normalize_angle_diff(yaw_of(to_target) - self.yaw).abs()
    }

    /// Exponentially smooth the yaw toward `target`.
    fn turn_toward(&mut self, target: Vec3, rate: f32, delta: f32) {
        let to_target = target - self.position;
        if Vec2::new(to_target.x, to_target.z).length_squared() < EPSILON {
            return;
        }
        let diff = normalize_angle_diff(yaw_of(to_target) - self.yaw);
        self.yaw += diff * (1.0 - (-rate * delta).exp());
    }

    /// Re-orient the hurtbox billboard toward the player.
    fn face_hurtbox(
        &self,
        player_position: Vec3,
        registry: &mut RaycastRegistry,
        config: &EnemyConfig,
    ) {
        let to_player = player_position - self.position;
        let facing = Vec3::new(to_player.x, 0.0, to_player.z)
            .try_normalize()
            .unwrap_or_else(|| self.forward());
        registry.update(
            self.hurtbox,
            billboard(self.position, facing, config.hurtbox_half_extents),
            facing,
        );
    }
}

/// Vertical quad centered on `center`, facing `facing`.
///
/// Corner order `a, b, c, d`: bottom-left, bottom-right, top-right,
/// top-left as seen from the front.
fn billboard(center: Vec3, facing: Vec3, half_extents: Vec2) -> [Vec3; 4] {
    let right = facing.cross(Vec3::Y).normalize_or_zero() * half_extents.x;
    let up = Vec3::Y * half_extents.y;
    [
        center - right - up,
        center + right - up,
        center + right + up,
        center - right + up,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerog_physics::raycast::everything;
    use zerog_physics::SectorId;

    const DT: f32 = 1.0 / 60.0;

    fn room(registry: &mut RaycastRegistry) -> Sector {
        let mut sector = Sector::with_vertices(
            vec![
                Vec2::new(-10.0, -10.0),
                Vec2::new(10.0, -10.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(-10.0, 10.0),
            ],
            0.0,
            4.0,
        );
        sector.finalize(SectorId::default(), registry).unwrap();
        sector
    }

    fn spawn(registry: &mut RaycastRegistry, config: &EnemyConfig) -> Enemy {
        Enemy::spawn(EntityId::default(), Vec3::new(0.0, 2.0, 0.0), 0.0, registry, config)
    }

    #[test]
    fn test_hurtbox_faces_player() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let collision = CollisionConfig::default();
        let sector = room(&mut registry);
        let mut enemy = spawn(&mut registry, &config);

        let player = Vec3::new(0.0, 2.0, 5.0);
        let sectors = [&sector];
        let ctx = EnemyContext {
            player_position: player,
            sectors: &sectors,
            collision: &collision,
            config: &config,
        };
        enemy.update(&ctx, &mut registry, DT);

        let plane = registry.get(enemy.hurtbox).unwrap();
        assert!((plane.normal - Vec3::Z).length() < 1e-5);

        // A shot from the player hits the hurtbox
        let hit = registry.cast(player, Vec3::NEG_Z, 100.0, everything).unwrap();
        assert_eq!(hit.owner, PlaneOwner::EnemyHurtbox { entity: enemy.id });
    }

    #[test]
    fn test_hurtbox_segment_spans_height() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let mut enemy = spawn(&mut registry, &config);

        let segment = enemy.hurtbox_segment(&registry, 2.0).unwrap();
        assert!((segment.a.distance(segment.b) - 2.0 * config.hurtbox_half_extents.x).abs() < 1e-4);
        assert!(enemy.hurtbox_segment(&registry, 3.5).is_none());

        let killed = enemy.take_damage(
            config.max_health,
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::X,
            &mut registry,
            &config,
        );
        assert_eq!(killed, DamageOutcome::Killed);
        assert!(enemy.hurtbox_segment(&registry, 2.0).is_none());
    }

    #[test]
    fn test_spots_pursues_and_strikes() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let collision = CollisionConfig::default();
        let sector = room(&mut registry);
        let mut enemy = spawn(&mut registry, &config);

        // In front of the enemy (+X)
        let player = Vec3::new(5.0, 2.0, 0.0);
        let sectors = [&sector];
        let ctx = EnemyContext {
            player_position: player,
            sectors: &sectors,
            collision: &collision,
            config: &config,
        };

        let first = enemy.update(&ctx, &mut registry, DT);
        assert!(first.spotted_player);
        assert_eq!(enemy.state, EnemyState::Pursue);

        let mut damage = 0;
        for _ in 0..600 {
            damage += enemy.update(&ctx, &mut registry, DT).damage.unwrap_or(0);
        }
        assert!(enemy.position.distance(player) <= config.strike_range + 0.1);
        assert!(damage >= config.attack_damage);
    }

    #[test]
    fn test_turns_before_striking() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let collision = CollisionConfig::default();
        let sector = room(&mut registry);
        let mut enemy = spawn(&mut registry, &config);
        enemy.has_seen_player = true;

        // Within strike range, directly behind
        let player = Vec3::new(-1.0, 2.0, 0.0);
        let sectors = [&sector];
        let ctx = EnemyContext {
            player_position: player,
            sectors: &sectors,
            collision: &collision,
            config: &config,
        };

        let start = enemy.position;
        for _ in 0..2 {
            enemy.update(&ctx, &mut registry, DT);
        }
        assert_eq!(enemy.state, EnemyState::Pursue);
        assert_eq!(enemy.position, start);

        let mut attacked = false;
        for _ in 0..120 {
            enemy.update(&ctx, &mut registry, DT);
            if enemy.state == EnemyState::Attack {
                assert!(enemy.bearing_error(player) <= config.attack_half_angle);
                attacked = true;
                break;
            }
        }
        assert!(attacked);
    }

    #[test]
    fn test_does_not_see_behind() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let collision = CollisionConfig::default();
        let sector = room(&mut registry);
        let mut enemy = spawn(&mut registry, &config);

        let sectors = [&sector];
        let ctx = EnemyContext {
            player_position: Vec3::new(-5.0, 2.0, 0.0),
            sectors: &sectors,
            collision: &collision,
            config: &config,
        };
        enemy.update(&ctx, &mut registry, DT);
        assert_eq!(enemy.state, EnemyState::Idle);
    }

    #[test]
    fn test_damage_wounds_then_kills() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let mut enemy = spawn(&mut registry, &config);

        for _ in 0..config.max_health - 1 {
            let outcome = enemy.take_damage(1, enemy.position, Vec3::X, &mut registry, &config);
            assert_eq!(outcome, DamageOutcome::Wounded);
        }
        assert!(enemy.has_seen_player);
        assert_eq!(enemy.bullet_holes.len(), (config.max_health - 1) as usize);

        let outcome = enemy.take_damage(1, enemy.position, Vec3::X, &mut registry, &config);
        assert_eq!(outcome, DamageOutcome::Killed);
        assert_eq!(enemy.state, EnemyState::Dying);
        assert!(!registry.get(enemy.hurtbox).unwrap().enabled);

        let outcome = enemy.take_damage(1, enemy.position, Vec3::X, &mut registry, &config);
        assert_eq!(outcome, DamageOutcome::Ignored);
    }

    #[test]
    fn test_dying_reaches_dead() {
        let mut registry = RaycastRegistry::new();
        let config = EnemyConfig::default();
        let collision = CollisionConfig::default();
        let mut enemy = spawn(&mut registry, &config);
        enemy.take_damage(config.max_health, enemy.position, Vec3::X, &mut registry, &config);

        let sectors: [&Sector; 0] = [];
        let ctx = EnemyContext {
            player_position: Vec3::ZERO,
            sectors: &sectors,
            collision: &collision,
            config: &config,
        };
        let mut died = false;
        for _ in 0..120 {
            died |= enemy.update(&ctx, &mut registry, DT).died;
        }
        assert!(died);
        assert!(enemy.is_dead());
    }
}
