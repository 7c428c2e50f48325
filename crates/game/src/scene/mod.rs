//! The scene: owner of all runtime state and the per-frame update.
//!
//! Frame order:
//!
//! 1. Consume the pending input and update the player (look, thrust,
//!    weapon, flashlight).
//! 2. Resolve the player's movement against the level, with enemy
//!    hurtboxes as extra walls.
//! 3. Resolve the hit-scan shot, if one was fired.
//! 4. Update enemies (sight, pursuit, strikes, hurtbox orientation) and
//!    apply their damage to the player.
//! 5. Remove dead enemies and their hurtboxes.
//! 6. Age decals.

mod config;
mod event;

pub use config::SceneConfig;
pub use event::SceneEvent;

use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use tracing::{debug, info};
use zerog_physics::raycast::everything;
use zerog_physics::{
    move_and_slide, EntityId, Frustum, PlaneOwner, RaycastHit, RaycastRegistry, Sector, SectorId,
    WallSegment,
};

use crate::decal::Decal;
use crate::enemy::{DamageOutcome, Enemy, EnemyContext};
use crate::input::PlayerInput;
use crate::level::{Level, LevelData, LevelError};
use crate::player::Player;
use crate::render::{sprite_angle, EnemySprite, RenderSink, ViewState};

pub struct Scene {
    /// Frames advanced so far.
    pub frame: u64,
    pub config: SceneConfig,
    registry: RaycastRegistry,
    level: Level,
    player: Player,
    enemies: SlotMap<EntityId, Enemy>,
    decals: Vec<Decal>,
    pending_input: PlayerInput,
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Build the level, then spawn the player and enemies from its spawn
    /// points.
    pub fn new(config: SceneConfig, data: &LevelData) -> Result<Self, LevelError> {
        let spawn = data.player_spawn().ok_or(LevelError::NoPlayerSpawn)?;

        let mut registry = RaycastRegistry::new();
        let level = Level::from_data(data, &mut registry)?;
        let player = Player::spawn(spawn.position, spawn.facing, &config.player);

        let mut scene = Self {
            frame: 0,
            config,
            registry,
            level,
            player,
            enemies: SlotMap::with_key(),
            decals: Vec::new(),
            pending_input: PlayerInput::default(),
            events: Vec::new(),
        };
        for spawn in data.enemy_spawns() {
            scene.spawn_enemy(spawn.position, spawn.facing);
        }

        info!(enemies = scene.enemies.len(), "scene ready");
        Ok(scene)
    }

    pub fn spawn_enemy(&mut self, position: Vec3, yaw: f32) -> EntityId {
        let registry = &mut self.registry;
        let config = &self.config.enemy;
        self.enemies
            .insert_with_key(|id| Enemy::spawn(id, position, yaw, registry, config))
    }

    /// Queue input for the next frame. Multiple submissions are merged.
    pub fn submit_input(&mut self, input: PlayerInput) {
        self.pending_input.merge(input);
    }

    /// Advance the simulation by one frame of `delta` seconds.
    pub fn advance_frame(&mut self, delta: f32) {
        let input = self.pending_input.consume();
        let actions = self.player.update(&input, &self.config.player, delta);

        if actions.flashlight_toggled {
            self.events.push(SceneEvent::FlashlightToggled {
                on: self.player.flashlight_on,
            });
        }
        if actions.reloaded {
            self.events.push(SceneEvent::Reloaded {
                clip: self.player.clip_ammo,
                reserve: self.player.reserve_ammo,
            });
        }

        self.move_player(delta);

        if actions.fired {
            self.fire_weapon(self.player.position, self.player.forward());
        }
        if actions.interacted {
            let target = self
                .registry
                .cast(
                    self.player.position,
                    self.player.forward(),
                    self.config.interact_range,
                    everything,
                )
                .map(|hit| hit.owner);
            self.events.push(SceneEvent::Interacted { target });
        }

        self.update_enemies(delta);
        self.remove_dead_enemies();

        self.decals.retain_mut(|decal| {
            decal.update(delta);
            !decal.is_expired()
        });

        self.frame += 1;
    }

    fn move_player(&mut self, delta: f32) {
        if self.player.is_dead {
            return;
        }

        let y = self.player.position.y;
        let hurtboxes: Vec<WallSegment> = self
            .enemies
            .values()
            .filter_map(|enemy| enemy.hurtbox_segment(&self.registry, y))
            .collect();

        move_and_slide(
            self.level.sector_refs(),
            &hurtboxes,
            &mut self.player.position,
            &mut self.player.velocity,
            delta,
            &self.config.collision,
        );
    }

    fn update_enemies(&mut self, delta: f32) {
        let sectors = self.level.sector_refs();
        let ctx = EnemyContext {
            player_position: self.player.position,
            sectors: &sectors,
            collision: &self.config.enemy_collision,
            config: &self.config.enemy,
        };

        let mut damage = 0;
        for (id, enemy) in self.enemies.iter_mut() {
            let update = enemy.update(&ctx, &mut self.registry, delta);
            if update.spotted_player {
                self.events.push(SceneEvent::EnemySpotted { entity: id });
            }
            damage += update.damage.unwrap_or(0);
        }

        if damage > 0 && !self.player.is_dead {
            let died = self.player.take_damage(damage);
            self.events.push(SceneEvent::PlayerDamaged {
                amount: damage,
                health: self.player.health,
            });
            if died {
                info!(frame = self.frame, "player died");
                self.events.push(SceneEvent::PlayerDied);
            }
        }
    }

    fn remove_dead_enemies(&mut self) {
        let dead: Vec<EntityId> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| enemy.is_dead())
            .map(|(id, _)| id)
            .collect();

        for id in dead {
            if let Some(enemy) = self.enemies.remove(id) {
                self.registry.remove(enemy.hurtbox);
                debug!(?id, "enemy removed");
                self.events.push(SceneEvent::EnemyRemoved { entity: id });
            }
        }
    }

    /// Cast a hit-scan shot and apply its effect: a bullet hole on level
    /// geometry, or damage to an enemy.
    pub fn fire_weapon(&mut self, origin: Vec3, direction: Vec3) -> Option<RaycastHit> {
        self.events.push(SceneEvent::Fired { origin, direction });

        let hit = self
            .registry
            .cast(origin, direction, self.config.fire_range, everything)?;

        match hit.owner {
            PlaneOwner::EnemyHurtbox { entity } => {
                if let Some(enemy) = self.enemies.get_mut(entity) {
                    let outcome = enemy.take_damage(
                        self.config.shot_damage,
                        hit.point,
                        hit.normal,
                        &mut self.registry,
                        &self.config.enemy,
                    );
                    match outcome {
                        DamageOutcome::Wounded => self.events.push(SceneEvent::EnemyHit {
                            entity,
                            health: enemy.health,
                        }),
                        DamageOutcome::Killed => {
                            self.events.push(SceneEvent::EnemyKilled { entity })
                        }
                        DamageOutcome::Ignored => {}
                    }
                }
            }
            owner => {
                self.decals
                    .push(Decal::new(owner, hit.point, hit.normal, self.config.decal_offset));
                if self.decals.len() > self.config.max_decals {
                    self.decals.remove(0);
                }
                self.events.push(SceneEvent::SurfaceHit {
                    owner,
                    point: hit.point,
                });
            }
        }

        Some(hit)
    }

    /// Sectors whose bounding volume may intersect the view frustum.
    pub fn query_visible_sectors(&self, view_projection: Mat4) -> Vec<SectorId> {
        let frustum = Frustum::from_view_projection(view_projection);
        self.level
            .sectors()
            .filter(|(_, sector)| sector.is_finalized() && frustum.is_inside(sector))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.player.view_projection(&self.config.camera)
    }

    /// Hand the visible scene to `sink`.
    pub fn render<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        let view_projection = self.view_projection();
        let frustum = Frustum::from_view_projection(view_projection);

        sink.begin_frame(&ViewState {
            position: self.player.position,
            forward: self.player.forward(),
            view_projection,
            flashlight_on: self.player.flashlight_on,
            flashlight_direction: self.player.flashlight_direction,
            weapon_frame: self.player.weapon.frame(),
            health: self.player.health,
            clip_ammo: self.player.clip_ammo,
            reserve_ammo: self.player.reserve_ammo,
        });

        for id in self.query_visible_sectors(view_projection) {
            if let Some(sector) = self.level.sector(id) {
                sink.draw_sector(id, sector);
            }
        }

        for (id, enemy) in &self.enemies {
            let Some(plane) = self.registry.get(enemy.hurtbox) else {
                continue;
            };
            if !frustum.contains_corners(&[plane.a, plane.b, plane.c, plane.d]) {
                continue;
            }
            let (angle_column, flip) =
                sprite_angle(enemy.position, enemy.forward(), self.player.position);
            sink.draw_enemy(&EnemySprite {
                id,
                position: enemy.position,
                frame: enemy.animation.frame(),
                angle_column,
                flip,
            });
            for decal in &enemy.bullet_holes {
                sink.draw_decal(decal);
            }
        }

        for decal in &self.decals {
            if frustum.contains_point(decal.position) {
                sink.draw_decal(decal);
            }
        }

        sink.end_frame();
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Edit a sector in place; see [`Level::edit_sector`].
    pub fn edit_sector(
        &mut self,
        id: SectorId,
        edit: impl FnOnce(&mut Sector),
    ) -> Result<(), LevelError> {
        self.level.edit_sector(id, &mut self.registry, edit)
    }

    pub fn rebuild_level(&mut self) -> Result<(), LevelError> {
        self.level.rebuild(&mut self.registry)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &Enemy)> {
        self.enemies.iter()
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn registry(&self) -> &RaycastRegistry {
        &self.registry
    }

    pub fn decals(&self) -> &[Decal] {
        &self.decals
    }
}
