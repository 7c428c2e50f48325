//! Zerog - headless driver
//!
//! Loads a level (built-in or from a file), then runs the scene at a fixed
//! tick rate under scripted input, logging scene events and per-frame render
//! statistics.
//!
//! Set `RUST_LOG` to adjust verbosity; `zerog=debug` is always enabled.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zerog_game::input::MovementAxes;
use zerog_game::level::generate_test_level;
use zerog_game::render::{EnemySprite, ViewState};
use zerog_game::{Decal, LevelData, PlayerInput, RenderSink, Scene, SceneConfig, SceneEvent};
use zerog_physics::{Sector, SectorId};

#[derive(Parser, Debug)]
#[command(version, about = "Headless zerog scene runner")]
struct Options {
    /// Scene configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level file (bincode); the built-in test level when omitted
    #[arg(long)]
    level: Option<PathBuf>,

    /// Write the loaded level to this path before running
    #[arg(long)]
    export_level: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Run ticks back to back without sleeping
    #[arg(long)]
    unpaced: bool,
}

/// Scripted input: drifts forward while sweeping the view, fires in bursts
/// and reloads when the magazine runs dry.
struct Autopilot {
    frame: u64,
}

impl Autopilot {
    fn new() -> Self {
        Self { frame: 0 }
    }

    fn next_input(&mut self, scene: &Scene) -> PlayerInput {
        let frame = self.frame;
        self.frame += 1;

        let phase = (frame / 120) % 4;
        let movement = match phase {
            0 => MovementAxes::from_keys(true, false, false, false, false, false),
            1 => MovementAxes::from_keys(false, false, true, false, true, false),
            2 => MovementAxes::from_keys(false, true, false, false, false, false),
            _ => MovementAxes::from_keys(false, false, false, true, false, true),
        };

        let mut input = PlayerInput {
            movement,
            look_delta: Vec2::new(((frame as f32) * 0.05).sin() * 4.0, 0.0),
            ..Default::default()
        };

        let player = scene.player();
        input.actions.fire = frame % 30 == 0 && player.clip_ammo > 0;
        input.actions.reload = player.clip_ammo == 0;
        input.actions.toggle_flashlight = frame % 300 == 299;
        input.actions.interact = frame % 240 == 0;
        input
    }
}

/// Render sink that only counts what it is given.
#[derive(Debug, Default)]
struct StatsSink {
    sectors: usize,
    triangles: usize,
    enemies: usize,
    decals: usize,
}

impl RenderSink for StatsSink {
    fn begin_frame(&mut self, view: &ViewState) {
        *self = Self::default();
        trace!(
            position = %view.position,
            health = view.health,
            ammo = view.clip_ammo,
            "begin frame"
        );
    }

    fn draw_sector(&mut self, _id: SectorId, sector: &Sector) {
        self.sectors += 1;
        self.triangles += sector.mesh().triangle_count();
    }

    fn draw_enemy(&mut self, _sprite: &EnemySprite) {
        self.enemies += 1;
    }

    fn draw_decal(&mut self, _decal: &Decal) {
        self.decals += 1;
    }

    fn end_frame(&mut self) {
        trace!(
            sectors = self.sectors,
            triangles = self.triangles,
            enemies = self.enemies,
            decals = self.decals,
            "end frame"
        );
    }
}

fn load_config(options: &Options) -> Result<SceneConfig> {
    let Some(path) = &options.config else {
        return Ok(SceneConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

fn load_level(options: &Options) -> Result<LevelData> {
    match &options.level {
        Some(path) => LevelData::load(path)
            .with_context(|| format!("loading level {}", path.display())),
        None => Ok(generate_test_level()),
    }
}

fn log_event(frame: u64, event: &SceneEvent) {
    match event {
        SceneEvent::PlayerDied => warn!(frame, "player died"),
        SceneEvent::EnemyKilled { entity } => info!(frame, ?entity, "enemy killed"),
        other => debug!(frame, event = ?other, "scene event"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("zerog=debug".parse()?))
        .init();

    let options = Options::parse();
    let config = load_config(&options)?;
    let level = load_level(&options)?;

    if let Some(path) = &options.export_level {
        level
            .save(path)
            .with_context(|| format!("exporting level to {}", path.display()))?;
        info!(path = %path.display(), "level exported");
    }

    let mut scene = Scene::new(config, &level).context("building scene")?;
    let delta = scene.config.delta_time();
    let tick = Duration::from_secs_f32(delta);

    info!(frames = options.frames, tick_rate = scene.config.tick_rate, "starting");

    let mut autopilot = Autopilot::new();
    let mut sink = StatsSink::default();
    let mut next_frame = Instant::now();

    for _ in 0..options.frames {
        let input = autopilot.next_input(&scene);
        scene.submit_input(input);
        scene.advance_frame(delta);
        scene.render(&mut sink);

        for event in scene.drain_events() {
            log_event(scene.frame, &event);
        }

        if scene.player().is_dead {
            break;
        }

        if !options.unpaced {
            next_frame += tick;
            let now = Instant::now();
            if next_frame > now {
                thread::sleep(next_frame - now);
            } else {
                // Fell behind; don't try to catch up
                next_frame = now;
            }
        }
    }

    let player = scene.player();
    info!(
        frames = scene.frame,
        health = player.health,
        ammo = player.clip_ammo + player.reserve_ammo,
        enemies_left = scene.enemies().count(),
        "finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = Options::try_parse_from(["zerog"]).unwrap();
        assert_eq!(options.frames, 600);
        assert!(!options.unpaced);
        assert!(options.level.is_none());
    }

    #[test]
    fn test_options_flags() {
        let options = Options::try_parse_from([
            "zerog",
            "--level",
            "maps/hall.bin",
            "--frames",
            "30",
            "--unpaced",
        ])
        .unwrap();
        assert_eq!(options.level, Some(PathBuf::from("maps/hall.bin")));
        assert_eq!(options.frames, 30);
        assert!(options.unpaced);

        assert!(Options::try_parse_from(["zerog", "--frames", "many"]).is_err());
        assert!(Options::try_parse_from(["zerog", "--bogus"]).is_err());
    }
}
