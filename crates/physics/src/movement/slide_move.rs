//! The move-and-slide resolver.

use glam::{Vec2, Vec3};
use tracing::trace;

use crate::math::xz;
use crate::sector::Sector;

use super::config::CollisionConfig;
use super::obstacle::WallSegment;

/// How a [`move_and_slide`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    /// Velocity was zero; nothing moved.
    Stationary,
    /// Moved the full displacement without touching anything.
    Clear,
    /// Moved after sliding along `collisions` surfaces.
    Slid { collisions: u32 },
    /// The attempt budget ran out while still colliding; the horizontal
    /// move was cancelled.
    Exhausted,
}

/// Clip velocity against a surface normal.
///
/// Removes the component of velocity going into the surface. An
/// `overbounce` above 1.0 pushes slightly away from it.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);

    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };

    velocity - normal * adjusted_backoff
}

/// Move an entity by `velocity * delta`, sliding along sector surfaces and
/// `extra_walls`.
///
/// 1. Gathers sectors whose padded bounds contain `position`.
/// 2. Clips vertical motion against the floor and ceiling of every nearby
///    sector whose footprint contains the entity.
/// 3. Repeatedly sweeps the horizontal motion against all walls. Each hit
///    removes the into-wall component from both the displacement and the
///    velocity, closes the remaining gap, and restarts the pass.
/// 4. Applies the displacement.
///
/// `velocity` is updated to reflect clipped components.
pub fn move_and_slide<'a, I>(
    sectors: I,
    extra_walls: &[WallSegment],
    position: &mut Vec3,
    velocity: &mut Vec3,
    delta: f32,
    config: &CollisionConfig,
) -> SlideOutcome
where
    I: IntoIterator<Item = &'a Sector>,
{
    if *velocity == Vec3::ZERO {
        return SlideOutcome::Stationary;
    }

    let mut actual = *velocity * delta;
    let origin = xz(*position);

    let nearby: Vec<&Sector> = sectors
        .into_iter()
        .filter(|s| s.is_finalized() && s.is_near(*position, config.sector_padding))
        .collect();

    let mut collisions =
        clip_floor_and_ceiling(&nearby, origin, *position, velocity, &mut actual, config);

    let walls: Vec<WallSegment> = nearby
        .iter()
        .flat_map(|s| s.wall_segments())
        .chain(extra_walls.iter().copied())
        .collect();

    let mut attempts = 0;
    let mut colliding = true;
    while colliding && attempts < config.max_attempts {
        colliding = false;
        attempts += 1;

        let motion = xz(actual);
        if motion == Vec2::ZERO {
            break;
        }

        for wall in &walls {
            let Some(contact) = wall.sweep(origin, motion, config.radius) else {
                continue;
            };

            *velocity = clip_velocity(*velocity, contact.normal, 1.0);
            actual = clip_velocity(actual, contact.normal, 1.0);

            // Close the gap, leaving `radius + skin` to the wall line
            let gap = (contact.distance - config.radius - config.skin).max(0.0);
            actual -= contact.normal * gap;

            collisions += 1;
            colliding = true;
            break;
        }
    }

    if colliding {
        trace!(attempts, "slide budget exhausted, cancelling horizontal move");
        actual.x = 0.0;
        actual.z = 0.0;
        *position += actual;
        return SlideOutcome::Exhausted;
    }

    *position += actual;

    if collisions == 0 {
        SlideOutcome::Clear
    } else {
        SlideOutcome::Slid { collisions }
    }
}

/// Stop vertical motion at the floor/ceiling of sectors containing the
/// entity. Returns the number of surfaces clipped.
fn clip_floor_and_ceiling(
    nearby: &[&Sector],
    origin: Vec2,
    position: Vec3,
    velocity: &mut Vec3,
    actual: &mut Vec3,
    config: &CollisionConfig,
) -> u32 {
    let mut clipped = 0;
    let clearance = config.vertical_clearance;

    for sector in nearby.iter().filter(|s| s.contains_point(origin)) {
        let predicted_y = position.y + actual.y;

        if actual.y > 0.0 && predicted_y + clearance >= sector.ceiling_y {
            velocity.y = 0.0;
            actual.y = (sector.ceiling_y - clearance - config.skin - position.y).max(0.0);
            clipped += 1;
        } else if actual.y < 0.0 && predicted_y - clearance <= sector.floor_y {
            velocity.y = 0.0;
            actual.y = (sector.floor_y + clearance + config.skin - position.y).min(0.0);
            clipped += 1;
        }
    }

    clipped
}
