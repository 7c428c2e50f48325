//! Geometric primitives shared by the sector, raycast and movement modules.
//!
//! All 2D points live on the horizontal XZ plane: a world position
//! `(x, y, z)` maps to `Vec2::new(x, z)`.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

/// Tolerance for "is this direction parallel / is this length zero" tests.
pub const EPSILON: f32 = 1e-6;

/// Relative tolerance for the area-sum point-in-triangle test.
pub const AREA_TOLERANCE: f32 = 1e-5;

/// Project a world position onto the horizontal plane.
#[inline]
pub fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Intersect two parametric 2D segments.
///
/// Segment A runs from `a_origin` to `a_origin + a_direction`, segment B
/// likewise. Returns `(a_time, b_time)`, both in `[0, 1]`, or `None` when the
/// segments miss or are parallel.
pub fn segment_intersection(
    a_origin: Vec2,
    a_direction: Vec2,
    b_origin: Vec2,
    b_direction: Vec2,
) -> Option<(f32, f32)> {
    let cross = a_direction.perp_dot(b_direction);
    let scale = a_direction.length() * b_direction.length();
    if cross.abs() <= EPSILON * scale.max(EPSILON) {
        return None;
    }

    let b_minus_a = b_origin - a_origin;
    let a_time = b_minus_a.perp_dot(b_direction) / cross;
    let b_time = b_minus_a.perp_dot(a_direction) / cross;

    if !(0.0..=1.0).contains(&a_time) || !(0.0..=1.0).contains(&b_time) {
        return None;
    }

    Some((a_time, b_time))
}

/// 2D segment-segment test ("raycast2d").
///
/// Returns the hit time along segment A, or `None` if there is no hit.
#[inline]
pub fn raycast2d(
    a_origin: Vec2,
    a_direction: Vec2,
    b_origin: Vec2,
    b_direction: Vec2,
) -> Option<f32> {
    segment_intersection(a_origin, a_direction, b_origin, b_direction).map(|(a_time, _)| a_time)
}

/// Signed polygon area (shoelace). Positive for counter-clockwise loops.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Unsigned polygon area.
#[inline]
pub fn polygon_area(points: &[Vec2]) -> f32 {
    signed_area(points).abs()
}

/// Unsigned triangle area.
#[inline]
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    ((b - a).perp_dot(c - a) * 0.5).abs()
}

/// Area-sum containment test.
///
/// `p` is inside (or on the boundary of) `abc` iff the three sub-triangle
/// areas add up to the full area, within [`AREA_TOLERANCE`] of the larger of
/// the two sums.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let full = triangle_area(a, b, c);
    let parts = triangle_area(p, b, c) + triangle_area(a, p, c) + triangle_area(a, b, p);
    (parts - full).abs() <= AREA_TOLERANCE * full.max(parts).max(EPSILON)
}

/// Crossing-number test against a closed polygon of either winding.
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Distance from `p` to the segment `a..b`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON * EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Minimum distance between segments `p0..p1` and `q0..q1`.
pub fn segment_distance(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> f32 {
    if segment_intersection(p0, p1 - p0, q0, q1 - q0).is_some() {
        return 0.0;
    }
    point_segment_distance(p0, q0, q1)
        .min(point_segment_distance(p1, q0, q1))
        .min(point_segment_distance(q0, p0, p1))
        .min(point_segment_distance(q1, p0, p1))
}

/// Normalize an angle difference to `[-PI, PI]`. Non-finite input yields NaN.
#[inline]
pub fn normalize_angle_diff(angle: f32) -> f32 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Yaw (radians) of a horizontal direction, measured from +X toward +Z.
#[inline]
pub fn yaw_of(direction: Vec3) -> f32 {
    direction.z.atan2(direction.x)
}

/// Horizontal unit vector for a yaw angle.
#[inline]
pub fn yaw_direction(yaw: f32) -> Vec3 {
    let (sin, cos) = yaw.sin_cos();
    Vec3::new(cos, 0.0, sin)
}
