//! Ear-clipping triangulation of simple polygons.
//!
//! Works for either winding: the polygon's signed area decides which turn
//! direction counts as convex. Emitted triangles keep the input winding.

use glam::Vec2;
use tracing::trace;

use crate::math::{point_in_triangle, signed_area, triangle_area, EPSILON};

use super::GeometryError;

/// Outcome of one scan over the remaining vertex loop.
enum Ear {
    /// A convex vertex whose triangle contains no other remaining vertex.
    Clip(usize),
    /// A collinear vertex that can be dropped without emitting a triangle.
    Degenerate(usize),
}

/// Triangulate a simple polygon by ear clipping.
///
/// Returns index triples into `points`. A polygon with N vertices and no
/// collinear runs produces exactly N-2 triangles whose areas sum to the
/// polygon area.
///
/// # Errors
///
/// - [`GeometryError::TooFewVertices`] for fewer than three points
/// - [`GeometryError::NonFinite`] if any coordinate is NaN or infinite
/// - [`GeometryError::ZeroArea`] if every vertex is collinear
/// - [`GeometryError::NoEar`] if the polygon is self-intersecting and no ear
///   can be found
pub fn triangulate(points: &[Vec2]) -> Result<Vec<[usize; 3]>, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewVertices { count: points.len() });
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    let area = signed_area(points);
    if area.abs() <= EPSILON {
        return Err(GeometryError::ZeroArea);
    }
    let orientation = area.signum();

    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);

    while remaining.len() > 3 {
        match find_ear(points, &remaining, orientation) {
            Some(Ear::Clip(i)) => {
                let len = remaining.len();
                triangles.push([
                    remaining[(i + len - 1) % len],
                    remaining[i],
                    remaining[(i + 1) % len],
                ]);
                remaining.remove(i);
            }
            Some(Ear::Degenerate(i)) => {
                trace!(vertex = remaining[i], "dropping collinear vertex");
                remaining.remove(i);
            }
            None => {
                return Err(GeometryError::NoEar {
                    remaining: remaining.len(),
                });
            }
        }
    }

    let [a, b, c] = [remaining[0], remaining[1], remaining[2]];
    if triangle_area(points[a], points[b], points[c]) > EPSILON {
        triangles.push([a, b, c]);
    }

    Ok(triangles)
}

/// Scan the loop from the start and return the first ear.
fn find_ear(points: &[Vec2], remaining: &[usize], orientation: f32) -> Option<Ear> {
    let len = remaining.len();
    let mut degenerate = None;

    for i in 0..len {
        let prev = remaining[(i + len - 1) % len];
        let cur = remaining[i];
        let next = remaining[(i + 1) % len];
        let (a, b, c) = (points[prev], points[cur], points[next]);

        let turn = (b - a).perp_dot(c - b) * orientation;
        let scale = (b - a).length() * (c - b).length();
        if turn.abs() <= EPSILON * scale.max(EPSILON) {
            degenerate.get_or_insert(i);
            continue;
        }
        if turn < 0.0 {
            // Reflex
            continue;
        }

        let blocked = remaining.iter().any(|&other| {
            if other == prev || other == cur || other == next {
                return false;
            }
            let p = points[other];
            // A vertex sitting exactly on one of the triangle's corners
            // (touching polygons) does not block the ear.
            if p == a || p == b || p == c {
                return false;
            }
            point_in_triangle(p, a, b, c)
        });

        if !blocked {
            return Some(Ear::Clip(i));
        }
    }

    degenerate.map(Ear::Degenerate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polygon_area;

    fn total_area(points: &[Vec2], triangles: &[[usize; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| triangle_area(points[t[0]], points[t[1]], points[t[2]]))
            .sum()
    }

    #[test]
    fn test_triangulate_square() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        let triangles = triangulate(&square).unwrap();
        assert_eq!(triangles.len(), 2);
        assert!((total_area(&square, &triangles) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangulate_concave_both_windings() {
        // L-shaped room
        let mut shape = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(6.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 6.0),
            Vec2::new(0.0, 6.0),
        ];
        for _ in 0..2 {
            let triangles = triangulate(&shape).unwrap();
            assert_eq!(triangles.len(), shape.len() - 2);
            assert!((total_area(&shape, &triangles) - polygon_area(&shape)).abs() < 1e-3);

            // Every triangle keeps the winding of the input
            let orientation = signed_area(&shape).signum();
            for t in &triangles {
                let tri = [shape[t[0]], shape[t[1]], shape[t[2]]];
                assert_eq!(signed_area(&tri).signum(), orientation);
            }
            shape.reverse();
        }
    }

    #[test]
    fn test_triangulate_collinear_run() {
        // Midpoint on the bottom edge adds no area
        let shape = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        let triangles = triangulate(&shape).unwrap();
        assert!(triangles.len() <= shape.len() - 2);
        assert!((total_area(&shape, &triangles) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangulate_rejects_bad_input() {
        assert!(matches!(
            triangulate(&[Vec2::ZERO, Vec2::X]),
            Err(GeometryError::TooFewVertices { count: 2 })
        ));
        assert!(matches!(
            triangulate(&[Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]),
            Err(GeometryError::ZeroArea)
        ));
        assert!(matches!(
            triangulate(&[Vec2::ZERO, Vec2::X, Vec2::new(f32::NAN, 1.0)]),
            Err(GeometryError::NonFinite)
        ));
    }

    #[test]
    fn test_triangulate_self_intersecting() {
        // Edge 1->2 crosses edge 3->4
        let crossed = [
            Vec2::new(0.0, 6.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(5.0, 4.0),
            Vec2::new(5.0, 2.0),
            Vec2::new(1.0, 3.0),
        ];
        assert_eq!(triangulate(&crossed), Err(GeometryError::NoEar { remaining: 4 }));
    }
}
