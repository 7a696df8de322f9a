//! Scalar and vector primitives shared by the icosahedron builder and the
//! refinement engine.

use glam::DVec3;

/// Euclidean distance between two points.
#[inline]
#[must_use]
pub fn distance(p1: DVec3, p2: DVec3) -> f64 {
    (p2 - p1).length()
}

/// Midpoint of each edge of a triangle, in edge order v0–v1, v1–v2, v2–v0.
///
/// The ordering matters: the refinement engine pairs corners with these
/// midpoints by index when it splits a face, so edges of sibling triangles
/// line up with their neighbors.
#[inline]
#[must_use]
pub fn edge_midpoints(vertices: &[DVec3; 3]) -> [DVec3; 3] {
    [
        (vertices[0] + vertices[1]) / 2.0,
        (vertices[1] + vertices[2]) / 2.0,
        (vertices[2] + vertices[0]) / 2.0,
    ]
}

/// Centroid of a triangle, computed as the mean of its three edge midpoints.
///
/// Numerically identical to the mean of the three vertices; the midpoints are
/// taken as input because every caller has already computed them.
#[inline]
#[must_use]
pub fn centroid(midpoints: &[DVec3; 3]) -> DVec3 {
    (midpoints[0] + midpoints[1] + midpoints[2]) / 3.0
}

/// Unit normal of a triangle, oriented away from the origin, plus the
/// centroid the orientation test used.
///
/// The raw normal is `(v0 - v2) × (v1 - v2)`, normalized. Orientation is then
/// fixed independently of vertex winding: if stepping from the centroid along
/// the normal moves *toward* the origin, the normal is flipped. This keeps
/// every face normal pointing off the sphere no matter which order the face
/// table lists its corners in.
///
/// Degenerate (zero-area) triangles produce a NaN normal; callers never build
/// them (every face comes from the icosahedron table or a midpoint split).
#[must_use]
pub fn outward_normal(vertices: &[DVec3; 3], midpoints: &[DVec3; 3]) -> (DVec3, DVec3) {
    let a = vertices[0] - vertices[2];
    let b = vertices[1] - vertices[2];
    let c = centroid(midpoints);

    let mut n = a.cross(b).normalize();
    if distance(DVec3::ZERO, c + n) < distance(DVec3::ZERO, c) {
        n = -n;
    }
    (n, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_distance_axis_aligned() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(1.0, 2.0, 8.0);
        assert!((distance(a, b) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = DVec3::new(-2.0, 0.5, 4.0);
        let b = DVec3::new(3.0, -1.0, 0.25);
        assert!((distance(a, b) - distance(b, a)).abs() < EPSILON);
    }

    #[test]
    fn test_edge_midpoints_order() {
        let tri = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
        ];
        let m = edge_midpoints(&tri);
        assert!((m[0] - DVec3::new(1.0, 0.0, 0.0)).length() < EPSILON);
        assert!((m[1] - DVec3::new(1.0, 1.0, 0.0)).length() < EPSILON);
        assert!((m[2] - DVec3::new(0.0, 1.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_centroid_matches_vertex_mean() {
        let tri = [
            DVec3::new(1.0, 0.0, -1.0),
            DVec3::new(3.0, 2.0, 5.0),
            DVec3::new(-1.0, 4.0, 2.0),
        ];
        let from_midpoints = centroid(&edge_midpoints(&tri));
        let from_vertices = (tri[0] + tri[1] + tri[2]) / 3.0;
        assert!((from_midpoints - from_vertices).length() < EPSILON);
    }

    #[test]
    fn test_normal_is_unit_length() {
        let tri = [
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(2.0, 1.0, 1.0),
            DVec3::new(1.0, 2.0, 1.0),
        ];
        let (n, _) = outward_normal(&tri, &edge_midpoints(&tri));
        assert!((n.length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_normal_points_away_from_origin() {
        // A face floating off to +X; the outward direction is +X regardless
        // of which winding we hand in.
        let ccw = [
            DVec3::new(5.0, -1.0, -1.0),
            DVec3::new(5.0, 1.0, -1.0),
            DVec3::new(5.0, 0.0, 1.0),
        ];
        let cw = [ccw[1], ccw[0], ccw[2]];

        for tri in [ccw, cw] {
            let m = edge_midpoints(&tri);
            let (n, c) = outward_normal(&tri, &m);
            assert!(
                distance(DVec3::ZERO, c + n) > distance(DVec3::ZERO, c),
                "normal {n:?} points inward for centroid {c:?}"
            );
            assert!(n.x > 0.9, "expected +X outward normal, got {n:?}");
        }
    }

    #[test]
    fn test_outward_normal_returns_centroid() {
        let tri = [
            DVec3::new(0.0, 0.0, 3.0),
            DVec3::new(1.0, 0.0, 3.0),
            DVec3::new(0.0, 1.0, 3.0),
        ];
        let m = edge_midpoints(&tri);
        let (_, c) = outward_normal(&tri, &m);
        assert!((c - centroid(&m)).length() < EPSILON);
    }
}
