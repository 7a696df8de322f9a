//! The triangle record stored in every grid level.

use glam::DVec3;

use crate::kernel::{edge_midpoints, outward_normal};

/// One face of a geodesic grid: three ordered vertices, a unit normal
/// pointing away from the origin, and the face centroid.
///
/// Vertex order is significant — the refinement engine pairs corners with
/// edge midpoints by index — but the normal is winding-independent (see
/// [`outward_normal`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three corners, in insertion order.
    pub vertices: [DVec3; 3],
    /// Unit normal, oriented away from the origin.
    pub normal: DVec3,
    /// Face centroid.
    pub centroid: DVec3,
}

impl Triangle {
    /// Build a triangle from its corners, computing normal and centroid.
    #[must_use]
    pub fn new(vertices: [DVec3; 3]) -> Self {
        let midpoints = edge_midpoints(&vertices);
        let (normal, centroid) = outward_normal(&vertices, &midpoints);
        Self {
            vertices,
            normal,
            centroid,
        }
    }

    /// Recompute normal and centroid after the vertices have been moved
    /// (the extension pass rescales vertices in place).
    pub fn recompute(&mut self) {
        let midpoints = edge_midpoints(&self.vertices);
        let (normal, centroid) = outward_normal(&self.vertices, &midpoints);
        self.normal = normal;
        self.centroid = centroid;
    }

    /// Midpoints of the three edges, in edge order v0–v1, v1–v2, v2–v0.
    #[must_use]
    pub fn edge_midpoints(&self) -> [DVec3; 3] {
        edge_midpoints(&self.vertices)
    }
}
