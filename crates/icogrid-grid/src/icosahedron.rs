//! The base icosahedron: 12 fixed vertices, 20 fixed faces.

use glam::DVec3;
use icogrid_geom::{Triangle, distance};

use crate::engine::GridError;

/// Golden ratio, the characteristic coordinate of an icosahedron of side 2.
const PHI: f64 = 1.618_033_988_749_895;

/// The 12 vertices: cyclic permutations of (±1, ±φ, 0).
const ICOSAHEDRON_VERTICES: [DVec3; 12] = [
    DVec3::new(-1.0, PHI, 0.0),
    DVec3::new(-PHI, 0.0, 1.0),
    DVec3::new(0.0, -1.0, PHI),
    DVec3::new(PHI, 0.0, 1.0),
    DVec3::new(1.0, PHI, 0.0),
    DVec3::new(0.0, 1.0, PHI),
    DVec3::new(-PHI, 0.0, -1.0),
    DVec3::new(-1.0, -PHI, 0.0),
    DVec3::new(1.0, -PHI, 0.0),
    DVec3::new(PHI, 0.0, -1.0),
    DVec3::new(0.0, 1.0, -PHI),
    DVec3::new(0.0, -1.0, -PHI),
];

/// The 20 faces as index triples into the vertex table.
pub const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 1, 5],
    [1, 2, 5],
    [2, 3, 5],
    [3, 4, 5],
    [4, 0, 5],
    [0, 1, 6],
    [1, 2, 7],
    [2, 3, 8],
    [3, 4, 9],
    [4, 0, 10],
    [7, 6, 1],
    [8, 7, 2],
    [9, 8, 3],
    [10, 9, 4],
    [6, 10, 0],
    [6, 7, 11],
    [7, 8, 11],
    [8, 9, 11],
    [9, 10, 11],
    [10, 6, 11],
];

/// Build the 20 base triangles and the circumscribing radius.
///
/// The radius is the origin-distance of the first vertex of the first face;
/// all 12 vertices are equidistant from the origin by construction, so any
/// one pins the sphere every later level is extended onto. This is the only
/// place the radius is established.
pub fn build_icosahedron() -> Result<(Vec<Triangle>, f64), GridError> {
    let mut triangles = Vec::new();
    triangles
        .try_reserve_exact(ICOSAHEDRON_FACES.len())
        .map_err(|_| GridError::TriangleAlloc {
            triangles: ICOSAHEDRON_FACES.len(),
        })?;

    for face in ICOSAHEDRON_FACES {
        triangles.push(Triangle::new([
            ICOSAHEDRON_VERTICES[face[0]],
            ICOSAHEDRON_VERTICES[face[1]],
            ICOSAHEDRON_VERTICES[face[2]],
        ]));
    }

    let radius = distance(DVec3::ZERO, triangles[0].vertices[0]);
    Ok((triangles, radius))
}
