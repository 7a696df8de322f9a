//! CPU-side mesh builders: grid levels, overlay lines, and the sphere shell.

use glam::DVec3;
use icogrid_geom::Triangle;

use crate::buffer::{GridVertex, LineVertex};

/// Scale applied to the sphere shell so it sits just off the grid surface
/// and does not z-fight with extended vertices.
const SHELL_SCALE: f64 = 1.01;

fn vec3(v: DVec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Flat-shaded vertices for a slice of grid triangles, three per face, each
/// carrying the face normal and the given color.
#[must_use]
pub fn grid_vertices(triangles: &[Triangle], color: [f32; 4]) -> Vec<GridVertex> {
    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for tri in triangles {
        let normal = vec3(tri.normal);
        for v in tri.vertices {
            vertices.push(GridVertex {
                position: vec3(v),
                normal,
                color,
            });
        }
    }
    vertices
}

/// Line-list vertices tracing every triangle's three edges.
#[must_use]
pub fn edge_lines(triangles: &[Triangle], color: [f32; 4]) -> Vec<LineVertex> {
    let mut vertices = Vec::with_capacity(triangles.len() * 6);
    for tri in triangles {
        for i in 0..3 {
            for v in [tri.vertices[i], tri.vertices[(i + 1) % 3]] {
                vertices.push(LineVertex {
                    position: vec3(v),
                    color,
                });
            }
        }
    }
    vertices
}

/// A ray from each face centroid along half its normal.
#[must_use]
pub fn normal_rays(triangles: &[Triangle], color: [f32; 4]) -> Vec<LineVertex> {
    let mut vertices = Vec::with_capacity(triangles.len() * 2);
    for tri in triangles {
        for p in [tri.centroid, tri.centroid + tri.normal / 2.0] {
            vertices.push(LineVertex {
                position: vec3(p),
                color,
            });
        }
    }
    vertices
}

/// A small axis-aligned cross at each face centroid.
#[must_use]
pub fn centroid_markers(triangles: &[Triangle], size: f64, color: [f32; 4]) -> Vec<LineVertex> {
    let half = size / 2.0;
    let arms = [DVec3::X * half, DVec3::Y * half, DVec3::Z * half];
    let mut vertices = Vec::with_capacity(triangles.len() * 6);
    for tri in triangles {
        for arm in arms {
            for p in [tri.centroid - arm, tri.centroid + arm] {
                vertices.push(LineVertex {
                    position: vec3(p),
                    color,
                });
            }
        }
    }
    vertices
}

/// X/Y/Z axis lines from the origin out to `extent`.
#[must_use]
pub fn axes_lines(extent: f64, color: [f32; 4]) -> Vec<LineVertex> {
    [DVec3::X, DVec3::Y, DVec3::Z]
        .into_iter()
        .flat_map(|axis| [DVec3::ZERO, axis * extent])
        .map(|p| LineVertex {
            position: vec3(p),
            color,
        })
        .collect()
}

/// Translucent shell around the grid: an icosphere scaled slightly past the
/// given radius, with vertex normals pointing radially outward.
///
/// Returns shared vertices plus a u32 triangle index list.
#[must_use]
pub fn sphere_shell(
    radius: f64,
    subdivisions: u32,
    color: [f32; 4],
) -> (Vec<GridVertex>, Vec<u32>) {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut positions: Vec<DVec3> = vec![
        DVec3::new(-1.0, t, 0.0),
        DVec3::new(1.0, t, 0.0),
        DVec3::new(-1.0, -t, 0.0),
        DVec3::new(1.0, -t, 0.0),
        DVec3::new(0.0, -1.0, t),
        DVec3::new(0.0, 1.0, t),
        DVec3::new(0.0, -1.0, -t),
        DVec3::new(0.0, 1.0, -t),
        DVec3::new(t, 0.0, -1.0),
        DVec3::new(t, 0.0, 1.0),
        DVec3::new(-t, 0.0, -1.0),
        DVec3::new(-t, 0.0, 1.0),
    ];
    for p in &mut positions {
        *p = p.normalize();
    }

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];

    for _ in 0..subdivisions {
        subdivide_shell(&mut positions, &mut indices);
    }

    let scale = radius * SHELL_SCALE;
    let vertices = positions
        .iter()
        .map(|p| GridVertex {
            position: vec3(*p * scale),
            normal: vec3(*p),
            color,
        })
        .collect();
    (vertices, indices)
}

/// Split each shell triangle into 4 via edge midpoints, re-normalized onto
/// the unit sphere, sharing midpoints through a cache.
fn subdivide_shell(positions: &mut Vec<DVec3>, indices: &mut Vec<u32>) {
    use std::collections::HashMap;

    let mut midpoint_cache: HashMap<(u32, u32), u32> = HashMap::new();
    let mut new_indices = Vec::with_capacity(indices.len() * 4);

    let get_midpoint =
        |a: u32, b: u32, pos: &mut Vec<DVec3>, cache: &mut HashMap<(u32, u32), u32>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            if let Some(&idx) = cache.get(&key) {
                return idx;
            }
            let mid = (pos[a as usize] + pos[b as usize]).normalize();
            let idx = pos.len() as u32;
            pos.push(mid);
            cache.insert(key, idx);
            idx
        };

    for tri in indices.chunks(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = get_midpoint(a, b, positions, &mut midpoint_cache);
        let bc = get_midpoint(b, c, positions, &mut midpoint_cache);
        let ca = get_midpoint(c, a, positions, &mut midpoint_cache);

        new_indices.extend_from_slice(&[a, ab, ca]);
        new_indices.extend_from_slice(&[b, bc, ab]);
        new_indices.extend_from_slice(&[c, ca, bc]);
        new_indices.extend_from_slice(&[ab, bc, ca]);
    }

    *indices = new_indices;
}
