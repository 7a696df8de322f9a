//! Pure triangle geometry for the Icogrid viewer.
//!
//! Everything here operates on `f64` vectors with no shared state: distances,
//! edge midpoints, centroids, and origin-outward unit normals, plus the
//! [`Triangle`] record that the grid crates build their meshes from.

mod kernel;
mod triangle;

pub use kernel::{centroid, distance, edge_midpoints, outward_normal};
pub use triangle::Triangle;
