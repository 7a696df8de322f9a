//! Geodesic grid refinement for the Icogrid viewer.
//!
//! A grid starts as the 20-face icosahedron (level 0) and is refined one
//! level at a time: each face is **bisected** into four children via its edge
//! midpoints, then the new vertices are **extended** radially onto the
//! circumscribing sphere. [`RefineEngine`] owns the stack of materialized
//! levels and the single piece of transient state (a level that has been
//! bisected but not yet extended), and layers an optional wall-clock
//! progressive-reveal counter on top for the renderer.

mod engine;
mod icosahedron;
mod level;
mod reveal;

pub use engine::{GridError, RefineEngine, RefineMode, RefineOutcome};
pub use icosahedron::{ICOSAHEDRON_FACES, build_icosahedron};
pub use level::{GridLevel, GridStore, LevelState};
pub use reveal::Reveal;
