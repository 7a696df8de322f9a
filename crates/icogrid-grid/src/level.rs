//! Grid levels and the fixed-capacity store that owns them.

use icogrid_geom::Triangle;

/// Lifecycle of one grid level.
///
/// A level is born `Empty`, becomes `Bisected` when its triangles have been
/// split off the parent level but still lie on the parent's flat faces, and
/// reaches `Extended` — its final, stable state — once every vertex has been
/// pushed out onto the circumscribing sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    /// Not materialized; the slot holds no triangle buffer.
    Empty,
    /// Subdivided from the parent but not yet re-projected onto the sphere.
    Bisected,
    /// Re-projected onto the sphere; final for this level.
    Extended,
}

/// One refinement generation: a state tag plus an exclusively-owned
/// triangle buffer.
///
/// No triangle is ever shared or mutated across levels once its level is
/// `Extended`; downgrading past a level drops the buffer entirely.
#[derive(Debug, Clone)]
pub struct GridLevel {
    state: LevelState,
    triangles: Vec<Triangle>,
}

impl GridLevel {
    /// An unmaterialized slot.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: LevelState::Empty,
            triangles: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LevelState {
        self.state
    }

    /// The level's triangles (empty slice while `Empty`).
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles in this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the slot holds no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub(crate) fn triangles_mut(&mut self) -> &mut [Triangle] {
        &mut self.triangles
    }

    pub(crate) fn set_state(&mut self, state: LevelState) {
        self.state = state;
    }

    pub(crate) fn materialize(&mut self, triangles: Vec<Triangle>, state: LevelState) {
        self.triangles = triangles;
        self.state = state;
    }

    /// Drop the buffer and return the slot to `Empty`.
    pub(crate) fn clear(&mut self) {
        self.triangles = Vec::new();
        self.state = LevelState::Empty;
    }
}

/// A fixed-capacity, index-addressed collection of grid levels.
///
/// Capacity is `max_level + 1` slots including level 0; it never grows or
/// shrinks after construction. Only the refinement engine mutates slots;
/// renderers read them.
#[derive(Debug, Clone)]
pub struct GridStore {
    levels: Vec<GridLevel>,
}

impl GridStore {
    /// Create a store with slots for levels `0..=max_level`, all `Empty`.
    #[must_use]
    pub fn new(max_level: usize) -> Self {
        Self {
            levels: (0..=max_level).map(|_| GridLevel::empty()).collect(),
        }
    }

    /// The highest level index this store can materialize.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// Borrow a level slot.
    ///
    /// # Panics
    ///
    /// Panics if `index > max_level`.
    #[must_use]
    pub fn level(&self, index: usize) -> &GridLevel {
        &self.levels[index]
    }

    pub(crate) fn level_mut(&mut self, index: usize) -> &mut GridLevel {
        &mut self.levels[index]
    }
}
