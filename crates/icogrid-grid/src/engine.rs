//! The refinement engine: owns the grid store, the active level, and the
//! bisect/extend state machine.

use glam::DVec3;
use icogrid_geom::{Triangle, distance};

use crate::icosahedron::build_icosahedron;
use crate::level::{GridStore, LevelState};
use crate::reveal::Reveal;

/// Errors the engine can produce.
///
/// Out-of-bounds refine/downgrid requests are not errors — they are silent
/// rejections (see [`RefineOutcome::Rejected`]). The only failure the engine
/// cannot absorb is running out of memory for a triangle buffer, and callers
/// are expected to treat that as fatal.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Could not allocate a triangle buffer.
    #[error("cannot allocate triangle buffer for {triangles} triangles")]
    TriangleAlloc {
        /// Requested buffer size in triangles.
        triangles: usize,
    },
}

/// How a single [`RefineEngine::refine`] call advances the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefineMode {
    /// One call performs one phase — bisect, then on the next call extend —
    /// leaving the flat, bisected intermediate visible in between.
    #[default]
    TwoStep,
    /// One call performs bisect and extend atomically; no intermediate is
    /// ever observable.
    OneStep,
}

impl RefineMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::TwoStep => Self::OneStep,
            Self::OneStep => Self::TwoStep,
        }
    }
}

/// What an accepted or rejected [`RefineEngine::refine`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOutcome {
    /// A new level was bisected off its parent and is now the flat
    /// intermediate (2-step mode, first phase).
    Bisected {
        /// The level that was bisected.
        level: usize,
    },
    /// The bisected level was extended onto the sphere (2-step mode, second
    /// phase, or the forced completion after a mode switch at max level).
    Extended {
        /// The level that was extended.
        level: usize,
    },
    /// A new level was bisected and extended in one call (1-step mode).
    Refined {
        /// The level that was produced.
        level: usize,
    },
    /// Nothing changed: already at the configured ceiling, or a reveal
    /// animation is still in flight.
    Rejected,
}

/// Owns the grid store, the active level index, the refine mode, and the
/// optional progressive-reveal counter.
///
/// All operations run to completion synchronously; the engine is built for
/// a single-threaded, event-driven caller that alternates discrete
/// operations with render reads.
#[derive(Debug, Clone)]
pub struct RefineEngine {
    store: GridStore,
    active: usize,
    radius: f64,
    mode: RefineMode,
    reveal_enabled: bool,
    reveal: Option<Reveal>,
}

impl RefineEngine {
    /// Build an engine whose level 0 is the base icosahedron, with room for
    /// levels `0..=max_level`.
    pub fn new(max_level: usize) -> Result<Self, GridError> {
        let (triangles, radius) = build_icosahedron()?;
        let mut store = GridStore::new(max_level);
        store
            .level_mut(0)
            .materialize(triangles, LevelState::Extended);
        Ok(Self {
            store,
            active: 0,
            radius,
            mode: RefineMode::default(),
            reveal_enabled: true,
            reveal: None,
        })
    }

    /// The level store, for read-only rendering access.
    #[must_use]
    pub fn store(&self) -> &GridStore {
        &self.store
    }

    /// Index of the currently-active level.
    #[must_use]
    pub fn active_level(&self) -> usize {
        self.active
    }

    /// State of the currently-active level.
    #[must_use]
    pub fn active_state(&self) -> LevelState {
        self.store.level(self.active).state()
    }

    /// The circumscribing sphere radius, fixed at construction.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Current refine mode.
    #[must_use]
    pub fn mode(&self) -> RefineMode {
        self.mode
    }

    /// Switch refine mode. Any pending bisected intermediate is left in
    /// place; the next [`refine`](Self::refine) call completes it first.
    pub fn set_mode(&mut self, mode: RefineMode) {
        self.mode = mode;
    }

    /// Whether accepted refine steps start a progressive reveal.
    #[must_use]
    pub fn reveal_enabled(&self) -> bool {
        self.reveal_enabled
    }

    /// Enable or disable the progressive reveal for future refine steps.
    pub fn set_reveal_enabled(&mut self, enabled: bool) {
        self.reveal_enabled = enabled;
    }

    /// The in-flight reveal, if any.
    #[must_use]
    pub fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    /// Advance the reveal by `dt` seconds of wall-clock time. Returns `true`
    /// if a reveal completed during this tick.
    pub fn tick(&mut self, dt: f64) -> bool {
        if let Some(reveal) = &mut self.reveal
            && reveal.advance(dt)
        {
            self.reveal = None;
            return true;
        }
        false
    }

    /// Go one level finer.
    ///
    /// Rejected while a reveal is in flight and at the configured ceiling.
    /// In 2-step mode each call performs exactly one phase; in 1-step mode
    /// one call produces a finished level. If the mode was switched to
    /// 1-step while a level sat in the bisected intermediate, finishing
    /// that pending extend takes priority over starting new work — the call
    /// completes it and then runs the normal 1-step cycle for the next
    /// level (or stops, if already at the ceiling).
    pub fn refine(&mut self) -> Result<RefineOutcome, GridError> {
        if self.reveal.is_some() {
            return Ok(RefineOutcome::Rejected);
        }

        let pending = self.active_state() == LevelState::Bisected;
        let outcome = match self.mode {
            RefineMode::TwoStep => {
                if pending {
                    self.extend(self.active);
                    RefineOutcome::Extended { level: self.active }
                } else if self.active == self.store.max_level() {
                    RefineOutcome::Rejected
                } else {
                    let target = self.active + 1;
                    self.bisect(target)?;
                    self.active = target;
                    RefineOutcome::Bisected { level: target }
                }
            }
            RefineMode::OneStep => {
                if pending {
                    self.extend(self.active);
                    if self.active == self.store.max_level() {
                        RefineOutcome::Extended { level: self.active }
                    } else {
                        let target = self.active + 1;
                        self.bisect(target)?;
                        self.extend(target);
                        self.active = target;
                        RefineOutcome::Refined { level: target }
                    }
                } else if self.active == self.store.max_level() {
                    RefineOutcome::Rejected
                } else {
                    let target = self.active + 1;
                    self.bisect(target)?;
                    self.extend(target);
                    self.active = target;
                    RefineOutcome::Refined { level: target }
                }
            }
        };

        if self.reveal_enabled && outcome != RefineOutcome::Rejected {
            self.reveal = Some(Reveal::new(self.store.level(self.active).len()));
        }
        Ok(outcome)
    }

    /// Go one level coarser: cancel any in-flight reveal, deallocate the
    /// active level's buffer, and drop back to the parent. Returns `false`
    /// (unchanged state) at level 0.
    pub fn downgrid(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.reveal = None;
        self.store.level_mut(self.active).clear();
        self.active -= 1;
        true
    }

    /// Triangles of the active level the renderer should currently show —
    /// the full level, or the revealed prefix while a reveal is in flight.
    #[must_use]
    pub fn visible_triangles(&self) -> &[Triangle] {
        let triangles = self.store.level(self.active).triangles();
        match &self.reveal {
            Some(reveal) => &triangles[..reveal.visible().min(triangles.len())],
            None => triangles,
        }
    }

    /// The previous level's full triangle buffer, shown beneath the partial
    /// new level during a reveal. `None` at level 0.
    #[must_use]
    pub fn previous_triangles(&self) -> Option<&[Triangle]> {
        (self.active > 0).then(|| self.store.level(self.active - 1).triangles())
    }

    /// Split every parent triangle into 4 children via its edge midpoints.
    ///
    /// Child ordering per parent: one triangle per corner, pairing the
    /// corner with the midpoints of its two incident edges, then the
    /// central midpoint triangle. Normals and centroids are computed for
    /// the flat geometry; they only become sphere-accurate after
    /// [`extend`](Self::extend).
    fn bisect(&mut self, target: usize) -> Result<(), GridError> {
        let parent = self.store.level(target - 1);
        let count = parent.len() * 4;
        let mut children = Vec::new();
        children
            .try_reserve_exact(count)
            .map_err(|_| GridError::TriangleAlloc { triangles: count })?;

        for tri in parent.triangles() {
            let [v0, v1, v2] = tri.vertices;
            let [m0, m1, m2] = tri.edge_midpoints();
            children.push(Triangle::new([v0, m0, m2]));
            children.push(Triangle::new([m0, v1, m1]));
            children.push(Triangle::new([m2, m1, v2]));
            children.push(Triangle::new([m0, m1, m2]));
        }

        self.store
            .level_mut(target)
            .materialize(children, LevelState::Bisected);
        Ok(())
    }

    /// Push every vertex not already on the sphere radially out to `radius`
    /// and refresh normals/centroids.
    fn extend(&mut self, target: usize) {
        let radius = self.radius;
        let level = self.store.level_mut(target);
        for tri in level.triangles_mut() {
            for v in &mut tri.vertices {
                let d = distance(DVec3::ZERO, *v);
                if d != radius {
                    *v *= radius / d;
                }
            }
            tri.recompute();
        }
        level.set_state(LevelState::Extended);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REL_TOLERANCE: f64 = 1e-9;

    fn engine() -> RefineEngine {
        let mut engine = RefineEngine::new(5).unwrap();
        // Most tests exercise the state machine directly; reveal pacing has
        // its own tests.
        engine.set_reveal_enabled(false);
        engine
    }

    fn assert_all_on_sphere(engine: &RefineEngine, level: usize) {
        let radius = engine.radius();
        for tri in engine.store().level(level).triangles() {
            for v in &tri.vertices {
                let d = distance(DVec3::ZERO, *v);
                assert!(
                    ((d - radius) / radius).abs() < REL_TOLERANCE,
                    "level {level} vertex {v:?} at distance {d}, radius {radius}"
                );
            }
        }
    }

    fn assert_normals_unit_and_outward(engine: &RefineEngine, level: usize) {
        for tri in engine.store().level(level).triangles() {
            assert!((tri.normal.length() - 1.0).abs() < REL_TOLERANCE);
            assert!(
                distance(DVec3::ZERO, tri.centroid + tri.normal)
                    > distance(DVec3::ZERO, tri.centroid),
                "inward normal at level {level}"
            );
        }
    }

    #[test]
    fn test_base_icosahedron_scenario() {
        let engine = engine();
        assert_eq!(engine.active_level(), 0);
        assert_eq!(engine.active_state(), LevelState::Extended);
        assert_eq!(engine.store().level(0).len(), 20);
        assert_all_on_sphere(&engine, 0);
        assert_normals_unit_and_outward(&engine, 0);
    }

    #[test]
    fn test_two_step_bisect_scenario() {
        let mut engine = engine();
        let outcome = engine.refine().unwrap();
        assert_eq!(outcome, RefineOutcome::Bisected { level: 1 });
        assert_eq!(engine.active_level(), 1);
        assert_eq!(engine.active_state(), LevelState::Bisected);
        assert_eq!(engine.store().level(1).len(), 80);

        // Edge midpoints of a flat face sit strictly inside the sphere.
        let radius = engine.radius();
        let off_sphere = engine
            .store()
            .level(1)
            .triangles()
            .iter()
            .flat_map(|t| t.vertices)
            .filter(|v| distance(DVec3::ZERO, *v) < radius * (1.0 - 1e-6))
            .count();
        assert!(off_sphere > 0, "bisected level should not lie on the sphere");
    }

    #[test]
    fn test_two_step_extend_scenario() {
        let mut engine = engine();
        engine.refine().unwrap();
        let outcome = engine.refine().unwrap();
        assert_eq!(outcome, RefineOutcome::Extended { level: 1 });
        assert_eq!(engine.active_state(), LevelState::Extended);
        assert_eq!(engine.store().level(1).len(), 80);
        assert_all_on_sphere(&engine, 1);
        assert_normals_unit_and_outward(&engine, 1);
    }

    #[test]
    fn test_one_step_refine_scenario() {
        let mut engine = engine();
        engine.set_mode(RefineMode::OneStep);
        let outcome = engine.refine().unwrap();
        assert_eq!(outcome, RefineOutcome::Refined { level: 1 });
        assert_eq!(engine.active_state(), LevelState::Extended);
        assert_eq!(engine.store().level(1).len(), 80);
        assert_all_on_sphere(&engine, 1);
    }

    #[test]
    fn test_quadrupling_invariant_across_levels() {
        let mut engine = engine();
        engine.set_mode(RefineMode::OneStep);
        for _ in 0..5 {
            engine.refine().unwrap();
        }
        for level in 1..=5 {
            assert_eq!(
                engine.store().level(level).len(),
                4 * engine.store().level(level - 1).len(),
                "count at level {level}"
            );
        }
        assert_eq!(engine.store().level(5).len(), 20 * 4usize.pow(5));
    }

    #[test]
    fn test_extend_is_idempotent() {
        let mut engine = engine();
        engine.refine().unwrap();
        engine.refine().unwrap();
        let before: Vec<_> = engine.store().level(1).triangles().to_vec();
        engine.extend(1);
        let after = engine.store().level(1).triangles();
        for (b, a) in before.iter().zip(after) {
            for (vb, va) in b.vertices.iter().zip(&a.vertices) {
                assert!(
                    (*vb - *va).length() < REL_TOLERANCE,
                    "vertex moved on re-extend: {vb:?} -> {va:?}"
                );
            }
        }
    }

    #[test]
    fn test_downgrid_scenario() {
        let mut engine = engine();
        engine.refine().unwrap();
        engine.refine().unwrap();
        assert!(engine.downgrid());
        assert_eq!(engine.active_level(), 0);
        assert_eq!(engine.store().level(1).state(), LevelState::Empty);
        assert!(engine.store().level(1).is_empty());
        // Level 0 untouched.
        assert_eq!(engine.store().level(0).len(), 20);
        assert_all_on_sphere(&engine, 0);
        assert_normals_unit_and_outward(&engine, 0);
    }

    #[test]
    fn test_downgrid_rejected_at_level_zero() {
        let mut engine = engine();
        assert!(!engine.downgrid());
        assert_eq!(engine.active_level(), 0);
        assert_eq!(engine.store().level(0).len(), 20);
    }

    #[test]
    fn test_refine_rejected_at_max_level() {
        let mut engine = RefineEngine::new(2).unwrap();
        engine.set_reveal_enabled(false);
        engine.set_mode(RefineMode::OneStep);
        engine.refine().unwrap();
        engine.refine().unwrap();
        assert_eq!(engine.active_level(), 2);
        assert_eq!(engine.refine().unwrap(), RefineOutcome::Rejected);
        assert_eq!(engine.active_level(), 2);
    }

    #[test]
    fn test_refine_rejected_while_reveal_in_flight() {
        let mut engine = RefineEngine::new(5).unwrap();
        engine.set_reveal_enabled(true);
        assert_eq!(engine.refine().unwrap(), RefineOutcome::Bisected { level: 1 });
        assert!(engine.reveal().is_some());
        assert_eq!(engine.refine().unwrap(), RefineOutcome::Rejected);

        // Run the reveal out; refine is accepted again.
        while !engine.tick(1.0) {}
        assert_eq!(engine.refine().unwrap(), RefineOutcome::Extended { level: 1 });
    }

    #[test]
    fn test_downgrid_cancels_reveal() {
        let mut engine = RefineEngine::new(5).unwrap();
        engine.set_reveal_enabled(true);
        engine.refine().unwrap();
        assert!(engine.reveal().is_some());
        assert!(engine.downgrid());
        assert!(engine.reveal().is_none());
        assert_eq!(engine.active_level(), 0);
    }

    #[test]
    fn one_step_completes_pending_extend_then_refines() {
        let mut engine = engine();
        engine.refine().unwrap(); // bisect level 1 in 2-step mode
        assert_eq!(engine.active_state(), LevelState::Bisected);

        engine.set_mode(RefineMode::OneStep);
        let outcome = engine.refine().unwrap();
        // One call: level 1 extended, then level 2 bisected+extended.
        assert_eq!(outcome, RefineOutcome::Refined { level: 2 });
        assert_eq!(engine.active_level(), 2);
        assert_eq!(engine.store().level(1).state(), LevelState::Extended);
        assert_eq!(engine.store().level(2).state(), LevelState::Extended);
        assert_all_on_sphere(&engine, 1);
        assert_all_on_sphere(&engine, 2);
    }

    #[test]
    fn test_pending_extend_at_max_level_stops_there() {
        let mut engine = RefineEngine::new(1).unwrap();
        engine.set_reveal_enabled(false);
        engine.refine().unwrap(); // bisect level 1 (the ceiling)
        engine.set_mode(RefineMode::OneStep);
        let outcome = engine.refine().unwrap();
        assert_eq!(outcome, RefineOutcome::Extended { level: 1 });
        assert_eq!(engine.active_level(), 1);
        assert_eq!(engine.active_state(), LevelState::Extended);
    }

    #[test]
    fn test_reveal_targets_final_level_of_combined_call() {
        let mut engine = RefineEngine::new(5).unwrap();
        engine.set_reveal_enabled(true);
        engine.refine().unwrap();
        while !engine.tick(1.0) {}

        engine.set_mode(RefineMode::OneStep);
        let outcome = engine.refine().unwrap();
        // The call finishes level 1's pending extend, then refines level 2;
        // the reveal restarts for level 2 only.
        assert_eq!(outcome, RefineOutcome::Refined { level: 2 });
        let reveal = engine.reveal().expect("reveal should restart");
        assert_eq!(reveal.total(), engine.store().level(2).len());
        assert_eq!(reveal.total(), 320);
    }

    #[test]
    fn test_visible_triangles_follow_reveal_prefix() {
        let mut engine = RefineEngine::new(5).unwrap();
        engine.set_reveal_enabled(true);
        engine.refine().unwrap();
        assert_eq!(engine.visible_triangles().len(), 1);
        engine.tick(0.03);
        assert_eq!(engine.visible_triangles().len(), 2);
        while !engine.tick(1.0) {}
        assert_eq!(engine.visible_triangles().len(), 80);
    }

    #[test]
    fn test_previous_triangles_during_reveal() {
        let mut engine = RefineEngine::new(5).unwrap();
        engine.set_reveal_enabled(true);
        assert!(engine.previous_triangles().is_none());
        engine.refine().unwrap();
        let previous = engine.previous_triangles().expect("level 0 beneath");
        assert_eq!(previous.len(), 20);
    }

    #[test]
    fn test_refine_after_downgrid_rebuilds_level() {
        let mut engine = engine();
        engine.set_mode(RefineMode::OneStep);
        engine.refine().unwrap();
        engine.downgrid();
        let outcome = engine.refine().unwrap();
        assert_eq!(outcome, RefineOutcome::Refined { level: 1 });
        assert_eq!(engine.store().level(1).len(), 80);
        assert_all_on_sphere(&engine, 1);
    }

    #[test]
    fn test_bisected_children_partition_parent_corners() {
        let mut engine = engine();
        engine.refine().unwrap();
        let parent = engine.store().level(0).triangles()[0];
        let children = &engine.store().level(1).triangles()[0..4];

        // Each parent corner appears as the anchor of exactly one child.
        for (i, corner) in parent.vertices.iter().enumerate() {
            let hits = children
                .iter()
                .flat_map(|c| c.vertices)
                .filter(|v| (*v - *corner).length() < 1e-12)
                .count();
            assert_eq!(hits, 1, "corner {i} of the parent should appear once");
        }

        // The central child is made of the three edge midpoints.
        let midpoints = parent.edge_midpoints();
        for v in &children[3].vertices {
            assert!(
                midpoints.iter().any(|m| (*m - *v).length() < 1e-12),
                "central child vertex {v:?} is not a parent edge midpoint"
            );
        }
    }
}
