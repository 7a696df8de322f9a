//! Presentation state layered over the refinement engine: overlay toggles,
//! the reveal color treatment, and the post-reveal fade.

use icogrid_config::ViewConfig;

/// Default grid face color.
pub const FACE_GREY: [f32; 3] = [0.5, 0.5, 0.5];
/// Face color at the moment a reveal starts.
pub const REVEAL_RED: [f32; 3] = [1.0, 0.0, 0.0];
/// Previous-level face color while the new level is being revealed.
pub const PREVIOUS_YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
/// Default edge color.
pub const EDGE_BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
/// Edge color flagging the bisected (not yet extended) intermediate.
pub const EDGE_RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
/// Normal-ray color.
pub const NORMAL_MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
/// Centroid-marker color.
pub const CENTROID_GREEN: [f32; 4] = [0.0, 1.0, 0.5, 1.0];
/// Axes color.
pub const AXES_ORANGE: [f32; 4] = [1.0, 0.27, 0.0, 1.0];

/// Sphere opacity while a reveal is running.
const REVEAL_SPHERE_ALPHA: f32 = 0.25;

/// Per-second rate at which colors drift back to their defaults after a
/// reveal: 0.005 per 30 ms step.
const FADE_RATE: f32 = 0.005 / 0.03;

/// Overlay toggles plus the transient color state the reveal animation
/// drives. Pure data + arithmetic, so the interaction rules are testable
/// without a window.
#[derive(Debug, Clone)]
pub struct SceneState {
    /// Draw triangle edges.
    pub show_edges: bool,
    /// Draw face normal rays.
    pub show_normals: bool,
    /// Draw face centroid markers.
    pub show_centroids: bool,
    /// Draw the translucent sphere shell.
    pub show_sphere: bool,
    /// Draw the world axes.
    pub show_axes: bool,
    /// Rotate the scene continuously.
    pub auto_rotate: bool,
    /// Hold rotation still while a reveal plays.
    pub fixed_during_reveal: bool,
    /// Current grid face color (fades back to grey after a reveal).
    pub face_color: [f32; 3],
    /// Current sphere shell opacity (fades back to its resting value).
    pub sphere_alpha: f32,
    /// Resting sphere opacity from configuration.
    resting_sphere_alpha: f32,
}

impl SceneState {
    /// Seed the toggles from configuration.
    #[must_use]
    pub fn from_config(view: &ViewConfig) -> Self {
        Self {
            show_edges: view.show_edges,
            show_normals: view.show_normals,
            show_centroids: view.show_centroids,
            show_sphere: view.show_sphere,
            show_axes: view.show_axes,
            auto_rotate: view.auto_rotate,
            fixed_during_reveal: view.fixed_during_reveal,
            face_color: FACE_GREY,
            sphere_alpha: view.sphere_alpha,
            resting_sphere_alpha: view.sphere_alpha,
        }
    }

    /// Flash the faces red and thin the sphere shell for the duration of a
    /// reveal.
    pub fn on_reveal_started(&mut self) {
        self.face_color = REVEAL_RED;
        self.sphere_alpha = REVEAL_SPHERE_ALPHA;
    }

    /// Advance the post-reveal fade by `dt` seconds. No-op while a reveal
    /// is still running. Returns `true` if anything changed (the grid mesh
    /// needs rebuilding).
    pub fn fade(&mut self, dt: f64, reveal_active: bool) -> bool {
        if reveal_active {
            return false;
        }
        let step = FADE_RATE * dt as f32;
        let mut changed = false;
        for (channel, target) in self.face_color.iter_mut().zip(FACE_GREY) {
            let next = approach(*channel, target, step);
            changed |= next != *channel;
            *channel = next;
        }
        let next_alpha = approach(self.sphere_alpha, self.resting_sphere_alpha, step);
        changed |= next_alpha != self.sphere_alpha;
        self.sphere_alpha = next_alpha;
        changed
    }

    /// Snap colors back to their resting values (downgrading cancels any
    /// reveal, so the flash must not linger on the coarser level).
    pub fn on_downgrid(&mut self) {
        self.face_color = FACE_GREY;
        self.sphere_alpha = self.resting_sphere_alpha;
    }

    /// Current face color with full opacity.
    #[must_use]
    pub fn face_rgba(&self) -> [f32; 4] {
        [self.face_color[0], self.face_color[1], self.face_color[2], 1.0]
    }

    /// Grey shell tint at the current opacity.
    #[must_use]
    pub fn sphere_rgba(&self) -> [f32; 4] {
        [0.5, 0.5, 0.5, self.sphere_alpha]
    }
}

/// Move `value` toward `target` by at most `step`.
fn approach(value: f32, target: f32, step: f32) -> f32 {
    if (value - target).abs() <= step {
        target
    } else if value < target {
        value + step
    } else {
        value - step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneState {
        SceneState::from_config(&ViewConfig::default())
    }

    #[test]
    fn test_config_seeds_toggles() {
        let view = ViewConfig {
            show_edges: false,
            show_axes: true,
            ..ViewConfig::default()
        };
        let scene = SceneState::from_config(&view);
        assert!(!scene.show_edges);
        assert!(scene.show_axes);
        assert_eq!(scene.face_color, FACE_GREY);
    }

    #[test]
    fn test_reveal_flashes_red_and_thins_sphere() {
        let mut scene = scene();
        scene.on_reveal_started();
        assert_eq!(scene.face_color, REVEAL_RED);
        assert!((scene.sphere_alpha - REVEAL_SPHERE_ALPHA).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fade_suspended_while_reveal_runs() {
        let mut scene = scene();
        scene.on_reveal_started();
        assert!(!scene.fade(1.0, true));
        assert_eq!(scene.face_color, REVEAL_RED);
    }

    #[test]
    fn test_fade_returns_to_defaults() {
        let mut scene = scene();
        scene.on_reveal_started();
        // 0.5 of red->grey distance at FADE_RATE/s needs 3 s; run 10.
        for _ in 0..600 {
            scene.fade(1.0 / 60.0, false);
        }
        assert_eq!(scene.face_color, FACE_GREY);
        assert!((scene.sphere_alpha - ViewConfig::default().sphere_alpha).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fade_reports_quiescence() {
        let mut scene = scene();
        assert!(!scene.fade(1.0 / 60.0, false), "already at defaults");
        scene.on_reveal_started();
        assert!(scene.fade(1.0 / 60.0, false), "fading should report change");
    }

    #[test]
    fn test_approach_clamps_at_target() {
        assert_eq!(approach(0.99, 1.0, 0.05), 1.0);
        assert_eq!(approach(1.0, 0.5, 0.1), 0.9);
        assert_eq!(approach(0.2, 0.5, 0.1), 0.3);
    }
}
