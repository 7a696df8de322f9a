//! The viewer's discrete key bindings.

use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::KeyboardState;

/// Discrete actions the viewer reacts to on the frame a key goes down.
///
/// Continuous controls (arrow-key rotation, zoom held down) are read
/// directly from [`KeyboardState::is_pressed`] by the caller and are not
/// listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    /// Refine the grid one level finer.
    Refine,
    /// Drop the grid one level coarser.
    Downgrid,
    /// Toggle triangle edge rendering.
    ToggleEdges,
    /// Toggle face normal rays.
    ToggleNormals,
    /// Toggle face centroid markers.
    ToggleCentroids,
    /// Toggle the translucent sphere overlay.
    ToggleSphere,
    /// Toggle the world axes.
    ToggleAxes,
    /// Toggle continuous scene rotation.
    ToggleAutoRotate,
    /// Toggle holding rotation still during a reveal.
    ToggleFixedRotation,
    /// Toggle the progressive reveal animation on refine.
    ToggleReveal,
    /// Toggle between 1-step and 2-step refinement.
    ToggleRefineMode,
    /// Toggle orthographic/perspective projection.
    ToggleProjection,
    /// Reset camera angles.
    ResetView,
    /// Quit the application.
    Quit,
}

impl ViewerAction {
    /// Every binding as `(physical key, action)`.
    pub const BINDINGS: [(KeyCode, ViewerAction); 15] = [
        (KeyCode::Period, ViewerAction::Refine),
        (KeyCode::Comma, ViewerAction::Downgrid),
        (KeyCode::KeyE, ViewerAction::ToggleEdges),
        (KeyCode::KeyN, ViewerAction::ToggleNormals),
        (KeyCode::KeyC, ViewerAction::ToggleCentroids),
        (KeyCode::KeyS, ViewerAction::ToggleSphere),
        (KeyCode::KeyA, ViewerAction::ToggleAxes),
        (KeyCode::KeyG, ViewerAction::ToggleAutoRotate),
        (KeyCode::KeyF, ViewerAction::ToggleFixedRotation),
        (KeyCode::KeyM, ViewerAction::ToggleReveal),
        (KeyCode::KeyR, ViewerAction::ToggleRefineMode),
        (KeyCode::KeyP, ViewerAction::ToggleProjection),
        (KeyCode::Digit0, ViewerAction::ResetView),
        (KeyCode::Escape, ViewerAction::Quit),
        (KeyCode::KeyQ, ViewerAction::Quit),
    ];

    /// Actions whose keys went down this frame, in binding order.
    #[must_use]
    pub fn triggered(keyboard: &KeyboardState) -> Vec<ViewerAction> {
        Self::BINDINGS
            .iter()
            .filter(|(code, _)| keyboard.just_pressed(PhysicalKey::Code(*code)))
            .map(|(_, action)| *action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::event::ElementState;

    fn press(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    #[test]
    fn test_refine_and_downgrid_bindings() {
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::Period);
        press(&mut kb, KeyCode::Comma);
        let actions = ViewerAction::triggered(&kb);
        assert!(actions.contains(&ViewerAction::Refine));
        assert!(actions.contains(&ViewerAction::Downgrid));
    }

    #[test]
    fn test_no_actions_without_presses() {
        let kb = KeyboardState::new();
        assert!(ViewerAction::triggered(&kb).is_empty());
    }

    #[test]
    fn test_held_key_triggers_once() {
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::KeyR);
        assert_eq!(
            ViewerAction::triggered(&kb),
            vec![ViewerAction::ToggleRefineMode]
        );
        kb.clear_transients();
        // Still held, but no longer "just pressed".
        assert!(ViewerAction::triggered(&kb).is_empty());
    }

    #[test]
    fn test_every_action_has_a_binding() {
        use ViewerAction::*;
        for action in [
            Refine,
            Downgrid,
            ToggleEdges,
            ToggleNormals,
            ToggleCentroids,
            ToggleSphere,
            ToggleAxes,
            ToggleAutoRotate,
            ToggleFixedRotation,
            ToggleReveal,
            ToggleRefineMode,
            ToggleProjection,
            ResetView,
            Quit,
        ] {
            assert!(
                ViewerAction::BINDINGS.iter().any(|(_, a)| *a == action),
                "{action:?} has no key binding"
            );
        }
    }
}
