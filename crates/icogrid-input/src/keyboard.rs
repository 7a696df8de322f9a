//! Frame-coherent keyboard state tracker.
//!
//! [`KeyboardState`] accumulates winit [`KeyEvent`]s during a frame and
//! answers three questions for any physical key: is it held, was it just
//! pressed this frame, and was it just released this frame.
//!
//! Physical key codes are used throughout so that the bindings work
//! identically regardless of the user's keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Minimal description of a key event for processing.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    /// The physical key involved.
    pub key: PhysicalKey,
    /// Whether the key was pressed or released.
    pub state: ElementState,
    /// Whether this is a repeat event.
    pub repeat: bool,
}

/// Tracks per-frame keyboard state using physical (scan-code) keys.
///
/// # Usage
///
/// 1. Forward every [`KeyEvent`] to [`process_event`](Self::process_event).
/// 2. Query state with [`is_pressed`](Self::is_pressed),
///    [`just_pressed`](Self::just_pressed), [`just_released`](Self::just_released).
/// 3. Call [`clear_transients`](Self::clear_transients) at the end of each frame.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: HashSet<PhysicalKey>,
    just_released: HashSet<PhysicalKey>,
}

impl KeyboardState {
    /// Creates a new `KeyboardState` with no keys pressed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a winit [`KeyEvent`], updating internal state.
    ///
    /// - **Pressed** (non-repeat): inserts into `pressed` and `just_pressed`.
    /// - **Released**: removes from `pressed`, inserts into `just_released`.
    /// - Repeat events are ignored.
    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Processes a [`RawKeyEvent`] (platform-independent, test-friendly).
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                self.pressed.insert(event.key);
                self.just_pressed.insert(event.key);
            }
            ElementState::Released => {
                self.pressed.remove(&event.key);
                self.just_released.insert(event.key);
            }
        }
    }

    /// Returns `true` while the key is held down.
    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed.contains(&key)
    }

    /// Returns `true` only during the frame the key transitioned to pressed.
    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Returns `true` only during the frame the key transitioned to released.
    #[must_use]
    pub fn just_released(&self, key: PhysicalKey) -> bool {
        self.just_released.contains(&key)
    }

    /// Clears `just_pressed` and `just_released` sets. Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    /// Helper to create a [`RawKeyEvent`] for testing.
    fn raw(code: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat,
        }
    }

    #[test]
    fn test_initial_state_no_keys_pressed() {
        let kb = KeyboardState::new();
        for code in [KeyCode::Period, KeyCode::Comma, KeyCode::KeyE] {
            let key = PhysicalKey::Code(code);
            assert!(!kb.is_pressed(key));
            assert!(!kb.just_pressed(key));
            assert!(!kb.just_released(key));
        }
    }

    #[test]
    fn test_press_sets_pressed_and_just_pressed() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::Period, ElementState::Pressed, false));
        let key = PhysicalKey::Code(KeyCode::Period);
        assert!(kb.is_pressed(key));
        assert!(kb.just_pressed(key));
        assert!(!kb.just_released(key));
    }

    #[test]
    fn test_release_clears_pressed_sets_just_released() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyR, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyR, ElementState::Released, false));
        let key = PhysicalKey::Code(KeyCode::KeyR);
        assert!(!kb.is_pressed(key));
        assert!(kb.just_released(key));
    }

    #[test]
    fn test_repeat_events_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::ArrowLeft, ElementState::Pressed, false));
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::ArrowLeft, ElementState::Pressed, true));
        let key = PhysicalKey::Code(KeyCode::ArrowLeft);
        assert!(kb.is_pressed(key));
        assert!(!kb.just_pressed(key), "repeat must not re-trigger");
    }

    #[test]
    fn test_clear_transients_keeps_held_keys() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::ArrowUp, ElementState::Pressed, false));
        kb.clear_transients();
        let key = PhysicalKey::Code(KeyCode::ArrowUp);
        assert!(kb.is_pressed(key));
        assert!(!kb.just_pressed(key));
    }
}
