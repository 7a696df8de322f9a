//! Keyboard input handling for the Icogrid viewer.
//!
//! [`KeyboardState`] accumulates winit key events into frame-coherent
//! pressed/just-pressed/just-released sets; [`ViewerAction`] names the
//! viewer's discrete key bindings.

mod actions;
mod keyboard;

pub use actions::ViewerAction;
pub use keyboard::{KeyboardState, RawKeyEvent};
