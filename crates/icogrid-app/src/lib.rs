//! The Icogrid application: window, event loop, and scene state.

mod frame_clock;
mod scene;
mod window;

pub use frame_clock::{FIXED_DT, FrameClock, MAX_FRAME_TIME};
pub use scene::SceneState;
pub use window::{AppState, run_with_config};
