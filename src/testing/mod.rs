//! Test utilities: the headless pilot and snapshot rendering.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{buffer_to_string, render_to_string};
