//! # weft-tui
//!
//! A retained-mode terminal widget framework built around a constraint-based
//! layout and repaint pipeline: windows, layout containers, and interactive
//! controls rendered into a character buffer and driven by keyboard/mouse
//! input.
//!
//! ## Core Systems
//!
//! - **[`geometry`]** — Offset, Size, Region, Spacing, Constraints
//! - **[`render`]** — Styled cells, the clipped-write buffer, the crossterm driver
//! - **[`tree`]** — Slotmap arena of controls with parent/child structure
//! - **[`control`]** — The control contract and capability traits
//! - **[`layout`]** — Per-cycle layout nodes (measure/arrange/paint) and flex distribution
//! - **[`state`]** — Scroll/selection/layout/dirty state keyed by control identity
//! - **[`focus`]** — Focus ownership and key/mouse routing
//! - **[`controls`]** — Built-in leaves and containers
//! - **[`window`]** — The root container: buffers, portals, paint cycle
//! - **[`portal`]** — Anchored overlays with flip-up placement
//! - **[`scheduler`]** — Cancellable delayed UI actions
//! - **[`event`]** — Events controls emit toward application code
//! - **[`input`]** — Input events decoupled from crossterm
//! - **[`text`]** — ANSI/markup-aware width measurement
//! - **[`theme`]** — Color resolution with a strict precedence chain
//! - **[`app`]** — Application shell and the async run loop
//! - **[`testing`]** — Headless pilot and snapshot helpers

// Foundation
pub mod error;
pub mod geometry;
pub mod text;
pub mod theme;

// Core systems
pub mod control;
pub mod layout;
pub mod render;
pub mod state;
pub mod tree;

// Input and routing
pub mod event;
pub mod focus;
pub mod input;

// Composition
pub mod controls;
pub mod portal;
pub mod scheduler;
pub mod window;

// Application
pub mod app;
pub mod testing;

pub use app::{App, AppConfig};
pub use error::{Error, Result};
pub use window::Window;
