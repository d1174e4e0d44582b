//! The layout pipeline: per-cycle node trees and width distribution.

pub mod flex;
pub mod node;

pub use flex::{distribute, Distribution};
pub use node::{paint_children, LayoutCtx, LayoutNode, PaintCtx};
