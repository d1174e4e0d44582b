//! Splitter: a draggable divider between two grid columns.

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware, SizePolicy};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size};
use crate::input::{Key, KeyEvent, MouseEvent, MouseKind};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, Inherited};
use crate::tree::ControlId;

/// A one-cell-wide focusable divider holding non-owning back-references to
/// its left and right neighbor columns. Arrow keys nudge by one cell; a
/// drag follows the cursor. Committing a new position writes fixed widths
/// onto both neighbors, converting flexible columns to fixed — that is the
/// documented side effect of resizing, not a bug.
pub struct Splitter {
    left: ControlId,
    right: ControlId,
    focused: bool,
    drag_x: Option<i32>,
}

impl Splitter {
    pub fn new(left: ControlId, right: ControlId) -> Self {
        Self {
            left,
            right,
            focused: false,
            drag_x: None,
        }
    }

    fn neighbor_min(ctx: &mut EventCtx<'_>, id: ControlId) -> i32 {
        ctx.tree
            .handle(id)
            .and_then(|handle| handle.borrow_mut().resizable().map(|r| r.min_width()))
            .unwrap_or(1)
    }

    fn commit_width(ctx: &mut EventCtx<'_>, id: ControlId, width: i32) {
        if let Some(handle) = ctx.tree.handle(id) {
            if let Some(resizable) = handle.borrow_mut().resizable() {
                resizable.set_fixed_width(width);
            }
        }
    }

    /// Move the divider by `delta` cells, clamped so neither neighbor goes
    /// below its minimum width. Returns whether anything moved.
    fn adjust(&mut self, own: ControlId, delta: i32, ctx: &mut EventCtx<'_>) -> bool {
        let left_bounds = ctx.state.bounds(self.left);
        let right_bounds = ctx.state.bounds(self.right);
        if left_bounds.is_empty() && right_bounds.is_empty() {
            return false;
        }

        let total = left_bounds.width + right_bounds.width;
        let left_min = Self::neighbor_min(ctx, self.left);
        let right_min = Self::neighbor_min(ctx, self.right);
        if total < left_min + right_min {
            return false;
        }

        let new_left = (left_bounds.width + delta).clamp(left_min, total - right_min);
        let new_right = total - new_left;
        if new_left == left_bounds.width {
            return false;
        }

        Self::commit_width(ctx, self.left, new_left);
        Self::commit_width(ctx, self.right, new_right);
        ctx.emit(own, UiEventKind::SplitterMoved { left_width: new_left, right_width: new_right });
        if let Some(parent) = ctx.tree.parent(own) {
            ctx.invalidate_all(parent);
        }
        true
    }
}

impl Control for Splitter {
    fn type_name(&self) -> &'static str {
        "Splitter"
    }

    fn width_policy(&self) -> SizePolicy {
        SizePolicy::Fixed(1)
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        _ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        let height = if constraints.height_bounded() { constraints.max.height } else { 1 };
        Size::new(1, height)
    }

    fn paint(
        &self,
        _own: ControlId,
        _children: &[LayoutNode],
        bounds: Region,
        clip: Region,
        inherited: &Inherited,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
    ) {
        let mut style = CellStyle {
            fg: ctx.theme.accent.clone().or_else(|| inherited.fg.clone()),
            bg: Some(resolve_bg(None, inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        if self.focused {
            style.reverse = true;
        }
        buffer.fill_char(bounds, '│', &style, clip);
    }

    fn interactive(&mut self) -> Option<&mut dyn Interactive> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        Some(self)
    }
}

impl Interactive for Splitter {
    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        match ev.code {
            Key::Left => {
                self.adjust(own, -1, ctx);
                true
            }
            Key::Right => {
                self.adjust(own, 1, ctx);
                true
            }
            _ => false,
        }
    }
}

impl Focusable for Splitter {
    fn focused(&self) -> bool {
        self.focused
    }

    fn focus_in(&mut self, _hint: FocusHint) {
        self.focused = true;
    }

    fn focus_out(&mut self) {
        self.focused = false;
        self.drag_x = None;
    }
}

impl MouseAware for Splitter {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        _bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        match ev.kind {
            MouseKind::Down(_) => {
                self.drag_x = Some(ev.x);
                true
            }
            MouseKind::Drag(_) => {
                if let Some(last) = self.drag_x {
                    let delta = ev.x - last;
                    if self.adjust(own, delta, ctx) {
                        self.drag_x = Some(ev.x);
                    }
                }
                true
            }
            MouseKind::Up(_) => {
                self.drag_x = None;
                true
            }
            _ => false,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
