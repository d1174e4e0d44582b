//! Dropdown: a select control whose item list opens in a portal overlay.

use std::time::Duration;

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Offset, Region, Size};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::portal::PortalId;
use crate::render::{Buffer, CellStyle};
use crate::scheduler::ScheduledAction;
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// Delay before a closed dropdown restores the enclosing panel's scroll
/// offset. The entry is owned by the dropdown, so disposal cancels it.
const RESTORE_DELAY: Duration = Duration::from_millis(120);

/// A closed/open select. The popup list is a detached [`DropdownItemList`]
/// control rendered through the window's portal mechanism; while open, the
/// dropdown keeps focus and drives the highlight from its own key handler.
pub struct Dropdown {
    items: Vec<String>,
    max_visible: usize,
    disabled: bool,
    focused: bool,
    open: Option<(PortalId, ControlId)>,
    saved_scroll: Option<(ControlId, Offset)>,
}

impl Dropdown {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            max_visible: 5,
            disabled: false,
            focused: false,
            open: None,
            saved_scroll: None,
        }
    }

    pub fn with_max_visible(mut self, max: usize) -> Self {
        self.max_visible = max.max(1);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Drop the open marker if the portal has been closed behind our back
    /// (e.g. the list committed via mouse).
    fn validate_open(&mut self, ctx: &EventCtx<'_>) {
        if let Some((portal, _)) = self.open {
            if !ctx.portals.contains(portal) {
                self.open = None;
            }
        }
    }

    fn open_list(&mut self, own: ControlId, ctx: &mut EventCtx<'_>) {
        if self.items.is_empty() {
            return;
        }
        let selected = ctx.state.selection(own).and_then(|s| s.selected).unwrap_or(0);
        ctx.state.selection_mut(own).highlighted =
            Some(selected.min(self.items.len() - 1));

        let list = DropdownItemList::new(own, self.items.clone(), self.max_visible);
        let list_id = ctx.tree.insert_detached(list);
        let portal = ctx.portals.create(own, list_id);
        self.open = Some((portal, list_id));

        // Remember the nearest scrolling ancestor's offset; it is restored
        // shortly after the popup closes.
        self.saved_scroll = ctx
            .tree
            .ancestors(own)
            .into_iter()
            .find(|&a| ctx.state.scroll(a).is_some())
            .map(|a| (a, ctx.state.scroll(a).map(|s| s.offset).unwrap_or(Offset::ZERO)));

        ctx.invalidate(own);
    }

    fn close_list(&mut self, own: ControlId, ctx: &mut EventCtx<'_>) {
        if let Some((portal, list_id)) = self.open.take() {
            ctx.portals.remove(own, portal);
            ctx.remove_control(list_id);
            if let Some((panel, offset)) = self.saved_scroll.take() {
                ctx.scheduler.schedule(
                    own,
                    RESTORE_DELAY,
                    ScheduledAction::RestoreScroll { panel, offset },
                );
            }
            ctx.invalidate(own);
        }
    }

    fn move_highlight(&mut self, own: ControlId, ctx: &mut EventCtx<'_>, delta: i32) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let selection = ctx.state.selection_mut(own);
        let current = selection.highlighted.unwrap_or(0) as i32;
        selection.highlighted = Some((current + delta).clamp(0, len as i32 - 1) as usize);
        if let Some((_, list_id)) = self.open {
            ctx.invalidate(list_id);
        }
    }

    fn commit(&mut self, own: ControlId, ctx: &mut EventCtx<'_>) {
        if let Some(index) = ctx.state.selection(own).and_then(|s| s.highlighted) {
            ctx.state.selection_mut(own).selected = Some(index);
            ctx.emit(own, UiEventKind::DropdownCommitted { index });
        }
        self.close_list(own, ctx);
    }
}

impl Control for Dropdown {
    fn type_name(&self) -> &'static str {
        "Dropdown"
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        _constraints: Constraints,
    ) -> Size {
        let widest = self.items.iter().map(|i| ctx.text.width(i)).max().unwrap_or(0);
        Size::new(widest + 4, 1)
    }

    fn paint(
        &self,
        own: ControlId,
        _children: &[LayoutNode],
        bounds: Region,
        clip: Region,
        inherited: &Inherited,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
    ) {
        let mut style = CellStyle {
            fg: Some(resolve_fg(None, inherited, ctx.theme).to_owned()),
            bg: Some(resolve_bg(None, inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        if self.focused {
            style.reverse = true;
        }
        buffer.fill(bounds, &style, clip);

        let selected = ctx
            .state
            .selection(own)
            .and_then(|s| s.selected)
            .and_then(|i| self.items.get(i));
        let text = selected.map(String::as_str).unwrap_or("(select)");
        buffer.write_str(bounds.x + 1, bounds.y, text, &style, clip);
        buffer.write_str(bounds.right() - 2, bounds.y, "▾", &style, clip);
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

impl Interactive for Dropdown {
    fn enabled(&self) -> bool {
        !self.disabled
    }

    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        self.validate_open(ctx);

        if self.open.is_none() {
            return match ev.code {
                Key::Enter | Key::Char(' ') | Key::Down => {
                    self.open_list(own, ctx);
                    true
                }
                _ => false,
            };
        }

        match ev.code {
            Key::Up => {
                self.move_highlight(own, ctx, -1);
                true
            }
            Key::Down => {
                self.move_highlight(own, ctx, 1);
                true
            }
            Key::Enter | Key::Char(' ') => {
                self.commit(own, ctx);
                true
            }
            Key::Escape => {
                self.close_list(own, ctx);
                true
            }
            // Everything else is swallowed while the list is open.
            _ => true,
        }
    }
}

impl Focusable for Dropdown {
    fn accepts_focus(&self) -> bool {
        !self.disabled
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn focus_in(&mut self, _hint: FocusHint) {
        self.focused = true;
    }

    fn focus_out(&mut self) {
        self.focused = false;
    }
}

impl MouseAware for Dropdown {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        _bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        if let MouseKind::Down(MouseButton::Left) = ev.kind {
            self.validate_open(ctx);
            if self.open.is_some() {
                self.close_list(own, ctx);
            } else if !self.disabled {
                self.open_list(own, ctx);
            }
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// DropdownItemList
// ---------------------------------------------------------------------------

/// The popup list rendered inside a portal. Detached from the main tree;
/// reads its highlight from the anchor dropdown's selection state. When the
/// item count exceeds `max_visible`, the window slides to keep the
/// highlight visible and a trailing indicator row marks the clipping.
pub struct DropdownItemList {
    anchor: ControlId,
    items: Vec<String>,
    max_visible: usize,
}

impl DropdownItemList {
    fn new(anchor: ControlId, items: Vec<String>, max_visible: usize) -> Self {
        Self { anchor, items, max_visible }
    }

    fn visible(&self) -> usize {
        self.items.len().min(self.max_visible)
    }

    fn has_indicator(&self) -> bool {
        self.items.len() > self.max_visible
    }

    /// First visible item index given the current highlight.
    fn window_start(&self, highlighted: usize) -> usize {
        let visible = self.visible();
        if visible == 0 {
            return 0;
        }
        let max_start = self.items.len() - visible;
        highlighted.saturating_sub(visible - 1).min(max_start)
    }
}

impl Control for DropdownItemList {
    fn type_name(&self) -> &'static str {
        "DropdownItemList"
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        _constraints: Constraints,
    ) -> Size {
        let widest = self.items.iter().map(|i| ctx.text.width(i)).max().unwrap_or(0);
        let height = self.visible() as i32 + if self.has_indicator() { 1 } else { 0 };
        Size::new(widest + 2, height)
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
        let style = CellStyle {
            fg: Some(resolve_fg(None, inherited, ctx.theme).to_owned()),
            bg: Some(ctx.theme.accent.as_deref().unwrap_or("dark_blue").to_owned()),
            ..CellStyle::default()
        };
        buffer.fill(bounds, &style, clip);

        let highlighted = ctx
            .state
            .selection(self.anchor)
            .and_then(|s| s.highlighted)
            .unwrap_or(0);
        let start = self.window_start(highlighted);

        for (row, item) in self.items.iter().skip(start).take(self.visible()).enumerate() {
            let index = start + row;
            let row_style = if index == highlighted { style.reversed() } else { style.clone() };
            let y = bounds.y + row as i32;
            buffer.fill(Region::new(bounds.x, y, bounds.width, 1), &row_style, clip);
            buffer.write_str(bounds.x + 1, y, item, &row_style, clip);
        }

        if self.has_indicator() {
            let y = bounds.y + self.visible() as i32;
            buffer.write_str(bounds.x + 1, y, "…", &style.dimmed(), clip);
        }
    }

    fn mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        Some(self)
    }
}

impl MouseAware for DropdownItemList {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        if let MouseKind::Down(MouseButton::Left) = ev.kind {
            let highlighted = ctx
                .state
                .selection(self.anchor)
                .and_then(|s| s.highlighted)
                .unwrap_or(0);
            let row = (ev.y - bounds.y) as usize;
            if row < self.visible() {
                let index = self.window_start(highlighted) + row;
                let selection = ctx.state.selection_mut(self.anchor);
                selection.highlighted = Some(index);
                selection.selected = Some(index);
                ctx.emit(self.anchor, UiEventKind::DropdownCommitted { index });
                // Close ourselves; the anchor notices on its next event.
                ctx.portals.remove_by_anchor(self.anchor);
                ctx.remove_control(own);
                ctx.invalidate(self.anchor);
            }
            return true;
        }
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn anchor_id() -> ControlId {
        let mut sm: SlotMap<ControlId, ()> = SlotMap::with_key();
        sm.insert(())
    }

    fn list(n: usize, max_visible: usize) -> DropdownItemList {
        let items = (0..n).map(|i| format!("item {i}")).collect();
        DropdownItemList::new(anchor_id(), items, max_visible)
    }

    #[test]
    fn popup_height_without_indicator() {
        // Three items with room for five: exactly three rows, no
        // indicator.
        let l = list(3, 5);
        assert_eq!(l.visible(), 3);
        assert!(!l.has_indicator());
    }

    #[test]
    fn popup_height_with_indicator() {
        let l = list(8, 5);
        assert_eq!(l.visible(), 5);
        assert!(l.has_indicator());
    }

    #[test]
    fn window_follows_highlight() {
        let l = list(10, 4);
        assert_eq!(l.window_start(0), 0);
        assert_eq!(l.window_start(3), 0);
        assert_eq!(l.window_start(4), 1);
        assert_eq!(l.window_start(9), 6);
    }

    #[test]
    fn dropdown_starts_closed() {
        let d = Dropdown::new(["a", "b", "c"]);
        assert!(!d.is_open());
        assert_eq!(d.items().len(), 3);
    }

    #[test]
    fn max_visible_floors_at_one() {
        let d = Dropdown::new(["a"]).with_max_visible(0);
        assert_eq!(d.max_visible, 1);
    }
}
