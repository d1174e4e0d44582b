//! Tabs: a header row switching between page children.

use crate::control::{Container, Control, Focusable, FocusEnter, FocusHint, Interactive, MouseAware};
use crate::event::UiEventKind;
use crate::focus::{resolve_entry, EventCtx};
use crate::geometry::{Constraints, Region, Size};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::node::{paint_children, LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::state::StateServices;
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::{ControlId, ControlTree};

use super::container_tab;

/// One page child per title, with a one-row header. Only the active page
/// is laid out; inactive pages get empty bounds and therefore an empty
/// clip, which keeps them unpainted and unreachable for hit-testing. The
/// active index lives in the selection state service.
pub struct Tabs {
    titles: Vec<String>,
    focused: bool,
    fg: Option<String>,
    bg: Option<String>,
}

impl Tabs {
    pub fn new(titles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
            focused: false,
            fg: None,
            bg: None,
        }
    }

    pub fn with_fg(mut self, color: impl Into<String>) -> Self {
        self.fg = Some(color.into());
        self
    }

    pub fn with_bg(mut self, color: impl Into<String>) -> Self {
        self.bg = Some(color.into());
        self
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    fn active(&self, state: &StateServices, own: ControlId, page_count: usize) -> usize {
        let selected = state
            .selection(own)
            .and_then(|s| s.selected)
            .unwrap_or(0);
        selected.min(page_count.saturating_sub(1))
    }

    fn switch(&mut self, own: ControlId, ctx: &mut EventCtx<'_>, delta: i32) -> bool {
        let count = ctx.tree.children(own).len().min(self.titles.len());
        if count == 0 {
            return false;
        }
        let current = self.active(ctx.state, own, count) as i32;
        let next = (current + delta).rem_euclid(count as i32) as usize;
        ctx.state.selection_mut(own).selected = Some(next);
        ctx.emit(own, UiEventKind::SelectionChanged { index: next });
        ctx.invalidate_all(own);
        true
    }
}

impl Control for Tabs {
    fn type_name(&self) -> &'static str {
        "Tabs"
    }

    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (self.fg.as_deref(), self.bg.as_deref())
    }

    fn is_container(&self) -> bool {
        true
    }

    fn measure(
        &mut self,
        own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        let active = self.active(ctx.state, own, children.len());
        let header_width: i32 = self
            .titles
            .iter()
            .map(|t| ctx.text.width(t) + 4)
            .sum();

        let page_constraints = Constraints::loose(Size::new(
            constraints.max.width,
            (constraints.max.height - 1).max(0),
        ));

        let mut page_size = Size::ZERO;
        for (i, child) in children.iter_mut().enumerate() {
            if i == active {
                page_size = child.measure(ctx, page_constraints);
            } else {
                // Inactive pages are parked at zero size this cycle.
                child.measure(ctx, Constraints::tight(Size::ZERO));
            }
        }

        Size::new(header_width.max(page_size.width), page_size.height + 1)
    }

    fn arrange(
        &mut self,
        own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        bounds: Region,
    ) {
        let active = self.active(ctx.state, own, children.len());
        let page_bounds = Region::new(
            bounds.x,
            bounds.y + 1,
            bounds.width,
            (bounds.height - 1).max(0),
        );
        for (i, child) in children.iter_mut().enumerate() {
            if i == active {
                child.arrange(ctx, page_bounds);
            } else {
                child.arrange(ctx, Region::EMPTY);
            }
        }
    }

    fn paint(
        &self,
        own: ControlId,
        children: &[LayoutNode],
        bounds: Region,
        clip: Region,
        inherited: &Inherited,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
    ) {
        let style = CellStyle {
            fg: Some(resolve_fg(self.fg.as_deref(), inherited, ctx.theme).to_owned()),
            bg: Some(resolve_bg(self.bg.as_deref(), inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        buffer.fill(bounds, &style, clip);

        let active = self.active(ctx.state, own, children.len().max(self.titles.len()));
        let mut x = bounds.x;
        for (i, title) in self.titles.iter().enumerate() {
            let mut tab_style = style.clone();
            if i == active {
                tab_style.bold = true;
                if self.focused {
                    tab_style.reverse = true;
                }
            } else {
                tab_style.dim = true;
            }
            let text = format!("  {title}  ");
            buffer.write_str(x, bounds.y, &text, &tab_style, clip);
            x += ctx.text.width(title) + 4;
        }

        let inherited = inherited.layer(self.fg.as_deref(), self.bg.as_deref());
        paint_children(children, ctx, buffer, clip, &inherited);
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

    fn container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }
}

impl Interactive for Tabs {
    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        match ev.code {
            Key::Left => self.switch(own, ctx, -1),
            Key::Right => self.switch(own, ctx, 1),
            Key::Down | Key::Enter => {
                // Move focus into the active page.
                let count = ctx.tree.children(own).len();
                if count == 0 {
                    return false;
                }
                let active = self.active(ctx.state, own, count);
                let page = ctx.tree.children(own)[active];
                match resolve_entry(ctx.tree, ctx.state, page, FocusHint::Forward) {
                    Some(target) => {
                        ctx.request_focus(target);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

impl Focusable for Tabs {
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

impl MouseAware for Tabs {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        if let MouseKind::Down(MouseButton::Left) = ev.kind {
            if ev.y == bounds.y {
                // Resolve which header the click landed on.
                let mut x = bounds.x;
                for (i, title) in self.titles.iter().enumerate() {
                    let width = crate::text::display_width(title) + 4;
                    if ev.x >= x && ev.x < x + width {
                        let current = self.active(ctx.state, own, self.titles.len());
                        if i != current {
                            ctx.state.selection_mut(own).selected = Some(i);
                            ctx.emit(own, UiEventKind::SelectionChanged { index: i });
                            ctx.invalidate_all(own);
                        }
                        return true;
                    }
                    x += width;
                }
            }
        }
        false
    }
}

impl Container for Tabs {
    /// The header is the entry point; pages are reached with Down/Enter or
    /// Tab from the header.
    fn focus_enter(
        &mut self,
        _own: ControlId,
        _hint: FocusHint,
        _tree: &ControlTree,
        _state: &mut StateServices,
    ) -> FocusEnter {
        FocusEnter::SelfFocus
    }

    fn handle_descendant_key(
        &mut self,
        own: ControlId,
        from: ControlId,
        ev: &KeyEvent,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        match ev.code {
            Key::Escape => {
                // Back out of the page to the header.
                ctx.request_focus(own);
                true
            }
            Key::BackTab => {
                // Shift-tabbing off the start of a page returns to the
                // header instead of bubbling out.
                if !container_tab(own, from, ev, ctx) {
                    ctx.request_focus(own);
                }
                true
            }
            _ => container_tab(own, from, ev, ctx),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Label;
    use crate::text::TextMeasurer;

    fn tabs_fixture() -> (ControlTree, ControlId, Vec<ControlId>, StateServices, TextMeasurer) {
        let mut tree = ControlTree::new();
        let tabs = tree.insert(Tabs::new(["One", "Two"]));
        let pages = vec![
            tree.insert_child(tabs, Label::new("first page")),
            tree.insert_child(tabs, Label::new("second page")),
        ];
        (tree, tabs, pages, StateServices::new(), TextMeasurer::new())
    }

    fn layout(
        tree: &ControlTree,
        tabs: ControlId,
        state: &mut StateServices,
        text: &mut TextMeasurer,
    ) {
        let mut node = LayoutNode::build(tree, tabs).unwrap();
        let mut ctx = LayoutCtx { state, text };
        node.measure(&mut ctx, Constraints::tight(Size::new(30, 6)));
        node.arrange(&mut ctx, Region::new(0, 0, 30, 6));
    }

    #[test]
    fn active_page_gets_content_area() {
        let (tree, tabs, pages, mut state, mut text) = tabs_fixture();
        layout(&tree, tabs, &mut state, &mut text);
        assert_eq!(state.bounds(pages[0]), Region::new(0, 1, 30, 5));
        assert_eq!(state.bounds(pages[1]), Region::EMPTY);
    }

    #[test]
    fn switching_changes_arranged_page() {
        let (tree, tabs, pages, mut state, mut text) = tabs_fixture();
        state.selection_mut(tabs).selected = Some(1);
        layout(&tree, tabs, &mut state, &mut text);
        assert_eq!(state.bounds(pages[0]), Region::EMPTY);
        assert_eq!(state.bounds(pages[1]), Region::new(0, 1, 30, 5));
    }

    #[test]
    fn active_index_clamps_to_page_count() {
        let (tree, tabs, pages, mut state, mut text) = tabs_fixture();
        state.selection_mut(tabs).selected = Some(99);
        layout(&tree, tabs, &mut state, &mut text);
        assert_eq!(state.bounds(pages[1]), Region::new(0, 1, 30, 5));
    }
}
