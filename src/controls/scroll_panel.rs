//! ScrollPanel: a vertical viewport over stacked content.
//!
//! The panel measures its children against an unbounded height, clips them
//! to the viewport during paint (pure clip-rect composition — child lists
//! are never truncated), and keeps its scroll offset in the state services.
//!
//! Focus behavior is a three-state machine:
//!
//! - `NoFocus` → `ChildFocused` when focus enters and a focusable child
//!   exists (first or last child depending on traversal direction);
//! - `NoFocus` → `ScrollMode` when no child is focusable but the content
//!   overflows the viewport (arrow keys scroll);
//! - `ChildFocused` → `ScrollMode` on Escape — the child releases focus,
//!   the panel keeps it, and the child is remembered;
//! - `ScrollMode` → `ChildFocused` on Tab, restoring the remembered child
//!   (validated against the tree first — it may have been removed);
//! - any state → `NoFocus` when focus leaves the subtree; the remembered
//!   child is cleared.

use crate::control::{
    Container, Control, Focusable, FocusEnter, FocusHint, Interactive, MouseAware,
};
use crate::focus::{has_focusable_descendant, resolve_entry, EventCtx};
use crate::geometry::{Constraints, Region, Size, UNBOUNDED};
use crate::input::{Key, KeyEvent, MouseEvent, MouseKind};
use crate::layout::node::{paint_children, LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::state::{ScrollbarState, StateServices};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::{ControlId, ControlTree};

use super::container_tab;

/// Lines moved per mouse-wheel tick.
const WHEEL_STEP: i32 = 3;

/// Focus states of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PanelFocus {
    #[default]
    NoFocus,
    ScrollMode,
    ChildFocused,
}

/// A scrollable container stacking its children vertically behind a
/// one-cell scrollbar gutter.
pub struct ScrollPanel {
    auto_scroll: bool,
    show_scrollbar: bool,
    focus: PanelFocus,
    remembered: Option<ControlId>,
    scrollable: bool,
    fg: Option<String>,
    bg: Option<String>,
}

impl ScrollPanel {
    pub fn new() -> Self {
        Self {
            auto_scroll: false,
            show_scrollbar: true,
            focus: PanelFocus::NoFocus,
            remembered: None,
            scrollable: false,
            fg: None,
            bg: None,
        }
    }

    /// Pin the viewport to the bottom as content grows (log-tail mode).
    pub fn with_auto_scroll(mut self, enabled: bool) -> Self {
        self.auto_scroll = enabled;
        self
    }

    pub fn with_scrollbar(mut self, show: bool) -> Self {
        self.show_scrollbar = show;
        self
    }

    pub fn with_fg(mut self, color: impl Into<String>) -> Self {
        self.fg = Some(color.into());
        self
    }

    pub fn with_bg(mut self, color: impl Into<String>) -> Self {
        self.bg = Some(color.into());
        self
    }

    fn gutter(&self) -> i32 {
        if self.show_scrollbar {
            1
        } else {
            0
        }
    }

    /// The child content area (viewport) inside arranged bounds.
    fn viewport(&self, bounds: Region) -> Region {
        Region::new(
            bounds.x,
            bounds.y,
            (bounds.width - self.gutter()).max(0),
            bounds.height,
        )
    }

    fn scroll(&mut self, own: ControlId, ctx: &mut EventCtx<'_>, dx: i32, dy: i32) -> bool {
        let state = ctx.state.scroll_mut(own);
        let before = state.offset;
        state.scroll_by(dx, dy);
        let moved = state.offset != before;
        if moved {
            ctx.invalidate_all(own);
        }
        moved
    }

    /// Validate the remembered child against the live tree before any
    /// re-delegation.
    fn remembered_valid(&mut self, own: ControlId, tree: &ControlTree) -> Option<ControlId> {
        match self.remembered {
            Some(id) if id != own && tree.is_descendant_or_self(id, own) => Some(id),
            _ => {
                self.remembered = None;
                None
            }
        }
    }
}

impl Default for ScrollPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for ScrollPanel {
    fn type_name(&self) -> &'static str {
        "ScrollPanel"
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
        let gutter = self.gutter();
        let viewport_width = if constraints.width_bounded() {
            (constraints.max.width - gutter).max(0)
        } else {
            UNBOUNDED
        };

        // Content is measured against an unbounded height; the viewport
        // never truncates it, clipping does.
        let mut content_height = 0;
        let mut content_width = 0;
        for child in children.iter_mut() {
            let margin = child.margin();
            let child_constraints =
                Constraints::loose(Size::new(viewport_width, UNBOUNDED)).deflate(margin);
            let size = child.measure(ctx, child_constraints);
            content_height += size.height + margin.height();
            content_width = content_width.max(size.width + margin.width());
        }

        let desired = Size::new(
            if constraints.width_bounded() {
                constraints.max.width
            } else {
                content_width + gutter
            },
            if constraints.height_bounded() {
                constraints.max.height
            } else {
                content_height
            },
        );

        let scroll = ctx.state.scroll_mut(own);
        if scroll.auto_scroll() != self.auto_scroll {
            scroll.set_auto_scroll(self.auto_scroll);
        }
        scroll.set_viewport_size(Size::new((desired.width - gutter).max(0), desired.height));
        scroll.set_content_size(Size::new(content_width, content_height));
        self.scrollable = scroll.is_scrollable_x() || scroll.is_scrollable_y();

        desired
    }

    fn arrange(
        &mut self,
        own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        bounds: Region,
    ) {
        let viewport = self.viewport(bounds);
        let offset = {
            let scroll = ctx.state.scroll_mut(own);
            scroll.set_viewport_size(viewport.size());
            scroll.offset
        };

        // Children are arranged in content coordinates shifted by the
        // scroll offset; the viewport clip hides what falls outside.
        let mut y = viewport.y - offset.y;
        let x = viewport.x - offset.x;
        for child in children.iter_mut() {
            let margin = child.margin();
            let desired = child.desired();
            child.arrange(
                ctx,
                Region::new(x + margin.left, y + margin.top, desired.width, desired.height),
            );
            y += desired.height + margin.height();
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

        // Children only ever paint inside viewport ∩ incoming clip; this is
        // the mechanism that keeps scrolled-out content invisible.
        let viewport_clip = clip.intersection(self.viewport(bounds));
        let inherited = inherited.layer(self.fg.as_deref(), self.bg.as_deref());
        paint_children(children, ctx, buffer, viewport_clip, &inherited);

        if self.show_scrollbar && bounds.width > 0 {
            self.paint_scrollbar(own, bounds, clip, ctx, buffer, &style);
        }
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

impl ScrollPanel {
    fn paint_scrollbar(
        &self,
        own: ControlId,
        bounds: Region,
        clip: Region,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
        base: &CellStyle,
    ) {
        let Some(scroll) = ctx.state.scroll(own) else {
            return;
        };
        let bar = ScrollbarState::vertical(scroll);
        let track_x = bounds.right() - 1;
        let track_height = bounds.height;
        if track_height <= 0 {
            return;
        }

        let bar_style = CellStyle {
            fg: Some(
                ctx.theme
                    .scrollbar_fg
                    .as_deref()
                    .unwrap_or_else(|| base.fg.as_deref().unwrap_or("grey"))
                    .to_owned(),
            ),
            bg: base.bg.clone(),
            ..CellStyle::default()
        };

        let thumb_height = ((bar.thumb_size * track_height as f32).round() as i32)
            .clamp(1, track_height);
        let span = track_height - thumb_height;
        let thumb_top = bounds.y + (bar.thumb_position * span as f32).round() as i32;

        buffer.fill_char(
            Region::new(track_x, bounds.y, 1, track_height),
            '│',
            &bar_style,
            clip,
        );
        buffer.fill_char(
            Region::new(track_x, thumb_top, 1, thumb_height),
            '█',
            &bar_style,
            clip,
        );
    }
}

impl Interactive for ScrollPanel {
    /// Keys reaching the panel directly mean it is in scroll mode.
    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        let page = ctx
            .state
            .scroll(own)
            .map(|s| s.viewport.height.max(1))
            .unwrap_or(1);
        match ev.code {
            Key::Up => {
                self.scroll(own, ctx, 0, -1);
                true
            }
            Key::Down => {
                self.scroll(own, ctx, 0, 1);
                true
            }
            Key::PageUp => {
                self.scroll(own, ctx, 0, -page);
                true
            }
            Key::PageDown => {
                self.scroll(own, ctx, 0, page);
                true
            }
            Key::Left => self.scroll(own, ctx, -1, 0),
            Key::Right => self.scroll(own, ctx, 1, 0),
            Key::Home => {
                let state = ctx.state.scroll_mut(own);
                state.scroll_to(state.offset.x, 0);
                ctx.invalidate_all(own);
                true
            }
            Key::End => {
                let state = ctx.state.scroll_mut(own);
                let max = state.max_scroll();
                state.scroll_to(state.offset.x, max.y);
                ctx.invalidate_all(own);
                true
            }
            Key::Tab => {
                // Leave scroll mode: restore the remembered child, or enter
                // the first focusable child.
                if let Some(remembered) = self.remembered_valid(own, ctx.tree) {
                    ctx.request_focus(remembered);
                    return true;
                }
                let children: Vec<ControlId> = ctx.tree.children(own).to_vec();
                for child in children {
                    if let Some(target) =
                        resolve_entry(ctx.tree, ctx.state, child, FocusHint::Forward)
                    {
                        ctx.request_focus(target);
                        return true;
                    }
                }
                false
            }
            _ => false,
        }
    }
}

impl Focusable for ScrollPanel {
    /// Only consulted when no descendant can take focus; scrollability is
    /// refreshed each measure pass.
    fn accepts_focus(&self) -> bool {
        self.scrollable
    }

    fn focused(&self) -> bool {
        self.focus == PanelFocus::ScrollMode
    }

    fn focus_in(&mut self, _hint: FocusHint) {
        self.focus = PanelFocus::ScrollMode;
    }

    fn focus_out(&mut self) {
        self.focus = PanelFocus::NoFocus;
        self.remembered = None;
    }
}

impl MouseAware for ScrollPanel {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        _bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        match ev.kind {
            MouseKind::WheelUp => self.scroll(own, ctx, 0, -WHEEL_STEP),
            MouseKind::WheelDown => self.scroll(own, ctx, 0, WHEEL_STEP),
            _ => false,
        }
    }
}

impl Container for ScrollPanel {
    fn focus_enter(
        &mut self,
        own: ControlId,
        _hint: FocusHint,
        tree: &ControlTree,
        _state: &mut StateServices,
    ) -> FocusEnter {
        if let Some(remembered) = self.remembered_valid(own, tree) {
            return FocusEnter::Child(remembered);
        }
        if has_focusable_descendant(tree, own) {
            FocusEnter::Descend
        } else if self.scrollable {
            FocusEnter::SelfFocus
        } else {
            FocusEnter::Skip
        }
    }

    fn handle_descendant_key(
        &mut self,
        own: ControlId,
        from: ControlId,
        ev: &KeyEvent,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        if ev.code == Key::Escape {
            // Child releases focus; the panel keeps it for scrolling. The
            // child stays remembered for the next Tab.
            ctx.request_focus(own);
            return true;
        }
        container_tab(own, from, ev, ctx)
    }

    fn descendant_focused(&mut self, own: ControlId, target: ControlId) {
        if target != own {
            self.focus = PanelFocus::ChildFocused;
            self.remembered = Some(target);
        }
    }

    fn focus_left(&mut self, _own: ControlId) {
        self.focus = PanelFocus::NoFocus;
        self.remembered = None;
    }

    fn child_removed(&mut self, child: ControlId) {
        if self.remembered == Some(child) {
            self.remembered = None;
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
    use crate::state::StateServices;
    use crate::text::TextMeasurer;
    use crate::theme::Theme;
    use crate::tree::ControlTree;

    /// Panel with `rows` one-line labels in a `width` x `height` viewport.
    fn panel_fixture(
        rows: usize,
        width: i32,
        height: i32,
        auto_scroll: bool,
    ) -> (ControlTree, ControlId, StateServices, TextMeasurer) {
        let mut tree = ControlTree::new();
        let panel = tree.insert(ScrollPanel::new().with_auto_scroll(auto_scroll));
        for i in 0..rows {
            tree.insert_child(panel, Label::new(format!("line {i}")));
        }
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        layout(&tree, panel, &mut state, &mut text, width, height);
        (tree, panel, state, text)
    }

    fn layout(
        tree: &ControlTree,
        panel: ControlId,
        state: &mut StateServices,
        text: &mut TextMeasurer,
        width: i32,
        height: i32,
    ) {
        let mut node = LayoutNode::build(tree, panel).unwrap();
        let mut ctx = LayoutCtx { state, text };
        node.measure(&mut ctx, Constraints::tight(Size::new(width, height)));
        node.arrange(&mut ctx, Region::new(0, 0, width, height));
    }

    fn paint(
        tree: &ControlTree,
        panel: ControlId,
        state: &mut StateServices,
        text: &mut TextMeasurer,
        width: u16,
        height: u16,
    ) -> Buffer {
        let mut node = LayoutNode::build(tree, panel).unwrap();
        let mut buffer = Buffer::new(width, height);
        {
            let mut ctx = LayoutCtx { state: &mut *state, text: &mut *text };
            node.measure(
                &mut ctx,
                Constraints::tight(Size::new(width as i32, height as i32)),
            );
            node.arrange(&mut ctx, Region::new(0, 0, width as i32, height as i32));
        }
        let theme = Theme::empty();
        let mut pctx = PaintCtx { state: &mut *state, text: &mut *text, theme: &theme };
        let region = buffer.region();
        node.paint(&mut pctx, &mut buffer, region, &Inherited::default());
        buffer
    }

    fn row_text(buffer: &Buffer, y: i32) -> String {
        (0..buffer.width())
            .map(|x| buffer.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Measurement and scroll state
    // -----------------------------------------------------------------------

    #[test]
    fn content_extent_tracks_children() {
        let (_tree, panel, state, _) = panel_fixture(50, 20, 10, false);
        let scroll = state.scroll(panel).unwrap();
        assert_eq!(scroll.content.height, 50);
        assert_eq!(scroll.viewport.height, 10);
        assert_eq!(scroll.max_scroll().y, 40);
    }

    #[test]
    fn overscroll_clamps_to_zero() {
        let (_tree, panel, mut state, _) = panel_fixture(50, 20, 10, false);
        state.scroll_mut(panel).scroll_by(0, -100);
        assert_eq!(state.scroll(panel).unwrap().offset.y, 0);
    }

    // -----------------------------------------------------------------------
    // Clipping
    // -----------------------------------------------------------------------

    #[test]
    fn scrolled_out_rows_paint_nothing() {
        let (tree, panel, mut state, mut text) = panel_fixture(30, 20, 5, false);
        let buffer = paint(&tree, panel, &mut state, &mut text, 20, 5);
        assert!(row_text(&buffer, 0).contains("line 0"));
        assert!(row_text(&buffer, 4).contains("line 4"));
        // Nothing from rows 5.. appears anywhere in the 5-row viewport.
        for y in 0..5 {
            assert!(!row_text(&buffer, y).contains("line 5"));
        }
    }

    #[test]
    fn scrolling_reveals_lower_rows() {
        let (tree, panel, mut state, mut text) = panel_fixture(30, 20, 5, false);
        state.scroll_mut(panel).scroll_to(0, 10);
        let buffer = paint(&tree, panel, &mut state, &mut text, 20, 5);
        assert!(row_text(&buffer, 0).contains("line 10"));
        assert!(!row_text(&buffer, 0).contains("line 0 "));
    }

    #[test]
    fn auto_scroll_pins_after_each_append() {
        let (mut tree, panel, mut state, mut text) = panel_fixture(20, 20, 5, true);
        assert_eq!(state.scroll(panel).unwrap().offset.y, 15);
        for i in 0..3 {
            tree.insert_child(panel, Label::new(format!("new {i}")));
            layout(&tree, panel, &mut state, &mut text, 20, 5);
            let scroll = state.scroll(panel).unwrap();
            assert_eq!(scroll.offset.y, scroll.max_scroll().y);
        }
    }

    // -----------------------------------------------------------------------
    // Focus state machine (unit level; full routing in integration tests)
    // -----------------------------------------------------------------------

    #[test]
    fn focus_enter_prefers_focusable_children() {
        let mut tree = ControlTree::new();
        let panel_id = tree.insert(ScrollPanel::new());
        let _label = tree.insert_child(panel_id, Label::new("x"));
        let button = tree.insert_child(panel_id, crate::controls::Button::new("ok"));
        let mut state = StateServices::new();
        let target = resolve_entry(&tree, &mut state, panel_id, FocusHint::Forward);
        assert_eq!(target, Some(button));
    }

    #[test]
    fn focus_enter_backward_picks_last_child() {
        let mut tree = ControlTree::new();
        let panel_id = tree.insert(ScrollPanel::new());
        let _first = tree.insert_child(panel_id, crate::controls::Button::new("a"));
        let last = tree.insert_child(panel_id, crate::controls::Button::new("b"));
        let mut state = StateServices::new();
        let target = resolve_entry(&tree, &mut state, panel_id, FocusHint::Backward);
        assert_eq!(target, Some(last));
    }

    #[test]
    fn focus_enter_scroll_mode_without_focusable_children() {
        let (tree, panel, mut state, _) = panel_fixture(50, 20, 10, false);
        let target = resolve_entry(&tree, &mut state, panel, FocusHint::Forward);
        assert_eq!(target, Some(panel));
    }

    #[test]
    fn focus_enter_skips_when_nothing_to_do() {
        // Content fits and nothing is focusable: the panel is not a stop.
        let (tree, panel, mut state, _) = panel_fixture(3, 20, 10, false);
        let target = resolve_entry(&tree, &mut state, panel, FocusHint::Forward);
        assert_eq!(target, None);
    }

    #[test]
    fn remembered_child_wins_on_reentry() {
        let mut tree = ControlTree::new();
        let panel_id = tree.insert(ScrollPanel::new());
        let first = tree.insert_child(panel_id, crate::controls::Button::new("a"));
        let second = tree.insert_child(panel_id, crate::controls::Button::new("b"));
        let mut state = StateServices::new();

        {
            let handle = tree.handle(panel_id).unwrap();
            let mut control = handle.borrow_mut();
            control.container().unwrap().descendant_focused(panel_id, second);
        }
        assert_eq!(
            resolve_entry(&tree, &mut state, panel_id, FocusHint::Forward),
            Some(second)
        );

        // Removing the remembered child falls back to the first target.
        let mut scheduler = crate::scheduler::Scheduler::new();
        tree.remove(second, &mut state, &mut scheduler);
        assert_eq!(
            resolve_entry(&tree, &mut state, panel_id, FocusHint::Forward),
            Some(first)
        );
    }
}
