//! The window: root of layout, focus, invalidation, and portals.
//!
//! A `Window` owns the control tree, the state services, the focus router,
//! the portal registry, and the front/back character buffers. Each call to
//! [`Window::render`] runs one full paint cycle — drain due scheduler
//! actions and cross-thread invalidations, rebuild the layout-node tree,
//! measure, arrange, paint (main tree first, then portals on top) — and
//! returns the cell diff against the previous frame for the driver.

use std::time::Instant;

use crate::control::{Control, FocusHint};
use crate::event::UiEvent;
use crate::focus::{resolve_entry, EventCtx, FocusRouter};
use crate::geometry::{Constraints, Region, Size};
use crate::input::{InputEvent, KeyEvent, MouseEvent};
use crate::layout::{LayoutCtx, LayoutNode, PaintCtx};
use crate::portal::{self, PortalId, PortalSet};
use crate::render::{Buffer, CellUpdate};
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::state::StateServices;
use crate::text::TextMeasurer;
use crate::theme::{Inherited, Theme};
use crate::tree::{ControlId, ControlTree};

/// The root container: buffer region, portal mechanism, and the top-level
/// focus/invalidation root.
pub struct Window {
    pub tree: ControlTree,
    pub state: StateServices,
    pub portals: PortalSet,
    pub scheduler: Scheduler,
    pub theme: Theme,
    router: FocusRouter,
    text: TextMeasurer,
    buffer: Buffer,
    previous: Buffer,
    events: Vec<UiEvent>,
    width: u16,
    height: u16,
}

impl Window {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            tree: ControlTree::new(),
            state: StateServices::new(),
            portals: PortalSet::new(),
            scheduler: Scheduler::new(),
            theme: Theme::empty(),
            router: FocusRouter::new(),
            text: TextMeasurer::new(),
            buffer: Buffer::new(width, height),
            previous: Buffer::new(width, height),
            events: Vec::new(),
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    /// Resize the window. Both frames are blanked so the next diff repaints
    /// everything, and the whole tree is invalidated.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer.resize(width, height);
        self.previous.resize(width, height);
        if let Some(root) = self.tree.root() {
            self.state.invalidate(&self.tree, root, true);
        }
    }

    /// The control currently holding focus.
    pub fn focused(&self) -> Option<ControlId> {
        self.router.focused()
    }

    /// Move focus into `id` (resolving container delegation). Returns
    /// whether anything took the focus.
    pub fn focus_control(&mut self, id: ControlId) -> bool {
        match resolve_entry(&self.tree, &mut self.state, id, FocusHint::Forward) {
            Some(target) => {
                self.router.set_focus(
                    Some(target),
                    FocusHint::Forward,
                    &self.tree,
                    &mut self.state,
                    &mut self.events,
                );
                true
            }
            None => false,
        }
    }

    /// Drop focus entirely.
    pub fn clear_focus(&mut self) {
        self.router.set_focus(
            None,
            FocusHint::Forward,
            &self.tree,
            &mut self.state,
            &mut self.events,
        );
    }

    /// Route an input event. Returns whether it was handled.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                true
            }
            InputEvent::FocusGained | InputEvent::FocusLost | InputEvent::Paste(_) => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let mut ctx = EventCtx::new(
            &mut self.tree,
            &mut self.state,
            &mut self.portals,
            &mut self.scheduler,
            &mut self.events,
        );
        let handled = self.router.dispatch_key(&mut ctx, &key);
        let (focus_request, invalidations) = ctx.into_effects();
        self.apply_effects(focus_request, invalidations);
        handled
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let mut ctx = EventCtx::new(
            &mut self.tree,
            &mut self.state,
            &mut self.portals,
            &mut self.scheduler,
            &mut self.events,
        );
        let handled = self.router.dispatch_mouse(&mut ctx, &mouse);
        let (focus_request, invalidations) = ctx.into_effects();
        self.apply_effects(focus_request, invalidations);
        handled
    }

    fn apply_effects(
        &mut self,
        focus_request: Option<crate::focus::FocusRequest>,
        invalidations: Vec<(ControlId, bool)>,
    ) {
        for (id, redraw_all) in invalidations {
            self.state.invalidate(&self.tree, id, redraw_all);
        }
        if let Some(request) = focus_request {
            self.router
                .apply_focus_request(request, &self.tree, &mut self.state, &mut self.events);
        }
    }

    /// Drain events emitted by controls since the last call.
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Tree and state mutation ──────────────────────────────────────

    /// Insert a child control and invalidate up from it, so the change is
    /// repainted even through render-cache boundaries.
    pub fn add_child(&mut self, parent: ControlId, control: impl Control + 'static) -> ControlId {
        let id = self.tree.insert_child(parent, control);
        self.state.invalidate(&self.tree, id, false);
        id
    }

    /// Remove a control (and its subtree) with full cleanup, invalidating
    /// the spot it occupied.
    pub fn remove_control(&mut self, id: ControlId) -> bool {
        let parent = self.tree.parent(id);
        let removed = self.tree.remove(id, &mut self.state, &mut self.scheduler);
        if removed {
            if let Some(parent) = parent {
                self.state.invalidate(&self.tree, parent, true);
            }
        }
        removed
    }

    /// Mark a control dirty; the invalidation bubbles to every enclosing
    /// cache boundary.
    pub fn invalidate(&mut self, id: ControlId) {
        self.state.invalidate(&self.tree, id, true);
    }

    /// Set a control's scroll offset directly (clamped) and invalidate it.
    /// This is the public setter for scroll restoration — no private-state
    /// workarounds required.
    pub fn set_scroll(&mut self, id: ControlId, x: i32, y: i32) {
        self.state.scroll_mut(id).scroll_to(x, y);
        self.state.invalidate(&self.tree, id, true);
    }

    // ── Portals ──────────────────────────────────────────────────────

    /// Open a portal anchored at `anchor` rendering `content`.
    pub fn create_portal(&mut self, anchor: ControlId, content: impl Control + 'static) -> PortalId {
        let content_id = self.tree.insert_detached(content);
        self.portals.create(anchor, content_id)
    }

    /// Close a portal, removing its content control from the tree.
    pub fn remove_portal(&mut self, anchor: ControlId, id: PortalId) -> bool {
        match self.portals.remove(anchor, id) {
            Some(portal) => {
                self.tree
                    .remove(portal.content, &mut self.state, &mut self.scheduler);
                true
            }
            None => false,
        }
    }

    // ── Render cycle ─────────────────────────────────────────────────

    /// Run one paint cycle and return the cell updates against the
    /// previous frame.
    pub fn render(&mut self) -> Vec<CellUpdate> {
        self.run_scheduler(Instant::now());
        self.sweep_dead_portals();
        self.drain_async_invalidations();

        std::mem::swap(&mut self.previous, &mut self.buffer);
        self.buffer.clear();

        let screen = Region::new(0, 0, self.width as i32, self.height as i32);
        let inherited = Inherited::default();

        if let Some(root) = self.tree.root() {
            if let Some(mut node) = LayoutNode::build(&self.tree, root) {
                let mut lctx = LayoutCtx { state: &mut self.state, text: &mut self.text };
                node.measure(&mut lctx, Constraints::tight(screen.size()));
                node.arrange(&mut lctx, screen);
                let mut pctx = PaintCtx {
                    state: &mut self.state,
                    text: &mut self.text,
                    theme: &self.theme,
                };
                node.paint(&mut pctx, &mut self.buffer, screen, &inherited);
            }
        }

        self.paint_portals(screen, &inherited);

        self.buffer.diff(&self.previous)
    }

    /// Portals paint after (on top of) the main tree, in creation order,
    /// positioned from their anchor's last-arranged bounds with the
    /// flip-upward rule.
    fn paint_portals(&mut self, screen: Region, inherited: &Inherited) {
        let portals: Vec<(ControlId, ControlId)> = self
            .portals
            .iter()
            .map(|(_, p)| (p.anchor, p.content))
            .collect();

        for (anchor, content) in portals {
            let Some(mut node) = LayoutNode::build(&self.tree, content) else {
                continue;
            };
            let anchor_bounds = self.state.bounds(anchor);
            let mut lctx = LayoutCtx { state: &mut self.state, text: &mut self.text };
            let desired = node.measure(&mut lctx, Constraints::loose(screen.size()));
            let placed = portal::place(anchor_bounds, desired, screen.size());
            node.arrange(&mut lctx, placed);
            let mut pctx = PaintCtx {
                state: &mut self.state,
                text: &mut self.text,
                theme: &self.theme,
            };
            node.paint(&mut pctx, &mut self.buffer, screen, inherited);
        }
    }

    /// The current front buffer (the last rendered frame).
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// A portal whose anchor left the tree is dead; close it and drop its
    /// content control.
    fn sweep_dead_portals(&mut self) {
        let dead: Vec<(PortalId, ControlId, ControlId)> = self
            .portals
            .iter()
            .filter(|(_, p)| !self.tree.contains(p.anchor))
            .map(|(id, p)| (id, p.anchor, p.content))
            .collect();
        for (id, anchor, content) in dead {
            self.portals.remove(anchor, id);
            self.tree.remove(content, &mut self.state, &mut self.scheduler);
        }
    }

    fn run_scheduler(&mut self, now: Instant) {
        for action in self.scheduler.take_due(now) {
            match action {
                ScheduledAction::RestoreScroll { panel, offset } => {
                    if self.tree.contains(panel) {
                        self.state.scroll_mut(panel).scroll_to(offset.x, offset.y);
                        self.state.invalidate(&self.tree, panel, false);
                    }
                }
            }
        }
    }

    /// Controls invalidated from other threads flag themselves; the flags
    /// are drained into real invalidations here, on the UI thread.
    fn drain_async_invalidations(&mut self) {
        for id in self.tree.all_ids() {
            let Some(handle) = self.tree.handle(id) else {
                continue;
            };
            let pending = handle.borrow_mut().take_async_invalidate();
            if pending {
                self.state.invalidate(&self.tree, id, false);
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Button, Column, Label};
    use crate::event::UiEventKind;
    use crate::geometry::Offset;
    use crate::input::{Key, MouseButton, MouseKind};

    fn window_with_buttons() -> (Window, ControlId, ControlId, ControlId) {
        let mut w = Window::new(40, 10);
        let root = w.tree.insert(Column::new());
        let a = w.tree.insert_child(root, Button::new("Alpha"));
        let b = w.tree.insert_child(root, Button::new("Beta"));
        (w, root, a, b)
    }

    #[test]
    fn empty_window_renders_blank() {
        let mut w = Window::new(10, 3);
        let updates = w.render();
        assert!(updates.is_empty());
    }

    #[test]
    fn render_paints_controls() {
        let (mut w, _root, _a, _b) = window_with_buttons();
        let updates = w.render();
        assert!(!updates.is_empty());
        let text: String = (0..40)
            .map(|x| w.buffer().get(x, 0).map(|c| c.ch).unwrap_or(' '))
            .collect();
        assert!(text.contains("Alpha"), "row 0 was {text:?}");
    }

    #[test]
    fn second_render_of_static_tree_diffs_empty() {
        let (mut w, ..) = window_with_buttons();
        let first = w.render();
        assert!(!first.is_empty());
        let second = w.render();
        assert!(second.is_empty());
    }

    #[test]
    fn tab_cycles_focus_and_wraps() {
        let (mut w, _root, a, b) = window_with_buttons();
        w.render();
        assert!(w.handle_input(InputEvent::Key(KeyEvent::plain(Key::Tab))));
        assert_eq!(w.focused(), Some(a));
        w.handle_input(InputEvent::Key(KeyEvent::plain(Key::Tab)));
        assert_eq!(w.focused(), Some(b));
        w.handle_input(InputEvent::Key(KeyEvent::plain(Key::Tab)));
        assert_eq!(w.focused(), Some(a));
    }

    #[test]
    fn backtab_cycles_in_reverse() {
        let (mut w, _root, a, b) = window_with_buttons();
        w.render();
        w.handle_input(InputEvent::Key(KeyEvent::plain(Key::BackTab)));
        assert_eq!(w.focused(), Some(b));
        w.handle_input(InputEvent::Key(KeyEvent::plain(Key::BackTab)));
        assert_eq!(w.focused(), Some(a));
    }

    #[test]
    fn focus_is_unique_across_tree() {
        let (mut w, _root, a, b) = window_with_buttons();
        w.render();
        w.focus_control(a);
        w.focus_control(b);
        // Count controls reporting focus.
        let mut focused_count = 0;
        for id in w.tree.all_ids() {
            let handle = w.tree.handle(id).unwrap();
            if handle.borrow_mut().focusable().is_some_and(|f| f.focused()) {
                focused_count += 1;
            }
        }
        assert_eq!(focused_count, 1);
        assert_eq!(w.focused(), Some(b));
    }

    #[test]
    fn focus_events_are_emitted() {
        let (mut w, _root, a, b) = window_with_buttons();
        w.render();
        w.take_events();
        w.focus_control(a);
        w.focus_control(b);
        let events = w.take_events();
        assert!(events.contains(&UiEvent::new(a, UiEventKind::FocusChanged { gained: true })));
        assert!(events.contains(&UiEvent::new(a, UiEventKind::FocusChanged { gained: false })));
        assert!(events.contains(&UiEvent::new(b, UiEventKind::FocusChanged { gained: true })));
    }

    #[test]
    fn enter_on_focused_button_emits_pressed() {
        let (mut w, _root, a, _b) = window_with_buttons();
        w.render();
        w.focus_control(a);
        w.take_events();
        assert!(w.handle_input(InputEvent::Key(KeyEvent::plain(Key::Enter))));
        let events = w.take_events();
        assert!(events.contains(&UiEvent::new(a, UiEventKind::Pressed)));
    }

    #[test]
    fn click_focuses_and_presses_button() {
        let (mut w, _root, a, _b) = window_with_buttons();
        w.render();
        w.take_events();
        // Button "Alpha" occupies row 0.
        let down = MouseEvent::new(MouseKind::Down(MouseButton::Left), 2, 0);
        assert!(w.handle_input(InputEvent::Mouse(down)));
        assert_eq!(w.focused(), Some(a));
        let events = w.take_events();
        assert!(events.contains(&UiEvent::new(a, UiEventKind::Pressed)));
    }

    #[test]
    fn resize_invalidates_and_repaints() {
        let (mut w, ..) = window_with_buttons();
        w.render();
        w.handle_input(InputEvent::Resize { width: 30, height: 8 });
        assert_eq!(w.size(), Size::new(30, 8));
        let updates = w.render();
        assert!(!updates.is_empty());
    }

    #[test]
    fn portal_paints_over_main_tree() {
        let mut w = Window::new(20, 6);
        let root = w.tree.insert(Column::new());
        let anchor = w.tree.insert_child(root, Label::new("anchor"));
        w.render();
        let pid = w.create_portal(anchor, Label::new("POPUP"));
        w.render();
        // The popup sits on the row below the anchor label.
        let row1: String = (0..20)
            .map(|x| w.buffer().get(x, 1).map(|c| c.ch).unwrap_or(' '))
            .collect();
        assert!(row1.contains("POPUP"), "row 1 was {row1:?}");

        assert!(w.remove_portal(anchor, pid));
        w.render();
        let row1_after: String = (0..20)
            .map(|x| w.buffer().get(x, 1).map(|c| c.ch).unwrap_or(' '))
            .collect();
        assert!(!row1_after.contains("POPUP"));
    }

    #[test]
    fn scheduler_restore_applies_on_render() {
        let mut w = Window::new(20, 6);
        let root = w.tree.insert(Column::new());
        let _label = w.tree.insert_child(root, Label::new("x"));
        // Seed a scroll state to restore into.
        w.state.scroll_mut(root).set_viewport_size(Size::new(20, 6));
        w.state.scroll_mut(root).set_content_size(Size::new(20, 50));
        let due = Instant::now();
        w.scheduler.schedule_at(
            root,
            due,
            ScheduledAction::RestoreScroll { panel: root, offset: Offset::new(0, 7) },
        );
        w.render();
        assert_eq!(w.state.scroll(root).unwrap().offset, Offset::new(0, 7));
    }
}
