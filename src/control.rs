//! The control contract and its capability traits.
//!
//! Every UI element implements [`Control`]: the base window-control surface
//! (type name, visibility, margin, alignment, sizing policy) plus the
//! measure/arrange/paint protocol driven by [`LayoutNode`]. Optional
//! behavior lives behind capability queries — [`Interactive`],
//! [`Focusable`], [`MouseAware`], [`Resizable`], [`Container`] — which the
//! pipeline stages probe with `Option` returns instead of downcasting. A
//! control that answers `None` to a capability simply never enters that part
//! of the pipeline: a non-interactive control is invisible to the focus
//! router.

use std::cell::RefCell;
use std::rc::Rc;

use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size, Spacing};
use crate::input::{KeyEvent, MouseEvent};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::Buffer;
use crate::state::StateServices;
use crate::theme::Inherited;
use crate::tree::{ControlId, ControlTree};

/// Shared handle to a control. The tree arena owns one of these per node;
/// layout nodes clone it per paint cycle.
pub type ControlRef = Rc<RefCell<dyn Control>>;

// ---------------------------------------------------------------------------
// Supporting value types
// ---------------------------------------------------------------------------

/// Direction a focus transfer arrived from, used to pick the first or last
/// focusable child when focus enters a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusHint {
    Forward,
    Backward,
}

impl FocusHint {
    /// The opposite direction.
    pub fn reversed(self) -> FocusHint {
        match self {
            FocusHint::Forward => FocusHint::Backward,
            FocusHint::Backward => FocusHint::Forward,
        }
    }
}

/// Horizontal placement of a control inside a wider slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A column/cell sizing policy consumed by the flex distribution algorithm.
///
/// Exactly one of the two modes applies; a flexible policy always has a
/// factor of at least one after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// Explicit width in cells.
    Fixed(i32),
    /// Flexible width: at least `min`, at most `max` (unbounded if `None`),
    /// growing in proportion to `factor`.
    Flex { min: i32, max: Option<i32>, factor: u32 },
}

impl SizePolicy {
    /// Flexible policy with the given factor (floored at 1) and no bounds.
    pub fn flex(factor: u32) -> Self {
        SizePolicy::Flex { min: 0, max: None, factor: factor.max(1) }
    }

    /// Fixed policy, floored at zero.
    pub fn fixed(width: i32) -> Self {
        SizePolicy::Fixed(width.max(0))
    }

    /// Whether this is the fixed mode.
    pub fn is_fixed(&self) -> bool {
        matches!(self, SizePolicy::Fixed(_))
    }
}

impl Default for SizePolicy {
    fn default() -> Self {
        SizePolicy::flex(1)
    }
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// Base contract implemented by every control, leaf or container.
///
/// The measure/arrange/paint methods receive the control's own [`ControlId`]
/// so state-service entries (scroll offset, selection, cached bounds) can be
/// looked up without the control storing its identity, and its child layout
/// nodes so containers drive their children's layout directly.
pub trait Control {
    /// Type name for diagnostics (e.g. "Button", "ScrollPanel").
    fn type_name(&self) -> &'static str;

    /// Invisible controls are skipped when the layout-node tree is built.
    fn visible(&self) -> bool {
        true
    }

    /// Outer margin applied by the parent container.
    fn margin(&self) -> Spacing {
        Spacing::ZERO
    }

    /// Horizontal placement when the arranged slot is wider than the
    /// desired size.
    fn h_align(&self) -> HAlign {
        HAlign::Left
    }

    /// Width sizing policy consumed by grid-style containers.
    fn width_policy(&self) -> SizePolicy {
        SizePolicy::default()
    }

    /// Explicit control-level (fg, bg) colors, the head of the color
    /// resolution chain.
    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (None, None)
    }

    /// Whether this control composes children. Container subtrees are
    /// eligible for render caching.
    fn is_container(&self) -> bool {
        false
    }

    /// Compute the desired size under the given constraints. Must not
    /// depend on arranged bounds; the caller clamps the result into the
    /// constraints.
    fn measure(
        &mut self,
        own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size;

    /// Assign child bounds in absolute buffer coordinates. Leaf controls
    /// have nothing to do. Never re-measures.
    fn arrange(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        _ctx: &mut LayoutCtx<'_>,
        _bounds: Region,
    ) {
    }

    /// Write styled cells into the buffer, restricted to `clip`.
    fn paint(
        &self,
        own: ControlId,
        children: &[LayoutNode],
        bounds: Region,
        clip: Region,
        inherited: &Inherited,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
    );

    /// Drain a pending invalidation raised from another thread. Checked on
    /// the UI thread at the top of every render cycle.
    fn take_async_invalidate(&mut self) -> bool {
        false
    }

    /// Called once when the control is removed from the tree, before its
    /// state-service entries are dropped.
    fn on_dispose(&mut self, _own: ControlId, _state: &mut StateServices) {}

    // ── Capability queries ───────────────────────────────────────────

    fn interactive(&mut self) -> Option<&mut dyn Interactive> {
        None
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }

    fn mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        None
    }

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        None
    }

    fn container(&mut self) -> Option<&mut dyn Container> {
        None
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Keyboard handling. The focus router offers the key to the focused
/// control first; returning `false` lets it bubble to enclosing containers.
pub trait Interactive {
    fn enabled(&self) -> bool {
        true
    }

    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool;
}

/// Focus ownership. The router is the only caller of `focus_in`/`focus_out`,
/// which is what keeps focus unique across the window.
pub trait Focusable {
    /// Whether the control can currently take focus (e.g. not disabled).
    fn accepts_focus(&self) -> bool {
        true
    }

    fn focused(&self) -> bool;

    fn focus_in(&mut self, hint: FocusHint);

    fn focus_out(&mut self);
}

/// Mouse handling. `bounds` is the control's last-arranged region so the
/// handler can derive local coordinates.
pub trait MouseAware {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool;
}

/// Width mutation, used by splitters to commit drag results onto their
/// neighbor columns.
pub trait Resizable {
    /// The explicit width, if one has been committed.
    fn fixed_width(&self) -> Option<i32>;

    /// Commit an explicit width. On a previously flexible column this
    /// converts it to fixed.
    fn set_fixed_width(&mut self, width: i32);

    /// The narrowest width a drag may impose.
    fn min_width(&self) -> i32 {
        1
    }
}

/// A container's answer when focus tries to enter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEnter {
    /// Let the router scan this container's children in order.
    Descend,
    /// Delegate to a specific child (e.g. a remembered focus target).
    Child(ControlId),
    /// Take the focus itself (e.g. a scroll panel entering scroll mode).
    SelfFocus,
    /// Nothing here can take focus.
    Skip,
}

/// Container-level behavior: focus delegation, key bubbling, and child
/// lifecycle notifications.
pub trait Container {
    /// Decide how focus enters this container.
    fn focus_enter(
        &mut self,
        _own: ControlId,
        _hint: FocusHint,
        _tree: &ControlTree,
        _state: &mut StateServices,
    ) -> FocusEnter {
        FocusEnter::Descend
    }

    /// A key event unhandled by the focused descendant bubbles here.
    /// `from` is this container's direct child on the bubble path.
    fn handle_descendant_key(
        &mut self,
        _own: ControlId,
        _from: ControlId,
        _ev: &KeyEvent,
        _ctx: &mut EventCtx<'_>,
    ) -> bool {
        false
    }

    /// A descendant of this container received focus.
    fn descendant_focused(&mut self, _own: ControlId, _target: ControlId) {}

    /// Focus moved entirely outside this container's subtree.
    fn focus_left(&mut self, _own: ControlId) {}

    /// A direct child was removed. Containers must drop any remembered
    /// reference to it here so the reference can never dangle.
    fn child_removed(&mut self, _child: ControlId) {}
}

// ===========================================================================
// Tests
// ===========================================================================
