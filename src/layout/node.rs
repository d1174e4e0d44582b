//! Layout nodes: the measure → arrange → paint drive.
//!
//! A [`LayoutNode`] wraps one control (shared handle) together with its
//! measured size, arranged bounds, and exclusively-owned child nodes. Node
//! trees are rebuilt from the control tree every paint cycle by
//! [`LayoutNode::build`] — nodes are cheap, and rebuilding sidesteps every
//! stale-tree bug a persisted mirror would invite. The three phases run
//! strictly in order per cycle:
//!
//! 1. `measure` — desired size under constraints, clamped by this node (the
//!    producer side of the constraint contract);
//! 2. `arrange` — absolute bounds assigned, recorded for hit-testing;
//! 3. `paint` — clip composed by intersection on the way down, with
//!    per-node panic isolation and container-level render caching.

use std::panic::{self, AssertUnwindSafe};

use crate::control::ControlRef;
use crate::control::{HAlign, SizePolicy};
use crate::geometry::{Constraints, Region, Size, Spacing};
use crate::render::Buffer;
use crate::state::StateServices;
use crate::text::TextMeasurer;
use crate::theme::{Inherited, Theme};
use crate::tree::{ControlId, ControlTree};

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// Services available during measure and arrange.
pub struct LayoutCtx<'a> {
    pub state: &'a mut StateServices,
    pub text: &'a mut TextMeasurer,
}

/// Services available during paint.
pub struct PaintCtx<'a> {
    pub state: &'a mut StateServices,
    pub text: &'a mut TextMeasurer,
    pub theme: &'a Theme,
}

// ---------------------------------------------------------------------------
// LayoutNode
// ---------------------------------------------------------------------------

/// One node in the per-cycle layout tree.
pub struct LayoutNode {
    id: ControlId,
    control: ControlRef,
    /// Child nodes, exclusively owned, in visual order.
    pub children: Vec<LayoutNode>,
    desired: Size,
    bounds: Region,
}

impl LayoutNode {
    /// Build the layout subtree for `id` from the control tree. Invisible
    /// controls (and their subtrees) are skipped; returns `None` when `id`
    /// is missing or invisible.
    pub fn build(tree: &ControlTree, id: ControlId) -> Option<LayoutNode> {
        let control = tree.handle(id)?;
        if !control.borrow().visible() {
            return None;
        }
        let children = tree
            .children(id)
            .iter()
            .filter_map(|&child| Self::build(tree, child))
            .collect();
        Some(LayoutNode {
            id,
            control,
            children,
            desired: Size::ZERO,
            bounds: Region::EMPTY,
        })
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Desired size from the last measure.
    pub fn desired(&self) -> Size {
        self.desired
    }

    /// Arranged bounds from the last arrange.
    pub fn bounds(&self) -> Region {
        self.bounds
    }

    /// The wrapped control's margin.
    pub fn margin(&self) -> Spacing {
        self.control.borrow().margin()
    }

    /// The wrapped control's horizontal alignment.
    pub fn h_align(&self) -> HAlign {
        self.control.borrow().h_align()
    }

    /// The wrapped control's width policy.
    pub fn width_policy(&self) -> SizePolicy {
        self.control.borrow().width_policy()
    }

    /// Phase 1: measure under `constraints`. The control's answer is
    /// clamped into the constraints here, so consumers can rely on the
    /// result satisfying the envelope without re-clamping.
    pub fn measure(&mut self, ctx: &mut LayoutCtx<'_>, constraints: Constraints) -> Size {
        let raw = self
            .control
            .borrow_mut()
            .measure(self.id, &mut self.children, ctx, constraints);
        self.desired = constraints.clamp(raw.non_negative());
        ctx.state.layout_mut(self.id).desired = self.desired;
        self.desired
    }

    /// Phase 2: assign absolute bounds. Never re-measures.
    pub fn arrange(&mut self, ctx: &mut LayoutCtx<'_>, bounds: Region) {
        self.bounds = bounds;
        ctx.state.layout_mut(self.id).bounds = bounds;
        self.control
            .borrow_mut()
            .arrange(self.id, &mut self.children, ctx, bounds);
    }

    /// Phase 3: paint into the buffer under `clip`.
    ///
    /// The effective clip is the incoming clip intersected with this node's
    /// bounds and is recorded for scroll-aware hit-testing. Container nodes
    /// whose clean cache still matches the arranged size are replayed from
    /// cached cells without touching the subtree. Each control's paint runs
    /// under `catch_unwind`: a panicking control logs an error and leaves
    /// its region blank instead of taking the whole frame down.
    pub fn paint(
        &self,
        ctx: &mut PaintCtx<'_>,
        buffer: &mut Buffer,
        clip: Region,
        inherited: &Inherited,
    ) {
        let clip = clip.intersection(self.bounds);
        ctx.state.layout_mut(self.id).clip = clip;
        if clip.is_empty() {
            return;
        }

        // Cache replay is only sound when the whole container is visible;
        // partially clipped containers paint normally.
        let is_container = self.control.borrow().is_container();
        let cacheable = is_container && clip.contains_region(self.bounds);
        if cacheable && !ctx.state.needs_rerender(self.id, self.bounds.size()) {
            if let Some(cells) = ctx.state.cached_cells(self.id) {
                buffer.blit(self.bounds.x, self.bounds.y, cells, clip);
                return;
            }
        }

        let painted = panic::catch_unwind(AssertUnwindSafe(|| {
            self.control
                .borrow()
                .paint(self.id, &self.children, self.bounds, clip, inherited, ctx, buffer);
        }));

        match painted {
            Ok(()) => {
                if cacheable {
                    let cells = buffer.snapshot(self.bounds);
                    ctx.state.store_cache(self.id, self.bounds.size(), cells);
                }
            }
            Err(_) => {
                tracing::error!(
                    control = self.control.borrow().type_name(),
                    "control panicked during paint; rendering blank region"
                );
                buffer.fill(clip, &Default::default(), clip);
            }
        }
    }
}

/// Paint a slice of child nodes under a shared clip. The standard tail of
/// every container's paint.
pub fn paint_children(
    children: &[LayoutNode],
    ctx: &mut PaintCtx<'_>,
    buffer: &mut Buffer,
    clip: Region,
    inherited: &Inherited,
) {
    for child in children {
        child.paint(ctx, buffer, clip, inherited);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
