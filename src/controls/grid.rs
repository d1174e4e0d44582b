//! Grid: a horizontal container of columns and splitters.

use crate::control::{Container, Control, SizePolicy};
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size, UNBOUNDED};
use crate::input::KeyEvent;
use crate::layout::flex::distribute;
use crate::layout::node::{paint_children, LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

use super::container_tab;

/// Lays out its children side by side using the flex distribution
/// algorithm. Children are columns and splitters in visual left-to-right
/// order — the same order Tab traverses them. Flexible children contribute
/// their measured natural width as a content-driven minimum.
pub struct Grid {
    fg: Option<String>,
    bg: Option<String>,
    widths: Vec<i32>,
    overflow: bool,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            widths: Vec::new(),
            overflow: false,
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

    /// Column widths computed by the last measure pass.
    pub fn widths(&self) -> &[i32] {
        &self.widths
    }

    /// Whether the last measure could not fit fixed widths plus minimums.
    pub fn overflowed(&self) -> bool {
        self.overflow
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for Grid {
    fn type_name(&self) -> &'static str {
        "Grid"
    }

    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (self.fg.as_deref(), self.bg.as_deref())
    }

    fn is_container(&self) -> bool {
        true
    }

    fn measure(
        &mut self,
        _own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        // First pass: collect policies, measuring flexible children with an
        // unbounded width to learn their content-driven minimums.
        let mut policies = Vec::with_capacity(children.len());
        for child in children.iter_mut() {
            let policy = child.width_policy();
            let adjusted = match policy {
                SizePolicy::Fixed(w) => SizePolicy::Fixed(w),
                SizePolicy::Flex { min, max, factor } => {
                    let natural = child.measure(
                        ctx,
                        Constraints::loose(Size::new(UNBOUNDED, constraints.max.height)),
                    );
                    SizePolicy::Flex { min: min.max(natural.width), max, factor }
                }
            };
            policies.push(adjusted);
        }

        let available = if constraints.width_bounded() {
            constraints.max.width
        } else {
            // No width limit: everyone gets fixed width or minimum.
            policies
                .iter()
                .map(|p| match *p {
                    SizePolicy::Fixed(w) => w,
                    SizePolicy::Flex { min, .. } => min,
                })
                .sum()
        };

        let result = distribute(&policies, available);
        self.widths = result.widths;
        self.overflow = result.overflow;

        // Second pass: measure each child at its assigned width.
        let mut height = 0;
        for (child, &width) in children.iter_mut().zip(&self.widths) {
            let child_constraints = Constraints::loose(Size::new(width, constraints.max.height))
                .with_exact_width(width);
            let size = child.measure(ctx, child_constraints);
            height = height.max(size.height);
        }

        Size::new(available, height)
    }

    fn arrange(
        &mut self,
        _own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        bounds: Region,
    ) {
        let mut x = bounds.x;
        for (child, &width) in children.iter_mut().zip(&self.widths) {
            let width = width.min((bounds.right() - x).max(0));
            child.arrange(ctx, Region::new(x, bounds.y, width, bounds.height));
            x += width;
        }
    }

    fn paint(
        &self,
        _own: ControlId,
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
        let inherited = inherited.layer(self.fg.as_deref(), self.bg.as_deref());
        paint_children(children, ctx, buffer, clip, &inherited);
    }

    fn container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }
}

impl Container for Grid {
    /// Tab order interleaves columns and splitters in child (visual)
    /// order; running off either end returns unhandled so an outer
    /// container can continue the chain.
    fn handle_descendant_key(
        &mut self,
        own: ControlId,
        from: ControlId,
        ev: &KeyEvent,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        container_tab(own, from, ev, ctx)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
