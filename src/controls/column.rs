//! Column: a vertical stacking container.

use crate::control::{Container, Control, HAlign, Resizable, SizePolicy};
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size, UNBOUNDED};
use crate::input::KeyEvent;
use crate::layout::node::{paint_children, LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

use super::container_tab;

/// Stacks children top to bottom, giving each the full available width and
/// reducing the height offered to later children by what earlier siblings
/// consumed. Without an explicit width, the column's width is driven by its
/// widest child — which is also what a grid reads as its minimum.
pub struct Column {
    fixed_width: Option<i32>,
    min_width: i32,
    max_width: Option<i32>,
    flex: u32,
    fg: Option<String>,
    bg: Option<String>,
}

impl Column {
    pub fn new() -> Self {
        Self {
            fixed_width: None,
            min_width: 0,
            max_width: None,
            flex: 1,
            fg: None,
            bg: None,
        }
    }

    /// Give the column an explicit width (fixed sizing mode).
    pub fn with_width(mut self, width: i32) -> Self {
        self.fixed_width = Some(width.max(0));
        self
    }

    pub fn with_min_width(mut self, min: i32) -> Self {
        self.min_width = min.max(0);
        self
    }

    pub fn with_max_width(mut self, max: i32) -> Self {
        self.max_width = Some(max.max(0));
        self
    }

    pub fn with_flex(mut self, factor: u32) -> Self {
        self.flex = factor.max(1);
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
}

impl Default for Column {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for Column {
    fn type_name(&self) -> &'static str {
        "Column"
    }

    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (self.fg.as_deref(), self.bg.as_deref())
    }

    fn is_container(&self) -> bool {
        true
    }

    fn width_policy(&self) -> SizePolicy {
        match self.fixed_width {
            Some(w) => SizePolicy::Fixed(w),
            None => SizePolicy::Flex {
                min: self.min_width,
                max: self.max_width,
                factor: self.flex,
            },
        }
    }

    fn measure(
        &mut self,
        _own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        let width_avail = self.fixed_width.unwrap_or(constraints.max.width);
        let mut remaining = constraints.max.height;
        let mut consumed = 0;
        let mut content_width = 0;

        for child in children.iter_mut() {
            let margin = child.margin();
            let child_constraints =
                Constraints::loose(Size::new(width_avail, remaining)).deflate(margin);
            let size = child.measure(ctx, child_constraints);
            let slot = size.height + margin.height();
            consumed += slot;
            if remaining < UNBOUNDED {
                remaining = (remaining - slot).max(0);
            }
            content_width = content_width.max(size.width + margin.width());
        }

        Size::new(self.fixed_width.unwrap_or(content_width), consumed)
    }

    fn arrange(
        &mut self,
        _own: ControlId,
        children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        bounds: Region,
    ) {
        let mut y = bounds.y;
        for child in children.iter_mut() {
            let margin = child.margin();
            let avail_w = (bounds.width - margin.width()).max(0);
            let desired = child.desired();
            let w = desired.width.min(avail_w);
            let h = desired
                .height
                .min((bounds.bottom() - y - margin.height()).max(0));
            let align_pad = match child.h_align() {
                HAlign::Left => 0,
                HAlign::Center => (avail_w - w) / 2,
                HAlign::Right => avail_w - w,
            };
            child.arrange(
                ctx,
                Region::new(bounds.x + margin.left + align_pad, y + margin.top, w, h),
            );
            y += desired.height + margin.height();
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

    fn resizable(&mut self) -> Option<&mut dyn Resizable> {
        Some(self)
    }
}

impl Container for Column {
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

impl Resizable for Column {
    fn fixed_width(&self) -> Option<i32> {
        self.fixed_width
    }

    fn set_fixed_width(&mut self, width: i32) {
        self.fixed_width = Some(width.max(self.min_width.max(1)));
    }

    fn min_width(&self) -> i32 {
        self.min_width.max(1)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
