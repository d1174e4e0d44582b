//! Label: a static text leaf.

use crate::control::{Control, HAlign};
use crate::geometry::{Constraints, Region, Size, Spacing};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// Non-interactive text. Multi-line content renders one line per row.
pub struct Label {
    text: String,
    fg: Option<String>,
    bg: Option<String>,
    align: HAlign,
    margin: Spacing,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fg: None,
            bg: None,
            align: HAlign::Left,
            margin: Spacing::ZERO,
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

    pub fn with_align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_margin(mut self, margin: Spacing) -> Self {
        self.margin = margin;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. The caller is responsible for invalidating.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Control for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn margin(&self) -> Spacing {
        self.margin
    }

    fn h_align(&self) -> HAlign {
        self.align
    }

    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (self.fg.as_deref(), self.bg.as_deref())
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        _constraints: Constraints,
    ) -> Size {
        let mut width = 0;
        let mut height = 0;
        for line in self.text.lines() {
            width = width.max(ctx.text.width(line));
            height += 1;
        }
        Size::new(width, height.max(1))
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
            fg: Some(resolve_fg(self.fg.as_deref(), inherited, ctx.theme).to_owned()),
            bg: Some(resolve_bg(self.bg.as_deref(), inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        buffer.fill(bounds, &style, clip);
        for (i, line) in self.text.lines().enumerate() {
            buffer.write_str(bounds.x, bounds.y + i as i32, line, &style, clip);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateServices;
    use crate::text::TextMeasurer;
    use crate::theme::Theme;
    use crate::tree::ControlTree;

    fn paint_label(label: Label, width: u16, height: u16) -> Buffer {
        let mut tree = ControlTree::new();
        let id = tree.insert(label);
        let mut node = LayoutNode::build(&tree, id).unwrap();
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        let theme = Theme::empty();
        let mut buffer = Buffer::new(width, height);

        let mut lctx = LayoutCtx { state: &mut state, text: &mut text };
        let size = node.measure(&mut lctx, Constraints::loose(buffer.region().size()));
        node.arrange(&mut lctx, Region::new(0, 0, size.width, size.height));
        let mut pctx = PaintCtx { state: &mut state, text: &mut text, theme: &theme };
        let region = buffer.region();
        node.paint(&mut pctx, &mut buffer, region, &Inherited::default());
        buffer
    }

    #[test]
    fn measures_longest_line() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Label::new("ab\nlonger\nc"));
        let mut node = LayoutNode::build(&tree, id).unwrap();
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        let mut ctx = LayoutCtx { state: &mut state, text: &mut text };
        let size = node.measure(&mut ctx, Constraints::unbounded());
        assert_eq!(size, Size::new(6, 3));
    }

    #[test]
    fn empty_text_is_one_row() {
        let mut tree = ControlTree::new();
        let id = tree.insert(Label::new(""));
        let mut node = LayoutNode::build(&tree, id).unwrap();
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        let mut ctx = LayoutCtx { state: &mut state, text: &mut text };
        assert_eq!(node.measure(&mut ctx, Constraints::unbounded()), Size::new(0, 1));
    }

    #[test]
    fn paints_lines_in_rows() {
        let buffer = paint_label(Label::new("hi\nyo"), 10, 3);
        assert_eq!(buffer.get(0, 0).unwrap().ch, 'h');
        assert_eq!(buffer.get(1, 0).unwrap().ch, 'i');
        assert_eq!(buffer.get(0, 1).unwrap().ch, 'y');
    }

    #[test]
    fn explicit_color_wins() {
        let buffer = paint_label(Label::new("x").with_fg("red"), 4, 1);
        assert_eq!(buffer.get(0, 0).unwrap().style.fg.as_deref(), Some("red"));
    }

    #[test]
    fn setter_updates_text() {
        let mut label = Label::new("a");
        label.set_text("b");
        assert_eq!(label.text(), "b");
    }
}
