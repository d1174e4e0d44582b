//! Button: a focusable, clickable action control.

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size, Spacing};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// A one-row button rendered as `[ label ]`. Enter, Space, or a click
/// activates it, emitting [`UiEventKind::Pressed`].
pub struct Button {
    label: String,
    disabled: bool,
    focused: bool,
    fg: Option<String>,
    margin: Spacing,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            focused: false,
            fg: None,
            margin: Spacing::ZERO,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_fg(mut self, color: impl Into<String>) -> Self {
        self.fg = Some(color.into());
        self
    }

    pub fn with_margin(mut self, margin: Spacing) -> Self {
        self.margin = margin;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn press(&mut self, own: ControlId, ctx: &mut EventCtx<'_>) {
        ctx.emit(own, UiEventKind::Pressed);
        ctx.invalidate(own);
    }
}

impl Control for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn margin(&self) -> Spacing {
        self.margin
    }

    fn colors(&self) -> (Option<&str>, Option<&str>) {
        (self.fg.as_deref(), None)
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        _constraints: Constraints,
    ) -> Size {
        Size::new(ctx.text.width(&self.label) + 4, 1)
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
        let fg = if self.disabled {
            ctx.theme.disabled_fg.as_deref().unwrap_or("dark_grey").to_owned()
        } else {
            resolve_fg(self.fg.as_deref(), inherited, ctx.theme).to_owned()
        };
        let mut style = CellStyle {
            fg: Some(fg),
            bg: Some(resolve_bg(None, inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        if self.focused {
            style.reverse = true;
        }
        buffer.fill(bounds, &style, clip);
        buffer.write_str(bounds.x, bounds.y, &format!("[ {} ]", self.label), &style, clip);
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

impl Interactive for Button {
    fn enabled(&self) -> bool {
        !self.disabled
    }

    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        match ev.code {
            Key::Enter | Key::Char(' ') => {
                self.press(own, ctx);
                true
            }
            _ => false,
        }
    }
}

impl Focusable for Button {
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

impl MouseAware for Button {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        _bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        match ev.kind {
            MouseKind::Down(MouseButton::Left) | MouseKind::DoubleClick(MouseButton::Left)
                if !self.disabled =>
            {
                self.press(own, ctx);
                true
            }
            _ => false,
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

    #[test]
    fn measures_label_plus_brackets() {
        let mut tree = crate::tree::ControlTree::new();
        let id = tree.insert(Button::new("OK"));
        let mut node = LayoutNode::build(&tree, id).unwrap();
        let mut state = StateServices::new();
        let mut text = TextMeasurer::new();
        let mut ctx = LayoutCtx { state: &mut state, text: &mut text };
        assert_eq!(node.measure(&mut ctx, Constraints::unbounded()), Size::new(6, 1));
    }

    #[test]
    fn disabled_button_refuses_focus() {
        let mut b = Button::new("x").disabled(true);
        assert!(!Focusable::accepts_focus(&b));
        assert!(!Interactive::enabled(&b));
        assert!(b.is_disabled());
        b.focus_in(FocusHint::Forward);
        assert!(b.focused());
    }

    #[test]
    fn focus_flag_follows_in_out() {
        let mut b = Button::new("x");
        assert!(!b.focused());
        b.focus_in(FocusHint::Forward);
        assert!(b.focused());
        b.focus_out();
        assert!(!b.focused());
    }
}
