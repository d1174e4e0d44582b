//! Checkbox: a focusable boolean toggle.

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size, Spacing};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// `[x] label` / `[ ] label`. Space (or a click) flips the state and emits
/// exactly one [`UiEventKind::Toggled`] per flip.
pub struct Checkbox {
    label: String,
    checked: bool,
    disabled: bool,
    focused: bool,
    margin: Spacing,
}

impl Checkbox {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: false,
            disabled: false,
            focused: false,
            margin: Spacing::ZERO,
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_margin(mut self, margin: Spacing) -> Self {
        self.margin = margin;
        self
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    fn toggle(&mut self, own: ControlId, ctx: &mut EventCtx<'_>) {
        self.checked = !self.checked;
        ctx.emit(own, UiEventKind::Toggled { checked: self.checked });
        ctx.invalidate(own);
    }
}

impl Control for Checkbox {
    fn type_name(&self) -> &'static str {
        "Checkbox"
    }

    fn margin(&self) -> Spacing {
        self.margin
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
        let style = CellStyle {
            fg: Some(resolve_fg(None, inherited, ctx.theme).to_owned()),
            bg: Some(resolve_bg(None, inherited, ctx.theme).to_owned()),
            ..CellStyle::default()
        };
        let box_style = if self.focused { style.reversed() } else { style.clone() };
        buffer.fill(bounds, &style, clip);
        let marker = if self.checked { "[x]" } else { "[ ]" };
        buffer.write_str(bounds.x, bounds.y, marker, &box_style, clip);
        buffer.write_str(bounds.x + 4, bounds.y, &self.label, &style, clip);
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

impl Interactive for Checkbox {
    fn enabled(&self) -> bool {
        !self.disabled
    }

    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        match ev.code {
            Key::Char(' ') | Key::Enter => {
                self.toggle(own, ctx);
                true
            }
            _ => false,
        }
    }
}

impl Focusable for Checkbox {
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

impl MouseAware for Checkbox {
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
                self.toggle(own, ctx);
                true
            }
            _ => false,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
