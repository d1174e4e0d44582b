//! Prompt: a single-line text input.

use crate::control::{Control, Focusable, FocusHint, Interactive, MouseAware, SizePolicy};
use crate::event::UiEventKind;
use crate::focus::EventCtx;
use crate::geometry::{Constraints, Region, Size, Spacing};
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseKind};
use crate::layout::node::{LayoutCtx, LayoutNode, PaintCtx};
use crate::render::{Buffer, CellStyle};
use crate::theme::{resolve_bg, resolve_fg, Inherited};
use crate::tree::ControlId;

/// Editable one-line text field. Enter submits the current text. The view
/// slides horizontally so the cursor is always visible.
pub struct Prompt {
    chars: Vec<char>,
    cursor: usize,
    placeholder: String,
    disabled: bool,
    focused: bool,
    margin: Spacing,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
            placeholder: String::new(),
            disabled: false,
            focused: false,
            margin: Spacing::ZERO,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
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

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// First visible column for a viewport `width` cells wide.
    fn view_start(&self, width: i32) -> usize {
        if width <= 1 {
            return self.cursor;
        }
        let last_visible = (width - 1) as usize;
        self.cursor.saturating_sub(last_visible)
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for Prompt {
    fn type_name(&self) -> &'static str {
        "Prompt"
    }

    fn margin(&self) -> Spacing {
        self.margin
    }

    fn width_policy(&self) -> SizePolicy {
        SizePolicy::flex(1)
    }

    fn measure(
        &mut self,
        _own: ControlId,
        _children: &mut [LayoutNode],
        ctx: &mut LayoutCtx<'_>,
        constraints: Constraints,
    ) -> Size {
        // Fill the available width; fall back to content width when
        // unbounded.
        let width = if constraints.width_bounded() {
            constraints.max.width
        } else {
            (self.chars.len() as i32 + 1).max(ctx.text.width(&self.placeholder))
        };
        Size::new(width, 1)
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
        buffer.fill(bounds, &style, clip);

        if self.chars.is_empty() && !self.focused {
            buffer.write_str(bounds.x, bounds.y, &self.placeholder, &style.dimmed(), clip);
            return;
        }

        let start = self.view_start(bounds.width);
        for (i, &ch) in self.chars.iter().skip(start).take(bounds.width as usize).enumerate() {
            buffer.set(
                bounds.x + i as i32,
                bounds.y,
                crate::render::Cell::new(ch, style.clone()),
                clip,
            );
        }
        if self.focused {
            let cursor_col = bounds.x + (self.cursor - start) as i32;
            let under = self.chars.get(self.cursor).copied().unwrap_or(' ');
            buffer.set(
                cursor_col,
                bounds.y,
                crate::render::Cell::new(under, style.reversed()),
                clip,
            );
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
}

impl Interactive for Prompt {
    fn enabled(&self) -> bool {
        !self.disabled
    }

    fn handle_key(&mut self, own: ControlId, ev: &KeyEvent, ctx: &mut EventCtx<'_>) -> bool {
        let handled = match ev.code {
            Key::Char(c) => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
                true
            }
            Key::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.chars.remove(self.cursor);
                }
                true
            }
            Key::Delete => {
                if self.cursor < self.chars.len() {
                    self.chars.remove(self.cursor);
                }
                true
            }
            Key::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            Key::Right => {
                self.cursor = (self.cursor + 1).min(self.chars.len());
                true
            }
            Key::Home => {
                self.cursor = 0;
                true
            }
            Key::End => {
                self.cursor = self.chars.len();
                true
            }
            Key::Enter => {
                ctx.emit(own, UiEventKind::Submitted { text: self.text() });
                true
            }
            _ => false,
        };
        if handled {
            ctx.invalidate(own);
        }
        handled
    }
}

impl Focusable for Prompt {
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

impl MouseAware for Prompt {
    fn handle_mouse(
        &mut self,
        own: ControlId,
        ev: &MouseEvent,
        bounds: Region,
        ctx: &mut EventCtx<'_>,
    ) -> bool {
        if let MouseKind::Down(MouseButton::Left) = ev.kind {
            // Place the cursor under the click.
            let start = self.view_start(bounds.width);
            let col = (ev.x - bounds.x).max(0) as usize;
            self.cursor = (start + col).min(self.chars.len());
            ctx.invalidate(own);
            return true;
        }
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_text_places_cursor_at_end() {
        let p = Prompt::new().with_text("abc");
        assert_eq!(p.text(), "abc");
        assert_eq!(p.cursor(), 3);
    }

    #[test]
    fn view_start_keeps_cursor_visible() {
        let p = Prompt::new().with_text("0123456789");
        // Cursor at 10, viewport 5: columns 6..=10 visible.
        assert_eq!(p.view_start(5), 6);
        let q = Prompt::new().with_text("ab");
        assert_eq!(q.view_start(5), 0);
    }

    #[test]
    fn view_start_degenerate_width() {
        let p = Prompt::new().with_text("abcd");
        assert_eq!(p.view_start(1), 4);
        assert_eq!(p.view_start(0), 4);
    }
}
