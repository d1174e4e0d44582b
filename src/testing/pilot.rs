//! Pilot: programmatic interaction with a headless app.
//!
//! Wraps a headless [`App`] and exposes a high-level API to simulate user
//! input, advance frames, and read the rendered screen as text.

use crate::app::App;
use crate::event::UiEvent;
use crate::input::{InputEvent, Key, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseKind};
use crate::tree::ControlId;
use crate::window::Window;

use super::snapshot::buffer_to_string;

/// A headless driver for tests.
///
/// ```ignore
/// let mut pilot = Pilot::new(40, 10);
/// let root = pilot.window().tree.insert(Column::new());
/// pilot.window().tree.insert_child(root, Button::new("Go"));
/// pilot.press_key(Key::Tab);
/// pilot.press_key(Key::Enter);
/// assert!(!pilot.take_events().is_empty());
/// ```
pub struct Pilot {
    app: App,
}

impl Pilot {
    /// A headless app with the given screen size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            app: App::new_headless(width, height),
        }
    }

    /// Direct access to the window for building the control tree.
    pub fn window(&mut self) -> &mut Window {
        &mut self.app.window
    }

    pub fn app(&mut self) -> &mut App {
        &mut self.app
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Press a key with no modifiers.
    pub fn press_key(&mut self, key: Key) {
        self.app.handle_input(InputEvent::Key(KeyEvent::plain(key)));
    }

    /// Press a key with modifiers.
    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) {
        self.app.handle_input(InputEvent::Key(KeyEvent::new(key, modifiers)));
    }

    /// Type each character as its own key press.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press_key(Key::Char(ch));
        }
    }

    /// Left-click at (x, y).
    pub fn click(&mut self, x: i32, y: i32) {
        self.app.handle_input(InputEvent::Mouse(MouseEvent::new(
            MouseKind::Down(MouseButton::Left),
            x,
            y,
        )));
        self.app.handle_input(InputEvent::Mouse(MouseEvent::new(
            MouseKind::Up(MouseButton::Left),
            x,
            y,
        )));
    }

    /// Scroll the wheel at (x, y); negative `lines` scrolls up.
    pub fn wheel(&mut self, x: i32, y: i32, lines: i32) {
        let kind = if lines < 0 { MouseKind::WheelUp } else { MouseKind::WheelDown };
        for _ in 0..lines.unsigned_abs() {
            self.app.handle_input(InputEvent::Mouse(MouseEvent::new(kind, x, y)));
        }
    }

    /// Resize the screen.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.app.handle_input(InputEvent::Resize { width, height });
    }

    // ── Frames and inspection ────────────────────────────────────────

    /// Run one render cycle.
    pub fn tick(&mut self) {
        let _ = self.app.render_frame();
    }

    /// Render and return the screen as trimmed text lines.
    pub fn screen_text(&mut self) -> String {
        self.tick();
        buffer_to_string(self.app.window.buffer())
    }

    /// The focused control, if any.
    pub fn focused(&self) -> Option<ControlId> {
        self.app.window.focused()
    }

    /// Drain events emitted by controls.
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        self.app.window.take_events()
    }

    pub fn is_running(&self) -> bool {
        !self.app.should_quit()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Button, Column, Prompt};
    use crate::event::UiEventKind;

    #[test]
    fn pilot_starts_running() {
        let pilot = Pilot::new(40, 10);
        assert!(pilot.is_running());
    }

    #[test]
    fn ctrl_c_stops_the_app() {
        let mut pilot = Pilot::new(40, 10);
        pilot.press_key_with(Key::Char('c'), Modifiers::CTRL);
        assert!(!pilot.is_running());
    }

    #[test]
    fn type_text_into_focused_prompt() {
        let mut pilot = Pilot::new(40, 10);
        let root = pilot.window().tree.insert(Column::new());
        let prompt = pilot.window().tree.insert_child(root, Prompt::new());
        pilot.tick();
        pilot.window().focus_control(prompt);
        pilot.type_text("abc");
        pilot.press_key(Key::Enter);
        let events = pilot.take_events();
        assert!(events
            .iter()
            .any(|e| e.kind == UiEventKind::Submitted { text: "abc".into() }));
    }

    #[test]
    fn screen_text_reflects_tree() {
        let mut pilot = Pilot::new(40, 4);
        let root = pilot.window().tree.insert(Column::new());
        pilot.window().tree.insert_child(root, Button::new("Start"));
        let text = pilot.screen_text();
        assert!(text.contains("[ Start ]"));
    }

    #[test]
    fn resize_propagates_to_window() {
        let mut pilot = Pilot::new(40, 10);
        pilot.resize(20, 5);
        assert_eq!(pilot.window().size(), crate::geometry::Size::new(20, 5));
    }
}
