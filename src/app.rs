//! App: configuration, lifecycle, and the terminal event loop.
//!
//! [`App`] ties the window to the crossterm driver. The async [`App::run`]
//! loop selects between the terminal event stream and a frame ticker; the
//! headless constructor drops the driver entirely for tests, which is how
//! the [`Pilot`](crate::testing::Pilot) drives the framework.

use std::time::Duration;

use futures::StreamExt;

use crate::error::{Error, Result};
use crate::input::{InputEvent, Key, Modifiers};
use crate::render::Driver;
use crate::theme::Theme;
use crate::window::Window;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional application title (reserved for future use by embedders).
    pub title: Option<String>,
    /// Target frames per second for the render ticker.
    pub fps: u32,
    /// Theme installed into the window.
    pub theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            fps: 60,
            theme: Theme::empty(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The application: one window plus an optional terminal driver.
pub struct App {
    pub window: Window,
    pub config: AppConfig,
    driver: Option<Driver>,
    running: bool,
}

impl App {
    /// Create an app with a real terminal driver, sized to the terminal.
    pub fn new(config: AppConfig) -> Result<Self> {
        let (width, height) = Driver::terminal_size()?;
        let driver = Driver::new()?;
        let mut window = Window::new(width, height);
        window.theme = config.theme.clone();
        Ok(Self {
            window,
            config,
            driver: Some(driver),
            running: true,
        })
    }

    /// Create an app without a terminal for testing.
    pub fn new_headless(width: u16, height: u16) -> Self {
        Self {
            window: Window::new(width, height),
            config: AppConfig::default(),
            driver: None,
            running: true,
        }
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// Route an input event. Ctrl+C always quits; everything else goes to
    /// the window's focus router.
    pub fn handle_input(&mut self, event: InputEvent) {
        if let InputEvent::Key(key) = &event {
            if key.code == Key::Char('c') && key.modifiers.contains(Modifiers::CTRL) {
                self.request_quit();
                return;
            }
        }
        self.window.handle_input(event);
    }

    /// Render one frame, pushing the diff through the driver when present.
    pub fn render_frame(&mut self) -> Result<()> {
        let updates = self.window.render();
        if let Some(driver) = self.driver.as_mut() {
            if !updates.is_empty() {
                driver.apply(&updates)?;
                driver.flush()?;
            }
        }
        Ok(())
    }

    /// Run the terminal event loop until quit is requested.
    ///
    /// Selects between the crossterm event stream and a frame ticker at
    /// `config.fps`. Requires a driver; headless apps use
    /// [`App::render_frame`] and [`App::handle_input`] directly.
    pub async fn run(&mut self) -> Result<()> {
        {
            let Some(driver) = self.driver.as_mut() else {
                return Err(Error::Headless);
            };
            driver.enter()?;
            driver.flush()?;
        }

        let mut events = crossterm::event::EventStream::new();
        let frame = Duration::from_millis((1000 / self.config.fps.max(1) as u64).max(1));
        let mut ticker = tokio::time::interval(frame);

        let result = loop {
            if self.should_quit() {
                break Ok(());
            }
            tokio::select! {
                maybe = events.next() => match maybe {
                    Some(Ok(event)) => self.handle_input(InputEvent::from(event)),
                    Some(Err(err)) => break Err(Error::Io(err)),
                    None => break Ok(()),
                },
                _ = ticker.tick() => {
                    if let Err(err) = self.render_frame() {
                        break Err(err);
                    }
                }
            }
        };

        if let Some(driver) = self.driver.as_mut() {
            driver.leave()?;
            driver.flush()?;
        }
        result
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Button, Column};
    use crate::input::KeyEvent;

    #[test]
    fn headless_app_has_no_driver() {
        let app = App::new_headless(80, 24);
        assert!(!app.has_driver());
        assert!(!app.should_quit());
    }

    #[test]
    fn ctrl_c_requests_quit() {
        let mut app = App::new_headless(80, 24);
        app.handle_input(InputEvent::Key(KeyEvent::new(Key::Char('c'), Modifiers::CTRL)));
        assert!(app.should_quit());
    }

    #[test]
    fn plain_c_does_not_quit() {
        let mut app = App::new_headless(80, 24);
        app.handle_input(InputEvent::Key(KeyEvent::plain(Key::Char('c'))));
        assert!(!app.should_quit());
    }

    #[test]
    fn headless_render_frame_succeeds() {
        let mut app = App::new_headless(20, 5);
        let root = app.window.tree.insert(Column::new());
        app.window.tree.insert_child(root, Button::new("go"));
        assert!(app.render_frame().is_ok());
    }

    #[test]
    fn run_without_driver_errors() {
        let mut app = App::new_headless(10, 3);
        let err = tokio_test::block_on(app.run());
        assert!(matches!(err, Err(Error::Headless)));
    }

    #[test]
    fn config_builders() {
        let config = AppConfig::new()
            .with_title("demo")
            .with_fps(30)
            .with_theme(Theme::midnight());
        assert_eq!(config.title.as_deref(), Some("demo"));
        assert_eq!(config.fps, 30);
        assert_eq!(config.theme.accent.as_deref(), Some("cyan"));
    }

    #[test]
    fn config_fps_floors_at_one() {
        assert_eq!(AppConfig::new().with_fps(0).fps, 1);
    }
}
