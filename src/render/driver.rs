//! Crossterm terminal output backend.
//!
//! The driver owns a buffered stdout writer and translates [`CellUpdate`]
//! batches from the buffer diff into cursor moves, style changes, and
//! character prints. It also manages the alternate screen, raw mode, and
//! mouse capture. Color strings are parsed here, at the terminal boundary.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    event::{DisableMouseCapture, EnableMouseCapture},
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::error::Result;

use super::buffer::CellUpdate;
use super::cell::CellStyle;

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Terminal output backend.
///
/// Creation does not touch the terminal; call [`Driver::enter`] to switch to
/// the alternate screen and enable raw mode + mouse capture, and
/// [`Driver::leave`] to restore the terminal.
pub struct Driver {
    writer: BufWriter<Stdout>,
}

impl Driver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(io::stdout()),
        })
    }

    /// Enter the alternate screen, enable raw mode and mouse capture, hide
    /// the cursor.
    pub fn enter(&mut self) -> Result<()> {
        execute!(self.writer, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        Ok(())
    }

    /// Restore the terminal: disable raw mode, show the cursor, leave the
    /// alternate screen.
    pub fn leave(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.writer, cursor::Show, DisableMouseCapture, LeaveAlternateScreen)?;
        Ok(())
    }

    /// Queue a batch of cell updates. Call [`Driver::flush`] afterwards to
    /// push them to the terminal.
    pub fn apply(&mut self, updates: &[CellUpdate]) -> Result<()> {
        for update in updates {
            queue!(self.writer, cursor::MoveTo(update.x, update.y))?;
            self.queue_style(&update.cell.style)?;
            queue!(self.writer, Print(update.cell.ch), ResetColor)?;
            if has_attributes(&update.cell.style) {
                queue!(self.writer, SetAttribute(Attribute::Reset))?;
            }
        }
        Ok(())
    }

    /// Flush queued output to the terminal.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Current terminal size in (columns, rows).
    pub fn terminal_size() -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    fn queue_style(&mut self, style: &CellStyle) -> Result<()> {
        if let Some(ref fg) = style.fg {
            if let Some(color) = parse_color(fg) {
                queue!(self.writer, SetForegroundColor(color))?;
            }
        }
        if let Some(ref bg) = style.bg {
            if let Some(color) = parse_color(bg) {
                queue!(self.writer, SetBackgroundColor(color))?;
            }
        }
        if style.bold {
            queue!(self.writer, SetAttribute(Attribute::Bold))?;
        }
        if style.dim {
            queue!(self.writer, SetAttribute(Attribute::Dim))?;
        }
        if style.italic {
            queue!(self.writer, SetAttribute(Attribute::Italic))?;
        }
        if style.underline {
            queue!(self.writer, SetAttribute(Attribute::Underlined))?;
        }
        if style.reverse {
            queue!(self.writer, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

fn has_attributes(style: &CellStyle) -> bool {
    style.bold || style.dim || style.italic || style.underline || style.reverse
}

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

/// Parse a color string into a crossterm [`Color`].
///
/// Accepts `#rrggbb` / `#rgb` hex values and the common named colors
/// (case-insensitive, with `dark_*` variants and `grey`/`gray` spellings).
/// Returns `None` for anything unrecognized; the caller then paints with the
/// terminal default.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "dark_red" | "darkred" => Some(Color::DarkRed),
        "dark_green" | "darkgreen" => Some(Color::DarkGreen),
        "dark_yellow" | "darkyellow" => Some(Color::DarkYellow),
        "dark_blue" | "darkblue" => Some(Color::DarkBlue),
        "dark_magenta" | "darkmagenta" => Some(Color::DarkMagenta),
        "dark_cyan" | "darkcyan" => Some(Color::DarkCyan),
        "dark_grey" | "dark_gray" | "darkgrey" | "darkgray" => Some(Color::DarkGrey),
        "grey" | "gray" => Some(Color::Grey),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb { r, g, b })
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::Rgb { r: r * 17, g: g * 17, b: b * 17 })
        }
        _ => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_6digit() {
        assert_eq!(parse_color("#ff0000"), Some(Color::Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(parse_color("#00FF88"), Some(Color::Rgb { r: 0, g: 255, b: 136 }));
    }

    #[test]
    fn parse_hex_3digit_expands() {
        assert_eq!(parse_color("#abc"), Some(Color::Rgb { r: 0xaa, g: 0xbb, b: 0xcc }));
        assert_eq!(parse_color("#f00"), Some(Color::Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn parse_hex_invalid() {
        assert_eq!(parse_color("#ff00"), None);
        assert_eq!(parse_color("#gghhii"), None);
    }

    #[test]
    fn parse_named() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("WHITE"), Some(Color::White));
        assert_eq!(parse_color("dark_grey"), Some(Color::DarkGrey));
        assert_eq!(parse_color("gray"), Some(Color::Grey));
    }

    #[test]
    fn parse_unknown_is_none() {
        assert_eq!(parse_color("chartreuse-ish"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(parse_color("  blue "), Some(Color::Blue));
    }

    #[test]
    fn has_attributes_detects_flags() {
        assert!(!has_attributes(&CellStyle::default()));
        assert!(has_attributes(&CellStyle::default().bolded()));
        assert!(has_attributes(&CellStyle::default().reversed()));
    }

    #[test]
    fn driver_constructs() {
        assert!(Driver::new().is_ok());
    }
}
