//! Text measurement: glyph-column widths for strings carrying ANSI escapes
//! or `[style]` markup tags.
//!
//! Layout must know how many terminal columns a string occupies, which means
//! ignoring styling that takes no space on screen. Two measurements exist:
//!
//! - [`ansi_width`] ignores ANSI escape sequences only;
//! - [`display_width`] additionally ignores `[style]`/`[/]` markup tags,
//!   with `[[` escaping a literal bracket.
//!
//! Both are pure functions of the input string; [`TextMeasurer`] memoizes
//! [`display_width`] so that repeated measurement of the same label during
//! re-measure cycles costs one hash lookup.

use std::collections::HashMap;

use logos::Logos;

/// Lexer over a styled string. Longest match wins, so `[[` beats `[` and a
/// full `[bold red]` tag beats a lone bracket.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk {
    /// CSI escape sequence, e.g. `\x1b[31;1m`.
    #[regex(r"\x1b\[[0-9;?]*[A-Za-z]")]
    Ansi,

    /// A stray escape byte with no recognizable sequence.
    #[token("\x1b")]
    Esc,

    /// Escaped literal bracket.
    #[token("[[")]
    EscapedOpen,

    /// Markup tag: `[bold]`, `[red on black]`, `[/]`.
    #[regex(r"\[/?[a-zA-Z0-9 _#,.=-]*\]")]
    Tag,

    /// An opening bracket that is not part of a tag.
    #[token("[")]
    Bracket,

    /// A run of ordinary visible characters.
    #[regex(r"[^\x1b\[]+")]
    Text,
}

/// Column width of `s` with ANSI escape sequences removed.
///
/// Markup tags count as ordinary text here.
pub fn ansi_width(s: &str) -> i32 {
    let mut width = 0i32;
    for (result, span) in Chunk::lexer(s).spanned() {
        match result {
            Ok(Chunk::Ansi) | Ok(Chunk::Esc) => {}
            // Everything else is visible verbatim when only ANSI is stripped.
            _ => width += s[span].chars().count() as i32,
        }
    }
    width
}

/// Column width of `s` with both ANSI escapes and markup tags removed.
///
/// `[[` measures as a single literal `[`.
pub fn display_width(s: &str) -> i32 {
    let mut width = 0i32;
    for (result, span) in Chunk::lexer(s).spanned() {
        match result {
            Ok(Chunk::Ansi) | Ok(Chunk::Esc) | Ok(Chunk::Tag) => {}
            Ok(Chunk::EscapedOpen) | Ok(Chunk::Bracket) => width += 1,
            Ok(Chunk::Text) => width += s[span].chars().count() as i32,
            // Unlexable input is treated as visible text.
            Err(_) => width += s[span].chars().count() as i32,
        }
    }
    width
}

// ---------------------------------------------------------------------------
// TextMeasurer
// ---------------------------------------------------------------------------

/// Memoizing wrapper around [`display_width`].
///
/// Width caching is sound because measurement is a pure function of the
/// string: the same input always yields the same width.
#[derive(Debug, Default)]
pub struct TextMeasurer {
    cache: HashMap<String, i32>,
}

impl TextMeasurer {
    pub fn new() -> Self {
        Self { cache: HashMap::new() }
    }

    /// Measured display width of `s`, cached.
    pub fn width(&mut self, s: &str) -> i32 {
        if let Some(&w) = self.cache.get(s) {
            return w;
        }
        let w = display_width(s);
        self.cache.insert(s.to_owned(), w);
        w
    }

    /// Number of distinct strings measured so far.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
