//! Theme and color resolution.
//!
//! Every color the pipeline paints with is resolved through the same
//! precedence chain: explicit control-level color, then the color inherited
//! from the nearest container, then the theme, then a hardcoded default.
//! A missing theme entry is a normal state, never an error.

/// Optional theme colors consulted by controls during paint.
///
/// Color values are the same strings the driver parses: named colors or
/// `#rrggbb` hex.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Default foreground for text.
    pub fg: Option<String>,
    /// Default background fill.
    pub bg: Option<String>,
    /// Accent color for focus indicators and selection highlights.
    pub accent: Option<String>,
    /// Foreground for disabled controls.
    pub disabled_fg: Option<String>,
    /// Scrollbar thumb color.
    pub scrollbar_fg: Option<String>,
}

impl Theme {
    /// An entirely empty theme; every resolution falls through to the
    /// hardcoded defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A dark built-in theme.
    pub fn midnight() -> Self {
        Self {
            fg: Some("white".into()),
            bg: Some("black".into()),
            accent: Some("cyan".into()),
            disabled_fg: Some("dark_grey".into()),
            scrollbar_fg: Some("grey".into()),
        }
    }
}

/// Hardcoded fallback foreground.
pub const DEFAULT_FG: &str = "white";
/// Hardcoded fallback background.
pub const DEFAULT_BG: &str = "black";

/// Colors inherited from the nearest container during paint descent.
#[derive(Debug, Clone, Default)]
pub struct Inherited {
    pub fg: Option<String>,
    pub bg: Option<String>,
}

impl Inherited {
    /// Layer a container's own colors over what it inherited: set values
    /// replace, absent values pass through.
    pub fn layer(&self, fg: Option<&str>, bg: Option<&str>) -> Inherited {
        Inherited {
            fg: fg.map(str::to_owned).or_else(|| self.fg.clone()),
            bg: bg.map(str::to_owned).or_else(|| self.bg.clone()),
        }
    }
}

/// Resolve one color through the precedence chain:
/// control-level → container-inherited → theme → hardcoded default.
pub fn resolve<'a>(
    own: Option<&'a str>,
    inherited: Option<&'a str>,
    themed: Option<&'a str>,
    fallback: &'a str,
) -> &'a str {
    own.or(inherited).or(themed).unwrap_or(fallback)
}

/// Foreground resolution with the standard fallback.
pub fn resolve_fg<'a>(own: Option<&'a str>, inherited: &'a Inherited, theme: &'a Theme) -> &'a str {
    resolve(own, inherited.fg.as_deref(), theme.fg.as_deref(), DEFAULT_FG)
}

/// Background resolution with the standard fallback.
pub fn resolve_bg<'a>(own: Option<&'a str>, inherited: &'a Inherited, theme: &'a Theme) -> &'a str {
    resolve(own, inherited.bg.as_deref(), theme.bg.as_deref(), DEFAULT_BG)
}

// ===========================================================================
// Tests
// ===========================================================================
