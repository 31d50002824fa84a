//! Rewrite configuration
//!
//! Everything the filter reads is resolved here, before a document is seen.
//! Theme strings are validated when the configuration is built, so the filter
//! itself never has to report a malformed theme.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid color {0:?}: expected #rrggbb or #rgb")]
    InvalidColor(String),

    #[error("invalid mobilization theme {value:?}: {reason}")]
    InvalidTheme { value: String, reason: &'static str },

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`
    pub fn parse_hex(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
        let rgb = match hex.len() {
            6 => (channel(0..2), channel(2..4), channel(4..6)),
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 0x11);
                (short(0), short(1), short(2))
            }
            _ => return Err(invalid()),
        };
        match rgb {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self { r, g, b }),
            _ => Err(invalid()),
        }
    }
}

/// Renders as the JS array literal `[r,g,b]`
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.r, self.g, self.b)
    }
}

/// Explicit theme: `"<bg-color> <fg-color> [<logo-url>]"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MobTheme {
    pub background: Rgb,
    pub foreground: Rgb,
    pub logo_url: Option<String>,
}

impl MobTheme {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        let (bg, fg, logo) = match tokens.as_slice() {
            [bg, fg] => (*bg, *fg, None),
            [bg, fg, logo] => (*bg, *fg, Some((*logo).to_string())),
            _ => {
                return Err(ConfigError::InvalidTheme {
                    value: value.to_string(),
                    reason: "expected two colors and an optional logo url",
                });
            }
        };
        Ok(Self {
            background: Rgb::parse_hex(bg)?,
            foreground: Rgb::parse_hex(fg)?,
            logo_url: logo,
        })
    }
}

impl FromStr for MobTheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MobTheme {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// How theme colors are obtained for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSpec<'a> {
    /// No theme configured
    None,
    /// Colors given in the configuration
    Explicit(&'a MobTheme),
    /// Colors come from an earlier precompute pass
    Precompute,
}

/// Resolved URLs of the static client-side assets
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticAssets {
    /// Main mobilization script, loaded at the end of the body
    pub mobilize_js: String,
    /// Bootstrap module loaded from the head in layout mode
    pub mobilize_xhr_js: String,
    /// Base mobilization stylesheet
    pub mobilize_css: String,
    /// Extra stylesheet for layout mode
    pub mobilize_layout_css: String,
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self {
            mobilize_js: "/psajs/mobilize.0.js".into(),
            mobilize_xhr_js: "/psajs/mobilize_xhr.0.js".into(),
            mobilize_css: "/psajs/mobilize_css.0.css".into(),
            mobilize_layout_css: "/psajs/mobilize_layout_css.0.css".into(),
        }
    }
}

/// Configuration snapshot consumed by the mobilize filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Mobilize regardless of the user agent
    pub always: bool,
    pub phone_number: String,
    pub conversion_id: i64,
    pub conversion_label: String,
    pub beacon_url: String,
    pub beacon_category: Option<String>,
    /// Rewrite the page layout, not only add navigation
    pub layout: bool,
    pub nav: bool,
    pub debug: bool,
    pub theme: Option<MobTheme>,
    /// Theme colors are expected from a precompute pass
    pub precompute_theme: bool,
    pub assets: StaticAssets,
}

impl RewriteConfig {
    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the theme from its option string
    pub fn set_theme(&mut self, value: &str) -> Result<(), ConfigError> {
        self.theme = Some(MobTheme::parse(value)?);
        Ok(())
    }

    /// Theme source; an explicit theme wins over the precompute signal
    pub fn theme_spec(&self) -> ThemeSpec<'_> {
        match (&self.theme, self.precompute_theme) {
            (Some(theme), _) => ThemeSpec::Explicit(theme),
            (None, true) => ThemeSpec::Precompute,
            (None, false) => ThemeSpec::None,
        }
    }
}
