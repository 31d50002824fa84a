//! Theme color resolution

use crate::config::{Rgb, RewriteConfig, ThemeSpec};

/// Colors handed to the client script; `None` is emitted as `null`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeColors {
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
}

pub struct ThemeResolver;

impl ThemeResolver {
    /// Resolve the colors for the document just walked.
    ///
    /// In precompute mode the colors belong to an earlier pass and are not
    /// known here, so both stay `None`, as they do without any theme.
    pub fn resolve(config: &RewriteConfig) -> ThemeColors {
        match config.theme_spec() {
            ThemeSpec::Explicit(theme) => ThemeColors {
                foreground: Some(theme.foreground),
                background: Some(theme.background),
            },
            ThemeSpec::Precompute | ThemeSpec::None => ThemeColors::default(),
        }
    }
}
