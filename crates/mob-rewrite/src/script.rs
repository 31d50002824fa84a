//! Bootstrap script generation
//!
//! One `<script src>` for the client library followed by one inline script
//! that sets the `window.ps*` globals and starts mobilization.

use std::fmt::Write;

use mob_dom::{DomResult, DomTree, NodeId};

use crate::RewriteConfig;
use crate::config::Rgb;
use crate::theme::ThemeColors;

pub struct ScriptComposer<'a> {
    config: &'a RewriteConfig,
}

impl<'a> ScriptComposer<'a> {
    pub fn new(config: &'a RewriteConfig) -> Self {
        Self { config }
    }

    /// Text of the inline configuration script
    pub fn compose(&self, colors: &ThemeColors) -> String {
        let config = self.config;
        let mut js = String::with_capacity(512);

        let _ = write!(
            js,
            "window.psDebugMode={};window.psNavMode={};\
             window.psLabeledMode=false;window.psConfigMode=false;\
             window.psLayoutMode={};window.psStaticJs=false;\
             window.psDeviceType='mobile';",
            config.debug, config.nav, config.layout,
        );
        let _ = write!(
            js,
            "window.psConversionId='{}';window.psPhoneNumber='{}';\
             window.psPhoneConversionLabel='{}';",
            config.conversion_id,
            escape_js_string(&config.phone_number),
            escape_js_string(&config.conversion_label),
        );
        let _ = write!(
            js,
            "window.psMobBackgroundColor={};window.psMobForegroundColor={};",
            color_literal(colors.background),
            color_literal(colors.foreground),
        );
        let _ = write!(js, "window.psMobBeaconUrl='{}';", escape_js_string(&config.beacon_url));
        if let Some(category) = &config.beacon_category {
            let _ = write!(js, "window.psMobBeaconCategory='{}';", escape_js_string(category));
        }
        js.push_str("psStartMobilization();");
        js
    }

    /// Append the library reference and the inline script to `parent`
    pub fn append_to(
        &self,
        tree: &mut DomTree,
        parent: NodeId,
        colors: &ThemeColors,
    ) -> DomResult<[NodeId; 2]> {
        let library = tree.create_element_with_attrs(
            "script",
            &[("src", self.config.assets.mobilize_js.as_str())],
        );
        tree.append_child(parent, library)?;

        let inline = tree.create_element("script");
        let code = tree.create_text(&self.compose(colors));
        tree.append_child(inline, code)?;
        tree.append_child(parent, inline)?;

        Ok([library, inline])
    }
}

/// `null` or `[r,g,b]`
fn color_literal(color: Option<Rgb>) -> String {
    color.map_or_else(|| "null".to_string(), |c| c.to_string())
}

/// Escape a value for use inside a single- or double-quoted JS string
/// literal embedded in a `<script>` element.
pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Keeps "</script>" and "<!--" from ending the element early
            '<' => out.push_str("\\u003c"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
