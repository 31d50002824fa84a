//! Head fix-up
//!
//! Runs once per document, on the first `<head>`: telephone metadata and (in
//! layout mode) the canonical viewport and bootstrap module go first, the
//! stylesheets go last. Existing head content is left alone.

use mob_dom::{DomResult, DomTree, NodeId};

use crate::RewriteConfig;
use crate::insert_leading;

/// Content of the canonical viewport declaration
pub const VIEWPORT_CONTENT: &str = "width=device-width";

pub struct HeadRewriter<'a> {
    config: &'a RewriteConfig,
}

impl<'a> HeadRewriter<'a> {
    pub fn new(config: &'a RewriteConfig) -> Self {
        Self { config }
    }

    /// Insert the leading metadata and the trailing stylesheets.
    /// Returns the inserted nodes in document order.
    pub fn fixup(&self, tree: &mut DomTree, head: NodeId) -> DomResult<Vec<NodeId>> {
        let mut leading = vec![tree.create_element_with_attrs(
            "meta",
            &[("itemprop", "telephone"), ("content", self.config.phone_number.as_str())],
        )];
        if self.config.layout {
            leading.push(tree.create_element_with_attrs(
                "meta",
                &[("name", "viewport"), ("content", VIEWPORT_CONTENT)],
            ));
            leading.push(tree.create_element_with_attrs(
                "script",
                &[("src", self.config.assets.mobilize_xhr_js.as_str())],
            ));
        }
        insert_leading(tree, head, &leading)?;

        let styles = self.add_styles(tree, head)?;
        leading.extend(styles);
        Ok(leading)
    }

    /// Append the mobilization stylesheet links to the end of `head`
    pub fn add_styles(&self, tree: &mut DomTree, head: NodeId) -> DomResult<Vec<NodeId>> {
        let assets = &self.config.assets;
        let mut hrefs = vec![assets.mobilize_css.as_str()];
        if self.config.layout {
            hrefs.push(assets.mobilize_layout_css.as_str());
        }

        let mut links = Vec::with_capacity(hrefs.len());
        for href in hrefs {
            let link =
                tree.create_element_with_attrs("link", &[("rel", "stylesheet"), ("href", href)]);
            tree.append_child(head, link)?;
            links.push(link);
        }
        Ok(links)
    }
}

/// `<meta name=viewport>` in any letter case
pub fn is_viewport_meta(tree: &DomTree, id: NodeId) -> bool {
    tree.is_element_named(id, "meta")
        && tree
            .get_attr(id, "name")
            .is_some_and(|name| name.trim().eq_ignore_ascii_case("viewport"))
}
