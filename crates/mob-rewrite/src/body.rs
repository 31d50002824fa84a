//! Body placeholders
//!
//! The first `<body>` receives a hidden header bar and a spacer that reserve
//! room for the navigation bar the client script builds, optionally followed
//! by the progress scrim shown while mobilization runs.

use mob_dom::{DomResult, DomTree, NodeId};

use crate::insert_leading;

pub const HEADER_BAR_ID: &str = "psmob-header-bar";
pub const SPACER_ID: &str = "psmob-spacer";
pub const PROGRESS_SCRIM_ID: &str = "ps-progress-scrim";

pub struct BodyRewriter;

impl BodyRewriter {
    /// Insert the spacer pair (and the progress scrim when `with_progress`)
    /// as the first children of `body`. Returns the inserted top-level nodes.
    pub fn insert_spacer(
        tree: &mut DomTree,
        body: NodeId,
        with_progress: bool,
    ) -> DomResult<Vec<NodeId>> {
        let mut nodes = vec![
            tree.create_element_with_attrs(
                "header",
                &[("id", HEADER_BAR_ID), ("class", "psmob-hide")],
            ),
            tree.create_element_with_attrs("div", &[("id", SPACER_ID)]),
        ];
        if with_progress {
            nodes.push(Self::progress_scrim(tree)?);
        }
        insert_leading(tree, body, &nodes)?;
        Ok(nodes)
    }

    /// Build the detached progress scrim fragment
    pub fn progress_scrim(tree: &mut DomTree) -> DomResult<NodeId> {
        let scrim = tree.create_element_with_attrs(
            "div",
            &[("id", PROGRESS_SCRIM_ID), ("class", "psProgressScrim")],
        );

        let remove = tree.create_element_with_attrs(
            "a",
            &[("href", "javascript:psRemoveProgressBar();"), ("id", "ps-progress-remove")],
        );
        let remove_label = tree.create_text("Remove Progress Bar (doesn't stop mobilization)");
        tree.append_child(remove, remove_label)?;

        let show_log = tree.create_element_with_attrs(
            "a",
            &[("href", "javascript:psSetDebugMode();"), ("id", "ps-progress-show-log")],
        );
        let show_log_label = tree.create_text("Show Debug Log In Progress Bar");
        tree.append_child(show_log, show_log_label)?;

        let bar = tree.create_element_with_attrs("div", &[("class", "psProgressBar")]);
        let span = tree.create_element_with_attrs(
            "span",
            &[("id", "ps-progress-span"), ("class", "psProgressSpan")],
        );
        tree.append_child(bar, span)?;

        let log = tree.create_element_with_attrs(
            "pre",
            &[("id", "ps-progress-log"), ("class", "psProgressLog")],
        );

        let br = tree.create_element("br");
        for child in [remove, br, show_log, bar, log] {
            tree.append_child(scrim, child)?;
        }
        Ok(scrim)
    }
}
