//! Mobilize rewrite filter
//!
//! Rewrites a parsed document for mobile viewports in a single walk:
//!
//! - classifies elements into mobile roles and tallies them
//! - fixes up the first `<head>` (telephone meta, viewport, stylesheets)
//! - drops pre-existing viewport declarations
//! - inserts the navigation spacer at the top of the first `<body>`
//! - appends the bootstrap script to the last `<body>`
//!
//! # Example
//! ```rust,ignore
//! use mob_rewrite::{InMemoryStatistics, MobilizeRewriteFilter, RewriteConfig};
//!
//! let config = RewriteConfig { layout: true, ..Default::default() };
//! let mut stats = InMemoryStatistics::new();
//! MobilizeRewriteFilter::init_stats(&mut stats);
//!
//! let mut doc = mob_html::parse("<head></head><body>hello, world!</body>");
//! MobilizeRewriteFilter::new(&config, &stats).rewrite_document(&mut doc)?;
//! ```

mod body;
mod config;
mod filter;
mod head;
mod role;
mod script;
mod stats;
mod theme;

pub use body::BodyRewriter;
pub use config::{ConfigError, MobTheme, RewriteConfig, Rgb, StaticAssets, ThemeSpec};
pub use filter::{DocumentState, MobilizeRewriteFilter};
pub use head::{HeadRewriter, VIEWPORT_CONTENT, is_viewport_meta};
pub use role::{MOBILE_ROLE_ATTRIBUTE, MobileRole, classify, is_keeper_tag};
pub use script::{ScriptComposer, escape_js_string};
pub use stats::{CounterTally, InMemoryStatistics, MobilizeCounter, Statistics};
pub use theme::{ThemeColors, ThemeResolver};

use mob_dom::{DomError, DomResult, DomTree, NodeId};

/// Errors raised while rewriting a document
#[derive(Debug, thiserror::Error)]
pub enum MobilizeError {
    #[error("document tree error: {0}")]
    Dom(#[from] DomError),
}

/// Insert `nodes`, in order, ahead of the current first child of `parent`
pub(crate) fn insert_leading(
    tree: &mut DomTree,
    parent: NodeId,
    nodes: &[NodeId],
) -> DomResult<()> {
    match tree.first_child(parent) {
        Some(anchor) => {
            for &node in nodes {
                tree.insert_before(anchor, node)?;
            }
        }
        None => {
            for &node in nodes {
                tree.append_child(parent, node)?;
            }
        }
    }
    Ok(())
}
