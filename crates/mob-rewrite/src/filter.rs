//! Document walker
//!
//! One pre-order walk over the tree. Each element's children are captured
//! before the element is rewritten, so nodes the filter inserts are never
//! visited and deleted nodes are simply not descended into.

use mob_dom::{Document, DomTree, NodeId};

use crate::body::BodyRewriter;
use crate::head::{HeadRewriter, is_viewport_meta};
use crate::role::{MobileRole, classify};
use crate::script::ScriptComposer;
use crate::stats::{CounterTally, InMemoryStatistics, MobilizeCounter, Statistics};
use crate::theme::{ThemeColors, ThemeResolver};
use crate::{MobilizeError, RewriteConfig};

/// State of one document's rewrite. Created when the walk starts and
/// returned to the caller when it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    /// Counts for this document; already merged into the registry
    pub tally: CounterTally,
    pub head_fixed_up: bool,
    pub spacer_inserted: bool,
    /// Most recent `<body>` visited; receives the bootstrap script
    pub last_body: Option<NodeId>,
    /// Set once the walk is complete
    pub colors: Option<ThemeColors>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    id: NodeId,
    /// Inside a keeper element: walked, but not tallied
    in_keeper: bool,
}

/// Mobilization filter over a whole document
pub struct MobilizeRewriteFilter<'a> {
    config: &'a RewriteConfig,
    stats: &'a dyn Statistics,
    progress_added: bool,
}

impl<'a> MobilizeRewriteFilter<'a> {
    pub fn new(config: &'a RewriteConfig, stats: &'a dyn Statistics) -> Self {
        Self {
            config,
            stats,
            // The progress scrim only makes sense while layout is rewritten
            progress_added: !config.layout,
        }
    }

    /// Register the filter's counters
    pub fn init_stats(stats: &mut InMemoryStatistics) {
        for counter in MobilizeCounter::ALL {
            stats.register(counter.name());
        }
    }

    /// Mark the progress scrim as already present (or not), so the first
    /// body does (or does not) receive one.
    pub fn set_progress_added(&mut self, added: bool) {
        self.progress_added = added;
    }

    /// Whether a request should be mobilized at all
    pub fn applies_to(&self, user_agent_is_mobile: bool) -> bool {
        self.config.always || user_agent_is_mobile
    }

    /// Rewrite a parsed document and refresh its cached head/body
    pub fn rewrite_document(&self, doc: &mut Document) -> Result<DocumentState, MobilizeError> {
        tracing::debug!("Mobilizing {}", doc.url());
        let state = self.rewrite(doc.tree_mut())?;
        doc.finalize();
        Ok(state)
    }

    /// Rewrite a tree in place
    pub fn rewrite(&self, tree: &mut DomTree) -> Result<DocumentState, MobilizeError> {
        let mut state = DocumentState::default();

        let mut stack: Vec<Frame> = tree
            .child_ids(tree.root())
            .into_iter()
            .rev()
            .map(|id| Frame { id, in_keeper: false })
            .collect();

        while let Some(frame) = stack.pop() {
            if let Some((children, in_keeper)) = self.visit(tree, frame, &mut state)? {
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|id| Frame { id, in_keeper }),
                );
            }
        }

        self.finish(tree, &mut state)?;
        Ok(state)
    }

    /// Handle one node. Returns the children to walk next, or `None` when
    /// the node has no element subtree to descend into.
    fn visit(
        &self,
        tree: &mut DomTree,
        frame: Frame,
        state: &mut DocumentState,
    ) -> Result<Option<(Vec<NodeId>, bool)>, MobilizeError> {
        let id = frame.id;
        if tree.tag_name(id).is_none() {
            return Ok(None);
        }

        if is_viewport_meta(tree, id) {
            tree.remove(id)?;
            state.tally.increment(MobilizeCounter::DeletedElements);
            tracing::trace!(?id, "deleted existing viewport meta");
            return Ok(None);
        }

        let role = classify(tree, id);
        if !frame.in_keeper {
            match role.counter() {
                Some(counter) => state.tally.increment(counter),
                None if role == MobileRole::Invalid => {
                    tracing::debug!(?id, "ignoring unknown mobile role");
                }
                None => {}
            }
        }

        let children = tree.child_ids(id);

        if tree.is_element_named(id, "head") {
            if !state.head_fixed_up {
                HeadRewriter::new(self.config).fixup(tree, id)?;
                state.head_fixed_up = true;
            }
        } else if tree.is_element_named(id, "body") {
            if !state.spacer_inserted {
                BodyRewriter::insert_spacer(tree, id, !self.progress_added)?;
                state.spacer_inserted = true;
            }
            state.last_body = Some(id);
        }

        Ok(Some((children, frame.in_keeper || role == MobileRole::Keeper)))
    }

    /// Resolve the theme, append the bootstrap script and publish counters
    fn finish(&self, tree: &mut DomTree, state: &mut DocumentState) -> Result<(), MobilizeError> {
        state.tally.increment(MobilizeCounter::PagesMobilized);

        let colors = ThemeResolver::resolve(self.config);
        state.colors = Some(colors);

        let target = state
            .last_body
            .filter(|&body| !tree.is_removed(body))
            .unwrap_or(tree.root());
        ScriptComposer::new(self.config).append_to(tree, target, &colors)?;

        state.tally.merge_into(self.stats);
        tracing::debug!(
            keeper = state.tally.get(MobilizeCounter::KeeperBlocks),
            header = state.tally.get(MobilizeCounter::HeaderBlocks),
            navigational = state.tally.get(MobilizeCounter::NavigationalBlocks),
            content = state.tally.get(MobilizeCounter::ContentBlocks),
            marginal = state.tally.get(MobilizeCounter::MarginalBlocks),
            deleted = state.tally.get(MobilizeCounter::DeletedElements),
            "document mobilized"
        );
        Ok(())
    }
}
