//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to the first <html> element
    html_element: NodeId,
    /// Cached reference to the first <head> element
    head_element: NodeId,
    /// Cached reference to the first <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        let root = tree.root();
        let _ = tree.append_child(root, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Wrap an existing tree
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        let mut doc = Self {
            tree,
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        };
        doc.finalize();
        doc
    }

    /// Refresh the cached html/head/body references after the tree changed
    pub fn finalize(&mut self) {
        let find = |tag: &str| {
            self.tree
                .descendants(self.tree.root())
                .find(|&id| self.tree.is_element_named(id, tag))
                .unwrap_or(NodeId::NONE)
        };
        let html = find("html");
        let head = find("head");
        let body = find("body");
        self.html_element = html;
        self.head_element = head;
        self.body_element = body;
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        let Some(head) = self.head() else {
            return String::new();
        };
        self.tree
            .children(head)
            .find(|(id, _)| self.tree.is_element_named(*id, "title"))
            .map(|(id, _)| self.tree.text_content(id))
            .unwrap_or_default()
    }

    /// Get the first <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.live(self.html_element)
    }

    /// Get the first <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.live(self.head_element)
    }

    /// Get the first <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.live(self.body_element)
    }

    fn live(&self, id: NodeId) -> Option<NodeId> {
        (id.is_valid() && !self.tree.is_removed(id)).then_some(id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
