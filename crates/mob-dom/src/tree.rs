//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed while the tree is alive. Removing a node unlinks it
//! from its parent and flags it (and its subtree) as removed, so ids held by
//! an in-progress walk never dangle.

use crate::{DomError, DomResult, InternedString, Node, NodeData, NodeId, StringInterner};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a new tree holding only the document node at [`NodeId::ROOT`]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.index()).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes ever allocated (removed nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Intern a tag or attribute name
    pub fn intern(&mut self, s: &str) -> InternedString {
        self.interner.intern(s)
    }

    /// Resolve an interned name
    pub fn resolve(&self, s: InternedString) -> &str {
        self.interner.get(s)
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let name = self.interner.intern(tag);
        self.push(Node::element(name))
    }

    /// Create a detached element carrying the given attributes
    pub fn create_element_with_attrs(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            let name = self.interner.intern(name);
            if let Some(elem) = self.nodes[id.index()].as_element_mut() {
                elem.set_attr(name, (*value).to_string());
            }
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name.to_string()))
    }

    // ------------------------------------------------------------------
    // Element accessors
    // ------------------------------------------------------------------

    /// Lower-case tag name, or `None` for non-elements
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.interner.get(elem.name))
    }

    /// Whether `id` is an element with the given tag
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Get an attribute value
    pub fn get_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = self.interner.lookup(name)?;
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name = self.interner.intern(name);
        let elem = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        elem.set_attr(name, value.to_string());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.some()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.some()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.some()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.some()
    }

    /// Whether the node has been removed from the tree
    pub fn is_removed(&self, id: NodeId) -> bool {
        self.get(id).is_none_or(|n| n.removed)
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        let mut cur = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        std::iter::from_fn(move || {
            let node = self.get(cur.some()?)?;
            let item = (cur, node);
            cur = node.next_sibling;
            Some(item)
        })
    }

    /// Snapshot of the direct children of a node
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Pre-order iterator over the descendants of `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// All elements with the given tag under `root`, in document order
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.is_element_named(id, tag))
            .collect()
    }

    /// Concatenated text of all text descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.descendants(id) {
            if let Some(text) = self.get(child).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while id.is_valid() {
            if id == ancestor {
                return true;
            }
            id = self.get(id).map_or(NodeId::NONE, |n| n.parent);
        }
        false
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if parent_node.removed {
            return Err(DomError::Removed(parent));
        }
        if child_node.removed {
            return Err(DomError::Removed(child));
        }
        let parent_ok = matches!(parent_node.data, NodeData::Document | NodeData::Element(_));
        let child_ok = !matches!(child_node.data, NodeData::Document);
        if !parent_ok || !child_ok || self.is_ancestor_or_self(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink a node from its parent, leaving its subtree intact
    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Link a detached node between `prev` and `next` under `parent`
    fn link(&mut self, parent: NodeId, child: NodeId, prev: NodeId, next: NodeId) {
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        let prev = self.nodes[parent.index()].last_child;
        self.link(parent, child, prev, NodeId::NONE);
        Ok(())
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        let next = self.nodes[parent.index()].first_child;
        self.link(parent, child, NodeId::NONE, next);
        Ok(())
    }

    /// Insert `new_node` immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, new_node: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::NotFound(reference))?;
        self.check_insert(parent, new_node)?;
        self.unlink(new_node);
        let prev = self.nodes[reference.index()].prev_sibling;
        self.link(parent, new_node, prev, reference);
        Ok(())
    }

    /// Insert `new_node` immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, new_node: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::NotFound(reference))?;
        self.check_insert(parent, new_node)?;
        self.unlink(new_node);
        let next = self.nodes[reference.index()].next_sibling;
        self.link(parent, new_node, reference, next);
        Ok(())
    }

    /// Delete a node: unlink it and flag it and its subtree as removed
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if id == NodeId::ROOT {
            return Err(DomError::HierarchyRequest { parent: NodeId::NONE, child: id });
        }
        let node = self.node(id)?;
        if node.removed {
            return Err(DomError::Removed(id));
        }
        let subtree: Vec<NodeId> = self.descendants(id).collect();
        self.unlink(id);
        self.nodes[id.index()].removed = true;
        for child in subtree {
            self.nodes[child.index()].removed = true;
        }
        tracing::trace!(?id, "removed node");
        Ok(())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order descendant iterator, see [`DomTree::descendants`]
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next.some()?;
        let node = self.tree.get(cur)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut n = cur;
            loop {
                if n == self.root {
                    break NodeId::NONE;
                }
                let Some(node) = self.tree.get(n) else {
                    break NodeId::NONE;
                };
                if node.next_sibling.is_valid() {
                    break node.next_sibling;
                }
                n = node.parent;
                if !n.is_valid() {
                    break NodeId::NONE;
                }
            }
        };
        Some(cur)
    }
}
