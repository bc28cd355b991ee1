//! Read-only navigation over the tree.
//!
//! Sibling lookups go through the node's recorded index; element-only
//! sibling lookups binary-search the parent's [`ElementIndex`](crate::ElementIndex)
//! instead of walking the child list.

use crate::{DomTree, NodeData, NodeId};

impl DomTree {
    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    ///
    /// "The next sibling of an object is its first following sibling or null
    /// if it has no following sibling."
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    ///
    /// "The previous sibling of an object is its first preceding sibling or
    /// null if it has no preceding sibling."
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?.checked_sub(1)?;
        self.children(parent).get(index).copied()
    }

    /// [§ 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#dom-parentnode-children)
    ///
    /// "The children getter steps are to return an `HTMLCollection` collection
    /// rooted at this matching only element children."
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children().element_ids())
    }

    /// "The childElementCount getter steps are to return the number of
    /// children of this that are elements."
    #[must_use]
    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.element_index(id).map_or(0, crate::ElementIndex::len)
    }

    /// "The firstElementChild getter steps are to return the first child
    /// that is an element; otherwise null."
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let position = *node.children().elements().positions().first()?;
        node.children().as_slice().get(position).copied()
    }

    /// "The lastElementChild getter steps are to return the last child that
    /// is an element; otherwise null."
    #[must_use]
    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let position = *node.children().elements().positions().last()?;
        node.children().as_slice().get(position).copied()
    }

    /// [§ 4.2.7 Mixin NonDocumentTypeChildNode](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-nextelementsibling)
    ///
    /// "The nextElementSibling getter steps are to return the first following
    /// sibling of this that is an element; otherwise null."
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(self.parent(id)?)?;
        let index = self.index(id)?;
        let view = parent.children().elements();
        let position = *view.positions().get(view.rank_before(index + 1))?;
        parent.children().as_slice().get(position).copied()
    }

    /// "The previousElementSibling getter steps are to return the first
    /// preceding sibling of this that is an element; otherwise null."
    #[must_use]
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(self.parent(id)?)?;
        let index = self.index(id)?;
        let view = parent.children().elements();
        let rank = view.rank_before(index).checked_sub(1)?;
        let position = *view.positions().get(rank)?;
        parent.children().as_slice().get(position).copied()
    }

    /// [§ 4.2.1 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over the descendants of a node in tree order, excluding the
    /// node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// For elements and fragments: "the descendant text content of this".
    /// For text and comments: "this's data". Documents and doctypes yield
    /// the empty string.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.data(id) {
            Some(NodeData::Text(data) | NodeData::Comment(data)) => data.clone(),
            Some(NodeData::Element(_) | NodeData::DocumentFragment) => self
                .descendants(id)
                .filter_map(|d| self.as_text(d))
                .collect(),
            Some(NodeData::Document | NodeData::DocumentType(_)) | None => String::new(),
        }
    }
}

/// Iterator over ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Preorder iterator over the descendants of a node.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
