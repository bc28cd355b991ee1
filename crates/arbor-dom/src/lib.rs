//! Node tree implementation for the arbor markup parser.
//!
//! This crate provides an arena-based node tree following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//!
//! Every node records its parent and its index among its siblings. Those two
//! fields are written only by the owning parent's [`ChildList`], which also
//! maintains an incrementally updated element-only view ([`ElementIndex`]).
//! Public mutation goes through the checked operations in [`DomTree`], which
//! validate every structural invariant before touching any list.

mod child_list;
mod element;
mod error;
mod mutation;
mod traverse;

use core::fmt;

pub use child_list::{ChildList, ElementIndex, ListChange};
pub use element::{Attribute, Attributes, DocumentTypeData, ElementData, ElementKind, Namespace};
pub use error::{Operation, StructuralError, TreeError, Violation};
pub use traverse::{Ancestors, Descendants};

use child_list::Links;

/// A type-safe index into the node tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root node (a Document or a `DocumentFragment`) is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments."
    Comment(String),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    /// "DocumentType nodes are simply known as doctypes."
    DocumentType(DocumentTypeData),
}

impl NodeData {
    /// Whether this is an element.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    /// Whether this is a text node.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Whether this is a doctype.
    #[must_use]
    pub const fn is_doctype(&self) -> bool {
        matches!(self, Self::DocumentType(_))
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// Invariant: when `parent` is `Some(p)`, `p.children[index] == self`.
#[derive(Debug, Clone)]
pub struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    index: usize,
    children: ChildList,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            index: 0,
            children: ChildList::default(),
        }
    }

    /// "Each node has an associated node type"
    #[must_use]
    pub const fn data(&self) -> &NodeData {
        &self.data
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-index)
    /// "The index of an object is its number of preceding siblings, or 0 if
    /// it has none." `None` when detached.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self.parent {
            Some(_) => Some(self.index),
            None => None,
        }
    }

    /// The live child list.
    #[must_use]
    pub const fn children(&self) -> &ChildList {
        &self.children
    }
}

impl Links for [Node] {
    fn is_element(&self, id: NodeId) -> bool {
        self[id.0].data.is_element()
    }

    fn link(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let node = &self[id.0];
        node.parent.map(|parent| (parent, node.index))
    }

    fn set_link(&mut self, id: NodeId, link: Option<(NodeId, usize)>) {
        let node = &mut self[id.0];
        node.parent = link.map(|(parent, _)| parent);
        node.index = link.map_or(0, |(_, index)| index);
    }
}

/// Arena-based node tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// Nodes are never freed; a removed node stays in the arena, detached, and
/// may be inserted again.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The root is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// Create a new tree whose root is a `DocumentFragment`.
    #[must_use]
    pub fn new_fragment() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::DocumentFragment)],
        }
    }

    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the data of a node.
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get(id).map(Node::data)
    }

    /// Get the number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (never true: the root always exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new, detached node and return its ID.
    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Allocate a detached element.
    pub fn create_element(
        &mut self,
        local_name: &str,
        namespace: Namespace,
        attributes: Attributes,
    ) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(
            local_name, namespace, attributes,
        )))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(data.into()))
    }

    /// Allocate a detached comment.
    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(data.into()))
    }

    /// Allocate a detached doctype.
    pub fn create_doctype(&mut self, doctype: DocumentTypeData) -> NodeId {
        self.alloc(NodeData::DocumentType(doctype))
    }

    /// Allocate a detached, empty document fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::DocumentFragment)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Position of a node among its siblings, if attached.
    #[must_use]
    pub fn index(&self, id: NodeId) -> Option<usize> {
        self.get(id).and_then(Node::index)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The element-only view of a node's children.
    #[must_use]
    pub fn element_index(&self, id: NodeId) -> Option<&ElementIndex> {
        self.get(id).map(|n| n.children.elements())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable element data. Name, namespace and kind stay read-only; only
    /// attributes can change.
    #[must_use]
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Mutable character data of a text or comment node.
    #[must_use]
    pub fn character_data_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Text(s) | NodeData::Comment(s) => Some(s),
            _ => None,
        }
    }

    /// Local name of an element.
    #[must_use]
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(ElementData::local_name)
    }

    /// Content kind of an element.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.as_element(id).map(ElementData::kind)
    }

    /// Whether `id` is the HTML element named `local_name`.
    #[must_use]
    pub fn is_html_element(&self, id: NodeId, local_name: &str) -> bool {
        self.as_element(id).is_some_and(|e| e.is_html(local_name))
    }

    /// Read an attribute of an element by qualified name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, qualified_name: &str) -> Option<&str> {
        self.as_element(id)?.attributes.get(qualified_name)
    }

    /// Set an attribute on an element, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] or [`TreeError::NotAnElement`].
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        qualified_name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, TreeError> {
        let _ = self.check(id)?;
        let element = self.as_element_mut(id).ok_or(TreeError::NotAnElement(id))?;
        Ok(element.attributes.set(qualified_name, value))
    }

    /// Remove an attribute from an element, returning its value.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] or [`TreeError::NotAnElement`].
    pub fn remove_attribute(
        &mut self,
        id: NodeId,
        qualified_name: &str,
    ) -> Result<Option<String>, TreeError> {
        let _ = self.check(id)?;
        let element = self.as_element_mut(id).ok_or(TreeError::NotAnElement(id))?;
        Ok(element.attributes.remove(qualified_name))
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-doctype)
    ///
    /// "The doctype getter steps are to return the child of this that is a
    /// doctype; otherwise null."
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.data(id).is_some_and(NodeData::is_doctype))
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(NodeId::ROOT)
    }

    /// [§ 3.1.4 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|&id| self.is_html_element(id, "head"))
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|&id| self.is_html_element(id, "body") || self.is_html_element(id, "frameset"))
    }

    fn check(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Run `f` with `parent`'s child list lifted out of the arena, so the
    /// list can write back-references into the other nodes.
    fn with_child_list<R>(
        &mut self,
        parent: NodeId,
        f: impl FnOnce(&mut ChildList, &mut [Node]) -> R,
    ) -> R {
        let mut list = core::mem::take(&mut self.nodes[parent.0].children);
        let result = f(&mut list, &mut self.nodes);
        self.nodes[parent.0].children = list;
        result
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
