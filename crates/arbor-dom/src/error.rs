//! Errors raised by direct tree mutation.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! "To ensure pre-insertion validity of a node into a parent before a child,
//! run these steps... throw a `HierarchyRequestError` DOMException."
//!
//! Every check runs before the first list edit, so a returned error means
//! the tree is exactly as it was.

use strum_macros::Display;
use thiserror::Error;

use crate::NodeId;

/// Which mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// `append_child` / `insert_before`
    Insert,
    /// `replace_child`
    Replace,
    /// `remove_child`
    Remove,
}

/// The invariant a refused mutation would have broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    /// "If node is a host-including inclusive ancestor of parent" (node is parent)
    #[error("a node cannot be inserted into itself")]
    SelfInsertion,
    /// "If node is a host-including inclusive ancestor of parent"
    #[error("the node is an ancestor of the parent")]
    AncestorCycle,
    /// "If node is not a DocumentFragment, DocumentType, Element, or CharacterData node"
    #[error("a document cannot be a child")]
    DocumentAsChild,
    /// "If parent is not a Document, DocumentFragment, or Element node"
    #[error("text, comment and doctype nodes cannot have children")]
    LeafParent,
    /// "parent has an element child"
    #[error("a document can have only one element child")]
    SecondDocumentElement,
    /// "parent has a doctype child"
    #[error("a document can have only one doctype")]
    SecondDoctype,
    /// "an element is preceding child"
    #[error("a doctype cannot follow the document element")]
    DoctypeAfterElement,
    /// "a doctype is following child"
    #[error("the document element cannot precede the doctype")]
    ElementBeforeDoctype,
    /// "If node is a Text node and parent is a document"
    #[error("a document cannot contain text")]
    TextInDocument,
    /// "node is a doctype and parent is not a document"
    #[error("a doctype can only be a child of a document")]
    DoctypeOutsideDocument,
    /// "Void elements can't have any contents"
    #[error("void elements cannot have children")]
    ChildOfVoid,
    /// Raw text and escapable raw text elements hold text only.
    #[error("raw text elements can only contain text")]
    NonTextInRawText,
    /// "If child is non-null and its parent is not parent, then throw a NotFoundError"
    #[error("the reference node is not a child of the parent")]
    NotAChild,
}

/// A mutation that would have broken a tree invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} of {node} under {parent}{} refused: {reason}", describe_reference(.reference))]
pub struct StructuralError {
    /// What was attempted.
    pub operation: Operation,
    /// The parent being mutated.
    pub parent: NodeId,
    /// The node being inserted, replaced in, or removed.
    pub node: NodeId,
    /// The reference child (`insert_before`) or old child (`replace_child`).
    pub reference: Option<NodeId>,
    /// Why the mutation was refused.
    pub reason: Violation,
}

fn describe_reference(reference: &Option<NodeId>) -> String {
    reference.map_or_else(String::new, |id| format!(" at {id}"))
}

/// Errors from the tree's mutation API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A structural invariant would have been violated.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The id does not name a node in this tree.
    #[error("no node {0} in this tree")]
    UnknownNode(NodeId),
    /// The operation needs an element.
    #[error("{0} is not an element")]
    NotAnElement(NodeId),
}

impl TreeError {
    /// The violated invariant, if this is a structural error.
    #[must_use]
    pub const fn violation(&self) -> Option<Violation> {
        match self {
            Self::Structural(error) => Some(error.reason),
            _ => None,
        }
    }
}
