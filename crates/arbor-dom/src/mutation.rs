//! Checked structural mutation.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! Each operation validates the whole request first and only then edits
//! child lists, so an `Err` leaves the tree untouched. All list edits go
//! through [`ChildList`](crate::ChildList) primitives, which are the only
//! writers of a node's parent and index.

use crate::{
    DomTree, ElementKind, NodeData, NodeId, Operation, StructuralError, TreeError, Violation,
};

/// What a single validation pass is asked to approve.
struct Request<'a> {
    operation: Operation,
    parent: NodeId,
    /// The node named by the caller (a fragment, for batch inserts).
    node: NodeId,
    /// Reference child for inserts, old child for replacements.
    reference: Option<NodeId>,
    /// Nodes that will change parent; checked for cycles.
    movers: &'a [NodeId],
    /// Nodes that will become children of `parent`; checked for content rules.
    batch: &'a [NodeId],
}

impl Request<'_> {
    fn refuse(&self, reason: Violation) -> TreeError {
        TreeError::Structural(StructuralError {
            operation: self.operation,
            parent: self.parent,
            node: self.node,
            reference: self.reference,
            reason,
        })
    }

    const fn replaced(&self) -> Option<NodeId> {
        match self.operation {
            Operation::Replace => self.reference,
            Operation::Insert | Operation::Remove => None,
        }
    }
}

impl DomTree {
    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Structural`] when the insertion would break a tree
    /// invariant, or [`TreeError::UnknownNode`] for ids outside this tree.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), TreeError> {
        self.insert_before(parent, node, None)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// "To pre-insert a node into a parent before a child, run these steps:
    /// 1. Ensure pre-insertion validity of node into parent before child.
    /// 2. Let referenceChild be child.
    /// 3. If referenceChild is node, then set referenceChild to node's next sibling.
    /// 4. Insert node into parent before referenceChild."
    ///
    /// A `DocumentFragment` node is emptied and its children are inserted in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Structural`] when the insertion would break a tree
    /// invariant, or [`TreeError::UnknownNode`] for ids outside this tree.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), TreeError> {
        let batch = self.expand(node)?;
        self.validate(&Request {
            operation: Operation::Insert,
            parent,
            node,
            reference,
            movers: &[node],
            batch: &batch,
        })?;

        // STEP 3: "If referenceChild is node, then set referenceChild to
        //          node's next sibling."
        let reference = if reference == Some(node) {
            self.next_sibling(node)
        } else {
            reference
        };
        let batch = self.take_batch(node);
        self.splice_before(parent, reference, &batch);
        Ok(())
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-replace)
    ///
    /// "To replace a child with node within a parent" ... Returns the removed
    /// child.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Structural`] when the replacement would break a
    /// tree invariant or `old` is not a child of `parent`, or
    /// [`TreeError::UnknownNode`] for ids outside this tree.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        old: NodeId,
    ) -> Result<NodeId, TreeError> {
        let batch = self.expand(node)?;
        self.validate(&Request {
            operation: Operation::Replace,
            parent,
            node,
            reference: Some(old),
            movers: &[node],
            batch: &batch,
        })?;
        if node == old {
            return Ok(old);
        }

        // "Let referenceChild be child's next sibling.
        //  If referenceChild is node, then set referenceChild to node's next sibling."
        let mut reference = self.next_sibling(old);
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }
        let batch = self.take_batch(node);
        self.detach(old);
        self.splice_before(parent, reference, &batch);
        Ok(old)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-pre-remove)
    ///
    /// "If child's parent is not parent, then throw a `NotFoundError`."
    ///
    /// # Errors
    ///
    /// Returns [`Violation::NotAChild`] if `node` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, TreeError> {
        let _ = self.check(parent)?;
        let _ = self.check(node)?;
        if self.parent(node) != Some(parent) {
            return Err(StructuralError {
                operation: Operation::Remove,
                parent,
                node,
                reference: None,
                reason: Violation::NotAChild,
            }
            .into());
        }
        self.detach(node);
        Ok(node)
    }

    /// Remove `node` from its parent, if it has one. The node stays in the
    /// arena and can be inserted again.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        let _ = self.with_child_list(parent, |list, nodes| list.remove(parent, node, nodes));
    }

    /// Move every child of `from` to the end of `to`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Structural`] when any moved child would break a
    /// tree invariant under `to`; nothing is moved in that case.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), TreeError> {
        let _ = self.check(from)?;
        if from == to {
            return Ok(());
        }
        let batch = self.children(from).to_vec();
        self.validate(&Request {
            operation: Operation::Insert,
            parent: to,
            node: from,
            reference: None,
            movers: &batch,
            batch: &batch,
        })?;
        let moved = self.with_child_list(from, |list, nodes| list.clear(nodes));
        self.splice_before(to, None, &moved);
        Ok(())
    }

    /// Append character data to `parent`, extending its last child when that
    /// child is already a text node. Returns the text node written to.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Structural`] when `parent` cannot hold text.
    pub fn append_text(&mut self, parent: NodeId, data: &str) -> Result<NodeId, TreeError> {
        let _ = self.check(parent)?;
        if let Some(last) = self.last_child(parent)
            && let Some(NodeData::Text(existing)) = self.nodes.get_mut(last.0).map(|n| &mut n.data)
        {
            existing.push_str(data);
            return Ok(last);
        }
        let text = self.create_text(data);
        self.append_child(parent, text)?;
        Ok(text)
    }

    /// A fragment stands for its children; any other node for itself.
    fn expand(&self, node: NodeId) -> Result<Vec<NodeId>, TreeError> {
        Ok(match self.check(node)?.data() {
            NodeData::DocumentFragment => self.children(node).to_vec(),
            _ => vec![node],
        })
    }

    /// Detach what [`Self::expand`] returned, ready for insertion.
    fn take_batch(&mut self, node: NodeId) -> Vec<NodeId> {
        if matches!(self.data(node), Some(NodeData::DocumentFragment)) {
            self.with_child_list(node, |list, nodes| list.clear(nodes))
        } else {
            self.detach(node);
            vec![node]
        }
    }

    /// Insert detached `batch` into `parent` before `reference`, or at the
    /// end when `reference` is `None`.
    fn splice_before(&mut self, parent: NodeId, reference: Option<NodeId>, batch: &[NodeId]) {
        if batch.is_empty() {
            return;
        }
        let at = reference
            .and_then(|r| self.index(r))
            .unwrap_or_else(|| self.children(parent).len());
        let _ = self.with_child_list(parent, |list, nodes| {
            list.insert_at(parent, at, batch, nodes)
        });
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    ///
    /// "To ensure pre-insertion validity of a node into a parent before a
    /// child", extended with the element-kind content rules.
    fn validate(&self, request: &Request<'_>) -> Result<(), TreeError> {
        let parent = request.parent;
        let parent_data = self.check(parent)?.data();
        let _ = self.check(request.node)?;
        for &id in request.batch {
            let _ = self.check(id)?;
        }

        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //          node, then throw a HierarchyRequestError."
        if matches!(
            parent_data,
            NodeData::Text(_) | NodeData::Comment(_) | NodeData::DocumentType(_)
        ) {
            return Err(request.refuse(Violation::LeafParent));
        }

        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //          then throw a HierarchyRequestError."
        for &mover in request.movers {
            if mover == parent {
                return Err(request.refuse(Violation::SelfInsertion));
            }
            if self.is_descendant_of(parent, mover) {
                return Err(request.refuse(Violation::AncestorCycle));
            }
            if matches!(self.data(mover), Some(NodeData::Document)) {
                return Err(request.refuse(Violation::DocumentAsChild));
            }
        }

        // STEP 3: "If child is non-null and its parent is not parent, then
        //          throw a NotFoundError."
        if let Some(reference) = request.reference {
            let _ = self.check(reference)?;
            if self.parent(reference) != Some(parent) {
                return Err(request.refuse(Violation::NotAChild));
            }
        }

        match parent_data {
            NodeData::Document => self.validate_document_children(request),
            NodeData::Element(element) => {
                self.validate_non_document(request)?;
                match element.kind() {
                    ElementKind::Void if !request.batch.is_empty() => {
                        Err(request.refuse(Violation::ChildOfVoid))
                    }
                    kind if kind.is_text_only()
                        && request
                            .batch
                            .iter()
                            .any(|&id| !matches!(self.data(id), Some(NodeData::Text(_)))) =>
                    {
                        Err(request.refuse(Violation::NonTextInRawText))
                    }
                    _ => Ok(()),
                }
            }
            _ => self.validate_non_document(request),
        }
    }

    /// STEP 5: "If either node is a Text node and parent is a document, or
    ///          node is a doctype and parent is not a document, then throw a
    ///          HierarchyRequestError."
    fn validate_non_document(&self, request: &Request<'_>) -> Result<(), TreeError> {
        if request
            .batch
            .iter()
            .any(|&id| matches!(self.data(id), Some(NodeData::DocumentType(_))))
        {
            return Err(request.refuse(Violation::DoctypeOutsideDocument));
        }
        Ok(())
    }

    /// STEP 6: "If parent is a document, and any of the statements below,
    ///          switched on the interface node implements, are true, then
    ///          throw a HierarchyRequestError."
    fn validate_document_children(&self, request: &Request<'_>) -> Result<(), TreeError> {
        let existing = self.children(request.parent);
        let replaced = request.replaced();
        // Position the batch lands at, in terms of the current child list.
        // Siblings strictly before it "precede"; at or after it "follow".
        let (before, after) = match (request.operation, request.reference) {
            (Operation::Replace, Some(old)) => {
                let at = self.index(old).unwrap_or(existing.len());
                (&existing[..at], &existing[at + 1..])
            }
            (_, Some(reference)) => {
                let at = self.index(reference).unwrap_or(existing.len());
                existing.split_at(at)
            }
            _ => (existing, &existing[existing.len()..]),
        };
        let is_element = |id: &NodeId| self.data(*id).is_some_and(NodeData::is_element);
        let is_doctype = |id: &NodeId| self.data(*id).is_some_and(NodeData::is_doctype);

        if request
            .batch
            .iter()
            .any(|&id| self.data(id).is_some_and(NodeData::is_text))
        {
            return Err(request.refuse(Violation::TextInDocument));
        }

        let incoming_elements = request.batch.iter().filter(|id| is_element(id)).count();
        if incoming_elements > 1 {
            return Err(request.refuse(Violation::SecondDocumentElement));
        }
        if incoming_elements == 1 {
            // "parent has an element child that is not child"
            if existing
                .iter()
                .any(|id| is_element(id) && Some(*id) != replaced)
            {
                return Err(request.refuse(Violation::SecondDocumentElement));
            }
            // "a doctype is following child"
            if after.iter().any(is_doctype) {
                return Err(request.refuse(Violation::ElementBeforeDoctype));
            }
        }

        if request.batch.iter().any(is_doctype) {
            // "parent has a doctype child that is not child"
            if existing
                .iter()
                .any(|id| is_doctype(id) && Some(*id) != replaced)
            {
                return Err(request.refuse(Violation::SecondDoctype));
            }
            // "an element is preceding child" / "parent has an element child"
            if before.iter().any(is_element) {
                return Err(request.refuse(Violation::DoctypeAfterElement));
            }
        }
        Ok(())
    }
}
