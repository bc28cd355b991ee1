//! Live child lists and the element-only index derived from them.
//!
//! [§ 4.2.10 Old-style collections](https://dom.spec.whatwg.org/#interface-htmlcollection)
//!
//! Every parent owns one [`ChildList`]. The list is the only code that writes
//! a node's `parent`/`index` back-reference: each primitive edits the id
//! vector, renumbers the trailing siblings through [`Links`], describes what
//! happened as a [`ListChange`], and feeds that description to the
//! [`ElementIndex`]. The index never rescans the list.

use crate::NodeId;

/// Arena access a [`ChildList`] needs to keep back-references in sync.
pub(crate) trait Links {
    /// Whether `id` is an element node.
    fn is_element(&self, id: NodeId) -> bool;
    /// Current `(parent, index)` of `id`, if attached.
    fn link(&self, id: NodeId) -> Option<(NodeId, usize)>;
    /// Overwrite `(parent, index)` of `id`.
    fn set_link(&mut self, id: NodeId, link: Option<(NodeId, usize)>);
}

/// One structural edit of a child list, precise enough to update a derived
/// view without looking at the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// Nodes were pushed at the end, starting at `start`.
    Appended {
        /// Position of the first appended node.
        start: usize,
        /// Final positions of the appended nodes that are elements, ascending.
        elements: Vec<usize>,
    },
    /// `count` nodes were spliced in at `at`; everything from `at` onward
    /// moved up by `count`.
    Inserted {
        /// Insertion point.
        at: usize,
        /// Number of inserted nodes.
        count: usize,
        /// Final positions of the inserted nodes that are elements, ascending.
        elements: Vec<usize>,
    },
    /// The node at `at` was removed; everything after it moved down by one.
    Removed {
        /// Position the node occupied.
        at: usize,
    },
    /// Every child was detached.
    Cleared,
}

/// Ascending positions of the element children in a [`ChildList`].
///
/// [`ElementIndex::apply`] is a pure function of the old positions and the
/// change, so it can be exercised without any tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementIndex {
    positions: Vec<usize>,
}

impl ElementIndex {
    /// Build the index by scanning a sequence of "is this child an element"
    /// flags. Only used to seed or to cross-check the incremental path.
    #[must_use]
    pub fn rebuild(flags: impl IntoIterator<Item = bool>) -> Self {
        Self {
            positions: flags
                .into_iter()
                .enumerate()
                .filter_map(|(position, is_element)| is_element.then_some(position))
                .collect(),
        }
    }

    /// Positions (into the child list) of the element children.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of element children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no child is an element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of recorded positions strictly below `position`; equal to the
    /// element rank of `position` when it is itself an element.
    #[must_use]
    pub fn rank_before(&self, position: usize) -> usize {
        self.positions.partition_point(|&p| p < position)
    }

    /// Update the index for one list edit.
    pub fn apply(&mut self, change: &ListChange) {
        match change {
            ListChange::Appended { elements, .. } => {
                self.positions.extend_from_slice(elements);
            }
            ListChange::Inserted {
                at,
                count,
                elements,
            } => {
                let rank = self.rank_before(*at);
                for position in &mut self.positions[rank..] {
                    *position += count;
                }
                let _ = self
                    .positions
                    .splice(rank..rank, elements.iter().copied());
            }
            ListChange::Removed { at } => {
                let rank = self.rank_before(*at);
                if self.positions.get(rank) == Some(at) {
                    let _ = self.positions.remove(rank);
                }
                for position in &mut self.positions[rank..] {
                    *position -= 1;
                }
            }
            ListChange::Cleared => self.positions.clear(),
        }
    }
}

/// [§ 4.2.1 Trees](https://dom.spec.whatwg.org/#concept-tree-child)
///
/// "An object that participates in a tree has ... an ordered set of
/// children."
///
/// Each primitive is O(k) in the number of trailing siblings it renumbers.
#[derive(Debug, Clone, Default)]
pub struct ChildList {
    ids: Vec<NodeId>,
    elements: ElementIndex,
}

impl ChildList {
    /// Children in order.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The element-only view.
    #[must_use]
    pub const fn elements(&self) -> &ElementIndex {
        &self.elements
    }

    /// Iterate the element children in order, through the derived view.
    pub fn element_ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + '_ {
        self.elements.positions().iter().map(|&p| self.ids[p])
    }

    /// Append `nodes` (all currently detached) after the last child.
    pub(crate) fn append(
        &mut self,
        owner: NodeId,
        nodes: &[NodeId],
        links: &mut (impl Links + ?Sized),
    ) -> ListChange {
        let start = self.ids.len();
        self.ids.extend_from_slice(nodes);
        let mut elements = Vec::new();
        for (offset, &id) in nodes.iter().enumerate() {
            links.set_link(id, Some((owner, start + offset)));
            if links.is_element(id) {
                elements.push(start + offset);
            }
        }
        self.commit(ListChange::Appended { start, elements })
    }

    /// Insert `nodes` (all currently detached) so the first lands at `at`.
    pub(crate) fn insert_at(
        &mut self,
        owner: NodeId,
        at: usize,
        nodes: &[NodeId],
        links: &mut (impl Links + ?Sized),
    ) -> ListChange {
        debug_assert!(at <= self.ids.len(), "insertion point past the end");
        if at == self.ids.len() {
            return self.append(owner, nodes, links);
        }
        let _ = self.ids.splice(at..at, nodes.iter().copied());
        let elements = nodes
            .iter()
            .enumerate()
            .filter(|&(_, &id)| links.is_element(id))
            .map(|(offset, _)| at + offset)
            .collect();
        self.renumber_from(owner, at, links);
        self.commit(ListChange::Inserted {
            at,
            count: nodes.len(),
            elements,
        })
    }

    /// Remove and detach the child at `at`.
    pub(crate) fn remove_at(
        &mut self,
        owner: NodeId,
        at: usize,
        links: &mut (impl Links + ?Sized),
    ) -> (NodeId, ListChange) {
        let removed = self.ids.remove(at);
        links.set_link(removed, None);
        self.renumber_from(owner, at, links);
        (removed, self.commit(ListChange::Removed { at }))
    }

    /// Remove and detach `node`, which must be a child of `owner`.
    pub(crate) fn remove(
        &mut self,
        owner: NodeId,
        node: NodeId,
        links: &mut (impl Links + ?Sized),
    ) -> Option<ListChange> {
        let (parent, at) = links.link(node)?;
        if parent != owner || self.ids.get(at) != Some(&node) {
            return None;
        }
        Some(self.remove_at(owner, at, links).1)
    }

    /// Detach every child, returning them in their former order.
    pub(crate) fn clear(&mut self, links: &mut (impl Links + ?Sized)) -> Vec<NodeId> {
        let detached = core::mem::take(&mut self.ids);
        for &id in &detached {
            links.set_link(id, None);
        }
        let _ = self.commit(ListChange::Cleared);
        detached
    }

    fn renumber_from(&self, owner: NodeId, from: usize, links: &mut (impl Links + ?Sized)) {
        for (index, &id) in self.ids.iter().enumerate().skip(from) {
            links.set_link(id, Some((owner, index)));
        }
    }

    fn commit(&mut self, change: ListChange) -> ListChange {
        self.elements.apply(&change);
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(positions: &[usize]) -> ElementIndex {
        ElementIndex {
            positions: positions.to_vec(),
        }
    }

    #[test]
    fn append_pushes_new_positions() {
        let mut view = index(&[0, 2]);
        view.apply(&ListChange::Appended {
            start: 3,
            elements: vec![4],
        });
        assert_eq!(view.positions(), &[0, 2, 4]);
    }

    #[test]
    fn insert_shifts_later_positions_and_splices_in_rank() {
        // children: E T E T  ->  insert [E, T] at 1
        let mut view = index(&[0, 2]);
        view.apply(&ListChange::Inserted {
            at: 1,
            count: 2,
            elements: vec![1],
        });
        assert_eq!(view.positions(), &[0, 1, 4]);
    }

    #[test]
    fn insert_at_an_element_position_shifts_it() {
        let mut view = index(&[0, 1]);
        view.apply(&ListChange::Inserted {
            at: 0,
            count: 1,
            elements: vec![],
        });
        assert_eq!(view.positions(), &[1, 2]);
    }

    #[test]
    fn remove_drops_entry_and_decrements_tail() {
        let mut view = index(&[0, 2, 5]);
        view.apply(&ListChange::Removed { at: 2 });
        assert_eq!(view.positions(), &[0, 4]);
    }

    #[test]
    fn remove_of_non_element_only_decrements_tail() {
        let mut view = index(&[0, 2, 5]);
        view.apply(&ListChange::Removed { at: 1 });
        assert_eq!(view.positions(), &[0, 1, 4]);
    }

    #[test]
    fn clear_resets() {
        let mut view = index(&[0, 1]);
        view.apply(&ListChange::Cleared);
        assert!(view.is_empty());
    }

    #[test]
    fn rebuild_matches_flags() {
        let view = ElementIndex::rebuild([false, true, true, false, true]);
        assert_eq!(view.positions(), &[1, 2, 4]);
        assert_eq!(view.rank_before(4), 2);
    }
}
