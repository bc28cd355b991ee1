//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)

use arbor_dom::NodeId;

/// How many entries [`OpenElements::pop_matching`] looks at from the top.
pub const POP_MATCHING_LOOKBACK: usize = 3;

/// "Initially, the stack of open elements is empty. The stack grows downwards;
/// the topmost node on the stack is the first one added to the stack, and the
/// bottommost node of the stack is the most recently added node in the stack"
///
/// Entries are elements already attached to the tree. When parsing a
/// fragment, a context element stands in for the current node while only the
/// synthetic root is open.
#[derive(Debug, Clone, Default)]
pub struct OpenElements {
    items: Vec<NodeId>,
    context: Option<NodeId>,
}

impl OpenElements {
    /// An empty stack with no fragment context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            context: None,
        }
    }

    /// Set the fragment parsing context element.
    pub const fn set_context(&mut self, context: NodeId) {
        self.context = Some(context);
    }

    /// The fragment parsing context element, if any.
    #[must_use]
    pub const fn context(&self) -> Option<NodeId> {
        self.context
    }

    /// Push an element.
    pub fn push(&mut self, id: NodeId) {
        self.items.push(id);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.items.pop()
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open
    /// elements."
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise,
    /// the adjusted current node is the current node."
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        match self.context {
            Some(context) if self.items.len() == 1 => Some(context),
            _ => self.items.last().copied(),
        }
    }

    /// Entry `index`, counting from the first pushed.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).copied()
    }

    /// Whether `id` is on the stack.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.items.contains(&id)
    }

    /// Remove `id` wherever it is on the stack.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.items.iter().rposition(|&item| item == id) {
            Some(position) => {
                let _ = self.items.remove(position);
                true
            }
            None => false,
        }
    }

    /// Empty the stack. The fragment context is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of open elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Close the nearest element for which `is_match` holds, together with
    /// everything opened after it, looking no further than
    /// [`POP_MATCHING_LOOKBACK`] entries from the top.
    ///
    /// Returns `false` and leaves the stack exactly as it was when no entry
    /// within the lookback matches. Deeper entries are never examined, so a
    /// stray end tag cannot close an element far up the tree.
    pub fn pop_matching(&mut self, is_match: impl Fn(NodeId) -> bool) -> bool {
        let floor = self.items.len().saturating_sub(POP_MATCHING_LOOKBACK);
        let found = self.items[floor..]
            .iter()
            .rposition(|&id| is_match(id))
            .map(|offset| floor + offset);
        match found {
            Some(position) => {
                self.items.truncate(position);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(ids: &[usize]) -> OpenElements {
        let mut stack = OpenElements::new();
        for &id in ids {
            stack.push(NodeId(id));
        }
        stack
    }

    fn contents(stack: &OpenElements) -> Vec<usize> {
        (0..stack.len())
            .filter_map(|i| stack.item(i))
            .map(|id| id.0)
            .collect()
    }

    #[test]
    fn pop_matching_closes_match_and_everything_above() {
        let mut s = stack(&[1, 2, 3, 4]);
        assert!(s.pop_matching(|id| id == NodeId(3)));
        assert_eq!(contents(&s), vec![1, 2]);
    }

    #[test]
    fn pop_matching_picks_nearest_match() {
        let mut s = stack(&[1, 5, 5]);
        assert!(s.pop_matching(|id| id.0 == 5));
        assert_eq!(contents(&s), vec![1, 5]);
    }

    #[test]
    fn pop_matching_restores_on_miss() {
        let mut s = stack(&[1, 2, 3]);
        assert!(!s.pop_matching(|id| id == NodeId(9)));
        assert_eq!(contents(&s), vec![1, 2, 3]);
    }

    #[test]
    fn pop_matching_does_not_look_past_three_entries() {
        let mut s = stack(&[1, 2, 3, 4, 5]);
        assert!(!s.pop_matching(|id| id == NodeId(2)));
        assert_eq!(contents(&s), vec![1, 2, 3, 4, 5]);
        assert!(s.pop_matching(|id| id == NodeId(3)));
        assert_eq!(contents(&s), vec![1, 2]);
    }

    #[test]
    fn context_is_current_at_height_one() {
        let mut s = stack(&[1]);
        s.set_context(NodeId(7));
        assert_eq!(s.current(), Some(NodeId(7)));
        s.push(NodeId(2));
        assert_eq!(s.current(), Some(NodeId(2)));
        s.clear();
        assert_eq!(s.current(), None);
        assert_eq!(s.context(), Some(NodeId(7)));
    }

    #[test]
    fn remove_takes_an_entry_out_of_the_middle() {
        let mut s = stack(&[1, 2, 3]);
        assert!(s.remove(NodeId(2)));
        assert!(!s.remove(NodeId(2)));
        assert_eq!(contents(&s), vec![1, 3]);
        assert!(!s.contains(NodeId(2)));
    }
}
