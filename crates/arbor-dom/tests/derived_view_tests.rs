//! The element-only view is maintained incrementally; after every edit it must
//! equal a view rebuilt by scanning the child list.

use arbor_dom::{Attributes, DomTree, ElementIndex, Namespace, NodeData, NodeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    /// Append a new element (`true`) or text node (`false`).
    Append(bool),
    /// Insert a new node before the child at `seed % len`.
    Insert(usize, bool),
    /// Remove the child at `seed % len`.
    Remove(usize),
    /// Move the child at `seed % len` to the end.
    MoveToEnd(usize),
}

fn rebuilt(tree: &DomTree, parent: NodeId) -> ElementIndex {
    ElementIndex::rebuild(
        tree.children(parent)
            .iter()
            .map(|&id| matches!(tree.data(id), Some(NodeData::Element(_)))),
    )
}

fn new_node(tree: &mut DomTree, element: bool) -> NodeId {
    if element {
        tree.create_element("span", Namespace::Html, Attributes::new())
    } else {
        tree.create_comment("c")
    }
}

fn apply(tree: &mut DomTree, parent: NodeId, op: &Op) {
    let len = tree.children(parent).len();
    match *op {
        Op::Append(element) => {
            let node = new_node(tree, element);
            tree.append_child(parent, node).unwrap();
        }
        Op::Insert(seed, element) => {
            let reference = (len > 0).then(|| tree.children(parent)[seed % len]);
            let node = new_node(tree, element);
            tree.insert_before(parent, node, reference).unwrap();
        }
        Op::Remove(seed) if len > 0 => {
            let child = tree.children(parent)[seed % len];
            let _ = tree.remove_child(parent, child).unwrap();
        }
        Op::MoveToEnd(seed) if len > 0 => {
            let child = tree.children(parent)[seed % len];
            tree.append_child(parent, child).unwrap();
        }
        Op::Remove(_) | Op::MoveToEnd(_) => {}
    }
}

fn check_view(tree: &DomTree, parent: NodeId) {
    let incremental = tree.element_index(parent).unwrap();
    assert_eq!(incremental, &rebuilt(tree, parent));
    for (i, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.index(child), Some(i));
    }
}

#[test]
fn test_thousand_interleaved_operations() {
    let mut tree = DomTree::new();
    let parent = tree.create_element("div", Namespace::Html, Attributes::new());

    // Small linear congruential generator so the sequence is reproducible.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        usize::try_from(state >> 33).unwrap()
    };

    for _ in 0..1000 {
        let roll = next();
        let element = next() % 2 == 0;
        let op = match roll % 10 {
            0..=2 => Op::Append(element),
            3..=5 => Op::Insert(next(), element),
            6..=8 => Op::Remove(next()),
            _ => Op::MoveToEnd(next()),
        };
        apply(&mut tree, parent, &op);
        check_view(&tree, parent);
    }
}

#[test]
fn test_sibling_navigation_through_view() {
    let mut tree = DomTree::new();
    let parent = tree.create_element("div", Namespace::Html, Attributes::new());
    let a = new_node(&mut tree, true);
    let c1 = new_node(&mut tree, false);
    let c2 = new_node(&mut tree, false);
    let b = new_node(&mut tree, true);
    for id in [a, c1, c2, b] {
        tree.append_child(parent, id).unwrap();
    }

    assert_eq!(tree.next_element_sibling(a), Some(b));
    assert_eq!(tree.next_element_sibling(c1), Some(b));
    assert_eq!(tree.prev_element_sibling(b), Some(a));
    assert_eq!(tree.prev_element_sibling(c2), Some(a));
    assert_eq!(tree.prev_element_sibling(a), None);
    assert_eq!(tree.next_element_sibling(b), None);
}

#[test]
fn test_clear_via_move_children_resets_view() {
    let mut tree = DomTree::new();
    let from = tree.create_element("div", Namespace::Html, Attributes::new());
    let to = tree.create_element("div", Namespace::Html, Attributes::new());
    for element in [true, false, true] {
        let node = new_node(&mut tree, element);
        tree.append_child(from, node).unwrap();
    }

    tree.move_children(from, to).unwrap();

    assert!(tree.element_index(from).unwrap().is_empty());
    assert_eq!(tree.element_index(to).unwrap().positions(), &[0, 2]);
    check_view(&tree, to);
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Append),
        (any::<usize>(), any::<bool>()).prop_map(|(seed, e)| Op::Insert(seed, e)),
        any::<usize>().prop_map(Op::Remove),
        any::<usize>().prop_map(Op::MoveToEnd),
    ]
}

proptest! {
    #[test]
    fn view_matches_rebuild_after_every_edit(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let mut tree = DomTree::new();
        let parent = tree.create_element("div", Namespace::Html, Attributes::new());
        for op in &ops {
            apply(&mut tree, parent, op);
            let incremental = tree.element_index(parent).unwrap().clone();
            prop_assert_eq!(incremental, rebuilt(&tree, parent));
        }
    }
}
