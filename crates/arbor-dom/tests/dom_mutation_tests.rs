//! Tests for checked tree mutation: append_child, insert_before, replace_child,
//! remove_child, move_children, append_text, and the structural refusals.

use arbor_dom::{
    Attributes, DocumentTypeData, DomTree, Namespace, NodeId, TreeError, Violation,
};

/// Helper to create an HTML element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(tag, Namespace::Html, Attributes::new())
}

fn alloc_doctype(tree: &mut DomTree) -> NodeId {
    tree.create_doctype(DocumentTypeData {
        name: "html".to_string(),
        ..Default::default()
    })
}

fn violation(result: Result<impl Sized, TreeError>) -> Option<Violation> {
    result.err().and_then(|e| e.violation())
}

/// Every attached child must sit where its recorded index says.
fn assert_back_references(tree: &DomTree, parent: NodeId) {
    for (i, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.parent(child), Some(parent));
        assert_eq!(tree.index(child), Some(i));
    }
}

// ========== append / insert ==========

#[test]
fn test_append_assigns_ascending_indices() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html).unwrap();

    let a = alloc_element(&mut tree, "a");
    let t = tree.create_text("x");
    let b = alloc_element(&mut tree, "b");
    for id in [a, t, b] {
        tree.append_child(html, id).unwrap();
    }

    assert_eq!(tree.children(html), &[a, t, b]);
    assert_back_references(&tree, html);
    assert_eq!(tree.element_children(html).collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();

    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, b).unwrap();
    tree.append_child(parent, c).unwrap();

    let a = alloc_element(&mut tree, "a");
    tree.insert_before(parent, a, Some(b)).unwrap();

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_back_references(&tree, parent);
    assert_eq!(tree.child_element_count(parent), 3);
}

#[test]
fn test_insert_before_itself_is_a_no_op() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, a).unwrap();
    tree.append_child(parent, b).unwrap();

    tree.insert_before(parent, a, Some(a)).unwrap();

    assert_eq!(tree.children(parent), &[a, b]);
    assert_back_references(&tree, parent);
}

#[test]
fn test_append_moves_node_from_old_parent() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(first, a).unwrap();
    tree.append_child(first, b).unwrap();

    tree.append_child(second, a).unwrap();

    assert_eq!(tree.children(first), &[b]);
    assert_eq!(tree.children(second), &[a]);
    assert_back_references(&tree, first);
    assert_back_references(&tree, second);
    assert_eq!(tree.first_element_child(first), Some(b));
}

#[test]
fn test_fragment_insert_moves_children_in_order() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    let last = alloc_element(&mut tree, "li");
    tree.append_child(parent, last).unwrap();

    let fragment = tree.create_fragment();
    let one = alloc_element(&mut tree, "li");
    let two = alloc_element(&mut tree, "li");
    tree.append_child(fragment, one).unwrap();
    tree.append_child(fragment, two).unwrap();

    tree.insert_before(parent, fragment, Some(last)).unwrap();

    assert_eq!(tree.children(parent), &[one, two, last]);
    assert!(tree.children(fragment).is_empty());
    assert_eq!(tree.parent(fragment), None);
    assert_back_references(&tree, parent);
}

// ========== replace / remove ==========

#[test]
fn test_replace_child_keeps_position() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    for id in [a, b, c] {
        tree.append_child(parent, id).unwrap();
    }

    let text = tree.create_text("middle");
    let old = tree.replace_child(parent, text, b).unwrap();

    assert_eq!(old, b);
    assert_eq!(tree.children(parent), &[a, text, c]);
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.element_children(parent).collect::<Vec<_>>(), vec![a, c]);
    assert_back_references(&tree, parent);
}

#[test]
fn test_replace_with_following_sibling() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    for id in [a, b, c] {
        tree.append_child(parent, id).unwrap();
    }

    let _ = tree.replace_child(parent, b, a).unwrap();

    assert_eq!(tree.children(parent), &[b, c]);
    assert_back_references(&tree, parent);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    for id in [a, b, c] {
        tree.append_child(parent, id).unwrap();
    }

    let removed = tree.remove_child(parent, b).unwrap();

    assert_eq!(removed, b);
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.index(b), None);
    assert_eq!(tree.next_element_sibling(a), Some(c));
}

#[test]
fn test_remove_child_of_wrong_parent() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let other = alloc_element(&mut tree, "div");
    let child = alloc_element(&mut tree, "p");
    tree.append_child(other, child).unwrap();

    assert_eq!(
        violation(tree.remove_child(parent, child)),
        Some(Violation::NotAChild)
    );
    assert_eq!(tree.children(other), &[child]);
}

#[test]
fn test_move_children_appends_all() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "section");
    let existing = alloc_element(&mut tree, "h1");
    tree.append_child(to, existing).unwrap();

    let a = alloc_element(&mut tree, "a");
    let t = tree.create_text("t");
    tree.append_child(from, a).unwrap();
    tree.append_child(from, t).unwrap();

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, a, t]);
    assert_back_references(&tree, to);
    assert_eq!(tree.last_element_child(to), Some(a));
}

// ========== text coalescing ==========

#[test]
fn test_append_text_coalesces() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    let first = tree.append_text(p, "hello").unwrap();
    let second = tree.append_text(p, " world").unwrap();

    assert_eq!(first, second);
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "hello world");
}

// ========== structural refusals ==========

#[test]
fn test_self_insertion_refused() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    assert_eq!(
        violation(tree.append_child(div, div)),
        Some(Violation::SelfInsertion)
    );
}

#[test]
fn test_ancestor_cycle_refused() {
    let mut tree = DomTree::new();
    let outer = alloc_element(&mut tree, "div");
    let inner = alloc_element(&mut tree, "span");
    tree.append_child(outer, inner).unwrap();

    assert_eq!(
        violation(tree.append_child(inner, outer)),
        Some(Violation::AncestorCycle)
    );
    assert_eq!(tree.children(outer), &[inner]);
    assert!(tree.children(inner).is_empty());
}

#[test]
fn test_void_element_refuses_children() {
    let mut tree = DomTree::new();
    let br = alloc_element(&mut tree, "br");
    let text = tree.create_text("x");
    assert_eq!(
        violation(tree.append_child(br, text)),
        Some(Violation::ChildOfVoid)
    );
    assert_eq!(tree.parent(text), None);
}

#[test]
fn test_raw_text_element_accepts_only_text() {
    let mut tree = DomTree::new();
    let script = alloc_element(&mut tree, "script");
    let comment = tree.create_comment("c");
    assert_eq!(
        violation(tree.append_child(script, comment)),
        Some(Violation::NonTextInRawText)
    );
    let _ = tree.append_text(script, "let a;").unwrap();
    assert_eq!(tree.text_content(script), "let a;");
}

#[test]
fn test_leaf_parent_refused() {
    let mut tree = DomTree::new();
    let text = tree.create_text("x");
    let span = alloc_element(&mut tree, "span");
    assert_eq!(
        violation(tree.append_child(text, span)),
        Some(Violation::LeafParent)
    );
}

#[test]
fn test_doctype_outside_document_refused() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    let doctype = alloc_doctype(&mut tree);
    assert_eq!(
        violation(tree.append_child(div, doctype)),
        Some(Violation::DoctypeOutsideDocument)
    );
    let fragment = tree.create_fragment();
    assert_eq!(
        violation(tree.append_child(fragment, doctype)),
        Some(Violation::DoctypeOutsideDocument)
    );
}

#[test]
fn test_unknown_node_reported() {
    let mut tree = DomTree::new();
    let missing = NodeId(999);
    assert_eq!(
        tree.append_child(NodeId::ROOT, missing),
        Err(TreeError::UnknownNode(missing))
    );
}

#[test]
fn test_set_attribute_on_text_refused() {
    let mut tree = DomTree::new();
    let text = tree.create_text("x");
    assert_eq!(
        tree.set_attribute(text, "id", "a"),
        Err(TreeError::NotAnElement(text))
    );
    let div = alloc_element(&mut tree, "div");
    assert_eq!(tree.set_attribute(div, "id", "a"), Ok(None));
    assert_eq!(tree.attribute(div, "id"), Some("a"));
}

#[test]
fn test_attribute_edits_check_the_node_first() {
    let mut tree = DomTree::new();
    let missing = NodeId(999);
    assert_eq!(
        tree.set_attribute(missing, "id", "a"),
        Err(TreeError::UnknownNode(missing))
    );
    assert_eq!(
        tree.remove_attribute(missing, "id"),
        Err(TreeError::UnknownNode(missing))
    );

    let div = alloc_element(&mut tree, "div");
    assert_eq!(tree.set_attribute(div, "id", "a"), Ok(None));
    assert_eq!(tree.set_attribute(div, "id", "b"), Ok(Some("a".to_string())));
    assert_eq!(tree.remove_attribute(div, "id"), Ok(Some("b".to_string())));
    assert_eq!(tree.attribute(div, "id"), None);
}

#[test]
fn test_error_message_names_the_nodes() {
    let mut tree = DomTree::new();
    let br = alloc_element(&mut tree, "br");
    let text = tree.create_text("x");
    let message = tree.append_child(br, text).unwrap_err().to_string();
    assert_eq!(
        message,
        "insert of #2 under #1 refused: void elements cannot have children"
    );
}
