//! Integration tests for fragment parsing and serialization.

use arbor_dom::{DomTree, Namespace, NodeData, NodeId};
use arbor_html::{
    ParseIssue, ParseOptions, SerializeOptions, parse_document_with, parse_fragment,
    parse_fragment_with, serialize,
};
use proptest::prelude::*;

fn quiet() -> ParseOptions {
    ParseOptions {
        report_warnings: false,
        ..ParseOptions::default()
    }
}

fn fragment(input: &str, context: &str) -> (DomTree, Vec<ParseIssue>) {
    parse_fragment_with(input, context, quiet())
}

fn to_markup(tree: &DomTree) -> String {
    serialize(tree, NodeId::ROOT, &SerializeOptions::default())
}

/// Parse, serialize, parse the output again and serialize once more.
fn reserialize(input: &str) -> (String, String) {
    let first = to_markup(&parse_document_with(input, quiet()).0);
    let second = to_markup(&parse_document_with(&first, quiet()).0);
    (first, second)
}

#[test]
fn test_fragment_children_land_in_fragment_root() {
    let (tree, issues) = fragment("<b>x</b>y<!--c-->", "div");
    assert!(matches!(
        tree.data(NodeId::ROOT),
        Some(NodeData::DocumentFragment)
    ));
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 3);
    assert_eq!(tree.local_name(children[0]), Some("b"));
    assert_eq!(tree.as_text(children[1]), Some("y"));
    assert!(matches!(tree.data(children[2]), Some(NodeData::Comment(_))));
    assert!(issues.is_empty());
}

#[test]
fn test_fragment_has_no_implied_html_head_or_body() {
    let tree = parse_fragment("<p>a</p><p>b</p>", "body");
    assert_eq!(to_markup(&tree), "<p>a</p><p>b</p>");
}

#[test]
fn test_fragment_text_coalesces_at_top_level() {
    let (tree, _) = fragment("a&amp;b<!---->c", "span");
    let children = tree.children(NodeId::ROOT);
    assert_eq!(tree.as_text(children[0]), Some("a&b"));
    assert_eq!(tree.as_text(children[2]), Some("c"));
}

#[test]
fn test_fragment_in_escapable_context_is_decoded_text() {
    let (tree, _) = fragment("a <b>&amp;</b>", "title");
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.as_text(children[0]), Some("a <b>&</b>"));
}

#[test]
fn test_fragment_in_raw_context_is_verbatim_text() {
    let (tree, _) = fragment("if (a < b) { x = \"</p>\"; }", "SCRIPT");
    assert_eq!(
        tree.text_content(NodeId::ROOT),
        "if (a < b) { x = \"</p>\"; }"
    );
    assert_eq!(tree.element_children(NodeId::ROOT).count(), 0);
}

#[test]
fn test_fragment_stray_end_tag_is_ignored() {
    let (tree, issues) = fragment("</div>x", "div");
    assert_eq!(tree.text_content(NodeId::ROOT), "x");
    assert!(
        issues
            .iter()
            .any(|issue| issue.message.contains("unmatched end tag </div>"))
    );
}

#[test]
fn test_fragment_end_html_is_ignored() {
    let (tree, issues) = fragment("a</html>b", "div");
    assert_eq!(tree.text_content(NodeId::ROOT), "ab");
    assert!(
        issues
            .iter()
            .any(|issue| issue.message.contains("</html> in fragment"))
    );
}

#[test]
fn test_fragment_with_void_context_is_parsed_as_body_content() {
    let (tree, issues) = fragment("<b>x</b>y<!--c-->", "BR");
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 3);
    assert_eq!(tree.local_name(children[0]), Some("b"));
    assert_eq!(tree.text_content(NodeId::ROOT), "xy");
    assert!(
        issues
            .iter()
            .any(|issue| !issue.is_error && issue.message.contains("void context <br>"))
    );
    assert_eq!(to_markup(&parse_fragment("<i>a</i>", "img")), "<i>a</i>");
}

#[test]
fn test_fragment_foreign_content() {
    let (tree, _) = fragment("<svg><circle/></svg><math><mi>i</mi></math>", "div");
    let children = tree.children(NodeId::ROOT);
    let svg = tree.as_element(children[0]).expect("svg");
    assert_eq!(*svg.namespace(), Namespace::Svg);
    let circle = tree.first_child(children[0]).expect("circle");
    assert_eq!(
        *tree.as_element(circle).expect("circle").namespace(),
        Namespace::Svg
    );
    let math = tree.as_element(children[1]).expect("math");
    assert_eq!(*math.namespace(), Namespace::MathMl);
}

#[test]
fn test_fragment_nodes_have_no_parent_outside_result() {
    let (tree, _) = fragment("<i>x</i>", "div");
    let i = tree.children(NodeId::ROOT)[0];
    assert_eq!(tree.parent(i), Some(NodeId::ROOT));
    assert_eq!(tree.ancestors(i).count(), 1);
}

#[test]
fn test_serialize_round_trip_is_stable() {
    let inputs = [
        "<!DOCTYPE html><title>A &amp; B</title><p class=\"x y\">one<br>two</p>",
        "<ul><li>a<li>b</ul><!--note--><pre>\n\nindented</pre>",
        "<textarea>\nkeep</textarea><script>if (a < b && c) {}</script>",
        "<p title='say \"hi\"'>x&nbsp;y &lt;z&gt;</p></body><!--tail-->",
        "<table><tr><td>cell</td></tr></table><img alt=\"\" src=a.png>",
    ];
    for input in inputs {
        let (first, second) = reserialize(input);
        assert_eq!(first, second, "not stable for {input:?}");
    }
}

#[test]
fn test_plaintext_round_trip_does_not_grow() {
    for input in ["<plaintext><b>x", "<p>a<plaintext>&amp; </p></body>"] {
        let (first, second) = reserialize(input);
        assert!(!first.ends_with("</html>"), "closed after plaintext: {first}");
        assert_eq!(first, second, "not stable for {input:?}");
    }
    let (first, _) = reserialize("<plaintext><b>x");
    assert_eq!(first, "<html><head></head><body><plaintext><b>x");
}

#[test]
fn test_serialize_fragment_round_trip() {
    let tree = parse_fragment("<em>a</em> &lt; <code>b</code>", "p");
    let markup = to_markup(&tree);
    assert_eq!(markup, "<em>a</em> &lt; <code>b</code>");
    assert_eq!(to_markup(&parse_fragment(&markup, "p")), markup);
}

proptest! {
    #[test]
    fn serialize_parse_serialize_is_stable(text in "[a-z &;>\u{a0}]{0,24}", attr in "[a-z \"&]{0,12}") {
        let input = format!("<!DOCTYPE html><div data-v=\"{}\">{text}</div>", attr.replace('"', "&quot;"));
        let (first, second) = reserialize(&input);
        prop_assert_eq!(first, second);
    }
}
