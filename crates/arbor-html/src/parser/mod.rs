//! Tree construction.

/// Tree constructor and insertion modes.
mod core;
/// SVG and MathML adjustments and integration points.
pub mod foreign_content;
/// The stack of open elements.
pub mod stack;

use arbor_dom::DomTree;

pub use self::core::{HtmlParser, InsertionMode, ParseIssue, ParseOptions, dump_tree, print_tree};

/// Parse a complete document with default options.
#[must_use]
pub fn parse_document(input: &str) -> DomTree {
    HtmlParser::new(input).run()
}

/// Parse a complete document, returning the tree and every recorded issue.
#[must_use]
pub fn parse_document_with(input: &str, options: ParseOptions) -> (DomTree, Vec<ParseIssue>) {
    HtmlParser::with_options(input, options).run_with_issues()
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `input` as the content of an HTML element named `context`. The
/// returned tree is rooted at a `DocumentFragment` whose children are the
/// parsed nodes.
#[must_use]
pub fn parse_fragment(input: &str, context: &str) -> DomTree {
    HtmlParser::new_fragment(input, context, ParseOptions::default()).run()
}

/// Fragment parsing with explicit options, returning the recorded issues.
#[must_use]
pub fn parse_fragment_with(
    input: &str,
    context: &str,
    options: ParseOptions,
) -> (DomTree, Vec<ParseIssue>) {
    HtmlParser::new_fragment(input, context, options).run_with_issues()
}
