//! Markup lexer and tree constructor for the arbor parser.
//!
//! # Scope
//!
//! This crate implements:
//! - **Lexer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Text, tags, attributes, comments, DOCTYPE and CDATA sections
//!   - Character references in text and attribute values
//!   - Raw text and escapable raw text consumption on demand
//!
//! - **Tree Constructor** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, BeforeHtml, BeforeHead, InHead, AfterHead, InBody, AfterBody, AfterAfterBody
//!   - Foreign content (SVG and MathML) with integration points
//!   - Implied tags and a stack of open elements with bounded end-tag lookback
//!   - Fragment parsing against a context element
//!
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! # Not Implemented
//!
//! - Table parsing modes
//! - Form element handling
//! - Foster parenting
//! - Adoption agency algorithm
//! - Encoding sniffing

/// Markup lexer producing tokens on demand.
pub mod lexer;
/// Tree construction.
pub mod parser;
/// HTML serialization of a tree.
pub mod serialize;

pub use lexer::{Lexer, TagAttribute, Token};
pub use parser::{
    HtmlParser, InsertionMode, ParseIssue, ParseOptions, dump_tree, parse_document,
    parse_document_with, parse_fragment, parse_fragment_with, print_tree,
};
pub use serialize::{SerializeOptions, serialize, serialize_children};
