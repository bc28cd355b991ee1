//! Markup lexer.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard as a pull lexer: one call, one token.

/// Character reference decoding per § 13.2.5.72.
pub mod character_reference;
/// Lexer state and token scanning.
pub mod core;
/// Cursor helpers shared by the scanning routines.
pub mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Token types produced by the lexer.
pub mod token;

pub use self::core::{DEFAULT_COMPACTION_THRESHOLD, Lexer};
pub use character_reference::{ReferenceContext, decode};
pub use helpers::normalize_newlines;
pub use token::{TagAttribute, Token};
