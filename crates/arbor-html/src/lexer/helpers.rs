//! Cursor helpers for the lexer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! - Input/character handling ("Consume the next input character")
//! - Lookahead ("If the next few characters are...")
//! - Buffer compaction
//! - Parse error reporting

use arbor_common::warning::warn_once;

use super::core::Lexer;

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl Lexer {
    /// The unconsumed input.
    pub(super) fn remaining(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Peek at a codepoint at the given offset from the cursor without
    /// consuming it.
    pub(super) fn peek(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Consume everything that is left.
    pub(super) fn take_rest(&mut self) -> String {
        let rest = self.remaining().to_string();
        self.pos = self.input.len();
        rest
    }

    /// Advance past `count` bytes. Callers only pass lengths of ASCII text
    /// they have already matched.
    pub(super) const fn advance(&mut self, count: usize) {
        self.pos += count;
    }

    /// "If the next few characters are..."
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        self.remaining().starts_with(target)
    }

    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.remaining()
            .as_bytes()
            .get(..target.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(target.as_bytes()))
    }

    /// Consume characters while `predicate` holds and return them.
    pub(super) fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> &str {
        let start = self.pos;
        let len = self
            .remaining()
            .char_indices()
            .find(|&(_, c)| !predicate(c))
            .map_or(self.input.len() - start, |(i, _)| i);
        self.pos += len;
        &self.input[start..start + len]
    }

    /// Skip ASCII whitespace.
    pub(super) fn skip_whitespace(&mut self) {
        let _ = self.consume_while(is_whitespace_char);
    }

    /// Take everything up to (not including) the first occurrence of
    /// `terminator`, consuming the terminator as well. Returns the rest of
    /// the input and `false` when there is no terminator.
    pub(super) fn consume_until(&mut self, terminator: &str) -> (String, bool) {
        match self.remaining().find(terminator) {
            Some(at) => {
                let taken = self.remaining()[..at].to_string();
                self.pos += at + terminator.len();
                (taken, true)
            }
            None => (self.take_rest(), false),
        }
    }

    /// Discard the consumed prefix once the cursor has passed the
    /// compaction threshold.
    pub(super) fn compact(&mut self) {
        if self.pos < self.compaction_threshold {
            return;
        }
        let _ = self.input.drain(..self.pos);
        self.discarded += self.pos;
        self.pos = 0;
    }
}

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
///
/// CR never reaches the lexer; it is normalized away first.
pub(super) const fn is_whitespace_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C')
}

/// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
///
/// "Before the tokenization stage, the input stream must be preprocessed by
/// normalizing newlines."
#[must_use]
pub fn normalize_newlines(input: &str) -> String {
    if !input.contains('\r') {
        return input.to_string();
    }
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// "U+0000 NULL: This is an unexpected-null-character parse error. ... U+FFFD
/// REPLACEMENT CHARACTER"
pub(super) fn replace_nul(text: &mut String) {
    if text.contains('\0') {
        *text = text.replace('\0', "\u{FFFD}");
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl Lexer {
    /// Report a tokenizer parse error, once per distinct message.
    pub(super) fn log_parse_error(&self, what: &str) {
        if self.report_warnings {
            let at = self.discarded + self.pos;
            let _ = warn_once("Lexer", &format!("{what} at byte {at}"));
        }
    }
}
