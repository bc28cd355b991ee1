use super::character_reference::{ReferenceContext, decode};
use super::helpers::{is_whitespace_char, normalize_newlines, replace_nul};
use super::token::{TagAttribute, Token};

/// Default number of consumed bytes kept before the buffer is compacted.
pub const DEFAULT_COMPACTION_THRESHOLD: usize = 64 * 1024;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// A cursor over the input that produces one token per call. The sub-state
/// to run is chosen by looking at the next character, so no state survives
/// between calls except the foreign-content flag and the one-shot newline
/// skip.
///
/// The tree constructor can take over the cursor with the forced
/// extraction operations ([`Lexer::raw_text_until`],
/// [`Lexer::escapable_raw_text_until`], [`Lexer::rest_as_text`]) when an
/// element's content must not be tokenized.
pub struct Lexer {
    /// Newline-normalized input. The prefix before `pos` is dead and may be
    /// discarded by compaction.
    pub(super) input: String,
    pub(super) pos: usize,
    /// Bytes dropped by compaction, for reporting absolute positions.
    pub(super) discarded: usize,
    pub(super) compaction_threshold: usize,
    pub(super) report_warnings: bool,
    /// Set once `EndOfInput` has been produced.
    finished: bool,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    /// "If there is an adjusted current node and it is not an element in the
    /// HTML namespace", `<![CDATA[` opens a CDATA section.
    foreign: bool,
    /// Drop one LF at the cursor before the next read.
    skip_newline: bool,
}

impl Lexer {
    /// Create a lexer over `input`. CR and CRLF are normalized to LF.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: normalize_newlines(input),
            pos: 0,
            discarded: 0,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
            report_warnings: true,
            finished: false,
            foreign: false,
            skip_newline: false,
        }
    }

    /// Set how many consumed bytes are kept before the buffer is compacted.
    #[must_use]
    pub const fn with_compaction_threshold(mut self, bytes: usize) -> Self {
        self.compaction_threshold = bytes;
        self
    }

    /// Enable or disable parse error warnings.
    #[must_use]
    pub const fn with_warnings(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    /// Tell the lexer whether the insertion point is foreign content, which
    /// decides how `<![CDATA[` is read.
    pub const fn set_foreign(&mut self, foreign: bool) {
        self.foreign = foreign;
    }

    /// Drop the next character if it is a line feed. Used right after
    /// `pre`, `listing` and `textarea` start tags.
    pub const fn skip_next_newline(&mut self) {
        self.skip_newline = true;
    }

    /// Absolute byte offset of the cursor in the normalized input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.discarded + self.pos
    }

    /// Whether `EndOfInput` has been produced.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produce the next token. After `EndOfInput`, keeps producing
    /// `EndOfInput`.
    pub fn next_token(&mut self) -> Token {
        loop {
            if self.finished {
                return Token::EndOfInput;
            }
            self.compact();
            self.apply_newline_skip();
            if let Some(token) = self.scan() {
                return token;
            }
        }
    }

    /// Run the lexer to completion and collect every token, including the
    /// final `EndOfInput`.
    #[must_use]
    pub fn into_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_end_of_input();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Dispatch on the next character. `None` means the scan consumed input
    /// without producing a token (`</>`, an empty CDATA section).
    fn scan(&mut self) -> Option<Token> {
        match self.peek(0) {
            // "EOF: Emit an end-of-file token."
            None => {
                self.finished = true;
                Some(Token::EndOfInput)
            }
            Some('<') => self.scan_markup(),
            Some(_) => Some(self.scan_text()),
        }
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    ///
    /// Run to the next `<` and emit a decoded text token.
    fn scan_text(&mut self) -> Token {
        let raw = self.consume_while(|c| c != '<');
        let mut data = decode(raw, ReferenceContext::Text).into_owned();
        replace_nul(&mut data);
        Token::Text { data }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn scan_markup(&mut self) -> Option<Token> {
        match (self.peek(1), self.peek(2)) {
            // "ASCII alpha: Create a new start tag token"
            (Some(c), _) if c.is_ascii_alphabetic() => {
                self.advance(1);
                self.scan_tag(true)
            }
            // [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
            (Some('/'), Some(c)) if c.is_ascii_alphabetic() => {
                self.advance(2);
                self.scan_tag(false)
            }
            // "U+003E GREATER-THAN SIGN (>): This is a missing-end-tag-name
            //  parse error. Switch to the data state."
            (Some('/'), Some('>')) => {
                self.log_parse_error("missing end tag name");
                self.advance(3);
                None
            }
            // "EOF: This is an eof-before-tag-name parse error. Emit a U+003C
            //  LESS-THAN SIGN character token, a U+002F SOLIDUS character token
            //  and an end-of-file token."
            (Some('/'), None) => {
                self.log_parse_error("eof before tag name");
                self.advance(2);
                Some(Token::text("</"))
            }
            // "Anything else: This is an invalid-first-character-of-tag-name
            //  parse error. Create a comment token whose data is the empty
            //  string. Reconsume in the bogus comment state."
            (Some('/'), Some(_)) => {
                self.log_parse_error("invalid first character of tag name");
                self.advance(2);
                Some(self.scan_bogus_comment())
            }
            // "U+0021 EXCLAMATION MARK (!): Switch to the markup declaration open state."
            (Some('!'), _) => {
                self.advance(2);
                self.scan_markup_declaration()
            }
            // "U+003F QUESTION MARK (?): This is an
            //  unexpected-question-mark-instead-of-tag-name parse error. Create
            //  a comment token whose data is the empty string. Reconsume in the
            //  bogus comment state."
            (Some('?'), _) => {
                self.log_parse_error("unexpected question mark instead of tag name");
                self.advance(1);
                Some(self.scan_bogus_comment())
            }
            // "Anything else: This is an invalid-first-character-of-tag-name
            //  parse error. Emit a U+003C LESS-THAN SIGN character token.
            //  Reconsume in the data state."
            _ => {
                self.advance(1);
                Some(Token::text("<"))
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    /// through [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state).
    ///
    /// The cursor is on the first letter of the name. Returns `EndOfInput`
    /// (and finishes) when the input ends inside the tag: "This is an
    /// eof-in-tag parse error. Emit an end-of-file token."
    fn scan_tag(&mut self, is_start: bool) -> Option<Token> {
        let name = self.scan_name(|c| is_whitespace_char(c) || c == '/' || c == '>');
        let Some((attributes, self_closing)) = self.scan_attributes() else {
            self.log_parse_error("eof in tag");
            self.finished = true;
            return Some(Token::EndOfInput);
        };
        Some(if is_start {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            }
        } else {
            if !attributes.is_empty() {
                self.log_parse_error("end tag with attributes");
            }
            Token::EndTag { name }
        })
    }

    /// Collect a lowercased name up to a delimiter; NUL becomes U+FFFD.
    fn scan_name(&mut self, is_delimiter: impl Fn(char) -> bool) -> String {
        let mut name = self.consume_while(|c| !is_delimiter(c)).to_ascii_lowercase();
        replace_nul(&mut name);
        name
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// Collect attributes until `>`. Returns `None` at end of input.
    fn scan_attributes(&mut self) -> Option<(Vec<TagAttribute>, bool)> {
        let mut attributes: Vec<TagAttribute> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek(0)? {
                '>' => {
                    self.advance(1);
                    return Some((attributes, false));
                }
                '/' => {
                    self.advance(1);
                    if self.peek(0) == Some('>') {
                        self.advance(1);
                        return Some((attributes, true));
                    }
                    // "This is an unexpected-solidus-in-tag parse error.
                    //  Reconsume in the before attribute name state."
                }
                _ => {
                    let attribute = self.scan_attribute()?;
                    // "if there is already an attribute on the token with the
                    //  exact same name, then this is a duplicate-attribute parse
                    //  error and the new attribute must be removed from the token."
                    if attributes.iter().any(|a| a.name == attribute.name) {
                        self.log_parse_error(&format!(
                            "duplicate attribute '{}'",
                            attribute.name
                        ));
                    } else {
                        attributes.push(attribute);
                    }
                }
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    /// and the attribute value states.
    fn scan_attribute(&mut self) -> Option<TagAttribute> {
        // "U+003D EQUALS SIGN (=): This is an
        //  unexpected-equals-sign-before-attribute-name parse error. Start a
        //  new attribute in the current tag token. Set that attribute's name
        //  to the current input character"
        let mut name = String::new();
        if self.peek(0) == Some('=') {
            self.advance(1);
            name.push('=');
        }
        name.push_str(
            &self.scan_name(|c| is_whitespace_char(c) || matches!(c, '/' | '>' | '=')),
        );

        // [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
        self.skip_whitespace();
        if self.peek(0)? != '=' {
            return Some(TagAttribute::new(name, ""));
        }
        self.advance(1);

        // [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
        self.skip_whitespace();
        let raw = match self.peek(0)? {
            quote @ ('"' | '\'') => {
                self.advance(1);
                let (value, closed) = self.consume_until(if quote == '"' { "\"" } else { "'" });
                if !closed {
                    return None;
                }
                value
            }
            // "U+003E GREATER-THAN SIGN (>): This is a missing-attribute-value
            //  parse error."
            '>' => String::new(),
            _ => {
                let value = self
                    .consume_while(|c| !is_whitespace_char(c) && c != '>')
                    .to_string();
                // An unquoted value can only end in EOF when the tag does.
                let _ = self.peek(0)?;
                value
            }
        };
        let mut value = decode(&raw, ReferenceContext::Attribute).into_owned();
        replace_nul(&mut value);
        Some(TagAttribute::new(name, value))
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// The cursor is just past `<!`.
    fn scan_markup_declaration(&mut self) -> Option<Token> {
        // "Two U+002D HYPHEN-MINUS characters (-): Consume those two
        //  characters, create a comment token whose data is the empty string,
        //  and switch to the comment start state."
        if self.next_few_characters_are("--") {
            self.advance(2);
            return Some(self.scan_comment());
        }
        // "ASCII case-insensitive match for the word 'DOCTYPE': Consume those
        //  characters and switch to the DOCTYPE state."
        if self.next_few_characters_are_case_insensitive("doctype") {
            self.advance("doctype".len());
            return Some(self.scan_doctype());
        }
        // "The string '[CDATA[' (the five uppercase letters 'CDATA' with a
        //  U+005B LEFT SQUARE BRACKET character before and after)"
        if self.next_few_characters_are("[CDATA[") {
            if self.foreign {
                // "Consume those characters and switch to the CDATA section state."
                self.advance("[CDATA[".len());
                let (data, closed) = self.consume_until("]]>");
                if !closed {
                    self.log_parse_error("eof in cdata");
                }
                return (!data.is_empty()).then_some(Token::Text { data });
            }
            // "Otherwise, this is a cdata-in-html-content parse error. Create
            //  a comment token whose data is the '[CDATA[' string. Switch to
            //  the bogus comment state."
            self.log_parse_error("cdata in html content");
        } else {
            // "Anything else: This is an incorrectly-opened-comment parse error."
            self.log_parse_error("incorrectly opened comment");
        }
        Some(self.scan_bogus_comment())
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// Everything up to the next `>` (or the end of input) is the comment.
    fn scan_bogus_comment(&mut self) -> Token {
        let (mut data, _) = self.consume_until(">");
        replace_nul(&mut data);
        Token::Comment { data }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    /// through [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state).
    ///
    /// The cursor is just past `<!--`.
    fn scan_comment(&mut self) -> Token {
        // "U+003E GREATER-THAN SIGN (>): This is an abrupt-closing-of-empty-comment
        //  parse error. Switch to the data state. Emit the current comment token."
        for abrupt in [">", "->"] {
            if self.next_few_characters_are(abrupt) {
                self.log_parse_error("abrupt closing of empty comment");
                self.advance(abrupt.len());
                return Token::Comment {
                    data: String::new(),
                };
            }
        }
        let remaining = self.remaining();
        let close = [("-->", 3), ("--!>", 4)]
            .into_iter()
            .filter_map(|(closer, len)| remaining.find(closer).map(|at| (at, len)))
            .min_by_key(|&(at, _)| at);
        let mut data = match close {
            Some((at, len)) => {
                let data = remaining[..at].to_string();
                self.advance(at + len);
                data
            }
            // "EOF: This is an eof-in-comment parse error. Emit the current
            //  comment token. Emit an end-of-file token."
            None => {
                self.log_parse_error("eof in comment");
                self.take_rest()
            }
        };
        replace_nul(&mut data);
        Token::Comment { data }
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    /// through [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state).
    ///
    /// The cursor is just past `<!doctype`. Running out of input emits the
    /// doctype collected so far.
    fn scan_doctype(&mut self) -> Token {
        let mut public_id = None;
        let mut system_id = None;

        // [§ 13.2.5.54 Before DOCTYPE name state]
        self.skip_whitespace();
        let name = self.scan_name(|c| is_whitespace_char(c) || c == '>');
        let name = (!name.is_empty()).then_some(name);

        // [§ 13.2.5.56 After DOCTYPE name state]
        self.skip_whitespace();
        if self.next_few_characters_are_case_insensitive("public") {
            self.advance("public".len());
            self.skip_whitespace();
            public_id = self.scan_quoted_identifier();
            self.skip_whitespace();
            system_id = self.scan_quoted_identifier();
        } else if self.next_few_characters_are_case_insensitive("system") {
            self.advance("system".len());
            self.skip_whitespace();
            system_id = self.scan_quoted_identifier();
        }

        // [§ 13.2.5.68 Bogus DOCTYPE state]: ignore anything up to '>'.
        let (rest, closed) = self.consume_until(">");
        if !closed {
            self.log_parse_error("eof in doctype");
        } else if !rest.trim_matches(is_whitespace_char).is_empty() {
            self.log_parse_error("unexpected character after doctype identifiers");
        }
        Token::Doctype {
            name,
            public_id,
            system_id,
        }
    }

    /// A single- or double-quoted doctype identifier. A `>` inside the quotes
    /// ends the identifier early ("abrupt-doctype-public-identifier") without
    /// being consumed.
    fn scan_quoted_identifier(&mut self) -> Option<String> {
        let quote = self.peek(0).filter(|c| matches!(c, '"' | '\''))?;
        self.advance(1);
        let mut id = self.consume_while(|c| c != quote && c != '>').to_string();
        if self.peek(0) == Some(quote) {
            self.advance(1);
        }
        replace_nul(&mut id);
        Some(id)
    }

    fn apply_newline_skip(&mut self) {
        if std::mem::take(&mut self.skip_newline) && self.peek(0) == Some('\n') {
            self.advance(1);
        }
    }
}

// =============================================================================
// Forced extraction
// =============================================================================

impl Lexer {
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Take everything up to the appropriate end tag `</tag_name` verbatim,
    /// then consume that end tag. Without a matching end tag the rest of the
    /// input is taken.
    pub fn raw_text_until(&mut self, tag_name: &str) -> String {
        self.apply_newline_skip();
        self.take_until_end_tag(tag_name)
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    ///
    /// Like [`Lexer::raw_text_until`], but character references are decoded
    /// and NUL becomes U+FFFD.
    pub fn escapable_raw_text_until(&mut self, tag_name: &str) -> String {
        self.apply_newline_skip();
        let raw = self.take_until_end_tag(tag_name);
        let mut text = decode(&raw, ReferenceContext::Text).into_owned();
        replace_nul(&mut text);
        text
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    ///
    /// Take the whole remaining input as text, optionally decoding
    /// references. The lexer is finished afterwards.
    pub fn rest_as_text(&mut self, decode_references: bool) -> String {
        self.apply_newline_skip();
        let rest = self.take_rest();
        if decode_references {
            let mut text = decode(&rest, ReferenceContext::Text).into_owned();
            replace_nul(&mut text);
            text
        } else {
            rest
        }
    }

    /// "An appropriate end tag token is an end tag token whose tag name
    /// matches the tag name of the last start tag to have been emitted from
    /// this tokenizer"
    ///
    /// Find `</tag_name` (ASCII case-insensitive) followed by whitespace,
    /// `/` or `>`, return the text before it, and consume the end tag
    /// including any attributes.
    fn take_until_end_tag(&mut self, tag_name: &str) -> String {
        let found = {
            let haystack = self.remaining();
            let bytes = haystack.as_bytes();
            let mut search_from = 0;
            let mut found = None;
            while let Some(offset) = haystack[search_from..].find("</") {
                let at = search_from + offset;
                let name_end = at + 2 + tag_name.len();
                let name_matches = bytes
                    .get(at + 2..name_end)
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag_name.as_bytes()));
                let terminated = bytes
                    .get(name_end)
                    .is_some_and(|&b| is_whitespace_char(char::from(b)) || b == b'/' || b == b'>');
                if name_matches && terminated {
                    found = Some((at, name_end));
                    break;
                }
                search_from = at + 2;
            }
            found
        };
        match found {
            Some((at, name_end)) => {
                let text = self.remaining()[..at].to_string();
                self.advance(name_end);
                if self.scan_attributes().is_none() {
                    self.log_parse_error("eof in tag");
                }
                text
            }
            None => self.take_rest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compaction_keeps_the_stream_intact() {
        let input = "<p>one</p><p>two</p><p>three</p>";
        let compacted = Lexer::new(input)
            .with_compaction_threshold(4)
            .with_warnings(false)
            .into_tokens();
        let plain = Lexer::new(input).with_warnings(false).into_tokens();
        assert_eq!(compacted, plain);
    }

    #[test]
    fn position_is_absolute_after_compaction() {
        let mut lexer = Lexer::new("<a></a><b></b>")
            .with_compaction_threshold(1)
            .with_warnings(false);
        let _ = lexer.next_token();
        let _ = lexer.next_token();
        let _ = lexer.next_token();
        assert_eq!(lexer.position(), 10);
    }
}
