use std::fmt::Write as _;

use strum_macros::Display;

use arbor_common::warning::warn_once;
use arbor_dom::{
    Attributes, DocumentTypeData, DomTree, ElementKind, Namespace, NodeData, NodeId,
};

use super::foreign_content::{adjust_svg_tag_name, attributes_for, is_integration_point_token};
use super::stack::OpenElements;
use crate::lexer::{DEFAULT_COMPACTION_THRESHOLD, Lexer, TagAttribute, Token};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Foreign content is not a mode of its own: it applies whenever the adjusted
/// current node is an SVG or MathML element, whatever the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// "Parse errors are only errors with the syntax of HTML."
///
/// Every issue has a recovery; none of them stops the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What went wrong and how it was recovered.
    pub message: String,
    /// Index into the token stream where this issue was encountered.
    pub token_index: usize,
    /// `true` for parse errors, `false` for refused tree mutations and other
    /// recoveries the standard does not name.
    pub is_error: bool,
}

/// Options for one parse. There are no process-wide defaults; every parse
/// gets its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Send every recorded issue through `warn_once`.
    pub report_warnings: bool,
    /// Bytes the lexer keeps behind its cursor before compacting.
    pub compaction_threshold: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            report_warnings: true,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
        }
    }
}

/// Start tags that follow the "in head" rules even when seen later.
const HEAD_CONTENT_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
    "title",
];

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The tree constructor. It owns the lexer and pulls one token at a time,
/// so it can take over the lexer for raw text content.
pub struct HtmlParser {
    /// Token source.
    lexer: Lexer,

    /// Tree under construction. `NodeId::ROOT` is the Document (or, for a
    /// fragment, the `DocumentFragment` that receives the result).
    tree: DomTree,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    insertion_mode: InsertionMode,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: OpenElements,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head_element_pointer: Option<NodeId>,

    /// Synthetic `html` root of a fragment parse, discarded at the end.
    fragment_root: Option<NodeId>,

    /// Number of tokens processed so far.
    token_index: usize,

    /// Whether we've stopped parsing.
    stopped: bool,

    /// Parse issues (errors and warnings) encountered during parsing.
    issues: Vec<ParseIssue>,

    options: ParseOptions,
}

impl HtmlParser {
    /// Create a document parser with default options.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Create a document parser.
    #[must_use]
    pub fn with_options(input: &str, options: ParseOptions) -> Self {
        let lexer = Lexer::new(input)
            .with_compaction_threshold(options.compaction_threshold)
            .with_warnings(options.report_warnings);
        Self {
            lexer,
            tree: DomTree::new(),
            insertion_mode: InsertionMode::Initial,
            stack_of_open_elements: OpenElements::new(),
            head_element_pointer: None,
            fragment_root: None,
            token_index: 0,
            stopped: false,
            issues: Vec::new(),
            options,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Create a parser for `input` as the content of an HTML element named
    /// `context_local_name`. The result tree is rooted at a
    /// `DocumentFragment` holding the parsed nodes.
    #[must_use]
    pub fn new_fragment(input: &str, context_local_name: &str, options: ParseOptions) -> Self {
        let mut parser = Self::with_options(input, options);
        parser.tree = DomTree::new_fragment();

        // STEP 1: "Let root be a new html element with no attributes."
        let root = parser
            .tree
            .create_element("html", Namespace::Html, Attributes::new());

        // STEP 2: "Append the element root to the Document node created above."
        if parser.insert_node(NodeId::ROOT, root) {
            // STEP 3: "Set up the parser's stack of open elements so that it
            //          contains just the single element root."
            parser.stack_of_open_elements.push(root);
            parser.fragment_root = Some(root);
        }

        // STEP 4: The context element stands in for the current node while
        // only the root is open. A void element cannot hold the result, so
        // the fragment is parsed as body content instead.
        let mut context_name = context_local_name.to_ascii_lowercase();
        if ElementKind::classify(&context_name, &Namespace::Html) == ElementKind::Void {
            parser.parse_warning(&format!(
                "void context <{context_name}> parsed as <body> content"
            ));
            context_name = "body".to_string();
        }
        let context = parser
            .tree
            .create_element(&context_name, Namespace::Html, Attributes::new());
        parser.stack_of_open_elements.set_context(context);

        // STEP 5: "Reset the parser's insertion mode appropriately."
        parser.insertion_mode = InsertionMode::InBody;
        parser
    }

    /// Get all parse issues (errors and warnings) encountered so far.
    #[must_use]
    pub fn get_issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Run the parser to completion and return the tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser to completion and return the tree and the issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        match self.stack_of_open_elements.context() {
            Some(context) => self.parse_fragment_content(context),
            None => self.parse_tokens(),
        }
        (self.tree, self.issues)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// Pull tokens until the end-of-input token has been processed.
    fn parse_tokens(&mut self) {
        while !self.stopped {
            self.lexer.set_foreign(self.adjusted_current_node_is_foreign());
            let token = self.lexer.next_token();
            self.process_token(&token);
            self.token_index += 1;
            if token.is_end_of_input() {
                self.stopped = true;
            }
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    fn parse_fragment_content(&mut self, context: NodeId) {
        // "If the context element is a title or textarea element: Switch the
        //  tokenizer to the RCDATA state."
        // "If the context element is a style, xmp, iframe, noembed, or
        //  noframes element: Switch the tokenizer to the RAWTEXT state."
        match self.tree.kind(context) {
            Some(kind) if kind.is_text_only() => {
                let text = self
                    .lexer
                    .rest_as_text(kind == ElementKind::EscapableRawText);
                self.insert_text_into(context, &text);
            }
            _ => self.parse_tokens(),
        }

        // "Return root's children, in tree order."
        if let Some(root) = self.fragment_root {
            self.tree.detach(root);
        }
        self.stack_of_open_elements.clear();
        if let Err(err) = self.tree.move_children(context, NodeId::ROOT) {
            self.parse_warning(&format!("fragment result dropped: {err}"));
        }
    }

    // =========================================================================
    // Issue reporting
    // =========================================================================

    /// Record a parse error as defined by the standard.
    fn parse_error(&mut self, message: &str) {
        self.record_issue(message, true);
    }

    /// Record a recovery the standard does not call a parse error.
    fn parse_warning(&mut self, message: &str) {
        self.record_issue(message, false);
    }

    fn record_issue(&mut self, message: &str, is_error: bool) {
        if self.options.report_warnings {
            let _ = warn_once("HTML Parser", message);
        }
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
            is_error,
        });
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list, known as the tree
    /// construction dispatcher"
    fn process_token(&mut self, token: &Token) {
        if self.is_html_content(token) {
            self.process_using_insertion_mode(token);
        } else {
            self.handle_foreign_content(token);
        }
    }

    /// "Reprocess the token" - process the same token again in a new
    /// insertion mode.
    fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    fn process_using_insertion_mode(&mut self, token: &Token) {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
        }
    }

    /// "If the stack of open elements is empty; If the adjusted current node
    /// is an element in the HTML namespace; ... If the token is an
    /// end-of-file token: Process the token according to the rules given in
    /// the section corresponding to the current insertion mode in HTML
    /// content."
    fn is_html_content(&self, token: &Token) -> bool {
        if token.is_end_of_input() {
            return true;
        }
        let Some(element) = self
            .adjusted_current_node()
            .and_then(|id| self.tree.as_element(id))
        else {
            return true;
        };
        *element.namespace() == Namespace::Html || is_integration_point_token(element, token)
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    fn adjusted_current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.current()
    }

    fn adjusted_current_node_is_foreign(&self) -> bool {
        self.adjusted_current_node()
            .and_then(|id| self.tree.as_element(id))
            .is_some_and(|element| *element.namespace() != Namespace::Html)
    }

    /// [§ 13.2.6.1 Appropriate place for inserting a node](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// The adjusted current node; with nothing open, the fragment context or
    /// the root.
    fn insertion_parent(&self) -> NodeId {
        self.adjusted_current_node()
            .or_else(|| self.stack_of_open_elements.context())
            .unwrap_or(NodeId::ROOT)
    }

    /// "the first element in the stack of open elements (the html element)".
    /// For a fragment this is the context, whose children are the result.
    fn html_element(&self) -> NodeId {
        self.stack_of_open_elements
            .context()
            .or_else(|| self.stack_of_open_elements.item(0))
            .unwrap_or(NodeId::ROOT)
    }

    // =========================================================================
    // Creating and inserting nodes
    // =========================================================================

    /// Attach `node` as the last child of `parent`. A refusal from the tree
    /// is recorded and the node is dropped.
    fn insert_node(&mut self, parent: NodeId, node: NodeId) -> bool {
        match self.tree.append_child(parent, node) {
            Ok(()) => true,
            Err(err) => {
                self.parse_warning(&format!("dropped node: {err}"));
                false
            }
        }
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    fn insert_text(&mut self, data: &str) {
        let parent = self.insertion_parent();
        self.insert_text_into(parent, data);
    }

    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data. Otherwise, create
    /// a new Text node whose data is data"
    fn insert_text_into(&mut self, parent: NodeId, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Err(err) = self.tree.append_text(parent, data) {
            self.parse_warning(&format!("dropped text: {err}"));
        }
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str) {
        let parent = self.insertion_parent();
        self.insert_comment_into(parent, data);
    }

    fn insert_comment_into(&mut self, parent: NodeId, data: &str) {
        let comment = self.tree.create_comment(data);
        let _ = self.insert_node(parent, comment);
    }

    /// Insert a comment as the last child of the Document node.
    fn insert_comment_to_document(&mut self, data: &str) {
        self.insert_comment_into(NodeId::ROOT, data);
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// Create the element, append it to the insertion parent and, when `push`
    /// is set and the element can have children, push it onto the stack of
    /// open elements. Returns `None` if the tree refused the element.
    fn insert_element(
        &mut self,
        local_name: &str,
        attributes: &[TagAttribute],
        namespace: Namespace,
        push: bool,
    ) -> Option<NodeId> {
        // STEP 1: "Create an element for the token"
        let attributes = attributes_for(&namespace, attributes);
        let element = self.tree.create_element(local_name, namespace, attributes);

        // STEP 2: "Insert element at the adjusted insertion location"
        let parent = self.insertion_parent();
        if !self.insert_node(parent, element) {
            return None;
        }

        // STEP 3: "Push element onto the stack of open elements so that it is
        //          the new current node."
        if push && self.tree.kind(element) != Some(ElementKind::Void) {
            self.stack_of_open_elements.push(element);
        }
        Some(element)
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "insert a foreign element for the token, with the HTML namespace"
    fn insert_html_element(&mut self, token: &Token) -> Option<NodeId> {
        let Token::StartTag {
            name, attributes, ..
        } = token
        else {
            return None;
        };
        self.insert_element(name, attributes, Namespace::Html, true)
    }

    /// Insert an HTML element for a start tag the markup left out.
    fn insert_implied_element(&mut self, local_name: &str) -> Option<NodeId> {
        self.insert_element(local_name, &[], Namespace::Html, true)
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
    ///
    /// Insert the element, take its content from the lexer up to the matching
    /// end tag, and close it again. The element never stays open.
    fn insert_raw_text_element(&mut self, token: &Token) {
        let Token::StartTag { name, .. } = token else {
            return;
        };
        let element = self.insert_html_element(token);

        // [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
        // "If the next token is a U+000A LINE FEED (LF) character token, then
        //  ignore that token and move on to the next one."
        if name == "textarea" {
            self.lexer.skip_next_newline();
        }

        // "The generic raw text element parsing algorithm": RAWTEXT state.
        // "The generic RCDATA element parsing algorithm": RCDATA state.
        let text = if ElementKind::classify(name, &Namespace::Html) == ElementKind::EscapableRawText
        {
            self.lexer.escapable_raw_text_until(name)
        } else {
            self.lexer.raw_text_until(name)
        };

        if let Some(element) = element {
            self.insert_text_into(element, &text);
            if self.stack_of_open_elements.current() == Some(element) {
                let _ = self.stack_of_open_elements.pop();
            }
        }
    }

    /// [§ 13.2.6.4.7 "in body" - Any other start tag whose tag name is "html"/"body"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "for each attribute on the token, check to see if the attribute is
    /// already present on the [element]. If it is not, add the attribute and
    /// its corresponding value to that element."
    fn fill_missing_attributes(&mut self, target: NodeId, attributes: &[TagAttribute]) {
        let incoming = attributes_for(&Namespace::Html, attributes);
        if let Some(element) = self.tree.as_element_mut(target) {
            let _ = element.attributes.fill_missing(incoming.iter().cloned());
        }
    }

    /// Close the nearest open element named `name` using the bounded
    /// lookback of [`OpenElements::pop_matching`]. A miss is a parse error
    /// and changes nothing.
    fn close_element(&mut self, name: &str, ignore_case: bool) {
        let tree = &self.tree;
        let closed = self.stack_of_open_elements.pop_matching(|id| {
            tree.local_name(id).is_some_and(|local| {
                if ignore_case {
                    local.eq_ignore_ascii_case(name)
                } else {
                    local == name
                }
            })
        });
        if !closed {
            self.parse_error(&format!("unmatched end tag </{name}> ignored"));
        }
    }

    // =========================================================================
    // Insertion modes
    // =========================================================================

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Text { data } => {
                let (_, rest) = split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.handle_initial_anything_else(&Token::text(rest));
                }
            }

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                self.insert_comment_to_document(data);
            }

            // "A DOCTYPE token"
            // "If the DOCTYPE token's name is not "html", or the token's public
            //  identifier is not missing, or the token's system identifier is
            //  neither missing nor "about:legacy-compat", then there is a parse
            //  error."
            // "Append a DocumentType node to the Document node, with its name
            //  set to the name given in the DOCTYPE token, or the empty string
            //  if the name was missing"
            // "Then, switch the insertion mode to "before html"."
            Token::Doctype {
                name,
                public_id,
                system_id,
            } => {
                if name.as_deref() != Some("html")
                    || public_id.is_some()
                    || system_id
                        .as_deref()
                        .is_some_and(|id| id != "about:legacy-compat")
                {
                    self.parse_error("non-conforming doctype");
                }
                let doctype = self.tree.create_doctype(DocumentTypeData {
                    name: name.clone().unwrap_or_default(),
                    public_id: public_id.clone().unwrap_or_default(),
                    system_id: system_id.clone().unwrap_or_default(),
                });
                let _ = self.insert_node(NodeId::ROOT, doctype);
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            // "Anything else"
            _ => self.handle_initial_anything_else(token),
        }
    }

    /// "Anything else": "If the document is not an iframe srcdoc document,
    /// then this is a parse error ... In any case, switch the insertion mode
    /// to "before html", then reprocess the token."
    fn handle_initial_anything_else(&mut self, token: &Token) {
        self.parse_error("missing doctype");
        self.insertion_mode = InsertionMode::BeforeHtml;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment_to_document(data),

            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            //  or U+0020 SPACE"
            // "Ignore the token."
            Token::Text { data } => {
                let (_, rest) = split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.handle_before_html_anything_else(&Token::text(rest));
                }
            }

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            //  Document as the intended parent. Append it to the Document
            //  object. Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html = self.tree.create_element(
                    name,
                    Namespace::Html,
                    attributes_for(&Namespace::Html, attributes),
                );
                if self.insert_node(NodeId::ROOT, html) {
                    self.stack_of_open_elements.push(html);
                }
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_html_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => {
                self.parse_error(&format!("unexpected end tag </{name}> before html"));
            }

            // "Anything else"
            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// "Anything else":
    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of
    /// open elements. Switch the insertion mode to "before head", then
    /// reprocess the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        // STEP 1: "Create an html element whose node document is the Document object."
        let html = self
            .tree
            .create_element("html", Namespace::Html, Attributes::new());

        // STEP 2: "Append it to the Document object."
        // STEP 3: "Put this element in the stack of open elements."
        if self.insert_node(NodeId::ROOT, html) {
            self.stack_of_open_elements.push(html);
        }

        // STEP 4: "Switch the insertion mode to "before head"."
        self.insertion_mode = InsertionMode::BeforeHead;

        // STEP 5: "Reprocess the token."
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            //  or U+0020 SPACE"
            // "Ignore the token."
            Token::Text { data } => {
                let (_, rest) = split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.handle_before_head_anything_else(&Token::text(rest));
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag { name, .. } if name == "head" => {
                self.head_element_pointer = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => {
                self.parse_error(&format!("unexpected end tag </{name}> before head"));
            }

            // "Anything else"
            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// "Anything else":
    /// "Insert an HTML element for a "head" start tag token with no attributes.
    /// Set the head element pointer to the newly created head element.
    /// Switch the insertion mode to "in head". Reprocess the current token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        self.head_element_pointer = self.insert_implied_element("head");
        self.insertion_mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            //  or U+0020 SPACE"
            // "Insert the character."
            Token::Text { data } => {
                let (space, rest) = split_leading_whitespace(data);
                self.insert_text(space);
                if !rest.is_empty() {
                    self.handle_in_head_anything_else(&Token::text(rest));
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link""
            // "A start tag whose tag name is "meta""
            // "Insert an HTML element for the token. Immediately pop the current
            //  node off the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "base" | "basefont" | "bgsound" | "link" | "meta"
            ) =>
            {
                let _ = self.insert_element(name, attributes, Namespace::Html, false);
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            //
            // "A start tag whose tag name is one of: "noscript", "noframes", "style""
            // "A start tag whose tag name is "script""
            // "A start tag whose tag name is "template""
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "title" | "noscript" | "noframes" | "style" | "script" | "template"
                ) =>
            {
                self.insert_raw_text_element(token);
            }

            // "A start tag whose tag name is "head""
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head> in head");
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            //  stack of open elements."
            // "Switch the insertion mode to "after head"."
            Token::EndTag { name } if name == "head" => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::AfterHead;
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_in_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => {
                self.parse_error(&format!("unexpected end tag </{name}> in head"));
            }

            // "Anything else"
            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// "Anything else":
    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the
    /// token."
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        let _ = self.stack_of_open_elements.pop();
        self.insertion_mode = InsertionMode::AfterHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            //  or U+0020 SPACE"
            // "Insert the character."
            Token::Text { data } => {
                let (space, rest) = split_leading_whitespace(data);
                self.insert_text(space);
                if !rest.is_empty() {
                    self.handle_after_head_anything_else(&Token::text(rest));
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in body"."
            Token::StartTag { name, .. } if name == "body" => {
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InBody;
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title""
            Token::StartTag { name, .. } if HEAD_CONTENT_TAGS.contains(&name.as_str()) => {
                // STEP 1: "Parse error."
                self.parse_error(&format!("<{name}> after </head>"));

                // STEP 2: "Push the node pointed to by the head element pointer
                //          onto the stack of open elements."
                let head = self.head_element_pointer;
                if let Some(head) = head {
                    self.stack_of_open_elements.push(head);
                }

                // STEP 3: "Process the token using the rules for the "in head"
                //          insertion mode."
                self.handle_in_head_mode(token);

                // STEP 4: "Remove the node pointed to by the head element
                //          pointer from the stack of open elements."
                if let Some(head) = head {
                    let _ = self.stack_of_open_elements.remove(head);
                }
            }

            // "A start tag whose tag name is "head""
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head> after head");
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_after_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => {
                self.parse_error(&format!("unexpected end tag </{name}> after head"));
            }

            // "Anything else"
            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Anything else":
    /// "Insert an HTML element for a "body" start tag token with no attributes.
    /// Switch the insertion mode to "in body". Reprocess the current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_implied_element("body");
        self.insertion_mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// The main tree construction mode for document content. Elements are
    /// inserted where they appear; there is no scope search, no list of
    /// active formatting elements and no foster parenting. End tags close
    /// elements through the bounded lookback of the open element stack.
    fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "Any other character token"
            // "Insert the character."
            Token::Text { data } => self.insert_text(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype in body"),

            // "A start tag whose tag name is "html""
            // "Parse error."
            // "Otherwise, for each attribute on the token, check to see if the
            //  attribute is already present on the top element of the stack of
            //  open elements. If it is not, add the attribute and its
            //  corresponding value to that element."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                self.parse_error("unexpected <html> in body");
                if let Some(html) = self.stack_of_open_elements.item(0) {
                    self.fill_missing_attributes(html, attributes);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::StartTag { name, .. } if HEAD_CONTENT_TAGS.contains(&name.as_str()) => {
                self.handle_in_head_mode(token);
            }

            // "A start tag whose tag name is "body""
            // "Parse error."
            // "Otherwise, set the frameset-ok flag to "not ok"; then, for each
            //  attribute on the token, check to see if the attribute is already
            //  present on the body element (the second element) on the stack of
            //  open elements, and if it is not, add the attribute and its
            //  corresponding value to that element."
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                self.parse_error("unexpected <body> in body");
                if let Some(body) = self
                    .stack_of_open_elements
                    .item(1)
                    .filter(|&id| self.tree.is_html_element(id, "body"))
                {
                    self.fill_missing_attributes(body, attributes);
                }
            }

            // "A start tag whose tag name is "head""
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head> in body");
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            // "Insert an HTML element for the token."
            // "If the next token is a U+000A LINE FEED (LF) character token, then
            //  ignore that token and move on to the next one. (Newlines at the
            //  start of pre blocks are ignored as an authoring convenience.)"
            Token::StartTag { name, .. } if matches!(name.as_str(), "pre" | "listing") => {
                if self.insert_html_element(token).is_some() {
                    self.lexer.skip_next_newline();
                }
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            //  it. (Don't ask.)"
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } if name == "image" => {
                self.parse_error("<image> treated as <img>");
                self.reprocess_token(&Token::StartTag {
                    name: "img".to_string(),
                    attributes: attributes.clone(),
                    self_closing: *self_closing,
                });
            }

            // "A start tag whose tag name is "math""
            // "A start tag whose tag name is "svg""
            // "Adjust MathML/SVG attributes for the token. Adjust foreign
            //  attributes for the token. Insert a foreign element for the token,
            //  in the MathML/SVG namespace."
            // "If the token has its self-closing flag set, pop the current node
            //  off the stack of open elements and acknowledge the token's
            //  self-closing flag."
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } if matches!(name.as_str(), "math" | "svg") => {
                let namespace = if name == "svg" {
                    Namespace::Svg
                } else {
                    Namespace::MathMl
                };
                let _ = self.insert_element(name, attributes, namespace, !*self_closing);
            }

            // "A start tag whose tag name is "plaintext""
            // "Insert an HTML element for the token. Switch the tokenizer to the
            //  PLAINTEXT state."
            Token::StartTag { name, .. } if name == "plaintext" => {
                let element = self.insert_html_element(token);
                let text = self.lexer.rest_as_text(false);
                if let Some(element) = element {
                    self.insert_text_into(element, &text);
                }
            }

            // "A start tag whose tag name is "textarea""
            // "A start tag whose tag name is "xmp""
            // "A start tag whose tag name is "iframe""
            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag is enabled"
            Token::StartTag { name, .. }
                if ElementKind::classify(name, &Namespace::Html).is_text_only() =>
            {
                self.insert_raw_text_element(token);
            }

            // "Any other start tag"
            // "Insert an HTML element for the token."
            // Void elements are inserted without being pushed.
            Token::StartTag { .. } => {
                let _ = self.insert_html_element(token);
            }

            // "An end tag whose tag name is "body""
            // "Switch the insertion mode to "after body"."
            Token::EndTag { name } if name == "body" => {
                self.insertion_mode = InsertionMode::AfterBody;
            }

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after body". Reprocess the token."
            Token::EndTag { name } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterBody;
                self.reprocess_token(token);
            }

            // "Any other end tag"
            Token::EndTag { name } => self.close_element(name, false),

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfInput => self.stopped = true,
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            //  or U+0020 SPACE"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Text { data } => {
                let (space, rest) = split_leading_whitespace(data);
                if !space.is_empty() {
                    self.handle_in_body_mode(&Token::text(space));
                }
                if !rest.is_empty() {
                    self.handle_after_body_anything_else(&Token::text(rest));
                }
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            //  stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self.html_element();
                self.insert_comment_into(html, data);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype after body"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html""
            // "If the parser was created as part of the HTML fragment parsing
            //  algorithm, this is a parse error; ignore the token. (fragment case)"
            // "Otherwise, switch the insertion mode to "after after body"."
            Token::EndTag { name } if name == "html" => {
                if self.fragment_root.is_some() {
                    self.parse_error("</html> in fragment ignored");
                } else {
                    self.insertion_mode = InsertionMode::AfterAfterBody;
                }
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfInput => self.stopped = true,

            // "Anything else"
            _ => self.handle_after_body_anything_else(token),
        }
    }

    /// "Anything else":
    /// "Parse error. Switch the insertion mode to "in body" and reprocess the
    /// token."
    fn handle_after_body_anything_else(&mut self, token: &Token) {
        self.parse_error("content after </body>");
        self.insertion_mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment_to_document(data),

            // "A DOCTYPE token"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            //  or U+0020 SPACE"
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Text { data } => {
                let (space, rest) = split_leading_whitespace(data);
                if !space.is_empty() {
                    self.handle_in_body_mode(&Token::text(space));
                }
                if !rest.is_empty() {
                    self.handle_after_after_body_anything_else(&Token::text(rest));
                }
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfInput => self.stopped = true,

            // "Anything else"
            _ => self.handle_after_after_body_anything_else(token),
        }
    }

    /// "Anything else":
    /// "Parse error. Switch the insertion mode to "in body" and reprocess the
    /// token."
    fn handle_after_after_body_anything_else(&mut self, token: &Token) {
        self.parse_error("content after </html>");
        self.insertion_mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    ///
    /// Start tags take the namespace of the adjusted current node. There is
    /// no breakout back to HTML; only integration points lead out.
    fn handle_foreign_content(&mut self, token: &Token) {
        match token {
            // "Any other character token"
            // "Insert the token's character."
            Token::Text { data } => self.insert_text(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected doctype in foreign content"),

            // "Any other start tag"
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let namespace = self
                    .adjusted_current_node()
                    .and_then(|id| self.tree.as_element(id))
                    .map_or(Namespace::Html, |element| element.namespace().clone());

                // "If the adjusted current node is an element in the SVG
                //  namespace, and the token's tag name is one of the ones in the
                //  first column of the following table, change the tag name"
                let local_name = if namespace == Namespace::Svg {
                    adjust_svg_tag_name(name)
                } else {
                    name.as_str()
                };

                // "Insert a foreign element for the token, with adjusted current
                //  node's namespace"
                // "If the token has its self-closing flag set ... pop the current
                //  node off the stack of open elements and acknowledge the
                //  token's self-closing flag."
                let Some(element) =
                    self.insert_element(local_name, attributes, namespace, !*self_closing)
                else {
                    return;
                };

                // A foreign script's content is never tokenized.
                if local_name == "script" && !*self_closing {
                    let text = self.lexer.raw_text_until("script");
                    self.insert_text_into(element, &text);
                    let _ = self.stack_of_open_elements.pop();
                }
            }

            // "Any other end tag"
            // Names compare ASCII case-insensitively so `</foreignobject>`
            // closes `foreignObject`. `</html>` within three entries of the
            // top empties the stack; later content then targets the Document,
            // which refuses text and a second root element.
            Token::EndTag { name } => self.close_element(name, true),

            Token::EndOfInput => self.stopped = true,
        }
    }
}

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Split a text run into its leading whitespace and the rest. Modes that
/// treat whitespace characters differently handle the two halves apart.
fn split_leading_whitespace(data: &str) -> (&str, &str) {
    let at = data
        .find(|c: char| !is_whitespace(c))
        .unwrap_or(data.len());
    data.split_at(at)
}

/// Render a subtree for debugging, one node per line.
#[must_use]
pub fn dump_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    dump_node(tree, id, 0, &mut out);
    out
}

fn dump_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(data) = tree.data(id) else {
        return;
    };
    let prefix = "  ".repeat(depth);
    let _ = match data {
        NodeData::Document => writeln!(out, "{prefix}Document"),
        NodeData::DocumentFragment => writeln!(out, "{prefix}DocumentFragment"),
        NodeData::DocumentType(doctype) => writeln!(out, "{prefix}<!DOCTYPE {}>", doctype.name),
        NodeData::Element(element) => {
            let namespace = match element.namespace() {
                Namespace::Svg => "svg ",
                Namespace::MathMl => "math ",
                _ => "",
            };
            let mut line = format!("{prefix}<{namespace}{}", element.local_name());
            for attr in &element.attributes {
                let _ = write!(line, " {}=\"{}\"", attr.qualified_name(), attr.value);
            }
            writeln!(out, "{line}>")
        }
        NodeData::Text(text) => {
            let display = text.replace('\n', "\\n");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeData::Comment(comment) => writeln!(out, "{prefix}<!-- {comment} -->"),
    };
    for &child in tree.children(id) {
        dump_node(tree, child, depth + 1, out);
    }
}

/// Print a DOM tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let mut out = String::new();
    dump_node(tree, id, indent, &mut out);
    print!("{out}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_prefix_split() {
        assert_eq!(split_leading_whitespace("  \nab c"), ("  \n", "ab c"));
        assert_eq!(split_leading_whitespace("   "), ("   ", ""));
        assert_eq!(split_leading_whitespace("x "), ("", "x "));
    }

    #[test]
    fn dump_shows_namespaces_and_attributes() {
        let tree = HtmlParser::new("<p class=a>x</p><svg></svg>").run();
        let dump = dump_tree(&tree, NodeId::ROOT);
        assert!(dump.contains("<p class=\"a\">"));
        assert!(dump.contains("<svg svg>"));
        assert!(dump.contains("\"x\""));
    }
}
