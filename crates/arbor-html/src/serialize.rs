//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Minimal serializer over the arena tree:
//!
//! - Void elements never get end tags
//! - Text is escaped, except inside raw text elements
//! - Attribute values are escaped and double-quoted
//! - Foreign elements are written out like HTML ones, with explicit end tags
//! - Nothing follows a `plaintext` element, not even the end tags of its ancestors

use std::fmt::Write;

use arbor_dom::{DomTree, ElementData, ElementKind, NodeData, NodeId};

/// Options for serialization. There is no process-wide default instance;
/// pass one to every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit the `<!DOCTYPE>` node (default: `true`).
    pub include_doctype: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            include_doctype: true,
        }
    }
}

/// Serialize `node`. A Document or `DocumentFragment` serializes as its
/// children; an element includes its own tags.
#[must_use]
pub fn serialize(tree: &DomTree, node: NodeId, options: &SerializeOptions) -> String {
    let mut out = String::new();
    let mut ser = Serializer::new(tree, &mut out, options);
    ser.write_node(node);
    out
}

/// Serialize the children of `node` only ("inner HTML").
#[must_use]
pub fn serialize_children(tree: &DomTree, node: NodeId, options: &SerializeOptions) -> String {
    let mut out = String::new();
    let mut ser = Serializer::new(tree, &mut out, options);
    ser.write_children(node);
    out
}

struct Serializer<'a, W: Write> {
    tree: &'a DomTree,
    out: &'a mut W,
    options: &'a SerializeOptions,
    /// Set once a `plaintext` element has been written. The parser reads
    /// everything after `<plaintext>` as its text, so nothing else may follow.
    after_plaintext: bool,
}

impl<'a, W: Write> Serializer<'a, W> {
    const fn new(tree: &'a DomTree, out: &'a mut W, options: &'a SerializeOptions) -> Self {
        Self {
            tree,
            out,
            options,
            after_plaintext: false,
        }
    }

    fn write_node(&mut self, id: NodeId) {
        if self.after_plaintext {
            return;
        }
        let Some(data) = self.tree.data(id) else {
            return;
        };
        match data {
            NodeData::Document | NodeData::DocumentFragment => self.write_children(id),
            NodeData::DocumentType(doctype) => {
                if self.options.include_doctype {
                    let _ = write!(self.out, "<!DOCTYPE {}>", doctype.name);
                }
            }
            NodeData::Element(element) => self.write_element(id, element),
            NodeData::Text(text) => {
                let parent_kind = self.tree.parent(id).and_then(|p| self.tree.kind(p));
                match parent_kind {
                    // "If the parent of current node is a style, script, xmp,
                    //  iframe, noembed, noframes, or plaintext element, or a
                    //  noscript element if scripting is enabled for the node,
                    //  then append the value of current node's data IDL
                    //  attribute literally."
                    Some(ElementKind::RawText) => {
                        let _ = self.out.write_str(text);
                    }
                    Some(ElementKind::EscapableRawText) => self.write_rcdata_escaped(text),
                    _ => self.write_text_escaped(text),
                }
            }
            NodeData::Comment(comment) => {
                let _ = write!(self.out, "<!--{comment}-->");
            }
        }
    }

    fn write_children(&mut self, id: NodeId) {
        for &child in self.tree.children(id) {
            self.write_node(child);
        }
    }

    fn write_element(&mut self, id: NodeId, element: &ElementData) {
        let name = element.local_name();
        let _ = write!(self.out, "<{name}");
        for attr in &element.attributes {
            let _ = write!(self.out, " {}=\"", attr.qualified_name());
            self.write_attr_escaped(&attr.value);
            let _ = self.out.write_char('"');
        }
        let _ = self.out.write_char('>');

        // "If current node is an element in the HTML namespace and its local
        //  name is void, then continue on to the next child node"
        if element.kind() == ElementKind::Void {
            return;
        }

        // The parser drops one newline after these start tags, so a leading
        // newline in the content has to be doubled to survive a round trip.
        if element.is_html("pre") || element.is_html("textarea") || element.is_html("listing") {
            let starts_with_newline = self
                .tree
                .first_child(id)
                .and_then(|child| self.tree.as_text(child))
                .is_some_and(|text| text.starts_with('\n'));
            if starts_with_newline {
                let _ = self.out.write_char('\n');
            }
        }

        self.write_children(id);
        if element.is_html("plaintext") {
            self.after_plaintext = true;
        }
        if !self.after_plaintext {
            let _ = write!(self.out, "</{name}>");
        }
    }

    /// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
    ///
    /// "Replace any occurrence of the "&" character by the string "&amp;".
    /// Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the
    /// string "&nbsp;". If the algorithm was not invoked in the attribute
    /// mode, replace any occurrences of the "<" character by the string
    /// "&lt;", and any occurrences of the ">" character by the string "&gt;"."
    fn write_text_escaped(&mut self, text: &str) {
        for c in text.chars() {
            let _ = match c {
                '&' => self.out.write_str("&amp;"),
                '\u{00A0}' => self.out.write_str("&nbsp;"),
                '<' => self.out.write_str("&lt;"),
                '>' => self.out.write_str("&gt;"),
                _ => self.out.write_char(c),
            };
        }
    }

    /// "If the algorithm was invoked in the attribute mode, replace any
    /// occurrences of the """ character by the string "&quot;"."
    fn write_attr_escaped(&mut self, value: &str) {
        for c in value.chars() {
            let _ = match c {
                '&' => self.out.write_str("&amp;"),
                '\u{00A0}' => self.out.write_str("&nbsp;"),
                '"' => self.out.write_str("&quot;"),
                _ => self.out.write_char(c),
            };
        }
    }

    /// Title and textarea content is decoded again when parsed, so `&` must
    /// survive as a reference. `<` is escaped too so an embedded end tag
    /// cannot close the element early.
    fn write_rcdata_escaped(&mut self, text: &str) {
        for c in text.chars() {
            let _ = match c {
                '&' => self.out.write_str("&amp;"),
                '\u{00A0}' => self.out.write_str("&nbsp;"),
                '<' => self.out.write_str("&lt;"),
                _ => self.out.write_char(c),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn round(input: &str) -> String {
        let tree = parse_document(input);
        serialize(&tree, NodeId::ROOT, &SerializeOptions::default())
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        assert_eq!(
            round("<!DOCTYPE html><p title='a\"b&amp;c'>1 &lt; 2 &amp;&nbsp;3</p>"),
            "<!DOCTYPE html><html><head></head><body>\
             <p title=\"a&quot;b&amp;c\">1 &lt; 2 &amp;&nbsp;3</p></body></html>"
        );
    }

    #[test]
    fn raw_text_is_verbatim_and_void_has_no_end_tag() {
        assert_eq!(
            round("<!DOCTYPE html><script>a < b && c</script><br>"),
            "<!DOCTYPE html><html><head><script>a < b && c</script></head>\
             <body><br></body></html>"
        );
    }

    #[test]
    fn plaintext_closes_nothing() {
        assert_eq!(
            round("<!DOCTYPE html><div><plaintext><b>x</b>"),
            "<!DOCTYPE html><html><head></head><body><div><plaintext><b>x</b>"
        );
    }

    #[test]
    fn doctype_can_be_left_out() {
        let tree = parse_document("<!DOCTYPE html><p>x");
        let options = SerializeOptions {
            include_doctype: false,
        };
        assert!(serialize(&tree, NodeId::ROOT, &options).starts_with("<html>"));
    }
}
