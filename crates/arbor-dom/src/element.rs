//! Element data: names, namespaces, content kinds, and the attribute list.
//!
//! [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)

use core::fmt;

use strum_macros::Display;

/// [§ 1.2 Namespaces](https://infra.spec.whatwg.org/#namespaces)
///
/// The namespace an element (or a namespaced attribute) lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    /// "The HTML namespace is `http://www.w3.org/1999/xhtml`."
    #[default]
    Html,
    /// "The SVG namespace is `http://www.w3.org/2000/svg`."
    Svg,
    /// "The MathML namespace is `http://www.w3.org/1998/Math/MathML`."
    MathMl,
    /// "The XLink namespace is `http://www.w3.org/1999/xlink`."
    XLink,
    /// "The XML namespace is `http://www.w3.org/XML/1998/namespace`."
    Xml,
    /// "The XMLNS namespace is `http://www.w3.org/2000/xmlns/`."
    XmlNs,
    /// Any other namespace, identified by its URL.
    Other(String),
}

impl Namespace {
    /// The namespace URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Html => "http://www.w3.org/1999/xhtml",
            Self::Svg => "http://www.w3.org/2000/svg",
            Self::MathMl => "http://www.w3.org/1998/Math/MathML",
            Self::XLink => "http://www.w3.org/1999/xlink",
            Self::Xml => "http://www.w3.org/XML/1998/namespace",
            Self::XmlNs => "http://www.w3.org/2000/xmlns/",
            Self::Other(url) => url,
        }
    }

    /// Map a namespace URL back to a known namespace.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        [
            Self::Html,
            Self::Svg,
            Self::MathMl,
            Self::XLink,
            Self::Xml,
            Self::XmlNs,
        ]
        .into_iter()
        .find(|ns| ns.url() == url)
        .unwrap_or_else(|| Self::Other(url.to_string()))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("html"),
            Self::Svg => f.write_str("svg"),
            Self::MathMl => f.write_str("math"),
            Self::XLink => f.write_str("xlink"),
            Self::Xml => f.write_str("xml"),
            Self::XmlNs => f.write_str("xmlns"),
            Self::Other(url) => write!(f, "{{{url}}}"),
        }
    }
}

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#elements-2)
///
/// "There are six different kinds of elements: void elements, the template
/// element, raw text elements, escapable raw text elements, foreign elements,
/// and normal elements."
///
/// Only the distinctions the tree enforces are kept here. Foreign elements
/// are always `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ElementKind {
    /// Ordinary element; any child except a doctype.
    Normal,
    /// "Void elements can't have any contents."
    Void,
    /// "Raw text elements can have text, though it has restrictions."
    RawText,
    /// "Escapable raw text elements can have text and character references."
    EscapableRawText,
}

impl ElementKind {
    /// Classify an element by local name and namespace.
    #[must_use]
    pub fn classify(local_name: &str, namespace: &Namespace) -> Self {
        if *namespace != Namespace::Html {
            return Self::Normal;
        }
        match local_name {
            "area" | "base" | "basefont" | "bgsound" | "br" | "col" | "embed" | "frame" | "hr"
            | "img" | "input" | "keygen" | "link" | "meta" | "param" | "source" | "track"
            | "wbr" => Self::Void,
            "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript"
            | "template" | "plaintext" => Self::RawText,
            "title" | "textarea" => Self::EscapableRawText,
            _ => Self::Normal,
        }
    }

    /// Whether elements of this kind accept only text children.
    #[must_use]
    pub const fn is_text_only(self) -> bool {
        matches!(self, Self::RawText | Self::EscapableRawText)
    }
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
///
/// "Attr nodes have a namespace (null or a non-empty string), namespace
/// prefix (null or a non-empty string), local name (a non-empty string),
/// value (a string)."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "namespace prefix"
    pub prefix: Option<String>,
    /// "local name"
    pub local_name: String,
    /// "namespace"
    pub namespace: Option<Namespace>,
    /// "value"
    pub value: String,
}

impl Attribute {
    /// A plain attribute with no namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    /// A namespaced attribute such as `xlink:href`.
    #[must_use]
    pub fn namespaced(
        prefix: Option<&str>,
        local_name: impl Into<String>,
        namespace: Namespace,
        value: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local_name: local_name.into(),
            namespace: Some(namespace),
            value: value.into(),
        }
    }

    /// [§ 4.9.2](https://dom.spec.whatwg.org/#concept-attribute-qualified-name)
    ///
    /// "An attribute's qualified name is its local name if its namespace
    /// prefix is null, and its namespace prefix, followed by ":", followed by
    /// its local name, otherwise."
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    fn has_qualified_name(&self, name: &str) -> bool {
        match &self.prefix {
            Some(prefix) => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local_name),
            None => self.local_name == name,
        }
    }
}

/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#concept-element-attribute)
///
/// "Elements also have an attribute list, which is a list exposed through a
/// `NamedNodeMap`."
///
/// Insertion order is preserved. Lookup by qualified name is linear, which
/// beats hashing for the handful of attributes real elements carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// An empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }

    /// "get an attribute by name": look up by qualified name.
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<&str> {
        self.find(qualified_name)
            .map(|i| self.entries[i].value.as_str())
    }

    /// "get an attribute by namespace and local name"
    #[must_use]
    pub fn get_ns(&self, namespace: Option<&Namespace>, local_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|attr| attr.namespace.as_ref() == namespace && attr.local_name == local_name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether an attribute with this qualified name exists.
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.find(qualified_name).is_some()
    }

    /// Add an attribute unless one with the same qualified name is already
    /// present. Returns `true` if it was added.
    ///
    /// This is the first-occurrence-wins rule used for markup.
    pub fn insert_if_missing(&mut self, attribute: Attribute) -> bool {
        if self.find(&attribute.qualified_name()).is_some() {
            return false;
        }
        self.entries.push(attribute);
        true
    }

    /// Set a plain attribute, overwriting any existing value.
    /// Returns the previous value.
    pub fn set(&mut self, qualified_name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.find(qualified_name) {
            Some(i) => Some(core::mem::replace(&mut self.entries[i].value, value)),
            None => {
                self.entries.push(Attribute::new(qualified_name, value));
                None
            }
        }
    }

    /// Remove an attribute by qualified name, returning its value.
    pub fn remove(&mut self, qualified_name: &str) -> Option<String> {
        self.find(qualified_name)
            .map(|i| self.entries.remove(i).value)
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "For each attribute on the token, check to see if the attribute is
    /// already present on the top element of the stack of open elements. If
    /// it is not, add the attribute and its corresponding value to that
    /// element."
    ///
    /// Returns how many attributes were added.
    pub fn fill_missing(&mut self, incoming: impl IntoIterator<Item = Attribute>) -> usize {
        let mut added = 0;
        for attribute in incoming {
            if self.insert_if_missing(attribute) {
                added += 1;
            }
        }
        added
    }

    fn find(&self, qualified_name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|attr| attr.has_qualified_name(qualified_name))
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = core::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    /// Builds the list with first-occurrence-wins semantics.
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut attributes = Self::new();
        let _ = attributes.fill_missing(iter);
        attributes
    }
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
///
/// The local name and namespace are fixed at creation, so the derived
/// [`ElementKind`] can never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    local_name: String,
    namespace: Namespace,
    kind: ElementKind,
    /// "An element has an associated attribute list"
    pub attributes: Attributes,
}

impl ElementData {
    /// Create element data, deriving the kind from name and namespace.
    #[must_use]
    pub fn new(local_name: impl Into<String>, namespace: Namespace, attributes: Attributes) -> Self {
        let local_name = local_name.into();
        let kind = ElementKind::classify(&local_name, &namespace);
        Self {
            local_name,
            namespace,
            kind,
            attributes,
        }
    }

    /// An HTML-namespace element without attributes.
    #[must_use]
    pub fn html(local_name: impl Into<String>) -> Self {
        Self::new(local_name, Namespace::Html, Attributes::new())
    }

    /// "An element's local name"
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// "An element's namespace"
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Content restrictions derived from name and namespace.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Whether this is the HTML element with the given local name.
    #[must_use]
    pub fn is_html(&self, local_name: &str) -> bool {
        matches!(self.namespace, Namespace::Html) && self.local_name == local_name
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id")
    }
}

/// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
///
/// "Doctypes have an associated name, public ID, and system ID."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeData {
    /// "name"
    pub name: String,
    /// "public ID"
    pub public_id: String,
    /// "system ID"
    pub system_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_comes_from_html_names_only() {
        assert_eq!(ElementKind::classify("br", &Namespace::Html), ElementKind::Void);
        assert_eq!(ElementKind::classify("script", &Namespace::Html), ElementKind::RawText);
        assert_eq!(
            ElementKind::classify("title", &Namespace::Html),
            ElementKind::EscapableRawText
        );
        assert_eq!(ElementKind::classify("title", &Namespace::Svg), ElementKind::Normal);
        assert_eq!(ElementKind::classify("div", &Namespace::Html), ElementKind::Normal);
    }

    #[test]
    fn first_attribute_wins_when_collecting() {
        let attrs: Attributes = [Attribute::new("a", "1"), Attribute::new("a", "2")]
            .into_iter()
            .collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("a"), Some("1"));
    }

    #[test]
    fn fill_missing_never_overwrites() {
        let mut attrs: Attributes = [Attribute::new("lang", "en")].into_iter().collect();
        let added = attrs.fill_missing([Attribute::new("lang", "fr"), Attribute::new("dir", "ltr")]);
        assert_eq!(added, 1);
        assert_eq!(attrs.get("lang"), Some("en"));
        assert_eq!(attrs.get("dir"), Some("ltr"));
    }

    #[test]
    fn namespaced_lookup_uses_prefix_and_namespace() {
        let mut attrs = Attributes::new();
        let _ = attrs.insert_if_missing(Attribute::namespaced(
            Some("xlink"),
            "href",
            Namespace::XLink,
            "#a",
        ));
        assert_eq!(attrs.get("xlink:href"), Some("#a"));
        assert_eq!(attrs.get("href"), None);
        assert_eq!(attrs.get_ns(Some(&Namespace::XLink), "href"), Some("#a"));
        assert_eq!(attrs.get_ns(None, "href"), None);
    }

    #[test]
    fn set_overwrites_and_returns_previous() {
        let mut attrs = Attributes::new();
        assert_eq!(attrs.set("class", "a"), None);
        assert_eq!(attrs.set("class", "b"), Some("a".to_string()));
        assert_eq!(attrs.remove("class"), Some("b".to_string()));
        assert!(attrs.is_empty());
    }

    #[test]
    fn namespace_urls_round_trip() {
        assert_eq!(Namespace::from_url(Namespace::Svg.url()), Namespace::Svg);
        assert_eq!(
            Namespace::from_url("urn:x"),
            Namespace::Other("urn:x".to_string())
        );
    }
}
