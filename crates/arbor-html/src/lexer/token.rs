use core::fmt;

/// An attribute on a start or end tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
///
/// Names are already lowercased; values already have character references
/// decoded. Namespaces are assigned later, when the tree constructor knows
/// which namespace the element lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl TagAttribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Character tokens are delivered as runs: one `Text` token covers everything
/// between two pieces of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of decoded character data.
    Text {
        /// "data"
        data: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string)"
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_id: Option<String>,
        /// "a system identifier"
        system_id: Option<String>,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name"
        name: String,
        /// "a list of attributes", duplicates already removed
        attributes: Vec<TagAttribute>,
        /// "a self-closing flag"
        self_closing: bool,
    },

    /// End tag token. Attributes are parsed and discarded.
    EndTag {
        /// "a tag name"
        name: String,
    },

    /// Terminal token. Once produced, every later request yields it again.
    EndOfInput,
}

impl Token {
    /// Convenience constructor for a text token.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text { data: data.into() }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// Name of a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { data } => write!(f, "Text({data:?})"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Doctype {
                name,
                public_id,
                system_id,
            } => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if let Some(id) = public_id {
                    write!(f, " PUBLIC \"{id}\"")?;
                }
                if let Some(id) = system_id {
                    write!(f, " SYSTEM \"{id}\"")?;
                }
                Ok(())
            }
            Self::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::EndOfInput => write!(f, "EOF"),
        }
    }
}
