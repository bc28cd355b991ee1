//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use arbor_dom::{Attribute, Attributes, ElementData, Namespace};

use crate::lexer::{TagAttribute, Token};

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "if any of the attributes on the token match the strings given in the
/// first column of the following table, let the attribute be a namespaced
/// attribute, with the prefix being the string given in the corresponding
/// cell in the second column, the local name being the string given in the
/// corresponding cell in the third column, and the namespace being the
/// namespace given in the corresponding cell in the fourth column."
///
/// Format: (`attribute_name`, prefix, `local_name`, namespace)
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::XmlNs),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::XmlNs),
];

/// Turn one token attribute into a tree attribute, giving it a namespace if
/// it is one of the foreign attributes.
fn adjust_foreign_attribute(attribute: TagAttribute) -> Attribute {
    match FOREIGN_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|(from, ..)| *from == attribute.name)
    {
        Some((_, prefix, local_name, namespace)) => Attribute::namespaced(
            *prefix,
            *local_name,
            namespace.clone(),
            attribute.value,
        ),
        None => Attribute::new(attribute.name, attribute.value),
    }
}

/// [§ 13.2.6.1 Create an element for the token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
///
/// Build the attribute list of an element in `namespace`. HTML attributes
/// are taken as they are; SVG and MathML attributes get their case and
/// namespace adjustments first.
#[must_use]
pub fn attributes_for(namespace: &Namespace, attributes: &[TagAttribute]) -> Attributes {
    let mut attributes = attributes.to_vec();
    match namespace {
        Namespace::Svg => adjust_svg_attributes(&mut attributes),
        Namespace::MathMl => adjust_mathml_attributes(&mut attributes),
        _ => return attributes.into_iter().map(|a| Attribute::new(a.name, a.value)).collect(),
    }
    attributes.into_iter().map(adjust_foreign_attribute).collect()
}

/// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
///
/// Decide whether `token` is processed by the insertion mode rules while the
/// adjusted current node is the foreign element `element`. Returns `false`
/// when the token belongs to the foreign content rules.
#[must_use]
pub fn is_integration_point_token(element: &ElementData, token: &Token) -> bool {
    let start_tag = match token {
        Token::StartTag { name, .. } => Some(name.as_str()),
        _ => None,
    };
    let is_text = matches!(token, Token::Text { .. });
    match element.namespace() {
        // "If the adjusted current node is a MathML text integration point and
        //  the token is a start tag whose tag name is neither 'mglyph' nor
        //  'malignmark'"
        // "If the adjusted current node is a MathML text integration point and
        //  the token is a character token"
        Namespace::MathMl if mathml::TEXT_INTEGRATION_POINTS.contains(&element.local_name()) => {
            is_text || start_tag.is_some_and(|name| !matches!(name, "mglyph" | "malignmark"))
        }
        // "If the adjusted current node is a MathML annotation-xml element and
        //  the token is a start tag whose tag name is 'svg'"
        Namespace::MathMl if element.local_name() == "annotation-xml" => {
            element
                .attributes
                .get("encoding")
                .is_some_and(mathml::is_html_encoding)
                && start_tag == Some("svg")
        }
        // "If the adjusted current node is an HTML integration point and the
        //  token is a start tag"
        // "If the adjusted current node is an HTML integration point and the
        //  token is a character token"
        Namespace::Svg if svg::HTML_INTEGRATION_POINTS.contains(&element.local_name()) => {
            is_text || start_tag.is_some()
        }
        _ => false,
    }
}
