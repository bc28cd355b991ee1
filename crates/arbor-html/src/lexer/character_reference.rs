//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The lexer collects a whole text run or attribute value first and decodes
//! it here in one pass, instead of switching states per character.

use std::borrow::Cow;

use super::named_character_references::{LONGEST_NAME, lookup_entity};

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: [(u32, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Where a reference appears. Attribute values keep the historical rule
/// that a legacy name followed by `=` or an alphanumeric is not a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceContext {
    /// Character data outside tags.
    Text,
    /// A quoted or unquoted attribute value.
    Attribute,
}

/// Decode every character reference in `input`.
///
/// Text that is not a valid reference is kept as written.
#[must_use]
pub fn decode(input: &str, context: ReferenceContext) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        if let Some(numeric) = after.strip_prefix('#') {
            if let Some((c, used)) = consume_numeric(numeric) {
                out.push(c);
                rest = &numeric[used..];
                continue;
            }
        } else if let Some((replacement, used)) = consume_named(after, context) {
            out.push_str(replacement);
            rest = &after[used..];
            continue;
        }
        // "Flush code points consumed as a character reference."
        out.push('&');
        rest = after;
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
///
/// `input` starts right after `&#`. Returns the character and the number of
/// bytes consumed, or `None` for "absence-of-digits-in-numeric-character-reference".
fn consume_numeric(input: &str) -> Option<(char, usize)> {
    let (prefix, radix) = match input.as_bytes().first() {
        Some(b'x' | b'X') => (1, 16),
        _ => (0, 10),
    };
    let digits: &str = {
        let body = &input[prefix..];
        let len = body
            .bytes()
            .take_while(|b| char::from(*b).is_digit(radix))
            .count();
        &body[..len]
    };
    if digits.is_empty() {
        return None;
    }
    let code = digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0_u32, |acc, d| {
            acc.saturating_mul(radix).saturating_add(d).min(0x11_0000)
        });
    let mut used = prefix + digits.len();
    // "If the current input character is not ';', this is a
    //  missing-semicolon-after-character-reference parse error."
    if input[used..].starts_with(';') {
        used += 1;
    }
    Some((numeric_replacement(code), used))
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
fn numeric_replacement(code: u32) -> char {
    match code {
        // "If the number is 0x00, then this is a null-character-reference parse error.
        //  Set the character reference code to 0xFFFD."
        // "If the number is greater than 0x10FFFF ... Set the character reference code to 0xFFFD."
        0 | 0x11_0000.. => char::REPLACEMENT_CHARACTER,
        0x80..=0x9F => C1_REPLACEMENTS
            .iter()
            .find(|&&(from, _)| from == code)
            .map_or_else(
                || char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
                |&(_, to)| to,
            ),
        // Surrogates fail the conversion: "Set the character reference code to 0xFFFD."
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// "Consume the maximum number of characters possible, where the consumed
/// characters are one of the identifiers in the first column of the named
/// character references table."
fn consume_named(input: &str, context: ReferenceContext) -> Option<(&'static str, usize)> {
    let alnum = input
        .bytes()
        .take(LONGEST_NAME)
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    if alnum == 0 {
        return None;
    }
    if input[alnum..].starts_with(';')
        && let Some(replacement) = lookup_entity(&input[..=alnum])
    {
        return Some((replacement, alnum + 1));
    }
    for len in (1..=alnum).rev() {
        let Some(replacement) = lookup_entity(&input[..len]) else {
            continue;
        };
        // "If the character reference was consumed as part of an attribute,
        //  and the last character matched is not a U+003B SEMICOLON character
        //  (;), and the next input character is either a U+003D EQUALS SIGN
        //  character (=) or an ASCII alphanumeric, then, for historical
        //  reasons, flush code points consumed as a character reference."
        let next = input.as_bytes().get(len).copied();
        if context == ReferenceContext::Attribute
            && next.is_some_and(|b| b == b'=' || b.is_ascii_alphanumeric())
        {
            return None;
        }
        return Some((replacement, len));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> String {
        decode(input, ReferenceContext::Text).into_owned()
    }

    fn attr(input: &str) -> String {
        decode(input, ReferenceContext::Attribute).into_owned()
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(
            decode("no refs", ReferenceContext::Text),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn named_with_and_without_semicolon() {
        assert_eq!(text("a &amp; b"), "a & b");
        assert_eq!(text("&lt;p&gt;"), "<p>");
        assert_eq!(text("&copy 2024"), "\u{00A9} 2024");
        assert_eq!(text("&hellip"), "&hellip");
    }

    #[test]
    fn longest_legacy_prefix_wins() {
        assert_eq!(text("&notit;"), "\u{00AC}it;");
        assert_eq!(text("&notin;"), "\u{2209}");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(text("&#65;&#x42;&#X43"), "ABC");
        assert_eq!(text("&#0;"), "\u{FFFD}");
        assert_eq!(text("&#xD800;"), "\u{FFFD}");
        assert_eq!(text("&#x110000;"), "\u{FFFD}");
        assert_eq!(text("&#99999999999999;"), "\u{FFFD}");
    }

    #[test]
    fn c1_controls_are_remapped() {
        assert_eq!(text("&#x80;"), "\u{20AC}");
        assert_eq!(text("&#150;"), "\u{2013}");
        assert_eq!(text("&#x81;"), "\u{81}");
    }

    #[test]
    fn absent_digits_are_kept() {
        assert_eq!(text("&#;"), "&#;");
        assert_eq!(text("&#x;"), "&#x;");
        assert_eq!(text("& x"), "& x");
    }

    #[test]
    fn attribute_legacy_rule() {
        assert_eq!(attr("?a=1&copy=2"), "?a=1&copy=2");
        assert_eq!(attr("&copyx"), "&copyx");
        assert_eq!(attr("&copy;x"), "\u{00A9}x");
        assert_eq!(attr("&copy x"), "\u{00A9} x");
        assert_eq!(text("&copyx"), "\u{00A9}x");
    }
}
