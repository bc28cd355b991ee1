//! Integration tests for the markup lexer.

use arbor_html::{Lexer, TagAttribute, Token};
use proptest::prelude::*;

/// Helper to lex a string and return the tokens, including `EndOfInput`
fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).with_warnings(false).into_tokens()
}

#[test]
fn test_plain_text_is_one_run() {
    let tokens = tokenize("Hello world");
    assert_eq!(tokens, vec![Token::text("Hello world"), Token::EndOfInput]);
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_id,
            system_id,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(public_id.is_none());
            assert!(system_id.is_none());
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!doctype HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("html".to_string()),
            public_id: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
            system_id: Some("http://www.w3.org/TR/html4/strict.dtd".to_string()),
        }
    );
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<DIV>");
    assert_eq!(
        tokens[0],
        Token::StartTag {
            name: "div".to_string(),
            attributes: vec![],
            self_closing: false,
        }
    );
}

#[test]
fn test_end_tag_attributes_are_dropped() {
    let tokens = tokenize("</div class=x>");
    assert_eq!(
        tokens[0],
        Token::EndTag {
            name: "div".to_string()
        }
    );
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, self_closing: true, .. } if name == "br"
    ));
}

#[test]
fn test_attribute_forms() {
    let tokens = tokenize(r#"<input type="text" value='a b' checked data-x=1>"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(
        attributes,
        &vec![
            TagAttribute::new("type", "text"),
            TagAttribute::new("value", "a b"),
            TagAttribute::new("checked", ""),
            TagAttribute::new("data-x", "1"),
        ]
    );
}

#[test]
fn test_duplicate_attribute_first_wins() {
    let tokens = tokenize(r#"<div a="1" a="2" A="3">"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(attributes, &vec![TagAttribute::new("a", "1")]);
}

#[test]
fn test_attribute_character_references() {
    let tokens = tokenize(r#"<a href="?x=1&amp;y=2&copy=3" title="&lt;&#65;">"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(attributes[0].value, "?x=1&y=2&copy=3");
    assert_eq!(attributes[1].value, "<A");
}

#[test]
fn test_text_character_references() {
    let tokens = tokenize("fish &amp; chips &#x263A; &bogus;");
    assert_eq!(tokens[0], Token::text("fish & chips \u{263A} &bogus;"));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hello ".to_string()
        }
    );
}

#[test]
fn test_abrupt_and_bang_closed_comments() {
    let tokens = tokenize("<!--><!---><!--a--!>b");
    assert_eq!(
        tokens,
        vec![
            Token::Comment {
                data: String::new()
            },
            Token::Comment {
                data: String::new()
            },
            Token::Comment {
                data: "a".to_string()
            },
            Token::text("b"),
            Token::EndOfInput,
        ]
    );
}

#[test]
fn test_unterminated_comment_takes_the_rest() {
    let tokens = tokenize("<!-- open <p>");
    assert_eq!(
        tokens,
        vec![
            Token::Comment {
                data: " open <p>".to_string()
            },
            Token::EndOfInput,
        ]
    );
}

#[test]
fn test_bogus_comments() {
    let tokens = tokenize("<?xml version=1?></ 3>");
    assert_eq!(
        tokens,
        vec![
            Token::Comment {
                data: "?xml version=1?".to_string()
            },
            Token::Comment {
                data: " 3".to_string()
            },
            Token::EndOfInput,
        ]
    );
}

#[test]
fn test_cdata_outside_foreign_content_is_a_comment() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[CDATA[x]]".to_string()
        }
    );
}

#[test]
fn test_cdata_in_foreign_content_is_text() {
    let mut lexer = Lexer::new("<![CDATA[a<b]]>").with_warnings(false);
    lexer.set_foreign(true);
    assert_eq!(lexer.next_token(), Token::text("a<b"));
    assert_eq!(lexer.next_token(), Token::EndOfInput);
}

#[test]
fn test_lone_less_than_is_text() {
    let tokens = tokenize("a < b");
    let text: String = tokens.iter().filter_map(|t| match t {
        Token::Text { data } => Some(data.as_str()),
        _ => None,
    }).collect();
    assert_eq!(text, "a < b");
}

#[test]
fn test_eof_in_tag_ends_input() {
    let tokens = tokenize("x<div class=");
    assert_eq!(tokens, vec![Token::text("x"), Token::EndOfInput]);
}

#[test]
fn test_end_of_input_repeats() {
    let mut lexer = Lexer::new("");
    assert_eq!(lexer.next_token(), Token::EndOfInput);
    assert_eq!(lexer.next_token(), Token::EndOfInput);
    assert!(lexer.is_finished());
}

#[test]
fn test_newlines_are_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(tokens[0], Token::text("a\nb\nc"));
}

#[test]
fn test_nul_in_text_is_replaced() {
    let tokens = tokenize("a\0b");
    assert_eq!(tokens[0], Token::text("a\u{FFFD}b"));
}

#[test]
fn test_raw_text_until_ignores_other_end_tags() {
    let mut lexer = Lexer::new(r#"let a = "</b>";</SCRIPT >after"#);
    assert_eq!(lexer.raw_text_until("script"), r#"let a = "</b>";"#);
    assert_eq!(lexer.next_token(), Token::text("after"));
}

#[test]
fn test_raw_text_needs_a_terminated_name() {
    let mut lexer = Lexer::new("</scripts></script>");
    assert_eq!(lexer.raw_text_until("script"), "</scripts>");
}

#[test]
fn test_raw_text_is_not_decoded() {
    let mut lexer = Lexer::new("&amp;\0</style>");
    assert_eq!(lexer.raw_text_until("style"), "&amp;\0");
}

#[test]
fn test_escapable_raw_text_is_decoded() {
    let mut lexer = Lexer::new("a &amp; <b>\0</title>");
    assert_eq!(lexer.escapable_raw_text_until("title"), "a & <b>\u{FFFD}");
}

#[test]
fn test_unterminated_raw_text_takes_the_rest() {
    let mut lexer = Lexer::new("never closed");
    assert_eq!(lexer.raw_text_until("style"), "never closed");
    assert_eq!(lexer.next_token(), Token::EndOfInput);
}

#[test]
fn test_skip_next_newline() {
    let mut lexer = Lexer::new("\n\nx");
    lexer.skip_next_newline();
    assert_eq!(lexer.next_token(), Token::text("\nx"));
}

#[test]
fn test_rest_as_text() {
    let mut lexer = Lexer::new("<b>&amp;</b>");
    assert_eq!(lexer.rest_as_text(false), "<b>&amp;</b>");
    assert_eq!(lexer.next_token(), Token::EndOfInput);
}

#[test]
fn test_small_compaction_threshold_gives_same_tokens() {
    let input = "<p class=a>one</p><!--two--><div>three</div>".repeat(20);
    let compacting = Lexer::new(&input)
        .with_compaction_threshold(8)
        .with_warnings(false)
        .into_tokens();
    assert_eq!(compacting, tokenize(&input));
}

proptest! {
    #[test]
    fn lexing_always_terminates_with_end_of_input(input in "[a-z<>/!='\" &;-]{0,64}") {
        let tokens = tokenize(&input);
        prop_assert_eq!(tokens.last(), Some(&Token::EndOfInput));
        prop_assert_eq!(tokens.iter().filter(|t| t.is_end_of_input()).count(), 1);
    }
}
