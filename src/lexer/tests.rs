//! Unit tests for the lexer module.

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.du".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("fn return i8 i16 i32 i64 u8 u16 u32 u64"),
        vec![
            TokenKind::Fn,
            TokenKind::Return,
            TokenKind::I8,
            TokenKind::I16,
            TokenKind::I32,
            TokenKind::I64,
            TokenKind::U8,
            TokenKind::U16,
            TokenKind::U32,
            TokenKind::U64,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo baz_123 _underscore $display i320".to_string();
    let tokens = tokenize(source, Some("test.du".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].value, "_underscore");
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].value, "$display");
    // Only whole words are reserved.
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 0 18446744073709551615".to_string();
    let tokens = tokenize(source, Some("test.du".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "0");
    assert_eq!(tokens[2].value, "18446744073709551615");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("-> = == < > + - * / , ;"),
        vec![
            TokenKind::Arrow,
            TokenKind::Assignment,
            TokenKind::Equals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_declaration() {
    assert_eq!(
        kinds("x -> u8 = 255;"),
        vec![
            TokenKind::Identifier,
            TokenKind::Arrow,
            TokenKind::U8,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments_are_skipped() {
    assert_eq!(
        kinds("x = 1; // trailing / comment\ny = 2;"),
        vec![
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_token_spans() {
    let tokens = tokenize("fn  main".to_string(), Some("test.du".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 2);
    assert_eq!(tokens[1].span.start.0, 4);
    assert_eq!(tokens[1].span.end.0, 8);
    assert_eq!(tokens[1].span.start.1.as_str(), "test.du");
    assert_eq!(tokens[2].span.start.0, 8);
}

#[test]
fn test_unrecognised_token() {
    let result = tokenize("x = 1 @ 2;".to_string(), Some("test.du".to_string()));

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 6);
}

#[test]
fn test_default_file_name() {
    let tokens = tokenize("x".to_string(), None).unwrap();

    assert_eq!(tokens[0].span.start.1.as_str(), "shell");
}
