use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Called with the text a pattern matched at the current position.
pub type RegexHandler = fn(&mut Lexer, &str);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(source: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(&format!("^(?:{})", source)).expect("lexer patterns are valid regexes"),
        handler,
    }
}

lazy_static! {
    // Order matters: longer operators before their prefixes, comments before `/`.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("\\$?[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("[0-9]+", number_handler),
        pattern("\\s+", skip_handler),
        pattern("//[^\n]*", skip_handler),
        pattern("\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern("\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern("\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern("\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern("->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern("\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span of `len` bytes starting at the current position.
    pub fn span(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn number_handler(lexer: &mut Lexer, matched: &str) {
    lexer.push(MK_TOKEN!(TokenKind::Number, matched.to_string(), lexer.span(matched.len())));
    lexer.advance_n(matched.len());
}

fn skip_handler(lexer: &mut Lexer, matched: &str) {
    lexer.advance_n(matched.len());
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.push(MK_TOKEN!(kind, matched.to_string(), lexer.span(matched.len())));
    lexer.advance_n(matched.len());
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in PATTERNS.iter() {
            let Some(found) = pattern.regex.find(lex.remainder()) else {
                continue;
            };
            let text = found.as_str().to_string();

            (pattern.handler)(&mut lex, &text);
            matched = true;
            break;
        }

        if !matched {
            let token = lex.remainder().chars().next().unwrap_or_default();
            return Err(Error::new(
                ErrorImpl::UnrecognisedToken {
                    token: token.to_string(),
                },
                lex.position(),
            ));
        }
    }

    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), lex.span(0)));
    Ok(lex.tokens)
}
