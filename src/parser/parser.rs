//! Parser implementation that feeds the compiler context.
//!
//! The parser does not build a syntax tree of its own. Every declaration,
//! block and statement is registered into the [`CompilerContext`] as soon as
//! it has been read, so names are resolved against exactly the scopes that
//! are open at that point of the source.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//! - Type parsing handlers

use std::{collections::HashMap, rc::Rc};

use tracing::debug;

use crate::{
    compiler::context::CompilerContext,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the borrowed compiler context
/// * `'ctx` - Lifetime of the LLVM context the program will be lowered into
pub struct Parser<'a, 'ctx> {
    /// The list of tokens to parse, always terminated by EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Symbol table the parsed program is registered into
    pub program: &'a mut CompilerContext<'ctx>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup<'a, 'ctx>,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup<'a, 'ctx>,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup<'a, 'ctx>,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type handlers
    type_nud_lookup: TypeNUDLookup<'a, 'ctx>,
}

impl<'a, 'ctx> Parser<'a, 'ctx> {
    pub fn new(tokens: Vec<Token>, file: Rc<String>, program: &'a mut CompilerContext<'ctx>) -> Self {
        Parser {
            tokens,
            pos: 0,
            file,
            program,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing. Past the end of the
    /// stream this keeps returning the EOF token.
    pub fn current_token(&self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token right after the current one.
    pub fn peek(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            return Err(error.unwrap_or_else(|| {
                Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: token.value.clone(),
                        message: format!("expected {}", expected_kind),
                    },
                    token.span.start.clone(),
                )
            }));
        }

        Ok(self.advance().clone())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.pos < self.tokens.len() && self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup<'a, 'ctx> {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup<'a, 'ctx> {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup<'a, 'ctx> {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup<'a, 'ctx> {
        &self.type_nud_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler<'a, 'ctx>) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler<'a, 'ctx>) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler<'a, 'ctx>) {
        self.binding_power_lookup.insert(kind, BindingPower::Default);
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a handler for a type keyword.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler<'a, 'ctx>) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Position of the current token in the source file.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }
}

/// Parses a stream of tokens into `program`.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses items until EOF. The first
/// error stops parsing.
pub fn parse(tokens: Vec<Token>, file: Rc<String>, program: &mut CompilerContext<'_>) -> Result<(), Error> {
    let mut parser = Parser::new(tokens, file, program);
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    while parser.has_tokens() {
        parse_stmt(&mut parser)?;
    }

    debug!(file = %parser.file(), "parsed");
    Ok(())
}
