use std::collections::HashMap;

use crate::{ast::expressions::Expression, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Relational,
    Additive,
    Multiplicative,
    Primary,
}

pub type StmtHandler<'a, 'ctx> = fn(&mut Parser<'a, 'ctx>) -> Result<(), Error>;
pub type NUDHandler<'a, 'ctx> = fn(&mut Parser<'a, 'ctx>) -> Result<Expression, Error>;
pub type LEDHandler<'a, 'ctx> =
    fn(&mut Parser<'a, 'ctx>, Expression, BindingPower) -> Result<Expression, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Relational
    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_binary_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);

    // Literals and symbols
    parser.nud(TokenKind::Number, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);

    // Statements. Statements starting with an identifier are told apart by
    // the token after it, see `parse_stmt`.
    parser.stmt(TokenKind::OpenCurly, parse_block_stmt);
    parser.stmt(TokenKind::Fn, parse_fn_decl_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup<'a, 'ctx> = HashMap<TokenKind, StmtHandler<'a, 'ctx>>;
pub type NUDLookup<'a, 'ctx> = HashMap<TokenKind, NUDHandler<'a, 'ctx>>;
pub type LEDLookup<'a, 'ctx> = HashMap<TokenKind, LEDHandler<'a, 'ctx>>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
