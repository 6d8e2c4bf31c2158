//! Type parsing implementation.
//!
//! Types are one of the eight integer keywords. Each keyword has a handler
//! that interns the matching [`NumericType`] into the compiler context and
//! returns its handle.

use std::collections::HashMap;

use crate::{
    ast::types::{NumericType, TypeId},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type handler functions.
pub type TypeNUDHandler<'a, 'ctx> = fn(&mut Parser<'a, 'ctx>) -> Result<TypeId, Error>;

/// Type alias for type handler lookup table.
pub type TypeNUDLookup<'a, 'ctx> = HashMap<TokenKind, TypeNUDHandler<'a, 'ctx>>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    for kind in [
        TokenKind::I8,
        TokenKind::I16,
        TokenKind::I32,
        TokenKind::I64,
        TokenKind::U8,
        TokenKind::U16,
        TokenKind::U32,
        TokenKind::U64,
    ] {
        parser.type_nud(kind, parse_numeric_type);
    }
}

pub fn parse_numeric_type(parser: &mut Parser) -> Result<TypeId, Error> {
    let token = parser.advance().clone();

    let Some(ty) = NumericType::from_name(&token.value) else {
        return Err(Error::new(
            ErrorImpl::UnknownType { type_: token.value },
            token.span.start,
        ));
    };

    Ok(parser.program.types.intern(ty))
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeId, Error> {
    let token_kind = parser.current_token_kind();
    let Some(handler) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnknownType {
                type_: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    };

    handler(parser)
}
