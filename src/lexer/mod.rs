//! Lexical analysis.
//!
//! Converts Dulek source into a flat token stream using an ordered table of
//! anchored regex patterns. Keywords and the eight integer type names are
//! recognised through [`tokens::RESERVED_LOOKUP`]; `//` comments and
//! whitespace are skipped.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
