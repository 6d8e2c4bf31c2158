//! Parser module that registers the program into a compiler context.
//!
//! This module contains the parser that walks a stream of tokens and drives
//! the [`CompilerContext`](crate::compiler::context::CompilerContext):
//! declarations, blocks and statements are registered as they are read.
//! It uses a Pratt parser for expressions and handles:
//!
//! - Variable and function declarations
//! - Assignment, return and call statements, nested blocks
//! - Expression parsing (binary ops, function calls, literals)
//! - Integer type keywords
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
