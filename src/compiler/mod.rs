//! Code generation module for the compiler.
//!
//! This module contains the symbol table the parser fills in and the
//! LLVM-based code generator that lowers it to LLVM IR. It handles:
//!
//! - Scope, variable and function registration and name resolution
//! - Compilation of expressions and statements
//! - Integer conversion between declared types
//! - Built-in `$` functions

pub mod compiler;
pub mod context;
pub mod expr;
pub mod stdlib;
pub mod stmt;
