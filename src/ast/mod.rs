//! The semantic model shared by the parser and the code generator.
//!
//! - [`identifier`] names and numeric-literal detection
//! - [`types`] integer types and the flyweight [`types::TypeContainer`]
//! - [`value`] literal payloads
//! - [`variable`] variables with a lazily materialized backend value
//! - [`scope`] scopes, functions and arena handles
//! - [`expressions`] / [`statements`] the nodes built during parsing

pub mod expressions;
pub mod identifier;
pub mod scope;
pub mod statements;
pub mod types;
pub mod value;
pub mod variable;
