use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    /// Wraps a failure reported by LLVM (builder, verifier or file output).
    pub fn backend(error: impl Display, position: Position) -> Self {
        Error::new(
            ErrorImpl::BackendError {
                message: error.to_string(),
            },
            position,
        )
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::UnknownType { .. } => ErrorKind::Syntax,
            ErrorImpl::UndeclaredIdentifier { .. }
            | ErrorImpl::UndeclaredVariable { .. }
            | ErrorImpl::NotAFunction { .. } => ErrorKind::UndeclaredIdentifier,
            ErrorImpl::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ErrorImpl::NestedFunction { .. } | ErrorImpl::OutsideFunction { .. } => {
                ErrorKind::NestedFunction
            }
            ErrorImpl::AlreadyDeclared { .. }
            | ErrorImpl::ParameterCountMismatch { .. }
            | ErrorImpl::ArgumentCountMismatch { .. }
            | ErrorImpl::NullExpression
            | ErrorImpl::MissingReturn { .. }
            | ErrorImpl::ScopeReentered
            | ErrorImpl::GlobalScopeExit => ErrorKind::Structural,
            ErrorImpl::BackendError { .. } | ErrorImpl::InvalidModule { .. } => {
                ErrorKind::Backend
            }
            ErrorImpl::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::UndeclaredVariable { .. } => "UndeclaredVariable",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::NestedFunction { .. } => "NestedFunction",
            ErrorImpl::OutsideFunction { .. } => "OutsideFunction",
            ErrorImpl::AlreadyDeclared { .. } => "AlreadyDeclared",
            ErrorImpl::ParameterCountMismatch { .. } => "ParameterCountMismatch",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::NullExpression => "NullExpression",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::ScopeReentered => "ScopeReentered",
            ErrorImpl::GlobalScopeExit => "GlobalScopeExit",
            ErrorImpl::BackendError { .. } => "BackendError",
            ErrorImpl::InvalidModule { .. } => "InvalidModule",
            ErrorImpl::Io { .. } => "Io",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the 64 bit limit?",
                token
            )),
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Unknown type `{}`, expected one of i8, i16, i32, i64, u8, u16, u32, u64",
                type_
            )),
            ErrorImpl::UndeclaredIdentifier { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in any enclosing scope", identifier))
            }
            ErrorImpl::UndeclaredVariable { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` is not visible from the assignment target",
                variable
            )),
            ErrorImpl::NotAFunction { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is not a function", identifier))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::NestedFunction { function } => ErrorTip::Suggestion(format!(
                "Function `{}` is declared inside another function",
                function
            )),
            ErrorImpl::OutsideFunction { construct } => ErrorTip::Suggestion(format!(
                "{} can only appear inside a function body",
                construct
            )),
            ErrorImpl::AlreadyDeclared { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is already declared in this scope", identifier))
            }
            ErrorImpl::ParameterCountMismatch { names, types } => ErrorTip::Suggestion(format!(
                "{} parameter names but {} parameter types",
                names, types
            )),
            ErrorImpl::ArgumentCountMismatch {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::NullExpression => {
                ErrorTip::Suggestion(String::from("Assignment has no right hand side"))
            }
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Function `{}` has a return type but its body never returns",
                function
            )),
            ErrorImpl::ScopeReentered => ErrorTip::None,
            ErrorImpl::GlobalScopeExit => {
                ErrorTip::Suggestion(String::from("Unbalanced `}`, the global scope cannot be closed"))
            }
            ErrorImpl::BackendError { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::InvalidModule { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::Io { path, message } => {
                ErrorTip::Suggestion(format!("{}: {}", path, message))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.internal_error, self.position.1, self.position.0)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

/// Coarse classification used by the driver to pick an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    UndeclaredIdentifier,
    TypeMismatch,
    NestedFunction,
    Structural,
    Backend,
    Io,
}

impl ErrorKind {
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Syntax => 10,
            ErrorKind::UndeclaredIdentifier => 11,
            ErrorKind::TypeMismatch => 12,
            ErrorKind::NestedFunction => 13,
            ErrorKind::Structural => 14,
            ErrorKind::Backend => 15,
            ErrorKind::Io => 16,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("undeclared identifier {identifier:?}")]
    UndeclaredIdentifier { identifier: String },
    #[error("undeclared variable {variable:?}")]
    UndeclaredVariable { variable: String },
    #[error("{identifier:?} is not a function")]
    NotAFunction { identifier: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("function {function:?} declared inside another function")]
    NestedFunction { function: String },
    #[error("{construct} used outside any function")]
    OutsideFunction { construct: String },
    #[error("{identifier:?} already declared")]
    AlreadyDeclared { identifier: String },
    #[error("parameter count mismatch: {names} names, {types} types")]
    ParameterCountMismatch { names: usize, types: usize },
    #[error("{function:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("null expression")]
    NullExpression,
    #[error("function {function:?} does not return a value")]
    MissingReturn { function: String },
    #[error("scope generated twice")]
    ScopeReentered,
    #[error("cannot exit the global scope")]
    GlobalScopeExit,
    #[error("backend error: {message}")]
    BackendError { message: String },
    #[error("invalid module: {message}")]
    InvalidModule { message: String },
    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },
}
