//! Scopes, functions and the handles that index them inside the
//! compiler context's arena.

use inkwell::values::FunctionValue;

use crate::Position;

use super::{identifier::Identifier, types::TypeId};

macro_rules! arena_handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(&self) -> usize {
                self.0
            }
        }
    };
}

arena_handle!(ScopeId);
arena_handle!(FunctionId);
arena_handle!(VariableId);
arena_handle!(StatementId);

/// An entity owned by a scope, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeChild {
    Variable(VariableId),
    Function(FunctionId),
    Scope(ScopeId),
    Statement(StatementId),
}

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Variable(VariableId),
    Function(FunctionId),
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Function whose body (or nested block) this scope belongs to.
    pub function: Option<FunctionId>,
    pub children: Vec<ScopeChild>,
    /// Set once code generation has walked this scope.
    pub generated: bool,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, function: Option<FunctionId>) -> Self {
        Scope {
            parent,
            function,
            children: vec![],
            generated: false,
        }
    }
}

/// A function is a scope plus a signature.
#[derive(Debug, Clone)]
pub struct Function<'ctx> {
    pub identifier: Identifier,
    pub body: ScopeId,
    pub parameters: Vec<VariableId>,
    /// `None` means the function returns nothing.
    pub return_type: Option<TypeId>,
    /// Set only for entries of the intrinsic registry.
    pub is_system: bool,
    pub position: Position,
    backend: Option<FunctionValue<'ctx>>,
}

impl<'ctx> Function<'ctx> {
    pub fn new(
        identifier: Identifier,
        body: ScopeId,
        return_type: Option<TypeId>,
        position: Position,
    ) -> Self {
        Function {
            is_system: false,
            identifier,
            body,
            parameters: vec![],
            return_type,
            position,
            backend: None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn backend(&self) -> Option<FunctionValue<'ctx>> {
        self.backend
    }

    pub fn set_backend(&mut self, function: FunctionValue<'ctx>) {
        self.backend = Some(function);
    }
}
