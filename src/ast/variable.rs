use inkwell::{
    context::Context,
    types::IntType,
    values::{IntValue, PointerValue},
};

use crate::Position;

use super::{
    identifier::Identifier,
    scope::ScopeId,
    types::{TypeContainer, TypeId},
    value::Value,
};

/// A named storage location, or an anonymous temporary.
///
/// The backend value is materialized lazily from the literal [`Value`] on
/// first use and cached afterwards; assignments replace the cache through
/// [`Variable::update`].
#[derive(Debug, Clone)]
pub struct Variable<'ctx> {
    pub identifier: Identifier,
    pub ty: TypeId,
    pub value: Value,
    pub is_global: bool,
    /// Declaring scope. Temporaries have none.
    pub scope: Option<ScopeId>,
    pub param_index: Option<u32>,
    pub position: Position,
    is_boolean: bool,
    backend_type: Option<IntType<'ctx>>,
    backend_value: Option<IntValue<'ctx>>,
    storage: Option<PointerValue<'ctx>>,
}

impl<'ctx> Variable<'ctx> {
    pub fn new(identifier: Identifier, ty: TypeId, value: Value, position: Position) -> Self {
        Variable {
            identifier,
            ty,
            value,
            is_global: false,
            scope: None,
            param_index: None,
            position,
            is_boolean: false,
            backend_type: None,
            backend_value: None,
            storage: None,
        }
    }

    /// An unnamed value owned by the expression that produced it.
    pub fn temporary(ty: TypeId, value: Value, position: Position) -> Self {
        Variable::new(Identifier::anonymous(), ty, value, position)
    }

    pub fn is_temporary(&self) -> bool {
        self.identifier.is_anonymous()
    }

    pub fn is_boolean(&self) -> bool {
        self.is_boolean
    }

    pub fn set_boolean(&mut self, is_boolean: bool) {
        self.is_boolean = is_boolean;
    }

    /// Signedness used when this variable's value is widened. Comparison
    /// results are always zero-extended.
    pub fn is_signed(&self, types: &TypeContainer) -> bool {
        !self.is_boolean && types.get(self.ty).signed
    }

    pub fn cached_value(&self) -> Option<IntValue<'ctx>> {
        self.backend_value
    }

    pub fn cached_type(&self) -> Option<IntType<'ctx>> {
        self.backend_type
    }

    /// Returns the cached backend value, or materializes the literal as a
    /// constant of `target` (the declared type when `None`) and caches it.
    pub fn backend_value(
        &mut self,
        types: &TypeContainer,
        context: &'ctx Context,
        target: Option<IntType<'ctx>>,
    ) -> IntValue<'ctx> {
        if let Some(value) = self.backend_value {
            return value;
        }

        let ty = target.unwrap_or_else(|| types.get(self.ty).llvm_type(context));
        let value = self.value.const_in(ty);

        self.backend_type = Some(ty);
        self.backend_value = Some(value);
        value
    }

    pub fn update(&mut self, value: IntValue<'ctx>, ty: IntType<'ctx>) {
        self.backend_value = Some(value);
        self.backend_type = Some(ty);
    }

    pub fn storage(&self) -> Option<PointerValue<'ctx>> {
        self.storage
    }

    pub fn set_storage(&mut self, storage: PointerValue<'ctx>) {
        self.storage = Some(storage);
    }
}
