//! Integer types and the flyweight container that hands out type handles.

use std::{collections::HashMap, fmt::Display};

use inkwell::{
    builder::{Builder, BuilderError},
    context::Context,
    types::IntType,
    values::IntValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    pub fn bits(&self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    pub fn from_bits(bits: u32) -> Option<Width> {
        match bits {
            8 => Some(Width::W8),
            16 => Some(Width::W16),
            32 => Some(Width::W32),
            64 => Some(Width::W64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumericType {
    pub width: Width,
    pub signed: bool,
}

impl NumericType {
    pub fn new(width: Width, signed: bool) -> Self {
        NumericType { width, signed }
    }

    /// Parses one of `i8 i16 i32 i64 u8 u16 u32 u64`.
    pub fn from_name(name: &str) -> Option<Self> {
        let signed = match name.chars().next()? {
            'i' => true,
            'u' => false,
            _ => return None,
        };
        let width = Width::from_bits(name[1..].parse().ok()?)?;

        Some(NumericType::new(width, signed))
    }

    /// Key under which the type is stored in a [`TypeContainer`].
    pub fn id(&self) -> String {
        format!("{}{}", if self.signed { 'i' } else { 'u' }, self.width.bits())
    }

    pub fn equals(&self, other: &NumericType) -> bool {
        self.width == other.width && self.signed == other.signed
    }

    pub fn llvm_type<'ctx>(&self, context: &'ctx Context) -> IntType<'ctx> {
        context.custom_width_int_type(self.width.bits())
    }

    /// Brings `value` to this type's width.
    ///
    /// Widening sign-extends only when both this type and the source are
    /// signed, otherwise it zero-extends. Narrowing truncates. Values that
    /// already have the right width are returned untouched.
    pub fn convert<'ctx>(
        &self,
        builder: &Builder<'ctx>,
        context: &'ctx Context,
        value: IntValue<'ctx>,
        source_signed: bool,
    ) -> Result<IntValue<'ctx>, BuilderError> {
        let source_bits = value.get_type().get_bit_width();
        let target = self.llvm_type(context);

        if source_bits < self.width.bits() {
            if self.signed && source_signed {
                builder.build_int_s_extend(value, target, "sext")
            } else {
                builder.build_int_z_extend(value, target, "zext")
            }
        } else if source_bits > self.width.bits() {
            builder.build_int_truncate(value, target, "trunc")
        } else {
            Ok(value)
        }
    }
}

impl Display for NumericType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Handle to a type interned in a [`TypeContainer`]. Two handles compare
/// equal exactly when the types they name are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

#[derive(Debug, Default)]
pub struct TypeContainer {
    types: Vec<NumericType>,
    lookup: HashMap<String, TypeId>,
}

impl TypeContainer {
    pub fn new() -> Self {
        TypeContainer::default()
    }

    /// Returns the handle for `ty`, registering it on first request.
    pub fn intern(&mut self, ty: NumericType) -> TypeId {
        let key = ty.id();

        if let Some(id) = self.lookup.get(&key) {
            return *id;
        }

        let id = TypeId(self.types.len());
        self.types.push(ty);
        self.lookup.insert(key, id);
        id
    }

    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.lookup.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> NumericType {
        self.types[id.0]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
