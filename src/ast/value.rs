use inkwell::{types::IntType, values::IntValue};

/// A compile-time literal payload.
///
/// The signedness tag belongs to the literal itself and can differ from the
/// declared type of the variable holding it until that variable is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    None,
    Numeric { value: u64, signed: bool },
}

impl Value {
    pub fn numeric(value: u64, signed: bool) -> Self {
        Value::Numeric { value, signed }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::None => None,
            Value::Numeric { value, .. } => Some(*value),
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Value::Numeric { signed: true, .. })
    }

    /// Materializes the literal as a constant of `ty`, truncating to its width.
    /// An empty value becomes zero.
    pub fn const_in<'ctx>(&self, ty: IntType<'ctx>) -> IntValue<'ctx> {
        match self {
            Value::None => ty.const_zero(),
            Value::Numeric { value, signed } => ty.const_int(*value, *signed),
        }
    }
}
