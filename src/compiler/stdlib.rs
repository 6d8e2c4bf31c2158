//! Built-in `$` functions.
//!
//! System functions are not written in the source language. Each one is a
//! handler that emits IR for its arguments directly, usually by calling into
//! the C runtime. The registry is consulted when the [`CompilerContext`]
//! is created, so every name in it is visible from the global scope.
//!
//! [`CompilerContext`]: super::context::CompilerContext

use std::collections::HashMap;

use inkwell::{
    module::Linkage,
    values::{BasicMetadataValueEnum, FunctionValue},
    AddressSpace,
};
use lazy_static::lazy_static;
use tracing::trace;

use crate::{
    ast::{
        expressions::Term,
        types::{NumericType, Width},
    },
    errors::errors::Error,
    Position,
};

use super::{compiler::Compiler, expr::gen_term};

pub type SystemHandler =
    for<'ctx> fn(&mut Compiler<'ctx>, &[Term], &Position) -> Result<(), Error>;

lazy_static! {
    pub static ref SYSTEM_FUNCTIONS: HashMap<&'static str, SystemHandler> = {
        let mut map: HashMap<&'static str, SystemHandler> = HashMap::new();
        map.insert("$display", display as SystemHandler);
        map
    };
}

pub fn find_system_function(name: &str) -> Option<SystemHandler> {
    SYSTEM_FUNCTIONS.get(name).copied()
}

/// `i32 printf(i8*, ...)`, declared on first use.
fn printf<'ctx>(compiler: &Compiler<'ctx>) -> FunctionValue<'ctx> {
    if let Some(function) = compiler.module.get_function("printf") {
        return function;
    }

    let i8_ptr_type = compiler.context.i8_type().ptr_type(AddressSpace::default());
    let printf_type = compiler
        .context
        .i32_type()
        .fn_type(&[i8_ptr_type.into()], true);

    compiler
        .module
        .add_function("printf", printf_type, Some(Linkage::External))
}

/// `$display(a, b, ...)` prints its arguments separated by spaces and
/// followed by a newline.
///
/// Arguments narrower than 32 bits are extended to `i32` by their own
/// signedness, since varargs promote them anyway.
fn display(compiler: &mut Compiler<'_>, arguments: &[Term], position: &Position) -> Result<(), Error> {
    let mut format = Vec::with_capacity(arguments.len());
    let mut values: Vec<BasicMetadataValueEnum> = Vec::with_capacity(arguments.len() + 1);

    for term in arguments {
        let (value, signed) = gen_term(compiler, term, position)?;
        let bits = value.get_type().get_bit_width();

        let value = if bits < 32 {
            NumericType::new(Width::W32, signed)
                .convert(&compiler.builder, compiler.context, value, signed)
                .map_err(|error| Error::backend(error, position.clone()))?
        } else {
            value
        };

        format.push(match (bits > 32, signed) {
            (true, true) => "%lld",
            (true, false) => "%llu",
            (false, true) => "%d",
            (false, false) => "%u",
        });
        values.push(value.into());
    }

    let format = format!("{}\n", format.join(" "));
    trace!(format = %format.escape_debug(), "display");

    let format = compiler
        .builder
        .build_global_string_ptr(&format, "fmt")
        .map_err(|error| Error::backend(error, position.clone()))?;
    values.insert(0, format.as_pointer_value().into());

    compiler
        .builder
        .build_call(printf(compiler), &values, "printf")
        .map_err(|error| Error::backend(error, position.clone()))?;

    Ok(())
}
