use inkwell::{
    builder::BuilderError,
    types::IntType,
    values::{BasicMetadataValueEnum, IntValue},
    IntPredicate,
};

use crate::{
    ast::{
        expressions::{AdvancedExpression, CallExpression, Expression, Operand, Operator, Term},
        types::{NumericType, TypeId, Width},
        value::Value,
        variable::Variable,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{compiler::Compiler, stdlib::find_system_function};

/// Generates LLVM IR for the given expression.
///
/// `destination` is the type of whatever receives the result; literal leaves
/// are materialized at it, so a literal on the left neither truncates a wider
/// right operand nor divides differently from the destination. Returns
/// `None` for calls to void functions.
pub fn gen_expression<'ctx>(
    compiler: &mut Compiler<'ctx>,
    expression: &Expression,
    destination: NumericType,
) -> Result<Option<Operand<'ctx>>, Error> {
    match expression {
        Expression::Basic(basic) => Ok(Some(match basic.term {
            Term::Variable(variable) => Operand::Reference(variable),
            Term::Literal(literal) => {
                let ty = compiler.program.types.intern(destination);
                Operand::Owned(Variable::temporary(
                    ty,
                    Value::numeric(literal, destination.signed),
                    basic.position.clone(),
                ))
            }
        })),
        Expression::Advanced(advanced) => gen_advanced(compiler, advanced, destination).map(Some),
        Expression::Call(call) => gen_call(compiler, call),
    }
}

fn expect_value<'ctx>(
    operand: Option<Operand<'ctx>>,
    expression: &Expression,
) -> Result<Operand<'ctx>, Error> {
    operand.ok_or_else(|| {
        Error::new(
            ErrorImpl::TypeMismatch {
                expected: String::from("integer"),
                received: String::from("void"),
            },
            expression.position().clone(),
        )
    })
}

pub fn operand_type(compiler: &Compiler<'_>, operand: &Operand<'_>) -> TypeId {
    match operand {
        Operand::Reference(variable) => compiler.program.variable(*variable).ty,
        Operand::Owned(variable) => variable.ty,
    }
}

pub fn operand_signed(compiler: &Compiler<'_>, operand: &Operand<'_>) -> bool {
    match operand {
        Operand::Reference(variable) => compiler
            .program
            .variable(*variable)
            .is_signed(&compiler.program.types),
        Operand::Owned(variable) => variable.is_signed(&compiler.program.types),
    }
}

/// Backend value of an operand. Temporaries that were never materialized are
/// built at `target` when given.
pub fn operand_value<'ctx>(
    compiler: &mut Compiler<'ctx>,
    operand: &mut Operand<'ctx>,
    target: Option<IntType<'ctx>>,
    position: &Position,
) -> Result<IntValue<'ctx>, Error> {
    match operand {
        Operand::Reference(variable) => compiler.read_variable(*variable, position),
        Operand::Owned(variable) => {
            Ok(variable.backend_value(&compiler.program.types, compiler.context, target))
        }
    }
}

/// Value and signedness of a call argument or intrinsic operand. Literals
/// are 32-bit signed.
pub fn gen_term<'ctx>(
    compiler: &mut Compiler<'ctx>,
    term: &Term,
    position: &Position,
) -> Result<(IntValue<'ctx>, bool), Error> {
    match term {
        Term::Variable(variable) => {
            let signed = compiler.program.type_of(*variable).signed;
            Ok((compiler.read_variable(*variable, position)?, signed))
        }
        Term::Literal(literal) => {
            let ty = NumericType::new(Width::W32, true).llvm_type(compiler.context);
            Ok((Value::numeric(*literal, true).const_in(ty), true))
        }
    }
}

fn gen_advanced<'ctx>(
    compiler: &mut Compiler<'ctx>,
    advanced: &AdvancedExpression,
    destination: NumericType,
) -> Result<Operand<'ctx>, Error> {
    let position = &advanced.position;
    let backend_error = |error: BuilderError| Error::backend(error, position.clone());

    let left = gen_expression(compiler, &advanced.left, destination)?;
    let mut left = expect_value(left, &advanced.left)?;
    let right = gen_expression(compiler, &advanced.right, destination)?;
    let mut right = expect_value(right, &advanced.right)?;

    let left_type = compiler.program.types.get(operand_type(compiler, &left));
    let left_llvm = left_type.llvm_type(compiler.context);
    let left_signed = operand_signed(compiler, &left);
    let right_signed = operand_signed(compiler, &right);

    // The right side is brought to the left side's type; a comparison result
    // on the left is widened back to its type as well.
    let lhs = operand_value(compiler, &mut left, Some(left_llvm), position)?;
    let lhs = left_type
        .convert(&compiler.builder, compiler.context, lhs, left_signed)
        .map_err(backend_error)?;
    let rhs = operand_value(compiler, &mut right, Some(left_llvm), position)?;
    let rhs = left_type
        .convert(&compiler.builder, compiler.context, rhs, right_signed)
        .map_err(backend_error)?;

    let builder = &compiler.builder;
    let result = match advanced.operator {
        Operator::Add => builder.build_int_add(lhs, rhs, "add"),
        Operator::Subtract => builder.build_int_sub(lhs, rhs, "sub"),
        Operator::Multiply => builder.build_int_mul(lhs, rhs, "mul"),
        Operator::Divide if left_type.signed => builder.build_int_signed_div(lhs, rhs, "sdiv"),
        Operator::Divide => builder.build_int_unsigned_div(lhs, rhs, "udiv"),
        Operator::Less | Operator::Greater | Operator::Equals => {
            let predicate = match (advanced.operator, left_type.signed) {
                (Operator::Less, true) => IntPredicate::SLT,
                (Operator::Less, false) => IntPredicate::ULT,
                (Operator::Greater, true) => IntPredicate::SGT,
                (Operator::Greater, false) => IntPredicate::UGT,
                _ => IntPredicate::EQ,
            };
            builder.build_int_compare(predicate, lhs, rhs, "cmp")
        }
    }
    .map_err(backend_error)?;

    // A temporary on the left is reused as the accumulator. A named variable
    // is never overwritten by an expression; the result gets a fresh
    // temporary of its type instead.
    let mut target = match left {
        Operand::Owned(variable) => variable,
        Operand::Reference(variable) => Variable::temporary(
            compiler.program.variable(variable).ty,
            Value::None,
            position.clone(),
        ),
    };
    target.value = Value::None;
    target.update(result, result.get_type());
    target.set_boolean(advanced.operator.is_relational());

    Ok(Operand::Owned(target))
}

/// Generates a call. Intrinsics go through the system function registry,
/// everything else calls the user function with each argument converted to
/// the parameter's type.
pub fn gen_call<'ctx>(
    compiler: &mut Compiler<'ctx>,
    call: &CallExpression,
) -> Result<Option<Operand<'ctx>>, Error> {
    if compiler.program.function(call.function).is_system {
        if let Some(handler) = find_system_function(call.name.name()) {
            handler(compiler, &call.arguments, &call.position)?;
            return Ok(None);
        }
    }

    let llvm_function = compiler.declare_function(call.function);
    let callee = compiler.program.function(call.function);
    let parameters = callee.parameters.clone();
    let return_type = callee.return_type;

    let mut arguments: Vec<BasicMetadataValueEnum<'ctx>> = vec![];
    for (index, term) in call.arguments.iter().enumerate() {
        let (value, signed) = gen_term(compiler, term, &call.position)?;
        let value = match parameters.get(index) {
            Some(parameter) => compiler
                .program
                .type_of(*parameter)
                .convert(&compiler.builder, compiler.context, value, signed)
                .map_err(|error| Error::backend(error, call.position.clone()))?,
            None => value,
        };
        arguments.push(value.into());
    }

    let name = if return_type.is_some() { "call" } else { "" };
    let call_site = compiler
        .builder
        .build_call(llvm_function, &arguments, name)
        .map_err(|error| Error::backend(error, call.position.clone()))?;

    let Some(return_type) = return_type else {
        return Ok(None);
    };

    let value = call_site
        .try_as_basic_value()
        .left()
        .map(|value| value.into_int_value())
        .ok_or_else(|| {
            Error::backend(
                format!("call to `{}` produced no value", call.name),
                call.position.clone(),
            )
        })?;

    let mut result = Variable::temporary(return_type, Value::None, call.position.clone());
    result.update(value, value.get_type());

    Ok(Some(Operand::Owned(result)))
}
