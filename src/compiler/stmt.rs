use tracing::trace;

use crate::{
    ast::{
        scope::StatementId,
        statements::{AssignmentSource, AssignmentStatement, ReturnStatement, ReturnValue, Statement},
        types::TypeId,
        value::Value,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{
    compiler::Compiler,
    expr::{gen_call, gen_expression, operand_signed, operand_value},
};

/// Generates LLVM IR for the statement stored under `id`.
pub fn gen_statement(compiler: &mut Compiler<'_>, id: StatementId) -> Result<(), Error> {
    let statement = compiler.program.statement(id).clone();

    match statement {
        Statement::Assignment(assignment) => gen_assignment(compiler, &assignment),
        Statement::Return(ret) => gen_return(compiler, id, &ret),
        Statement::Call(call) => {
            // The result, if any, is dropped.
            gen_call(compiler, &call.call)?;
            Ok(())
        }
    }
}

fn gen_assignment(compiler: &mut Compiler<'_>, assignment: &AssignmentStatement) -> Result<(), Error> {
    let position = &assignment.position;
    let target = assignment.target;
    let target_type = compiler.program.type_of(target);
    let target_llvm = target_type.llvm_type(compiler.context);

    let value = match &assignment.source {
        AssignmentSource::Variable(source) => {
            let source = *source;
            let source_variable = compiler.program.variable(source);
            let visible = match compiler.program.variable(target).scope {
                Some(scope) => compiler.program.is_visible(scope, source),
                None => source_variable.is_global,
            };

            if !visible {
                return Err(Error::new(
                    ErrorImpl::UndeclaredVariable {
                        variable: source_variable.identifier.name().to_string(),
                    },
                    position.clone(),
                ));
            }

            let source_signed = compiler.program.type_of(source).signed;
            let loaded = compiler.load_variable(source, position)?;

            target_type
                .convert(&compiler.builder, compiler.context, loaded, source_signed)
                .map_err(|error| Error::backend(error, position.clone()))?
        }
        AssignmentSource::Literal(literal) => {
            let value = Value::numeric(*literal, target_type.signed);
            compiler.program.variable_mut(target).value = value;
            value.const_in(target_llvm)
        }
        AssignmentSource::Expression(expression) => {
            let Some(mut result) = gen_expression(compiler, expression, target_type)? else {
                return Err(Error::new(
                    ErrorImpl::TypeMismatch {
                        expected: target_type.to_string(),
                        received: String::from("void"),
                    },
                    position.clone(),
                ));
            };

            let signed = operand_signed(compiler, &result);
            let value = operand_value(compiler, &mut result, Some(target_llvm), position)?;
            let value = target_type
                .convert(&compiler.builder, compiler.context, value, signed)
                .map_err(|error| Error::backend(error, position.clone()))?;

            if let Some(constant) = value.get_zero_extended_constant() {
                compiler.program.variable_mut(target).value =
                    Value::numeric(constant, target_type.signed);
            }

            value
        }
    };

    trace!(variable = %compiler.program.variable(target).identifier, "assignment");
    compiler.write_variable(target, value, position)
}

/// Emits `ret` for a return statement. A statement that already produced
/// its instruction is left alone.
fn gen_return<'ctx>(
    compiler: &mut Compiler<'ctx>,
    id: StatementId,
    ret: &ReturnStatement<'ctx>,
) -> Result<(), Error> {
    if ret.emitted().is_some() {
        return Ok(());
    }

    let position = &ret.position;
    let function = compiler.program.function(ret.function);
    let return_type = function.return_type;
    let mismatch = |expected: String, received: String| {
        Error::new(ErrorImpl::TypeMismatch { expected, received }, position.clone())
    };
    let type_name = |ty: Option<TypeId>| match ty {
        Some(ty) => compiler.program.types.get(ty).to_string(),
        None => String::from("void"),
    };

    let instruction = match (ret.value, return_type) {
        (ReturnValue::Void, None) => compiler.builder.build_return(None),
        (ReturnValue::Void, Some(_)) => {
            return Err(mismatch(type_name(return_type), type_name(None)));
        }
        (ReturnValue::Literal(_), None) => {
            return Err(mismatch(type_name(None), String::from("literal")));
        }
        (ReturnValue::Variable(variable), None) => {
            let received = type_name(Some(compiler.program.variable(variable).ty));
            return Err(mismatch(type_name(None), received));
        }
        (ReturnValue::Literal(literal), Some(ty)) => {
            let ty = compiler.program.types.get(ty);
            let value = Value::numeric(literal, ty.signed).const_in(ty.llvm_type(compiler.context));
            compiler.builder.build_return(Some(&value))
        }
        (ReturnValue::Variable(variable), Some(ty)) => {
            let variable_type = compiler.program.variable(variable).ty;
            if variable_type != ty {
                return Err(mismatch(type_name(Some(ty)), type_name(Some(variable_type))));
            }

            let value = compiler.read_variable(variable, position)?;
            compiler.builder.build_return(Some(&value))
        }
    }
    .map_err(|error| Error::backend(error, position.clone()))?;

    if let Statement::Return(ret) = compiler.program.statement_mut(id) {
        ret.set_emitted(instruction);
    }

    Ok(())
}
