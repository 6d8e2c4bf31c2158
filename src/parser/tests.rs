//! Unit tests for the parser module.
//!
//! Parsing registers straight into a [`CompilerContext`], so these tests
//! inspect the scopes, functions and statements it produced.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        expressions::{Expression, Operator, Term},
        identifier::Identifier,
        scope::{ScopeChild, Symbol},
        statements::{AssignmentSource, ReturnValue, Statement},
        types::{NumericType, Width},
        value::Value,
    },
    compiler::context::CompilerContext,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<CompilerContext<'static>, Error> {
    let tokens = tokenize(source.to_string(), Some("test.du".to_string()))?;
    let mut program = CompilerContext::new();
    parse(tokens, Rc::new("test.du".to_string()), &mut program)?;
    Ok(program)
}

fn parse_error(source: &str) -> Error {
    match parse_source(source) {
        Ok(_) => panic!("expected `{}` to fail", source),
        Err(error) => error,
    }
}

/// Statements directly inside the body of the function called `name`.
fn body_statements(program: &CompilerContext<'static>, name: &str) -> Vec<Statement<'static>> {
    let (_, function) = program
        .functions()
        .find(|(_, function)| function.identifier.name() == name)
        .unwrap();

    program
        .scope(function.body)
        .children
        .iter()
        .filter_map(|child| match child {
            ScopeChild::Statement(id) => Some(program.statement(*id).clone()),
            _ => None,
        })
        .collect()
}

fn assigned_expression(statement: &Statement) -> Expression {
    match statement {
        Statement::Assignment(assignment) => match &assignment.source {
            AssignmentSource::Expression(expression) => expression.clone(),
            other => panic!("expected an expression source, got {:?}", other),
        },
        other => panic!("expected an assignment, got {:?}", other),
    }
}

fn operator_of(expression: &Expression) -> Operator {
    match expression {
        Expression::Advanced(advanced) => advanced.operator,
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_global_variable_declaration() {
    let program = parse_source("x -> u8 = 255;\ny -> i64;").unwrap();

    let Some(Symbol::Variable(x)) = program.resolve(&Identifier::new("x")) else {
        panic!("x was not declared");
    };
    let x = program.variable(x);
    assert!(x.is_global);
    assert_eq!(program.types.get(x.ty), NumericType::new(Width::W8, false));
    assert_eq!(x.value, Value::numeric(255, false));

    let Some(Symbol::Variable(y)) = program.resolve(&Identifier::new("y")) else {
        panic!("y was not declared");
    };
    assert_eq!(program.variable(y).value, Value::None);
}

#[test]
fn test_parse_function_declaration() {
    let program = parse_source("fn add(a, b) -> i64 (i32, u8) {\n    return a;\n}").unwrap();

    let (_, function) = program
        .functions()
        .find(|(_, function)| function.identifier.name() == "add")
        .unwrap();

    assert!(!function.is_void());
    assert_eq!(function.parameters.len(), 2);
    assert_eq!(
        program.type_of(function.parameters[1]),
        NumericType::new(Width::W8, false)
    );
    assert_eq!(program.variable(function.parameters[0]).param_index, Some(0));

    // The context is back at global level.
    assert!(!program.is_inside_function());
    assert_eq!(program.active_scope(), program.global_scope());
}

#[test]
fn test_parse_void_function() {
    let program = parse_source("fn nothing() -> () {\n    return;\n}").unwrap();

    let statements = body_statements(&program, "nothing");
    assert_eq!(statements.len(), 1);
    let Statement::Return(ret) = &statements[0] else {
        panic!("expected a return");
    };
    assert_eq!(ret.value, ReturnValue::Void);
}

#[test]
fn test_parse_assignment_forms() {
    let program = parse_source(
        "fn f() -> i32 () {\n    x -> i32;\n    y -> i32;\n    x = 5;\n    y = x;\n    x = x + y;\n    return x;\n}",
    )
    .unwrap();

    let statements = body_statements(&program, "f");
    assert_eq!(statements.len(), 4);

    let sources = statements
        .iter()
        .take(3)
        .map(|statement| match statement {
            Statement::Assignment(assignment) => match &assignment.source {
                AssignmentSource::Literal(_) => "literal",
                AssignmentSource::Variable(_) => "variable",
                AssignmentSource::Expression(_) => "expression",
            },
            _ => "other",
        })
        .collect::<Vec<_>>();
    assert_eq!(sources, vec!["literal", "variable", "expression"]);
}

#[test]
fn test_parse_operator_precedence() {
    let program = parse_source(
        "fn f() -> i32 () {\n    x -> i32 = 1;\n    z -> i32;\n    z = x + x * 2;\n    z = x + 1 < x;\n    z = (x + 1) * 2;\n    return z;\n}",
    )
    .unwrap();

    let statements = body_statements(&program, "f");

    let sum = assigned_expression(&statements[0]);
    assert_eq!(operator_of(&sum), Operator::Add);
    let Expression::Advanced(sum) = sum else { unreachable!() };
    assert_eq!(operator_of(&sum.right), Operator::Multiply);

    assert_eq!(operator_of(&assigned_expression(&statements[1])), Operator::Less);

    let product = assigned_expression(&statements[2]);
    assert_eq!(operator_of(&product), Operator::Multiply);
    let Expression::Advanced(product) = product else { unreachable!() };
    assert_eq!(operator_of(&product.left), Operator::Add);
    let Expression::Basic(two) = product.right.as_ref() else {
        panic!("expected a literal");
    };
    assert_eq!(two.term, Term::Literal(2));
}

#[test]
fn test_parse_subtraction_is_left_associative() {
    let program =
        parse_source("fn f() -> i32 () {\n    z -> i32 = 9;\n    z = z - 2 - 3;\n    return z;\n}")
            .unwrap();

    let statements = body_statements(&program, "f");
    let Expression::Advanced(outer) = assigned_expression(&statements[0]) else {
        panic!("expected a binary expression");
    };
    assert_eq!(outer.operator, Operator::Subtract);
    assert_eq!(operator_of(&outer.left), Operator::Subtract);

    // Binary expressions sit at their operator.
    assert_eq!(outer.position.0, 51);
    assert_eq!(outer.left.position().0, 47);
}

#[test]
fn test_parse_call_statement_and_expression() {
    let program = parse_source(
        "fn one() -> i32 () {\n    return 1;\n}\nfn main() -> () {\n    x -> i32;\n    x = one();\n    $display(x, 7);\n}",
    )
    .unwrap();

    let statements = body_statements(&program, "main");
    assert_eq!(statements.len(), 2);

    let Expression::Call(call) = assigned_expression(&statements[0]) else {
        panic!("expected a call");
    };
    assert_eq!(call.name.name(), "one");
    assert!(call.arguments.is_empty());

    let Statement::Call(display) = &statements[1] else {
        panic!("expected a call statement");
    };
    assert_eq!(display.call.arguments.len(), 2);
    assert_eq!(display.call.arguments[1], Term::Literal(7));
}

#[test]
fn test_parse_nested_blocks_shadow() {
    let program = parse_source(
        "fn f() -> i32 () {\n    x -> i32 = 1;\n    {\n        x -> u8 = 2;\n        x = 3;\n    }\n    return x;\n}",
    )
    .unwrap();

    let (_, function) = program
        .functions()
        .find(|(_, function)| function.identifier.name() == "f")
        .unwrap();
    let children = &program.scope(function.body).children;

    let Some(ScopeChild::Scope(block)) = children
        .iter()
        .find(|child| matches!(child, ScopeChild::Scope(_)))
        .copied()
    else {
        panic!("expected a nested block");
    };

    // The assignment inside the block targets the inner `x`.
    let inner = &program.scope(block).children;
    let Some(ScopeChild::Statement(statement)) = inner.last().copied() else {
        panic!("expected a statement in the block");
    };
    let Statement::Assignment(assignment) = program.statement(statement) else {
        panic!("expected an assignment");
    };
    assert_eq!(
        program.type_of(assignment.target),
        NumericType::new(Width::W8, false)
    );

    // The return after the block sees the outer one again.
    let statements = body_statements(&program, "f");
    let Statement::Return(ret) = statements.last().unwrap() else {
        panic!("expected a return");
    };
    let ReturnValue::Variable(returned) = ret.value else {
        panic!("expected a variable");
    };
    assert_eq!(
        program.type_of(returned),
        NumericType::new(Width::W32, true)
    );
}

#[test]
fn test_parse_comments_are_ignored() {
    let program = parse_source("// a global\nx -> i32 = 1; // trailing\n").unwrap();
    assert!(program.resolve(&Identifier::new("x")).is_some());
}

#[test]
fn test_parse_undeclared_identifier() {
    let error = parse_error("fn f() -> i32 () {\n    return y;\n}");

    assert_eq!(error.kind(), ErrorKind::UndeclaredIdentifier);
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UndeclaredIdentifier {
            identifier: String::from("y")
        }
    );
}

#[test]
fn test_parse_undeclared_in_expression() {
    let error = parse_error("fn f() -> i32 () {\n    x -> i32;\n    x = x + y;\n    return x;\n}");
    assert_eq!(error.kind(), ErrorKind::UndeclaredIdentifier);
}

#[test]
fn test_parse_variable_is_not_callable() {
    let error = parse_error("x -> i32;\nfn f() -> () {\n    x();\n}");
    assert_eq!(error.get_error_name(), "NotAFunction");
}

#[test]
fn test_parse_nested_function_is_rejected() {
    let error = parse_error("fn outer() -> () {\n    fn inner() -> () {\n    }\n}");

    assert_eq!(error.kind(), ErrorKind::NestedFunction);
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::NestedFunction {
            function: String::from("inner")
        }
    );
}

#[test]
fn test_parse_statement_outside_function() {
    let error = parse_error("x -> i32;\nx = 1;");
    assert_eq!(error.kind(), ErrorKind::NestedFunction);
    assert_eq!(error.get_error_name(), "OutsideFunction");

    let error = parse_error("return;");
    assert_eq!(error.get_error_name(), "OutsideFunction");

    let error = parse_error("{\n}");
    assert_eq!(error.get_error_name(), "OutsideFunction");
}

#[test]
fn test_parse_parameter_count_mismatch() {
    let error = parse_error("fn f(a, b) -> (i32) {\n}");
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::ParameterCountMismatch { names: 2, types: 1 }
    );
}

#[test]
fn test_parse_argument_count_mismatch() {
    let error = parse_error(
        "fn f(a) -> (i32) {\n}\nfn g() -> () {\n    f(1, 2);\n}",
    );
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::ArgumentCountMismatch {
            function: String::from("f"),
            expected: 1,
            received: 2
        }
    );
}

#[test]
fn test_parse_duplicate_declaration() {
    let error = parse_error("x -> i32;\nx -> u8;");
    assert_eq!(error.get_error_name(), "AlreadyDeclared");
    assert_eq!(error.kind(), ErrorKind::Structural);
}

#[test]
fn test_parse_missing_right_side() {
    let error = parse_error("fn f() -> () {\n    x -> i32;\n    x = ;\n}");
    assert_eq!(error.get_internal_error(), &ErrorImpl::NullExpression);
}

#[test]
fn test_parse_syntax_errors() {
    let error = parse_error("x -> i32 = 1");
    assert_eq!(error.kind(), ErrorKind::Syntax);

    let error = parse_error("x -> bool;");
    assert_eq!(error.get_error_name(), "UnknownType");

    let error = parse_error("x -> u64 = 18446744073709551616;");
    assert_eq!(error.get_error_name(), "NumberParseError");

    let error = parse_error("fn f() -> () {\n    x -> i32;\n");
    assert_eq!(error.kind(), ErrorKind::Syntax);
}

#[test]
fn test_parse_error_position_points_at_token() {
    let error = parse_error("x -> i32;\ny -> i32 = z;");

    // `z` starts at byte 21.
    assert_eq!(error.get_position().0, 21);
    assert_eq!(error.get_position().1.as_str(), "test.du");
}
