//! Integration tests for end-to-end compilation.
//!
//! These tests run the complete pipeline from source code through
//! tokenization, parsing into the compiler context and LLVM IR generation,
//! then execute the result with the JIT.

use dulek::{compiler::compiler::compile, errors::errors::ErrorKind};
use inkwell::{context::Context, OptimizationLevel};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Compiles `source` and calls the parameterless function `function`.
fn run<T>(source: &str, function: &str) -> T {
    let context = Context::create();
    let compiler = compile(source.to_string(), "test.du", &context)
        .unwrap_or_else(|error| panic!("{}", error));

    let engine = compiler
        .module
        .create_jit_execution_engine(OptimizationLevel::None)
        .unwrap();

    let result = unsafe {
        engine
            .get_function::<unsafe extern "C" fn() -> T>(function)
            .unwrap()
            .call()
    };
    result
}

fn compile_error_kind(source: &str) -> ErrorKind {
    let context = Context::create();
    let kind = match compile(source.to_string(), "test.du", &context) {
        Ok(_) => panic!("expected `{}` to fail", source),
        Err(error) => error.kind(),
    };
    kind
}

#[test]
fn test_sum_of_locals() {
    let source = "fn f() -> i32 () {\n    x -> i32 = 2;\n    y -> i32 = 3;\n    z -> i32;\n    z = x + y;\n    return z;\n}";
    assert_eq!(run::<i32>(source, "f"), 5);
}

#[test]
fn test_narrow_unsigned_keeps_its_value() {
    let source = "fn f() -> i32 () {\n    y -> u8 = 255;\n    x -> i32;\n    x = y;\n    return x;\n}";
    assert_eq!(run::<i32>(source, "f"), 255);
}

#[rstest]
#[case("u8", "255", "i64", 255)]
#[case("i8", "255", "i64", -1)]
#[case("i16", "65535", "u64", 65535)]
#[case("i32", "4294967295", "i64", -1)]
#[case("u32", "4294967295", "i64", 4294967295)]
#[case("u16", "7", "u32", 7)]
fn test_widening_assignment(
    #[case] source_type: &str,
    #[case] value: &str,
    #[case] target_type: &str,
    #[case] expected: i64,
) {
    let source = format!(
        "fn f() -> {target_type} () {{\n    y -> {source_type} = {value};\n    x -> {target_type};\n    x = y;\n    return x;\n}}"
    );

    let result = match target_type {
        "u32" => run::<u32>(&source, "f") as i64,
        _ => run::<i64>(&source, "f"),
    };
    assert_eq!(result, expected);
}

#[test]
fn test_narrowing_assignment() {
    let source = "fn f() -> u8 () {\n    y -> i64 = 300;\n    x -> u8;\n    x = y;\n    return x;\n}";
    assert_eq!(run::<u8>(source, "f"), 44);
}

#[test]
fn test_returned_literal_takes_return_type() {
    let source = "fn f() -> u16 () {\n    return 70000;\n}";
    assert_eq!(run::<u16>(source, "f"), 4464);
}

#[rstest]
#[case("i8", "200", -56)]
#[case("u8", "300", 44)]
#[case("i16", "40000", -25536)]
#[case("u16", "70000", 4464)]
#[case("i32", "3000000000", -1294967296)]
#[case("u32", "4294967298", 2)]
#[case("i64", "18446744073709551615", -1)]
#[case("u64", "18446744073709551615", 18446744073709551615)]
fn test_declared_value_wraps_to_width(
    #[case] ty: &str,
    #[case] value: &str,
    #[case] expected: i128,
    #[values(true, false)] global: bool,
) {
    let source = if global {
        format!("x -> {ty} = {value};\nfn f() -> {ty} () {{\n    return x;\n}}")
    } else {
        format!("fn f() -> {ty} () {{\n    x -> {ty} = {value};\n    return x;\n}}")
    };

    let result = match ty {
        "i8" => run::<i8>(&source, "f") as i128,
        "u8" => run::<u8>(&source, "f") as i128,
        "i16" => run::<i16>(&source, "f") as i128,
        "u16" => run::<u16>(&source, "f") as i128,
        "i32" => run::<i32>(&source, "f") as i128,
        "u32" => run::<u32>(&source, "f") as i128,
        "i64" => run::<i64>(&source, "f") as i128,
        _ => run::<u64>(&source, "f") as i128,
    };
    assert_eq!(result, expected);
}

#[test]
fn test_literal_left_operand_takes_destination_width() {
    let source = "fn f() -> i64 () {\n    x -> i64 = 8589934592;\n    z -> i64;\n    z = 1 + x;\n    return z;\n}";
    assert_eq!(run::<i64>(source, "f"), 8589934593);
}

#[rstest]
#[case("2 + 3 * 4", 14)]
#[case("(2 + 3) * 4", 20)]
#[case("20 - 5 - 3", 12)]
#[case("20 / 4 / 5", 1)]
#[case("a * b - a", 12)]
fn test_arithmetic(#[case] expression: &str, #[case] expected: i32) {
    let source = format!(
        "fn f() -> i32 () {{\n    a -> i32 = 3;\n    b -> i32 = 5;\n    c -> i32;\n    c = {expression};\n    return c;\n}}"
    );
    assert_eq!(run::<i32>(&source, "f"), expected);
}

#[test]
fn test_signed_and_unsigned_division() {
    let signed = "fn f() -> i32 () {\n    a -> i32 = 0;\n    b -> i32 = 2;\n    c -> i32;\n    a = a - 8;\n    c = a / b;\n    return c;\n}";
    assert_eq!(run::<i32>(signed, "f"), -4);

    let unsigned = "fn f() -> u32 () {\n    a -> u32 = 0;\n    b -> u32 = 2;\n    c -> u32;\n    a = a - 8;\n    c = a / b;\n    return c;\n}";
    assert_eq!(run::<u32>(unsigned, "f"), 2147483644);
}

#[test]
fn test_literal_dividend_follows_destination() {
    let source = "fn f() -> u32 () {\n    b -> u32 = 2;\n    c -> u32;\n    c = 4294967294 / b;\n    return c;\n}";
    assert_eq!(run::<u32>(source, "f"), 2147483647);
}

#[rstest]
#[case("i32", "3", "7", "<", 1)]
#[case("i32", "3", "7", ">", 0)]
#[case("i32", "7", "7", "==", 1)]
#[case("u8", "200", "100", ">", 1)]
#[case("i8", "200", "100", ">", 0)]
fn test_comparisons(
    #[case] ty: &str,
    #[case] left: &str,
    #[case] right: &str,
    #[case] operator: &str,
    #[case] expected: u8,
) {
    let source = format!(
        "fn f() -> u8 () {{\n    a -> {ty} = {left};\n    b -> {ty} = {right};\n    c -> u8;\n    c = a {operator} b;\n    return c;\n}}"
    );
    assert_eq!(run::<u8>(&source, "f"), expected);
}

#[test]
fn test_function_calls() {
    let source = "fn add(a, b) -> i32 (i32, i32) {\n    c -> i32;\n    c = a + b;\n    return c;\n}\nfn main() -> i32 () {\n    r -> i32;\n    r = add(2, 40);\n    return r;\n}";
    assert_eq!(run::<i32>(source, "main"), 42);
}

#[test]
fn test_call_inside_expression() {
    let source = "fn seven() -> i64 () {\n    return 7;\n}\nfn main() -> i64 () {\n    x -> i64 = 3;\n    x = seven() * x + 1;\n    return x;\n}";
    assert_eq!(run::<i64>(source, "main"), 22);
}

#[test]
fn test_arguments_convert_to_parameter_types() {
    let source = "fn widen(a) -> i64 (i64) {\n    return a;\n}\nfn main() -> i64 () {\n    x -> i8 = 255;\n    r -> i64;\n    r = widen(x);\n    return r;\n}";
    assert_eq!(run::<i64>(source, "main"), -1);
}

#[test]
fn test_dollar_named_user_function() {
    let source = "fn $foo() -> i32 () {\n    return 7;\n}\nfn g() -> i32 () {\n    r -> i32;\n    r = $foo();\n    return r;\n}";
    assert_eq!(run::<i32>(source, "g"), 7);
}

#[test]
fn test_globals_persist_across_calls() {
    let source = "counter -> i32 = 3;\nfn bump() -> () {\n    counter = counter + 1;\n}\nfn main() -> i32 () {\n    bump();\n    bump();\n    return counter;\n}";
    assert_eq!(run::<i32>(source, "main"), 5);
}

#[test]
fn test_nested_block_shadowing() {
    let source = "fn f() -> i32 () {\n    x -> i32 = 1;\n    {\n        x -> i32 = 10;\n        x = x + 5;\n    }\n    x = x + 1;\n    return x;\n}";
    assert_eq!(run::<i32>(source, "f"), 2);
}

#[test]
fn test_nested_block_writes_outer_variable() {
    let source = "fn f() -> i32 () {\n    x -> i32 = 1;\n    {\n        y -> i32 = 10;\n        x = y + x;\n    }\n    return x;\n}";
    assert_eq!(run::<i32>(source, "f"), 11);
}

#[test]
fn test_display_emits_printf_call() {
    let context = Context::create();
    let source = "fn main() -> () {\n    x -> i32 = 4;\n    $display(x);\n}";
    let ir = compile(source.to_string(), "test.du", &context)
        .unwrap()
        .print_ir();

    assert!(ir.contains("@printf("), "{}", ir);
    assert!(ir.contains("%d\\0A"), "{}", ir);
}

#[rstest]
#[case("fn f() -> i32 () {\n    return y;\n}", ErrorKind::UndeclaredIdentifier)]
#[case("fn f() -> () {\n    g();\n}", ErrorKind::UndeclaredIdentifier)]
#[case("fn f() -> () {\n    x -> i32;\n    x = y + 1;\n}", ErrorKind::UndeclaredIdentifier)]
#[case("fn f() -> () {\n    x -> i32;\n    x = y;\n}", ErrorKind::UndeclaredIdentifier)]
#[case("fn g(a) -> () (i32) {\n}\nfn f() -> () {\n    g(y);\n}", ErrorKind::UndeclaredIdentifier)]
#[case("fn $foo() -> () {\n}\nfn f() -> () {\n    $foo(1);\n}", ErrorKind::Structural)]
#[case("fn f() -> () {\n    fn g() -> () {\n    }\n}", ErrorKind::NestedFunction)]
#[case("fn f() -> i32 () {\n    x -> u8;\n    return x;\n}", ErrorKind::TypeMismatch)]
#[case("fn f() -> i32 () {\n}", ErrorKind::Structural)]
#[case("fn f() -> i32 () {\n    return 1\n}", ErrorKind::Syntax)]
#[case("x -> i32 = 1;\nx = 2;", ErrorKind::NestedFunction)]
fn test_compile_errors(#[case] source: &str, #[case] expected: ErrorKind) {
    assert_eq!(compile_error_kind(source), expected);
}
