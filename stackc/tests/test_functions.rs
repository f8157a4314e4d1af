//! Whole-pipeline tests over function definitions.
use stackc::{compile_str, error::CompileError, extract::FunctionExtractor, types::DataType, Compiler};

const SOURCE: &str = include_str!("../programs/counter.stk");

#[test]
fn test_compile_program() {
    let program = compile_str(SOURCE).unwrap();

    assert_eq!(program.functions().len(), 2);

    let bump = program.get("bump").unwrap();
    assert_eq!(bump.params, vec![(DataType::Qword, "amount".into())]);
    assert_eq!(bump.return_type, DataType::Qword);
    assert_eq!(bump.instructions.last().map(ToString::to_string), Some("ret".into()));

    let main = program.get("main").unwrap();
    let listing = main.listing();
    assert!(listing.contains("tjmp"));
    assert!(listing.lines().any(|line| line.starts_with("jmp ")));
    // The call site inlines bump, so its store is reachable there.
    assert!(listing.contains("pop total"));
}

#[test]
fn test_wrapped_declaration_pushes_value() {
    let program = compile_str("function f() returns qword { qword x = 5; }").unwrap();
    assert!(program.listing().contains("push 5"));
}

#[test]
fn test_functions_listed_in_source_order() {
    let program = compile_str(SOURCE).unwrap();
    let listing = program.listing();

    let bump = listing.find(".bump").unwrap();
    let main = listing.find(".main").unwrap();
    assert!(bump < main);
}

#[test]
fn test_extract_round_trip() {
    let raw = FunctionExtractor::new(SOURCE)
        .next_function()
        .unwrap()
        .unwrap();

    let normalize = |s: &str| s.split_whitespace().collect::<String>();
    let original = raw.span.fragment(SOURCE);
    assert_eq!(normalize(&raw.to_string()), normalize(original));
}

#[test]
fn test_duplicate_function_label_in_source() {
    let source = "function f() returns byte {} function f() returns byte {}";
    assert!(matches!(
        compile_str(source),
        Err(CompileError::DuplicateFunctionLabel { label, .. }) if label == "f"
    ));
}

#[test]
fn test_forward_reference_rejected() {
    let source = "
        function caller() returns byte { callee(); }
        function callee() returns byte {}
    ";
    assert!(matches!(
        compile_str(source),
        Err(CompileError::UndefinedFunction { label, .. }) if label == "callee"
    ));
}

#[test]
fn test_backward_reference_inlines_callee() {
    let source = "
        function one() returns qword { qword x = 1; }
        function two() returns qword { one(); }
    ";
    let program = compile_str(source).unwrap();
    let two = program.get("two").unwrap();
    assert!(two.listing().contains("push 1"));
}

#[test]
fn test_functions_persist_on_the_same_compiler() {
    let mut compiler = Compiler::new();
    compiler
        .compile("function one() returns qword { qword x = 1; }")
        .unwrap();
    assert!(compiler.functions().contains_function("one"));

    // A later compile on the same context can call it.
    let program = compiler.compile("one();").unwrap();
    assert!(program.listing().contains("push 1"));
}

#[test]
fn test_independent_compilers_do_not_interfere() {
    let mut compiler = Compiler::new();
    compiler
        .compile("function one() returns qword { qword x = 1; }")
        .unwrap();

    assert!(matches!(
        Compiler::new().compile("one();"),
        Err(CompileError::UndefinedFunction { .. })
    ));
}

#[test]
fn test_failed_function_aborts_compile() {
    let source = "
        function good() returns qword { qword x = 1; }
        function bad() returns banana {}
    ";
    assert!(matches!(
        compile_str(source),
        Err(CompileError::UnknownType { .. })
    ));
}

#[test]
fn test_argument_type_checked_against_parameter() {
    let source = "
        function take(bool flag) returns bool {}
        function main() returns bool { take(5); }
    ";
    assert!(matches!(
        compile_str(source),
        Err(CompileError::MalformedExpression { .. })
    ));
}
