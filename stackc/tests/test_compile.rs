//! Whole-pipeline tests over bare statement sources.
use smol_str::SmolStr;
use stackc::{
    compile_str,
    error::CompileError,
    inst::Inst,
    parsing::ParsedFunction,
    types::DataType,
    Compiler,
};

#[test]
fn test_compile_variable_declaration() {
    let program = compile_str("qword x = 5;").unwrap();
    assert!(program.listing().contains("push 5"));
}

#[test]
fn test_compile_if_generates_tjmp() {
    let program = compile_str("if (5 == 5) { qword x = 1; }").unwrap();
    assert!(program.listing().contains("tjmp"));
}

#[test]
fn test_compile_loop_jumps_back() {
    let program = compile_str("for (qword i = 0; i < 3; i = i + 1) { qword x = 1; }").unwrap();
    let listing = program.listing();
    assert!(listing.contains("tjmp"));
    assert!(listing.lines().any(|line| line.starts_with("jmp ")));
}

#[test]
fn test_bare_source_compiles_as_main() {
    let program = compile_str("qword x = 5;").unwrap();
    assert_eq!(program.functions().len(), 1);
    assert_eq!(program.functions()[0].label, "main");
    assert!(program.listing().starts_with(".main"));
}

#[test]
fn test_registered_function_call_reaches_ret() {
    let mut compiler = Compiler::new();
    compiler
        .register(ParsedFunction {
            label: SmolStr::new("foo"),
            params: vec![(DataType::Qword, SmolStr::new("p"))],
            return_type: DataType::Qword,
            instructions: vec![Inst::Ret],
        })
        .unwrap();

    let program = compiler.compile("foo(1);").unwrap();
    let listing = program.listing();

    // The argument push is followed by the inlined callee, so its
    // `ret` is reachable from the call site.
    let call_site = listing.find("push 1").unwrap();
    assert!(listing[call_site..].contains("ret"));
}

#[test]
fn test_undefined_function_is_hard_error() {
    let result = compile_str("foo(1);");
    assert!(matches!(
        result,
        Err(CompileError::UndefinedFunction { label, .. }) if label == "foo"
    ));
}

#[test]
fn test_register_duplicate_label() {
    let function = ParsedFunction {
        label: SmolStr::new("foo"),
        params: vec![],
        return_type: DataType::Qword,
        instructions: vec![Inst::Ret],
    };

    let mut compiler = Compiler::new();
    compiler.register(function.clone()).unwrap();
    assert!(matches!(
        compiler.register(function),
        Err(CompileError::DuplicateFunctionLabel { .. })
    ));
}

#[test]
fn test_call_arity_checked() {
    let mut compiler = Compiler::new();
    compiler
        .register(ParsedFunction {
            label: SmolStr::new("foo"),
            params: vec![(DataType::Qword, SmolStr::new("p"))],
            return_type: DataType::Qword,
            instructions: vec![Inst::Ret],
        })
        .unwrap();

    assert!(matches!(
        compiler.compile("foo(1, 2);"),
        Err(CompileError::CallArity { expected: 1, encountered: 2, .. })
    ));
    assert!(matches!(
        compiler.compile("foo();"),
        Err(CompileError::CallArity { expected: 1, encountered: 0, .. })
    ));
}

#[test]
fn test_determine_infers_from_initializer() {
    let program = compile_str("determine x = 42; determine s = \"vm\"; determine b = true;").unwrap();
    let listing = program.listing();
    assert!(listing.contains("push 42"));
    assert!(listing.contains("push \"vm\""));
    assert!(listing.contains("push true"));
}

#[test]
fn test_constant_initializer_folds() {
    let program = compile_str("qword x = 2 + 3;").unwrap();
    assert!(program.listing().contains("push 5"));
}

#[test]
fn test_empty_source_is_empty_program() {
    let program = compile_str("").unwrap();
    assert!(program.is_empty());
    assert_eq!(program.listing(), "");
}
