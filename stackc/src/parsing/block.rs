//! Statement classification and body parsing.
use super::{
    call::ParsedCall, cond::ParsedIf, loops::ParsedLoop, var::ParsedVariable, Ctx, Parse,
};
use crate::{
    error::{CompileError, CompileResult},
    inst::Inst,
    token_stream::{TokenError, TokenStream},
    tokens::{KeywordKind, TokenKind},
    types::InstructionKind,
};

/// A parsed body statement with its generated instruction fragment.
#[derive(Debug)]
pub enum Stmt {
    Variable(ParsedVariable),
    Assignment(ParsedVariable),
    If(ParsedIf),
    Loop(ParsedLoop),
    Call(ParsedCall),
}

impl Stmt {
    #[rustfmt::skip]
    pub fn kind(&self) -> InstructionKind {
        match self {
            Stmt::Variable(_)   => InstructionKind::Variable,
            Stmt::Assignment(_) => InstructionKind::Assignment,
            Stmt::If(_)         => InstructionKind::If,
            Stmt::Loop(_)       => InstructionKind::Loop,
            Stmt::Call(_)       => InstructionKind::Call,
        }
    }

    #[rustfmt::skip]
    pub fn instructions(&self) -> &[Inst] {
        match self {
            Stmt::Variable(stmt)   => &stmt.instructions,
            Stmt::Assignment(stmt) => &stmt.instructions,
            Stmt::If(stmt)         => &stmt.instructions,
            Stmt::Loop(stmt)       => &stmt.instructions,
            Stmt::Call(stmt)       => &stmt.instructions,
        }
    }
}

/// Decide which statement kind begins at the current scan position.
///
/// The first recognized keyword wins: a type keyword classifies a
/// variable declaration; otherwise an identifier followed by `(` is a
/// call and an identifier followed by `=` an assignment. No match is
/// `InstructionKind::Invalid`, which the caller treats as a
/// classification failure.
pub(crate) fn classify(input: &mut TokenStream) -> CompileResult<InstructionKind> {
    use InstructionKind as I;
    use KeywordKind as K;
    use TokenKind as T;

    input.reset_peek();
    let first = match input.peek() {
        Ok(token) => token.kind,
        Err(TokenError::EndOfSource) => {
            input.reset_peek();
            return Ok(I::Invalid);
        }
        Err(err) => return Err(err.into()),
    };

    let kind = match first {
        T::Keyword(keyword) if keyword.is_type() => I::Variable,
        T::Keyword(K::If) => I::If,
        T::Keyword(K::For) => I::Loop,
        T::Keyword(K::Function) => I::Function,
        T::Ident => match input.peek().map(|token| token.kind) {
            Ok(T::LeftParen) => I::Call,
            Ok(T::Eq) => I::Assignment,
            _ => I::Invalid,
        },
        _ => I::Invalid,
    };

    input.reset_peek();
    Ok(kind)
}

/// Sequence of statements inside one pair of braces, or a whole
/// top-level body.
#[derive(Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// Concatenate the statements' fragments in source order.
    pub fn emit(&self, code: &mut Vec<Inst>) {
        for stmt in &self.stmts {
            code.extend(stmt.instructions().iter().cloned());
        }
    }
}

impl Parse for Block {
    type Output = Self;

    /// Parses statements until the enclosing `}` or end of source.
    /// The closing brace is left for the caller to consume.
    fn parse(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self> {
        use InstructionKind as I;
        use TokenKind as T;

        let mut stmts = vec![];

        loop {
            input.reset_peek();

            match input.peek() {
                Ok(token) => match token.kind {
                    T::EOS | T::RightBrace => break,
                    T::Semicolon => {
                        // Empty statement
                        input.consume(T::Semicolon)?;
                        continue;
                    }
                    _ => {}
                },
                Err(TokenError::EndOfSource) => break,
                Err(err) => return Err(err.into()),
            }

            match classify(input)? {
                I::Variable => {
                    stmts.push(Stmt::Variable(ParsedVariable::parse_declaration(input, ctx)?));
                    input.consume(T::Semicolon)?;
                }
                I::Assignment => {
                    stmts.push(Stmt::Assignment(ParsedVariable::parse_assignment(input, ctx)?));
                    input.consume(T::Semicolon)?;
                }
                I::If => stmts.push(Stmt::If(ParsedIf::parse(input, ctx)?)),
                I::Loop => stmts.push(Stmt::Loop(ParsedLoop::parse(input, ctx)?)),
                I::Call => {
                    stmts.push(Stmt::Call(ParsedCall::parse(input, ctx)?));
                    input.consume(T::Semicolon)?;
                }
                I::Function | I::Invalid => {
                    let token = input.peek()?.clone();
                    input.reset_peek();
                    return Err(CompileError::UnclassifiedStatement {
                        fragment: input
                            .fragment_span(&token.span)
                            .unwrap_or_default()
                            .to_string(),
                        offset: token.span.index as usize,
                    });
                }
            }
        }

        Ok(Block { stmts })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        inst::{self, Labels},
        symbol::{FunctionTable, Locals},
        types::DataType,
    };

    fn parse_body(source: &str) -> CompileResult<(Block, Locals)> {
        let mut locals = Locals::default();
        let functions = FunctionTable::default();
        let mut labels = Labels::default();
        let mut ctx = Ctx {
            locals: &mut locals,
            functions: &functions,
            labels: &mut labels,
        };

        let mut stream = TokenStream::new(source);
        let block = Block::parse(&mut stream, &mut ctx)?;
        Ok((block, locals))
    }

    fn body_listing(source: &str) -> String {
        let (block, _) = parse_body(source).expect("body should parse");
        let mut code = vec![];
        block.emit(&mut code);
        inst::listing(&code)
    }

    #[test]
    fn test_declaration_pushes_value() {
        assert_eq!(body_listing("qword x = 5;"), "push 5");
    }

    #[test]
    fn test_declaration_folds_constants() {
        assert_eq!(body_listing("qword x = 2 + 3;"), "push 5");
    }

    #[test]
    fn test_determine_infers_from_literal() {
        let (block, locals) = parse_body("determine x = 42; determine s = \"vm\"; determine b = true;").unwrap();
        assert_eq!(block.stmts.len(), 3);
        assert_eq!(locals.get_var("x"), Some(DataType::Qword));
        assert_eq!(locals.get_var("s"), Some(DataType::String));
        assert_eq!(locals.get_var("b"), Some(DataType::Bool));
    }

    #[test]
    fn test_assignment_stores_slot() {
        assert_eq!(
            body_listing("qword x = 1; x = x + 1;"),
            "push 1\npush x\npush 1\nadd\npop x"
        );
    }

    #[test]
    fn test_if_generates_conditional_jump() {
        let listing = body_listing("if (5 == 5) { qword x = 1; }");
        assert_eq!(listing, "push 5\npush 5\neq\ntjmp L0\npush 1\n.L0");
    }

    #[test]
    fn test_loop_jumps_back_to_top() {
        let listing = body_listing("for (qword i = 0; i < 3; i = i + 1) { qword x = 9; }");
        assert_eq!(
            listing,
            "push 0\n.L0\npush i\npush 3\nlt\ntjmp L1\npush 9\npush i\npush 1\nadd\npop i\njmp L0\n.L1"
        );
    }

    #[test]
    fn test_statement_kinds() {
        let source = "qword x = 1; x = 2; if (x == 2) { } for (qword i = 0; i < 1; i = i + 1) { }";
        let (block, _) = parse_body(source).unwrap();

        let kinds: Vec<_> = block.stmts.iter().map(Stmt::kind).collect();
        assert_eq!(
            kinds,
            vec![
                InstructionKind::Variable,
                InstructionKind::Assignment,
                InstructionKind::If,
                InstructionKind::Loop,
            ]
        );
    }

    #[test]
    fn test_redeclaration_is_error() {
        let result = parse_body("qword x = 1; qword x = 2;");
        assert!(matches!(
            result,
            Err(CompileError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn test_unknown_variable_in_operand() {
        let result = parse_body("qword x = y;");
        assert!(matches!(
            result,
            Err(CompileError::MalformedExpression { .. })
        ));
    }

    #[test]
    fn test_unclassified_statement() {
        let result = parse_body("5 = x;");
        assert!(matches!(
            result,
            Err(CompileError::UnclassifiedStatement { .. })
        ));
    }

    #[test]
    fn test_nested_function_rejected() {
        let result = parse_body("function f() returns byte {}");
        assert!(matches!(
            result,
            Err(CompileError::UnclassifiedStatement { .. })
        ));
    }

    #[test]
    fn test_undefined_call_is_error() {
        let result = parse_body("foo(1);");
        assert!(matches!(
            result,
            Err(CompileError::UndefinedFunction { .. })
        ));
    }

    #[test]
    fn test_byte_overflow_rejected() {
        let result = parse_body("byte b = 300;");
        assert!(matches!(
            result,
            Err(CompileError::MalformedExpression { .. })
        ));
    }
}
