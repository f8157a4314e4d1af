//! For-loop parsing.
use super::{
    block::{classify, Block, Stmt},
    call::ParsedCall,
    expr::Comparison,
    var::ParsedVariable,
    Ctx, Parse,
};
use crate::{
    error::{CompileError, CompileResult},
    inst::Inst,
    token_stream::TokenStream,
    tokens::{KeywordKind, TokenKind},
    types::InstructionKind,
};

/// A compiled `for (<init>; <cond>; <step>) { <body> }`.
///
/// Init runs once before the loop-top mark; the condition guards a
/// jump past the body; the step runs after the body, followed by the
/// jump back to the top.
#[derive(Debug)]
pub struct ParsedLoop {
    pub init: Box<Stmt>,
    pub condition: Comparison,
    pub step: Box<Stmt>,
    pub body: Block,
    pub instructions: Vec<Inst>,
}

impl Parse for ParsedLoop {
    type Output = Self;

    fn parse(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self> {
        use InstructionKind as I;
        use TokenKind as T;

        input.consume(T::Keyword(KeywordKind::For))?;
        input.consume(T::LeftParen)?;

        let init = match classify(input)? {
            I::Variable => Stmt::Variable(ParsedVariable::parse_declaration(input, ctx)?),
            I::Assignment => Stmt::Assignment(ParsedVariable::parse_assignment(input, ctx)?),
            _ => {
                return Err(unsupported_clause(
                    input,
                    "loop init must be a declaration or assignment",
                ))
            }
        };
        input.consume(T::Semicolon)?;

        let condition = Comparison::parse(input, ctx)?;
        input.consume(T::Semicolon)?;

        let step = match classify(input)? {
            I::Assignment => Stmt::Assignment(ParsedVariable::parse_assignment(input, ctx)?),
            I::Call => Stmt::Call(ParsedCall::parse(input, ctx)?),
            _ => {
                return Err(unsupported_clause(
                    input,
                    "loop step must be an assignment or call",
                ))
            }
        };
        input.consume(T::RightParen)?;

        input.consume(T::LeftBrace)?;
        let body = Block::parse(input, ctx)?;
        input.consume(T::RightBrace)?;

        let top = ctx.labels.next_label();
        let exit = ctx.labels.next_label();

        let mut instructions = vec![];
        instructions.extend(init.instructions().iter().cloned());
        instructions.push(Inst::Label(top));
        condition.emit(&mut instructions);
        instructions.push(Inst::Tjmp(exit));
        body.emit(&mut instructions);
        instructions.extend(step.instructions().iter().cloned());
        instructions.push(Inst::Jmp(top));
        instructions.push(Inst::Label(exit));

        Ok(ParsedLoop {
            init: Box::new(init),
            condition,
            step: Box::new(step),
            body,
            instructions,
        })
    }
}

fn unsupported_clause(input: &mut TokenStream, reason: &'static str) -> CompileError {
    let token = input.peek().ok().cloned();
    input.reset_peek();

    let (fragment, offset) = match token {
        Some(token) => (
            input
                .fragment_span(&token.span)
                .unwrap_or_default()
                .to_string(),
            token.span.index as usize,
        ),
        None => (String::new(), 0),
    };
    CompileError::MalformedExpression {
        fragment,
        offset,
        reason,
    }
}
