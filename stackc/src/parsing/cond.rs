//! If-statement parsing.
use super::{block::Block, expr::Comparison, Ctx, Parse};
use crate::{
    error::CompileResult,
    inst::Inst,
    token_stream::TokenStream,
    tokens::{KeywordKind, TokenKind},
};

/// A compiled `if (<left> <op> <right>) { <body> }`.
///
/// The generated fragment evaluates the left operand, then the right,
/// compares, and jumps over the body when the condition is false.
#[derive(Debug)]
pub struct ParsedIf {
    pub condition: Comparison,
    pub body: Block,
    pub instructions: Vec<Inst>,
}

impl Parse for ParsedIf {
    type Output = Self;

    fn parse(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self> {
        use TokenKind as T;

        input.consume(T::Keyword(KeywordKind::If))?;
        input.consume(T::LeftParen)?;
        let condition = Comparison::parse(input, ctx)?;
        input.consume(T::RightParen)?;

        input.consume(T::LeftBrace)?;
        let body = Block::parse(input, ctx)?;
        input.consume(T::RightBrace)?;

        let exit = ctx.labels.next_label();

        let mut instructions = vec![];
        condition.emit(&mut instructions);
        instructions.push(Inst::Tjmp(exit));
        body.emit(&mut instructions);
        instructions.push(Inst::Label(exit));

        Ok(ParsedIf {
            condition,
            body,
            instructions,
        })
    }
}
