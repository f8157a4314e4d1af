//! Variable declarations and assignments.
use super::{expr::parse_operand, Ctx};
use crate::{
    error::{CompileError, CompileResult},
    inst::{Inst, Operand},
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
    types::{DataType, Value},
};

use smol_str::SmolStr;

/// A declared variable, an assignment, or an expression operand.
///
/// `value` is the compile-time value when the initializer folds to a
/// literal, and `None` when it is only known at run time.
#[derive(Debug)]
pub struct ParsedVariable {
    /// Declared name; `None` for anonymous expression operands.
    pub label: Option<SmolStr>,
    pub data_type: DataType,
    pub value: Option<Value>,
    pub instructions: Vec<Inst>,

    /// Offset of the fragment the node was parsed from.
    pub(crate) offset: usize,
}

impl ParsedVariable {
    /// Anonymous operand node; literal values push themselves.
    pub(crate) fn operand(data_type: DataType, value: Option<Value>, token: &Token) -> Self {
        let instructions = match &value {
            Some(value) => vec![Inst::Push(Operand::Lit(value.clone()))],
            None => vec![],
        };
        ParsedVariable {
            label: None,
            data_type,
            value,
            instructions,
            offset: token.span.index as usize,
        }
    }

    /// Parse `<type> <name> = <expr>` and record the variable in the
    /// function scope. The statement's terminating `;` is consumed by
    /// the caller.
    pub(crate) fn parse_declaration(
        input: &mut TokenStream,
        ctx: &mut Ctx,
    ) -> CompileResult<Self> {
        // The classifier already established the leading type keyword.
        let keyword_token = input.peek()?.clone();
        input.reset_peek();
        let declared = match keyword_token.kind {
            TokenKind::Keyword(keyword) => DataType::from_keyword(keyword),
            _ => DataType::Invalid,
        };
        if declared == DataType::Invalid {
            return Err(CompileError::UnknownType {
                keyword: input.token_fragment(&keyword_token).to_string(),
                offset: keyword_token.span.index as usize,
            });
        }
        input.consume(keyword_token.kind)?;

        let name_token = input.consume(TokenKind::Ident)?;
        let name = input.token_fragment(&name_token);
        if ctx.locals.contains_var(&name) {
            return Err(CompileError::DuplicateVariable {
                label: name,
                offset: name_token.span.index as usize,
            });
        }

        input.consume(TokenKind::Eq)?;

        let initializer = parse_operand(input, ctx, declared)?;

        // With `determine` the initializer decides the type.
        let data_type = match declared {
            DataType::Determine => initializer.data_type,
            declared => declared,
        };
        ctx.locals.add_var(&name, data_type);

        Ok(ParsedVariable {
            label: Some(name),
            data_type,
            value: initializer.value,
            instructions: initializer.instructions,
            offset: keyword_token.span.index as usize,
        })
    }

    /// Parse `<name> = <expr>` for an already declared variable.
    /// Emits the value followed by a store into the named slot.
    pub(crate) fn parse_assignment(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self> {
        let name_token = input.consume(TokenKind::Ident)?;
        let name = input.token_fragment(&name_token);
        let data_type =
            ctx.locals
                .get_var(&name)
                .ok_or_else(|| CompileError::MalformedExpression {
                    fragment: name.to_string(),
                    offset: name_token.span.index as usize,
                    reason: "assignment to an undeclared variable",
                })?;

        input.consume(TokenKind::Eq)?;

        let value = parse_operand(input, ctx, data_type)?;

        let mut instructions = value.instructions;
        instructions.push(Inst::Pop(name.clone()));

        Ok(ParsedVariable {
            label: Some(name),
            data_type,
            value: value.value,
            instructions,
            offset: name_token.span.index as usize,
        })
    }
}
