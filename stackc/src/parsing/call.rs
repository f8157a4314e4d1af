//! Call parsing.
use super::{expr::parse_operand, var::ParsedVariable, Ctx, Parse};
use crate::{
    error::{CompileError, CompileResult},
    inst::Inst,
    token_stream::TokenStream,
    tokens::TokenKind,
    types::DataType,
};

use smol_str::SmolStr;

/// A compiled `<name>(<args>)`.
///
/// Arguments are pushed left to right, then the callee's compiled
/// instruction sequence is inlined at the call site. Only functions
/// already in the table resolve; an unknown label is a hard error.
#[derive(Debug)]
pub struct ParsedCall {
    pub label: SmolStr,
    pub arguments: Vec<ParsedVariable>,
    pub instructions: Vec<Inst>,
}

impl Parse for ParsedCall {
    type Output = Self;

    fn parse(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self> {
        use TokenKind as T;

        let name_token = input.consume(T::Ident)?;
        let label = input.token_fragment(&name_token);
        let offset = name_token.span.index as usize;

        let functions = ctx.functions;
        let callee = functions
            .get_function(&label)
            .ok_or_else(|| CompileError::UndefinedFunction {
                label: label.clone(),
                offset,
            })?;

        input.consume(T::LeftParen)?;

        let mut arguments = vec![];
        if !input.match_token(T::RightParen) {
            loop {
                // Parse each argument against the parameter it binds
                // to; surplus arguments parse freely and fail arity.
                let target = callee
                    .params
                    .get(arguments.len())
                    .map(|(data_type, _)| *data_type)
                    .unwrap_or(DataType::Determine);
                arguments.push(parse_operand(input, ctx, target)?);

                if input.match_token(T::Comma) {
                    continue;
                }
                input.consume(T::RightParen)?;
                break;
            }
        }

        if arguments.len() != callee.params.len() {
            return Err(CompileError::CallArity {
                label,
                expected: callee.params.len(),
                encountered: arguments.len(),
                offset,
            });
        }

        let mut instructions = vec![];
        for argument in &arguments {
            instructions.extend(argument.instructions.iter().cloned());
        }
        instructions.extend(callee.instructions.iter().cloned());

        Ok(ParsedCall {
            label,
            arguments,
            instructions,
        })
    }
}
