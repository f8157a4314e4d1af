//! Expression operands.
//!
//! An operand is a literal, a declared variable, or a left-associative
//! chain of binary arithmetic on those. Chains made entirely of
//! constants are folded at compile time, so `2 + 3` compiles to a
//! single `push 5`.
use super::{var::ParsedVariable, Ctx};
use crate::{
    error::{CompileError, CompileResult},
    inst::{BinOp, CmpOp, Inst, Operand},
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
    types::{DataType, Value},
};

/// Parse an expression operand.
///
/// `target` is the type the operand must produce. Pass
/// [`DataType::Determine`] to infer the type from the operand itself:
/// numeric literals infer `qword`, quoted literals `string`,
/// `true`/`false` `bool`, and identifiers the referenced variable's
/// type.
pub(crate) fn parse_operand(
    input: &mut TokenStream,
    ctx: &mut Ctx,
    target: DataType,
) -> CompileResult<ParsedVariable> {
    let mut lhs = parse_term(input, ctx, target)?;

    while let Some(op) = peek_binop(input)? {
        input.next_token();

        if !lhs.data_type.is_numeric() {
            return Err(CompileError::MalformedExpression {
                fragment: lhs.data_type.to_string(),
                offset: lhs.offset,
                reason: "arithmetic requires numeric operands",
            });
        }

        let rhs = parse_term(input, ctx, lhs.data_type)?;

        let constants = (
            lhs.value.as_ref().and_then(Value::as_u64),
            rhs.value.as_ref().and_then(Value::as_u64),
        );
        match constants {
            // Both sides are compile-time constants; fold.
            (Some(a), Some(b)) => {
                let folded = op.apply(a, b).ok_or_else(|| CompileError::MalformedExpression {
                    fragment: format!("{} {}", a, b),
                    offset: rhs.offset,
                    reason: "constant arithmetic overflows or divides by zero",
                })?;
                let value = Value::from_u64(lhs.data_type, folded).ok_or_else(|| {
                    CompileError::MalformedExpression {
                        fragment: folded.to_string(),
                        offset: rhs.offset,
                        reason: "constant result does not fit the operand type",
                    }
                })?;
                lhs.instructions = vec![Inst::Push(Operand::Lit(value.clone()))];
                lhs.value = Some(value);
            }
            // At least one side is only known at run time; emit the
            // operator and give up on a compile-time value.
            _ => {
                lhs.instructions.extend(rhs.instructions);
                lhs.instructions.push(Inst::Binary(op));
                lhs.value = None;
            }
        }
    }

    Ok(lhs)
}

/// A single term: literal or declared variable.
fn parse_term(
    input: &mut TokenStream,
    ctx: &mut Ctx,
    target: DataType,
) -> CompileResult<ParsedVariable> {
    use KeywordKind as K;
    use TokenKind as T;

    let kind = input.peek_kind()?;
    match kind {
        T::Number => {
            let token = input.consume(T::Number)?;
            let value = parse_number(input, &token, target)?;
            Ok(ParsedVariable::operand(value.data_type(), Some(value), &token))
        }
        T::Str => {
            let token = input.consume(T::Str)?;
            check_target(target, DataType::String, input, &token)?;
            let fragment = input.token_fragment(&token);
            // Strip the quotes off the span's fragment.
            let payload = fragment.as_str()[1..fragment.len() - 1].to_owned();
            Ok(ParsedVariable::operand(
                DataType::String,
                Some(Value::Str(payload)),
                &token,
            ))
        }
        T::Keyword(keyword @ (K::True | K::False)) => {
            let token = input.consume(kind)?;
            check_target(target, DataType::Bool, input, &token)?;
            let value = Value::Bool(keyword == K::True);
            Ok(ParsedVariable::operand(DataType::Bool, Some(value), &token))
        }
        T::Ident => {
            let token = input.consume(T::Ident)?;
            let name = input.token_fragment(&token);
            let data_type =
                ctx.locals
                    .get_var(&name)
                    .ok_or_else(|| CompileError::MalformedExpression {
                        fragment: name.to_string(),
                        offset: token.span.index as usize,
                        reason: "not a known variable",
                    })?;
            check_target(target, data_type, input, &token)?;

            let mut operand = ParsedVariable::operand(data_type, None, &token);
            operand.instructions = vec![Inst::Push(Operand::Var(name))];
            Ok(operand)
        }
        _ => {
            let token = input.peek()?.clone();
            input.reset_peek();
            Err(CompileError::MalformedExpression {
                fragment: input.token_fragment(&token).to_string(),
                offset: token.span.index as usize,
                reason: "expected a literal or variable",
            })
        }
    }
}

/// Parse a numeric literal token, narrowed to the target type.
fn parse_number(input: &TokenStream, token: &Token, target: DataType) -> CompileResult<Value> {
    let fragment = input.token_fragment(token);
    let number: u64 = fragment
        .parse()
        .map_err(|_| CompileError::MalformedExpression {
            fragment: fragment.to_string(),
            offset: token.span.index as usize,
            reason: "numeric literal out of range",
        })?;

    // `determine` infers the widest numeric type.
    let target = match target {
        DataType::Determine => DataType::Qword,
        other => other,
    };

    Value::from_u64(target, number).ok_or_else(|| CompileError::MalformedExpression {
        fragment: fragment.to_string(),
        offset: token.span.index as usize,
        reason: "value does not fit the declared type",
    })
}

fn check_target(
    target: DataType,
    found: DataType,
    input: &TokenStream,
    token: &Token,
) -> CompileResult<()> {
    if target == DataType::Determine || target == found {
        Ok(())
    } else {
        Err(CompileError::MalformedExpression {
            fragment: input.token_fragment(token).to_string(),
            offset: token.span.index as usize,
            reason: "operand type does not match",
        })
    }
}

fn peek_binop(input: &mut TokenStream) -> CompileResult<Option<BinOp>> {
    let kind = input.peek_kind()?;
    Ok(BinOp::from_token(kind))
}

/// Comparison between two operands, the condition form shared by
/// `if` statements and `for` loops.
#[derive(Debug)]
pub struct Comparison {
    pub operator: CmpOp,
    pub operands: (ParsedVariable, ParsedVariable),
}

impl Comparison {
    pub(crate) fn parse(input: &mut TokenStream, ctx: &mut Ctx) -> CompileResult<Self> {
        let left = parse_operand(input, ctx, DataType::Determine)?;

        let token = input.peek()?.clone();
        input.reset_peek();
        let operator =
            CmpOp::from_token(token.kind).ok_or_else(|| CompileError::MalformedExpression {
                fragment: input.token_fragment(&token).to_string(),
                offset: token.span.index as usize,
                reason: "expected a comparison operator",
            })?;
        input.consume(token.kind)?;

        // The right operand must produce the left operand's type.
        let right = parse_operand(input, ctx, left.data_type)?;

        Ok(Comparison {
            operator,
            operands: (left, right),
        })
    }

    /// Evaluate left, then right, then compare.
    pub(crate) fn emit(&self, code: &mut Vec<Inst>) {
        code.extend(self.operands.0.instructions.iter().cloned());
        code.extend(self.operands.1.instructions.iter().cloned());
        code.push(Inst::Cmp(self.operator));
    }
}
