//! Function parsing.
use super::{block::Block, Ctx, Parse};
use crate::{
    error::{CompileError, CompileResult},
    extract::RawFunction,
    inst::{Inst, Labels},
    symbol::{FunctionTable, Locals},
    token_stream::TokenStream,
    tokens::{Span, TokenKind},
    types::DataType,
};

use itertools::Itertools;
use smol_str::SmolStr;

/// The durable, compiled unit of the program.
///
/// Built from a [`RawFunction`] and stored into the function table;
/// immutable from then on within the compile run.
#[derive(Debug, Clone)]
pub struct ParsedFunction {
    pub label: SmolStr,
    /// Ordered parameter pairs, type and label.
    pub params: Vec<(DataType, SmolStr)>,
    pub return_type: DataType,
    /// The function's final instruction sequence, ending in `ret`.
    pub instructions: Vec<Inst>,
}

impl ParsedFunction {
    /// Compile a raw function record against the functions parsed
    /// before it.
    pub fn parse(
        raw: &RawFunction,
        functions: &FunctionTable,
        labels: &mut Labels,
    ) -> CompileResult<Self> {
        let label = SmolStr::new(raw.label.trim());
        if !is_identifier(&label) {
            return Err(CompileError::MalformedExpression {
                fragment: raw.label.trim().to_string(),
                offset: raw.label_span.index as usize,
                reason: "function label is not a valid identifier",
            });
        }

        // A function's declared return type must resolve.
        if raw.return_type == DataType::Invalid {
            return Err(CompileError::UnknownType {
                keyword: raw.return_keyword.trim().to_string(),
                offset: raw.return_span.index as usize,
            });
        }

        let mut locals = Locals::default();
        let params = parse_params(raw, &mut locals)?;

        let mut ctx = Ctx {
            locals: &mut locals,
            functions,
            labels,
        };
        let mut stream = TokenStream::over(raw.source, raw.body_span);
        let body = Block::parse(&mut stream, &mut ctx)?;

        let mut instructions = vec![];
        body.emit(&mut instructions);
        instructions.push(Inst::Ret);

        Ok(ParsedFunction {
            label,
            params,
            return_type: raw.return_type,
            instructions,
        })
    }

    /// Compile a bare statement sequence as the body of a synthetic
    /// function. The unit declares no return type, so it carries the
    /// transient `Invalid`.
    pub(crate) fn parse_bare(
        label: &str,
        source: &str,
        functions: &FunctionTable,
        labels: &mut Labels,
    ) -> CompileResult<Self> {
        let mut locals = Locals::default();
        let mut ctx = Ctx {
            locals: &mut locals,
            functions,
            labels,
        };

        let window = Span::new(0, source.len() as u32);
        let mut stream = TokenStream::over(source, window);
        let body = Block::parse(&mut stream, &mut ctx)?;

        let mut instructions = vec![];
        body.emit(&mut instructions);
        instructions.push(Inst::Ret);

        Ok(ParsedFunction {
            label: SmolStr::new(label),
            params: vec![],
            return_type: DataType::Invalid,
            instructions,
        })
    }

    /// The instruction sequence in its textual form, one mnemonic
    /// per line.
    pub fn listing(&self) -> String {
        crate::inst::listing(&self.instructions)
    }
}

/// Renders the function as a labelled section of the program listing.
impl std::fmt::Display for ParsedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, ".{}", self.label)?;
        write!(f, "{}", self.instructions.iter().join("\n"))
    }
}

/// Parse the raw parameter list, registering each parameter as a
/// declared variable of the function scope.
fn parse_params(raw: &RawFunction, locals: &mut Locals) -> CompileResult<Vec<(DataType, SmolStr)>> {
    use TokenKind as T;

    let mut params = vec![];
    let mut stream = TokenStream::over(raw.source, raw.params_span);

    if stream.match_token(T::EOS) {
        return Ok(params);
    }

    loop {
        let type_token = stream.peek()?.clone();
        stream.reset_peek();
        let data_type = match type_token.kind {
            T::Keyword(keyword) => DataType::from_keyword(keyword),
            _ => DataType::Invalid,
        };
        // Parameters have no initializer to infer from, so `determine`
        // cannot be used here either.
        if data_type == DataType::Invalid || data_type == DataType::Determine {
            return Err(CompileError::UnknownType {
                keyword: stream.token_fragment(&type_token).to_string(),
                offset: type_token.span.index as usize,
            });
        }
        stream.consume(type_token.kind)?;

        let name_token = stream.consume(T::Ident)?;
        let name = stream.token_fragment(&name_token);
        if locals.contains_var(&name) {
            return Err(CompileError::DuplicateVariable {
                label: name,
                offset: name_token.span.index as usize,
            });
        }
        locals.add_var(&name, data_type);
        params.push((data_type, name));

        if stream.match_token(T::Comma) {
            continue;
        }
        stream.consume(T::EOS)?;
        break;
    }

    Ok(params)
}

fn is_identifier(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some('_' | 'a'..='z' | 'A'..='Z') => {}
        _ => return false,
    }
    chars.all(|c| matches!(c, '_' | 'a'..='z' | 'A'..='Z' | '0'..='9'))
}
