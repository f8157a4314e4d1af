//! Function extraction from raw source text.
//!
//! Recognizes the fragment shape
//! `function <label>(<params>) returns <type> { <body> }` by delimiter
//! scanning and produces an untyped [`RawFunction`] record. The record
//! borrows from the source; it lives only long enough to be handed to
//! the function parser.
use crate::{
    error::{CompileError, CompileResult},
    scan,
    tokens::Span,
    types::DataType,
};

use std::fmt;

const KW_FUNCTION: &str = "function";
const KW_RETURNS: &str = "returns";

/// Unparsed fragments of one function definition.
#[derive(Debug, Clone)]
pub struct RawFunction<'a> {
    pub label: &'a str,
    pub parameters: &'a str,
    pub return_keyword: &'a str,
    pub body: &'a str,
    pub return_type: DataType,

    /// Span of the whole `function … }` fragment.
    pub span: Span,
    pub label_span: Span,
    pub params_span: Span,
    pub return_span: Span,
    pub body_span: Span,

    pub(crate) source: &'a str,
}

/// Re-serializes the fragment the record was extracted from,
/// reproducing it modulo whitespace.
impl<'a> fmt::Display for RawFunction<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "function {}({}) returns {} {{{}}}",
            self.label.trim(),
            self.parameters,
            self.return_keyword.trim(),
            self.body,
        )
    }
}

/// Scans source text for function definitions, one at a time.
///
/// Iteration yields each recognized definition in source order and
/// stops when no further `function` keyword occurs. A keyword with a
/// missing delimiter after it is an extraction failure, never a
/// partially populated record.
pub struct FunctionExtractor<'a> {
    source: &'a str,
    origin: usize,
}

impl<'a> FunctionExtractor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, origin: 0 }
    }

    pub fn next_function(&mut self) -> CompileResult<Option<RawFunction<'a>>> {
        let source = self.source;

        let keyword = match scan::find(source, KW_FUNCTION, self.origin) {
            Some(span) => span,
            None => return Ok(None),
        };

        // The keyword exists, so a `None` from each scan below can only
        // mean the delimiter itself is missing.
        let label = scan::between(source, KW_FUNCTION, '(', self.origin).ok_or(
            CompileError::DelimiterNotFound {
                expected: "(",
                offset: keyword.end() as usize,
            },
        )?;

        let params = scan::between(source, '(', ')', label.inner.index as usize).ok_or(
            CompileError::DelimiterNotFound {
                expected: ")",
                offset: label.end() as usize,
            },
        )?;

        let origin = params.end() as usize;
        let returns =
            scan::find(source, KW_RETURNS, origin).ok_or(CompileError::DelimiterNotFound {
                expected: "returns",
                offset: origin,
            })?;

        let return_type = scan::between(source, KW_RETURNS, '{', origin).ok_or(
            CompileError::DelimiterNotFound {
                expected: "{",
                offset: returns.end() as usize,
            },
        )?;

        // The body runs to the brace matching the opening one; plain
        // between-scanning would stop at the first `}` of a nested
        // `if`/`for` block.
        let body = scan::enclosed(source, '{', '}', return_type.inner.end() as usize).ok_or(
            CompileError::DelimiterNotFound {
                expected: "}",
                offset: return_type.end() as usize,
            },
        )?;

        self.origin = body.end() as usize;

        let span = keyword.merge(&body.outer);
        Ok(Some(RawFunction {
            label: label.fragment(source),
            parameters: params.fragment(source),
            return_keyword: return_type.fragment(source),
            body: body.fragment(source),
            return_type: DataType::resolve(return_type.fragment(source).trim()),
            span,
            label_span: label.inner,
            params_span: params.inner,
            return_span: return_type.inner,
            body_span: body.inner,
            source,
        }))
    }
}

impl<'a> Iterator for FunctionExtractor<'a> {
    type Item = CompileResult<RawFunction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_function().transpose()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = "function add(qword a, qword b) returns qword { qword c = 1; }";

    #[test]
    fn test_extract_fragments() {
        let mut extractor = FunctionExtractor::new(SOURCE);
        let raw = extractor.next_function().unwrap().unwrap();

        assert_eq!(raw.label.trim(), "add");
        assert_eq!(raw.parameters, "qword a, qword b");
        assert_eq!(raw.return_keyword.trim(), "qword");
        assert_eq!(raw.body.trim(), "qword c = 1;");
        assert_eq!(raw.return_type, DataType::Qword);

        assert!(extractor.next_function().unwrap().is_none());
    }

    #[test]
    fn test_extract_repeated() {
        let source = "function a() returns byte {} function b() returns word {}";
        let mut extractor = FunctionExtractor::new(source);

        let first = extractor.next_function().unwrap().unwrap();
        let second = extractor.next_function().unwrap().unwrap();
        assert_eq!(first.label.trim(), "a");
        assert_eq!(second.label.trim(), "b");
        assert!(extractor.next_function().unwrap().is_none());
    }

    #[test]
    fn test_extract_nested_braces() {
        let source = "function f() returns bool { if (1 == 1) { byte x = 2; } }";
        let raw = FunctionExtractor::new(source).next_function().unwrap().unwrap();
        assert_eq!(raw.body.trim(), "if (1 == 1) { byte x = 2; }");
    }

    #[test]
    fn test_extract_unknown_return_type_is_transient() {
        let source = "function f() returns banana {}";
        let raw = FunctionExtractor::new(source).next_function().unwrap().unwrap();
        assert_eq!(raw.return_type, DataType::Invalid);
    }

    #[test]
    fn test_extract_missing_delimiter() {
        let source = "function broken( returns qword {}";
        let result = FunctionExtractor::new(source).next_function();
        assert!(matches!(
            result,
            Err(CompileError::DelimiterNotFound { expected: ")", .. })
        ));
    }

    #[test]
    fn test_extract_no_functions() {
        assert!(FunctionExtractor::new("qword x = 5;")
            .next_function()
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_round_trip() {
        let raw = FunctionExtractor::new(SOURCE).next_function().unwrap().unwrap();
        let rendered = raw.to_string();

        let normalize = |s: &str| s.split_whitespace().collect::<String>();
        assert_eq!(normalize(&rendered), normalize(SOURCE));
    }
}
