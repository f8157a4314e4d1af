//! Result and errors.
use crate::{lex::LexError, token_stream::TokenError};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Failure of a whole-source compile.
///
/// Each variant carries the offending fragment or label and the byte
/// offset into the compiled source where it was encountered. A failure
/// aborts the compile; no instruction listing is produced from a source
/// that did not compile completely.
#[derive(Debug)]
pub enum CompileError {
    /// A grammar delimiter was missing at or after the given offset.
    DelimiterNotFound { expected: &'static str, offset: usize },
    /// A type keyword did not resolve at a declaration or return site.
    UnknownType { keyword: String, offset: usize },
    /// No statement kind could be matched at the scan position.
    UnclassifiedStatement { fragment: String, offset: usize },
    /// A call references a label missing from the function table.
    UndefinedFunction { label: SmolStr, offset: usize },
    /// A function label was defined twice within one compile unit.
    DuplicateFunctionLabel { label: SmolStr },
    /// A variable label was declared twice within one function scope.
    DuplicateVariable { label: SmolStr, offset: usize },
    /// A call's argument count does not match the callee's parameters.
    CallArity {
        label: SmolStr,
        expected: usize,
        encountered: usize,
        offset: usize,
    },
    /// An operand could not be parsed as a literal or known variable.
    MalformedExpression {
        fragment: String,
        offset: usize,
        reason: &'static str,
    },
    Lex(LexError),
    Token(TokenError),
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use CompileError as E;
        match self {
            E::DelimiterNotFound { expected, offset } => {
                write!(f, "missing '{}' at or after offset {}", expected, offset)
            }
            E::UnknownType { keyword, offset } => {
                write!(f, "unresolved type keyword '{}' at offset {}", keyword, offset)
            }
            E::UnclassifiedStatement { fragment, offset } => {
                write!(f, "cannot classify statement '{}' at offset {}", fragment, offset)
            }
            E::UndefinedFunction { label, offset } => {
                write!(f, "call to undefined function '{}' at offset {}", label, offset)
            }
            E::DuplicateFunctionLabel { label } => {
                write!(f, "function '{}' is already defined", label)
            }
            E::DuplicateVariable { label, offset } => {
                write!(f, "variable '{}' redeclared at offset {}", label, offset)
            }
            E::CallArity {
                label,
                expected,
                encountered,
                offset,
            } => write!(
                f,
                "function '{}' takes {} argument(s), {} given at offset {}",
                label, expected, encountered, offset
            ),
            E::MalformedExpression {
                fragment,
                offset,
                reason,
            } => write!(
                f,
                "malformed expression '{}' at offset {}: {}",
                fragment, offset, reason
            ),
            E::Lex(err) => Display::fmt(err, f),
            E::Token(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<TokenError> for CompileError {
    fn from(err: TokenError) -> Self {
        CompileError::Token(err)
    }
}
