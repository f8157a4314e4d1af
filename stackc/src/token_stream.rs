//! Buffered stream of tokens for look ahead.
use crate::{
    lex::{LexError, Lexer},
    tokens::{Span, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use std::{error, fmt, iter::Iterator};

use smol_str::SmolStr;

/// Buffered stream of tokens that allows arbitrary look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer.
///
/// The peek semantics are determined by the internal `MultiPeek`.
/// Calling `TokenStream::peek` is not idempotent, advancing a peek
/// cursor forward by one token for each `peek()` call. The cursor
/// can be reset explicitly using `TokenStream::reset_peek` or
/// implicitly by calling one of the consuming methods.
pub struct TokenStream<'a> {
    lexer: MultiPeek<Lexer<'a>>,
    /// Keep reference to the full source so the parser can
    /// slice fragments from it by absolute span.
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: multipeek(Lexer::new(source)),
        }
    }

    /// Stream over a window of the source; token spans stay absolute.
    pub(crate) fn over(source: &'a str, window: Span) -> Self {
        let fragment = window.fragment(source);
        Self {
            source,
            lexer: multipeek(Lexer::over(fragment, window.index)),
        }
    }

    /// Slice a fragment of source code.
    ///
    /// Returns `None` if the given span is out of bounds.
    #[inline]
    pub fn fragment_span(&self, span: &Span) -> Option<&'a str> {
        self.source.get(span.index as usize..span.end() as usize)
    }

    /// The source fragment behind a token, interned.
    ///
    /// Token spans are produced by our own lexer, so slicing cannot
    /// fail for a token that came out of this stream.
    pub fn token_fragment(&self, token: &Token) -> SmolStr {
        self.fragment_span(&token.span)
            .map(SmolStr::new)
            .expect("token has no source fragment")
    }

    /// Consumes the current token regardless of type.
    ///
    /// Returns `None` when the cursor is at the end of the token stream.
    #[inline]
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        self.lexer.next()
    }

    /// Consumes the current token if it matches the given token type.
    ///
    /// Returns true when matched. Returns false when token types
    /// do not match, or the token stream is at the end.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        // Ensure clean peek state.
        self.lexer.reset_peek();

        match self.lexer.peek() {
            Some(Ok(token)) => {
                let is_match = token.kind == token_kind;
                if is_match {
                    self.lexer.next();
                }
                self.lexer.reset_peek();
                is_match
            }
            _ => {
                self.lexer.reset_peek();
                false
            }
        }
    }

    /// Return the current token while advancing the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a token error is returned and the token is not consumed.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        // Ensure clean peek state.
        self.lexer.reset_peek();

        match self.lexer.peek() {
            Some(Ok(token)) => {
                if token.kind != token_kind {
                    Err(TokenError::Mismatch {
                        expected: token_kind,
                        encountered: token.kind,
                        offset: token.span.index as usize,
                    })
                } else {
                    self.lexer
                        .next()
                        .ok_or(TokenError::EndOfSource)?
                        .map_err(TokenError::Lex)
                }
            }
            Some(Err(err)) => Err(TokenError::Lex(err.clone())),
            None => Err(TokenError::EndOfSource),
        }
    }

    /// Return the current token without advancing the cursor.
    ///
    /// This call advances the peek cursor; a second call looks one
    /// token further ahead.
    #[inline]
    pub fn peek(&mut self) -> Result<&Token, TokenError> {
        match self.lexer.peek() {
            Some(result) => result.as_ref().map_err(|err| TokenError::Lex(err.clone())),
            None => Err(TokenError::EndOfSource),
        }
    }

    /// The current token's kind, with the peek cursor left reset.
    pub fn peek_kind(&mut self) -> Result<TokenKind, TokenError> {
        self.lexer.reset_peek();
        let kind = self.peek().map(|token| token.kind);
        self.lexer.reset_peek();
        kind
    }

    /// Set peek cursor back to the current cursor.
    pub fn reset_peek(&mut self) {
        self.lexer.reset_peek()
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug)]
pub enum TokenError {
    Mismatch {
        expected: TokenKind,
        encountered: TokenKind,
        offset: usize,
    },
    EndOfSource,
    Lex(LexError),
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch {
                expected,
                encountered,
                offset,
            } => write!(
                f,
                "encountered unexpected token '{}' at offset {}, expected '{}'",
                encountered, offset, expected
            ),
            E::EndOfSource => write!(f, "unexpected end of source code"),
            E::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<LexError> for TokenError {
    fn from(err: LexError) -> Self {
        TokenError::Lex(err)
    }
}
