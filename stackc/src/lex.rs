//! Lexical analysis (tokenizer)
use crate::tokens::{KeywordKind, Span, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use std::{
    error, fmt,
    iter::Iterator,
    str::{CharIndices, FromStr},
};

/// Lexical analyzer.
///
/// Lexes a window of source text lazily, one token per call. Spans are
/// absolute offsets into the text the window was sliced from, so error
/// reporting and fragment slicing work against the full source.
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    token_start: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self::over(source_code, 0)
    }

    /// Lex a fragment of a larger source, offsetting spans by `base`.
    pub(crate) fn over(fragment: &'a str, base: u32) -> Self {
        Self {
            source: SourceText::new(fragment, base),
            token_start: 0,
            done: false,
        }
    }

    #[rustfmt::skip]
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        while !self.source.at_end() {
            if let Some((_, next_char)) = self.source.next_char() {
                self.start_token();

                match next_char {
                    '+'               => return Ok(self.make_token(T::Plus)),
                    '-'               => return Ok(self.make_token(T::Minus)),
                    '*'               => return Ok(self.make_token(T::Star)),
                    '/'               => return Ok(self.make_token(T::Slash)),
                    ','               => return Ok(self.make_token(T::Comma)),
                    ';'               => return Ok(self.make_token(T::Semicolon)),
                    '('               => return Ok(self.make_token(T::LeftParen)),
                    ')'               => return Ok(self.make_token(T::RightParen)),
                    '{'               => return Ok(self.make_token(T::LeftBrace)),
                    '}'               => return Ok(self.make_token(T::RightBrace)),
                    '='               => return Ok(self.make_op2(T::Eq, T::EqEq)),
                    '<'               => return Ok(self.make_op2(T::Less, T::LessEq)),
                    '>'               => return Ok(self.make_op2(T::Greater, T::GreaterEq)),
                    '!'               => {
                        if let Some((_, '=')) = self.source.peek_char() {
                            self.source.next_char();
                            return Ok(self.make_token(T::NotEq));
                        } else {
                            return Err(LexError::UnknownCharacter {
                                character: '!',
                                offset: self.source.absolute(self.token_start),
                            });
                        }
                    }
                    ' ' | '\t'
                        | '\r' | '\n' => self.consume_whitespace(),
                    '"'               => return self.consume_string(),
                    '0'..='9'         => return Ok(self.consume_number()),
                    '_' | 'a'..='z'
                        | 'A'..='Z'   => return Ok(self.consume_ident()),
                    _                 => return Err(LexError::UnknownCharacter {
                        character: next_char,
                        offset: self.source.absolute(self.token_start),
                    }),
                }
            } else {
                break;
            }
        }

        self.done = true;
        self.token_start = self.source.cursor;
        Ok(self.make_token(T::EOS))
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.current.0;
    }

    fn make_token(&mut self, token_kind: TokenKind) -> Token {
        self.source.reset_peek();

        let span = Span {
            index: self.source.absolute(self.token_start) as u32,
            size: (self.source.cursor - self.token_start) as u32,
        };

        Token { kind: token_kind, span }
    }

    /// A single-character operator, or its two-character `=`-suffixed
    /// form when the next character is `=`.
    fn make_op2(&mut self, single: TokenKind, double: TokenKind) -> Token {
        if let Some((_, '=')) = self.source.peek_char() {
            self.source.next_char();
            self.make_token(double)
        } else {
            self.make_token(single)
        }
    }

    /// Consume whitespace until a non-whitespace character is encountered.
    fn consume_whitespace(&mut self) {
        while let Some((_, ' ')) | Some((_, '\t')) | Some((_, '\r')) | Some((_, '\n')) =
            self.source.peek_char()
        {
            self.source.next_char();
        }
        self.source.reset_peek();
    }

    fn consume_number(&mut self) -> Token {
        self.source.reset_peek();

        while let Some((_, '0'..='9')) = self.source.peek_char() {
            self.source.next_char();
        }

        self.make_token(TokenKind::Number)
    }

    fn consume_ident(&mut self) -> Token {
        self.source.reset_peek();

        while let Some((_, c)) = self.source.peek_char() {
            match c {
                '_' | 'a'..='z' | 'A'..='Z' | '0'..='9' => {
                    self.source.next_char();
                }
                _ => break,
            }
        }
        self.source.reset_peek();

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = KeywordKind::from_str(self.token_fragment())
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        self.make_token(token_kind)
    }

    /// Consume a string literal. The quotes are part of the token span.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        self.source.reset_peek();

        loop {
            match self.source.next_char() {
                Some((_, '"')) => return Ok(self.make_token(TokenKind::Str)),
                Some(_) => continue,
                None => {
                    return Err(LexError::UnterminatedString {
                        offset: self.source.absolute(self.token_start),
                    })
                }
            }
        }
    }

    fn token_fragment(&self) -> &str {
        &self.source.original[self.token_start..self.source.cursor]
    }
}

/// Implement `Lexer` as an iterator for consuming
/// tokens lazily. Yields `None` after end-of-source.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            None
        } else {
            Some(self.next_token())
        }
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the lexed fragment so the lexer can
    /// slice keyword candidates from it.
    pub(crate) original: &'a str,

    /// Absolute offset of the fragment inside the full source.
    base: u32,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// The `MultiPeek` wrapper allows for arbitrary lookahead by consuming
    /// the iterator internally and buffering the result. Peeking advances
    /// an internal peek cursor which is restored by `next()` or
    /// `reset_peek()`.
    source: MultiPeek<CharIndices<'a>>,

    /// Byte position and character of the current (last consumed) character.
    current: (usize, char),

    /// Byte position just past the current character.
    cursor: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str, base: u32) -> Self {
        Self {
            original: source,
            base,
            source: multipeek(source.char_indices()),
            current: (0, '\0'),
            cursor: 0,
        }
    }

    /// number of bytes in source.
    fn byte_count(&self) -> usize {
        self.original.len()
    }

    /// Translate a fragment-local offset to a full-source offset.
    fn absolute(&self, local: usize) -> usize {
        self.base as usize + local
    }

    /// Advance the cursor and return the next position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        if let Some((index, c)) = self.source.next() {
            self.current = (index, c);
            self.cursor = index + c.len_utf8();
            Some((index, c))
        } else {
            // Source code iterator has reached end-of-file.
            //
            // There is no end-of-file character, so the current position
            // is set to the size of the source fragment.
            self.current = (self.byte_count(), '\0');
            self.cursor = self.byte_count();
            None
        }
    }

    /// Peeks the current character in the stream.
    ///
    /// This call advances the peek cursor. Subsequent
    /// calls will look ahead by one character each call.
    fn peek_char(&mut self) -> Option<(usize, char)> {
        self.source.peek().cloned()
    }

    /// Reset the stream peek cursor.
    fn reset_peek(&mut self) {
        self.source.reset_peek()
    }

    /// Indicates if the cursor is at the end of the source.
    fn at_end(&self) -> bool {
        self.cursor >= self.byte_count()
    }
}

#[derive(Debug, Clone)]
pub enum LexError {
    UnknownCharacter { character: char, offset: usize },
    UnterminatedString { offset: usize },
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexError::UnknownCharacter { character, offset } => {
                write!(f, "unknown character '{}' at offset {}", character, offset)
            }
            LexError::UnterminatedString { offset } => {
                write!(f, "unterminated string literal at offset {}", offset)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokens::KeywordKind as K;
    use crate::tokens::TokenKind as T;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = vec![];
        loop {
            let token = lexer.next_token().expect("lex error");
            let kind = token.kind;
            kinds.push(kind);
            if kind == T::EOS {
                break;
            }
        }
        kinds
    }

    #[test]
    fn test_lex_declaration() {
        assert_eq!(
            kinds("qword x = 5;"),
            vec![
                T::Keyword(K::Qword),
                T::Ident,
                T::Eq,
                T::Number,
                T::Semicolon,
                T::EOS,
            ]
        );
    }

    #[test]
    fn test_lex_comparison_operators() {
        assert_eq!(
            kinds("== != < <= > >="),
            vec![T::EqEq, T::NotEq, T::Less, T::LessEq, T::Greater, T::GreaterEq, T::EOS]
        );
    }

    #[test]
    fn test_lex_string_literal() {
        let mut lexer = Lexer::new("string s = \"vm\";");
        let mut token = lexer.next_token().unwrap();
        while token.kind != T::Str {
            token = lexer.next_token().unwrap();
        }
        assert_eq!(token.span.fragment("string s = \"vm\";"), "\"vm\"");
    }

    #[test]
    fn test_lex_unterminated_string() {
        let mut lexer = Lexer::new("\"oops");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnterminatedString { offset: 0 })
        ));
    }

    #[test]
    fn test_lex_window_offsets() {
        // Window over the body of `function f() returns qword {x = 1;}`.
        let source = "function f() returns qword {x = 1;}";
        let mut lexer = Lexer::over(&source[28..34], 28);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, T::Ident);
        assert_eq!(token.span.fragment(source), "x");
        assert_eq!(token.span.index, 28);
    }

    #[test]
    fn test_lex_bang_alone_is_error() {
        let mut lexer = Lexer::new("!x");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnknownCharacter { character: '!', .. })
        ));
    }
}
