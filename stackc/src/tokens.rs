//! Tokens
use std::{fmt, str::FromStr};

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum TokenKind {
    // Simple
    Plus,       // `+`
    Minus,      // `-`
    Star,       // `*`
    Slash,      // `/`
    Eq,         // `=`
    Comma,      // `,`
    Semicolon,  // `;`
    LeftParen,  // `(`
    RightParen, // `)`
    LeftBrace,  // `{`
    RightBrace, // `}`

    // ------------------------------------------------------------------------
    // Comparison
    EqEq,      // `==`
    NotEq,     // `!=`
    Less,      // `<`
    LessEq,    // `<=`
    Greater,   // `>`
    GreaterEq, // `>=`

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Number literal
    Number,
    /// String literal, quotes included in the span.
    Str,
    /// Identifier in the set of reserved words.
    Keyword(KeywordKind),

    // ------------------------------------------------------------------------
    // Special
    /// End-of-source
    EOS,
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        match self {
            T::Plus       => write!(f, "+"),
            T::Minus      => write!(f, "-"),
            T::Star       => write!(f, "*"),
            T::Slash      => write!(f, "/"),
            T::Eq         => write!(f, "="),
            T::Comma      => write!(f, ","),
            T::Semicolon  => write!(f, ";"),
            T::LeftParen  => write!(f, "("),
            T::RightParen => write!(f, ")"),
            T::LeftBrace  => write!(f, "{{"),
            T::RightBrace => write!(f, "}}"),
            T::EqEq       => write!(f, "=="),
            T::NotEq      => write!(f, "!="),
            T::Less       => write!(f, "<"),
            T::LessEq     => write!(f, "<="),
            T::Greater    => write!(f, ">"),
            T::GreaterEq  => write!(f, ">="),
            T::Ident      => write!(f, "identifier"),
            T::Number     => write!(f, "number"),
            T::Str        => write!(f, "string"),
            T::Keyword(keyword) => write!(f, "{}", keyword),
            T::EOS        => write!(f, "end-of-source"),
        }
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum KeywordKind {
    Function,  // function
    Returns,   // returns
    If,        // if
    For,       // for

    // ------------------------------------------------------------------------
    // Type keywords
    Byte,      // byte
    Word,      // word
    Dword,     // dword
    Qword,     // qword
    String,    // string
    Bool,      // bool
    Determine, // determine

    // ------------------------------------------------------------------------
    // Boolean literals
    True,      // true
    False,     // false
}

impl KeywordKind {
    /// Keywords that open a variable declaration.
    #[inline]
    pub fn is_type(&self) -> bool {
        use KeywordKind as K;
        matches!(
            self,
            K::Byte | K::Word | K::Dword | K::Qword | K::String | K::Bool | K::Determine
        )
    }
}

impl fmt::Display for KeywordKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use KeywordKind as K;
        match self {
            K::Function  => write!(f, "function"),
            K::Returns   => write!(f, "returns"),
            K::If        => write!(f, "if"),
            K::For       => write!(f, "for"),
            K::Byte      => write!(f, "byte"),
            K::Word      => write!(f, "word"),
            K::Dword     => write!(f, "dword"),
            K::Qword     => write!(f, "qword"),
            K::String    => write!(f, "string"),
            K::Bool      => write!(f, "bool"),
            K::Determine => write!(f, "determine"),
            K::True      => write!(f, "true"),
            K::False     => write!(f, "false"),
        }
    }
}

impl FromStr for KeywordKind {
    type Err = ();

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeywordKind as K;
        match s {
            "function"  => Ok(K::Function),
            "returns"   => Ok(K::Returns),
            "if"        => Ok(K::If),
            "for"       => Ok(K::For),
            "byte"      => Ok(K::Byte),
            "word"      => Ok(K::Word),
            "dword"     => Ok(K::Dword),
            "qword"     => Ok(K::Qword),
            "string"    => Ok(K::String),
            "bool"      => Ok(K::Bool),
            "determine" => Ok(K::Determine),
            "true"      => Ok(K::True),
            "false"     => Ok(K::False),
            _ => Err(()),
        }
    }
}

/// Chunk of source code, encoded as a byte offset and length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.index as usize + self.size as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// Combine two spans to produce a new span that
    /// covers both (and everything inbetween).
    ///
    /// ```
    /// use stackc::tokens::Span;
    ///
    /// let span1 = Span::new(4, 13);
    /// let span2 = Span::new(21, 13);
    /// let span3 = span1.merge(&span2);
    /// assert_eq!(4, span3.index);
    /// assert_eq!(30, span3.size);
    /// ```
    ///
    /// ```text
    /// <-- span1 -->    <-- span2 -->
    /// <---------- span3 ----------->
    /// ```
    pub fn merge(&self, other: &Span) -> Span {
        let index = u32::min(self.index, other.index);
        let size = u32::max(self.end(), other.end()) - index;
        Span { index, size }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "qword x = 5;";

        let spans = &[
            Span::new(0, 5),  // qword
            Span::new(6, 1),  // x
            Span::new(8, 1),  // =
            Span::new(10, 1), // 5
        ];

        assert_eq!(spans[0].fragment(CODE), "qword");
        assert_eq!(spans[1].fragment(CODE), "x");
        assert_eq!(spans[2].fragment(CODE), "=");
        assert_eq!(spans[3].fragment(CODE), "5");
    }

    #[test]
    fn test_keyword_parse() {
        assert_eq!("qword".parse::<KeywordKind>(), Ok(KeywordKind::Qword));
        assert_eq!("determine".parse::<KeywordKind>(), Ok(KeywordKind::Determine));
        assert!("QWORD".parse::<KeywordKind>().is_err());
        assert!("quadword".parse::<KeywordKind>().is_err());
    }

    #[test]
    fn test_type_keywords() {
        assert!(KeywordKind::Byte.is_type());
        assert!(KeywordKind::Determine.is_type());
        assert!(!KeywordKind::Function.is_type());
        assert!(!KeywordKind::True.is_type());
    }
}
