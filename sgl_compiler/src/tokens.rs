use std::{fmt, str::FromStr};

use crate::balance::Delim;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Classify the token as parenthesis for nesting scans.
    #[inline]
    pub fn paren(token: &Token) -> Delim {
        match token.kind {
            TokenKind::LeftParen => Delim::Open,
            TokenKind::RightParen => Delim::Close,
            _ => Delim::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Plus,       // `+`
    Minus,      // `-`
    Star,       // `*`
    Slash,      // `/`
    Percent,    // `%`
    Eq,         // `=`
    Comma,      // `,`
    Colon,      // `:`
    Semicolon,  // `;`
    Arrow,      // `->`
    LeftParen,  // `(`
    RightParen, // `)`
    LeftBrace,  // `{`
    RightBrace, // `}`

    /// Decimal integer literal.
    Int,

    /// Number literal with a fraction or `f` suffix.
    Float,

    Ident,

    /// Identifier in the set of reserved words.
    Keyword(KeywordKind),

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
            T::Percent    => write!(f, "%"),
            T::Eq         => write!(f, "="),
            T::Comma      => write!(f, ","),
            T::Colon      => write!(f, ":"),
            T::Semicolon  => write!(f, ";"),
            T::Arrow      => write!(f, "->"),
            T::LeftParen  => write!(f, "("),
            T::RightParen => write!(f, ")"),
            T::LeftBrace  => write!(f, "{{"),
            T::RightBrace => write!(f, "}}"),
            T::Int        => write!(f, "integer"),
            T::Float      => write!(f, "float"),
            T::Ident      => write!(f, "identifier"),
            T::Keyword(k) => write!(f, "{}", k),
            T::EOS        => write!(f, "end of source"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Func,
}

impl fmt::Display for KeywordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeywordKind::Func => write!(f, "func"),
        }
    }
}

impl FromStr for KeywordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "func" => Ok(KeywordKind::Func),
            _ => Err(()),
        }
    }
}

/// Chunk of source code, encoded as byte positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start position of bytes in source.
    pub start: usize,
    /// Exclusive end position of bytes in source.
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}
