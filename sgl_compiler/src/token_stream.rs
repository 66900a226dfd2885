//! Stream of tokens for look ahead.
use smol_str::SmolStr;
use thiserror::Error;

use crate::{
    error::{CompileError, ErrorKind},
    tokens::{Span, Token, TokenKind},
};

/// Cursor over the tokens of one fragment of source.
///
/// Tokens are lexed up front, so the parser can both step through
/// them and hand whole slices over to the expression parser.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    cursor: usize,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    #[inline]
    pub fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            cursor: 0,
            source,
        }
    }

    /// Slice the source code covered by the span.
    #[inline]
    pub fn fragment_span(&self, span: &Span) -> &'a str {
        self.source.get(span.range()).unwrap_or_default()
    }

    /// Tokens not yet consumed.
    #[inline]
    pub fn rest(&self) -> &'a [Token] {
        &self.tokens[self.cursor..]
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Byte position just past the last token.
    pub fn end_pos(&self) -> usize {
        self.tokens.last().map(|t| t.span.end).unwrap_or(0)
    }

    /// Consumes the current token regardless of type.
    ///
    /// Returns `None` when the cursor is at the end of the token stream.
    #[inline]
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).copied();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// Consumes the current token if it matches the given token type.
    ///
    /// Returns true when matched. Does not consume the token if
    /// the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        let is_match = self.peek_kind() == Some(token_kind);
        if is_match {
            self.cursor += 1;
        }
        is_match
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// an error is returned and the cursor stays in place.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        match self.peek() {
            Some(token) if token.kind == token_kind => {
                self.cursor += 1;
                Ok(*token)
            }
            Some(token) => Err(TokenError::Mismatch {
                expected: token_kind,
                encountered: token.kind,
                text: self.fragment_span(&token.span).into(),
                pos: token.span.start,
            }),
            None => Err(TokenError::EndOfSource {
                expected: token_kind,
                pos: self.end_pos(),
            }),
        }
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.cursor)
    }

    #[inline]
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// Fails when any tokens are left over.
    pub fn expect_end(&self) -> Result<(), TokenError> {
        match self.peek() {
            Some(token) => Err(TokenError::Trailing {
                text: self.fragment_span(&token.span).into(),
                pos: token.span.start,
            }),
            None => Ok(()),
        }
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("encountered unexpected token '{encountered}', expected '{expected}'")]
    Mismatch {
        expected: TokenKind,
        encountered: TokenKind,
        text: SmolStr,
        pos: usize,
    },
    #[error("unexpected end of source code, expected '{expected}'")]
    EndOfSource { expected: TokenKind, pos: usize },
    #[error("unexpected trailing token '{text}'")]
    Trailing { text: SmolStr, pos: usize },
}

impl From<TokenError> for CompileError {
    fn from(err: TokenError) -> Self {
        use TokenKind as T;

        match err {
            TokenError::Mismatch { text, pos, .. } | TokenError::Trailing { text, pos } => {
                ErrorKind::UnexpectedToken(text).at(pos)
            }
            TokenError::EndOfSource { expected, pos } => match expected {
                T::LeftParen | T::RightParen => ErrorKind::MissingParenthesis.at(pos),
                T::LeftBrace | T::RightBrace => ErrorKind::MissingCurlyBrace.at(pos),
                T::Semicolon => ErrorKind::MissingSemicolon.at(pos),
                _ => ErrorKind::UnexpectedEndOfLine.at(pos),
            },
        }
    }
}
