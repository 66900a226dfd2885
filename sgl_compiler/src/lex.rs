//! Lexical analysis (tokenizer)
use std::{
    iter::Iterator,
    str::{CharIndices, FromStr},
};

use itertools::{multipeek, MultiPeek};
use log::trace;
use thiserror::Error;

use crate::{
    error::{CompileError, ErrorKind},
    tokens::{KeywordKind, Span, Token, TokenKind},
};

/// Tokenize a whole fragment of source, without the end-of-source token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::EOS {
            break;
        }
        tokens.push(token);
    }

    trace!("tokenized {} tokens from '{}'", tokens.len(), source);

    Ok(tokens)
}

/// Lexical analyzer.
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    token_start: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: 0,
            done: false,
        }
    }

    #[rustfmt::skip]
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        while let Some((_, next_char)) = self.source.next_char() {
            self.start_token();

            match next_char {
                '+'               => return Ok(self.make_token(T::Plus)),
                '-'               => {
                    if let Some((_, '>')) = self.source.peek_char() {
                        self.source.next_char();
                        return Ok(self.make_token(T::Arrow));
                    } else {
                        self.source.reset_peek();
                        return Ok(self.make_token(T::Minus));
                    }
                }
                '*'               => return Ok(self.make_token(T::Star)),
                '/'               => return Ok(self.make_token(T::Slash)),
                '%'               => return Ok(self.make_token(T::Percent)),
                '='               => return Ok(self.make_token(T::Eq)),
                ','               => return Ok(self.make_token(T::Comma)),
                ':'               => return Ok(self.make_token(T::Colon)),
                ';'               => return Ok(self.make_token(T::Semicolon)),
                '('               => return Ok(self.make_token(T::LeftParen)),
                ')'               => return Ok(self.make_token(T::RightParen)),
                '{'               => return Ok(self.make_token(T::LeftBrace)),
                '}'               => return Ok(self.make_token(T::RightBrace)),
                ' ' | '\t'
                    | '\r' | '\n' => self.consume_whitespace(),
                '0'..='9'         => return Ok(self.consume_number()),
                '.'               => {
                    if let Some((_, '0'..='9')) = self.source.peek_char() {
                        self.source.reset_peek();
                        return Ok(self.consume_fraction());
                    } else {
                        return Err(LexError::UnknownCharacter { ch: '.', pos: self.token_start });
                    }
                }
                '_' | 'a'..='z'
                    | 'A'..='Z'   => return Ok(self.consume_ident()),
                _                 => return Err(LexError::UnknownCharacter { ch: next_char, pos: self.token_start }),
            }
        }

        // Give end-of-source its own empty span.
        let end = self.source.byte_count();
        Ok(Token {
            kind: T::EOS,
            span: Span { start: end, end },
        })
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.current.0;
    }

    fn make_token(&mut self, token_kind: TokenKind) -> Token {
        let (position, c) = self.source.current;

        Token {
            kind: token_kind,
            span: Span {
                start: self.token_start,
                end: position + c.len_utf8(),
            },
        }
    }

    /// Consume whitespace characters until a non-whitespace character is encountered.
    fn consume_whitespace(&mut self) {
        while let Some((_, ' ' | '\t' | '\r' | '\n')) = self.source.peek_char() {
            self.source.next_char();
        }
        self.source.reset_peek();
    }

    fn consume_digits(&mut self) {
        while let Some((_, '0'..='9')) = self.source.peek_char() {
            self.source.next_char();
        }
        self.source.reset_peek();
    }

    /// Integer, or float when followed by a fraction or `f` suffix.
    ///
    /// Digits running straight into letters make an identifier
    /// instead, variable names may start with a digit.
    fn consume_number(&mut self) -> Token {
        self.source.reset_peek();
        self.consume_digits();

        if let Some((_, '.')) = self.source.peek_char() {
            self.source.next_char();
            return self.consume_fraction();
        }
        self.source.reset_peek();

        let suffix = self.consume_float_suffix();
        if let Some((_, '_' | 'a'..='z' | 'A'..='Z' | '0'..='9')) = self.source.peek_char() {
            return self.consume_ident();
        }
        self.source.reset_peek();

        if suffix {
            self.make_token(TokenKind::Float)
        } else {
            self.make_token(TokenKind::Int)
        }
    }

    /// Digits after the decimal point, and an optional suffix.
    fn consume_fraction(&mut self) -> Token {
        self.consume_digits();
        self.consume_float_suffix();
        self.make_token(TokenKind::Float)
    }

    fn consume_float_suffix(&mut self) -> bool {
        if let Some((_, 'f' | 'F')) = self.source.peek_char() {
            self.source.next_char();
            true
        } else {
            self.source.reset_peek();
            false
        }
    }

    fn consume_ident(&mut self) -> Token {
        self.source.reset_peek();

        while let Some((_, '_' | 'a'..='z' | 'A'..='Z' | '0'..='9')) = self.source.peek_char() {
            self.source.next_char();
        }
        self.source.reset_peek();

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = KeywordKind::from_str(self.token_fragment())
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        self.make_token(token_kind)
    }

    fn token_fragment(&self) -> &str {
        let (position, c) = self.source.current;
        &self.source.original[self.token_start..position + c.len_utf8()]
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
///
/// The end-of-source token, or the first error, is the last item.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        self.done = !matches!(result, Ok(ref token) if token.kind != TokenKind::EOS);
        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    pub(crate) original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// Peeking advances the internal peek cursor by 1. The peek cursor
    /// offset is restored to 0 when calling `MultiPeek::next()`
    /// or `MultiPeek::reset_peek()`.
    source: MultiPeek<CharIndices<'a>>,

    /// Byte position in the source string of the current character.
    current: (usize, char),
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            source: multipeek(source.char_indices()),
            current: (0, '\0'),
        }
    }

    /// number of bytes in source.
    fn byte_count(&self) -> usize {
        self.original.len()
    }

    /// Advance the cursor and return the next position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        let next = self.source.next();
        if let Some(current) = next {
            self.current = current;
        }
        next
    }

    /// Peeks the next character in the stream.
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
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown character '{ch}' at {pos}")]
    UnknownCharacter { ch: char, pos: usize },
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::UnknownCharacter { ch, pos } => ErrorKind::UnknownCharacter(ch).at(pos),
        }
    }
}
