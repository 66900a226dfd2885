//! Compile errors.
use std::{error, fmt};

use smol_str::SmolStr;
use thiserror::Error;

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Every way compilation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("source is empty or invalid")]
    SourceInvalid,
    #[error("unclosed block comment")]
    UnclosedBlockComment,
    #[error("unexpected end of line, expected identifier")]
    UnexpectedEndOfLine,
    #[error("unknown type '{0}'")]
    UnknownType(SmolStr),
    #[error("missing semicolon")]
    MissingSemicolon,
    #[error("missing curly brace")]
    MissingCurlyBrace,
    #[error("missing parenthesis")]
    MissingParenthesis,
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(SmolStr),
    #[error("missing left operand for '{0}'")]
    MissingLeftOperand(&'static str),
    #[error("missing right operand for '{0}'")]
    MissingRightOperand(&'static str),
    #[error("identifier '{0}' already declared")]
    DuplicateIdentifier(SmolStr),
    #[error("illegal use of void")]
    IllegalVoidUsage,
    #[error("void operand for '{0}'")]
    IllegalVoidOperand(&'static str),
    #[error("illegal cast from {from} to {to}")]
    IllegalCast { from: SmolStr, to: SmolStr },
    #[error("'{0}' is not a constant or variable")]
    NotAConstantOrVariable(SmolStr),
    #[error("undeclared identifier '{0}'")]
    UndeclaredIdentifier(SmolStr),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(SmolStr),
    #[error("unknown character '{0}'")]
    UnknownCharacter(char),
    #[error("integer literal '{0}' out of range")]
    IntegerOutOfRange(SmolStr),
    #[error("operator '{op}' does not support operands of type {ty}")]
    UnsupportedOperand { op: &'static str, ty: SmolStr },
    #[error("too many variables")]
    TooManyVariables,
    /// Global statement that leaves a value on the stack.
    #[error("value of type {0} is never used")]
    UnusedValue(SmolStr),
}

impl ErrorKind {
    /// Locate the error at a byte offset.
    #[inline]
    pub fn at(self, pos: usize) -> CompileError {
        CompileError {
            kind: self,
            pos: Some(pos),
            line: None,
        }
    }
}

/// First error encountered by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: ErrorKind,
    /// Byte offset into the source text.
    pub pos: Option<usize>,
    /// Line number, starting at 1.
    pub line: Option<usize>,
}

impl CompileError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            pos: None,
            line: None,
        }
    }

    /// Shift the position by the offset of the fragment it was found in.
    pub(crate) fn offset(mut self, by: usize) -> Self {
        self.pos = self.pos.map(|pos| pos + by);
        self
    }

    pub(crate) fn map_pos(mut self, f: impl FnOnce(usize) -> usize) -> Self {
        self.pos = self.pos.map(f);
        self
    }

    /// Resolve the line number from the position in the original source.
    pub(crate) fn with_line(mut self, source: &str) -> Self {
        self.line = self.pos.map(|pos| line_number(source, pos));
        self
    }
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl From<ErrorKind> for CompileError {
    fn from(kind: ErrorKind) -> Self {
        CompileError::new(kind)
    }
}

/// Count the newlines before the position, starting at line 1.
pub fn line_number(source: &str, pos: usize) -> usize {
    let end = pos.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
