//! Structural scanner.
//!
//! Strips comments and line breaks from the source, validates
//! bracket nesting, and splits the text into top-level units.
use std::ops::Range;

use log::debug;

use crate::{
    balance,
    constants::FUNCTION_PREFIX,
    error::{CompileError, CompileResult, ErrorKind},
};

/// Source text with comments and line breaks stripped out.
///
/// Every byte remembers its position in the original source, so
/// errors found in the stripped text can still report a line.
#[derive(Debug)]
pub struct Preprocessed {
    text: String,
    origins: Vec<usize>,
    source_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// `func: name(...) { ... }`
    Function,
    /// Statement terminated by a semicolon.
    Global,
}

/// Top-level fragment of the stripped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub kind: UnitKind,
    pub span: Range<usize>,
}

impl Preprocessed {
    /// Strip comments and line breaks.
    ///
    /// Line comments go first, so a `//` inside a block comment
    /// can swallow its terminator. Comments and line breaks
    /// become a single space each, keeping tokens on either
    /// side apart.
    ///
    /// Errors are located in the original source.
    pub fn new(source: &str) -> CompileResult<Self> {
        let bytes = source.as_bytes();

        // Line comments, keeping the newline that ends them.
        let mut stage: Vec<(u8, usize)> = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'/') {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            } else {
                stage.push((bytes[i], i));
                i += 1;
            }
        }

        // Block comments and line breaks.
        let mut text = Vec::with_capacity(stage.len());
        let mut origins = Vec::with_capacity(stage.len());
        let mut i = 0;
        while i < stage.len() {
            let (b, origin) = stage[i];

            if b == b'/' && stage.get(i + 1).map(|&(b, _)| b) == Some(b'*') {
                let close = (i + 2..stage.len().saturating_sub(1))
                    .find(|&k| stage[k].0 == b'*' && stage[k + 1].0 == b'/')
                    .ok_or_else(|| ErrorKind::UnclosedBlockComment.at(origin).with_line(source))?;
                text.push(b' ');
                origins.push(origin);
                i = close + 2;
                continue;
            }

            text.push(if b == b'\n' || b == b'\r' { b' ' } else { b });
            origins.push(origin);
            i += 1;
        }

        // Only whole comments and ASCII line breaks were replaced.
        let text = String::from_utf8(text).map_err(|_| CompileError::new(ErrorKind::SourceInvalid))?;

        Ok(Self {
            text,
            origins,
            source_len: source.len(),
        })
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position in the original source of a position in the stripped text.
    pub fn origin(&self, pos: usize) -> usize {
        self.origins.get(pos).copied().unwrap_or(self.source_len)
    }

    /// Move an error located in the stripped text to the original source.
    pub fn locate(&self, err: CompileError, source: &str) -> CompileError {
        err.map_pos(|pos| self.origin(pos)).with_line(source)
    }

    /// Check that parentheses and curly braces are matched.
    ///
    /// Both kinds are counted independently of each other.
    pub fn check_nesting(&self) -> CompileResult<()> {
        let bytes = self.text.as_bytes();

        balance::check(bytes, balance::parens)
            .map_err(|imbalance| ErrorKind::MissingParenthesis.at(imbalance.position()))?;
        balance::check(bytes, balance::braces)
            .map_err(|imbalance| ErrorKind::MissingCurlyBrace.at(imbalance.position()))?;

        Ok(())
    }

    /// Split the text into functions and global statements.
    pub fn units(&self) -> CompileResult<Vec<Unit>> {
        let bytes = self.text.as_bytes();
        let mut units = Vec::new();
        let mut pos = 0;

        loop {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }

            let unit = if self.text[pos..].starts_with(FUNCTION_PREFIX) {
                // Body must open before any statement terminator.
                let open = bytes[pos..]
                    .iter()
                    .position(|&b| b == b'{' || b == b';')
                    .map(|offset| pos + offset)
                    .filter(|&open| bytes[open] == b'{')
                    .ok_or_else(|| ErrorKind::MissingCurlyBrace.at(pos))?;
                let close = balance::find_pair(bytes, open, balance::braces)
                    .ok_or_else(|| ErrorKind::MissingCurlyBrace.at(open))?;

                Unit {
                    kind: UnitKind::Function,
                    span: pos..close + 1,
                }
            } else {
                let semicolon = bytes[pos..]
                    .iter()
                    .position(|&b| b == b';')
                    .map(|offset| pos + offset)
                    .ok_or_else(|| {
                        let last = self.text.trim_end().len().saturating_sub(1);
                        ErrorKind::MissingSemicolon.at(last)
                    })?;

                Unit {
                    kind: UnitKind::Global,
                    span: pos..semicolon + 1,
                }
            };

            debug!("{:?} unit: '{}'", unit.kind, &self.text[unit.span.clone()]);
            pos = unit.span.end;
            units.push(unit);
        }

        if units.is_empty() {
            return Err(CompileError::new(ErrorKind::SourceInvalid));
        }

        Ok(units)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let source = "int32 x; // first\n/* block\n comment */int32 y;\r\n";
        let pre = Preprocessed::new(source).unwrap();

        assert_eq!(pre.text(), "int32 x;   int32 y;  ");
        // `y` is still at its original position.
        let y = pre.text().find('y').unwrap();
        assert_eq!(&source[pre.origin(y)..pre.origin(y) + 1], "y");
        assert_eq!(pre.origin(1000), source.len());
    }

    #[test]
    fn test_comment_separates_tokens() {
        let pre = Preprocessed::new("int32/**/x;").unwrap();
        assert_eq!(pre.text(), "int32 x;");
    }

    #[test]
    fn test_line_comment_first() {
        // The line comment swallows the block comment terminator.
        let source = "int32 x;\n/* // */\nint32 y;";
        let err = Preprocessed::new(source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnclosedBlockComment);
        assert_eq!(err.pos, Some(9));
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_nesting() {
        let pre = Preprocessed::new("int32 x = (1 + 2;").unwrap();
        let err = pre.check_nesting().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingParenthesis);
        assert_eq!(err.pos, Some(10));

        let pre = Preprocessed::new("func: f() { } }").unwrap();
        let err = pre.check_nesting().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
        assert_eq!(err.pos, Some(14));

        // Independent counters.
        let pre = Preprocessed::new("func: f() { ( } )").unwrap();
        assert!(pre.check_nesting().is_ok());
    }

    #[test]
    fn test_units() {
        let pre = Preprocessed::new("int32 x = 1;\n func: f() { { } } ;int32 y;").unwrap();
        let units = pre.units().unwrap();

        let kinds: Vec<UnitKind> = units.iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            vec![UnitKind::Global, UnitKind::Function, UnitKind::Global, UnitKind::Global]
        );
        assert_eq!(&pre.text()[units[1].span.clone()], "func: f() { { } }");
        assert_eq!(&pre.text()[units[2].span.clone()], ";");
        assert_eq!(&pre.text()[units[3].span.clone()], "int32 y;");
    }

    #[test]
    fn test_missing_semicolon() {
        let pre = Preprocessed::new("int32 x;\nint32 y  \n").unwrap();
        let err = pre.units().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingSemicolon);
        assert_eq!(err.pos, Some(15));
    }

    #[test]
    fn test_function_without_body() {
        let pre = Preprocessed::new("func: f(); int32 x;").unwrap();
        let err = pre.units().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
        assert_eq!(err.pos, Some(0));
    }

    #[test]
    fn test_empty_source() {
        let pre = Preprocessed::new("  // nothing\n/* here */\n").unwrap();
        assert_eq!(pre.units().unwrap_err().kind, ErrorKind::SourceInvalid);

        let pre = Preprocessed::new("").unwrap();
        assert_eq!(pre.units().unwrap_err().kind, ErrorKind::SourceInvalid);
    }
}
