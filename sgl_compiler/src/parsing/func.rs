//! Function declarations.
use super::{
    decl::ParamDef,
    delim::{Comma, Delimited},
    ident::Ident,
    Parse,
};
use crate::{
    balance,
    error::{CompileError, ErrorKind},
    token_stream::TokenStream,
    tokens::{KeywordKind, Span, Token, TokenKind},
};

/// `func: name(<type> <ident>, ...) [-> <type>]`
///
/// Parsed from the tokens before the body, which is never tokenized.
#[derive(Debug)]
pub struct FuncDef {
    pub keyword: Token,
    pub name: Ident,
    pub params: Delimited<ParamDef, Comma>,
    pub ret: Option<Ident>,
}

/// Braces of the function body, as a byte span of the function text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncBody {
    pub span: Span,
}

impl Parse for FuncDef {
    type Output = Self;
    type Err = CompileError;

    fn parse(input: &mut TokenStream) -> Result<Self, CompileError> {
        use TokenKind as T;

        let keyword = input.consume(T::Keyword(KeywordKind::Func))?;
        let colon = input.consume(T::Colon)?;

        // Everything up to the parameter list is the name.
        let head = input.rest();
        let paren = head
            .iter()
            .position(|t| t.kind == T::LeftParen)
            .ok_or_else(|| ErrorKind::MissingParenthesis.at(colon.span.end))?;
        let name_tokens = &head[..paren];
        let name = match name_tokens {
            [token] if token.kind == T::Ident && !starts_with_digit(input.fragment_span(&token.span)) => {
                Ident::parse(input)?
            }
            [] => return Err(ErrorKind::UnexpectedEndOfLine.at(colon.span.end)),
            [first, ..] => {
                let end = name_tokens.last().map_or(first.span.end, |t| t.span.end);
                let text = input.fragment_span(&Span {
                    start: first.span.start,
                    end,
                });
                return Err(ErrorKind::InvalidIdentifier(text.into()).at(first.span.start));
            }
        };

        input.consume(T::LeftParen)?;
        let params = Delimited::<ParamDef, Comma>::parse(input)?;
        if let Some(comma) = params.trailing() {
            return Err(ErrorKind::UnexpectedEndOfLine.at(comma.token.span.end));
        }
        input.consume(T::RightParen)?;

        let ret = if input.match_token(T::Arrow) {
            Some(Ident::parse(input)?)
        } else {
            None
        };

        input.expect_end()?;

        Ok(FuncDef {
            keyword,
            name,
            params,
            ret,
        })
    }
}

#[inline]
fn starts_with_digit(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_digit())
}

impl FuncBody {
    /// Find the body in the text of a whole function.
    ///
    /// The body opens at the first curly brace. Only its brace nesting
    /// is checked, and nothing but whitespace may follow it.
    pub fn locate(text: &str) -> Result<Self, CompileError> {
        let bytes = text.as_bytes();
        let open = bytes
            .iter()
            .position(|&b| b == b'{')
            .ok_or_else(|| ErrorKind::MissingCurlyBrace.at(text.len()))?;
        let close = balance::find_pair(bytes, open, balance::braces)
            .ok_or_else(|| ErrorKind::MissingCurlyBrace.at(open))?;

        let rest = &text[close + 1..];
        if let Some(offset) = rest.find(|c: char| !c.is_whitespace()) {
            let start = close + 1 + offset;
            let end = text[start..]
                .find(char::is_whitespace)
                .map_or(text.len(), |len| start + len);
            return Err(ErrorKind::UnexpectedToken(text[start..end].into()).at(start));
        }

        Ok(FuncBody {
            span: Span { start: open, end: close + 1 },
        })
    }

    /// Text between the braces.
    pub fn inner<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span.start + 1..self.span.end - 1]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    fn parse_func(source: &str) -> Result<(FuncDef, FuncBody), CompileError> {
        let body = FuncBody::locate(source)?;
        let header = &source[..body.span.start];
        let tokens = tokenize(header).unwrap();
        let mut input = TokenStream::new(header, &tokens);
        Ok((FuncDef::parse(&mut input)?, body))
    }

    #[test]
    fn test_signature() {
        let source = "func: add(int32 a, float b) -> int32 { int32 c = a; { } }";
        let (func, body) = parse_func(source).unwrap();
        assert_eq!(func.name.name, "add");

        let params: Vec<(&str, &str)> = func
            .params
            .iter()
            .map(|p| (p.decl.ty.name.as_str(), p.decl.name.name.as_str()))
            .collect();
        assert_eq!(params, vec![("int32", "a"), ("float", "b")]);
        assert_eq!(func.ret.map(|r| r.name), Some("int32".into()));
        assert_eq!(body.inner(source), " int32 c = a; { } ");
    }

    #[test]
    fn test_no_params() {
        let source = "func: main() {}";
        let (func, body) = parse_func(source).unwrap();
        assert!(func.params.items.is_empty());
        assert!(func.ret.is_none());
        assert_eq!(body.span, Span { start: 13, end: 15 });
        assert!(body.inner(source).is_empty());
    }

    #[test]
    fn test_body_not_tokenized() {
        let source = "func: greet() { print(\"hi\"); $ }";
        let (func, body) = parse_func(source).unwrap();
        assert_eq!(func.name.name, "greet");
        assert_eq!(body.inner(source), " print(\"hi\"); $ ");
    }

    #[test]
    fn test_invalid_name() {
        let err = parse_func("func: 2add() {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidIdentifier("2add".into()));
        assert_eq!(err.pos, Some(6));

        let err = parse_func("func: my func() {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidIdentifier("my func".into()));

        let err = parse_func("func: () {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfLine);
    }

    #[test]
    fn test_missing_parenthesis() {
        let err = parse_func("func: main { }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingParenthesis);
        assert_eq!(err.pos, Some(5));
    }

    #[test]
    fn test_bad_params() {
        let err = parse_func("func: f(int32 a,) {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfLine);
        assert_eq!(err.pos, Some(16));

        let err = parse_func("func: f(int32) {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfLine);

        let err = parse_func("func: f(int32 a int32 b) {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken("int32".into()));
    }

    #[test]
    fn test_body_braces() {
        let err = parse_func("func: f() {} x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken("x".into()));
        assert_eq!(err.pos, Some(13));

        let err = parse_func("func: f() { { }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
        assert_eq!(err.pos, Some(10));

        let err = parse_func("func: f()").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
    }
}
