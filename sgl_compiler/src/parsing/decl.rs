//! Variable and parameter declarations.
use super::{ident::Ident, Parse};
use crate::{
    error::{CompileError, ErrorKind},
    token_stream::TokenStream,
    tokens::TokenKind,
};

/// `<type> <identifier>`
///
/// Whether the type exists is decided by the compiler,
/// which owns the type registry.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: Ident,
    pub name: Ident,
}

/// One entry of a function parameter list.
#[derive(Debug, Clone)]
pub struct ParamDef {
    pub decl: VarDecl,
}

impl VarDecl {
    fn parse_parts(input: &mut TokenStream) -> Result<Self, CompileError> {
        let ty = Ident::parse(input)?;
        let name = parse_name(input)?;
        Ok(VarDecl { ty, name })
    }
}

/// Parse a complete declaration, nothing may follow the name.
impl Parse for VarDecl {
    type Output = Self;
    type Err = CompileError;

    fn parse(input: &mut TokenStream) -> Result<Self, CompileError> {
        let decl = VarDecl::parse_parts(input)?;
        input.expect_end()?;
        Ok(decl)
    }
}

/// Allowed to fail because the lookahead is here and not in the delimiter list.
impl Parse for ParamDef {
    type Output = Option<Self>;
    type Err = CompileError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, CompileError> {
        match input.peek_kind() {
            None | Some(TokenKind::RightParen) => Ok(None),
            Some(_) => Ok(Some(ParamDef {
                decl: VarDecl::parse_parts(input)?,
            })),
        }
    }
}

/// Identifier that names a new variable or parameter.
///
/// Unlike function names, these may start with a digit. A bare number
/// is rejected because it would read back as a literal.
fn parse_name(input: &mut TokenStream) -> Result<Ident, CompileError> {
    use TokenKind as T;

    match input.peek() {
        None => Err(ErrorKind::UnexpectedEndOfLine.at(input.end_pos())),
        Some(token) => {
            let text = input.fragment_span(&token.span);
            match token.kind {
                T::Ident => Ident::parse(input),
                T::RightParen | T::Comma => Err(ErrorKind::UnexpectedEndOfLine.at(token.span.start)),
                T::Int | T::Float | T::Keyword(_) => Err(ErrorKind::InvalidIdentifier(text.into()).at(token.span.start)),
                _ => Err(ErrorKind::UnexpectedToken(text.into()).at(token.span.start)),
            }
        }
    }
}
