use smol_str::SmolStr;

use super::Parse;
use crate::{
    error::CompileError,
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

#[derive(Debug, Clone)]
pub struct Ident {
    pub token: Token,
    pub name: SmolStr,
}

impl Parse for Ident {
    type Output = Self;
    type Err = CompileError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, CompileError> {
        let token = input.consume(TokenKind::Ident)?;
        let name = input.fragment_span(&token.span).into();
        Ok(Ident { token, name })
    }
}
