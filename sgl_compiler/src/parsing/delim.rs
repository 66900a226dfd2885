//! Delimited list.
use super::Parse;
use crate::{
    error::CompileError,
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

#[derive(Debug)]
pub struct Delimited<T, D> {
    pub items: Vec<DelimitedItem<T, D>>,
}

#[derive(Debug)]
pub struct DelimitedItem<T, D> {
    pub item: T,
    pub delim: Option<D>,
}

#[derive(Debug)]
pub struct Comma {
    pub token: Token,
}

impl<T, D> Delimited<T, D> {
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.item)
    }

    /// Delimiter after the last item, if the list has one.
    pub fn trailing(&self) -> Option<&D> {
        self.items.last().and_then(|item| item.delim.as_ref())
    }
}

impl<T, D> Parse for Delimited<T, D>
where
    T: Parse<Output = Option<T>, Err = CompileError>,
    D: Parse<Output = Option<D>, Err = CompileError>,
{
    type Output = Self;
    type Err = CompileError;

    fn parse(input: &mut TokenStream) -> Result<Self, CompileError> {
        let mut items = vec![];

        while let Some(item) = T::parse(input)? {
            let delim = D::parse(input)?;
            let done = delim.is_none();
            items.push(DelimitedItem { item, delim });

            if done {
                break;
            }
        }

        Ok(Delimited { items })
    }
}

/// Parse a comma token into an AST node.
///
/// Allowed to fail because the lookahead is here and not in the delimiter list.
impl Parse for Comma {
    type Output = Option<Self>;
    type Err = CompileError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, CompileError> {
        Ok(match input.peek_kind() {
            Some(TokenKind::Comma) => Some(Comma {
                token: input.consume(TokenKind::Comma)?,
            }),
            _ => None,
        })
    }
}
