//! Syntax of declarations and function signatures.
mod decl;
mod delim;
mod func;
mod ident;

pub use self::{
    decl::{ParamDef, VarDecl},
    delim::{Comma, Delimited, DelimitedItem},
    func::{FuncBody, FuncDef},
    ident::Ident,
};

use crate::token_stream::TokenStream;

pub trait Parse: Sized {
    type Output;
    type Err;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}
