pub mod balance;
pub mod compile;
pub mod constants;
mod error;
pub mod lex;
pub mod literal;
pub mod parsing;
pub mod scan;
pub mod token_stream;
pub mod tokens;

pub use self::{
    compile::{Compilation, CompilationContext, ExprResult, FuncSig, Symbol, SymbolTable},
    error::{line_number, CompileError, CompileResult, ErrorKind},
};

use sgl::TypeRegistry;

/// Compile a program against the built-in types.
pub fn compile_str(source: &str) -> CompileResult<Compilation> {
    let registry = TypeRegistry::with_builtins();
    CompilationContext::new(&registry).compile(source)
}
