mod emit;
mod expr;
mod symbol;

use std::fmt;

use log::{debug, trace};
use sgl::{bytecode::Instr, Type, TypeRegistry};
use smol_str::SmolStr;

pub use self::{
    emit::Emitter,
    expr::{ExprResult, Operator},
    symbol::{Symbol, SymbolTable},
};
use crate::{
    balance,
    error::{CompileError, CompileResult, ErrorKind},
    lex::tokenize,
    parsing::{FuncBody, FuncDef, Ident, Parse},
    scan::{Preprocessed, UnitKind},
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

/// State of one compilation.
///
/// The type registry is owned by the host and only read. Symbols,
/// function signatures and emitted code belong to the context and are
/// reset at the start of every [`compile`](Self::compile).
pub struct CompilationContext<'r> {
    registry: &'r TypeRegistry,
    symbols: SymbolTable,
    functions: Vec<FuncSig>,
    code: Emitter,
}

impl<'r> CompilationContext<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            symbols: SymbolTable::new(),
            functions: vec![],
            code: Emitter::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Hosts may free slots between expressions.
    #[inline]
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    #[inline]
    pub fn functions(&self) -> &[FuncSig] {
        &self.functions
    }

    #[inline]
    pub fn instrs(&self) -> &[Instr] {
        self.code.instrs()
    }

    /// Clear the internal state so the context can be reused.
    pub fn reset(&mut self) {
        self.symbols.reset();
        self.functions.clear();
        self.code.clear();
    }

    /// Compile a whole program.
    ///
    /// Stops at the first error, which is located in `source`.
    pub fn compile(&mut self, source: &str) -> CompileResult<Compilation> {
        self.reset();

        let pre = Preprocessed::new(source)?;
        pre.check_nesting().map_err(|err| pre.locate(err, source))?;
        let units = pre.units().map_err(|err| pre.locate(err, source))?;

        for unit in units {
            let text = &pre.text()[unit.span.clone()];
            self.compile_unit(unit.kind, text)
                .map_err(|err| pre.locate(err.offset(unit.span.start), source))?;
        }

        Ok(Compilation {
            instrs: self.code.instrs().to_vec(),
            bytecode: self.code.assemble(),
            symbols: self.symbols.clone(),
            functions: self.functions.clone(),
        })
    }

    /// Compile a single expression on top of the current state.
    ///
    /// Symbols declared by earlier calls stay visible, so a host can
    /// feed a script one statement at a time. Emitted instructions
    /// accumulate in [`instrs`](Self::instrs).
    ///
    /// A failed expression leaves no trace: its declarations and
    /// instructions are rolled back before the error is returned.
    pub fn compile_expr(&mut self, expr: &str) -> CompileResult<ExprResult> {
        let symbols = self.symbols.clone();
        let emitted = self.code.len();

        let result = self.compile_statement(expr);
        if result.is_err() {
            trace!("rolling back to {} instructions", emitted);
            self.symbols = symbols;
            self.code.truncate(emitted);
        }

        result
    }

    fn compile_statement(&mut self, expr: &str) -> CompileResult<ExprResult> {
        let tokens = tokenize(expr).map_err(|err| CompileError::from(err).with_line(expr))?;
        check_parens(&tokens).map_err(|err| err.with_line(expr))?;

        let tokens = strip_terminator(&tokens);
        if tokens.is_empty() {
            return Err(CompileError::new(ErrorKind::SourceInvalid));
        }

        self.expr(expr, tokens).map_err(|err| err.with_line(expr))
    }

    fn compile_unit(&mut self, kind: UnitKind, text: &str) -> CompileResult<()> {
        match kind {
            UnitKind::Function => self.function(text),
            UnitKind::Global => {
                let tokens = tokenize(text)?;
                check_parens(&tokens)?;

                let statement = strip_terminator(&tokens);
                if statement.is_empty() {
                    trace!("skipping empty statement");
                    return Ok(());
                }
                // Nothing pops a value left behind at the top level.
                let result = self.expr(text, statement)?;
                if !result.ty.is_void() {
                    return Err(ErrorKind::UnusedValue(result.ty.name).at(statement[0].span.start));
                }
                Ok(())
            }
        }
    }

    /// Check a function declaration and record its signature.
    ///
    /// The body is not compiled, only its braces are matched.
    fn function(&mut self, text: &str) -> CompileResult<()> {
        let body = FuncBody::locate(text)?;
        let header = &text[..body.span.start];

        let tokens = tokenize(header)?;
        check_parens(&tokens)?;
        let mut input = TokenStream::new(header, &tokens);
        let def = FuncDef::parse(&mut input)?;

        let name = def.name.name.clone();
        if self.functions.iter().any(|func| func.name == name) {
            return Err(ErrorKind::DuplicateIdentifier(name).at(def.name.token.span.start));
        }

        let mut params: Vec<(SmolStr, Type)> = Vec::with_capacity(def.params.items.len());
        for param in def.params.iter() {
            let decl = &param.decl;
            let ty = self.resolve_type(&decl.ty)?;
            if ty.is_void() {
                return Err(ErrorKind::IllegalVoidUsage.at(decl.ty.token.span.start));
            }
            if params.iter().any(|(param_name, _)| *param_name == decl.name.name) {
                return Err(ErrorKind::DuplicateIdentifier(decl.name.name.clone()).at(decl.name.token.span.start));
            }
            params.push((decl.name.name.clone(), ty));
        }

        let ret = match &def.ret {
            Some(ident) => self.resolve_type(ident)?,
            None => Type::void(),
        };

        let sig = FuncSig { name, params, ret };
        debug!("declared function {} with body '{}'", sig, body.inner(text).trim());
        self.functions.push(sig);

        Ok(())
    }

    fn resolve_type(&self, ident: &Ident) -> CompileResult<Type> {
        self.registry
            .lookup(&ident.name)
            .cloned()
            .ok_or_else(|| ErrorKind::UnknownType(ident.name.clone()).at(ident.token.span.start))
    }
}

fn check_parens(tokens: &[Token]) -> CompileResult<()> {
    balance::check(tokens, Token::paren).map_err(|imbalance| {
        let pos = tokens.get(imbalance.position()).map_or(0, |t| t.span.start);
        ErrorKind::MissingParenthesis.at(pos)
    })
}

/// Drop a single trailing semicolon.
fn strip_terminator(tokens: &[Token]) -> &[Token] {
    match tokens.split_last() {
        Some((last, rest)) if last.kind == TokenKind::Semicolon => rest,
        _ => tokens,
    }
}

/// Declared function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncSig {
    pub name: SmolStr,
    pub params: Vec<(SmolStr, Type)>,
    pub ret: Type,
}

impl fmt::Display for FuncSig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, (name, ty)) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", ty, name)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// Output of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub instrs: Vec<Instr>,
    pub bytecode: Vec<u8>,
    /// Live variables at the end of the program.
    pub symbols: SymbolTable,
    pub functions: Vec<FuncSig>,
}
