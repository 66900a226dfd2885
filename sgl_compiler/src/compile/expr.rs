//! Expression compiler.
//!
//! Expressions are split at the top level operator with the lowest
//! precedence. Equal precedence splits at the right-most operator, so
//! the left side holds the operands that evaluate first.
use std::fmt;

use log::debug;
use sgl::{
    bytecode::{cast_instruction, Instr},
    constants::INT32,
    Type,
};

use super::CompilationContext;
use crate::{
    balance,
    error::{CompileResult, ErrorKind},
    literal::{is_float_literal, is_int_literal},
    parsing::{Parse, VarDecl},
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

/// Type of the value an expression leaves on the operand stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprResult {
    /// `void` when nothing is left on the stack.
    pub ty: Type,
    /// Variable slot the expression loaded, declared or stored to.
    pub slot: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Operator {
    fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;

        match kind {
            T::Eq => Some(Operator::Assign),
            T::Plus => Some(Operator::Add),
            T::Minus => Some(Operator::Sub),
            T::Star => Some(Operator::Mul),
            T::Slash => Some(Operator::Div),
            T::Percent => Some(Operator::Mod),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Assign                                  => 0,
            Operator::Add | Operator::Sub                     => 1,
            Operator::Mul | Operator::Div | Operator::Mod     => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Assign => "=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
        }
    }

    /// Arithmetic instruction, `None` for assignment.
    fn instr(self) -> Option<Instr> {
        match self {
            Operator::Assign => None,
            Operator::Add => Some(Instr::Add),
            Operator::Sub => Some(Instr::Sub),
            Operator::Mul => Some(Instr::Mul),
            Operator::Div => Some(Instr::Div),
            Operator::Mod => Some(Instr::Mod),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Strip parentheses that enclose the whole expression.
///
/// `(a) + (b)` starts and ends with parentheses but is left alone.
pub(crate) fn strip_parens(mut tokens: &[Token]) -> &[Token] {
    while balance::is_wrapped(tokens, Token::paren) {
        tokens = &tokens[1..tokens.len() - 1];
    }
    tokens
}

/// Index of the operator to split the expression at.
pub(crate) fn split_point(tokens: &[Token]) -> Option<(usize, Operator)> {
    let mut best: Option<(usize, Operator)> = None;
    let mut prev: Option<TokenKind> = None;

    for (index, depth, token) in balance::depths(tokens, Token::paren) {
        // A minus at the start, or after another operator or an
        // opening parenthesis, is the sign of a literal.
        let is_sign = token.kind == TokenKind::Minus
            && prev.map_or(true, |kind| kind == TokenKind::LeftParen || Operator::from_token(kind).is_some());
        prev = Some(token.kind);

        if depth > 0 || is_sign {
            continue;
        }

        if let Some(op) = Operator::from_token(token.kind) {
            match best {
                Some((_, current)) if op.precedence() > current.precedence() => {}
                _ => best = Some((index, op)),
            }
        }
    }

    best
}

/// Source text covered by the tokens.
fn fragment<'s>(source: &'s str, tokens: &[Token]) -> &'s str {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => source.get(first.span.start..last.span.end).unwrap_or_default(),
        _ => "",
    }
}

impl<'r> CompilationContext<'r> {
    /// Compile the expression made up of the tokens.
    ///
    /// Token spans are positions in `source`.
    pub(crate) fn expr(&mut self, source: &str, tokens: &[Token]) -> CompileResult<ExprResult> {
        let stripped = strip_parens(tokens);
        if stripped.is_empty() {
            let pos = tokens.first().map_or(0, |t| t.span.start);
            return Err(ErrorKind::NotAConstantOrVariable(fragment(source, tokens).into()).at(pos));
        }

        let (index, op) = match split_point(stripped) {
            Some(split) => split,
            None => return self.operand(source, stripped),
        };

        let op_token = &stripped[index];
        let (left, right) = (&stripped[..index], &stripped[index + 1..]);
        if left.is_empty() {
            return Err(ErrorKind::MissingLeftOperand(op.symbol()).at(op_token.span.start));
        }
        if right.is_empty() {
            return Err(ErrorKind::MissingRightOperand(op.symbol()).at(op_token.span.end));
        }

        match op.instr() {
            Some(instr) => self.arithmetic(source, left, right, op, instr, op_token),
            None => self.assign(source, left, right, op_token),
        }
    }

    fn assign(&mut self, source: &str, target: &[Token], value: &[Token], op_token: &Token) -> CompileResult<ExprResult> {
        let target = strip_parens(target);

        // Target slot is resolved before the value, so a declaration
        // is visible to its own initializer.
        let (slot, ty) = match target {
            [token] if token.kind == TokenKind::Ident => {
                let name = fragment(source, target);
                match self.symbols.lookup(name) {
                    Some((slot, symbol)) => (slot, symbol.ty.clone()),
                    None if self.registry.is_registered(name) => {
                        return Err(ErrorKind::UnexpectedEndOfLine.at(token.span.end))
                    }
                    None => return Err(ErrorKind::UndeclaredIdentifier(name.into()).at(token.span.start)),
                }
            }
            [first, _, ..] if first.kind == TokenKind::Ident => self.declare_variable(source, target)?,
            _ => return Err(ErrorKind::MissingLeftOperand(Operator::Assign.symbol()).at(op_token.span.start)),
        };

        let value_pos = value.first().map_or(op_token.span.end, |t| t.span.start);
        let result = self.expr(source, value)?;
        if result.ty.is_void() {
            return Err(ErrorKind::IllegalVoidUsage.at(value_pos));
        }

        self.cast(&result.ty, &ty, value_pos)?;
        self.code.emit(Instr::Store(slot));

        Ok(ExprResult {
            ty: Type::void(),
            slot: Some(slot),
        })
    }

    fn arithmetic(
        &mut self,
        source: &str,
        left: &[Token],
        right: &[Token],
        op: Operator,
        instr: Instr,
        op_token: &Token,
    ) -> CompileResult<ExprResult> {
        let void_operand = || ErrorKind::IllegalVoidOperand(op.symbol()).at(op_token.span.start);

        let lhs = self.expr(source, left)?;
        if lhs.ty.is_void() {
            return Err(void_operand());
        }

        let rhs = self.expr(source, right)?;
        if rhs.ty.is_void() {
            return Err(void_operand());
        }

        self.cast(&rhs.ty, &lhs.ty, op_token.span.start)?;

        if lhs.ty.name != INT32 {
            return Err(ErrorKind::UnsupportedOperand {
                op: op.symbol(),
                ty: lhs.ty.name.clone(),
            }
            .at(op_token.span.start));
        }

        self.code.emit(instr);

        Ok(ExprResult { ty: lhs.ty, slot: None })
    }

    /// Expression without a top level operator.
    fn operand(&mut self, source: &str, tokens: &[Token]) -> CompileResult<ExprResult> {
        use TokenKind as T;

        let text = fragment(source, tokens);
        let pos = tokens.first().map_or(0, |t| t.span.start);

        match tokens {
            [token] if token.kind == T::Ident => match self.symbols.lookup(text) {
                Some((slot, symbol)) => {
                    let ty = symbol.ty.clone();
                    self.code.emit(Instr::Load(slot));
                    Ok(ExprResult { ty, slot: Some(slot) })
                }
                None if self.registry.is_registered(text) => Err(ErrorKind::UnexpectedEndOfLine.at(token.span.end)),
                None => Err(ErrorKind::NotAConstantOrVariable(text.into()).at(pos)),
            },
            [token] if token.kind == T::Int => self.int_constant(text, pos),
            [sign, token] if sign.kind == T::Minus && token.kind == T::Int => {
                let literal = format!("-{}", fragment(source, &tokens[1..]));
                self.int_constant(&literal, pos)
            }
            [first, _, ..] if first.kind == T::Ident => {
                let (slot, _) = self.declare_variable(source, tokens)?;
                Ok(ExprResult {
                    ty: Type::void(),
                    slot: Some(slot),
                })
            }
            _ => {
                let compact: String = text.split_whitespace().collect();
                if is_float_literal(&compact) {
                    debug!("float literal '{}' has no constant instruction", compact);
                }
                Err(ErrorKind::NotAConstantOrVariable(text.into()).at(pos))
            }
        }
    }

    fn int_constant(&mut self, literal: &str, pos: usize) -> CompileResult<ExprResult> {
        if !is_int_literal(literal) {
            return Err(ErrorKind::NotAConstantOrVariable(literal.into()).at(pos));
        }

        let value = literal
            .parse::<i32>()
            .map_err(|_| ErrorKind::IntegerOutOfRange(literal.into()).at(pos))?;
        let ty = self
            .registry
            .lookup(INT32)
            .cloned()
            .ok_or_else(|| ErrorKind::UnknownType(INT32.into()).at(pos))?;

        self.code.emit(Instr::ConstInt(value));

        Ok(ExprResult { ty, slot: None })
    }

    /// Declare the variable named by `<type> <identifier>`.
    fn declare_variable(&mut self, source: &str, tokens: &[Token]) -> CompileResult<(u8, Type)> {
        let type_name = fragment(source, &tokens[..1]);
        let ty = match self.registry.lookup(type_name) {
            Some(ty) => ty.clone(),
            // Variable followed by something that is not an operator.
            None if self.symbols.find_slot(type_name).is_some() => {
                let token = &tokens[1];
                let text = fragment(source, &tokens[1..2]);
                return Err(ErrorKind::UnexpectedToken(text.into()).at(token.span.start));
            }
            None => return Err(ErrorKind::UnknownType(type_name.into()).at(tokens[0].span.start)),
        };

        let mut input = TokenStream::new(source, tokens);
        let decl = VarDecl::parse(&mut input)?;

        if ty.is_void() {
            return Err(ErrorKind::IllegalVoidUsage.at(decl.ty.token.span.start));
        }

        let slot = self
            .symbols
            .declare(&decl.name.name, ty.clone())
            .map_err(|kind| kind.at(decl.name.token.span.start))?;
        debug!("declared {} {} in slot {}", ty, decl.name.name, slot);

        Ok((slot, ty))
    }

    /// Convert the value on top of the stack, when the types differ.
    fn cast(&mut self, from: &Type, to: &Type, pos: usize) -> CompileResult<()> {
        if from == to {
            return Ok(());
        }

        let instr = cast_instruction(from, to).ok_or_else(|| {
            ErrorKind::IllegalCast {
                from: from.name.clone(),
                to: to.name.clone(),
            }
            .at(pos)
        })?;
        self.code.emit(instr);

        Ok(())
    }
}
