use sgl::{bytecode::Instr, TypeRegistry};
use sgl_compiler::{compile_str, CompilationContext, CompileError, ErrorKind};

fn compile_err(source: &str) -> CompileError {
    compile_str(source).unwrap_err()
}

#[test]
fn test_empty_source() {
    assert_eq!(compile_err("").kind, ErrorKind::SourceInvalid);
    assert_eq!(compile_err("  // comment only\n/* */\n").kind, ErrorKind::SourceInvalid);
}

#[test]
fn test_duplicate_identifier() {
    let err = compile_err("int32 a = 1;\nint32 b;\nint32 a;\n");
    assert_eq!(err.kind, ErrorKind::DuplicateIdentifier("a".into()));
    assert_eq!(err.pos, Some(28));
    assert_eq!(err.line, Some(3));
    assert_eq!(err.to_string(), "line 3: identifier 'a' already declared");
}

#[test]
fn test_line_after_comments() {
    // Stripped comments do not shift reported lines.
    let err = compile_err("/* one\ntwo */ int32 a;\n// three\nint64 b;");
    assert_eq!(err.kind, ErrorKind::UnknownType("int64".into()));
    assert_eq!(err.line, Some(4));
}

#[test]
fn test_unclosed_block_comment() {
    let err = compile_err("int32 a;\n/* open\nint32 b;");
    assert_eq!(err.kind, ErrorKind::UnclosedBlockComment);
    assert_eq!(err.line, Some(2));
}

#[test]
fn test_missing_semicolon() {
    let err = compile_err("int32 x = 1;\nint32 y = 2\n");
    assert_eq!(err.kind, ErrorKind::MissingSemicolon);
    assert_eq!(err.line, Some(2));

    let err = compile_err("func: f() { }\nint32 x");
    assert_eq!(err.kind, ErrorKind::MissingSemicolon);
    assert_eq!(err.line, Some(2));
}

#[test]
fn test_missing_curly_brace() {
    let err = compile_err("func: f() {\n    int32 a;\n");
    assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
    assert_eq!(err.line, Some(1));

    let err = compile_err("int32 a;\n}\n");
    assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
    assert_eq!(err.line, Some(2));

    let err = compile_err("func: f(); int32 a;");
    assert_eq!(err.kind, ErrorKind::MissingCurlyBrace);
}

#[test]
fn test_missing_parenthesis() {
    let err = compile_err("int32 a;\nint32 b = (1 + 2;\n");
    assert_eq!(err.kind, ErrorKind::MissingParenthesis);
    assert_eq!(err.line, Some(2));

    // Balanced overall, but split across statements.
    let err = compile_err("int32 a = (1; int32 b = 2);");
    assert_eq!(err.kind, ErrorKind::MissingParenthesis);

    let err = compile_err("func: f { }");
    assert_eq!(err.kind, ErrorKind::MissingParenthesis);
}

#[test]
fn test_unknown_type() {
    assert_eq!(compile_err("int64 x = 1;").kind, ErrorKind::UnknownType("int64".into()));
    assert_eq!(
        compile_err("func: f(string s) { }").kind,
        ErrorKind::UnknownType("string".into())
    );
    assert_eq!(
        compile_err("func: f() -> string { }").kind,
        ErrorKind::UnknownType("string".into())
    );
}

#[test]
fn test_invalid_identifier() {
    let err = compile_err("func: 1st() { }");
    assert_eq!(err.kind, ErrorKind::InvalidIdentifier("1st".into()));
    assert_eq!(err.pos, Some(6));

    assert_eq!(compile_err("int32 9;").kind, ErrorKind::InvalidIdentifier("9".into()));
}

#[test]
fn test_unexpected_end_of_line() {
    assert_eq!(compile_err("int32;").kind, ErrorKind::UnexpectedEndOfLine);
    assert_eq!(compile_err("int32 = 5;").kind, ErrorKind::UnexpectedEndOfLine);
    assert_eq!(compile_err("func: f(int32) { }").kind, ErrorKind::UnexpectedEndOfLine);
}

#[test]
fn test_missing_operands() {
    assert_eq!(compile_err("int32 a = * 2;").kind, ErrorKind::MissingLeftOperand("*"));
    assert_eq!(compile_err("= 5;").kind, ErrorKind::MissingLeftOperand("="));
    assert_eq!(compile_err("int32 a = 2 +;").kind, ErrorKind::MissingRightOperand("+"));
    assert_eq!(compile_err("int32 a =;").kind, ErrorKind::MissingRightOperand("="));
}

#[test]
fn test_void_usage() {
    assert_eq!(compile_err("void v;").kind, ErrorKind::IllegalVoidUsage);
    assert_eq!(compile_err("int32 a = int32 b;").kind, ErrorKind::IllegalVoidUsage);
    assert_eq!(compile_err("func: f(void v) { }").kind, ErrorKind::IllegalVoidUsage);
    assert_eq!(
        compile_err("int32 a = 1 + int32 b;").kind,
        ErrorKind::IllegalVoidOperand("+")
    );
}

#[test]
fn test_illegal_cast() {
    let mut registry = TypeRegistry::with_builtins();
    registry.register("bool", 1, 1).unwrap();
    let mut ctx = CompilationContext::new(&registry);

    let err = ctx.compile("bool flag;\nint32 x = flag;").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::IllegalCast {
            from: "bool".into(),
            to: "int32".into()
        }
    );
    assert_eq!(err.line, Some(2));
}

#[test]
fn test_not_a_constant_or_variable() {
    assert_eq!(
        compile_err("int32 a = b;").kind,
        ErrorKind::NotAConstantOrVariable("b".into())
    );
    assert_eq!(
        compile_err("float f = 1.5;").kind,
        ErrorKind::NotAConstantOrVariable("1.5".into())
    );
    assert_eq!(compile_err("int32 a = ();").kind, ErrorKind::NotAConstantOrVariable("()".into()));
    assert_eq!(compile_err("int32 a;\nint32 b = -a;").kind, ErrorKind::NotAConstantOrVariable("-a".into()));
}

#[test]
fn test_undeclared_identifier() {
    let err = compile_err("int32 a;\nb = 1;");
    assert_eq!(err.kind, ErrorKind::UndeclaredIdentifier("b".into()));
    assert_eq!(err.line, Some(2));
}

#[test]
fn test_unexpected_token() {
    assert_eq!(compile_err("int32 a b;").kind, ErrorKind::UnexpectedToken("b".into()));
    assert_eq!(compile_err("int32 a;\na 5;").kind, ErrorKind::UnexpectedToken("5".into()));
}

#[test]
fn test_unknown_character() {
    let err = compile_err("int32 a = 1;\nint32 b = 1 # 2;");
    assert_eq!(err.kind, ErrorKind::UnknownCharacter('#'));
    assert_eq!(err.pos, Some(25));
    assert_eq!(err.line, Some(2));
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(
        compile_err("int32 a = 2147483648;").kind,
        ErrorKind::IntegerOutOfRange("2147483648".into())
    );
}

#[test]
fn test_unsupported_operand() {
    assert_eq!(
        compile_err("float f;\nfloat g = f + 1;").kind,
        ErrorKind::UnsupportedOperand {
            op: "+",
            ty: "float".into()
        }
    );
}

#[test]
fn test_duplicate_functions() {
    let err = compile_err("func: f() { }\nfunc: f() { }");
    assert_eq!(err.kind, ErrorKind::DuplicateIdentifier("f".into()));
    assert_eq!(err.line, Some(2));

    let err = compile_err("func: f(int32 a, float a) { }");
    assert_eq!(err.kind, ErrorKind::DuplicateIdentifier("a".into()));
}

#[test]
fn test_too_many_variables() {
    let source: String = (0..=256).map(|index| format!("int32 v{};\n", index)).collect();

    let err = compile_err(&source);
    assert_eq!(err.kind, ErrorKind::TooManyVariables);
    assert_eq!(err.line, Some(257));

    let source: String = (0..256).map(|index| format!("int32 v{};\n", index)).collect();
    assert_eq!(compile_str(&source).unwrap().symbols.len(), 256);
}

#[test]
fn test_unused_value() {
    let err = compile_err("int32 x = 1;\nx;");
    assert_eq!(err.kind, ErrorKind::UnusedValue("int32".into()));
    assert_eq!(err.pos, Some(13));
    assert_eq!(err.line, Some(2));

    let err = compile_err("int32 x;\nfloat f;\n(x + 1) * 2;");
    assert_eq!(err.kind, ErrorKind::UnusedValue("int32".into()));
    assert_eq!(err.line, Some(3));

    assert_eq!(compile_err("float f;\nf;").kind, ErrorKind::UnusedValue("float".into()));
    assert_eq!(compile_err("7;").kind, ErrorKind::UnusedValue("int32".into()));
}

#[test]
fn test_failed_statement_rolls_back() {
    let registry = TypeRegistry::with_builtins();
    let mut ctx = CompilationContext::new(&registry);
    ctx.compile_expr("int32 a = 4;").unwrap();

    let err = ctx.compile_expr("int32 q = 1 + zz").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAConstantOrVariable("zz".into()));
    assert_eq!(ctx.instrs(), &[Instr::ConstInt(4), Instr::Store(0)]);
    assert_eq!(ctx.symbols().find_slot("q"), None);
    assert_eq!(ctx.symbols().len(), 1);

    // Same name can be declared again, in the same slot.
    let retry = ctx.compile_expr("int32 q = 2").unwrap();
    assert_eq!(retry.slot, Some(1));
    assert_eq!(
        ctx.instrs(),
        &[Instr::ConstInt(4), Instr::Store(0), Instr::ConstInt(2), Instr::Store(1)]
    );

    // Lexer errors leave the state alone too.
    ctx.compile_expr("int32 r = a # 1").unwrap_err();
    assert_eq!(ctx.symbols().find_slot("r"), None);
    assert_eq!(ctx.instrs().len(), 4);
}
