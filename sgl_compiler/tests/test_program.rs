use sgl::{bytecode::Instr, Disassembler, Type, TypeRegistry, Vm, VmConf};
use sgl_compiler::{compile_str, CompilationContext};

const SOURCE: &str = include_str!("program.sgl");

#[test]
fn test_functions() {
    let compilation = compile_str(SOURCE).unwrap();

    let signatures: Vec<String> = compilation.functions.iter().map(|f| f.to_string()).collect();
    assert_eq!(
        signatures,
        vec!["add(int32 a, int32 b) -> int32", "log_value(float value) -> void"]
    );

    // Function parameters do not occupy global slots.
    assert_eq!(compilation.symbols.find_slot("a"), None);
    assert_eq!(compilation.symbols.find_slot("c"), None);
}

#[test]
fn test_implicit_casts() {
    let compilation = compile_str(SOURCE).unwrap();

    assert_eq!(
        compilation.instrs,
        vec![
            Instr::ConstInt(3),
            Instr::Store(0),
            Instr::Load(0),
            Instr::ConstInt(2),
            Instr::Mul,
            Instr::IntToFloat,
            Instr::Store(1),
            Instr::Load(1),
            Instr::FloatToInt,
            Instr::Store(2),
        ]
    );

    let ratio = compilation.symbols.get(1).unwrap();
    assert_eq!(ratio.ty, Type::float());
    assert_eq!(compilation.symbols.find_slot("unset"), Some(3));
}

#[test]
fn test_run_program() {
    let compilation = compile_str(SOURCE).unwrap();

    let mut vm = Vm::new(VmConf::default());
    vm.run(&compilation.bytecode).unwrap();

    assert_eq!(vm.variable::<i32>(0), Some(3));
    assert_eq!(vm.variable::<f32>(1), Some(6.0));
    assert_eq!(vm.variable::<i32>(2), Some(6));
    // Declared without a value, never written.
    assert_eq!(vm.variable::<i32>(3), None);
    assert!(vm.status().is_halted());
}

#[test]
fn test_disassemble_program() {
    let compilation = compile_str(SOURCE).unwrap();

    let mut listing = String::new();
    Disassembler::new(&compilation.bytecode)
        .disassemble(&mut listing)
        .unwrap();

    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), compilation.instrs.len());
    assert_eq!(lines[0], "0000: CONST_INT 3");
    assert_eq!(lines[1], "0005: STORE 0");
    assert_eq!(lines[5], "000F: INT_TO_FLOAT");
}

#[test]
fn test_context_reuse() {
    let registry = TypeRegistry::with_builtins();
    let mut ctx = CompilationContext::new(&registry);

    let first = ctx.compile(SOURCE).unwrap();
    let second = ctx.compile(SOURCE).unwrap();

    // Every compilation starts over with fresh symbols.
    assert_eq!(first.bytecode, second.bytecode);
    assert_eq!(second.functions.len(), 2);
    assert_eq!(second.symbols.len(), 4);
}

#[test]
fn test_host_types() {
    let mut registry = TypeRegistry::with_builtins();
    registry.register_of::<u8>("byte").unwrap();
    let mut ctx = CompilationContext::new(&registry);

    let compilation = ctx.compile("func: send(byte b, int32 count) -> byte { }\nbyte flags;").unwrap();
    assert_eq!(compilation.functions[0].to_string(), "send(byte b, int32 count) -> byte");
    assert_eq!(compilation.symbols.get(0).map(|s| s.ty.size), Some(1));
    assert!(compilation.bytecode.is_empty());
}

#[test]
fn test_function_body_not_compiled() {
    let source = "func: greet() {\n    print(\"hi\"); # anything\n}\nint32 done = 1;";
    let compilation = compile_str(source).unwrap();

    assert_eq!(compilation.functions[0].to_string(), "greet() -> void");
    assert_eq!(compilation.instrs, vec![Instr::ConstInt(1), Instr::Store(0)]);
}
