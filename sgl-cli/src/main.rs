//! Entrypoint for CLI
use std::{
    error::Error,
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Parser, Subcommand};
use log::{error, info};
use sgl::{
    constants::{FLOAT, INT32},
    prelude::*,
};
use sgl_compiler::{compile_str, Compilation};

/// Extension of source files, anything else is treated as bytecode.
const SOURCE_EXT: &str = "sgl";
const BYTECODE_EXT: &str = "sglc";

#[derive(Parser)]
#[command(name = "sgl", version, about = "Compiler and virtual machine for SGL scripts")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile each source file and report pass or fail
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compile and execute a source file, then print its variables
    Run { file: PathBuf },
    /// Compile a source file into a bytecode file
    Build {
        file: PathBuf,
        /// Output path, defaults to the source path with a `.sglc` extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Disassemble a bytecode file, or a source file after compiling it
    Dis { file: PathBuf },
    /// Prompt for source files to check until `quit`
    Shell,
}

fn compile_file(path: &Path) -> Result<Compilation, Box<dyn Error>> {
    let source = fs::read_to_string(path)?;
    let compilation = compile_str(&source)?;
    info!("compiled {} into {} bytes", path.display(), compilation.bytecode.len());
    Ok(compilation)
}

/// Prints the outcome, returns whether the file compiled.
fn check_file(path: &Path) -> bool {
    match compile_file(path) {
        Ok(_) => {
            println!("{}: ok", path.display());
            true
        }
        Err(err) => {
            println!("{}: {}", path.display(), err);
            false
        }
    }
}

fn run_check(files: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let failed = files.iter().filter(|path| !check_file(path)).count();
    if failed > 0 {
        return Err(format!("{} of {} files failed to compile", failed, files.len()).into());
    }
    Ok(())
}

fn run_source(path: &Path) -> Result<(), Box<dyn Error>> {
    let compilation = compile_file(path)?;

    let mut vm = Vm::new(VmConf::default());

    let start = Instant::now();
    let result = vm.run(&compilation.bytecode);
    let end = Instant::now();

    println!(
        "time taken: {}ms",
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis

    if let Err(fault) = result {
        error!("execution halted at {:04X}", vm.pc());
        return Err(SglError::from(fault).into());
    }

    for (slot, symbol) in compilation.symbols.live() {
        let slot = slot as usize;
        // Never written slots hold the implicit zero.
        match symbol.ty.name.as_str() {
            INT32 => println!("{}: {} = {}", symbol.name, symbol.ty, vm.variable::<i32>(slot).unwrap_or_default()),
            FLOAT => println!("{}: {} = {}", symbol.name, symbol.ty, vm.variable::<f32>(slot).unwrap_or_default()),
            _ => println!("{}: {} = ?", symbol.name, symbol.ty),
        }
    }

    Ok(())
}

fn run_build(path: &Path, output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let compilation = compile_file(path)?;
    let output = output.unwrap_or_else(|| path.with_extension(BYTECODE_EXT));

    fs::write(&output, &compilation.bytecode).map_err(SglError::from)?;
    println!("wrote {} bytes to {}", compilation.bytecode.len(), output.display());

    Ok(())
}

fn read_bytecode(path: &Path) -> SglResult<Vec<u8>> {
    Ok(fs::read(path)?)
}

fn listing(bytecode: &[u8]) -> SglResult<String> {
    let mut listing = String::new();
    Disassembler::new(bytecode).disassemble(&mut listing)?;
    Ok(listing)
}

fn run_disassembler(path: &Path) -> Result<(), Box<dyn Error>> {
    let bytecode = if path.extension().map_or(false, |ext| ext == SOURCE_EXT) {
        compile_file(path)?.bytecode
    } else {
        read_bytecode(path)?
    };

    print!("{}", listing(&bytecode)?);

    Ok(())
}

fn run_shell() -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("file (or quit)> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        match line.trim() {
            "" => continue,
            "quit" => break,
            name => {
                check_file(Path::new(name));
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Check { files } => run_check(&files)?,
        Cmd::Run { file } => run_source(&file)?,
        Cmd::Build { file, output } => run_build(&file, output)?,
        Cmd::Dis { file } => run_disassembler(&file)?,
        Cmd::Shell => run_shell()?,
    }

    Ok(())
}
