//! Result and errors.
use smol_str::SmolStr;
use thiserror::Error;

pub type SglResult<T> = std::result::Result<T, SglError>;

#[derive(Debug, Error)]
pub enum SglError {
    /// VM fault during interpreter loop.
    #[error("runtime error: {0}")]
    Runtime(#[from] Fault),
    #[error("bytecode error: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Type(#[from] DuplicateType),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

/// Fatal condition that halts the virtual machine.
///
/// There is no unwinding. The machine stops at the faulting
/// instruction and reports the fault as its terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("stack overflow: pushing {requested} bytes at position {position} exceeds capacity {capacity}")]
    StackOverflow {
        requested: usize,
        position: usize,
        capacity: usize,
    },
    #[error("stack underflow: popping {requested} bytes at position {position}")]
    StackUnderflow { requested: usize, position: usize },
    #[error("division by zero at {offset:04X}")]
    DivideByZero { offset: usize },
    #[error("unknown opcode {byte:#04X} at {offset:04X}")]
    UnknownOpcode { offset: usize, byte: u8 },
    #[error("instruction {opcode} at {offset:04X} runs past the end of the bytecode")]
    TruncatedInstruction { offset: usize, opcode: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode {byte:#04X} at {offset:04X}")]
    UnknownOpcode { offset: usize, byte: u8 },
    #[error("truncated {opcode} at {offset:04X}")]
    Truncated { offset: usize, opcode: &'static str },
}

impl From<DecodeError> for Fault {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownOpcode { offset, byte } => Fault::UnknownOpcode { offset, byte },
            DecodeError::Truncated { offset, opcode } => Fault::TruncatedInstruction { offset, opcode },
        }
    }
}

/// Attempt to register a type name that is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type with specifier '{0}' already registered")]
pub struct DuplicateType(pub SmolStr);
