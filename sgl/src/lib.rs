pub mod bytecode;
pub mod constants;
mod disasm;
mod error;
mod stack;
mod store;
pub mod types;
mod vm;

pub use self::{
    disasm::Disassembler,
    error::{DecodeError, DuplicateType, Fault, SglError, SglResult},
    stack::{OperandStack, StackValue},
    store::VariableStore,
    types::{Type, TypeRegistry},
    vm::{Flow, Halt, Status, Vm, VmConf},
};

pub mod prelude {
    pub use super::{
        bytecode::{Instr, Opcode},
        disasm::Disassembler,
        error::{Fault, SglError, SglResult},
        types::{Type, TypeRegistry},
        vm::{Halt, Status, Vm, VmConf},
    };
}
