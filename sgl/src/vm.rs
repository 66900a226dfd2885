//! Virtual machine.
use log::debug;
#[cfg(feature = "op_trace")]
use log::trace;

use crate::{
    bytecode::*,
    constants::*,
    error::Fault,
    stack::{OperandStack, StackValue},
    store::VariableStore,
};

pub struct Vm {
    stack: OperandStack,
    store: VariableStore,
    code: Vec<u8>,
    pc: usize,
    status: Status,
    conf: VmConf,
}

impl Vm {
    pub fn new(conf: VmConf) -> Self {
        Vm {
            stack: OperandStack::new(conf.stack_size.unwrap_or(DEFAULT_STACK_SIZE)),
            store: VariableStore::new(),
            code: Vec::new(),
            pc: 0,
            status: Status::Running,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &VmConf {
        &self.conf
    }

    /// Copy a program into the VM, discarding the state of any previous run.
    pub fn load_bytecode(&mut self, bytecode: &[u8]) {
        self.code.clear();
        self.code.extend_from_slice(bytecode);

        self.reset();
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Byte offset of the next instruction.
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    /// Value of a variable slot, reinterpreted as `T`.
    ///
    /// Returns `None` when the slot was never written.
    pub fn variable<T: StackValue>(&self, slot: usize) -> Option<T> {
        self.store.read(slot)
    }
}

/// Outcome of a single interpreter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// A fault was raised and recorded in the VM status.
    Error,
    /// Program counter has reached the end of the bytecode.
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted(Halt),
}

impl Status {
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }

    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Halted(Halt::Fault(fault)) => Some(fault),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Normal,
    Fault(Fault),
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
pub struct VmConf {
    /// Operand stack capacity in bytes.
    pub stack_size: Option<usize>,
}

/// Interpreter
impl Vm {
    /// Clear internal state in preparation for a fresh startup.
    fn reset(&mut self) {
        self.pc = 0;
        self.stack.clear();
        self.store.clear();
        self.status = Status::Running;
    }

    /// Load the bytecode and execute it to completion.
    pub fn run(&mut self, bytecode: &[u8]) -> Result<(), Fault> {
        self.load_bytecode(bytecode);
        self.execute()
    }

    /// Execute until the end of the bytecode or the first fault.
    pub fn execute(&mut self) -> Result<(), Fault> {
        while let Flow::Ok = self.step() {}

        self.check_fault()
    }

    /// Execute at most the given number of instructions.
    pub fn run_steps(&mut self, step_count: usize) -> Result<&Status, Fault> {
        for _ in 0..step_count {
            match self.step() {
                Flow::Ok => {}
                Flow::Error | Flow::Exit => break,
            }
        }

        self.check_fault()?;
        Ok(&self.status)
    }

    fn check_fault(&self) -> Result<(), Fault> {
        match self.status.fault() {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn set_fault(&mut self, fault: Fault) {
        debug!("vm halted at {:04X}: {fault}", self.pc);
        self.status = Status::Halted(Halt::Fault(fault));
    }

    fn step(&mut self) -> Flow {
        match self.status {
            Status::Running => {}
            Status::Halted(Halt::Normal) => return Flow::Exit,
            Status::Halted(Halt::Fault(_)) => return Flow::Error,
        }

        if self.pc >= self.code.len() {
            self.status = Status::Halted(Halt::Normal);
            return Flow::Exit;
        }

        match self.exec(self.pc) {
            Ok(next) => {
                self.pc = next;
                Flow::Ok
            }
            Err(fault) => {
                self.set_fault(fault);
                Flow::Error
            }
        }
    }

    /// Execute the instruction at the offset, returning the offset of the next one.
    #[inline]
    fn exec(&mut self, offset: usize) -> Result<usize, Fault> {
        let byte = self.code[offset];
        let opcode = Opcode::try_from(byte).map_err(|_| Fault::UnknownOpcode { offset, byte })?;

        let operand = offset + 1;
        let next = operand + opcode.operand_size();
        let truncated = || Fault::TruncatedInstruction {
            offset,
            opcode: opcode.mnemonic(),
        };
        if next > self.code.len() {
            return Err(truncated());
        }

        match opcode {
            // CONST_INT imm32
            //
            // Push the integer immediate.
            Opcode::ConstInt => {
                let value = i32::read_from_buffer(&self.code, operand).ok_or_else(truncated)?;
                op_trace_imm(offset, opcode, value);

                self.stack.push(value)?;
            }
            // STORE slot
            //
            // Pop a 32-bit cell and write it into the variable slot.
            Opcode::Store => {
                let slot = u8::read_from_buffer(&self.code, operand).ok_or_else(truncated)?;
                op_trace_imm(offset, opcode, slot);

                let cell = self.stack.pop::<u32>()?;
                self.store.write(slot as usize, cell);
            }
            // LOAD slot
            //
            // Push a copy of the variable slot. A slot never written reads as zero.
            Opcode::Load => {
                let slot = u8::read_from_buffer(&self.code, operand).ok_or_else(truncated)?;
                op_trace_imm(offset, opcode, slot);

                let cell = self.store.read::<u32>(slot as usize).unwrap_or(0);
                self.stack.push(cell)?;
            }
            Opcode::Add => {
                op_trace(offset, opcode);
                self.binary_op(|b, a| Ok(b.wrapping_add(a)))?;
            }
            Opcode::Sub => {
                op_trace(offset, opcode);
                self.binary_op(|b, a| Ok(b.wrapping_sub(a)))?;
            }
            Opcode::Mul => {
                op_trace(offset, opcode);
                self.binary_op(|b, a| Ok(b.wrapping_mul(a)))?;
            }
            // Truncating division, sign follows the dividend.
            Opcode::Div => {
                op_trace(offset, opcode);
                self.binary_op(|b, a| match a {
                    0 => Err(Fault::DivideByZero { offset }),
                    _ => Ok(b.wrapping_div(a)),
                })?;
            }
            Opcode::Mod => {
                op_trace(offset, opcode);
                self.binary_op(|b, a| match a {
                    0 => Err(Fault::DivideByZero { offset }),
                    _ => Ok(b.wrapping_rem(a)),
                })?;
            }
            Opcode::IntToFloat => {
                op_trace(offset, opcode);

                let value = self.stack.pop::<i32>()?;
                self.stack.push(value as f32)?;
            }
            // Truncates toward zero, saturating at the integer range. NaN becomes zero.
            Opcode::FloatToInt => {
                op_trace(offset, opcode);

                let value = self.stack.pop::<f32>()?;
                self.stack.push(value as i32)?;
            }
        }

        Ok(next)
    }

    /// Pop `a`, pop `b`, push `b op a`.
    #[inline]
    fn binary_op(&mut self, op: impl FnOnce(i32, i32) -> Result<i32, Fault>) -> Result<(), Fault> {
        let a = self.stack.pop::<i32>()?;
        let b = self.stack.pop::<i32>()?;
        self.stack.push(op(b, a)?)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(VmConf::default())
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(offset: usize, opcode: Opcode) {
    trace!("{:04X}: {}", offset, opcode);
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace_imm(offset: usize, opcode: Opcode, imm: impl std::fmt::Display) {
    trace!("{:04X}: {} {}", offset, opcode, imm);
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: usize, _: Opcode) {}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace_imm(_: usize, _: Opcode, _: impl std::fmt::Display) {}
