//! Bytecode emitter.
use log::trace;
use sgl::bytecode::{assemble, Instr};

/// Instructions emitted by the compiler, in execution order.
#[derive(Debug, Default, Clone)]
pub struct Emitter {
    code: Vec<Instr>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn emit(&mut self, instr: Instr) {
        trace!("emit {}", instr);
        self.code.push(instr);
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.code
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn clear(&mut self) {
        self.code.clear();
    }

    /// Drop everything emitted after the first `len` instructions.
    pub fn truncate(&mut self, len: usize) {
        self.code.truncate(len);
    }

    /// Encode the emitted instructions into bytecode.
    pub fn assemble(&self) -> Vec<u8> {
        assemble(&self.code)
    }
}
