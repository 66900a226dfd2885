//! Disassembler.
use std::fmt::{self, Write as FmtWrite};

use crate::{bytecode::*, error::DecodeError};

pub struct Disassembler<'a> {
    bytecode: &'a [u8],
    cursor: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self {
            bytecode,
            cursor: 0,
        }
    }

    /// Write the listing of every instruction to the given writer.
    ///
    /// Decoding stops at the first byte that isn't a valid instruction,
    /// which is written as an error line.
    pub fn disassemble<W: FmtWrite>(&mut self, w: &mut W) -> fmt::Result {
        self.cursor = 0;

        while self.cursor < self.bytecode.len() {
            match self.next_instr() {
                Ok((offset, instr)) => writeln!(w, "{:04X}: {}", offset, instr)?,
                Err(err) => {
                    writeln!(w, "{:04X}: error: {}", self.cursor, err)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Decode the instruction at the cursor and advance past it.
    pub fn next_instr(&mut self) -> Result<(usize, Instr), DecodeError> {
        let offset = self.cursor;
        let (instr, size) = Instr::decode(self.bytecode, offset)?;
        self.cursor += size;
        Ok((offset, instr))
    }

    /// Decode every instruction in the buffer.
    pub fn instructions(bytecode: &[u8]) -> Result<Vec<Instr>, DecodeError> {
        let mut disasm = Disassembler::new(bytecode);
        let mut instrs = Vec::new();
        while disasm.cursor < bytecode.len() {
            let (_, instr) = disasm.next_instr()?;
            instrs.push(instr);
        }
        Ok(instrs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_listing() {
        let code = assemble(&[
            Instr::ConstInt(5),
            Instr::Store(0),
            Instr::Load(0),
            Instr::IntToFloat,
        ]);

        let mut buf = String::new();
        Disassembler::new(&code).disassemble(&mut buf).unwrap();

        assert_eq!(
            buf,
            "0000: CONST_INT 5\n0005: STORE 0\n0007: LOAD 0\n0009: INT_TO_FLOAT\n"
        );
    }

    #[test]
    fn test_listing_stops_at_bad_byte() {
        let mut code = assemble(&[Instr::Add]);
        code.push(0x80);
        code.extend(assemble(&[Instr::Sub]));

        let mut buf = String::new();
        Disassembler::new(&code).disassemble(&mut buf).unwrap();

        let lines: Vec<&str> = buf.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0000: ADD");
        assert!(lines[1].starts_with("0001: error: unknown opcode"));
    }

    #[test]
    fn test_instructions() {
        let instrs = [Instr::ConstInt(-2), Instr::Load(1), Instr::Mul];
        assert_eq!(Disassembler::instructions(&assemble(&instrs)), Ok(instrs.to_vec()));

        assert!(matches!(
            Disassembler::instructions(&[Opcode::Load.as_u8()]),
            Err(DecodeError::Truncated { offset: 0, .. })
        ));
    }
}
