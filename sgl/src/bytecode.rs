//! Instruction set and encoding.
//!
//! Every instruction is one opcode byte followed by a fixed number of
//! operand bytes determined by the opcode.
use std::fmt;

use thiserror::Error;

use crate::{constants::*, error::DecodeError, types::Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Push a 32-bit integer immediate.
    ConstInt = 0,
    /// Pop a value into the variable slot.
    Store = 1,
    /// Push a copy of the variable slot.
    Load = 2,
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    Mod = 7,
    IntToFloat = 8,
    FloatToInt = 9,
}

impl Opcode {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Number of operand bytes following the opcode.
    #[inline]
    pub fn operand_size(&self) -> usize {
        match self {
            Self::ConstInt => INT_SIZE,
            Self::Store | Self::Load => SLOT_SIZE,
            _ => 0,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::ConstInt => "CONST_INT",
            Self::Store => "STORE",
            Self::Load => "LOAD",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::IntToFloat => "INT_TO_FLOAT",
            Self::FloatToInt => "FLOAT_TO_INT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode.as_u8()
    }
}

impl TryFrom<u8> for Opcode {
    type Error = InvalidOpcode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::ConstInt),
            1 => Ok(Self::Store),
            2 => Ok(Self::Load),
            3 => Ok(Self::Add),
            4 => Ok(Self::Sub),
            5 => Ok(Self::Mul),
            6 => Ok(Self::Div),
            7 => Ok(Self::Mod),
            8 => Ok(Self::IntToFloat),
            9 => Ok(Self::FloatToInt),
            _ => Err(InvalidOpcode(byte)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid opcode {0:#04X}")]
pub struct InvalidOpcode(pub u8);

/// Value that can be written into, and read back from, a bytecode buffer.
///
/// Host byte order is used. With the `big_endian` feature enabled,
/// integral values are byte-swapped on both read and write.
pub trait Immediate: Copy {
    const SIZE: usize;

    /// Reads a value at the offset, or `None` if the buffer is too short.
    fn read_from_buffer(buffer: &[u8], offset: usize) -> Option<Self>;

    /// Appends the value to the end of the buffer.
    fn store_to_buffer(self, buffer: &mut Vec<u8>);
}

macro_rules! impl_integral_immediate {
    ($($ty:ty),*) => {
        $(
            impl Immediate for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn read_from_buffer(buffer: &[u8], offset: usize) -> Option<Self> {
                    let bytes = buffer.get(offset..offset.checked_add(Self::SIZE)?)?;
                    let value = <$ty>::from_ne_bytes(bytes.try_into().ok()?);
                    #[cfg(feature = "big_endian")]
                    let value = value.swap_bytes();
                    Some(value)
                }

                #[inline]
                fn store_to_buffer(self, buffer: &mut Vec<u8>) {
                    #[cfg(feature = "big_endian")]
                    let value = self.swap_bytes();
                    #[cfg(not(feature = "big_endian"))]
                    let value = self;
                    buffer.extend_from_slice(&value.to_ne_bytes());
                }
            }
        )*
    };
}

impl_integral_immediate!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Immediate for f32 {
    const SIZE: usize = 4;

    #[inline]
    fn read_from_buffer(buffer: &[u8], offset: usize) -> Option<Self> {
        let bytes = buffer.get(offset..offset.checked_add(Self::SIZE)?)?;
        Some(f32::from_ne_bytes(bytes.try_into().ok()?))
    }

    #[inline]
    fn store_to_buffer(self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Immediate for f64 {
    const SIZE: usize = 8;

    #[inline]
    fn read_from_buffer(buffer: &[u8], offset: usize) -> Option<Self> {
        let bytes = buffer.get(offset..offset.checked_add(Self::SIZE)?)?;
        Some(f64::from_ne_bytes(bytes.try_into().ok()?))
    }

    #[inline]
    fn store_to_buffer(self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.to_ne_bytes());
    }
}

/// Conversion instruction from one type to another.
///
/// Only `int32` and `float` convert into each other.
pub fn cast_instruction(from: &Type, to: &Type) -> Option<Instr> {
    match (from.name.as_str(), to.name.as_str()) {
        (INT32, FLOAT) => Some(Instr::IntToFloat),
        (FLOAT, INT32) => Some(Instr::FloatToInt),
        _ => None,
    }
}

/// Decoded instruction with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    ConstInt(i32),
    Store(u8),
    Load(u8),
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    IntToFloat,
    FloatToInt,
}

impl Instr {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::ConstInt(_) => Opcode::ConstInt,
            Self::Store(_) => Opcode::Store,
            Self::Load(_) => Opcode::Load,
            Self::Add => Opcode::Add,
            Self::Sub => Opcode::Sub,
            Self::Mul => Opcode::Mul,
            Self::Div => Opcode::Div,
            Self::Mod => Opcode::Mod,
            Self::IntToFloat => Opcode::IntToFloat,
            Self::FloatToInt => Opcode::FloatToInt,
        }
    }

    /// Size of the encoded instruction in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        1 + self.opcode().operand_size()
    }

    /// Append the encoded instruction to the buffer.
    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.opcode().as_u8());

        match *self {
            Self::ConstInt(value) => value.store_to_buffer(buffer),
            Self::Store(slot) | Self::Load(slot) => slot.store_to_buffer(buffer),
            _ => {}
        }
    }

    /// Decode the instruction at the offset.
    ///
    /// Returns the instruction together with its encoded length.
    pub fn decode(buffer: &[u8], offset: usize) -> Result<(Instr, usize), DecodeError> {
        let byte = *buffer
            .get(offset)
            .ok_or(DecodeError::Truncated {
                offset,
                opcode: "EOF",
            })?;
        let opcode =
            Opcode::try_from(byte).map_err(|_| DecodeError::UnknownOpcode { offset, byte })?;
        let truncated = DecodeError::Truncated {
            offset,
            opcode: opcode.mnemonic(),
        };
        let operand = offset + 1;

        let instr = match opcode {
            Opcode::ConstInt => Instr::ConstInt(i32::read_from_buffer(buffer, operand).ok_or(truncated)?),
            Opcode::Store => Instr::Store(u8::read_from_buffer(buffer, operand).ok_or(truncated)?),
            Opcode::Load => Instr::Load(u8::read_from_buffer(buffer, operand).ok_or(truncated)?),
            Opcode::Add => Instr::Add,
            Opcode::Sub => Instr::Sub,
            Opcode::Mul => Instr::Mul,
            Opcode::Div => Instr::Div,
            Opcode::Mod => Instr::Mod,
            Opcode::IntToFloat => Instr::IntToFloat,
            Opcode::FloatToInt => Instr::FloatToInt,
        };

        Ok((instr, 1 + opcode.operand_size()))
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConstInt(value) => write!(f, "{} {}", self.opcode(), value),
            Self::Store(slot) | Self::Load(slot) => write!(f, "{} {}", self.opcode(), slot),
            _ => write!(f, "{}", self.opcode()),
        }
    }
}

/// Encode a sequence of instructions into bytecode.
pub fn assemble(instrs: &[Instr]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(instrs.iter().map(Instr::size).sum());
    for instr in instrs {
        instr.encode(&mut buffer);
    }
    buffer
}
