//! Operand stack.
use log::warn;

use crate::{constants::DEFAULT_STACK_SIZE, error::Fault};

/// Primitive that can be copied onto the operand stack.
pub trait StackValue: Copy {
    const SIZE: usize;

    /// Write the value into a slice of exactly `SIZE` bytes.
    fn write_bytes(self, dst: &mut [u8]);

    /// Read the value from a slice of exactly `SIZE` bytes.
    fn read_bytes(src: &[u8]) -> Self;
}

macro_rules! impl_stack_value {
    ($($ty:ty),*) => {
        $(
            impl StackValue for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline(always)]
                fn write_bytes(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_ne_bytes());
                }

                #[inline(always)]
                fn read_bytes(src: &[u8]) -> Self {
                    let mut raw = [0; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(src);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

impl_stack_value!(u8, i32, u32, f32, i64, f64);

/// Fixed capacity byte stack.
///
/// Values carry no type tag. Whatever was pushed must be popped
/// with a type of the same width, which debug builds assert.
pub struct OperandStack {
    buffer: Box<[u8]>,
    position: usize,
    #[cfg(debug_assertions)]
    widths: Vec<usize>,
}

impl OperandStack {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("operand stack size of 0 requested, using default size of {DEFAULT_STACK_SIZE}");
            DEFAULT_STACK_SIZE
        } else {
            capacity
        };

        Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            position: 0,
            #[cfg(debug_assertions)]
            widths: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Write cursor, in bytes.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    pub fn clear(&mut self) {
        self.position = 0;
        #[cfg(debug_assertions)]
        self.widths.clear();
    }

    #[inline]
    pub fn push<T: StackValue>(&mut self, value: T) -> Result<(), Fault> {
        let end = self.position + T::SIZE;
        if end > self.buffer.len() {
            return Err(Fault::StackOverflow {
                requested: T::SIZE,
                position: self.position,
                capacity: self.buffer.len(),
            });
        }

        value.write_bytes(&mut self.buffer[self.position..end]);
        self.position = end;

        #[cfg(debug_assertions)]
        self.widths.push(T::SIZE);

        Ok(())
    }

    #[inline]
    pub fn pop<T: StackValue>(&mut self) -> Result<T, Fault> {
        if self.position < T::SIZE {
            return Err(Fault::StackUnderflow {
                requested: T::SIZE,
                position: self.position,
            });
        }

        #[cfg(debug_assertions)]
        {
            let width = self.widths.pop();
            debug_assert_eq!(width, Some(T::SIZE), "popped value with different width than pushed");
        }

        let start = self.position - T::SIZE;
        let value = T::read_bytes(&self.buffer[start..self.position]);
        self.position = start;

        Ok(value)
    }

    /// Read the topmost value without removing it.
    pub fn peek<T: StackValue>(&self) -> Option<T> {
        let start = self.position.checked_sub(T::SIZE)?;
        Some(T::read_bytes(&self.buffer[start..self.position]))
    }
}

impl Default for OperandStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_SIZE)
    }
}
