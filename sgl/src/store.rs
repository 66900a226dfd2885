//! Variable store.
use crate::stack::StackValue;

/// Slot indexed storage for variable values.
///
/// Each written slot owns its own allocation, released when the
/// store is cleared or dropped.
#[derive(Debug, Default)]
pub struct VariableStore {
    slots: Vec<Option<Box<[u8]>>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots the store has grown to, written or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_allocated(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    /// Write the value into the slot, allocating it on first write.
    pub fn write<T: StackValue>(&mut self, slot: usize, value: T) {
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }

        match &mut self.slots[slot] {
            Some(cell) if cell.len() == T::SIZE => value.write_bytes(cell),
            entry => {
                let mut cell = vec![0; T::SIZE].into_boxed_slice();
                value.write_bytes(&mut cell);
                *entry = Some(cell);
            }
        }
    }

    /// Read the slot's value, `None` if it was never written or
    /// holds a value of a different width.
    pub fn read<T: StackValue>(&self, slot: usize) -> Option<T> {
        match self.slots.get(slot) {
            Some(Some(cell)) if cell.len() == T::SIZE => Some(T::read_bytes(cell)),
            _ => None,
        }
    }

    /// Release every allocated slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
