use sgl::{constants::MAX_SLOTS, Type};
use smol_str::SmolStr;

use crate::{constants::INITIAL_SLOTS, error::ErrorKind};

/// Variable occupying a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    pub ty: Type,
}

/// Slot addressed variables of one compilation.
///
/// A slot index is stable for as long as its variable is live,
/// and is encoded as the operand byte of `STORE` and `LOAD`.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    slots: Vec<Option<Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            slots: vec![None; INITIAL_SLOTS],
        }
    }

    /// Drop every symbol and start over with the initial empty slots.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.slots.resize(INITIAL_SLOTS, None);
    }

    pub fn find_slot(&self, name: &str) -> Option<u8> {
        self.lookup(name).map(|(slot, _)| slot)
    }

    /// Slot and symbol of a live variable.
    pub fn lookup(&self, name: &str) -> Option<(u8, &Symbol)> {
        self.live().find(|(_, symbol)| symbol.name == name)
    }

    pub fn get(&self, slot: u8) -> Option<&Symbol> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    /// Number of live symbols.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live symbols in slot order.
    pub fn live(&self) -> impl Iterator<Item = (u8, &Symbol)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((u8::try_from(index).ok()?, slot.as_ref()?)))
    }

    /// Allocate the lowest free slot for a new variable.
    pub fn declare(&mut self, name: &str, ty: Type) -> Result<u8, ErrorKind> {
        if self.find_slot(name).is_some() {
            return Err(ErrorKind::DuplicateIdentifier(name.into()));
        }

        let symbol = Symbol { name: name.into(), ty };

        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(symbol);
                index
            }
            None if self.slots.len() < MAX_SLOTS => {
                self.slots.push(Some(symbol));
                self.slots.len() - 1
            }
            None => return Err(ErrorKind::TooManyVariables),
        };

        u8::try_from(index).map_err(|_| ErrorKind::TooManyVariables)
    }

    /// Release a slot, so its name can be declared again.
    pub fn free(&mut self, slot: u8) -> Option<Symbol> {
        self.slots.get_mut(slot as usize).and_then(Option::take)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_declare() {
        let mut symbols = SymbolTable::new();
        assert!(symbols.is_empty());

        assert_eq!(symbols.declare("x", Type::int32()), Ok(0));
        assert_eq!(symbols.declare("y", Type::float()), Ok(1));
        assert_eq!(symbols.find_slot("y"), Some(1));
        assert_eq!(symbols.find_slot("z"), None);
        assert_eq!(symbols.get(1).map(|s| s.ty.clone()), Some(Type::float()));
        assert_eq!(
            symbols.declare("x", Type::float()),
            Err(ErrorKind::DuplicateIdentifier("x".into()))
        );
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_free_and_reuse() {
        let mut symbols = SymbolTable::new();
        symbols.declare("a", Type::int32()).unwrap();
        symbols.declare("b", Type::int32()).unwrap();
        symbols.declare("c", Type::int32()).unwrap();

        assert_eq!(symbols.free(1).map(|s| s.name), Some("b".into()));
        assert_eq!(symbols.free(1), None);
        assert_eq!(symbols.find_slot("b"), None);

        // Lowest free slot is reused.
        assert_eq!(symbols.declare("b", Type::float()), Ok(1));
        assert_eq!(symbols.declare("d", Type::int32()), Ok(3));

        let names: Vec<(u8, &str)> = symbols.live().map(|(slot, s)| (slot, s.name.as_str())).collect();
        assert_eq!(names, vec![(0, "a"), (1, "b"), (2, "c"), (3, "d")]);
    }

    #[test]
    fn test_slot_limit() {
        let mut symbols = SymbolTable::new();
        for index in 0..MAX_SLOTS {
            assert_eq!(symbols.declare(&format!("v{}", index), Type::int32()), Ok(index as u8));
        }
        assert_eq!(symbols.declare("overflow", Type::int32()), Err(ErrorKind::TooManyVariables));

        symbols.reset();
        assert!(symbols.is_empty());
        assert_eq!(symbols.declare("overflow", Type::int32()), Ok(0));
    }
}
