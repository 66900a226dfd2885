//! Type registry.
use std::collections::HashMap;

use log::warn;
use smol_str::SmolStr;

use crate::{constants::*, error::DuplicateType};

/// Size and alignment metadata of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: SmolStr,
    pub size: usize,
    pub alignment: usize,
}

impl Type {
    pub fn new(name: impl Into<SmolStr>, size: usize, alignment: usize) -> Self {
        Self {
            name: name.into(),
            size,
            alignment,
        }
    }

    /// Zero-size type of statements that produce no value.
    pub fn void() -> Self {
        Self::new(VOID, 0, 0)
    }

    pub fn int32() -> Self {
        Self::new(INT32, 4, 4)
    }

    pub fn float() -> Self {
        Self::new(FLOAT, 4, 4)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.name == VOID
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Maps type names to their metadata.
///
/// Populated by the host before compiling, then only read.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<SmolStr, Type>,
}

impl TypeRegistry {
    /// Empty registry, without even the builtin types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `int32`, `float` and `void` registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for ty in [Type::int32(), Type::float(), Type::void()] {
            registry.types.insert(ty.name.clone(), ty);
        }
        registry
    }

    /// Adds a type to the registry.
    ///
    /// A name that is already taken leaves the existing entry untouched.
    pub fn register(
        &mut self,
        name: impl Into<SmolStr>,
        size: usize,
        alignment: usize,
    ) -> Result<&Type, DuplicateType> {
        let name = name.into();

        if self.types.contains_key(&name) {
            warn!("type with specifier '{name}' already registered");
            return Err(DuplicateType(name));
        }

        let ty = Type::new(name.clone(), size, alignment);
        Ok(self.types.entry(name).or_insert(ty))
    }

    /// Adds a type taking its size and alignment from the Rust type `T`.
    pub fn register_of<T>(&mut self, name: impl Into<SmolStr>) -> Result<&Type, DuplicateType> {
        self.register(name, std::mem::size_of::<T>(), std::mem::align_of::<T>())
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }
}
