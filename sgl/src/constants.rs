//! Constant values of the SGL virtual machine.

/// Operand stack capacity in bytes, used when the host
/// doesn't request a size or requests a size of zero.
pub const DEFAULT_STACK_SIZE: usize = 1024;

/// Slot indices are encoded as a single byte in bytecode.
pub const MAX_SLOTS: usize = 0x100; // 256

/// Width of an `int32` immediate.
pub const INT_SIZE: usize = 4;

/// Width of a slot operand.
pub const SLOT_SIZE: usize = 1;

/// Type names registered by [`TypeRegistry::with_builtins`](crate::TypeRegistry::with_builtins).
pub const INT32: &str = "int32";
pub const FLOAT: &str = "float";
pub const VOID: &str = "void";
