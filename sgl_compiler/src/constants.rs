//! Compiler constants.

/// Reserved token that starts a function declaration.
pub const FUNCTION_PREFIX: &str = "func:";

/// Number of empty slots a fresh symbol table starts with.
pub const INITIAL_SLOTS: usize = 10;
