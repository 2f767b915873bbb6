//! Standard library: built-in functions and the global scope

pub mod builtins;

pub use builtins::{prepare_global_scope, prepare_global_scope_with, BuiltinFunc, BuiltinRegistry};
