//! Type model: descriptors, implicit conversions, operator compatibility

pub mod conversion;
pub mod type_system;

pub use conversion::{can_convert, convert, lookup_binary, resolve_type_ref, OperatorMatch};
pub use type_system::{BaseType, TypeDesc};
