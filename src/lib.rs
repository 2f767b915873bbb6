//! Mel Semantic Front-End
//!
//! Name resolution and type checking for Mel, a small Kotlin-flavoured
//! language. A driver builds an AST, prepares a global scope and calls
//! [`check`]:
//!
//! ```ignore
//! let mut symbols = mel::prepare_global_scope();
//! mel::check(&mut program, &mut symbols)?;
//! ```

pub mod config;
pub mod feedback;
pub mod frontend;
pub mod stdlib;
pub mod types;
pub mod utils;

pub use config::{AnalyzerConfig, BuiltinSpec};
pub use feedback::{CheckFeedback, ErrorReport};
pub use frontend::ast::Program;
pub use frontend::semantic::{check, CheckStats, SemanticAnalyzer};
pub use frontend::symbols::{DeclKind, IdentDesc, ScopeKind, SymbolTable};
pub use stdlib::{prepare_global_scope, prepare_global_scope_with};
pub use types::{BaseType, TypeDesc};
pub use utils::{Error, Position, Result};
