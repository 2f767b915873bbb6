//! Built-in Functions Registry
//!
//! Defines the host functions visible to every Mel program and seeds the
//! global scope with them.

use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::frontend::symbols::{IdentDesc, SymbolTable};
use crate::types::TypeDesc;
use crate::utils::{Position, Result};

/// Built-in function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFunc {
    pub name: String,
    pub params: Vec<TypeDesc>,
    pub ret_type: TypeDesc,
}

/// Registry of built-in functions, ordered by name
pub struct BuiltinRegistry {
    functions: BTreeMap<String, BuiltinFunc>,
}

impl BuiltinRegistry {
    /// Registry holding the standard built-ins
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_std();
        registry
    }

    pub fn empty() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// Registry described by a configuration
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let mut registry = if config.std_builtins {
            Self::new()
        } else {
            Self::empty()
        };
        for spec in &config.extra_builtins {
            let params = spec
                .params
                .iter()
                .map(|p| TypeDesc::from_name(p, Position::dummy()))
                .collect::<Result<Vec<_>>>()?;
            let ret_type = TypeDesc::from_name(&spec.ret, Position::dummy())?;
            registry.register(BuiltinFunc {
                name: spec.name.clone(),
                params,
                ret_type,
            });
        }
        Ok(registry)
    }

    fn register_std(&mut self) {
        // I/O functions
        self.register(BuiltinFunc {
            name: "print".to_string(),
            params: vec![TypeDesc::ANY],
            ret_type: TypeDesc::VOID,
        });

        self.register(BuiltinFunc {
            name: "println".to_string(),
            params: vec![TypeDesc::ANY],
            ret_type: TypeDesc::VOID,
        });

        self.register(BuiltinFunc {
            name: "readLine".to_string(),
            params: vec![],
            ret_type: TypeDesc::STRING,
        });
    }

    /// Register a function, replacing any earlier one with the same name
    pub fn register(&mut self, func: BuiltinFunc) {
        self.functions.insert(func.name.clone(), func);
    }

    /// Get all built-in functions
    pub fn all(&self) -> impl Iterator<Item = &BuiltinFunc> {
        self.functions.values()
    }

    /// Symbol descriptors for every registered function
    pub fn descriptors(&self) -> impl Iterator<Item = IdentDesc> + '_ {
        self.all()
            .map(|func| IdentDesc::builtin(func.name.clone(), func.params.clone(), func.ret_type.clone()))
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a fresh global scope holding the standard built-ins
pub fn prepare_global_scope() -> SymbolTable {
    SymbolTable::with_globals(BuiltinRegistry::new().descriptors())
}

/// Build a fresh global scope from a configuration
pub fn prepare_global_scope_with(config: &AnalyzerConfig) -> Result<SymbolTable> {
    let registry = BuiltinRegistry::from_config(config)?;
    Ok(SymbolTable::with_globals(registry.descriptors()))
}
