//! Symbol table: identifier descriptors and nested lexical scopes

use std::collections::HashMap;
use std::fmt;

use crate::types::TypeDesc;
use crate::utils::{Error, Position, Result};

// ==================== Identifier Descriptors ====================

/// Kind of declaration an identifier was introduced by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// `var` variable
    Var,
    /// `val` variable
    Val,
    /// Function parameter (immutable)
    Param,
    /// User-declared function
    Function { params: Vec<TypeDesc>, ret: TypeDesc },
    /// Host-provided function
    Builtin { params: Vec<TypeDesc>, ret: TypeDesc },
}

/// Binds a name to its type and declaration kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentDesc {
    pub name: String,
    /// Variable type, or return type for callables
    pub ty: TypeDesc,
    pub kind: DeclKind,
    pub pos: Position,
}

impl IdentDesc {
    pub fn variable(name: impl Into<String>, ty: TypeDesc, mutable: bool, pos: Position) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: if mutable { DeclKind::Var } else { DeclKind::Val },
            pos,
        }
    }

    pub fn param(name: impl Into<String>, ty: TypeDesc, pos: Position) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: DeclKind::Param,
            pos,
        }
    }

    pub fn function(
        name: impl Into<String>,
        params: Vec<TypeDesc>,
        ret: TypeDesc,
        pos: Position,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ret.clone(),
            kind: DeclKind::Function { params, ret },
            pos,
        }
    }

    pub fn builtin(name: impl Into<String>, params: Vec<TypeDesc>, ret: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty: ret.clone(),
            kind: DeclKind::Builtin { params, ret },
            pos: Position::dummy(),
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, DeclKind::Function { .. } | DeclKind::Builtin { .. })
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, DeclKind::Var)
    }

    /// Parameter types and return type of a callable
    pub fn signature(&self) -> Option<(&[TypeDesc], &TypeDesc)> {
        match &self.kind {
            DeclKind::Function { params, ret } | DeclKind::Builtin { params, ret } => {
                Some((params.as_slice(), ret))
            }
            _ => None,
        }
    }
}

impl fmt::Display for IdentDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match &self.kind {
            DeclKind::Var => "var",
            DeclKind::Val => "val",
            DeclKind::Param => "param",
            DeclKind::Function { .. } => "fun",
            DeclKind::Builtin { .. } => "builtin",
        };
        match self.signature() {
            Some((params, ret)) => {
                let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                write!(f, "{} {}({}): {}", keyword, self.name, params.join(", "), ret)
            }
            None => write!(f, "{} {}: {}", keyword, self.name, self.ty),
        }
    }
}

// ==================== Scopes ====================

/// Index of a scope in the symbol table arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

/// A scope containing symbols
#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    symbols: HashMap<String, IdentDesc>,
}

/// Symbol table with nested scopes.
///
/// Scopes are stored in an arena and refer to their parent by index. They
/// are entered and exited in strict LIFO order, so the current scope is
/// always the last record and exiting pops it.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl SymbolTable {
    /// Create a table holding only an empty global scope
    pub fn new() -> Self {
        let global = Scope {
            parent: None,
            kind: ScopeKind::Global,
            symbols: HashMap::new(),
        };
        Self {
            scopes: vec![global],
            current: ScopeId(0),
        }
    }

    /// Create a table whose global scope holds `symbols`.
    ///
    /// A later symbol replaces an earlier one of the same name.
    pub fn with_globals(symbols: impl IntoIterator<Item = IdentDesc>) -> Self {
        let mut table = Self::new();
        let global = &mut table.scopes[0].symbols;
        for symbol in symbols {
            log::trace!("global {}", symbol);
            global.insert(symbol.name.clone(), symbol);
        }
        table
    }

    /// Enter a new scope nested in the current one
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(self.current),
            kind,
            symbols: HashMap::new(),
        });
        self.current = id;
        log::trace!("enter {:?} scope #{}", kind, id.0);
        id
    }

    /// Exit and discard the current scope. The global scope is never exited.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            log::trace!("exit scope #{}", self.current.0);
            self.scopes.truncate(self.current.0);
            self.current = parent;
        }
    }

    /// Declare a symbol in the current scope
    pub fn declare(&mut self, symbol: IdentDesc, pos: Position) -> Result<()> {
        let scope = &mut self.scopes[self.current.0];
        if scope.symbols.contains_key(&symbol.name) {
            return Err(Error::Redeclaration {
                name: symbol.name,
                pos,
            });
        }
        log::trace!("declare {} in scope #{}", symbol, self.current.0);
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Resolve a name, searching from the current scope outward
    pub fn resolve(&self, name: &str, pos: Position) -> Result<&IdentDesc> {
        self.lookup(name).ok_or_else(|| Error::UndeclaredIdentifier {
            name: name.to_string(),
            pos,
        })
    }

    /// Look up a symbol, searching from current scope upward
    pub fn lookup(&self, name: &str) -> Option<&IdentDesc> {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            if let Some(symbol) = self.scopes[id.0].symbols.get(name) {
                return Some(symbol);
            }
            scope_id = self.scopes[id.0].parent;
        }
        None
    }

    /// Look up a symbol only in the current scope
    pub fn lookup_local(&self, name: &str) -> Option<&IdentDesc> {
        self.scopes[self.current.0].symbols.get(name)
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current.0].kind
    }

    /// Number of live scopes, the global one included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(row: u32, col: u32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        let mut table = SymbolTable::new();
        table
            .declare(IdentDesc::variable("a", TypeDesc::INT, true, pos(1, 5)), pos(1, 5))
            .unwrap();
        let err = table
            .declare(IdentDesc::variable("a", TypeDesc::STRING, true, pos(2, 5)), pos(2, 5))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Redeclaration {
                name: "a".to_string(),
                pos: pos(2, 5)
            }
        );
    }

    #[test]
    fn test_shadowing_in_nested_scope() {
        let mut table = SymbolTable::new();
        table
            .declare(IdentDesc::variable("a", TypeDesc::INT, true, pos(1, 5)), pos(1, 5))
            .unwrap();
        table.enter_scope(ScopeKind::Block);
        table
            .declare(IdentDesc::variable("a", TypeDesc::STRING, false, pos(2, 9)), pos(2, 9))
            .unwrap();
        assert_eq!(table.resolve("a", pos(3, 1)).unwrap().ty, TypeDesc::STRING);

        table.exit_scope();
        assert_eq!(table.resolve("a", pos(4, 1)).unwrap().ty, TypeDesc::INT);
    }

    #[test]
    fn test_resolve_walks_parent_chain() {
        let mut table = SymbolTable::new();
        table
            .declare(IdentDesc::variable("g", TypeDesc::BOOL, false, pos(1, 1)), pos(1, 1))
            .unwrap();
        table.enter_scope(ScopeKind::Function);
        table.enter_scope(ScopeKind::Block);
        assert_eq!(table.resolve("g", pos(5, 3)).unwrap().name, "g");
        assert!(table.lookup_local("g").is_none());
        assert_eq!(table.current_kind(), ScopeKind::Block);
    }

    #[test]
    fn test_undeclared() {
        let table = SymbolTable::new();
        assert_eq!(
            table.resolve("missing", pos(7, 2)).unwrap_err(),
            Error::UndeclaredIdentifier {
                name: "missing".to_string(),
                pos: pos(7, 2)
            }
        );
    }

    #[test]
    fn test_exit_discards_scope() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Function);
        table
            .declare(IdentDesc::param("x", TypeDesc::INT, pos(1, 9)), pos(1, 9))
            .unwrap();
        assert_eq!(table.depth(), 2);

        table.exit_scope();
        assert_eq!(table.depth(), 1);
        assert!(table.lookup("x").is_none());

        // exiting the global scope is a no-op
        table.exit_scope();
        assert_eq!(table.current_kind(), ScopeKind::Global);
    }

    #[test]
    fn test_descriptor_display() {
        let f = IdentDesc::function("pow", vec![TypeDesc::INT, TypeDesc::INT], TypeDesc::INT, pos(2, 1));
        assert_eq!(f.to_string(), "fun pow(Int, Int): Int");
        let v = IdentDesc::variable("s", TypeDesc::STRING, false, pos(1, 1));
        assert_eq!(v.to_string(), "val s: String");
    }
}
