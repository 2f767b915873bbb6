//! Abstract Syntax Tree definitions for Mel
//!
//! The tree is produced by an external parser. The semantic checker only
//! fills the annotation slots (`node_type`, `node_ident`) and wraps
//! expressions in `Convert` nodes where an implicit conversion applies.

use std::fmt;

use crate::frontend::symbols::IdentDesc;
use crate::types::TypeDesc;
use crate::utils::Position;

/// Sequence of statements. Also the root of a program.
#[derive(Debug, Clone, Default)]
pub struct StmtList {
    pub stmts: Vec<Stmt>,
    pub pos: Position,
}

/// A complete program (compilation unit)
pub type Program = StmtList;

/// Statement
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// var|val name [: type] [= expr]
    VarDecl(VarDecl),
    /// name = expr
    Assign { target: Ident, value: Expr },
    /// Expression statement (usually a call)
    Expr(Expr),
    /// if (cond) { ... } [else { ... }]
    If {
        cond: Expr,
        then_branch: StmtList,
        else_branch: Option<StmtList>,
    },
    /// while (cond) { ... }
    While { cond: Expr, body: StmtList },
    /// do { ... } while (cond)
    DoWhile { body: StmtList, cond: Expr },
    /// for (var in iterable) { ... }
    For {
        var: Ident,
        iterable: Expr,
        body: StmtList,
    },
    /// fun name(params): ret { ... }
    Fun(FunDecl),
    /// return [expr]
    Return(Option<Expr>),
    /// { ... }
    Block(StmtList),
}

/// Declaration mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// `var`
    Var,
    /// `val`
    Val,
}

/// Variable declaration
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub mutability: Mutability,
    pub name: Ident,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
}

/// Function declaration
#[derive(Debug, Clone)]
pub struct FunDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// `None` means Void
    pub ret: Option<TypeRef>,
    pub body: StmtList,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeRef,
}

/// Type annotation as written in source (`Int`, `Array<Int>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub elem: Option<Box<TypeRef>>,
    pub pos: Position,
}

/// Identifier occurrence, either declaring or referencing a name
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub pos: Position,
    pub node_type: Option<TypeDesc>,
    pub node_ident: Option<IdentDesc>,
}

/// Expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
    pub node_type: Option<TypeDesc>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Literal in its lexical form: `42`, `3.5`, `2f`, `"text"`, `'c'`, `true`
    Literal(String),
    /// Identifier reference
    Ident(Ident),
    /// Unary operation
    Unary { op: UnOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call
    Call { callee: Ident, args: Vec<Expr> },
    /// Range (start..end, start until end, start downTo end) with optional step
    Range {
        start: Box<Expr>,
        op: RangeOp,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
    },
    /// Implicit conversion inserted by the checker
    Convert { expr: Box<Expr>, target: TypeDesc },
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
        }
    }

    /// Operand order does not matter for the result
    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            Self::Mul | Self::Eq | Self::Ne | Self::And | Self::Or | Self::BitAnd | Self::BitOr
        )
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

impl UnOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

/// Range operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    /// `..`
    Inclusive,
    /// `until`
    Until,
    /// `downTo`
    DownTo,
}

// ==================== Constructors ====================

impl StmtList {
    pub fn new(stmts: Vec<Stmt>, pos: Position) -> Self {
        Self { stmts, pos }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    pub fn var(name: Ident, ty: Option<TypeRef>, init: Option<Expr>, pos: Position) -> Self {
        Self::decl(Mutability::Var, name, ty, init, pos)
    }

    pub fn val(name: Ident, ty: Option<TypeRef>, init: Option<Expr>, pos: Position) -> Self {
        Self::decl(Mutability::Val, name, ty, init, pos)
    }

    fn decl(
        mutability: Mutability,
        name: Ident,
        ty: Option<TypeRef>,
        init: Option<Expr>,
        pos: Position,
    ) -> Self {
        Self::new(
            StmtKind::VarDecl(VarDecl {
                mutability,
                name,
                ty,
                init,
            }),
            pos,
        )
    }

    pub fn assign(target: Ident, value: Expr, pos: Position) -> Self {
        Self::new(StmtKind::Assign { target, value }, pos)
    }

    pub fn expr(expr: Expr) -> Self {
        let pos = expr.pos;
        Self::new(StmtKind::Expr(expr), pos)
    }

    pub fn fun(
        name: Ident,
        params: Vec<Param>,
        ret: Option<TypeRef>,
        body: StmtList,
        pos: Position,
    ) -> Self {
        Self::new(
            StmtKind::Fun(FunDecl {
                name,
                params,
                ret,
                body,
            }),
            pos,
        )
    }

    pub fn ret(value: Option<Expr>, pos: Position) -> Self {
        Self::new(StmtKind::Return(value), pos)
    }
}

impl TypeRef {
    pub fn named(name: impl Into<String>, pos: Position) -> Self {
        Self {
            name: name.into(),
            elem: None,
            pos,
        }
    }

    pub fn generic(name: impl Into<String>, elem: TypeRef, pos: Position) -> Self {
        Self {
            name: name.into(),
            elem: Some(Box::new(elem)),
            pos,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.elem {
            Some(elem) => write!(f, "{}<{}>", self.name, elem),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: Position) -> Self {
        Self {
            name: name.into(),
            pos,
            node_type: None,
            node_ident: None,
        }
    }
}

impl Param {
    pub fn new(name: Ident, ty: TypeRef) -> Self {
        Self { name, ty }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Self {
            kind,
            pos,
            node_type: None,
        }
    }

    pub fn literal(text: impl Into<String>, pos: Position) -> Self {
        Self::new(ExprKind::Literal(text.into()), pos)
    }

    pub fn ident(name: impl Into<String>, pos: Position) -> Self {
        Self::new(ExprKind::Ident(Ident::new(name, pos)), pos)
    }

    pub fn unary(op: UnOp, operand: Expr, pos: Position) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            pos,
        )
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr, pos: Position) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            pos,
        )
    }

    pub fn call(callee: Ident, args: Vec<Expr>, pos: Position) -> Self {
        Self::new(ExprKind::Call { callee, args }, pos)
    }

    pub fn range(start: Expr, op: RangeOp, end: Expr, step: Option<Expr>, pos: Position) -> Self {
        Self::new(
            ExprKind::Range {
                start: Box::new(start),
                op,
                end: Box::new(end),
                step: step.map(Box::new),
            },
            pos,
        )
    }

    /// Wrap an already checked expression in an implicit conversion
    pub fn convert(expr: Expr, target: TypeDesc) -> Self {
        let pos = expr.pos;
        Self {
            kind: ExprKind::Convert {
                expr: Box::new(expr),
                target: target.clone(),
            },
            pos,
            node_type: Some(target),
        }
    }

    /// Move the expression out, leaving a cheap placeholder behind
    pub fn take(&mut self) -> Expr {
        let placeholder = Expr::new(ExprKind::Literal(String::new()), self.pos);
        std::mem::replace(self, placeholder)
    }

    /// Resolved type, `Void` until the checker has visited the node
    pub fn ty(&self) -> &TypeDesc {
        static VOID: TypeDesc = TypeDesc::VOID;
        self.node_type.as_ref().unwrap_or(&VOID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unchecked_expression_reads_as_void() {
        let mut expr = Expr::literal("1", Position::new(1, 1));
        assert_eq!(expr.ty(), &TypeDesc::VOID);

        expr.node_type = Some(TypeDesc::array(TypeDesc::INT));
        assert_eq!(expr.ty().to_string(), "Array<Int>");
    }

    #[test]
    fn test_take_leaves_placeholder() {
        let mut expr = Expr::ident("x", Position::new(2, 3));
        let taken = expr.take();
        assert!(matches!(taken.kind, ExprKind::Ident(_)));
        assert!(matches!(&expr.kind, ExprKind::Literal(text) if text.is_empty()));
        assert_eq!(expr.pos, Position::new(2, 3));
    }
}
