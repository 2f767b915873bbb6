//! Semantic Analysis for Mel
//!
//! Performs:
//! - Name resolution against nested lexical scopes
//! - Type checking and inference from initializers
//! - Insertion of implicit conversion nodes
//!
//! The traversal annotates the AST in place and stops at the first error.

use serde::Serialize;

use crate::frontend::ast::*;
use crate::frontend::symbols::{IdentDesc, ScopeKind, SymbolTable};
use crate::types::{can_convert, convert, lookup_binary, resolve_type_ref, BaseType, TypeDesc};
use crate::utils::{Error, Position, Result};

/// Counters collected during one checking run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    pub statements: usize,
    pub functions: usize,
    pub scopes_opened: usize,
    pub conversions: usize,
    /// Deepest scope nesting reached, the global scope counting as 1
    pub max_depth: usize,
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer
pub struct SemanticAnalyzer<'s> {
    symbols: &'s mut SymbolTable,
    /// Declared return types of the functions being checked, innermost last
    return_types: Vec<TypeDesc>,
    stats: CheckStats,
}

/// Check a program against a prepared global scope
pub fn check(program: &mut Program, symbols: &mut SymbolTable) -> Result<()> {
    SemanticAnalyzer::new(symbols).analyze(program)
}

impl<'s> SemanticAnalyzer<'s> {
    pub fn new(symbols: &'s mut SymbolTable) -> Self {
        let depth = symbols.depth();
        Self {
            symbols,
            return_types: Vec::new(),
            stats: CheckStats {
                max_depth: depth,
                ..CheckStats::default()
            },
        }
    }

    pub fn stats(&self) -> &CheckStats {
        &self.stats
    }

    /// Analyze a program. Top-level statements share the current scope.
    pub fn analyze(&mut self, program: &mut Program) -> Result<()> {
        log::debug!("checking program with {} statements", program.stmts.len());
        let result = self.check_stmt_list(program);
        match &result {
            Ok(()) => log::debug!("check finished: {:?}", self.stats),
            Err(err) => log::debug!("check aborted: {}", err.located_message()),
        }
        result
    }

    /// Run `f` inside a fresh scope, discarding it afterwards even on error
    fn with_scope<T>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.enter_scope(kind);
        self.stats.scopes_opened += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.symbols.depth());
        let result = f(self);
        self.symbols.exit_scope();
        result
    }

    /// Check statements in order within the current scope
    fn check_stmt_list(&mut self, list: &mut StmtList) -> Result<()> {
        for stmt in &mut list.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// Check a compound statement in its own block scope
    fn check_block(&mut self, block: &mut StmtList) -> Result<()> {
        self.with_scope(ScopeKind::Block, |this| this.check_stmt_list(block))
    }

    /// Type check a statement
    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        self.stats.statements += 1;
        let pos = stmt.pos;
        match &mut stmt.kind {
            StmtKind::VarDecl(decl) => self.check_var_decl(decl),
            StmtKind::Assign { target, value } => self.check_assign(target, value),
            StmtKind::Expr(expr) => self.check_expr(expr),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_condition(cond)?;
                self.check_block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_block(else_branch)?;
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond)?;
                self.check_block(body)
            }
            // the condition sees declarations made in the body
            StmtKind::DoWhile { body, cond } => self.with_scope(ScopeKind::Block, |this| {
                this.check_stmt_list(body)?;
                this.check_condition(cond)
            }),
            StmtKind::For {
                var,
                iterable,
                body,
            } => self.check_for(var, iterable, body),
            StmtKind::Fun(fun) => self.check_function(fun, pos),
            StmtKind::Return(value) => self.check_return(value.as_mut(), pos),
            StmtKind::Block(block) => self.check_block(block),
        }
    }

    fn check_var_decl(&mut self, decl: &mut VarDecl) -> Result<()> {
        let declared = decl.ty.as_ref().map(resolve_type_ref).transpose()?;
        if let Some(init) = decl.init.as_mut() {
            self.check_expr(init)?;
        }

        let ty = match (declared, decl.init.as_mut()) {
            (Some(ty), Some(init)) => {
                self.coerce(init, &ty)?;
                ty
            }
            (Some(ty), None) => ty,
            (None, Some(init)) => init.ty().clone(),
            (None, None) => {
                return Err(Error::UntypedDeclaration {
                    name: decl.name.name.clone(),
                    pos: decl.name.pos,
                })
            }
        };

        let mutable = decl.mutability == Mutability::Var;
        let desc = IdentDesc::variable(&decl.name.name, ty, mutable, decl.name.pos);
        self.symbols.declare(desc.clone(), decl.name.pos)?;
        annotate(&mut decl.name, desc);
        Ok(())
    }

    fn check_assign(&mut self, target: &mut Ident, value: &mut Expr) -> Result<()> {
        let desc = self.symbols.resolve(&target.name, target.pos)?.clone();
        if desc.is_callable() {
            return Err(Error::NotAVariable {
                name: target.name.clone(),
                pos: target.pos,
            });
        }
        if !desc.is_mutable() {
            return Err(Error::ImmutableAssignment {
                name: target.name.clone(),
                pos: target.pos,
            });
        }

        self.check_expr(value)?;
        self.coerce(value, &desc.ty)?;
        annotate(target, desc);
        Ok(())
    }

    /// Conditions must be exactly Bool
    fn check_condition(&mut self, cond: &mut Expr) -> Result<()> {
        self.check_expr(cond)?;
        if *cond.ty() != TypeDesc::BOOL {
            return Err(Error::InvalidConditionType {
                got: cond.ty().to_string(),
                pos: cond.pos,
            });
        }
        Ok(())
    }

    fn check_for(&mut self, var: &mut Ident, iterable: &mut Expr, body: &mut StmtList) -> Result<()> {
        self.check_expr(iterable)?;
        let elem = match iterable.ty() {
            ty if matches!(ty.base, BaseType::Range | BaseType::Array) => ty.element().cloned(),
            _ => None,
        }
        .ok_or_else(|| Error::NotIterable {
            got: iterable.ty().to_string(),
            pos: iterable.pos,
        })?;

        // the loop variable lives in a scope of its own, wrapping the body scope
        self.with_scope(ScopeKind::Block, |this| {
            let desc = IdentDesc::variable(&var.name, elem, false, var.pos);
            this.symbols.declare(desc.clone(), var.pos)?;
            annotate(var, desc);
            this.check_block(body)
        })
    }

    /// Type check a function declaration
    fn check_function(&mut self, fun: &mut FunDecl, pos: Position) -> Result<()> {
        let params = fun
            .params
            .iter()
            .map(|p| resolve_type_ref(&p.ty))
            .collect::<Result<Vec<_>>>()?;
        let ret = fun
            .ret
            .as_ref()
            .map(resolve_type_ref)
            .transpose()?
            .unwrap_or(TypeDesc::VOID);

        // Declared before the body so the function can call itself
        let desc = IdentDesc::function(&fun.name.name, params.clone(), ret.clone(), fun.name.pos);
        self.symbols.declare(desc.clone(), fun.name.pos)?;
        log::debug!("checking {}", desc);
        annotate(&mut fun.name, desc);
        self.stats.functions += 1;

        self.return_types.push(ret.clone());
        let result = self.with_scope(ScopeKind::Function, |this| {
            for (param, ty) in fun.params.iter_mut().zip(params) {
                let desc = IdentDesc::param(&param.name.name, ty, param.name.pos);
                this.symbols.declare(desc.clone(), param.name.pos)?;
                annotate(&mut param.name, desc);
            }
            this.check_stmt_list(&mut fun.body)
        });
        self.return_types.pop();
        result?;

        // Shallow check: only direct statements of the body count
        let has_return = fun
            .body
            .stmts
            .iter()
            .any(|stmt| matches!(stmt.kind, StmtKind::Return(_)));
        if !ret.is_void() && !has_return {
            return Err(Error::MissingReturn {
                name: fun.name.name.clone(),
                ret: ret.to_string(),
                pos,
            });
        }
        Ok(())
    }

    fn check_return(&mut self, value: Option<&mut Expr>, pos: Position) -> Result<()> {
        let expected = self
            .return_types
            .last()
            .cloned()
            .ok_or(Error::ReturnOutsideFunction { pos })?;

        match value {
            Some(expr) => {
                self.check_expr(expr)?;
                self.coerce(expr, &expected)
            }
            None if expected.is_void() => Ok(()),
            None => Err(Error::TypeMismatch {
                expected: expected.to_string(),
                got: TypeDesc::VOID.to_string(),
                pos,
            }),
        }
    }

    /// Type check an expression and record its type on the node
    fn check_expr(&mut self, expr: &mut Expr) -> Result<()> {
        let pos = expr.pos;
        let ty = match &mut expr.kind {
            ExprKind::Literal(text) => literal_type(text, pos)?,

            ExprKind::Ident(ident) => self.check_ident(ident)?,

            ExprKind::Unary { op, operand } => {
                self.check_expr(operand)?;
                let ty = operand.ty();
                let valid = match op {
                    UnOp::Neg => ty.is_numeric(),
                    UnOp::Not => *ty == TypeDesc::BOOL,
                };
                if !valid {
                    return Err(Error::IncompatibleOperands {
                        op: op.symbol().to_string(),
                        operands: ty.to_string(),
                        pos,
                    });
                }
                ty.clone()
            }

            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, pos)?,

            ExprKind::Call { callee, args } => self.check_call(callee, args, pos)?,

            ExprKind::Range {
                start, end, step, ..
            } => self.check_range(start, end, step.as_deref_mut())?,

            // Already checked once; keep the conversion's target type
            ExprKind::Convert { expr: inner, target } => {
                self.check_expr(inner)?;
                target.clone()
            }
        };
        expr.node_type = Some(ty);
        Ok(())
    }

    /// Identifier used as a value
    fn check_ident(&mut self, ident: &mut Ident) -> Result<TypeDesc> {
        let desc = self.symbols.resolve(&ident.name, ident.pos)?.clone();
        if desc.is_callable() {
            return Err(Error::NotAVariable {
                name: ident.name.clone(),
                pos: ident.pos,
            });
        }
        let ty = desc.ty.clone();
        annotate(ident, desc);
        Ok(ty)
    }

    fn check_binary(&mut self, op: BinOp, left: &mut Expr, right: &mut Expr, pos: Position) -> Result<TypeDesc> {
        self.check_expr(left)?;
        self.check_expr(right)?;

        let found = lookup_binary(op, left.ty(), right.ty()).ok_or_else(|| Error::IncompatibleOperands {
            op: op.symbol().to_string(),
            operands: format!("{} and {}", left.ty(), right.ty()),
            pos,
        })?;
        self.coerce(left, &found.left)?;
        self.coerce(right, &found.right)?;
        Ok(found.result)
    }

    fn check_call(&mut self, callee: &mut Ident, args: &mut [Expr], pos: Position) -> Result<TypeDesc> {
        let desc = self.symbols.resolve(&callee.name, callee.pos)?.clone();
        let (params, ret) = match desc.signature() {
            Some((params, ret)) => (params.to_vec(), ret.clone()),
            None => {
                return Err(Error::NotCallable {
                    name: callee.name.clone(),
                    pos: callee.pos,
                })
            }
        };

        if args.len() != params.len() {
            return Err(Error::ArgumentCountMismatch {
                name: callee.name.clone(),
                expected: params.len(),
                got: args.len(),
                pos,
            });
        }

        for (index, (arg, param)) in args.iter_mut().zip(&params).enumerate() {
            self.check_expr(arg)?;
            if !can_convert(arg.ty(), param) {
                return Err(Error::ArgumentTypeMismatch {
                    name: callee.name.clone(),
                    index: index + 1,
                    expected: param.to_string(),
                    got: arg.ty().to_string(),
                    pos: arg.pos,
                });
            }
            self.coerce(arg, param)?;
        }

        annotate(callee, desc);
        Ok(ret)
    }

    /// Range bounds (and step) must share exactly one numeric type
    fn check_range(&mut self, start: &mut Expr, end: &mut Expr, step: Option<&mut Expr>) -> Result<TypeDesc> {
        self.check_expr(start)?;
        let elem = start.ty().clone();
        if !elem.is_numeric() {
            return Err(Error::TypeMismatch {
                expected: "Int, Float or Double".to_string(),
                got: elem.to_string(),
                pos: start.pos,
            });
        }

        self.check_expr(end)?;
        let mut bounds = vec![end];
        if let Some(step) = step {
            self.check_expr(step)?;
            bounds.push(step);
        }
        if let Some(bad) = bounds.into_iter().find(|b| *b.ty() != elem) {
            return Err(Error::TypeMismatch {
                expected: elem.to_string(),
                got: bad.ty().to_string(),
                pos: bad.pos,
            });
        }
        Ok(TypeDesc::range(elem))
    }

    /// Convert an expression in place, counting inserted conversions
    fn coerce(&mut self, expr: &mut Expr, target: &TypeDesc) -> Result<()> {
        if convert(expr, target)? {
            self.stats.conversions += 1;
        }
        Ok(())
    }
}

/// Record a resolved descriptor on an identifier node
fn annotate(ident: &mut Ident, desc: IdentDesc) {
    ident.node_type = Some(desc.ty.clone());
    ident.node_ident = Some(desc);
}

// ==================== Literals ====================

/// Type of a literal, derived from its lexical form
fn literal_type(text: &str, pos: Position) -> Result<TypeDesc> {
    let is_quoted = |q: char| text.len() >= 2 && text.starts_with(q) && text.ends_with(q);

    let ty = match text {
        "true" | "false" => Some(TypeDesc::BOOL),
        _ if is_quoted('"') => Some(TypeDesc::STRING),
        _ if is_quoted('\'') && text.len() >= 3 => Some(TypeDesc::CHAR),
        _ => numeric_literal_type(text),
    };
    ty.ok_or_else(|| Error::InvalidLiteral {
        literal: text.to_string(),
        pos,
    })
}

/// `[+-] digits [. digits] [(e|E) [+-] digits] [f|F]`
fn numeric_literal_type(text: &str) -> Option<TypeDesc> {
    let unsigned = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    let suffixed = unsigned
        .strip_suffix('f')
        .or_else(|| unsigned.strip_suffix('F'));
    let (body, float_suffix) = match suffixed {
        Some(body) => (body, true),
        None => (unsigned, false),
    };

    let bytes = body.as_bytes();
    let mut i = 0;
    let skip_digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if skip_digits(&mut i) == 0 {
        return None;
    }
    let mut fractional = false;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        skip_digits(&mut i);
        fractional = true;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        if skip_digits(&mut i) == 0 {
            return None;
        }
        fractional = true;
    }
    if i != bytes.len() {
        return None;
    }

    Some(match (float_suffix, fractional) {
        (true, _) => TypeDesc::FLOAT,
        (false, true) => TypeDesc::DOUBLE,
        (false, false) => TypeDesc::INT,
    })
}
