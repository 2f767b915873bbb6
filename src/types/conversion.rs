//! Implicit conversions and operator compatibility

use crate::frontend::ast::{BinOp, Expr, TypeRef};
use crate::types::{BaseType, TypeDesc};
use crate::utils::{Error, Result};

use crate::types::BaseType::{Bool, Char, Double, Float, Int, String as Str};

// ==================== Implicit Conversions ====================

/// Kinds a simple kind may be implicitly widened into
pub fn implicit_targets(from: BaseType) -> &'static [BaseType] {
    match from {
        Int => &[Float, Double],
        Float => &[Double],
        _ => &[],
    }
}

/// Check if a value of type `from` may be used where `to` is expected
pub fn can_convert(from: &TypeDesc, to: &TypeDesc) -> bool {
    if from == to || to.base == BaseType::Any {
        return true;
    }
    from.is_simple() && to.is_simple() && implicit_targets(from.base).contains(&to.base)
}

/// Coerce a checked expression to `target` in place.
///
/// Leaves the expression unchanged when it already has the target type (or
/// the target is `Any`), wraps it in a `Convert` node when an implicit
/// widening exists, and fails with `TypeMismatch` otherwise. On failure the
/// expression is left untouched. Returns whether a conversion node was
/// inserted.
pub fn convert(expr: &mut Expr, target: &TypeDesc) -> Result<bool> {
    let source = expr.ty();
    if source == target || target.base == BaseType::Any {
        return Ok(false);
    }
    if !can_convert(source, target) {
        return Err(Error::TypeMismatch {
            expected: target.to_string(),
            got: source.to_string(),
            pos: expr.pos,
        });
    }
    log::trace!("implicit conversion {} -> {} at {}", source, target, expr.pos);
    let inner = expr.take();
    *expr = Expr::convert(inner, target.clone());
    Ok(true)
}

/// Resolve a source type annotation to a descriptor
pub fn resolve_type_ref(ty: &TypeRef) -> Result<TypeDesc> {
    let unknown = || Error::UnknownType {
        name: ty.to_string(),
        pos: ty.pos,
    };
    let base = BaseType::from_name(&ty.name).ok_or_else(unknown)?;
    let elem = ty.elem.as_deref().map(resolve_type_ref).transpose()?;
    TypeDesc::from_parts(base, elem).ok_or_else(unknown)
}

// ==================== Binary Operators ====================

/// (left, right, result)
type OpEntry = (BaseType, BaseType, BaseType);

const ARITHMETIC: &[OpEntry] = &[
    (Int, Int, Int),
    (Float, Float, Float),
    (Double, Double, Double),
];

const ADD: &[OpEntry] = &[
    (Int, Int, Int),
    (Float, Float, Float),
    (Double, Double, Double),
    (Char, Int, Char),
    (Str, Str, Str),
    (Str, Int, Str),
    (Str, Float, Str),
    (Str, Double, Str),
    (Str, Bool, Str),
    (Str, Char, Str),
];

const SUB: &[OpEntry] = &[
    (Int, Int, Int),
    (Float, Float, Float),
    (Double, Double, Double),
    (Char, Char, Int),
    (Char, Int, Char),
];

const COMPARISON: &[OpEntry] = &[
    (Int, Int, Bool),
    (Float, Float, Bool),
    (Double, Double, Bool),
    (Char, Char, Bool),
    (Str, Str, Bool),
];

const EQUALITY: &[OpEntry] = &[
    (Int, Int, Bool),
    (Float, Float, Bool),
    (Double, Double, Bool),
    (Bool, Bool, Bool),
    (Char, Char, Bool),
    (Str, Str, Bool),
];

const LOGICAL: &[OpEntry] = &[(Bool, Bool, Bool)];

const BITWISE: &[OpEntry] = &[(Int, Int, Int), (Bool, Bool, Bool)];

/// Compatibility entries of an operator, in lookup order
pub fn operator_entries(op: BinOp) -> &'static [OpEntry] {
    match op {
        BinOp::Add => ADD,
        BinOp::Sub => SUB,
        BinOp::Mul | BinOp::Div | BinOp::Mod => ARITHMETIC,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => COMPARISON,
        BinOp::Eq | BinOp::Ne => EQUALITY,
        BinOp::And | BinOp::Or => LOGICAL,
        BinOp::BitAnd | BinOp::BitOr => BITWISE,
    }
}

/// Outcome of an operator lookup: the types each operand must be converted
/// to, and the result type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMatch {
    pub left: TypeDesc,
    pub right: TypeDesc,
    pub result: TypeDesc,
}

/// Find the entry for `left op right`.
///
/// Tries the operands as written, then swapped for commutative operators,
/// then the first entry both operands implicitly convert to.
pub fn lookup_binary(op: BinOp, left: &TypeDesc, right: &TypeDesc) -> Option<OperatorMatch> {
    lookup_in(operator_entries(op), op.is_commutative(), left, right)
}

fn lookup_in(
    entries: &[OpEntry],
    commutative: bool,
    left: &TypeDesc,
    right: &TypeDesc,
) -> Option<OperatorMatch> {
    if !left.is_simple() || !right.is_simple() {
        return None;
    }
    let (l, r) = (left.base, right.base);
    let as_written = |res: BaseType| OperatorMatch {
        left: left.clone(),
        right: right.clone(),
        result: TypeDesc::simple(res),
    };

    if let Some(&(_, _, res)) = entries.iter().find(|e| e.0 == l && e.1 == r) {
        return Some(as_written(res));
    }

    if commutative {
        if let Some(&(_, _, res)) = entries.iter().find(|e| e.0 == r && e.1 == l) {
            return Some(as_written(res));
        }
    }

    entries
        .iter()
        .find(|e| {
            can_convert(left, &TypeDesc::simple(e.0)) && can_convert(right, &TypeDesc::simple(e.1))
        })
        .map(|&(el, er, res)| OperatorMatch {
            left: TypeDesc::simple(el),
            right: TypeDesc::simple(er),
            result: TypeDesc::simple(res),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::ExprKind;
    use crate::utils::Position;
    use pretty_assertions::assert_eq;

    fn typed(text: &str, ty: TypeDesc) -> Expr {
        let mut expr = Expr::literal(text, Position::new(1, 5));
        expr.node_type = Some(ty);
        expr
    }

    #[test]
    fn test_convert_same_type_is_identity() {
        let mut expr = typed("1", TypeDesc::INT);
        assert!(!convert(&mut expr, &TypeDesc::INT).unwrap());
        assert!(matches!(expr.kind, ExprKind::Literal(_)));
        assert_eq!(expr.node_type, Some(TypeDesc::INT));
    }

    #[test]
    fn test_convert_int_to_float() {
        let mut expr = typed("1", TypeDesc::INT);
        assert!(convert(&mut expr, &TypeDesc::FLOAT).unwrap());
        assert_eq!(expr.node_type, Some(TypeDesc::FLOAT));
        assert_eq!(expr.pos, Position::new(1, 5));
        match expr.kind {
            ExprKind::Convert { expr: inner, target } => {
                assert_eq!(target, TypeDesc::FLOAT);
                assert_eq!(inner.node_type, Some(TypeDesc::INT));
            }
            other => panic!("expected conversion node, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_string_to_int_fails() {
        let mut expr = typed("\"a\"", TypeDesc::STRING);
        let err = convert(&mut expr, &TypeDesc::INT).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "Int".to_string(),
                got: "String".to_string(),
                pos: Position::new(1, 5),
            }
        );
        // a failed conversion leaves the node as it was
        assert!(matches!(&expr.kind, ExprKind::Literal(text) if text == "\"a\""));
        assert_eq!(expr.node_type, Some(TypeDesc::STRING));
    }

    #[test]
    fn test_no_narrowing() {
        assert!(!can_convert(&TypeDesc::DOUBLE, &TypeDesc::FLOAT));
        assert!(!can_convert(&TypeDesc::FLOAT, &TypeDesc::INT));
        assert!(can_convert(&TypeDesc::FLOAT, &TypeDesc::DOUBLE));
        assert!(!can_convert(
            &TypeDesc::array(TypeDesc::INT),
            &TypeDesc::array(TypeDesc::DOUBLE)
        ));
    }

    #[test]
    fn test_convert_to_any_keeps_node() {
        let mut expr = typed("true", TypeDesc::BOOL);
        assert!(!convert(&mut expr, &TypeDesc::ANY).unwrap());
        assert!(matches!(expr.kind, ExprKind::Literal(_)));
    }

    #[test]
    fn test_lookup_exact_and_widened() {
        let m = lookup_binary(BinOp::Add, &TypeDesc::INT, &TypeDesc::INT).unwrap();
        assert_eq!(m.result, TypeDesc::INT);

        let m = lookup_binary(BinOp::Sub, &TypeDesc::INT, &TypeDesc::DOUBLE).unwrap();
        assert_eq!(m.left, TypeDesc::DOUBLE);
        assert_eq!(m.right, TypeDesc::DOUBLE);
        assert_eq!(m.result, TypeDesc::DOUBLE);

        let m = lookup_binary(BinOp::Lt, &TypeDesc::FLOAT, &TypeDesc::INT).unwrap();
        assert_eq!(m.left, TypeDesc::FLOAT);
        assert_eq!(m.right, TypeDesc::FLOAT);
        assert_eq!(m.result, TypeDesc::BOOL);
    }

    #[test]
    fn test_lookup_string_concat_is_ordered() {
        let m = lookup_binary(BinOp::Add, &TypeDesc::STRING, &TypeDesc::INT).unwrap();
        assert_eq!(m.result, TypeDesc::STRING);
        assert!(lookup_binary(BinOp::Add, &TypeDesc::INT, &TypeDesc::STRING).is_none());
    }

    #[test]
    fn test_lookup_incompatible() {
        assert!(lookup_binary(BinOp::And, &TypeDesc::INT, &TypeDesc::BOOL).is_none());
        assert!(lookup_binary(BinOp::Mul, &TypeDesc::STRING, &TypeDesc::INT).is_none());
        assert!(lookup_binary(
            BinOp::Eq,
            &TypeDesc::range(TypeDesc::INT),
            &TypeDesc::range(TypeDesc::INT)
        )
        .is_none());
    }

    #[test]
    fn test_lookup_bitwise() {
        let m = lookup_binary(BinOp::BitAnd, &TypeDesc::INT, &TypeDesc::INT).unwrap();
        assert_eq!(m.result, TypeDesc::INT);
        let m = lookup_binary(BinOp::BitOr, &TypeDesc::BOOL, &TypeDesc::BOOL).unwrap();
        assert_eq!(m.result, TypeDesc::BOOL);
        assert!(lookup_binary(BinOp::BitAnd, &TypeDesc::INT, &TypeDesc::BOOL).is_none());
        assert!(lookup_binary(BinOp::BitOr, &TypeDesc::DOUBLE, &TypeDesc::DOUBLE).is_none());
    }

    #[test]
    fn test_lookup_char_arithmetic() {
        let m = lookup_binary(BinOp::Sub, &TypeDesc::CHAR, &TypeDesc::CHAR).unwrap();
        assert_eq!(m.result, TypeDesc::INT);
        let m = lookup_binary(BinOp::Sub, &TypeDesc::CHAR, &TypeDesc::INT).unwrap();
        assert_eq!(m.result, TypeDesc::CHAR);
        let m = lookup_binary(BinOp::Add, &TypeDesc::CHAR, &TypeDesc::INT).unwrap();
        assert_eq!(m.left, TypeDesc::CHAR);
        assert_eq!(m.right, TypeDesc::INT);
        assert_eq!(m.result, TypeDesc::CHAR);

        // `+` is not commutative, and Char never widens
        assert!(lookup_binary(BinOp::Add, &TypeDesc::INT, &TypeDesc::CHAR).is_none());
        assert!(lookup_binary(BinOp::Add, &TypeDesc::CHAR, &TypeDesc::CHAR).is_none());
    }

    #[test]
    fn test_lookup_float_widening() {
        let m = lookup_binary(BinOp::Add, &TypeDesc::FLOAT, &TypeDesc::INT).unwrap();
        assert_eq!(m.left, TypeDesc::FLOAT);
        assert_eq!(m.right, TypeDesc::FLOAT);
        assert_eq!(m.result, TypeDesc::FLOAT);
    }

    #[test]
    fn test_lookup_swapped_operands() {
        let table: &[OpEntry] = &[(Str, Int, Str)];
        let m = lookup_in(table, true, &TypeDesc::INT, &TypeDesc::STRING).unwrap();
        // operands keep their own types; only the entry is matched swapped
        assert_eq!(m.left, TypeDesc::INT);
        assert_eq!(m.right, TypeDesc::STRING);
        assert_eq!(m.result, TypeDesc::STRING);

        assert!(lookup_in(table, false, &TypeDesc::INT, &TypeDesc::STRING).is_none());
    }

    #[test]
    fn test_resolve_type_ref() {
        let pos = Position::new(2, 8);
        let ty = TypeRef::generic("Array", TypeRef::named("Double", pos), pos);
        assert_eq!(resolve_type_ref(&ty).unwrap(), TypeDesc::array(TypeDesc::DOUBLE));

        let bad = TypeRef::generic("Int", TypeRef::named("Int", pos), pos);
        assert_eq!(
            resolve_type_ref(&bad).unwrap_err(),
            Error::UnknownType {
                name: "Int<Int>".to_string(),
                pos
            }
        );
    }
}
