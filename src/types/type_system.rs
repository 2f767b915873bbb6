//! Type System for Mel

use std::fmt;

use crate::utils::{Error, Position, Result};

/// Base kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Void,
    /// Top type, only reachable through built-in signatures and annotations
    Any,
    Int,
    Float,
    Double,
    Bool,
    Char,
    String,
    /// Compound: `Array<T>`
    Array,
    /// Compound: `Range<T>`, produced by range expressions
    Range,
}

impl BaseType {
    /// Look up a simple or compound base kind by its source name
    pub fn from_name(name: &str) -> Option<Self> {
        let base = match name {
            "Void" | "Unit" => Self::Void,
            "Any" => Self::Any,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "Double" => Self::Double,
            "Bool" | "Boolean" => Self::Bool,
            "Char" => Self::Char,
            "String" => Self::String,
            "Array" => Self::Array,
            "Range" => Self::Range,
            _ => return None,
        };
        Some(base)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Any => "Any",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Bool => "Bool",
            Self::Char => "Char",
            Self::String => "String",
            Self::Array => "Array",
            Self::Range => "Range",
        }
    }

    /// Compound kinds carry an element type
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Array | Self::Range)
    }

    /// Check if this is a numeric kind
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Double)
    }
}

/// Immutable description of one language type.
///
/// Equality is structural: two descriptors are equal when their base kinds
/// and element types are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    pub base: BaseType,
    pub elem: Option<Box<TypeDesc>>,
}

impl TypeDesc {
    // Constants for the simple types
    pub const VOID: Self = Self::simple(BaseType::Void);
    pub const ANY: Self = Self::simple(BaseType::Any);
    pub const INT: Self = Self::simple(BaseType::Int);
    pub const FLOAT: Self = Self::simple(BaseType::Float);
    pub const DOUBLE: Self = Self::simple(BaseType::Double);
    pub const BOOL: Self = Self::simple(BaseType::Bool);
    pub const CHAR: Self = Self::simple(BaseType::Char);
    pub const STRING: Self = Self::simple(BaseType::String);

    pub const fn simple(base: BaseType) -> Self {
        Self { base, elem: None }
    }

    pub fn array(elem: TypeDesc) -> Self {
        Self {
            base: BaseType::Array,
            elem: Some(Box::new(elem)),
        }
    }

    pub fn range(elem: TypeDesc) -> Self {
        Self {
            base: BaseType::Range,
            elem: Some(Box::new(elem)),
        }
    }

    /// Map a type name to a descriptor.
    ///
    /// Accepts simple names (`Int`, `Boolean`, ...) and the textual compound
    /// form (`Array<Int>`, `Range<Array<Char>>`).
    pub fn from_name(name: &str, pos: Position) -> Result<Self> {
        let unknown = || Error::UnknownType {
            name: name.to_string(),
            pos,
        };
        let name_trimmed = name.trim();

        let (base_name, elem_name) = match name_trimmed.find('<') {
            Some(open) => {
                let inner = name_trimmed[open + 1..]
                    .strip_suffix('>')
                    .ok_or_else(unknown)?;
                (name_trimmed[..open].trim(), Some(inner))
            }
            None => (name_trimmed, None),
        };

        let base = BaseType::from_name(base_name).ok_or_else(unknown)?;
        let elem = elem_name
            .map(|inner| Self::from_name(inner, pos))
            .transpose()
            .map_err(|_| unknown())?;
        Self::from_parts(base, elem).ok_or_else(unknown)
    }

    /// Combine a base kind with an optional element type; `None` when the
    /// arity is wrong (compound without element, simple with one)
    pub fn from_parts(base: BaseType, elem: Option<TypeDesc>) -> Option<Self> {
        match (base.is_compound(), elem) {
            (true, Some(elem)) => Some(Self {
                base,
                elem: Some(Box::new(elem)),
            }),
            (false, None) => Some(Self::simple(base)),
            _ => None,
        }
    }

    pub fn is_simple(&self) -> bool {
        !self.base.is_compound()
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void
    }

    pub fn is_numeric(&self) -> bool {
        self.base.is_numeric()
    }

    /// Element type of a compound type
    pub fn element(&self) -> Option<&TypeDesc> {
        self.elem.as_deref()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.elem {
            Some(elem) => write!(f, "{}<{}>", self.base.name(), elem),
            None => write!(f, "{}", self.base.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_name_simple() {
        let pos = Position::new(1, 1);
        assert_eq!(TypeDesc::from_name("Int", pos).unwrap(), TypeDesc::INT);
        assert_eq!(TypeDesc::from_name("Boolean", pos).unwrap(), TypeDesc::BOOL);
        assert_eq!(TypeDesc::from_name("Unit", pos).unwrap(), TypeDesc::VOID);
    }

    #[test]
    fn test_from_name_compound() {
        let ty = TypeDesc::from_name("Array<Array<Int>>", Position::new(1, 1)).unwrap();
        assert_eq!(ty, TypeDesc::array(TypeDesc::array(TypeDesc::INT)));
        assert_eq!(ty.to_string(), "Array<Array<Int>>");
    }

    #[test]
    fn test_from_name_unknown() {
        let pos = Position::new(4, 2);
        for name in ["Integer", "Array", "Int<Int>", "Array<Foo>", "Array<Int"] {
            let err = TypeDesc::from_name(name, pos).unwrap_err();
            assert_eq!(
                err,
                Error::UnknownType {
                    name: name.to_string(),
                    pos
                }
            );
        }
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(TypeDesc::range(TypeDesc::INT), TypeDesc::range(TypeDesc::INT));
        assert_ne!(TypeDesc::range(TypeDesc::INT), TypeDesc::array(TypeDesc::INT));
        assert_ne!(TypeDesc::array(TypeDesc::INT), TypeDesc::array(TypeDesc::DOUBLE));
    }
}
