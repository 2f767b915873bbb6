//! Error handling for the Mel front-end

use crate::utils::Position;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Semantic error. Checking stops at the first one raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ==================== Names ====================

    #[error("Unknown type: {name}")]
    UnknownType { name: String, pos: Position },

    #[error("Undeclared identifier: {name}")]
    UndeclaredIdentifier { name: String, pos: Position },

    #[error("Identifier {name} is already declared in this scope")]
    Redeclaration { name: String, pos: Position },

    #[error("{name} is not a function")]
    NotCallable { name: String, pos: Position },

    #[error("Function {name} cannot be used as a value")]
    NotAVariable { name: String, pos: Position },

    // ==================== Types ====================

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: String,
        got: String,
        pos: Position,
    },

    #[error("Operator {op} cannot be applied to {operands}")]
    IncompatibleOperands {
        op: String,
        operands: String,
        pos: Position,
    },

    #[error("Condition must be Bool, got {got}")]
    InvalidConditionType { got: String, pos: Position },

    #[error("Invalid literal: {literal}")]
    InvalidLiteral { literal: String, pos: Position },

    #[error("Cannot iterate over {got}")]
    NotIterable { got: String, pos: Position },

    #[error("Variable {name} needs either a type or an initializer")]
    UntypedDeclaration { name: String, pos: Position },

    // ==================== Calls ====================

    #[error("Argument count mismatch for {name}: expected {expected}, got {got}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        pos: Position,
    },

    #[error("Argument {index} of {name}: expected {expected}, got {got}")]
    ArgumentTypeMismatch {
        name: String,
        index: usize,
        expected: String,
        got: String,
        pos: Position,
    },

    // ==================== Statements ====================

    #[error("Cannot assign to immutable {name}")]
    ImmutableAssignment { name: String, pos: Position },

    #[error("Function {name} must return {ret}, but has no return statement")]
    MissingReturn {
        name: String,
        ret: String,
        pos: Position,
    },

    #[error("Return outside of a function")]
    ReturnOutsideFunction { pos: Position },
}

impl Error {
    /// Get the position of the node that triggered this error
    pub fn position(&self) -> Position {
        match self {
            Self::UnknownType { pos, .. }
            | Self::UndeclaredIdentifier { pos, .. }
            | Self::Redeclaration { pos, .. }
            | Self::NotCallable { pos, .. }
            | Self::NotAVariable { pos, .. }
            | Self::TypeMismatch { pos, .. }
            | Self::IncompatibleOperands { pos, .. }
            | Self::InvalidConditionType { pos, .. }
            | Self::InvalidLiteral { pos, .. }
            | Self::NotIterable { pos, .. }
            | Self::UntypedDeclaration { pos, .. }
            | Self::ArgumentCountMismatch { pos, .. }
            | Self::ArgumentTypeMismatch { pos, .. }
            | Self::ImmutableAssignment { pos, .. }
            | Self::MissingReturn { pos, .. }
            | Self::ReturnOutsideFunction { pos } => *pos,
        }
    }

    pub fn row(&self) -> u32 {
        self.position().row
    }

    pub fn col(&self) -> u32 {
        self.position().col
    }

    /// Stable name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } => "UnknownType",
            Self::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            Self::Redeclaration { .. } => "Redeclaration",
            Self::NotCallable { .. } => "NotCallable",
            Self::NotAVariable { .. } => "NotAVariable",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::IncompatibleOperands { .. } => "IncompatibleOperands",
            Self::InvalidConditionType { .. } => "InvalidConditionType",
            Self::InvalidLiteral { .. } => "InvalidLiteral",
            Self::NotIterable { .. } => "NotIterable",
            Self::UntypedDeclaration { .. } => "UntypedDeclaration",
            Self::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            Self::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            Self::ImmutableAssignment { .. } => "ImmutableAssignment",
            Self::MissingReturn { .. } => "MissingReturn",
            Self::ReturnOutsideFunction { .. } => "ReturnOutsideFunction",
        }
    }

    /// Diagnostic code used in structured reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "E0001",
            Self::UndeclaredIdentifier { .. } => "E0002",
            Self::ArgumentCountMismatch { .. } => "E0003",
            Self::ArgumentTypeMismatch { .. } => "E0004",
            Self::Redeclaration { .. } => "E0005",
            Self::UnknownType { .. } => "E0006",
            Self::IncompatibleOperands { .. } => "E0007",
            Self::ImmutableAssignment { .. } => "E0008",
            Self::MissingReturn { .. } => "E0009",
            Self::InvalidConditionType { .. } => "E0010",
            Self::NotCallable { .. } => "E0011",
            Self::NotAVariable { .. } => "E0012",
            Self::InvalidLiteral { .. } => "E0013",
            Self::NotIterable { .. } => "E0014",
            Self::UntypedDeclaration { .. } => "E0015",
            Self::ReturnOutsideFunction { .. } => "E0016",
        }
    }

    /// Message prefixed with the source position, e.g. `2:9: Undeclared identifier: a`
    pub fn located_message(&self) -> String {
        format!("{}: {}", self.position(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_accessors() {
        let err = Error::Redeclaration {
            name: "a".to_string(),
            pos: Position::new(3, 9),
        };
        assert_eq!(err.row(), 3);
        assert_eq!(err.col(), 9);
        assert_eq!(err.kind_name(), "Redeclaration");
    }

    #[test]
    fn test_located_message() {
        let err = Error::TypeMismatch {
            expected: "Double".to_string(),
            got: "String".to_string(),
            pos: Position::new(2, 20),
        };
        assert_eq!(
            err.located_message(),
            "2:20: Type mismatch: expected Double, got String"
        );
    }
}
