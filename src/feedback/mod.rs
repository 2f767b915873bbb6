//! Structured Feedback Module
//!
//! Provides machine-readable output for a checking run:
//! - JSON error reports with fix suggestions
//! - Checking statistics

use serde::{Deserialize, Serialize};

use crate::frontend::semantic::CheckStats;
use crate::utils::{Error, Result};

// ==================== Structured Error Report ====================

/// A structured report for one semantic error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0001")
    pub code: String,

    /// Error kind name (e.g., "TypeMismatch")
    pub kind: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Unknown for errors raised outside of any source node
    pub location: Option<Location>,

    /// Suggested fixes, most confident first
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Description of the fix
    pub message: String,

    /// The replacement text
    pub replacement: Option<String>,

    /// Confidence in this suggestion (0.0 - 1.0)
    pub confidence: f64,
}

impl Suggestion {
    fn new(message: String, replacement: Option<String>, confidence: f64) -> Self {
        Self {
            message,
            replacement,
            confidence,
        }
    }
}

impl ErrorReport {
    /// Create an error report from a semantic error
    pub fn from_error(error: &Error) -> Self {
        let pos = error.position();
        let location = pos.is_known().then(|| Location {
            row: pos.row,
            col: pos.col,
        });

        let mut report = Self {
            code: error.code().to_string(),
            kind: error.kind_name().to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location,
            suggestions: suggestions_for(error),
        };
        report.sort_suggestions();
        report
    }

    /// Sort suggestions by confidence (highest first)
    pub fn sort_suggestions(&mut self) {
        self.suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Fix suggestions for the error kinds that have an obvious remedy
fn suggestions_for(error: &Error) -> Vec<Suggestion> {
    match error {
        Error::UndeclaredIdentifier { name, .. } => vec![
            Suggestion::new(
                format!("Declare '{}' before using it", name),
                Some(format!("var {} = /* value */", name)),
                0.8,
            ),
            Suggestion::new(
                "Check whether it was declared in a block that has already ended".to_string(),
                None,
                0.4,
            ),
        ],

        Error::Redeclaration { name, .. } => vec![
            Suggestion::new(format!("Rename the second '{}'", name), None, 0.7),
            Suggestion::new(
                format!("Assign to the existing '{}' instead of declaring it again", name),
                Some(format!("{} = /* value */", name)),
                0.6,
            ),
        ],

        Error::TypeMismatch { expected, got, .. } => {
            let mut suggestions = vec![Suggestion::new(
                format!("Use a value of type {}", expected),
                None,
                0.5,
            )];
            let numeric = ["Int", "Float", "Double"];
            if numeric.contains(&expected.as_str()) && numeric.contains(&got.as_str()) {
                suggestions.push(Suggestion::new(
                    format!("{} does not narrow to {} implicitly; declare the target as {}", got, expected, got),
                    None,
                    0.8,
                ));
            }
            suggestions
        }

        Error::ImmutableAssignment { name, .. } => vec![Suggestion::new(
            format!("Declare '{}' with var to make it mutable", name),
            Some(format!("var {}", name)),
            0.9,
        )],

        Error::ArgumentCountMismatch { expected, got, .. } => {
            let message = if got < expected {
                format!("Add {} more argument(s)", expected - got)
            } else {
                format!("Remove {} extra argument(s)", got - expected)
            };
            vec![Suggestion::new(message, None, 0.9)]
        }

        Error::MissingReturn { ret, .. } => vec![Suggestion::new(
            format!("End the function body with a return of type {}", ret),
            Some("return /* value */".to_string()),
            0.8,
        )],

        Error::InvalidConditionType { .. } => vec![Suggestion::new(
            "Compare the value explicitly to produce a Bool".to_string(),
            None,
            0.6,
        )],

        Error::UntypedDeclaration { name, .. } => vec![Suggestion::new(
            format!("Give '{}' a type annotation or an initial value", name),
            Some(format!("{}: /* Type */", name)),
            0.8,
        )],

        _ => vec![],
    }
}

// ==================== Check Feedback ====================

/// Complete feedback for one checking run
#[derive(Debug, Clone, Serialize)]
pub struct CheckFeedback {
    pub success: bool,

    /// Empty on success, otherwise the single error that stopped the run
    pub diagnostics: Vec<ErrorReport>,

    pub stats: CheckStats,
}

impl CheckFeedback {
    /// Build feedback from the outcome of a run
    pub fn from_outcome(outcome: &Result<()>, stats: &CheckStats) -> Self {
        let diagnostics = match outcome {
            Ok(()) => vec![],
            Err(err) => vec![ErrorReport::from_error(err)],
        };
        Self {
            success: outcome.is_ok(),
            diagnostics,
            stats: stats.clone(),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (for programmatic use)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_from_error() {
        let err = Error::ImmutableAssignment {
            name: "a".to_string(),
            pos: Position::new(2, 1),
        };
        let report = ErrorReport::from_error(&err);
        assert_eq!(report.kind, "ImmutableAssignment");
        assert_eq!(report.code, err.code());
        assert_eq!(report.message, "Cannot assign to immutable a");
        assert_eq!(report.location, Some(Location { row: 2, col: 1 }));
        assert_eq!(report.suggestions[0].replacement.as_deref(), Some("var a"));
    }

    #[test]
    fn test_suggestions_sorted() {
        let err = Error::TypeMismatch {
            expected: "Int".to_string(),
            got: "Double".to_string(),
            pos: Position::new(1, 9),
        };
        let report = ErrorReport::from_error(&err);
        assert_eq!(report.suggestions.len(), 2);
        assert!(report.suggestions[0].confidence >= report.suggestions[1].confidence);
    }

    #[test]
    fn test_unknown_position_has_no_location() {
        let err = Error::UnknownType {
            name: "File".to_string(),
            pos: Position::dummy(),
        };
        assert_eq!(ErrorReport::from_error(&err).location, None);
    }

    #[test]
    fn test_feedback_json() {
        let stats = CheckStats {
            statements: 3,
            functions: 1,
            ..CheckStats::default()
        };
        let ok = CheckFeedback::from_outcome(&Ok(()), &stats);
        let json: serde_json::Value = serde_json::from_str(&ok.to_json()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["functions"], 1);
        assert_eq!(json["diagnostics"].as_array().unwrap().len(), 0);

        let failed = CheckFeedback::from_outcome(
            &Err(Error::UndeclaredIdentifier {
                name: "a".to_string(),
                pos: Position::new(1, 1),
            }),
            &stats,
        );
        let json: serde_json::Value = serde_json::from_str(&failed.to_json_compact()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["diagnostics"][0]["kind"], "UndeclaredIdentifier");
        assert_eq!(json["diagnostics"][0]["location"]["row"], 1);
    }
}
