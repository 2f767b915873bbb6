//! Source location tracking

use std::fmt;

use serde::{Deserialize, Serialize};

/// A row/column position in the source text (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    /// Create a new position
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Position used for built-ins and synthesized nodes
    pub fn dummy() -> Self {
        Self { row: 0, col: 0 }
    }

    /// Check if this position points into real source text
    pub fn is_known(&self) -> bool {
        self.row != 0
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}
