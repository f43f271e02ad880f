use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location in the original `.sx` file.
///
/// Positions are 1-based for `line` and `col`, matching the diagnostic
/// format described by the language: `at line L, column C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    pub fn dummy() -> Self {
        Self { line: 0, col: 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}
