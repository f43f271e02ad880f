//! Renders a [`crate::CompileError`] as the single positioned diagnostic
//! line the pipeline promises: `"Error: <message> at line L, column C"`,
//! optionally in color for a terminal.

use crate::CompileError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
        }
    }
}

/// A single rendered diagnostic: a stable code, a message, and the
/// `Display` text produced by the originating error (which already carries
/// its own position).
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn from_compile_error(err: &CompileError) -> Self {
        Self {
            severity: Severity::Error,
            code: err.code(),
            message: err.to_string(),
        }
    }

    /// Plain form: `"Error: <message>"`. The message text itself already
    /// ends in `at line L, column C`, matching the external diagnostic
    /// contract.
    pub fn render_plain(&self) -> String {
        format!("{}: {}", self.severity.label(), self.message)
    }

    /// ANSI-colored form for a terminal: the severity label in red/bold,
    /// the code dimmed, the message plain.
    pub fn render_ansi(&self) -> String {
        format!(
            "\x1b[1;31m{}\x1b[0m \x1b[2m[{}]\x1b[0m: {}",
            self.severity.label(),
            self.code,
            self.message
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_plain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn plain_rendering_matches_external_format() {
        let err = compile("(a b").unwrap_err();
        let diag = Diagnostic::from_compile_error(&err);
        assert!(diag.render_plain().starts_with("Error: "));
        assert!(diag.render_plain().contains("at line"));
    }
}
