//! Front end and semantic analysis for the language: turns source text into
//! a fully resolved, fully typed [`compiler::ir::IrProgram`], or the first
//! positioned diagnostic the pipeline hit.
//!
//! Data flow is strictly one-way and every stage aborts the whole pipeline
//! on its first error: Text → Tokens → Tree → AST → IR. Code generation
//! from the resulting IR lives in a separate crate.

pub mod compiler;
pub mod diagnostics;

use compiler::lexer::LexError;
use compiler::lower::LowerError;
use compiler::parser::ParseError;
use compiler::resolve::ResolveError;
use compiler::tree::TreeError;
use thiserror::Error;

/// Options controlling how a compilation is driven. Currently only affects
/// how the final diagnostic (if any) is rendered; kept as a struct rather
/// than a bare bool parameter so the CLI has somewhere to grow flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub color_diagnostics: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { color_diagnostics: false }
    }
}

/// The union of every error any pipeline stage can produce. The first
/// stage to fail short-circuits the rest via `?`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Lower(#[from] LowerError),
}

impl CompileError {
    /// The stable `E####` code for this diagnostic, used by tooling and by
    /// [`diagnostics::Diagnostic`].
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Lex(e) => compiler::error_codes::lex_code(e),
            CompileError::Tree(e) => compiler::error_codes::tree_code(e),
            CompileError::Parse(e) => compiler::error_codes::parse_code(e),
            CompileError::Resolve(e) => compiler::error_codes::resolve_code(e),
            CompileError::Lower(e) => compiler::error_codes::lower_code(e),
        }
    }
}

/// Runs the whole front end over `source`: tokenize, build the tree, parse
/// to AST, check Wave A/B well-formedness, then lower to IR (Wave C).
pub fn compile(source: &str) -> Result<compiler::ir::IrProgram, CompileError> {
    let tokens = compiler::lexer::tokenize(source)?;
    let tree = compiler::tree::build_tree(tokens)?;
    let program = compiler::parser::parse_program(tree)?;
    compiler::resolve::check_program(&program)?;
    let ir = compiler::lower::lower_program(program)?;
    Ok(ir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_identity_function() {
        let ir = compile("(fn id int ((x int)) () ((return x)))").unwrap();
        assert_eq!(ir.functions.len(), 1);
    }

    #[test]
    fn reports_first_error_and_stops() {
        let err = compile("(fn id int ((x int)) () ((return y)))").unwrap_err();
        assert!(matches!(err, CompileError::Lower(LowerError::UnknownVariable { .. })));
        assert_eq!(err.code(), "E0310");
    }

    #[test]
    fn lexical_errors_surface_as_compile_errors() {
        let err = compile("(fn id # bad)").unwrap_err();
        assert!(matches!(err, CompileError::Lex(_)));
    }

    #[test]
    fn rejects_conditional_type_mismatch_scenario() {
        // `>` returns bool but `a` is declared int — a Set type mismatch.
        let err = compile(
            "(fn max int ((a int)(b int)) () ((set a (> a b)) (if a () ((set a b))) (return a)))",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Lower(LowerError::SetTypeMismatch { .. })));
    }
}
