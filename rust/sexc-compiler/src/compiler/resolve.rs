//! Wave A and Wave B of semantic analysis: AST-level well-formedness that
//! does not require resolving a single variable or call. Wave C (the actual
//! AST → IR lowering) lives in [`crate::compiler::lower`].

use crate::compiler::ast::{FunctionDef, Program, Stmt};
use crate::compiler::builtins::BUILTINS;
use sexc_core::{Span, Type};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Duplicate argument name \"{name}\" at {span}")]
    DuplicateArgName { name: String, span: Span },
    #[error("Statement list must be non-empty at {span}")]
    EmptyStmtList { span: Span },
    #[error("Return statement must be the last one at {span}")]
    ReturnNotLast { span: Span },
    #[error("Function body must end with a return statement at {span}")]
    MissingTrailingReturn { span: Span },
    #[error("Duplicate function definition \"{name}\" at {span}")]
    DuplicateFunction { name: String, span: Span },
    #[error("Function \"{name}\" shadows a built-in at {span}")]
    ShadowsBuiltin { name: String, span: Span },
}

fn arg_type_tuple(f: &FunctionDef) -> Vec<Type> {
    f.args.iter().map(|a| a.ty).collect()
}

/// Per-function checks: no duplicate arg/local names, non-empty body,
/// `return` only as the final statement.
fn check_function(f: &FunctionDef) -> Result<(), ResolveError> {
    let names: Vec<&str> = f.args.iter().chain(f.locals.iter()).map(|v| v.name_text()).collect();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            if names[i] == names[j] {
                return Err(ResolveError::DuplicateArgName {
                    name: names[i].to_string(),
                    span: f.open,
                });
            }
        }
    }

    if f.body.is_empty() {
        return Err(ResolveError::EmptyStmtList { span: f.open });
    }

    for stmt in &f.body[..f.body.len() - 1] {
        if let Stmt::Return { open, .. } = stmt {
            return Err(ResolveError::ReturnNotLast { span: *open });
        }
    }
    if !matches!(f.body.last(), Some(Stmt::Return { .. })) {
        return Err(ResolveError::MissingTrailingReturn { span: f.open });
    }

    Ok(())
}

/// Global checks across every function: no two user functions share
/// `(name, arg types)`, and no user function shadows a built-in.
fn check_global_uniqueness(program: &Program) -> Result<(), ResolveError> {
    for i in 0..program.functions.len() {
        for j in (i + 1)..program.functions.len() {
            let a = &program.functions[i];
            let b = &program.functions[j];
            if a.name_text() == b.name_text() && arg_type_tuple(a) == arg_type_tuple(b) {
                return Err(ResolveError::DuplicateFunction {
                    name: b.name_text().to_string(),
                    span: b.open,
                });
            }
        }
    }

    for f in &program.functions {
        let types = arg_type_tuple(f);
        if BUILTINS.iter().any(|b| b.name == f.name_text() && b.args == types) {
            return Err(ResolveError::ShadowsBuiltin {
                name: f.name_text().to_string(),
                span: f.open,
            });
        }
    }

    Ok(())
}

/// Runs Wave A over every function, then Wave B over the whole program.
pub fn check_program(program: &Program) -> Result<(), ResolveError> {
    for f in &program.functions {
        check_function(f)?;
    }
    check_global_uniqueness(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse_program;
    use crate::compiler::tree::build_tree;

    fn check(src: &str) -> Result<(), ResolveError> {
        let prog = parse_program(build_tree(tokenize(src).unwrap()).unwrap()).unwrap();
        check_program(&prog)
    }

    #[test]
    fn accepts_well_formed_function() {
        assert!(check("(fn id int ((x int)) () ((return x)))").is_ok());
    }

    #[test]
    fn rejects_duplicate_arg_and_local_name() {
        let err = check("(fn f int ((x int)) ((x int)) ((return x)))").unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateArgName { .. }));
    }

    #[test]
    fn rejects_return_before_last_statement() {
        let err = check("(fn f int () () ((return 1) (return 2)))").unwrap_err();
        assert!(matches!(err, ResolveError::ReturnNotLast { .. }));
    }

    #[test]
    fn rejects_missing_trailing_return() {
        let err = check("(fn f int ((x int)) () ((set x 1)))").unwrap_err();
        assert!(matches!(err, ResolveError::MissingTrailingReturn { .. }));
    }

    #[test]
    fn rejects_duplicate_overload() {
        let err = check(
            "(fn f int ((x int)) () ((return x))) (fn f int ((y int)) () ((return y)))",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateFunction { .. }));
    }

    #[test]
    fn allows_overload_distinguished_by_arg_types() {
        assert!(check(
            "(fn sq int ((x int)) () ((return (* x x)))) (fn sq float ((x float)) () ((return (* x x))))"
        )
        .is_ok());
    }

    #[test]
    fn rejects_shadowing_a_builtin() {
        let err = check("(fn + int ((x int) (y int)) () ((return x)))").unwrap_err();
        assert!(matches!(err, ResolveError::ShadowsBuiltin { .. }));
    }
}
