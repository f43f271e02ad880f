//! Wave C: resolves every variable reference and call target, type-checks
//! every statement, and lowers the AST into [`crate::compiler::ir`].

use crate::compiler::ast::{self, AtomExpr, Expr, FunctionDef, Program, Stmt};
use crate::compiler::builtins::BUILTINS;
use crate::compiler::ir::{Callee, IrArg, IrAtom, IrCall, IrExpr, IrFunction, IrProgram, IrStmt, LabelId, VarSlot};
use sexc_core::{Span, Type};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    #[error("token \"{name}\" is not a variable nor parameter at {span}")]
    UnknownVariable { name: String, span: Span },
    #[error("Function call does not match any functions at {span}")]
    NoMatchingOverload { span: Span },
    #[error("Type mismatch in statement set at {span}")]
    SetTypeMismatch { span: Span },
    #[error("Condition must have type bool at {span}")]
    NonBoolCondition { span: Span },
    #[error("Return type mismatch at {span}")]
    ReturnTypeMismatch { span: Span },
}

/// Namespace for one function's lowering: parameter/local positions and
/// types, plus the program-wide label table this function draws from.
struct FnCtx<'a> {
    vars: HashMap<&'a str, VarSlot>,
    var_types: HashMap<&'a str, Type>,
    functions: &'a [FunctionDef],
    labels: &'a HashMap<usize, LabelId>,
    next_node_id: &'a mut usize,
}

/// Assigns a [`LabelId`] to every If/While AST node up front, in a single
/// whole-program traversal, keyed by the node's position in a depth-first
/// walk. If and While each draw from their own 0-based counter, so codegen
/// can mint `if_<i>`/`while_<i>` directly from a node's label — matching two
/// distinct label maps rather than one shared space.
fn prescan_labels(program: &Program) -> HashMap<usize, LabelId> {
    let mut table = HashMap::new();
    let mut if_counter = 0usize;
    let mut while_counter = 0usize;
    let mut node_id = 0usize;
    for f in &program.functions {
        prescan_stmts(&f.body, &mut table, &mut if_counter, &mut while_counter, &mut node_id);
    }
    table
}

fn prescan_stmts(
    stmts: &[Stmt],
    table: &mut HashMap<usize, LabelId>,
    if_counter: &mut usize,
    while_counter: &mut usize,
    node_id: &mut usize,
) {
    for stmt in stmts {
        match stmt {
            Stmt::If { then_branch, else_branch, .. } => {
                table.insert(*node_id, LabelId(*if_counter));
                *if_counter += 1;
                *node_id += 1;
                prescan_stmts(then_branch, table, if_counter, while_counter, node_id);
                prescan_stmts(else_branch, table, if_counter, while_counter, node_id);
            }
            Stmt::While { body, .. } => {
                table.insert(*node_id, LabelId(*while_counter));
                *while_counter += 1;
                *node_id += 1;
                prescan_stmts(body, table, if_counter, while_counter, node_id);
            }
            Stmt::Set { .. } | Stmt::Return { .. } => {
                *node_id += 1;
            }
        }
    }
}

/// Lowers a fully Wave-A/B-checked [`Program`] into an [`IrProgram`].
pub fn lower_program(program: Program) -> Result<IrProgram, LowerError> {
    let labels = prescan_labels(&program);

    let mut functions = Vec::with_capacity(program.functions.len());
    // Shared across every function's lowering so it stays in lockstep with
    // `prescan_labels`, which also counts statement nodes program-wide.
    let mut node_id = 0usize;
    for f in &program.functions {
        let mut vars = HashMap::new();
        let mut var_types = HashMap::new();
        for (i, arg) in f.args.iter().enumerate() {
            vars.insert(arg.name_text(), VarSlot::Arg(i));
            var_types.insert(arg.name_text(), arg.ty);
        }
        for (i, local) in f.locals.iter().enumerate() {
            vars.insert(local.name_text(), VarSlot::Local(i));
            var_types.insert(local.name_text(), local.ty);
        }

        let mut ctx = FnCtx {
            vars,
            var_types,
            functions: &program.functions,
            labels: &labels,
            next_node_id: &mut node_id,
        };
        let body = lower_stmts(&f.body, &mut ctx, &program.constants, f.return_type)?;

        functions.push(IrFunction {
            name: f.name_text().to_string(),
            span: f.open,
            return_type: f.return_type,
            args: f.args.iter().map(|a| IrArg { ty: a.ty }).collect(),
            locals: f.locals.iter().map(|l| l.ty).collect(),
            body,
        });
    }

    Ok(IrProgram { functions, constants: program.constants })
}

fn lower_stmts(
    stmts: &[Stmt],
    ctx: &mut FnCtx,
    consts: &[ast::ConstLit],
    return_type: Type,
) -> Result<Vec<IrStmt>, LowerError> {
    stmts
        .iter()
        .map(|s| {
            // Every statement consumes one pre-scanned node id, in the same
            // depth-first order `prescan_stmts` walked — only If/While ever
            // look theirs up, but the counter must stay in lockstep.
            let node_id = *ctx.next_node_id;
            *ctx.next_node_id += 1;
            lower_stmt(s, node_id, ctx, consts, return_type)
        })
        .collect()
}

fn lower_stmt(
    stmt: &Stmt,
    node_id: usize,
    ctx: &mut FnCtx,
    consts: &[ast::ConstLit],
    return_type: Type,
) -> Result<IrStmt, LowerError> {
    match stmt {
        Stmt::Set { dest, src, .. } => {
            let dest_name = match &dest.kind {
                crate::compiler::tokens::TokenKind::Atom(s) => s.as_str(),
                _ => unreachable!("Compiler Error: set dest is always an atom"),
            };
            let slot = *ctx.vars.get(dest_name).ok_or_else(|| LowerError::UnknownVariable {
                name: dest_name.to_string(),
                span: dest.span,
            })?;
            let dest_ty = ctx.var_types[dest_name];
            let src_ir = lower_expr(src, ctx, consts)?;
            if src_ir.ty(consts) != dest_ty {
                return Err(LowerError::SetTypeMismatch { span: src.span() });
            }
            Ok(IrStmt::Set { dest: slot, src: src_ir })
        }
        Stmt::If { cond, then_branch, else_branch, .. } => {
            let label = ctx.labels[&node_id];
            let cond_ir = lower_expr(cond, ctx, consts)?;
            if cond_ir.ty(consts) != Type::Bool {
                return Err(LowerError::NonBoolCondition { span: cond.span() });
            }
            let then_ir = lower_stmts(then_branch, ctx, consts, return_type)?;
            let else_ir = lower_stmts(else_branch, ctx, consts, return_type)?;
            Ok(IrStmt::If { label, cond: cond_ir, then_branch: then_ir, else_branch: else_ir })
        }
        Stmt::While { cond, body, .. } => {
            let label = ctx.labels[&node_id];
            let cond_ir = lower_expr(cond, ctx, consts)?;
            if cond_ir.ty(consts) != Type::Bool {
                return Err(LowerError::NonBoolCondition { span: cond.span() });
            }
            let body_ir = lower_stmts(body, ctx, consts, return_type)?;
            Ok(IrStmt::While { label, cond: cond_ir, body: body_ir })
        }
        Stmt::Return { value, .. } => {
            let value_ir = lower_expr(value, ctx, consts)?;
            if value_ir.ty(consts) != return_type {
                return Err(LowerError::ReturnTypeMismatch { span: value.span() });
            }
            Ok(IrStmt::Return { value: value_ir })
        }
    }
}

fn lower_atom(atom: &AtomExpr, ctx: &FnCtx) -> Result<IrAtom, LowerError> {
    match atom {
        AtomExpr::Variable(tok) => {
            let name = match &tok.kind {
                crate::compiler::tokens::TokenKind::Atom(s) => s.as_str(),
                _ => unreachable!("Compiler Error: variable reference is always an atom"),
            };
            let slot = *ctx.vars.get(name).ok_or_else(|| LowerError::UnknownVariable {
                name: name.to_string(),
                span: tok.span,
            })?;
            Ok(IrAtom::Var(crate::compiler::ir::IrVar { slot, ty: ctx.var_types[name] }))
        }
        AtomExpr::Constant(id) => Ok(IrAtom::Const(*id)),
    }
}

fn lower_expr(expr: &Expr, ctx: &mut FnCtx, consts: &[ast::ConstLit]) -> Result<IrExpr, LowerError> {
    match expr {
        Expr::Atom(a) => Ok(IrExpr::Atom(lower_atom(a, ctx)?)),
        Expr::Call(call) => {
            let name = match &call.name.kind {
                crate::compiler::tokens::TokenKind::Atom(s) => s.as_str(),
                _ => unreachable!("Compiler Error: call name is always an atom"),
            };
            let args: Vec<IrAtom> = call.args.iter().map(|a| lower_atom(a, ctx)).collect::<Result<_, _>>()?;
            let arg_types: Vec<Type> = args.iter().map(|a| a.ty(consts)).collect();

            if let Some((idx, f)) = ctx
                .functions
                .iter()
                .enumerate()
                .find(|(_, f)| f.name_text() == name && f.args.iter().map(|a| a.ty).collect::<Vec<_>>() == arg_types)
            {
                return Ok(IrExpr::Call(IrCall { callee: Callee::User(idx), args, result_ty: f.return_type }));
            }

            if let Some(idx) = BUILTINS.iter().position(|b| b.name == name && b.args == arg_types.as_slice()) {
                let ret = BUILTINS[idx].ret;
                return Ok(IrExpr::Call(IrCall { callee: Callee::Builtin(idx), args, result_ty: ret }));
            }

            Err(LowerError::NoMatchingOverload { span: call.open })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse_program;
    use crate::compiler::tree::build_tree;

    fn lower(src: &str) -> Result<IrProgram, LowerError> {
        let prog = parse_program(build_tree(tokenize(src).unwrap()).unwrap()).unwrap();
        lower_program(prog)
    }

    #[test]
    fn lowers_identity_function() {
        let ir = lower("(fn id int ((x int)) () ((return x)))").unwrap();
        assert_eq!(ir.functions.len(), 1);
        assert!(matches!(
            ir.functions[0].body.as_slice(),
            [IrStmt::Return { value: IrExpr::Atom(IrAtom::Var(_)) }]
        ));
    }

    #[test]
    fn resolves_builtin_overload_by_arg_types() {
        let ir = lower("(fn add2 int ((a int)(b int)) () ((set a (+ a b))(return a)))").unwrap();
        let IrStmt::Set { src: IrExpr::Call(call), .. } = &ir.functions[0].body[0] else {
            panic!("expected a call");
        };
        assert_eq!(call.callee, Callee::Builtin(4)); // "+" int,int
    }

    #[test]
    fn rejects_unknown_variable() {
        let err = lower("(fn f int () () ((return missing)))").unwrap_err();
        assert!(matches!(err, LowerError::UnknownVariable { .. }));
    }

    #[test]
    fn rejects_set_type_mismatch() {
        let err = lower("(fn f int ((a int)(b int)) () ((set a (> a b)) (return a)))").unwrap_err();
        assert!(matches!(err, LowerError::SetTypeMismatch { .. }));
    }

    #[test]
    fn rejects_non_bool_condition() {
        let err = lower("(fn f int ((a int)) () ((if a () ()) (return a)))").unwrap_err();
        assert!(matches!(err, LowerError::NonBoolCondition { .. }));
    }

    #[test]
    fn assigns_distinct_labels_to_sibling_ifs_even_when_nested() {
        let ir = lower(
            "(fn f int ((a int)) () ((if (> a 0) ((if (> a 1) ((set a 1)) ((set a 0)))) ((set a 0))) (return a)))",
        )
        .unwrap();
        let IrStmt::If { label: outer, then_branch, .. } = &ir.functions[0].body[0] else {
            panic!("expected if");
        };
        let IrStmt::If { label: inner, .. } = &then_branch[0] else {
            panic!("expected nested if");
        };
        assert_ne!(outer, inner);
    }

    #[test]
    fn overload_resolution_prefers_user_function_over_builtin() {
        let ir = lower(
            "(fn + int ((a int)(b int)(c int)) () ((return a))) (fn f int ((x int)(y int)(z int)) () ((return (+ x y z))))",
        );
        // three-arg "+" has no built-in match, so this only succeeds if the
        // user-defined three-arg overload is found.
        assert!(ir.is_ok());
    }
}
