//! Syntax parser: walks the parenthesized tree with fixed shape rules and
//! produces a typed AST, interning constants into a global, source-ordered
//! list as it goes.

use crate::compiler::ast::*;
use crate::compiler::tokens::{Token, TokenKind};
use crate::compiler::tree::TreeNode;
use sexc_core::{Span, Type};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Function definition must be a list at {0}")]
    FunctionDefNotList(Span),
    #[error("Function definition must have 6 elements at {0}")]
    FunctionDefWrongArity(Span),
    #[error("Function must start with atom at {0}")]
    FunctionHeadNotAtom(Span),
    #[error("Function must start with fn at {0}")]
    FunctionMustStartWithFn(Span),
    #[error("Function name must be an atom at {0}")]
    FunctionNameNotAtom(Span),
    #[error("Function name does not match identifier pattern at {0}")]
    InvalidFunctionName(Span),
    #[error("Function return type must be an atom at {0}")]
    ReturnTypeNotAtom(Span),
    #[error("Function return type is not valid at {0}")]
    InvalidReturnType(Span),
    #[error("Argument list must be a list at {0}")]
    VarListNotList(Span),
    #[error("Name type pair must be a list at {0}")]
    VarPairNotList(Span),
    #[error("Name type pair must have 2 elements at {0}")]
    VarPairWrongArity(Span),
    #[error("Argument name must be an atom at {0}")]
    VarNameNotAtom(Span),
    #[error("Argument name does not match identifier pattern at {0}")]
    InvalidVarName(Span),
    #[error("Argument type must be an atom at {0}")]
    VarTypeNotAtom(Span),
    #[error("Argument type is not valid at {0}")]
    InvalidVarType(Span),
    #[error("Statement list must be a list at {0}")]
    StmtListNotList(Span),
    #[error("Statement must be a list at {0}")]
    StmtNotList(Span),
    #[error("Statement must be a non-empty list at {0}")]
    EmptyStmt(Span),
    #[error("Statement name must be an atom at {0}")]
    StmtHeadNotAtom(Span),
    #[error("Statement name is not valid at {0}")]
    UnknownStmtForm(Span),
    #[error("Set statement list must have 3 elements at {0}")]
    SetWrongArity(Span),
    #[error("If statement list must have 4 elements at {0}")]
    IfWrongArity(Span),
    #[error("While statement list must have 3 elements at {0}")]
    WhileWrongArity(Span),
    #[error("Return statement list must have 2 elements at {0}")]
    ReturnWrongArity(Span),
    #[error("Element must be an atom at {0}")]
    ElementNotAtom(Span),
    #[error("Element is not valid identifier at {0}")]
    InvalidIdentifier(Span),
}

fn first_ident_char(c: char) -> bool {
    c.is_ascii_alphabetic() || "!$%&*/:<=>?^_~".contains(c)
}

fn rest_ident_char(c: char) -> bool {
    first_ident_char(c) || c.is_ascii_digit()
}

/// `[a-zA-Z!$%&*/:<=>?^_~][a-zA-Z!$%&*/:<=>?^_~0-9]*|[+]|[-]`
fn is_valid_identifier(text: &str) -> bool {
    if text == "+" || text == "-" {
        return true;
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if first_ident_char(c) => chars.all(rest_ident_char),
        _ => false,
    }
}

/// `[+-]?[0-9]+`
fn is_int_literal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]?[0-9]+[.][0-9]+`
fn is_float_literal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    match body.split_once('.') {
        Some((int_part, frac_part)) => {
            !int_part.is_empty()
                && !frac_part.is_empty()
                && int_part.bytes().all(|b| b.is_ascii_digit())
                && frac_part.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn atom_token(node: &TreeNode) -> Result<&Token, ParseError> {
    node.as_atom().ok_or(ParseError::ElementNotAtom(node.span()))
}

fn atom_text(tok: &Token) -> &str {
    match &tok.kind {
        TokenKind::Atom(s) => s,
        _ => unreachable!("Compiler Error: tree atoms only ever wrap Atom tokens"),
    }
}

fn expect_list(node: &TreeNode, err: impl Fn(Span) -> ParseError) -> Result<(Span, &[TreeNode]), ParseError> {
    node.as_list().map(|(s, c)| (*s, c)).ok_or_else(|| err(node.span()))
}

/// Parse the whole program: every top-level form must be a 6-element
/// `(fn name ret-type arg-list var-list stmt-list)` list.
pub fn parse_program(tree: Vec<TreeNode>) -> Result<Program, ParseError> {
    let mut constants = Vec::new();
    let mut functions = Vec::with_capacity(tree.len());
    for node in &tree {
        functions.push(parse_function_def(node, &mut constants)?);
    }
    Ok(Program { functions, constants })
}

fn parse_function_def(node: &TreeNode, constants: &mut Vec<ConstLit>) -> Result<FunctionDef, ParseError> {
    let (open, children) = expect_list(node, ParseError::FunctionDefNotList)?;
    if children.len() != 6 {
        return Err(ParseError::FunctionDefWrongArity(open));
    }
    let head = atom_token(&children[0]).map_err(|_| ParseError::FunctionHeadNotAtom(children[0].span()))?;
    if atom_text(head) != "fn" {
        return Err(ParseError::FunctionMustStartWithFn(head.span));
    }
    let name = atom_token(&children[1]).map_err(|_| ParseError::FunctionNameNotAtom(children[1].span()))?;
    if !is_valid_identifier(atom_text(name)) {
        return Err(ParseError::InvalidFunctionName(name.span));
    }
    let return_type = parse_type_atom(&children[2])?;
    let args = parse_var_list(&children[3])?;
    let locals = parse_var_list(&children[4])?;
    let body = parse_stmt_list(&children[5], constants)?;
    Ok(FunctionDef {
        open,
        name: name.clone(),
        return_type,
        args,
        locals,
        body,
    })
}

fn parse_type_atom(node: &TreeNode) -> Result<Type, ParseError> {
    let tok = atom_token(node).map_err(|_| ParseError::ReturnTypeNotAtom(node.span()))?;
    Type::from_atom(atom_text(tok)).ok_or(ParseError::InvalidReturnType(tok.span))
}

fn parse_var_list(node: &TreeNode) -> Result<Vec<VarTypePair>, ParseError> {
    let (_, children) = expect_list(node, ParseError::VarListNotList)?;
    let mut out = Vec::with_capacity(children.len());
    for pair_node in children {
        let (_, pair_children) = expect_list(pair_node, ParseError::VarPairNotList)?;
        if pair_children.len() != 2 {
            return Err(ParseError::VarPairWrongArity(pair_node.span()));
        }
        let name = atom_token(&pair_children[0]).map_err(|_| ParseError::VarNameNotAtom(pair_children[0].span()))?;
        if !is_valid_identifier(atom_text(name)) {
            return Err(ParseError::InvalidVarName(name.span));
        }
        let ty_tok = atom_token(&pair_children[1]).map_err(|_| ParseError::VarTypeNotAtom(pair_children[1].span()))?;
        let ty = Type::from_atom(atom_text(ty_tok)).ok_or(ParseError::InvalidVarType(ty_tok.span))?;
        out.push(VarTypePair { name: name.clone(), ty });
    }
    Ok(out)
}

fn parse_stmt_list(node: &TreeNode, constants: &mut Vec<ConstLit>) -> Result<Vec<Stmt>, ParseError> {
    let (_, children) = expect_list(node, ParseError::StmtListNotList)?;
    children.iter().map(|c| parse_stmt(c, constants)).collect()
}

fn parse_stmt(node: &TreeNode, constants: &mut Vec<ConstLit>) -> Result<Stmt, ParseError> {
    let (open, children) = expect_list(node, ParseError::StmtNotList)?;
    if children.is_empty() {
        return Err(ParseError::EmptyStmt(open));
    }
    let head = atom_token(&children[0]).map_err(|_| ParseError::StmtHeadNotAtom(children[0].span()))?;
    match atom_text(head) {
        "set" => {
            if children.len() != 3 {
                return Err(ParseError::SetWrongArity(open));
            }
            let dest = atom_token(&children[1]).map_err(|_| ParseError::ElementNotAtom(children[1].span()))?;
            if !is_valid_identifier(atom_text(dest)) {
                return Err(ParseError::InvalidIdentifier(dest.span));
            }
            let src = parse_expr(&children[2], constants)?;
            Ok(Stmt::Set { open, dest: dest.clone(), src })
        }
        "if" => {
            if children.len() != 4 {
                return Err(ParseError::IfWrongArity(open));
            }
            let cond = parse_expr(&children[1], constants)?;
            let then_branch = parse_stmt_list(&children[2], constants)?;
            let else_branch = parse_stmt_list(&children[3], constants)?;
            Ok(Stmt::If { open, cond, then_branch, else_branch })
        }
        "while" => {
            if children.len() != 3 {
                return Err(ParseError::WhileWrongArity(open));
            }
            let cond = parse_expr(&children[1], constants)?;
            let body = parse_stmt_list(&children[2], constants)?;
            Ok(Stmt::While { open, cond, body })
        }
        "return" => {
            if children.len() != 2 {
                return Err(ParseError::ReturnWrongArity(open));
            }
            let value = parse_expr(&children[1], constants)?;
            Ok(Stmt::Return { open, value })
        }
        _ => Err(ParseError::UnknownStmtForm(head.span)),
    }
}

/// `expr := atom | "(" IDENT atom* ")"`. Call arguments are atoms only —
/// the grammar does not allow a call argument to itself be a call.
fn parse_expr(node: &TreeNode, constants: &mut Vec<ConstLit>) -> Result<Expr, ParseError> {
    match node {
        TreeNode::Atom(tok) => Ok(Expr::Atom(parse_atom_expr(tok, constants))),
        TreeNode::List { open, children } => {
            if children.is_empty() {
                return Err(ParseError::ElementNotAtom(*open));
            }
            let name = atom_token(&children[0]).map_err(|_| ParseError::ElementNotAtom(children[0].span()))?;
            if !is_valid_identifier(atom_text(name)) {
                return Err(ParseError::InvalidIdentifier(name.span));
            }
            let mut args = Vec::with_capacity(children.len() - 1);
            for arg_node in &children[1..] {
                let arg_tok = atom_token(arg_node)?;
                args.push(parse_atom_expr(arg_tok, constants));
            }
            Ok(Expr::Call(FunctionCall { open: *open, name: name.clone(), args }))
        }
    }
}

fn parse_atom_expr(tok: &Token, constants: &mut Vec<ConstLit>) -> AtomExpr {
    let text = atom_text(tok);
    let kind = if text == "true" {
        Some(ConstKind::Bool(true))
    } else if text == "false" {
        Some(ConstKind::Bool(false))
    } else if is_int_literal(text) {
        Some(ConstKind::Int(text.parse().expect("Compiler Error: validated int literal")))
    } else if is_float_literal(text) {
        Some(ConstKind::Float(text.parse().expect("Compiler Error: validated float literal")))
    } else {
        None
    };
    match kind {
        Some(kind) => {
            constants.push(ConstLit { kind, span: tok.span });
            AtomExpr::Constant(constants.len() - 1)
        }
        None => AtomExpr::Variable(tok.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::tree::build_tree;

    fn parse(src: &str) -> Result<Program, ParseError> {
        parse_program(build_tree(tokenize(src).unwrap()).unwrap())
    }

    #[test]
    fn parses_identity_function() {
        let prog = parse("(fn id int ((x int)) () ((return x)))").unwrap();
        assert_eq!(prog.functions.len(), 1);
        let f = &prog.functions[0];
        assert_eq!(f.name_text(), "id");
        assert_eq!(f.return_type, Type::Int);
        assert_eq!(f.args.len(), 1);
        assert_eq!(f.locals.len(), 0);
        assert_eq!(f.body.len(), 1);
    }

    #[test]
    fn interns_constants_in_source_order() {
        let prog = parse("(fn f int () () ((set x 1) (return 2)))");
        // `x` is not declared so the *parse* stage still succeeds (that's a
        // semantic error caught later); constants are interned regardless.
        let prog = prog.unwrap();
        assert_eq!(prog.constants.len(), 2);
        assert_eq!(prog.constants[0].kind, ConstKind::Int(1));
        assert_eq!(prog.constants[1].kind, ConstKind::Int(2));
    }

    #[test]
    fn rejects_nested_call_arguments() {
        let err = parse("(fn f int () () ((return (+ (+ 1 2) 3))))").unwrap_err();
        assert!(matches!(err, ParseError::ElementNotAtom(_)));
    }

    #[test]
    fn classifies_bool_float_int_and_variable_atoms() {
        let prog = parse("(fn f bool ((y float)) () ((set y 1.5) (return (== y true))))").unwrap();
        assert_eq!(prog.constants[0].kind, ConstKind::Float(1.5));
        assert_eq!(prog.constants[1].kind, ConstKind::Bool(true));
    }

    #[test]
    fn rejects_wrong_function_arity() {
        let err = parse("(fn f int ())").unwrap_err();
        assert!(matches!(err, ParseError::FunctionDefWrongArity(_)));
    }

    #[test]
    fn rejects_invalid_return_type() {
        let err = parse("(fn f string () () ((return 1)))").unwrap_err();
        assert!(matches!(err, ParseError::InvalidReturnType(_)));
    }
}
