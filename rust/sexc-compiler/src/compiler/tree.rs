//! Builds a rooted tree of nested lists of atoms out of the token stream.

use crate::compiler::tokens::{Token, TokenKind};
use sexc_core::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    #[error("Unmatched paren at {0}")]
    UnmatchedParen(Span),
    #[error("Unexpected ')' at {0}")]
    UnexpectedCloseParen(Span),
}

/// A node in the parenthesized tree: either a bare atom token, or a list
/// that remembers the position of its opening paren for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Atom(Token),
    List { open: Span, children: Vec<TreeNode> },
}

impl TreeNode {
    /// The position used to report errors anchored on this node: the atom's
    /// own position, or the position of the list's opening paren.
    pub fn span(&self) -> Span {
        match self {
            TreeNode::Atom(tok) => tok.span,
            TreeNode::List { open, .. } => *open,
        }
    }

    pub fn as_atom(&self) -> Option<&Token> {
        match self {
            TreeNode::Atom(tok) => Some(tok),
            TreeNode::List { .. } => None,
        }
    }

    pub fn as_list(&self) -> Option<(&Span, &[TreeNode])> {
        match self {
            TreeNode::List { open, children } => Some((open, children)),
            TreeNode::Atom(_) => None,
        }
    }
}

/// Consumes a flat token stream into a single synthetic root list.
///
/// An `OpenParen` pushes a new child list; a `CloseParen` pops the
/// innermost open list. Any opens left on the stack once the stream is
/// exhausted are unmatched, reported against the innermost one.
pub fn build_tree(tokens: Vec<Token>) -> Result<Vec<TreeNode>, TreeError> {
    let mut stack: Vec<(Span, Vec<TreeNode>)> = Vec::new();
    let mut root: Vec<TreeNode> = Vec::new();

    for tok in tokens {
        match tok.kind {
            TokenKind::OpenParen => {
                stack.push((tok.span, Vec::new()));
            }
            TokenKind::CloseParen => match stack.pop() {
                Some((open, children)) => {
                    let list = TreeNode::List { open, children };
                    match stack.last_mut() {
                        Some((_, parent_children)) => parent_children.push(list),
                        None => root.push(list),
                    }
                }
                None => return Err(TreeError::UnexpectedCloseParen(tok.span)),
            },
            TokenKind::Atom(_) => {
                let atom = TreeNode::Atom(tok);
                match stack.last_mut() {
                    Some((_, children)) => children.push(atom),
                    None => root.push(atom),
                }
            }
        }
    }

    if let Some((open, _)) = stack.into_iter().last() {
        return Err(TreeError::UnmatchedParen(open));
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;

    #[test]
    fn builds_nested_lists() {
        let tree = build_tree(tokenize("(fn id int () () ((return x)))").unwrap()).unwrap();
        assert_eq!(tree.len(), 1);
        let (_, children) = tree[0].as_list().unwrap();
        assert_eq!(children.len(), 6);
    }

    #[test]
    fn reports_innermost_unmatched_paren() {
        // Opens at columns 1 and 8; the inner `()` at column 13 closes, so
        // only the column-8 open is still unmatched, not the column-1 one.
        let err = build_tree(tokenize("(fn id (int ()").unwrap()).unwrap_err();
        match err {
            TreeError::UnmatchedParen(span) => assert_eq!(span, Span::new(1, 8)),
            other => panic!("expected UnmatchedParen, got {other:?}"),
        }
    }

    #[test]
    fn rejects_stray_close_paren() {
        let err = build_tree(tokenize("(fn id) )").unwrap()).unwrap_err();
        assert!(matches!(err, TreeError::UnexpectedCloseParen(_)));
    }
}
