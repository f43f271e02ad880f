//! Tokenizer for the S-expression surface syntax.

use crate::compiler::tokens::{Token, TokenKind};
use sexc_core::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("Unrecognized symbol at line {line}, column {col}")]
    UnrecognizedSymbol { line: usize, col: usize },
}

/// Characters that may appear in an atom, per the language's identifier
/// character class: letters, digits, and `!$%&*/+-:<=>?^_~.`.
fn is_atom_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "!$%&*/+-:<=>?^_~.".contains(ch)
}

fn is_horizontal_ws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r')
}

/// Lazily tokenizes a source string, one token at a time, in priority order:
/// `(`, `)`, a maximal atom run, discarded whitespace, discarded newlines.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    /// Byte/char index of the start of the current line, used to compute columns.
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn col(&self) -> usize {
        self.pos - self.line_start + 1
    }

    fn span_here(&self) -> Span {
        Span::new(self.line, self.col())
    }

    /// Tokenize the whole source eagerly. The language has no use for true
    /// streaming lexing since every later stage buffers its input anyway.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            let Some(ch) = self.current() else {
                return Ok(None);
            };
            match ch {
                '(' => {
                    let span = self.span_here();
                    self.pos += 1;
                    return Ok(Some(Token::new(TokenKind::OpenParen, span)));
                }
                ')' => {
                    let span = self.span_here();
                    self.pos += 1;
                    return Ok(Some(Token::new(TokenKind::CloseParen, span)));
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.line_start = self.pos;
                    continue;
                }
                c if is_horizontal_ws(c) => {
                    self.pos += 1;
                    continue;
                }
                c if is_atom_char(c) => {
                    let span = self.span_here();
                    let start = self.pos;
                    while matches!(self.current(), Some(c) if is_atom_char(c)) {
                        self.pos += 1;
                    }
                    let text: String = self.chars[start..self.pos].iter().collect();
                    return Ok(Some(Token::new(TokenKind::Atom(text), span)));
                }
                _ => {
                    return Err(LexError::UnrecognizedSymbol {
                        line: self.line,
                        col: self.col(),
                    });
                }
            }
        }
    }
}

/// Convenience wrapper matching the shape used elsewhere in the pipeline.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_parens_and_atoms() {
        let toks = tokenize("(fn id int)").unwrap();
        assert_eq!(toks.len(), 6);
        assert_eq!(toks[0].kind, TokenKind::OpenParen);
        assert_eq!(toks[1].kind, TokenKind::Atom("fn".into()));
        assert_eq!(toks[5].kind, TokenKind::CloseParen);
    }

    #[test]
    fn tracks_line_and_column() {
        let toks = tokenize("(a\n  (b))").unwrap();
        // `b` is on line 2, at column 4 (after two spaces and an open paren)
        let b = toks.iter().find(|t| t.kind == TokenKind::Atom("b".into())).unwrap();
        assert_eq!(b.span.line, 2);
        assert_eq!(b.span.col, 4);
    }

    #[test]
    fn rejects_unrecognized_symbol() {
        let err = tokenize("(a # b)").unwrap_err();
        assert!(matches!(err, LexError::UnrecognizedSymbol { line: 1, col: 4 }));
    }

    #[test]
    fn atom_class_includes_operator_characters() {
        let toks = tokenize("(+ - == <= >= ~ . : )").unwrap();
        let atoms: Vec<_> = toks
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Atom(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(atoms, vec!["+", "-", "==", "<=", ">=", "~", ".", ":"]);
    }
}
