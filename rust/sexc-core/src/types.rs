use serde::{Deserialize, Serialize};
use std::fmt;

/// The language's nominal, invariant type system. There is no subtyping and
/// no implicit conversion between any two of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Bool,
}

impl Type {
    /// Parse a type atom's text, as accepted by `arg-list`/`var-list`/return-type positions.
    pub fn from_atom(text: &str) -> Option<Type> {
        match text {
            "int" => Some(Type::Int),
            "float" => Some(Type::Float),
            "bool" => Some(Type::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
        }
    }
}
