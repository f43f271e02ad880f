//! Intermediate representation produced by lowering: fully resolved, fully
//! typed, with every variable and call target replaced by a stable index.
//! This is the only thing the codegen crate ever looks at.

use sexc_core::{Span, Type};

/// Where a resolved variable reference lives: the function's own parameter
/// list or its local list, addressed by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarSlot {
    Arg(usize),
    Local(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrVar {
    pub slot: VarSlot,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IrAtom {
    Var(IrVar),
    Const(usize),
}

impl IrAtom {
    pub fn ty(&self, consts: &[crate::compiler::ast::ConstLit]) -> Type {
        match self {
            IrAtom::Var(v) => v.ty,
            IrAtom::Const(idx) => consts[*idx].kind.ty(),
        }
    }
}

/// The resolved callee of an `IrCall`: a user-defined function (by index
/// into [`IrProgram::functions`]) or a built-in (by index into the fixed
/// built-in catalogue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    User(usize),
    Builtin(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrCall {
    pub callee: Callee,
    pub args: Vec<IrAtom>,
    pub result_ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    Atom(IrAtom),
    Call(IrCall),
}

impl IrExpr {
    pub fn ty(&self, consts: &[crate::compiler::ast::ConstLit]) -> Type {
        match self {
            IrExpr::Atom(a) => a.ty(consts),
            IrExpr::Call(c) => c.result_ty,
        }
    }
}

/// A stable identity for a branch/loop node, minted once per whole program
/// during label pre-scan so every `if`/`while` gets a unique label even
/// across functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum IrStmt {
    Set {
        dest: VarSlot,
        src: IrExpr,
    },
    If {
        label: LabelId,
        cond: IrExpr,
        then_branch: Vec<IrStmt>,
        else_branch: Vec<IrStmt>,
    },
    While {
        label: LabelId,
        cond: IrExpr,
        body: Vec<IrStmt>,
    },
    Return {
        value: IrExpr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrArg {
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub span: Span,
    pub return_type: Type,
    pub args: Vec<IrArg>,
    pub locals: Vec<Type>,
    pub body: Vec<IrStmt>,
}

/// The fully lowered program, ready for code generation: every function in
/// source order plus the constant pool it was lowered against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
    pub constants: Vec<crate::compiler::ast::ConstLit>,
}
