//! The fixed built-in catalogue: arithmetic and comparison operators, each a
//! literal AArch64 assembly stub. Built-ins participate in overload
//! resolution exactly like user functions, keyed on `(name, arg types)`.

use sexc_core::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub ret: Type,
    pub args: &'static [Type],
    pub body: &'static str,
}

use Type::{Bool, Float, Int};

/// Built-ins in catalogue order. This order is load-bearing: `fn_<i>`
/// labels are minted over built-ins first, then user functions, so moving
/// an entry here would renumber every built-in's emitted label.
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "==", ret: Bool, args: &[Int, Int], body: "\tcmp x0, x1\n\tcset x0, eq\n\tret\n" },
    Builtin { name: "==", ret: Bool, args: &[Bool, Bool], body: "\tcmp x0, x1\n\tcset x0, eq\n\tret\n" },
    Builtin { name: "*", ret: Int, args: &[Int, Int], body: "\tmul x0, x0, x1\n\tret\n" },
    Builtin { name: "/", ret: Int, args: &[Int, Int], body: "\tsdiv x0, x0, x1\n\tret\n" },
    Builtin { name: "+", ret: Int, args: &[Int, Int], body: "\tadd x0, x0, x1\n\tret\n" },
    Builtin { name: "-", ret: Int, args: &[Int, Int], body: "\tsub x0, x0, x1\n\tret\n" },
    Builtin { name: ">", ret: Bool, args: &[Int, Int], body: "\tcmp x0, x1\n\tcset x0, gt\n\tret\n" },
    Builtin { name: "<", ret: Bool, args: &[Int, Int], body: "\tcmp x0, x1\n\tcset x0, lt\n\tret\n" },
    Builtin { name: ">=", ret: Bool, args: &[Int, Int], body: "\tcmp x0, x1\n\tcset x0, ge\n\tret\n" },
    Builtin { name: "<=", ret: Bool, args: &[Int, Int], body: "\tcmp x0, x1\n\tcset x0, le\n\tret\n" },
    Builtin { name: "*", ret: Float, args: &[Float, Float], body: "\tfmul d0, d0, d1\n\tret\n" },
    Builtin { name: "/", ret: Float, args: &[Float, Float], body: "\tfdiv d0, d0, d1\n\tret\n" },
    Builtin { name: "+", ret: Float, args: &[Float, Float], body: "\tfadd d0, d0, d1\n\tret\n" },
    Builtin { name: "-", ret: Float, args: &[Float, Float], body: "\tfsub d0, d0, d1\n\tret\n" },
    Builtin { name: "==", ret: Bool, args: &[Float, Float], body: "\tfcmp d0, d1\n\tcset x0, eq\n\tret\n" },
    Builtin { name: ">", ret: Bool, args: &[Float, Float], body: "\tfcmp d0, d1\n\tcset x0, gt\n\tret\n" },
    Builtin { name: "<", ret: Bool, args: &[Float, Float], body: "\tfcmp d0, d1\n\tcset x0, lt\n\tret\n" },
    Builtin { name: ">=", ret: Bool, args: &[Float, Float], body: "\tfcmp d0, d1\n\tcset x0, ge\n\tret\n" },
    Builtin { name: "<=", ret: Bool, args: &[Float, Float], body: "\tfcmp d0, d1\n\tcset x0, le\n\tret\n" },
];

/// Look up a built-in by exact `(name, arg types)` match. Linear scan over
/// 19 entries — a hash map would be overkill for a table this size and this
/// static.
pub fn resolve(name: &str, arg_types: &[Type]) -> Option<usize> {
    BUILTINS.iter().position(|b| b.name == name && b.args == arg_types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_int_and_float_overloads_of_plus() {
        assert_eq!(resolve("+", &[Int, Int]), Some(4));
        assert_eq!(resolve("+", &[Float, Float]), Some(12));
    }

    #[test]
    fn unknown_combination_does_not_resolve() {
        assert_eq!(resolve("+", &[Int, Float]), None);
        assert_eq!(resolve("not-an-op", &[Int, Int]), None);
    }

    #[test]
    fn every_entry_ends_in_ret() {
        for b in BUILTINS {
            assert!(b.body.trim_end().ends_with("ret"));
        }
    }
}
