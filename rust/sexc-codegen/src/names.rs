//! Mints every assembly label the generator needs, in one pass over the
//! whole program, before any emission happens — naming is entirely
//! positional, so it never has to be threaded through emission as state.

use sexc_compiler::compiler::builtins::BUILTINS;
use sexc_compiler::compiler::ir::IrProgram;

pub struct NameTable {
    builtin_labels: Vec<String>,
    user_labels: Vec<String>,
    const_labels: Vec<String>,
}

impl NameTable {
    /// `fn_<i>` is minted over built-ins first, then user functions in
    /// source order, so that built-in label numbering never changes as
    /// user functions are added. `const_<i>` follows constant source order.
    pub fn build(program: &IrProgram) -> Self {
        let mut next = 0usize;
        let builtin_labels: Vec<String> = (0..BUILTINS.len())
            .map(|_| {
                let label = format!("fn_{next}");
                next += 1;
                label
            })
            .collect();
        let user_labels: Vec<String> = (0..program.functions.len())
            .map(|_| {
                let label = format!("fn_{next}");
                next += 1;
                label
            })
            .collect();
        let const_labels = (0..program.constants.len()).map(|i| format!("const_{i}")).collect();
        Self { builtin_labels, user_labels, const_labels }
    }

    pub fn builtin_label(&self, idx: usize) -> &str {
        &self.builtin_labels[idx]
    }

    pub fn user_label(&self, idx: usize) -> &str {
        &self.user_labels[idx]
    }

    pub fn const_label(&self, idx: usize) -> &str {
        &self.const_labels[idx]
    }

    /// If and While each draw labels from their own counter (see
    /// [`sexc_compiler::compiler::lower`]'s pre-scan), so the raw node id
    /// only needs a kind-specific prefix here.
    pub fn if_label(id: usize) -> String {
        format!("if_{id}")
    }

    pub fn while_label(id: usize) -> String {
        format!("while_{id}")
    }
}
