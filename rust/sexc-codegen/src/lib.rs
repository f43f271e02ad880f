//! AArch64 code generator: turns a fully resolved [`IrProgram`] into GNU
//! assembler text. By the time a program reaches this crate it has already
//! passed every semantic check, so generation here is infallible — an
//! inconsistency at this point is a programmer error, not a diagnostic.

pub mod emit;
pub mod frame;
pub mod names;

pub use sexc_compiler::compiler::ir::IrProgram;

/// Generates the full `.data`/`.text` assembly text for a lowered program.
pub fn generate(program: &IrProgram) -> String {
    emit::generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sexc_compiler::compile;

    fn gen(src: &str) -> String {
        generate(&compile(src).unwrap())
    }

    #[test]
    fn identity_function_has_one_label_a_load_and_an_epilogue() {
        let asm = gen("(fn id int ((x int)) () ((return x)))");
        assert!(asm.contains(".global fn_19\n"));
        assert!(asm.contains("ldr x0, [fp, #-8]"));
        assert!(asm.contains("ret"));
    }

    #[test]
    fn arithmetic_scenario_calls_the_int_plus_builtin() {
        let asm = gen("(fn add2 int ((a int)(b int)) () ((set a (+ a b))(return a)))");
        assert!(asm.contains("bl fn_4\n")); // "+" int,int is builtin index 4
    }

    #[test]
    fn loop_scenario_emits_a_balanced_while_label_pair() {
        let asm = gen(
            "(fn count int ((n int)) ((i int)) ((while (< i n) ((set i (+ i 1)))) (return i)))",
        );
        assert!(asm.contains("while_0_start:"));
        assert!(asm.contains("while_0_end:"));
    }

    #[test]
    fn overload_scenario_keeps_both_sq_definitions_under_distinct_labels() {
        let asm = gen(
            "(fn sq int ((x int)) () ((return (* x x)))) (fn sq float ((x float)) () ((return (* x x))))",
        );
        assert!(asm.contains(".global fn_19\n"));
        assert!(asm.contains(".global fn_20\n"));
    }

    #[test]
    fn float_comparison_scenario_calls_the_float_gt_builtin() {
        let asm = gen("(fn gt bool ((x float)(y float)) () ((return (> x y))))");
        assert!(asm.contains("bl fn_15\n")); // ">" float,float is builtin index 15
    }

    #[test]
    fn stack_frame_size_is_always_a_multiple_of_16() {
        let asm = gen("(fn f int ((a int)) () ((return a)))");
        let sub_line = asm.lines().find(|l| l.contains("sub sp, sp, #")).unwrap();
        let bytes: usize = sub_line.trim().trim_start_matches("sub sp, sp, #").parse().unwrap();
        assert_eq!(bytes % 16, 0);
    }

    #[test]
    fn nine_int_args_spill_exactly_one_to_the_stack() {
        let asm = gen(
            "(fn nine int ((a int)(b int)(c int)(d int)(e int)(f int)(g int)(h int)(i int)) () ((return a)))",
        );
        // the 9th parameter must be read from the incoming stack-arg area
        assert!(asm.contains("ldr x9, [fp, #16]"));
    }
}
