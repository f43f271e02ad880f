//! End-to-end assembly shape checks across the scenarios from the
//! compiler's own test scenarios, verified at the generated-text level.

use sexc_compiler::compile;

fn gen(src: &str) -> String {
    sexc_codegen::generate(&compile(src).unwrap())
}

#[test]
fn emits_data_before_text() {
    let asm = gen("(fn f int () () ((return 1)))");
    let data_pos = asm.find(".data").unwrap();
    let text_pos = asm.find(".text").unwrap();
    assert!(data_pos < text_pos);
}

#[test]
fn constants_are_emitted_in_source_order_uniquely() {
    let asm = gen("(fn f int () () ((return (+ 1 2))))");
    let const0 = asm.find("const_0:").unwrap();
    let const1 = asm.find("const_1:").unwrap();
    assert!(const0 < const1);
    assert!(asm.contains("const_0:\n\t.dword 1\n"));
    assert!(asm.contains("const_1:\n\t.dword 2\n"));
}

#[test]
fn float_constant_uses_dot_double() {
    let asm = gen("(fn f float () () ((return 1.5)))");
    assert!(asm.contains(".double 1.5"));
}

#[test]
fn nested_if_while_produce_balanced_non_colliding_labels() {
    let asm = gen(
        "(fn f int ((a int)) () ((while (> a 0) ((if (> a 1) ((if (> a 2) ((set a 2)) ((set a 1)))) ((set a 0)))) (return a)))",
    );
    for label in ["while_0_start", "while_0_end", "if_0_true", "if_0_false", "if_1_true", "if_1_false"] {
        assert!(asm.contains(label), "missing label {label} in:\n{asm}");
    }
}

#[test]
fn every_user_function_frame_is_16_byte_aligned() {
    let asm = gen(
        "(fn f int ((a int)(b int)(c int)) () ((return a))) (fn g int () () ((return 0)))",
    );
    for line in asm.lines().filter(|l| l.contains("sub sp, sp, #")) {
        let bytes: usize = line.trim().trim_start_matches("sub sp, sp, #").parse().unwrap();
        assert_eq!(bytes % 16, 0, "frame size {bytes} is not 16-byte aligned");
    }
}

#[test]
fn builtin_stubs_precede_user_functions_in_fn_numbering() {
    let asm = gen("(fn f int () () ((return 1)))");
    assert!(asm.contains(".global fn_0\n")); // first builtin
    assert!(asm.contains(".global fn_19\n")); // first (only) user function
}
