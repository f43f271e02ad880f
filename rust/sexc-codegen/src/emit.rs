//! Walks a fully lowered [`IrProgram`] and writes AArch64 GNU-assembler
//! text: the constant pool, built-in stubs, then one prologue/body/epilogue
//! per user function.

use crate::frame::Frame;
use crate::names::NameTable;
use sexc_compiler::compiler::ast::{ConstKind, ConstLit};
use sexc_compiler::compiler::builtins::BUILTINS;
use sexc_compiler::compiler::ir::{Callee, IrAtom, IrCall, IrExpr, IrFunction, IrProgram, IrStmt, VarSlot};
use sexc_core::Type;

/// Register family a value of a given type is passed/returned in.
fn reg_prefix(ty: Type) -> &'static str {
    match ty {
        Type::Float => "d",
        Type::Int | Type::Bool => "x",
    }
}

fn scratch_reg(ty: Type) -> &'static str {
    match ty {
        Type::Float => "d9",
        Type::Int | Type::Bool => "x9",
    }
}

fn round_up_16(bytes: usize) -> usize {
    (bytes + 15) & !15
}

/// Where one call argument (or parameter) lands: the next free register of
/// its kind, or a slot in the stack-argument area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgLoc {
    IntReg(u8),
    FloatReg(u8),
    Stack(usize),
}

/// First 8 int/bool args go to `x0..x7`, first 8 float args to `d0..d7`,
/// the rest spill to the stack area in order. Shared between parameter
/// reception and call-site argument passing — the two follow the same rule.
fn partition(types: &[Type]) -> Vec<ArgLoc> {
    let mut int_reg = 0u8;
    let mut float_reg = 0u8;
    let mut stack_idx = 0usize;
    types
        .iter()
        .map(|ty| match ty {
            Type::Float => {
                let loc = if float_reg < 8 { ArgLoc::FloatReg(float_reg) } else {
                    let s = stack_idx;
                    stack_idx += 1;
                    ArgLoc::Stack(s)
                };
                float_reg += 1;
                loc
            }
            Type::Int | Type::Bool => {
                let loc = if int_reg < 8 { ArgLoc::IntReg(int_reg) } else {
                    let s = stack_idx;
                    stack_idx += 1;
                    ArgLoc::Stack(s)
                };
                int_reg += 1;
                loc
            }
        })
        .collect()
}

pub fn generate(program: &IrProgram) -> String {
    let names = NameTable::build(program);
    let mut out = String::new();

    emit_data_section(&mut out, &program.constants, &names);
    out.push_str(".text\n");
    emit_builtin_stubs(&mut out, &names);
    for (idx, f) in program.functions.iter().enumerate() {
        emit_function(&mut out, f, idx, &names, &program.constants);
    }
    out
}

fn emit_data_section(out: &mut String, consts: &[ConstLit], names: &NameTable) {
    out.push_str(".data\n");
    for (i, c) in consts.iter().enumerate() {
        out.push_str(".align 8\n");
        let label = names.const_label(i);
        match c.kind {
            ConstKind::Int(v) => out.push_str(&format!("{label}:\n\t.dword {v}\n")),
            ConstKind::Bool(b) => out.push_str(&format!("{label}:\n\t.dword {}\n", b as i64)),
            ConstKind::Float(v) => out.push_str(&format!("{label}:\n\t.double {v}\n")),
        }
    }
}

fn emit_builtin_stubs(out: &mut String, names: &NameTable) {
    for (i, b) in BUILTINS.iter().enumerate() {
        let label = names.builtin_label(i);
        out.push_str(&format!(".global {label}\n{label}:\n"));
        out.push_str(b.body);
    }
}

struct FnEmitCtx<'a> {
    frame: Frame,
    names: &'a NameTable,
    consts: &'a [ConstLit],
    num_params: usize,
}

fn slot_offset(ctx: &FnEmitCtx, slot: VarSlot) -> usize {
    match slot {
        VarSlot::Arg(i) => ctx.frame.param_offset(i),
        VarSlot::Local(i) => ctx.frame.local_offset(ctx.num_params, i),
    }
}

fn emit_function(out: &mut String, f: &IrFunction, idx: usize, names: &NameTable, program_consts: &[ConstLit]) {
    let label = names.user_label(idx);
    out.push_str(&format!(".global {label}\n{label}:\n"));

    let frame = Frame::compute(f.args.len(), f.locals.len());
    let fp_save_offset = frame.frame_bytes - 16;
    out.push_str(&format!("\tsub sp, sp, #{}\n", frame.frame_bytes));
    out.push_str(&format!("\tstr fp, [sp, #{fp_save_offset}]\n"));
    out.push_str(&format!("\tadd fp, sp, #{fp_save_offset}\n"));

    let arg_types: Vec<Type> = f.args.iter().map(|a| a.ty).collect();
    let locs = partition(&arg_types);
    let mut stack_arg_idx = 0usize;
    for (i, (arg, loc)) in f.args.iter().zip(locs.iter()).enumerate() {
        let off = frame.param_offset(i);
        match loc {
            ArgLoc::IntReg(r) => out.push_str(&format!("\tstr x{r}, [fp, #-{off}]\n")),
            ArgLoc::FloatReg(r) => out.push_str(&format!("\tstr d{r}, [fp, #-{off}]\n")),
            ArgLoc::Stack(_) => {
                let reg = scratch_reg(arg.ty);
                out.push_str(&format!("\tldr {reg}, [fp, #{}]\n", 16 + stack_arg_idx * 8));
                out.push_str(&format!("\tstr {reg}, [fp, #-{off}]\n"));
                stack_arg_idx += 1;
            }
        }
    }

    for (i, _local_ty) in f.locals.iter().enumerate() {
        let off = frame.local_offset(f.args.len(), i);
        out.push_str(&format!("\tmov x9, #0\n\tstr x9, [fp, #-{off}]\n"));
    }

    let ctx = FnEmitCtx { frame, names, consts: program_consts, num_params: f.args.len() };
    emit_stmts(out, &f.body, &ctx);

    out.push_str(&format!("\tldr fp, [sp, #{fp_save_offset}]\n"));
    out.push_str(&format!("\tadd sp, sp, #{}\n", ctx.frame.frame_bytes));
    out.push_str("\tret\n");
}

fn emit_stmts(out: &mut String, stmts: &[IrStmt], ctx: &FnEmitCtx) {
    for stmt in stmts {
        emit_stmt(out, stmt, ctx);
    }
}

fn emit_stmt(out: &mut String, stmt: &IrStmt, ctx: &FnEmitCtx) {
    match stmt {
        IrStmt::Set { dest, src } => {
            let ty = src.ty(ctx.consts);
            emit_expr(out, src, ctx);
            let off = slot_offset(ctx, *dest);
            out.push_str(&format!("\tstr {}0, [fp, #-{off}]\n", reg_prefix(ty)));
        }
        IrStmt::If { label, cond, then_branch, else_branch } => {
            let lbl = NameTable::if_label(label.0);
            emit_expr(out, cond, ctx);
            out.push_str("\tcmp x0, #1\n");
            out.push_str(&format!("\tbne {lbl}_false\n"));
            out.push_str(&format!("{lbl}_true:\n"));
            emit_stmts(out, then_branch, ctx);
            out.push_str(&format!("\tb {lbl}_end\n"));
            out.push_str(&format!("{lbl}_false:\n"));
            emit_stmts(out, else_branch, ctx);
            out.push_str(&format!("\tb {lbl}_end\n"));
            out.push_str(&format!("{lbl}_end:\n"));
        }
        IrStmt::While { label, cond, body } => {
            let lbl = NameTable::while_label(label.0);
            out.push_str(&format!("{lbl}_start:\n"));
            emit_expr(out, cond, ctx);
            out.push_str("\tcmp x0, #1\n");
            out.push_str(&format!("\tbne {lbl}_end\n"));
            emit_stmts(out, body, ctx);
            out.push_str(&format!("\tb {lbl}_start\n"));
            out.push_str(&format!("{lbl}_end:\n"));
        }
        IrStmt::Return { value } => {
            // The epilogue is emitted exactly once, right after the whole
            // body — Return only ever occurs as the function's last
            // top-level statement, so leaving the value in x0/d0 here and
            // falling through is sufficient.
            emit_expr(out, value, ctx);
        }
    }
}

/// Leaves `expr`'s value in `x0` (int/bool) or `d0` (float).
fn emit_expr(out: &mut String, expr: &IrExpr, ctx: &FnEmitCtx) {
    match expr {
        IrExpr::Atom(atom) => emit_atom_into(out, atom, ctx, reg_prefix(atom.ty(ctx.consts)), 0),
        IrExpr::Call(call) => emit_call(out, call, ctx),
    }
}

/// Loads an atom's value into `<prefix><index>` (e.g. `x0`, `d9`).
fn emit_atom_into(out: &mut String, atom: &IrAtom, ctx: &FnEmitCtx, prefix: &str, index: u8) {
    match atom {
        IrAtom::Var(v) => {
            let off = slot_offset(ctx, v.slot);
            out.push_str(&format!("\tldr {prefix}{index}, [fp, #-{off}]\n"));
        }
        IrAtom::Const(id) => {
            let label = ctx.names.const_label(*id);
            out.push_str(&format!("\tldr x9, ={label}\n"));
            out.push_str(&format!("\tldr {prefix}{index}, [x9]\n"));
        }
    }
}

fn emit_call(out: &mut String, call: &IrCall, ctx: &FnEmitCtx) {
    let arg_types: Vec<Type> = call.args.iter().map(|a| a.ty(ctx.consts)).collect();
    let locs = partition(&arg_types);

    let stack_arg_indices: Vec<usize> = locs
        .iter()
        .enumerate()
        .filter_map(|(i, l)| matches!(l, ArgLoc::Stack(_)).then_some(i))
        .collect();
    let raw_bytes = stack_arg_indices.len() * 8;
    let padded_bytes = round_up_16(raw_bytes);

    if padded_bytes > 0 {
        out.push_str(&format!("\tsub sp, sp, #{padded_bytes}\n"));
        if padded_bytes > raw_bytes {
            // Zero the padding slot actually inside the outgoing
            // stack-argument area, right after the last real argument.
            out.push_str(&format!("\tmov x9, #0\n\tstr x9, [sp, #{raw_bytes}]\n"));
        }
    }

    for (slot, &arg_idx) in stack_arg_indices.iter().enumerate() {
        let prefix = reg_prefix(arg_types[arg_idx]);
        emit_atom_into(out, &call.args[arg_idx], ctx, prefix, 9);
        out.push_str(&format!("\tstr {prefix}9, [sp, #{}]\n", slot * 8));
    }

    for (i, loc) in locs.iter().enumerate() {
        match loc {
            ArgLoc::IntReg(r) => emit_atom_into(out, &call.args[i], ctx, "x", *r),
            ArgLoc::FloatReg(r) => emit_atom_into(out, &call.args[i], ctx, "d", *r),
            ArgLoc::Stack(_) => {}
        }
    }

    let label = match call.callee {
        Callee::User(i) => ctx.names.user_label(i),
        Callee::Builtin(i) => ctx.names.builtin_label(i),
    };
    out.push_str(&format!("\tbl {label}\n"));

    if padded_bytes > 0 {
        out.push_str(&format!("\tadd sp, sp, #{padded_bytes}\n"));
    }
}
