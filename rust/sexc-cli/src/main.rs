//! sexc — ahead-of-time compiler CLI. Single-shot: reads one source file,
//! writes AArch64 assembly text next to it.

use clap::Parser as ClapParser;
use sexc_compiler::diagnostics::Diagnostic;
use std::path::PathBuf;
use std::process::ExitCode;

fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

#[derive(ClapParser)]
#[command(
    name = "sexc",
    version,
    about = "Compiles a .sx source file to AArch64 assembly",
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}

Examples:
  sexc                  Read example.txt, write example.s
  sexc program.sx       Read program.sx, write program.s
"
)]
struct Cli {
    /// Source file to compile (default: example.txt)
    #[arg(default_value = "example.txt")]
    input: PathBuf,

    /// Disable ANSI color in the diagnostic, if one is printed
    #[arg(long)]
    no_color: bool,
}

fn output_path(input: &std::path::Path) -> PathBuf {
    input.with_extension("s")
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: could not read {}: {e}", red(&bold("Error")), cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let ir = match sexc_compiler::compile(&source) {
        Ok(ir) => ir,
        Err(err) => {
            let diag = Diagnostic::from_compile_error(&err);
            if cli.no_color {
                eprintln!("{}", diag.render_plain());
            } else {
                eprintln!("{}", diag.render_ansi());
            }
            return ExitCode::FAILURE;
        }
    };

    let asm = sexc_codegen::generate(&ir);
    let out_path = output_path(&cli.input);
    if let Err(e) = std::fs::write(&out_path, asm) {
        eprintln!("{}: could not write {}: {e}", red(&bold("Error")), out_path.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
