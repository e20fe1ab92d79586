use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;
use sabnf::{CompileError, Compiler};

/// Compile ABNF/SABNF grammars into Rust parser tables.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Grammar files, concatenated in order.
    #[clap(long = "in", value_delimiter = ',', required = true)]
    input: Vec<PathBuf>,

    /// Accept only RFC 5234 ABNF.
    #[clap(long)]
    strict: bool,

    /// Output file. Defaults to the first input with an `.rs` extension.
    #[clap(long)]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    info!("Running with args: {:?}", args);

    let mut compiler = Compiler::new().strict(args.strict);
    for path in &args.input {
        compiler = match compiler.file(path) {
            Ok(compiler) => compiler,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        };
    }

    let grammar = match compiler.compile() {
        Ok(grammar) => grammar,
        Err(err) => {
            println!("{}", report(&err));
            return ExitCode::FAILURE;
        }
    };

    let out = args
        .out
        .unwrap_or_else(|| args.input[0].with_extension("rs"));
    if let Err(err) = std::fs::write(&out, grammar.to_rust_source()) {
        eprintln!("{}: {err}", out.display());
        return ExitCode::FAILURE;
    }

    println!("{}", grammar.summary());
    println!("wrote {}", out.display());
    ExitCode::SUCCESS
}

/// The stage header followed by every diagnostic of that stage.
fn report(err: &CompileError) -> String {
    let stage = match err {
        CompileError::InvalidInput { .. } => "GRAMMAR CHARACTER ERRORS",
        CompileError::Syntax { .. } => "GRAMMAR SYNTAX ERRORS",
        CompileError::Semantic { .. } => "GRAMMAR SEMANTIC ERRORS",
        CompileError::Attributes { .. } => "GRAMMAR ATTRIBUTE ERRORS",
    };
    format!("{stage}\n{err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_stage_and_diagnostics() {
        let err = Compiler::new()
            .source("S = Undefined\n")
            .compile()
            .unwrap_err();
        let text = report(&err);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("GRAMMAR SEMANTIC ERRORS"));
        assert_eq!(lines.next(), Some("grammar semantic errors:"));
        assert_eq!(
            lines.next(),
            Some("  line 0: char 4: Rule name 'Undefined' used but not defined.")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn args_split_input_list() {
        let args = Args::parse_from(["sabnf", "--in", "a.abnf,b.abnf", "--strict"]);
        assert_eq!(args.input, vec![PathBuf::from("a.abnf"), PathBuf::from("b.abnf")]);
        assert!(args.strict);
        assert!(args.out.is_none());
    }
}
