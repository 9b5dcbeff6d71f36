//! Driver binary: reads one source file and runs it through the full
//! pipeline, printing the parse tree, the Sem IR dump, and the GraphViz of
//! the optimized Spindle graph to stdout, in that order (`spec.md` §6).
//!
//! Diagnostics go to stderr in the two-line caret format; the process exits
//! 1 on the first failing stage (I/O, parse, check, or reachability) and 0
//! otherwise (`spec.md` §7: short-circuit, no accumulated error buffer).

use std::process::ExitCode;

use clap::Parser;

use lousyc_ir::{lower_sem_func, sb_opt, write_graphviz};
use lousyc_sem::{check_reachability, check_tree};
use lousyc_syntax::{lex_source, parse, print::print_parse_tree};

/// lousyc - lex, parse, check, lower, and optimize a `.lousy` source file.
#[derive(Parser)]
#[command(name = "lousyc", version, about)]
struct Args {
    /// Source file to compile.
    #[arg(default_value = "test/test.lousy")]
    path: std::path::PathBuf,

    /// Don't print the parse tree.
    #[arg(long)]
    no_dump_tree: bool,

    /// Don't print the Sem IR dump.
    #[arg(long)]
    no_dump_sem: bool,

    /// Don't print the GraphViz dump of the optimized Spindle graph.
    #[arg(long)]
    no_dump_graphviz: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let path_str = args.path.to_string_lossy().into_owned();

    let source = match std::fs::read_to_string(&args.path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{path_str}: error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tokens = lex_source(&source);

    let tree = match parse(&tokens, &path_str, &source) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("{}", err.diagnostic(&path_str, &source));
            return ExitCode::FAILURE;
        }
    };

    if !args.no_dump_tree {
        print!("{}", print_parse_tree(&tree, &source));
    }

    let func = match check_tree(&path_str, &source, &tree) {
        Ok(func) => func,
        Err(err) => {
            eprintln!("{}", err.diagnostic(&path_str, &source));
            return ExitCode::FAILURE;
        }
    };

    let func = match check_reachability(func) {
        Ok(func) => func,
        Err(err) => {
            eprintln!("{}", err.diagnostic(&path_str, &source));
            return ExitCode::FAILURE;
        }
    };

    if !args.no_dump_sem {
        print!("{}", lousyc_sem::print_sem_func(&func));
    }

    let mut sb = lower_sem_func(&func);
    sb_opt(&mut sb);

    if !args.no_dump_graphviz {
        print!("{}", write_graphviz(&sb));
    }

    ExitCode::SUCCESS
}
