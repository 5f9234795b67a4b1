#![warn(clippy::pedantic)]

//! # Cinder Compiler CLI
//!
//! Command line driver for the Cinder front end.
//!
//! 1. Lex   (`--tokens`) – print the token stream of every file.
//! 2. Parse (`--ast`)    – print an outline of every parsed module.
//! 3. Check (default)    – type-check the whole program.
//!
//! Diagnostics of every phase that ran are printed to stderr before the
//! process exits.
//!
//! ## Exit codes
//! * 0 – success (warnings allowed unless `--warnings-as-errors`).
//! * 1 – IO error or a phase reported errors.
//!
//! ## Logging
//! `-v` raises the log level; `CINDER_LOG` accepts a full `tracing` filter
//! (e.g. `CINDER_LOG=cinder_type_checker=trace`) and wins over `-v`.
//!
//! ## Example
//! ```bash
//! cinderc src/main.cnd src/math.cnd --max-diagnostics 20
//! ```

mod parser;

use std::process::ExitCode;

use cinder::{Compilation, Phase, SourceFile, load_sources, outline};
use cinder_ast::Diagnostics;
use clap::Parser;
use parser::Cli;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

/// Entry point for the CLI executable.
///
/// On any failure the error is printed to stderr and the process exits with code `1`.
fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.log_level());
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("CINDER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = Registry::default().with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter),
    );
    if tracing::subscriber::set_global_default(registry).is_err() {
        eprintln!("warning: a global logger is already installed");
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let sources = load_sources(&args.files)?;
    let options = args.compile_options();
    debug!(files = sources.len(), ?options, "starting cinderc");

    if options.stop_after == Phase::Lex {
        return print_tokens(&sources, options.diagnostics());
    }

    let arena = options.arena();
    let mut compilation = Compilation::new(&arena, options);
    let result = compilation.run(&sources);
    compilation.report();
    result?;

    if compilation.options().stop_after == Phase::Parse {
        if let Some(program) = compilation.program() {
            print!("{}", outline(program));
        }
        return Ok(());
    }

    let diagnostics = compilation.diagnostics();
    for source in &sources {
        println!("Checked: {}", source.path);
    }
    if diagnostics.warning_count() > 0 {
        println!("{} warning(s) emitted", diagnostics.warning_count());
    }
    Ok(())
}

fn print_tokens(sources: &[SourceFile], mut diagnostics: Diagnostics) -> anyhow::Result<()> {
    let result = cinder::lex(sources, &mut diagnostics);
    diagnostics.report();
    for (source, tokens) in sources.iter().zip(result?) {
        println!("{}:", source.path);
        for token in tokens {
            println!("  {token}");
        }
    }
    Ok(())
}
