//! Command line argument parsing for the Cinder compiler.
//!
//! The `Cli` struct captures every flag and argument passed to the `cinderc`
//! binary and converts them into [`CompileOptions`].

use std::path::PathBuf;

use cinder::{CompileOptions, Phase};
use cinder_ast::diagnostics::DEFAULT_MAX_DIAGNOSTICS;
use clap::Parser;

/// Command line interface definition for the Cinder compiler.
///
/// All files form one program: each is a module named by its `@module`
/// directive or, without one, by its file stem. By default `cinderc` runs the
/// whole front end (lex, parse, type check) and prints diagnostics.
///
/// ## Phase selection
///
/// - `--tokens`: lex only and print the token stream of every file
/// - `--ast`: parse only and print an outline of every module
/// - `--check`: run every phase (the default)
///
/// When several are given the earliest phase wins.
///
/// ## Examples
///
/// ```bash
/// cinderc src/main.cnd src/math.cnd
/// cinderc --tokens main.cnd
/// CINDER_LOG=debug cinderc -v main.cnd
/// ```
#[derive(Parser)]
#[command(
    name = "cinderc",
    author,
    version,
    about = "Cinder compiler front end (cinderc)",
    long_about = "The 'cinderc' command lexes, parses and type-checks a set of .cnd source files. \
Diagnostics are printed to stderr; the exit code is 1 when any phase fails."
)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Cli {
    /// Source files making up the program.
    #[arg(required = true, value_name = "FILES")]
    pub(crate) files: Vec<PathBuf>,

    /// Stop after lexing and print every token.
    #[arg(long)]
    pub(crate) tokens: bool,

    /// Stop after parsing and print an outline of every module.
    #[arg(long)]
    pub(crate) ast: bool,

    /// Run the full front end, including type checking.
    #[arg(long)]
    pub(crate) check: bool,

    /// Diagnostics kept for printing; the rest are counted and summarized.
    #[arg(
        long,
        value_name = "N",
        env = "CINDER_MAX_DIAGNOSTICS",
        default_value_t = DEFAULT_MAX_DIAGNOSTICS
    )]
    pub(crate) max_diagnostics: usize,

    /// Fail when the type checker reports warnings.
    #[arg(long)]
    pub(crate) warnings_as_errors: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `CINDER_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
}

impl Cli {
    /// Last phase the requested flags ask for.
    pub(crate) fn stop_after(&self) -> Phase {
        if self.tokens {
            Phase::Lex
        } else if self.ast {
            Phase::Parse
        } else {
            Phase::Check
        }
    }

    pub(crate) fn compile_options(&self) -> CompileOptions {
        CompileOptions::default()
            .with_max_diagnostics(self.max_diagnostics)
            .with_warnings_as_errors(self.warnings_as_errors)
            .stop_after(self.stop_after())
    }

    pub(crate) fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
