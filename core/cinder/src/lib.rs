#![warn(clippy::pedantic)]
//! Orchestration crate of the Cinder compiler front end.
//!
//! Runs the pipeline over a set of source files and hands a checked program
//! to a code-generation backend:
//!
//! ```text
//! .cnd sources → lex → parse (Program) → type check (TypedContext) → CodeGenerator
//! ```
//!
//! Each phase is exposed as a standalone function, and [`Compilation`] chains
//! them with [`CompileOptions`]. Every phase writes its findings to a shared
//! [`Diagnostics`] sink and keeps going after an error, so one run reports as
//! much as possible; the phase then fails with [`CompileError::PhaseFailed`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cinder::{Compilation, CompileOptions, load_sources};
//!
//! fn check(paths: &[&str]) -> anyhow::Result<()> {
//!     let sources = load_sources(paths)?;
//!     let options = CompileOptions::default();
//!     let arena = options.arena();
//!     let mut compilation = Compilation::new(&arena, options);
//!     let result = compilation.run(&sources);
//!     compilation.report();
//!     result
//! }
//! ```
//!
//! ## Standalone phases
//!
//! ```rust,no_run
//! use cinder::{SourceFile, parse, type_check};
//! use cinder_ast::{Arena, Builder, Diagnostics};
//!
//! let sources = [SourceFile::new("main.cnd", "fn main() -> int { return 0; }")];
//! let arena = Arena::new();
//! let builder = Builder::new(&arena);
//! let mut diagnostics = Diagnostics::new();
//! let program = parse(&builder, &sources, &mut diagnostics)?;
//! let typed_context = type_check(&builder, program, &mut diagnostics)?;
//! assert!(typed_context.entry_point().is_some());
//! # Ok::<(), anyhow::Error>(())
//! ```

use cinder_ast::nodes::Program;
use cinder_ast::{Builder, Diagnostics};
use cinder_parser::Token;
use cinder_type_checker::TypeCheckerBuilder;
use cinder_type_checker::errors::TypeCheckFailed;
use cinder_type_checker::typed_context::TypedContext;
use tracing::{debug, info};

pub mod codegen;
mod compilation;
mod errors;
pub mod options;
pub mod outline;
mod source;

pub use codegen::CodeGenerator;
pub use compilation::Compilation;
pub use errors::CompileError;
pub use options::{CompileOptions, Phase};
pub use outline::outline;
pub use source::{SourceFile, load_sources};

/// Tokenizes every source file. The token streams borrow from `sources` and
/// each ends with an `Eof` token.
///
/// # Errors
///
/// Returns [`CompileError::PhaseFailed`] when any `LexError` was reported.
pub fn lex<'s>(
    sources: &'s [SourceFile],
    diagnostics: &mut Diagnostics,
) -> anyhow::Result<Vec<Vec<Token<'s>>>> {
    let errors_before = diagnostics.error_count();
    let streams = sources
        .iter()
        .map(|source| cinder_parser::tokenize(&source.text, &source.path, diagnostics))
        .collect::<Vec<_>>();
    debug!(
        files = streams.len(),
        tokens = streams.iter().map(Vec::len).sum::<usize>(),
        "lexed sources"
    );
    phase_result(Phase::Lex, diagnostics, errors_before)?;
    Ok(streams)
}

/// Parses every source file, in order, into one [`Program`] allocated
/// through `builder`. One module per file.
///
/// # Errors
///
/// Returns [`CompileError::PhaseFailed`] when lexing or parsing reported
/// errors.
pub fn parse<'a>(
    builder: &Builder<'a>,
    sources: &[SourceFile],
    diagnostics: &mut Diagnostics,
) -> anyhow::Result<&'a Program<'a>> {
    let errors_before = diagnostics.error_count();
    let program = cinder_parser::parse_program(
        builder,
        sources.iter().map(SourceFile::as_pair),
        diagnostics,
    );
    phase_result(Phase::Parse, diagnostics, errors_before)?;
    Ok(program)
}

/// Type-checks `program`. `builder` must be the one the program was parsed with.
///
/// # Errors
///
/// Returns [`CompileError::PhaseFailed`] when the checker reported errors.
/// Warnings alone do not fail this phase.
pub fn type_check<'a>(
    builder: &Builder<'a>,
    program: &'a Program<'a>,
    diagnostics: &mut Diagnostics,
) -> anyhow::Result<TypedContext<'a>> {
    let checked = TypeCheckerBuilder::build_typed_context(builder, program, diagnostics)
        .map_err(|err| match err.downcast::<TypeCheckFailed>() {
            Ok(failed) => CompileError::PhaseFailed {
                phase: Phase::Check,
                errors: failed.errors,
            }
            .into(),
            Err(other) => other,
        })?;
    let typed_context = checked.typed_context();
    info!(
        modules = program.modules.len(),
        typed_expressions = typed_context.typed_expression_count(),
        "type check complete"
    );
    Ok(typed_context)
}

/// Runs `generator` over a checked program.
///
/// # Errors
///
/// Returns [`CompileError::Backend`] wrapping the backend's own error.
pub fn codegen<'a, G: CodeGenerator>(
    generator: &mut G,
    builder: &Builder<'a>,
    program: &'a Program<'a>,
    typed_context: &TypedContext<'a>,
) -> anyhow::Result<G::Output> {
    let output = generator
        .generate(builder, program, typed_context)
        .map_err(|err| CompileError::Backend(err.into()))?;
    debug!("code generation complete");
    Ok(output)
}

fn phase_result(
    phase: Phase,
    diagnostics: &Diagnostics,
    errors_before: usize,
) -> Result<(), CompileError> {
    let errors = diagnostics.error_count().saturating_sub(errors_before);
    if errors > 0 {
        debug!(%phase, errors, "phase failed");
        return Err(CompileError::PhaseFailed { phase, errors });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_ast::Arena;
    use cinder_ast::diagnostics::DiagnosticKind;
    use cinder_parser::TokenKind;

    #[test]
    fn lex_borrows_from_sources() {
        let sources = [SourceFile::new("main.cnd", "let x = 1;")];
        let mut diagnostics = Diagnostics::new();
        let streams = lex(&sources, &mut diagnostics).unwrap();
        let kinds: Vec<_> = streams[0].iter().map(|token| token.kind).collect();
        assert_eq!(kinds.first(), Some(&TokenKind::Let));
        assert_eq!(kinds.last(), Some(&TokenKind::Eof));
        assert_eq!(streams[0][1].text, "x");
    }

    #[test]
    fn lex_errors_fail_the_phase() {
        let sources = [SourceFile::new("main.cnd", "let s = \"open;")];
        let mut diagnostics = Diagnostics::new();
        let err = lex(&sources, &mut diagnostics).unwrap_err();
        assert_eq!(err.to_string(), "lexing failed: 1 error(s) emitted");
        assert_eq!(diagnostics.of_kind(DiagnosticKind::LexError).count(), 1);
    }

    #[test_log::test]
    fn phases_chain() {
        let sources = [
            SourceFile::new(
                "shapes.cnd",
                "@module shapes; pub fn area(side: int) -> int { return side * side; }",
            ),
            SourceFile::new(
                "main.cnd",
                "@use shapes as s;\nfn main() -> int { let a = s.area(3); return a; }",
            ),
        ];
        let arena = Arena::new();
        let builder = Builder::new(&arena);
        let mut diagnostics = Diagnostics::new();
        let program = parse(&builder, &sources, &mut diagnostics).unwrap();
        assert_eq!(program.modules.len(), 2);
        let typed_context = type_check(&builder, program, &mut diagnostics);
        assert!(typed_context.is_ok(), "{}", diagnostics.render());
    }

    #[test]
    fn phase_errors_count_only_new_diagnostics() {
        let sources = [SourceFile::new("main.cnd", "fn main() -> int { return 1 + true; }")];
        let arena = Arena::new();
        let builder = Builder::new(&arena);
        let mut diagnostics = Diagnostics::new();
        let program = parse(&builder, &sources, &mut diagnostics).unwrap();
        let err = type_check(&builder, program, &mut diagnostics).unwrap_err();
        assert_eq!(err.to_string(), "type checking failed: 1 error(s) emitted");
    }
}
