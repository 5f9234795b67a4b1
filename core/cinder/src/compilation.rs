use cinder_ast::nodes::Program;
use cinder_ast::{Arena, Builder, Diagnostics};
use cinder_type_checker::typed_context::TypedContext;

use crate::codegen::CodeGenerator;
use crate::errors::CompileError;
use crate::options::{CompileOptions, Phase};
use crate::source::SourceFile;

/// State of one compilation run over a single arena.
///
/// The caller owns the arena (see [`CompileOptions::arena`]); the compilation
/// owns the diagnostics sink and the results of each phase that has run.
pub struct Compilation<'a> {
    options: CompileOptions,
    builder: Builder<'a>,
    diagnostics: Diagnostics,
    program: Option<&'a Program<'a>>,
    typed_context: Option<TypedContext<'a>>,
}

impl<'a> Compilation<'a> {
    #[must_use]
    pub fn new(arena: &'a Arena, options: CompileOptions) -> Self {
        let diagnostics = options.diagnostics();
        Self {
            options,
            builder: Builder::new(arena),
            diagnostics,
            program: None,
            typed_context: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    #[must_use]
    pub fn builder(&self) -> &Builder<'a> {
        &self.builder
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn program(&self) -> Option<&'a Program<'a>> {
        self.program
    }

    #[must_use]
    pub fn typed_context(&self) -> Option<&TypedContext<'a>> {
        self.typed_context.as_ref()
    }

    /// Prints the collected diagnostics to stderr. Returns whether any error was recorded.
    pub fn report(&self) -> bool {
        self.diagnostics.report()
    }

    /// Runs every phase up to [`CompileOptions::stop_after`].
    ///
    /// # Errors
    ///
    /// Fails with the first phase that reported errors.
    pub fn run(&mut self, sources: &[SourceFile]) -> anyhow::Result<()> {
        if !self.options.runs(Phase::Parse) {
            crate::lex(sources, &mut self.diagnostics)?;
            return Ok(());
        }
        self.parse(sources)?;
        if self.options.runs(Phase::Check) {
            self.check()?;
        }
        Ok(())
    }

    /// Parses `sources` into one program.
    ///
    /// # Errors
    ///
    /// Fails when lexing or parsing reported errors. The partial program is
    /// still available through [`Compilation::program`].
    pub fn parse(&mut self, sources: &[SourceFile]) -> anyhow::Result<&'a Program<'a>> {
        let errors_before = self.diagnostics.error_count();
        let program = cinder_parser::parse_program(
            &self.builder,
            sources.iter().map(SourceFile::as_pair),
            &mut self.diagnostics,
        );
        self.program = Some(program);
        self.typed_context = None;
        crate::phase_result(Phase::Parse, &self.diagnostics, errors_before)?;
        Ok(program)
    }

    /// Type-checks the parsed program.
    ///
    /// # Errors
    ///
    /// Fails when nothing was parsed yet, when the checker reported errors,
    /// or when warnings are denied and at least one was reported.
    pub fn check(&mut self) -> anyhow::Result<&TypedContext<'a>> {
        let Some(program) = self.program else {
            anyhow::bail!("cannot type-check before parsing");
        };
        let typed_context = crate::type_check(&self.builder, program, &mut self.diagnostics)?;
        if self.options.warnings_as_errors && self.diagnostics.warning_count() > 0 {
            return Err(CompileError::DeniedWarnings {
                warnings: self.diagnostics.warning_count(),
            }
            .into());
        }
        Ok(self.typed_context.insert(typed_context))
    }

    /// Hands the checked program to `generator`.
    ///
    /// # Errors
    ///
    /// Fails without calling the backend unless [`Compilation::check`]
    /// succeeded; backend failures come back as [`CompileError::Backend`].
    pub fn codegen<G: CodeGenerator>(&self, generator: &mut G) -> anyhow::Result<G::Output> {
        let (Some(program), Some(typed_context)) = (self.program, self.typed_context.as_ref())
        else {
            anyhow::bail!("code generation requires a successfully type-checked program");
        };
        crate::codegen(generator, &self.builder, program, typed_context)
    }
}
