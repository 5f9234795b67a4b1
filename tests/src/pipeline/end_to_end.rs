//! Source files on disk through every phase to a code generator.

use cinder::{CodeGenerator, Compilation, CompileError, CompileOptions, Phase, SourceFile, load_sources};
use cinder_ast::Builder;
use cinder_ast::nodes::{BasicType, Program};
use cinder_type_checker::typed_context::TypedContext;

use crate::utils::cnd_file;

/// Backend that lists every function with the type of its return statement
/// values, enough to prove the typed context reaches code generation.
#[derive(Default)]
struct Signatures {
    runs: usize,
}

impl CodeGenerator for Signatures {
    type Output = Vec<String>;

    fn generate<'a>(
        &mut self,
        _builder: &Builder<'a>,
        _program: &'a Program<'a>,
        typed_context: &TypedContext<'a>,
    ) -> anyhow::Result<Vec<String>> {
        self.runs += 1;
        Ok(typed_context
            .functions()
            .map(|(module, function)| format!("{}.{}", module.name.name, function.name.name))
            .collect())
    }
}

fn example_sources() -> anyhow::Result<Vec<SourceFile>> {
    load_sources(&[cnd_file("main.cnd"), cnd_file("math.cnd")])
}

#[test_log::test]
fn example_program_compiles() -> anyhow::Result<()> {
    let sources = example_sources()?;
    let options = CompileOptions::default();
    let arena = options.arena();
    let mut compilation = Compilation::new(&arena, options);
    compilation.run(&sources)?;

    assert!(compilation.diagnostics().is_empty());
    let mut backend = Signatures::default();
    let functions = compilation.codegen(&mut backend)?;
    assert_eq!(backend.runs, 1);
    assert_eq!(
        functions,
        ["main.area", "main.main", "math.square", "math.clamp", "math.bounded"]
    );
    Ok(())
}

#[test]
fn typed_context_covers_the_example_program() -> anyhow::Result<()> {
    let sources = example_sources()?;
    let options = CompileOptions::default();
    let arena = options.arena();
    let mut compilation = Compilation::new(&arena, options);
    compilation.run(&sources)?;

    let context = compilation
        .typed_context()
        .ok_or_else(|| anyhow::anyhow!("no typed context after a clean run"))?;
    let (module, main) = context
        .entry_point()
        .ok_or_else(|| anyhow::anyhow!("no entry point"))?;
    assert_eq!(module.path, cnd_file("main.cnd").to_string_lossy());
    assert!(main.return_type.is_some_and(|ty| ty.is_basic(BasicType::Int)));

    let math = context
        .module_scope("math")
        .ok_or_else(|| anyhow::anyhow!("math was not registered"))?;
    let pi = context
        .scope_lookup(math, "PI")
        .ok_or_else(|| anyhow::anyhow!("PI is missing"))?;
    assert!(pi.is_public);
    assert!(!pi.is_mutable);
    assert!(!context.scope_lookup(math, "clamp").is_some_and(|clamp| clamp.is_public));
    Ok(())
}

#[test]
fn type_errors_never_reach_the_backend() -> anyhow::Result<()> {
    let sources = load_sources(&[cnd_file("type_errors.cnd")])?;
    let options = CompileOptions::default();
    let arena = options.arena();
    let mut compilation = Compilation::new(&arena, options);

    let err = compilation
        .run(&sources)
        .expect_err("type errors must fail the run");
    assert!(matches!(
        err.downcast_ref::<CompileError>(),
        Some(CompileError::PhaseFailed {
            phase: Phase::Check,
            errors: 3
        })
    ));

    let mut backend = Signatures::default();
    assert!(compilation.codegen(&mut backend).is_err());
    assert_eq!(backend.runs, 0);
    Ok(())
}

#[test]
fn syntax_errors_stop_before_checking() -> anyhow::Result<()> {
    let sources = load_sources(&[cnd_file("syntax_error.cnd")])?;
    let options = CompileOptions::default();
    let arena = options.arena();
    let mut compilation = Compilation::new(&arena, options);

    let err = compilation.run(&sources).expect_err("syntax errors must fail the run");
    assert!(err.to_string().starts_with("parsing failed"));
    assert!(compilation.program().is_some());
    assert!(compilation.typed_context().is_none());
    Ok(())
}

#[test]
fn stopping_after_parse_skips_the_checker() -> anyhow::Result<()> {
    let sources = load_sources(&[cnd_file("type_errors.cnd")])?;
    let options = CompileOptions::default().stop_after(Phase::Parse);
    let arena = options.arena();
    let mut compilation = Compilation::new(&arena, options);

    compilation.run(&sources)?;
    let program = compilation
        .program()
        .ok_or_else(|| anyhow::anyhow!("parse produced no program"))?;
    assert_eq!(program.modules().count(), 1);
    assert!(compilation.diagnostics().is_empty());
    Ok(())
}

#[test]
fn missing_files_are_io_errors() {
    let err = load_sources(&[cnd_file("does_not_exist.cnd")]).expect_err("file is missing");
    assert!(matches!(
        err.downcast_ref::<CompileError>(),
        Some(CompileError::SourceIo { .. })
    ));
}
