use cinder_ast::diagnostics::DiagnosticKind;
use cinder_ast::{Arena, Builder, Diagnostics};
use cinder_type_checker::TypeCheckerBuilder;
use cinder_type_checker::typed_context::TypedContext;

pub(crate) fn get_test_data_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap());
    manifest_dir.join("test_data")
}

/// Path of `test_data/cnd/<name>`.
pub(crate) fn cnd_file(name: &str) -> std::path::PathBuf {
    get_test_data_path().join("cnd").join(name)
}

/// Messages of one check run, split by diagnostic kind.
#[derive(Debug, Default)]
pub(crate) struct CheckReport {
    pub(crate) syntax: Vec<String>,
    pub(crate) errors: Vec<String>,
    pub(crate) warnings: Vec<String>,
}

impl CheckReport {
    pub(crate) fn is_clean(&self) -> bool {
        self.syntax.is_empty() && self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Whether some type error contains `needle`.
    pub(crate) fn has_error(&self, needle: &str) -> bool {
        self.errors.iter().any(|message| message.contains(needle))
    }
}

fn collect(diagnostics: &Diagnostics) -> CheckReport {
    let mut report = CheckReport::default();
    for diagnostic in diagnostics {
        let bucket = match diagnostic.kind {
            DiagnosticKind::LexError | DiagnosticKind::SyntaxError => &mut report.syntax,
            DiagnosticKind::TypeError => &mut report.errors,
            DiagnosticKind::Warning => &mut report.warnings,
        };
        bucket.push(diagnostic.message.clone());
    }
    report
}

/// Parses and checks `(path, source)` pairs as one program.
pub(crate) fn check_sources(files: &[(&str, &str)]) -> CheckReport {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = cinder_parser::parse_program(&builder, files.iter().copied(), &mut diagnostics);
    if !diagnostics.has_errors() {
        let _ = TypeCheckerBuilder::build_typed_context(&builder, program, &mut diagnostics);
    }
    collect(&diagnostics)
}

pub(crate) fn check_source(source: &str) -> CheckReport {
    check_sources(&[("main.cnd", source)])
}

/// Asserts that `files` parse and check without any diagnostic.
pub(crate) fn assert_clean(files: &[(&str, &str)]) {
    let report = check_sources(files);
    assert!(report.is_clean(), "unexpected diagnostics: {report:#?}");
}

/// Runs `inspect` on the typed context of a program that must check cleanly.
pub(crate) fn with_typed_context<R>(
    files: &[(&str, &str)],
    inspect: impl FnOnce(&TypedContext<'_>) -> R,
) -> R {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = cinder_parser::parse_program(&builder, files.iter().copied(), &mut diagnostics);
    let typed_context = TypeCheckerBuilder::build_typed_context(&builder, program, &mut diagnostics)
        .unwrap_or_else(|err| panic!("{err}\n{}", diagnostics.render()))
        .typed_context();
    inspect(&typed_context)
}
