//! Error collection across statements and files.

use cinder_ast::diagnostics::DiagnosticKind;
use cinder_ast::{Arena, Builder, Diagnostics};
use cinder_parser::parse_program;

#[test]
fn errors_in_several_files_are_all_reported() {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = parse_program(
        &builder,
        [
            ("a.cnd", "let a = ;\nlet ok_a = 1;"),
            ("b.cnd", "fn broken( { }\nfn fine() -> int { return 1; }"),
        ],
        &mut diagnostics,
    );
    let files: Vec<_> = diagnostics.iter().map(|d| d.file.as_str()).collect();
    assert!(files.contains(&"a.cnd"));
    assert!(files.contains(&"b.cnd"));
    assert!(
        diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::SyntaxError)
    );

    let a_names: Vec<_> = program.modules[0]
        .items
        .iter()
        .filter_map(|item| item.declared_name())
        .map(|name| name.name)
        .collect();
    assert!(a_names.contains(&"ok_a"));
    let b_names: Vec<_> = program.modules[1]
        .items
        .iter()
        .filter_map(|item| item.declared_name())
        .map(|name| name.name)
        .collect();
    assert!(b_names.contains(&"fine"));
}

#[test]
fn lex_errors_flow_into_the_same_sink() {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    parse_program(
        &builder,
        [("a.cnd", "@include other;\nlet s = \"never closed;")],
        &mut diagnostics,
    );
    let lex_errors: Vec<_> = diagnostics
        .of_kind(DiagnosticKind::LexError)
        .map(|d| d.message.as_str())
        .collect();
    assert!(lex_errors.iter().any(|m| m.contains("unknown directive")));
    assert!(lex_errors.contains(&"unterminated string literal"));
}

#[test]
fn capped_sink_still_counts_every_error() {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::with_capacity(2);
    let source = "let a = ;\nlet b = ;\nlet c = ;\nlet d = ;\n";
    parse_program(&builder, [("a.cnd", source)], &mut diagnostics);
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.error_count() >= 4);
    assert_eq!(diagnostics.dropped(), diagnostics.error_count() - 2);
}
