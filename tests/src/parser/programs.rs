//! Parsing the sample programs under `test_data/cnd`.

use cinder_ast::nodes::{LoopKind, StmtKind, TypeKind};
use cinder_ast::{Arena, Builder, Diagnostics};
use cinder_parser::{TokenKind, parse_program, tokenize};

use crate::utils::cnd_file;

fn read(name: &str) -> String {
    std::fs::read_to_string(cnd_file(name)).unwrap()
}

#[test]
fn sample_program_parses_cleanly() {
    let main = read("main.cnd");
    let math = read("math.cnd");
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = parse_program(
        &builder,
        [("main.cnd", main.as_str()), ("math.cnd", math.as_str())],
        &mut diagnostics,
    );
    assert!(diagnostics.is_empty(), "{}", diagnostics.render());

    let names: Vec<_> = program.modules().map(|m| m.name.name).collect();
    assert_eq!(names, ["main", "math"]);
    assert!(!program.modules[0].explicit_name);
    assert!(program.modules[1].explicit_name);

    let main_module = program.modules[0];
    let StmtKind::Use(directive) = &main_module.items[0].kind else {
        panic!("expected the import first");
    };
    assert_eq!(directive.module.name, "math");
    assert_eq!(directive.binding().name, "m");

    let point = main_module.items[1].as_struct().unwrap();
    assert_eq!(point.fields.len(), 2);
    let color = main_module.items[2].as_enum().unwrap();
    assert!(color.has_variant("Blue"));

    let main_fn = main_module.items[4].as_function().unwrap();
    assert_eq!(main_fn.name.name, "main");
    let StmtKind::VarDecl(pointer) = &main_fn.body.statements[1].kind else {
        panic!("expected `let p`");
    };
    let TypeKind::Pointer(pointee) = pointer.ty.unwrap().kind else {
        panic!("expected a pointer type");
    };
    assert_eq!(pointee.as_named(), Some("Point"));
    let has_for_loop = main_fn.body.statements.iter().any(|stmt| {
        matches!(
            &stmt.kind,
            StmtKind::Loop(loop_stmt) if matches!(loop_stmt.kind, LoopKind::For { .. })
        )
    });
    assert!(has_for_loop);
}

#[test]
fn positions_are_one_based_lines_and_columns() {
    let source = "fn main() -> int {\n    let answer = 42;\n    return answer;\n}\n";
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = parse_program(&builder, [("pos.cnd", source)], &mut diagnostics);
    let function = program.modules[0].items[0].as_function().unwrap();
    assert_eq!((function.name.position.line, function.name.position.column), (1, 4));
    let decl = function.body.statements[0];
    assert_eq!((decl.position.line, decl.position.column), (2, 5));
    let StmtKind::Return(Some(value)) = &function.body.statements[1].kind else {
        panic!("expected a return");
    };
    assert_eq!((value.position.line, value.position.column), (3, 12));
}

#[test]
fn comments_are_invisible_to_the_token_stream() {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize("x::comment\ny ::* block\n spanning *:: z", "c.cnd", &mut diagnostics);
    let idents: Vec<_> = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Ident)
        .map(|token| (token.text, token.line))
        .collect();
    assert_eq!(idents, [("x", 1), ("y", 2), ("z", 3)]);
    assert!(!diagnostics.has_errors());
}
