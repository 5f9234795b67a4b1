//! Arena behavior under real parser workloads.

use cinder_ast::{Arena, Builder, Diagnostics};
use cinder_parser::parse_program;

fn numbered_functions(count: usize) -> String {
    (0..count)
        .map(|i| format!("fn f{i}(x: int) -> int {{ return x + {i}; }}\n"))
        .collect()
}

#[test]
fn program_survives_block_growth() {
    let arena = Arena::with_max_block_size(256);
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let source = numbered_functions(200);
    let before = arena.allocated_bytes();
    let program = parse_program(&builder, [("many.cnd", source.as_str())], &mut diagnostics);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.render());
    assert!(arena.allocated_bytes() > before);

    let module = program.modules[0];
    assert_eq!(module.items.len(), 200);
    for (i, item) in module.items.iter().enumerate() {
        let function = item.as_function().unwrap();
        assert_eq!(function.name.name, format!("f{i}"));
    }
}

#[test]
fn large_string_literal_uses_the_large_region() {
    let arena = Arena::with_max_block_size(1024);
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let text = "x".repeat(4096);
    let source = format!("const BANNER: string = \"{text}\";");
    let program = parse_program(&builder, [("banner.cnd", source.as_str())], &mut diagnostics);
    assert!(!diagnostics.has_errors());
    assert!(arena.large_allocation_count() >= 1);
    assert_eq!(program.modules[0].source.len(), source.len());
}

#[test]
fn reset_allows_an_independent_run() {
    let mut arena = Arena::new();
    {
        let builder = Builder::new(&arena);
        let mut diagnostics = Diagnostics::new();
        let source = numbered_functions(20);
        parse_program(&builder, [("a.cnd", source.as_str())], &mut diagnostics);
        assert!(builder.node_count() > 0);
    }
    arena.reset();
    assert_eq!(arena.large_allocation_count(), 0);

    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = parse_program(&builder, [("b.cnd", "let y = 2;")], &mut diagnostics);
    assert_eq!(program.modules[0].items.len(), 1);
    assert_eq!(program.modules[0].name.name, "b");
}

#[test]
fn arena_vec_keeps_values_across_growth() {
    let arena = Arena::new();
    let mut values = arena.vec();
    for i in 0..1000_u32 {
        values.push(i * 3);
    }
    assert_eq!(values.len(), 1000);
    assert!(values.iter().enumerate().all(|(i, v)| *v == u32::try_from(i).unwrap() * 3));
}
