//! Module isolation, imports and visibility.

use crate::utils::{assert_clean, check_sources, with_typed_context};

const GEOMETRY: &str = "\
@module geometry;
pub enum Axis { X, Y }
pub fn scale(v: int) -> int { return v * factor(); }
fn factor() -> int { return 2; }
";

#[test]
fn public_symbols_resolve_through_an_alias() {
    assert_clean(&[
        ("geometry.cnd", GEOMETRY),
        (
            "main.cnd",
            "@use geometry as g;\nfn main() -> int { let axis = g.Axis.Y; return g.scale(3); }",
        ),
    ]);
}

#[test]
fn import_without_alias_binds_the_module_name() {
    assert_clean(&[
        ("geometry.cnd", GEOMETRY),
        (
            "main.cnd",
            "@use geometry;\nfn main() -> int { return geometry.scale(1); }",
        ),
    ]);
}

#[test]
fn private_symbols_are_hidden_from_importers() {
    let report = check_sources(&[
        ("geometry.cnd", GEOMETRY),
        (
            "main.cnd",
            "@use geometry as g;\nfn main() -> int { return g.factor(); }",
        ),
    ]);
    assert_eq!(report.errors, ["`factor` is private to module `geometry`"]);
}

#[test]
fn private_types_are_hidden_from_other_modules() {
    let shapes = "@module shapes;\npriv struct Secret { x: int; }\npub struct Corner { x: int, y: int }";
    let report = check_sources(&[
        ("shapes.cnd", shapes),
        (
            "main.cnd",
            "fn main() -> int { let s: Secret; return s.x; }",
        ),
    ]);
    assert!(report.has_error("unknown type `Secret`"), "{report:#?}");

    let report = check_sources(&[
        ("shapes.cnd", shapes),
        (
            "main.cnd",
            "@use shapes;\nfn main() -> int { let s: Secret; return 0; }",
        ),
    ]);
    assert_eq!(report.errors, ["`Secret` is private to module `shapes`"]);
}

#[test]
fn public_types_are_nameable_after_an_import() {
    let shapes = "@module shapes;\npub struct Corner { x: int, y: int }\n\
                  pub fn origin() -> Corner { let c: Corner; c.x = 0; c.y = 0; return c; }";
    assert_clean(&[
        ("shapes.cnd", shapes),
        (
            "main.cnd",
            "@use shapes as s;\nfn main() -> int { let c: Corner = s.origin(); return c.x + c.y; }",
        ),
    ]);
    let report = check_sources(&[
        ("shapes.cnd", shapes),
        ("main.cnd", "fn main() -> int { let c: Corner; return 0; }"),
    ]);
    assert_eq!(report.errors, ["unknown type `Corner`"]);
}

#[test]
fn globals_read_imported_constants_in_either_file_order() {
    let main = "@use limits as l;\nlet doubled: int = l.MAX * 2;\nfn main() -> int { return doubled; }";
    let limits = "@module limits;\npub const MAX: int = 50;";
    assert_clean(&[("main.cnd", main), ("limits.cnd", limits)]);
    assert_clean(&[("limits.cnd", limits), ("main.cnd", main)]);
}

#[test]
fn private_symbols_stay_visible_inside_their_module() {
    with_typed_context(&[("geometry.cnd", GEOMETRY)], |context| {
        let scope = context.module_scope("geometry").unwrap();
        let table = context.symbol_table();
        let factor = table.lookup_current_only(scope, "factor").unwrap();
        assert!(!factor.is_public);
        assert!(table.lookup_current_only(scope, "scale").unwrap().is_public);
    });
}

#[test]
fn unknown_module_and_member_are_reported() {
    let report = check_sources(&[
        ("geometry.cnd", GEOMETRY),
        (
            "main.cnd",
            "@use nowhere;\n@use geometry as g;\nfn main() -> int { return g.rotate(1); }",
        ),
    ]);
    assert_eq!(
        report.errors,
        [
            "unknown module `nowhere`",
            "module `geometry` has no symbol `rotate`",
        ]
    );
}

#[test]
fn unqualified_names_do_not_cross_modules() {
    let report = check_sources(&[
        ("geometry.cnd", GEOMETRY),
        (
            "main.cnd",
            "@use geometry as g;\nfn main() -> int { return scale(3); }",
        ),
    ]);
    assert_eq!(report.errors, ["use of undeclared identifier `scale`"]);
}

#[test]
fn file_order_does_not_matter() {
    assert_clean(&[
        (
            "main.cnd",
            "@use geometry as g;\nfn main() -> int { return g.scale(3); }",
        ),
        ("geometry.cnd", GEOMETRY),
    ]);
}

#[test]
fn files_declaring_the_same_module_share_a_scope() {
    with_typed_context(
        &[
            ("part1.cnd", "@module shared; pub fn one() -> int { return two() - 1; }"),
            ("part2.cnd", "@module shared; pub fn two() -> int { return 2; }"),
            ("main.cnd", "@use shared;\nfn main() -> int { return shared.one(); }"),
        ],
        |context| {
            let shared = context.module_scope("shared").unwrap();
            assert!(context.scope_lookup(shared, "one").is_some());
            assert!(context.scope_lookup(shared, "two").is_some());
            let modules: Vec<_> = context.program().modules().collect();
            assert_eq!(context.scope_of_module(modules[0]), Some(shared));
            assert_eq!(context.scope_of_module(modules[1]), Some(shared));
        },
    );
}

#[test]
fn imported_globals_are_immutable_when_const() {
    let report = check_sources(&[
        ("config.cnd", "@module config; pub const LIMIT: int = 10; pub let level = 1;"),
        (
            "main.cnd",
            "@use config as c;\nfn main() -> int { c.level = 2; c.LIMIT = 3; return 0; }",
        ),
    ]);
    assert_eq!(report.errors, ["cannot assign to immutable `c.LIMIT`"]);
}
