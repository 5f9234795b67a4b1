//! Operator typing and value compatibility inside function bodies.

use crate::utils::{assert_clean, check_source};

fn body(statements: &str) -> String {
    format!("fn main() -> int {{\n{statements}\nreturn 0;\n}}")
}

#[test]
fn int_and_float_convert_implicitly() {
    assert_clean(&[(
        "main.cnd",
        body("let f: float = 1; let i: int = f; let mixed = i * f + 0.5;").as_str(),
    )]);
}

#[test]
fn bool_is_not_a_number() {
    let report = check_source(&body("let b: bool = 1;"));
    assert_eq!(
        report.errors,
        ["type mismatch in initializer of `b`: expected `bool`, found `int`"]
    );
}

#[test]
fn arithmetic_needs_numbers() {
    let report = check_source(&body("let s = \"a\" + 1;"));
    assert_eq!(
        report.errors,
        ["operator `+` cannot be applied to `string` and `int`"]
    );
}

#[test]
fn logical_operators_yield_bool() {
    assert_clean(&[(
        "main.cnd",
        body("let both: bool = 1 && 0; let either: bool = both || false;").as_str(),
    )]);
}

#[test]
fn comparisons_yield_bool_and_need_matching_operands() {
    let report = check_source(&body(
        "let ok: bool = 1 < 2.5; let p: *int = null; let none: bool = p == null; let bad = 1 == \"one\";",
    ));
    assert_eq!(
        report.errors,
        ["operator `==` cannot be applied to `int` and `string`"]
    );
}

#[test]
fn structs_fields_and_pointers() {
    let source = "\
struct Point { x: int, y: int }
fn main() -> int {
    let origin: Point;
    let p: *Point = &origin;
    p.x = 4;
    origin.y = p.x * 2;
    return origin.y + (*p).x;
}
";
    assert_clean(&[("main.cnd", source)]);
}

#[test]
fn unknown_field_and_variant_are_reported() {
    let source = "\
struct Point { x: int, y: int }
enum Color { Red, Green }
fn main() -> int {
    let origin: Point;
    let z = origin.z;
    let c = Color.Purple;
    return 0;
}
";
    let report = check_source(source);
    assert_eq!(
        report.errors,
        [
            "struct `Point` has no field `z`",
            "enum `Color` has no variant `Purple`",
        ]
    );
}

#[test]
fn constants_cannot_be_assigned() {
    let report = check_source("const LIMIT: int = 3;\nfn main() -> int { LIMIT = 4; return LIMIT; }");
    assert_eq!(report.errors, ["cannot assign to immutable `LIMIT`"]);
}

#[test]
fn arrays_and_indexing() {
    assert_clean(&[(
        "main.cnd",
        body("let xs: [int; 3] = [1, 2, 3]; let first = xs[0]; let name = \"cinder\"; let c: char = name[1];").as_str(),
    )]);
    let report = check_source(&body("let xs: [int; 2] = [1, 2]; let v = xs[true];"));
    assert_eq!(
        report.errors,
        ["type mismatch in array index: expected `int`, found `bool`"]
    );
}

#[test]
fn unknown_types_are_reported() {
    let report = check_source(&body("let v: Vector;"));
    assert_eq!(report.errors, ["unknown type `Vector`"]);
}
