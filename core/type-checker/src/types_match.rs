//! Structural type compatibility.

use cinder_ast::nodes::{BasicType, TypeKind, TypeNode};

/// Outcome of comparing two types, ordered from worst to best.
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub enum TypeMatch {
    None,
    /// Different but interchangeable (`int` and `float`).
    Compatible,
    Exact,
}

impl TypeMatch {
    #[must_use]
    pub fn is_match(self) -> bool {
        self != TypeMatch::None
    }
}

/// Compares `a` and `b` structurally. Compound types are as good as their
/// weakest component.
#[must_use]
pub fn types_match(a: &TypeNode<'_>, b: &TypeNode<'_>) -> TypeMatch {
    if std::ptr::eq(a, b) {
        return TypeMatch::Exact;
    }
    match (&a.kind, &b.kind) {
        (TypeKind::Basic(left), TypeKind::Basic(right)) => basic_match(*left, *right),
        (TypeKind::Pointer(left), TypeKind::Pointer(right)) => types_match(left, right),
        (
            TypeKind::Array {
                element: left,
                length: left_len,
            },
            TypeKind::Array {
                element: right,
                length: right_len,
            },
        ) => {
            if let (Some(l), Some(r)) = (left_len, right_len)
                && l != r
            {
                return TypeMatch::None;
            }
            types_match(left, right)
        }
        (
            TypeKind::Function {
                params: left_params,
                return_type: left_ret,
            },
            TypeKind::Function {
                params: right_params,
                return_type: right_ret,
            },
        ) => {
            if left_params.len() != right_params.len() {
                return TypeMatch::None;
            }
            left_params
                .iter()
                .zip(right_params.iter())
                .map(|(l, r)| types_match(l, r))
                .fold(types_match(left_ret, right_ret), Ord::min)
        }
        (TypeKind::Named(left), TypeKind::Named(right)) if left == right => TypeMatch::Exact,
        _ => TypeMatch::None,
    }
}

fn basic_match(left: BasicType, right: BasicType) -> TypeMatch {
    match (left, right) {
        _ if left == right => TypeMatch::Exact,
        (BasicType::Int, BasicType::Float) | (BasicType::Float, BasicType::Int) => {
            TypeMatch::Compatible
        }
        _ => TypeMatch::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_ast::nodes::Position;
    use cinder_ast::{Arena, Builder};

    #[test]
    fn basic_types() {
        let arena = Arena::new();
        let b = Builder::new(&arena);
        let p = Position::default();
        let int = b.basic_type(p, BasicType::Int);
        let int2 = b.basic_type(p, BasicType::Int);
        let float = b.basic_type(p, BasicType::Float);
        let double = b.basic_type(p, BasicType::Double);
        let string = b.basic_type(p, BasicType::String);

        assert_eq!(types_match(int, int), TypeMatch::Exact);
        assert_eq!(types_match(int, int2), TypeMatch::Exact);
        assert_eq!(types_match(int, float), TypeMatch::Compatible);
        assert_eq!(types_match(float, int), TypeMatch::Compatible);
        assert_eq!(types_match(int, double), TypeMatch::None);
        assert_eq!(types_match(string, int), TypeMatch::None);
    }

    #[test]
    fn pointers_and_arrays_recurse() {
        let arena = Arena::new();
        let b = Builder::new(&arena);
        let p = Position::default();
        let int = b.basic_type(p, BasicType::Int);
        let float = b.basic_type(p, BasicType::Float);
        let bool_ = b.basic_type(p, BasicType::Bool);

        assert_eq!(
            types_match(b.pointer_type(p, int), b.pointer_type(p, int)),
            TypeMatch::Exact
        );
        assert_eq!(
            types_match(b.pointer_type(p, int), b.pointer_type(p, float)),
            TypeMatch::Compatible
        );
        assert_eq!(
            types_match(b.pointer_type(p, int), b.pointer_type(p, bool_)),
            TypeMatch::None
        );
        assert_eq!(types_match(b.pointer_type(p, int), int), TypeMatch::None);

        let fixed3 = b.array_type(p, int, Some(3));
        let fixed4 = b.array_type(p, int, Some(4));
        let open = b.array_type(p, int, None);
        assert_eq!(types_match(fixed3, fixed4), TypeMatch::None);
        assert_eq!(types_match(fixed3, open), TypeMatch::Exact);
        assert_eq!(
            types_match(fixed3, b.array_type(p, float, Some(3))),
            TypeMatch::Compatible
        );
    }

    #[test]
    fn function_types_take_the_weakest_component() {
        let arena = Arena::new();
        let b = Builder::new(&arena);
        let p = Position::default();
        let int = b.basic_type(p, BasicType::Int);
        let float = b.basic_type(p, BasicType::Float);
        let string = b.basic_type(p, BasicType::String);

        let f = b.function_type(p, b.list([int, int]), int);
        let g = b.function_type(p, b.list([int, float]), int);
        let h = b.function_type(p, b.list([int]), int);
        let k = b.function_type(p, b.list([int, int]), string);

        assert_eq!(types_match(f, f), TypeMatch::Exact);
        assert_eq!(types_match(f, g), TypeMatch::Compatible);
        assert_eq!(types_match(f, h), TypeMatch::None);
        assert_eq!(types_match(f, k), TypeMatch::None);
    }

    #[test]
    fn named_types_compare_by_name() {
        let arena = Arena::new();
        let b = Builder::new(&arena);
        let p = Position::default();
        assert_eq!(
            types_match(b.named_type(p, "Point"), b.named_type(p, "Point")),
            TypeMatch::Exact
        );
        assert_eq!(
            types_match(b.named_type(p, "Point"), b.named_type(p, "Color")),
            TypeMatch::None
        );
        assert!(!TypeMatch::None.is_match());
        assert!(TypeMatch::Compatible.is_match());
    }
}
