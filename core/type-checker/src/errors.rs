//! Error types for the type checker.
//!
//! Every failure the checker can detect is a [`TypeCheckError`] variant. The
//! messages carry no location prefix; the position travels separately and is
//! attached when the error is turned into a [`Diagnostic`] for the sink.

use std::fmt::{self, Display, Formatter};

use cinder_ast::diagnostics::Diagnostic;
use cinder_ast::nodes::{Module, Position};
use thiserror::Error;

/// Where a type mismatch was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMismatchContext {
    Assignment,
    Initializer { name: String },
    Return,
    Condition,
    Argument { function: String, index: usize },
    ArrayElement { index: usize },
    Index,
    TernaryBranches,
}

impl Display for TypeMismatchContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeMismatchContext::Assignment => write!(f, "in assignment"),
            TypeMismatchContext::Initializer { name } => {
                write!(f, "in initializer of `{name}`")
            }
            TypeMismatchContext::Return => write!(f, "in return statement"),
            TypeMismatchContext::Condition => write!(f, "in condition"),
            TypeMismatchContext::Argument { function, index } => {
                write!(f, "in argument {index} of `{function}`")
            }
            TypeMismatchContext::ArrayElement { index } => {
                write!(f, "in array element {index}")
            }
            TypeMismatchContext::Index => write!(f, "in array index"),
            TypeMismatchContext::TernaryBranches => write!(f, "between ternary branches"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeCheckError {
    #[error("use of undeclared identifier `{name}`")]
    UnknownIdentifier { name: String, position: Position },

    #[error("unknown type `{name}`")]
    UnknownType { name: String, position: Position },

    #[error("`{name}` is already declared in this scope")]
    DuplicateDeclaration {
        name: String,
        previous: Position,
        position: Position,
    },

    #[error("type mismatch {context}: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        context: TypeMismatchContext,
        position: Position,
    },

    #[error("operator `{operator}` cannot be applied to `{left}` and `{right}`")]
    InvalidBinaryOperands {
        operator: &'static str,
        left: String,
        right: String,
        expected: &'static str,
        position: Position,
    },

    #[error("operator `{operator}` cannot be applied to `{operand}`")]
    InvalidUnaryOperand {
        operator: &'static str,
        operand: String,
        expected: &'static str,
        position: Position,
    },

    #[error("function `{name}` expects {expected} argument(s), but {found} were provided")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        position: Position,
    },

    #[error("`{found}` is not a function")]
    NotCallable { found: String, position: Position },

    #[error("cannot assign to immutable `{name}`")]
    AssignToImmutable { name: String, position: Position },

    #[error("expression is not assignable")]
    InvalidAssignmentTarget { position: Position },

    #[error("function `{name}` is missing a return type")]
    MissingReturnType { name: String, position: Position },

    #[error("function `{name}` must return a value of type `{expected}` on every path")]
    MissingReturn {
        name: String,
        expected: String,
        position: Position,
    },

    #[error("`return` outside of a function")]
    ReturnOutsideFunction { position: Position },

    #[error("`main` must return `int`, found `{found}`")]
    InvalidMain { found: String, position: Position },

    #[error("parameter {index} of `{function}` needs a name and a type")]
    IncompleteParameter {
        function: String,
        index: usize,
        position: Position,
    },

    #[error("`{keyword}` outside of a loop")]
    OutsideLoop {
        keyword: &'static str,
        position: Position,
    },

    #[error("unknown module `{name}`")]
    UnknownModule { name: String, position: Position },

    #[error("`{name}` is private to module `{module}`")]
    PrivateAccess {
        module: String,
        name: String,
        position: Position,
    },

    #[error("module `{module}` has no symbol `{name}`")]
    UnknownModuleMember {
        module: String,
        name: String,
        position: Position,
    },

    #[error("struct `{struct_name}` has no field `{field}`")]
    FieldNotFound {
        struct_name: String,
        field: String,
        position: Position,
    },

    #[error("enum `{enum_name}` has no variant `{variant}`")]
    VariantNotFound {
        enum_name: String,
        variant: String,
        position: Position,
    },

    #[error("type `{found}` has no members")]
    InvalidMemberAccess { found: String, position: Position },

    #[error("type `{found}` cannot be indexed")]
    NotIndexable { found: String, position: Position },

    #[error("`{name}` is a type, not a value")]
    TypeUsedAsValue { name: String, position: Position },

    #[error("cannot infer a type for `{name}`")]
    CannotInferType { name: String, position: Position },

    #[error("`{name}` cannot have type `void`")]
    VoidVariable { name: String, position: Position },

    #[error("cannot print a value of type `{found}`")]
    InvalidPrintArgument { found: String, position: Position },

    #[error("only declarations and '@use' directives are allowed at module level")]
    StatementAtModuleLevel { position: Position },

    #[error("`main` is declared `priv` but entry points are always public")]
    PrivateMain { position: Position },
}

impl TypeCheckError {
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            TypeCheckError::UnknownIdentifier { position, .. }
            | TypeCheckError::UnknownType { position, .. }
            | TypeCheckError::DuplicateDeclaration { position, .. }
            | TypeCheckError::TypeMismatch { position, .. }
            | TypeCheckError::InvalidBinaryOperands { position, .. }
            | TypeCheckError::InvalidUnaryOperand { position, .. }
            | TypeCheckError::ArgumentCountMismatch { position, .. }
            | TypeCheckError::NotCallable { position, .. }
            | TypeCheckError::AssignToImmutable { position, .. }
            | TypeCheckError::InvalidAssignmentTarget { position }
            | TypeCheckError::MissingReturnType { position, .. }
            | TypeCheckError::MissingReturn { position, .. }
            | TypeCheckError::ReturnOutsideFunction { position }
            | TypeCheckError::InvalidMain { position, .. }
            | TypeCheckError::IncompleteParameter { position, .. }
            | TypeCheckError::OutsideLoop { position, .. }
            | TypeCheckError::UnknownModule { position, .. }
            | TypeCheckError::PrivateAccess { position, .. }
            | TypeCheckError::UnknownModuleMember { position, .. }
            | TypeCheckError::FieldNotFound { position, .. }
            | TypeCheckError::VariantNotFound { position, .. }
            | TypeCheckError::InvalidMemberAccess { position, .. }
            | TypeCheckError::NotIndexable { position, .. }
            | TypeCheckError::TypeUsedAsValue { position, .. }
            | TypeCheckError::CannotInferType { position, .. }
            | TypeCheckError::VoidVariable { position, .. }
            | TypeCheckError::InvalidPrintArgument { position, .. }
            | TypeCheckError::StatementAtModuleLevel { position }
            | TypeCheckError::PrivateMain { position } => *position,
        }
    }

    /// Warnings are reported but do not fail the check.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, TypeCheckError::PrivateMain { .. })
    }

    /// Width of the caret underline: the offending name where there is one.
    fn span_len(&self) -> usize {
        match self {
            TypeCheckError::UnknownIdentifier { name, .. }
            | TypeCheckError::UnknownType { name, .. }
            | TypeCheckError::DuplicateDeclaration { name, .. }
            | TypeCheckError::AssignToImmutable { name, .. }
            | TypeCheckError::UnknownModule { name, .. }
            | TypeCheckError::TypeUsedAsValue { name, .. }
            | TypeCheckError::CannotInferType { name, .. }
            | TypeCheckError::VoidVariable { name, .. } => name.len(),
            TypeCheckError::PrivateAccess { module, name, .. }
            | TypeCheckError::UnknownModuleMember { module, name, .. } => {
                module.len() + name.len() + 1
            }
            TypeCheckError::OutsideLoop { keyword, .. } => keyword.len(),
            TypeCheckError::ReturnOutsideFunction { .. } => "return".len(),
            _ => 1,
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            TypeCheckError::PrivateAccess { name, .. } => {
                Some(format!("declare `{name}` with `pub` to use it from other modules"))
            }
            TypeCheckError::UnknownModule { name, .. } => {
                Some(format!("no file declares `@module {name};`"))
            }
            TypeCheckError::AssignToImmutable { .. } => {
                Some("declare it with `let` instead of `const`".to_string())
            }
            TypeCheckError::MissingReturnType { .. } => {
                Some("add `-> void` if the function returns nothing".to_string())
            }
            TypeCheckError::PrivateMain { .. } => Some("remove the `priv` modifier".to_string()),
            _ => None,
        }
    }

    /// Converts the error into a sink entry, echoing the offending source line of `module`.
    #[must_use]
    pub fn to_diagnostic(&self, module: &Module<'_>) -> Diagnostic {
        let position = self.position();
        let mut diagnostic = if self.is_warning() {
            Diagnostic::warning(module.path, self.to_string(), position)
        } else {
            Diagnostic::type_error(module.path, self.to_string(), position)
        }
        .with_length(self.span_len());
        if let Some(line) = module.source_line(position.line) {
            diagnostic = diagnostic.with_source_line(line);
        }
        if let TypeCheckError::DuplicateDeclaration { previous, .. } = self {
            diagnostic = diagnostic.with_note(format!("previous declaration at {previous}"));
        }
        if let Some(help) = self.help() {
            diagnostic = diagnostic.with_help(help);
        }
        diagnostic
    }
}

/// Returned by [`crate::TypeCheckerBuilder::build_typed_context`] when the sink
/// received at least one type error. The individual errors are in the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("type checking failed with {errors} error(s)")]
pub struct TypeCheckFailed {
    pub errors: usize,
}
