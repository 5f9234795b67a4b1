#![warn(clippy::pedantic)]
//! Type Checker for the Cinder language
//!
//! Scope-based static checking of a parsed [`Program`]:
//!
//! - Scopes form a tree (global → module → function → block/loop) with
//!   lexical shadowing and one declaration per name per scope
//! - Modules are isolated namespaces joined by `@use module as alias;`;
//!   `alias.symbol` sees only `pub` symbols from outside the module
//! - Types are compared structurally ([`types_match`]); `int` and `float`
//!   are interchangeable, `null` fits any pointer
//! - Functions must declare a return type and return on every path;
//!   `main` must return `int`
//!
//! Every error goes to the shared [`Diagnostics`] sink as a `TypeError`
//! (see [`errors::TypeCheckError`]); checking carries on after an error so a
//! single run reports as much as possible.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cinder_type_checker::TypeCheckerBuilder;
//!
//! let typed_context =
//!     TypeCheckerBuilder::build_typed_context(&builder, program, &mut diagnostics)?
//!         .typed_context();
//!
//! for (module, function) in typed_context.functions() {
//!     println!("{}: {}", module.name.name, function.name.name);
//! }
//! ```
//!
//! ## Phases
//!
//! 1. **Register modules** - one scope per module, `__module_<name>` in the global scope
//! 2. **Collect declarations** - structs and enums, then function signatures
//! 3. **Check items** - imports and globals, then function bodies

use cinder_ast::Builder;
use cinder_ast::diagnostics::Diagnostics;
use cinder_ast::nodes::Program;

use crate::errors::TypeCheckFailed;
use crate::type_checker::TypeChecker;
use crate::typed_context::TypedContext;

pub mod errors;
pub mod symbol_table;
mod type_checker;
pub mod typed_context;
pub mod types_match;

pub use types_match::{TypeMatch, types_match};

/// State of a builder that has not run the checker yet.
pub struct TypeCheckerInitState;

/// State of a builder holding the context of a successful check.
pub struct TypeCheckerCompleteState<'a> {
    typed_context: TypedContext<'a>,
}

/// Type alias for a completed type checker builder ready to yield its context.
pub type CompletedTypeCheckerBuilder<'a> = TypeCheckerBuilder<TypeCheckerCompleteState<'a>>;

/// Builder for running type checking on a parsed program.
///
/// Uses the typestate pattern to ensure type checking completes before
/// accessing the typed context.
pub struct TypeCheckerBuilder<S> {
    state: S,
}

impl Default for TypeCheckerBuilder<TypeCheckerInitState> {
    fn default() -> Self {
        TypeCheckerBuilder::new()
    }
}

impl TypeCheckerBuilder<TypeCheckerInitState> {
    #[must_use]
    pub fn new() -> Self {
        TypeCheckerBuilder {
            state: TypeCheckerInitState,
        }
    }

    /// Type-checks `program`, reporting into `diagnostics`. Synthesized type
    /// nodes are allocated through `builder`, which must be the builder the
    /// program was parsed with so node ids stay unique.
    ///
    /// # Errors
    ///
    /// Returns [`TypeCheckFailed`] (wrapped in `anyhow`) when at least one
    /// type error was reported; the errors themselves are in `diagnostics`.
    /// Warnings alone do not fail the check.
    #[must_use = "returns builder with typed context, extract with .typed_context()"]
    pub fn build_typed_context<'a>(
        builder: &Builder<'a>,
        program: &'a Program<'a>,
        diagnostics: &mut Diagnostics,
    ) -> anyhow::Result<CompletedTypeCheckerBuilder<'a>> {
        let outcome = TypeChecker::new(builder, diagnostics).check(program);
        if outcome.errors > 0 {
            return Err(TypeCheckFailed {
                errors: outcome.errors,
            }
            .into());
        }
        if outcome.warnings > 0 {
            tracing::debug!(warnings = outcome.warnings, "type check passed with warnings");
        }
        let typed_context = TypedContext::new(
            program,
            outcome.symbol_table,
            outcome.expr_types,
            outcome.module_scopes,
        );
        Ok(TypeCheckerBuilder {
            state: TypeCheckerCompleteState { typed_context },
        })
    }
}

impl<'a> TypeCheckerBuilder<TypeCheckerCompleteState<'a>> {
    /// Consume the builder and return the typed context.
    #[must_use = "consumes builder and returns the typed context"]
    pub fn typed_context(self) -> TypedContext<'a> {
        self.state.typed_context
    }
}
