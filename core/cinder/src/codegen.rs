//! Hand-off point to a code-generation backend.
//!
//! The front end ships no backend of its own. A backend implements
//! [`CodeGenerator`] and is driven by [`Compilation::codegen`], which only
//! calls it once type checking has succeeded.
//!
//! [`Compilation::codegen`]: crate::Compilation::codegen

use cinder_ast::Builder;
use cinder_ast::nodes::Program;
use cinder_type_checker::typed_context::TypedContext;

pub trait CodeGenerator {
    type Output;

    /// Lowers a checked program. `builder` allocates in the arena that owns
    /// `program`, for backends that want to synthesize nodes.
    ///
    /// # Errors
    ///
    /// Any backend failure; the pipeline wraps it in
    /// [`CompileError::Backend`](crate::CompileError::Backend).
    fn generate<'a>(
        &mut self,
        builder: &Builder<'a>,
        program: &'a Program<'a>,
        typed_context: &TypedContext<'a>,
    ) -> anyhow::Result<Self::Output>;
}
