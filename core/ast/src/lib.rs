#![warn(clippy::pedantic)]
//! Arena, AST model and diagnostics sink of the Cinder front end.

pub mod arena;
pub mod builder;
pub mod diagnostics;
pub mod errors;
pub mod nodes;

pub use arena::{Arena, ArenaVec};
pub use builder::Builder;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use errors::AstError;
