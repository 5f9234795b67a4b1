#![warn(clippy::pedantic)]
//! Lexer and parser of the Cinder language.
//!
//! ```no_run
//! use cinder_ast::{Arena, Builder, Diagnostics};
//!
//! let arena = Arena::new();
//! let builder = Builder::new(&arena);
//! let mut diagnostics = Diagnostics::new();
//! let module = cinder_parser::parse_module(&builder, "main.cnd", "let x = 1;", &mut diagnostics);
//! assert_eq!(module.items.len(), 1);
//! ```

pub mod lexer;
pub mod parser;
pub mod precedence;
pub mod token;

pub use lexer::{Lexer, tokenize};
pub use parser::{Parser, parse_module, parse_program};
pub use token::{Token, TokenKind};
