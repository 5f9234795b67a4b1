//! Cross-crate tests of the Cinder front end: arena and builder, parser,
//! type checker and the full pipeline over `test_data/`.

#[cfg(test)]
mod ast;
#[cfg(test)]
mod parser;
#[cfg(test)]
mod pipeline;
#[cfg(test)]
mod type_checker;
#[cfg(test)]
pub(crate) mod utils;
