pub mod ast_utils;
pub mod ast_walker;
pub mod references;
pub mod ruby_parser;

pub use ast_walker::{DeclRefWalker, TraversalError};
pub use references::*;
pub use ruby_parser::RubyParser;

#[cfg(test)]
mod tests;
