//! Graphviz DOT plugin
//!
//! Tokenizer, recursive descent grammar, attribute remap tables and the
//! record label autosplit.

mod detector;
mod lexer;
mod parser;
mod record;
mod remap;

pub use detector::*;
pub use parser::*;
pub use remap::VENDOR_PREFIX;
