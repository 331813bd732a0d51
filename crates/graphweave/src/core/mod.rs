//! Core abstractions for graph parsing
//!
//! Format-agnostic building blocks: the graph representation every parser
//! writes into, the parser/detector traits, the shared delimiter scanner, and
//! the error, configuration and logging plumbing.

pub mod chumsky_utils;
mod config;
mod detector;
mod error;
mod graph;
pub mod logging;
mod parser;
pub mod scanner;
mod types;

pub use config::*;
pub use detector::*;
pub use error::*;
pub use graph::*;
pub use logging::*;
pub use parser::*;
pub use types::*;
