//! Core parser trait for graph description languages
//!
//! This trait defines the interface for parsing a complete text buffer into
//! the shared [`Graph`] representation.

use super::{Graph, ParseError};

/// Core trait for format parsers
///
/// Each input language has its own parser implementation; all of them write
/// into the same [`Graph`].
///
/// # Example
/// ```
/// use graphweave::core::{Graph, Parser};
/// use graphweave::plugins::native::NativeParser;
///
/// let parser = NativeParser::new();
/// let mut graph = Graph::new();
/// parser.parse("[ A ] -> [ B ]", &mut graph).unwrap();
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub trait Parser: Send + Sync {
    /// Parse a complete input text into the provided graph
    ///
    /// The first error aborts the parse; the graph is left in an unspecified
    /// partially filled state in that case.
    fn parse(&self, input: &str, graph: &mut Graph) -> Result<(), ParseError>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input looks like something this parser accepts
    fn can_parse(&self, input: &str) -> bool;
}
