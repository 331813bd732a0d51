//! Graphweave - Parse graph description languages into one graph representation
//!
//! Three input languages are supported: a bracket/arrow diagram language
//! (`[ A ] -> [ B ]`), Graphviz DOT and GDL/VCG. Each parser writes into the
//! same [`Graph`], so layout and rendering code never needs to know which
//! language a diagram was written in.
//!
//! # Quick Start
//!
//! ```rust
//! use graphweave::parse;
//!
//! let graph = parse("[ Bonn ] -> [ Berlin ]").unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert!(graph.has_edge("Bonn", "Berlin"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use graphweave::prelude::*;
//!
//! let input = "digraph { rankdir=LR; a -> b }";
//!
//! let detector = DotDetector::new();
//! assert!(detector.detect(input));
//!
//! let parser = DotParser::with_config(ParseConfig::new().with_max_nesting(8));
//! let mut graph = Graph::new();
//! parser.parse(input, &mut graph).unwrap();
//!
//! assert_eq!(graph.flow(), Some(Flow::East));
//! ```

pub mod core;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Attributes, Detector, Edge, ElementKind, Flow, Format, Graph, GraphError, Group, GroupId,
        Node, ParseConfig, ParseError, Parser, Position, Selector,
    };
    pub use crate::plugins::{
        DotDetector, DotParser, GdlDetector, GdlParser, NativeDetector, NativeParser, Orchestrator,
    };
}

/// Parse `input`, detecting its format from the content
///
/// Text starting with `graph:` is GDL, text starting with an optional
/// `strict` and then `graph` or `digraph` is DOT, anything else is the
/// native diagram language.
///
/// # Example
/// ```rust
/// use graphweave::parse;
///
/// let graph = parse("graph: { title: \"T\" node: { title: \"a\" } }").unwrap();
/// assert_eq!(graph.attribute("label"), Some("T"));
/// ```
pub fn parse(input: &str) -> Result<Graph, GraphError> {
    plugins::Orchestrator::with_all_plugins().parse(input)
}

/// Parse `input` as the given format
///
/// # Example
/// ```rust
/// use graphweave::{parse_as, Format};
///
/// let graph = parse_as("digraph { a -> b -> c }", Format::Graphviz).unwrap();
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub fn parse_as(input: &str, format: Format) -> Result<Graph, ParseError> {
    plugins::Orchestrator::with_all_plugins().parse_as(input, format)
}

/// Detect the format of `input`
///
/// # Example
/// ```rust
/// use graphweave::{detect_format, Format};
///
/// assert_eq!(detect_format("strict graph { a -- b }"), Format::Graphviz);
/// assert_eq!(detect_format("[ A ]"), Format::Txt);
/// ```
pub fn detect_format(input: &str) -> Format {
    plugins::Orchestrator::with_all_plugins().detect_format(input)
}
