//! Native diagram language plugin
//!
//! The bracket/arrow language: `[ A ] -> [ B ]` chains, `( group ... )`
//! literals and `selector { key: value }` scope statements.

mod detector;
mod lines;
mod parser;
mod recognizer;

pub use detector::*;
pub use parser::*;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{Detector, Format, Graph, Parser};

    #[test]
    fn test_detect_then_parse() {
        let input = "# routes\n[ Bonn ] -> [ Berlin ]\n[ Berlin ] => [ Hamburg ]";

        let detector = NativeDetector::new();
        assert!(detector.detect(input));
        assert_eq!(detector.format(), Format::Txt);

        let parser = NativeParser::new();
        assert!(parser.can_parse(input));
        let mut graph = Graph::new();
        parser.parse(input, &mut graph).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
