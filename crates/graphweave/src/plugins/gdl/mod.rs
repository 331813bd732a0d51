//! GDL/VCG plugin
//!
//! The brace-block language used by aiSee and VCG tools.

mod detector;
mod grammar;
mod parser;
mod remap;

pub use detector::*;
pub use parser::*;
pub use remap::VENDOR_PREFIX;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::core::{Detector, Format, Graph, Parser};

    #[test]
    fn test_detect_then_parse() {
        let input = "graph: {\n  title: \"build\"\n  orientation: left_to_right\n  node: { title: \"lib\" vertical_order: 0 }\n  node: { title: \"app\" vertical_order: maxdepth }\n  edge: { sourcename: \"app\" targetname: \"lib\" }\n}\n";

        let detector = GdlDetector::new();
        assert!(detector.detect(input));
        assert_eq!(detector.format(), Format::Gdl);

        let parser = GdlParser::new();
        assert!(parser.can_parse(input));
        let mut graph = Graph::new();
        parser.parse(input, &mut graph).unwrap();

        assert_eq!(graph.attribute("label"), Some("build"));
        assert_eq!(graph.attribute("flow"), Some("east"));
        assert_eq!(graph.node("app").unwrap().attribute("rank"), Some("1000000"));
        assert!(graph.has_edge("app", "lib"));
    }
}
