//! Graphviz DOT detector
//!
//! DOT input starts with an optional `strict` followed by `graph` or
//! `digraph`. A `graph` directly followed by `:` is GDL and is left alone.

use crate::core::{skip_preamble, strip_keyword, Detector, Format};
use tracing::{debug, trace};

/// Graphviz DOT detector
pub struct DotDetector;

impl DotDetector {
    pub fn new() -> Self {
        Self
    }

    /// Text after the graph header keywords, if the input has one
    fn after_header(input: &str) -> Option<&str> {
        let body = skip_preamble(input);
        let body = strip_keyword(body, "strict").map_or(body, str::trim_start);
        let rest = strip_keyword(body, "digraph").or_else(|| strip_keyword(body, "graph"))?;
        let rest = rest.trim_start();
        if rest.starts_with(':') {
            return None;
        }
        Some(rest)
    }
}

impl Default for DotDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DotDetector {
    fn detect(&self, input: &str) -> bool {
        trace!(input_len = input.len(), "DotDetector::detect called");
        let detected = Self::after_header(input).is_some();
        if detected {
            debug!("Detected DOT via graph header");
        }
        detected
    }

    fn confidence(&self, input: &str) -> f64 {
        let Some(rest) = Self::after_header(input) else {
            return 0.0;
        };
        let mut score: f64 = 0.6;
        if rest.contains('{') {
            score += 0.2;
        }
        if rest.contains("->") || rest.contains("--") {
            score += 0.1;
        }
        if rest.contains('=') || rest.contains("subgraph") {
            score += 0.1;
        }
        score.min(1.0)
    }

    fn format(&self) -> Format {
        Format::Graphviz
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["strict", "digraph", "graph", "subgraph", "->", "--", "[key=value]"]
    }
}
