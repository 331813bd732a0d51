//! GDL/VCG detector
//!
//! GDL files open with `graph:` followed by a brace block.

use crate::core::{skip_preamble, strip_keyword, Detector, Format};
use tracing::{debug, trace};

/// GDL/VCG detector
pub struct GdlDetector;

impl GdlDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GdlDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for GdlDetector {
    fn detect(&self, input: &str) -> bool {
        trace!(input_len = input.len(), "GdlDetector::detect called");
        let detected = strip_keyword(skip_preamble(input), "graph")
            .and_then(|rest| rest.trim_start().strip_prefix(':'))
            .is_some_and(|rest| rest.trim_start().starts_with('{'));
        if detected {
            debug!("Detected GDL via 'graph: {{' header");
        }
        detected
    }

    fn confidence(&self, input: &str) -> f64 {
        if !self.detect(input) {
            return 0.0;
        }
        let mut score: f64 = 0.7;
        if input.contains("title") {
            score += 0.1;
        }
        if input.contains("node:") || input.contains("edge:") {
            score += 0.2;
        }
        score.min(1.0)
    }

    fn format(&self) -> Format {
        Format::Gdl
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["graph: {", "node: {", "edge: {", "title:", "sourcename:", "targetname:"]
    }
}
