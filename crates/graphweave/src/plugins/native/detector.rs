//! Native diagram language detector
//!
//! The native language has no header, so this detector looks for node
//! literals and scope statements. It is also the fallback when no other
//! format claims the input.

use crate::core::{skip_preamble, Detector, Format};
use tracing::trace;

/// Native diagram language detector
pub struct NativeDetector;

impl NativeDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for NativeDetector {
    fn detect(&self, input: &str) -> bool {
        let body = skip_preamble(input);
        trace!(input_len = input.len(), "NativeDetector::detect called");
        if body.is_empty() {
            return false;
        }
        (body.contains('[') && body.contains(']'))
            || body.starts_with('(')
            || body.starts_with('{')
            || ["graph", "node", "edge", "group", "."]
                .iter()
                .any(|scope| body.starts_with(scope) && body.contains('{'))
    }

    fn confidence(&self, input: &str) -> f64 {
        if !self.detect(input) {
            return 0.0;
        }
        let body = skip_preamble(input);
        let mut score: f64 = 0.3;
        if body.contains("] -") || body.contains("] =") || body.contains("] .") {
            score += 0.4;
        }
        if body.contains("{ ") && body.contains(':') {
            score += 0.1;
        }
        score.min(1.0)
    }

    fn format(&self) -> Format {
        Format::Txt
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["[ ", " ]", "->", "( ", "{ key: value }"]
    }
}
