//! Core detector trait for input format identification
//!
//! This trait defines the interface for recognising which of the supported
//! graph languages a text is written in.

use super::Format;

/// Core trait for format detectors
///
/// Each input language provides a detector that recognises its header or
/// characteristic syntax.
///
/// # Example
/// ```
/// use graphweave::core::Detector;
/// use graphweave::plugins::dot::DotDetector;
///
/// let detector = DotDetector::new();
/// assert!(detector.detect("digraph G { a -> b }"));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the input is written in this format
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// The format this detector recognises
    fn format(&self) -> Format;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}

/// Skip leading whitespace and `//`, `/* */` and `#` comment lines
pub(crate) fn skip_preamble(input: &str) -> &str {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("//").or_else(|| trimmed.strip_prefix('#')) {
            rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            return trimmed;
        }
    }
}

/// Strip a case-insensitive keyword that is followed by a non-identifier char
pub(crate) fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let head = input.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &input[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => None,
        _ => Some(rest),
    }
}
