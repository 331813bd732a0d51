//! Plugin orchestrator for format detection and dispatch
//!
//! Detectors are consulted in registration order and the first one that
//! recognises the input decides the format. Input nobody claims is treated
//! as the native language.

use tracing::{debug, info, span, trace, Level};

use crate::core::{Detector, Format, Graph, GraphError, ParseConfig, ParseError, Parser};
use crate::plugins::dot::{DotDetector, DotParser};
use crate::plugins::gdl::{GdlDetector, GdlParser};
use crate::plugins::native::{NativeDetector, NativeParser};

/// Plugin orchestrator that picks a parser for each input
///
/// # Example
/// ```
/// use graphweave::core::Format;
/// use graphweave::plugins::Orchestrator;
///
/// let orchestrator = Orchestrator::with_all_plugins();
/// assert_eq!(orchestrator.detect_format("digraph { a -> b }"), Format::Graphviz);
/// let graph = orchestrator.parse("[ A ] -> [ B ]").unwrap();
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub struct Orchestrator {
    detectors: Vec<Box<dyn Detector>>,
    config: ParseConfig,
}

impl Orchestrator {
    /// Create an orchestrator with no detectors registered
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            config: ParseConfig::default(),
        }
    }

    /// Create an orchestrator with the GDL, DOT and native detectors, in that order
    pub fn with_all_plugins() -> Self {
        let mut orchestrator = Self::new();
        orchestrator.register_default_detectors();
        orchestrator
    }

    /// Use `config` for every parser this orchestrator creates
    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the built-in detectors
    ///
    /// GDL goes first because its `graph:` header would otherwise look like
    /// the start of an undirected DOT graph.
    pub fn register_default_detectors(&mut self) {
        self.register_detector(Box::new(GdlDetector::new()));
        self.register_detector(Box::new(DotDetector::new()));
        self.register_detector(Box::new(NativeDetector::new()));
    }

    /// Register a detector after the existing ones
    pub fn register_detector(&mut self, detector: Box<dyn Detector>) {
        debug!(format = %detector.format(), "Registering detector");
        self.detectors.push(detector);
    }

    /// Formats of the registered detectors, in consultation order
    pub fn detectors(&self) -> Vec<Format> {
        self.detectors.iter().map(|d| d.format()).collect()
    }

    /// Detect the input format, falling back to the native language
    pub fn detect_format(&self, input: &str) -> Format {
        let detect_span = span!(Level::INFO, "detect_format", input_len = input.len());
        let _enter = detect_span.enter();

        for detector in &self.detectors {
            let format = detector.format();
            trace!(%format, "Checking detector");
            if detector.detect(input) {
                let confidence = detector.confidence(input);
                info!(%format, confidence, "Detected input format");
                return format;
            }
        }

        debug!("No detector claimed the input, using the native language");
        Format::Txt
    }

    /// A parser for `format` using this orchestrator's configuration
    pub fn parser_for(&self, format: Format) -> Box<dyn Parser> {
        match format {
            Format::Txt => Box::new(NativeParser::with_config(self.config)),
            Format::Graphviz => Box::new(DotParser::with_config(self.config)),
            Format::Gdl => Box::new(GdlParser::with_config(self.config)),
        }
    }

    /// Detect the format of `input` and parse it
    pub fn parse(&self, input: &str) -> Result<Graph, GraphError> {
        let format = self.detect_format(input);
        Ok(self.parse_as(input, format)?)
    }

    /// Parse `input` as `format`, skipping detection
    pub fn parse_as(&self, input: &str, format: Format) -> Result<Graph, ParseError> {
        let parse_span = span!(Level::INFO, "parse_input", %format, input_len = input.len());
        let _enter = parse_span.enter();

        let parser = self.parser_for(format);
        debug!(parser = parser.name(), version = parser.version(), "Selected parser");

        let mut graph = Graph::new();
        parser.parse(input, &mut graph)?;
        Ok(graph)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
