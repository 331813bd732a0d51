//! Tests for detector edge cases across all three formats

use graphweave::core::{Detector, Format};
use graphweave::plugins::{DotDetector, GdlDetector, NativeDetector, Orchestrator};

fn detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(GdlDetector::new()),
        Box::new(DotDetector::new()),
        Box::new(NativeDetector::new()),
    ]
}

#[test]
fn test_detectors_empty_input() {
    for detector in detectors() {
        assert!(!detector.detect(""), "{} claimed empty input", detector.format());
        assert_eq!(detector.confidence(""), 0.0);
        assert!(!detector.detect("   \n\t  "));
    }
}

#[test]
fn test_detectors_report_their_format() {
    let formats: Vec<_> = detectors().iter().map(|d| d.format()).collect();
    assert_eq!(formats, vec![Format::Gdl, Format::Graphviz, Format::Txt]);
}

#[test]
fn test_detector_patterns() {
    assert!(DotDetector::new().patterns().contains(&"digraph"));
    assert!(GdlDetector::new().patterns().contains(&"graph: {"));
    assert!(NativeDetector::new().patterns().contains(&"->"));
}

#[test]
fn test_confidence_is_bounded() {
    let inputs = [
        "digraph G { subgraph s { a -> b } x = y }",
        "graph: { title: \"t\" node: { title: \"a\" } edge: { source: \"a\" target: \"a\" } }",
        "[ A ] -> [ B ] { color: red }",
    ];
    for detector in detectors() {
        for input in inputs {
            let confidence = detector.confidence(input);
            assert!((0.0..=1.0).contains(&confidence), "{} on {:?}", confidence, input);
        }
    }
}

#[test]
fn test_dot_headers() {
    let detector = DotDetector::new();
    assert!(detector.detect("digraph { }"));
    assert!(detector.detect("GRAPH G { a -- b }"));
    assert!(detector.detect("strict digraph { a -> b }"));
    assert!(detector.detect("// leading comment\n/* block */\ndigraph { }"));
    assert!(!detector.detect("graph: { }"));
    assert!(!detector.detect("graphs { }"));
    assert!(!detector.detect("[ A ] -> [ B ]"));
}

#[test]
fn test_gdl_headers() {
    let detector = GdlDetector::new();
    assert!(detector.detect("graph: {}"));
    assert!(detector.detect("graph :\n{ title: \"x\" }"));
    assert!(detector.detect("/* vcg */ graph: { }"));
    assert!(!detector.detect("graph { a }"));
    assert!(!detector.detect("digraph: { }"));
}

#[test]
fn test_native_inputs() {
    let detector = NativeDetector::new();
    assert!(detector.detect("[ A ]"));
    assert!(detector.detect("( Group [ A ] )"));
    assert!(detector.detect("node { color: red }"));
    assert!(!detector.detect("just some words"));
}

#[test]
fn test_orchestrator_sniffing_order() {
    let orchestrator = Orchestrator::with_all_plugins();
    assert_eq!(orchestrator.detect_format("graph: { }"), Format::Gdl);
    assert_eq!(orchestrator.detect_format("graph { a }"), Format::Graphviz);
    assert_eq!(orchestrator.detect_format("[ A ] -> [ B ]"), Format::Txt);
    assert_eq!(orchestrator.detect_format("no markers here"), Format::Txt);
    assert_eq!(orchestrator.detect_format(""), Format::Txt);
}
