//! Tests for core error types and the positions parsers report

use graphweave::core::{GraphError, ParseError, Position};
use graphweave::{parse, parse_as, Format};

#[test]
fn test_unterminated_block_message() {
    let error = ParseError::UnterminatedBlock {
        opener: '{',
        position: Position::new(2, 4),
    };
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Unterminated block"));
    assert!(error_msg.contains("'{'"));
    assert!(error_msg.contains("line 2"));
    assert!(error_msg.contains("column 4"));
}

#[test]
fn test_unexpected_token_message() {
    let error = ParseError::unexpected("}", "a node id", Position::new(1, 9));
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Unexpected token '}'"));
    assert!(error_msg.contains("expected a node id"));
}

#[test]
fn test_missing_required_field_message() {
    let error = ParseError::MissingRequiredField {
        field: "title",
        block: "node",
        position: Position::new(1, 12),
    };
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("'title'"));
    assert!(error_msg.contains("node block"));
}

#[test]
fn test_nesting_too_deep_message() {
    let error = ParseError::NestingTooDeep {
        limit: 3,
        position: Position::new(4, 1),
    };
    assert!(error.to_string().contains("deeper than 3 levels"));
    assert_eq!(error.position(), Position::new(4, 1));
}

#[test]
fn test_parse_error_wraps_into_graph_error() {
    let error: GraphError = ParseError::UnmatchedGroupClose {
        position: Position::new(1, 1),
    }
    .into();
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Parse error"));
    assert!(error_msg.contains("no open group"));
}

#[test]
fn test_unknown_format() {
    assert!("mermaid".parse::<Format>().is_err());

    let error = GraphError::UnknownFormat {
        name: "mermaid".to_string(),
    };
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Unknown input format"));
    assert!(error_msg.contains("mermaid"));
}

#[test]
fn test_io_error() {
    use std::io;
    let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: GraphError = io_err.into();
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("IO error"));
    assert!(error_msg.contains("File not found"));
}

#[test]
fn test_native_error_positions() {
    let err = parse_as("[ A ]\n[ B ] -> [ C", Format::Txt).unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedBlock { opener: '[', .. }));
    assert_eq!(err.position().line, 2);

    let err = parse_as("[ A ]\n\n)", Format::Txt).unwrap_err();
    assert_eq!(err, ParseError::UnmatchedGroupClose { position: Position::new(3, 1) });
}

#[test]
fn test_dot_error_positions() {
    let err = parse_as("digraph {\n  a -> \n}", Format::Graphviz).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert_eq!(err.position().line, 3);

    let err = parse_as("digraph {\n  a -> b\n", Format::Graphviz).unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedBlock { opener: '{', .. }));
}

#[test]
fn test_gdl_error_positions() {
    let err = parse_as("graph: {\n  node: { label: \"x\" }\n}", Format::Gdl).unwrap_err();
    match err {
        ParseError::MissingRequiredField { field, block, position } => {
            assert_eq!(field, "title");
            assert_eq!(block, "node");
            assert_eq!(position.line, 2);
        }
        other => panic!("unexpected error: {}", other),
    }

    let err = parse_as("graph: { node: { title: \"a\" }", Format::Gdl).unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedBlock { opener: '{', .. }));
}

#[test]
fn test_errors_through_auto_detection() {
    let err = parse("graph: { edge: { sourcename: \"a\" } }").unwrap_err();
    assert!(matches!(
        err,
        GraphError::Parse(ParseError::MissingRequiredField { .. })
    ));
}
