//! End-to-end tests for the bracket/arrow diagram language

use graphweave::prelude::*;
use graphweave::{parse, parse_as};

const RAILWAY: &str = "# railway sketch
graph { flow: east; label: Rail }
node { color: gray }
.hub { fill: red }

[ Bonn ] -> [ Koblenz ] { class: hub }
  -> [ Mainz ]

( Ruhr:
[ Essen ] == fast ==> [ Dortmund ]
) { color: blue }

[ Bonn ] ->
[ Essen ]
";

#[test]
fn test_railway_graph_attributes() {
    let graph = parse_as(RAILWAY, Format::Txt).unwrap();
    assert_eq!(graph.flow(), Some(Flow::East));
    assert_eq!(graph.attribute("label"), Some("Rail"));
}

#[test]
fn test_railway_nodes() {
    let graph = parse_as(RAILWAY, Format::Txt).unwrap();
    let ids: Vec<_> = graph.node_ids().collect();
    assert_eq!(ids, vec!["Bonn", "Koblenz", "Mainz", "Essen", "Dortmund"]);
    assert_eq!(graph.node("Bonn").unwrap().attribute("color"), Some("gray"));
    let koblenz = graph.node("Koblenz").unwrap();
    assert_eq!(koblenz.attribute("fill"), Some("red"));
    assert_eq!(koblenz.attribute("color"), Some("gray"));
}

#[test]
fn test_railway_edges() {
    let graph = parse_as(RAILWAY, Format::Txt).unwrap();
    assert_eq!(graph.edge_count(), 4);
    assert!(graph.has_edge("Bonn", "Koblenz"));
    assert!(graph.has_edge("Koblenz", "Mainz"));
    assert!(graph.has_edge("Bonn", "Essen"));
    let fast = graph.edges().find(|e| e.from == "Essen").unwrap();
    assert_eq!(fast.to, "Dortmund");
    assert_eq!(fast.label, "fast");
    for edge in graph.edges() {
        assert!(graph.has_node(&edge.from));
        assert!(graph.has_node(&edge.to));
    }
}

#[test]
fn test_railway_group() {
    let graph = parse_as(RAILWAY, Format::Txt).unwrap();
    assert_eq!(graph.group_count(), 1);
    let ruhr = graph.group_by_name("Ruhr").unwrap();
    assert_eq!(ruhr.attribute("color"), Some("blue"));
    assert!(ruhr.members.contains("Essen"));
    assert!(ruhr.members.contains("Dortmund"));
    assert!(!ruhr.members.contains("Bonn"));
}

#[test]
fn test_pending_edge_waits_for_next_line() {
    let graph = parse_as("[ A ] ->\n\n# comment\n[ B ]", Format::Txt).unwrap();
    assert!(graph.has_edge("A", "B"));
}

#[test]
fn test_dangling_edge_at_end() {
    let err = parse_as("[ A ] -> [ B ]\n[ B ] ->", Format::Txt).unwrap_err();
    match err {
        ParseError::DanglingEdge { from, position } => {
            assert_eq!(from, "B");
            assert_eq!(position.line, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_deep_group_nesting() {
    let graph = parse("( G1 [ A ] ( G2 [ B ] ( G3 [ C ] ) ) )").unwrap();
    let g1 = graph.group_by_name("G1").unwrap();
    let g2 = graph.group_by_name("G2").unwrap();
    let g3 = graph.group_by_name("G3").unwrap();
    assert_eq!(g1.parent, None);
    assert_eq!(g2.parent, Some(g1.id));
    assert_eq!(g3.parent, Some(g2.id));
    assert_eq!(graph.node("C").unwrap().group, Some(g3.id));
    assert_eq!(graph.top_level_groups().count(), 1);
}

#[test]
fn test_nesting_limit_counts_groups_below_root() {
    let mut graph = Graph::new();
    let parser = NativeParser::with_config(ParseConfig::new().with_max_nesting(2));
    assert!(parser.parse("( a ( b [ X ] ) )", &mut graph).is_ok());

    let mut graph = Graph::new();
    let err = parser
        .parse("( a ( b ( c [ X ] ) ) )", &mut graph)
        .unwrap_err();
    assert!(matches!(err, ParseError::NestingTooDeep { limit: 2, .. }));
}
