//! End-to-end tests for Graphviz DOT documents

use graphweave::prelude::*;
use graphweave::{parse, parse_as};

const SERVICES: &str = r#"/* service map */
digraph services {
    graph [rankdir=LR, label="Services"];
    node [shape=box, fontsize=10];
    edge [color=gray];

    subgraph cluster_web {
        label = "Web tier";
        color = blue;
        lb [label="Load balancer"];
        web1; web2;
    }

    db [shape=record, label="<primary> primary|<replica> replica"];

    lb -> { web1 web2 };
    web1 -> db:primary [label="writes"];
    web2 -> db:replica [style=dashed, headport=n];
}
"#;

#[test]
fn test_service_map_graph_attributes() {
    let graph = parse(SERVICES).unwrap();
    assert_eq!(graph.flow(), Some(Flow::East));
    assert_eq!(graph.attribute("label"), Some("Services"));
    assert_eq!(graph.attribute("type"), Some("directed"));
    assert_eq!(graph.attribute("x-dot-name"), Some("services"));
}

#[test]
fn test_service_map_nodes() {
    let graph = parse(SERVICES).unwrap();
    let lb = graph.node("lb").unwrap();
    assert_eq!(lb.label, "Load balancer");
    assert_eq!(lb.attribute("shape"), Some("rect"));
    assert_eq!(lb.attribute("font-size"), Some("10px"));

    assert!(!graph.has_node("db"));
    let primary = graph.node("db.0").unwrap();
    assert_eq!(primary.label, "primary");
    assert_eq!(primary.attribute("autosplit-port"), Some("primary"));
    assert_eq!(primary.attribute("font-size"), Some("10px"));
    let replica = graph.node("db.1").unwrap();
    assert_eq!(replica.origin.as_deref(), Some("db.0"));
}

#[test]
fn test_service_map_group() {
    let graph = parse(SERVICES).unwrap();
    assert_eq!(graph.group_count(), 1);
    let web = graph.group_by_name("cluster_web").unwrap();
    assert_eq!(web.attribute("label"), Some("Web tier"));
    assert_eq!(web.attribute("bordercolor"), Some("blue"));
    let members: Vec<_> = web.members.iter().map(String::as_str).collect();
    assert_eq!(members, vec!["lb", "web1", "web2"]);
}

#[test]
fn test_service_map_edges() {
    let graph = parse(SERVICES).unwrap();
    assert_eq!(graph.edge_count(), 4);
    assert!(graph.has_edge("lb", "web1"));
    assert!(graph.has_edge("lb", "web2"));
    assert!(graph.has_edge("web1", "db.0"));
    assert!(graph.has_edge("web2", "db.1"));

    for edge in graph.edges() {
        assert_eq!(edge.attribute("color"), Some("gray"));
    }
    let writes = graph.edges().find(|e| e.to == "db.0").unwrap();
    assert_eq!(writes.label, "writes");
    let reads = graph.edges().find(|e| e.to == "db.1").unwrap();
    assert_eq!(reads.attribute("style"), Some("dashed"));
    assert_eq!(reads.attribute("end"), Some("north"));
}

#[test]
fn test_undirected_strict_graph() {
    let graph = parse_as("strict graph { a -- b; b -- a; a -- c }", Format::Graphviz).unwrap();
    assert_eq!(graph.attribute("type"), Some("undirected"));
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.edges().all(|e| e.undirected));
}

#[test]
fn test_record_split_in_default_flow() {
    let graph = parse("digraph { r [shape=record, label=\"A|B||C\"] }").unwrap();
    let ids: Vec<_> = graph.node_ids().collect();
    assert_eq!(ids, vec!["r.0", "r.1", "r.2"]);
    let b = graph.node("r.1").unwrap();
    assert_eq!((b.origin.as_deref(), b.dx, b.dy), (Some("r.0"), 1, 0));
    let c = graph.node("r.2").unwrap();
    assert_eq!((c.origin.as_deref(), c.dx, c.dy), (Some("r.0"), 0, 1));
}

#[test]
fn test_label_set_after_edges_splits_late() {
    let graph = parse("digraph { x -> r; r [shape=record, label=\"A|B\"] }").unwrap();
    assert!(!graph.has_node("r"));
    assert!(graph.has_edge("x", "r.0"));
}

#[test]
fn test_reopened_subgraph() {
    let graph = parse("digraph { subgraph s { a } b; subgraph s { c } }").unwrap();
    assert_eq!(graph.group_count(), 1);
    let group = graph.group_by_name("s").unwrap();
    assert!(group.members.contains("a"));
    assert!(group.members.contains("c"));
    assert!(!group.members.contains("b"));
}

#[test]
fn test_quoted_and_numeric_ids() {
    let graph = parse("digraph { \"New York\" -> 42 -> \"a\\\"b\" }").unwrap();
    assert!(graph.has_edge("New York", "42"));
    assert!(graph.has_edge("42", "a\"b"));
}

#[test]
fn test_attributes_reach_existing_nodes() {
    let graph = parse("digraph { a -> b; a [color=red]; b [fillcolor=yellow] }").unwrap();
    assert_eq!(graph.node("a").unwrap().attribute("bordercolor"), Some("red"));
    assert_eq!(graph.node("b").unwrap().attribute("fill"), Some("yellow"));
}

#[test]
fn test_unknown_attributes_keep_vendor_prefix() {
    let graph = parse("digraph { a [penwidth=2]; a -> b [weight=3] }").unwrap();
    assert_eq!(graph.node("a").unwrap().attribute("x-dot-penwidth"), Some("2"));
    assert_eq!(graph.edge(0).unwrap().attribute("x-dot-weight"), Some("3"));
}
