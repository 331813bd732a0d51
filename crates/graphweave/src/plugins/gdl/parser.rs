//! GDL/VCG parser
//!
//! The block structure is read with chumsky into a small tree of
//! `key: value` entries, which is then walked to build the graph. Edge
//! blocks are held back until every block has been read, since they may
//! name nodes declared further down.

use tracing::{debug, info, span, trace, Level};

use super::grammar::{parse_document, scan_blocks, Entry, Value};
use super::remap::{remap, vendor_key, Block};
use crate::core::{
    Attributes, ElementKind, Graph, GroupId, ParseConfig, ParseError, Parser, Position, Selector,
};

/// Block keywords that describe an edge
const EDGE_BLOCKS: &[&str] = &["edge", "nearedge", "bentnearedge", "backedge"];

/// GDL/VCG parser
pub struct GdlParser {
    config: ParseConfig,
}

impl GdlParser {
    pub fn new() -> Self {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }
}

impl Default for GdlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GdlParser {
    fn parse(&self, input: &str, graph: &mut Graph) -> Result<(), ParseError> {
        let parse_span = span!(Level::INFO, "parse_gdl", input_len = input.len());
        let _enter = parse_span.enter();

        scan_blocks(input, self.config.max_nesting)?;
        let entries = parse_document(input)?;
        debug!(entries = entries.len(), "Parsed GDL block structure");

        let mut builder = GdlBuilder::new(input, graph);
        builder.graph_block(&entries)?;
        builder.finish();

        info!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            group_count = graph.group_count(),
            "GDL graph parsed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gdl"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input.contains("graph") && input.contains('{')
    }
}

/// An edge block waiting for the rest of the file
#[derive(Debug, Clone)]
struct DeferredEdge {
    from: String,
    to: String,
    attributes: Attributes,
    group: Option<GroupId>,
}

struct GdlBuilder<'a, 'g> {
    input: &'a str,
    graph: &'g mut Graph,
    groups: Vec<GroupId>,
    edges: Vec<DeferredEdge>,
}

impl<'a, 'g> GdlBuilder<'a, 'g> {
    fn new(input: &'a str, graph: &'g mut Graph) -> Self {
        graph.set_attribute("flow", "south");

        let mut edge_defaults = Attributes::new();
        edge_defaults.insert("arrowstyle".to_string(), "filled".to_string());
        graph.set_defaults(Selector::kind(ElementKind::Edge), &edge_defaults);

        let mut node_defaults = Attributes::new();
        node_defaults.insert("align".to_string(), "left".to_string());
        node_defaults.insert("whitespace".to_string(), "preserve".to_string());
        graph.set_defaults(Selector::kind(ElementKind::Node), &node_defaults);

        Self {
            input,
            graph,
            groups: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn position(&self, offset: usize) -> Position {
        Position::from_offset(self.input, offset)
    }

    /// Walk the entries of the outer graph block or a nested one
    fn graph_block(&mut self, entries: &[Entry]) -> Result<(), ParseError> {
        for entry in entries {
            trace!(key = %entry.key, "GDL entry");
            match (&entry.value, entry.key.as_str()) {
                (Value::Block(fields), "node") => self.node(fields, entry.offset)?,
                (Value::Block(fields), kind) if EDGE_BLOCKS.contains(&kind) => {
                    self.edge(kind, fields, entry.offset)?
                }
                (Value::Block(fields), "graph") => self.subgraph(fields)?,
                (Value::Block(_), other) => {
                    debug!(key = %other, "Ignoring unknown GDL block");
                }
                (Value::Text(value), key) => self.graph_field(key, value),
            }
        }
        Ok(())
    }

    fn graph_field(&mut self, key: &str, value: &str) {
        if let Some(field) = key.strip_prefix("node.") {
            self.default_field(ElementKind::Node, field, value);
            return;
        }
        if let Some(field) = key.strip_prefix("edge.") {
            self.default_field(ElementKind::Edge, field, value);
            return;
        }
        match self.groups.last() {
            Some(&group) => {
                if key != "title" {
                    let mut attributes = Attributes::new();
                    attributes.insert(vendor_key(key), value.to_string());
                    self.graph.apply_group_attributes(group, &attributes);
                }
            }
            None => {
                let mut attributes = Attributes::new();
                remap(Block::Graph, key, value, &mut attributes);
                for (key, value) in attributes {
                    self.graph.set_attribute(key, value);
                }
            }
        }
    }

    fn default_field(&mut self, kind: ElementKind, field: &str, value: &str) {
        let mut attributes = Attributes::new();
        attributes.insert(vendor_key(field), value.to_string());
        self.graph.set_defaults(Selector::kind(kind), &attributes);
    }

    /// A nested `graph: { title: T ... }` becomes the group `T`
    fn subgraph(&mut self, fields: &[Entry]) -> Result<(), ParseError> {
        let name = text_field(fields, &["title"]).unwrap_or_default();
        let parent = self.groups.last().copied();
        let group = self.graph.add_group(&name, parent);
        debug!(group = %name, "Opened GDL subgraph");
        self.groups.push(group);
        let result = self.graph_block(fields);
        self.groups.pop();
        result
    }

    fn node(&mut self, fields: &[Entry], offset: usize) -> Result<(), ParseError> {
        let Some(title) = text_field(fields, &["title"]) else {
            return Err(ParseError::MissingRequiredField {
                block: "node",
                field: "title",
                position: self.position(offset),
            });
        };

        let mut attributes = Attributes::new();
        for (key, value) in text_fields(fields) {
            if key != "title" {
                remap(Block::Node, key, value, &mut attributes);
            }
        }
        self.graph.add_node(&title);
        self.graph.apply_node_attributes(&title, &attributes);
        if let Some(&group) = self.groups.last() {
            self.graph.add_to_group(&title, group);
        }
        Ok(())
    }

    fn edge(&mut self, kind: &str, fields: &[Entry], offset: usize) -> Result<(), ParseError> {
        let missing = |field| ParseError::MissingRequiredField {
            block: "edge",
            field,
            position: self.position(offset),
        };
        let from = text_field(fields, &["source", "sourcename"]).ok_or_else(|| missing("source"))?;
        let to = text_field(fields, &["target", "targetname"]).ok_or_else(|| missing("target"))?;

        let mut attributes = Attributes::new();
        if kind != "edge" {
            attributes.insert(vendor_key("kind"), kind.to_string());
        }
        for (key, value) in text_fields(fields) {
            if !matches!(key, "source" | "sourcename" | "target" | "targetname") {
                remap(Block::Edge, key, value, &mut attributes);
            }
        }
        self.edges.push(DeferredEdge {
            from,
            to,
            attributes,
            group: self.groups.last().copied(),
        });
        Ok(())
    }

    /// Create the held back edges
    fn finish(self) {
        debug!(edges = self.edges.len(), "Materializing GDL edges");
        for edge in self.edges {
            self.graph.add_edge(&edge.from, &edge.to);
            let index = self.graph.edge_count() - 1;
            self.graph.apply_edge_attributes(index, &edge.attributes);
            self.graph.set_edge_group(index, edge.group);
        }
    }
}

/// The last text value among `keys`
fn text_field(fields: &[Entry], keys: &[&str]) -> Option<String> {
    text_fields(fields)
        .filter(|(key, _)| keys.contains(key))
        .last()
        .map(|(_, value)| value.to_string())
}

fn text_fields(fields: &[Entry]) -> impl Iterator<Item = (&str, &str)> {
    fields.iter().filter_map(|entry| match &entry.value {
        Value::Text(value) => Some((entry.key.as_str(), value.as_str())),
        Value::Block(_) => None,
    })
}
