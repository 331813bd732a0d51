//! Graphviz DOT parser
//!
//! A recursive descent grammar over the token stream from the lexer. Node and
//! edge defaults are scoped: every `{ }` block and subgraph starts with a copy
//! of its parent's `node [...]`/`edge [...]` tables and drops it on close.
//! DOT attribute names are translated through the remap tables before they
//! reach the graph, and record nodes are split into field nodes.

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::{debug, info, span, trace, Level};

use super::lexer::{tokenize, Token, TokenKind};
use super::record::{autosplit, is_split_label};
use super::remap::{remap, Target, VENDOR_PREFIX};
use crate::core::{Attributes, Graph, GroupId, ParseConfig, ParseError, Parser, Position};

/// Graphviz DOT parser
pub struct DotParser {
    config: ParseConfig,
}

impl DotParser {
    pub fn new() -> Self {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }
}

impl Default for DotParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for DotParser {
    fn parse(&self, input: &str, graph: &mut Graph) -> Result<(), ParseError> {
        let parse_span = span!(Level::INFO, "parse_dot", input_len = input.len());
        let _enter = parse_span.enter();

        let (tokens, end) = tokenize(input)?;
        debug!(token_count = tokens.len(), "Tokenized DOT input");

        let mut grammar = Grammar::new(&tokens, end, graph, self.config);
        grammar.document()?;
        grammar.finish();

        info!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            group_count = graph.group_count(),
            "DOT graph parsed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "graphviz"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        let lower = input.to_ascii_lowercase();
        lower.contains("graph") && input.contains('{')
    }
}

/// Raw `node [...]` and `edge [...]` defaults of one block
#[derive(Debug, Clone, Default)]
struct Scope {
    node: Attributes,
    edge: Attributes,
}

/// One side of an edge segment
#[derive(Debug, Clone)]
enum Endpoint {
    Node { id: String, port: Option<String> },
    /// Every node declared inside a `{ }` or subgraph
    Set(Vec<String>),
}

struct Grammar<'t, 'g> {
    tokens: &'t [Token],
    pos: usize,
    end: Position,
    graph: &'g mut Graph,
    config: ParseConfig,
    scopes: Vec<Scope>,
    groups: Vec<GroupId>,
    /// Node collectors for the `{ }` blocks currently open
    sets: Vec<IndexSet<String>>,
    directed: bool,
    strict: bool,
    name: String,
    /// Field port names of every record split so far
    records: HashMap<String, Vec<String>>,
    /// `id:port` literal nodes standing in for records not split yet
    ported: HashMap<String, Vec<(String, String)>>,
}

impl<'t, 'g> Grammar<'t, 'g> {
    fn new(tokens: &'t [Token], end: Position, graph: &'g mut Graph, config: ParseConfig) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            graph,
            config,
            scopes: vec![Scope::default()],
            groups: Vec::new(),
            sets: Vec::new(),
            directed: false,
            strict: false,
            name: String::new(),
            records: HashMap::new(),
            ported: HashMap::new(),
        }
    }

    // ---------------------------------------------------------------------
    // token cursor

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn position(&self) -> Position {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_string(), |t| t.kind.describe());
        ParseError::unexpected(found, expected, self.position())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", kind.describe())))
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        is_keyword(self.peek_kind(), keyword)
    }

    fn at_edge_operator(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Arrow | TokenKind::Line))
    }

    /// An ID: identifier, numeral, HTML string or `+`-joined quoted strings
    fn id(&mut self) -> Result<String, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("an identifier"));
        };
        match &token.kind {
            TokenKind::Id(s) | TokenKind::Numeral(s) | TokenKind::Html(s) => {
                self.pos += 1;
                Ok(s.clone())
            }
            TokenKind::Quoted(s) => {
                self.pos += 1;
                let mut value = s.clone();
                while self.peek_kind() == Some(&TokenKind::Plus) {
                    self.pos += 1;
                    match self.peek_kind() {
                        Some(TokenKind::Quoted(more)) => {
                            value.push_str(more);
                            self.pos += 1;
                        }
                        _ => return Err(self.unexpected("a quoted string after '+'")),
                    }
                }
                Ok(value)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn at_id(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Id(_) | TokenKind::Numeral(_) | TokenKind::Quoted(_) | TokenKind::Html(_))
        )
    }

    // ---------------------------------------------------------------------
    // grammar

    /// `[strict] (graph|digraph) [ID] '{' stmt_list '}'`
    fn document(&mut self) -> Result<(), ParseError> {
        if self.at_keyword("strict") {
            self.pos += 1;
            self.strict = true;
        }
        if self.at_keyword("digraph") {
            self.directed = true;
        } else if !self.at_keyword("graph") {
            return Err(self.unexpected("'graph' or 'digraph'"));
        }
        self.pos += 1;

        self.graph.set_attribute("flow", "south");
        self.graph.set_attribute(
            "type",
            if self.directed { "directed" } else { "undirected" },
        );
        if self.at_id() {
            self.name = self.id()?;
            self.graph
                .set_attribute(format!("{}name", VENDOR_PREFIX), self.name.clone());
        }
        debug!(
            directed = self.directed,
            strict = self.strict,
            name = %self.name,
            "Parsing DOT graph header"
        );

        let open = self.position();
        self.expect(TokenKind::LBrace)?;
        self.statements(open)?;

        if self.peek().is_some() {
            return Err(self.unexpected("end of input"));
        }
        Ok(())
    }

    /// Statements up to and including the `}` closing the brace at `open`
    fn statements(&mut self, open: Position) -> Result<(), ParseError> {
        loop {
            match self.peek_kind() {
                None => {
                    return Err(ParseError::UnterminatedBlock {
                        opener: '{',
                        position: open,
                    })
                }
                Some(TokenKind::RBrace) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(TokenKind::Semi) => {
                    self.pos += 1;
                }
                Some(_) => self.statement()?,
            }
        }
    }

    fn statement(&mut self) -> Result<(), ParseError> {
        trace!(position = %self.position(), "Parsing DOT statement");
        let kind = self.peek_kind();
        if (is_keyword(kind, "graph") || is_keyword(kind, "node") || is_keyword(kind, "edge"))
            && self.peek_nth(1) == Some(&TokenKind::LBracket)
        {
            return self.attribute_statement();
        }
        if self.at_id()
            && !self.at_keyword("subgraph")
            && self.peek_nth(1) == Some(&TokenKind::Equals)
        {
            let key = self.id()?;
            self.pos += 1;
            let value = self.id()?;
            let mut raw = Attributes::new();
            raw.insert(key, value);
            self.apply_graph_attributes(&raw);
            return Ok(());
        }

        let position = self.position();
        let first = self.endpoint()?;
        if self.at_edge_operator() {
            self.edge_statement(first, position)
        } else {
            self.node_statement(first)
        }
    }

    /// `(graph|node|edge) attr_list`
    fn attribute_statement(&mut self) -> Result<(), ParseError> {
        let keyword = match self.advance().map(|t| &t.kind) {
            Some(TokenKind::Id(word)) => word.to_ascii_lowercase(),
            _ => return Err(self.unexpected("'graph', 'node' or 'edge'")),
        };
        let raw = self.attribute_lists()?;
        trace!(keyword = %keyword, count = raw.len(), "Attribute statement");
        match keyword.as_str() {
            "graph" => self.apply_graph_attributes(&raw),
            "node" => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.node.extend(raw);
                }
            }
            _ => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.edge.extend(raw);
                }
            }
        }
        Ok(())
    }

    /// Zero or more `[ a=b, c=d; e ]` lists, later keys winning
    fn attribute_lists(&mut self) -> Result<Attributes, ParseError> {
        let mut raw = Attributes::new();
        while self.eat(&TokenKind::LBracket) {
            loop {
                if self.eat(&TokenKind::RBracket) {
                    break;
                }
                if !self.at_id() {
                    return Err(self.unexpected("an attribute name or ']'"));
                }
                let key = self.id()?;
                let value = if self.eat(&TokenKind::Equals) {
                    self.id()?
                } else {
                    "true".to_string()
                };
                raw.insert(key, value);
                if !self.eat(&TokenKind::Comma) {
                    self.eat(&TokenKind::Semi);
                }
            }
        }
        Ok(raw)
    }

    /// Graph attributes, or group attributes inside a subgraph
    fn apply_graph_attributes(&mut self, raw: &Attributes) {
        match self.groups.last() {
            Some(&group) => {
                let attributes = remap(Target::Group, raw);
                self.graph.apply_group_attributes(group, &attributes);
            }
            None => {
                for (key, value) in remap(Target::Graph, raw) {
                    self.graph.set_attribute(key, value);
                }
            }
        }
    }

    /// A node reference or a `{ }`/subgraph node set
    fn endpoint(&mut self) -> Result<Endpoint, ParseError> {
        if self.at_keyword("subgraph") || self.peek_kind() == Some(&TokenKind::LBrace) {
            return self.node_set();
        }
        if !self.at_id() {
            return Err(self.unexpected("a node, subgraph or '{'"));
        }
        let id = self.id()?;
        let port = if self.eat(&TokenKind::Colon) {
            let mut port = self.id()?;
            if self.eat(&TokenKind::Colon) {
                port.push(':');
                port.push_str(&self.id()?);
            }
            Some(port)
        } else {
            None
        };
        Ok(Endpoint::Node { id, port })
    }

    /// `[subgraph [ID]] '{' stmt_list '}'`
    fn node_set(&mut self) -> Result<Endpoint, ParseError> {
        let mut group = None;
        if self.at_keyword("subgraph") {
            self.pos += 1;
            let name = if self.at_id() { self.id()? } else { String::new() };
            group = Some(self.open_group(&name));
        }

        let open = self.position();
        if self.scopes.len() > self.config.max_nesting {
            return Err(ParseError::NestingTooDeep {
                limit: self.config.max_nesting,
                position: open,
            });
        }
        self.expect(TokenKind::LBrace)?;

        let inherited = self.scopes.last().cloned().unwrap_or_default();
        self.scopes.push(inherited);
        self.sets.push(IndexSet::new());
        if let Some(group) = group {
            self.groups.push(group);
        }

        let result = self.statements(open);

        if group.is_some() {
            self.groups.pop();
        }
        let members = self.sets.pop().unwrap_or_default();
        self.scopes.pop();
        result?;

        trace!(members = members.len(), "Closed node set");
        Ok(Endpoint::Set(members.into_iter().collect()))
    }

    /// Reopen a named subgraph under the same parent, or create it
    fn open_group(&mut self, name: &str) -> GroupId {
        let parent = self.groups.last().copied();
        if !name.is_empty() {
            let existing = self
                .graph
                .groups()
                .find(|g| g.name == name && g.parent == parent)
                .map(|g| g.id);
            if let Some(id) = existing {
                return id;
            }
        }
        self.graph.add_group(name, parent)
    }

    fn node_statement(&mut self, endpoint: Endpoint) -> Result<(), ParseError> {
        let raw = self.attribute_lists()?;
        match endpoint {
            Endpoint::Node { id, .. } => {
                self.declare_node(&id);
                if !raw.is_empty() {
                    let attributes = self.node_attributes(&id, &raw);
                    self.apply_node(&id, &attributes);
                }
                self.check_record(&id);
            }
            Endpoint::Set(members) => {
                // `{ a b } [color=red]` is not valid DOT, but harmless
                if !raw.is_empty() {
                    for id in &members {
                        let attributes = self.node_attributes(id, &raw);
                        self.apply_node(id, &attributes);
                    }
                }
            }
        }
        Ok(())
    }

    /// `endpoint (edgeop endpoint)+ attr_list*`
    fn edge_statement(&mut self, first: Endpoint, position: Position) -> Result<(), ParseError> {
        let mut endpoints = vec![first];
        while self.at_edge_operator() {
            self.pos += 1;
            endpoints.push(self.endpoint()?);
        }
        let explicit = self.attribute_lists()?;

        let mut raw = self.scopes.last().map(|s| s.edge.clone()).unwrap_or_default();
        raw.extend(explicit);

        let resolved: Vec<Vec<String>> = endpoints
            .into_iter()
            .map(|endpoint| self.resolve(endpoint))
            .collect();
        trace!(segments = resolved.len() - 1, %position, "Edge statement");

        for pair in resolved.windows(2) {
            for from in &pair[0] {
                for to in &pair[1] {
                    self.add_edge(from, to, &raw);
                }
            }
        }
        Ok(())
    }

    /// Node ids an endpoint stands for, declaring plain node references
    fn resolve(&mut self, endpoint: Endpoint) -> Vec<String> {
        match endpoint {
            Endpoint::Node { id, port: None } => {
                self.declare_node(&id);
                self.check_record(&id);
                vec![self.field_id(&id, None)]
            }
            Endpoint::Node { id, port: Some(port) } => {
                self.check_record(&id);
                if self.records.contains_key(&id) {
                    vec![self.field_id(&id, Some(&port))]
                } else {
                    let literal = format!("{}:{}", id, port);
                    self.declare_node(&literal);
                    let refs = self.ported.entry(id).or_default();
                    if !refs.iter().any(|(known, _)| *known == literal) {
                        refs.push((literal.clone(), port));
                    }
                    vec![literal]
                }
            }
            Endpoint::Set(members) => members.iter().map(|id| self.field_id(id, None)).collect(),
        }
    }

    /// `base.N` for a split record, or `id` unchanged
    fn field_id(&self, id: &str, port: Option<&str>) -> String {
        let Some(ports) = self.records.get(id) else {
            return id.to_string();
        };
        let index = port
            .map(|p| p.split(':').next().unwrap_or(p))
            .and_then(|p| ports.iter().position(|name| name == p))
            .unwrap_or(0);
        format!("{}.{}", id, index)
    }

    fn add_edge(&mut self, from: &str, to: &str, raw: &Attributes) {
        let dir = raw
            .get("dir")
            .map(|d| d.to_ascii_lowercase())
            .unwrap_or_else(|| if self.directed { "forward" } else { "none" }.to_string());
        let (from, to) = if dir == "back" { (to, from) } else { (from, to) };

        if self.strict
            && (self.graph.has_edge(from, to) || (!self.directed && self.graph.has_edge(to, from)))
        {
            trace!(edge_from = %from, edge_to = %to, "Skipping duplicate edge in strict graph");
            return;
        }

        let attributes = remap(Target::Edge, raw);
        let group = self.groups.last().copied();
        let edge = self.graph.add_edge(from, to);
        match dir.as_str() {
            "none" => {
                edge.right = "--".to_string();
                edge.undirected = true;
            }
            "both" => {
                edge.left = "<--".to_string();
                edge.bidirectional = true;
            }
            _ => {}
        }
        let index = self.graph.edge_count() - 1;
        self.graph.apply_edge_attributes(index, &attributes);
        self.graph.set_edge_group(index, group);
    }

    // ---------------------------------------------------------------------
    // nodes

    /// Create `id` with the scoped defaults if new, and register it with the
    /// innermost group and every open node set
    fn declare_node(&mut self, id: &str) {
        for set in &mut self.sets {
            set.insert(id.to_string());
        }
        if self.records.contains_key(id) {
            return;
        }
        if !self.graph.has_node(id) {
            let defaults = self.scopes.last().map(|s| s.node.clone()).unwrap_or_default();
            let attributes = self.node_attributes(id, &defaults);
            self.graph.add_node(id);
            self.graph.apply_node_attributes(id, &attributes);
        }
        if let Some(&group) = self.groups.last() {
            self.graph.add_to_group(id, group);
        }
    }

    /// Remapped node attributes with `\N` and `\G` expanded in the label
    ///
    /// The `rect` implied by `style=filled` never replaces a shape the node
    /// already has, just as it yields to `shape` in the same list.
    fn node_attributes(&self, id: &str, raw: &Attributes) -> Attributes {
        let mut attributes = remap(Target::Node, raw);
        let has_shape = self
            .graph
            .node(id)
            .is_some_and(|n| n.attribute("shape").is_some());
        let implied = !raw.contains_key("shape")
            && attributes.get("shape").map(String::as_str) == Some("rect");
        if has_shape && implied {
            attributes.shift_remove("shape");
        }
        if let Some(label) = attributes.get_mut("label") {
            *label = label.replace("\\N", id).replace("\\G", &self.name);
        }
        attributes
    }

    /// Apply attributes to a node, or to every field of a split record
    fn apply_node(&mut self, id: &str, attributes: &Attributes) {
        match self.records.get(id) {
            Some(ports) => {
                let shared: Attributes = attributes
                    .iter()
                    .filter(|(key, _)| key.as_str() != "shape" && key.as_str() != "label")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                for index in 0..ports.len() {
                    let field = format!("{}.{}", id, index);
                    self.graph.apply_node_attributes(&field, &shared);
                }
            }
            None => self.graph.apply_node_attributes(id, attributes),
        }
    }

    /// Split `id` if it is a record with a multi-field label
    fn check_record(&mut self, id: &str) {
        let is_record = self
            .graph
            .node(id)
            .is_some_and(|n| n.attribute("shape") == Some("record") && is_split_label(&n.label));
        if is_record {
            if let Some(ports) = autosplit(self.graph, id) {
                self.records.insert(id.to_string(), ports);
                self.resolve_ported(id);
            }
        }
    }

    /// Move edges from `id:port` literals onto the fields of the split record
    fn resolve_ported(&mut self, id: &str) {
        let Some(refs) = self.ported.remove(id) else {
            return;
        };
        for (literal, port) in refs {
            let field = self.field_id(id, Some(&port));
            let moved = self.graph.retarget_edges(&literal, &field);
            debug!(literal = %literal, field = %field, moved, "Resolved port reference");
            for set in &mut self.sets {
                if set.shift_remove(&literal) {
                    set.insert(field.clone());
                }
            }
            let referenced = self
                .graph
                .edges()
                .any(|e| e.from == literal || e.to == literal);
            if !referenced {
                self.graph.remove_node(&literal);
            }
        }
    }

    /// Settle records that never received a multi-field label
    fn finish(&mut self) {
        let records: Vec<String> = self
            .graph
            .nodes()
            .filter(|n| n.attribute("shape") == Some("record"))
            .map(|n| n.id.clone())
            .collect();
        for id in records {
            self.check_record(&id);
            if let Some(node) = self.graph.node_mut(&id) {
                node.set_attribute("shape", "rect");
            }
        }
    }
}

fn is_keyword(kind: Option<&TokenKind>, keyword: &str) -> bool {
    matches!(kind, Some(TokenKind::Id(word)) if word.eq_ignore_ascii_case(keyword))
}
