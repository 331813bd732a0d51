//! Native diagram language parser
//!
//! Parses `[ node ] -> [ node ]` chains, `( group ... )` literals and
//! `selector { key: value }` scope statements into the shared [`Graph`].
//!
//! State carried between logical lines lives in [`ChainBuilder`]: the stack
//! of open groups, the last node of the previous chain, and an
//! [`EdgeState`] holding an edge whose target has not been seen yet.

use tracing::{debug, info, span, trace, Level};

use super::lines::{logical_lines, LogicalLine};
use super::recognizer::{classify, parse_attribute_block, Statement};
use crate::core::scanner::{find_closing, find_top_level, split_top_level, unescape};
use crate::core::{Attributes, Graph, GroupId, ParseConfig, ParseError, Parser, Position};

/// Characters an edge operator is built from
const OPERATOR_CHARS: &str = "-.=~<>";

/// Native diagram language parser
pub struct NativeParser {
    config: ParseConfig,
}

impl NativeParser {
    pub fn new() -> Self {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }
}

impl Default for NativeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for NativeParser {
    fn parse(&self, input: &str, graph: &mut Graph) -> Result<(), ParseError> {
        let parse_span = span!(Level::INFO, "parse_native", input_len = input.len());
        let _enter = parse_span.enter();

        trace!("Starting native diagram parsing");

        let lines = logical_lines(input);
        debug!(logical_lines = lines.len(), "Assembled logical lines");

        let mut builder = ChainBuilder::new(graph, self.config);
        for line in &lines {
            builder.statement(line)?;
        }
        builder.finish()?;

        info!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            group_count = graph.group_count(),
            "Native diagram parsed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "txt"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input.contains('[') && input.contains(']')
    }
}

/// Operators, label and attributes written between two elements
#[derive(Debug, Clone, PartialEq)]
struct EdgeSpec {
    left: String,
    right: String,
    label: String,
    attributes: Attributes,
}

impl EdgeSpec {
    /// Line style implied by the operator body
    fn style(&self) -> Option<&'static str> {
        let body = self.right.trim_matches(|c| c == '<' || c == '>');
        if body.contains('~') {
            Some("wave")
        } else if body.contains("..-") {
            Some("dot-dot-dash")
        } else if body.contains(".-") {
            Some("dot-dash")
        } else if body.contains('.') {
            Some("dotted")
        } else if body.contains('=') {
            Some("double")
        } else {
            None
        }
    }

    fn points_left(&self) -> bool {
        self.left.starts_with('<')
    }

    fn points_right(&self) -> bool {
        self.right.ends_with('>')
    }
}

/// An edge whose source and operator are known but whose target is not
#[derive(Debug, Clone, PartialEq)]
struct PendingEdge {
    from: String,
    spec: EdgeSpec,
    position: Position,
}

/// Edge state machine: idle, or waiting for the next node as target
#[derive(Debug, Clone, PartialEq, Default)]
enum EdgeState {
    #[default]
    Idle,
    Pending(PendingEdge),
}

#[derive(Debug, Clone)]
struct OpenGroup {
    id: GroupId,
    name: String,
    /// Last node added to this group or any group nested in it
    representative: Option<String>,
    position: Position,
}

struct ChainBuilder<'g> {
    graph: &'g mut Graph,
    config: ParseConfig,
    groups: Vec<OpenGroup>,
    edge: EdgeState,
    last_node: Option<String>,
}

impl<'g> ChainBuilder<'g> {
    fn new(graph: &'g mut Graph, config: ParseConfig) -> Self {
        Self {
            graph,
            config,
            groups: Vec::new(),
            edge: EdgeState::Idle,
            last_node: None,
        }
    }

    fn statement(&mut self, line: &LogicalLine) -> Result<(), ParseError> {
        let pending = matches!(self.edge, EdgeState::Pending(_));
        let statement =
            classify(&line.text, pending).map_err(|e| line.locate(e))?;
        trace!(line = line.origin.line, text = %line.text, ?statement, "Parsing statement");

        match statement {
            Statement::Ignore => {}
            Statement::PendingEdgeAttributes(attributes) => {
                if let EdgeState::Pending(pending) = &mut self.edge {
                    pending.spec.attributes.extend(attributes);
                }
            }
            Statement::GroupClose { at } => {
                self.fragments(line, at, line.text.len())?;
            }
            Statement::Scope {
                selectors,
                attributes,
            } => {
                for selector in selectors {
                    self.graph.set_defaults(selector, &attributes);
                }
            }
            Statement::Chain => {
                self.fragments(line, 0, line.text.len())?;
            }
        }
        Ok(())
    }

    /// Parse the comma separated fragments of `line.text[start..end]`
    fn fragments(&mut self, line: &LogicalLine, start: usize, end: usize) -> Result<(), ParseError> {
        let mut offset = start;
        for part in split_top_level(&line.text[start..end], ',') {
            self.chain(line, offset, offset + part.len())?;
            offset += part.len() + 1;
        }
        Ok(())
    }

    /// Parse one chain of elements and edge operators
    fn chain(&mut self, line: &LogicalLine, start: usize, end: usize) -> Result<(), ParseError> {
        let text = line.text.as_str();
        let mut source: Option<String> = None;
        let mut cursor = start;

        loop {
            let next = find_top_level(&text[cursor..end], &['[', '(', ')']).map(|i| cursor + i);
            let span_end = next.unwrap_or(end);
            if !text[cursor..span_end].trim().is_empty() {
                let spec = parse_edge_spec(line, cursor, span_end)?;
                let position = line.position(cursor + leading_whitespace(&text[cursor..]));
                self.start_edge(source.take(), spec, position)?;
            }

            let Some(at) = next else { break };
            cursor = match text[at..].chars().next() {
                Some('[') => self.node_element(line, at, end, &mut source)?,
                Some('(') => self.group_element(line, at, end, &mut source)?,
                _ => self.close_group(line, at, end, &mut source)?,
            };
        }
        Ok(())
    }

    /// Put an edge in flight from `source`
    ///
    /// Without a source in the current chain the edge continues from a
    /// pending edge (whose operator it replaces) or from the last node of the
    /// previous chain.
    fn start_edge(
        &mut self,
        source: Option<String>,
        spec: EdgeSpec,
        position: Position,
    ) -> Result<(), ParseError> {
        let from = match (source, std::mem::take(&mut self.edge)) {
            (Some(source), _) => source,
            (None, EdgeState::Pending(pending)) => pending.from,
            (None, EdgeState::Idle) => self.last_node.clone().ok_or_else(|| {
                ParseError::unexpected(spec.left.clone(), "a node before the edge", position)
            })?,
        };
        trace!(from = %from, left = %spec.left, right = %spec.right, "Edge pending");
        self.edge = EdgeState::Pending(PendingEdge {
            from,
            spec,
            position,
        });
        Ok(())
    }

    fn node_element(
        &mut self,
        line: &LogicalLine,
        at: usize,
        end: usize,
        source: &mut Option<String>,
    ) -> Result<usize, ParseError> {
        let text = &line.text[..end];
        let close = find_closing(text, at).map_err(|e| line.locate(e))?;
        let inner = &text[at + 1..close];

        let id = if inner.trim().is_empty() {
            self.graph.add_anonymous_node()
        } else {
            let name = node_name(inner);
            self.graph.add_node(&name);
            name
        };

        let mut cursor = close + 1;
        if let Some((attributes, after)) = trailing_block(line, cursor, end)? {
            self.graph.apply_node_attributes(&id, &attributes);
            cursor = after;
        }

        self.enter_node(&id);
        *source = Some(id);
        Ok(cursor)
    }

    /// Register a node parsed in a chain: group membership, pending edge
    fn enter_node(&mut self, id: &str) {
        if let Some(innermost) = self.groups.last() {
            self.graph.add_to_group(id, innermost.id);
        }
        for group in &mut self.groups {
            group.representative = Some(id.to_string());
        }
        if let EdgeState::Pending(pending) = std::mem::take(&mut self.edge) {
            self.add_edge(&pending.from, id, &pending.spec);
        }
        self.last_node = Some(id.to_string());
    }

    fn add_edge(&mut self, from: &str, to: &str, spec: &EdgeSpec) {
        let group = self.groups.last().map(|g| g.id);
        let edge = self.graph.add_edge(from, to);
        edge.left = spec.left.clone();
        edge.right = spec.right.clone();
        if !spec.label.is_empty() {
            edge.label = spec.label.clone();
        }
        edge.undirected = !spec.points_left() && !spec.points_right();
        edge.bidirectional = spec.points_left() && spec.points_right();
        edge.group = group;
        if let Some(style) = spec.style() {
            edge.set_attribute("style", style);
        }
        let index = self.graph.edge_count() - 1;
        self.graph.apply_edge_attributes(index, &spec.attributes);
    }

    /// `( name content )`, or an opening `(` whose `)` comes on a later line
    fn group_element(
        &mut self,
        line: &LogicalLine,
        at: usize,
        end: usize,
        source: &mut Option<String>,
    ) -> Result<usize, ParseError> {
        let position = line.position(at);
        if self.groups.len() >= self.config.max_nesting {
            return Err(ParseError::NestingTooDeep {
                limit: self.config.max_nesting,
                position,
            });
        }

        let text = line.text.as_str();
        let (content_end, closed) = match find_closing(&text[..end], at) {
            Ok(close) => (close, true),
            Err(ParseError::UnterminatedBlock { .. }) => (end, false),
            Err(e) => return Err(line.locate(e)),
        };

        let content_start = at + 1;
        let name_end = find_top_level(&text[content_start..content_end], &['[', '(', ')'])
            .map_or(content_end, |i| content_start + i);
        let name = node_name(text[content_start..name_end].trim().trim_end_matches(':'));

        let parent = self.groups.last().map(|g| g.id);
        let id = self.graph.add_group(&name, parent);
        trace!(group = %name, closed, "Group opened");
        self.groups.push(OpenGroup {
            id,
            name,
            representative: None,
            position,
        });

        self.fragments(line, name_end, content_end)?;

        if !closed {
            return Ok(end);
        }
        self.close_group(line, content_end, end, source)
    }

    /// Close the innermost group at the `)` found at byte `at`
    fn close_group(
        &mut self,
        line: &LogicalLine,
        at: usize,
        end: usize,
        source: &mut Option<String>,
    ) -> Result<usize, ParseError> {
        let group = self
            .groups
            .pop()
            .ok_or_else(|| ParseError::UnmatchedGroupClose {
                position: line.position(at),
            })?;
        trace!(group = %group.name, "Group closed");

        let mut cursor = at + 1;
        if let Some((attributes, after)) = trailing_block(line, cursor, end)? {
            self.graph.apply_group_attributes(group.id, &attributes);
            cursor = after;
        }

        if let Some(representative) = group.representative {
            self.last_node = Some(representative.clone());
            *source = Some(representative);
        }
        Ok(cursor)
    }

    /// Fail on a dangling edge or groups still open at end of input
    fn finish(self) -> Result<(), ParseError> {
        if let EdgeState::Pending(pending) = self.edge {
            return Err(ParseError::DanglingEdge {
                from: pending.from,
                position: pending.position,
            });
        }
        if let Some(innermost) = self.groups.last() {
            return Err(ParseError::UnclosedGroup {
                name: innermost.name.clone(),
                count: self.groups.len(),
                position: innermost.position,
            });
        }
        Ok(())
    }
}

/// An attribute block following an element, possibly after whitespace
fn trailing_block(
    line: &LogicalLine,
    cursor: usize,
    end: usize,
) -> Result<Option<(Attributes, usize)>, ParseError> {
    let text = &line.text[..end];
    let open = cursor + leading_whitespace(&text[cursor..]);
    if !text[open..].starts_with('{') {
        return Ok(None);
    }
    parse_attribute_block(text, open)
        .map(Some)
        .map_err(|e| line.locate(e))
}

/// Parse the operator span `line.text[start..end]`
///
/// Attribute blocks are lifted out; the remaining words are
/// `left-op [label words] right-op`, or a single operator used for both ends.
fn parse_edge_spec(line: &LogicalLine, start: usize, end: usize) -> Result<EdgeSpec, ParseError> {
    let text = &line.text[..end];
    let mut attributes = Attributes::new();
    let mut words = String::new();
    let mut cursor = start;

    while let Some(offset) = find_top_level(&text[cursor..], &['{']) {
        let open = cursor + offset;
        words.push_str(&text[cursor..open]);
        words.push(' ');
        let (block, after) =
            parse_attribute_block(text, open).map_err(|e| line.locate(e))?;
        attributes.extend(block);
        cursor = after;
    }
    words.push_str(&text[cursor..]);

    let missing = || ParseError::MissingEdgeOperator {
        text: text[start..].trim().to_string(),
        position: line.position(start + leading_whitespace(&text[start..])),
    };

    let tokens: Vec<&str> = words.split_whitespace().collect();
    let (left, label, right) = match tokens.as_slice() {
        [] => return Err(missing()),
        [only] => (*only, String::new(), *only),
        [first, middle @ .., last] => (*first, middle.join(" "), *last),
    };
    if !is_operator(left) || !is_operator(right) {
        return Err(missing());
    }

    Ok(EdgeSpec {
        left: left.to_string(),
        right: right.to_string(),
        label,
        attributes,
    })
}

fn is_operator(token: &str) -> bool {
    token.chars().all(|c| OPERATOR_CHARS.contains(c))
        && token.chars().any(|c| c != '<' && c != '>')
}

/// Node names drop escapes and collapse whitespace runs
fn node_name(raw: &str) -> String {
    unescape(raw).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Graph, ParseError> {
        let mut graph = Graph::new();
        NativeParser::new().parse(input, &mut graph)?;
        Ok(graph)
    }

    #[test]
    fn test_simple_chain() {
        let graph = parse("[ A ] -> [ B ] -> [ C ]").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert!(graph.has_edge("A", "B"));
        assert!(graph.has_edge("B", "C"));
        let edge = graph.edge(0).unwrap();
        assert_eq!(edge.left, "->");
        assert_eq!(edge.right, "->");
        assert!(!edge.undirected);
    }

    #[test]
    fn test_edge_label_and_operators() {
        let graph = parse("[ A ] -- goes to --> [ B ]").unwrap();
        let edge = graph.edge(0).unwrap();
        assert_eq!(edge.left, "--");
        assert_eq!(edge.right, "-->");
        assert_eq!(edge.label, "goes to");
    }

    #[test]
    fn test_edge_styles() {
        let graph = parse("[ A ] ==> [ B ]\n[ A ] ..> [ C ]\n[ A ] ~~> [ D ]\n[ A ] --> [ E ]")
            .unwrap();
        let styles: Vec<_> = graph.edges().map(|e| e.attribute("style")).collect();
        assert_eq!(
            styles,
            vec![Some("double"), Some("dotted"), Some("wave"), None]
        );
    }

    #[test]
    fn test_edge_direction_flags() {
        let graph = parse("[ A ] -- [ B ]\n[ A ] <--> [ C ]").unwrap();
        assert!(graph.edge(0).unwrap().undirected);
        assert!(graph.edge(1).unwrap().bidirectional);
        assert!(!graph.edge(1).unwrap().undirected);
    }

    #[test]
    fn test_node_attributes() {
        let graph = parse("[ A ] { color: red; label: Alpha } -> [ B ]").unwrap();
        let a = graph.node("A").unwrap();
        assert_eq!(a.attribute("color"), Some("red"));
        assert_eq!(a.label, "Alpha");
        assert!(graph.has_edge("A", "B"));
    }

    #[test]
    fn test_edge_attributes_in_span() {
        let graph = parse("[ A ] -> { color: blue } [ B ]").unwrap();
        assert_eq!(graph.edge(0).unwrap().attribute("color"), Some("blue"));
    }

    #[test]
    fn test_pending_edge_across_lines() {
        let graph = parse("[ A ] ->\n{ label: later }\n[ B ]").unwrap();
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge(0).unwrap();
        assert_eq!((edge.from.as_str(), edge.to.as_str()), ("A", "B"));
        assert_eq!(edge.label, "later");
    }

    #[test]
    fn test_dangling_edge() {
        let err = parse("[ A ] ->").unwrap_err();
        assert!(matches!(err, ParseError::DanglingEdge { ref from, .. } if from == "A"));
        assert_eq!(err.position(), Position::new(1, 7));
    }

    #[test]
    fn test_edge_continuation_line() {
        let graph = parse("[ A ] -> [ B ]\n  -> [ C ]").unwrap();
        assert!(graph.has_edge("B", "C"));
    }

    #[test]
    fn test_comma_fragments_are_independent() {
        let graph = parse("[ A ] -> [ B ], [ C ] -> [ D ]").unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge("A", "B"));
        assert!(graph.has_edge("C", "D"));
    }

    #[test]
    fn test_nested_groups() {
        let graph = parse("( G1 [ A ] ( G2 [ B ] ) )").unwrap();
        let g1 = graph.group_by_name("G1").unwrap();
        let g2 = graph.group_by_name("G2").unwrap();
        assert_eq!(g2.parent, Some(g1.id));
        assert_eq!(g1.children, vec![g2.id]);
        assert!(g1.members.contains("A"));
        assert!(g2.members.contains("B"));
        assert!(!g1.members.contains("B"));
    }

    #[test]
    fn test_group_representative_chains() {
        let graph = parse("[ X ] -> ( G [ A ] [ B ] ) -> [ C ]").unwrap();
        assert!(graph.has_edge("X", "A"));
        assert!(graph.has_edge("B", "C"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_empty_group_keeps_pending_edge() {
        let graph = parse("[ X ] -> ( Empty ) -> [ C ]").unwrap();
        assert!(graph.has_edge("X", "C"));
        assert_eq!(graph.group_count(), 1);
    }

    #[test]
    fn test_multi_line_group() {
        let input = "( Cluster:\n[ A ] -> [ B ]\n) { color: blue } -> [ C ]";
        let graph = parse(input).unwrap();
        let group = graph.group_by_name("Cluster").unwrap();
        assert!(group.members.contains("A"));
        assert!(group.members.contains("B"));
        assert!(!group.members.contains("C"));
        assert_eq!(group.attribute("color"), Some("blue"));
        assert!(graph.has_edge("B", "C"));
        assert_eq!(graph.edges().find(|e| e.to == "B").unwrap().group, Some(group.id));
    }

    #[test]
    fn test_unmatched_group_close() {
        let err = parse("[ A ]\n)").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnmatchedGroupClose {
                position: Position::new(2, 1)
            }
        );
    }

    #[test]
    fn test_unclosed_group() {
        let err = parse("( G\n[ A ]").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedGroup { ref name, count: 1, .. } if name == "G"));
    }

    #[test]
    fn test_nesting_limit() {
        let parser = NativeParser::with_config(ParseConfig::new().with_max_nesting(2));
        let mut graph = Graph::new();
        let err = parser
            .parse("( a ( b ( c [ X ] ) ) )", &mut graph)
            .unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: 2, .. }));
    }

    #[test]
    fn test_missing_edge_operator() {
        let err = parse("[ A ] goes [ B ]").unwrap_err();
        assert!(matches!(err, ParseError::MissingEdgeOperator { ref text, .. } if text == "goes"));
    }

    #[test]
    fn test_unterminated_node() {
        let err = parse("[ A ] -> [ B").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedBlock { opener: '[', .. }));
        assert_eq!(err.position(), Position::new(1, 10));
    }

    #[test]
    fn test_error_on_joined_line() {
        let err = parse("[ A ] {\n  color: red;\n} -> [ B").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedBlock { opener: '[', .. }));
        assert_eq!(err.position(), Position::new(3, 6));
    }

    #[test]
    fn test_anonymous_nodes() {
        let graph = parse("[ ] -> [ ]").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.has_edge("#0", "#1"));
        assert_eq!(graph.node("#0").unwrap().attribute("anonymous"), Some("true"));
    }

    #[test]
    fn test_node_names_collapse_whitespace() {
        let graph = parse("[  New   York ] -> [ a\\]b ]").unwrap();
        assert!(graph.has_node("New York"));
        assert!(graph.has_node("a]b"));
    }

    #[test]
    fn test_scope_defaults_and_classes() {
        let input = "node { color: gray }\n.hot { fill: red }\n[ A ]\n[ B ] { class: hot }";
        let graph = parse(input).unwrap();
        assert_eq!(graph.node("A").unwrap().attribute("color"), Some("gray"));
        let b = graph.node("B").unwrap();
        assert_eq!(b.attribute("fill"), Some("red"));
        assert_eq!(b.attribute("class"), Some("hot"));
    }

    #[test]
    fn test_graph_scope() {
        let graph = parse("graph { flow: east; label: Map }\n[ A ]").unwrap();
        assert_eq!(graph.attribute("flow"), Some("east"));
        assert_eq!(graph.attribute("label"), Some("Map"));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let graph = parse("# header\n\n[ A ] -> [ B ] # trailing\n").unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_adjacent_nodes_create_no_edge() {
        let graph = parse("[ A ] [ B ]").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_idempotent_nodes() {
        let graph = parse("[ A ] -> [ B ]\n[ A ] -> [ C ]").unwrap();
        assert_eq!(graph.node_count(), 3);
        let ids: Vec<_> = graph.node_ids().collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }
}
