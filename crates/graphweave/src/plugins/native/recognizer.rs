//! Statement recognizers for the native diagram language
//!
//! A logical line is classified by trying each recognizer in a fixed order;
//! the first one to claim the line decides its [`Statement`] kind. Scope
//! statements (`node, .red { color: red }`) are parsed with chumsky, the
//! same grammar also serves every `{ key: value; ... }` attribute block.

use chumsky::prelude::*;
use tracing::trace;

use crate::core::chumsky_utils::{optional_whitespace, to_parse_error, Extra};
use crate::core::{Attributes, ElementKind, ParseError, Position, Selector};

/// What a logical line turned out to be
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Statement {
    /// Blank line or comment
    Ignore,
    /// A lone `{ ... }` block while an edge waits for its target
    PendingEdgeAttributes(Attributes),
    /// `)` closing the innermost open group, found at byte offset `at`
    GroupClose { at: usize },
    /// Attribute defaults for one or more selectors
    Scope {
        selectors: Vec<Selector>,
        attributes: Attributes,
    },
    /// Anything else: comma separated chains of nodes, groups and edges
    Chain,
}

type Recognizer = fn(&str, bool) -> Result<Option<Statement>, ParseError>;

/// Recognizers in priority order; `Chain` is the fallback
const RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("ignore", recognize_ignore),
    ("pending_edge_attributes", recognize_pending_attributes),
    ("group_close", recognize_group_close),
    ("scope", recognize_scope),
];

/// Classify a logical line
///
/// `edge_pending` tells whether an edge from a previous line still waits for
/// its target. Errors are positioned relative to `text`.
pub(super) fn classify(text: &str, edge_pending: bool) -> Result<Statement, ParseError> {
    for (name, recognizer) in RECOGNIZERS {
        if let Some(statement) = recognizer(text, edge_pending)? {
            trace!(recognizer = name, "Statement recognized");
            return Ok(statement);
        }
    }
    trace!(recognizer = "chain", "Statement recognized");
    Ok(Statement::Chain)
}

fn recognize_ignore(text: &str, _edge_pending: bool) -> Result<Option<Statement>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Some(Statement::Ignore));
    }
    Ok(None)
}

fn recognize_pending_attributes(
    text: &str,
    edge_pending: bool,
) -> Result<Option<Statement>, ParseError> {
    let start = text.len() - text.trim_start().len();
    if !edge_pending || !text[start..].starts_with('{') {
        return Ok(None);
    }
    let (attributes, end) = parse_attribute_block(text, start)?;
    if !text[end..].trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Statement::PendingEdgeAttributes(attributes)))
}

fn recognize_group_close(text: &str, _edge_pending: bool) -> Result<Option<Statement>, ParseError> {
    let start = text.len() - text.trim_start().len();
    if text[start..].starts_with(')') {
        return Ok(Some(Statement::GroupClose { at: start }));
    }
    Ok(None)
}

/// A line is a scope statement once a selector list (or nothing) is followed
/// by `{`; from that point on the whole line must parse as one.
fn recognize_scope(text: &str, _edge_pending: bool) -> Result<Option<Statement>, ParseError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('(') {
        return Ok(None);
    }
    if scope_header().parse(text).into_result().is_err() {
        return Ok(None);
    }
    let (selectors, attributes) = scope_statement()
        .parse(text)
        .into_result()
        .map_err(|errors| block_error(text, errors))?;
    let selectors = if selectors.is_empty() {
        vec![Selector::kind(ElementKind::Graph)]
    } else {
        selectors
    };
    Ok(Some(Statement::Scope {
        selectors,
        attributes,
    }))
}

/// True when `text` is nothing but a selector list, e.g. `node, .red`
///
/// Such a line is joined with a following line that starts with `{`.
pub(super) fn is_scope_header(text: &str) -> bool {
    optional_whitespace()
        .ignore_then(selector_list())
        .then_ignore(optional_whitespace())
        .then_ignore(end())
        .parse(text)
        .into_result()
        .is_ok()
}

/// Parse the `{ ... }` block opening at byte `open_at` of `text`
///
/// Returns the attributes and the byte offset just past the closing `}`.
pub(super) fn parse_attribute_block(
    text: &str,
    open_at: usize,
) -> Result<(Attributes, usize), ParseError> {
    let block = &text[open_at..];
    let (attributes, consumed) = attribute_block()
        .map_with(|attributes, e| {
            let span: SimpleSpan = e.span();
            (attributes, span.end)
        })
        .then_ignore(any().repeated())
        .parse(block)
        .into_result()
        .map_err(|errors| {
            block_error(block, errors).relative_to(Position::from_offset(text, open_at))
        })?;
    Ok((attributes, open_at + consumed))
}

/// Rich errors that ran off the end of the input mean the block never closed
fn block_error(text: &str, errors: Vec<Rich<'_, char>>) -> ParseError {
    if errors.iter().any(|e| e.found().is_none()) {
        let open_at = text.find('{').unwrap_or(0);
        return ParseError::UnterminatedBlock {
            opener: '{',
            position: Position::from_offset(text, open_at),
        };
    }
    to_parse_error(text, errors)
}

fn scope_header<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    optional_whitespace()
        .ignore_then(selector_list().or_not())
        .then_ignore(optional_whitespace())
        .then_ignore(just('{'))
        .then_ignore(any().repeated())
        .ignored()
}

fn scope_statement<'src>(
) -> impl Parser<'src, &'src str, (Vec<Selector>, Attributes), Extra<'src>> + Clone {
    optional_whitespace()
        .ignore_then(selector_list().or_not().map(Option::unwrap_or_default))
        .then_ignore(optional_whitespace())
        .then(attribute_block())
        .then_ignore(optional_whitespace())
        .then_ignore(end())
}

fn class_name<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || *c == '_' || *c == '-')
                .repeated(),
        )
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("class name")
}

fn element_kind<'src>() -> impl Parser<'src, &'src str, ElementKind, Extra<'src>> + Clone {
    choice((
        just("graph").to(ElementKind::Graph),
        just("node").to(ElementKind::Node),
        just("edge").to(ElementKind::Edge),
        just("group").to(ElementKind::Group),
    ))
}

/// `.class`, `kind` or `kind.class`
fn selector<'src>() -> impl Parser<'src, &'src str, Selector, Extra<'src>> + Clone {
    let class = just('.').ignore_then(class_name());
    element_kind()
        .then(class.clone().or_not())
        .map(|(kind, class)| Selector {
            kind: Some(kind),
            class,
        })
        .or(class.map(|name| Selector::class(name)))
        .labelled("selector")
}

fn selector_list<'src>() -> impl Parser<'src, &'src str, Vec<Selector>, Extra<'src>> + Clone {
    selector()
        .separated_by(just(',').padded_by(optional_whitespace()))
        .at_least(1)
        .collect()
}

/// `{ key: value; ... }`
///
/// Values run to the next unescaped `;` or `}`. Escaped delimiters lose their
/// backslash, other escapes (`\n`) are kept for the renderers.
fn attribute_block<'src>() -> impl Parser<'src, &'src str, Attributes, Extra<'src>> + Clone {
    let escape = just('\\').ignore_then(any()).map(|c: char| {
        if "{}[]();:|,#\\".contains(c) {
            c.to_string()
        } else {
            format!("\\{}", c)
        }
    });
    let value = escape
        .or(none_of(";}\\").map(|c: char| c.to_string()))
        .repeated()
        .collect::<Vec<String>>()
        .map(|parts| parts.concat().trim().to_string());

    let key = none_of(":;{}\\ \t\r\n")
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("attribute name");

    let entry = optional_whitespace()
        .ignore_then(
            key.then_ignore(optional_whitespace())
                .then_ignore(just(':'))
                .then(value)
                .or_not(),
        )
        .then_ignore(optional_whitespace());

    entry
        .separated_by(just(';'))
        .collect::<Vec<Option<(String, String)>>>()
        .delimited_by(just('{'), just('}'))
        .map(|entries| entries.into_iter().flatten().collect::<Attributes>())
}
