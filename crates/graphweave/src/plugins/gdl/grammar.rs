//! GDL/VCG block grammar
//!
//! Reads the nested `key: value` structure with chumsky. Nothing here knows
//! what the keys mean; the parser walks the resulting tree.

use chumsky::prelude::*;

use crate::core::chumsky_utils::{inline_whitespace, padding, quoted_string, to_parse_error, Extra};
use crate::core::{ParseError, Position};

/// A field value: plain text or a nested block
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Value {
    Text(String),
    Block(Vec<Entry>),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Entry {
    pub key: String,
    pub value: Value,
    /// Byte offset of the key
    pub offset: usize,
}

fn field_name<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
                .repeated(),
        )
        .to_slice()
        .map(|name: &str| name.to_string())
        .labelled("field name")
}

fn bare_value<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    none_of(" \t\r\n;{}\"")
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|value: &str| value.to_string())
        .labelled("value")
}

/// `{ key[:] value ... }` with values that may be blocks themselves
fn block<'src>() -> impl Parser<'src, &'src str, Vec<Entry>, Extra<'src>> + Clone {
    recursive(|block| {
        let value = choice((
            block.map(Value::Block),
            quoted_string().map(Value::Text),
            bare_value().map(Value::Text),
        ));

        let entry = field_name()
            .then_ignore(inline_whitespace())
            .then_ignore(just(':').or_not())
            .then_ignore(padding())
            .then(value)
            .map_with(|(key, value), e| Entry {
                key,
                value,
                offset: e.span().start,
            });

        entry
            .then_ignore(padding())
            .then_ignore(just(';').or_not())
            .then_ignore(padding())
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(just('{').then(padding()), just('}'))
            .labelled("block")
    })
}

/// `graph[:] { ... }` surrounded by comments and whitespace
fn document<'src>() -> impl Parser<'src, &'src str, Vec<Entry>, Extra<'src>> + Clone {
    padding()
        .ignore_then(just("graph"))
        .ignore_then(inline_whitespace())
        .ignore_then(just(':').or_not())
        .ignore_then(padding())
        .ignore_then(block())
        .then_ignore(padding())
        .then_ignore(end())
}

/// Check brace balance and depth before handing the text to the grammar
///
/// `limit` counts blocks nested inside the outer graph block.
pub(super) fn scan_blocks(input: &str, limit: usize) -> Result<(), ParseError> {
    let mut open: Vec<usize> = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => {
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '\\' {
                        chars.next();
                    } else if c == '"' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ParseError::UnterminatedBlock {
                        opener: '"',
                        position: Position::from_offset(input, idx),
                    });
                }
            }
            '/' if input[idx..].starts_with("//") => {
                while chars.next_if(|(_, c)| *c != '\n').is_some() {}
            }
            '/' if input[idx..].starts_with("/*") => {
                let close = input[idx + 2..].find("*/").map(|at| idx + 2 + at + 2);
                let Some(close) = close else {
                    return Err(ParseError::UnterminatedBlock {
                        opener: '/',
                        position: Position::from_offset(input, idx),
                    });
                };
                while chars.next_if(|(at, _)| *at < close).is_some() {}
            }
            '{' => {
                open.push(idx);
                if open.len() > limit + 1 {
                    return Err(ParseError::NestingTooDeep {
                        limit,
                        position: Position::from_offset(input, idx),
                    });
                }
            }
            '}' => {
                open.pop();
            }
            _ => {}
        }
    }
    match open.last() {
        Some(&idx) => Err(ParseError::UnterminatedBlock {
            opener: '{',
            position: Position::from_offset(input, idx),
        }),
        None => Ok(()),
    }
}

/// Parse a whole GDL document into its top level entries
pub(super) fn parse_document(input: &str) -> Result<Vec<Entry>, ParseError> {
    document()
        .parse(input)
        .into_result()
        .map_err(|errors| to_parse_error(input, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_grammar() {
        let entries = parse_document("graph: { title: \"T\" node { title: a } }").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "title");
        assert_eq!(entries[0].value, Value::Text("T".to_string()));
        assert!(matches!(entries[1].value, Value::Block(ref fields) if fields.len() == 1));
    }

    #[test]
    fn test_bare_values_and_semicolons() {
        let entries = parse_document("graph: { node: { title: a; width: 40; } }").unwrap();
        let Value::Block(fields) = &entries[0].value else {
            panic!("expected a block");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].key, "width");
        assert_eq!(fields[1].value, Value::Text("40".to_string()));
    }

    #[test]
    fn test_scan_blocks() {
        assert!(scan_blocks("graph: { a: \"}\" }", 4).is_ok());
        assert!(scan_blocks("graph: { // }\n }", 4).is_ok());
        assert!(matches!(
            scan_blocks("graph: { /* open", 4),
            Err(ParseError::UnterminatedBlock { opener: '/', .. })
        ));
        assert!(matches!(
            scan_blocks("graph: { node: {", 4),
            Err(ParseError::UnterminatedBlock { opener: '{', .. })
        ));
    }
}
