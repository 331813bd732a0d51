//! Shared chumsky parser utilities
//!
//! Combinators used by the chumsky-based grammars (native scope statements,
//! GDL blocks), plus the conversion from chumsky's rich errors into
//! [`ParseError`].

use chumsky::error::RichReason;
use chumsky::prelude::*;

use super::{ParseError, Position};

/// Extra state used by every grammar: rich errors carrying spans
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Parse optional whitespace including newlines.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\n\r").repeated().ignored()
}

/// Parse inline whitespace only (spaces and tabs, no newlines).
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse a `//` comment up to (not including) the end of the line.
pub fn line_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just("//").ignore_then(none_of('\n').repeated()).ignored()
}

/// Parse a `/* ... */` comment.
pub fn block_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just("/*")
        .then(any().and_is(just("*/").not()).repeated())
        .then(just("*/"))
        .ignored()
}

/// Parse any interleaving of whitespace and C-style comments.
pub fn padding<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\n\r")
        .ignored()
        .or(line_comment())
        .or(block_comment())
        .repeated()
        .ignored()
}

/// Parse a double-quoted string.
///
/// `\"` becomes a plain quote; every other escape is kept verbatim so later
/// stages can interpret it.
pub fn quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let escaped_quote = just('\\').ignore_then(just('"')).map(|_| "\"".to_string());
    let other_escape = just('\\')
        .then(any())
        .map(|(slash, ch): (char, char)| format!("{}{}", slash, ch));
    let plain = none_of("\\\"").map(|c: char| c.to_string());

    escaped_quote
        .or(other_escape)
        .or(plain)
        .repeated()
        .collect::<Vec<String>>()
        .map(|parts| parts.concat())
        .delimited_by(just('"'), just('"'))
        .labelled("quoted string")
}

/// Convert the first chumsky error into a [`ParseError`] positioned in `text`
pub fn to_parse_error(text: &str, errors: Vec<Rich<'_, char>>) -> ParseError {
    let Some(error) = errors.into_iter().next() else {
        return ParseError::unexpected("end of input", "a statement", Position::from_offset(text, 0));
    };
    let position = Position::from_offset(text, error.span().start);

    if let RichReason::Custom(message) = error.reason() {
        return ParseError::unexpected(
            text.get(error.span().start..error.span().end)
                .unwrap_or_default(),
            message.to_string(),
            position,
        );
    }

    let expected = error
        .expected()
        .map(|pattern| pattern.to_string())
        .collect::<Vec<_>>();
    let expected = if expected.is_empty() {
        "something else".to_string()
    } else {
        expected.join(" or ")
    };

    match error.found() {
        Some(found) => ParseError::UnexpectedCharacter {
            found: *found,
            position,
        },
        None => ParseError::unexpected("end of input", expected, position),
    }
}
