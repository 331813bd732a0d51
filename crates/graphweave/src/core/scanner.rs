//! Delimiter scanning shared by every parser
//!
//! Pure functions over a text span: matching `[`/`{`/`(` with their closers,
//! splitting on a separator only at nesting depth zero, and measuring the net
//! bracket balance of a line. A backslash makes the following character
//! literal in all of them.

use super::{ParseError, Position};

const ESCAPE: char = '\\';

/// The closing delimiter for a supported opener
pub fn closing_for(open: char) -> Option<char> {
    match open {
        '[' => Some(']'),
        '{' => Some('}'),
        '(' => Some(')'),
        _ => None,
    }
}

/// Byte index of the delimiter closing the opener at `open_at`
///
/// Only delimiters of the same kind count towards nesting, so `[ a{b ]`
/// closes at the `]`.
pub fn find_closing(text: &str, open_at: usize) -> Result<usize, ParseError> {
    let position = Position::from_offset(text, open_at);
    let open = text[open_at..]
        .chars()
        .next()
        .ok_or(ParseError::UnterminatedBlock {
            opener: '?',
            position,
        })?;
    let Some(close) = closing_for(open) else {
        return Err(ParseError::UnexpectedCharacter {
            found: open,
            position,
        });
    };

    let mut depth = 0usize;
    let mut escaped = false;
    for (idx, ch) in text[open_at..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == ESCAPE {
            escaped = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Ok(open_at + idx);
            }
        }
    }

    Err(ParseError::UnterminatedBlock {
        opener: open,
        position,
    })
}

/// Split `text` at every `separator` that sits outside `[]`, `{}` and `()`
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            ESCAPE => escaped = true,
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = (depth - 1).max(0),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Net `[`/`{` nesting left open by `text`
///
/// Positive when the line opened more brackets or braces than it closed.
pub fn nesting_depth(text: &str) -> i32 {
    let mut depth = 0;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            ESCAPE => escaped = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Byte index of the first unescaped occurrence of any char in `targets`
/// that is not nested inside `[]`, `{}` or `()`
pub fn find_top_level(text: &str, targets: &[char]) -> Option<usize> {
    let mut depth = 0i32;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if depth == 0 && targets.contains(&ch) {
            return Some(idx);
        }
        match ch {
            ESCAPE => escaped = true,
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = (depth - 1).max(0),
            _ => {}
        }
    }
    None
}

/// Drop escape backslashes, keeping the escaped characters
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            if let Some(next) = chars.next() {
                out.push(next);
            } else {
                out.push(ch);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
