//! Logical line assembly for the native diagram language
//!
//! Physical lines are stripped of comments and joined while their brackets
//! and braces stay unbalanced, so one statement may span several lines.

use crate::core::scanner::nesting_depth;
use crate::core::{ParseError, Position};

use super::recognizer::is_scope_header;

/// One statement's worth of text, possibly joined from several lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LogicalLine {
    pub text: String,
    /// Where the first physical line of the statement starts
    pub origin: Position,
    /// Byte offset into `text` and source position of every joined line
    segments: Vec<(usize, Position)>,
}

impl LogicalLine {
    fn new(text: &str, line: usize) -> Self {
        let origin = Position::new(line, 1);
        Self {
            text: text.to_string(),
            origin,
            segments: vec![(0, origin)],
        }
    }

    /// Append physical line `line`, whose text is `raw`
    fn join(&mut self, raw: &str, line: usize) {
        let more = raw.trim();
        if more.is_empty() {
            return;
        }
        let indent = raw[..raw.len() - raw.trim_start().len()].chars().count();
        self.text.push(' ');
        self.segments
            .push((self.text.len(), Position::new(line, indent + 1)));
        self.text.push_str(more);
    }

    /// Absolute position of a byte offset into `text`
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let (start, origin) = self
            .segments
            .iter()
            .rev()
            .find(|(start, _)| *start <= offset)
            .copied()
            .unwrap_or((0, self.origin));
        Position::from_offset(&self.text[start..], offset - start).relative_to(origin)
    }

    /// Rebase an error located relative to `text` onto the source
    pub fn locate(&self, error: ParseError) -> ParseError {
        error.map_position(|position| {
            let offset = self
                .text
                .char_indices()
                .nth(position.column.saturating_sub(1))
                .map_or(self.text.len(), |(idx, _)| idx);
            self.position(offset)
        })
    }
}

/// Split `input` into logical lines
pub(super) fn logical_lines(input: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut current: Option<LogicalLine> = None;
    let mut physical = input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, strip_comment(line).trim_end()))
        .peekable();

    while let Some((number, line)) = physical.next() {
        if let Some(mut open) = current.take() {
            if line.trim() == "}" {
                open.join(line, number);
                lines.push(open);
                continue;
            }
            open.join(line, number);
            if nesting_depth(&open.text) > 0 {
                current = Some(open);
            } else {
                lines.push(open);
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        let mut logical = LogicalLine::new(line, number);
        if is_scope_header(line) {
            let next_opens_block = physical
                .peek()
                .is_some_and(|(_, next)| next.trim_start().starts_with('{'));
            if next_opens_block {
                if let Some((next_number, next)) = physical.next() {
                    logical.join(next, next_number);
                }
            }
        }

        if nesting_depth(&logical.text) > 0 {
            current = Some(logical);
        } else {
            lines.push(logical);
        }
    }

    // Unbalanced text at the end surfaces as an unterminated block later
    if let Some(open) = current {
        lines.push(open);
    }
    lines
}

/// Cut a line at its comment
///
/// A line starting with `#` is all comment. Elsewhere `#` only starts a
/// comment when it stands alone between whitespace (or line end), outside any
/// bracket, and is not escaped, so colors like `#ff0000` survive.
pub(super) fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }

    let bytes = line.as_bytes();
    let mut depth = 0i32;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = (depth - 1).max(0),
            '#' if depth == 0 => {
                let after_blank = idx > 0 && bytes[idx - 1].is_ascii_whitespace();
                let before_blank = bytes.get(idx + 1).map_or(true, |b| b.is_ascii_whitespace());
                if after_blank && before_blank {
                    return &line[..idx];
                }
            }
            _ => {}
        }
    }
    line
}
