//! Core error types for graph parsing
//!
//! Every parser reports failures as a [`ParseError`] carrying the position of
//! the offending input. [`GraphError`] wraps it together with the failures
//! that can happen around a parse (I/O, unknown format names).

use std::fmt;
use thiserror::Error;

/// A 1-based line/column location in the parsed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of a byte offset inside `text`, counting from line 1, column 1
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self { line, column }
    }

    /// Rebase a position that is relative to a span starting at `origin`
    pub fn relative_to(self, origin: Position) -> Self {
        if self.line <= 1 {
            Self {
                line: origin.line,
                column: origin.column + self.column.saturating_sub(1),
            }
        } else {
            Self {
                line: origin.line + self.line - 1,
                column: self.column,
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Failures raised while parsing any of the supported formats
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unterminated block: '{opener}' opened at {position} is never closed")]
    UnterminatedBlock { opener: char, position: Position },

    #[error("Unexpected token '{found}' at {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: Position,
    },

    #[error("Unexpected character '{found}' at {position}")]
    UnexpectedCharacter { found: char, position: Position },

    #[error("Edge from '{from}' at {position} never receives a target node")]
    DanglingEdge { from: String, position: Position },

    #[error("Group close ')' at {position} has no open group")]
    UnmatchedGroupClose { position: Position },

    #[error("{count} group(s) still open at end of input, innermost '{name}' opened at {position}")]
    UnclosedGroup {
        name: String,
        count: usize,
        position: Position,
    },

    #[error("Missing required field '{field}' in {block} block at {position}")]
    MissingRequiredField {
        block: &'static str,
        field: &'static str,
        position: Position,
    },

    #[error("No edge operator in '{text}' at {position}")]
    MissingEdgeOperator { text: String, position: Position },

    #[error("Nesting deeper than {limit} levels at {position}")]
    NestingTooDeep { limit: usize, position: Position },
}

impl ParseError {
    /// Create an unexpected-token error
    pub fn unexpected(
        found: impl Into<String>,
        expected: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            position,
        }
    }

    /// Location the error refers to
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedBlock { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::UnexpectedCharacter { position, .. }
            | Self::DanglingEdge { position, .. }
            | Self::UnmatchedGroupClose { position }
            | Self::UnclosedGroup { position, .. }
            | Self::MissingRequiredField { position, .. }
            | Self::MissingEdgeOperator { position, .. }
            | Self::NestingTooDeep { position, .. } => *position,
        }
    }

    /// Rebase the error's position onto the span that started at `origin`
    pub fn relative_to(self, origin: Position) -> Self {
        self.map_position(|position| position.relative_to(origin))
    }

    /// Replace the error's position with `f` applied to it
    pub fn map_position(mut self, f: impl FnOnce(Position) -> Position) -> Self {
        let mapped = f(self.position());
        match &mut self {
            Self::UnterminatedBlock { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::UnexpectedCharacter { position, .. }
            | Self::DanglingEdge { position, .. }
            | Self::UnmatchedGroupClose { position }
            | Self::UnclosedGroup { position, .. }
            | Self::MissingRequiredField { position, .. }
            | Self::MissingEdgeOperator { position, .. }
            | Self::NestingTooDeep { position, .. } => *position = mapped,
        }
        self
    }
}

/// Crate-level error for the parse entry points
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Unknown input format: {name}")]
    UnknownFormat { name: String },
}
