//! DOT tokenizer
//!
//! Turns DOT source into a flat token stream. Comments, preprocessor lines
//! and backslash-newline continuations are dropped here so the grammar only
//! sees punctuation, the two edge operators and the four ID flavours.

use crate::core::{ParseError, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Semi,
    Equals,
    Comma,
    Colon,
    Plus,
    /// `->`
    Arrow,
    /// `--`
    Line,
    Id(String),
    Numeral(String),
    /// Quoted string with `\"` unescaped and continuations removed
    Quoted(String),
    /// `<...>` kept verbatim, angle brackets included
    Html(String),
}

impl TokenKind {
    /// Text used when reporting the token in an error
    pub(super) fn describe(&self) -> String {
        match self {
            TokenKind::LBrace => "{".to_string(),
            TokenKind::RBrace => "}".to_string(),
            TokenKind::LBracket => "[".to_string(),
            TokenKind::RBracket => "]".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::Semi => ";".to_string(),
            TokenKind::Equals => "=".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Arrow => "->".to_string(),
            TokenKind::Line => "--".to_string(),
            TokenKind::Id(s) | TokenKind::Numeral(s) | TokenKind::Html(s) => s.clone(),
            TokenKind::Quoted(s) => format!("\"{}\"", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

/// Byte offsets of every line start, for cheap offset to position lookups
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn position(&self, text: &str, offset: usize) -> Position {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line.saturating_sub(1)];
        let column = text.get(start..offset).map_or(1, |s| s.chars().count() + 1);
        Position::new(line.max(1), column)
    }
}

pub(super) struct Lexer<'input> {
    input: &'input str,
    pos: usize,
    lines: LineIndex,
}

impl<'input> Lexer<'input> {
    pub(super) fn new(input: &'input str) -> Self {
        Self {
            input,
            pos: 0,
            lines: LineIndex::new(input),
        }
    }

    /// Position just past the last character
    pub(super) fn end_position(&self) -> Position {
        self.lines.position(self.input, self.input.len())
    }

    fn position(&self, offset: usize) -> Position {
        self.lines.position(self.input, offset)
    }

    fn rest(&self) -> &'input str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn at_line_start(&self) -> bool {
        self.input[..self.pos]
            .rsplit('\n')
            .next()
            .map_or(true, |line| line.trim().is_empty())
    }

    /// Skip whitespace, comments, `#` lines and line continuations
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            if rest.starts_with("\\\n") {
                self.pos += 2;
            } else if rest.starts_with("\\\r\n") {
                self.pos += 3;
            } else if rest.starts_with("//") || (rest.starts_with('#') && self.at_line_start()) {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                let Some(close) = rest[2..].find("*/") else {
                    return Err(ParseError::UnterminatedBlock {
                        opener: '/',
                        position: self.position(self.pos),
                    });
                };
                self.pos += close + 4;
            } else if rest.starts_with(char::is_whitespace) {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    /// Tokenize the whole input
    pub(super) fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let Some(ch) = self.peek() else { break };
            let position = self.position(start);

            let kind = match ch {
                '{' | '}' | '[' | ']' | '(' | ')' | ';' | '=' | ',' | ':' | '+' => {
                    self.bump();
                    punctuation(ch)
                }
                '-' if self.rest().starts_with("->") => {
                    self.pos += 2;
                    TokenKind::Arrow
                }
                '-' if self.rest().starts_with("--") => {
                    self.pos += 2;
                    TokenKind::Line
                }
                '"' => self.quoted(position)?,
                '<' => self.html(position)?,
                c if c == '-' || c == '.' || c.is_ascii_digit() => self.numeral(position)?,
                c if is_id_start(c) => self.identifier(),
                other => {
                    return Err(ParseError::UnexpectedCharacter {
                        found: other,
                        position,
                    })
                }
            };
            tokens.push(Token { kind, position });
        }
        Ok(tokens)
    }

    fn quoted(&mut self, position: Position) -> Result<TokenKind, ParseError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnterminatedBlock {
                        opener: '"',
                        position,
                    })
                }
                Some('"') => return Ok(TokenKind::Quoted(value)),
                Some('\\') => match self.peek() {
                    Some('"') => {
                        self.bump();
                        value.push('"');
                    }
                    Some('\n') => {
                        self.bump();
                    }
                    Some('\r') if self.rest().starts_with("\r\n") => {
                        self.pos += 2;
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn html(&mut self, position: Position) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(TokenKind::Html(self.input[start..self.pos].to_string()));
                    }
                }
                _ => {}
            }
        }
        Err(ParseError::UnterminatedBlock {
            opener: '<',
            position,
        })
    }

    /// `-?(.[0-9]+ | [0-9]+(.[0-9]*)?)`; letters glued to the end start a new token
    fn numeral(&mut self, position: Position) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        let mut digits = 0;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            self.bump();
        }
        if digits == 0 {
            let found = self.input[start..].chars().next().unwrap_or('-');
            return Err(ParseError::UnexpectedCharacter { found, position });
        }
        Ok(TokenKind::Numeral(self.input[start..self.pos].to_string()))
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(is_id_continue) {
            self.bump();
        }
        TokenKind::Id(self.input[start..self.pos].to_string())
    }
}

fn punctuation(ch: char) -> TokenKind {
    match ch {
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ';' => TokenKind::Semi,
        '=' => TokenKind::Equals,
        ',' => TokenKind::Comma,
        ':' => TokenKind::Colon,
        _ => TokenKind::Plus,
    }
}

fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

/// Tokenize `input`, also returning the end-of-input position
pub(super) fn tokenize(input: &str) -> Result<(Vec<Token>, Position), ParseError> {
    let mut lexer = Lexer::new(input);
    let tokens = lexer.tokenize()?;
    Ok((tokens, lexer.end_position()))
}
