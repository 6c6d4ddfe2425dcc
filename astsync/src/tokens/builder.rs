//! Token stream construction for fixtures and hosts without a lexer binding
//!
//! `TokenStreamBuilder` either takes tokens one at a time (positions are
//! computed from the pushed text) or tokenizes a small Python-like source
//! with `from_source`. The tokenizer is only compiled for tests and with the
//! `fixtures` feature; production units always carry the host lexer's tokens.

use super::arena::TokenArena;
use super::token::{Token, TokenKind};
use crate::utils::SourcePosition;

/// Fluent token sequence builder
pub struct TokenStreamBuilder {
    tokens: Vec<Token>,
    source: String,
    current_position: SourcePosition,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            source: String::new(),
            current_position: SourcePosition::new(1, 0),
        }
    }

    /// Add a token whose source text is `text`
    pub fn push(mut self, kind: TokenKind, text: &str) -> Self {
        let start = self.current_position;
        self.tokens
            .push(Token::new(kind, text, start.line, start.column));
        self.source.push_str(text);
        self.current_position = start.advance_str(text);
        self
    }

    /// Add source text that produces no token (spaces between tokens)
    pub fn gap(mut self, text: &str) -> Self {
        self.source.push_str(text);
        self.current_position = self.current_position.advance_str(text);
        self
    }

    pub fn name(self, text: &str) -> Self {
        self.push(TokenKind::Name, text)
    }

    pub fn op(self, text: &str) -> Self {
        self.push(TokenKind::Operator, text)
    }

    pub fn number(self, text: &str) -> Self {
        self.push(TokenKind::Number, text)
    }

    pub fn string(self, text: &str) -> Self {
        self.push(TokenKind::String, text)
    }

    pub fn comment(self, text: &str) -> Self {
        self.push(TokenKind::Comment, text)
    }

    pub fn newline(self) -> Self {
        self.push(TokenKind::Newline, "\n")
    }

    pub fn nl(self) -> Self {
        self.push(TokenKind::NonLogicalNewline, "\n")
    }

    pub fn end(self) -> Self {
        self.push(TokenKind::EndMarker, "")
    }

    pub fn build(self) -> TokenArena {
        let lines: Vec<&str> = self.source.split('\n').collect();
        let tokens = self
            .tokens
            .into_iter()
            .map(|token| {
                let line = lines
                    .get(token.line.saturating_sub(1) as usize)
                    .copied()
                    .unwrap_or("");
                token.with_source_line(line)
            })
            .collect();
        TokenArena::new(tokens)
    }

    /// Tokenize a Python-like source the way the host lexer does.
    ///
    /// Covers names, numbers, prefixed and triple-quoted strings, operators,
    /// comments, logical and non-logical newlines, indentation and the end
    /// marker. Malformed input is tokenized leniently.
    #[cfg(any(test, feature = "fixtures"))]
    pub fn from_source(source: &str) -> TokenArena {
        FixtureLexer::new(source).run()
    }
}

impl Default for TokenStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "fixtures"))]
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "->", ":=", "**", "//", "<<", ">>", "<=", ">=", "==",
    "!=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=",
];

#[cfg(any(test, feature = "fixtures"))]
fn is_string_prefix(word: &str) -> bool {
    word.len() <= 2 && word.chars().all(|c| "rRbBuUfF".contains(c))
}

#[cfg(any(test, feature = "fixtures"))]
struct FixtureLexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    depth: usize,
    indents: Vec<usize>,
    at_line_start: bool,
    line_has_tokens: bool,
    tokens: Vec<Token>,
}

#[cfg(any(test, feature = "fixtures"))]
impl<'a> FixtureLexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            depth: 0,
            indents: vec![0],
            at_line_start: true,
            line_has_tokens: false,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn text_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn emit(&mut self, kind: TokenKind, value: String, line: u32, column: u32) {
        if kind.is_significant() {
            self.line_has_tokens = true;
        }
        self.tokens.push(Token::new(kind, &value, line, column));
    }

    fn run(mut self) -> TokenArena {
        while self.peek().is_some() {
            if self.at_line_start && self.depth == 0 && !self.line_start() {
                continue;
            }
            self.at_line_start = false;

            let Some(c) = self.peek() else { break };
            let (line, column, start) = (self.line, self.column, self.pos);
            match c {
                ' ' | '\t' | '\r' | '\x0c' => self.bump(),
                '\n' => {
                    let kind = if self.depth > 0 || !self.line_has_tokens {
                        TokenKind::NonLogicalNewline
                    } else {
                        TokenKind::Newline
                    };
                    self.bump();
                    self.tokens.push(Token::new(kind, "\n", line, column));
                    if kind == TokenKind::Newline {
                        self.at_line_start = true;
                        self.line_has_tokens = false;
                    }
                }
                '#' => self.comment(),
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                '"' | '\'' => self.string(start, line, column),
                c if c.is_ascii_digit()
                    || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    self.number(start, line, column)
                }
                c if c.is_alphabetic() || c == '_' => {
                    while self
                        .peek()
                        .is_some_and(|c| c.is_alphanumeric() || c == '_')
                    {
                        self.bump();
                    }
                    let word = self.text_from(start);
                    if is_string_prefix(&word) && matches!(self.peek(), Some('"' | '\'')) {
                        self.string(start, line, column);
                    } else {
                        self.emit(TokenKind::Name, word, line, column);
                    }
                }
                _ => self.operator(line, column),
            }
        }

        let (line, column) = (self.line, self.column);
        if self.line_has_tokens {
            self.tokens
                .push(Token::new(TokenKind::Newline, "", line, column));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", line, 0));
        }
        self.tokens
            .push(Token::new(TokenKind::EndMarker, "", line, 0));

        let lines: Vec<&str> = self.source.split('\n').collect();
        let tokens = self
            .tokens
            .into_iter()
            .map(|token| {
                let text = lines
                    .get(token.line.saturating_sub(1) as usize)
                    .copied()
                    .unwrap_or("");
                token.with_source_line(text)
            })
            .collect();
        TokenArena::new(tokens)
    }

    /// Handle indentation at the start of a physical line.
    /// Returns false when the whole line was consumed (blank or comment-only).
    fn line_start(&mut self) -> bool {
        let start = self.pos;
        let mut width = 0;
        while let Some(c @ (' ' | '\t')) = self.peek() {
            width += if c == '\t' { 8 - width % 8 } else { 1 };
            self.bump();
        }

        match self.peek() {
            None => false,
            Some('\n') => {
                let (line, column) = (self.line, self.column);
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::NonLogicalNewline, "\n", line, column));
                false
            }
            Some('#') => {
                self.comment();
                if self.peek() == Some('\n') {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.tokens
                        .push(Token::new(TokenKind::NonLogicalNewline, "\n", line, column));
                }
                false
            }
            Some(_) => {
                let top = self.indents.last().copied().unwrap_or(0);
                if width > top {
                    self.indents.push(width);
                    let text = self.text_from(start);
                    self.tokens
                        .push(Token::new(TokenKind::Indent, &text, self.line, 0));
                } else {
                    while width < self.indents.last().copied().unwrap_or(0) {
                        self.indents.pop();
                        self.tokens
                            .push(Token::new(TokenKind::Dedent, "", self.line, self.column));
                    }
                }
                true
            }
        }
    }

    fn comment(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
        let text = self.text_from(start);
        self.emit(TokenKind::Comment, text, line, column);
    }

    fn string(&mut self, start: usize, line: u32, column: u32) {
        let Some(quote) = self.peek() else { return };
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let width = if triple { 3 } else { 1 };
        for _ in 0..width {
            self.bump();
        }

        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                self.bump();
            } else if c == quote
                && (!triple || (self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote)))
            {
                for _ in 0..width {
                    self.bump();
                }
                break;
            } else if c == '\n' && !triple {
                break;
            } else {
                self.bump();
            }
        }

        let text = self.text_from(start);
        self.emit(TokenKind::String, text, line, column);
    }

    fn number(&mut self, start: usize, line: u32, column: u32) {
        let hex = self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X'));
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-')
                && !hex
                && self.pos > start
                && matches!(self.chars[self.pos - 1], 'e' | 'E');
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        self.emit(TokenKind::Number, text, line, column);
    }

    fn operator(&mut self, line: u32, column: u32) {
        let rest: String = self.chars[self.pos..].iter().take(3).collect();
        let text = OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .map(|op| op.to_string())
            .unwrap_or_else(|| rest.chars().take(1).collect());

        match text.as_str() {
            "(" | "[" | "{" => self.depth += 1,
            ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        for _ in 0..text.chars().count() {
            self.bump();
        }
        self.emit(TokenKind::Operator, text, line, column);
    }
}
