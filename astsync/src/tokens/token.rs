//! Lexical tokens as produced by the external lexer
//!
//! Tokens are immutable apart from two set-once back-references filled in
//! during alignment: `owner` (grammar ownership) and `statement_owner`
//! (newline attribution).

use crate::ast::NodeId;
use crate::utils::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a token in its arena
pub type TokenIndex = usize;

/// Token kinds emitted by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Name,
    Operator,
    String,
    Number,
    Comment,
    Newline,
    NonLogicalNewline,
    Indent,
    Dedent,
    Whitespace,
    EndMarker,
}

impl TokenKind {
    /// Whether tokens of this kind carry grammar meaning.
    ///
    /// `EndMarker` is significant so a forward scan for the next significant
    /// token always terminates inside a well-formed stream.
    pub fn is_significant(self) -> bool {
        !matches!(
            self,
            TokenKind::Comment
                | TokenKind::Newline
                | TokenKind::NonLogicalNewline
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::Whitespace
        )
    }

    pub fn is_line_break(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::NonLogicalNewline)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Name => "Name",
            TokenKind::Operator => "Operator",
            TokenKind::String => "String",
            TokenKind::Number => "Number",
            TokenKind::Comment => "Comment",
            TokenKind::Newline => "Newline",
            TokenKind::NonLogicalNewline => "NonLogicalNewline",
            TokenKind::Indent => "Indent",
            TokenKind::Dedent => "Dedent",
            TokenKind::Whitespace => "Whitespace",
            TokenKind::EndMarker => "EndMarker",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lexical token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
    /// Full text of the line the token starts on
    #[serde(default)]
    pub source_line: String,
    #[serde(default)]
    pub index: TokenIndex,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    owner: Option<NodeId>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    statement_owner: Option<NodeId>,
}

impl Token {
    pub fn new(kind: TokenKind, value: &str, line: u32, column: u32) -> Self {
        Self {
            kind,
            value: value.to_string(),
            line,
            column,
            source_line: String::new(),
            index: 0,
            owner: None,
            statement_owner: None,
        }
    }

    pub fn with_source_line(mut self, source_line: &str) -> Self {
        self.source_line = source_line.to_string();
        self
    }

    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column)
    }

    pub fn is_significant(&self) -> bool {
        self.kind.is_significant()
    }

    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.is(TokenKind::Operator, op)
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn statement_owner(&self) -> Option<NodeId> {
        self.statement_owner
    }

    /// Set the owning node; a second write reports the existing owner
    pub fn set_owner(&mut self, node: NodeId) -> Result<(), NodeId> {
        match self.owner {
            Some(existing) => Err(existing),
            None => {
                self.owner = Some(node);
                Ok(())
            }
        }
    }

    /// Set the statement a line break belongs to; a second write reports the existing one
    pub fn set_statement_owner(&mut self, node: NodeId) -> Result<(), NodeId> {
        match self.statement_owner {
            Some(existing) => Err(existing),
            None => {
                self.statement_owner = Some(node);
                Ok(())
            }
        }
    }

    /// Short description used in diagnostics, e.g. `Operator "("`
    pub fn describe(&self) -> String {
        describe(self.kind, &self.value)
    }
}

/// Render a (kind, value) pair for diagnostics
pub fn describe(kind: TokenKind, value: &str) -> String {
    match kind {
        TokenKind::Number if value.is_empty() => "Number".to_string(),
        TokenKind::EndMarker => "end of stream".to_string(),
        TokenKind::Newline | TokenKind::NonLogicalNewline | TokenKind::Dedent => kind.to_string(),
        _ => format!("{} {:?}", kind, value),
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.describe(), self.position())
    }
}

pub fn is_significant(token: &Token) -> bool {
    token.is_significant()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_partition() {
        let significant = [
            TokenKind::Name,
            TokenKind::Operator,
            TokenKind::String,
            TokenKind::Number,
            TokenKind::EndMarker,
        ];
        let insignificant = [
            TokenKind::Comment,
            TokenKind::Newline,
            TokenKind::NonLogicalNewline,
            TokenKind::Indent,
            TokenKind::Dedent,
            TokenKind::Whitespace,
        ];

        assert!(significant.iter().all(|k| k.is_significant()));
        assert!(insignificant.iter().all(|k| !k.is_significant()));
    }

    #[test]
    fn test_owner_is_set_once() {
        let mut token = Token::new(TokenKind::Name, "x", 1, 0);
        assert_eq!(token.owner(), None);
        assert_eq!(token.set_owner(NodeId(3)), Ok(()));
        assert_eq!(token.set_owner(NodeId(4)), Err(NodeId(3)));
        assert_eq!(token.owner(), Some(NodeId(3)));
    }

    #[test]
    fn test_statement_owner_is_set_once() {
        let mut token = Token::new(TokenKind::Newline, "\n", 1, 5);
        assert_eq!(token.set_statement_owner(NodeId(1)), Ok(()));
        assert_eq!(token.set_statement_owner(NodeId(2)), Err(NodeId(1)));
        assert_eq!(token.owner(), None);
    }

    #[test]
    fn test_links_are_not_deserialized() {
        let json = r#"{"kind":"Name","value":"x","line":1,"column":0,"owner":7}"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.owner(), None);
        assert_eq!(token.source_line, "");
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::new(TokenKind::Operator, "(", 1, 1).describe(), "Operator \"(\"");
        assert_eq!(describe(TokenKind::EndMarker, ""), "end of stream");
        assert_eq!(describe(TokenKind::Number, ""), "Number");
    }
}
