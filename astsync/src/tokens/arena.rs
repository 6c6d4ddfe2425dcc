//! Indexed token storage with significance lookahead

use super::token::{Token, TokenIndex, TokenKind};
use crate::utils::SourcePosition;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Ordered, indexable token sequence for one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Token>", into = "Vec<Token>")]
pub struct TokenArena {
    tokens: Vec<Token>,
}

impl TokenArena {
    /// Build an arena; each token's `index` is reset to its position
    pub fn new(mut tokens: Vec<Token>) -> Self {
        for (index, token) in tokens.iter_mut().enumerate() {
            token.index = index;
        }
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: TokenIndex) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn get_mut(&mut self, index: TokenIndex) -> Option<&mut Token> {
        self.tokens.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// First significant token strictly after `after` (`None` = before the first token).
    ///
    /// Never moves anything; used for one-token lookahead.
    pub fn find_next_significant(&self, after: Option<TokenIndex>) -> Option<&Token> {
        let start = after.map_or(0, |i| i + 1);
        self.tokens.iter().skip(start).find(|t| t.is_significant())
    }

    /// The logical `Newline` ending the line of the comment at `index`.
    ///
    /// `None` unless the comment is the last thing on a statement's line.
    pub fn trailing_newline(&self, index: TokenIndex) -> Option<&Token> {
        let comment = self.get(index).filter(|t| t.kind == TokenKind::Comment)?;
        self.tokens
            .iter()
            .skip(index + 1)
            .find(|t| t.kind != TokenKind::Whitespace)
            .filter(|t| t.kind == TokenKind::Newline && t.line == comment.line)
    }

    pub fn significant_indices(&self) -> Vec<TokenIndex> {
        self.tokens
            .iter()
            .filter(|t| t.is_significant())
            .map(|t| t.index)
            .collect()
    }

    pub fn indices_of(&self, kind: TokenKind) -> Vec<TokenIndex> {
        self.tokens
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.index)
            .collect()
    }

    /// The unit's source text, rebuilt from the whole stream
    pub fn to_source(&self) -> String {
        render(&self.tokens)
    }

    pub fn ends_with_end_marker(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::EndMarker)
    }
}

/// Source text rebuilt from consecutive `tokens`.
///
/// Gaps between tokens are refilled with spaces and line breaks from their
/// positions; tokens without text (dedents, the end marker) add nothing.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let Some(first) = tokens.first() else {
        return out;
    };

    let mut at = first.position();
    for token in tokens.iter().filter(|t| !t.value.is_empty()) {
        while at.line < token.line {
            out.push('\n');
            at = SourcePosition::new(at.line + 1, 0);
        }
        if token.column > at.column {
            out.extend(std::iter::repeat(' ').take((token.column - at.column) as usize));
        }
        out.push_str(&token.value);
        at = token.position().advance_str(&token.value);
    }
    out
}

impl From<Vec<Token>> for TokenArena {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl From<TokenArena> for Vec<Token> {
    fn from(arena: TokenArena) -> Self {
        arena.tokens
    }
}

impl Index<TokenIndex> for TokenArena {
    type Output = Token;

    fn index(&self, index: TokenIndex) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenArena {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
