//! Alignment failures
//!
//! Every variant is fatal for the unit being aligned. Links already written
//! for that unit are not consistent and must be discarded by the caller.

use crate::ast::{NodeId, TreeError};
use crate::logging::{codes, Code};
use crate::tokens::{TokenIndex, TokenKind};
use crate::utils::{SourcePosition, Span};

pub type AlignmentResult<T> = Result<T, AlignmentError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignmentError {
    #[error("{file}:{line}: expected {expected}, found {found} (in {enclosing})\n    {source_line}")]
    GrammarMismatch {
        file: String,
        line: u32,
        column: u32,
        source_line: String,
        expected_kind: TokenKind,
        expected: String,
        found_kind: TokenKind,
        found: String,
        index: TokenIndex,
        node_kind: &'static str,
        enclosing: String,
    },

    #[error("{file}:{line}: expected {expected}, found end of stream (in {enclosing})")]
    UnexpectedEndOfStream {
        file: String,
        line: u32,
        source_line: String,
        expected_kind: TokenKind,
        expected: String,
        node_kind: &'static str,
        enclosing: String,
    },

    #[error(
        "{file}:{line}: token {index} ({token}) already owned by {existing_kind} {existing}, claimed again by {claiming_kind} {claiming}"
    )]
    DoubleOwnership {
        file: String,
        line: u32,
        column: u32,
        index: TokenIndex,
        token: String,
        existing: NodeId,
        existing_kind: &'static str,
        claiming: NodeId,
        claiming_kind: &'static str,
    },

    #[error("{file}: {kind} node {node} is never visited on its own")]
    UnreachableDispatch {
        file: String,
        node: NodeId,
        kind: &'static str,
    },

    #[error("{file}:{line}: {node_kind} {node} expected a String token group, found {found}")]
    MalformedGroup {
        file: String,
        line: u32,
        column: u32,
        node: NodeId,
        node_kind: &'static str,
        found: String,
    },

    #[error("{file}: nesting depth {depth} exceeds limit {limit} at {node_kind}")]
    NestingTooDeep {
        file: String,
        depth: usize,
        limit: usize,
        node_kind: &'static str,
    },

    #[error("{file}: pending work list of {length} directives exceeds limit {limit}")]
    WorklistOverflow {
        file: String,
        length: usize,
        limit: usize,
    },

    #[error("{file}: tree cannot be aligned: {source}")]
    InvalidTree {
        file: String,
        #[source]
        source: TreeError,
    },
}

impl AlignmentError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::GrammarMismatch { .. } => codes::alignment::GRAMMAR_MISMATCH,
            Self::UnexpectedEndOfStream { .. } => codes::alignment::UNEXPECTED_END_OF_STREAM,
            Self::DoubleOwnership { .. } => codes::alignment::DOUBLE_OWNERSHIP,
            Self::UnreachableDispatch { .. } => codes::alignment::UNREACHABLE_DISPATCH,
            Self::MalformedGroup { .. } => codes::alignment::MALFORMED_GROUP,
            Self::NestingTooDeep { .. } => codes::limits::NESTING_TOO_DEEP,
            Self::WorklistOverflow { .. } => codes::limits::WORKLIST_OVERFLOW,
            Self::InvalidTree { source, .. } => source.error_code(),
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Self::GrammarMismatch { file, .. }
            | Self::UnexpectedEndOfStream { file, .. }
            | Self::DoubleOwnership { file, .. }
            | Self::UnreachableDispatch { file, .. }
            | Self::MalformedGroup { file, .. }
            | Self::NestingTooDeep { file, .. }
            | Self::WorklistOverflow { file, .. }
            | Self::InvalidTree { file, .. } => file,
        }
    }

    /// Source location, where the failure has one
    pub fn span(&self) -> Option<Span> {
        let position = match self {
            Self::GrammarMismatch { line, column, .. }
            | Self::DoubleOwnership { line, column, .. }
            | Self::MalformedGroup { line, column, .. } => SourcePosition::new(*line, *column),
            Self::UnexpectedEndOfStream { line, .. } => SourcePosition::new(*line, 0),
            _ => return None,
        };
        Some(Span::point(position))
    }

    /// Failures that indicate a dispatch-table bug rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DoubleOwnership { .. }
                | Self::UnreachableDispatch { .. }
                | Self::MalformedGroup { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_span() {
        let error = AlignmentError::GrammarMismatch {
            file: "m.py".into(),
            line: 1,
            column: 1,
            source_line: "f[x]".into(),
            expected_kind: TokenKind::Operator,
            expected: "Operator \"(\"".into(),
            found_kind: TokenKind::Operator,
            found: "Operator \"[\"".into(),
            index: 1,
            node_kind: "Call",
            enclosing: "Module > Expr > Call".into(),
        };

        assert_eq!(error.error_code().as_str(), "E050");
        assert_eq!(error.file(), "m.py");
        assert_eq!(error.span().map(|s| s.start), Some(SourcePosition::new(1, 1)));
        assert!(!error.is_internal());
        assert!(error.to_string().contains("expected Operator \"(\", found Operator \"[\""));
    }

    #[test]
    fn test_internal_errors() {
        let error = AlignmentError::UnreachableDispatch {
            file: "m.py".into(),
            node: NodeId(4),
            kind: "Keyword",
        };
        assert!(error.is_internal());
        assert_eq!(error.error_code().as_str(), "E053");
        assert!(error.span().is_none());
    }
}
