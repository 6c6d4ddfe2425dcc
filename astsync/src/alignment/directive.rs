//! Work items executed by the alignment driver

use crate::ast::NodeId;
use crate::utils::SourcePosition;

/// Whether a claimed token gets the claiming node as its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    /// Consumed but deliberately left without an owner (call punctuation)
    Unowned,
}

/// What a node's own parentheses must hold directly inside them.
///
/// Grouping parentheses around a single element hold none of these, which
/// tells `(a),` apart from `(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupContents {
    Any,
    /// A comma outside any nested bracket or lambda header; `()` also counts
    Comma,
    /// A `for` clause outside any nested bracket
    ForClause,
}

/// One pending step of the traversal.
///
/// Dispatch entries return these; the driver executes them front to back
/// and prepends whatever a step expands into.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Enter, claim grouping parentheses, dispatch, close them, leave
    Visit(NodeId),
    VisitEach(Vec<NodeId>),
    Enter(NodeId),
    Dispatch(NodeId),
    Leave(NodeId),

    /// Claim a name; dotted names are claimed part by part with `.` between
    ClaimName { node: NodeId, name: String },
    ClaimOperator { node: NodeId, op: &'static str },
    /// Next Number token, whatever its spelling
    ClaimNumber { node: NodeId },
    /// Adjacent String tokens as one group
    ClaimStrings { node: NodeId },
    /// Policy-unowned punctuation
    ClaimPunctuation { node: NodeId, text: &'static str },
    /// Claim an operator only if it is the next significant token
    ClaimOptional {
        node: NodeId,
        op: &'static str,
        ownership: Ownership,
    },

    /// Wrap `body` in `(` `)` owned by `node` when the next significant token
    /// is `(` (at `at`, if given) and the group holds `contents` at its top level
    Parenthesized {
        node: NodeId,
        at: Option<SourcePosition>,
        contents: GroupContents,
        body: Vec<Directive>,
    },
    /// `else:` block of an `if`, or an `elif` chain when the source spells one
    ElseBranch { node: NodeId, orelse: Vec<NodeId> },
}

impl Directive {
    pub fn name(node: NodeId, name: &str) -> Self {
        Self::ClaimName {
            node,
            name: name.to_string(),
        }
    }

    pub fn op(node: NodeId, op: &'static str) -> Self {
        Self::ClaimOperator { node, op }
    }

    pub fn punct(node: NodeId, text: &'static str) -> Self {
        Self::ClaimPunctuation { node, text }
    }

    pub fn optional(node: NodeId, op: &'static str, ownership: Ownership) -> Self {
        Self::ClaimOptional {
            node,
            op,
            ownership,
        }
    }

    /// Node the directive acts for, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::VisitEach(_) => None,
            Self::Visit(node)
            | Self::Enter(node)
            | Self::Dispatch(node)
            | Self::Leave(node)
            | Self::ClaimName { node, .. }
            | Self::ClaimOperator { node, .. }
            | Self::ClaimNumber { node }
            | Self::ClaimStrings { node }
            | Self::ClaimPunctuation { node, .. }
            | Self::ClaimOptional { node, .. }
            | Self::Parenthesized { node, .. }
            | Self::ElseBranch { node, .. } => Some(*node),
        }
    }
}
