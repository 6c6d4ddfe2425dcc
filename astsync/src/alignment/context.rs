//! Traversal state threaded through one alignment pass

use super::error::{AlignmentError, AlignmentResult};
use crate::ast::{NodeArena, NodeId};
use crate::config::constants::compile_time::alignment::MAX_ENCLOSING_CHAIN_IN_ERRORS;
use crate::tokens::TokenIndex;
use serde::Serialize;

/// One claim, in claim order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimRecord {
    pub index: TokenIndex,
    /// Node that performed the claim
    pub claimant: NodeId,
    /// False for policy-unowned punctuation and the end marker
    pub owned: bool,
}

/// Cursor plus bookkeeping for a single traversal.
///
/// One context per unit; it is never shared between traversals.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    /// Index of the last claimed token; `None` before the first claim
    pub position: Option<TokenIndex>,
    pub last_statement: Option<NodeId>,
    pub last_claimant: Option<NodeId>,
    /// Nodes currently being visited, outermost first (diagnostics only)
    pub enclosing_stack: Vec<NodeId>,
    pub claim_log: Vec<ClaimRecord>,
    pub file: String,
    pub max_depth: usize,
    pub comments_attached: usize,
    pub newline_links: usize,
    /// Emit a debug event per claim
    pub trace_claims: bool,
}

impl TraversalContext {
    pub fn new(file: &str) -> Self {
        Self {
            position: None,
            last_statement: None,
            last_claimant: None,
            enclosing_stack: Vec::new(),
            claim_log: Vec::new(),
            file: file.to_string(),
            max_depth: 0,
            comments_attached: 0,
            newline_links: 0,
            trace_claims: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.enclosing_stack.len()
    }

    pub fn enter(&mut self, node: NodeId, nodes: &NodeArena, limit: usize) -> AlignmentResult<()> {
        if self.enclosing_stack.len() >= limit {
            return Err(AlignmentError::NestingTooDeep {
                file: self.file.clone(),
                depth: self.enclosing_stack.len() + 1,
                limit,
                node_kind: nodes.kind_name(node),
            });
        }
        self.enclosing_stack.push(node);
        self.max_depth = self.max_depth.max(self.enclosing_stack.len());
        Ok(())
    }

    pub fn leave(&mut self) {
        self.enclosing_stack.pop();
    }

    /// `Module > FunctionDef > Call`, truncated to the innermost entries
    pub fn enclosing_chain(&self, nodes: &NodeArena) -> String {
        let skip = self
            .enclosing_stack
            .len()
            .saturating_sub(MAX_ENCLOSING_CHAIN_IN_ERRORS);
        let names: Vec<&str> = self.enclosing_stack[skip..]
            .iter()
            .map(|id| nodes.kind_name(*id))
            .collect();

        match (skip, names.is_empty()) {
            (_, true) => "<top level>".to_string(),
            (0, false) => names.join(" > "),
            (_, false) => format!("... > {}", names.join(" > ")),
        }
    }
}
