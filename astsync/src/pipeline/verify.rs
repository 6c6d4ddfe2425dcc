//! Post-traversal checks
//!
//! Re-derives the alignment invariants from the finished links and the
//! claim log. A traversal that returned `Ok` but fails here points at a bug
//! in the dispatch table rather than at the input.

use crate::alignment::ClaimRecord;
use crate::ast::{NodeArena, NodeId};
use crate::logging::{codes, Code};
use crate::tokens::{TokenArena, TokenIndex, TokenKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerificationError {
    #[error("{file}: significant token {index:?} {problem}")]
    CoverageMismatch {
        file: String,
        index: Option<TokenIndex>,
        problem: &'static str,
    },

    #[error("{file}: token {index} owned by both {first} and {second}")]
    OwnershipConflict {
        file: String,
        index: TokenIndex,
        first: NodeId,
        second: NodeId,
    },

    #[error("{file}: token {index} link disagrees with the claim log: {detail}")]
    LinkMismatch {
        file: String,
        index: TokenIndex,
        detail: String,
    },

    #[error("{file}: claim of token {index} follows claim of token {previous}")]
    CursorRegression {
        file: String,
        previous: TokenIndex,
        index: TokenIndex,
    },

    #[error("{file}: comment token {index} {problem}")]
    CommentMisattached {
        file: String,
        index: TokenIndex,
        problem: String,
    },
}

impl VerificationError {
    pub fn error_code(&self) -> Code {
        match self {
            VerificationError::CoverageMismatch { .. } => codes::verification::COVERAGE_MISMATCH,
            VerificationError::OwnershipConflict { .. } | VerificationError::LinkMismatch { .. } => {
                codes::verification::OWNERSHIP_CONFLICT
            }
            VerificationError::CursorRegression { .. } => codes::verification::CURSOR_REGRESSION,
            VerificationError::CommentMisattached { .. } => codes::verification::COMMENT_OWNED,
        }
    }
}

pub type VerificationResult<T> = Result<T, VerificationError>;

/// Check cursor order, coverage, single ownership and comment attachment
pub fn verify_alignment(
    tokens: &TokenArena,
    nodes: &NodeArena,
    claim_log: &[ClaimRecord],
    file: &str,
) -> VerificationResult<()> {
    check_cursor_order(claim_log, file)?;
    check_coverage(tokens, claim_log, file)?;
    check_ownership(tokens, nodes, claim_log, file)?;
    check_comments(tokens, nodes, claim_log, file)?;
    check_statement_links(tokens, file)
}

fn check_cursor_order(claim_log: &[ClaimRecord], file: &str) -> VerificationResult<()> {
    for pair in claim_log.windows(2) {
        if pair[1].index <= pair[0].index {
            return Err(VerificationError::CursorRegression {
                file: file.to_string(),
                previous: pair[0].index,
                index: pair[1].index,
            });
        }
    }
    Ok(())
}

/// Every significant token is claimed, and nothing else is
fn check_coverage(
    tokens: &TokenArena,
    claim_log: &[ClaimRecord],
    file: &str,
) -> VerificationResult<()> {
    let significant = tokens.significant_indices();
    let claimed: Vec<TokenIndex> = claim_log.iter().map(|c| c.index).collect();
    if significant == claimed {
        return Ok(());
    }

    let first_difference = significant
        .iter()
        .zip(&claimed)
        .find(|(s, c)| s != c)
        .map(|(s, _)| *s);
    let (index, problem) = match first_difference {
        Some(index) => (Some(index), "was skipped by the traversal"),
        None if significant.len() > claimed.len() => {
            (significant.get(claimed.len()).copied(), "was never claimed")
        }
        None => (claimed.get(significant.len()).copied(), "is not significant but was claimed"),
    };
    Err(VerificationError::CoverageMismatch {
        file: file.to_string(),
        index,
        problem,
    })
}

fn check_ownership(
    tokens: &TokenArena,
    nodes: &NodeArena,
    claim_log: &[ClaimRecord],
    file: &str,
) -> VerificationResult<()> {
    let mut owner_of: Vec<Option<NodeId>> = vec![None; tokens.len()];
    for (id, node) in nodes.iter() {
        for &index in &node.owned_tokens {
            let Some(slot) = owner_of.get_mut(index) else {
                return Err(link_mismatch(file, index, format!("{id} owns a token outside the stream")));
            };
            if let Some(first) = *slot {
                return Err(VerificationError::OwnershipConflict {
                    file: file.to_string(),
                    index,
                    first,
                    second: id,
                });
            }
            *slot = Some(id);
        }
    }

    for record in claim_log {
        let expected = record.owned.then_some(record.claimant);
        let linked = tokens.get(record.index).and_then(|t| t.owner());
        if linked != expected || owner_of.get(record.index).copied().flatten() != expected {
            return Err(link_mismatch(
                file,
                record.index,
                format!("claimed by {} (owned: {}), owner is {:?}", record.claimant, record.owned, linked),
            ));
        }
    }

    let owned_in_log = claim_log.iter().filter(|c| c.owned).count();
    let owned_in_tokens = tokens.iter().filter(|t| t.owner().is_some()).count();
    if owned_in_log != owned_in_tokens {
        let stray = tokens
            .iter()
            .find(|t| t.owner().is_some() && !claim_log.iter().any(|c| c.index == t.index))
            .map_or(0, |t| t.index);
        return Err(link_mismatch(file, stray, "owner set without a claim".to_string()));
    }
    Ok(())
}

/// Comments ending a statement's line hang off that statement; the rest off
/// the node that claimed the preceding significant token
fn check_comments(
    tokens: &TokenArena,
    nodes: &NodeArena,
    claim_log: &[ClaimRecord],
    file: &str,
) -> VerificationResult<()> {
    let mut attached_to: Vec<Vec<NodeId>> = vec![Vec::new(); tokens.len()];
    for (id, node) in nodes.iter() {
        for &index in &node.comments {
            if let Some(slot) = attached_to.get_mut(index) {
                slot.push(id);
            }
        }
    }

    for comment in tokens.iter().filter(|t| t.kind == TokenKind::Comment) {
        let misattached = |problem: String| VerificationError::CommentMisattached {
            file: file.to_string(),
            index: comment.index,
            problem,
        };

        if let Some(owner) = comment.owner() {
            return Err(misattached(format!("has primary owner {owner}")));
        }

        let preceding = claim_log.partition_point(|c| c.index < comment.index);
        let by_claim_order = match preceding {
            0 => claim_log.first(),
            n => claim_log.get(n - 1),
        }
        .map(|c| c.claimant);
        let expected = tokens
            .trailing_newline(comment.index)
            .and_then(|newline| newline.statement_owner())
            .or(by_claim_order);

        match attached_to[comment.index].as_slice() {
            [node] if Some(*node) == expected => {}
            [node] => {
                return Err(misattached(format!("attached to {node}, expected {expected:?}")));
            }
            [] => return Err(misattached("is not attached".to_string())),
            many => return Err(misattached(format!("attached {} times", many.len()))),
        }
    }
    Ok(())
}

fn check_statement_links(tokens: &TokenArena, file: &str) -> VerificationResult<()> {
    match tokens
        .iter()
        .find(|t| t.statement_owner().is_some() && !t.kind.is_line_break())
    {
        Some(token) => Err(link_mismatch(
            file,
            token.index,
            format!("{} carries a statement link", token.describe()),
        )),
        None => Ok(()),
    }
}

fn link_mismatch(file: &str, index: TokenIndex, detail: String) -> VerificationError {
    VerificationError::LinkMismatch {
        file: file.to_string(),
        index,
        detail,
    }
}
