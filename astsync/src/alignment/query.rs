//! Token queries over an aligned unit
//!
//! Only meaningful after a successful traversal: spans are derived from the
//! `owned_tokens` the traversal recorded.

use super::grouping::matching_close;
use crate::ast::{NodeArena, NodeId};
use crate::tokens::{render, Token, TokenArena, TokenIndex, TokenKind};
use std::ops::RangeInclusive;

/// `node` and all its descendants, in pre-order
pub fn subtree(nodes: &NodeArena, node: NodeId) -> Vec<NodeId> {
    let mut seen = vec![false; nodes.len()];
    let mut out = Vec::new();
    let mut pending = vec![node];

    while let Some(id) = pending.pop() {
        let Some(n) = nodes.get(id) else {
            continue;
        };
        if std::mem::replace(&mut seen[id.0], true) {
            continue;
        }
        out.push(id);
        pending.extend(n.kind.children().into_iter().rev());
    }
    out
}

/// Indices from the first to the last token owned anywhere in `node`'s subtree.
///
/// The range is widened until its brackets balance, which pulls in unowned
/// call parentheses at either edge. `None` when the subtree owns nothing.
pub fn token_span(
    tokens: &TokenArena,
    nodes: &NodeArena,
    node: NodeId,
) -> Option<RangeInclusive<TokenIndex>> {
    let (first, last) = subtree(nodes, node)
        .into_iter()
        .filter_map(|id| nodes.get(id))
        .flat_map(|n| n.owned_tokens.iter().copied())
        .fold(None, |span: Option<(TokenIndex, TokenIndex)>, index| match span {
            None => Some((index, index)),
            Some((lo, hi)) => Some((lo.min(index), hi.max(index))),
        })?;

    Some(balance_brackets(tokens, first, last))
}

/// Every token spanning `node`, insignificant ones included
pub fn tokens_for_node<'a>(tokens: &'a TokenArena, nodes: &NodeArena, node: NodeId) -> &'a [Token] {
    token_span(tokens, nodes, node)
        .and_then(|range| tokens.tokens().get(range))
        .unwrap_or_default()
}

/// Source text of `node`, rebuilt from its tokens
pub fn node_source(tokens: &TokenArena, nodes: &NodeArena, node: NodeId) -> String {
    render(tokens_for_node(tokens, nodes, node))
}

fn balance_brackets(
    tokens: &TokenArena,
    first: TokenIndex,
    last: TokenIndex,
) -> RangeInclusive<TokenIndex> {
    let mut open: Vec<TokenIndex> = Vec::new();
    let mut outermost_unopened = None;

    for token in tokens.tokens().get(first..=last).unwrap_or_default() {
        if token.kind != TokenKind::Operator {
            continue;
        }
        match token.value.as_str() {
            "(" | "[" | "{" => open.push(token.index),
            ")" | "]" | "}" => {
                if open.pop().is_none() {
                    outermost_unopened = Some(token.index);
                }
            }
            _ => {}
        }
    }

    let start = outermost_unopened
        .and_then(|close| matching_open(tokens, close))
        .map_or(first, |index| index.min(first));
    let end = open
        .first()
        .and_then(|&index| matching_close(tokens, index))
        .map_or(last, |index| index.max(last));
    start..=end
}

/// Index of the bracket opening the one at `close`
fn matching_open(tokens: &TokenArena, close: TokenIndex) -> Option<TokenIndex> {
    let mut depth = 0usize;
    for token in tokens.tokens().get(..=close)?.iter().rev() {
        if token.kind != TokenKind::Operator {
            continue;
        }
        match token.value.as_str() {
            ")" | "]" | "}" => depth += 1,
            "(" | "[" | "{" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(token.index);
                }
            }
            _ => {}
        }
    }
    None
}
