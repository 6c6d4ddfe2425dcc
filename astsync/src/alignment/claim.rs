//! Cursor primitives
//!
//! `claim` is the only function that moves the cursor or writes links.

use super::context::{ClaimRecord, TraversalContext};
use super::directive::Ownership;
use super::error::{AlignmentError, AlignmentResult};
use crate::ast::{NodeArena, NodeId};
use crate::log_debug;
use crate::tokens::{describe, TokenArena, TokenIndex, TokenKind};

/// Advance to the next token matching (`kind`, `value`) and attach it to `node`.
///
/// Insignificant tokens passed on the way are attributed. A comment ending a
/// statement's line goes to that statement; other comments go to the node
/// that made the previous claim (or `node` before any claim). Line breaks go
/// to the last statement. A significant token that does not match is a
/// grammar mismatch. A `Number` request matches any number token.
pub fn claim(
    ctx: &mut TraversalContext,
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    node: NodeId,
    kind: TokenKind,
    value: &str,
    ownership: Ownership,
) -> AlignmentResult<TokenIndex> {
    let start = ctx.position.map_or(0, |p| p + 1);

    let mut found = None;
    for token in tokens.iter().skip(start) {
        if token.kind == kind && (kind == TokenKind::Number || token.value == value) {
            found = Some(token.index);
            break;
        }
        if token.is_significant() {
            return Err(AlignmentError::GrammarMismatch {
                file: ctx.file.clone(),
                line: token.line,
                column: token.column,
                source_line: token.source_line.clone(),
                expected_kind: kind,
                expected: describe(kind, value),
                found_kind: token.kind,
                found: token.describe(),
                index: token.index,
                node_kind: nodes.kind_name(node),
                enclosing: ctx.enclosing_chain(nodes),
            });
        }
    }

    let Some(found) = found else {
        let last = tokens.tokens().last();
        return Err(AlignmentError::UnexpectedEndOfStream {
            file: ctx.file.clone(),
            line: last.map_or(0, |t| t.line),
            source_line: last.map(|t| t.source_line.clone()).unwrap_or_default(),
            expected_kind: kind,
            expected: describe(kind, value),
            node_kind: nodes.kind_name(node),
            enclosing: ctx.enclosing_chain(nodes),
        });
    };

    attach_skipped(ctx, tokens, nodes, node, start, found);

    let owned = ownership == Ownership::Owned && tokens[found].kind != TokenKind::EndMarker;
    if owned {
        if let Some(token) = tokens.get_mut(found) {
            if let Err(existing) = token.set_owner(node) {
                return Err(AlignmentError::DoubleOwnership {
                    file: ctx.file.clone(),
                    line: token.line,
                    column: token.column,
                    index: found,
                    token: token.describe(),
                    existing,
                    existing_kind: nodes.kind_name(existing),
                    claiming: node,
                    claiming_kind: nodes.kind_name(node),
                });
            }
        }
        if let Some(n) = nodes.get_mut(node) {
            n.owned_tokens.push(found);
        }
    }

    if let Some(statement) = nodes.statement_ancestor(node) {
        ctx.last_statement = Some(statement);
    }
    ctx.last_claimant = Some(node);
    ctx.position = Some(found);
    ctx.claim_log.push(ClaimRecord {
        index: found,
        claimant: node,
        owned,
    });

    if ctx.trace_claims {
        log_debug!("Claimed token",
            "index" => found,
            "token" => tokens[found].describe(),
            "node" => nodes.kind_name(node),
            "owned" => owned
        );
    }

    Ok(found)
}

fn attach_skipped(
    ctx: &mut TraversalContext,
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    claiming: NodeId,
    start: TokenIndex,
    end: TokenIndex,
) {
    for index in start..end {
        let Some(kind) = tokens.get(index).map(|t| t.kind) else {
            continue;
        };
        match kind {
            TokenKind::Comment => {
                let target = match ctx.last_statement {
                    Some(statement) if tokens.trailing_newline(index).is_some() => statement,
                    _ => ctx.last_claimant.unwrap_or(claiming),
                };
                if let Some(n) = nodes.get_mut(target) {
                    n.comments.push(index);
                    ctx.comments_attached += 1;
                }
            }
            TokenKind::Newline | TokenKind::NonLogicalNewline => {
                let (Some(statement), Some(token)) = (ctx.last_statement, tokens.get_mut(index))
                else {
                    continue;
                };
                if token.set_statement_owner(statement).is_ok() {
                    ctx.newline_links += 1;
                }
            }
            _ => {}
        }
    }
}

/// Claim a plain or dotted name, `.` operators between the parts
pub fn claim_name(
    ctx: &mut TraversalContext,
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    node: NodeId,
    name: &str,
) -> AlignmentResult<()> {
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            claim_operator(ctx, tokens, nodes, node, ".")?;
        }
        claim(ctx, tokens, nodes, node, TokenKind::Name, part, Ownership::Owned)?;
    }
    Ok(())
}

pub fn claim_operator(
    ctx: &mut TraversalContext,
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    node: NodeId,
    op: &str,
) -> AlignmentResult<TokenIndex> {
    claim(ctx, tokens, nodes, node, TokenKind::Operator, op, Ownership::Owned)
}
