//! Multi-token grouping and parenthesis lookahead
//!
//! Nothing here moves the cursor; callers claim what these functions find.

use super::claim::claim;
use super::context::TraversalContext;
use super::directive::{GroupContents, Ownership};
use super::error::{AlignmentError, AlignmentResult};
use crate::ast::{NodeArena, NodeId};
use crate::tokens::{TokenArena, TokenIndex, TokenKind};
use crate::utils::SourcePosition;

/// Adjacent String tokens starting at the next significant token.
///
/// The first significant token must be a String; later ones are collected
/// until any other significant token appears.
pub fn collect_concatenated_strings(
    ctx: &TraversalContext,
    tokens: &TokenArena,
    nodes: &NodeArena,
    node: NodeId,
) -> AlignmentResult<Vec<TokenIndex>> {
    let start = ctx.position.map_or(0, |p| p + 1);
    let mut group = Vec::new();

    for token in tokens.iter().skip(start).filter(|t| t.is_significant()) {
        if token.kind != TokenKind::String {
            if group.is_empty() {
                return Err(AlignmentError::MalformedGroup {
                    file: ctx.file.clone(),
                    line: token.line,
                    column: token.column,
                    node,
                    node_kind: nodes.kind_name(node),
                    found: token.describe(),
                });
            }
            break;
        }
        group.push(token.index);
    }

    if group.is_empty() {
        return Err(AlignmentError::MalformedGroup {
            file: ctx.file.clone(),
            line: tokens.tokens().last().map_or(0, |t| t.line),
            column: 0,
            node,
            node_kind: nodes.kind_name(node),
            found: "end of stream".to_string(),
        });
    }

    Ok(group)
}

/// Claim a whole string group for `node`
pub fn claim_string_group(
    ctx: &mut TraversalContext,
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    node: NodeId,
) -> AlignmentResult<Vec<TokenIndex>> {
    let group = collect_concatenated_strings(ctx, tokens, nodes, node)?;
    for &index in &group {
        let value = tokens[index].value.clone();
        claim(ctx, tokens, nodes, node, TokenKind::String, &value, Ownership::Owned)?;
    }
    Ok(group)
}

/// Number of consecutive `(` tokens coming up that open before `position`.
///
/// These are grouping parentheses around the node starting at `position`.
pub fn leading_group_parens(
    tokens: &TokenArena,
    after: Option<TokenIndex>,
    position: SourcePosition,
) -> usize {
    let start = after.map_or(0, |p| p + 1);
    tokens
        .iter()
        .skip(start)
        .filter(|t| t.is_significant())
        .take_while(|t| t.is_operator("(") && t.position() < position)
        .count()
}

/// Index of the bracket closing the one at `open`
pub fn matching_close(tokens: &TokenArena, open: TokenIndex) -> Option<TokenIndex> {
    let mut depth = 0usize;
    for token in tokens.iter().skip(open) {
        if token.kind != TokenKind::Operator {
            continue;
        }
        match token.value.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
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

/// Whether the brackets `open`..`close` hold `contents` at their top level
pub fn group_holds(
    tokens: &TokenArena,
    open: TokenIndex,
    close: TokenIndex,
    contents: GroupContents,
) -> bool {
    let inner = tokens
        .tokens()
        .get(open + 1..close)
        .unwrap_or_default()
        .iter()
        .filter(|t| t.is_significant());

    let mut depth = 0usize;
    let mut lambda_headers = 0usize;
    let mut empty = true;
    for token in inner {
        empty = false;
        match (token.kind, token.value.as_str()) {
            (TokenKind::Operator, "(" | "[" | "{") => depth += 1,
            (TokenKind::Operator, ")" | "]" | "}") => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            (TokenKind::Name, "lambda") => lambda_headers += 1,
            (TokenKind::Operator, ":") if lambda_headers > 0 => lambda_headers -= 1,
            (TokenKind::Operator, ",") if lambda_headers == 0 => {
                if contents == GroupContents::Comma {
                    return true;
                }
            }
            (TokenKind::Name, "for") if contents == GroupContents::ForClause => return true,
            _ => {}
        }
    }

    match contents {
        GroupContents::Any => true,
        GroupContents::Comma => empty,
        GroupContents::ForClause => false,
    }
}
