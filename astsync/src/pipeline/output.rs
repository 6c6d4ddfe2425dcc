use crate::alignment::AlignmentSummary;
use crate::ast::NodeId;
use crate::tokens::{TokenArena, TokenIndex, TokenKind};
use crate::unit::AlignmentUnit;
use serde::{Deserialize, Serialize};

/// JSON report of one aligned unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub file: String,
    /// RFC 3339
    pub generated_at: String,
    pub token_count: usize,
    pub node_count: usize,
    pub owned_tokens: usize,
    pub unowned_claims: usize,
    pub comments_attached: usize,
    pub newline_links: usize,
    pub max_depth: usize,
    pub verified: bool,
    pub nodes: Vec<NodeLinks>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLinks {
    pub id: NodeId,
    pub kind: String,
    pub owned_tokens: Vec<TokenIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<TokenIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLinks {
    pub index: TokenIndex,
    pub kind: TokenKind,
    pub value: String,
    pub owner: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_owner: Option<NodeId>,
}

impl AlignmentReport {
    pub fn new(
        unit: &AlignmentUnit,
        summary: &AlignmentSummary,
        verified: bool,
        include_tokens: bool,
    ) -> Self {
        let nodes = unit
            .nodes
            .iter()
            .filter(|(_, node)| !node.owned_tokens.is_empty() || !node.comments.is_empty())
            .map(|(id, node)| NodeLinks {
                id,
                kind: node.kind.name().to_string(),
                owned_tokens: node.owned_tokens.clone(),
                comments: node.comments.clone(),
            })
            .collect();

        let tokens = if include_tokens {
            unit.tokens
                .iter()
                .map(|t| TokenLinks {
                    index: t.index,
                    kind: t.kind,
                    value: t.value.clone(),
                    owner: t.owner(),
                    statement_owner: t.statement_owner(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            file: unit.file.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            token_count: unit.token_count(),
            node_count: unit.node_count(),
            owned_tokens: summary.owned_claims,
            unowned_claims: summary.unowned_claims,
            comments_attached: summary.comments_attached,
            newline_links: summary.newline_links,
            max_depth: summary.max_depth,
            verified,
            nodes,
            tokens,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Indented tree of `unit`, one node per line, with the tokens it owns, its
/// comments and the lines whose break it ends
pub fn dump_tree_and_links(unit: &AlignmentUnit) -> String {
    let mut breaks: Vec<Vec<u32>> = vec![Vec::new(); unit.nodes.len()];
    for token in &unit.tokens {
        if let Some(owner) = token.statement_owner() {
            if let Some(lines) = breaks.get_mut(owner.0) {
                lines.push(token.line);
            }
        }
    }

    let mut out = String::new();
    let mut seen = vec![false; unit.nodes.len()];
    let mut pending = vec![(unit.root, 0usize)];
    while let Some((id, depth)) = pending.pop() {
        let Some(node) = unit.nodes.get(id) else {
            continue;
        };
        if std::mem::replace(&mut seen[id.0], true) {
            continue;
        }

        out.push_str(&format!("{:width$}{} {}", "", node.kind.name(), id, width = depth * 2));
        if let Some(position) = node.position {
            out.push_str(&format!(" @{}", position));
        }
        if !node.owned_tokens.is_empty() {
            out.push_str(&format!(" tokens: {:?}", token_values(&unit.tokens, &node.owned_tokens)));
        }
        if !node.comments.is_empty() {
            out.push_str(&format!(" comments: {:?}", token_values(&unit.tokens, &node.comments)));
        }
        if !breaks[id.0].is_empty() {
            out.push_str(&format!(" breaks: {:?}", breaks[id.0]));
        }
        out.push('\n');

        pending.extend(node.kind.children().into_iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

fn token_values<'a>(tokens: &'a TokenArena, indices: &[TokenIndex]) -> Vec<&'a str> {
    indices
        .iter()
        .filter_map(|&i| tokens.get(i))
        .map(|t| t.value.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::align_unit;
    use crate::ast::{NodeKind, TreeBuilder};
    use crate::tokens::TokenStreamBuilder;

    fn call_unit() -> AlignmentUnit {
        let tokens = TokenStreamBuilder::from_source("x = f(a)  # c\n\ng()\n");
        let mut t = TreeBuilder::new();
        let x = t.name("x", 1, 0);
        let f = t.name("f", 1, 4);
        let a = t.name("a", 1, 6);
        let call = t.add_at(NodeKind::Call { func: f, args: vec![a], keywords: vec![] }, 1, 4);
        let assign = t.add_at(NodeKind::Assign { targets: vec![x], value: call }, 1, 0);
        let g = t.name("g", 3, 0);
        let empty = t.add_at(NodeKind::Call { func: g, args: vec![], keywords: vec![] }, 3, 0);
        let stmt = t.expr(empty, 3, 0);
        let module = t.module(vec![assign, stmt]);
        let nodes = t.finish(module).unwrap();
        AlignmentUnit::new("d.py", tokens, nodes, module).unwrap()
    }

    #[test]
    fn test_dump_shows_tree_and_links() {
        let mut unit = call_unit();
        align_unit(&mut unit).unwrap();

        let expected = "\
Module #8
  Assign #4 @1:1 tokens: [\"=\"] comments: [\"# c\"] breaks: [1, 2]
    Name #0 @1:1 tokens: [\"x\"]
    Call #3 @1:5
      Name #1 @1:5 tokens: [\"f\"]
      Name #2 @1:7 tokens: [\"a\"]
  Expr #7 @3:1 breaks: [3]
    Call #6 @3:1
      Name #5 @3:1 tokens: [\"g\"]
";
        assert_eq!(dump_tree_and_links(&unit), expected);
    }

    #[test]
    fn test_dump_before_alignment_has_no_links() {
        let unit = call_unit();
        let dump = dump_tree_and_links(&unit);
        assert_eq!(dump.lines().count(), 9);
        assert!(!dump.contains("tokens:"));
        assert!(!dump.contains("breaks:"));
    }

    #[test]
    fn test_report_lists_linked_nodes() {
        let mut unit = call_unit();
        let summary = align_unit(&mut unit).unwrap();
        let report = AlignmentReport::new(&unit, &summary, false, true);
        assert_eq!(report.nodes.len(), 5);
        assert_eq!(report.tokens.len(), unit.token_count());
        assert_eq!(report.tokens[8].statement_owner, Some(NodeId(4)));
        assert_eq!(report.tokens[12].statement_owner, Some(NodeId(7)));
    }
}
