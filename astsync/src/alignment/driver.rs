//! Work-list driver
//!
//! The traversal is iterative: directives sit in a deque, the front one is
//! executed, and whatever it expands into is pushed back onto the front in
//! order. Native stack usage is independent of how deeply the tree nests.

use super::claim::{claim, claim_name, claim_operator};
use super::context::{ClaimRecord, TraversalContext};
use super::directive::{Directive, GroupContents, Ownership};
use super::dispatch::{directives_for, else_branch};
use super::error::{AlignmentError, AlignmentResult};
use super::grouping::{claim_string_group, group_holds, leading_group_parens, matching_close};
use crate::ast::{NodeArena, NodeId};
use crate::config::runtime::AlignmentPreferences;
use crate::config::constants::compile_time::alignment::{MAX_NESTING_DEPTH, MAX_WORKLIST_LEN};
use crate::tokens::{TokenArena, TokenKind};
use crate::unit::AlignmentUnit;
use crate::utils::SourcePosition;
use crate::{log_debug, log_info};
use serde::Serialize;
use std::collections::VecDeque;

/// What one successful traversal did
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlignmentSummary {
    pub claim_log: Vec<ClaimRecord>,
    pub owned_claims: usize,
    pub unowned_claims: usize,
    pub comments_attached: usize,
    pub newline_links: usize,
    pub max_depth: usize,
    pub directives_executed: usize,
}

/// Align a unit in place
pub fn align_unit(unit: &mut AlignmentUnit) -> AlignmentResult<AlignmentSummary> {
    align_unit_with(unit, &AlignmentPreferences::default())
}

/// Align a unit in place, tracing claims when `preferences` ask for it
pub fn align_unit_with(
    unit: &mut AlignmentUnit,
    preferences: &AlignmentPreferences,
) -> AlignmentResult<AlignmentSummary> {
    align_with(
        &mut unit.tokens,
        &mut unit.nodes,
        unit.root,
        &unit.file,
        preferences,
    )
}

/// Cross-link `tokens` and the tree under `root`.
///
/// On error the links written so far are left as they are; callers discard
/// the unit.
pub fn align(
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    root: NodeId,
    file: &str,
) -> AlignmentResult<AlignmentSummary> {
    align_with(tokens, nodes, root, file, &AlignmentPreferences::default())
}

/// `align` with explicit preferences.
///
/// Parent links are recomputed from `root` first; statement attribution of
/// line breaks depends on them.
pub fn align_with(
    tokens: &mut TokenArena,
    nodes: &mut NodeArena,
    root: NodeId,
    file: &str,
    preferences: &AlignmentPreferences,
) -> AlignmentResult<AlignmentSummary> {
    nodes
        .link_parents(root)
        .map_err(|source| AlignmentError::InvalidTree {
            file: file.to_string(),
            source,
        })?;

    log_info!("Starting alignment",
        "file" => file,
        "tokens" => tokens.len(),
        "nodes" => nodes.len()
    );

    let mut aligner =
        Aligner::new(tokens, nodes, file).with_claim_tracing(preferences.trace_claims);
    aligner.run(root)?;
    Ok(aligner.finish())
}

/// Traversal over one unit's arenas
pub struct Aligner<'a> {
    tokens: &'a mut TokenArena,
    nodes: &'a mut NodeArena,
    ctx: TraversalContext,
    executed: usize,
}

impl<'a> Aligner<'a> {
    pub fn new(tokens: &'a mut TokenArena, nodes: &'a mut NodeArena, file: &str) -> Self {
        Self {
            tokens,
            nodes,
            ctx: TraversalContext::new(file),
            executed: 0,
        }
    }

    /// Log every claim at debug level
    pub fn with_claim_tracing(mut self, enabled: bool) -> Self {
        self.ctx.trace_claims = enabled;
        self
    }

    pub fn context(&self) -> &TraversalContext {
        &self.ctx
    }

    /// Visit `root`, then claim the end marker for it
    pub fn run(&mut self, root: NodeId) -> AlignmentResult<()> {
        let mut work = VecDeque::from([Directive::Visit(root)]);

        while let Some(directive) = work.pop_front() {
            self.executed += 1;
            let expansion = self.execute(directive)?;
            for item in expansion.into_iter().rev() {
                work.push_front(item);
            }
            if work.len() > MAX_WORKLIST_LEN {
                return Err(AlignmentError::WorklistOverflow {
                    file: self.ctx.file.clone(),
                    length: work.len(),
                    limit: MAX_WORKLIST_LEN,
                });
            }
        }

        claim(
            &mut self.ctx,
            self.tokens,
            self.nodes,
            root,
            TokenKind::EndMarker,
            "",
            Ownership::Unowned,
        )?;
        Ok(())
    }

    pub fn finish(self) -> AlignmentSummary {
        let owned_claims = self.ctx.claim_log.iter().filter(|c| c.owned).count();
        let unowned_claims = self.ctx.claim_log.len() - owned_claims;

        log_debug!("Alignment finished",
            "file" => self.ctx.file,
            "owned" => owned_claims,
            "unowned" => unowned_claims,
            "directives" => self.executed
        );

        AlignmentSummary {
            owned_claims,
            unowned_claims,
            comments_attached: self.ctx.comments_attached,
            newline_links: self.ctx.newline_links,
            max_depth: self.ctx.max_depth,
            directives_executed: self.executed,
            claim_log: self.ctx.claim_log,
        }
    }

    /// Run one directive and return what it expands into
    fn execute(&mut self, directive: Directive) -> AlignmentResult<Vec<Directive>> {
        match directive {
            Directive::Visit(node) => Ok(self.expand_visit(node)),
            Directive::VisitEach(ids) => Ok(ids.into_iter().map(Directive::Visit).collect()),
            Directive::Enter(node) => {
                self.ctx.enter(node, self.nodes, MAX_NESTING_DEPTH)?;
                Ok(Vec::new())
            }
            Directive::Dispatch(node) => {
                let lookahead = self.tokens.find_next_significant(self.ctx.position);
                directives_for(node, self.nodes, lookahead, &self.ctx.file)
            }
            Directive::Leave(_) => {
                self.ctx.leave();
                Ok(Vec::new())
            }

            Directive::ClaimName { node, name } => {
                claim_name(&mut self.ctx, self.tokens, self.nodes, node, &name)?;
                Ok(Vec::new())
            }
            Directive::ClaimOperator { node, op } => {
                claim_operator(&mut self.ctx, self.tokens, self.nodes, node, op)?;
                Ok(Vec::new())
            }
            Directive::ClaimNumber { node } => {
                self.claim_as(node, TokenKind::Number, "", Ownership::Owned)?;
                Ok(Vec::new())
            }
            Directive::ClaimStrings { node } => {
                claim_string_group(&mut self.ctx, self.tokens, self.nodes, node)?;
                Ok(Vec::new())
            }
            Directive::ClaimPunctuation { node, text } => {
                self.claim_as(node, TokenKind::Operator, text, Ownership::Unowned)?;
                Ok(Vec::new())
            }
            Directive::ClaimOptional {
                node,
                op,
                ownership,
            } => {
                if self.next_is_operator(op) {
                    self.claim_as(node, TokenKind::Operator, op, ownership)?;
                }
                Ok(Vec::new())
            }

            Directive::Parenthesized {
                node,
                at,
                contents,
                body,
            } => {
                if !self.opens_own_group(at, contents) {
                    return Ok(body);
                }
                let mut out = Vec::with_capacity(body.len() + 2);
                out.push(Directive::op(node, "("));
                out.extend(body);
                out.push(Directive::op(node, ")"));
                Ok(out)
            }
            Directive::ElseBranch { node, orelse } => {
                let lookahead = self.tokens.find_next_significant(self.ctx.position);
                Ok(else_branch(node, &orelse, self.nodes, lookahead))
            }
        }
    }

    /// `Enter`, grouping parentheses around the node, `Dispatch`, `Leave`
    fn expand_visit(&self, node: NodeId) -> Vec<Directive> {
        let groups = self
            .nodes
            .position(node)
            .map_or(0, |at| leading_group_parens(self.tokens, self.ctx.position, at));

        let mut out = Vec::with_capacity(3 + 2 * groups);
        out.push(Directive::Enter(node));
        out.extend((0..groups).map(|_| Directive::op(node, "(")));
        out.push(Directive::Dispatch(node));
        out.extend((0..groups).map(|_| Directive::op(node, ")")));
        out.push(Directive::Leave(node));
        out
    }

    fn claim_as(
        &mut self,
        node: NodeId,
        kind: TokenKind,
        value: &str,
        ownership: Ownership,
    ) -> AlignmentResult<()> {
        claim(&mut self.ctx, self.tokens, self.nodes, node, kind, value, ownership)?;
        Ok(())
    }

    fn next_is_operator(&self, op: &str) -> bool {
        self.tokens
            .find_next_significant(self.ctx.position)
            .is_some_and(|t| t.is_operator(op))
    }

    /// Next token is a `(` (at `at`, when required) whose group holds `contents`
    fn opens_own_group(&self, at: Option<SourcePosition>, contents: GroupContents) -> bool {
        let Some(open) = self.tokens.find_next_significant(self.ctx.position) else {
            return false;
        };
        if !open.is_operator("(") || at.is_some_and(|at| open.position() != at) {
            return false;
        }
        matching_close(self.tokens, open.index)
            .is_some_and(|close| group_holds(self.tokens, open.index, close, contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        AstNode, BinaryOperator, ComparisonOperator, ConstantValue, NodeKind, TreeBuilder,
        TreeError, UnaryOperator,
    };
    use crate::logging::codes;
    use crate::pipeline::verify_alignment;
    use crate::tokens::TokenStreamBuilder;
    use assert_matches::assert_matches;

    fn owners(tokens: &TokenArena) -> Vec<Option<NodeId>> {
        tokens.iter().map(|t| t.owner()).collect()
    }

    fn owned_values(tokens: &TokenArena, nodes: &NodeArena, id: NodeId) -> Vec<String> {
        nodes[id].owned_tokens.iter().map(|&i| tokens[i].value.clone()).collect()
    }

    fn claimed_values(tokens: &TokenArena, summary: &AlignmentSummary) -> Vec<String> {
        summary
            .claim_log
            .iter()
            .map(|c| tokens[c.index].value.clone())
            .collect()
    }

    /// `x = 1 + 2`
    fn assignment() -> (TokenArena, NodeArena, NodeId, [NodeId; 5]) {
        let tokens = TokenStreamBuilder::from_source("x = 1 + 2\n");
        let mut t = TreeBuilder::new();
        let x = t.name("x", 1, 0);
        let one = t.number("1", 1, 4);
        let two = t.number("2", 1, 8);
        let sum = t.add_at(
            NodeKind::BinOp {
                left: one,
                op: BinaryOperator::Add,
                right: two,
            },
            1,
            4,
        );
        let assign = t.add_at(
            NodeKind::Assign {
                targets: vec![x],
                value: sum,
            },
            1,
            0,
        );
        let module = t.module(vec![assign]);
        (tokens, t.finish(module).unwrap(), module, [x, one, two, sum, assign])
    }

    #[test]
    fn test_simple_assignment() {
        let (mut tokens, mut nodes, module, [x, one, two, sum, assign]) = assignment();

        let summary = align(&mut tokens, &mut nodes, module, "a.py").unwrap();

        assert_eq!(claimed_values(&tokens, &summary), vec!["x", "=", "1", "+", "2", ""]);
        assert_eq!(
            owners(&tokens),
            vec![Some(x), Some(assign), Some(one), Some(sum), Some(two), None, None]
        );
        assert_eq!(tokens[5].statement_owner(), Some(assign));
        assert_eq!(summary.owned_claims, 5);
        assert_eq!(summary.unowned_claims, 1);
        assert_eq!(nodes[assign].owned_tokens, vec![1]);
    }

    #[test]
    fn test_realignment_produces_same_links() {
        let (mut first_tokens, mut first_nodes, root, _) = assignment();
        let (mut second_tokens, mut second_nodes, _, _) = assignment();

        align(&mut first_tokens, &mut first_nodes, root, "a.py").unwrap();
        align(&mut second_tokens, &mut second_nodes, root, "a.py").unwrap();

        assert_eq!(owners(&first_tokens), owners(&second_tokens));
        for ((_, a), (_, b)) in first_nodes.iter().zip(second_nodes.iter()) {
            assert_eq!(a.kind.name(), b.kind.name());
            assert_eq!(a.owned_tokens, b.owned_tokens);
            assert_eq!(a.comments, b.comments);
        }
    }

    #[test]
    fn test_corrupted_operator_is_fatal() {
        let (mut tokens, mut nodes, root, _) = assignment();
        if let Some(plus) = tokens.get_mut(3) {
            plus.value = "-".to_string();
        }

        let result = align(&mut tokens, &mut nodes, root, "a.py");
        assert_matches!(
            result,
            Err(AlignmentError::GrammarMismatch { ref expected, ref found, line: 1, column: 6, .. })
                if expected == "Operator \"+\"" && found == "Operator \"-\""
        );
    }

    #[test]
    fn test_parameter_list() {
        let mut tokens = TokenStreamBuilder::from_source("def f(a, b=1, *c, **d): pass\n");
        let mut t = TreeBuilder::new();
        let a = t.add_at(NodeKind::Arg { name: "a".into(), annotation: None }, 1, 6);
        let b = t.add_at(NodeKind::Arg { name: "b".into(), annotation: None }, 1, 9);
        let one = t.number("1", 1, 11);
        let c = t.add_at(NodeKind::Arg { name: "c".into(), annotation: None }, 1, 15);
        let d = t.add_at(NodeKind::Arg { name: "d".into(), annotation: None }, 1, 20);
        let args = t.add(NodeKind::Arguments {
            posonlyargs: vec![],
            args: vec![a, b],
            vararg: Some(c),
            kwonlyargs: vec![],
            kw_defaults: vec![],
            kwarg: Some(d),
            defaults: vec![one],
        });
        let pass = t.add_at(NodeKind::Pass, 1, 24);
        let function = t.add_at(
            NodeKind::FunctionDef {
                name: "f".into(),
                args,
                body: vec![pass],
                decorators: vec![],
                returns: None,
                is_async: false,
            },
            1,
            0,
        );
        let module = t.module(vec![function]);
        let mut nodes = t.finish(module).unwrap();

        let summary = align(&mut tokens, &mut nodes, module, "b.py").unwrap();

        assert_eq!(
            claimed_values(&tokens, &summary),
            vec![
                "def", "f", "(", "a", ",", "b", "=", "1", ",", "*", "c", ",", "**", "d", ")",
                ":", "pass", "",
            ]
        );
        let unowned: Vec<&str> = summary
            .claim_log
            .iter()
            .filter(|c| !c.owned)
            .map(|c| tokens[c.index].value.as_str())
            .collect();
        assert_eq!(unowned, vec![",", ",", ",", ""]);
        assert_eq!(nodes[pass].owned_tokens.len(), 1);
        assert_eq!(tokens[2].owner(), Some(function));
        assert_eq!(tokens[6].owner(), Some(args));
    }

    #[test]
    fn test_adjacent_strings_share_owner() {
        let mut tokens = TokenStreamBuilder::from_source("\"a\" \"b\"\n");
        let mut t = TreeBuilder::new();
        let s = t.string("ab", 1, 0);
        let stmt = t.expr(s, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "c.py").unwrap();

        assert_eq!(nodes[s].owned_tokens, vec![0, 1]);
        assert_eq!(tokens[1].owner(), Some(s));
    }

    #[test]
    fn test_trailing_comment_attaches_to_statement() {
        let mut tokens = TokenStreamBuilder::from_source("pass  # note\n");
        let mut t = TreeBuilder::new();
        let pass = t.add_at(NodeKind::Pass, 1, 0);
        let module = t.module(vec![pass]);
        let mut nodes = t.finish(module).unwrap();

        let summary = align(&mut tokens, &mut nodes, module, "d.py").unwrap();

        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(nodes[pass].comments, vec![1]);
        assert_eq!(tokens[1].owner(), None);
        assert_eq!(tokens[2].statement_owner(), Some(pass));
        assert_eq!(summary.comments_attached, 1);
    }

    #[test]
    fn test_line_end_comment_skips_inner_expression() {
        let mut tokens = TokenStreamBuilder::from_source("x = 1  # note\n# own line\ny = 2\n");
        let mut t = TreeBuilder::new();
        let x = t.name("x", 1, 0);
        let one = t.number("1", 1, 4);
        let first = t.add_at(NodeKind::Assign { targets: vec![x], value: one }, 1, 0);
        let y = t.name("y", 3, 0);
        let two = t.number("2", 3, 4);
        let second = t.add_at(NodeKind::Assign { targets: vec![y], value: two }, 3, 0);
        let module = t.module(vec![first, second]);
        let mut nodes = t.finish(module).unwrap();

        let summary = align(&mut tokens, &mut nodes, module, "d.py").unwrap();
        verify_alignment(&tokens, &nodes, &summary.claim_log, "d.py").unwrap();

        assert_eq!(tokens[3].value, "# note");
        assert_eq!(nodes[first].comments, vec![3]);
        // an own-line comment still follows the preceding token's claimant
        assert_eq!(nodes[one].comments, vec![5]);
        assert_eq!(tokens[4].statement_owner(), Some(first));
        assert_eq!(tokens[6].statement_owner(), Some(first));
        assert_eq!(tokens[10].statement_owner(), Some(second));
    }

    #[test]
    fn test_call_over_subscript_tokens_is_mismatch() {
        let mut tokens = TokenStreamBuilder::from_source("f[x]\n");
        let mut t = TreeBuilder::new();
        let f = t.name("f", 1, 0);
        let x = t.name("x", 1, 2);
        let call = t.add_at(NodeKind::Call { func: f, args: vec![x], keywords: vec![] }, 1, 0);
        let stmt = t.expr(call, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        assert_matches!(
            align(&mut tokens, &mut nodes, module, "e.py"),
            Err(AlignmentError::GrammarMismatch {
                expected_kind: TokenKind::Operator,
                index: 1,
                node_kind: "Call",
                ..
            })
        );
    }

    #[test]
    fn test_call_keywords_and_punctuation() {
        let mut tokens = TokenStreamBuilder::from_source("f(x, key=2)\n");
        let mut t = TreeBuilder::new();
        let f = t.name("f", 1, 0);
        let x = t.name("x", 1, 2);
        let two = t.number("2", 1, 9);
        let keyword = t.add_at(NodeKind::Keyword { arg: Some("key".into()), value: two }, 1, 5);
        let call = t.add_at(
            NodeKind::Call { func: f, args: vec![x], keywords: vec![keyword] },
            1,
            0,
        );
        let stmt = t.expr(call, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "call.py").unwrap();

        assert_eq!(
            owners(&tokens)[..8],
            [Some(f), None, Some(x), None, Some(keyword), Some(keyword), Some(two), None]
        );
    }

    /// `if a: pass` with a nested `if b: pass` as its only alternative
    fn if_chain(
        source: &str,
        inner: SourcePosition,
        b_column: u32,
    ) -> (TokenArena, NodeArena, NodeId, NodeId, NodeId) {
        let tokens = TokenStreamBuilder::from_source(source);
        let mut t = TreeBuilder::new();
        let a = t.name("a", 1, 3);
        let first = t.add_at(NodeKind::Pass, 2, 4);
        let b = t.name("b", inner.line, b_column);
        let second = t.add_at(NodeKind::Pass, inner.line + 1, 8);
        let inner = t.add_at(
            NodeKind::If { test: b, body: vec![second], orelse: vec![] },
            inner.line,
            inner.column,
        );
        let outer = t.add_at(
            NodeKind::If { test: a, body: vec![first], orelse: vec![inner] },
            1,
            0,
        );
        let module = t.module(vec![outer]);
        (tokens, t.finish(module).unwrap(), module, outer, inner)
    }

    #[test]
    fn test_elif_is_claimed_by_nested_if() {
        let (mut tokens, mut nodes, module, _, inner) =
            if_chain("if a:\n    pass\nelif b:\n        pass\n", SourcePosition::new(3, 0), 5);

        align(&mut tokens, &mut nodes, module, "if.py").unwrap();

        let elif = tokens.iter().find(|t| t.value == "elif").map(|t| t.index).unwrap();
        assert_eq!(tokens[elif].owner(), Some(inner));
        assert!(tokens.iter().all(|t| t.value != "else"));
    }

    #[test]
    fn test_else_block_containing_if() {
        let (mut tokens, mut nodes, module, outer, inner) =
            if_chain(
            "if a:\n    pass\nelse:\n    if b:\n        pass\n",
            SourcePosition::new(4, 4),
            7,
        );

        align(&mut tokens, &mut nodes, module, "if.py").unwrap();

        let owner_of = |value: &str| tokens.iter().find(|t| t.value == value).and_then(|t| t.owner());
        assert_eq!(owner_of("else"), Some(outer));
        assert_eq!(nodes[inner].owned_tokens.len(), 2);
    }

    #[test]
    fn test_grouping_parentheses_belong_to_inner_node() {
        let mut tokens = TokenStreamBuilder::from_source("((x)) + y\n");
        let mut t = TreeBuilder::new();
        let x = t.name("x", 1, 2);
        let y = t.name("y", 1, 8);
        let sum = t.add_at(NodeKind::BinOp { left: x, op: BinaryOperator::Add, right: y }, 1, 0);
        let stmt = t.expr(sum, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "g.py").unwrap();

        assert_eq!(nodes[x].owned_tokens, vec![0, 1, 2, 3, 4]);
        assert_eq!(nodes[sum].owned_tokens, vec![5]);
    }

    #[test]
    fn test_tuple_parentheses() {
        let mut tokens = TokenStreamBuilder::from_source("x = (1, 2)\n(a), b\n");
        let mut t = TreeBuilder::new();
        let x = t.name("x", 1, 0);
        let one = t.number("1", 1, 5);
        let two = t.number("2", 1, 8);
        let pair = t.add_at(NodeKind::Tuple { elts: vec![one, two] }, 1, 4);
        let assign = t.add_at(NodeKind::Assign { targets: vec![x], value: pair }, 1, 0);
        let a = t.name("a", 2, 1);
        let b = t.name("b", 2, 5);
        let bare = t.add_at(NodeKind::Tuple { elts: vec![a, b] }, 2, 0);
        let stmt = t.expr(bare, 2, 0);
        let module = t.module(vec![assign, stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "t.py").unwrap();

        let values = |id: NodeId| -> Vec<String> {
            nodes[id].owned_tokens.iter().map(|&i| tokens[i].value.clone()).collect()
        };
        assert_eq!(values(pair), vec!["(", ",", ")"]);
        assert_eq!(values(a), vec!["(", "a", ")"]);
        assert_eq!(values(bare), vec![","]);
    }

    #[test]
    fn test_single_element_tuple_after_grouped_element() {
        let mut tokens = TokenStreamBuilder::from_source("x = (a),\n");
        let mut t = TreeBuilder::new();
        let x = t.name("x", 1, 0);
        let a = t.name("a", 1, 5);
        let single = t.add_at(NodeKind::Tuple { elts: vec![a] }, 1, 4);
        let assign = t.add_at(NodeKind::Assign { targets: vec![x], value: single }, 1, 0);
        let module = t.module(vec![assign]);
        let mut nodes = t.finish(module).unwrap();

        let summary = align(&mut tokens, &mut nodes, module, "t.py").unwrap();
        verify_alignment(&tokens, &nodes, &summary.claim_log, "t.py").unwrap();

        assert_eq!(owned_values(&tokens, &nodes, single), vec![","]);
        assert_eq!(owned_values(&tokens, &nodes, a), vec!["(", "a", ")"]);
    }

    #[test]
    fn test_tuple_starting_with_grouped_operand() {
        let mut tokens = TokenStreamBuilder::from_source("(a + b) * c,\n");
        let mut t = TreeBuilder::new();
        let a = t.name("a", 1, 1);
        let b = t.name("b", 1, 5);
        let sum = t.add_at(NodeKind::BinOp { left: a, op: BinaryOperator::Add, right: b }, 1, 1);
        let c = t.name("c", 1, 10);
        let product =
            t.add_at(NodeKind::BinOp { left: sum, op: BinaryOperator::Mult, right: c }, 1, 0);
        let single = t.add_at(NodeKind::Tuple { elts: vec![product] }, 1, 0);
        let stmt = t.expr(single, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        let summary = align(&mut tokens, &mut nodes, module, "t.py").unwrap();
        verify_alignment(&tokens, &nodes, &summary.claim_log, "t.py").unwrap();

        assert_eq!(owned_values(&tokens, &nodes, sum), vec!["(", "+", ")"]);
        assert_eq!(owned_values(&tokens, &nodes, product), vec!["*"]);
        assert_eq!(owned_values(&tokens, &nodes, single), vec![","]);
    }

    #[test]
    fn test_parenthesized_single_element_tuple() {
        let mut tokens = TokenStreamBuilder::from_source("((a),)\n");
        let mut t = TreeBuilder::new();
        let a = t.name("a", 1, 2);
        let single = t.add_at(NodeKind::Tuple { elts: vec![a] }, 1, 0);
        let stmt = t.expr(single, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "t.py").unwrap();

        assert_eq!(owned_values(&tokens, &nodes, single), vec!["(", ",", ")"]);
        assert_eq!(owned_values(&tokens, &nodes, a), vec!["(", "a", ")"]);
    }

    #[test]
    fn test_class_with_empty_parentheses() {
        let mut tokens = TokenStreamBuilder::from_source("class A():\n    pass\n");
        let mut t = TreeBuilder::new();
        let pass = t.add_at(NodeKind::Pass, 2, 4);
        let class = t.add_at(
            NodeKind::ClassDef {
                name: "A".into(),
                bases: vec![],
                keywords: vec![],
                body: vec![pass],
                decorators: vec![],
            },
            1,
            0,
        );
        let module = t.module(vec![class]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "k.py").unwrap();

        assert_eq!(nodes[class].owned_tokens, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_comparison_and_unary_words() {
        let mut tokens = TokenStreamBuilder::from_source("not a is not b\n");
        let mut t = TreeBuilder::new();
        let a = t.name("a", 1, 4);
        let b = t.name("b", 1, 13);
        let compare = t.add_at(
            NodeKind::Compare {
                left: a,
                ops: vec![ComparisonOperator::IsNot],
                comparators: vec![b],
            },
            1,
            4,
        );
        let negation = t.add_at(NodeKind::UnaryOp { op: UnaryOperator::Not, operand: compare }, 1, 0);
        let stmt = t.expr(negation, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "n.py").unwrap();

        assert_eq!(nodes[negation].owned_tokens, vec![0]);
        assert_eq!(nodes[compare].owned_tokens, vec![2, 3]);
    }

    #[test]
    fn test_optional_slice_step_colon() {
        let mut tokens = TokenStreamBuilder::from_source("s[1::]\n");
        let mut t = TreeBuilder::new();
        let s = t.name("s", 1, 0);
        let one = t.number("1", 1, 2);
        let slice = t.add_at(NodeKind::Slice { lower: Some(one), upper: None, step: None }, 1, 2);
        let sub = t.add_at(NodeKind::Subscript { value: s, slice }, 1, 0);
        let stmt = t.expr(sub, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        align(&mut tokens, &mut nodes, module, "s.py").unwrap();

        assert_eq!(nodes[slice].owned_tokens, vec![3, 4]);
        assert_eq!(nodes[sub].owned_tokens, vec![1, 5]);
    }

    #[test]
    fn test_string_node_over_name_is_malformed_group() {
        let mut tokens = TokenStreamBuilder::from_source("x\n");
        let mut t = TreeBuilder::new();
        let s = t.constant(ConstantValue::Str("x".into()), 1, 0);
        let stmt = t.expr(s, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        assert_matches!(
            align(&mut tokens, &mut nodes, module, "m.py"),
            Err(AlignmentError::MalformedGroup { node, .. }) if node == s
        );
    }

    #[test]
    fn test_keyword_visited_directly_is_unreachable() {
        let mut tokens = TokenStreamBuilder::from_source("k=1\n");
        let mut t = TreeBuilder::new();
        let one = t.number("1", 1, 2);
        let keyword = t.add(NodeKind::Keyword { arg: Some("k".into()), value: one });
        let stmt = t.expr(keyword, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        assert_matches!(
            align(&mut tokens, &mut nodes, module, "u.py"),
            Err(AlignmentError::UnreachableDispatch { kind: "Keyword", .. })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut builder = TokenStreamBuilder::new();
        for _ in 0..MAX_NESTING_DEPTH {
            builder = builder.name("not").gap(" ");
        }
        let mut tokens = builder.name("x").newline().end().build();

        let mut t = TreeBuilder::new();
        let mut operand = t.name("x", 1, (MAX_NESTING_DEPTH * 4) as u32);
        for _ in 0..MAX_NESTING_DEPTH {
            operand = t.add(NodeKind::UnaryOp { op: UnaryOperator::Not, operand });
        }
        let stmt = t.expr(operand, 1, 0);
        let module = t.module(vec![stmt]);
        let mut nodes = t.finish(module).unwrap();

        assert_matches!(
            align(&mut tokens, &mut nodes, module, "deep.py"),
            Err(AlignmentError::NestingTooDeep { limit: MAX_NESTING_DEPTH, .. })
        );
    }

    /// `x` as a bare arena whose parent links were never computed
    fn unlinked() -> NodeArena {
        NodeArena::new(vec![
            AstNode::new(NodeKind::Module { body: vec![NodeId(1)] }),
            AstNode::at(NodeKind::Expr { value: NodeId(2) }, 1, 0),
            AstNode::at(NodeKind::Name { id: "x".into() }, 1, 0),
        ])
    }

    #[test]
    fn test_align_links_parents_itself() {
        let mut tokens = TokenStreamBuilder::from_source("x  # c\n");
        let mut nodes = unlinked();
        assert_eq!(nodes.parent(NodeId(2)), None);

        align(&mut tokens, &mut nodes, NodeId(0), "p.py").unwrap();

        assert_eq!(nodes.parent(NodeId(2)), Some(NodeId(1)));
        assert_eq!(tokens[2].statement_owner(), Some(NodeId(1)));
        assert_eq!(nodes[NodeId(1)].comments, vec![1]);
    }

    #[test]
    fn test_dangling_child_is_invalid_tree() {
        let mut tokens = TokenStreamBuilder::from_source("x\n");
        let mut nodes = NodeArena::new(vec![AstNode::new(NodeKind::Module {
            body: vec![NodeId(4)],
        })]);

        let result = align(&mut tokens, &mut nodes, NodeId(0), "p.py");
        assert_matches!(
            result,
            Err(AlignmentError::InvalidTree { source: TreeError::InvalidReference { .. }, .. })
        );
        assert_eq!(result.unwrap_err().error_code(), codes::unit::INVALID_NODE_REFERENCE);
        assert!(tokens.iter().all(|t| t.owner().is_none()));
    }

    #[test]
    fn test_unit_and_arena_entry_points_agree() {
        let (mut tokens, mut nodes, root, _) = assignment();
        let (unit_tokens, unit_nodes, _, _) = assignment();
        let mut unit = AlignmentUnit::new("a.py", unit_tokens, unit_nodes, root).unwrap();

        let direct = align(&mut tokens, &mut nodes, root, "a.py").unwrap();
        let via_unit = align_unit_with(&mut unit, &AlignmentPreferences::default()).unwrap();

        assert_eq!(owners(&tokens), owners(&unit.tokens));
        assert_eq!(direct.claim_log, via_unit.claim_log);
        assert_eq!(direct.directives_executed, via_unit.directives_executed);
    }
}
