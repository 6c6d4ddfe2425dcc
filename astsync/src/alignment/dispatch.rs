//! Node dispatch table
//!
//! One entry per node kind, each returning the directives that spell the node
//! out in grammar order. Entries are pure: the only live input is the next
//! significant token, used where the tree cannot tell two spellings apart.

use super::directive::{Directive, GroupContents, Ownership};
use super::error::{AlignmentError, AlignmentResult};
use crate::ast::{ConstantValue, NodeArena, NodeId, NodeKind};
use crate::logging::codes;
use crate::log_warning;
use crate::tokens::{Token, TokenKind};
use crate::utils::SourcePosition;
use Directive::{Visit, VisitEach};

/// Directives spelling `node`
pub fn directives_for(
    node: NodeId,
    nodes: &NodeArena,
    lookahead: Option<&Token>,
    file: &str,
) -> AlignmentResult<Vec<Directive>> {
    let Some(ast) = nodes.get(node) else {
        return Err(AlignmentError::UnreachableDispatch {
            file: file.to_string(),
            node,
            kind: "<missing>",
        });
    };

    let name = |text: &str| Directive::name(node, text);
    let op = |text: &'static str| Directive::op(node, text);

    let mut out = Vec::new();
    match &ast.kind {
        NodeKind::Module { body } => out.push(VisitEach(body.clone())),

        NodeKind::Expr { value } => out.push(Visit(*value)),
        NodeKind::Assign { targets, value } => {
            for target in targets {
                out.extend([Visit(*target), op("=")]);
            }
            out.push(Visit(*value));
        }
        NodeKind::AugAssign { target, op: bin, value } => {
            out.extend([Visit(*target), op(bin.augmented()), Visit(*value)]);
        }
        NodeKind::AnnAssign {
            target,
            annotation,
            value,
        } => {
            out.extend([Visit(*target), op(":"), Visit(*annotation)]);
            if let Some(value) = value {
                out.extend([op("="), Visit(*value)]);
            }
        }
        NodeKind::Return { value } => {
            out.push(name("return"));
            out.extend(value.map(Visit));
        }
        NodeKind::Pass => out.push(name("pass")),
        NodeKind::Break => out.push(name("break")),
        NodeKind::Continue => out.push(name("continue")),
        NodeKind::Delete { targets } => {
            out.push(name("del"));
            out.extend(comma_list(node, visits(targets), Ownership::Owned, true));
        }
        NodeKind::Global { names } | NodeKind::Nonlocal { names } => {
            out.push(name(if matches!(ast.kind, NodeKind::Global { .. }) {
                "global"
            } else {
                "nonlocal"
            }));
            let items = names.iter().map(|n| vec![name(n)]).collect();
            out.extend(comma_list(node, items, Ownership::Owned, false));
        }
        NodeKind::Import { names } => {
            out.push(name("import"));
            out.extend(comma_list(node, visits(names), Ownership::Owned, false));
        }
        NodeKind::ImportFrom {
            module,
            names,
            level,
        } => {
            out.push(name("from"));
            out.extend(relative_dots(node, *level));
            if let Some(module) = module {
                out.push(name(module));
            }
            out.push(name("import"));
            if is_star_import(nodes, names) {
                out.extend(visits(names).into_iter().flatten());
            } else {
                out.push(Directive::Parenthesized {
                    node,
                    at: None,
                    contents: GroupContents::Any,
                    body: comma_list(node, visits(names), Ownership::Owned, true),
                });
            }
        }
        NodeKind::Alias { name: alias, asname } => {
            out.push(if alias == "*" { op("*") } else { name(alias) });
            if let Some(asname) = asname {
                out.extend([name("as"), name(asname)]);
            }
        }

        NodeKind::If { test, body, orelse } => {
            let keyword = match lookahead {
                Some(t) if t.is(TokenKind::Name, "elif") => "elif",
                _ => "if",
            };
            out.extend([name(keyword), Visit(*test), op(":"), VisitEach(body.clone())]);
            if !orelse.is_empty() {
                out.push(Directive::ElseBranch {
                    node,
                    orelse: orelse.clone(),
                });
            }
        }
        NodeKind::For {
            target,
            iter,
            body,
            orelse,
            is_async,
        } => {
            if *is_async {
                out.push(name("async"));
            }
            out.extend([
                name("for"),
                Visit(*target),
                name("in"),
                Visit(*iter),
                op(":"),
                VisitEach(body.clone()),
            ]);
            out.extend(else_block(node, orelse));
        }
        NodeKind::While { test, body, orelse } => {
            out.extend([name("while"), Visit(*test), op(":"), VisitEach(body.clone())]);
            out.extend(else_block(node, orelse));
        }
        NodeKind::With {
            items,
            body,
            is_async,
        } => {
            if *is_async {
                out.push(name("async"));
            }
            out.push(name("with"));
            out.extend(comma_list(node, visits(items), Ownership::Owned, false));
            out.extend([op(":"), VisitEach(body.clone())]);
        }
        NodeKind::WithItem {
            context_expr,
            optional_vars,
        } => {
            out.push(Visit(*context_expr));
            if let Some(vars) = optional_vars {
                out.extend([name("as"), Visit(*vars)]);
            }
        }
        NodeKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            out.extend([name("try"), op(":"), VisitEach(body.clone())]);
            out.push(VisitEach(handlers.clone()));
            out.extend(else_block(node, orelse));
            if !finalbody.is_empty() {
                out.extend([name("finally"), op(":"), VisitEach(finalbody.clone())]);
            }
        }
        NodeKind::ExceptHandler {
            exception,
            name: bound,
            body,
        } => {
            out.push(name("except"));
            out.extend(exception.map(Visit));
            if let Some(bound) = bound {
                out.extend([name("as"), name(bound)]);
            }
            out.extend([op(":"), VisitEach(body.clone())]);
        }
        NodeKind::Raise { exc, cause } => {
            out.push(name("raise"));
            out.extend(exc.map(Visit));
            if let Some(cause) = cause {
                out.extend([name("from"), Visit(*cause)]);
            }
        }
        NodeKind::Assert { test, msg } => {
            out.extend([name("assert"), Visit(*test)]);
            if let Some(msg) = msg {
                out.extend([op(","), Visit(*msg)]);
            }
        }
        NodeKind::FunctionDef {
            name: function,
            args,
            body,
            decorators,
            returns,
            is_async,
        } => {
            for decorator in decorators {
                out.extend([op("@"), Visit(*decorator)]);
            }
            if *is_async {
                out.push(name("async"));
            }
            out.extend([name("def"), name(function), op("("), Visit(*args), op(")")]);
            if let Some(returns) = returns {
                out.extend([op("->"), Visit(*returns)]);
            }
            out.extend([op(":"), VisitEach(body.clone())]);
        }
        NodeKind::ClassDef {
            name: class,
            bases,
            keywords,
            body,
            decorators,
        } => {
            for decorator in decorators {
                out.extend([op("@"), Visit(*decorator)]);
            }
            out.extend([name("class"), name(class)]);
            if bases.is_empty() && keywords.is_empty() {
                out.push(Directive::Parenthesized {
                    node,
                    at: None,
                    contents: GroupContents::Any,
                    body: Vec::new(),
                });
            } else {
                let items = argument_items(node, nodes, bases, keywords, file);
                out.push(op("("));
                out.extend(comma_list(node, items, Ownership::Owned, true));
                out.push(op(")"));
            }
            out.extend([op(":"), VisitEach(body.clone())]);
        }

        NodeKind::Arguments {
            posonlyargs,
            args,
            vararg,
            kwonlyargs,
            kw_defaults,
            kwarg,
            defaults,
        } => {
            let mut items: Vec<Vec<Directive>> = Vec::new();

            let positional: Vec<NodeId> = posonlyargs.iter().chain(args).copied().collect();
            let first_default = positional.len().saturating_sub(defaults.len());
            for (i, arg) in positional.iter().enumerate() {
                let mut item = vec![Visit(*arg)];
                if let Some(default) = i.checked_sub(first_default).and_then(|d| defaults.get(d)) {
                    item.extend([op("="), Visit(*default)]);
                }
                items.push(item);
                if i + 1 == posonlyargs.len() {
                    items.push(vec![op("/")]);
                }
            }

            match vararg {
                Some(vararg) => items.push(vec![op("*"), Visit(*vararg)]),
                None if !kwonlyargs.is_empty() => items.push(vec![op("*")]),
                None => {}
            }

            for (i, arg) in kwonlyargs.iter().enumerate() {
                let mut item = vec![Visit(*arg)];
                if let Some(Some(default)) = kw_defaults.get(i) {
                    item.extend([op("="), Visit(*default)]);
                }
                items.push(item);
            }

            if let Some(kwarg) = kwarg {
                items.push(vec![op("**"), Visit(*kwarg)]);
            }

            out.extend(comma_list(node, items, Ownership::Unowned, true));
        }
        NodeKind::Arg {
            name: arg,
            annotation,
        } => {
            out.push(name(arg));
            if let Some(annotation) = annotation {
                out.extend([op(":"), Visit(*annotation)]);
            }
        }

        NodeKind::Lambda { args, body } => {
            out.extend([name("lambda"), Visit(*args), op(":"), Visit(*body)]);
        }
        NodeKind::Call {
            func,
            args,
            keywords,
        } => {
            out.push(Visit(*func));
            out.push(Directive::punct(node, "("));
            let items = argument_items(node, nodes, args, keywords, file);
            out.extend(comma_list(node, items, Ownership::Unowned, true));
            out.push(Directive::punct(node, ")"));
        }
        NodeKind::Keyword { .. } | NodeKind::FormattedValue { .. } => {
            return Err(AlignmentError::UnreachableDispatch {
                file: file.to_string(),
                node,
                kind: ast.name(),
            });
        }
        NodeKind::Name { id } => out.push(name(id)),
        NodeKind::Attribute { value, attr } => {
            out.extend([Visit(*value), op("."), name(attr)]);
        }
        NodeKind::Constant { value } => out.extend(constant(node, value, ast.position)),
        NodeKind::JoinedStr { .. } => out.push(Directive::ClaimStrings { node }),
        NodeKind::BinOp {
            left,
            op: bin,
            right,
        } => {
            out.extend([Visit(*left), op(bin.spelling()), Visit(*right)]);
        }
        NodeKind::BoolOp { op: boolean, values } => {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    out.push(name(boolean.spelling()));
                }
                out.push(Visit(*value));
            }
        }
        NodeKind::Compare {
            left,
            ops,
            comparators,
        } => {
            out.push(Visit(*left));
            for (cmp, comparator) in ops.iter().zip(comparators) {
                for &(kind, text) in cmp.tokens() {
                    out.push(spelled(node, kind, text));
                }
                out.push(Visit(*comparator));
            }
        }
        NodeKind::UnaryOp { op: unary, operand } => {
            let (kind, text) = unary.token();
            out.extend([spelled(node, kind, text), Visit(*operand)]);
        }
        NodeKind::IfExp { test, body, orelse } => {
            out.extend([
                Visit(*body),
                name("if"),
                Visit(*test),
                name("else"),
                Visit(*orelse),
            ]);
        }
        NodeKind::Starred { value } => out.extend([op("*"), Visit(*value)]),
        NodeKind::Tuple { elts } => {
            let body = tuple_body(node, visits(elts));
            match ast.position {
                Some(at) => out.push(Directive::Parenthesized {
                    node,
                    at: Some(at),
                    contents: GroupContents::Comma,
                    body,
                }),
                None => out.extend(body),
            }
        }
        NodeKind::List { elts } => {
            out.push(op("["));
            out.extend(comma_list(node, visits(elts), Ownership::Owned, true));
            out.push(op("]"));
        }
        NodeKind::Set { elts } => {
            out.push(op("{"));
            out.extend(comma_list(node, visits(elts), Ownership::Owned, true));
            out.push(op("}"));
        }
        NodeKind::Dict { keys, values } => {
            let items = keys
                .iter()
                .zip(values)
                .map(|(key, value)| match key {
                    Some(key) => vec![Visit(*key), op(":"), Visit(*value)],
                    None => vec![op("**"), Visit(*value)],
                })
                .collect();
            out.push(op("{"));
            out.extend(comma_list(node, items, Ownership::Owned, true));
            out.push(op("}"));
        }
        NodeKind::ListComp { elt, generators } => {
            out.extend([op("["), Visit(*elt), VisitEach(generators.clone()), op("]")]);
        }
        NodeKind::SetComp { elt, generators } => {
            out.extend([op("{"), Visit(*elt), VisitEach(generators.clone()), op("}")]);
        }
        NodeKind::DictComp {
            key,
            value,
            generators,
        } => {
            out.extend([
                op("{"),
                Visit(*key),
                op(":"),
                Visit(*value),
                VisitEach(generators.clone()),
                op("}"),
            ]);
        }
        NodeKind::GeneratorExp { elt, generators } => {
            let body = vec![Visit(*elt), VisitEach(generators.clone())];
            match ast.position {
                Some(at) => out.push(Directive::Parenthesized {
                    node,
                    at: Some(at),
                    contents: GroupContents::ForClause,
                    body,
                }),
                None => out.extend(body),
            }
        }
        NodeKind::Comprehension {
            target,
            iter,
            ifs,
            is_async,
        } => {
            if *is_async {
                out.push(name("async"));
            }
            out.extend([name("for"), Visit(*target), name("in"), Visit(*iter)]);
            for condition in ifs {
                out.extend([name("if"), Visit(*condition)]);
            }
        }
        NodeKind::Subscript { value, slice } => {
            out.extend([Visit(*value), op("["), Visit(*slice), op("]")]);
        }
        NodeKind::Slice { lower, upper, step } => {
            out.extend(lower.map(Visit));
            out.push(op(":"));
            out.extend(upper.map(Visit));
            match step {
                Some(step) => out.extend([op(":"), Visit(*step)]),
                None => out.push(Directive::optional(node, ":", Ownership::Owned)),
            }
        }
        NodeKind::Await { value } => out.extend([name("await"), Visit(*value)]),
        NodeKind::Yield { value } => {
            out.push(name("yield"));
            out.extend(value.map(Visit));
        }
        NodeKind::YieldFrom { value } => {
            out.extend([name("yield"), name("from"), Visit(*value)]);
        }
        NodeKind::NamedExpr { target, value } => {
            out.extend([Visit(*target), op(":="), Visit(*value)]);
        }
    }

    if ast.kind.is_simple_statement() {
        out.push(Directive::optional(node, ";", Ownership::Owned));
    }

    Ok(out)
}

/// Directives for the alternative branch of an `if`, once the next token is known
pub fn else_branch(
    node: NodeId,
    orelse: &[NodeId],
    nodes: &NodeArena,
    lookahead: Option<&Token>,
) -> Vec<Directive> {
    let chained = lookahead.is_some_and(|t| t.is(TokenKind::Name, "elif"));
    let single_if = matches!(
        orelse,
        [only] if matches!(nodes.get(*only).map(|n| &n.kind), Some(NodeKind::If { .. }))
    );
    match orelse {
        [single] if chained && single_if => vec![Visit(*single)],
        _ => vec![
            Directive::name(node, "else"),
            Directive::op(node, ":"),
            VisitEach(orelse.to_vec()),
        ],
    }
}

fn visits(ids: &[NodeId]) -> Vec<Vec<Directive>> {
    ids.iter().map(|id| vec![Visit(*id)]).collect()
}

fn spelled(node: NodeId, kind: TokenKind, text: &'static str) -> Directive {
    match kind {
        TokenKind::Name => Directive::name(node, text),
        _ => Directive::op(node, text),
    }
}

fn else_block(node: NodeId, orelse: &[NodeId]) -> Vec<Directive> {
    if orelse.is_empty() {
        return Vec::new();
    }
    vec![
        Directive::name(node, "else"),
        Directive::op(node, ":"),
        VisitEach(orelse.to_vec()),
    ]
}

/// Join items with commas; a trailing comma is claimed when present
fn comma_list(
    node: NodeId,
    items: Vec<Vec<Directive>>,
    ownership: Ownership,
    trailing: bool,
) -> Vec<Directive> {
    let comma = || match ownership {
        Ownership::Owned => Directive::op(node, ","),
        Ownership::Unowned => Directive::punct(node, ","),
    };

    let has_items = !items.is_empty();
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(comma());
        }
        out.extend(item);
    }
    if trailing && has_items {
        out.push(Directive::optional(node, ",", ownership));
    }
    out
}

/// A one-element tuple always spells its comma
fn tuple_body(node: NodeId, items: Vec<Vec<Directive>>) -> Vec<Directive> {
    if items.len() == 1 {
        let mut out: Vec<Directive> = items.into_iter().flatten().collect();
        out.push(Directive::op(node, ","));
        out
    } else {
        comma_list(node, items, Ownership::Owned, true)
    }
}

fn relative_dots(node: NodeId, level: u32) -> Vec<Directive> {
    // the lexer folds three dots into one ellipsis token
    let mut out = Vec::new();
    let mut remaining = level;
    while remaining >= 3 {
        out.push(Directive::op(node, "..."));
        remaining -= 3;
    }
    for _ in 0..remaining {
        out.push(Directive::op(node, "."));
    }
    out
}

fn is_star_import(nodes: &NodeArena, names: &[NodeId]) -> bool {
    matches!(names, [only] if matches!(
        nodes.get(*only).map(|n| &n.kind),
        Some(NodeKind::Alias { name, .. }) if name == "*"
    ))
}

/// Positional and keyword arguments in source order.
///
/// The tree keeps them in separate fields; the source interleaves them. When
/// any argument lacks a position the field order is kept.
fn argument_items(
    node: NodeId,
    nodes: &NodeArena,
    positional: &[NodeId],
    keywords: &[NodeId],
    file: &str,
) -> Vec<Vec<Directive>> {
    let mut entries: Vec<(Option<SourcePosition>, Vec<Directive>)> = positional
        .iter()
        .map(|arg| (nodes.position(*arg), vec![Visit(*arg)]))
        .collect();

    for &keyword in keywords {
        let Some(NodeKind::Keyword { arg, value }) = nodes.get(keyword).map(|n| &n.kind) else {
            entries.push((nodes.position(keyword), vec![Visit(keyword)]));
            continue;
        };
        let position = nodes.position(keyword).or_else(|| nodes.position(*value));
        let directives = match arg {
            Some(arg) => vec![
                Directive::name(keyword, arg),
                Directive::op(keyword, "="),
                Visit(*value),
            ],
            None => vec![Directive::op(keyword, "**"), Visit(*value)],
        };
        entries.push((position, directives));
    }

    if entries.iter().all(|(position, _)| position.is_some()) {
        entries.sort_by_key(|(position, _)| *position);
    } else if !positional.is_empty() && !keywords.is_empty() {
        log_warning!(
            codes::warnings::UNPOSITIONED_CALL_ARGUMENTS,
            "Arguments without positions; keeping field order",
            "file" => file,
            "node" => node
        );
    }

    entries.into_iter().map(|(_, directives)| directives).collect()
}

/// Spelling of a literal by its category
fn constant(node: NodeId, value: &ConstantValue, position: Option<SourcePosition>) -> Vec<Directive> {
    match value {
        ConstantValue::None => vec![Directive::name(node, "None")],
        ConstantValue::Bool(true) => vec![Directive::name(node, "True")],
        ConstantValue::Bool(false) => vec![Directive::name(node, "False")],
        ConstantValue::Ellipsis => vec![Directive::op(node, "...")],
        ConstantValue::Number(text) if text.starts_with('-') => {
            vec![Directive::op(node, "-"), Directive::ClaimNumber { node }]
        }
        ConstantValue::Number(_) => vec![Directive::ClaimNumber { node }],
        ConstantValue::Str(_) | ConstantValue::Bytes(_) => vec![Directive::ClaimStrings { node }],
        ConstantValue::Tuple(items) => {
            let items = items.iter().map(|v| constant(node, v, None)).collect();
            vec![Directive::Parenthesized {
                node,
                at: position,
                contents: GroupContents::Comma,
                body: tuple_body(node, items),
            }]
        }
        ConstantValue::FrozenSet(items) => {
            let items = items.iter().map(|v| constant(node, v, None)).collect();
            let mut out = vec![Directive::op(node, "{")];
            out.extend(comma_list(node, items, Ownership::Owned, true));
            out.push(Directive::op(node, "}"));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, TreeBuilder};
    use assert_matches::assert_matches;

    #[test]
    fn test_keyword_is_never_dispatched() {
        let mut t = TreeBuilder::new();
        let value = t.name("v", 1, 2);
        let keyword = t.add(NodeKind::Keyword { arg: Some("k".into()), value });
        let nodes = t.finish(keyword).unwrap();

        assert_matches!(
            directives_for(keyword, &nodes, None, "d.py"),
            Err(AlignmentError::UnreachableDispatch { kind: "Keyword", .. })
        );
    }

    #[test]
    fn test_formatted_value_is_never_dispatched() {
        let nodes = NodeArena::new(vec![
            AstNode::new(NodeKind::FormattedValue { value: NodeId(1) }),
            AstNode::new(NodeKind::Name { id: "x".into() }),
        ]);
        assert_matches!(
            directives_for(NodeId(0), &nodes, None, "d.py"),
            Err(AlignmentError::UnreachableDispatch { kind: "FormattedValue", .. })
        );
    }

    #[test]
    fn test_call_arguments_sorted_by_position() {
        // f(a, k=1, *b)
        let mut t = TreeBuilder::new();
        let f = t.name("f", 1, 0);
        let a = t.name("a", 1, 2);
        let one = t.number("1", 1, 7);
        let keyword = t.add_at(NodeKind::Keyword { arg: Some("k".into()), value: one }, 1, 5);
        let b = t.name("b", 1, 11);
        let starred = t.add_at(NodeKind::Starred { value: b }, 1, 10);
        let call = t.add_at(
            NodeKind::Call { func: f, args: vec![a, starred], keywords: vec![keyword] },
            1,
            0,
        );
        let nodes = t.finish(call).unwrap();

        let directives = directives_for(call, &nodes, None, "d.py").unwrap();
        assert_eq!(
            directives,
            vec![
                Visit(f),
                Directive::punct(call, "("),
                Visit(a),
                Directive::punct(call, ","),
                Directive::name(keyword, "k"),
                Directive::op(keyword, "="),
                Visit(one),
                Directive::punct(call, ","),
                Visit(starred),
                Directive::optional(call, ",", Ownership::Unowned),
                Directive::punct(call, ")"),
            ]
        );
    }

    #[test]
    fn test_if_keyword_follows_lookahead() {
        let mut t = TreeBuilder::new();
        let test = t.name("x", 1, 5);
        let pass = t.add(NodeKind::Pass);
        let node = t.add(NodeKind::If { test, body: vec![pass], orelse: vec![] });
        let nodes = t.finish(node).unwrap();

        let elif = Token::new(TokenKind::Name, "elif", 3, 0);
        let directives = directives_for(node, &nodes, Some(&elif), "d.py").unwrap();
        assert_eq!(directives[0], Directive::name(node, "elif"));

        let plain = Token::new(TokenKind::Name, "if", 1, 0);
        let directives = directives_for(node, &nodes, Some(&plain), "d.py").unwrap();
        assert_eq!(directives[0], Directive::name(node, "if"));
    }

    #[test]
    fn test_else_branch_lookahead() {
        let mut t = TreeBuilder::new();
        let test = t.name("y", 3, 5);
        let nested = t.add(NodeKind::If { test, body: vec![], orelse: vec![] });
        let outer_test = t.name("x", 1, 3);
        let outer = t.add(NodeKind::If { test: outer_test, body: vec![], orelse: vec![nested] });
        let nodes = t.finish(outer).unwrap();

        let elif = Token::new(TokenKind::Name, "elif", 3, 0);
        assert_eq!(else_branch(outer, &[nested], &nodes, Some(&elif)), vec![Visit(nested)]);

        let otherwise = Token::new(TokenKind::Name, "else", 3, 0);
        assert_eq!(
            else_branch(outer, &[nested], &nodes, Some(&otherwise)),
            vec![
                Directive::name(outer, "else"),
                Directive::op(outer, ":"),
                VisitEach(vec![nested]),
            ]
        );
    }

    #[test]
    fn test_relative_import_dots() {
        assert_eq!(relative_dots(NodeId(0), 4).len(), 2);
        assert_eq!(relative_dots(NodeId(0), 2), vec![
            Directive::op(NodeId(0), "."),
            Directive::op(NodeId(0), "."),
        ]);
    }

    #[test]
    fn test_simple_statement_allows_semicolon() {
        let nodes = NodeArena::new(vec![AstNode::new(NodeKind::Pass)]);
        let directives = directives_for(NodeId(0), &nodes, None, "d.py").unwrap();
        assert_eq!(
            directives,
            vec![
                Directive::name(NodeId(0), "pass"),
                Directive::optional(NodeId(0), ";", Ownership::Owned),
            ]
        );
    }
}
