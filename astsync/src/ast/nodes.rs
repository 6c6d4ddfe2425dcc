//! Syntax tree node definitions
//!
//! Nodes are produced by the external parser and stored in a `NodeArena`.
//! Child links are `NodeId`s into the same arena; the aligner only ever
//! appends to `owned_tokens` and `comments`.

use super::operators::{BinaryOperator, BooleanOperator, ComparisonOperator, UnaryOperator};
use crate::tokens::TokenIndex;
use crate::utils::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identifier (index into the node arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Literal payload of a `Constant` node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ConstantValue {
    None,
    Bool(bool),
    Ellipsis,
    /// Canonical rendering; the source spelling may differ
    Number(String),
    Str(String),
    Bytes(String),
    Tuple(Vec<ConstantValue>),
    FrozenSet(Vec<ConstantValue>),
}

/// One syntax tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub owned_tokens: Vec<TokenIndex>,
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<TokenIndex>,
}

impl AstNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: None,
            parent: None,
            owned_tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn at(kind: NodeKind, line: u32, column: u32) -> Self {
        Self {
            position: Some(SourcePosition::new(line, column)),
            ..Self::new(kind)
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Grammar constructs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Module {
        body: Vec<NodeId>,
    },

    // Statements
    Expr {
        value: NodeId,
    },
    Assign {
        targets: Vec<NodeId>,
        value: NodeId,
    },
    AugAssign {
        target: NodeId,
        op: BinaryOperator,
        value: NodeId,
    },
    AnnAssign {
        target: NodeId,
        annotation: NodeId,
        value: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Pass,
    Break,
    Continue,
    Delete {
        targets: Vec<NodeId>,
    },
    Global {
        names: Vec<String>,
    },
    Nonlocal {
        names: Vec<String>,
    },
    Import {
        names: Vec<NodeId>,
    },
    ImportFrom {
        module: Option<String>,
        names: Vec<NodeId>,
        #[serde(default)]
        level: u32,
    },
    Alias {
        name: String,
        asname: Option<String>,
    },
    If {
        test: NodeId,
        body: Vec<NodeId>,
        #[serde(default)]
        orelse: Vec<NodeId>,
    },
    For {
        target: NodeId,
        iter: NodeId,
        body: Vec<NodeId>,
        #[serde(default)]
        orelse: Vec<NodeId>,
        #[serde(default)]
        is_async: bool,
    },
    While {
        test: NodeId,
        body: Vec<NodeId>,
        #[serde(default)]
        orelse: Vec<NodeId>,
    },
    With {
        items: Vec<NodeId>,
        body: Vec<NodeId>,
        #[serde(default)]
        is_async: bool,
    },
    WithItem {
        context_expr: NodeId,
        optional_vars: Option<NodeId>,
    },
    Try {
        body: Vec<NodeId>,
        #[serde(default)]
        handlers: Vec<NodeId>,
        #[serde(default)]
        orelse: Vec<NodeId>,
        #[serde(default)]
        finalbody: Vec<NodeId>,
    },
    ExceptHandler {
        exception: Option<NodeId>,
        name: Option<String>,
        body: Vec<NodeId>,
    },
    Raise {
        exc: Option<NodeId>,
        cause: Option<NodeId>,
    },
    Assert {
        test: NodeId,
        msg: Option<NodeId>,
    },
    FunctionDef {
        name: String,
        args: NodeId,
        body: Vec<NodeId>,
        #[serde(default)]
        decorators: Vec<NodeId>,
        returns: Option<NodeId>,
        #[serde(default)]
        is_async: bool,
    },
    ClassDef {
        name: String,
        #[serde(default)]
        bases: Vec<NodeId>,
        #[serde(default)]
        keywords: Vec<NodeId>,
        body: Vec<NodeId>,
        #[serde(default)]
        decorators: Vec<NodeId>,
    },

    // Parameters
    Arguments {
        #[serde(default)]
        posonlyargs: Vec<NodeId>,
        #[serde(default)]
        args: Vec<NodeId>,
        vararg: Option<NodeId>,
        #[serde(default)]
        kwonlyargs: Vec<NodeId>,
        /// One entry per keyword-only parameter
        #[serde(default)]
        kw_defaults: Vec<Option<NodeId>>,
        kwarg: Option<NodeId>,
        /// Defaults for the trailing positional parameters
        #[serde(default)]
        defaults: Vec<NodeId>,
    },
    Arg {
        name: String,
        annotation: Option<NodeId>,
    },

    // Expressions
    Lambda {
        args: NodeId,
        body: NodeId,
    },
    Call {
        func: NodeId,
        #[serde(default)]
        args: Vec<NodeId>,
        #[serde(default)]
        keywords: Vec<NodeId>,
    },
    /// Only unpacked inline by calls and class definitions
    Keyword {
        arg: Option<String>,
        value: NodeId,
    },
    Name {
        id: String,
    },
    Attribute {
        value: NodeId,
        attr: String,
    },
    Constant {
        value: ConstantValue,
    },
    JoinedStr {
        values: Vec<NodeId>,
    },
    /// Only reachable through a `JoinedStr`, which is aligned from its tokens
    FormattedValue {
        value: NodeId,
    },
    BinOp {
        left: NodeId,
        op: BinaryOperator,
        right: NodeId,
    },
    BoolOp {
        op: BooleanOperator,
        values: Vec<NodeId>,
    },
    Compare {
        left: NodeId,
        ops: Vec<ComparisonOperator>,
        comparators: Vec<NodeId>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: NodeId,
    },
    IfExp {
        test: NodeId,
        body: NodeId,
        orelse: NodeId,
    },
    Starred {
        value: NodeId,
    },
    Tuple {
        elts: Vec<NodeId>,
    },
    List {
        elts: Vec<NodeId>,
    },
    Set {
        elts: Vec<NodeId>,
    },
    Dict {
        /// `None` marks a `**mapping` entry
        keys: Vec<Option<NodeId>>,
        values: Vec<NodeId>,
    },
    ListComp {
        elt: NodeId,
        generators: Vec<NodeId>,
    },
    SetComp {
        elt: NodeId,
        generators: Vec<NodeId>,
    },
    GeneratorExp {
        elt: NodeId,
        generators: Vec<NodeId>,
    },
    DictComp {
        key: NodeId,
        value: NodeId,
        generators: Vec<NodeId>,
    },
    Comprehension {
        target: NodeId,
        iter: NodeId,
        #[serde(default)]
        ifs: Vec<NodeId>,
        #[serde(default)]
        is_async: bool,
    },
    Subscript {
        value: NodeId,
        slice: NodeId,
    },
    Slice {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
    },
    Await {
        value: NodeId,
    },
    Yield {
        value: Option<NodeId>,
    },
    YieldFrom {
        value: NodeId,
    },
    NamedExpr {
        target: NodeId,
        value: NodeId,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Module { .. } => "Module",
            Self::Expr { .. } => "Expr",
            Self::Assign { .. } => "Assign",
            Self::AugAssign { .. } => "AugAssign",
            Self::AnnAssign { .. } => "AnnAssign",
            Self::Return { .. } => "Return",
            Self::Pass => "Pass",
            Self::Break => "Break",
            Self::Continue => "Continue",
            Self::Delete { .. } => "Delete",
            Self::Global { .. } => "Global",
            Self::Nonlocal { .. } => "Nonlocal",
            Self::Import { .. } => "Import",
            Self::ImportFrom { .. } => "ImportFrom",
            Self::Alias { .. } => "Alias",
            Self::If { .. } => "If",
            Self::For { .. } => "For",
            Self::While { .. } => "While",
            Self::With { .. } => "With",
            Self::WithItem { .. } => "WithItem",
            Self::Try { .. } => "Try",
            Self::ExceptHandler { .. } => "ExceptHandler",
            Self::Raise { .. } => "Raise",
            Self::Assert { .. } => "Assert",
            Self::FunctionDef { .. } => "FunctionDef",
            Self::ClassDef { .. } => "ClassDef",
            Self::Arguments { .. } => "Arguments",
            Self::Arg { .. } => "Arg",
            Self::Lambda { .. } => "Lambda",
            Self::Call { .. } => "Call",
            Self::Keyword { .. } => "Keyword",
            Self::Name { .. } => "Name",
            Self::Attribute { .. } => "Attribute",
            Self::Constant { .. } => "Constant",
            Self::JoinedStr { .. } => "JoinedStr",
            Self::FormattedValue { .. } => "FormattedValue",
            Self::BinOp { .. } => "BinOp",
            Self::BoolOp { .. } => "BoolOp",
            Self::Compare { .. } => "Compare",
            Self::UnaryOp { .. } => "UnaryOp",
            Self::IfExp { .. } => "IfExp",
            Self::Starred { .. } => "Starred",
            Self::Tuple { .. } => "Tuple",
            Self::List { .. } => "List",
            Self::Set { .. } => "Set",
            Self::Dict { .. } => "Dict",
            Self::ListComp { .. } => "ListComp",
            Self::SetComp { .. } => "SetComp",
            Self::GeneratorExp { .. } => "GeneratorExp",
            Self::DictComp { .. } => "DictComp",
            Self::Comprehension { .. } => "Comprehension",
            Self::Subscript { .. } => "Subscript",
            Self::Slice { .. } => "Slice",
            Self::Await { .. } => "Await",
            Self::Yield { .. } => "Yield",
            Self::YieldFrom { .. } => "YieldFrom",
            Self::NamedExpr { .. } => "NamedExpr",
        }
    }

    /// Statement constructs; newline tokens are attributed to these
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::Expr { .. }
                | Self::Assign { .. }
                | Self::AugAssign { .. }
                | Self::AnnAssign { .. }
                | Self::Return { .. }
                | Self::Pass
                | Self::Break
                | Self::Continue
                | Self::Delete { .. }
                | Self::Global { .. }
                | Self::Nonlocal { .. }
                | Self::Import { .. }
                | Self::ImportFrom { .. }
                | Self::If { .. }
                | Self::For { .. }
                | Self::While { .. }
                | Self::With { .. }
                | Self::Try { .. }
                | Self::Raise { .. }
                | Self::Assert { .. }
                | Self::FunctionDef { .. }
                | Self::ClassDef { .. }
        )
    }

    /// Simple statements may be followed by a `;` on the same line
    pub fn is_simple_statement(&self) -> bool {
        self.is_statement()
            && !matches!(
                self,
                Self::If { .. }
                    | Self::For { .. }
                    | Self::While { .. }
                    | Self::With { .. }
                    | Self::Try { .. }
                    | Self::FunctionDef { .. }
                    | Self::ClassDef { .. }
            )
    }

    /// Kinds that only ever appear unpacked inside their parent's spelling
    pub fn is_inline_only(&self) -> bool {
        matches!(self, Self::Keyword { .. } | Self::FormattedValue { .. })
    }

    /// Child ids in field order
    pub fn children(&self) -> Vec<NodeId> {
        fn opt(out: &mut Vec<NodeId>, id: &Option<NodeId>) {
            out.extend(id.iter().copied());
        }

        let mut out = Vec::new();
        match self {
            Self::Module { body } => out.extend(body),
            Self::Expr { value }
            | Self::Starred { value }
            | Self::Await { value }
            | Self::YieldFrom { value }
            | Self::FormattedValue { value } => out.push(*value),
            Self::Assign { targets, value } => {
                out.extend(targets);
                out.push(*value);
            }
            Self::AugAssign { target, value, .. } => out.extend([*target, *value]),
            Self::AnnAssign {
                target,
                annotation,
                value,
            } => {
                out.extend([*target, *annotation]);
                opt(&mut out, value);
            }
            Self::Return { value } | Self::Yield { value } => opt(&mut out, value),
            Self::Pass
            | Self::Break
            | Self::Continue
            | Self::Global { .. }
            | Self::Nonlocal { .. }
            | Self::Alias { .. }
            | Self::Name { .. }
            | Self::Constant { .. } => {}
            Self::Delete { targets } => out.extend(targets),
            Self::Import { names } | Self::ImportFrom { names, .. } => out.extend(names),
            Self::If { test, body, orelse } | Self::While { test, body, orelse } => {
                out.push(*test);
                out.extend(body);
                out.extend(orelse);
            }
            Self::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                out.extend([*target, *iter]);
                out.extend(body);
                out.extend(orelse);
            }
            Self::With { items, body, .. } => {
                out.extend(items);
                out.extend(body);
            }
            Self::WithItem {
                context_expr,
                optional_vars,
            } => {
                out.push(*context_expr);
                opt(&mut out, optional_vars);
            }
            Self::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                out.extend(body);
                out.extend(handlers);
                out.extend(orelse);
                out.extend(finalbody);
            }
            Self::ExceptHandler {
                exception, body, ..
            } => {
                opt(&mut out, exception);
                out.extend(body);
            }
            Self::Raise { exc, cause } => {
                opt(&mut out, exc);
                opt(&mut out, cause);
            }
            Self::Assert { test, msg } => {
                out.push(*test);
                opt(&mut out, msg);
            }
            Self::FunctionDef {
                args,
                body,
                decorators,
                returns,
                ..
            } => {
                out.extend(decorators);
                out.push(*args);
                opt(&mut out, returns);
                out.extend(body);
            }
            Self::ClassDef {
                bases,
                keywords,
                body,
                decorators,
                ..
            } => {
                out.extend(decorators);
                out.extend(bases);
                out.extend(keywords);
                out.extend(body);
            }
            Self::Arguments {
                posonlyargs,
                args,
                vararg,
                kwonlyargs,
                kw_defaults,
                kwarg,
                defaults,
            } => {
                out.extend(posonlyargs);
                out.extend(args);
                opt(&mut out, vararg);
                out.extend(kwonlyargs);
                out.extend(kw_defaults.iter().flatten());
                opt(&mut out, kwarg);
                out.extend(defaults);
            }
            Self::Arg { annotation, .. } => opt(&mut out, annotation),
            Self::Lambda { args, body } => out.extend([*args, *body]),
            Self::Call {
                func,
                args,
                keywords,
            } => {
                out.push(*func);
                out.extend(args);
                out.extend(keywords);
            }
            Self::Keyword { value, .. } | Self::Attribute { value, .. } => out.push(*value),
            Self::JoinedStr { values } => out.extend(values),
            Self::BinOp { left, right, .. } => out.extend([*left, *right]),
            Self::BoolOp { values, .. } => out.extend(values),
            Self::Compare {
                left, comparators, ..
            } => {
                out.push(*left);
                out.extend(comparators);
            }
            Self::UnaryOp { operand, .. } => out.push(*operand),
            Self::IfExp { test, body, orelse } => out.extend([*test, *body, *orelse]),
            Self::Tuple { elts } | Self::List { elts } | Self::Set { elts } => out.extend(elts),
            Self::Dict { keys, values } => {
                out.extend(keys.iter().flatten());
                out.extend(values);
            }
            Self::ListComp { elt, generators }
            | Self::SetComp { elt, generators }
            | Self::GeneratorExp { elt, generators } => {
                out.push(*elt);
                out.extend(generators);
            }
            Self::DictComp {
                key,
                value,
                generators,
            } => {
                out.extend([*key, *value]);
                out.extend(generators);
            }
            Self::Comprehension {
                target, iter, ifs, ..
            } => {
                out.extend([*target, *iter]);
                out.extend(ifs);
            }
            Self::Subscript { value, slice } => out.extend([*value, *slice]),
            Self::Slice { lower, upper, step } => {
                opt(&mut out, lower);
                opt(&mut out, upper);
                opt(&mut out, step);
            }
            Self::NamedExpr { target, value } => out.extend([*target, *value]),
        }
        out
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_json_shape() {
        let json = r#"{"type":"Call","func":1,"args":[2],"position":{"line":3,"column":4}}"#;
        let node: AstNode = serde_json::from_str(json).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Call {
                func: NodeId(1),
                args: vec![NodeId(2)],
                keywords: vec![],
            }
        );
        assert_eq!(node.position, Some(SourcePosition::new(3, 4)));
        assert!(node.owned_tokens.is_empty());
    }

    #[test]
    fn test_constant_json_shape() {
        let json = r#"{"type":"Constant","value":{"kind":"Number","value":"1e3"}}"#;
        let node: AstNode = serde_json::from_str(json).unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Constant {
                value: ConstantValue::Number("1e3".into())
            }
        );

        let none = r#"{"type":"Constant","value":{"kind":"None"}}"#;
        let node: AstNode = serde_json::from_str(none).unwrap();
        assert_eq!(node.kind, NodeKind::Constant { value: ConstantValue::None });
    }

    #[test]
    fn test_children_field_order() {
        let kind = NodeKind::FunctionDef {
            name: "f".into(),
            args: NodeId(2),
            body: vec![NodeId(3)],
            decorators: vec![NodeId(1)],
            returns: Some(NodeId(4)),
            is_async: false,
        };
        assert_eq!(kind.children(), vec![NodeId(1), NodeId(2), NodeId(4), NodeId(3)]);
    }

    #[test]
    fn test_statement_classification() {
        assert!(NodeKind::Pass.is_statement());
        assert!(NodeKind::Pass.is_simple_statement());
        assert!(!NodeKind::Module { body: vec![] }.is_statement());
        assert!(!NodeKind::Name { id: "x".into() }.is_statement());
        assert!(NodeKind::Keyword {
            arg: None,
            value: NodeId(0)
        }
        .is_inline_only());
    }
}
