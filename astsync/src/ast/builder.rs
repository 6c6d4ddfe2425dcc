//! Fluent tree construction for fixtures and host bindings

use super::arena::{NodeArena, TreeResult};
use super::nodes::{AstNode, ConstantValue, NodeId, NodeKind};

/// Pushes nodes into an arena and hands back their ids
#[derive(Default)]
pub struct TreeBuilder {
    arena: NodeArena,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node without a source position
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.arena.push(AstNode::new(kind))
    }

    /// Node starting at `line` (1-based), `column` (0-based)
    pub fn add_at(&mut self, kind: NodeKind, line: u32, column: u32) -> NodeId {
        self.arena.push(AstNode::at(kind, line, column))
    }

    pub fn name(&mut self, id: &str, line: u32, column: u32) -> NodeId {
        self.add_at(NodeKind::Name { id: id.to_string() }, line, column)
    }

    pub fn constant(&mut self, value: ConstantValue, line: u32, column: u32) -> NodeId {
        self.add_at(NodeKind::Constant { value }, line, column)
    }

    pub fn number(&mut self, text: &str, line: u32, column: u32) -> NodeId {
        self.constant(ConstantValue::Number(text.to_string()), line, column)
    }

    pub fn string(&mut self, text: &str, line: u32, column: u32) -> NodeId {
        self.constant(ConstantValue::Str(text.to_string()), line, column)
    }

    /// Statement wrapping an expression
    pub fn expr(&mut self, value: NodeId, line: u32, column: u32) -> NodeId {
        self.add_at(NodeKind::Expr { value }, line, column)
    }

    pub fn module(&mut self, body: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::Module { body })
    }

    /// Parameter list with only plain positional parameters
    pub fn plain_arguments(&mut self, args: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::Arguments {
            posonlyargs: vec![],
            args,
            vararg: None,
            kwonlyargs: vec![],
            kw_defaults: vec![],
            kwarg: None,
            defaults: vec![],
        })
    }

    /// Link parents from `root` and return the validated arena
    pub fn finish(mut self, root: NodeId) -> TreeResult<NodeArena> {
        self.arena.link_parents(root)?;
        Ok(self.arena)
    }
}
