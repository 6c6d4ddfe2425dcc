//! Node storage with parent links and structural validation

use super::nodes::{AstNode, NodeId};
use crate::logging::{codes, Code};
use crate::utils::SourcePosition;
use serde::{Deserialize, Serialize};
use std::ops::Index;

pub type TreeResult<T> = Result<T, TreeError>;

/// Structural problems in a parsed tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("Root {root} is not a node of this tree ({count} nodes)")]
    InvalidRoot { root: NodeId, count: usize },

    #[error("{parent_kind} {parent} refers to missing node {child}")]
    InvalidReference {
        parent: NodeId,
        parent_kind: &'static str,
        child: NodeId,
    },

    #[error("Node {node} is reachable from both {first_parent} and {second_parent}")]
    ReachedTwice {
        node: NodeId,
        first_parent: NodeId,
        second_parent: NodeId,
    },

    #[error("Node {node} is its own ancestor")]
    Cycle { node: NodeId },
}

impl TreeError {
    pub fn error_code(&self) -> Code {
        match self {
            TreeError::InvalidRoot { .. } | TreeError::InvalidReference { .. } => {
                codes::unit::INVALID_NODE_REFERENCE
            }
            TreeError::ReachedTwice { .. } | TreeError::Cycle { .. } => {
                codes::unit::NODE_REACHED_TWICE
            }
        }
    }
}

/// All nodes of one unit, addressed by `NodeId`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AstNode>", into = "Vec<AstNode>")]
pub struct NodeArena {
    nodes: Vec<AstNode>,
}

impl NodeArena {
    pub fn new(nodes: Vec<AstNode>) -> Self {
        Self { nodes }
    }

    pub fn push(&mut self, node: AstNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AstNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AstNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn kind_name(&self, id: NodeId) -> &'static str {
        self.get(id).map_or("<missing>", AstNode::name)
    }

    pub fn position(&self, id: NodeId) -> Option<SourcePosition> {
        self.get(id).and_then(|n| n.position)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Nearest statement at or above `id`; the module itself never counts
    pub fn statement_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if node.kind.is_statement() {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// Compute parent links for every node reachable from `root`.
    ///
    /// Rejects dangling child ids, nodes shared between two parents and cycles.
    pub fn link_parents(&mut self, root: NodeId) -> TreeResult<()> {
        if root.0 >= self.nodes.len() {
            return Err(TreeError::InvalidRoot {
                root,
                count: self.nodes.len(),
            });
        }

        for node in &mut self.nodes {
            node.parent = None;
        }

        let mut reached = vec![false; self.nodes.len()];
        reached[root.0] = true;
        let mut pending = vec![root];

        while let Some(parent) = pending.pop() {
            let children = self.nodes[parent.0].kind.children();
            for child in children {
                if child.0 >= self.nodes.len() {
                    return Err(TreeError::InvalidReference {
                        parent,
                        parent_kind: self.kind_name(parent),
                        child,
                    });
                }
                if reached[child.0] {
                    return Err(if self.is_ancestor(child, parent) {
                        TreeError::Cycle { node: child }
                    } else {
                        TreeError::ReachedTwice {
                            node: child,
                            first_parent: self.nodes[child.0].parent.unwrap_or(root),
                            second_parent: parent,
                        }
                    });
                }
                reached[child.0] = true;
                self.nodes[child.0].parent = Some(parent);
                pending.push(child);
            }
        }

        Ok(())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Clear alignment annotations, keeping structure and parent links
    pub fn clear_annotations(&mut self) {
        for node in &mut self.nodes {
            node.owned_tokens.clear();
            node.comments.clear();
        }
    }
}

impl From<Vec<AstNode>> for NodeArena {
    fn from(nodes: Vec<AstNode>) -> Self {
        Self::new(nodes)
    }
}

impl From<NodeArena> for Vec<AstNode> {
    fn from(arena: NodeArena) -> Self {
        arena.nodes
    }
}

impl Index<NodeId> for NodeArena {
    type Output = AstNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}
