//! Syntax tree model
//!
//! The external parser's tree is stored in a [`NodeArena`] and addressed by
//! [`NodeId`]. Node kinds form a closed enum so the alignment dispatch table
//! is checked for exhaustiveness at compile time.

pub mod arena;
pub mod builder;
pub mod nodes;
pub mod operators;

pub use arena::{NodeArena, TreeError, TreeResult};
pub use builder::TreeBuilder;
pub use nodes::{AstNode, ConstantValue, NodeId, NodeKind};
pub use operators::{BinaryOperator, BooleanOperator, ComparisonOperator, UnaryOperator};
