pub mod alignment;
pub mod ast;
pub mod batch;
pub mod config;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod tokens;
pub mod unit;
pub mod utils;

pub use alignment::{align, align_unit, AlignmentError, AlignmentResult, AlignmentSummary};
pub use ast::{AstNode, NodeArena, NodeId, NodeKind};
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use pipeline::{AlignmentReport, PipelineError, PipelineResult};
pub use tokens::{Token, TokenArena, TokenKind};
pub use unit::{AlignmentUnit, UnitError, UnitResult};
