//! Shared source-location helpers used by tokens, nodes and diagnostics

pub mod span;

pub use span::{SourcePosition, Span};
