//! Token-to-tree alignment
//!
//! A single forward pass over a unit's token sequence, driven by the tree:
//! each node's dispatch entry names the tokens that spell it, and the cursor
//! claims them in order. Comments and line breaks passed on the way are
//! attributed to nearby nodes. Any disagreement between the two inputs is
//! fatal for the unit.

pub mod claim;
pub mod context;
pub mod directive;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod grouping;
pub mod query;

pub use claim::{claim, claim_name, claim_operator};
pub use context::{ClaimRecord, TraversalContext};
pub use directive::{Directive, GroupContents, Ownership};
pub use dispatch::directives_for;
pub use driver::{align, align_unit, align_unit_with, align_with, Aligner, AlignmentSummary};
pub use error::{AlignmentError, AlignmentResult};
pub use grouping::{
    collect_concatenated_strings, group_holds, leading_group_parens, matching_close,
};
pub use query::{node_source, subtree, token_span, tokens_for_node};
