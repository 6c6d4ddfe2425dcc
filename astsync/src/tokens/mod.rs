//! Token model
//!
//! The token sequence of one unit is held in a [`TokenArena`]: an ordered,
//! indexable vector whose positions never change. Tokens are classified as
//! significant (names, operators, literals, the end marker) or insignificant
//! (comments, line breaks, indentation, whitespace); only significant tokens
//! take part in grammar alignment.

pub mod arena;
pub mod builder;
pub mod token;

pub use arena::{render, TokenArena};
pub use builder::TokenStreamBuilder;
pub use token::{describe, is_significant, Token, TokenIndex, TokenKind};
