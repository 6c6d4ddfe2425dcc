//! Operator enums with their concrete spelling

use crate::tokens::TokenKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl BinaryOperator {
    pub fn spelling(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mult => "*",
            Self::MatMult => "@",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::FloorDiv => "//",
        }
    }

    /// Spelling of the augmented assignment form (`+=`)
    pub fn augmented(self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mult => "*=",
            Self::MatMult => "@=",
            Self::Div => "/=",
            Self::Mod => "%=",
            Self::Pow => "**=",
            Self::LShift => "<<=",
            Self::RShift => ">>=",
            Self::BitOr => "|=",
            Self::BitXor => "^=",
            Self::BitAnd => "&=",
            Self::FloorDiv => "//=",
        }
    }
}

/// `and` / `or`; spelled as names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOperator {
    And,
    Or,
}

impl BooleanOperator {
    pub fn spelling(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl ComparisonOperator {
    /// Tokens spelling the operator; `not in` and `is not` take two
    pub fn tokens(self) -> &'static [(TokenKind, &'static str)] {
        use TokenKind::{Name, Operator};
        match self {
            Self::Eq => &[(Operator, "==")],
            Self::NotEq => &[(Operator, "!=")],
            Self::Lt => &[(Operator, "<")],
            Self::LtE => &[(Operator, "<=")],
            Self::Gt => &[(Operator, ">")],
            Self::GtE => &[(Operator, ">=")],
            Self::Is => &[(Name, "is")],
            Self::IsNot => &[(Name, "is"), (Name, "not")],
            Self::In => &[(Name, "in")],
            Self::NotIn => &[(Name, "not"), (Name, "in")],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub fn token(self) -> (TokenKind, &'static str) {
        match self {
            Self::Invert => (TokenKind::Operator, "~"),
            Self::Not => (TokenKind::Name, "not"),
            Self::UAdd => (TokenKind::Operator, "+"),
            Self::USub => (TokenKind::Operator, "-"),
        }
    }
}
