use std::fmt;

use serde::Serialize;

use crate::ast::Token;

/// Condition operators.
///
/// Variant order follows the operator text so sorted filter keys come out
/// in a stable, readable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Operator {
    /// Not equal (`!=`)
    #[serde(rename = "!=")]
    NotEqual,
    /// Less than (`<`)
    #[serde(rename = "<")]
    LessThan,
    /// Less than or equal (`<=`)
    #[serde(rename = "<=")]
    LessEqual,
    /// Equal (`=`)
    #[serde(rename = "=")]
    Equal,
    /// Greater than (`>`)
    #[serde(rename = ">")]
    GreaterThan,
    /// Greater than or equal (`>=`)
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Membership (`IN`)
    #[serde(rename = "in")]
    In,
    /// Ancestor match (`IS`), only valid after `ANCESTOR`
    #[serde(rename = "is")]
    Is,
}

impl Operator {
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Eq => Some(Operator::Equal),
            Token::NotEq => Some(Operator::NotEqual),
            Token::Lt => Some(Operator::LessThan),
            Token::LtEq => Some(Operator::LessEqual),
            Token::Gt => Some(Operator::GreaterThan),
            Token::GtEq => Some(Operator::GreaterEqual),
            Token::In => Some(Operator::In),
            Token::Is => Some(Operator::Is),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::In => "in",
            Operator::Is => "is",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of an `ORDER BY` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Direction {
    Ascending = 1,
    Descending = 2,
}

/// Execution strategy suggestion from the `HINT` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Hint {
    OrderFirst,
    FilterFirst,
    AncestorFirst,
}

impl Hint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hint::OrderFirst => "ORDER_FIRST",
            Hint::FilterFirst => "FILTER_FIRST",
            Hint::AncestorFirst => "ANCESTOR_FIRST",
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
