//! Error types for gql-lang.
//!
//! Every user-facing failure is a [`GqlError::BadQuery`]. The only other
//! variant flags direct use of the `nop` and `user` marker functions.

use thiserror::Error;

use crate::lexer::Position;

/// A lexical failure with the offset it happened at.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at position {position}")]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl LexError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        LexError {
            position,
            message: message.into(),
        }
    }
}

/// GQL error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GqlError {
    /// Malformed query: lexical, grammar, semantic or cast violation.
    #[error("Bad query: {0}")]
    BadQuery(String),

    /// An internal marker function was invoked as a cast.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl GqlError {
    pub fn bad_query(message: impl Into<String>) -> Self {
        GqlError::BadQuery(message.into())
    }

    pub fn is_bad_query(&self) -> bool {
        matches!(self, GqlError::BadQuery(_))
    }
}

impl From<LexError> for GqlError {
    fn from(e: LexError) -> Self {
        GqlError::BadQuery(e.to_string())
    }
}

/// Result type for GQL operations
pub type GqlResult<T> = Result<T, GqlError>;

impl serde::Serialize for GqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
