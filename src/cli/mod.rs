//! CLI support for gql-lang
//!
//! Provides programmatic access to the `gql` commands for embedding in
//! other tools.

mod check;
mod convert;

pub use check::{execute_check, CheckOptions, CheckResult, DEFAULT_MAX_LENGTH};
pub use convert::schema_from_json;

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Malformed query or misuse of a marker function
    #[error(transparent)]
    Gql(#[from] crate::GqlError),

    /// Schema or output JSON error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No query provided
    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
}
