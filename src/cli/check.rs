//! Parse and lower GQL queries from the command line

use tracing::debug;

use super::{CliError, schema_from_json};
use crate::{GqlError, Lexer, ParsedQuery, Parser, QuerySpec, Schema};

/// Queries longer than this many characters are rejected before lexing.
pub const DEFAULT_MAX_LENGTH: usize = 65536;

/// Options for the check and compile commands
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The GQL query
    pub query: String,
    /// Namespace the statement runs in
    pub namespace: Option<String>,
    /// Schema JSON used to resolve property types
    pub schema: Option<String>,
    /// Only validate syntax, don't lower
    pub syntax_only: bool,
    /// Upper bound on query length, in characters
    pub max_length: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            query: String::new(),
            namespace: None,
            schema: None,
            syntax_only: false,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid(ParsedQuery),
    /// Query parsed and lowered
    Compiled {
        parsed: ParsedQuery,
        query: QuerySpec,
    },
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let length = options.query.chars().count();
    if length > options.max_length {
        return Err(GqlError::bad_query(format!(
            "Query is {} characters long; the limit is {}",
            length, options.max_length
        ))
        .into());
    }

    let parsed = Parser::new(Lexer::new(&options.query))?
        .with_namespace(options.namespace.as_deref())
        .parse_query()?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid(parsed));
    }

    let schema = match &options.schema {
        Some(text) => schema_from_json(text)?,
        None => Schema::new(),
    };
    debug!(schema = ?schema, "resolving property types");

    let query = parsed.get_query(&schema)?;
    Ok(CheckResult::Compiled { parsed, query })
}
