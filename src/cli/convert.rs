//! Schema loading for the CLI

use super::CliError;
use crate::Schema;

/// Parse a schema document of shape `{"Kind": {"prop": "integer"}}`.
pub fn schema_from_json(text: &str) -> Result<Schema, CliError> {
    Ok(serde_json::from_str(text)?)
}
