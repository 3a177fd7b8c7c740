//! JSON output for lowered queries.
//!
//! The execution engine consumes a [`QuerySpec`]; when it lives in another
//! process the specification travels as JSON.
//!
//! - **Compact output** via [`to_json()`] - minimal whitespace for transmission
//! - **Pretty output** via [`to_json_pretty()`] - human-readable, 2-space indent
//!
//! Values are tagged with their type so timestamps, points and keys stay
//! distinguishable from plain strings and numbers.
//!
//! # Examples
//!
//! ```
//! use gql_lang::{ParsedQuery, Schema};
//! use gql_lang::output::to_json;
//!
//! let gql = ParsedQuery::parse("SELECT * FROM SomeKind WHERE prop1 = 5", None).unwrap();
//! let json = to_json(&gql.get_query(&Schema::new()).unwrap()).unwrap();
//!
//! assert!(json.contains(r#""kind":"SomeKind""#));
//! assert!(json.contains(r#""value":{"type":"integer","value":5}"#));
//! ```

use crate::lowering::QuerySpec;

pub fn to_json(spec: &QuerySpec) -> serde_json::Result<String> {
    serde_json::to_string(spec)
}

pub fn to_json_pretty(spec: &QuerySpec) -> serde_json::Result<String> {
    serde_json::to_string_pretty(spec)
}
