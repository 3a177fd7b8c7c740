//! GQL compiler: parses SQL-like datastore queries and lowers them into
//! immutable query specifications.
//!
//! ```
//! use gql_lang::{ParsedQuery, Schema};
//!
//! let gql = ParsedQuery::parse(
//!     "SELECT prop1, prop2 FROM SomeKind WHERE prop3 > 5 AND prop2 = 'xxx' \
//!      ORDER BY prop4, prop1 DESC LIMIT 10 OFFSET 5 HINT ORDER_FIRST",
//!     Some("test-namespace"),
//! )
//! .unwrap();
//! let query = gql.get_query(&Schema::new()).unwrap();
//! assert_eq!(query.kind(), Some("SomeKind"));
//! assert_eq!(query.offset(), 5);
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod functions;
pub mod key;
pub mod lexer;
pub mod lowering;
pub mod output;
pub mod parser;
pub mod schema;
pub mod value;

pub use ast::{
    Direction, FilterArg, FilterKey, FilterTarget, FilterTerm, Filters, Hint, Literal, Operator,
    Parameter, ParsedQuery, Token,
};
pub use error::{GqlError, GqlResult, LexError};
pub use functions::{CastFunction, CastOutput, TermFunction};
pub use key::{Key, KeyId, PathElement};
pub use lexer::{Lexer, Position, Spanned};
pub use lowering::{Deferred, FilterNode, PropertyOrder, QuerySpec};
pub use output::{to_json, to_json_pretty};
pub use parser::Parser;
pub use schema::{PropertyResolver, PropertyType, Schema};
pub use value::{GeoPt, Value};

/// Pseudo-property naming the entity key; projecting only it makes a
/// keys-only query.
pub const KEY_PROPERTY: &str = "__key__";
