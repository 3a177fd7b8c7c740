//! # GQL - Syntax Tree
//!
//! This module defines the parsed form of a GQL statement, the SQL-like
//! query language used to address a datastore of kinds and properties.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Literals, parameters and filter terms
//! - **[operators]** - Condition operators, sort directions and hints
//! - **[query]** - The parsed statement and its filter keys
//!
//! ## Quick Start
//!
//! ```text
//! SELECT prop1, prop2 FROM SomeKind WHERE prop3 > 5 AND prop2 = 'xxx'
//!     ORDER BY prop4, prop1 DESC LIMIT 10 OFFSET 5 HINT ORDER_FIRST
//! ```
//!
//! ## Core Concepts
//!
//! ### Filters
//!
//! Conditions are grouped by `(property, operator)`. The right-hand side of
//! every condition is a [`FilterTerm`]: a function name plus arguments.
//!
//! - `prop = 'xxx'` → `('nop', [Literal('xxx')])`
//! - `prop = :ref` → `('nop', [:ref])`
//! - `prop IN (1, 2)` → `('list', [Literal(1), Literal(2)])`
//! - `prop = Date(2020, 3, 26)` → `('date', [Literal(2020), Literal(3), Literal(26)])`
//!
//! ### Ancestor
//!
//! `ANCESTOR IS <value>` is stored under a reserved target that no
//! property name can collide with. At most one is allowed.
//!
//! ### Quoted Identifiers
//!
//! Reserved words can still name properties when double-quoted:
//!
//! ```text
//! SELECT * FROM SomeKind WHERE "order" = 1
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod query;

pub use tokens::Token;
pub use expressions::{FilterArg, FilterTerm, Literal, Parameter};
pub use operators::{Direction, Hint, Operator};
pub use query::{FilterKey, FilterTarget, Filters, ParsedQuery};
