use std::fmt;

use serde::Serialize;

use crate::{functions::TermFunction, value::Value};

/// Parameter marker bound by the caller at execution time.
///
/// # Examples
/// ```text
/// :1      // Positional(1)
/// :ref    // Named("ref")
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Parameter {
    Positional(u32),
    Named(String),
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Positional(n) => write!(f, ":{}", n),
            Parameter::Named(name) => write!(f, ":{}", name),
        }
    }
}

/// A scalar parsed from the query text.
///
/// Holds exactly one string, integer, float, boolean or null; two literals
/// are equal when their values are. The repr writes the value as GQL text,
/// so quotes inside strings are doubled (`Literal('it''s')`).
///
/// # Examples
///
/// ```
/// use gql_lang::{Literal, Value};
///
/// let literal = Literal::new(Value::String("abc".into()));
/// assert_eq!(literal.get(), &Value::String("abc".into()));
/// assert_eq!(literal.to_string(), "Literal('abc')");
/// assert_eq!(Literal::from("it's").to_string(), "Literal('it''s')");
/// assert_eq!(literal, Literal::new(Value::String("abc".into())));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Literal(Value);

impl Literal {
    pub fn new(value: Value) -> Self {
        Literal(value)
    }

    pub fn get(&self) -> &Value {
        &self.0
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal(Value::Integer(n))
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal(Value::Float(n))
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal(Value::Boolean(b))
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal(Value::String(s.to_string()))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Literal({})", self.0)
    }
}

/// One argument of a filter term.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    /// A literal scalar
    Literal(Literal),

    /// A deferred parameter reference
    Parameter(Parameter),

    /// A nested cast, only found inside `IN (...)` lists
    ///
    /// # Example
    /// ```text
    /// prop IN (Date(2020, 1, 1), Date(2021, 1, 1))
    /// ```
    Term(FilterTerm),
}

impl FilterArg {
    pub fn is_parameter(&self) -> bool {
        matches!(self, FilterArg::Parameter(_))
    }
}

impl From<Literal> for FilterArg {
    fn from(literal: Literal) -> Self {
        FilterArg::Literal(literal)
    }
}

impl From<Parameter> for FilterArg {
    fn from(param: Parameter) -> Self {
        FilterArg::Parameter(param)
    }
}

impl fmt::Display for FilterArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterArg::Literal(literal) => write!(f, "{}", literal),
            FilterArg::Parameter(param) => write!(f, "{}", param),
            FilterArg::Term(term) => write!(f, "{}", term),
        }
    }
}

/// The right-hand side of a condition: a function applied to arguments.
///
/// Plain values use the internal `nop` marker, `IN (...)` lists use `list`,
/// and explicit casts (`Date(...)`, `Key(...)`) name their function.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    pub function: TermFunction,
    pub args: Vec<FilterArg>,
}

impl FilterTerm {
    pub fn new(function: TermFunction, args: Vec<FilterArg>) -> Self {
        FilterTerm { function, args }
    }

    /// Term for a single plain value or parameter.
    pub fn nop(arg: impl Into<FilterArg>) -> Self {
        FilterTerm {
            function: TermFunction::Nop,
            args: vec![arg.into()],
        }
    }

    pub fn is_parameterized(&self) -> bool {
        self.args.iter().any(|arg| match arg {
            FilterArg::Parameter(_) => true,
            FilterArg::Term(term) => term.is_parameterized(),
            FilterArg::Literal(_) => false,
        })
    }
}

impl fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', [", self.function)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str("])")
    }
}
