//! Lowering of a parsed statement into the query specification handed to
//! the execution engine.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    ast::{FilterArg, FilterTarget, FilterTerm, Hint, Operator, Parameter, ParsedQuery},
    error::{GqlError, GqlResult},
    functions::{self, CastFunction, CastOutput, TermFunction},
    schema::{PropertyResolver, PropertyType},
    value::Value,
};

/// A filter value that may still wait on parameters.
///
/// Only values that mention a parameter stay deferred; the function name of
/// a deferred cast tells the execution layer how to coerce the bound value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Deferred {
    Value { value: Value },
    Parameter { parameter: Parameter },
    Function { function: CastFunction, args: Vec<Deferred> },
}

impl Deferred {
    pub fn is_parameterized(&self) -> bool {
        !matches!(self, Deferred::Value { .. })
    }
}

impl fmt::Display for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Value { value } => write!(f, "{}", value),
            Deferred::Parameter {
                parameter: Parameter::Positional(n),
            } => write!(f, "Parameter({})", n),
            Deferred::Parameter {
                parameter: Parameter::Named(name),
            } => write!(f, "Parameter('{}')", name),
            Deferred::Function { function, args } => {
                write!(f, "ParameterizedFunction('{}', [", function)?;
                write_list(f, args)?;
                f.write_str("])")
            }
        }
    }
}

/// Node of the filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterNode {
    /// `property op value` with a concrete value
    Comparison {
        property: String,
        op: Operator,
        value: Value,
    },
    /// `property op value` where the value is bound at execution time
    Parameter {
        property: String,
        op: Operator,
        value: Deferred,
    },
    And { nodes: Vec<FilterNode> },
    Or { nodes: Vec<FilterNode> },
}

impl FilterNode {
    pub fn comparison(property: impl Into<String>, op: Operator, value: Value) -> Self {
        FilterNode::Comparison {
            property: property.into(),
            op,
            value,
        }
    }

    /// Conjunction of `nodes`; a single node stands for itself.
    pub fn and(mut nodes: Vec<FilterNode>) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(FilterNode::And { nodes }),
        }
    }

    /// Disjunction of `nodes`; a single node stands for itself.
    pub fn or(mut nodes: Vec<FilterNode>) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(FilterNode::Or { nodes }),
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Comparison {
                property,
                op,
                value,
            } => write!(f, "FilterNode('{}', '{}', {})", property, op, value),
            FilterNode::Parameter {
                property,
                op,
                value,
            } => write!(f, "ParameterNode('{}', '{}', {})", property, op, value),
            FilterNode::And { nodes } => {
                f.write_str("AND(")?;
                write_list(f, nodes)?;
                f.write_str(")")
            }
            FilterNode::Or { nodes } => {
                f.write_str("OR(")?;
                write_list(f, nodes)?;
                f.write_str(")")
            }
        }
    }
}

/// One `ORDER BY` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyOrder {
    pub name: String,
    pub reverse: bool,
}

impl fmt::Display for PropertyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyOrder(name='{}', reverse={})", self.name, self.reverse)
    }
}

/// The lowered query, ready for an execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    kind: Option<String>,
    namespace: Option<String>,
    ancestor: Option<Deferred>,
    filters: Option<FilterNode>,
    order_by: Vec<PropertyOrder>,
    limit: Option<u64>,
    offset: u64,
    projection: Vec<String>,
    keys_only: bool,
    distinct_on: Option<Vec<String>>,
    hint: Option<Hint>,
}

impl QuerySpec {
    /// `None` means a kindless scan.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn ancestor(&self) -> Option<&Deferred> {
        self.ancestor.as_ref()
    }

    pub fn filters(&self) -> Option<&FilterNode> {
        self.filters.as_ref()
    }

    pub fn order_by(&self) -> &[PropertyOrder] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn keys_only(&self) -> bool {
        self.keys_only
    }

    pub fn distinct_on(&self) -> Option<&[String]> {
        self.distinct_on.as_deref()
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    f.write_str("[")?;
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "'{}'", name)?;
    }
    f.write_str("]")
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Query(")?;
        let mut sep = "";
        let mut field = |f: &mut fmt::Formatter<'_>, name: &str| -> fmt::Result {
            write!(f, "{}{}=", sep, name)?;
            sep = ", ";
            Ok(())
        };

        if let Some(ns) = &self.namespace {
            field(f, "namespace")?;
            write!(f, "'{}'", ns)?;
        }
        if let Some(kind) = &self.kind {
            field(f, "kind")?;
            write!(f, "'{}'", kind)?;
        }
        if let Some(ancestor) = &self.ancestor {
            field(f, "ancestor")?;
            write!(f, "{}", ancestor)?;
        }
        if let Some(filters) = &self.filters {
            field(f, "filters")?;
            write!(f, "{}", filters)?;
        }
        if !self.order_by.is_empty() {
            field(f, "order_by")?;
            f.write_str("[")?;
            write_list(f, &self.order_by)?;
            f.write_str("]")?;
        }
        if let Some(limit) = self.limit {
            field(f, "limit")?;
            write!(f, "{}", limit)?;
        }
        if self.offset > 0 {
            field(f, "offset")?;
            write!(f, "{}", self.offset)?;
        }
        if !self.projection.is_empty() {
            field(f, "projection")?;
            write_names(f, &self.projection)?;
        }
        if self.keys_only {
            field(f, "keys_only")?;
            f.write_str("true")?;
        }
        if let Some(distinct_on) = &self.distinct_on {
            field(f, "distinct_on")?;
            write_names(f, distinct_on)?;
        }
        if let Some(hint) = self.hint {
            field(f, "hint")?;
            write!(f, "{}", hint)?;
        }
        f.write_str(")")
    }
}

/// A cast either evaluated now or left for execution time.
enum Resolved {
    Ready(CastOutput),
    Deferred(Deferred),
}

fn resolve_arg(arg: &FilterArg, namespace: Option<&str>) -> GqlResult<Deferred> {
    match arg {
        FilterArg::Literal(literal) => Ok(Deferred::Value {
            value: literal.get().clone(),
        }),
        FilterArg::Parameter(parameter) => Ok(Deferred::Parameter {
            parameter: parameter.clone(),
        }),
        FilterArg::Term(term) => match resolve_term(term, namespace)? {
            Resolved::Ready(CastOutput::Value(value)) => Ok(Deferred::Value { value }),
            Resolved::Ready(CastOutput::List(_)) => {
                Err(GqlError::bad_query("Lists cannot be nested"))
            }
            Resolved::Deferred(deferred) => Ok(deferred),
        },
    }
}

/// Evaluates a term's cast unless one of its arguments is a parameter.
fn resolve_term(term: &FilterTerm, namespace: Option<&str>) -> GqlResult<Resolved> {
    let args = term
        .args
        .iter()
        .map(|arg| resolve_arg(arg, namespace))
        .collect::<GqlResult<Vec<_>>>()?;

    let TermFunction::Cast(function) = term.function else {
        return match args.into_iter().next() {
            Some(Deferred::Value { value }) => Ok(Resolved::Ready(CastOutput::Value(value))),
            Some(deferred) => Ok(Resolved::Deferred(deferred)),
            None => Err(GqlError::bad_query("Missing value in condition")),
        };
    };

    if args.iter().any(Deferred::is_parameterized) {
        return Ok(Resolved::Deferred(Deferred::Function { function, args }));
    }

    let values: Vec<Value> = args
        .into_iter()
        .filter_map(|arg| match arg {
            Deferred::Value { value } => Some(value),
            _ => None,
        })
        .collect();
    function.apply(&values, namespace).map(Resolved::Ready)
}

/// Coerces a plain literal to the way `ty` stores it.
fn coerce(value: Value, ty: PropertyType) -> GqlResult<Value> {
    match (ty, value) {
        (PropertyType::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (PropertyType::Timestamp, Value::String(text)) => functions::parse_datetime(&text)
            .or_else(|_| functions::parse_date(&text))
            .map(Value::Timestamp)
            .map_err(|_| {
                GqlError::bad_query(format!("Parameter '{}' is not a valid timestamp", text))
            }),
        (PropertyType::TimeOfDay, Value::String(text)) => {
            functions::parse_time(&text).map(Value::Timestamp)
        }
        (_, value) => Ok(value),
    }
}

fn lower_term(
    property: &str,
    op: Operator,
    term: &FilterTerm,
    ty: PropertyType,
    namespace: Option<&str>,
) -> GqlResult<FilterNode> {
    let plain = term.function == TermFunction::Nop;

    match resolve_term(term, namespace)? {
        Resolved::Deferred(value) => Ok(FilterNode::Parameter {
            property: property.to_string(),
            op,
            value,
        }),
        Resolved::Ready(CastOutput::List(values)) => {
            if op != Operator::In {
                return Err(GqlError::bad_query(format!(
                    "Only IN can process a list of values, given '{}'",
                    op
                )));
            }
            let leaves = values
                .into_iter()
                .map(|value| {
                    coerce(value, ty).map(|value| FilterNode::comparison(property, Operator::Equal, value))
                })
                .collect::<GqlResult<Vec<_>>>()?;
            FilterNode::or(leaves)
                .ok_or_else(|| GqlError::bad_query("Function list requires at least one argument"))
        }
        Resolved::Ready(CastOutput::Value(value)) => {
            if op == Operator::In {
                return Err(GqlError::bad_query(format!(
                    "IN requires a list of values; received {}",
                    value
                )));
            }
            let value = if plain { coerce(value, ty)? } else { value };
            Ok(FilterNode::comparison(property, op, value))
        }
    }
}

fn lower_ancestor(term: &FilterTerm, namespace: Option<&str>) -> GqlResult<Deferred> {
    match resolve_term(term, namespace)? {
        Resolved::Deferred(deferred) => Ok(deferred),
        Resolved::Ready(CastOutput::Value(value @ Value::Key(_))) => Ok(Deferred::Value { value }),
        Resolved::Ready(CastOutput::Value(value)) => Err(GqlError::bad_query(format!(
            "ANCESTOR IS requires a key; received {}",
            value
        ))),
        Resolved::Ready(CastOutput::List(_)) => {
            Err(GqlError::bad_query("ANCESTOR IS requires a key; received a list"))
        }
    }
}

impl ParsedQuery {
    /// Lowers the statement into a [`QuerySpec`].
    ///
    /// `resolver` is asked once per filtered property for its declared
    /// type. Casts over literals are evaluated here; casts over parameters
    /// stay deferred.
    ///
    /// # Examples
    ///
    /// ```
    /// use gql_lang::{ParsedQuery, PropertyType, Schema};
    ///
    /// let schema = Schema::new().with_kind("SomeKind", [("prop1", PropertyType::Integer)]);
    /// let gql = ParsedQuery::parse("SELECT prop1 FROM SomeKind WHERE prop1 IN (1, 2)", None).unwrap();
    /// let query = gql.get_query(&schema).unwrap();
    /// assert_eq!(
    ///     query.to_string(),
    ///     "Query(kind='SomeKind', filters=OR(FilterNode('prop1', '=', 1), \
    ///      FilterNode('prop1', '=', 2)), projection=['prop1'])"
    /// );
    /// ```
    pub fn get_query(&self, resolver: &dyn PropertyResolver) -> GqlResult<QuerySpec> {
        let namespace = self.namespace();
        let mut ancestor = None;
        let mut nodes = Vec::new();
        let mut types: BTreeMap<&str, PropertyType> = BTreeMap::new();

        for (key, terms) in self.filters() {
            match &key.target {
                FilterTarget::Ancestor => {
                    if let Some(term) = terms.first() {
                        ancestor = Some(lower_ancestor(term, namespace)?);
                    }
                }
                FilterTarget::Property(property) => {
                    let ty = *types
                        .entry(property.as_str())
                        .or_insert_with(|| resolver.property_type(self.kind(), property));
                    trace!(property = %property, op = %key.op, ty = ?ty, "lowering filter");
                    for term in terms {
                        nodes.push(lower_term(property, key.op, term, ty, namespace)?);
                    }
                }
            }
        }

        let keys_only = self.is_keys_only();
        let projection = if keys_only {
            vec![]
        } else {
            self.projection().to_vec()
        };
        let distinct_on = self.is_distinct().then(|| projection.clone());

        let spec = QuerySpec {
            kind: self.kind().map(str::to_string),
            namespace: namespace.map(str::to_string),
            ancestor,
            filters: FilterNode::and(nodes),
            order_by: self
                .orderings()
                .iter()
                .map(|(name, direction)| PropertyOrder {
                    name: name.clone(),
                    reverse: *direction == crate::ast::Direction::Descending,
                })
                .collect(),
            limit: self.limit(),
            offset: self.offset(),
            projection,
            keys_only,
            distinct_on,
            hint: self.hint(),
        };
        debug!(kind = ?spec.kind, keys_only, "lowered GQL statement");
        Ok(spec)
    }
}
