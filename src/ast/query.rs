use std::{collections::BTreeMap, fmt};

use crate::ast::{Direction, FilterArg, FilterTerm, Hint, Operator, Token};
use crate::functions::TermFunction;

/// Left-hand side of a condition.
///
/// `Ancestor` sorts before every property so lowering sees it first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterTarget {
    Ancestor,
    Property(String),
}

/// `(property-or-ancestor, operator)` pair grouping filter terms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterKey {
    pub target: FilterTarget,
    pub op: Operator,
}

impl FilterKey {
    pub fn property(name: impl Into<String>, op: Operator) -> Self {
        FilterKey {
            target: FilterTarget::Property(name.into()),
            op,
        }
    }

    pub fn ancestor() -> Self {
        FilterKey {
            target: FilterTarget::Ancestor,
            op: Operator::Is,
        }
    }
}

/// Filter terms grouped by key; terms under one key keep insertion order.
pub type Filters = BTreeMap<FilterKey, Vec<FilterTerm>>;

/// Parsed GQL statement.
///
/// Built once by [`ParsedQuery::parse`] and read through accessors; lowered
/// into a [`QuerySpec`](crate::QuerySpec) by `get_query`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub(crate) kind: Option<String>,
    pub(crate) namespace: Option<String>,
    pub(crate) projection: Vec<String>,
    pub(crate) distinct: bool,
    pub(crate) filters: Filters,
    pub(crate) orderings: Vec<(String, Direction)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: u64,
    pub(crate) hint: Option<Hint>,
}

impl ParsedQuery {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Projected properties; empty for `SELECT *`.
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn is_keys_only(&self) -> bool {
        self.projection.len() == 1 && self.projection[0] == crate::KEY_PROPERTY
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn has_ancestor(&self) -> bool {
        self.filters.contains_key(&FilterKey::ancestor())
    }

    pub fn orderings(&self) -> &[(String, Direction)] {
        &self.orderings
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }
}

/// Writes a property or kind name, quoting it when a bare word would not
/// read back as the same identifier.
fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let bare = name.split('.').all(|part| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    }) && Token::keyword(name).is_none();

    if bare {
        f.write_str(name)
    } else {
        write!(f, "{}", Token::QuotedIdentifier(name.to_string()))
    }
}

fn write_arg(f: &mut fmt::Formatter<'_>, arg: &FilterArg) -> fmt::Result {
    match arg {
        FilterArg::Literal(literal) => write!(f, "{}", literal.get()),
        FilterArg::Parameter(param) => write!(f, "{}", param),
        FilterArg::Term(term) => write_term(f, term),
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[FilterArg]) -> fmt::Result {
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_arg(f, arg)?;
    }
    f.write_str(")")
}

fn write_term(f: &mut fmt::Formatter<'_>, term: &FilterTerm) -> fmt::Result {
    match term.function {
        TermFunction::Nop => match term.args.first() {
            Some(arg) => write_arg(f, arg),
            None => Ok(()),
        },
        TermFunction::Cast(cast) if cast.is_list() => write_args(f, &term.args),
        TermFunction::Cast(cast) => {
            f.write_str(&cast.name().to_ascii_uppercase())?;
            write_args(f, &term.args)
        }
    }
}

/// Renders normalized GQL that parses back to an equal statement.
impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        if self.projection.is_empty() {
            f.write_str("*")?;
        }
        for (i, prop) in self.projection.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_name(f, prop)?;
        }

        if let Some(kind) = &self.kind {
            f.write_str(" FROM ")?;
            write_name(f, kind)?;
        }

        let mut first = true;
        for (key, terms) in &self.filters {
            for term in terms {
                f.write_str(if first { " WHERE " } else { " AND " })?;
                first = false;
                match &key.target {
                    FilterTarget::Ancestor => f.write_str("ANCESTOR")?,
                    FilterTarget::Property(name) => write_name(f, name)?,
                }
                write!(f, " {} ", key.op.as_str().to_ascii_uppercase())?;
                write_term(f, term)?;
            }
        }

        for (i, (prop, direction)) in self.orderings.iter().enumerate() {
            f.write_str(if i == 0 { " ORDER BY " } else { ", " })?;
            write_name(f, prop)?;
            if *direction == Direction::Descending {
                f.write_str(" DESC")?;
            }
        }

        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        if let Some(hint) = self.hint {
            write!(f, " HINT {}", hint)?;
        }
        Ok(())
    }
}
