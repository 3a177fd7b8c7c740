use tracing::debug;

use crate::{
    KEY_PROPERTY,
    ast::{
        Direction, FilterArg, FilterKey, FilterTerm, Filters, Hint, Literal, Operator,
        ParsedQuery, Token,
    },
    error::{GqlError, GqlResult},
    functions::{CastFunction, TermFunction},
    lexer::{Lexer, Position, Spanned},
    value::Value,
};

/// Read position in the token stream.
///
/// Grammar rules take a cursor by value and hand back the advanced one
/// with their result, so a [`Parser`] holds no mutable state.
#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

/// Rule result: the parsed item and the cursor after it.
type Parsed<'a, T> = GqlResult<(T, Cursor<'a>)>;

impl<'a> Cursor<'a> {
    fn current(&self) -> &'a Token {
        // The stream always ends with Eof; stay on it once reached.
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn position(&self) -> Position {
        let idx = self.pos.min(self.tokens.len() - 1);
        self.tokens[idx].position
    }

    fn advance(self) -> Self {
        Cursor {
            tokens: self.tokens,
            pos: self.pos + 1,
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    /// Consumes `token` if it is next.
    fn accept(self, token: &Token) -> Option<Self> {
        self.check(token).then(|| self.advance())
    }

    fn expect(self, expected: Token) -> GqlResult<Self> {
        self.accept(&expected)
            .ok_or_else(|| self.error(format!("Expected {}", expected)))
    }

    fn error(&self, message: impl AsRef<str>) -> GqlError {
        GqlError::bad_query(format!(
            "{}, found {} at position {}",
            message.as_ref(),
            self.current(),
            self.position()
        ))
    }
}

pub struct Parser {
    tokens: Vec<Spanned>,
    namespace: Option<String>,
}

impl Parser {
    /// Lexes the whole input up front.
    pub fn new(lexer: Lexer) -> Result<Self, GqlError> {
        Ok(Parser {
            tokens: lexer.tokenize()?,
            namespace: None,
        })
    }

    /// Namespace carried through to the parsed statement.
    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    /// Parse a complete statement
    pub fn parse_query(&self) -> GqlResult<ParsedQuery> {
        let cursor = Cursor {
            tokens: &self.tokens,
            pos: 0,
        };

        let cursor = cursor.expect(Token::Select)?;
        let ((projection, distinct), cursor) = parse_select(cursor)?;
        let (kind, cursor) = parse_from(cursor)?;
        let (filters, cursor) = parse_where(cursor)?;
        let (orderings, cursor) = parse_order_by(cursor)?;
        let ((limit, limit_offset), cursor) = parse_limit(cursor)?;
        let (offset, cursor) = parse_offset(cursor, limit_offset)?;
        let (hint, cursor) = parse_hint(cursor)?;
        parse_terminal(cursor)?;

        debug!(
            kind = ?kind,
            filters = filters.len(),
            orderings = orderings.len(),
            "parsed GQL statement"
        );

        Ok(ParsedQuery {
            kind,
            namespace: self.namespace.clone(),
            projection,
            distinct,
            filters,
            orderings,
            limit,
            offset,
            hint,
        })
    }
}

impl ParsedQuery {
    /// Parses `text` into a statement scoped to `namespace`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gql_lang::{Direction, ParsedQuery};
    ///
    /// let gql = ParsedQuery::parse(
    ///     "SELECT prop1 FROM SomeKind WHERE prop3 > 5 ORDER BY prop4 DESC LIMIT 10",
    ///     None,
    /// )
    /// .unwrap();
    /// assert_eq!(gql.kind(), Some("SomeKind"));
    /// assert_eq!(gql.orderings(), &[("prop4".to_string(), Direction::Descending)]);
    /// assert_eq!(gql.limit(), Some(10));
    /// ```
    pub fn parse(text: &str, namespace: Option<&str>) -> GqlResult<Self> {
        Parser::new(Lexer::new(text))?
            .with_namespace(namespace)
            .parse_query()
    }
}

fn is_reserved(token: &Token) -> bool {
    matches!(
        token,
        Token::Select
            | Token::Distinct
            | Token::From
            | Token::Where
            | Token::Order
            | Token::By
            | Token::Asc
            | Token::Desc
            | Token::Limit
            | Token::Offset
            | Token::Hint
            | Token::And
            | Token::Or
            | Token::Not
            | Token::Is
            | Token::In
            | Token::Ancestor
            | Token::OrderFirst
            | Token::FilterFirst
            | Token::AncestorFirst
            | Token::Boolean(_)
            | Token::Null
    )
}

/// property := identifier | quoted-identifier
fn parse_property<'a>(cursor: Cursor<'a>, context: &str) -> Parsed<'a, String> {
    match cursor.current() {
        Token::Identifier(name) | Token::QuotedIdentifier(name) => {
            Ok((name.clone(), cursor.advance()))
        }
        token if is_reserved(token) => Err(cursor.error(format!(
            "{}: identifier is a reserved keyword: {}",
            context, token
        ))),
        _ => Err(cursor.error(context)),
    }
}

fn parse_select<'a>(cursor: Cursor<'a>) -> Parsed<'a, (Vec<String>, bool)> {
    if let Some(cursor) = cursor.accept(&Token::Star) {
        return Ok(((vec![], false), cursor));
    }

    let (distinct, mut cursor) = match cursor.accept(&Token::Distinct) {
        Some(cursor) => (true, cursor),
        None => (false, cursor),
    };

    if cursor.check(&Token::Star) {
        return Err(cursor.error("DISTINCT requires a projection"));
    }

    let mut projection = vec![];
    loop {
        let (name, next) = parse_property(cursor, "Invalid SELECT property")?;
        projection.push(name);
        match next.accept(&Token::Comma) {
            Some(next) => cursor = next,
            None => {
                cursor = next;
                break;
            }
        }
    }

    if projection.len() > 1 && projection.iter().any(|p| p == KEY_PROPERTY) {
        return Err(GqlError::bad_query(format!(
            "{} cannot be projected together with other properties",
            KEY_PROPERTY
        )));
    }
    if distinct && projection[0] == KEY_PROPERTY {
        return Err(GqlError::bad_query(format!(
            "DISTINCT cannot be combined with a {} projection",
            KEY_PROPERTY
        )));
    }

    Ok(((projection, distinct), cursor))
}

fn parse_from<'a>(cursor: Cursor<'a>) -> Parsed<'a, Option<String>> {
    match cursor.accept(&Token::From) {
        Some(cursor) => {
            let (kind, cursor) = parse_property(cursor, "Invalid FROM kind")?;
            Ok((Some(kind), cursor))
        }
        None => Ok((None, cursor)),
    }
}

fn parse_where<'a>(cursor: Cursor<'a>) -> Parsed<'a, Filters> {
    let mut filters = Filters::new();
    let Some(mut cursor) = cursor.accept(&Token::Where) else {
        return Ok((filters, cursor));
    };

    loop {
        let (next_filters, next) = parse_condition(cursor, filters)?;
        filters = next_filters;
        if next.check(&Token::Or) {
            return Err(next.error("OR is not supported; use IN for alternatives"));
        }
        match next.accept(&Token::And) {
            Some(next) => cursor = next,
            None => return Ok((filters, next)),
        }
    }
}

/// condition := ANCESTOR IS value | property op value
fn parse_condition<'a>(cursor: Cursor<'a>, mut filters: Filters) -> Parsed<'a, Filters> {
    if let Some(cursor) = cursor.accept(&Token::Ancestor) {
        let Some(cursor) = cursor.accept(&Token::Is) else {
            return Err(cursor.error("\"IS\" expected after ANCESTOR"));
        };
        let key = FilterKey::ancestor();
        if filters.contains_key(&key) {
            return Err(cursor.error("Only one ANCESTOR IS clause allowed"));
        }
        let (term, cursor) = parse_value(cursor, Operator::Is)?;
        filters.insert(key, vec![term]);
        return Ok((filters, cursor));
    }

    let (name, cursor) = parse_property(cursor, "Invalid WHERE Identifier")?;
    let Some(op) = Operator::from_token(cursor.current()) else {
        return Err(cursor.error("Invalid WHERE Condition"));
    };
    if op == Operator::Is {
        return Err(cursor.error("\"IS\" can only be used when comparing against \"ANCESTOR\""));
    }
    let cursor = cursor.advance();

    let (term, cursor) = if op == Operator::In {
        parse_in_values(cursor)?
    } else {
        parse_value(cursor, op)?
    };

    filters
        .entry(FilterKey::property(name, op))
        .or_default()
        .push(term);
    Ok((filters, cursor))
}

fn literal(token: &Token) -> Option<Literal> {
    let value = match token {
        Token::Integer(n) => Value::Integer(*n),
        Token::Float(n) => Value::Float(*n),
        Token::String(s) => Value::String(s.clone()),
        Token::Boolean(b) => Value::Boolean(*b),
        Token::Null => Value::Null,
        _ => return None,
    };
    Some(Literal::new(value))
}

/// value := literal | parameter | function-call
fn parse_value<'a>(cursor: Cursor<'a>, op: Operator) -> Parsed<'a, FilterTerm> {
    match cursor.current() {
        Token::Parameter(param) => Ok((FilterTerm::nop(param.clone()), cursor.advance())),
        Token::Function(name) => parse_cast(cursor, name),
        Token::LParen => Err(cursor.error(format!(
            "Only IN can process a list of values, given '{}'",
            op
        ))),
        token => match literal(token) {
            Some(literal) => Ok((FilterTerm::nop(literal), cursor.advance())),
            None => Err(cursor.error("Invalid WHERE Condition")),
        },
    }
}

/// IN accepts `(value, ...)` or a single parameter.
fn parse_in_values<'a>(cursor: Cursor<'a>) -> Parsed<'a, FilterTerm> {
    match cursor.current() {
        Token::LParen => {
            let (args, cursor) = parse_args(cursor.advance(), true)?;
            Ok((
                FilterTerm::new(TermFunction::Cast(CastFunction::List), args),
                cursor,
            ))
        }
        Token::Parameter(param) => Ok((FilterTerm::nop(param.clone()), cursor.advance())),
        _ => Err(cursor.error("IN requires a list of values or a parameter")),
    }
}

/// function-call := name '(' arg (',' arg)* ')'
fn parse_cast<'a>(cursor: Cursor<'a>, name: &str) -> Parsed<'a, FilterTerm> {
    let Some(function) = CastFunction::from_name(name) else {
        return Err(cursor.error(format!("Unknown function '{}'", name)));
    };
    let cursor = cursor.advance().expect(Token::LParen)?;
    let (args, cursor) = parse_args(cursor, false)?;

    if args.len() > 1 && args.iter().any(FilterArg::is_parameter) {
        return Err(GqlError::bad_query(format!(
            "Function {} accepts a parameter only as its sole argument",
            function
        )));
    }

    Ok((FilterTerm::new(TermFunction::Cast(function), args), cursor))
}

/// Arguments after an opening paren, through the closing one.
fn parse_args<'a>(mut cursor: Cursor<'a>, allow_casts: bool) -> Parsed<'a, Vec<FilterArg>> {
    let mut args = vec![];
    loop {
        let (arg, next) = match cursor.current() {
            Token::Parameter(param) => (FilterArg::Parameter(param.clone()), cursor.advance()),
            Token::Function(name) if allow_casts => {
                let (term, next) = parse_cast(cursor, name)?;
                (FilterArg::Term(term), next)
            }
            token => match literal(token) {
                Some(literal) => (FilterArg::Literal(literal), cursor.advance()),
                None => {
                    return Err(cursor.error("Parameter list requires literal or reference parameter"));
                }
            },
        };
        args.push(arg);

        match next.accept(&Token::Comma) {
            Some(next) => cursor = next,
            None => return Ok((args, next.expect(Token::RParen)?)),
        }
    }
}

fn parse_order_by<'a>(cursor: Cursor<'a>) -> Parsed<'a, Vec<(String, Direction)>> {
    let mut orderings = vec![];
    let Some(cursor) = cursor.accept(&Token::Order) else {
        return Ok((orderings, cursor));
    };
    let mut cursor = cursor.expect(Token::By)?;

    loop {
        let (name, next) = parse_property(cursor, "Invalid ORDER BY Property")?;
        let (direction, next) = if let Some(next) = next.accept(&Token::Desc) {
            (Direction::Descending, next)
        } else if let Some(next) = next.accept(&Token::Asc) {
            (Direction::Ascending, next)
        } else {
            (Direction::Ascending, next)
        };
        orderings.push((name, direction));

        match next.accept(&Token::Comma) {
            Some(next) => cursor = next,
            None => return Ok((orderings, next)),
        }
    }
}

fn parse_integer<'a>(cursor: Cursor<'a>, context: &str) -> Parsed<'a, i64> {
    match cursor.current() {
        Token::Integer(n) => Ok((*n, cursor.advance())),
        _ => Err(cursor.error(context)),
    }
}

/// limit := LIMIT count | LIMIT offset ',' count
///
/// Yields the limit and, for the comma form, the offset.
fn parse_limit<'a>(cursor: Cursor<'a>) -> Parsed<'a, (Option<u64>, Option<u64>)> {
    let Some(cursor) = cursor.accept(&Token::Limit) else {
        return Ok(((None, None), cursor));
    };

    let (first, cursor) = parse_integer(cursor, "Non-number limit in LIMIT clause")?;
    let (offset, limit, cursor) = match cursor.accept(&Token::Comma) {
        Some(next) => {
            if first < 0 {
                return Err(cursor.error("Bad offset in LIMIT Value"));
            }
            let (limit, next) = parse_integer(next, "Non-number limit in LIMIT clause")?;
            (Some(first as u64), limit, next)
        }
        None => (None, first, cursor),
    };

    if limit < 1 {
        return Err(cursor.error(format!("Bad Limit in LIMIT Value: {}", limit)));
    }
    Ok(((Some(limit as u64), offset), cursor))
}

fn parse_offset<'a>(cursor: Cursor<'a>, limit_offset: Option<u64>) -> Parsed<'a, u64> {
    let Some(next) = cursor.accept(&Token::Offset) else {
        return Ok((limit_offset.unwrap_or(0), cursor));
    };
    if limit_offset.is_some() {
        return Err(cursor.error("Cannot specify OFFSET clauses when LIMIT has offset"));
    }

    let (offset, next) = parse_integer(next, "Non-number offset in OFFSET clause")?;
    if offset < 0 {
        return Err(next.error(format!("Bad offset in OFFSET Value: {}", offset)));
    }
    Ok((offset as u64, next))
}

fn parse_hint<'a>(cursor: Cursor<'a>) -> Parsed<'a, Option<Hint>> {
    let Some(cursor) = cursor.accept(&Token::Hint) else {
        return Ok((None, cursor));
    };

    let hint = match cursor.current() {
        Token::OrderFirst => Hint::OrderFirst,
        Token::FilterFirst => Hint::FilterFirst,
        Token::AncestorFirst => Hint::AncestorFirst,
        _ => return Err(cursor.error("Unknown HINT")),
    };
    Ok((Some(hint), cursor.advance()))
}

/// An optional `;`, then nothing.
fn parse_terminal(cursor: Cursor<'_>) -> GqlResult<()> {
    let cursor = cursor.accept(&Token::Semicolon).unwrap_or(cursor);
    if !cursor.check(&Token::Eof) {
        return Err(cursor.error("Expected no additional symbols"));
    }
    Ok(())
}
