use std::fmt;

use crate::ast::Parameter;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords (matched case-insensitively)
    Select,
    Distinct,
    From,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    Hint,
    And,
    Or,
    Not,
    Is,
    In,
    Ancestor,

    // Hint literals
    /// `ORDER_FIRST`
    OrderFirst,
    /// `FILTER_FIRST`
    FilterFirst,
    /// `ANCESTOR_FIRST`
    AncestorFirst,

    // Literals
    /// Integer, optionally signed
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -10
    /// ```
    Integer(i64),

    /// Floating-point number, optionally signed
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// -100.32
    /// ```
    Float(f64),

    /// Single-quoted string literal, `''` escapes a quote
    ///
    /// # Examples
    /// ```text
    /// 'xxx'
    /// 'it''s'
    /// ```
    String(String),

    /// `TRUE` or `FALSE`
    Boolean(bool),

    /// `NULL`
    Null,

    // Identifiers and References
    /// Bare property or kind name, possibly dotted
    ///
    /// # Examples
    /// ```text
    /// prop1
    /// address.city
    /// __key__
    /// ```
    Identifier(String),

    /// Double-quoted identifier, used to escape reserved words
    ///
    /// # Examples
    /// ```text
    /// "order"
    /// "prop ""1"""
    /// ```
    QuotedIdentifier(String),

    /// Name of a cast function, i.e. a word followed by `(`
    ///
    /// # Examples
    /// ```text
    /// Date(2020, 3, 26)
    /// KEY('parent', 42)
    /// ```
    Function(String),

    /// Parameter marker bound at execution time
    ///
    /// # Examples
    /// ```text
    /// :1
    /// :name
    /// ```
    Parameter(Parameter),

    // Comparison
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Delimiters
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `*`
    Star,
    /// `;` statement terminator
    Semicolon,

    /// End of input
    Eof,
}

impl Token {
    /// Maps a bare word onto its keyword token, ignoring case.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word.to_ascii_uppercase().as_str() {
            "SELECT" => Token::Select,
            "DISTINCT" => Token::Distinct,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "ORDER" => Token::Order,
            "BY" => Token::By,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "LIMIT" => Token::Limit,
            "OFFSET" => Token::Offset,
            "HINT" => Token::Hint,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "IS" => Token::Is,
            "IN" => Token::In,
            "ANCESTOR" => Token::Ancestor,
            "ORDER_FIRST" => Token::OrderFirst,
            "FILTER_FIRST" => Token::FilterFirst,
            "ANCESTOR_FIRST" => Token::AncestorFirst,
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            "NULL" => Token::Null,
            _ => return None,
        };
        Some(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Select => "SELECT",
            Token::Distinct => "DISTINCT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::Order => "ORDER",
            Token::By => "BY",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            Token::Limit => "LIMIT",
            Token::Offset => "OFFSET",
            Token::Hint => "HINT",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::Is => "IS",
            Token::In => "IN",
            Token::Ancestor => "ANCESTOR",
            Token::OrderFirst => "ORDER_FIRST",
            Token::FilterFirst => "FILTER_FIRST",
            Token::AncestorFirst => "ANCESTOR_FIRST",
            Token::Integer(n) => return write!(f, "{}", n),
            Token::Float(n) => return crate::value::write_float(f, *n),
            Token::String(s) => return write!(f, "'{}'", s.replace('\'', "''")),
            Token::Boolean(true) => "TRUE",
            Token::Boolean(false) => "FALSE",
            Token::Null => "NULL",
            Token::Identifier(name) | Token::Function(name) => return f.write_str(name),
            Token::QuotedIdentifier(name) => {
                return write!(f, "\"{}\"", name.replace('"', "\"\""));
            }
            Token::Parameter(param) => return write!(f, "{}", param),
            Token::Eq => "=",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::Comma => ",",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Star => "*",
            Token::Semicolon => ";",
            Token::Eof => "end of query",
        };
        f.write_str(text)
    }
}
