use std::fmt;

use crate::{
    ast::{Parameter, Token},
    error::LexError,
};

/// Character offset into the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position(pub usize);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token together with the offset it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: Position,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, start: usize, message: impl Into<String>) -> LexError {
        LexError::new(Position(start), message)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads `word(.word)*`; dots join sub-property names.
    fn read_identifier(&mut self) -> String {
        let mut result = self.read_word();
        while self.current_char() == Some('.')
            && self
                .peek_char(1)
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
            result.push('.');
            result.push_str(&self.read_word());
        }
        result
    }

    /// Reads a quoted run where a doubled quote stands for one quote char.
    fn read_quoted(&mut self, quote: char, what: &str) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        loop {
            match self.current_char() {
                Some(c) if c == quote => {
                    if self.peek_char(1) == Some(quote) {
                        result.push(quote);
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        return Ok(result);
                    }
                }
                Some('\n') | Some('\r') | None => {
                    return Err(self.error(start, format!("Unterminated {}", what)));
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self
            .current_char()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            return Err(self.error(start, format!("Invalid number starting with '{}'", number)));
        }

        if is_float {
            number
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(start, format!("Invalid float '{}'", number)))
        } else {
            number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error(start, format!("Integer '{}' is out of range", number)))
        }
    }

    fn read_parameter(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // Consume ':'

        match self.current_char() {
            Some(ch) if ch.is_ascii_digit() => {
                let digits = self.read_word();
                match digits.parse::<u32>() {
                    Ok(0) => Err(self.error(start, "Parameter index must be positive")),
                    Ok(n) => Ok(Token::Parameter(Parameter::Positional(n))),
                    Err(_) => Err(self.error(start, format!("Invalid parameter ':{}'", digits))),
                }
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                Ok(Token::Parameter(Parameter::Named(self.read_word())))
            }
            _ => Err(self.error(start, "Expected parameter name or index after ':'")),
        }
    }

    /// True when the next non-blank character opens a call.
    fn followed_by_paren(&self) -> bool {
        self.input[self.position..]
            .iter()
            .find(|c| !c.is_whitespace())
            .is_some_and(|&c| c == '(')
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    pub fn next_spanned(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('*') => {
                self.advance();
                Token::Star
            }
            Some(';') => {
                self.advance();
                Token::Semicolon
            }
            Some('=') => {
                self.advance();
                Token::Eq
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(self.error(start, "Unexpected '!' (did you mean '!='?)"));
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::LtEq
                } else {
                    self.advance();
                    Token::Lt
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::GtEq
                } else {
                    self.advance();
                    Token::Gt
                }
            }
            Some('\'') => Token::String(self.read_quoted('\'', "string literal")?),
            Some('"') => {
                let name = self.read_quoted('"', "quoted identifier")?;
                if name.is_empty() {
                    return Err(self.error(start, "Empty quoted identifier"));
                }
                Token::QuotedIdentifier(name)
            }
            Some(':') => self.read_parameter()?,
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                if let Some(keyword) = Token::keyword(&ident) {
                    keyword
                } else if !ident.contains('.') && self.followed_by_paren() {
                    Token::Function(ident)
                } else {
                    Token::Identifier(ident)
                }
            }
            Some(ch) => {
                return Err(self.error(start, format!("Unexpected character '{}'", ch)));
            }
        };

        Ok(Spanned {
            token,
            position: Position(start),
        })
    }

    /// Lexes the whole input; the last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_spanned()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_keywords_ignore_case() {
    let mut lexer = Lexer::new("select Distinct FROM where and true False null");
    assert_eq!(lexer.next_token().unwrap(), Token::Select);
    assert_eq!(lexer.next_token().unwrap(), Token::Distinct);
    assert_eq!(lexer.next_token().unwrap(), Token::From);
    assert_eq!(lexer.next_token().unwrap(), Token::Where);
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_condition() {
    let mut lexer = Lexer::new("prop3>5 AND prop2='xxx'");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("prop3".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Gt);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(5));
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("prop2".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Eq);
    assert_eq!(lexer.next_token().unwrap(), Token::String("xxx".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_positions() {
    let tokens = Lexer::new("SELECT  *").tokenize().unwrap();
    assert_eq!(tokens[0].position, Position(0));
    assert_eq!(tokens[1].position, Position(8));
    assert_eq!(tokens[2].token, Token::Eof);
}
