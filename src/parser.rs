use crate::error::{ErrorKind, ParseError};
use crate::scanner::{Budget, Limits, Scanner};
use crate::value::{Object, Value};
use log::trace;

/// What one pump of the scanner produced: a complete value, or one of the
/// four structural characters. Separators surface as tokens rather than
/// being consumed silently so the member/element loops can drive on them.
#[derive(Debug)]
pub(crate) enum Token {
    Value(Value),
    ObjectEnd,
    ArrayEnd,
    Colon,
    Comma,
}

/// A recursive descent parser that evaluates JSON text into [`Value`] trees
/// under a container/iteration budget.
///
/// The budget is cumulative: repeated `eval`/`update`/`extend` calls on the
/// same instance draw down the same counters, so one `Parser` per request
/// bounds the cost of all its sub-documents. An instance is not shareable
/// across threads mid-parse; give each concurrent parse its own.
#[derive(Debug)]
pub struct Parser {
    budget: Budget,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser with the default limits (65 355 containers and iterations).
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Parser {
            budget: limits.into(),
        }
    }

    /// The containers and iterations still available to this instance.
    pub fn remaining(&self) -> (u32, u32) {
        (self.budget.containers, self.budget.iterations)
    }

    /// Evaluate one top-level JSON value.
    ///
    /// # Errors
    ///
    /// Fails with `NullJsonString` on empty input, and with an offset- and
    /// path-carrying [`ParseError`] on any syntax or resource error.
    pub fn eval(&mut self, text: &str) -> Result<Value, ParseError> {
        trace!("eval {} bytes", text.len());
        if text.is_empty() {
            return Err(ParseError::new(ErrorKind::NullJsonString, 0));
        }
        let mut scanner = Scanner::new(text, self.budget);
        let result = match token(&mut scanner) {
            Ok(Token::Value(value)) => Ok(value),
            Ok(_) => Err(scanner.error(ErrorKind::ValueExpected)),
            Err(e) => Err(e),
        };
        self.budget = scanner.budget;
        result
    }

    /// Require `text` to denote an object and merge its members into
    /// `map`; duplicate keys overwrite.
    ///
    /// # Errors
    ///
    /// Fails with `ObjectTypeError` when the text is not an object.
    pub fn update(&mut self, map: &mut Object, text: &str) -> Result<(), ParseError> {
        let mut scanner = Scanner::new(text, self.budget);
        let result = update_inner(&mut scanner, map);
        self.budget = scanner.budget;
        result
    }

    /// Require `text` to denote an array and append its elements to `list`.
    ///
    /// # Errors
    ///
    /// Fails with `ArrayTypeError` when the text is not an array.
    pub fn extend(&mut self, list: &mut Vec<Value>, text: &str) -> Result<(), ParseError> {
        let mut scanner = Scanner::new(text, self.budget);
        let result = extend_inner(&mut scanner, list);
        self.budget = scanner.budget;
        result
    }
}

fn update_inner(s: &mut Scanner, map: &mut Object) -> Result<(), ParseError> {
    s.skip_whitespace();
    if s.current() == Some('{') {
        s.advance();
        object_body(s, map)
    } else {
        Err(s.error(ErrorKind::ObjectTypeError))
    }
}

fn extend_inner(s: &mut Scanner, list: &mut Vec<Value>) -> Result<(), ParseError> {
    s.skip_whitespace();
    if s.current() == Some('[') {
        s.advance();
        array_body(s, list)
    } else {
        Err(s.error(ErrorKind::ArrayTypeError))
    }
}

/// Pump one token: skip whitespace, then dispatch on the next code point.
pub(crate) fn token(s: &mut Scanner) -> Result<Token, ParseError> {
    s.skip_whitespace();
    match s.current() {
        Some('{') => {
            s.advance();
            let mut map = Object::new();
            object_body(s, &mut map)?;
            Ok(Token::Value(Value::Object(map)))
        }
        Some('[') => {
            s.advance();
            let mut list = Vec::new();
            array_body(s, &mut list)?;
            Ok(Token::Value(Value::Array(list)))
        }
        Some('"') => {
            s.advance();
            Ok(Token::Value(Value::Str(s.scan_string()?)))
        }
        Some(c) if c.is_ascii_digit() || c == '-' => Ok(Token::Value(s.scan_number()?)),
        Some('t') => {
            s.keyword("rue", ErrorKind::TrueExpected)?;
            Ok(Token::Value(Value::Bool(true)))
        }
        Some('f') => {
            s.keyword("alse", ErrorKind::FalseExpected)?;
            Ok(Token::Value(Value::Bool(false)))
        }
        Some('n') => {
            s.keyword("ull", ErrorKind::NullExpected)?;
            Ok(Token::Value(Value::Null))
        }
        Some(',') => {
            s.advance();
            Ok(Token::Comma)
        }
        Some(':') => {
            s.advance();
            Ok(Token::Colon)
        }
        Some(']') => {
            s.advance();
            Ok(Token::ArrayEnd)
        }
        Some('}') => {
            s.advance();
            Ok(Token::ObjectEnd)
        }
        None => Err(s.error(ErrorKind::UnexpectedEnd)),
        Some(_) => Err(s.error(ErrorKind::UnexpectedCharacter)),
    }
}

/// Members of an object; the opening `{` has been consumed.
pub(crate) fn object_body(s: &mut Scanner, map: &mut Object) -> Result<(), ParseError> {
    s.container()?;
    let mut tok = token(s)?;
    loop {
        let name = match tok {
            Token::ObjectEnd => return Ok(()),
            Token::Value(Value::Str(name)) => name,
            _ => return Err(s.error(ErrorKind::StringExpected)),
        };
        s.iteration()?;
        match token(s)? {
            Token::Colon => {}
            _ => return Err(s.error(ErrorKind::ColonExpected)),
        }
        let value = match token(s).map_err(|e| e.in_key(&name))? {
            Token::Value(value) => value,
            _ => return Err(s.error(ErrorKind::ValueExpected)),
        };
        map.insert(name, value);
        tok = token(s)?;
        if matches!(tok, Token::Comma) {
            tok = token(s)?;
        }
    }
}

/// Elements of an array; the opening `[` has been consumed.
pub(crate) fn array_body(s: &mut Scanner, list: &mut Vec<Value>) -> Result<(), ParseError> {
    s.container()?;
    let mut index = 0;
    let mut tok = token(s).map_err(|e| e.in_index(index))?;
    index += 1;
    loop {
        match tok {
            Token::ArrayEnd => return Ok(()),
            Token::Value(value) => {
                s.iteration()?;
                list.push(value);
            }
            _ => return Err(s.error(ErrorKind::ValueExpected)),
        }
        tok = token(s)?;
        if matches!(tok, Token::Comma) {
            tok = token(s).map_err(|e| e.in_index(index))?;
            index += 1;
        }
    }
}
