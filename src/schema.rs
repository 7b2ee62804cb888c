use crate::error::{ErrorKind, ParseError};
use crate::parser::{self, Token};
use crate::pattern::{Dictionary, Namespace, Pattern};
use crate::scanner::{Limits, Scanner};
use crate::value::{Object, Value};
use log::trace;

/// A recursive descent parser directed by a compiled [`Pattern`]: scalars
/// are checked (and coerced) the moment they are scanned, namespace members
/// are dispatched to their field's pattern, and relations walk their
/// positional patterns. Rejection happens at the first offending token, so
/// an invalid document costs no more than its accepted prefix.
///
/// The container/iteration budget is cumulative across calls, exactly as in
/// [`parser::Parser`](crate::parser::Parser).
#[derive(Debug)]
pub struct RegularParser<'p> {
    pattern: &'p Pattern,
    budget: crate::scanner::Budget,
}

impl<'p> RegularParser<'p> {
    pub fn new(pattern: &'p Pattern) -> Self {
        Self::with_limits(pattern, Limits::default())
    }

    pub fn with_limits(pattern: &'p Pattern, limits: Limits) -> Self {
        RegularParser {
            pattern,
            budget: limits.into(),
        }
    }

    /// The containers and iterations still available to this instance.
    pub fn remaining(&self) -> (u32, u32) {
        (self.budget.containers, self.budget.iterations)
    }

    /// Evaluate one top-level JSON value against the pattern.
    ///
    /// # Errors
    ///
    /// Fails with `NullJsonString` on empty input and with an offset- and
    /// path-carrying [`ParseError`] on any syntax, resource or schema error.
    pub fn eval(&mut self, text: &str) -> Result<Value, ParseError> {
        trace!("eval {} bytes against {}", text.len(), self.pattern.name());
        if text.is_empty() {
            return Err(ParseError::new(ErrorKind::NullJsonString, 0));
        }
        let mut scanner = Scanner::new(text, self.budget);
        let result = match token(&mut scanner, self.pattern) {
            Ok(Token::Value(value)) => Ok(value),
            Ok(_) => Err(scanner.error(ErrorKind::ValueExpected)),
            Err(e) => Err(e),
        };
        self.budget = scanner.budget;
        result
    }

    /// Require `text` to denote an object and merge its members into `map`
    /// under this parser's namespace or dictionary pattern. Note that the
    /// namespace's mandatory set is not re-checked here: the merge target
    /// may already hold the mandatory fields.
    ///
    /// # Errors
    ///
    /// Fails with `ObjectTypeError` when the text is not an object or the
    /// pattern does not describe one.
    pub fn update(&mut self, map: &mut Object, text: &str) -> Result<(), ParseError> {
        let mut scanner = Scanner::new(text, self.budget);
        let result = update_inner(&mut scanner, map, self.pattern);
        self.budget = scanner.budget;
        result
    }

    /// Require `text` to denote an array and append its elements to `list`
    /// under this parser's array pattern.
    ///
    /// # Errors
    ///
    /// Fails with `ArrayTypeError` when the text is not an array or the
    /// pattern does not describe one.
    pub fn extend(&mut self, list: &mut Vec<Value>, text: &str) -> Result<(), ParseError> {
        let mut scanner = Scanner::new(text, self.budget);
        let result = extend_inner(&mut scanner, list, self.pattern);
        self.budget = scanner.budget;
        result
    }
}

fn update_inner(s: &mut Scanner, map: &mut Object, pattern: &Pattern) -> Result<(), ParseError> {
    s.skip_whitespace();
    if s.current() != Some('{') {
        return Err(s.error(ErrorKind::ObjectTypeError));
    }
    match pattern {
        Pattern::Namespace(namespace) => {
            s.advance();
            namespace_body(s, map, namespace)
        }
        Pattern::Dictionary(dictionary) => {
            s.advance();
            dictionary_body(s, map, dictionary)
        }
        _ => Err(s.error(ErrorKind::ObjectTypeError)),
    }
}

fn extend_inner(s: &mut Scanner, list: &mut Vec<Value>, pattern: &Pattern) -> Result<(), ParseError> {
    let Pattern::Array(types) = pattern else {
        return Err(s.error(ErrorKind::ArrayTypeError));
    };
    s.skip_whitespace();
    if s.current() != Some('[') {
        return Err(s.error(ErrorKind::ArrayTypeError));
    }
    s.advance();
    if types.is_empty() {
        parser::array_body(s, list)
    } else {
        array_body(s, list, types)
    }
}

/// Pump one token under `pattern`. Scalars go through [`Pattern::value`] at
/// their literal's offset; containers recurse into the body matching the
/// pattern's shape, and any other opening token is irregular.
fn token(s: &mut Scanner, pattern: &Pattern) -> Result<Token, ParseError> {
    // an undefined pattern degrades to plain evaluation
    if matches!(pattern, Pattern::Undefined) {
        return parser::token(s);
    }
    s.skip_whitespace();
    match s.current() {
        Some('{') => match pattern {
            Pattern::Namespace(namespace) => {
                s.advance();
                let mut map = Object::new();
                namespace_body(s, &mut map, namespace)?;
                // mandatory coverage is checked once the body is complete
                if namespace.covers(&map) {
                    Ok(Token::Value(Value::Object(map)))
                } else {
                    Err(s.error(ErrorKind::IrregularNamespace))
                }
            }
            Pattern::Dictionary(dictionary) => {
                s.advance();
                let mut map = Object::new();
                dictionary_body(s, &mut map, dictionary)?;
                if map.is_empty() {
                    Err(s.error(ErrorKind::IrregularDictionary))
                } else {
                    Ok(Token::Value(Value::Object(map)))
                }
            }
            _ => Err(s.error(ErrorKind::IrregularNamespace)),
        },
        Some('[') => match pattern {
            Pattern::Array(types) => {
                s.advance();
                let mut list = Vec::new();
                if types.is_empty() {
                    parser::array_body(s, &mut list)?;
                } else {
                    array_body(s, &mut list, types)?;
                }
                Ok(Token::Value(Value::Array(list)))
            }
            _ => Err(s.error(ErrorKind::IrregularArray)),
        },
        Some('"') => {
            s.advance();
            let string = s.scan_string()?;
            checked(s, pattern, Value::Str(string))
        }
        Some(c) if c.is_ascii_digit() || c == '-' => {
            let number = s.scan_number()?;
            checked(s, pattern, number)
        }
        Some('t') => {
            s.keyword("rue", ErrorKind::TrueExpected)?;
            checked(s, pattern, Value::Bool(true))
        }
        Some('f') => {
            s.keyword("alse", ErrorKind::FalseExpected)?;
            checked(s, pattern, Value::Bool(false))
        }
        Some('n') => {
            s.keyword("ull", ErrorKind::NullExpected)?;
            checked(s, pattern, Value::Null)
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

fn checked(s: &mut Scanner, pattern: &Pattern, value: Value) -> Result<Token, ParseError> {
    match pattern.value(value) {
        Ok(value) => Ok(Token::Value(value)),
        Err(kind) => Err(s.error(kind)),
    }
}

/// Members of a namespace; the opening `{` has been consumed. Member names
/// must exist in the namespace, and each value is parsed under its field's
/// pattern.
fn namespace_body(s: &mut Scanner, map: &mut Object, namespace: &Namespace) -> Result<(), ParseError> {
    s.container()?;
    let mut tok = parser::token(s)?;
    loop {
        let name = match tok {
            Token::ObjectEnd => return Ok(()),
            Token::Value(Value::Str(name)) => name,
            _ => return Err(s.error(ErrorKind::StringExpected)),
        };
        s.iteration()?;
        match parser::token(s)? {
            Token::Colon => {}
            _ => return Err(s.error(ErrorKind::ColonExpected)),
        }
        let Some(pattern) = namespace.fields.get(&name) else {
            return Err(s.error(ErrorKind::NameError));
        };
        let value = match token(s, pattern).map_err(|e| e.in_key(&name))? {
            Token::Value(value) => value,
            _ => return Err(s.error(ErrorKind::ValueExpected)),
        };
        map.insert(name, value);
        tok = parser::token(s)?;
        if matches!(tok, Token::Comma) {
            tok = parser::token(s)?;
        }
    }
}

/// Members of a dictionary; the opening `{` has been consumed. Every key is
/// parsed under the key pattern, every value under the value pattern.
fn dictionary_body(s: &mut Scanner, map: &mut Object, dictionary: &Dictionary) -> Result<(), ParseError> {
    s.container()?;
    let mut tok = token(s, &dictionary.key)?;
    loop {
        let name = match tok {
            Token::ObjectEnd => return Ok(()),
            Token::Value(Value::Str(name)) => name,
            _ => return Err(s.error(ErrorKind::StringExpected)),
        };
        s.iteration()?;
        match parser::token(s)? {
            Token::Colon => {}
            _ => return Err(s.error(ErrorKind::ColonExpected)),
        }
        let value = match token(s, &dictionary.value).map_err(|e| e.in_key(&name))? {
            Token::Value(value) => value,
            _ => return Err(s.error(ErrorKind::ValueExpected)),
        };
        map.insert(name, value);
        tok = token(s, &dictionary.key)?;
        if matches!(tok, Token::Comma) {
            tok = token(s, &dictionary.key)?;
        }
    }
}

/// Elements of a collection (one pattern) or a relation (one pattern per
/// position); the opening `[` has been consumed and `types` is non-empty.
///
/// A relation draws its next pattern on every comma: running out raises
/// `ArrayOverflow`, and patterns left over when the array closes raise
/// `PartialArray`.
fn array_body(s: &mut Scanner, list: &mut Vec<Value>, types: &[Pattern]) -> Result<(), ParseError> {
    s.container()?;
    let relation = types.len() > 1;
    let mut iter = types.iter();
    let mut pattern = match iter.next() {
        Some(first) => first,
        None => return Err(s.error(ErrorKind::IrregularArray)),
    };
    let mut index = 0;
    let mut tok = token(s, pattern).map_err(|e| e.in_index(index))?;
    index += 1;
    loop {
        match tok {
            Token::ArrayEnd => break,
            Token::Value(value) => {
                s.iteration()?;
                list.push(value);
            }
            _ => return Err(s.error(ErrorKind::ValueExpected)),
        }
        tok = parser::token(s)?;
        if matches!(tok, Token::Comma) {
            if relation {
                match iter.next() {
                    Some(next) => pattern = next,
                    None => return Err(s.error(ErrorKind::ArrayOverflow)),
                }
            }
            tok = token(s, pattern).map_err(|e| e.in_index(index))?;
            index += 1;
        }
    }
    if relation && iter.next().is_some() {
        return Err(s.error(ErrorKind::PartialArray));
    }
    Ok(())
}
