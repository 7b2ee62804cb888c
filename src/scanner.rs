use crate::error::{ErrorKind, ParseError};
use crate::value::Value;
use rust_decimal::Decimal;
use std::str::{Chars, FromStr};

/// The default maximum for both containers and iterations.
pub const DEFAULT_LIMIT: u32 = 65_355;

/// Caller-supplied bounds on what a single parse may consume.
///
/// `max_containers` caps how many objects and arrays may be opened,
/// `max_iterations` caps the total count of members and elements accepted.
/// Both are cumulative across every call made on the same parser instance,
/// so one instance per request bounds the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_containers: u32,
    pub max_iterations: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_containers: DEFAULT_LIMIT,
            max_iterations: DEFAULT_LIMIT,
        }
    }
}

impl Limits {
    /// Build limits, clamping zero to 1.
    pub fn new(max_containers: u32, max_iterations: u32) -> Self {
        Limits {
            max_containers: max_containers.max(1),
            max_iterations: max_iterations.max(1),
        }
    }
}

/// The two decrementing counters shared across one parser instance.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    pub containers: u32,
    pub iterations: u32,
}

impl From<Limits> for Budget {
    fn from(limits: Limits) -> Self {
        Budget {
            containers: limits.max_containers,
            iterations: limits.max_iterations,
        }
    }
}

/// A single-pass cursor over JSON text with one code point of lookahead.
///
/// `current` is the character at byte offset `position`; `advance` consumes
/// it. The scanner never backtracks. It also carries the parse [`Budget`],
/// which the container and member loops in `parser` and `schema` draw down.
pub struct Scanner<'a> {
    chars: Chars<'a>,
    position: usize,
    current: Option<char>,
    pub(crate) budget: Budget,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str, budget: Budget) -> Self {
        let mut chars = input.chars();
        let current = chars.next();
        Scanner {
            chars,
            position: 0,
            current,
            budget,
        }
    }

    pub fn offset(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<char> {
        self.current
    }

    pub fn advance(&mut self) -> Option<char> {
        if let Some(c) = self.current {
            self.position += c.len_utf8();
        }
        self.current = self.chars.next();
        self.current
    }

    pub fn skip_whitespace(&mut self) {
        while self.current.is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// An error at the scanner's current offset.
    pub fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.position)
    }

    /// Draw one container from the budget.
    pub fn container(&mut self) -> Result<(), ParseError> {
        if self.budget.containers == 0 {
            return Err(self.error(ErrorKind::ContainersOverflow));
        }
        self.budget.containers -= 1;
        Ok(())
    }

    /// Draw one member or element from the budget.
    pub fn iteration(&mut self) -> Result<(), ParseError> {
        if self.budget.iterations == 0 {
            return Err(self.error(ErrorKind::IterationsOverflow));
        }
        self.budget.iterations -= 1;
        Ok(())
    }

    /// Consume the remainder of a keyword (`rue` of `true`, ...) and step
    /// past it, or fail with the keyword's *_EXPECTED kind.
    pub fn keyword(&mut self, rest: &str, fail: ErrorKind) -> Result<(), ParseError> {
        for expected in rest.chars() {
            if self.advance() != Some(expected) {
                return Err(self.error(fail));
            }
        }
        self.advance();
        Ok(())
    }

    /// Scan a string body. The opening quote has already been consumed;
    /// on success the cursor sits past the closing quote.
    ///
    /// Recognizes the standard escapes plus `\uXXXX` and the short `\xXX`
    /// form. Adjacent `\u` high/low surrogates combine into one code point;
    /// a lone surrogate cannot be a Rust `char` and is rejected.
    pub fn scan_string(&mut self) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.current {
                None => return Err(self.error(ErrorKind::UnexpectedEnd)),
                Some('"') => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    match self.advance() {
                        Some('u') => {
                            let unit = self.unicode(4)?;
                            self.push_unit(&mut out, unit)?;
                        }
                        Some('x') => {
                            let unit = self.unicode(2)?;
                            self.push_unit(&mut out, unit)?;
                        }
                        Some('\\') => out.push('\\'),
                        Some('"') => out.push('"'),
                        Some('/') => out.push('/'),
                        Some('b') => out.push('\u{0008}'),
                        Some('f') => out.push('\u{000C}'),
                        Some('n') => out.push('\n'),
                        Some('r') => out.push('\r'),
                        Some('t') => out.push('\t'),
                        None => return Err(self.error(ErrorKind::UnexpectedEnd)),
                        Some(_) => return Err(self.error(ErrorKind::IllegalEscapeSequence)),
                    }
                    self.advance();
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Read `length` hex digits, advancing onto each one.
    fn unicode(&mut self, length: u32) -> Result<u32, ParseError> {
        let mut val: u32 = 0;
        for _ in 0..length {
            match self.advance() {
                Some(c) => match c.to_digit(16) {
                    Some(digit) => val = (val << 4) + digit,
                    None => return Err(self.error(ErrorKind::IllegalUnicodeSequence)),
                },
                None => return Err(self.error(ErrorKind::UnexpectedEnd)),
            }
        }
        Ok(val)
    }

    fn push_unit(&mut self, out: &mut String, unit: u32) -> Result<(), ParseError> {
        if (0xD800..=0xDBFF).contains(&unit) {
            // high surrogate: a \uXXXX low surrogate must follow
            if self.advance() != Some('\\') || self.advance() != Some('u') {
                return Err(self.error(ErrorKind::IllegalUnicodeSequence));
            }
            let low = self.unicode(4)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error(ErrorKind::IllegalUnicodeSequence));
            }
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            match char::from_u32(combined) {
                Some(c) => out.push(c),
                None => return Err(self.error(ErrorKind::IllegalUnicodeSequence)),
            }
        } else {
            match char::from_u32(unit) {
                Some(c) => out.push(c),
                None => return Err(self.error(ErrorKind::IllegalUnicodeSequence)),
            }
        }
        Ok(())
    }

    /// Scan a numeric literal and classify it: an exponent makes a `Float`,
    /// a fraction without exponent a `Decimal`, anything else an `Int`.
    pub fn scan_number(&mut self) -> Result<Value, ParseError> {
        let start = self.position;
        let mut buf = String::new();
        if self.current == Some('-') {
            buf.push('-');
            self.advance();
        }
        self.digits(&mut buf);
        if self.current == Some('.') {
            buf.push('.');
            self.advance();
            self.digits(&mut buf);
            if matches!(self.current, Some('e' | 'E')) {
                self.exponent(&mut buf);
                Self::float(&buf, start)
            } else {
                Decimal::from_str(&buf)
                    .map(Value::Decimal)
                    .map_err(|_| ParseError::new(ErrorKind::DecimalValueError, start))
            }
        } else if matches!(self.current, Some('e' | 'E')) {
            self.exponent(&mut buf);
            Self::float(&buf, start)
        } else {
            buf.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| ParseError::new(ErrorKind::IntegerValueError, start))
        }
    }

    fn float(buf: &str, start: usize) -> Result<Value, ParseError> {
        buf.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ParseError::new(ErrorKind::DoubleValueError, start))
    }

    fn digits(&mut self, buf: &mut String) {
        while let Some(c) = self.current {
            if c.is_ascii_digit() {
                buf.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn exponent(&mut self, buf: &mut String) {
        if let Some(c) = self.current {
            buf.push(c);
        }
        if matches!(self.advance(), Some('+' | '-')) {
            if let Some(sign) = self.current {
                buf.push(sign);
            }
            self.advance();
        }
        self.digits(buf);
    }
}
