use crate::value::Value;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt::Display;
use thiserror::Error;

/// Every way an evaluation or validation can fail, with the canonical
/// message string as its `Display` form.
///
/// Syntax and resource errors share one channel on purpose: a caller must
/// not be able to treat resource exhaustion as a retryable condition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // == Syntax ==
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unexpected end")]
    UnexpectedEnd,
    #[error("null JSON string")]
    NullJsonString,
    #[error("illegal escape sequence")]
    IllegalEscapeSequence,
    #[error("illegal UNICODE sequence")]
    IllegalUnicodeSequence,
    #[error("colon expected")]
    ColonExpected,
    #[error("value expected")]
    ValueExpected,
    #[error("string expected")]
    StringExpected,
    #[error("true expected")]
    TrueExpected,
    #[error("false expected")]
    FalseExpected,
    #[error("null expected")]
    NullExpected,

    // == Resource limits ==
    #[error("containers overflow")]
    ContainersOverflow,
    #[error("iterations overflow")]
    IterationsOverflow,

    // == Type errors ==
    #[error("Object type error")]
    ObjectTypeError,
    #[error("Array type error")]
    ArrayTypeError,
    #[error("String type error")]
    StringTypeError,
    #[error("Boolean type error")]
    BooleanTypeError,
    #[error("Integer type error")]
    IntegerTypeError,
    #[error("Double type error")]
    DoubleTypeError,
    #[error("Decimal type error")]
    DecimalTypeError,

    // == Literal representation ==
    #[error("Integer value error")]
    IntegerValueError,
    #[error("Double value error")]
    DoubleValueError,
    #[error("Decimal value error")]
    DecimalValueError,

    // == Schema errors ==
    #[error("irregular String")]
    IrregularString,
    #[error("irregular array")]
    IrregularArray,
    #[error("partial array")]
    PartialArray,
    #[error("array overflow")]
    ArrayOverflow,
    #[error("name error")]
    NameError,
    #[error("irregular Namespace")]
    IrregularNamespace,
    #[error("irregular Dictionary")]
    IrregularDictionary,
    #[error("negative integer")]
    NegativeInteger,
    #[error("positive integer overflow")]
    PositiveIntegerOverflow,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("negative double")]
    NegativeDouble,
    #[error("positive double overflow")]
    PositiveDoubleOverflow,
    #[error("double overflow")]
    DoubleOverflow,
    #[error("negative decimal")]
    NegativeDecimal,
    #[error("positive decimal overflow")]
    PositiveDecimalOverflow,
    #[error("decimal overflow")]
    DecimalOverflow,
    #[error("DateTime value error")]
    DateTimeValueError,
}

/// One step of the route from the document root to a failure point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

fn path_string(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn path_value(path: &[PathSegment]) -> Value {
    Value::Array(
        path.iter()
            .map(|seg| match seg {
                PathSegment::Key(k) => Value::Str(k.clone()),
                PathSegment::Index(i) => Value::Int(*i as i64),
            })
            .collect(),
    )
}

/// A failure while scanning or evaluating JSON text.
///
/// `offset` is the byte offset of the scanner when the error was raised and
/// `path` reads root-to-failure: each unwinding member or element prepends
/// its own key or index.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub offset: usize,
    pub path: Vec<PathSegment>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        ParseError {
            kind,
            offset,
            path: Vec::new(),
        }
    }

    /// Prepend the member name a nested failure was reached through.
    #[must_use]
    pub fn in_key(mut self, key: &str) -> Self {
        self.path.insert(0, PathSegment::Key(key.to_string()));
        self
    }

    /// Prepend the element index a nested failure was reached through.
    #[must_use]
    pub fn in_index(mut self, index: usize) -> Self {
        self.path.insert(0, PathSegment::Index(index));
        self
    }

    /// The canonical transport shape: `[message, offset, path]`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::Str(self.kind.to_string()),
            Value::Int(self.offset as i64),
            path_value(&self.path),
        ])
    }

    /// Attach the source text for rich terminal reporting.
    #[must_use]
    pub fn to_diagnostic(&self, name: &str, source: &str) -> ParseDiagnostic {
        let at = self.offset.min(source.len());
        let len = source[at..].chars().next().map_or(0, char::len_utf8);
        ParseDiagnostic {
            kind: self.kind,
            src: NamedSource::new(name, source.to_string()),
            span: (at, len).into(),
            path: if self.path.is_empty() {
                None
            } else {
                Some(format!("value path: {}", path_string(&self.path)))
            },
        }
    }
}

/// A failure while validating an already-built [`Value`] tree.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub path: Vec<PathSegment>,
}

impl ValidationError {
    pub fn new(kind: ErrorKind) -> Self {
        ValidationError {
            kind,
            path: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_key(mut self, key: &str) -> Self {
        self.path.insert(0, PathSegment::Key(key.to_string()));
        self
    }

    #[must_use]
    pub fn in_index(mut self, index: usize) -> Self {
        self.path.insert(0, PathSegment::Index(index));
        self
    }

    /// The canonical transport shape; the offset slot is `-1` because no
    /// text was scanned.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::Str(self.kind.to_string()),
            Value::Int(-1),
            path_value(&self.path),
        ])
    }
}

/// A failure while compiling a schema description into a `Pattern`.
///
/// Kept apart from [`ParseError`]/[`ValidationError`]: a broken schema is an
/// application bug, not a property of the document being checked.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("schema is not valid JSON")]
    Syntax(#[from] ParseError),
    #[error("irregular expression `{expression}`")]
    Regex {
        expression: String,
        #[source]
        source: regex::Error,
    },
}

/// A [`ParseError`] bound to its source text, rendered by miette with the
/// failing offset labeled.
#[derive(Error, Debug, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(jsonr::parse))]
pub struct ParseDiagnostic {
    pub kind: ErrorKind,
    #[source_code]
    src: NamedSource<String>,
    #[label("{kind}")]
    span: SourceSpan,
    #[help]
    path: Option<String>,
}
