use crate::error::{CompileError, ErrorKind};
use crate::value::{Object, Value};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// An application-defined scalar pattern, registered under a schema type
/// name (the built-in one is the `"yyyy-MM-ddTHH:mm:ss"` date-time).
pub trait Extension: Send + Sync + std::fmt::Debug {
    /// A short kind name for diagnostics, e.g. `"datetime"`.
    fn name(&self) -> &str;
    /// The schema `Value` this extension answers to.
    fn describe(&self) -> Value;
    /// Validate one scalar, returning its (possibly normalized) form.
    fn check(&self, instance: Value) -> Result<Value, ErrorKind>;
}

/// The de-facto JavaScript serialization of a date and time instance.
#[derive(Debug)]
pub struct DateTimePattern;

/// The registry name of the built-in date-time extension.
pub const DATETIME: &str = "yyyy-MM-ddTHH:mm:ss";

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl Extension for DateTimePattern {
    fn name(&self) -> &str {
        "datetime"
    }

    fn describe(&self) -> Value {
        Value::Str(DATETIME.to_string())
    }

    fn check(&self, instance: Value) -> Result<Value, ErrorKind> {
        match instance {
            Value::Str(s) => match NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT) {
                Ok(_) => Ok(Value::Str(s)),
                Err(_) => Err(ErrorKind::DateTimeValueError),
            },
            _ => Err(ErrorKind::StringTypeError),
        }
    }
}

/// Extension patterns by schema type name.
#[derive(Debug, Clone)]
pub struct Extensions {
    map: HashMap<String, Arc<dyn Extension>>,
}

impl Default for Extensions {
    /// The built-in table: just the date-time extension.
    fn default() -> Self {
        let mut extensions = Extensions::empty();
        extensions.register(DATETIME, Arc::new(DateTimePattern));
        extensions
    }
}

impl Extensions {
    pub fn empty() -> Self {
        Extensions {
            map: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, extension: Arc<dyn Extension>) {
        self.map.insert(name.to_string(), extension);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Extension>> {
        self.map.get(name)
    }
}

/// A compiled regular-string pattern. The expression is anchored so that
/// only a full match accepts, and the source survives for `Pattern::json`.
#[derive(Debug, Clone)]
pub struct StringPattern {
    source: String,
    regex: Regex,
}

impl StringPattern {
    pub fn compile(expression: &str) -> Result<Self, CompileError> {
        let regex =
            Regex::new(&format!("^(?:{expression})$")).map_err(|source| CompileError::Regex {
                expression: expression.to_string(),
                source,
            })?;
        Ok(StringPattern {
            source: expression.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// A dictionary pattern: any number of members whose names satisfy `key`
/// and whose values satisfy `value`.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub key: Pattern,
    pub value: Pattern,
}

/// A namespace pattern: a fixed set of named fields. The mandatory set is
/// derived once at compile time: every field whose pattern is not itself
/// Undefined, Array, Namespace or Dictionary must be present.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub fields: IndexMap<String, Pattern>,
    pub mandatory: Vec<String>,
}

impl Namespace {
    pub fn new(fields: IndexMap<String, Pattern>) -> Self {
        let mandatory = fields
            .iter()
            .filter(|(_, pattern)| pattern.is_mandatory())
            .map(|(name, _)| name.clone())
            .collect();
        Namespace { fields, mandatory }
    }

    /// Does `map` carry every mandatory field?
    pub fn covers(&self, map: &Object) -> bool {
        self.mandatory.iter().all(|name| map.contains_key(name))
    }
}

/// A compiled schema node. Immutable once built and safe to share across
/// threads; concurrent parses against one `Pattern` need no copies.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Accepts anything, including null.
    Undefined,
    Boolean,
    Integer,
    Double,
    Decimal,
    /// Any string.
    String,
    /// A string matching a regular expression in full.
    Regex(StringPattern),
    /// An integer in `0..=limit`.
    IntegerAbsolute(i64),
    /// An integer with `|i| < limit`.
    IntegerRelative(i64),
    /// A double in `0.0..=limit`.
    DoubleAbsolute(f64),
    /// A double with `|d| <= limit`.
    DoubleRelative(f64),
    /// A decimal in `0 <= b < limit`.
    DecimalAbsolute(Decimal),
    /// Accepts `|b| > limit`, the inverse of the other relative bounds.
    DecimalRelative(Decimal),
    /// Arity 0: any array. Arity 1: a collection, every element matching
    /// the single child. Arity > 1: a relation, one pattern per position.
    Array(Vec<Pattern>),
    Dictionary(Box<Dictionary>),
    Namespace(Namespace),
    Extension(Arc<dyn Extension>),
}

impl Pattern {
    /// A short kind name, mirrored by diagnostics and tests.
    pub fn name(&self) -> &str {
        match self {
            Pattern::Undefined => "undefined",
            Pattern::Boolean => "boolean",
            Pattern::Integer => "integer",
            Pattern::Double => "double",
            Pattern::Decimal => "decimal",
            Pattern::String => "string",
            Pattern::Regex(_) => "pcre",
            Pattern::IntegerAbsolute(_) => "integerAbsolute",
            Pattern::IntegerRelative(_) => "integerRelative",
            Pattern::DoubleAbsolute(_) => "doubleAbsolute",
            Pattern::DoubleRelative(_) => "doubleRelative",
            Pattern::DecimalAbsolute(_) => "decimalAbsolute",
            Pattern::DecimalRelative(_) => "decimalRelative",
            Pattern::Array(_) => "array",
            Pattern::Dictionary(_) => "dictionary",
            Pattern::Namespace(_) => "namespace",
            Pattern::Extension(extension) => extension.name(),
        }
    }

    /// Fields with these pattern kinds may be absent from a namespace.
    fn is_mandatory(&self) -> bool {
        !matches!(
            self,
            Pattern::Undefined | Pattern::Array(_) | Pattern::Namespace(_) | Pattern::Dictionary(_)
        )
    }

    /// Validate one value against this pattern, without descending into
    /// containers: containers only get their kind (and namespace coverage)
    /// checked here; traversal belongs to `schema` and `validator`.
    ///
    /// Scalars are coerced where the pattern language allows it (strings
    /// to numbers and booleans), and range-checked by the bound patterns.
    pub fn value(&self, instance: Value) -> Result<Value, ErrorKind> {
        match self {
            Pattern::Undefined => Ok(instance),
            Pattern::Boolean => match instance {
                Value::Bool(_) => Ok(instance),
                Value::Str(s) => Ok(Value::Bool(s == "true")),
                _ => Err(ErrorKind::BooleanTypeError),
            },
            Pattern::Integer => Ok(Value::Int(as_integer(instance)?)),
            Pattern::Double => Ok(Value::Float(as_double(instance)?)),
            Pattern::Decimal => Ok(Value::Decimal(as_decimal(instance)?)),
            Pattern::String => match instance {
                Value::Str(_) => Ok(instance),
                _ => Err(ErrorKind::StringTypeError),
            },
            Pattern::Regex(pattern) => match instance {
                Value::Str(s) => {
                    if pattern.matches(&s) {
                        Ok(Value::Str(s))
                    } else {
                        Err(ErrorKind::IrregularString)
                    }
                }
                _ => Err(ErrorKind::StringTypeError),
            },
            Pattern::IntegerAbsolute(limit) => {
                let i = as_integer(instance)?;
                if i < 0 {
                    Err(ErrorKind::NegativeInteger)
                } else if i <= *limit {
                    Ok(Value::Int(i))
                } else {
                    Err(ErrorKind::PositiveIntegerOverflow)
                }
            }
            Pattern::IntegerRelative(limit) => {
                let i = as_integer(instance)?;
                if i.unsigned_abs() < limit.unsigned_abs() {
                    Ok(Value::Int(i))
                } else {
                    Err(ErrorKind::IntegerOverflow)
                }
            }
            Pattern::DoubleAbsolute(limit) => {
                let d = as_double(instance)?;
                if d < 0.0 {
                    Err(ErrorKind::NegativeDouble)
                } else if d <= *limit {
                    Ok(Value::Float(d))
                } else {
                    Err(ErrorKind::PositiveDoubleOverflow)
                }
            }
            Pattern::DoubleRelative(limit) => {
                let d = as_double(instance)?;
                if d.abs() <= *limit {
                    Ok(Value::Float(d))
                } else {
                    Err(ErrorKind::DoubleOverflow)
                }
            }
            Pattern::DecimalAbsolute(limit) => {
                let b = as_decimal(instance)?;
                if b < Decimal::ZERO {
                    Err(ErrorKind::NegativeDecimal)
                } else if b < *limit {
                    Ok(Value::Decimal(b))
                } else {
                    Err(ErrorKind::PositiveDecimalOverflow)
                }
            }
            // inverted on purpose: magnitudes beyond the limit accept
            Pattern::DecimalRelative(limit) => {
                let b = as_decimal(instance)?;
                if b.abs() > *limit {
                    Ok(Value::Decimal(b))
                } else {
                    Err(ErrorKind::DecimalOverflow)
                }
            }
            Pattern::Array(_) => match instance {
                Value::Null | Value::Array(_) => Ok(instance),
                _ => Err(ErrorKind::ArrayTypeError),
            },
            Pattern::Dictionary(_) => match instance {
                Value::Null => Ok(instance),
                Value::Object(ref map) => {
                    if map.is_empty() {
                        Err(ErrorKind::IrregularDictionary)
                    } else {
                        Ok(instance)
                    }
                }
                _ => Err(ErrorKind::ObjectTypeError),
            },
            Pattern::Namespace(namespace) => match instance {
                Value::Null => Ok(instance),
                Value::Object(ref map) => {
                    if namespace.covers(map) {
                        Ok(instance)
                    } else {
                        Err(ErrorKind::IrregularNamespace)
                    }
                }
                _ => Err(ErrorKind::ObjectTypeError),
            },
            Pattern::Extension(extension) => extension.check(instance),
        }
    }

    /// The schema `Value` this pattern answers to; compiling it again
    /// yields an equivalent pattern.
    pub fn json(&self) -> Value {
        match self {
            Pattern::Undefined => Value::Null,
            Pattern::Boolean => Value::Bool(false),
            Pattern::Integer => Value::Int(0),
            Pattern::Double => Value::Float(0.0),
            Pattern::Decimal => Value::Decimal(Decimal::ZERO),
            Pattern::String => Value::Str(String::new()),
            Pattern::Regex(pattern) => Value::Str(pattern.source().to_string()),
            Pattern::IntegerAbsolute(limit) => Value::Int(*limit),
            Pattern::IntegerRelative(limit) => Value::Int(-limit),
            Pattern::DoubleAbsolute(limit) => Value::Float(*limit),
            Pattern::DoubleRelative(limit) => Value::Float(-limit),
            Pattern::DecimalAbsolute(limit) => Value::Decimal(*limit),
            Pattern::DecimalRelative(limit) => Value::Decimal(-*limit),
            Pattern::Array(types) => Value::Array(types.iter().map(Pattern::json).collect()),
            Pattern::Dictionary(dictionary) => {
                let key = match dictionary.key.json() {
                    Value::Str(s) => s,
                    other => crate::serialization::encode(&other),
                };
                let mut map = Object::new();
                map.insert(key, dictionary.value.json());
                Value::Object(map)
            }
            Pattern::Namespace(namespace) => {
                let mut map = Object::new();
                for (name, pattern) in &namespace.fields {
                    map.insert(name.clone(), pattern.json());
                }
                Value::Object(map)
            }
            Pattern::Extension(extension) => extension.describe(),
        }
    }
}

fn as_integer(instance: Value) -> Result<i64, ErrorKind> {
    match instance {
        Value::Int(i) => Ok(i),
        Value::Str(s) => s.parse().map_err(|_| ErrorKind::IntegerValueError),
        _ => Err(ErrorKind::IntegerTypeError),
    }
}

fn as_double(instance: Value) -> Result<f64, ErrorKind> {
    match instance {
        Value::Float(f) => Ok(f),
        Value::Int(i) => Ok(i as f64),
        Value::Decimal(d) => {
            use rust_decimal::prelude::ToPrimitive;
            d.to_f64().ok_or(ErrorKind::DoubleValueError)
        }
        Value::Str(s) => s.parse().map_err(|_| ErrorKind::DoubleValueError),
        _ => Err(ErrorKind::DoubleTypeError),
    }
}

fn as_decimal(instance: Value) -> Result<Decimal, ErrorKind> {
    match instance {
        Value::Decimal(d) => Ok(d),
        Value::Int(i) => Ok(Decimal::from(i)),
        Value::Float(f) => Decimal::from_f64(f).ok_or(ErrorKind::DecimalValueError),
        Value::Str(s) => Decimal::from_str(&s).map_err(|_| ErrorKind::DecimalValueError),
        // reports the Double kind, not Decimal
        _ => Err(ErrorKind::DoubleTypeError),
    }
}

/// Compile a schema description (itself a parsed JSON value) into a
/// [`Pattern`].
///
/// The dispatch is the JSONR grammar:
/// - `null` ⇒ anything, `true`/`false` ⇒ boolean,
/// - `0` / `0.0` ⇒ unconstrained number of the literal's kind, a positive
///   literal ⇒ absolute bound, a negative literal ⇒ relative bound,
/// - a string ⇒ extension name, else regular expression, else (empty) any
///   string,
/// - `[]` ⇒ any array, `[p]` ⇒ collection, `[p1, p2, …]` ⇒ relation,
/// - `{}` ⇒ empty namespace, an object with exactly one member ⇒ a
///   dictionary whose key pattern is compiled *from the member name*, an
///   object with more ⇒ a namespace of its literal field names.
pub fn compile(schema: &Value, extensions: &Extensions) -> Result<Pattern, CompileError> {
    let pattern = match schema {
        Value::Null => Pattern::Undefined,
        Value::Bool(_) => Pattern::Boolean,
        Value::Str(s) => {
            if let Some(extension) = extensions.get(s) {
                Pattern::Extension(extension.clone())
            } else if !s.is_empty() {
                Pattern::Regex(StringPattern::compile(s)?)
            } else {
                Pattern::String
            }
        }
        Value::Int(i) => {
            if *i == 0 {
                Pattern::Integer
            } else if *i > 0 {
                Pattern::IntegerAbsolute(*i)
            } else {
                Pattern::IntegerRelative(i.checked_abs().unwrap_or(i64::MAX))
            }
        }
        Value::Float(f) => {
            if *f == 0.0 {
                Pattern::Double
            } else if *f > 0.0 {
                Pattern::DoubleAbsolute(*f)
            } else {
                Pattern::DoubleRelative(f.abs())
            }
        }
        Value::Decimal(d) => {
            if d.is_zero() {
                Pattern::Decimal
            } else if *d > Decimal::ZERO {
                Pattern::DecimalAbsolute(*d)
            } else {
                Pattern::DecimalRelative(d.abs())
            }
        }
        Value::Array(items) => {
            let mut types = Vec::with_capacity(items.len());
            for item in items {
                types.push(compile(item, extensions)?);
            }
            Pattern::Array(types)
        }
        Value::Object(map) => match map.iter().next() {
            // the single-member tie-break: a one-field object is a
            // dictionary, its key pattern compiled from the member name
            Some((name, value)) if map.len() == 1 => Pattern::Dictionary(Box::new(Dictionary {
                key: compile(&Value::Str(name.clone()), extensions)?,
                value: compile(value, extensions)?,
            })),
            _ => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (name, value) in map {
                    fields.insert(name.clone(), compile(value, extensions)?);
                }
                Pattern::Namespace(Namespace::new(fields))
            }
        },
    };
    debug!("compiled {} pattern", pattern.name());
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(schema: &Value) -> Pattern {
        compile(schema, &Extensions::default()).unwrap()
    }

    #[test]
    fn test_scalar_dispatch() {
        assert_eq!(compiled(&Value::Null).name(), "undefined");
        assert_eq!(compiled(&Value::Bool(true)).name(), "boolean");
        assert_eq!(compiled(&Value::Int(0)).name(), "integer");
        assert_eq!(compiled(&Value::Int(10)).name(), "integerAbsolute");
        assert_eq!(compiled(&Value::Int(-10)).name(), "integerRelative");
        assert_eq!(compiled(&Value::Float(0.0)).name(), "double");
        assert_eq!(compiled(&Value::Float(2.5)).name(), "doubleAbsolute");
        assert_eq!(compiled(&Value::Float(-2.5)).name(), "doubleRelative");
    }

    #[test]
    fn test_string_dispatch() {
        assert_eq!(compiled(&Value::Str(String::new())).name(), "string");
        assert_eq!(compiled(&Value::Str("[a-z]+".into())).name(), "pcre");
        assert_eq!(compiled(&Value::Str(DATETIME.into())).name(), "datetime");
    }

    #[test]
    fn test_bad_regex_is_compile_error() {
        let err = compile(&Value::Str("[unclosed".into()), &Extensions::default());
        assert!(matches!(err, Err(CompileError::Regex { .. })));
    }

    #[test]
    fn test_single_field_object_is_dictionary() {
        let mut one = Object::new();
        one.insert("".to_string(), Value::Str(String::new()));
        assert_eq!(compiled(&Value::Object(one)).name(), "dictionary");

        let mut two = Object::new();
        two.insert("a".to_string(), Value::Int(0));
        two.insert("b".to_string(), Value::Int(0));
        assert_eq!(compiled(&Value::Object(two)).name(), "namespace");
    }

    #[test]
    fn test_namespace_mandatory_set() {
        let mut fields = Object::new();
        fields.insert("amount".to_string(), Value::Int(0));
        fields.insert("label".to_string(), Value::Str(String::new()));
        fields.insert("notes".to_string(), Value::Null);
        fields.insert("tags".to_string(), Value::Array(vec![]));
        let Pattern::Namespace(ns) = compiled(&Value::Object(fields)) else {
            panic!("expected a namespace");
        };
        assert_eq!(ns.mandatory, vec!["amount".to_string(), "label".to_string()]);
    }

    #[test]
    fn test_regex_full_match_only() {
        let pattern = compiled(&Value::Str("[a-z]+".into()));
        assert!(pattern.value(Value::Str("test".into())).is_ok());
        assert_eq!(
            pattern.value(Value::Str("ERROR".into())).unwrap_err(),
            ErrorKind::IrregularString
        );
        // substring matches must not accept
        assert_eq!(
            pattern.value(Value::Str("ab1".into())).unwrap_err(),
            ErrorKind::IrregularString
        );
    }

    #[test]
    fn test_integer_bounds() {
        let absolute = Pattern::IntegerAbsolute(10);
        assert!(absolute.value(Value::Int(10)).is_ok());
        assert_eq!(
            absolute.value(Value::Int(11)).unwrap_err(),
            ErrorKind::PositiveIntegerOverflow
        );
        assert_eq!(
            absolute.value(Value::Int(-1)).unwrap_err(),
            ErrorKind::NegativeInteger
        );

        let relative = Pattern::IntegerRelative(10);
        assert!(relative.value(Value::Int(-9)).is_ok());
        // the relative integer bound is exclusive
        assert_eq!(
            relative.value(Value::Int(10)).unwrap_err(),
            ErrorKind::IntegerOverflow
        );
    }

    #[test]
    fn test_double_relative_bound_is_inclusive() {
        let relative = Pattern::DoubleRelative(2.5);
        assert!(relative.value(Value::Float(-2.5)).is_ok());
        assert_eq!(
            relative.value(Value::Float(2.6)).unwrap_err(),
            ErrorKind::DoubleOverflow
        );
    }

    #[test]
    fn test_decimal_relative_bound_keeps_inverted_comparison() {
        let limit = Decimal::from_str("1.5").unwrap();
        let relative = Pattern::DecimalRelative(limit);
        // inside the bound rejects, outside accepts
        assert_eq!(
            relative
                .value(Value::Decimal(Decimal::from_str("1.0").unwrap()))
                .unwrap_err(),
            ErrorKind::DecimalOverflow
        );
        assert!(relative
            .value(Value::Decimal(Decimal::from_str("2.0").unwrap()))
            .is_ok());
    }

    #[test]
    fn test_datetime_extension() {
        let pattern = compiled(&Value::Str(DATETIME.into()));
        assert!(pattern.value(Value::Str("2006-07-04T12:08:56".into())).is_ok());
        assert_eq!(
            pattern.value(Value::Str("not a date".into())).unwrap_err(),
            ErrorKind::DateTimeValueError
        );
        assert_eq!(
            pattern.value(Value::Int(1)).unwrap_err(),
            ErrorKind::StringTypeError
        );
    }

    #[test]
    fn test_json_round_trips_through_compile() {
        let mut fields = Object::new();
        fields.insert("amount".to_string(), Value::Int(100));
        fields.insert("label".to_string(), Value::Str("[a-z]+".into()));
        let pattern = compiled(&Value::Object(fields.clone()));
        assert_eq!(pattern.json(), Value::Object(fields));
    }
}
