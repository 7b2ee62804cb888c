use crate::value::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt::Write;

/// Encode a [`Value`] as compact JSON text, literal-faithful: members keep
/// their insertion order and each numeric kind is written so that scanning
/// the output reproduces the same kind. Integers stay bare, decimals keep
/// their scale (`1.0` stays `1.0`), and doubles always carry an exponent.
#[must_use]
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Decimal(d) => {
            let _ = write!(out, "{d}");
        }
        Value::Float(f) => {
            if f.is_finite() {
                // {:e} keeps the exponent, so the literal re-scans as a double
                let _ = write!(out, "{f:e}");
            } else {
                out.push_str("null");
            }
        }
        Value::Str(s) => write_string(out, s),
        Value::Array(elements) => {
            out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, element);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (name, member)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, name);
                out.push(':');
                write_value(out, member);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Decimal(d) => Serialize::serialize(d, serializer),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (name, member) in map {
                    out.serialize_entry(name, member)?;
                }
                out.end()
            }
        }
    }
}

/// Pretty-print a [`Value`] as JSON through serde.
///
/// # Errors
/// Returns a `serde_json::Error` if serialization fails.
pub fn to_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Render a [`Value`] as YAML.
///
/// # Errors
/// Returns a `serde_yaml::Error` if serialization fails.
pub fn to_yaml(value: &Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn round_trip(text: &str) -> String {
        encode(&Parser::new().eval(text).unwrap())
    }

    #[test]
    fn test_compact_encoding() {
        assert_eq!(
            round_trip(r#"{ "a": [1, true, null], "b": "x" }"#),
            r#"{"a":[1,true,null],"b":"x"}"#
        );
    }

    #[test]
    fn test_member_order_is_preserved() {
        assert_eq!(round_trip(r#"{"z": 1, "a": 2}"#), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_decimal_scale_survives() {
        assert_eq!(round_trip("1.0"), "1.0");
        assert_eq!(round_trip("-0.250"), "-0.250");
    }

    #[test]
    fn test_double_keeps_its_exponent() {
        let encoded = round_trip("1.5e3");
        let again = Parser::new().eval(&encoded).unwrap();
        assert_eq!(again, crate::value::Value::Float(1.5e3));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            encode(&crate::value::Value::Str("a\"b\\c/d\n\u{0001}".into())),
            "\"a\\\"b\\\\c\\/d\\n\\u0001\""
        );
    }
}
