// End-to-end behavior across the parser, the schema compiler and the
// serializers.

use jsonr_core::pattern::{compile, Extensions};
use jsonr_core::{
    compile_schema, encode, parse, parse_regular, ErrorKind, Limits, Parser, Value,
};

#[test]
fn test_parse_encode_parse_is_stable() {
    let text = r#"{"config":{"retries":3,"rate":0.5,"hosts":["a","b"],"debug":false,"extra":null}}"#;
    let first = parse(text).unwrap();
    let second = parse(&encode(&first)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_pattern_json_recompiles() {
    let schema = r#"{"amount": 100, "label": "[a-z]+", "tags": [""], "notes": null}"#;
    let pattern = compile_schema(schema).unwrap();
    let description = pattern.json();
    let again = compile(&description, &Extensions::default()).unwrap();
    assert_eq!(again.json(), description);
}

#[test]
fn test_one_budget_for_a_whole_request() {
    // one parser instance bounds the combined cost of many small bodies
    let mut parser = Parser::with_limits(Limits::new(100, 10));
    let mut total = 0;
    let mut failed = false;
    for _ in 0..10 {
        match parser.eval("[1, 2, 3]") {
            Ok(value) => total += value.as_array().map_or(0, Vec::len),
            Err(err) => {
                assert_eq!(err.kind, ErrorKind::IterationsOverflow);
                failed = true;
                break;
            }
        }
    }
    assert!(failed);
    assert!(total <= 10);
}

#[test]
fn test_schema_parsing_stops_early_on_big_invalid_input() {
    // the offending token is the first member, the rest is never scanned
    let mut text = String::from(r#"{"bad": "x""#);
    for i in 0..1000 {
        text.push_str(&format!(r#", "k{i}": {i}"#));
    }
    text.push('}');
    let pattern = compile_schema(r#"{"bad": 0, "other": 0}"#).unwrap();
    let err = parse_regular(&text, &pattern).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IntegerValueError);
    assert!(err.offset < 16);
}

#[test]
fn test_deeply_nested_within_limits() {
    let depth = 64;
    let text = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
    let value = parse(&text).unwrap();
    let mut cursor = &value;
    for _ in 0..depth {
        cursor = cursor.at(0).unwrap();
    }
    assert_eq!(cursor, &Value::Int(1));
}

#[test]
fn test_miette_report_renders() {
    let source = r#"{"a": [1, ?]}"#;
    let err = parse(source).unwrap_err();
    let report = miette::Report::new(err.to_diagnostic("body.json", source));
    let rendered = format!("{report:?}");
    assert!(rendered.contains("unexpected character"));
}

#[test]
fn test_datetime_survives_round_trip() {
    let pattern = compile_schema(r#"{"at": "yyyy-MM-ddTHH:mm:ss", "id": 0}"#).unwrap();
    let value = parse_regular(r#"{"at": "2026-08-26T09:30:00", "id": 7}"#, &pattern).unwrap();
    assert_eq!(
        parse(&encode(&value)).unwrap(),
        value
    );
}
