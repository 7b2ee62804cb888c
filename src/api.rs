use crate::error::{CompileError, ParseDiagnostic, ParseError, ValidationError};
use crate::parser::Parser;
use crate::pattern::{self, Extensions, Pattern};
use crate::scanner::Limits;
use crate::schema::RegularParser;
use crate::validator;
use crate::value::{Object, Value};

/// Evaluate one JSON document with the default limits.
///
/// This is the one-shot entry point. To parse several documents under one
/// shared budget, hold a [`Parser`] instead.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the failure's kind, byte offset and
/// value path.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    Parser::new().eval(text)
}

/// Evaluate one JSON document under caller-chosen limits.
///
/// # Errors
///
/// Returns a [`ParseError`] on syntax errors or when the document draws
/// more containers or iterations than `limits` allows.
pub fn parse_with_limits(text: &str, limits: Limits) -> Result<Value, ParseError> {
    Parser::with_limits(limits).eval(text)
}

/// Evaluate a document that must be an object.
///
/// # Errors
///
/// Fails with `ObjectTypeError` when the text denotes anything else.
pub fn parse_object(text: &str) -> Result<Object, ParseError> {
    let mut map = Object::new();
    Parser::new().update(&mut map, text)?;
    Ok(map)
}

/// Evaluate a document that must be an array.
///
/// # Errors
///
/// Fails with `ArrayTypeError` when the text denotes anything else.
pub fn parse_array(text: &str) -> Result<Vec<Value>, ParseError> {
    let mut list = Vec::new();
    Parser::new().extend(&mut list, text)?;
    Ok(list)
}

/// Parse a schema source text and compile it into a [`Pattern`] using the
/// built-in extensions.
///
/// # Errors
///
/// Returns [`CompileError::Syntax`] when the schema text is not valid JSON
/// and [`CompileError::Regex`] when a regular string does not compile.
pub fn compile_schema(text: &str) -> Result<Pattern, CompileError> {
    compile_schema_with(text, &Extensions::default())
}

/// Parse and compile a schema against a caller-supplied extension registry.
///
/// # Errors
///
/// Same as [`compile_schema`].
pub fn compile_schema_with(text: &str, extensions: &Extensions) -> Result<Pattern, CompileError> {
    let schema = Parser::new().eval(text)?;
    pattern::compile(&schema, extensions)
}

/// Evaluate one JSON document against a compiled pattern, rejecting at the
/// first offending token.
///
/// # Errors
///
/// Returns a [`ParseError`] for syntax, resource and schema errors alike.
pub fn parse_regular(text: &str, pattern: &Pattern) -> Result<Value, ParseError> {
    RegularParser::new(pattern).eval(text)
}

/// [`parse_regular`] under caller-chosen limits.
///
/// # Errors
///
/// Same as [`parse_regular`].
pub fn parse_regular_with_limits(
    text: &str,
    pattern: &Pattern,
    limits: Limits,
) -> Result<Value, ParseError> {
    RegularParser::with_limits(pattern, limits).eval(text)
}

/// Validate an already-built [`Value`] against a compiled pattern. See
/// [`validator::validate`] for the exact semantics.
///
/// # Errors
///
/// Returns a path-carrying [`ValidationError`] at the first offending value.
pub fn validate(instance: Value, pattern: &Pattern) -> Result<Value, ValidationError> {
    validator::validate(instance, pattern)
}

/// Bind a parse failure to its source text for rich terminal reporting via
/// miette.
#[must_use]
pub fn report(error: &ParseError, name: &str, source: &str) -> ParseDiagnostic {
    error.to_diagnostic(name, source)
}
