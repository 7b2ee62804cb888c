pub mod api;
pub mod error;
pub mod parser;
pub mod pattern;
pub mod scanner;
pub mod schema;
pub mod serialization;
pub mod validator;
pub mod value;

pub use api::{
    compile_schema, compile_schema_with, parse, parse_array, parse_object, parse_regular,
    parse_regular_with_limits, parse_with_limits, report, validate,
};
pub use error::{CompileError, ErrorKind, ParseError, PathSegment, ValidationError};
pub use parser::Parser;
pub use pattern::{Extension, Extensions, Pattern};
pub use scanner::{Limits, DEFAULT_LIMIT};
pub use schema::RegularParser;
pub use serialization::{encode, to_json, to_yaml};
pub use value::{Object, Value};
