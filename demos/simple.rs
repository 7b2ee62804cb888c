use jsonr_core::{compile_schema, parse_regular, to_json};

fn main() {
    let schema = r#"{
        "name": "[A-Za-z ]+",
        "email": "[a-z.]+@[a-z.]+",
        "age": 150
    }"#;

    let body = r#"{
        "name": "John Doe",
        "email": "john.doe@example.com",
        "age": 42
    }"#;

    let pattern = compile_schema(schema).expect("schema compiles");
    match parse_regular(body, &pattern) {
        Ok(value) => {
            let json_output = to_json(&value).unwrap();
            println!("Accepted:\n{json_output}");
        }
        Err(e) => {
            eprintln!("Rejected: {:?}", miette::Report::new(e.to_diagnostic("body.json", body)));
        }
    }
}
