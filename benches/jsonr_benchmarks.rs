use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonr_core::{compile_schema, encode, parse, validate, Parser, RegularParser};

// ============================================================================
// Test Data: Varying Complexity and Size
// ============================================================================

const TINY_JSON: &str = r#"{"value": 42}"#;

const SMALL_JSON: &str = r#"{
    "name": "test",
    "version": 1.0,
    "enabled": true,
    "tags": ["a", "b", "c"]
}"#;

const MEDIUM_JSON: &str = r#"{
    "servers": [
        {"host": "server1.com", "port": 8080, "ssl": true, "retries": 5},
        {"host": "server2.com", "port": 8081, "ssl": true, "retries": 5},
        {"host": "server3.com", "port": 8082, "ssl": false, "retries": 3}
    ],
    "production": {
        "host": "prod.example.com",
        "port": 443,
        "ssl": true,
        "retries": 3
    },
    "timeout": 30,
    "rate": 0.25
}"#;

const LARGE_JSON: &str = r#"{
    "users": [
        {"id": 1, "name": "Admin", "email": "admin@example.com", "roles": ["admin", "superuser"]},
        {"id": 2, "name": "Alice", "email": "alice@example.com", "roles": ["developer", "reviewer"]},
        {"id": 3, "name": "Bob", "email": "bob@example.com", "roles": ["developer"]},
        {"id": 4, "name": "Charlie", "email": "charlie@example.com", "roles": ["viewer"]},
        {"id": 5, "name": "David", "email": "david@example.com", "roles": ["developer", "ops"]}
    ],
    "resources": [
        {"path": "/api/users", "read": true, "write": true},
        {"path": "/api/admin", "read": true, "write": false},
        {"path": "/api/metrics", "read": true, "write": false}
    ],
    "system_config": {
        "api_version": "2.0",
        "debug": false,
        "max_connections": 1000,
        "timeout_seconds": 30,
        "cache": {"enabled": true, "ttl": 3600, "max_size": 10485760},
        "logging": {"level": "info", "format": "json", "output": "stdout"}
    }
}"#;

const ITEM_SCHEMA: &str = r#"{
    "items": [{
        "id": 0,
        "name": "",
        "value": 0,
        "active": true
    }]
}"#;

// Generate a large uniform document for stress testing
fn generate_xlarge_json(array_size: usize) -> String {
    let mut json = String::from("{\n    \"items\": [\n");
    for i in 0..array_size {
        if i > 0 {
            json.push_str(",\n");
        }
        json.push_str(&format!(
            "        {{\"id\": {}, \"name\": \"Item {}\", \"value\": {}, \"active\": {}}}",
            i,
            i,
            i * 100,
            i % 2 == 0
        ));
    }
    json.push_str("\n    ]\n}");
    json
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parse_tiny(c: &mut Criterion) {
    c.bench_function("parse_tiny", |b| b.iter(|| parse(black_box(TINY_JSON))));
}

fn bench_parse_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_by_size");

    for (name, source) in [
        ("tiny", TINY_JSON),
        ("small", SMALL_JSON),
        ("medium", MEDIUM_JSON),
        ("large", LARGE_JSON),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| Parser::new().eval(black_box(src)))
        });
    }

    group.finish();
}

fn bench_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_array_scaling");

    for size in [10, 50, 100, 500, 1000] {
        let source = generate_xlarge_json(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| Parser::new().eval(black_box(src)))
        });
    }

    group.finish();
}

// ============================================================================
// Schema Benchmarks
// ============================================================================

fn bench_compile_schema(c: &mut Criterion) {
    c.bench_function("compile_schema", |b| {
        b.iter(|| compile_schema(black_box(ITEM_SCHEMA)))
    });
}

fn bench_regular_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("regular_parse_scaling");
    let pattern = compile_schema(ITEM_SCHEMA).unwrap();

    for size in [10, 50, 100, 500, 1000] {
        let source = generate_xlarge_json(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| RegularParser::new(&pattern).eval(black_box(src)))
        });
    }

    group.finish();
}

fn bench_validate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_scaling");
    let pattern = compile_schema(ITEM_SCHEMA).unwrap();

    for size in [10, 50, 100, 500, 1000] {
        let value = parse(&generate_xlarge_json(size)).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, v| {
            b.iter(|| validate(black_box(v.clone()), &pattern))
        });
    }

    group.finish();
}

// ============================================================================
// Serialization Benchmarks
// ============================================================================

fn bench_encode_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_by_size");

    for (name, source) in [
        ("tiny", TINY_JSON),
        ("small", SMALL_JSON),
        ("medium", MEDIUM_JSON),
        ("large", LARGE_JSON),
    ] {
        let value = parse(source).unwrap();
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &value, |b, v| {
            b.iter(|| encode(black_box(v)))
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    parser_benches,
    bench_parse_tiny,
    bench_parse_sizes,
    bench_parse_scaling
);

criterion_group!(
    schema_benches,
    bench_compile_schema,
    bench_regular_parse_scaling,
    bench_validate_scaling
);

criterion_group!(serialization_benches, bench_encode_sizes);

criterion_main!(parser_benches, schema_benches, serialization_benches);
