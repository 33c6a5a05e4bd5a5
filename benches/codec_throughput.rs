//! Benchmark suite for avrolite encode/decode throughput
//!
//! Measures:
//! - Datum encoding and decoding of a representative record
//! - Projection onto a single-field reader schema
//! - Container write and read with different block sizes
//!
//! # Configuration
//!
//! - `BENCH_SAMPLE_SIZE`: Number of samples to collect (default: 100)
//! - `BENCH_MEASUREMENT_TIME`: Measurement time in seconds (default: 5)
//!
//! ```bash
//! BENCH_SAMPLE_SIZE=50 BENCH_MEASUREMENT_TIME=3 cargo bench
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::io::Cursor;
use std::time::Duration;

use avrolite::{
    decode_datum, encode_datum, AvroValue, ContainerReader, ContainerWriter, Schema, WriterConfig,
};

const RECORD_COUNT: usize = 10_000;

fn user_schema() -> Schema {
    Schema::parse(
        r#"{"type": "record", "name": "User", "namespace": "bench", "fields": [
            {"name": "id", "type": "long"},
            {"name": "username", "type": "string"},
            {"name": "score", "type": "double"},
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "email", "type": ["null", "string"]},
            {"name": "status", "type": {"type": "enum", "name": "Status", "symbols": ["ACTIVE", "BANNED"]}}]}"#,
    )
    .unwrap()
}

fn user(i: usize) -> AvroValue {
    AvroValue::record([
        ("id", AvroValue::Long(i as i64)),
        ("username", AvroValue::from(format!("user_{}", i))),
        ("score", AvroValue::Double(i as f64 * 0.5)),
        (
            "tags",
            AvroValue::Array(vec![AvroValue::from("alpha"), AvroValue::from("beta")]),
        ),
        (
            "email",
            if i % 3 == 0 {
                AvroValue::Null
            } else {
                AvroValue::from(format!("user_{}@example.com", i))
            },
        ),
        ("status", AvroValue::Enum("ACTIVE".into())),
    ])
}

fn write_container(schema: &Schema, datums: &[AvroValue], block_size: usize) -> Vec<u8> {
    let config = WriterConfig::new().with_block_size(block_size);
    let mut writer = ContainerWriter::new(Cursor::new(Vec::new()), schema.clone(), config).unwrap();
    for datum in datums {
        writer.append(datum).unwrap();
    }
    writer.close().unwrap().into_inner()
}

/// Configure Criterion based on environment variables
fn configure_criterion() -> Criterion {
    let mut criterion = Criterion::default();

    if let Ok(sample_size) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(size) = sample_size.parse::<usize>() {
            criterion = criterion.sample_size(size);
        } else {
            eprintln!("Warning: Invalid BENCH_SAMPLE_SIZE value: {}", sample_size);
        }
    }

    if let Ok(measurement_time) = std::env::var("BENCH_MEASUREMENT_TIME") {
        if let Ok(secs) = measurement_time.parse::<u64>() {
            criterion = criterion.measurement_time(Duration::from_secs(secs));
        } else {
            eprintln!(
                "Warning: Invalid BENCH_MEASUREMENT_TIME value: {}",
                measurement_time
            );
        }
    }

    criterion
}

/// Benchmark single datum encode and decode
fn bench_datum(c: &mut Criterion) {
    let mut group = c.benchmark_group("datum");
    let schema = user_schema();
    let datum = user(42);
    let bytes = encode_datum(&schema, &datum).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| encode_datum(black_box(&schema), black_box(&datum)).unwrap());
    });
    group.bench_function("decode", |b| {
        b.iter(|| decode_datum(&schema, &schema, black_box(&bytes)).unwrap());
    });

    let projection = Schema::parse(
        r#"{"type": "record", "name": "User", "namespace": "bench", "fields": [
            {"name": "username", "type": "string"}]}"#,
    )
    .unwrap();
    group.bench_function("decode_projected", |b| {
        b.iter(|| decode_datum(&schema, &projection, black_box(&bytes)).unwrap());
    });

    group.finish();
}

/// Benchmark container write and read across block sizes
fn bench_container(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");
    let schema = user_schema();
    let datums: Vec<AvroValue> = (0..RECORD_COUNT).map(user).collect();
    group.throughput(Throughput::Elements(RECORD_COUNT as u64));

    for block_size in [4_096usize, 64_000, 1_048_576] {
        group.bench_with_input(BenchmarkId::new("write", block_size), &block_size, |b, &size| {
            b.iter(|| write_container(&schema, &datums, size));
        });

        let bytes = write_container(&schema, &datums, block_size);
        group.bench_with_input(BenchmarkId::new("read", block_size), &bytes, |b, bytes| {
            b.iter(|| {
                let reader = ContainerReader::new(Cursor::new(bytes.as_slice())).unwrap();
                reader.map(|datum| datum.unwrap()).count()
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_datum, bench_container
}

criterion_main!(benches);
