//! Object container file tests: round trips, projection, resync and append.

use std::io::Cursor;

use avrolite::container::METADATA_CODEC;
use avrolite::{
    AvroValue, ContainerReader, ContainerWriter, DataFile, DataFileError, ReaderConfig, Schema,
    WriterConfig,
};
use tempfile::TempDir;

fn schema(json: &str) -> Schema {
    Schema::parse(json).unwrap()
}

fn write_to_vec(schema: &Schema, datums: &[AvroValue], config: WriterConfig) -> Vec<u8> {
    let mut writer = ContainerWriter::new(Cursor::new(Vec::new()), schema.clone(), config).unwrap();
    for datum in datums {
        writer.append(datum).unwrap();
    }
    writer.close().unwrap().into_inner()
}

fn read_all(bytes: Vec<u8>) -> Vec<AvroValue> {
    ContainerReader::new(Cursor::new(bytes))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn user_schema() -> Schema {
    schema(
        r#"{"type": "record", "name": "User", "namespace": "example.avro", "fields": [
            {"name": "username", "type": "string"},
            {"name": "age", "type": "int"},
            {"name": "verified", "type": "boolean", "default": "false"}]}"#,
    )
}

fn user(name: &str, age: i32, verified: bool) -> AvroValue {
    AvroValue::record([
        ("username", AvroValue::from(name)),
        ("age", AvroValue::Int(age)),
        ("verified", AvroValue::Boolean(verified)),
    ])
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_roundtrip_through_files() {
    let cases: Vec<(&str, Vec<AvroValue>)> = vec![
        (r#""null""#, vec![]),
        (r#""null""#, vec![AvroValue::Null]),
        (r#""string""#, vec![AvroValue::from("adsfasdf09809dsf-=adsf")]),
        (r#""int""#, vec![AvroValue::Int(1)]),
        (r#""boolean""#, vec![AvroValue::Boolean(true), AvroValue::Boolean(false)]),
        (r#""int""#, (10..70).map(AvroValue::Int).collect()),
    ];
    let dir = TempDir::new().unwrap();

    for (i, (schema_json, datums)) in cases.into_iter().enumerate() {
        let path = dir.path().join(format!("case_{}.avro", i));
        let mut writer =
            DataFile::create(&path, schema(schema_json), WriterConfig::default()).unwrap();
        for datum in &datums {
            writer.append(datum).unwrap();
        }
        writer.close().unwrap();

        let reader = DataFile::open(&path).unwrap();
        assert_eq!(reader.writer_schema(), &schema(schema_json));
        let read: Vec<AvroValue> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(read, datums, "case {}: {}", i, schema_json);
    }
}

#[test]
fn test_roundtrip_many_blocks() {
    let s = user_schema();
    let users: Vec<AvroValue> = (0..500)
        .map(|i| user(&format!("user{}", i), i, i % 2 == 0))
        .collect();
    let bytes = write_to_vec(&s, &users, WriterConfig::new().with_block_size(256));

    let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
    let read: Vec<AvroValue> = reader.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(read, users);
    assert!(reader.blocks_read() > 1);
}

#[test]
fn test_rewind_rereads_everything() {
    let bytes = write_to_vec(
        &schema(r#""long""#),
        &[AvroValue::Long(1), AvroValue::Long(2)],
        WriterConfig::new().with_block_size(1),
    );
    let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.by_ref().count(), 2);
    reader.rewind().unwrap();
    assert_eq!(reader.next_datum().unwrap(), Some(AvroValue::Long(1)));
}

#[test]
fn test_roundtrip_with_cross_namespace_reference() {
    let s = schema(
        r#"{"type": "record", "name": "A", "namespace": "x.y", "fields": [
            {"name": "e", "type": {"type": "enum", "name": "E", "symbols": ["P", "Q"]}},
            {"name": "b", "type": {"type": "record", "name": "B", "namespace": "z", "fields": [
                {"name": "k", "type": "x.y.E"}]}}]}"#,
    );
    let datum = AvroValue::record([
        ("e", AvroValue::Enum("P".into())),
        ("b", AvroValue::record([("k", AvroValue::Enum("Q".into()))])),
    ]);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested.avro");

    let mut writer = DataFile::create(&path, s.clone(), WriterConfig::default()).unwrap();
    writer.append(&datum).unwrap();
    writer.close().unwrap();

    let reader = DataFile::open(&path).unwrap();
    assert_eq!(reader.writer_schema(), &s);
    let read: Vec<AvroValue> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(read, vec![datum]);
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_projection_drops_unread_fields() {
    let users = vec![user("alice", 30, true), user("bob", 41, false)];
    let bytes = write_to_vec(&user_schema(), &users, WriterConfig::default());

    let reader_schema = schema(
        r#"{"type": "record", "name": "User", "namespace": "example.avro", "fields": [
            {"name": "username", "type": "string"}]}"#,
    );
    let reader = ContainerReader::with_config(
        Cursor::new(bytes),
        ReaderConfig::new().with_reader_schema(reader_schema),
    )
    .unwrap();
    let names: Vec<AvroValue> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(
        names,
        vec![
            AvroValue::record([("username", AvroValue::from("alice"))]),
            AvroValue::record([("username", AvroValue::from("bob"))]),
        ]
    );
}

#[test]
fn test_projection_adds_defaulted_field() {
    let writer_schema = schema(
        r#"{"type": "record", "name": "User", "fields": [{"name": "username", "type": "string"}]}"#,
    );
    let bytes = write_to_vec(
        &writer_schema,
        &[AvroValue::record([("username", AvroValue::from("carol"))])],
        WriterConfig::default(),
    );
    let reader_schema = schema(
        r#"{"type": "record", "name": "User", "fields": [
            {"name": "username", "type": "string"},
            {"name": "verified", "type": "boolean", "default": "false"}]}"#,
    );
    let mut reader = ContainerReader::with_config(
        Cursor::new(bytes),
        ReaderConfig::new().with_reader_schema(reader_schema),
    )
    .unwrap();
    assert_eq!(
        reader.next_datum().unwrap(),
        Some(AvroValue::record([
            ("username", AvroValue::from("carol")),
            ("verified", AvroValue::Boolean(false)),
        ]))
    );
}

#[test]
fn test_projection_skips_complex_fields() {
    let writer_schema = schema(
        r#"{"type": "record", "name": "something", "fields": [
            {"name": "something_fixed", "type": {"name": "inner_fixed", "type": "fixed", "size": 3}},
            {"name": "something_enum", "type": {"name": "inner_enum", "type": "enum", "symbols": ["hello", "goodbye"]}},
            {"name": "something_array", "type": {"type": "array", "items": "int"}},
            {"name": "something_map", "type": {"type": "map", "values": "int"}},
            {"name": "something_record", "type": {"name": "inner_record", "type": "record", "fields": [
                {"name": "inner", "type": "int"}]}},
            {"name": "username", "type": "string"}]}"#,
    );
    let datum = AvroValue::record([
        ("something_fixed", AvroValue::Fixed(b"foo".to_vec())),
        ("something_enum", AvroValue::Enum("hello".into())),
        (
            "something_array",
            AvroValue::Array(vec![AvroValue::Int(1), AvroValue::Int(2), AvroValue::Int(3)]),
        ),
        ("something_map", AvroValue::map([("a", AvroValue::Int(1)), ("b", AvroValue::Int(2))])),
        ("something_record", AvroValue::record([("inner", AvroValue::Int(2))])),
        ("username", AvroValue::from("john")),
    ]);
    let bytes = write_to_vec(&writer_schema, &[datum.clone(), datum], WriterConfig::default());

    let reader_schema = schema(
        r#"{"type": "record", "name": "something", "fields": [{"name": "username", "type": "string"}]}"#,
    );
    let reader = ContainerReader::with_config(
        Cursor::new(bytes),
        ReaderConfig::new().with_reader_schema(reader_schema),
    )
    .unwrap();
    let read: Vec<AvroValue> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(read, vec![AvroValue::record([("username", AvroValue::from("john"))]); 2]);
}

// ============================================================================
// Damaged Files
// ============================================================================

#[test]
fn test_missing_sync_marker_resynchronizes() {
    let datums: Vec<AvroValue> = (1..=3).map(AvroValue::Long).collect();
    let mut writer = ContainerWriter::new(
        Cursor::new(Vec::new()),
        schema(r#""long""#),
        WriterConfig::new().with_block_size(1),
    )
    .unwrap();
    let sync = writer.header().sync_marker;
    for datum in &datums {
        writer.append(datum).unwrap();
    }
    let mut bytes = writer.close().unwrap().into_inner();

    // The first occurrence ends the header; the second ends block 0
    let positions: Vec<usize> = bytes
        .windows(sync.len())
        .enumerate()
        .filter(|(_, window)| *window == sync)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(positions.len(), 4);
    bytes.drain(positions[1]..positions[1] + sync.len());

    let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
    let read: Vec<AvroValue> = reader.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(read, datums);
    assert_eq!(reader.resyncs(), 1);
}

#[test]
fn test_truncated_block_is_an_error() {
    let mut bytes = write_to_vec(
        &schema(r#""string""#),
        &[AvroValue::from("a fairly long string value")],
        WriterConfig::default(),
    );
    bytes.truncate(bytes.len() - 24);

    let results: Vec<_> = ContainerReader::new(Cursor::new(bytes)).unwrap().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(DataFileError::Decode { .. })));
}

#[test]
fn test_not_a_container() {
    assert!(matches!(
        ContainerReader::new(Cursor::new(b"PAR1 not avro".to_vec())),
        Err(DataFileError::InvalidMagic(_))
    ));
}

// ============================================================================
// Append
// ============================================================================

#[test]
fn test_append_to_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.avro");

    let mut writer = DataFile::create(
        &path,
        user_schema(),
        WriterConfig::new().with_metadata("origin", "first run"),
    )
    .unwrap();
    writer.append(&user("alice", 30, true)).unwrap();
    let sync = writer.header().sync_marker;
    writer.close().unwrap();

    let mut appender = DataFile::append(&path).unwrap();
    assert_eq!(appender.header().sync_marker, sync);
    assert_eq!(appender.schema(), &user_schema());
    appender.append(&user("bob", 41, false)).unwrap();
    appender.close().unwrap();

    let reader = DataFile::open(&path).unwrap();
    assert_eq!(reader.metadata_value("origin"), Some(&b"first run"[..]));
    let read: Vec<AvroValue> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(read, vec![user("alice", 30, true), user("bob", 41, false)]);
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_user_metadata_roundtrip() {
    let bytes = write_to_vec(
        &schema(r#""int""#),
        &[AvroValue::Int(7)],
        WriterConfig::new()
            .with_metadata("author", "someone")
            .with_metadata("blob", vec![0u8, 255]),
    );
    let reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.metadata_value("author"), Some(&b"someone"[..]));
    assert_eq!(reader.metadata_value("blob"), Some(&[0u8, 255][..]));
    assert_eq!(reader.metadata_value(METADATA_CODEC), Some(&b"null"[..]));
}

#[test]
fn test_reserved_metadata_key_rejected() {
    let result = ContainerWriter::new(
        Cursor::new(Vec::new()),
        schema(r#""int""#),
        WriterConfig::new().with_metadata("avro.custom", "x"),
    );
    assert!(matches!(result, Err(DataFileError::Configuration(_))));
}

#[test]
fn test_invalid_datum_is_rejected_and_file_stays_valid() {
    let s = schema(r#""int""#);
    let mut writer =
        ContainerWriter::new(Cursor::new(Vec::new()), s, WriterConfig::default()).unwrap();
    writer.append(&AvroValue::Int(1)).unwrap();
    assert!(writer.append(&AvroValue::from("nope")).is_err());
    writer.append(&AvroValue::Int(2)).unwrap();

    let bytes = writer.close().unwrap().into_inner();
    assert_eq!(read_all(bytes), vec![AvroValue::Int(1), AvroValue::Int(2)]);
}
