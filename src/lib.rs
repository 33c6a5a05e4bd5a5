//! Schema-driven binary serialization in the Avro format
//!
//! This library parses Avro schemas from JSON, encodes and decodes datums
//! in the Avro binary encoding with reader/writer schema resolution, and
//! reads and writes object container files.
//!
//! # Example
//! ```
//! use avrolite::{decode_datum, encode_datum, AvroValue, Schema};
//!
//! let writer = Schema::parse(r#"{"type": "record", "name": "Point", "fields": [
//!     {"name": "x", "type": "int"}, {"name": "y", "type": "int"}]}"#).unwrap();
//! let reader = Schema::parse(r#"{"type": "record", "name": "Point", "fields": [
//!     {"name": "y", "type": "long"}]}"#).unwrap();
//!
//! let datum = AvroValue::record([("x", AvroValue::Int(1)), ("y", AvroValue::Int(2))]);
//! let bytes = encode_datum(&writer, &datum).unwrap();
//! let projected = decode_datum(&writer, &reader, &bytes).unwrap();
//! assert_eq!(projected, AvroValue::record([("y", AvroValue::Long(2))]));
//! ```

pub mod binary;
pub mod codec;
pub mod container;
pub mod datum;
pub mod error;
pub mod platform;
pub mod schema;
pub mod source;
pub mod value;

// Re-export main types
pub use binary::{BinaryDecoder, BinaryEncoder};
pub use codec::Codec;
pub use container::{
    ContainerReader, ContainerWriter, DataFile, FileHeader, ReaderConfig, WriterConfig,
};
pub use datum::{decode_datum, encode_datum, DatumReader, DatumWriter};
pub use error::{
    CodecError, DataFileError, DecodeError, EncodeError, PlatformError, SchemaError, SourceError,
};
pub use platform::Platform;
pub use schema::{
    parse_schema, schemas_match, AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema,
    Name, RecordKind, RecordSchema, Schema, SchemaParser, Schemata, TypePromotion,
};
pub use value::AvroValue;
