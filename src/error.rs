//! Error types for schema parsing, binary encoding and container files

use std::io;
use thiserror::Error;

/// Errors raised while parsing a schema definition.
///
/// Every variant carries the offending name or JSON fragment so the caller
/// can locate the problem in the schema text.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema text is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    /// Name does not follow the Avro naming rules
    #[error("Invalid name: {0:?}")]
    InvalidName(String),
    /// Namespace is empty or has a malformed component
    #[error("Invalid namespace: {0:?}")]
    InvalidNamespace(String),
    /// A named type with this fullname is already registered
    #[error("Duplicate schema name: {0}")]
    DuplicateName(String),
    /// Name collides with a reserved type name
    #[error("{0} is a reserved type name")]
    ReservedName(String),
    /// Union is nested or repeats a branch kind
    #[error("Invalid union: {0}")]
    InvalidUnion(String),
    /// A required attribute is missing
    #[error("{kind} schema missing required attribute '{attribute}': {fragment}")]
    MissingAttribute {
        kind: &'static str,
        attribute: &'static str,
        fragment: String,
    },
    /// An attribute has the wrong JSON type or an illegal value
    #[error("Invalid attribute '{attribute}': {message}")]
    InvalidAttribute {
        attribute: &'static str,
        message: String,
    },
    /// Type is neither a primitive, a type keyword, nor a registered name
    #[error("Unknown type: {0}")]
    UnknownType(String),
    /// Two fields of one record share a name
    #[error("Field name {field} is already in use in record {record}")]
    DuplicateField { record: String, field: String },
}

/// Errors raised by the host capability check.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Float and double conversions assume a little-endian host
    #[error("Big-endian hosts are not supported")]
    BigEndian,
}

/// Errors that can occur during decoding
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of file")]
    UnexpectedEof,
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// Writer and reader schemas cannot be resolved against each other
    #[error("Writer's schema {writer} and reader's schema {reader} do not match")]
    SchemaMismatch { writer: String, reader: String },
    /// A field default cannot be converted to the field's type
    #[error("Invalid default value for {schema}: {message}")]
    InvalidDefault { schema: String, message: String },
    /// A named reference has no definition in the schema's registry
    #[error("Unknown named type: {0}")]
    UnknownNamedType(String),
    /// Host capability check failed
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// IO error
    #[error("IO error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::UnexpectedEof
        } else {
            DecodeError::Io(err)
        }
    }
}

/// Errors that can occur during encoding
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Datum is not a valid instance of its schema
    #[error("The datum {datum} is not an example of schema {schema}")]
    InvalidDatum { schema: String, datum: String },
    /// A record datum lacks one of the schema's fields
    #[error("Record {record} datum is missing field '{field}'")]
    MissingField { record: String, field: String },
    /// A named reference has no definition in the schema's registry
    #[error("Unknown named type: {0}")]
    UnknownNamedType(String),
    /// Host capability check failed
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur during codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    /// Unsupported codec
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),
}

/// Errors that can occur while opening local files
#[derive(Debug, Error)]
pub enum SourceError {
    /// File system error
    #[error("File system error: {0}")]
    FileSystemError(String),
    /// Path not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Top-level container file error type
#[derive(Debug, Error)]
pub enum DataFileError {
    /// Source error
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Parse error at specific offset
    #[error("Parse error at offset {offset}: {message}")]
    Parse { offset: u64, message: String },

    /// Invalid magic bytes
    #[error("Invalid magic bytes: expected 'Obj\\x01', found {0:?}")]
    InvalidMagic([u8; 4]),

    /// Required header metadata is absent
    #[error("Missing metadata key: {0}")]
    MissingMetadata(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Decode error in a block
    #[error("Decode error in block {block_index}: {source}")]
    Decode {
        block_index: usize,
        #[source]
        source: DecodeError,
    },

    /// Encode error
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Host capability check failed
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<DecodeError> for DataFileError {
    fn from(err: DecodeError) -> Self {
        DataFileError::Decode {
            block_index: 0,
            source: err,
        }
    }
}
