//! Object container files
//!
//! A container holds a header (magic, metadata, sync marker) followed by
//! blocks of datums, each terminated by the sync marker:
//!
//! ```text
//! "Obj\x01" | metadata map<bytes> | sync[16] | { count | size | data | sync[16] }*
//! ```

mod config;
mod header;
mod reader;
mod writer;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::OnceLock;

pub use config::{ReaderConfig, WriterConfig};
pub use header::{generate_sync_marker, FileHeader};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;

use crate::error::DataFileError;
use crate::schema::{AvroSchema, Schema};
use crate::source::{create_file, open_file, open_file_rw};

/// Magic bytes that open every container file: "Obj" and version 1.
pub const MAGIC: [u8; 4] = [b'O', b'b', b'j', 0x01];

/// Length of the sync marker in bytes.
pub const SYNC_SIZE: usize = 16;

/// Default block size in bytes.
pub const SYNC_INTERVAL: usize = 64_000;

/// Metadata key naming the block codec.
pub const METADATA_CODEC: &str = "avro.codec";

/// Metadata key holding the writer's schema as JSON text.
pub const METADATA_SCHEMA: &str = "avro.schema";

/// Prefix of metadata keys reserved for the format itself.
pub const RESERVED_METADATA_PREFIX: &str = "avro.";

static METADATA_SCHEMA_DOC: OnceLock<Schema> = OnceLock::new();

/// Schema of the header metadata: `{"type": "map", "values": "bytes"}`.
pub fn metadata_schema() -> &'static Schema {
    METADATA_SCHEMA_DOC.get_or_init(|| Schema::from(AvroSchema::Map(Box::new(AvroSchema::Bytes))))
}

/// Convenience constructors for containers stored in local files.
pub struct DataFile;

impl DataFile {
    /// Open a container file for reading.
    pub fn open<P: AsRef<Path>>(
        path: P,
    ) -> Result<ContainerReader<BufReader<File>>, DataFileError> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open a container file for reading with an explicit configuration.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: ReaderConfig,
    ) -> Result<ContainerReader<BufReader<File>>, DataFileError> {
        ContainerReader::with_config(open_file(path)?, config)
    }

    /// Create (or truncate) a container file.
    pub fn create<P: AsRef<Path>>(
        path: P,
        schema: Schema,
        config: WriterConfig,
    ) -> Result<ContainerWriter<BufWriter<File>>, DataFileError> {
        ContainerWriter::new(create_file(path)?, schema, config)
    }

    /// Reopen an existing container file to append datums.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<ContainerWriter<File>, DataFileError> {
        ContainerWriter::append_to(open_file_rw(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_schema() {
        assert_eq!(metadata_schema().to_string(), r#"{"type":"map","values":"bytes"}"#);
        assert!(std::ptr::eq(metadata_schema(), metadata_schema()));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            DataFile::open("/nonexistent/data.avro"),
            Err(DataFileError::Source(_))
        ));
    }
}
