//! Container file header
//!
//! The header is the first section of a container file:
//! - Magic bytes ("Obj\x01")
//! - Metadata map (`map<bytes>`, including schema and codec)
//! - 16-byte sync marker

use std::collections::HashMap;
use std::io::{Read, Write};

use rand::RngCore;

use crate::binary::{BinaryDecoder, BinaryEncoder};
use crate::codec::Codec;
use crate::datum::{DatumReader, DatumWriter};
use crate::error::{DataFileError, DecodeError};
use crate::schema::Schema;
use crate::value::AvroValue;

use super::{metadata_schema, MAGIC, METADATA_CODEC, METADATA_SCHEMA, SYNC_SIZE};

/// Parsed container header.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    /// Metadata key-value pairs, including the reserved `avro.*` entries
    pub metadata: HashMap<String, Vec<u8>>,
    /// Sync marker that terminates every block
    pub sync_marker: [u8; SYNC_SIZE],
    /// Writer's schema from `avro.schema`
    pub schema: Schema,
    /// Block codec from `avro.codec`
    pub codec: Codec,
}

impl FileHeader {
    /// Build the header for a new file.
    ///
    /// `user_metadata` is merged under the reserved `avro.codec` and
    /// `avro.schema` entries.
    pub fn new(
        schema: Schema,
        codec: Codec,
        user_metadata: &HashMap<String, Vec<u8>>,
        sync_marker: [u8; SYNC_SIZE],
    ) -> Self {
        let mut metadata = user_metadata.clone();
        metadata.insert(METADATA_CODEC.to_string(), codec.name().as_bytes().to_vec());
        metadata.insert(METADATA_SCHEMA.to_string(), schema.to_string().into_bytes());
        Self {
            metadata,
            sync_marker,
            schema,
            codec,
        }
    }

    /// Read a header from the start of a container.
    ///
    /// # Errors
    /// - `DataFileError::InvalidMagic` if magic bytes don't match
    /// - `DataFileError::Parse` if the input is too short for a header
    /// - `DataFileError::MissingMetadata` if `avro.schema` is absent
    /// - `DataFileError::Schema` if the schema JSON is invalid
    /// - `DataFileError::Codec` if the codec name is unknown
    pub fn read<R: Read>(decoder: &mut BinaryDecoder<R>) -> Result<Self, DataFileError> {
        let magic = decoder.read_fixed(MAGIC.len()).map_err(|e| truncated(e, "magic"))?;
        if magic != MAGIC {
            let mut found = [0u8; 4];
            found.copy_from_slice(&magic);
            return Err(DataFileError::InvalidMagic(found));
        }

        let metadata = Self::read_metadata(decoder)?;

        let sync = decoder
            .read_fixed(SYNC_SIZE)
            .map_err(|e| truncated(e, "sync marker"))?;
        let mut sync_marker = [0u8; SYNC_SIZE];
        sync_marker.copy_from_slice(&sync);

        let schema_json = metadata
            .get(METADATA_SCHEMA)
            .ok_or(DataFileError::MissingMetadata(METADATA_SCHEMA))?;
        let schema_json = std::str::from_utf8(schema_json).map_err(|e| DataFileError::Parse {
            offset: 0,
            message: format!("{} is not UTF-8: {}", METADATA_SCHEMA, e),
        })?;
        let schema = Schema::parse(schema_json)?;

        let codec = match metadata.get(METADATA_CODEC) {
            Some(name) => Codec::from_name(&String::from_utf8_lossy(name))?,
            None => Codec::Null,
        };

        Ok(Self {
            metadata,
            sync_marker,
            schema,
            codec,
        })
    }

    fn read_metadata<R: Read>(
        decoder: &mut BinaryDecoder<R>,
    ) -> Result<HashMap<String, Vec<u8>>, DataFileError> {
        let schema = metadata_schema();
        let value = DatumReader::new(schema.clone())
            .read(decoder)
            .map_err(|e| truncated(e, "metadata"))?;
        metadata_from_value(value)
    }

    /// Write the header: magic, metadata map, sync marker.
    pub fn write<W: Write>(&self, encoder: &mut BinaryEncoder<W>) -> Result<(), DataFileError> {
        encoder.write_fixed(&MAGIC)?;

        let mut entries: Vec<_> = self.metadata.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let map = AvroValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.clone(), AvroValue::Bytes(value.clone())))
                .collect(),
        );
        DatumWriter::new(metadata_schema().clone()).write(&map, encoder)?;

        encoder.write_fixed(&self.sync_marker)?;
        Ok(())
    }

    /// Metadata value for `key`, if present.
    pub fn metadata_value(&self, key: &str) -> Option<&[u8]> {
        self.metadata.get(key).map(Vec::as_slice)
    }
}

/// Convert the decoded metadata map into raw key/value pairs.
///
/// # Errors
/// Returns `DataFileError::Parse` if the value is not a map or any entry
/// is not a byte string.
fn metadata_from_value(value: AvroValue) -> Result<HashMap<String, Vec<u8>>, DataFileError> {
    let malformed = |message: String| DataFileError::Parse {
        offset: MAGIC.len() as u64,
        message,
    };
    let AvroValue::Map(entries) = value else {
        return Err(malformed("Metadata is not a map".to_string()));
    };
    entries
        .into_iter()
        .map(|(key, value)| match value {
            AvroValue::Bytes(bytes) => Ok((key, bytes)),
            other => Err(malformed(format!(
                "Metadata value for {:?} is {}, expected bytes",
                key,
                other.type_name()
            ))),
        })
        .collect()
}

/// Generate a random sync marker laid out like a version 4 UUID.
pub fn generate_sync_marker() -> [u8; SYNC_SIZE] {
    let mut marker = [0u8; SYNC_SIZE];
    rand::thread_rng().fill_bytes(&mut marker);
    marker[6] |= 0x40;
    marker[8] |= 0x80;
    marker
}

/// Report a truncated header section as a parse error.
fn truncated(err: DecodeError, section: &str) -> DataFileError {
    match err {
        DecodeError::UnexpectedEof => DataFileError::Parse {
            offset: 0,
            message: format!("Header too short: unexpected end of file in {}", section),
        },
        other => DataFileError::Decode {
            block_index: 0,
            source: other,
        },
    }
}
