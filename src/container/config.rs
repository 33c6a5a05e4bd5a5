//! Container reader and writer configuration.

use std::collections::HashMap;

use crate::codec::Codec;
use crate::schema::Schema;

use super::SYNC_INTERVAL;

/// Configuration for [`ContainerWriter`](super::ContainerWriter).
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// Buffered block size in bytes that triggers a flush (default: 64,000).
    pub block_size: usize,
    /// Codec for block data (default: null).
    pub codec: Codec,
    /// User metadata written to the header. Keys must not start with `avro.`.
    pub metadata: HashMap<String, Vec<u8>>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            block_size: SYNC_INTERVAL,
            codec: Codec::Null,
            metadata: HashMap::new(),
        }
    }
}

impl WriterConfig {
    /// Create a new WriterConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block size in bytes.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the block codec.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Add a user metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Configuration for [`ContainerReader`](super::ContainerReader).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderConfig {
    /// Optional reader schema for schema evolution (default: None, read
    /// with the writer's schema).
    pub reader_schema: Option<Schema>,
}

impl ReaderConfig {
    /// Create a new ReaderConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reader schema for schema evolution.
    pub fn with_reader_schema(mut self, schema: Schema) -> Self {
        self.reader_schema = Some(schema);
        self
    }
}
