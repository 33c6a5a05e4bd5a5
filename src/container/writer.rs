//! Container file writer
//!
//! Datums are encoded into an in-memory block buffer; a block is written to
//! the stream once the buffer reaches the configured size, on
//! [`ContainerWriter::flush`], and on [`ContainerWriter::close`]. Blocks still
//! buffered when the writer is dropped without closing are lost.

use std::io::{Read, Seek, SeekFrom, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::binary::{BinaryDecoder, BinaryEncoder};
use crate::datum::DatumWriter;
use crate::error::DataFileError;
use crate::schema::Schema;
use crate::value::AvroValue;

use super::config::WriterConfig;
use super::header::{generate_sync_marker, FileHeader};
use super::RESERVED_METADATA_PREFIX;

/// Writes datums to a container file.
#[derive(Debug)]
pub struct ContainerWriter<W: Write> {
    encoder: BinaryEncoder<W>,
    header: FileHeader,
    datum_writer: DatumWriter,
    block_size: usize,
    /// Encoded datums of the pending block
    buffer: BytesMut,
    /// Encoding area for the datum being appended
    scratch: BinaryEncoder<Vec<u8>>,
    block_count: u64,
    blocks_written: usize,
}

impl<W: Write> ContainerWriter<W> {
    /// Start a new container and write its header.
    ///
    /// # Errors
    /// - `DataFileError::Configuration` if a metadata key uses the reserved
    ///   `avro.` prefix or the block size is zero
    /// - `DataFileError::Codec` if the codec is not supported
    /// - `DataFileError::Io` if the header cannot be written
    pub fn new(writer: W, schema: Schema, config: WriterConfig) -> Result<Self, DataFileError> {
        if let Some(key) = config
            .metadata
            .keys()
            .find(|key| key.starts_with(RESERVED_METADATA_PREFIX))
        {
            return Err(DataFileError::Configuration(format!(
                "Metadata key '{}' uses the reserved '{}' prefix",
                key, RESERVED_METADATA_PREFIX
            )));
        }
        config.codec.ensure_supported()?;
        check_block_size(config.block_size)?;

        let header = FileHeader::new(
            schema,
            config.codec,
            &config.metadata,
            generate_sync_marker(),
        );
        let mut encoder = BinaryEncoder::new(writer)?;
        header.write(&mut encoder)?;

        debug!(
            codec = header.codec.name(),
            metadata_entries = header.metadata.len(),
            block_size = config.block_size,
            "Wrote container header"
        );

        Self::from_parts(encoder, header, config.block_size)
    }

    fn from_parts(
        encoder: BinaryEncoder<W>,
        header: FileHeader,
        block_size: usize,
    ) -> Result<Self, DataFileError> {
        check_block_size(block_size)?;
        Ok(Self {
            datum_writer: DatumWriter::new(header.schema.clone()),
            encoder,
            header,
            block_size,
            buffer: BytesMut::with_capacity(block_size),
            scratch: BinaryEncoder::new(Vec::new())?,
            block_count: 0,
            blocks_written: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.header.schema
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Number of blocks written to the stream so far.
    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    /// Number of datums buffered for the pending block.
    pub fn pending(&self) -> u64 {
        self.block_count
    }

    /// Append one datum.
    ///
    /// The datum is fully encoded before it joins the block buffer, so a
    /// datum that fails validation leaves the buffer untouched.
    pub fn append(&mut self, datum: &AvroValue) -> Result<(), DataFileError> {
        self.scratch.get_mut().clear();
        self.datum_writer.write(datum, &mut self.scratch)?;
        self.buffer.extend_from_slice(self.scratch.get_ref());
        self.block_count += 1;

        if self.buffer.len() >= self.block_size {
            self.write_block()?;
        }
        Ok(())
    }

    /// Write the pending block, if any, and flush the stream.
    pub fn flush(&mut self) -> Result<(), DataFileError> {
        self.write_block()?;
        self.encoder.flush()?;
        Ok(())
    }

    /// Flush and return the underlying stream.
    pub fn close(mut self) -> Result<W, DataFileError> {
        self.flush()?;
        Ok(self.encoder.into_inner())
    }

    fn write_block(&mut self) -> Result<(), DataFileError> {
        if self.block_count == 0 {
            return Ok(());
        }

        let data = self.header.codec.compress(self.buffer.split().freeze())?;
        self.encoder.write_long(self.block_count as i64)?;
        self.encoder.write_long(data.len() as i64)?;
        self.encoder.write_fixed(&data)?;
        self.encoder.write_fixed(&self.header.sync_marker)?;

        debug!(
            block_index = self.blocks_written,
            count = self.block_count,
            size = data.len(),
            "Flushed container block"
        );

        self.block_count = 0;
        self.blocks_written += 1;
        Ok(())
    }
}

impl<S: Read + Write + Seek> ContainerWriter<S> {
    /// Reopen an existing container for appending.
    ///
    /// The header is read from the start of `stream`; its schema, codec,
    /// metadata and sync marker are kept, and new blocks go after the last
    /// byte of the stream.
    pub fn append_to(stream: S) -> Result<Self, DataFileError> {
        Self::append_to_with_block_size(stream, WriterConfig::default().block_size)
    }

    /// Like [`append_to`](Self::append_to) with an explicit block size.
    pub fn append_to_with_block_size(
        mut stream: S,
        block_size: usize,
    ) -> Result<Self, DataFileError> {
        stream.seek(SeekFrom::Start(0))?;
        let header = {
            let mut decoder = BinaryDecoder::new(&mut stream)?;
            FileHeader::read(&mut decoder)?
        };
        header.codec.ensure_supported()?;
        let end = stream.seek(SeekFrom::End(0))?;

        debug!(codec = header.codec.name(), end, "Opened container for append");

        Self::from_parts(BinaryEncoder::new(stream)?, header, block_size)
    }
}

fn check_block_size(block_size: usize) -> Result<(), DataFileError> {
    if block_size == 0 {
        return Err(DataFileError::Configuration(
            "Block size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
