//! Container file reader
//!
//! Reads the header once, then decodes datums lazily one block at a time.
//! Each block's data section is loaded into memory in full before any of its
//! datums are decoded.

use std::collections::HashMap;
use std::io::{BufRead, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::binary::BinaryDecoder;
use crate::codec::Codec;
use crate::datum::DatumReader;
use crate::error::DataFileError;
use crate::schema::Schema;
use crate::source::Source;
use crate::value::AvroValue;

use super::config::ReaderConfig;
use super::header::FileHeader;
use super::SYNC_SIZE;

/// Iterates over the datums of a container file.
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use avrolite::{AvroValue, ContainerReader, ContainerWriter, Schema, WriterConfig};
///
/// let schema = Schema::parse(r#""long""#).unwrap();
/// let mut writer = ContainerWriter::new(Cursor::new(Vec::new()), schema, WriterConfig::default()).unwrap();
/// writer.append(&AvroValue::Long(42)).unwrap();
/// let bytes = writer.close().unwrap().into_inner();
///
/// let reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
/// let values: Vec<AvroValue> = reader.collect::<Result<_, _>>().unwrap();
/// assert_eq!(values, vec![AvroValue::Long(42)]);
/// ```
#[derive(Debug)]
pub struct ContainerReader<R: BufRead + Seek> {
    decoder: BinaryDecoder<R>,
    header: FileHeader,
    datum_reader: DatumReader,
    /// Offset of the first block, just past the header
    data_start: u64,
    /// Decoder over the current block's data
    block: Option<BinaryDecoder<Cursor<Bytes>>>,
    /// Datums left in the current block
    block_count: u64,
    blocks_read: usize,
    /// Whether a sync marker should precede the next block header. False
    /// right after the header, whose own sync marker is already consumed.
    sync_expected: bool,
    /// Sync marker mismatches seen so far
    resyncs: usize,
    finished: bool,
}

impl<R: BufRead + Seek> ContainerReader<R> {
    /// Open a container, reading with the writer's schema.
    pub fn new(reader: R) -> Result<Self, DataFileError> {
        Self::with_config(reader, ReaderConfig::default())
    }

    /// Open a container with an explicit configuration.
    ///
    /// # Errors
    /// - `DataFileError::InvalidMagic` / `DataFileError::Parse` for a bad header
    /// - `DataFileError::Schema` if the embedded schema is invalid
    /// - `DataFileError::Codec` if the codec is unknown or unsupported
    pub fn with_config(reader: R, config: ReaderConfig) -> Result<Self, DataFileError> {
        let mut decoder = BinaryDecoder::new(reader)?;
        let header = FileHeader::read(&mut decoder)?;
        header.codec.ensure_supported()?;
        let data_start = decoder.get_mut().tell()?;

        debug!(
            codec = header.codec.name(),
            metadata_entries = header.metadata.len(),
            data_start,
            "Read container header"
        );

        let reader_schema = config
            .reader_schema
            .unwrap_or_else(|| header.schema.clone());
        let datum_reader =
            DatumReader::new(header.schema.clone()).with_reader_schema(reader_schema);

        Ok(Self {
            decoder,
            header,
            datum_reader,
            data_start,
            block: None,
            block_count: 0,
            blocks_read: 0,
            sync_expected: false,
            resyncs: 0,
            finished: false,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn writer_schema(&self) -> &Schema {
        &self.header.schema
    }

    pub fn reader_schema(&self) -> &Schema {
        self.datum_reader.reader_schema()
    }

    pub fn metadata(&self) -> &HashMap<String, Vec<u8>> {
        &self.header.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&[u8]> {
        self.header.metadata_value(key)
    }

    pub fn sync_marker(&self) -> &[u8; SYNC_SIZE] {
        &self.header.sync_marker
    }

    pub fn codec(&self) -> Codec {
        self.header.codec
    }

    /// Number of blocks loaded so far.
    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    /// Number of times a block was not followed by the file's sync marker.
    pub fn resyncs(&self) -> usize {
        self.resyncs
    }

    /// Restart iteration from the first block.
    pub fn rewind(&mut self) -> Result<(), DataFileError> {
        self.decoder.get_mut().seek(SeekFrom::Start(self.data_start))?;
        self.block = None;
        self.block_count = 0;
        self.blocks_read = 0;
        self.sync_expected = false;
        self.finished = false;
        Ok(())
    }

    /// Consume the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }

    /// Decode the next datum, loading the next block when needed.
    ///
    /// # Returns
    /// `Ok(None)` at the end of the file.
    pub fn next_datum(&mut self) -> Result<Option<AvroValue>, DataFileError> {
        if self.finished {
            return Ok(None);
        }

        while self.block_count == 0 {
            if self.decoder.get_mut().is_eof()? {
                return self.finish();
            }
            if self.sync_expected && self.skip_sync()? && self.decoder.get_mut().is_eof()? {
                return self.finish();
            }
            self.read_block()?;
        }

        let block_index = self.blocks_read.saturating_sub(1);
        let Some(block) = self.block.as_mut() else {
            return self.finish();
        };
        let datum = self
            .datum_reader
            .read(block)
            .map_err(|source| DataFileError::Decode { block_index, source })?;
        self.block_count -= 1;
        Ok(Some(datum))
    }

    fn finish(&mut self) -> Result<Option<AvroValue>, DataFileError> {
        self.finished = true;
        self.block = None;
        Ok(None)
    }

    /// Consume a sync marker if one is next in the stream.
    ///
    /// On a mismatch the stream is moved back to where it was, so the next
    /// block header is read from that position.
    fn skip_sync(&mut self) -> Result<bool, DataFileError> {
        let stream = self.decoder.get_mut();
        let mut proposed = [0u8; SYNC_SIZE];
        let mut filled = 0;
        while filled < SYNC_SIZE {
            match stream.read(&mut proposed[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        if filled == SYNC_SIZE && proposed == self.header.sync_marker {
            return Ok(true);
        }

        stream.seek(SeekFrom::Current(-(filled as i64)))?;
        self.resyncs += 1;
        warn!(
            block_index = self.blocks_read,
            "Sync marker mismatch after block, resynchronizing"
        );
        Ok(false)
    }

    fn read_block(&mut self) -> Result<(), DataFileError> {
        let offset = self.decoder.get_mut().tell()?;
        let block_index = self.blocks_read;
        let decode_err = |source| DataFileError::Decode { block_index, source };

        let count = self.decoder.read_long().map_err(decode_err)?;
        let size = self.decoder.read_long().map_err(decode_err)?;
        let (Ok(count), Ok(size)) = (u64::try_from(count), usize::try_from(size)) else {
            return Err(DataFileError::Parse {
                offset,
                message: format!("Invalid block header: count {}, size {}", count, size),
            });
        };

        let data = self.decoder.read_fixed(size).map_err(decode_err)?;
        let data = self.header.codec.decompress(Bytes::from(data))?;

        debug!(block_index, count, size, offset, "Read container block");

        self.block = Some(BinaryDecoder::new(Cursor::new(data))?);
        self.block_count = count;
        self.blocks_read += 1;
        self.sync_expected = true;
        Ok(())
    }
}

impl<R: BufRead + Seek> Iterator for ContainerReader<R> {
    type Item = Result<AvroValue, DataFileError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_datum() {
            Ok(Some(datum)) => Some(Ok(datum)),
            Ok(None) => None,
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
