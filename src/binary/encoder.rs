//! Avro binary encoder for primitive values.
//!
//! - `int` and `long` are zigzag varints
//! - `float` and `double` are little-endian IEEE 754
//! - `bytes` and `string` are a long length followed by the raw bytes
//! - `fixed` is the raw bytes with no length prefix

use std::io::Write;

use crate::binary::varint::{write_varint, zigzag_encode, MAX_VARINT_LEN};
use crate::error::{EncodeError, PlatformError};
use crate::platform::Platform;

/// Writes Avro primitive encodings to an underlying byte sink.
#[derive(Debug)]
pub struct BinaryEncoder<W: Write> {
    writer: W,
    scratch: Vec<u8>,
}

impl<W: Write> BinaryEncoder<W> {
    /// Create an encoder over `writer`.
    ///
    /// # Errors
    /// Returns `PlatformError` if the host cannot represent the wire format
    /// natively.
    pub fn new(writer: W) -> Result<Self, PlatformError> {
        Platform::get()?;
        Ok(Self {
            writer,
            scratch: Vec::with_capacity(MAX_VARINT_LEN),
        })
    }

    /// Null has no binary representation.
    #[inline]
    pub fn write_null(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }

    /// A single byte, 1 for true and 0 for false.
    #[inline]
    pub fn write_boolean(&mut self, value: bool) -> Result<(), EncodeError> {
        self.writer.write_all(&[u8::from(value)])?;
        Ok(())
    }

    #[inline]
    pub fn write_int(&mut self, value: i32) -> Result<(), EncodeError> {
        self.write_long(i64::from(value))
    }

    #[inline]
    pub fn write_long(&mut self, value: i64) -> Result<(), EncodeError> {
        self.scratch.clear();
        write_varint(zigzag_encode(value), &mut self.scratch);
        self.writer.write_all(&self.scratch)?;
        Ok(())
    }

    #[inline]
    pub fn write_float(&mut self, value: f32) -> Result<(), EncodeError> {
        self.writer.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    #[inline]
    pub fn write_double(&mut self, value: f64) -> Result<(), EncodeError> {
        self.writer.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Length-prefixed byte string.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.write_long(value.len() as i64)?;
        self.writer.write_all(value)?;
        Ok(())
    }

    /// Length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.write_bytes(value.as_bytes())
    }

    /// Raw bytes with no length prefix.
    pub fn write_fixed(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.writer.write_all(value)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the encoder, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
