//! Avro binary decoder for primitive values.
//!
//! Reads the encodings produced by [`BinaryEncoder`](super::BinaryEncoder)
//! from any [`Read`] source. Every `read_*` operation has a matching `skip_*`
//! that advances past the value without materializing it.

use std::io::{self, Read};

use crate::binary::varint::{decode_zigzag, MAX_VARINT_LEN};
use crate::error::{DecodeError, PlatformError};
use crate::platform::Platform;

/// Reads Avro primitive encodings from an underlying byte source.
#[derive(Debug)]
pub struct BinaryDecoder<R: Read> {
    reader: R,
}

impl<R: Read> BinaryDecoder<R> {
    /// Create a decoder over `reader`.
    ///
    /// # Errors
    /// Returns `PlatformError` if the host cannot represent the wire format
    /// natively.
    pub fn new(reader: R) -> Result<Self, PlatformError> {
        Platform::get()?;
        Ok(Self { reader })
    }

    #[inline]
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a length prefix, rejecting negative values.
    fn read_length(&mut self) -> Result<u64, DecodeError> {
        let len = self.read_long()?;
        u64::try_from(len)
            .map_err(|_| DecodeError::InvalidData(format!("Negative length: {}", len)))
    }

    /// Null has no binary representation.
    #[inline]
    pub fn read_null(&mut self) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Only the byte 1 reads as true; any other byte is false.
    #[inline]
    pub fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_byte()? == 1)
    }

    /// Read a long and narrow it to 32 bits.
    #[inline]
    pub fn read_int(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_long()? as i32)
    }

    /// Read a zigzag varint.
    ///
    /// Bytes are pulled from the source up to the terminating byte, then
    /// decoded with [`decode_zigzag`].
    ///
    /// # Errors
    /// - `DecodeError::UnexpectedEof` if the source ends mid-varint
    /// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
    pub fn read_long(&mut self) -> Result<i64, DecodeError> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let mut len = 0;
        while len < MAX_VARINT_LEN {
            let byte = self.read_byte()?;
            buf[len] = byte;
            len += 1;
            if byte & 0x80 == 0 {
                return decode_zigzag(&mut &buf[..len]);
            }
        }
        Err(DecodeError::InvalidVarint)
    }

    #[inline]
    pub fn read_float(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    #[inline]
    pub fn read_double(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Read a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_length()?;
        self.read_exact_len(len)
    }

    /// Read a length-prefixed string as raw bytes.
    ///
    /// No UTF-8 validation happens here; callers decide how to treat text
    /// that is not valid UTF-8.
    pub fn read_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        self.read_bytes()
    }

    /// Read exactly `size` raw bytes.
    pub fn read_fixed(&mut self, size: usize) -> Result<Vec<u8>, DecodeError> {
        self.read_exact_len(size as u64)
    }

    /// Read `len` bytes without trusting `len` for the allocation size.
    fn read_exact_len(&mut self, len: u64) -> Result<Vec<u8>, DecodeError> {
        let mut buf = Vec::with_capacity(len.min(64 * 1024) as usize);
        let read = (&mut self.reader).take(len).read_to_end(&mut buf)?;
        if (read as u64) < len {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(buf)
    }

    /// Read a block count for an array or map.
    ///
    /// # Returns
    /// The item count and, for negative counts, the byte size of the block
    /// that follows.
    pub fn read_block_count(&mut self) -> Result<(u64, Option<u64>), DecodeError> {
        let count = self.read_long()?;
        if count < 0 {
            let size = self.read_length()?;
            Ok((count.unsigned_abs(), Some(size)))
        } else {
            Ok((count as u64, None))
        }
    }

    // ========================================================================
    // Skipping
    // ========================================================================

    /// Advance past `len` bytes.
    pub fn skip_raw(&mut self, len: u64) -> Result<(), DecodeError> {
        let skipped = io::copy(&mut (&mut self.reader).take(len), &mut io::sink())?;
        if skipped < len {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(())
    }

    #[inline]
    pub fn skip_null(&mut self) -> Result<(), DecodeError> {
        Ok(())
    }

    #[inline]
    pub fn skip_boolean(&mut self) -> Result<(), DecodeError> {
        self.skip_raw(1)
    }

    #[inline]
    pub fn skip_int(&mut self) -> Result<(), DecodeError> {
        self.read_long().map(|_| ())
    }

    #[inline]
    pub fn skip_long(&mut self) -> Result<(), DecodeError> {
        self.read_long().map(|_| ())
    }

    #[inline]
    pub fn skip_float(&mut self) -> Result<(), DecodeError> {
        self.skip_raw(4)
    }

    #[inline]
    pub fn skip_double(&mut self) -> Result<(), DecodeError> {
        self.skip_raw(8)
    }

    pub fn skip_bytes(&mut self) -> Result<(), DecodeError> {
        let len = self.read_length()?;
        self.skip_raw(len)
    }

    pub fn skip_string(&mut self) -> Result<(), DecodeError> {
        self.skip_bytes()
    }

    pub fn skip_fixed(&mut self, size: usize) -> Result<(), DecodeError> {
        self.skip_raw(size as u64)
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume the decoder, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
