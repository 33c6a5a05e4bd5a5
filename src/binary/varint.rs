//! Shared varint encoding and decoding utilities.
//!
//! Avro stores `int` and `long` values as zigzag-mapped variable-length
//! integers:
//! - Each byte has 7 bits of data and 1 continuation bit (MSB)
//! - Bytes are in little-endian order
//! - Zigzag maps signed to unsigned: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
//!
//! A 64-bit value never needs more than [`MAX_VARINT_LEN`] bytes.

use crate::error::DecodeError;

/// Longest valid varint for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Zigzag mapping
// ============================================================================

/// Map a signed integer to its zigzag form: `(n << 1) ^ (n >> 63)`.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`]: `(n >> 1) ^ -(n & 1)`.
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}

// ============================================================================
// Decoding Functions
// ============================================================================

/// Decode an unsigned variable-length integer.
///
/// # Arguments
/// * `data` - The input byte slice (cursor is advanced past the varint)
///
/// # Returns
/// The decoded unsigned 64-bit integer
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;

        result |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
        if shift >= 7 * MAX_VARINT_LEN as u32 {
            return Err(DecodeError::InvalidVarint);
        }
    }
}

/// Decode a signed variable-length integer (zigzag encoded).
///
/// # Errors
/// Same as [`decode_varint`].
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<i64, DecodeError> {
    decode_varint(data).map(zigzag_decode)
}

// ============================================================================
// Encoding Functions
// ============================================================================

/// Append the varint encoding of `value` to `out`.
///
/// # Returns
/// The number of bytes written
#[inline]
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    out.reserve(varint_len(value));
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out.len() - start;
        }
        out.push(byte | 0x80);
    }
}

/// Number of bytes [`write_varint`] appends for `value`.
#[inline]
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
