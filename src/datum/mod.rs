//! Datum encoding and decoding against schemas.

mod reader;
mod writer;

pub use reader::DatumReader;
pub use writer::DatumWriter;

use crate::binary::{BinaryDecoder, BinaryEncoder};
use crate::error::{DecodeError, EncodeError};
use crate::schema::Schema;
use crate::value::AvroValue;

/// Encode a single datum to a byte vector.
///
/// # Example
/// ```
/// use avrolite::{encode_datum, AvroValue, Schema};
///
/// let schema = Schema::parse(r#""int""#).unwrap();
/// assert_eq!(encode_datum(&schema, &AvroValue::Int(-1)).unwrap(), vec![0x01]);
/// ```
pub fn encode_datum(schema: &Schema, datum: &AvroValue) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = BinaryEncoder::new(Vec::new())?;
    DatumWriter::new(schema.clone()).write(datum, &mut encoder)?;
    Ok(encoder.into_inner())
}

/// Decode a single datum written with `writer` into the shape of `reader`.
pub fn decode_datum(
    writer: &Schema,
    reader: &Schema,
    bytes: &[u8],
) -> Result<AvroValue, DecodeError> {
    let mut decoder = BinaryDecoder::new(bytes)?;
    DatumReader::new(writer.clone())
        .with_reader_schema(reader.clone())
        .read(&mut decoder)
}
