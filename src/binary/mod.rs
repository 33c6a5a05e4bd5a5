//! Avro binary encoding.
//!
//! Low-level varint helpers operate on byte slices; [`BinaryEncoder`] and
//! [`BinaryDecoder`] wrap `std::io` streams.

mod decoder;
mod encoder;
pub mod varint;

pub use decoder::BinaryDecoder;
pub use encoder::BinaryEncoder;
