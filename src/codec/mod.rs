//! Block codecs for container files
//!
//! A container names its codec in the `avro.codec` metadata entry. Only the
//! `null` codec is implemented; `deflate` is recognized so that files using
//! it fail with a clear error rather than an unknown-name error.

use bytes::Bytes;

use crate::error::CodecError;

/// Codec used for the data section of container blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// No compression (passthrough)
    #[default]
    Null,
    /// Deflate (RFC 1951), recognized but not implemented
    Deflate,
}

impl Codec {
    /// Parse a codec from its name string as found in container metadata.
    ///
    /// # Arguments
    /// * `name` - The codec name (e.g., "null", "deflate")
    ///
    /// # Returns
    /// * `Ok(Codec)` - The parsed codec
    /// * `Err(CodecError)` - If the codec name is unknown
    ///
    /// # Examples
    /// ```
    /// use avrolite::codec::Codec;
    ///
    /// assert_eq!(Codec::from_name("null").unwrap(), Codec::Null);
    ///
    /// let err = Codec::from_name("snappy").unwrap_err();
    /// assert!(err.to_string().contains("snappy"));
    /// ```
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "null" => Ok(Codec::Null),
            "deflate" => Ok(Codec::Deflate),
            unknown => Err(CodecError::UnsupportedCodec(format!(
                "Unknown codec '{}'. Supported codecs: null",
                unknown
            ))),
        }
    }

    /// Get the name of this codec as it appears in container metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Null => "null",
            Codec::Deflate => "deflate",
        }
    }

    /// Fail unless blocks using this codec can be read and written.
    pub fn ensure_supported(&self) -> Result<(), CodecError> {
        match self {
            Codec::Null => Ok(()),
            Codec::Deflate => Err(CodecError::UnsupportedCodec(
                "deflate is recognized but not implemented".to_string(),
            )),
        }
    }

    /// Compress a block's data section.
    pub fn compress(&self, data: Bytes) -> Result<Bytes, CodecError> {
        self.ensure_supported()?;
        Ok(data)
    }

    /// Decompress a block's data section.
    ///
    /// For the null codec this is a passthrough that shares the input buffer.
    pub fn decompress(&self, data: Bytes) -> Result<Bytes, CodecError> {
        self.ensure_supported()?;
        Ok(data)
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
