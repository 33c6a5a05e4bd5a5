//! Host capability check.
//!
//! The binary codec writes `float` and `double` as little-endian IEEE-754 and
//! relies on native 64-bit integers for `long`. The check runs once per
//! process; every encoder and decoder obtains the result before touching a
//! stream, so an unsupported host fails at construction instead of producing
//! corrupt data.

use std::sync::OnceLock;

use crate::error::PlatformError;

static PLATFORM: OnceLock<Result<Platform, PlatformError>> = OnceLock::new();

/// Proof that the host passed the capability check, produced by
/// [`Platform::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    _checked: (),
}

impl Platform {
    /// Return the process-wide platform description, checking it on first use.
    ///
    /// # Errors
    /// Returns `PlatformError::BigEndian` on big-endian hosts.
    pub fn get() -> Result<&'static Platform, PlatformError> {
        match PLATFORM.get_or_init(Self::detect) {
            Ok(platform) => Ok(platform),
            Err(err) => Err(*err),
        }
    }

    fn detect() -> Result<Platform, PlatformError> {
        if cfg!(target_endian = "big") {
            return Err(PlatformError::BigEndian);
        }
        Ok(Platform { _checked: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_endian = "little")]
    fn test_little_endian_host_passes() {
        let platform = Platform::get().unwrap();
        // Second call hits the cached value
        assert!(std::ptr::eq(Platform::get().unwrap(), platform));
    }
}
