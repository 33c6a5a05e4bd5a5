//! Byte sources for container files
//!
//! Containers read from anything that is `BufRead + Seek`. The [`Source`]
//! extension trait adds the position queries the block reader needs.

pub mod local;

use std::io::{self, BufRead, Seek};

pub use local::{create_file, open_file, open_file_rw};

/// Position queries over a seekable byte stream.
pub trait Source: BufRead + Seek {
    /// Current offset from the start of the stream.
    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Whether no bytes remain. Leaves the position unchanged.
    ///
    /// Only peeks at the read buffer, refilling it when it is empty.
    fn is_eof(&mut self) -> io::Result<bool> {
        Ok(self.fill_buf()?.is_empty())
    }
}

impl<T: BufRead + Seek + ?Sized> Source for T {}
