//! Local filesystem helpers
//!
//! Opens files with buffered I/O and maps the common failure kinds to
//! [`SourceError`] variants that name the path.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use crate::error::SourceError;

/// Open an existing file for buffered reading.
///
/// # Errors
/// Returns `SourceError::NotFound` if the file doesn't exist.
/// Returns `SourceError::PermissionDenied` if access is denied.
/// Returns `SourceError::FileSystemError` for other I/O errors.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<BufReader<File>, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| map_io_error(path, e))?;
    Ok(BufReader::new(file))
}

/// Create (or truncate) a file for buffered writing.
///
/// # Errors
/// Same as [`open_file`].
pub fn create_file<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>, SourceError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| map_io_error(path, e))?;
    Ok(BufWriter::new(file))
}

/// Open an existing file for reading and writing, as append mode needs.
///
/// The handle is unbuffered so reads and writes can be interleaved with
/// seeks.
pub fn open_file_rw<P: AsRef<Path>>(path: P) -> Result<File, SourceError> {
    let path = path.as_ref();
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| map_io_error(path, e))
}

fn map_io_error(path: &Path, e: io::Error) -> SourceError {
    match e.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => {
            SourceError::PermissionDenied(path.display().to_string())
        }
        _ => SourceError::FileSystemError(format!("{}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn test_open_nonexistent_file() {
        let result = open_file("/nonexistent/path/to/file.avro");
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_create_then_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");

        let mut writer = create_file(&path).unwrap();
        writer.write_all(b"hello").unwrap();
        drop(writer);

        let mut contents = Vec::new();
        open_file(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"hello");

        assert!(open_file_rw(&path).is_ok());
    }

    #[test]
    fn test_open_rw_nonexistent_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            open_file_rw(dir.path().join("missing.avro")),
            Err(SourceError::NotFound(_))
        ));
    }
}
