use crate::error::{FileOperation, FpError, FpResult};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Read buffer used when no size is configured.
pub const DEFAULT_READ_BUFFER: usize = 64 * 1024;

/// Length of a rendered digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 32;

/// XXH3-128 digest of an in-memory buffer
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}

/// [`hash_file_with_buffer`] with [`DEFAULT_READ_BUFFER`].
///
/// # Errors
///
/// Returns [`FpError::FileRead`] naming the operation that failed.
pub fn hash_file(path: &Path) -> FpResult<String> {
    hash_file_with_buffer(path, DEFAULT_READ_BUFFER)
}

/// Stream the file through XXH3-128.
///
/// The handle lives only for the duration of the call. The byte count read
/// must match the size reported at open time, which catches files truncated
/// or extended while they are being read.
///
/// # Errors
///
/// Returns [`FpError::FileRead`] naming the operation that failed.
pub fn hash_file_with_buffer(path: &Path, buffer_size: usize) -> FpResult<String> {
    let mut file =
        File::open(path).map_err(|e| FpError::file_read(path, FileOperation::Open, e))?;
    let expected = file
        .metadata()
        .map_err(|e| FpError::file_read(path, FileOperation::Stat, e))?
        .len();

    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FpError::file_read(path, FileOperation::Read, e)),
        };
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    if total != expected {
        return Err(FpError::file_read(
            path,
            FileOperation::Read,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file changed while reading (expected {expected} bytes, read {total})"),
            ),
        ));
    }

    Ok(format!("{:032x}", hasher.digest128()))
}
