//! Content fingerprinting: streaming SHA-512 with a small-file shortcut.
//!
//! # Overview
//!
//! [`digest_file`] reduces one regular file to its [`ContentKey`]. Large
//! files stream through SHA-512 in chunks of a capped buffer, so memory
//! stays bounded no matter the file size. Files no larger than the 64-byte
//! digest skip hashing entirely: their own bytes, hex-encoded and
//! zero-padded to digest width, already identify the content exactly. The
//! shortcut's output format is part of the key contract: equal-size,
//! equal-content files produce equal keys on every platform.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::thread;

use sha2::{Digest, Sha512};

use crate::duplicates::ContentKey;
use crate::error::{is_transient, ScanError, RETRY_DELAY};

/// SHA-512 output length in bytes.
pub const DIGEST_LENGTH: usize = 64;

/// Streaming buffer cap: files larger than this are read in 10 MiB chunks.
pub const MAX_BUFFER_SIZE: usize = 10 * 1024 * 1024;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Compute the content key for a regular file of known size.
///
/// The caller supplies the size from a fresh stat; admission filtering
/// (size window, extensions) has already happened by the time a file
/// reaches the digester.
///
/// * `size ≤ 64`: the file's bytes are read and hex-encoded directly,
///   right-padded with `'0'` to 128 characters. A zero-byte file yields
///   128 zeros.
/// * `size > 64`: the content streams through SHA-512 and the key carries
///   the 128-character uppercase digest.
///
/// The open retries transient resource exhaustion after a bounded sleep.
///
/// # Errors
///
/// [`ScanError::ShortRead`] when the file ends before `size` bytes were
/// read (it shrank or was truncated since the stat); other I/O failures
/// map through the usual taxonomy. All are per-item errors: the caller
/// reports them and moves on.
pub fn digest_file(path: &Path, size: u64) -> Result<ContentKey, ScanError> {
    let mut file = open_with_retry(path)?;

    let hex = if size <= DIGEST_LENGTH as u64 {
        short_file_hex(&mut file, path, size as usize)?
    } else {
        streamed_digest_hex(&mut file, path, size)?
    };

    Ok(ContentKey::new(size, hex))
}

/// Open a file for reading, sleeping and retrying on transient errors.
fn open_with_retry(path: &Path) -> Result<File, ScanError> {
    loop {
        match File::open(path) {
            Ok(file) => return Ok(file),
            Err(e) if is_transient(&e) => {
                log::warn!("Transient error opening {}, retrying: {}", path.display(), e);
                thread::sleep(RETRY_DELAY);
            }
            Err(e) => return Err(ScanError::from_io(path.to_path_buf(), e)),
        }
    }
}

/// Hex-encode the raw content of a file no larger than the digest.
///
/// The result is always `2 * DIGEST_LENGTH` characters: the content's hex
/// followed by `'0'` padding.
fn short_file_hex(file: &mut File, path: &Path, size: usize) -> Result<String, ScanError> {
    let mut content = [0u8; DIGEST_LENGTH];
    read_exactly(file, path, &mut content[..size])?;

    let mut hex = vec![b'0'; DIGEST_LENGTH * 2];
    for (i, byte) in content[..size].iter().enumerate() {
        hex[i * 2] = HEX[(byte >> 4) as usize];
        hex[i * 2 + 1] = HEX[(byte & 0x0F) as usize];
    }
    // Infallible: every byte written is ASCII hex.
    Ok(String::from_utf8(hex).unwrap_or_default())
}

/// Stream a file through SHA-512 and hex-encode the digest.
fn streamed_digest_hex(file: &mut File, path: &Path, size: u64) -> Result<String, ScanError> {
    let buffer_size = size.min(MAX_BUFFER_SIZE as u64) as usize;
    let mut buffer = vec![0u8; buffer_size];
    let mut hasher = Sha512::new();
    let mut total: u64 = 0;

    loop {
        let n = file
            .read(&mut buffer)
            .map_err(|e| ScanError::from_io(path.to_path_buf(), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        total += n as u64;
    }

    if total < size {
        return Err(ScanError::ShortRead {
            path: path.to_path_buf(),
        });
    }

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(DIGEST_LENGTH * 2);
    for byte in digest {
        hex.push(HEX[(byte >> 4) as usize] as char);
        hex.push(HEX[(byte & 0x0F) as usize] as char);
    }
    Ok(hex)
}

/// Fill `buf` from the file, treating early EOF as a short read.
fn read_exactly(file: &mut File, path: &Path, buf: &mut [u8]) -> Result<(), ScanError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file
            .read(&mut buf[filled..])
            .map_err(|e| ScanError::from_io(path.to_path_buf(), e))?;
        if n == 0 {
            return Err(ScanError::ShortRead {
                path: path.to_path_buf(),
            });
        }
        filled += n;
    }
    Ok(())
}
