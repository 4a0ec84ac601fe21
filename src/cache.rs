//! Cache files for dynamic content.
//!
//! A cached response lives under the route's cache root, named by the request
//! path plus the canonical query plus a fixed suffix.  Because the query part
//! of the name is canonical, two requests that differ only in parameter order
//! share one cache file.
//!
//! The record holds two length-prefixed blocks (u64 little-endian): the cache
//! key, then the raw HTTP response bytes.  The key is checked on load so a
//! record that was moved or renamed cannot answer for the wrong content.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub const CACHE_FILE_SUFFIX: &str = ".cache";

/// The identity of one cacheable response: request path plus canonical query.
#[must_use]
pub fn cache_key(path: &str, canonical_query: &str) -> String {
    format!("{path}{canonical_query}")
}

/// The on-disk location of the cache record for `key` under `cache_root`.
/// `/` separators in the key's path part become directories.
#[must_use]
pub fn cache_file_path(cache_root: &Path, key: &str) -> PathBuf {
    let rel = key.strip_prefix('/').unwrap_or(key);
    let rel = if rel.is_empty() { "index" } else { rel };
    cache_root.join(format!("{rel}{CACHE_FILE_SUFFIX}"))
}

/// Writes a cache record, creating parent directories as needed.
///
/// # Errors
/// Returns an error when creating directories or writing the file fails.
pub fn store_record(
    file_path: &Path,
    key: &str,
    response_bytes: &[u8],
) -> Result<(), std::io::Error> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(file_path)?;
    write_block(&mut file, key.as_bytes())?;
    write_block(&mut file, response_bytes)?;
    file.flush()
}

/// Reads the cache record at `file_path` and returns the stored response
/// bytes.  Returns `None` when the file does not exist, is truncated, or was
/// stored under a different key.
///
/// # Errors
/// Returns an error when reading fails for any other reason.
pub fn load_record(file_path: &Path, key: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
    let mut file = match File::open(file_path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let stored_key = match read_block(&mut file)? {
        Some(bytes) => bytes,
        None => return Ok(None),
    };
    if stored_key != key.as_bytes() {
        return Ok(None);
    }
    read_block(&mut file)
}

fn write_block(file: &mut File, bytes: &[u8]) -> Result<(), std::io::Error> {
    file.write_all(&(bytes.len() as u64).to_le_bytes())?;
    file.write_all(bytes)
}

fn read_block(file: &mut File) -> Result<Option<Vec<u8>>, std::io::Error> {
    let mut len_bytes = [0_u8; 8];
    match file.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = usize::try_from(u64::from_le_bytes(len_bytes))
        .map_err(|_| std::io::Error::new(ErrorKind::InvalidData, "cache block too large"))?;
    let mut bytes = vec![0_u8; len];
    match file.read_exact(&mut bytes) {
        Ok(()) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}
