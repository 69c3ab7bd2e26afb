//! Blob file read/write helpers (ambient: §10.4). These helpers move bytes
//! to/from disk only; they know nothing about the tree's internal
//! structure, which lives entirely in `crate::serialize`.
//!
//! Grounded on `read_write_utils.rs`'s `parse_serialization_path` /
//! `serialize_to_bin_file` pair, adapted from bincode-struct framing to raw
//! byte blobs.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use logging_timer::{executing, finish, stimer, Level};
use thiserror::Error;

pub const BLOB_EXTENSION: &str = "qgt";

/// Writes `bytes` to `path`. Logs timing at debug level.
pub fn write_blob_file(bytes: &[u8], path: PathBuf) -> Result<(), IoError> {
    let tmr = stimer!(Level::Debug; "BlobWrite");
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    finish!(tmr, "Done writing blob file");
    Ok(())
}

/// Reads the full contents of `path` into memory.
pub fn read_blob_file(path: PathBuf) -> Result<Vec<u8>, IoError> {
    let tmr = stimer!(Level::Debug; "BlobRead");
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    executing!(tmr, "Done reading blob file");
    Ok(buf)
}

/// Resolves `path` to a concrete file path for writing a blob:
/// - an existing file path with the expected extension is returned as-is;
/// - a directory path (existing or not) gets a timestamped default file
///   name appended, and any missing intermediate directories are created.
pub fn parse_blob_path(mut path: PathBuf, namespace: &str) -> Result<PathBuf, IoError> {
    if let Some(ext) = path.extension() {
        if ext != BLOB_EXTENSION {
            return Err(IoError::UnsupportedFileExtension {
                expected: BLOB_EXTENSION.to_owned(),
                actual: ext.to_os_string(),
            });
        }
        if let Some(parent) = path.parent() {
            if !parent.is_dir() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(path)
    } else {
        if !path.is_dir() {
            std::fs::create_dir_all(path.clone())?;
        }
        let now = chrono::offset::Local::now();
        let file_name = format!("{namespace}_{}.{BLOB_EXTENSION}", now.timestamp());
        path.push(file_name);
        Ok(path)
    }
}

#[derive(Error, Debug)]
pub enum IoError {
    #[error("problem reading/writing to file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("unknown file extension {actual:?}, expected {expected}")]
    UnsupportedFileExtension { expected: String, actual: OsString },
}
