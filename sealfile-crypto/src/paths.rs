//! Path preconditions and envelope file naming.

use crate::error::{EnvelopeError, EnvelopeResult};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MANIFEST_SUFFIX: &str = "-config.json";
const ENCRYPTED_SUFFIX: &str = "-encrypted";
const DECRYPTED_FILE_NAME: &str = "decrypted.txt";

/// Fails with `Path` unless `path` is an existing, readable regular file.
pub fn ensure_readable(path: &Path) -> EnvelopeResult<()> {
    let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            EnvelopeError::Path(format!("source file not found: {}", path.display()))
        }
        _ => EnvelopeError::Path(format!("source cannot be read: {}: {e}", path.display())),
    })?;
    if !meta.is_file() {
        return Err(EnvelopeError::Path(format!(
            "source is not a regular file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Fails with `Path` if anything already exists at `path`.
pub fn ensure_absent(path: &Path) -> EnvelopeResult<()> {
    if path.symlink_metadata().is_ok() {
        return Err(EnvelopeError::Path(format!(
            "file already exists in path {}",
            path.display()
        )));
    }
    Ok(())
}

/// Opens `path` for reading after checking it is a readable file.
pub fn open_source(path: &Path) -> EnvelopeResult<File> {
    ensure_readable(path)?;
    File::open(path)
        .map_err(|e| EnvelopeError::Path(format!("source cannot be read: {}: {e}", path.display())))
}

/// Creates `path` for writing; an existing file is left untouched.
pub fn create_new(path: &Path) -> EnvelopeResult<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => {
                EnvelopeError::Path(format!("file already exists in path {}", path.display()))
            }
            _ => EnvelopeError::Path(format!("file cannot be created {}: {e}", path.display())),
        })
}

/// `<ciphertext>-config.json`
pub fn manifest_path_for(ciphertext: &Path) -> PathBuf {
    with_suffix(ciphertext, MANIFEST_SUFFIX)
}

/// `<source>-encrypted`
pub fn default_encrypted_path(source: &Path) -> PathBuf {
    with_suffix(source, ENCRYPTED_SUFFIX)
}

/// `decrypted.txt` beside the ciphertext.
pub fn default_decrypted_path(ciphertext: &Path) -> PathBuf {
    match ciphertext.parent() {
        Some(dir) => dir.join(DECRYPTED_FILE_NAME),
        None => PathBuf::from(DECRYPTED_FILE_NAME),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
