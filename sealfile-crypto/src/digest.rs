//! Streaming content digests.
//!
//! Input is consumed in fixed-size chunks so memory stays bounded by the
//! buffer size regardless of file size. Every call starts from a fresh
//! hasher, so one digester can be reused across operations.

use crate::config::DigestAlgorithm;
use crate::error::EnvelopeResult;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Computes a cryptographic hash over a byte stream or file.
pub trait ContentDigester: Send + Sync {
    fn algorithm(&self) -> DigestAlgorithm;

    /// Reads `reader` to exhaustion and returns its digest.
    fn digest_reader(&self, reader: &mut dyn Read) -> EnvelopeResult<Vec<u8>>;

    /// Digests the file at `path`. An unreadable file is an `Io` error.
    fn digest_file(&self, path: &Path) -> EnvelopeResult<Vec<u8>> {
        let mut file = File::open(path)?;
        self.digest_reader(&mut file)
    }

    fn digest_bytes(&self, data: &[u8]) -> EnvelopeResult<Vec<u8>> {
        let mut cursor = data;
        self.digest_reader(&mut cursor)
    }
}

/// SHA-2 family digester.
#[derive(Clone, Debug)]
pub struct Sha2Digester {
    algorithm: DigestAlgorithm,
    buffer_size: usize,
}

impl Sha2Digester {
    pub fn new(algorithm: DigestAlgorithm, buffer_size: usize) -> Self {
        Self {
            algorithm,
            buffer_size: buffer_size.max(1),
        }
    }
}

impl ContentDigester for Sha2Digester {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn digest_reader(&self, reader: &mut dyn Read) -> EnvelopeResult<Vec<u8>> {
        let digest = match self.algorithm {
            DigestAlgorithm::Sha256 => digest_chunks::<Sha256>(reader, self.buffer_size)?,
            DigestAlgorithm::Sha512 => digest_chunks::<Sha512>(reader, self.buffer_size)?,
        };
        Ok(digest)
    }
}

fn digest_chunks<D: Digest>(reader: &mut dyn Read, buffer_size: usize) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; buffer_size];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finalize().to_vec())
}

/// Uppercase hex rendering used in logs and reports.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}
